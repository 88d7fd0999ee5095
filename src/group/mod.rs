//! Groups of people who share expenses, and the pages for managing them.

mod create;
mod db;
mod domain;
mod list;
mod page;
mod settlement_api;
mod snapshot;

pub use create::create_group_endpoint;
pub use db::{create_group, create_group_table, get_group};
pub use domain::{Group, GroupId, GroupName};
pub use list::get_groups_page;
pub use page::get_group_page;
pub use settlement_api::get_group_settlement;
