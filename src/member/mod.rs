//! Members of a group: the people who pay for and share expenses.

mod create;
mod db;
mod domain;

pub use create::create_member_endpoint;
pub(crate) use create::add_member_form_view;
pub use db::{create_member, create_member_table, get_members};
pub use domain::{Member, MemberId, MemberName, parse_member_names};
