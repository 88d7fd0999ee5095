//! Expenses: money one member paid that is split between members of a group.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;

pub use create::create_expense_endpoint;
pub use db::{
    create_expense, create_expense_tables, delete_expense, get_expense, get_expenses,
    update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{Expense, ExpenseId, MAX_EXPENSE_AMOUNT, NewExpense};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub(crate) use form::{ExpenseFormAction, ExpenseFormView};
