//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, expense::create_expense_tables, group::create_group_table,
    member::create_member_table,
};

/// Create the tables for the domain models if they do not already exist.
///
/// The tables are created in a single exclusive transaction, so either all of
/// them are created or none are. Foreign key enforcement is switched on for
/// `connection`, since SQLite leaves it off by default.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_group_table(&transaction)?;
    create_member_table(&transaction)?;
    create_expense_tables(&transaction)?;

    transaction.commit()?;

    Ok(())
}
