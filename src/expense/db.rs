//! Database operations for expenses and their targets.

use std::collections::HashMap;

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    expense::{Expense, ExpenseId, MAX_EXPENSE_AMOUNT, NewExpense},
    group::GroupId,
    member::MemberId,
};

/// Save `new_expense` and return it with its generated ID.
///
/// The expense and its targets are written in one transaction.
///
/// # Errors
/// Returns [Error::NotFound] if the group or a member no longer exists.
pub fn create_expense(
    new_expense: NewExpense,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Expense, Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction
        .execute(
            "INSERT INTO expense (group_id, description, amount, payer_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5);",
            (
                new_expense.group_id,
                &new_expense.description,
                new_expense.amount,
                new_expense.payer_id,
                created_at,
            ),
        )
        .map_err(map_foreign_key_error)?;

    let id = transaction.last_insert_rowid();
    insert_targets(id, &new_expense.target_ids, &transaction)?;

    transaction.commit()?;

    Ok(Expense {
        id,
        group_id: new_expense.group_id,
        description: new_expense.description,
        amount: new_expense.amount,
        payer_id: new_expense.payer_id,
        target_ids: new_expense.target_ids,
        created_at,
    })
}

/// Retrieve a single expense, with its targets in attachment order.
///
/// # Errors
/// Returns [Error::NotFound] if `expense_id` does not refer to an expense.
pub fn get_expense(expense_id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let mut expense = connection
        .prepare(
            "SELECT id, group_id, description, amount, payer_id, created_at
            FROM expense WHERE id = :id;",
        )?
        .query_row(&[(":id", &expense_id)], map_row)?;

    expense.target_ids = connection
        .prepare(
            "SELECT member_id FROM expense_target
            WHERE expense_id = :expense_id
            ORDER BY position ASC;",
        )?
        .query_map(&[(":expense_id", &expense_id)], |row| row.get(0))?
        .collect::<Result<Vec<MemberId>, rusqlite::Error>>()?;

    Ok(expense)
}

/// Retrieve the expenses of a group in the order they were recorded, each with
/// its targets in attachment order.
pub fn get_expenses(group_id: GroupId, connection: &Connection) -> Result<Vec<Expense>, Error> {
    let mut expenses = connection
        .prepare(
            "SELECT id, group_id, description, amount, payer_id, created_at
            FROM expense WHERE group_id = :group_id
            ORDER BY id ASC;",
        )?
        .query_map(&[(":group_id", &group_id)], map_row)?
        .collect::<Result<Vec<Expense>, rusqlite::Error>>()?;

    let mut targets_per_expense: HashMap<ExpenseId, Vec<MemberId>> = HashMap::new();
    let mut statement = connection.prepare(
        "SELECT t.expense_id, t.member_id
        FROM expense_target t
        INNER JOIN expense e ON e.id = t.expense_id
        WHERE e.group_id = :group_id
        ORDER BY t.expense_id ASC, t.position ASC;",
    )?;
    let rows = statement.query_map(&[(":group_id", &group_id)], |row| {
        Ok((row.get::<_, ExpenseId>(0)?, row.get::<_, MemberId>(1)?))
    })?;

    for row in rows {
        let (expense_id, member_id) = row?;
        targets_per_expense
            .entry(expense_id)
            .or_default()
            .push(member_id);
    }

    for expense in &mut expenses {
        expense.target_ids = targets_per_expense.remove(&expense.id).unwrap_or_default();
    }

    Ok(expenses)
}

/// Replace the description, amount, payer and targets of an expense.
///
/// The expense must belong to the same group as `new_expense`.
///
/// # Errors
/// Returns [Error::UpdateMissingExpense] if there is no such expense in the group.
pub fn update_expense(
    expense_id: ExpenseId,
    new_expense: &NewExpense,
    connection: &Connection,
) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    let rows_affected = transaction
        .execute(
            "UPDATE expense SET description = ?1, amount = ?2, payer_id = ?3
            WHERE id = ?4 AND group_id = ?5",
            (
                &new_expense.description,
                new_expense.amount,
                new_expense.payer_id,
                expense_id,
                new_expense.group_id,
            ),
        )
        .map_err(map_foreign_key_error)?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    transaction.execute(
        "DELETE FROM expense_target WHERE expense_id = ?1",
        [expense_id],
    )?;
    insert_targets(expense_id, &new_expense.target_ids, &transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Delete an expense and its targets, returning the ID of the group it belonged to.
///
/// # Errors
/// Returns [Error::DeleteMissingExpense] if the expense doesn't exist.
pub fn delete_expense(expense_id: ExpenseId, connection: &Connection) -> Result<GroupId, Error> {
    connection
        .prepare("DELETE FROM expense WHERE id = ?1 RETURNING group_id")?
        .query_row([expense_id], |row| row.get(0))
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::DeleteMissingExpense,
            error => error.into(),
        })
}

/// Initialize the expense and expense target tables.
///
/// Requires the group and member tables to exist.
pub fn create_expense_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            group_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0 AND amount <= {MAX_EXPENSE_AMOUNT}),
            payer_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(group_id) REFERENCES expense_group(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(payer_id) REFERENCES member(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_group_id ON expense(group_id);

        CREATE TABLE IF NOT EXISTS expense_target (
            expense_id INTEGER NOT NULL,
            member_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY(expense_id, member_id),
            FOREIGN KEY(expense_id) REFERENCES expense(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(member_id) REFERENCES member(id) ON UPDATE CASCADE ON DELETE CASCADE
        );"
    ))?;

    Ok(())
}

fn insert_targets(
    expense_id: ExpenseId,
    target_ids: &[MemberId],
    connection: &Connection,
) -> Result<(), Error> {
    let mut statement = connection.prepare(
        "INSERT INTO expense_target (expense_id, member_id, position) VALUES (?1, ?2, ?3);",
    )?;

    for (position, member_id) in target_ids.iter().enumerate() {
        statement
            .execute((expense_id, member_id, position as i64))
            .map_err(map_foreign_key_error)?;
    }

    Ok(())
}

fn map_foreign_key_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::NotFound,
        error => error.into(),
    }
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        group_id: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        payer_id: row.get(4)?,
        target_ids: Vec::new(),
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod expense_query_tests {
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        db::initialize,
        expense::{
            MAX_EXPENSE_AMOUNT, NewExpense, create_expense, delete_expense, get_expense,
            get_expenses, update_expense,
        },
        group::{GroupName, create_group},
        member::{Member, MemberName, create_member},
    };

    struct Fixture {
        connection: Connection,
        group_id: i64,
        members: Vec<Member>,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        let group = create_group(
            GroupName::new_unchecked("Trip"),
            OffsetDateTime::UNIX_EPOCH,
            &connection,
        )
        .unwrap();
        let members = ["A", "B", "C"]
            .into_iter()
            .map(|name| {
                create_member(group.id, MemberName::new_unchecked(name), &connection).unwrap()
            })
            .collect();

        Fixture {
            connection,
            group_id: group.id,
            members,
        }
    }

    impl Fixture {
        fn new_expense(&self, amount: i64, payer: usize, targets: &[usize]) -> NewExpense {
            let target_ids: Vec<_> = targets.iter().map(|&i| self.members[i].id).collect();

            NewExpense::new(
                self.group_id,
                "Dinner",
                amount,
                self.members[payer].id,
                &target_ids,
                &self.members,
            )
            .unwrap()
        }
    }

    #[test]
    fn create_expense_succeeds() {
        let fixture = get_fixture();
        let created_at = datetime!(2025-05-01 20:00 +09:00);

        let expense = create_expense(
            fixture.new_expense(3000, 0, &[2, 0, 1]),
            created_at,
            &fixture.connection,
        )
        .expect("Could not create expense");

        assert!(expense.id > 0);
        assert_eq!(expense.amount, 3000);
        assert_eq!(expense.description, "Dinner");
        assert_eq!(expense.created_at, created_at);
        let selected = get_expense(expense.id, &fixture.connection);
        assert_eq!(Ok(expense), selected);
    }

    #[test]
    fn expense_table_rejects_amount_above_limit() {
        let fixture = get_fixture();

        let result = fixture.connection.execute(
            "INSERT INTO expense (group_id, description, amount, payer_id, created_at)
            VALUES (?1, 'Villa', ?2, ?3, ?4)",
            (
                fixture.group_id,
                MAX_EXPENSE_AMOUNT + 1,
                fixture.members[0].id,
                OffsetDateTime::UNIX_EPOCH,
            ),
        );

        assert!(
            matches!(
                result,
                Err(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error {
                        code: rusqlite::ffi::ErrorCode::ConstraintViolation,
                        ..
                    },
                    _
                ))
            ),
            "want a constraint violation, got {result:?}"
        );
    }

    #[test]
    fn targets_keep_attachment_order() {
        let fixture = get_fixture();
        let ids: Vec<_> = fixture.members.iter().map(|member| member.id).collect();

        let created = create_expense(
            fixture.new_expense(10, 0, &[2, 0, 1]),
            OffsetDateTime::UNIX_EPOCH,
            &fixture.connection,
        )
        .unwrap();

        let expense = get_expense(created.id, &fixture.connection).unwrap();
        assert_eq!(expense.target_ids, vec![ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn get_expense_fails_on_missing_expense() {
        let fixture = get_fixture();

        assert_eq!(get_expense(1, &fixture.connection), Err(Error::NotFound));
    }

    #[test]
    fn get_expenses_returns_insertion_order_with_targets() {
        let fixture = get_fixture();
        let first = create_expense(
            fixture.new_expense(100, 0, &[0, 1, 2]),
            OffsetDateTime::UNIX_EPOCH,
            &fixture.connection,
        )
        .unwrap();
        let second = create_expense(
            fixture.new_expense(30, 1, &[1]),
            OffsetDateTime::UNIX_EPOCH,
            &fixture.connection,
        )
        .unwrap();

        let expenses = get_expenses(fixture.group_id, &fixture.connection);

        assert_eq!(expenses, Ok(vec![first, second]));
    }

    #[test]
    fn get_expenses_ignores_other_groups() {
        let fixture = get_fixture();
        create_expense(
            fixture.new_expense(100, 0, &[0]),
            OffsetDateTime::UNIX_EPOCH,
            &fixture.connection,
        )
        .unwrap();
        let other_group = create_group(
            GroupName::new_unchecked("Other"),
            OffsetDateTime::UNIX_EPOCH,
            &fixture.connection,
        )
        .unwrap();

        assert_eq!(get_expenses(other_group.id, &fixture.connection), Ok(vec![]));
    }

    #[test]
    fn update_expense_replaces_fields_and_targets() {
        let fixture = get_fixture();
        let ids: Vec<_> = fixture.members.iter().map(|member| member.id).collect();
        let expense = create_expense(
            fixture.new_expense(100, 0, &[0, 1, 2]),
            OffsetDateTime::UNIX_EPOCH,
            &fixture.connection,
        )
        .unwrap();
        let replacement = NewExpense::new(
            fixture.group_id,
            "Taxi",
            4500,
            ids[2],
            &[ids[1], ids[2]],
            &fixture.members,
        )
        .unwrap();

        update_expense(expense.id, &replacement, &fixture.connection).unwrap();

        let updated = get_expense(expense.id, &fixture.connection).unwrap();
        assert_eq!(updated.description, "Taxi");
        assert_eq!(updated.amount, 4500);
        assert_eq!(updated.payer_id, ids[2]);
        assert_eq!(updated.target_ids, vec![ids[1], ids[2]]);
        assert_eq!(updated.created_at, expense.created_at);
    }

    #[test]
    fn update_expense_fails_on_missing_expense() {
        let fixture = get_fixture();

        let result = update_expense(
            42,
            &fixture.new_expense(100, 0, &[0]),
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingExpense));
    }

    #[test]
    fn delete_expense_removes_expense_and_targets() {
        let fixture = get_fixture();
        let expense = create_expense(
            fixture.new_expense(100, 0, &[0, 1]),
            OffsetDateTime::UNIX_EPOCH,
            &fixture.connection,
        )
        .unwrap();

        let group_id = delete_expense(expense.id, &fixture.connection);

        assert_eq!(group_id, Ok(fixture.group_id));
        assert_eq!(get_expense(expense.id, &fixture.connection), Err(Error::NotFound));
        let target_count: i64 = fixture
            .connection
            .query_row("SELECT COUNT(*) FROM expense_target", [], |row| row.get(0))
            .unwrap();
        assert_eq!(target_count, 0);
    }

    #[test]
    fn delete_expense_fails_on_missing_expense() {
        let fixture = get_fixture();

        assert_eq!(
            delete_expense(42, &fixture.connection),
            Err(Error::DeleteMissingExpense)
        );
    }
}
