//! Database operations for groups.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    group::{Group, GroupId, GroupName, domain::GroupSummary},
};

/// Create a group and return it with its generated ID.
pub fn create_group(
    name: GroupName,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Group, Error> {
    connection.execute(
        "INSERT INTO expense_group (name, created_at) VALUES (?1, ?2);",
        (name.as_ref(), created_at),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Group {
        id,
        name,
        created_at,
    })
}

/// Retrieve a single group by ID.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `group_id` does not refer to a valid group,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_group(group_id: GroupId, connection: &Connection) -> Result<Group, Error> {
    connection
        .prepare("SELECT id, name, created_at FROM expense_group WHERE id = :id;")?
        .query_row(&[(":id", &group_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve every group with its member count, newest first.
pub fn get_group_summaries(connection: &Connection) -> Result<Vec<GroupSummary>, Error> {
    connection
        .prepare(
            "SELECT g.id, g.name, g.created_at, COUNT(m.id)
            FROM expense_group g
            LEFT JOIN member m ON m.group_id = g.id
            GROUP BY g.id
            ORDER BY g.created_at DESC, g.id DESC;",
        )?
        .query_map([], |row| {
            let group = map_row(row)?;
            let member_count = row.get(3)?;

            Ok(GroupSummary {
                group,
                member_count,
            })
        })?
        .map(|maybe_summary| maybe_summary.map_err(|error| error.into()))
        .collect()
}

/// Initialize the group table.
///
/// The table is called `expense_group` since `group` is an SQL keyword.
pub fn create_group_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense_group (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Group, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = GroupName::new_unchecked(&raw_name);
    let created_at = row.get(2)?;

    Ok(Group {
        id,
        name,
        created_at,
    })
}
