//! Database operations for members.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    group::GroupId,
    member::{Member, MemberName},
};

/// Add a member called `name` to the group `group_id`.
///
/// # Errors
/// Returns [Error::DuplicateMemberName] if the group already has a member
/// with the same name, or [Error::NotFound] if the group does not exist.
pub fn create_member(
    group_id: GroupId,
    name: MemberName,
    connection: &Connection,
) -> Result<Member, Error> {
    connection
        .execute(
            "INSERT INTO member (group_id, name) VALUES (?1, ?2);",
            (group_id, name.as_ref()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateMemberName(name.to_string()),
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::NotFound,
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Member { id, group_id, name })
}

/// Retrieve the members of a group in roster order, i.e. the order they joined.
pub fn get_members(group_id: GroupId, connection: &Connection) -> Result<Vec<Member>, Error> {
    connection
        .prepare("SELECT id, group_id, name FROM member WHERE group_id = :group_id ORDER BY id ASC;")?
        .query_map(&[(":group_id", &group_id)], map_row)?
        .map(|maybe_member| maybe_member.map_err(|error| error.into()))
        .collect()
}

/// Initialize the member table.
///
/// Requires the group table to exist. Deleting a group deletes its members.
pub fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS member (
            id INTEGER PRIMARY KEY,
            group_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            UNIQUE(group_id, name),
            FOREIGN KEY(group_id) REFERENCES expense_group(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_member_group_id ON member(group_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Member, rusqlite::Error> {
    let id = row.get(0)?;
    let group_id = row.get(1)?;
    let raw_name: String = row.get(2)?;
    let name = MemberName::new_unchecked(&raw_name);

    Ok(Member { id, group_id, name })
}
