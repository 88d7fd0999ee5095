//! Loads everything the settlement engine needs to know about a group.

use rusqlite::Connection;

use crate::{
    Error,
    expense::{Expense, get_expenses},
    group::{Group, GroupId, get_group},
    member::{Member, MemberId, get_members},
    settlement::{Amount, Settlement, sum_amounts},
};

/// A group with its members in roster order and its expenses in the order
/// they were recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSnapshot {
    pub group: Group,
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
}

impl GroupSnapshot {
    /// Read a group, its members and its expenses from the database.
    ///
    /// The caller should hold the database lock for the whole call so the
    /// three reads see the same data.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the group does not exist.
    pub fn load(group_id: GroupId, connection: &Connection) -> Result<Self, Error> {
        let group = get_group(group_id, connection)?;
        let members = get_members(group_id, connection)?;
        let expenses = get_expenses(group_id, connection)?;

        Ok(Self {
            group,
            members,
            expenses,
        })
    }

    /// The sum of every expense amount in the group.
    pub fn total_spend(&self) -> Amount {
        sum_amounts(self.expenses.iter().map(|expense| expense.amount))
    }

    /// Look up the name of a member, falling back to their ID for members
    /// that are not in the group.
    pub fn member_name(&self, member_id: MemberId) -> String {
        self.members
            .iter()
            .find(|member| member.id == member_id)
            .map(|member| member.name.to_string())
            .unwrap_or_else(|| format!("#{member_id}"))
    }

    /// Run the settlement engine over the snapshot.
    pub fn settle(&self) -> Result<Settlement, Error> {
        Settlement::compute(&self.members, &self.expenses)
            .inspect_err(|error| {
                tracing::error!("could not settle group {}: {error}", self.group.id)
            })
    }
}
