//! Core group domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{DatabaseId, Error};

/// A validated, non-empty group name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupName(String);

impl GroupName {
    /// Create a group name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyGroupName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyGroupName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a group name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for GroupName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a group.
pub type GroupId = DatabaseId;

/// A set of people who share expenses, e.g. everyone on a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// The ID of the group.
    pub id: GroupId,
    /// The display name of the group.
    pub name: GroupName,
    /// When the group was created.
    pub created_at: OffsetDateTime,
}

/// A group with the number of members in it, for listing groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: Group,
    pub member_count: u32,
}
