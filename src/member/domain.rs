//! Core member domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{DatabaseId, Error, group::GroupId};

/// A validated, non-empty member name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct MemberName(String);

impl MemberName {
    /// Create a member name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyMemberName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyMemberName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a member name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for MemberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for MemberName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberName::new(s)
    }
}

impl Display for MemberName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a member.
pub type MemberId = DatabaseId;

/// A person in a group who pays for expenses and shares in them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    /// The member's ID, which also decides their place in the group's roster.
    pub id: MemberId,
    /// The group the member belongs to.
    pub group_id: GroupId,
    /// The member's display name, unique within the group.
    pub name: MemberName,
}

/// Parse a comma separated list of member names, e.g. "Alice, Bob,Carol".
///
/// Blank entries are dropped, and only the first occurrence of a name is kept.
pub fn parse_member_names(text: &str) -> Vec<MemberName> {
    let mut names: Vec<MemberName> = Vec::new();

    for name in text.split(',').filter_map(|name| name.parse::<MemberName>().ok()) {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    names
}
