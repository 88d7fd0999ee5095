//! Core expense domain types and validation.

use time::OffsetDateTime;

use crate::{
    DatabaseId, Error,
    group::GroupId,
    member::{Member, MemberId},
    settlement::Amount,
};

/// Database identifier for an expense.
pub type ExpenseId = DatabaseId;

/// The largest amount a single expense may have, one trillion in the smallest
/// currency unit.
///
/// Keeps the sums in the settlement engine far from `i64` overflow and
/// every amount exactly representable as an `f64` for formatting.
pub const MAX_EXPENSE_AMOUNT: Amount = 1_000_000_000_000;

/// Money one member paid on behalf of some members of their group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    /// The ID of the expense. Also decides the order expenses are settled in.
    pub id: ExpenseId,
    /// The group the expense belongs to.
    pub group_id: GroupId,
    /// What the money was spent on.
    pub description: String,
    /// How much was paid, in the smallest currency unit.
    pub amount: Amount,
    /// The member who paid.
    pub payer_id: MemberId,
    /// The members the expense is split between, in the order they were attached.
    ///
    /// The order decides who pays the remainder of an uneven split.
    pub target_ids: Vec<MemberId>,
    /// When the expense was recorded.
    pub created_at: OffsetDateTime,
}

/// A validated expense that has not been saved yet.
///
/// To create a `NewExpense`, use [NewExpense::new].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub(super) group_id: GroupId,
    pub(super) description: String,
    pub(super) amount: Amount,
    pub(super) payer_id: MemberId,
    pub(super) target_ids: Vec<MemberId>,
}

impl NewExpense {
    /// Validate an expense for the group `group_id`, whose members are `members`.
    ///
    /// The description is trimmed and repeated target IDs are collapsed,
    /// keeping the first occurrence.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if `amount` is zero, negative or greater than
    ///   [MAX_EXPENSE_AMOUNT],
    /// - [Error::NoExpenseTargets] if `target_ids` is empty,
    /// - or [Error::InvalidMember] if the payer or a target is not in `members`
    ///   or belongs to another group.
    pub fn new(
        group_id: GroupId,
        description: &str,
        amount: Amount,
        payer_id: MemberId,
        target_ids: &[MemberId],
        members: &[Member],
    ) -> Result<Self, Error> {
        if !(1..=MAX_EXPENSE_AMOUNT).contains(&amount) {
            return Err(Error::InvalidAmount(amount));
        }

        if target_ids.is_empty() {
            return Err(Error::NoExpenseTargets);
        }

        let is_group_member = |member_id: MemberId| {
            members
                .iter()
                .any(|member| member.id == member_id && member.group_id == group_id)
        };

        if !is_group_member(payer_id) {
            return Err(Error::InvalidMember(payer_id));
        }

        let mut unique_target_ids = Vec::with_capacity(target_ids.len());

        for &target_id in target_ids {
            if !is_group_member(target_id) {
                return Err(Error::InvalidMember(target_id));
            }

            if !unique_target_ids.contains(&target_id) {
                unique_target_ids.push(target_id);
            }
        }

        Ok(Self {
            group_id,
            description: description.trim().to_owned(),
            amount,
            payer_id,
            target_ids: unique_target_ids,
        })
    }
}
