//! Splits expenses between members and totals what each member paid and owes.

use std::collections::HashMap;

use crate::{
    expense::Expense,
    member::{Member, MemberId},
    settlement::Amount,
};

/// How much a member has paid and owes across all of a group's expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlementEntry {
    /// The total of the expenses the member paid for.
    pub paid: Amount,
    /// The total of the member's shares of expenses.
    pub owed: Amount,
    /// `paid - owed`. Positive if the member is owed money, negative if they owe money.
    pub balance: Amount,
}

/// The [SettlementEntry] of every member of a group, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    entries: Vec<(MemberId, SettlementEntry)>,
}

impl Balances {
    /// Get the entry for `member_id`, or `None` if they were not in the roster.
    pub fn get(&self, member_id: MemberId) -> Option<&SettlementEntry> {
        self.entries
            .iter()
            .find(|(id, _)| *id == member_id)
            .map(|(_, entry)| entry)
    }

    /// Iterate over the members and their entries in roster order.
    pub fn iter(&self) -> impl Iterator<Item = (MemberId, &SettlementEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    /// The sum of all balances. Zero for a consistent group.
    pub fn total(&self) -> Amount {
        sum_amounts(self.entries.iter().map(|(_, entry)| entry.balance))
    }

    /// The number of members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(MemberId, SettlementEntry)> for Balances {
    fn from_iter<T: IntoIterator<Item = (MemberId, SettlementEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Total what each of `members` paid and owes across `expenses`.
///
/// Expenses are processed in the order given. The payer is credited with the
/// full amount, and the amount is split between the expense's targets with
/// [split_amount]. An expense without targets only counts towards what its
/// payer paid.
///
/// A payer or target that is not in `members` is skipped (with a warning),
/// which leaves the balances unbalanced. [settle](crate::settlement::settle)
/// reports that as an error.
///
/// An expense that would overflow a member's totals is ignored as a whole
/// and logged as an error, so the remaining balances still sum to zero.
pub fn allocate(members: &[Member], expenses: &[Expense]) -> Balances {
    let mut entries: Vec<(MemberId, SettlementEntry)> = members
        .iter()
        .map(|member| (member.id, SettlementEntry::default()))
        .collect();
    let roster_position: HashMap<MemberId, usize> = entries
        .iter()
        .enumerate()
        .map(|(position, (member_id, _))| (*member_id, position))
        .collect();

    for expense in expenses {
        let mut updated_entries = entries.clone();

        match add_expense(&mut updated_entries, &roster_position, expense) {
            Some(()) => entries = updated_entries,
            None => tracing::error!(
                "expense {} of {} would overflow the totals of its group, ignoring it",
                expense.id,
                expense.amount
            ),
        }
    }

    Balances { entries }
}

/// Credit the payer of `expense` and charge its targets their shares.
///
/// Returns `None` if any total overflows, in which case `entries` is left
/// partially updated and must be discarded.
fn add_expense(
    entries: &mut [(MemberId, SettlementEntry)],
    roster_position: &HashMap<MemberId, usize>,
    expense: &Expense,
) -> Option<()> {
    match roster_position.get(&expense.payer_id) {
        Some(&position) => {
            let entry = &mut entries[position].1;
            entry.paid = entry.paid.checked_add(expense.amount)?;
            entry.balance = entry.paid.checked_sub(entry.owed)?;
        }
        None => tracing::warn!(
            "expense {} was paid by member {} who is not in the group, ignoring its amount",
            expense.id,
            expense.payer_id
        ),
    }

    for (target_id, share) in split_amount(expense.amount, &expense.target_ids) {
        match roster_position.get(&target_id) {
            Some(&position) => {
                let entry = &mut entries[position].1;
                entry.owed = entry.owed.checked_add(share)?;
                entry.balance = entry.paid.checked_sub(entry.owed)?;
            }
            None => tracing::warn!(
                "expense {} is split with member {target_id} who is not in the group, \
                ignoring their share of {share}",
                expense.id
            ),
        }
    }

    Some(())
}

/// Add up `amounts` without overflowing, clamping the result to the range of
/// [Amount]. A clamped sum keeps its sign, so it is never mistaken for zero.
pub(crate) fn sum_amounts(amounts: impl IntoIterator<Item = Amount>) -> Amount {
    let total: i128 = amounts.into_iter().map(i128::from).sum();

    Amount::try_from(total).unwrap_or(if total < 0 { Amount::MIN } else { Amount::MAX })
}

/// Split `amount` evenly between `targets` in whole units.
///
/// Each target gets `amount / targets.len()` rounded down, and the first
/// `amount % targets.len()` targets get one more unit each, so the shares
/// always add up to `amount`. Returns nothing if `targets` is empty.
pub(crate) fn split_amount(
    amount: Amount,
    targets: &[MemberId],
) -> impl Iterator<Item = (MemberId, Amount)> + '_ {
    let target_count = targets.len() as Amount;
    let (share, remainder) = if target_count == 0 {
        (0, 0)
    } else {
        (
            amount.div_euclid(target_count),
            amount.rem_euclid(target_count),
        )
    };

    targets.iter().enumerate().map(move |(position, &target_id)| {
        let extra = if (position as Amount) < remainder { 1 } else { 0 };

        (target_id, share + extra)
    })
}
