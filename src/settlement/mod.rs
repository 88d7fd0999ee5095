//! The settlement engine.
//!
//! Settling a group happens in two steps:
//! 1. [allocate] totals what each member paid and owes across the group's
//!    expenses, splitting each expense between its targets in whole units.
//! 2. [settle] matches the members that owe money with the members that are
//!    owed money, producing as few transfers as possible.
//!
//! Both steps are pure functions of a snapshot of the group, so calling them
//! twice with the same members and expenses gives the same result, down to
//! the order of the transfers.

mod allocation;
mod matching;

pub use allocation::{Balances, SettlementEntry, allocate};
pub(crate) use allocation::{split_amount, sum_amounts};
pub use matching::{Transfer, settle};

use crate::{Error, expense::Expense, member::Member};

/// An amount of money in the smallest unit of the currency, e.g. yen.
pub type Amount = i64;

/// The balances of a group's members together with the transfers that settle them.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// What each member paid, owes, and their net balance, in roster order.
    pub balances: Balances,
    /// The payments that bring every balance to zero, in the order they were matched.
    pub transfers: Vec<Transfer>,
}

impl Settlement {
    /// Allocate `expenses` between `members` and work out how to settle up.
    ///
    /// `members` must be in roster order and `expenses` in the order they
    /// were recorded, since both orders decide who pays the remainder of an
    /// uneven split and which transfer comes first.
    ///
    /// [allocate] never fails, even on an expense without targets. Such an
    /// expense is credited to its payer but owed by no one, so the balances no
    /// longer sum to zero and [settle] refuses to produce a plan for them.
    ///
    /// # Errors
    /// Returns [Error::UnbalancedLedger] if the allocated balances do not sum
    /// to zero, see [settle].
    pub fn compute(members: &[Member], expenses: &[Expense]) -> Result<Self, Error> {
        let balances = allocate(members, expenses);
        let transfers = settle(&balances)?;

        Ok(Self {
            balances,
            transfers,
        })
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::{
        Error,
        expense::Expense,
        member::{Member, MemberId, MemberName},
        settlement::{Settlement, SettlementEntry, Transfer},
    };

    fn member(id: MemberId, name: &str) -> Member {
        Member {
            id,
            group_id: 1,
            name: MemberName::new_unchecked(name),
        }
    }

    fn expense(amount: i64, payer_id: MemberId, target_ids: &[MemberId]) -> Expense {
        Expense {
            id: 0,
            group_id: 1,
            description: "test".to_owned(),
            amount,
            payer_id,
            target_ids: target_ids.to_vec(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn settles_two_expenses_between_two_members() {
        let members = [member(1, "A"), member(2, "B")];
        let expenses = [expense(50, 1, &[1, 2]), expense(30, 2, &[1, 2])];

        let settlement = Settlement::compute(&members, &expenses).unwrap();

        assert_eq!(
            settlement.balances.get(1),
            Some(&SettlementEntry {
                paid: 50,
                owed: 40,
                balance: 10
            })
        );
        assert_eq!(
            settlement.balances.get(2),
            Some(&SettlementEntry {
                paid: 30,
                owed: 40,
                balance: -10
            })
        );
        assert_eq!(
            settlement.transfers,
            vec![Transfer {
                from: 2,
                to: 1,
                amount: 10
            }]
        );
    }

    #[test]
    fn compute_is_idempotent() {
        let members = [member(1, "A"), member(2, "B"), member(3, "C"), member(4, "D")];
        let expenses = [
            expense(1000, 1, &[1, 2, 3, 4]),
            expense(333, 2, &[3, 4]),
            expense(71, 4, &[1, 2, 3]),
        ];

        let first = Settlement::compute(&members, &expenses);
        let second = Settlement::compute(&members, &expenses);

        assert!(first.is_ok());
        assert_eq!(first, second);
    }

    #[test]
    fn expense_without_targets_leaves_an_unbalanced_ledger() {
        let members = [member(1, "A"), member(2, "B")];
        let expenses = [expense(100, 1, &[])];

        let settlement = Settlement::compute(&members, &expenses);

        assert_eq!(settlement, Err(Error::UnbalancedLedger(100)));
    }
}
