//! Matches debtors with creditors to settle a group's balances.

use std::cmp::Reverse;

use serde::Serialize;

use crate::{
    Error,
    member::MemberId,
    settlement::{Amount, Balances, sum_amounts},
};

/// A payment from one member to another that settles (part of) their balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transfer {
    /// The member who owes money.
    pub from: MemberId,
    /// The member who is owed money.
    pub to: MemberId,
    /// How much `from` should pay `to`. Always positive.
    pub amount: Amount,
}

/// Work out the payments that bring every balance in `balances` to zero.
///
/// Debtors (negative balance) are sorted from the largest debt to the
/// smallest, and creditors (positive balance) from the largest credit to the
/// smallest. The two lists are then swept in step: the current debtor pays the
/// current creditor as much as possible, and whoever reaches zero is skipped.
/// Each payment settles at least one member, so there are at most
/// `debtors + creditors - 1` transfers.
///
/// The sorts are stable, so members with equal balances keep their roster
/// order and the result is deterministic.
///
/// # Errors
/// Returns [Error::UnbalancedLedger] if the balances do not sum to zero,
/// since no set of transfers could settle them.
pub fn settle(balances: &Balances) -> Result<Vec<Transfer>, Error> {
    let total = balances.total();

    if total != 0 {
        tracing::error!("cannot settle balances that sum to {total}");
        return Err(Error::UnbalancedLedger(total));
    }

    let mut debtors: Vec<(MemberId, Amount)> = balances
        .iter()
        .filter(|(_, entry)| entry.balance < 0)
        .map(|(member_id, entry)| (member_id, entry.balance))
        .collect();
    let mut creditors: Vec<(MemberId, Amount)> = balances
        .iter()
        .filter(|(_, entry)| entry.balance > 0)
        .map(|(member_id, entry)| (member_id, entry.balance))
        .collect();

    debtors.sort_by_key(|&(_, balance)| balance);
    creditors.sort_by_key(|&(_, balance)| Reverse(balance));

    let mut transfers = Vec::with_capacity((debtors.len() + creditors.len()).saturating_sub(1));
    let mut debtor_index = 0;
    let mut creditor_index = 0;

    while debtor_index < debtors.len() && creditor_index < creditors.len() {
        let (debtor_id, debt) = &mut debtors[debtor_index];
        let (creditor_id, credit) = &mut creditors[creditor_index];
        let amount = debt.saturating_neg().min(*credit);

        if amount > 0 {
            transfers.push(Transfer {
                from: *debtor_id,
                to: *creditor_id,
                amount,
            });

            *debt += amount;
            *credit -= amount;
        }

        if *debt == 0 {
            debtor_index += 1;
        }

        if *credit == 0 {
            creditor_index += 1;
        }
    }

    if debtor_index < debtors.len() || creditor_index < creditors.len() {
        let unsettled = sum_amounts(
            debtors[debtor_index..]
                .iter()
                .chain(&creditors[creditor_index..])
                .map(|&(_, balance)| balance),
        );
        tracing::error!("settlement ended with {unsettled} left unsettled");
        return Err(Error::UnbalancedLedger(unsettled));
    }

    tracing::debug!(
        "settled {} members with {} transfers",
        balances.len(),
        transfers.len()
    );

    Ok(transfers)
}
