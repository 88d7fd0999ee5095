use proptest::prelude::*;
use time::OffsetDateTime;
use warikan_rs::{
    Expense, Member, MemberId, MemberName, Settlement, Transfer, allocate, settle,
};

fn roster(member_count: usize) -> Vec<Member> {
    (1..=member_count as MemberId)
        .map(|id| Member {
            id,
            group_id: 1,
            name: MemberName::new_unchecked(&format!("member {id}")),
        })
        .collect()
}

/// Build expenses from raw indexes, wrapping them into the roster so that
/// every payer and target is a member of the group.
fn expenses(
    member_count: usize,
    amounts: &[i64],
    payer_indexes: &[usize],
    target_masks: &[usize],
) -> Vec<Expense> {
    amounts
        .iter()
        .zip(payer_indexes)
        .zip(target_masks)
        .enumerate()
        .map(|(idx, ((&amount, &payer_idx), &mask))| {
            let mut target_ids: Vec<MemberId> = (0..member_count)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| bit as MemberId + 1)
                .collect();
            if target_ids.is_empty() {
                target_ids.push((mask % member_count) as MemberId + 1);
            }

            Expense {
                id: idx as i64 + 1,
                group_id: 1,
                description: format!("expense {idx}"),
                amount,
                payer_id: (payer_idx % member_count) as MemberId + 1,
                target_ids,
                created_at: OffsetDateTime::UNIX_EPOCH,
            }
        })
        .collect()
}

fn apply_transfers(settlement: &Settlement) -> Vec<(MemberId, i64)> {
    let mut remaining: Vec<(MemberId, i64)> = settlement
        .balances
        .iter()
        .map(|(member_id, entry)| (member_id, entry.balance))
        .collect();

    for Transfer { from, to, amount } in &settlement.transfers {
        for (member_id, balance) in &mut remaining {
            if member_id == from {
                *balance += amount;
            } else if member_id == to {
                *balance -= amount;
            }
        }
    }

    remaining
}

proptest! {
    #[test]
    fn balances_sum_to_zero(
        member_count in 1usize..=6,
        amounts in prop::collection::vec(1i64..=100_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 30),
        target_masks in prop::collection::vec(0usize..=63, 30),
    ) {
        let members = roster(member_count);
        let expenses = expenses(member_count, &amounts, &payer_indexes, &target_masks);

        let balances = allocate(&members, &expenses);

        prop_assert_eq!(balances.total(), 0);
        let paid: i64 = balances.iter().map(|(_, entry)| entry.paid).sum();
        let owed: i64 = balances.iter().map(|(_, entry)| entry.owed).sum();
        let spend: i64 = expenses.iter().map(|expense| expense.amount).sum();
        prop_assert_eq!(paid, spend);
        prop_assert_eq!(owed, spend);
    }
}

proptest! {
    #[test]
    fn uneven_split_differs_by_at_most_one_unit(
        member_count in 1usize..=8,
        amount in 1i64..=10_000,
        targets in Just((1..=8).collect::<Vec<MemberId>>()).prop_shuffle(),
        target_count in 1usize..=8,
    ) {
        let members = roster(member_count);
        let target_ids: Vec<MemberId> = targets
            .into_iter()
            .filter(|&id| id <= member_count as MemberId)
            .take(target_count)
            .collect();
        let expense = Expense {
            id: 1,
            group_id: 1,
            description: "split".to_owned(),
            amount,
            payer_id: 1,
            target_ids: target_ids.clone(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let balances = allocate(&members, &[expense]);

        let shares: Vec<i64> = target_ids
            .iter()
            .map(|&id| balances.get(id).map_or(0, |entry| entry.owed))
            .collect();
        let base = amount / target_ids.len() as i64;
        let remainder = (amount % target_ids.len() as i64) as usize;
        for (position, share) in shares.iter().enumerate() {
            let expected = if position < remainder { base + 1 } else { base };
            prop_assert_eq!(*share, expected);
        }
    }
}

proptest! {
    #[test]
    fn transfers_settle_every_balance(
        member_count in 1usize..=6,
        amounts in prop::collection::vec(1i64..=100_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 30),
        target_masks in prop::collection::vec(0usize..=63, 30),
    ) {
        let members = roster(member_count);
        let expenses = expenses(member_count, &amounts, &payer_indexes, &target_masks);

        let settlement = Settlement::compute(&members, &expenses).expect("balances sum to zero");

        prop_assert!(apply_transfers(&settlement).iter().all(|&(_, balance)| balance == 0));

        let unsettled_members = settlement
            .balances
            .iter()
            .filter(|(_, entry)| entry.balance != 0)
            .count();
        prop_assert!(settlement.transfers.len() <= unsettled_members.saturating_sub(1));

        for transfer in &settlement.transfers {
            prop_assert!(transfer.amount > 0);
            prop_assert!(settlement.balances.get(transfer.from).is_some_and(|entry| entry.balance < 0));
            prop_assert!(settlement.balances.get(transfer.to).is_some_and(|entry| entry.balance > 0));
        }
    }
}

proptest! {
    #[test]
    fn settling_is_deterministic(
        member_count in 1usize..=6,
        amounts in prop::collection::vec(1i64..=100_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 30),
        target_masks in prop::collection::vec(0usize..=63, 30),
    ) {
        let members = roster(member_count);
        let expenses = expenses(member_count, &amounts, &payer_indexes, &target_masks);

        let balances = allocate(&members, &expenses);

        prop_assert_eq!(&balances, &allocate(&members, &expenses));
        prop_assert_eq!(settle(&balances), settle(&balances));
    }
}
