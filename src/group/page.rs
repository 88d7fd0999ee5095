//! The group page: members, expenses and how to settle up.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{Expense, ExpenseFormAction, ExpenseFormView},
    group::{GroupId, snapshot::GroupSnapshot},
    html::{
        MEMBER_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links, format_balance, format_yen,
        yen_input_styles,
    },
    member::add_member_form_view,
    navigation::NavBar,
    settlement::{Balances, Transfer, allocate, settle, split_amount},
};

/// The state needed for the group page.
#[derive(Debug, Clone)]
pub struct GroupPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GroupPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the page for a group.
///
/// If the group's balances cannot be settled, the rest of the page is still
/// rendered with a notice in place of the settlement plan.
pub async fn get_group_page(
    Path(group_id): Path<GroupId>,
    State(state): State<GroupPageState>,
) -> Result<Response, Error> {
    let snapshot = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        GroupSnapshot::load(group_id, &connection)?
    };

    let balances = allocate(&snapshot.members, &snapshot.expenses);
    let transfers = settle(&balances)
        .inspect_err(|error| tracing::error!("could not settle group {group_id}: {error}"));

    Ok(group_view(&snapshot, &balances, &transfers).into_response())
}

fn group_view(
    snapshot: &GroupSnapshot,
    balances: &Balances,
    transfers: &Result<Vec<Transfer>, Error>,
) -> Markup {
    let group = &snapshot.group;
    let group_url = endpoints::format_endpoint(endpoints::GROUP_VIEW, group.id);
    let nav_bar = NavBar::new(&group_url).into_html();
    let create_expense_endpoint = endpoints::format_endpoint(endpoints::POST_EXPENSE, group.id);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full lg:max-w-5xl space-y-8"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-2xl font-bold" { (group.name) }

                    p
                    {
                        "Total spend: "
                        span id="total-spend" class="font-semibold"
                        {
                            (format_yen(snapshot.total_spend()))
                        }
                    }
                }

                section id="members" class="space-y-2"
                {
                    h2 class="text-xl font-bold" { "Members" }

                    div class="flex flex-wrap gap-2"
                    {
                        @for member in &snapshot.members {
                            span class=(MEMBER_BADGE_STYLE) { (member.name) }
                        }
                    }

                    div class="max-w-md" { (add_member_form_view(group.id)) }
                }

                section id="new-expense" class="space-y-2 max-w-md"
                {
                    h2 class="text-xl font-bold" { "Add Expense" }

                    @if snapshot.members.is_empty() {
                        p class="text-gray-500 dark:text-gray-400"
                        {
                            "Add members to the group before recording expenses."
                        }
                    } @else {
                        (ExpenseFormView {
                            action: ExpenseFormAction::Create(&create_expense_endpoint),
                            members: &snapshot.members,
                            description: "",
                            amount: None,
                            payer_id: None,
                            target_ids: None,
                        }.into_html())
                    }
                }

                (summary_view(snapshot, balances))

                (plan_view(snapshot, transfers))

                (history_view(snapshot))
            }
        }
    );

    base(group.name.as_ref(), &[yen_input_styles()], &content)
}

fn summary_view(snapshot: &GroupSnapshot, balances: &Balances) -> Markup {
    html!(
        section id="summary" class="space-y-2"
        {
            h2 class="text-xl font-bold" { "Balances" }

            table class="w-full text-sm text-left rtl:text-right
                text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Member" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Paid" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Owed" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                    }
                }

                tbody
                {
                    @for (member_id, entry) in balances.iter() {
                        @let balance_style = if entry.balance < 0 {
                            "text-red-600 dark:text-red-400"
                        } else if entry.balance > 0 {
                            "text-green-600 dark:text-green-400"
                        } else {
                            ""
                        };

                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (snapshot.member_name(member_id)) }
                            td class=(TABLE_CELL_STYLE) { (format_yen(entry.paid)) }
                            td class=(TABLE_CELL_STYLE) { (format_yen(entry.owed)) }
                            td class=(format!("{TABLE_CELL_STYLE} {balance_style}"))
                            {
                                (format_balance(entry.balance))
                            }
                        }
                    }
                }
            }
        }
    )
}

fn plan_view(snapshot: &GroupSnapshot, transfers: &Result<Vec<Transfer>, Error>) -> Markup {
    html!(
        section id="plan" class="space-y-2"
        {
            h2 class="text-xl font-bold" { "How to Settle Up" }

            @match transfers {
                Ok(transfers) => {
                    @if transfers.is_empty() {
                        p class="text-gray-500 dark:text-gray-400" { "Everyone is settled up." }
                    } @else {
                        ol class="list-decimal list-inside space-y-1"
                        {
                            @for transfer in transfers {
                                li
                                {
                                    span class="font-semibold" { (snapshot.member_name(transfer.from)) }
                                    " pays "
                                    span class="font-semibold" { (snapshot.member_name(transfer.to)) }
                                    " "
                                    (format_yen(transfer.amount))
                                }
                            }
                        }
                    }
                }
                Err(error) => {
                    p
                        role="alert"
                        class="p-4 rounded bg-red-50 text-red-800 dark:bg-gray-800 dark:text-red-400"
                    {
                        "The balances of this group could not be settled: " (error) ". "
                        "Check that every expense is split between at least one member."
                    }
                }
            }
        }
    )
}

fn history_view(snapshot: &GroupSnapshot) -> Markup {
    let table_row = |expense: &Expense| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? The balances will be recalculated.",
            expense.description
        );
        let shares = split_amount(expense.amount, &expense.target_ids)
            .map(|(member_id, share)| {
                format!("{} {}", snapshot.member_name(member_id), format_yen(share))
            })
            .collect::<Vec<_>>()
            .join(", ");

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (expense.description) }
                td class=(TABLE_CELL_STYLE) { (format_yen(expense.amount)) }
                td class=(TABLE_CELL_STYLE) { (snapshot.member_name(expense.payer_id)) }
                td class=(TABLE_CELL_STYLE) { (shares) }
                td class=(TABLE_CELL_STYLE) { (expense.created_at.date()) }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(&edit_url, &delete_url, &confirm_message))
                    }
                }
            }
        )
    };

    html!(
        section id="history" class="space-y-2"
        {
            h2 class="text-xl font-bold" { "Expenses" }

            table class="w-full text-sm text-left rtl:text-right
                text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Paid by" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Split between" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in &snapshot.expenses {
                        (table_row(expense))
                    }

                    @if snapshot.expenses.is_empty() {
                        tr
                        {
                            td
                                colspan="6"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No expenses recorded yet."
                            }
                        }
                    }
                }
            }
        }
    )
}
