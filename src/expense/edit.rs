//! Expense editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{
        Expense, ExpenseId, NewExpense,
        form::{ExpenseForm, ExpenseFormAction, ExpenseFormView},
        get_expense, update_expense,
    },
    group::{Group, get_group},
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base, yen_input_styles},
    member::{Member, get_members},
    navigation::NavBar,
};

/// The state needed for the edit expense page and endpoint.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expense editing page.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, &connection)?;
    let group = get_group(expense.group_id, &connection)?;
    let members = get_members(expense.group_id, &connection)?;

    Ok(edit_expense_view(&expense, &group, &members).into_response())
}

/// Handle the expense editing form submission, redirecting to the group page on success.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpenseState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let group_id = match get_expense(expense_id, &connection) {
        Ok(expense) => expense.group_id,
        Err(Error::NotFound) => return Error::UpdateMissingExpense.into_alert_response(),
        Err(error) => {
            tracing::error!("could not load expense {expense_id}: {error}");
            return error.into_alert_response();
        }
    };

    let result = get_members(group_id, &connection)
        .and_then(|members| {
            NewExpense::new(
                group_id,
                &form.description,
                form.amount,
                form.payer_id,
                &form.target_ids,
                &members,
            )
        })
        .and_then(|new_expense| update_expense(expense_id, &new_expense, &connection));

    match result {
        Ok(()) => (
            HxRedirect(endpoints::format_endpoint(endpoints::GROUP_VIEW, group_id)),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::warn!("could not update expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_expense_view(expense: &Expense, group: &Group, members: &[Member]) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense.id);
    let group_url = endpoints::format_endpoint(endpoints::GROUP_VIEW, group.id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = ExpenseFormView {
        action: ExpenseFormAction::Update(&update_endpoint),
        members,
        description: &expense.description,
        amount: Some(expense.amount),
        payer_id: Some(expense.payer_id),
        target_ids: Some(expense.target_ids.as_slice()),
    }
    .into_html();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            header class="w-full flex justify-between items-end mb-4"
            {
                h1 class="text-xl font-bold" { "Edit Expense" }
                a href=(group_url) class=(LINK_STYLE) { "Back to " (group.name) }
            }

            (form)
        }
    };

    base("Edit Expense", &[yen_input_styles()], &content)
}
