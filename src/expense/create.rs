//! Endpoint for recording an expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    expense::{NewExpense, create_expense, form::ExpenseForm},
    group::{GroupId, get_group},
    member::get_members,
    timezone::local_now,
};

/// The state needed for recording an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Handle the expense form submission, redirecting to the group page on success.
pub async fn create_expense_endpoint(
    Path(group_id): Path<GroupId>,
    State(state): State<CreateExpenseEndpointState>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let created_at = match local_now(&state.local_timezone) {
        Ok(created_at) => created_at,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let result = get_group(group_id, &connection)
        .and_then(|_| get_members(group_id, &connection))
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
        .and_then(|new_expense| create_expense(new_expense, created_at, &connection));

    match result {
        Ok(expense) => {
            tracing::debug!("recorded expense {} for group {group_id}", expense.id);

            (
                HxRedirect(endpoints::format_endpoint(endpoints::GROUP_VIEW, group_id)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::warn!("could not record expense for group {group_id}: {error}");
            error.into_alert_response()
        }
    }
}
