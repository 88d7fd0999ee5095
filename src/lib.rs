//! Warikan is a web app for splitting shared expenses within a group.
//!
//! Members of a group record who paid for what and who the expense was for.
//! The settlement engine then works out how much each member paid and owes,
//! and the smallest list of payments that settles everyone's balance.
//!
//! This library provides a REST API that directly serves HTML pages, plus a
//! JSON endpoint for the settlement of a group.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod group;
mod html;
mod internal_server_error;
mod logging;
mod member;
mod navigation;
mod not_found;
mod routing;
mod settlement;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use expense::{Expense, ExpenseId, MAX_EXPENSE_AMOUNT, NewExpense, create_expense};
pub use group::{Group, GroupId, GroupName, create_group};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use member::{Member, MemberId, MemberName, create_member};
pub use routing::build_router;
pub use settlement::{Amount, Balances, Settlement, SettlementEntry, Transfer, allocate, settle};
pub use timezone::get_local_offset;

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a group name.
    #[error("Group name cannot be empty")]
    EmptyGroupName,

    /// An empty string was used to create a member name.
    #[error("Member name cannot be empty")]
    EmptyMemberName,

    /// A member with the same name already exists in the group.
    #[error("the member \"{0}\" already exists in this group")]
    DuplicateMemberName(String),

    /// An expense was given an amount of zero or less, or more than
    /// [MAX_EXPENSE_AMOUNT].
    ///
    /// Amounts are whole numbers in the smallest currency unit.
    #[error("{0} is not a valid amount, the amount must be between 1 and {max}", max = expense::MAX_EXPENSE_AMOUNT)]
    InvalidAmount(Amount),

    /// An expense was submitted without anyone to split it between.
    #[error("an expense must be split between at least one member")]
    NoExpenseTargets,

    /// The payer or one of the targets of an expense is not a member of the
    /// expense's group.
    #[error("member {0} is not a member of this group")]
    InvalidMember(MemberId),

    /// The balances given to the settlement engine do not add up to zero.
    ///
    /// Every unit paid is owed by someone, so this only happens if the
    /// expenses refer to members outside of the group or have no targets.
    /// The value is how far the balances are from zero.
    #[error("the balances do not sum to zero (off by {0})")]
    UnbalancedLedger(Amount),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::EmptyGroupName | Error::EmptyMemberName | Error::NoExpenseTargets => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: self.to_string(),
                },
            ),
            Error::InvalidAmount(amount) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid amount".to_owned(),
                    details: format!(
                        "{amount} is not a valid amount. Enter a whole number from 1 to {}.",
                        expense::MAX_EXPENSE_AMOUNT
                    ),
                },
            ),
            Error::InvalidMember(member_id) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid member".to_owned(),
                    details: format!(
                        "Could not find a member with the ID {member_id} in this group. \
                        Try refreshing the page to get the latest list of members."
                    ),
                },
            ),
            Error::DuplicateMemberName(name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate member name".to_owned(),
                    details: format!(
                        "{name} is already a member of this group. Choose a different name."
                    ),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The group or member could not be found. \
                        Try refreshing the page to see if it has been deleted."
                        .to_owned(),
                },
            ),
            Error::UpdateMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update expense".to_owned(),
                    details: "The expense could not be found.".to_owned(),
                },
            ),
            Error::DeleteMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete expense".to_owned(),
                    details: "The expense could not be found. \
                        Try refreshing the page to see if the expense has already been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                        ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
