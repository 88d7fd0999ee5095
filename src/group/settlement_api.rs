//! JSON endpoint for the balances and settlement plan of a group.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    group::{GroupId, snapshot::GroupSnapshot},
    member::MemberId,
    settlement::{Amount, Transfer},
};

/// The state needed for the settlement API.
#[derive(Debug, Clone)]
pub struct SettlementApiState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettlementApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SettlementResponse {
    group_id: GroupId,
    total_spend: Amount,
    members: Vec<MemberBalance>,
    transfers: Vec<Transfer>,
}

#[derive(Debug, Serialize)]
struct MemberBalance {
    member_id: MemberId,
    name: String,
    paid: Amount,
    owed: Amount,
    balance: Amount,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Get the balances of a group's members and the transfers that settle them.
pub async fn get_group_settlement(
    Path(group_id): Path<GroupId>,
    State(state): State<SettlementApiState>,
) -> Response {
    let snapshot = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return json_error(Error::DatabaseLockError);
            }
        };

        match GroupSnapshot::load(group_id, &connection) {
            Ok(snapshot) => snapshot,
            Err(error) => return json_error(error),
        }
    };

    let settlement = match snapshot.settle() {
        Ok(settlement) => settlement,
        Err(error) => return json_error(error),
    };

    let members = settlement
        .balances
        .iter()
        .map(|(member_id, entry)| MemberBalance {
            member_id,
            name: snapshot.member_name(member_id),
            paid: entry.paid,
            owed: entry.owed,
            balance: entry.balance,
        })
        .collect();

    Json(SettlementResponse {
        group_id,
        total_spend: snapshot.total_spend(),
        members,
        transfers: settlement.transfers,
    })
    .into_response()
}

fn json_error(error: Error) -> Response {
    let status_code = match error {
        Error::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status_code,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
