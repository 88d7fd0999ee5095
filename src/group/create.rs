//! Endpoint for creating a group together with its first members.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints,
    group::{Group, GroupName, create_group},
    member::{MemberName, create_member, parse_member_names},
    timezone::local_now,
};

/// Form data for creating a group.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupForm {
    pub name: String,
    /// Comma separated member names, e.g. "Alice, Bob".
    #[serde(default)]
    pub members: String,
}

/// The state needed for creating a group.
#[derive(Debug, Clone)]
pub struct CreateGroupEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateGroupEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Handle the group creation form submission, redirecting to the new group's page.
pub async fn create_group_endpoint(
    State(state): State<CreateGroupEndpointState>,
    Form(form): Form<GroupForm>,
) -> Response {
    let name = match GroupName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };
    let member_names = parse_member_names(&form.members);

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

    match create_group_with_members(name, member_names, created_at, &connection) {
        Ok(group) => {
            tracing::info!("created group {} \"{}\"", group.id, group.name);

            (
                HxRedirect(endpoints::format_endpoint(endpoints::GROUP_VIEW, group.id)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a group: {error}");
            error.into_alert_response()
        }
    }
}

/// Create a group and its members in one transaction.
fn create_group_with_members(
    name: GroupName,
    member_names: Vec<MemberName>,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Group, Error> {
    let transaction = connection.unchecked_transaction()?;

    let group = create_group(name, created_at, &transaction)?;

    for member_name in member_names {
        create_member(group.id, member_name, &transaction)?;
    }

    transaction.commit()?;

    Ok(group)
}
