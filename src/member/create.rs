//! Endpoint and form for adding a member to a group.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    group::GroupId,
    html::{BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE},
    member::{MemberName, create_member},
};

/// Form data for adding a member.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberForm {
    pub name: String,
}

/// The state needed for adding a member.
#[derive(Debug, Clone)]
pub struct CreateMemberEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateMemberEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle the add member form submission, redirecting to the group page on success.
pub async fn create_member_endpoint(
    Path(group_id): Path<GroupId>,
    State(state): State<CreateMemberEndpointState>,
    Form(form): Form<MemberForm>,
) -> Response {
    let name = match MemberName::new(&form.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_member(group_id, name, &connection) {
        Ok(member) => {
            tracing::debug!("added member {} to group {group_id}", member.id);

            (
                HxRedirect(endpoints::format_endpoint(endpoints::GROUP_VIEW, group_id)),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::DuplicateMemberName(_)) | Err(error @ Error::NotFound) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while adding a member: {error}");
            error.into_alert_response()
        }
    }
}

/// The inline form on the group page for adding a member.
pub(crate) fn add_member_form_view(group_id: GroupId) -> Markup {
    let endpoint = endpoints::format_endpoint(endpoints::POST_MEMBER, group_id);

    html! {
        form
            hx-post=(endpoint)
            hx-target-error="#alert-container"
            class="flex gap-2 w-full"
        {
            input
                type="text"
                name="name"
                placeholder="New member"
                aria-label="New member name"
                required
                class=(FORM_TEXT_INPUT_STYLE);

            div class="w-32"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add" }
            }
        }
    }
}

#[cfg(test)]
mod create_member_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Html;
    use time::OffsetDateTime;

    use crate::{
        db::initialize,
        endpoints,
        group::{GroupName, create_group},
        member::{MemberName, get_members},
        test_utils::{
            assert_form_input, assert_hx_endpoint, assert_hx_redirect, assert_valid_html,
            must_get_form, parse_html_fragment,
        },
    };

    use super::{CreateMemberEndpointState, MemberForm, add_member_form_view, create_member_endpoint};

    fn get_state() -> (CreateMemberEndpointState, i64) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let group = create_group(
            GroupName::new_unchecked("Trip"),
            OffsetDateTime::UNIX_EPOCH,
            &connection,
        )
        .unwrap();

        let state = CreateMemberEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, group.id)
    }

    fn form(name: &str) -> Form<MemberForm> {
        Form(MemberForm {
            name: name.to_owned(),
        })
    }

    #[tokio::test]
    async fn can_add_member() {
        let (state, group_id) = get_state();

        let response = create_member_endpoint(Path(group_id), State(state.clone()), form(" Alice "))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(
            &response,
            &endpoints::format_endpoint(endpoints::GROUP_VIEW, group_id),
        );
        let members = get_members(group_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, MemberName::new_unchecked("Alice"));
    }

    #[tokio::test]
    async fn rejects_empty_name() {
        let (state, group_id) = get_state();

        let response = create_member_endpoint(Path(group_id), State(state), form("   "))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("Member name cannot be empty"));
    }

    #[tokio::test]
    async fn rejects_duplicate_name() {
        let (state, group_id) = get_state();
        create_member_endpoint(Path(group_id), State(state.clone()), form("Alice")).await;

        let response = create_member_endpoint(Path(group_id), State(state.clone()), form("Alice"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains("Duplicate member name"));
        let members = get_members(group_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn missing_group_is_not_found() {
        let (state, _) = get_state();

        let response = create_member_endpoint(Path(42), State(state), form("Alice"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn add_member_form_posts_to_group() {
        let html = Html::parse_fragment(&add_member_form_view(7).into_string());

        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/groups/7/members", "hx-post");
        assert_form_input(&form, "name", "text");
    }
}
