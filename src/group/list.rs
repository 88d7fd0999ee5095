//! Groups listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    group::{db::get_group_summaries, domain::GroupSummary},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the groups listing page.
#[derive(Debug, Clone)]
pub struct GroupsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GroupsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the groups listing page, newest group first.
pub async fn get_groups_page(State(state): State<GroupsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let groups = get_group_summaries(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve groups: {error}"))?;

    Ok(groups_view(&groups).into_response())
}

fn groups_view(groups: &[GroupSummary]) -> Markup {
    let nav_bar = NavBar::new(endpoints::GROUPS_VIEW).into_html();

    let table_row = |summary: &GroupSummary| {
        let group_url = endpoints::format_endpoint(endpoints::GROUP_VIEW, summary.group.id);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(group_url) class=(LINK_STYLE) { (summary.group.name) }
                }

                td class=(TABLE_CELL_STYLE) { (summary.member_count) }

                td class=(TABLE_CELL_STYLE) { (summary.group.created_at.date()) }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-md mb-8"
            {
                h1 class="text-xl font-bold" { "New Group" }
                (create_group_form_view())
            }

            section class="space-y-4 w-full lg:max-w-5xl"
            {
                h2 class="text-xl font-bold" { "Groups" }

                table class="w-full text-sm text-left rtl:text-right
                    text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Members" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Created" }
                        }
                    }

                    tbody
                    {
                        @for summary in groups {
                            (table_row(summary))
                        }

                        @if groups.is_empty() {
                            tr
                            {
                                td
                                    colspan="3"
                                    class="px-6 py-4 text-center
                                        text-gray-500 dark:text-gray-400"
                                {
                                    "No groups yet. Create one above to start splitting expenses."
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Groups", &[], &content)
}

fn create_group_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_GROUP)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Group Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Weekend trip"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="members" class=(FORM_LABEL_STYLE) { "Members" }

                input
                    id="members"
                    type="text"
                    name="members"
                    placeholder="Alice, Bob, Carol"
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                {
                    "Separate names with commas. You can add more members later."
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Group" }
        }
    }
}
