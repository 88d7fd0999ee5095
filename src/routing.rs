//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_edit_expense_page,
        update_expense_endpoint,
    },
    group::{
        create_group_endpoint, get_group_page, get_group_settlement, get_groups_page,
    },
    internal_server_error::get_internal_server_error_page,
    member::create_member_endpoint,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::GROUPS_VIEW, get(get_groups_page))
        .route(endpoints::GROUP_VIEW, get(get_group_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(endpoints::POST_GROUP, post(create_group_endpoint))
        .route(endpoints::POST_MEMBER, post(create_member_endpoint))
        .route(endpoints::POST_EXPENSE, post(create_expense_endpoint))
        .route(
            endpoints::PUT_EXPENSE,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        )
        .route(endpoints::GROUP_SETTLEMENT_API, get(get_group_settlement));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the groups page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::GROUPS_VIEW)
}
