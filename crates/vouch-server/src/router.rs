use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use vouch_protocol::endpoints;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all vouch endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(handler::health))
        .route(endpoints::PUBLIC_KEY, get(handler::public_key))
        .route(endpoints::USERS, get(handler::list_users).post(handler::create_user))
        .route(endpoints::EXPORT, get(handler::export_users))
        .route(endpoints::USER_STATS, get(handler::user_stats))
        .route(
            endpoints::USER,
            get(handler::get_user)
                .patch(handler::update_user)
                .delete(handler::delete_user),
        )
        .fallback(handler::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
