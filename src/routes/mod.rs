pub mod assets;
pub mod auth;
pub mod graphql;
pub mod home;
pub mod posts;
pub mod profile;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index))
        .route("/assets/{*path}", get(assets::serve))
        .merge(auth::router())
        .merge(posts::router())
        .merge(graphql::router())
        .merge(profile::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
