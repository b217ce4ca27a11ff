use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use axum::extract::State;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;

use crate::extractors::SessionCookie;
use crate::graphql::SessionToken;
use crate::state::AppState;

/// GraphQL endpoint. Reads are open; mutations resolve the caller from the
/// session cookie.
async fn graphql_handler(
    State(state): State<AppState>,
    SessionCookie(token): SessionCookie,
    Json(req): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let request = match token {
        Some(token) => req.data(SessionToken(token)),
        None => req,
    };

    Json(state.schema.execute(request).await)
}

/// GraphQL Playground UI (development tool)
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/graphql/playground", get(graphql_playground))
}
