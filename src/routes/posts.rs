use axum::extract::State;
use axum::response::Redirect;
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::{CurrentUser, SessionCookie};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewPostForm {
    pub content: String,
}

/// Publish a post from the composer, then go back to the author's profile.
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    SessionCookie(token): SessionCookie,
    Form(form): Form<NewPostForm>,
) -> AppResult<Redirect> {
    let post = state
        .backend(token)
        .create_post(&form.content)
        .await?;
    tracing::info!(author = %user.username, post_id = %post.id, "post created");

    Ok(Redirect::to(&format!("/{}", user.username)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/posts", post(create))
}
