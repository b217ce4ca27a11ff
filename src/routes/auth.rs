use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;

use crate::auth::{self, session, AuthError};
use crate::error::AppResult;
use crate::extractors::SessionCookie;
use crate::state::AppState;
use crate::views::{Html, LoginTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
}

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name,
        token,
        max_age_hours * 3600
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

/// Sign in by username, creating the account on first use.
async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let username = match auth::validate_username(&form.username) {
        Ok(username) => username,
        Err(AuthError::InvalidUsername(raw)) => {
            tracing::debug!(username = %raw, "rejected username");
            let page = Html(LoginTemplate {
                error: Some("Usernames use letters, digits, '_' or '-'.".to_string()),
            });
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let user_id = session::ensure_user(&state.db, &username)?;
    let token = session::create_session(&state.db, &user_id, state.config.auth.session_hours)?;
    tracing::info!(%username, "signed in");

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, format!("/{}", username)),
            (
                header::SET_COOKIE,
                session_cookie(
                    &state.config.auth.cookie_name,
                    &token,
                    state.config.auth.session_hours,
                ),
            ),
        ],
        "",
    )
        .into_response())
}

async fn logout(
    State(state): State<AppState>,
    SessionCookie(token): SessionCookie,
) -> AppResult<Response> {
    if let Some(token) = token {
        let _ = session::delete_session(&state.db, &token);
    }

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (
                header::SET_COOKIE,
                clear_session_cookie(&state.config.auth.cookie_name),
            ),
        ],
        "",
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}
