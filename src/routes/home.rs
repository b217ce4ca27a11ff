use axum::response::{IntoResponse, Redirect, Response};

use crate::extractors::MaybeUser;
use crate::views::{Html, LoginTemplate};

/// Signed-in users land on their own profile; everyone else gets the sign-in form.
pub async fn index(MaybeUser(user): MaybeUser) -> Response {
    match user {
        Some(user) => Redirect::to(&format!("/{}", user.username)).into_response(),
        None => Html(LoginTemplate { error: None }).into_response(),
    }
}
