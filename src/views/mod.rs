pub mod pages;
pub mod post_list;

use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

pub use pages::{LoginTemplate, ProfilePageTemplate};
pub use post_list::{HeaderButton, PostListProps, PostListTemplate, PostRowView};

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}
