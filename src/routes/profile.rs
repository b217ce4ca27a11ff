use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::extractors::{CurrentUser, MaybeUser, SessionCookie};
use crate::profile::ProfileController;
use crate::state::AppState;
use crate::views::{HeaderButton, Html, PostListProps, PostListTemplate, ProfilePageTemplate};

/// Mount a fresh view of `user_id`'s profile and render it.
async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    SessionCookie(token): SessionCookie,
) -> AppResult<Html<ProfilePageTemplate>> {
    let profile_id = auth::validate_username(&user_id).map_err(|_| AppError::NotFound)?;

    let backend = Arc::new(state.backend(token));
    let controller = Arc::new(ProfileController::new(
        profile_id.as_str(),
        backend,
        state.config.feed.page_size,
    ));
    controller.mount().await;

    let viewer = controller.store().viewer().await.map(|v| v.username);
    let (view_id, evicted) = state
        .views
        .lock()
        .await
        .register(controller.clone(), viewer.clone());
    if let Some(old) = evicted {
        old.unmount().await;
    }
    tracing::debug!(profile = %profile_id, %view_id, "view mounted");

    let list = render_list(&view_id, &controller).await;
    Ok(Html(ProfilePageTemplate::new(
        &view_id,
        &profile_id,
        viewer,
        list,
    )))
}

async fn list(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> AppResult<Html<PostListTemplate>> {
    let controller = lookup(&state, &view_id).await?;
    Ok(Html(render_list(&view_id, &controller).await))
}

async fn load_more(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> AppResult<Html<PostListTemplate>> {
    let controller = lookup(&state, &view_id).await?;
    if !controller.load_more().await {
        tracing::debug!(%view_id, "read more ignored");
    }
    Ok(Html(render_list(&view_id, &controller).await))
}

async fn follow(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Html<PostListTemplate>> {
    let controller = lookup(&state, &view_id).await?;
    authorize_viewer(&controller, user).await?;
    controller.follow().await?;
    Ok(Html(render_list(&view_id, &controller).await))
}

async fn unfollow(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Html<PostListTemplate>> {
    let controller = lookup(&state, &view_id).await?;
    authorize_viewer(&controller, user).await?;
    controller.unfollow().await?;
    Ok(Html(render_list(&view_id, &controller).await))
}

/// Drop the view and close its live feed. Unknown ids are fine; the page
/// may already have been evicted.
async fn unmount(State(state): State<AppState>, Path(view_id): Path<String>) -> StatusCode {
    let removed = state.views.lock().await.remove(&view_id);
    if let Some(controller) = removed {
        controller.unmount().await;
    }
    StatusCode::NO_CONTENT
}

/// One `feed-changed` event per store change, so the page can re-fetch its list.
async fn events(
    State(state): State<AppState>,
    Path(view_id): Path<String>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let controller = lookup(&state, &view_id).await?;
    let changes = WatchStream::from_changes(controller.store().changes());

    let stream = changes.map(|version| {
        Ok::<_, Infallible>(
            Event::default()
                .event("feed-changed")
                .data(version.to_string()),
        )
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

async fn lookup(state: &AppState, view_id: &str) -> AppResult<Arc<ProfileController>> {
    state
        .views
        .lock()
        .await
        .get(view_id)
        .ok_or(AppError::NotFound)
}

/// Follow changes act as the view's viewer, so only that viewer's own
/// session may make them.
async fn authorize_viewer(
    controller: &ProfileController,
    user: Option<CurrentUser>,
) -> AppResult<()> {
    let viewer = controller.store().viewer().await;
    match (user, viewer) {
        (Some(user), Some(viewer)) if user.username == viewer.username => Ok(()),
        _ => {
            tracing::warn!(profile = %controller.profile_id(), "follow change from another session");
            Err(AppError::Unauthorized)
        }
    }
}

async fn render_list(view_id: &str, controller: &ProfileController) -> PostListTemplate {
    let snapshot = controller.store().snapshot().await;
    let header_button = controller
        .header_action()
        .await
        .map(|action| HeaderButton::for_view(action, view_id));
    let load_more_url = format!("/views/{}/more", view_id);

    PostListTemplate::new(PostListProps {
        is_loading: snapshot.is_loading,
        posts: &snapshot.posts,
        load_more_url: &load_more_url,
        title: controller.profile_id(),
        header_button,
        error: snapshot.error.as_deref(),
        now: Utc::now(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(show))
        .route("/views/{view_id}/list", get(list))
        .route("/views/{view_id}/more", post(load_more))
        .route("/views/{view_id}/follow", post(follow))
        .route("/views/{view_id}/unfollow", post(unfollow))
        .route("/views/{view_id}/unmount", post(unmount))
        .route("/views/{view_id}/events", get(events))
}
