use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use askama::Template;
use async_trait::async_trait;
use feedline::backend::{
    Backend, BackendError, ContinuationToken, FollowKey, Identity, Post, PostPage, PostQuery,
    PostSubscription, Relationship,
};
use feedline::feed::Cursor;
use feedline::profile::{FetchKind, HeaderAction, ProfileController};
use feedline::views::{PostListProps, PostListTemplate};
use tokio::sync::mpsc;

/// Scripted backend: pages are served in order and every call is recorded.
#[derive(Default)]
struct FakeBackend {
    viewer: Option<String>,
    following: bool,
    pages: Mutex<VecDeque<Result<PostPage, BackendError>>>,
    queries: Mutex<Vec<PostQuery>>,
    follow_results: Mutex<VecDeque<Result<bool, BackendError>>>,
    follow_calls: Mutex<Vec<(&'static str, FollowKey)>>,
    live: Mutex<Option<mpsc::Sender<Post>>>,
}

impl FakeBackend {
    fn viewing_as(username: &str) -> Self {
        Self {
            viewer: Some(username.to_string()),
            ..Default::default()
        }
    }

    fn with_pages(self, pages: Vec<Result<PostPage, BackendError>>) -> Self {
        *self.pages.lock().unwrap() = pages.into();
        self
    }

    /// Outcomes for the next follow mutations: `Ok(true)` returns the
    /// record, `Ok(false)` returns null. Unscripted calls succeed.
    fn with_follow_results(self, results: Vec<Result<bool, BackendError>>) -> Self {
        *self.follow_results.lock().unwrap() = results.into();
        self
    }

    fn follow_calls(&self) -> Vec<(&'static str, FollowKey)> {
        self.follow_calls.lock().unwrap().clone()
    }

    fn next_follow_result(
        &self,
        call: &'static str,
        key: &FollowKey,
        timestamp: Option<i64>,
    ) -> Result<Option<Relationship>, BackendError> {
        self.follow_calls.lock().unwrap().push((call, key.clone()));
        let outcome = self
            .follow_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(true))?;
        Ok(outcome.then(|| Relationship {
            follower_id: key.follower_id.clone(),
            followee_id: key.followee_id.clone(),
            timestamp,
        }))
    }

    fn queries(&self) -> Vec<PostQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn live_sender(&self) -> mpsc::Sender<Post> {
        self.live.lock().unwrap().clone().expect("subscribed")
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn resolve_current_viewer(&self) -> Result<Option<Identity>, BackendError> {
        Ok(self.viewer.clone().map(|username| Identity { username }))
    }

    async fn query_follow_relationship(&self, _: &FollowKey) -> Result<bool, BackendError> {
        Ok(self.following)
    }

    async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, BackendError> {
        self.queries.lock().unwrap().push(query.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PostPage::default()))
    }

    async fn create_follow_relationship(
        &self,
        key: &FollowKey,
        timestamp: i64,
    ) -> Result<Option<Relationship>, BackendError> {
        self.next_follow_result("create", key, Some(timestamp))
    }

    async fn delete_follow_relationship(
        &self,
        key: &FollowKey,
    ) -> Result<Option<Relationship>, BackendError> {
        self.next_follow_result("delete", key, None)
    }

    async fn subscribe_post_created(&self) -> Result<PostSubscription, BackendError> {
        let (sender, receiver) = mpsc::channel(8);
        *self.live.lock().unwrap() = Some(sender);
        Ok(PostSubscription::new(receiver))
    }
}

fn post(id: &str, owner: &str) -> Post {
    Post {
        id: id.to_string(),
        kind: Some("post".to_string()),
        owner: Some(owner.to_string()),
        content: Some(format!("{} from {}", id, owner)),
        timestamp: Some(1_700_000_000),
    }
}

fn page(ids: &[&str], next: Option<&str>) -> PostPage {
    PostPage {
        items: ids.iter().map(|id| Some(post(id, "bob"))).collect(),
        next_token: next.map(ContinuationToken::new),
    }
}

fn post_ids(posts: &[Option<Post>]) -> Vec<String> {
    posts.iter().flatten().map(|p| p.id.clone()).collect()
}

fn controller(backend: Arc<FakeBackend>, profile: &str) -> ProfileController {
    ProfileController::new(profile, backend, 20)
}

#[tokio::test]
async fn read_more_continues_until_the_last_page() {
    let backend = Arc::new(
        FakeBackend::viewing_as("alice").with_pages(vec![
            Ok(page(&["P1", "P2"], Some("abc"))),
            Ok(page(&["P3"], None)),
        ]),
    );
    let view = controller(backend.clone(), "bob");
    view.mount().await;

    let state = view.store().snapshot().await;
    assert!(!state.is_loading);
    assert_eq!(post_ids(&state.posts), vec!["P1", "P2"]);
    assert_eq!(state.cursor, Cursor::More(ContinuationToken::new("abc")));

    assert!(view.load_more().await);
    let state = view.store().snapshot().await;
    assert_eq!(post_ids(&state.posts), vec!["P1", "P2", "P3"]);
    assert_eq!(state.cursor, Cursor::Exhausted);

    let queries = backend.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].next_token, None);
    assert_eq!(queries[0].limit, 20);
    assert_eq!(queries[0].kind, "post");
    assert_eq!(queries[1].next_token, Some(ContinuationToken::new("abc")));

    // Nothing left: no further query is issued.
    assert!(!view.load_more().await);
    view.fetch_page(FetchKind::Additional, None).await;
    assert_eq!(backend.queries().len(), 2);
}

#[tokio::test]
async fn follow_state_drives_the_header_button() {
    let backend = Arc::new(FakeBackend {
        following: true,
        ..FakeBackend::viewing_as("alice")
    });
    let view = controller(backend.clone(), "bob");
    view.mount().await;

    assert!(view.is_following());
    assert_eq!(view.header_action().await, Some(HeaderAction::Following));

    assert!(!view.unfollow().await.unwrap());
    assert_eq!(view.header_action().await, Some(HeaderAction::Follow));

    assert!(view.follow().await.unwrap());
    assert_eq!(view.header_action().await, Some(HeaderAction::Following));
    assert_eq!(
        backend.follow_calls(),
        vec![
            ("delete", FollowKey::new("alice", "bob")),
            ("create", FollowKey::new("alice", "bob")),
        ]
    );
}

#[tokio::test]
async fn failed_follow_changes_leave_the_button_alone() {
    let backend = Arc::new(
        FakeBackend {
            following: true,
            ..FakeBackend::viewing_as("alice")
        }
        .with_follow_results(vec![
            Err(BackendError::Graphql("down".into())),
            Ok(false),
        ]),
    );
    let view = controller(backend.clone(), "bob");
    view.mount().await;

    assert!(view.unfollow().await.is_err());
    assert!(view.is_following());
    assert_eq!(view.header_action().await, Some(HeaderAction::Following));

    // A null result means nothing was deleted.
    assert!(view.unfollow().await.unwrap());
    assert_eq!(view.header_action().await, Some(HeaderAction::Following));
    assert_eq!(backend.follow_calls().len(), 2);
}

#[tokio::test]
async fn failed_or_empty_follow_keeps_not_following() {
    let backend = Arc::new(FakeBackend::viewing_as("alice").with_follow_results(vec![
        Err(BackendError::Graphql("down".into())),
        Ok(false),
    ]));
    let view = controller(backend.clone(), "bob");
    view.mount().await;

    assert!(view.follow().await.is_err());
    assert!(!view.is_following());
    assert!(!view.follow().await.unwrap());
    assert_eq!(view.header_action().await, Some(HeaderAction::Follow));
    assert_eq!(
        backend.follow_calls(),
        vec![
            ("create", FollowKey::new("alice", "bob")),
            ("create", FollowKey::new("alice", "bob")),
        ]
    );
}

#[tokio::test]
async fn no_header_button_on_own_profile_or_for_anonymous_viewers() {
    let own = controller(Arc::new(FakeBackend::viewing_as("bob")), "bob");
    own.mount().await;
    assert_eq!(own.header_action().await, None);

    let anonymous_backend = Arc::new(FakeBackend::default());
    let anonymous = controller(anonymous_backend.clone(), "bob");
    anonymous.mount().await;
    assert_eq!(anonymous.header_action().await, None);
    assert!(!anonymous.follow().await.unwrap());
    assert!(anonymous_backend.follow_calls().is_empty());
}

#[tokio::test]
async fn live_posts_from_the_profile_owner_are_prepended() {
    let backend = Arc::new(
        FakeBackend::viewing_as("alice").with_pages(vec![Ok(page(&["P1"], None))]),
    );
    let view = controller(backend.clone(), "bob");
    view.mount().await;
    assert!(view.is_subscribed().await);

    let mut changes = view.store().changes();

    let live = backend.live_sender();
    live.send(post("C1", "carol")).await.unwrap();
    live.send(post("B1", "bob")).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), changes.changed())
        .await
        .expect("store changed in time")
        .unwrap();

    let state = view.store().snapshot().await;
    assert_eq!(post_ids(&state.posts), vec!["B1", "P1"]);
}

#[tokio::test]
async fn unmount_stops_live_updates() {
    let backend = Arc::new(FakeBackend::viewing_as("alice"));
    let view = controller(backend.clone(), "bob");
    view.mount().await;
    let live = backend.live_sender();

    assert!(view.unmount().await);
    assert!(!view.is_subscribed().await);
    assert!(!view.unmount().await, "second unmount is a no-op");

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(live.send(post("B1", "bob")).await.is_err(), "listener is gone");
    assert!(view.store().snapshot().await.posts.is_empty());
}

#[tokio::test]
async fn failed_fetch_clears_loading_and_reports() {
    let backend = Arc::new(
        FakeBackend::viewing_as("alice")
            .with_pages(vec![Err(BackendError::Graphql("boom".into()))]),
    );
    let view = controller(backend, "bob");
    view.mount().await;

    let state = view.store().snapshot().await;
    assert!(!state.is_loading);
    assert!(state.posts.is_empty());
    assert!(state.error.is_some());
}

#[tokio::test]
async fn read_more_retries_a_failed_first_page() {
    let backend = Arc::new(FakeBackend::viewing_as("alice").with_pages(vec![
        Err(BackendError::Graphql("boom".into())),
        Ok(page(&["P1"], None)),
    ]));
    let view = controller(backend.clone(), "bob");
    view.mount().await;
    assert!(view.store().snapshot().await.error.is_some());

    assert!(view.load_more().await);
    let state = view.store().snapshot().await;
    assert_eq!(post_ids(&state.posts), vec!["P1"]);
    assert!(state.error.is_none());
    assert_eq!(state.cursor, Cursor::Exhausted);

    let queries = backend.queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].next_token, None);
}

#[tokio::test]
async fn read_more_before_any_page_is_a_no_op() {
    let backend = Arc::new(FakeBackend::viewing_as("alice"));
    let view = controller(backend.clone(), "bob");
    // Not mounted: cursor pending without an error.
    assert!(!view.load_more().await);
    assert!(backend.queries().is_empty());
}

#[tokio::test]
async fn loading_view_renders_only_the_progress_indicator() {
    let view = controller(Arc::new(FakeBackend::viewing_as("alice")), "bob");
    // Not mounted yet: the store still reports loading.
    let state = view.store().snapshot().await;
    assert!(state.is_loading);

    let html = PostListTemplate::new(PostListProps {
        is_loading: state.is_loading,
        posts: &state.posts,
        load_more_url: "/views/v1/more",
        title: view.profile_id(),
        header_button: None,
        error: None,
        now: chrono::Utc::now(),
    })
    .render()
    .unwrap();
    assert!(html.contains("role=\"progressbar\""));
    assert!(!html.contains("Read More"));
}
