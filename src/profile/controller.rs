use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::backend::{
    Backend, BackendError, ContinuationToken, FollowKey, PostQuery, PostSubscription,
};
use crate::feed::{Cursor, FeedAction, FeedStore};

/// Shown above "Read More" after a page fetch fails.
pub const FETCH_FAILED: &str = "Couldn't load posts. Try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Initial,
    Additional,
}

/// The follow button next to a profile's title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    /// Not following yet; pressing it follows.
    Follow,
    /// Already following; pressing it unfollows.
    Following,
}

impl HeaderAction {
    pub fn label(&self) -> &'static str {
        match self {
            HeaderAction::Follow => "Follow",
            HeaderAction::Following => "Following",
        }
    }

    /// Button style: outlined invites an action, contained shows a held state.
    pub fn variant(&self) -> &'static str {
        match self {
            HeaderAction::Follow => "outlined",
            HeaderAction::Following => "contained",
        }
    }

    /// Name of the view endpoint the button posts to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            HeaderAction::Follow => "follow",
            HeaderAction::Following => "unfollow",
        }
    }
}

/// Drives one mounted profile page: viewer lookup, follow state, paged
/// posts, and live posts from the profile's owner.
pub struct ProfileController {
    profile_id: String,
    backend: Arc<dyn Backend>,
    store: FeedStore,
    page_size: u32,
    is_following: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl ProfileController {
    pub fn new(profile_id: impl Into<String>, backend: Arc<dyn Backend>, page_size: u32) -> Self {
        Self {
            profile_id: profile_id.into(),
            backend,
            store: FeedStore::new(),
            page_size,
            is_following: AtomicBool::new(false),
            listener: Mutex::new(None),
        }
    }

    pub fn profile_id(&self) -> &str {
        &self.profile_id
    }

    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    pub fn is_following(&self) -> bool {
        self.is_following.load(Ordering::SeqCst)
    }

    /// Reset the view, open the live feed, then load viewer and first page.
    pub async fn mount(&self) {
        self.store.dispatch(FeedAction::Reset).await;
        self.subscribe().await;
        self.initialize().await;
    }

    pub async fn initialize(&self) {
        match self.backend.resolve_current_viewer().await {
            Ok(Some(viewer)) => {
                self.store
                    .dispatch(FeedAction::UpdateViewer(viewer.clone()))
                    .await;

                let key = FollowKey::new(viewer.username, self.profile_id.as_str());
                match self.backend.query_follow_relationship(&key).await {
                    Ok(following) => self.is_following.store(following, Ordering::SeqCst),
                    Err(e) => tracing::warn!(
                        profile = %self.profile_id,
                        "follow state lookup failed: {}",
                        e
                    ),
                }
            }
            Ok(None) => tracing::debug!(profile = %self.profile_id, "anonymous viewer"),
            Err(e) => tracing::warn!(profile = %self.profile_id, "viewer lookup failed: {}", e),
        }

        self.fetch_page(FetchKind::Initial, None).await;
    }

    /// Fetch one page of posts. Additional pages are skipped once the
    /// cursor is exhausted. Loading is cleared whatever the outcome.
    pub async fn fetch_page(&self, kind: FetchKind, token: Option<ContinuationToken>) {
        if kind == FetchKind::Additional && self.store.cursor().await == Cursor::Exhausted {
            tracing::debug!(profile = %self.profile_id, "no more pages");
            return;
        }

        let query = PostQuery::newest_posts(self.page_size, token);
        match self.backend.query_posts(&query).await {
            Ok(page) => {
                let count = page.items.len();
                let items = match kind {
                    FetchKind::Initial => FeedAction::InitialQuery(page.items),
                    FetchKind::Additional => FeedAction::AdditionalQuery(page.items),
                };
                self.store
                    .dispatch_all([
                        items,
                        FeedAction::SetCursor(Cursor::from_page_token(page.next_token)),
                        FeedAction::SetError(None),
                        FeedAction::SetLoading(false),
                    ])
                    .await;
                tracing::debug!(profile = %self.profile_id, ?kind, count, "page loaded");
            }
            Err(e) => {
                tracing::warn!(profile = %self.profile_id, ?kind, "page fetch failed: {}", e);
                self.store
                    .dispatch_all([
                        FeedAction::SetError(Some(FETCH_FAILED.to_string())),
                        FeedAction::SetLoading(false),
                    ])
                    .await;
            }
        }
    }

    /// "Read More": continue from the stored cursor, or retry the first page
    /// if it failed. Returns whether a fetch was issued.
    pub async fn load_more(&self) -> bool {
        let state = self.store.snapshot().await;
        match state.cursor {
            Cursor::More(token) => self.fetch_page(FetchKind::Additional, Some(token)).await,
            Cursor::Pending if state.error.is_some() => {
                tracing::debug!(profile = %self.profile_id, "retrying first page");
                self.fetch_page(FetchKind::Initial, None).await
            }
            Cursor::Pending | Cursor::Exhausted => return false,
        }
        true
    }

    /// Follow the profile as the current viewer. Returns the follow state
    /// after the call; anonymous viewers are a no-op.
    pub async fn follow(&self) -> Result<bool, BackendError> {
        let Some(key) = self.viewer_key().await else {
            return Ok(self.is_following());
        };

        let created = self
            .backend
            .create_follow_relationship(&key, Utc::now().timestamp())
            .await?;
        if created.is_some() {
            self.is_following.store(true, Ordering::SeqCst);
        }
        Ok(self.is_following())
    }

    pub async fn unfollow(&self) -> Result<bool, BackendError> {
        let Some(key) = self.viewer_key().await else {
            return Ok(self.is_following());
        };

        let deleted = self.backend.delete_follow_relationship(&key).await?;
        if deleted.is_some() {
            self.is_following.store(false, Ordering::SeqCst);
        }
        Ok(self.is_following())
    }

    /// Open the post-created feed unless it is already open. A failure is
    /// logged and the view carries on without live updates.
    pub async fn subscribe(&self) {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return;
        }

        match self.backend.subscribe_post_created().await {
            Ok(subscription) => {
                *listener = Some(tokio::spawn(forward_live_posts(
                    subscription,
                    self.profile_id.clone(),
                    self.store.clone(),
                )));
            }
            Err(e) => tracing::warn!(profile = %self.profile_id, "subscription failed: {}", e),
        }
    }

    /// Release the live feed. Returns false if none was open.
    pub async fn unmount(&self) -> bool {
        match self.listener.lock().await.take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!(profile = %self.profile_id, "view unmounted");
                true
            }
            None => false,
        }
    }

    pub async fn is_subscribed(&self) -> bool {
        self.listener
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// The follow button, shown only to a signed-in viewer on someone else's profile.
    pub async fn header_action(&self) -> Option<HeaderAction> {
        let viewer = self.store.viewer().await?;
        if viewer.username == self.profile_id {
            return None;
        }
        Some(if self.is_following() {
            HeaderAction::Following
        } else {
            HeaderAction::Follow
        })
    }

    async fn viewer_key(&self) -> Option<FollowKey> {
        let viewer = self.store.viewer().await?;
        Some(FollowKey::new(viewer.username, self.profile_id.as_str()))
    }
}

impl Drop for ProfileController {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get_mut().take() {
            handle.abort();
        }
    }
}

async fn forward_live_posts(
    mut subscription: PostSubscription,
    profile_id: String,
    store: FeedStore,
) {
    while let Some(post) = subscription.next().await {
        if post.owner.as_deref() != Some(profile_id.as_str()) {
            continue;
        }
        tracing::debug!(profile = %profile_id, post_id = %post.id, "live post");
        store.dispatch(FeedAction::SubscriptionPost(post)).await;
    }
}
