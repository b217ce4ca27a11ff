use std::sync::Arc;

use tokio::sync::{watch, RwLock};

use crate::backend::{ContinuationToken, Identity, Post};

/// Where the next "Read More" should continue from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    /// No page has come back yet.
    #[default]
    Pending,
    More(ContinuationToken),
    /// The last page has been seen.
    Exhausted,
}

impl Cursor {
    pub fn from_page_token(token: Option<ContinuationToken>) -> Self {
        token.map_or(Cursor::Exhausted, Cursor::More)
    }

    pub fn continuation(&self) -> Option<&ContinuationToken> {
        match self {
            Cursor::More(token) => Some(token),
            Cursor::Pending | Cursor::Exhausted => None,
        }
    }
}

/// Everything one profile view renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub viewer: Option<Identity>,
    pub posts: Vec<Option<Post>>,
    pub cursor: Cursor,
    pub is_loading: bool,
    /// Message from the last failed page fetch, cleared by the next success.
    pub error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            viewer: None,
            posts: Vec::new(),
            cursor: Cursor::Pending,
            is_loading: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedAction {
    Reset,
    UpdateViewer(Identity),
    InitialQuery(Vec<Option<Post>>),
    AdditionalQuery(Vec<Option<Post>>),
    SubscriptionPost(Post),
    SetCursor(Cursor),
    SetLoading(bool),
    SetError(Option<String>),
}

impl ViewState {
    pub fn reduce(&mut self, action: FeedAction) {
        match action {
            FeedAction::Reset => *self = ViewState::default(),
            FeedAction::UpdateViewer(identity) => self.viewer = Some(identity),
            FeedAction::InitialQuery(items) => self.posts = items,
            FeedAction::AdditionalQuery(items) => self.posts.extend(items),
            FeedAction::SubscriptionPost(post) => self.posts.insert(0, Some(post)),
            FeedAction::SetCursor(cursor) => self.cursor = cursor,
            FeedAction::SetLoading(is_loading) => self.is_loading = is_loading,
            FeedAction::SetError(error) => self.error = error,
        }
    }
}

/// Shared, observable [`ViewState`]. Every dispatch bumps a version that
/// [`FeedStore::changes`] receivers can wait on.
#[derive(Clone)]
pub struct FeedStore {
    state: Arc<RwLock<ViewState>>,
    version: Arc<watch::Sender<u64>>,
}

impl FeedStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(ViewState::default())),
            version: Arc::new(version),
        }
    }

    pub async fn dispatch(&self, action: FeedAction) {
        self.dispatch_all([action]).await;
    }

    /// Apply several actions under one lock and one change notification.
    pub async fn dispatch_all(&self, actions: impl IntoIterator<Item = FeedAction>) {
        {
            let mut state = self.state.write().await;
            for action in actions {
                state.reduce(action);
            }
        }
        self.version.send_modify(|v| *v += 1);
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.read().await.clone()
    }

    pub async fn cursor(&self) -> Cursor {
        self.state.read().await.cursor.clone()
    }

    pub async fn viewer(&self) -> Option<Identity> {
        self.state.read().await.viewer.clone()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn changes(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new()
    }
}
