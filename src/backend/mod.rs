//! The contract between profile views and the managed backend.
//!
//! Everything the views need (identity, relationships, paged posts and the
//! live post feed) goes through [`Backend`]. The views never look inside a
//! [`ContinuationToken`]; they hand back whatever the previous page gave them.

pub mod graphql;
pub mod operations;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use graphql::GraphqlBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The service turned the request down as invalid input.
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Subscription closed")]
    Closed,
}

/// The signed-in user, as the backend knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
}

/// A post as delivered by the backend. Every field but `id` may be missing
/// on partially written or partially deleted records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Opaque page continuation handed out by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Arguments of a paged post query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub kind: String,
    pub sort_direction: SortDirection,
    pub limit: u32,
    pub next_token: Option<ContinuationToken>,
}

impl PostQuery {
    /// Newest-first page of regular posts.
    pub fn newest_posts(limit: u32, next_token: Option<ContinuationToken>) -> Self {
        Self {
            kind: "post".to_string(),
            sort_direction: SortDirection::Desc,
            limit,
            next_token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    #[serde(default)]
    pub items: Vec<Option<Post>>,
    #[serde(default)]
    pub next_token: Option<ContinuationToken>,
}

/// Directed edge `follower -> followee`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowKey {
    pub follower_id: String,
    pub followee_id: String,
}

impl FollowKey {
    pub fn new(follower_id: impl Into<String>, followee_id: impl Into<String>) -> Self {
        Self {
            follower_id: follower_id.into(),
            followee_id: followee_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub follower_id: String,
    pub followee_id: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A live feed of newly created posts.
///
/// Dropping the subscription, or calling [`PostSubscription::unsubscribe`],
/// stops the task that pumps events into it.
pub struct PostSubscription {
    events: mpsc::Receiver<Post>,
    pump: Option<JoinHandle<()>>,
}

impl PostSubscription {
    pub fn new(events: mpsc::Receiver<Post>) -> Self {
        Self { events, pump: None }
    }

    /// Attach the task feeding `events`; it is aborted on release.
    pub fn with_pump(mut self, pump: JoinHandle<()>) -> Self {
        self.pump = Some(pump);
        self
    }

    /// Next post, or `None` once the source is gone.
    pub async fn next(&mut self) -> Option<Post> {
        self.events.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.events.close();
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl Drop for PostSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for PostSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostSubscription")
            .field("pumped", &self.pump.is_some())
            .finish()
    }
}

/// Operations the profile views consume from the managed backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The signed-in viewer, or `None` for anonymous access.
    async fn resolve_current_viewer(&self) -> Result<Option<Identity>, BackendError>;

    /// Whether `key.follower_id` follows `key.followee_id`.
    async fn query_follow_relationship(&self, key: &FollowKey) -> Result<bool, BackendError>;

    async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, BackendError>;

    async fn create_follow_relationship(
        &self,
        key: &FollowKey,
        timestamp: i64,
    ) -> Result<Option<Relationship>, BackendError>;

    async fn delete_follow_relationship(
        &self,
        key: &FollowKey,
    ) -> Result<Option<Relationship>, BackendError>;

    async fn subscribe_post_created(&self) -> Result<PostSubscription, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_tolerates_missing_fields() {
        let post: Post = serde_json::from_str(r#"{"id":"p1"}"#).unwrap();
        assert_eq!(post.id, "p1");
        assert!(post.owner.is_none());
        assert!(post.content.is_none());
        assert!(post.timestamp.is_none());
        assert!(post.kind.is_none());
    }

    #[test]
    fn page_decodes_null_items_and_token() {
        let page: PostPage = serde_json::from_str(
            r#"{"items":[{"id":"p1","type":"post","owner":"bob"},null],"nextToken":"abc"}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items[1].is_none());
        assert_eq!(page.next_token, Some(ContinuationToken::new("abc")));

        let last: PostPage = serde_json::from_str(r#"{"items":[],"nextToken":null}"#).unwrap();
        assert!(last.next_token.is_none());
    }

    #[test]
    fn sort_direction_uses_wire_names() {
        assert_eq!(serde_json::to_string(&SortDirection::Desc).unwrap(), "\"DESC\"");
        assert_eq!(serde_json::to_string(&SortDirection::Asc).unwrap(), "\"ASC\"");
    }

    #[tokio::test]
    async fn unsubscribe_stops_the_pump() {
        let (tx, rx) = mpsc::channel(4);
        let pump = tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                if tx.is_closed() {
                    break;
                }
            }
        });
        let watcher = pump.abort_handle();
        let subscription = PostSubscription::new(rx).with_pump(pump);

        subscription.unsubscribe();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(watcher.is_finished());
    }
}
