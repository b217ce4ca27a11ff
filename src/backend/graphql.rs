use async_graphql::{Request, Variables};
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::operations;
use super::{
    Backend, BackendError, FollowKey, Identity, Post, PostPage, PostQuery, PostSubscription,
    Relationship,
};
use crate::graphql::{FeedSchema, SessionToken, BAD_USER_INPUT};

const SUBSCRIPTION_BUFFER: usize = 64;

/// [`Backend`] that runs GraphQL documents against the feed schema, on
/// behalf of one (possibly anonymous) session.
#[derive(Clone)]
pub struct GraphqlBackend {
    schema: FeedSchema,
    session: Option<SessionToken>,
}

impl GraphqlBackend {
    pub fn new(schema: FeedSchema) -> Self {
        Self {
            schema,
            session: None,
        }
    }

    pub fn with_session(mut self, token: Option<String>) -> Self {
        self.session = token.map(SessionToken);
        self
    }

    /// Publish a post as the session's user.
    pub async fn create_post(&self, content: &str) -> Result<Post, BackendError> {
        let post: Option<Post> = self
            .execute(
                operations::CREATE_POST,
                json!({ "input": { "content": content } }),
                "createPost",
            )
            .await?;
        post.ok_or_else(|| BackendError::Graphql("createPost returned null".into()))
    }

    fn request(&self, document: &str, variables: Value) -> Request {
        let request = Request::new(document).variables(Variables::from_json(variables));
        match &self.session {
            Some(token) => request.data(token.clone()),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        document: &str,
        variables: Value,
        field: &str,
    ) -> Result<T, BackendError> {
        let response = self.schema.execute(self.request(document, variables)).await;
        decode_field(response, field)
    }
}

fn decode_field<T: DeserializeOwned>(
    response: async_graphql::Response,
    field: &str,
) -> Result<T, BackendError> {
    if !response.errors.is_empty() {
        let message = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let rejected = response.errors.iter().all(|e| {
            matches!(
                e.extensions.as_ref().and_then(|ext| ext.get("code")),
                Some(async_graphql::Value::String(code)) if code == BAD_USER_INPUT
            )
        });
        return Err(if rejected {
            BackendError::Rejected(message)
        } else {
            BackendError::Graphql(message)
        });
    }

    let mut data = response.data.into_json()?;
    let value = data.get_mut(field).map(Value::take).unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl Backend for GraphqlBackend {
    async fn resolve_current_viewer(&self) -> Result<Option<Identity>, BackendError> {
        if self.session.is_none() {
            return Ok(None);
        }
        self.execute(operations::VIEWER, json!({}), "viewer").await
    }

    async fn query_follow_relationship(&self, key: &FollowKey) -> Result<bool, BackendError> {
        let relationship: Option<Relationship> = self
            .execute(
                operations::GET_FOLLOW_RELATIONSHIP,
                json!({
                    "followerId": key.follower_id,
                    "followeeId": key.followee_id,
                }),
                "getFollowRelationship",
            )
            .await?;
        Ok(relationship.is_some())
    }

    async fn query_posts(&self, query: &PostQuery) -> Result<PostPage, BackendError> {
        let page: Option<PostPage> = self
            .execute(
                operations::LIST_POSTS_SORTED_BY_TIMESTAMP,
                json!({
                    "type": query.kind,
                    "sortDirection": query.sort_direction,
                    "limit": query.limit,
                    "nextToken": query.next_token,
                }),
                "listPostsSortedByTimestamp",
            )
            .await?;
        Ok(page.unwrap_or_default())
    }

    async fn create_follow_relationship(
        &self,
        key: &FollowKey,
        timestamp: i64,
    ) -> Result<Option<Relationship>, BackendError> {
        self.execute(
            operations::CREATE_FOLLOW_RELATIONSHIP,
            json!({
                "input": {
                    "followerId": key.follower_id,
                    "followeeId": key.followee_id,
                    "timestamp": timestamp,
                }
            }),
            "createFollowRelationship",
        )
        .await
    }

    async fn delete_follow_relationship(
        &self,
        key: &FollowKey,
    ) -> Result<Option<Relationship>, BackendError> {
        self.execute(
            operations::DELETE_FOLLOW_RELATIONSHIP,
            json!({
                "input": {
                    "followerId": key.follower_id,
                    "followeeId": key.followee_id,
                }
            }),
            "deleteFollowRelationship",
        )
        .await
    }

    async fn subscribe_post_created(&self) -> Result<PostSubscription, BackendError> {
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let schema = self.schema.clone();
        let request = self.request(operations::ON_CREATE_POST, json!({}));

        let pump = tokio::spawn(async move {
            let mut responses = schema.execute_stream(request);
            while let Some(response) = responses.next().await {
                match decode_field::<Option<Post>>(response, "onCreatePost") {
                    Ok(Some(post)) => {
                        if sender.send(post).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("onCreatePost event dropped: {}", e),
                }
            }
            tracing::debug!("onCreatePost stream ended");
        });

        Ok(PostSubscription::new(receiver).with_pump(pump))
    }
}
