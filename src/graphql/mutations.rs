use async_graphql::*;
use chrono::Utc;
use rusqlite::{params, ErrorCode, OptionalExtension};

use crate::db::models::FollowRow;
use crate::graphql::{current_username, invalid_input};
use crate::graphql::subscriptions::PostEvents;
use crate::graphql::types::{
    CreateFollowRelationshipInput, CreatePostInput, DeleteFollowRelationshipInput,
    FollowRelationship, Post,
};
use crate::state::DbPool;

const MAX_POST_LEN: usize = 2000;

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Publish a post as the signed-in user
    async fn create_post(&self, ctx: &Context<'_>, input: CreatePostInput) -> Result<Post> {
        let owner = require_viewer(ctx)?;

        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(invalid_input("Post content cannot be empty"));
        }
        if content.chars().count() > MAX_POST_LEN {
            return Err(invalid_input(format!(
                "Post content must be {} characters or less",
                MAX_POST_LEN
            )));
        }

        let post = Post {
            id: uuid::Uuid::now_v7().to_string(),
            kind: input.kind.unwrap_or_else(|| "post".to_string()),
            content,
            owner,
            timestamp: Utc::now().timestamp(),
        };

        {
            let pool = ctx.data::<DbPool>()?;
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO posts (id, type, owner, content, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![post.id, post.kind, post.owner, post.content, post.timestamp],
            )?;
        }

        let delivered = ctx.data::<PostEvents>()?.publish(post.clone());
        tracing::debug!(post_id = %post.id, delivered, "post created");

        Ok(post)
    }

    /// Start following someone. The follower must be the signed-in user.
    async fn create_follow_relationship(
        &self,
        ctx: &Context<'_>,
        input: CreateFollowRelationshipInput,
    ) -> Result<FollowRelationship> {
        require_follower(ctx, &input.follower_id)?;
        if input.follower_id == input.followee_id {
            return Err(invalid_input("Cannot follow yourself"));
        }

        let relationship = FollowRelationship {
            follower_id: input.follower_id,
            followee_id: input.followee_id,
            timestamp: input.timestamp.unwrap_or_else(|| Utc::now().timestamp()),
        };

        let pool = ctx.data::<DbPool>()?;
        let conn = pool.get()?;
        let result = conn.execute(
            "INSERT INTO follow_relationships (follower_id, followee_id, timestamp) VALUES (?1, ?2, ?3)",
            params![
                relationship.follower_id,
                relationship.followee_id,
                relationship.timestamp
            ],
        );

        match result {
            Ok(_) => Ok(relationship),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(invalid_input("Relationship already exists"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stop following someone. Returns the removed edge, or null if there was none.
    async fn delete_follow_relationship(
        &self,
        ctx: &Context<'_>,
        input: DeleteFollowRelationshipInput,
    ) -> Result<Option<FollowRelationship>> {
        require_follower(ctx, &input.follower_id)?;

        let pool = ctx.data::<DbPool>()?;
        let conn = pool.get()?;

        let existing = conn
            .query_row(
                "SELECT follower_id, followee_id, timestamp FROM follow_relationships
                 WHERE follower_id = ?1 AND followee_id = ?2",
                params![input.follower_id, input.followee_id],
                FollowRow::from_row,
            )
            .optional()?;

        if existing.is_some() {
            conn.execute(
                "DELETE FROM follow_relationships WHERE follower_id = ?1 AND followee_id = ?2",
                params![input.follower_id, input.followee_id],
            )?;
        }

        Ok(existing.map(FollowRelationship::from))
    }
}

fn require_viewer(ctx: &Context<'_>) -> Result<String> {
    current_username(ctx)?.ok_or_else(|| Error::new("Not authenticated"))
}

fn require_follower(ctx: &Context<'_>, follower_id: &str) -> Result<()> {
    if require_viewer(ctx)? != follower_id {
        return Err(Error::new("Not authorized to manage this relationship"));
    }
    Ok(())
}
