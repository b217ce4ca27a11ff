use async_graphql::*;
use rusqlite::{params, OptionalExtension};

use crate::db::models::{FollowRow, PostRow};
use crate::graphql::{current_username, invalid_input};
use crate::graphql::types::{FollowRelationship, ModelPostConnection, ModelSortDirection, Viewer};
use crate::state::DbPool;

const DEFAULT_LIMIT: i32 = 10;
const MAX_LIMIT: i32 = 100;

const PAGE_DESC: &str = "SELECT id, type, owner, content, timestamp FROM posts
     WHERE type = ?1 AND (?2 IS NULL OR timestamp < ?2 OR (timestamp = ?2 AND id < ?3))
     ORDER BY timestamp DESC, id DESC LIMIT ?4";

const PAGE_ASC: &str = "SELECT id, type, owner, content, timestamp FROM posts
     WHERE type = ?1 AND (?2 IS NULL OR timestamp > ?2 OR (timestamp = ?2 AND id > ?3))
     ORDER BY timestamp ASC, id ASC LIMIT ?4";

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The signed-in user, if the request carries a live session
    async fn viewer(&self, ctx: &Context<'_>) -> Result<Option<Viewer>> {
        Ok(current_username(ctx)?.map(|username| Viewer { username }))
    }

    /// Look up a single follow edge
    async fn get_follow_relationship(
        &self,
        ctx: &Context<'_>,
        follower_id: String,
        followee_id: String,
    ) -> Result<Option<FollowRelationship>> {
        let pool = ctx.data::<DbPool>()?;
        let conn = pool.get()?;

        let row = conn
            .query_row(
                "SELECT follower_id, followee_id, timestamp FROM follow_relationships
                 WHERE follower_id = ?1 AND followee_id = ?2",
                params![follower_id, followee_id],
                FollowRow::from_row,
            )
            .optional()?;

        Ok(row.map(FollowRelationship::from))
    }

    /// Posts of one type ordered by timestamp, one page at a time
    async fn list_posts_sorted_by_timestamp(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "type")] kind: String,
        sort_direction: Option<ModelSortDirection>,
        limit: Option<i32>,
        next_token: Option<String>,
    ) -> Result<ModelPostConnection> {
        let pool = ctx.data::<DbPool>()?;
        let conn = pool.get()?;

        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize;
        let after = next_token.as_deref().map(decode_token).transpose()?;
        let (after_ts, after_id) = match after {
            Some((ts, id)) => (Some(ts), Some(id)),
            None => (None, None),
        };

        let sql = match sort_direction.unwrap_or(ModelSortDirection::Asc) {
            ModelSortDirection::Desc => PAGE_DESC,
            ModelSortDirection::Asc => PAGE_ASC,
        };

        let mut stmt = conn.prepare(sql)?;
        let mut rows: Vec<PostRow> = stmt
            .query_map(
                params![kind, after_ts, after_id, (limit + 1) as i64],
                PostRow::from_row,
            )?
            .collect::<Result<_, _>>()?;

        let has_more = rows.len() > limit;
        rows.truncate(limit);

        let next_token = if has_more {
            rows.last().map(|row| encode_token(row.timestamp, &row.id))
        } else {
            None
        };

        Ok(ModelPostConnection {
            items: rows.into_iter().map(|row| Some(row.into())).collect(),
            next_token,
        })
    }
}

fn encode_token(timestamp: i64, id: &str) -> String {
    hex::encode(format!("{}:{}", timestamp, id))
}

fn decode_token(token: &str) -> Result<(i64, String)> {
    let invalid = || invalid_input("Invalid nextToken");

    let bytes = hex::decode(token).map_err(|_| invalid())?;
    let text = String::from_utf8(bytes).map_err(|_| invalid())?;
    let (timestamp, id) = text.split_once(':').ok_or_else(invalid)?;
    let timestamp = timestamp.parse().map_err(|_| invalid())?;

    Ok((timestamp, id.to_string()))
}
