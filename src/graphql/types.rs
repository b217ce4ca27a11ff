use async_graphql::*;
use serde::{Deserialize, Serialize};

use crate::db::models::{FollowRow, PostRow};

/// A published post
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct Post {
    /// Unique post identifier (UUID)
    pub id: String,

    /// Record discriminant, `post` for everything users write
    #[graphql(name = "type")]
    #[serde(rename = "type")]
    pub kind: String,

    pub content: String,

    /// Username of the author
    pub owner: String,

    /// Creation time in unix seconds
    pub timestamp: i64,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            content: row.content,
            owner: row.owner,
            timestamp: row.timestamp,
        }
    }
}

/// One page of posts plus the token for the next one
#[derive(Clone, Debug, SimpleObject)]
pub struct ModelPostConnection {
    pub items: Vec<Option<Post>>,

    /// Absent on the last page
    pub next_token: Option<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Enum, Eq, PartialEq)]
pub enum ModelSortDirection {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct FollowRelationship {
    pub follower_id: String,
    pub followee_id: String,
    pub timestamp: i64,
}

impl From<FollowRow> for FollowRelationship {
    fn from(row: FollowRow) -> Self {
        Self {
            follower_id: row.follower_id,
            followee_id: row.followee_id,
            timestamp: row.timestamp,
        }
    }
}

/// The user a request is made on behalf of
#[derive(Clone, Debug, SimpleObject)]
pub struct Viewer {
    pub username: String,
}

#[derive(InputObject)]
pub struct CreatePostInput {
    pub content: String,

    /// Defaults to `post`
    #[graphql(name = "type")]
    pub kind: Option<String>,
}

#[derive(InputObject)]
pub struct CreateFollowRelationshipInput {
    pub follower_id: String,
    pub followee_id: String,

    /// Unix seconds; the server clock is used when omitted
    pub timestamp: Option<i64>,
}

#[derive(InputObject)]
pub struct DeleteFollowRelationshipInput {
    pub follower_id: String,
    pub followee_id: String,
}
