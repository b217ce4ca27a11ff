use serde::{Deserialize, Serialize};

/// A stored post row. `kind` maps to the `type` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRow {
    pub id: String,
    pub kind: String,
    pub owner: String,
    pub content: String,
    pub timestamp: i64,
}

impl PostRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            kind: row.get("type")?,
            owner: row.get("owner")?,
            content: row.get("content")?,
            timestamp: row.get("timestamp")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowRow {
    pub follower_id: String,
    pub followee_id: String,
    pub timestamp: i64,
}

impl FollowRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            follower_id: row.get("follower_id")?,
            followee_id: row.get("followee_id")?,
            timestamp: row.get("timestamp")?,
        })
    }
}
