use askama::Template;
use chrono::{DateTime, Utc};

use crate::backend::Post;
use crate::feed::relative_age;
use crate::profile::HeaderAction;

/// One rendered post with every missing field already defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRowView {
    pub owner: String,
    pub profile_href: String,
    pub avatar_initial: String,
    pub age: String,
    pub content: String,
}

impl PostRowView {
    pub fn from_post(post: &Post, now: DateTime<Utc>) -> Self {
        let owner = post.owner.clone().unwrap_or_default();
        Self {
            profile_href: format!("/{}", owner),
            avatar_initial: owner
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
            age: relative_age(post.timestamp.unwrap_or(0), now),
            content: post.content.clone().unwrap_or_default(),
            owner,
        }
    }
}

/// Follow/Following button rendered in the list header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderButton {
    pub label: String,
    pub variant: String,
    pub action_url: String,
}

impl HeaderButton {
    /// Button for `action`, posting to `/views/{view_id}/{endpoint}`.
    pub fn for_view(action: HeaderAction, view_id: &str) -> Self {
        Self {
            label: action.label().to_string(),
            variant: action.variant().to_string(),
            action_url: format!("/views/{}/{}", view_id, action.endpoint()),
        }
    }
}

/// Inputs to the feed list. The list keeps no state of its own.
pub struct PostListProps<'a> {
    pub is_loading: bool,
    pub posts: &'a [Option<Post>],
    pub load_more_url: &'a str,
    pub title: &'a str,
    pub header_button: Option<HeaderButton>,
    pub error: Option<&'a str>,
    pub now: DateTime<Utc>,
}

#[derive(Template, Debug, Clone)]
#[template(path = "components/post_list.html")]
pub struct PostListTemplate {
    pub is_loading: bool,
    pub title: String,
    pub header_button: Option<HeaderButton>,
    pub rows: Vec<PostRowView>,
    pub load_more_url: String,
    pub error: Option<String>,
}

impl PostListTemplate {
    pub fn new(props: PostListProps<'_>) -> Self {
        // Null entries are partially loaded or deleted records; they take no row.
        let rows = if props.is_loading {
            Vec::new()
        } else {
            props
                .posts
                .iter()
                .flatten()
                .map(|post| PostRowView::from_post(post, props.now))
                .collect()
        };

        Self {
            is_loading: props.is_loading,
            title: props.title.to_string(),
            header_button: props.header_button,
            rows,
            load_more_url: props.load_more_url.to_string(),
            error: props.error.map(str::to_string),
        }
    }
}
