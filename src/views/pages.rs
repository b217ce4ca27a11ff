use askama::Template;

use super::post_list::PostListTemplate;

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/profile.html")]
pub struct ProfilePageTemplate {
    pub title: String,
    pub viewer: Option<String>,
    pub is_own_profile: bool,
    pub list: PostListTemplate,
    pub list_url: String,
    pub events_url: String,
    pub unmount_url: String,
}

impl ProfilePageTemplate {
    pub fn new(
        view_id: &str,
        title: &str,
        viewer: Option<String>,
        list: PostListTemplate,
    ) -> Self {
        let is_own_profile = viewer.as_deref() == Some(title);
        Self {
            title: title.to_string(),
            viewer,
            is_own_profile,
            list,
            list_url: format!("/views/{}/list", view_id),
            events_url: format!("/views/{}/events", view_id),
            unmount_url: format!("/views/{}/unmount", view_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::PostListProps;
    use chrono::Utc;

    fn list() -> PostListTemplate {
        PostListTemplate::new(PostListProps {
            is_loading: false,
            posts: &[],
            load_more_url: "/views/v1/more",
            title: "bob",
            header_button: None,
            error: None,
            now: Utc::now(),
        })
    }

    #[test]
    fn profile_page_embeds_list_and_view_endpoints() {
        let html = ProfilePageTemplate::new("v1", "bob", None, list())
            .render()
            .unwrap();
        assert!(html.contains("id=\"post-list\""));
        assert!(html.contains("/views/v1/events"));
        assert!(html.contains("/views/v1/unmount"));
        assert!(!html.contains("class=\"composer\""));
    }

    #[test]
    fn composer_only_on_own_profile() {
        let own = ProfilePageTemplate::new("v1", "bob", Some("bob".into()), list());
        assert!(own.is_own_profile);
        assert!(own.render().unwrap().contains("class=\"composer\""));

        let other = ProfilePageTemplate::new("v1", "bob", Some("alice".into()), list());
        assert!(!other.is_own_profile);
    }

    #[test]
    fn login_page_shows_error() {
        let html = LoginTemplate {
            error: Some("Invalid username".into()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Invalid username"));
        assert!(html.contains("action=\"/login\""));
    }
}
