use async_graphql::*;
use futures::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::graphql::types::Post;

const EVENT_CAPACITY: usize = 256;

/// Fan-out of freshly created posts to every open subscription.
#[derive(Clone)]
pub struct PostEvents {
    sender: broadcast::Sender<Post>,
}

impl PostEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Returns how many subscribers saw the post.
    pub fn publish(&self, post: Post) -> usize {
        self.sender.send(post).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Post> {
        self.sender.subscribe()
    }
}

impl Default for PostEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// GraphQL Subscription root
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Every post created after the subscription opened
    async fn on_create_post(&self, ctx: &Context<'_>) -> Result<impl Stream<Item = Post>> {
        let receiver = ctx.data::<PostEvents>()?.subscribe();

        Ok(BroadcastStream::new(receiver).filter_map(|event| match event {
            Ok(post) => Some(post),
            Err(lagged) => {
                tracing::warn!("onCreatePost subscriber fell behind: {}", lagged);
                None
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            kind: "post".to_string(),
            content: "hi".to_string(),
            owner: "bob".to_string(),
            timestamp: 1,
        }
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let events = PostEvents::new();
        assert_eq!(events.publish(sample_post("p1")), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_published_posts() {
        let events = PostEvents::new();
        let mut receiver = events.subscribe();

        assert_eq!(events.publish(sample_post("p1")), 1);
        assert_eq!(receiver.recv().await.unwrap().id, "p1");
    }
}
