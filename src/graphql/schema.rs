use async_graphql::Schema;

use super::mutations::MutationRoot;
use super::queries::QueryRoot;
use super::subscriptions::{PostEvents, SubscriptionRoot};
use crate::state::DbPool;

/// GraphQL Schema type
pub type FeedSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the GraphQL schema over a database pool and a post event bus
pub fn build_schema(pool: DbPool, events: PostEvents) -> FeedSchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(pool)
        .data(events)
        .finish()
}
