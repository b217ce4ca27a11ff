pub mod mutations;
pub mod queries;
pub mod schema;
pub mod subscriptions;
pub mod types;

pub use schema::{build_schema, FeedSchema};
pub use subscriptions::PostEvents;

use async_graphql::{Context, Error, ErrorExtensions, Result};

use crate::auth::session;
use crate::state::DbPool;

/// Extension code on errors caused by the caller's input rather than the
/// service.
pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";

pub(crate) fn invalid_input(message: impl Into<String>) -> Error {
    Error::new(message.into()).extend_with(|_, e| e.set("code", BAD_USER_INPUT))
}

/// Session cookie value attached to a request as context data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

/// Username behind the request's session, if it has a live one.
pub(crate) fn current_username(ctx: &Context<'_>) -> Result<Option<String>> {
    let Some(SessionToken(token)) = ctx.data_opt::<SessionToken>() else {
        return Ok(None);
    };

    let pool = ctx.data::<DbPool>()?;
    let user = session::lookup_session(pool, token)?;
    Ok(user.map(|(_, username)| username))
}
