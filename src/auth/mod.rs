pub mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),
}

/// Top-level route segments a profile name may not shadow.
const RESERVED: &[&str] = &["assets", "graphql", "login", "logout", "posts", "views"];

/// Usernames double as profile route segments, so keep them URL-safe.
pub fn validate_username(raw: &str) -> Result<String, AuthError> {
    let username = raw.trim();
    let valid = !username.is_empty()
        && !RESERVED.contains(&username)
        && username.len() <= 32
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(username.to_string())
    } else {
        Err(AuthError::InvalidUsername(raw.to_string()))
    }
}
