pub mod store;
pub mod time;

pub use store::{Cursor, FeedAction, FeedStore, ViewState};
pub use time::relative_age;
