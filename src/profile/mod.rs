pub mod controller;
pub mod registry;

pub use controller::{FetchKind, HeaderAction, ProfileController};
pub use registry::ViewRegistry;
