use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::Mutex;

use crate::backend::GraphqlBackend;
use crate::config::Config;
use crate::graphql::{build_schema, FeedSchema, PostEvents};
use crate::profile::ViewRegistry;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub schema: FeedSchema,
    pub views: Arc<Mutex<ViewRegistry>>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let schema = build_schema(db.clone(), PostEvents::new());
        let views = Arc::new(Mutex::new(ViewRegistry::new(config.views.max_mounted)));
        Self {
            db,
            config,
            schema,
            views,
        }
    }

    /// Backend client acting for the given session (or anonymously).
    pub fn backend(&self, session: Option<String>) -> GraphqlBackend {
        GraphqlBackend::new(self.schema.clone()).with_session(session)
    }
}
