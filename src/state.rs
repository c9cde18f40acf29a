use std::sync::Arc;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::cache::Cache;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::meta::MetaLoader;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub cache: Cache,
    pub loader: MetaLoader,
    pub dashboard: Dashboard,
    /// Cancelled on shutdown; in-flight dashboard computations observe it.
    pub shutdown: CancellationToken,
}
