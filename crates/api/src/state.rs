use std::sync::Arc;

use crate::config::ServerConfig;
use crate::wizard::WizardRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ym_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Open onboarding wizard sessions, one per member.
    pub wizards: Arc<WizardRegistry>,
}
