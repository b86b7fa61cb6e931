pub mod api;
pub mod config;
pub mod gate;
pub mod notify;
pub mod predictor;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

pub use api::{create_router, ApiState};
pub use config::{SiteConfig, StoreBackend};
pub use gate::{GateError, QuotaDecision, QuotaGate};
pub use notify::{HttpMailTransport, MailTransport, Notifier};
pub use storage::{Collection, MemoryStore, QuotaRepository, SqliteStore};

/// Picks the quota store named by the configuration. Nothing is opened yet;
/// the SQLite file is created on first use.
pub fn open_repository(config: &SiteConfig) -> Arc<dyn QuotaRepository> {
    match config.store {
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(config.data_dir.clone())),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    }
}

/// Wires the production collaborators: configured store and HTTP mail relay.
pub fn build_state(config: SiteConfig) -> Result<ApiState> {
    let repository = open_repository(&config);
    let transport = HttpMailTransport::new(
        &config.mail,
        Duration::from_secs(config.outbound_timeout_secs),
    )?;
    ApiState::new(config, repository, Arc::new(transport))
}
