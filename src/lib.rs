//! Intake — project intake and recording review service.
//!
//! Library crate shared by the `intake` binary and the integration tests in `tests/`.

pub mod api;
pub mod config;
pub mod errors;
pub mod lookup;
pub mod models;
pub mod notification;
pub mod store;
pub mod workflow;

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::OsRng;
use rand::RngCore;

use config::{Config, StoreBackend};
use lookup::fixture::FixtureLookup;
use lookup::zoom::ZoomClient;
use lookup::MeetingLookup;
use notification::webhook::WebhookNotifier;
use store::memory::MemoryStore;
use store::postgres::PgStore;
use store::RecordStore;
use workflow::Workflow;

/// Shared application state passed to handlers and CLI commands.
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub lookup: Arc<dyn MeetingLookup>,
    pub webhook: WebhookNotifier,
    pub config: Config,
    draft_key: Vec<u8>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn RecordStore>,
        lookup: Arc<dyn MeetingLookup>,
    ) -> anyhow::Result<Self> {
        let webhook = WebhookNotifier::new(
            Duration::from_secs(config.webhook_timeout_secs),
            config.webhook_secret.clone(),
        )?;
        let draft_key = match &config.draft_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                let mut key = vec![0u8; 32];
                OsRng.fill_bytes(&mut key);
                key
            }
        };
        Ok(Self {
            store,
            lookup,
            webhook,
            config,
            draft_key,
        })
    }

    /// Connect the configured backends. Postgres migrations run when `migrate` is set.
    pub async fn build(config: Config, migrate: bool) -> anyhow::Result<Self> {
        let store: Arc<dyn RecordStore> = match config.store {
            StoreBackend::Postgres => {
                tracing::info!("Connecting to database...");
                let db = PgStore::connect(&config.database_url).await?;
                if migrate {
                    tracing::info!("Running migrations...");
                    db.migrate().await?;
                }
                Arc::new(db)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on exit");
                Arc::new(MemoryStore::new())
            }
        };

        let lookup: Arc<dyn MeetingLookup> = match &config.zoom_access_token {
            Some(token) => Arc::new(ZoomClient::new(&config.zoom_api_base_url, token)?),
            None => {
                tracing::warn!("ZOOM_ACCESS_TOKEN not set, meeting lookup uses sample meetings");
                Arc::new(FixtureLookup::samples()?)
            }
        };

        Self::new(config, store, lookup)
    }

    /// Workflow bound to this state for one request.
    pub fn workflow(&self) -> Workflow<'_> {
        Workflow::new(
            self.store.as_ref(),
            self.lookup.as_ref(),
            &self.webhook,
            &self.config,
            &self.draft_key,
        )
    }
}
