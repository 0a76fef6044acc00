pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::project::{NewProject, Project};
use crate::models::recording::{Decision, ZoomMeeting};

/// Persistence for projects and recordings.
/// Implementations: `PgStore` (Postgres via sqlx), `MemoryStore` (dev/tests).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a project. `Ok(None)` means the store accepted the call but
    /// returned no row.
    async fn insert_project(&self, project: &NewProject) -> anyhow::Result<Option<Project>>;

    async fn get_project(&self, project_id: Uuid) -> anyhow::Result<Option<Project>>;

    /// Exact match on `project_token`.
    async fn find_project_by_token(&self, token: &str) -> anyhow::Result<Option<Project>>;

    /// All projects, newest first.
    async fn list_projects(&self) -> anyhow::Result<Vec<Project>>;

    async fn insert_recording(&self, recording: &ZoomMeeting) -> anyhow::Result<()>;

    async fn get_recording(&self, zoom_record_id: &str) -> anyhow::Result<Option<ZoomMeeting>>;

    /// Unprocessed recordings of a project, newest meeting first.
    async fn list_pending_recordings(&self, project_id: Uuid) -> anyhow::Result<Vec<ZoomMeeting>>;

    /// Apply a decision to a single row, only while it is still unprocessed.
    /// Returns the updated row, or `None` when nothing matched.
    async fn record_decision(
        &self,
        zoom_record_id: &str,
        decision: &Decision,
        processed_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<ZoomMeeting>>;
}
