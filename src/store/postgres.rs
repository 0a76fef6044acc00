use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::RecordStore;
use crate::models::project::{NewProject, Project};
use crate::models::recording::{Decision, ZoomMeeting};

const PROJECT_COLUMNS: &str = "project_id, project_name, company_name, hubspot_url, notes, \
     key_contact, meeting_type, meeting_id, meeting_number, project_token, folder_url, created_at";

const RECORDING_COLUMNS: &str = "zoom_record_id, project_id, meeting_id, meeting_topic, \
     meeting_date, duration, host_id, processed, processed_at, status, override_meeting_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgStore {
    // -- Project Operations --

    async fn insert_project(&self, project: &NewProject) -> anyhow::Result<Option<Project>> {
        let sql = format!(
            r#"INSERT INTO projects (project_name, company_name, hubspot_url, notes, key_contact,
                                     meeting_type, meeting_id, meeting_number, project_token, folder_url)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {}"#,
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(&project.project_name)
            .bind(&project.company_name)
            .bind(&project.hubspot_url)
            .bind(&project.notes)
            .bind(&project.key_contact)
            .bind(&project.meeting_type)
            .bind(&project.meeting_id)
            .bind(&project.meeting_number)
            .bind(&project.project_token)
            .bind(&project.folder_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("insert_project failed: {:?}", e);
                e
            })?;
        Ok(row)
    }

    async fn get_project(&self, project_id: Uuid) -> anyhow::Result<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE project_id = $1", PROJECT_COLUMNS);
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_project_by_token(&self, token: &str) -> anyhow::Result<Option<Project>> {
        let sql = format!("SELECT {} FROM projects WHERE project_token = $1", PROJECT_COLUMNS);
        let row = sqlx::query_as::<_, Project>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_projects(&self) -> anyhow::Result<Vec<Project>> {
        let sql = format!("SELECT {} FROM projects ORDER BY created_at DESC", PROJECT_COLUMNS);
        let rows = sqlx::query_as::<_, Project>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // -- Recording Operations --

    async fn insert_recording(&self, rec: &ZoomMeeting) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO zoom_meetings (zoom_record_id, project_id, meeting_id, meeting_topic,
                                          meeting_date, duration, host_id, processed, processed_at,
                                          status, override_meeting_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(&rec.zoom_record_id)
        .bind(rec.project_id)
        .bind(&rec.meeting_id)
        .bind(&rec.meeting_topic)
        .bind(rec.meeting_date)
        .bind(rec.duration)
        .bind(&rec.host_id)
        .bind(rec.processed)
        .bind(rec.processed_at)
        .bind(rec.status)
        .bind(&rec.override_meeting_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_recording(&self, zoom_record_id: &str) -> anyhow::Result<Option<ZoomMeeting>> {
        let sql = format!(
            "SELECT {} FROM zoom_meetings WHERE zoom_record_id = $1",
            RECORDING_COLUMNS
        );
        let row = sqlx::query_as::<_, ZoomMeeting>(&sql)
            .bind(zoom_record_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_pending_recordings(&self, project_id: Uuid) -> anyhow::Result<Vec<ZoomMeeting>> {
        let sql = format!(
            "SELECT {} FROM zoom_meetings WHERE project_id = $1 AND processed = FALSE \
             ORDER BY meeting_date DESC NULLS LAST",
            RECORDING_COLUMNS
        );
        let rows = sqlx::query_as::<_, ZoomMeeting>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn record_decision(
        &self,
        zoom_record_id: &str,
        decision: &Decision,
        processed_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<ZoomMeeting>> {
        // Single conditional update: a second reviewer finds no pending row.
        let sql = format!(
            r#"UPDATE zoom_meetings
               SET processed = TRUE, processed_at = $2, status = $3, override_meeting_id = $4
               WHERE zoom_record_id = $1 AND processed = FALSE
               RETURNING {}"#,
            RECORDING_COLUMNS
        );
        let row = sqlx::query_as::<_, ZoomMeeting>(&sql)
            .bind(zoom_record_id)
            .bind(processed_at)
            .bind(decision.status())
            .bind(decision.override_meeting_id())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
