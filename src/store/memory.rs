//! In-process store backed by `DashMap`, for local runs without Postgres
//! and for tests. Contents are lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::cmp::Reverse;
use std::sync::Arc;
use uuid::Uuid;

use super::RecordStore;
use crate::models::project::{NewProject, Project};
use crate::models::recording::{Decision, ZoomMeeting};

#[derive(Clone, Default)]
pub struct MemoryStore {
    projects: Arc<DashMap<Uuid, Project>>,
    recordings: Arc<DashMap<String, ZoomMeeting>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_project(&self, project: &NewProject) -> anyhow::Result<Option<Project>> {
        if self
            .projects
            .iter()
            .any(|p| p.project_token == project.project_token)
        {
            anyhow::bail!("duplicate project_token");
        }

        let row = Project {
            project_id: Uuid::new_v4(),
            project_name: project.project_name.clone(),
            company_name: project.company_name.clone(),
            hubspot_url: project.hubspot_url.clone(),
            notes: project.notes.clone(),
            key_contact: project.key_contact.clone(),
            meeting_type: project.meeting_type.clone(),
            meeting_id: project.meeting_id.clone(),
            meeting_number: project.meeting_number.clone(),
            project_token: project.project_token.clone(),
            folder_url: project.folder_url.clone(),
            created_at: Utc::now(),
        };
        self.projects.insert(row.project_id, row.clone());
        Ok(Some(row))
    }

    async fn get_project(&self, project_id: Uuid) -> anyhow::Result<Option<Project>> {
        Ok(self.projects.get(&project_id).map(|p| p.clone()))
    }

    async fn find_project_by_token(&self, token: &str) -> anyhow::Result<Option<Project>> {
        Ok(self
            .projects
            .iter()
            .find(|p| p.project_token == token)
            .map(|p| p.clone()))
    }

    async fn list_projects(&self) -> anyhow::Result<Vec<Project>> {
        let mut rows: Vec<Project> = self.projects.iter().map(|p| p.clone()).collect();
        rows.sort_by_key(|p| Reverse(p.created_at));
        Ok(rows)
    }

    async fn insert_recording(&self, recording: &ZoomMeeting) -> anyhow::Result<()> {
        if !self.projects.contains_key(&recording.project_id) {
            anyhow::bail!("unknown project {}", recording.project_id);
        }
        match self.recordings.entry(recording.zoom_record_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                anyhow::bail!("duplicate zoom_record_id {}", recording.zoom_record_id)
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(recording.clone());
                Ok(())
            }
        }
    }

    async fn get_recording(&self, zoom_record_id: &str) -> anyhow::Result<Option<ZoomMeeting>> {
        Ok(self.recordings.get(zoom_record_id).map(|r| r.clone()))
    }

    async fn list_pending_recordings(&self, project_id: Uuid) -> anyhow::Result<Vec<ZoomMeeting>> {
        let mut rows: Vec<ZoomMeeting> = self
            .recordings
            .iter()
            .filter(|r| r.project_id == project_id && !r.processed)
            .map(|r| r.clone())
            .collect();
        // Newest first, undated last.
        rows.sort_by(|a, b| match (a.meeting_date, b.meeting_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        Ok(rows)
    }

    async fn record_decision(
        &self,
        zoom_record_id: &str,
        decision: &Decision,
        processed_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<ZoomMeeting>> {
        // get_mut holds the shard write lock, so check-and-set is atomic.
        let Some(mut rec) = self.recordings.get_mut(zoom_record_id) else {
            return Ok(None);
        };
        if rec.apply(decision, processed_at) {
            Ok(Some(rec.clone()))
        } else {
            Ok(None)
        }
    }
}
