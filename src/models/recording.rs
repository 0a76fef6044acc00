use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A meeting recording awaiting (or past) review.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq)]
pub struct ZoomMeeting {
    pub zoom_record_id: String,
    pub project_id: Uuid,
    pub meeting_id: String,
    pub meeting_topic: Option<String>,
    pub meeting_date: Option<DateTime<Utc>>,
    /// Minutes.
    pub duration: Option<i32>,
    pub host_id: Option<String>,
    pub processed: bool,
    pub processed_at: Option<DateTime<Utc>>,
    pub status: RecordingStatus,
    pub override_meeting_id: Option<String>,
}

impl ZoomMeeting {
    /// A fresh, unreviewed record.
    pub fn pending(
        zoom_record_id: impl Into<String>,
        project_id: Uuid,
        meeting_id: impl Into<String>,
    ) -> Self {
        Self {
            zoom_record_id: zoom_record_id.into(),
            project_id,
            meeting_id: meeting_id.into(),
            meeting_topic: None,
            meeting_date: None,
            duration: None,
            host_id: None,
            processed: false,
            processed_at: None,
            status: RecordingStatus::Pending,
            override_meeting_id: None,
        }
    }

    /// Whether the decision fields agree with each other.
    pub fn is_consistent(&self) -> bool {
        if self.processed {
            self.status.is_terminal() && self.processed_at.is_some()
        } else {
            self.status == RecordingStatus::Pending && self.processed_at.is_none()
        }
    }

    /// Apply a decision in place. Returns `false` without touching anything
    /// when the record was already processed.
    pub fn apply(&mut self, decision: &Decision, at: DateTime<Utc>) -> bool {
        if self.processed {
            return false;
        }
        self.processed = true;
        self.processed_at = Some(at);
        self.status = decision.status();
        if let Decision::Override { meeting_id } = decision {
            self.override_meeting_id = Some(meeting_id.clone());
        }
        true
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum RecordingStatus {
    Pending,
    Approved,
    OverrideRequested,
}

impl RecordingStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RecordingStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordingStatus::Pending => "pending",
            RecordingStatus::Approved => "approved",
            RecordingStatus::OverrideRequested => "override_requested",
        }
    }
}

impl std::fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer's decision on a pending recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Override { meeting_id: String },
}

impl Decision {
    pub fn status(&self) -> RecordingStatus {
        match self {
            Decision::Approve => RecordingStatus::Approved,
            Decision::Override { .. } => RecordingStatus::OverrideRequested,
        }
    }

    pub fn override_meeting_id(&self) -> Option<&str> {
        match self {
            Decision::Approve => None,
            Decision::Override { meeting_id } => Some(meeting_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&RecordingStatus::OverrideRequested).unwrap();
        assert_eq!(json, "\"override_requested\"");
        assert_eq!(RecordingStatus::Approved.to_string(), "approved");
    }

    #[test]
    fn test_apply_approve_sets_all_fields() {
        let mut rec = ZoomMeeting::pending("z1", Uuid::new_v4(), "55667788990");
        assert!(rec.is_consistent());

        let now = Utc::now();
        assert!(rec.apply(&Decision::Approve, now));
        assert!(rec.processed);
        assert_eq!(rec.processed_at, Some(now));
        assert_eq!(rec.status, RecordingStatus::Approved);
        assert_eq!(rec.meeting_id, "55667788990");
        assert!(rec.override_meeting_id.is_none());
        assert!(rec.is_consistent());
    }

    #[test]
    fn test_apply_override_records_replacement_id() {
        let mut rec = ZoomMeeting::pending("z1", Uuid::new_v4(), "55667788990");
        let decision = Decision::Override { meeting_id: "99999999999".into() };
        assert!(rec.apply(&decision, Utc::now()));
        assert_eq!(rec.status, RecordingStatus::OverrideRequested);
        assert_eq!(rec.override_meeting_id.as_deref(), Some("99999999999"));
        assert!(rec.is_consistent());
    }

    #[test]
    fn test_apply_on_processed_record_is_rejected() {
        let mut rec = ZoomMeeting::pending("z1", Uuid::new_v4(), "1");
        let first = Utc::now();
        rec.apply(&Decision::Approve, first);

        let decision = Decision::Override { meeting_id: "2".into() };
        assert!(!rec.apply(&decision, Utc::now()));
        assert_eq!(rec.status, RecordingStatus::Approved);
        assert_eq!(rec.processed_at, Some(first));
        assert!(rec.override_meeting_id.is_none());
    }

    #[test]
    fn test_processed_without_timestamp_is_inconsistent() {
        let mut rec = ZoomMeeting::pending("z1", Uuid::new_v4(), "1");
        rec.processed = true;
        rec.status = RecordingStatus::Approved;
        assert!(!rec.is_consistent());
    }
}
