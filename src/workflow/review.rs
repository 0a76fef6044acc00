use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use super::intake::secure_link;
use super::{present, Workflow};
use crate::errors::AppError;
use crate::models::meeting::MeetingDetails;
use crate::models::project::{Project, ProjectSummary};
use crate::models::recording::{Decision, ZoomMeeting};
use crate::notification::webhook::{NotificationReport, WebhookEvent};

/// Review queue of one project.
#[derive(Debug, Serialize)]
pub struct ReviewPage {
    pub project: ProjectSummary,
    /// Only on admin views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_link: Option<String>,
    pub recordings: Vec<ZoomMeeting>,
    pub all_caught_up: bool,
}

/// Override input carried between the preview and confirm steps.
///
/// `loaded_meeting_id` and `signature` are filled in by a successful preview.
/// Confirm is only accepted when the loaded id matches `override_meeting_id`
/// and the signature covers this project, record and meeting id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OverrideDraft {
    pub override_meeting_id: Option<String>,
    pub loaded_meeting_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

type HmacSha256 = Hmac<Sha256>;

fn draft_mac(key: &[u8], project_id: Uuid, zoom_record_id: &str, meeting_id: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    let project_id = project_id.to_string();
    for part in [project_id.as_str(), zoom_record_id, meeting_id] {
        mac.update(part.as_bytes());
        mac.update(&[0]);
    }
    mac
}

#[derive(Debug, Serialize)]
pub struct OverridePreview {
    pub zoom_record_id: String,
    pub meeting: MeetingDetails,
    pub recording_count: usize,
    pub draft: OverrideDraft,
}

#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    pub recording: ZoomMeeting,
    pub notification: NotificationReport,
    pub message: String,
}

impl Workflow<'_> {
    /// Unprocessed recordings of a project, newest meeting first.
    pub async fn pending_recordings(&self, project_id: Uuid) -> Result<Vec<ZoomMeeting>, AppError> {
        Ok(self.store.list_pending_recordings(project_id).await?)
    }

    pub async fn review_page(
        &self,
        project: &Project,
        with_link: bool,
    ) -> Result<ReviewPage, AppError> {
        let recordings = self.pending_recordings(project.project_id).await?;
        Ok(ReviewPage {
            project: ProjectSummary::from(project),
            secure_link: with_link
                .then(|| secure_link(&self.config.public_base_url, &project.project_token)),
            all_caught_up: recordings.is_empty(),
            recordings,
        })
    }

    /// Pending → Approved.
    pub async fn accept(
        &self,
        project: &Project,
        zoom_record_id: &str,
    ) -> Result<DecisionOutcome, AppError> {
        let recording = self
            .commit(project, zoom_record_id, Decision::Approve)
            .await?;

        let notification = self
            .webhook
            .notify(
                self.config.decision_webhook_url.as_deref(),
                &WebhookEvent::recording_approved(&recording),
            )
            .await;

        let message = match &notification {
            NotificationReport::Delivered => {
                "Recording approved! Review workflow triggered.".to_string()
            }
            NotificationReport::Skipped => "Recording approved!".to_string(),
            NotificationReport::Failed { warning } => {
                format!("Recording approved, but {}", warning)
            }
        };

        Ok(DecisionOutcome {
            recording,
            notification,
            message,
        })
    }

    /// Pending → OverrideRequested, submitted directly without a preview.
    pub async fn submit_override(
        &self,
        project: &Project,
        zoom_record_id: &str,
        override_meeting_id: Option<&str>,
    ) -> Result<DecisionOutcome, AppError> {
        let meeting_id = present(override_meeting_id).ok_or(AppError::MissingOverrideId)?;
        if self.config.require_override_preview {
            return Err(AppError::PreviewRequired);
        }
        self.apply_override(project, zoom_record_id, meeting_id).await
    }

    /// Load the replacement meeting so the reviewer can check it before
    /// confirming. No state changes.
    pub async fn preview_override(
        &self,
        project: &Project,
        zoom_record_id: &str,
        override_meeting_id: Option<&str>,
    ) -> Result<OverridePreview, AppError> {
        let meeting_id = present(override_meeting_id).ok_or(AppError::MissingOverrideId)?;
        self.pending_in_scope(project, zoom_record_id).await?;

        let meeting = self.lookup_meeting(&meeting_id).await?;
        let signature = hex::encode(
            draft_mac(self.draft_key, project.project_id, zoom_record_id, &meeting_id)
                .finalize()
                .into_bytes(),
        );

        Ok(OverridePreview {
            zoom_record_id: zoom_record_id.to_string(),
            recording_count: meeting.recording_files.len(),
            draft: OverrideDraft {
                override_meeting_id: Some(meeting_id.clone()),
                loaded_meeting_id: Some(meeting_id),
                signature: Some(signature),
            },
            meeting,
        })
    }

    /// Pending → OverrideRequested, after a preview of the same meeting id.
    pub async fn confirm_override(
        &self,
        project: &Project,
        zoom_record_id: &str,
        draft: &OverrideDraft,
    ) -> Result<DecisionOutcome, AppError> {
        let meeting_id =
            present(draft.override_meeting_id.as_deref()).ok_or(AppError::MissingOverrideId)?;

        let previewed = present(draft.loaded_meeting_id.as_deref());
        if previewed.as_deref() != Some(meeting_id.as_str()) {
            tracing::debug!(zoom_record_id, "override confirm without matching preview");
            return Err(AppError::PreviewRequired);
        }

        let signed = draft
            .signature
            .as_deref()
            .and_then(|sig| hex::decode(sig).ok())
            .map(|sig| {
                draft_mac(self.draft_key, project.project_id, zoom_record_id, &meeting_id)
                    .verify_slice(&sig)
                    .is_ok()
            })
            .unwrap_or(false);
        if !signed {
            tracing::warn!(zoom_record_id, "override confirm with unsigned or forged draft");
            return Err(AppError::PreviewRequired);
        }

        self.apply_override(project, zoom_record_id, meeting_id).await
    }

    /// Standalone meeting lookup.
    pub async fn lookup_meeting(&self, meeting_id: &str) -> Result<MeetingDetails, AppError> {
        match self.lookup.fetch(meeting_id).await {
            Ok(Some(meeting)) => Ok(meeting),
            Ok(None) => Err(AppError::MeetingNotFound(meeting_id.to_string())),
            Err(e) => Err(AppError::Lookup(format!("{:#}", e))),
        }
    }

    async fn apply_override(
        &self,
        project: &Project,
        zoom_record_id: &str,
        meeting_id: String,
    ) -> Result<DecisionOutcome, AppError> {
        let recording = self
            .commit(
                project,
                zoom_record_id,
                Decision::Override {
                    meeting_id: meeting_id.clone(),
                },
            )
            .await?;

        let notification = self
            .webhook
            .notify(
                self.config.decision_webhook_url.as_deref(),
                &WebhookEvent::recording_overridden(&recording, &meeting_id),
            )
            .await;

        let message = match &notification {
            NotificationReport::Delivered => {
                format!("Override submitted! Using Meeting ID: {}", meeting_id)
            }
            NotificationReport::Skipped => format!("Override Meeting ID saved: {}", meeting_id),
            NotificationReport::Failed { warning } => {
                format!("Override Meeting ID saved: {}, but {}", meeting_id, warning)
            }
        };

        Ok(DecisionOutcome {
            recording,
            notification,
            message,
        })
    }

    /// The record, if it belongs to `project` and is still pending.
    /// Records of other projects are reported as missing.
    async fn pending_in_scope(
        &self,
        project: &Project,
        zoom_record_id: &str,
    ) -> Result<ZoomMeeting, AppError> {
        let recording = self
            .store
            .get_recording(zoom_record_id)
            .await?
            .filter(|r| r.project_id == project.project_id)
            .ok_or(AppError::RecordingNotFound)?;

        if recording.processed {
            return Err(AppError::AlreadyProcessed);
        }
        Ok(recording)
    }

    /// Persist a decision in one conditional update. The webhook is only
    /// attempted after this returns.
    async fn commit(
        &self,
        project: &Project,
        zoom_record_id: &str,
        decision: Decision,
    ) -> Result<ZoomMeeting, AppError> {
        self.pending_in_scope(project, zoom_record_id).await?;

        let updated = self
            .store
            .record_decision(zoom_record_id, &decision, Utc::now())
            .await?;

        match updated {
            Some(recording) => {
                tracing::info!(
                    zoom_record_id,
                    project_id = %recording.project_id,
                    status = %recording.status,
                    override_meeting_id = recording.override_meeting_id.as_deref(),
                    "recording decision recorded"
                );
                Ok(recording)
            }
            // Another reviewer got there between the read and the update.
            None => Err(AppError::AlreadyProcessed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::ProjectInput;
    use crate::models::recording::RecordingStatus;
    use crate::store::RecordStore;
    use crate::test_support::{harness, harness_with, seed_recording};

    async fn project(state: &crate::AppState) -> Project {
        state
            .workflow()
            .create_project(ProjectInput {
                project_name: Some("Acme".into()),
                company_name: Some("Acme Inc".into()),
                ..Default::default()
            })
            .await
            .unwrap()
            .project
    }

    #[tokio::test]
    async fn test_accept_removes_from_queue() {
        let state = harness();
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "55667788990").await;
        let wf = state.workflow();

        assert_eq!(wf.pending_recordings(p.project_id).await.unwrap().len(), 1);

        let outcome = wf.accept(&p, "zr-1").await.unwrap();
        assert!(outcome.recording.processed);
        assert_eq!(outcome.recording.status, RecordingStatus::Approved);
        assert!(outcome.recording.processed_at.is_some());
        assert_eq!(outcome.recording.meeting_id, "55667788990");
        assert_eq!(outcome.message, "Recording approved!");

        let page = wf.review_page(&p, false).await.unwrap();
        assert!(page.recordings.is_empty());
        assert!(page.all_caught_up);
        assert!(page.secure_link.is_none());
    }

    #[tokio::test]
    async fn test_accept_twice_conflicts() {
        let state = harness();
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "1").await;
        let wf = state.workflow();

        wf.accept(&p, "zr-1").await.unwrap();
        let err = wf.accept(&p, "zr-1").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyProcessed));

        let err = wf.submit_override(&p, "zr-1", Some("2")).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyProcessed));
    }

    #[tokio::test]
    async fn test_override_direct_submission() {
        let state = harness();
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "55667788990").await;

        let outcome = state
            .workflow()
            .submit_override(&p, "zr-1", Some(" 99999999999 "))
            .await
            .unwrap();
        let rec = outcome.recording;
        assert!(rec.processed);
        assert_eq!(rec.status, RecordingStatus::OverrideRequested);
        assert_eq!(rec.override_meeting_id.as_deref(), Some("99999999999"));
        assert_eq!(rec.meeting_id, "55667788990");
        assert_eq!(outcome.message, "Override Meeting ID saved: 99999999999");
    }

    #[tokio::test]
    async fn test_override_without_id_leaves_record_pending() {
        let state = harness();
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "1").await;
        let wf = state.workflow();

        for id in [None, Some(""), Some("   ")] {
            let err = wf.submit_override(&p, "zr-1", id).await.unwrap_err();
            assert!(matches!(err, AppError::MissingOverrideId));
        }
        let err = wf
            .confirm_override(&p, "zr-1", &OverrideDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingOverrideId));

        let queue = wf.pending_recordings(p.project_id).await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].status, RecordingStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_requires_matching_preview() {
        let state = harness();
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "1").await;
        let wf = state.workflow();

        let never_loaded = OverrideDraft {
            override_meeting_id: Some("98765432100".into()),
            loaded_meeting_id: None,
            signature: None,
        };
        let err = wf.confirm_override(&p, "zr-1", &never_loaded).await.unwrap_err();
        assert!(matches!(err, AppError::PreviewRequired));

        let loaded_other = OverrideDraft {
            override_meeting_id: Some("98765432100".into()),
            loaded_meeting_id: Some("11223344556".into()),
            signature: None,
        };
        let err = wf.confirm_override(&p, "zr-1", &loaded_other).await.unwrap_err();
        assert!(matches!(err, AppError::PreviewRequired));

        assert_eq!(wf.pending_recordings(p.project_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preview_then_confirm() {
        let state = harness();
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "55667788990").await;
        let wf = state.workflow();

        let preview = wf
            .preview_override(&p, "zr-1", Some("98765432100"))
            .await
            .unwrap();
        assert_eq!(preview.meeting.topic, "Client Strategy Call");
        assert_eq!(preview.recording_count, 2);
        // previewing changes nothing
        assert_eq!(wf.pending_recordings(p.project_id).await.unwrap().len(), 1);

        let outcome = wf.confirm_override(&p, "zr-1", &preview.draft).await.unwrap();
        assert_eq!(outcome.recording.status, RecordingStatus::OverrideRequested);
        assert_eq!(
            outcome.recording.override_meeting_id.as_deref(),
            Some("98765432100")
        );
        assert!(wf.pending_recordings(p.project_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_rejects_hand_made_draft() {
        let state = harness_with(crate::config::Config {
            require_override_preview: true,
            ..Default::default()
        });
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "55667788990").await;
        let wf = state.workflow();

        let forged = [
            OverrideDraft {
                override_meeting_id: Some("00000000000".into()),
                loaded_meeting_id: Some("00000000000".into()),
                signature: None,
            },
            OverrideDraft {
                override_meeting_id: Some("00000000000".into()),
                loaded_meeting_id: Some("00000000000".into()),
                signature: Some("not-hex".into()),
            },
            OverrideDraft {
                override_meeting_id: Some("00000000000".into()),
                loaded_meeting_id: Some("00000000000".into()),
                signature: Some(hex::encode([0u8; 32])),
            },
        ];
        for draft in &forged {
            let err = wf.confirm_override(&p, "zr-1", draft).await.unwrap_err();
            assert!(matches!(err, AppError::PreviewRequired), "{:?}", err);
        }

        let rec = state.store.get_recording("zr-1").await.unwrap().unwrap();
        assert_eq!(rec.status, RecordingStatus::Pending);
        assert!(rec.override_meeting_id.is_none());
    }

    #[tokio::test]
    async fn test_signed_draft_is_bound_to_its_preview() {
        let state = harness();
        let p = project(&state).await;
        let other = project(&state).await;
        seed_recording(&state, &p, "zr-1", "1").await;
        seed_recording(&state, &p, "zr-2", "2").await;
        seed_recording(&state, &other, "zr-3", "3").await;
        let wf = state.workflow();

        let preview = wf
            .preview_override(&p, "zr-1", Some("98765432100"))
            .await
            .unwrap();

        // same signature, different meeting id
        let mut swapped = preview.draft.clone();
        swapped.override_meeting_id = Some("11223344556".into());
        swapped.loaded_meeting_id = Some("11223344556".into());
        let err = wf.confirm_override(&p, "zr-1", &swapped).await.unwrap_err();
        assert!(matches!(err, AppError::PreviewRequired));

        // different record in the same project
        let err = wf.confirm_override(&p, "zr-2", &preview.draft).await.unwrap_err();
        assert!(matches!(err, AppError::PreviewRequired));

        // replayed against another project's record
        let err = wf
            .confirm_override(&other, "zr-3", &preview.draft)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PreviewRequired));

        assert_eq!(wf.pending_recordings(p.project_id).await.unwrap().len(), 2);
        wf.confirm_override(&p, "zr-1", &preview.draft).await.unwrap();
    }

    #[tokio::test]
    async fn test_preview_unknown_meeting_is_warning() {
        let state = harness();
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "1").await;

        let err = state
            .workflow()
            .preview_override(&p, "zr-1", Some("00000000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MeetingNotFound(_)));
        assert!(err.is_warning());
    }

    #[tokio::test]
    async fn test_strict_mode_blocks_direct_override() {
        let state = harness_with(crate::config::Config {
            require_override_preview: true,
            ..Default::default()
        });
        let p = project(&state).await;
        seed_recording(&state, &p, "zr-1", "1").await;
        let wf = state.workflow();

        let err = wf.submit_override(&p, "zr-1", Some("98765432100")).await.unwrap_err();
        assert!(matches!(err, AppError::PreviewRequired));
        assert_eq!(wf.pending_recordings(p.project_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_other_projects_recordings_are_hidden() {
        let state = harness();
        let mine = project(&state).await;
        let theirs = project(&state).await;
        seed_recording(&state, &theirs, "zr-theirs", "1").await;
        let wf = state.workflow();

        let err = wf.accept(&mine, "zr-theirs").await.unwrap_err();
        assert!(matches!(err, AppError::RecordingNotFound));
        let err = wf
            .preview_override(&mine, "zr-theirs", Some("98765432100"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RecordingNotFound));
        assert!(wf.pending_recordings(mine.project_id).await.unwrap().is_empty());
        assert_eq!(wf.pending_recordings(theirs.project_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_processed_records_are_always_consistent() {
        let state = harness();
        let p = project(&state).await;
        for (id, meeting) in [("a", "1"), ("b", "2"), ("c", "3")] {
            seed_recording(&state, &p, id, meeting).await;
        }
        let wf = state.workflow();
        wf.accept(&p, "a").await.unwrap();
        wf.submit_override(&p, "b", Some("9")).await.unwrap();
        let _ = wf.submit_override(&p, "c", None).await;

        for id in ["a", "b", "c"] {
            let rec = state.store.get_recording(id).await.unwrap().unwrap();
            assert!(rec.is_consistent(), "record {} inconsistent: {:?}", id, rec);
        }
    }
}
