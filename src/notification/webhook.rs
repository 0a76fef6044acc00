use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::project::Project;
use crate::models::recording::ZoomMeeting;

// ── Webhook Event Types ───────────────────────────────────────

/// Payloads sent to the automation pipeline. The downstream workflows
/// branch on `trigger_source`, so the tag values are part of the contract.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "trigger_source")]
pub enum WebhookEvent {
    #[serde(rename = "streamlit_form")]
    ProjectCreated {
        project_id: String,
        project_name: String,
        company_name: String,
        hubspot_url: Option<String>,
        notes: Option<String>,
        key_contact: Option<String>,
        meeting_type: Option<String>,
        meeting_id: Option<String>,
        meeting_number: Option<String>,
        folder_url: Option<String>,
        project_token: String,
    },

    #[serde(rename = "streamlit_approval")]
    RecordingApproved {
        project_id: String,
        meeting_id: String,
        zoom_record_id: String,
        status: &'static str,
    },

    /// `meeting_id` is the replacement; the reviewed one travels as
    /// `original_meeting_id`.
    #[serde(rename = "streamlit_override")]
    RecordingOverridden {
        project_id: String,
        meeting_id: String,
        zoom_record_id: String,
        status: &'static str,
        original_meeting_id: String,
    },
}

impl WebhookEvent {
    pub fn project_created(project: &Project) -> Self {
        Self::ProjectCreated {
            project_id: project.project_id.to_string(),
            project_name: project.project_name.clone(),
            company_name: project.company_name.clone(),
            hubspot_url: project.hubspot_url.clone(),
            notes: project.notes.clone(),
            key_contact: project.key_contact.clone(),
            meeting_type: project.meeting_type.clone(),
            meeting_id: project.meeting_id.clone(),
            meeting_number: project.meeting_number.clone(),
            folder_url: project.folder_url.clone(),
            project_token: project.project_token.clone(),
        }
    }

    pub fn recording_approved(record: &ZoomMeeting) -> Self {
        Self::RecordingApproved {
            project_id: record.project_id.to_string(),
            meeting_id: record.meeting_id.clone(),
            zoom_record_id: record.zoom_record_id.clone(),
            status: "approved",
        }
    }

    pub fn recording_overridden(record: &ZoomMeeting, override_meeting_id: &str) -> Self {
        Self::RecordingOverridden {
            project_id: record.project_id.to_string(),
            meeting_id: override_meeting_id.to_string(),
            zoom_record_id: record.zoom_record_id.clone(),
            status: "override_approved",
            original_meeting_id: record.meeting_id.clone(),
        }
    }

    pub fn trigger_source(&self) -> &'static str {
        match self {
            Self::ProjectCreated { .. } => "streamlit_form",
            Self::RecordingApproved { .. } => "streamlit_approval",
            Self::RecordingOverridden { .. } => "streamlit_override",
        }
    }
}

// ── Delivery Outcome ─────────────────────────────────────────

/// Why a webhook was not accepted. Never fatal to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NotificationFailure {
    #[error("status {0}")]
    Rejected(u16),

    #[error("{0}")]
    Transport(String),
}

/// What happened to a best-effort notification, reported back to the user.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationReport {
    /// No endpoint configured.
    Skipped,
    Delivered,
    Failed { warning: String },
}

impl NotificationReport {
    pub fn from_result(result: Result<(), NotificationFailure>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(e) => Self::Failed {
                warning: format!("workflow trigger failed ({})", e),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

// ── HMAC Signing ─────────────────────────────────────────────

/// Compute HMAC-SHA256 of `payload` using `secret`.
/// Returns lowercase hex digest (e.g. "sha256=<hex>").
fn hmac_sha256_hex(secret: &str, payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

// ── Webhook Notifier ──────────────────────────────────────────

/// Posts webhook events. One attempt per event, bounded by the configured
/// timeout; only HTTP 200 counts as delivered.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    signing_secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(timeout: Duration, signing_secret: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("intake-webhook/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            signing_secret,
        })
    }

    /// Send one event to `url`.
    pub async fn send(&self, url: &str, event: &WebhookEvent) -> Result<(), NotificationFailure> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| NotificationFailure::Transport(format!("serialize error: {}", e)))?;
        let delivery_id = Uuid::new_v4().to_string();
        let event_name = event.trigger_source();

        let mut req = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .header("x-intake-delivery-id", &delivery_id)
            .header("x-intake-event", event_name);

        if let Some(secret) = &self.signing_secret {
            req = req.header("x-intake-signature", hmac_sha256_hex(secret, &payload));
        }

        match req.body(payload).send().await {
            Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                info!(
                    url,
                    event = event_name,
                    delivery_id = %delivery_id,
                    "webhook delivered"
                );
                Ok(())
            }
            Ok(resp) => {
                let status = resp.status();
                warn!(
                    url,
                    event = event_name,
                    delivery_id = %delivery_id,
                    status = %status,
                    "webhook rejected"
                );
                Err(NotificationFailure::Rejected(status.as_u16()))
            }
            Err(e) => {
                warn!(
                    url,
                    event = event_name,
                    delivery_id = %delivery_id,
                    error = %e,
                    "webhook request error"
                );
                Err(NotificationFailure::Transport(e.to_string()))
            }
        }
    }

    /// Send if an endpoint is configured; never fails.
    pub async fn notify(&self, url: Option<&str>, event: &WebhookEvent) -> NotificationReport {
        match url {
            Some(url) => NotificationReport::from_result(self.send(url, event).await),
            None => {
                debug!(event = event.trigger_source(), "no webhook configured, skipping");
                NotificationReport::Skipped
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> ZoomMeeting {
        ZoomMeeting::pending("zr-1", Uuid::nil(), "55667788990")
    }

    #[test]
    fn test_approval_payload_shape() {
        let json = serde_json::to_value(WebhookEvent::recording_approved(&record())).unwrap();
        assert_eq!(json["trigger_source"], "streamlit_approval");
        assert_eq!(json["status"], "approved");
        assert_eq!(json["meeting_id"], "55667788990");
        assert_eq!(json["zoom_record_id"], "zr-1");
        assert_eq!(json["project_id"], Uuid::nil().to_string());
        assert!(json.get("original_meeting_id").is_none());
    }

    #[test]
    fn test_override_payload_carries_both_ids() {
        let event = WebhookEvent::recording_overridden(&record(), "99999999999");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["trigger_source"], "streamlit_override");
        assert_eq!(json["status"], "override_approved");
        assert_eq!(json["meeting_id"], "99999999999");
        assert_eq!(json["original_meeting_id"], "55667788990");
    }

    #[test]
    fn test_creation_payload_includes_token() {
        let project = Project {
            project_id: Uuid::nil(),
            project_name: "Acme".into(),
            company_name: "Acme Inc".into(),
            hubspot_url: None,
            notes: Some("kickoff".into()),
            key_contact: None,
            meeting_type: Some("discovery".into()),
            meeting_id: None,
            meeting_number: None,
            project_token: "tok".into(),
            folder_url: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(WebhookEvent::project_created(&project)).unwrap();
        assert_eq!(json["trigger_source"], "streamlit_form");
        assert_eq!(json["project_token"], "tok");
        assert_eq!(json["notes"], "kickoff");
        assert!(json["meeting_id"].is_null());
    }

    #[test]
    fn test_report_from_failure() {
        let report = NotificationReport::from_result(Err(NotificationFailure::Rejected(500)));
        assert!(report.is_failed());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json["warning"].as_str().unwrap().contains("500"));
    }

    #[test]
    fn test_hmac_signature_deterministic() {
        let sig1 = hmac_sha256_hex("secret123", b"payload");
        let sig2 = hmac_sha256_hex("secret123", b"payload");
        assert_eq!(sig1, sig2);
        assert!(sig1.starts_with("sha256="));
        assert_ne!(sig1, hmac_sha256_hex("other", b"payload"));
    }

    #[tokio::test]
    async fn test_notify_without_url_is_skipped() {
        let notifier = WebhookNotifier::new(Duration::from_secs(1), None).unwrap();
        let report = notifier
            .notify(None, &WebhookEvent::recording_approved(&record()))
            .await;
        assert_eq!(report, NotificationReport::Skipped);
    }
}
