//! Zoom REST client for the meeting recordings endpoint.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::MeetingLookup;
use crate::models::meeting::MeetingDetails;

pub struct ZoomClient {
    base_url: String,
    access_token: String,
    http: Client,
}

impl ZoomClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("failed to build Zoom HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            http,
        })
    }

    fn recordings_url(&self, meeting_id: &str) -> String {
        format!(
            "{}/meetings/{}/recordings",
            self.base_url,
            urlencoding::encode(meeting_id)
        )
    }
}

#[async_trait]
impl MeetingLookup for ZoomClient {
    async fn fetch(&self, meeting_id: &str) -> anyhow::Result<Option<MeetingDetails>> {
        let resp = self
            .http
            .get(self.recordings_url(meeting_id))
            .bearer_auth(&self.access_token)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Zoom request failed")?;

        match resp.status() {
            StatusCode::OK => {
                let details = resp
                    .json::<MeetingDetails>()
                    .await
                    .context("invalid Zoom recordings response")?;
                tracing::debug!(meeting_id, files = details.recording_files.len(), "meeting loaded");
                Ok(Some(details))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = resp.text().await.unwrap_or_default();
                let snippet: String = body.chars().take(200).collect();
                anyhow::bail!("Zoom returned {}: {}", status, snippet)
            }
        }
    }
}
