pub mod fixture;
pub mod zoom;

use async_trait::async_trait;

use crate::models::meeting::MeetingDetails;

/// Source of meeting details for override previews.
/// Implementations: `ZoomClient` (live REST API), `FixtureLookup` (built-in samples).
#[async_trait]
pub trait MeetingLookup: Send + Sync {
    /// `Ok(None)` when the platform has no such meeting.
    async fn fetch(&self, meeting_id: &str) -> anyhow::Result<Option<MeetingDetails>>;
}
