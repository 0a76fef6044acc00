use async_trait::async_trait;

use super::MeetingLookup;
use crate::models::meeting::MeetingDetails;

const SAMPLE_MEETINGS: &str = include_str!("fixtures/meetings.json");

/// Static meeting catalogue used when no platform credentials are configured.
pub struct FixtureLookup {
    meetings: Vec<MeetingDetails>,
}

impl FixtureLookup {
    pub fn new(meetings: Vec<MeetingDetails>) -> Self {
        Self { meetings }
    }

    /// The bundled sample meetings.
    pub fn samples() -> anyhow::Result<Self> {
        let meetings: Vec<MeetingDetails> = serde_json::from_str(SAMPLE_MEETINGS)?;
        Ok(Self::new(meetings))
    }
}

#[async_trait]
impl MeetingLookup for FixtureLookup {
    async fn fetch(&self, meeting_id: &str) -> anyhow::Result<Option<MeetingDetails>> {
        Ok(self.meetings.iter().find(|m| m.id == meeting_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_samples_parse_and_resolve() {
        let lookup = FixtureLookup::samples().unwrap();

        let m = lookup.fetch("98765432100").await.unwrap().unwrap();
        assert_eq!(m.topic, "Client Strategy Call");
        assert_eq!(m.recording_files.len(), 2);
        assert!(m.recording_files[1].file_size.is_none());

        let empty = lookup.fetch("55667788990").await.unwrap().unwrap();
        assert!(empty.recording_files.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_meeting_is_none() {
        let lookup = FixtureLookup::samples().unwrap();
        assert!(lookup.fetch("00000000000").await.unwrap().is_none());
    }
}
