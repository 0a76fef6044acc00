//! Meeting details fetched from the meeting platform for override previews.
//! Never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeetingDetails {
    /// The platform sends numeric ids; they are kept as strings.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub topic: String,
    pub start_time: Option<DateTime<Utc>>,
    /// Minutes.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub host_email: String,
    #[serde(default)]
    pub recording_files: Vec<RecordingFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordingFile {
    pub id: String,
    pub file_type: String,
    #[serde(default)]
    pub file_extension: String,
    /// Bytes. Transcripts usually come without a size.
    pub file_size: Option<u64>,
    pub download_url: String,
    pub status: String,
}

impl RecordingFile {
    pub fn size_mb(&self) -> Option<f64> {
        self.file_size.map(|b| b as f64 / (1024.0 * 1024.0))
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected meeting id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_is_stringified() {
        let json = r#"{"id": 98765432100, "topic": "Strategy", "duration": 45}"#;
        let m: MeetingDetails = serde_json::from_str(json).unwrap();
        assert_eq!(m.id, "98765432100");
        assert!(m.recording_files.is_empty());
        assert!(m.start_time.is_none());
    }

    #[test]
    fn test_object_id_is_rejected() {
        let json = r#"{"id": {"x": 1}}"#;
        assert!(serde_json::from_str::<MeetingDetails>(json).is_err());
    }

    #[test]
    fn test_size_mb() {
        let f = RecordingFile {
            id: "rec".into(),
            file_type: "MP4".into(),
            file_extension: "mp4".into(),
            file_size: Some(2 * 1024 * 1024),
            download_url: "https://example.com/a.mp4".into(),
            status: "completed".into(),
        };
        assert_eq!(f.size_mb(), Some(2.0));
    }
}
