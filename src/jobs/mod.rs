pub mod generator;
pub mod notifier;
pub mod processor;
pub mod queue;
pub mod storage;
pub mod store;

use crate::audio::Timepoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a synthesis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A text-to-speech job: its request parameters and current state.
///
/// `device_token` is never serialized into API responses (`#[serde(skip)]`);
/// it is only used internally to deliver a push notification on
/// completion/failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub text: String,
    /// Alternative to inline `text`: a URL the processor fetches the body
    /// from instead. Not settable through `POST /jobs`; used for
    /// internal/batch job creation.
    #[serde(rename = "textUrl", skip_serializing_if = "Option::is_none", default)]
    pub text_url: Option<String>,
    #[serde(rename = "voiceId")]
    pub voice_id: String,
    pub language: String,
    pub style: String,
    #[serde(rename = "fileId")]
    pub file_id: String,
    #[serde(rename = "deviceToken", skip_serializing)]
    #[serde(default)]
    pub device_token: String,
    #[serde(rename = "audioUrl", skip_serializing_if = "Option::is_none", default)]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timepoints: Option<Vec<Timepoint>>,
    #[serde(rename = "errorMsg", skip_serializing_if = "Option::is_none", default)]
    pub error_msg: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Build a new pending job with a freshly generated id, timestamped now.
    pub fn new(
        text: String,
        text_url: Option<String>,
        voice_id: String,
        language: String,
        style: String,
        file_id: String,
        device_token: String,
    ) -> Self {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            text,
            text_url,
            voice_id,
            language,
            style,
            file_id,
            device_token,
            audio_url: None,
            timepoints: None,
            error_msg: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_starts_pending() {
        let job = Job::new(
            "hello".into(),
            None,
            "ja-jp-female-a".into(),
            "ja-JP".into(),
            "cheerfully".into(),
            "file-1".into(),
            "device-token".into(),
        );
        assert_eq!(job.status, JobStatus::Pending);
        assert!(!job.id.is_empty());
    }

    #[test]
    fn device_token_is_never_serialized() {
        let job = Job::new(
            "hello".into(),
            None,
            "voice".into(),
            "ja-JP".into(),
            "style".into(),
            "file".into(),
            "super-secret-token".into(),
        );
        let json = serde_json::to_string(&job).unwrap();
        assert!(!json.contains("super-secret-token"));
        assert!(!json.contains("deviceToken"));
    }

    #[test]
    fn optional_fields_skip_when_none() {
        let job = Job::new(
            "hello".into(),
            None,
            "voice".into(),
            "ja-JP".into(),
            "style".into(),
            "file".into(),
            "token".into(),
        );
        let json = serde_json::to_string(&job).unwrap();
        assert!(!json.contains("audioUrl"));
        assert!(!json.contains("timepoints"));
        assert!(!json.contains("errorMsg"));
        assert!(!json.contains("textUrl"));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
