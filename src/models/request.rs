use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use uuid::Uuid;

/// Lifecycle state of a processing request.
///
/// Stored as lower-case text in `processing_requests.status` and used verbatim
/// in webhook payloads.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Transition table for webhook-driven status changes.
    ///
    /// A worker may skip `processing` and report `completed` straight from
    /// `pending`. `completed -> completed` is accepted so a redelivered
    /// completion webhook regenerates the report instead of failing.
    pub fn can_transition_to(self, next: ProcessingStatus) -> bool {
        use ProcessingStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Completed)
                | (Pending, Failed)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Completed, Completed)
        )
    }

    /// Every status that may move to `self`.
    pub fn predecessors(self) -> Vec<ProcessingStatus> {
        ProcessingStatus::iter()
            .filter(|from| from.can_transition_to(self))
            .collect()
    }
}

/// One CSV upload tracked end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRequest {
    pub request_id: Uuid,
    pub status: ProcessingStatus,
    /// Stored upload, relative to the media root.
    pub input_file_path: String,
    pub original_filename: String,
    /// Public URL of the generated output CSV.
    pub output_file_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One image from an input CSV row, plus its processed output once the worker
/// has stored it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub sequence_id: i64,
    pub request_id: Uuid,
    pub product_name: String,
    pub original_url: String,
    /// Processed image path, relative to the media root.
    pub processed_image_location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body returned by `POST /upload/` and `GET /status/{request_id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessingRequestResponse {
    pub request_id: Uuid,
    pub status: ProcessingStatus,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub output_file_location: Option<String>,
}

impl From<&ProcessingRequest> for ProcessingRequestResponse {
    fn from(request: &ProcessingRequest) -> Self {
        Self {
            request_id: request.request_id,
            status: request.status,
            output_file_location: request.output_file_location.clone(),
        }
    }
}
