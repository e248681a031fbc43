use std::collections::BTreeMap;

use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::request::ProcessingStatus;

/// Field name to validation messages, returned as the body of a 400.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Raw completion webhook body as delivered by the worker.
///
/// Fields stay optional strings so that a missing or malformed value is
/// reported per field instead of as a single deserialization failure.
#[derive(Debug, Deserialize, Validate)]
pub struct WebhookPayload {
    #[garde(required, custom(parses_as_uuid))]
    pub request_id: Option<String>,

    #[garde(required, custom(is_known_status))]
    pub status: Option<String>,
}

/// A validated status notification for one processing request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionEvent {
    pub request_id: Uuid,
    pub status: ProcessingStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub message: String,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self {
            message: "Webhook received successfully.".to_string(),
        }
    }
}

fn parses_as_uuid(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(raw) if Uuid::parse_str(raw.trim()).is_err() => {
            Err(garde::Error::new("must be a valid UUID"))
        }
        _ => Ok(()),
    }
}

fn is_known_status(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(raw) if raw.trim().parse::<ProcessingStatus>().is_err() => Err(garde::Error::new(
            format!("\"{raw}\" is not one of pending, processing, completed, failed"),
        )),
        _ => Ok(()),
    }
}

impl WebhookPayload {
    /// Validate the payload and convert it into a typed event.
    pub fn into_event(self) -> Result<CompletionEvent, FieldErrors> {
        if let Err(report) = self.validate() {
            let mut errors = FieldErrors::new();
            for (path, error) in report.iter() {
                errors
                    .entry(path.to_string())
                    .or_default()
                    .push(error.message().to_string());
            }
            return Err(errors);
        }

        let request_id = self
            .request_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok());
        let status = self
            .status
            .as_deref()
            .and_then(|raw| raw.trim().parse::<ProcessingStatus>().ok());

        match (request_id, status) {
            (Some(request_id), Some(status)) => Ok(CompletionEvent { request_id, status }),
            _ => Err(FieldErrors::from([(
                "body".to_string(),
                vec!["request_id and status are required".to_string()],
            )])),
        }
    }
}
