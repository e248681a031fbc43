use std::time::Duration;

use uuid::Uuid;

use crate::models::request::ProcessingStatus;
use crate::models::webhook::CompletionEvent;

/// Delivers status notifications to the completion webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub async fn notify(
        &self,
        request_id: Uuid,
        status: ProcessingStatus,
    ) -> Result<(), NotifyError> {
        let event = CompletionEvent { request_id, status };
        let response = self.client.post(&self.url).json(&event).send().await?;

        let code = response.status();
        if !code.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: code.as_u16(),
                body,
            });
        }

        tracing::debug!(request_id = %request_id, status = %status, "Webhook delivered");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook rejected with {status}: {body}")]
    Rejected { status: u16, body: String },
}
