//! Email delivery
//!
//! The send operation is a trait seam so the handler can be tested with an
//! in-memory stub; the real implementation posts to the transactional-email
//! HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("email API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email API returned {status}: {detail}")]
    Api {
        status: reqwest::StatusCode,
        detail: String,
    },
}

/// One outbound message, shaped like the delivery API's send request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError>;
}

const SEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Resend-backed sender
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
}

impl ResendMailer {
    pub fn new(api_key: String) -> Result<Self, MailerError> {
        let client = reqwest::Client::builder()
            .user_agent("starshot-contact")
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        let response = self
            .client
            .post(SEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(MailerError::Api { status, detail });
        }
        Ok(())
    }
}
