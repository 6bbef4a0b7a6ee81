use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

use crate::config::MailConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Outbound mail delivery.
///
/// Callers treat delivery as best-effort: errors are logged by the caller
/// and never propagated to the operation that triggered the mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

#[derive(Serialize)]
struct SendMailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mailer backed by an HTTP mail delivery API.
pub struct HttpMailer {
    client: Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Result<Self, MailError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let request_body = SendMailRequest {
            from: &self.config.from_address,
            to,
            subject,
            text: body,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_token),
            )
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api { status, body });
        }

        Ok(())
    }
}

/// Mailer that drops everything. Used when mail is disabled.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailError> {
        tracing::debug!("Mail disabled, dropping '{}' to {}", subject, to);
        Ok(())
    }
}

/// Build the mailer configured for this deployment.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    if config.enabled {
        Ok(Arc::new(HttpMailer::new(config.clone())?))
    } else {
        Ok(Arc::new(NoopMailer))
    }
}
