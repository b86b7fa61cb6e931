use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::MailConfig;

use super::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), TransportError>;
}

pub struct HttpMailTransport {
    http_client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpMailTransport {
    pub fn new(config: &MailConfig, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build mail transport client")?;

        Ok(Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        let url = format!("{}/send", self.base_url);
        let mut request = self.http_client.post(&url).json(message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_string());
        Err(TransportError::Rejected { status, body })
    }
}
