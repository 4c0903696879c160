use super::{CompletionReport, ReportSink};
use crate::config::CallbackConfig;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// HTTP client for the completion callback endpoint.
pub struct CallbackClient {
    client: Client,
    url: String,
}

impl CallbackClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            url: url.into(),
        }
    }

    /// POST one report. Non-success statuses are errors.
    pub async fn post(&self, report: &CompletionReport) -> Result<()> {
        let response = self.client.post(&self.url).json(report).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("callback rejected ({}): {}", status, body);
        }

        Ok(())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// [`ReportSink`] that posts to the configured callback URL, or only logs when
/// none is configured. Never retries.
pub struct CallbackEmitter {
    client: Option<CallbackClient>,
}

impl CallbackEmitter {
    pub fn new(config: &CallbackConfig) -> Self {
        let client = config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| CallbackClient::new(url, Duration::from_secs(config.timeout_secs)));

        Self { client }
    }

    pub fn has_target(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl ReportSink for CallbackEmitter {
    async fn emit(&self, report: &CompletionReport) {
        let Some(client) = &self.client else {
            tracing::info!(
                status = ?report.status,
                resolution = %report.resolution,
                output = %report.destination.display(),
                error = report.error.as_deref().unwrap_or(""),
                "Job finished (no callback configured)"
            );
            return;
        };

        match client.post(report).await {
            Ok(()) => {
                tracing::debug!(
                    resolution = %report.resolution,
                    output = %report.destination.display(),
                    "Callback delivered to {}",
                    client.url()
                );
            }
            Err(e) => {
                tracing::warn!(
                    resolution = %report.resolution,
                    output = %report.destination.display(),
                    error = %e,
                    "Failed to deliver callback to {}",
                    client.url()
                );
            }
        }
    }
}
