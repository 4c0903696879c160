pub mod callback;

pub use callback::{CallbackClient, CallbackEmitter};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal state of one encode job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Succeeded,
    Failed,
}

/// The outcome of one encode job, as posted to the callback endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub status: ReportStatus,

    /// Present iff the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "origin_file")]
    pub source: PathBuf,

    #[serde(rename = "output_file")]
    pub destination: PathBuf,

    pub resolution: String,
}

impl CompletionReport {
    pub fn succeeded(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        resolution: impl Into<String>,
    ) -> Self {
        Self {
            status: ReportStatus::Succeeded,
            error: None,
            source: source.into(),
            destination: destination.into(),
            resolution: resolution.into(),
        }
    }

    pub fn failed(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        resolution: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            error: Some(error.into()),
            source: source.into(),
            destination: destination.into(),
            resolution: resolution.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReportStatus::Succeeded
    }
}

/// Receives one report per finished job.
///
/// Delivery is best-effort: implementations log their own failures and never
/// hand them back to the dispatcher.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn emit(&self, report: &CompletionReport);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_report_json() {
        let report = CompletionReport::succeeded("in/a.mov", "in/a_720p.mp4", "1280x720");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "succeeded",
                "origin_file": "in/a.mov",
                "output_file": "in/a_720p.mp4",
                "resolution": "1280x720"
            })
        );
    }

    #[test]
    fn test_failure_report_json() {
        let report = CompletionReport::failed("a.mov", "a_default.mp4", "default", "boom");
        assert!(!report.is_success());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["resolution"], "default");
    }
}
