use crate::processor::{Outcome, ProcessError};
use crate::server::AppContext;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use ladderd_av::MediaDescriptor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const UNPARSABLE_REQUEST: &str = "cannot parse your request";
const QUEUE_CLOSED: &str = "encoder queue is shut down";

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/process", post(process))
        .route("/status", get(status))
}

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    /// Path relative to the work directory.
    pub video: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobSummary {
    pub resolution: String,
    pub output_file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MediaDescriptor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<JobSummary>>,
}

impl ProcessResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(message.into()),
            result: None,
            jobs: None,
        }
    }
}

async fn process(
    State(ctx): State<AppContext>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected process request: {}", rejection);
            return (
                StatusCode::BAD_REQUEST,
                Json(ProcessResponse::error(UNPARSABLE_REQUEST)),
            );
        }
    };

    let outcome = match ctx.processor.process(Path::new(request.video.trim())).await {
        Ok(outcome) => outcome,
        Err(ProcessError::InvalidPath(e)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ProcessResponse::error(e.to_string())),
            );
        }
        Err(ProcessError::Probe(e)) => {
            tracing::warn!("Probe failed for {:?}: {}", request.video, e);
            return (StatusCode::OK, Json(ProcessResponse::error(e.to_string())));
        }
    };

    let response = match outcome {
        Outcome::Rejected {
            verdict,
            descriptor,
        } => ProcessResponse {
            ok: false,
            error: verdict.reason().map(str::to_string),
            result: Some(descriptor),
            jobs: None,
        },
        Outcome::Accepted { descriptor, jobs } => {
            let summaries = jobs
                .iter()
                .map(|job| JobSummary {
                    resolution: job.resolution.clone(),
                    output_file: job.destination.clone(),
                })
                .collect();

            let submitted = jobs
                .into_iter()
                .map(|job| ctx.dispatcher.submit(job))
                .fold(true, |all, ok| all && ok);
            if !submitted {
                tracing::warn!("Dispatcher refused jobs for {:?}", request.video);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ProcessResponse {
                        ok: false,
                        error: Some(QUEUE_CLOSED.to_string()),
                        result: Some(descriptor),
                        jobs: None,
                    }),
                );
            }

            ProcessResponse {
                ok: true,
                error: None,
                result: Some(descriptor),
                jobs: Some(summaries),
            }
        }
    };

    (StatusCode::OK, Json(response))
}

async fn status(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(ctx.dispatcher.stats())
}
