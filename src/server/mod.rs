use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::ladder::Ladder;
use crate::notifications::{CallbackEmitter, ReportSink};
use crate::policy::Policy;
use crate::processor::Processor;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use ladderd_av::{get_tool_path, Encoder, FfmpegEncoder, FfprobeProber, Prober};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod routes_api;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub processor: Arc<Processor>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppContext {
    /// Wire the context from explicit collaborators.
    pub fn new(
        config: Config,
        prober: Arc<dyn Prober>,
        encoder: Arc<dyn Encoder>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self> {
        let ladder = Ladder::from_config(&config.ladder).context("Invalid ladder configuration")?;
        let policy = Policy::from(&config.policy);

        let processor = Processor::new(prober, policy, ladder, config.dispatch.work_dir.clone());
        let dispatcher = Dispatcher::new(config.dispatch.concurrent, encoder, sink);

        Ok(Self {
            config: Arc::new(config),
            processor: Arc::new(processor),
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Wire the context with ffprobe, ffmpeg and the HTTP callback emitter.
    pub fn from_config(config: Config) -> Result<Self> {
        let ffprobe = tool_path("ffprobe", config.tools.ffprobe_path.as_ref());
        let ffmpeg = tool_path("ffmpeg", config.tools.ffmpeg_path.as_ref());

        let prober: Arc<dyn Prober> =
            Arc::new(FfprobeProber::new(ffprobe).with_timeout(config.dispatch.probe_timeout()));
        let encoder: Arc<dyn Encoder> = Arc::new(
            FfmpegEncoder::new(ffmpeg, config.dispatch.work_dir.clone())
                .with_timeout(config.dispatch.encode_timeout()),
        );
        let sink: Arc<dyn ReportSink> = Arc::new(CallbackEmitter::new(&config.callback));

        Self::new(config, prober, encoder, sink)
    }
}

/// Resolve a tool, falling back to the bare name so a missing binary is
/// reported per request rather than at startup.
fn tool_path(name: &str, configured: Option<&PathBuf>) -> PathBuf {
    get_tool_path(name, configured.map(|p| p.as_path())).unwrap_or_else(|e| {
        tracing::warn!("{}; requests needing it will fail", e);
        PathBuf::from(name)
    })
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes_api::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let ctx = AppContext::from_config(config)?;
    serve(ctx).await
}

/// Serve until a shutdown signal arrives, then drain the dispatcher.
pub async fn serve(ctx: AppContext) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port)
        .parse()
        .context("Invalid server address")?;

    let dispatcher = ctx.dispatcher.clone();
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Waiting for running encodes to finish");
    dispatcher.shutdown().await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
