//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires a full [`AppContext`] around an
//! in-memory [`FakeProber`], a [`FakeEncoder`] that records every invocation,
//! and a [`CollectingSink`] that keeps every completion report.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ladderd::config::{Config, ModeConfig};
use ladderd::notifications::{CompletionReport, ReportSink};
use ladderd::server::{create_router, AppContext};
use ladderd_av::{AudioStream, Encoder, MediaDescriptor, Prober, VideoStream};
use ladderd_common::Resolution;
use parking_lot::Mutex;

/// Work directory every harness resolves request paths against.
pub const WORK_DIR: &str = "/media";

/// Build a descriptor with one video stream of the given size and one audio stream.
pub fn descriptor(width: u32, height: u32) -> MediaDescriptor {
    MediaDescriptor::new(
        "mov,mp4,m4a,3gp,3g2,mj2; QuickTime / MOV",
        12_345,
        4_000_000,
        vec![VideoStream {
            index: 0,
            codec: "h264".to_string(),
            codec_long_name: "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10".to_string(),
            width,
            height,
            frame_rate: 29,
        }],
        vec![AudioStream {
            index: 1,
            codec: "aac".to_string(),
            codec_long_name: "AAC (Advanced Audio Coding)".to_string(),
            sample_rate: 48_000,
            channels: 2,
        }],
    )
    .expect("descriptor has a video stream")
}

/// Prober answering from a fixed table keyed by on-disk path.
#[derive(Default)]
pub struct FakeProber {
    sizes: HashMap<PathBuf, Resolution>,
}

impl FakeProber {
    pub fn with(mut self, relative: &str, width: u32, height: u32) -> Self {
        self.sizes.insert(
            Path::new(WORK_DIR).join(relative),
            Resolution::new(width, height),
        );
        self
    }
}

#[async_trait]
impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn probe(&self, path: &Path) -> ladderd_av::Result<MediaDescriptor> {
        match self.sizes.get(path) {
            Some(size) => Ok(descriptor(size.width, size.height)),
            None => Err(ladderd_av::Error::probe_failed(format!(
                "ffprobe exited with exit status: 1 for {}",
                path.display()
            ))),
        }
    }
}

/// Encoder that sleeps briefly, tracks peak concurrency, and fails any job
/// whose output path contains `"fail"`.
pub struct FakeEncoder {
    pub calls: Mutex<Vec<Vec<String>>>,
    current: AtomicUsize,
    peak: AtomicUsize,
    delay: Duration,
}

impl FakeEncoder {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Encoder for FakeEncoder {
    async fn encode(&self, args: &[String]) -> ladderd_av::Result<()> {
        self.calls.lock().push(args.to_vec());

        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);

        match args.last() {
            Some(output) if output.contains("fail") => Err(ladderd_av::Error::encode_failed(
                "ffmpeg exited with exit status: 1: Conversion failed!",
            )),
            _ => Ok(()),
        }
    }
}

/// Sink that keeps every report it receives.
#[derive(Default)]
pub struct CollectingSink {
    pub reports: Mutex<Vec<CompletionReport>>,
}

impl CollectingSink {
    pub fn reports(&self) -> Vec<CompletionReport> {
        self.reports.lock().clone()
    }
}

#[async_trait]
impl ReportSink for CollectingSink {
    async fn emit(&self, report: &CompletionReport) {
        self.reports.lock().push(report.clone());
    }
}

/// Config with a three-rung ladder and a 640x360 minimum.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.dispatch.work_dir = PathBuf::from(WORK_DIR);
    config.dispatch.concurrent = 2;
    config.policy.min_resolution = Resolution::new(640, 360);
    config.policy.min_aspect_ratio = 1.0;
    config.policy.max_aspect_ratio = 2.5;
    config.ladder.default_mode = ModeConfig {
        resolution: None,
        args: vec!["-c:v".into(), "libx264".into()],
        file_ext: Some(".mp4".into()),
    };
    config.ladder.modes = ["1920x1080", "1280x720", "854x480"]
        .into_iter()
        .map(|res| ModeConfig {
            resolution: Some(res.to_string()),
            args: vec!["-crf".into(), "23".into()],
            file_ext: None,
        })
        .collect();
    config
}

/// Test harness wrapping a fully-constructed [`AppContext`] with fake collaborators.
pub struct TestHarness {
    pub ctx: AppContext,
    pub encoder: Arc<FakeEncoder>,
    pub sink: Arc<CollectingSink>,
}

impl TestHarness {
    pub fn new(prober: FakeProber) -> Self {
        Self::with_config(test_config(), prober)
    }

    pub fn with_config(config: Config, prober: FakeProber) -> Self {
        let encoder = Arc::new(FakeEncoder::new(Duration::from_millis(10)));
        let sink = Arc::new(CollectingSink::default());

        let ctx = AppContext::new(config, Arc::new(prober), encoder.clone(), sink.clone())
            .expect("failed to build app context");

        Self { ctx, encoder, sink }
    }

    /// Start an Axum server on a random port.
    pub async fn with_server(prober: FakeProber) -> (Self, SocketAddr) {
        let harness = Self::new(prober);
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Wait until every submitted job has run and reported.
    pub async fn drain(&self) {
        self.ctx.dispatcher.shutdown().await;
    }
}
