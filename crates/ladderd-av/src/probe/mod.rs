//! Media file probing module.
//!
//! Probing runs ffprobe with JSON output and normalizes the result into a
//! [`MediaDescriptor`]. The [`Prober`] trait lets callers substitute another
//! source of descriptors (tests use an in-memory table).

mod ffprobe;
mod types;

pub use ffprobe::{parse_ffprobe_output, probe_with_ffprobe};
pub use types::*;

use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A media file prober capable of building a [`MediaDescriptor`].
///
/// Implementations must be safe to share across threads (`Send + Sync`).
#[async_trait]
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe a media file at the given path.
    async fn probe(&self, path: &Path) -> Result<MediaDescriptor>;
}

/// [`Prober`] backed by the ffprobe command-line tool.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl FfprobeProber {
    /// Create a prober that runs the given ffprobe binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill ffprobe if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<MediaDescriptor> {
        probe_with_ffprobe(&self.program, path, self.timeout).await
    }
}
