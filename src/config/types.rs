use ladderd_common::Resolution;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub callback: CallbackConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub ladder: LadderConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Root that request paths are resolved against; also the encoder's cwd.
    #[serde(default = "default_work_dir", alias = "work_dir_path")]
    pub work_dir: PathBuf,

    /// Maximum number of encodes running at once.
    #[serde(default = "default_concurrent")]
    pub concurrent: usize,

    /// Kill an encode after this many seconds (unset or 0 = never).
    #[serde(default)]
    pub encode_timeout_secs: Option<u64>,

    /// Kill ffprobe after this many seconds (unset or 0 = never).
    #[serde(default)]
    pub probe_timeout_secs: Option<u64>,
}

impl DispatchConfig {
    pub fn encode_timeout(&self) -> Option<Duration> {
        seconds(self.encode_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        seconds(self.probe_timeout_secs)
    }
}

fn seconds(secs: Option<u64>) -> Option<Duration> {
    secs.filter(|secs| *secs > 0).map(Duration::from_secs)
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_concurrent() -> usize {
    2
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            concurrent: default_concurrent(),
            encode_timeout_secs: None,
            probe_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackConfig {
    /// Endpoint receiving one POST per finished job. Reports are only logged when unset.
    #[serde(default)]
    pub url: Option<String>,

    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_callback_timeout")]
    pub timeout_secs: u64,
}

fn default_callback_timeout() -> u64 {
    10
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_callback_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    #[serde(default = "default_min_resolution", alias = "min_res")]
    pub min_resolution: Resolution,

    #[serde(default = "default_min_aspect_ratio", alias = "asr_min")]
    pub min_aspect_ratio: f64,

    #[serde(default = "default_max_aspect_ratio", alias = "asr_max")]
    pub max_aspect_ratio: f64,
}

fn default_min_resolution() -> Resolution {
    Resolution::new(1, 1)
}

fn default_min_aspect_ratio() -> f64 {
    0.0
}

fn default_max_aspect_ratio() -> f64 {
    100.0
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_resolution: default_min_resolution(),
            min_aspect_ratio: default_min_aspect_ratio(),
            max_aspect_ratio: default_max_aspect_ratio(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LadderConfig {
    /// Mode used when no configured rung applies.
    #[serde(default)]
    pub default_mode: ModeConfig,

    /// Ladder rungs, tried in order.
    #[serde(default)]
    pub modes: Vec<ModeConfig>,
}

/// One encode mode as written in the config file.
///
/// `resolution` is required for rungs and ignored for the default mode.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModeConfig {
    #[serde(default)]
    pub resolution: Option<String>,

    /// Encoder arguments inserted between the size flag and the output path.
    #[serde(default, alias = "ffargs")]
    pub args: Vec<String>,

    /// Output extension including the dot (default: ".mp4")
    #[serde(default)]
    pub file_ext: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
