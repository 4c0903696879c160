//! # ladderd-av
//!
//! The process boundary of ladderd: everything that talks to ffprobe or ffmpeg.
//!
//! This crate provides functionality for:
//! - Probing media files and normalizing the result into a [`MediaDescriptor`]
//! - Building encoder argument lists and running encodes ([`Encoder`])
//! - Detecting the external tools
//!
//! ## Example
//!
//! ```no_run
//! use ladderd_av::{FfprobeProber, Prober};
//! use std::path::Path;
//!
//! # async fn example() -> ladderd_av::Result<()> {
//! let prober = FfprobeProber::new("ffprobe");
//! let info = prober.probe(Path::new("/path/to/video.mkv")).await?;
//! println!("Primary video: {}", info.primary_size());
//! # Ok(())
//! # }
//! ```

mod command;
mod error;
pub mod encode;
pub mod probe;
pub mod tools;

// Re-exports
pub use command::{CommandError, ToolCommand, ToolOutput};
pub use encode::{encode_args, Encoder, FfmpegEncoder};
pub use error::{Error, Result};
pub use probe::{
    parse_ffprobe_output, AudioStream, FfprobeProber, MediaDescriptor, Prober, VideoStream,
};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};
