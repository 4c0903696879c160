//! FFprobe-based media probing.

use super::types::*;
use crate::command::ToolCommand;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    codec_long_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[allow(dead_code)]
    nb_streams: Option<u32>,
    format_name: Option<String>,
    format_long_name: Option<String>,
    duration: Option<String>,
    bit_rate: Option<String>,
}

/// Probe a media file by running `program` (an ffprobe binary).
pub async fn probe_with_ffprobe(
    program: &Path,
    path: &Path,
    timeout: Option<Duration>,
) -> Result<MediaDescriptor> {
    let output = ToolCommand::new(program.to_path_buf())
        .args([
            "-hide_banner",
            "-loglevel",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-i",
        ])
        .arg(path.to_string_lossy())
        .timeout(timeout)
        .execute()
        .await
        .map_err(|e| {
            if e.is_not_found() {
                tracing::warn!("ffprobe binary {:?} not found", program);
            }
            Error::probe_failed(e.to_string())
        })?;

    parse_ffprobe_output(&output.stdout)
}

/// Parse ffprobe's `-print_format json -show_format -show_streams` output.
///
/// # Errors
///
/// - [`Error::ProbeParseFailed`] for malformed JSON or numeric fields.
/// - [`Error::NoVideoStream`] when the file has no video stream.
pub fn parse_ffprobe_output(json: &[u8]) -> Result<MediaDescriptor> {
    let output: FfprobeOutput =
        serde_json::from_slice(json).map_err(|e| Error::parse_error(e.to_string()))?;

    let mut videos = Vec::new();
    let mut audios = Vec::new();

    for stream in output.streams {
        match stream.codec_type.as_deref() {
            Some("video") => {
                let frame_rate = match stream.r_frame_rate.as_deref() {
                    Some(rate) => parse_frame_rate(rate)?,
                    None => 0,
                };
                videos.push(VideoStream {
                    index: stream.index,
                    codec: stream.codec_name.unwrap_or_default(),
                    codec_long_name: stream.codec_long_name.unwrap_or_default(),
                    width: stream.width.unwrap_or(0),
                    height: stream.height.unwrap_or(0),
                    frame_rate,
                });
            }
            Some("audio") => {
                let sample_rate = match stream.sample_rate.as_deref() {
                    Some(rate) if !rate.is_empty() => rate.parse::<u32>().map_err(|e| {
                        Error::parse_error(format!("sample_rate '{rate}': {e}"))
                    })?,
                    _ => 0,
                };
                audios.push(AudioStream {
                    index: stream.index,
                    codec: stream.codec_name.unwrap_or_default(),
                    codec_long_name: stream.codec_long_name.unwrap_or_default(),
                    sample_rate,
                    channels: stream.channels.unwrap_or(0),
                });
            }
            _ => {}
        }
    }

    let format = output.format;
    let duration_ms = parse_duration_ms(format.duration.as_deref().unwrap_or(""))?;
    let bit_rate = parse_bit_rate(format.bit_rate.as_deref().unwrap_or(""))?;
    let label = format!(
        "{}; {}",
        format.format_name.unwrap_or_default(),
        format.format_long_name.unwrap_or_default()
    );

    MediaDescriptor::new(label, duration_ms, bit_rate, videos, audios)
}

/// Parse a rational `"N/D"` frame rate into whole frames per second.
///
/// A zero denominator or a value without exactly one `/` yields 0.
fn parse_frame_rate(rate: &str) -> Result<u32> {
    let parts: Vec<&str> = rate.split('/').collect();
    if parts.len() != 2 {
        return Ok(0);
    }

    let num: u64 = parts[0]
        .parse()
        .map_err(|e| Error::parse_error(format!("r_frame_rate '{rate}': {e}")))?;
    let den: u64 = parts[1]
        .parse()
        .map_err(|e| Error::parse_error(format!("r_frame_rate '{rate}': {e}")))?;

    if den == 0 {
        return Ok(0);
    }
    Ok(u32::try_from(num / den).unwrap_or(u32::MAX))
}

/// Convert decimal seconds into whole milliseconds, truncating.
fn parse_duration_ms(seconds: &str) -> Result<u64> {
    let secs: f64 = seconds
        .parse()
        .map_err(|e| Error::parse_error(format!("duration '{seconds}': {e}")))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(Error::parse_error(format!(
            "duration '{seconds}' is out of range"
        )));
    }
    Ok((secs * 1000.0) as u64)
}

fn parse_bit_rate(bit_rate: &str) -> Result<u64> {
    bit_rate
        .parse()
        .map_err(|e| Error::parse_error(format!("bit_rate '{bit_rate}': {e}")))
}
