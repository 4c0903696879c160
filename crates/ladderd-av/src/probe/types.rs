//! Normalized media descriptor types.

use crate::{Error, Result};
use ladderd_common::Resolution;
use serde::{Deserialize, Serialize};

/// A decoded video stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStream {
    /// Stream index as reported by the prober.
    pub index: u32,
    /// Short codec name (e.g., "h264", "hevc").
    pub codec: String,
    /// Descriptive codec name.
    pub codec_long_name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frames per second, truncated. Zero when the prober gave no usable rate.
    pub frame_rate: u32,
}

impl VideoStream {
    /// Frame size of this stream.
    pub fn size(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// A decoded audio stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioStream {
    /// Stream index as reported by the prober.
    pub index: u32,
    /// Short codec name (e.g., "aac", "opus").
    pub codec: String,
    /// Descriptive codec name.
    pub codec_long_name: String,
    /// Sample rate in Hz. Zero when absent.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u32,
}

/// The normalized result of probing one file.
///
/// Always holds at least one video stream; [`MediaDescriptor::new`] refuses
/// to build one otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDescriptor {
    stream_count: usize,
    format: String,
    duration_ms: u64,
    bit_rate: u64,
    videos: Vec<VideoStream>,
    audios: Vec<AudioStream>,
    has_multiple_video_streams: bool,
    has_multiple_audio_streams: bool,
}

impl MediaDescriptor {
    /// Assemble a descriptor from already-normalized parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoVideoStream`] when `videos` is empty.
    pub fn new(
        format: impl Into<String>,
        duration_ms: u64,
        bit_rate: u64,
        videos: Vec<VideoStream>,
        audios: Vec<AudioStream>,
    ) -> Result<Self> {
        if videos.is_empty() {
            return Err(Error::NoVideoStream);
        }

        Ok(Self {
            stream_count: videos.len() + audios.len(),
            format: format.into(),
            duration_ms,
            bit_rate,
            has_multiple_video_streams: videos.len() > 1,
            has_multiple_audio_streams: audios.len() > 1,
            videos,
            audios,
        })
    }

    /// Number of video plus audio streams.
    pub fn stream_count(&self) -> usize {
        self.stream_count
    }

    /// Container format label.
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Overall bit rate in bits per second.
    pub fn bit_rate(&self) -> u64 {
        self.bit_rate
    }

    pub fn videos(&self) -> &[VideoStream] {
        &self.videos
    }

    pub fn audios(&self) -> &[AudioStream] {
        &self.audios
    }

    pub fn has_multiple_video_streams(&self) -> bool {
        self.has_multiple_video_streams
    }

    pub fn has_multiple_audio_streams(&self) -> bool {
        self.has_multiple_audio_streams
    }

    /// The first video stream, which drives policy and ladder decisions.
    pub fn primary_video(&self) -> &VideoStream {
        &self.videos[0]
    }

    /// Frame size of the primary video stream.
    pub fn primary_size(&self) -> Resolution {
        self.primary_video().size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(index: u32) -> VideoStream {
        VideoStream {
            index,
            codec: "h264".to_string(),
            codec_long_name: "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10".to_string(),
            width: 1920,
            height: 1080,
            frame_rate: 29,
        }
    }

    fn audio(index: u32) -> AudioStream {
        AudioStream {
            index,
            codec: "aac".to_string(),
            codec_long_name: "AAC (Advanced Audio Coding)".to_string(),
            sample_rate: 48000,
            channels: 2,
        }
    }

    #[test]
    fn test_requires_video() {
        let result = MediaDescriptor::new("mp4", 1000, 1, vec![], vec![audio(0)]);
        assert!(matches!(result, Err(Error::NoVideoStream)));
    }

    #[test]
    fn test_flags_and_counts() {
        let single = MediaDescriptor::new("mp4", 1000, 1, vec![video(0)], vec![audio(1)]).unwrap();
        assert_eq!(single.stream_count(), 2);
        assert!(!single.has_multiple_video_streams());
        assert!(!single.has_multiple_audio_streams());

        let multi = MediaDescriptor::new(
            "mkv",
            1000,
            1,
            vec![video(0), video(1)],
            vec![audio(2), audio(3), audio(4)],
        )
        .unwrap();
        assert_eq!(multi.stream_count(), 5);
        assert!(multi.has_multiple_video_streams());
        assert!(multi.has_multiple_audio_streams());
        assert_eq!(multi.primary_video().index, 0);
        assert_eq!(multi.primary_size(), Resolution::new(1920, 1080));
    }
}
