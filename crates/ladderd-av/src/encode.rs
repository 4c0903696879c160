//! Encoder invocation.
//!
//! Every encode is a single ffmpeg run with the argument shape
//! `-i <input> -y -s:v <W>x<H> <mode args...> <output>`, executed inside the
//! configured work root so relative request paths resolve there.

use crate::command::{CommandError, ToolCommand};
use crate::{Error, Result};
use async_trait::async_trait;
use ladderd_common::Resolution;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How many trailing stderr lines are kept in a failure message.
const STDERR_TAIL_LINES: usize = 10;

/// Build the full encoder argument list for one output.
pub fn encode_args(
    input: &Path,
    output: &Path,
    size: Resolution,
    mode_args: &[String],
) -> Vec<String> {
    let mut args = Vec::with_capacity(mode_args.len() + 6);
    args.extend([
        "-i".to_string(),
        input.to_string_lossy().to_string(),
        "-y".to_string(),
        "-s:v".to_string(),
        size.to_string(),
    ]);
    args.extend(mode_args.iter().cloned());
    args.push(output.to_string_lossy().to_string());
    args
}

/// Runs one prepared encode to completion.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Execute the encoder with a fully materialized argument list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncodeInvocationFailed`] when the process cannot be
    /// spawned or does not exit successfully.
    async fn encode(&self, args: &[String]) -> Result<()>;
}

/// [`Encoder`] backed by the ffmpeg command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
    work_dir: PathBuf,
    timeout: Option<Duration>,
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
            timeout: None,
        }
    }

    /// Kill ffmpeg if a single encode runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(&self, args: &[String]) -> Result<()> {
        ToolCommand::new(self.program.clone())
            .args(args.iter().cloned())
            .current_dir(&self.work_dir)
            .timeout(self.timeout)
            .execute()
            .await
            .map(|_| ())
            .map_err(|e| Error::encode_failed(describe_failure(&e)))
    }
}

fn describe_failure(err: &CommandError) -> String {
    match err {
        CommandError::Failed { tool, status, stderr } => {
            let tail = tail_lines(stderr, STDERR_TAIL_LINES);
            if tail.is_empty() {
                format!("{tool} exited with {status}")
            } else {
                format!("{tool} exited with {status}: {tail}")
            }
        }
        other => other.to_string(),
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
