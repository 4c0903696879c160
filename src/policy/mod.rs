//! Intake policy: minimum size and allowed aspect ratios.

use crate::config::PolicyConfig;
use ladderd_av::MediaDescriptor;
use ladderd_common::Resolution;

/// Limits a source must satisfy before any encode is scheduled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Policy {
    pub min_width: u32,
    pub min_height: u32,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self::from(&PolicyConfig::default())
    }
}

impl From<&PolicyConfig> for Policy {
    fn from(config: &PolicyConfig) -> Self {
        Self {
            min_width: config.min_resolution.width,
            min_height: config.min_resolution.height,
            min_aspect_ratio: config.min_aspect_ratio,
            max_aspect_ratio: config.max_aspect_ratio,
        }
    }
}

/// Outcome of evaluating a descriptor against a [`Policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    RejectTooSmall,
    RejectBadAspectRatio,
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    /// Message returned to the caller for a rejection.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Verdict::Accept => None,
            Verdict::RejectTooSmall => Some("video resolution is too low"),
            Verdict::RejectBadAspectRatio => Some("this aspect ratio is not allowed"),
        }
    }
}

/// Evaluate the primary video stream of `descriptor`.
pub fn evaluate(descriptor: &MediaDescriptor, policy: &Policy) -> Verdict {
    evaluate_size(descriptor.primary_size(), policy)
}

/// Evaluate a bare frame size.
///
/// The size check runs first, so a source failing both rules is reported as
/// too small. A zero dimension is always too small.
pub fn evaluate_size(size: Resolution, policy: &Policy) -> Verdict {
    if size.width == 0
        || size.height == 0
        || size.width < policy.min_width
        || size.height < policy.min_height
    {
        return Verdict::RejectTooSmall;
    }

    match size.aspect_ratio() {
        Some(ratio) if ratio >= policy.min_aspect_ratio && ratio <= policy.max_aspect_ratio => {
            Verdict::Accept
        }
        _ => Verdict::RejectBadAspectRatio,
    }
}
