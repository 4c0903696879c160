//! Intake pipeline: probe a source, apply policy, and plan its ladder.

use crate::ladder::{EncodeJob, Ladder};
use crate::policy::{self, Policy, Verdict};
use ladderd_av::{MediaDescriptor, Prober};
use ladderd_common::paths::resolve_in_root;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The request path is absolute or leaves the work directory.
    #[error(transparent)]
    InvalidPath(#[from] ladderd_common::Error),

    #[error(transparent)]
    Probe(#[from] ladderd_av::Error),
}

/// What intake decided for one source.
#[derive(Debug, Clone)]
pub enum Outcome {
    Rejected {
        verdict: Verdict,
        descriptor: MediaDescriptor,
    },
    Accepted {
        descriptor: MediaDescriptor,
        jobs: Vec<EncodeJob>,
    },
}

impl Outcome {
    pub fn descriptor(&self) -> &MediaDescriptor {
        match self {
            Outcome::Rejected { descriptor, .. } | Outcome::Accepted { descriptor, .. } => {
                descriptor
            }
        }
    }
}

/// Turns a request path into encode jobs. Does not run anything.
pub struct Processor {
    prober: Arc<dyn Prober>,
    policy: Policy,
    ladder: Ladder,
    work_dir: PathBuf,
}

impl Processor {
    pub fn new(
        prober: Arc<dyn Prober>,
        policy: Policy,
        ladder: Ladder,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            prober,
            policy,
            ladder,
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Process a path relative to the work directory.
    ///
    /// Jobs reference `relative` itself, since encodes run inside the work
    /// directory.
    pub async fn process(&self, relative: &Path) -> Result<Outcome, ProcessError> {
        let on_disk = resolve_in_root(&self.work_dir, relative)?;
        self.assess(&on_disk, relative).await
    }

    /// Probe `probe_path` and plan jobs whose source is `source_path`.
    pub async fn assess(
        &self,
        probe_path: &Path,
        source_path: &Path,
    ) -> Result<Outcome, ProcessError> {
        tracing::debug!("Probing {:?} with {}", probe_path, self.prober.name());
        let descriptor = self.prober.probe(probe_path).await?;

        let verdict = policy::evaluate(&descriptor, &self.policy);
        if !verdict.is_accept() {
            tracing::info!(
                size = %descriptor.primary_size(),
                "Rejected {:?}: {:?}",
                source_path,
                verdict
            );
            return Ok(Outcome::Rejected {
                verdict,
                descriptor,
            });
        }

        let jobs = self.ladder.plan(descriptor.primary_size(), source_path);
        tracing::info!(
            size = %descriptor.primary_size(),
            jobs = jobs.len(),
            "Accepted {:?}",
            source_path
        );

        Ok(Outcome::Accepted { descriptor, jobs })
    }
}
