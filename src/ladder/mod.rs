//! Resolution ladder generation.
//!
//! A ladder is an ordered list of rungs, each a bounding box with its own
//! encoder arguments. For a given source every rung the source does not
//! already fit inside yields one [`EncodeJob`]. A source that fits every rung
//! gets a single job from the default mode instead.

mod fit;

pub use fit::{fit_and_snap, SNAP_TOLERANCE};

use crate::config::{LadderConfig, ModeConfig};
use ladderd_av::encode_args;
use ladderd_common::paths::sibling_with_suffix;
use ladderd_common::{Error, Resolution, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Label given to the fallback job.
pub const DEFAULT_LABEL: &str = "default";

/// Extension used when the default mode configures none.
pub const DEFAULT_EXTENSION: &str = ".mp4";

/// One configured ladder rung.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rung {
    /// The resolution string exactly as configured.
    pub label: String,
    pub target: Resolution,
    pub args: Vec<String>,
    /// Output extension, overriding the default mode's when set.
    pub extension: Option<String>,
}

impl Rung {
    /// Parse a rung from its `"WxH"` string.
    pub fn parse(
        resolution: &str,
        args: Vec<String>,
        extension: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            label: resolution.to_string(),
            target: resolution.parse()?,
            args,
            extension: extension.map(normalize_extension),
        })
    }

    fn from_config(mode: &ModeConfig) -> Result<Self> {
        let resolution = mode
            .resolution
            .as_deref()
            .ok_or_else(|| Error::resolution("", "ladder mode has no resolution"))?;
        Self::parse(resolution, mode.args.clone(), mode.file_ext.as_deref())
    }
}

/// Mode used when no rung applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultMode {
    pub args: Vec<String>,
    pub extension: String,
}

impl Default for DefaultMode {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl From<&ModeConfig> for DefaultMode {
    fn from(mode: &ModeConfig) -> Self {
        Self {
            args: mode.args.clone(),
            extension: mode
                .file_ext
                .as_deref()
                .map(normalize_extension)
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        }
    }
}

/// A fully prepared encode, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Complete encoder argument list.
    pub args: Vec<String>,
    /// `"default"` or the rung's configured resolution string.
    pub resolution: String,
    /// Output frame size passed to the encoder.
    pub size: Resolution,
}

/// Rungs plus the default mode, as loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ladder {
    rungs: Vec<Rung>,
    default_mode: DefaultMode,
}

impl Ladder {
    pub fn new(rungs: Vec<Rung>, default_mode: DefaultMode) -> Self {
        Self {
            rungs,
            default_mode,
        }
    }

    /// Build the ladder from its config section, parsing every rung resolution.
    pub fn from_config(config: &LadderConfig) -> Result<Self> {
        let rungs = config
            .modes
            .iter()
            .map(Rung::from_config)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(rungs, DefaultMode::from(&config.default_mode)))
    }

    pub fn rungs(&self) -> &[Rung] {
        &self.rungs
    }

    pub fn default_mode(&self) -> &DefaultMode {
        &self.default_mode
    }

    /// Jobs for a source of the given size at `source_path`.
    pub fn plan(&self, source: Resolution, source_path: &Path) -> Vec<EncodeJob> {
        generate(source, &self.rungs, source_path, &self.default_mode)
    }
}

/// Generate the encode jobs for one source. Never returns an empty list.
pub fn generate(
    source: Resolution,
    rungs: &[Rung],
    source_path: &Path,
    default_mode: &DefaultMode,
) -> Vec<EncodeJob> {
    let mut jobs = Vec::with_capacity(rungs.len().max(1));

    for rung in rungs {
        if source.fits_within(&rung.target) {
            continue;
        }

        let size = fit_and_snap(source, rung.target);
        let extension = rung
            .extension
            .as_deref()
            .unwrap_or(&default_mode.extension);
        let destination = sibling_with_suffix(
            source_path,
            &format!("_{}p", rung.target.height),
            extension,
        );

        jobs.push(EncodeJob {
            args: encode_args(source_path, &destination, size, &rung.args),
            source: source_path.to_path_buf(),
            destination,
            resolution: rung.label.clone(),
            size,
        });
    }

    if jobs.is_empty() {
        let destination = sibling_with_suffix(source_path, "_default", &default_mode.extension);
        jobs.push(EncodeJob {
            args: encode_args(source_path, &destination, source, &default_mode.args),
            source: source_path.to_path_buf(),
            destination,
            resolution: DEFAULT_LABEL.to_string(),
            size: source,
        });
    }

    jobs
}

/// Ensure an extension starts with a dot. An empty extension means the default.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rung(res: &str) -> Rung {
        Rung::parse(res, vec!["-crf".into(), "23".into()], None).unwrap()
    }

    fn default_mode() -> DefaultMode {
        DefaultMode {
            args: vec!["-c".into(), "copy".into()],
            extension: ".mp4".into(),
        }
    }

    #[test]
    fn test_generate_skips_rungs_the_source_fits() {
        let rungs = [rung("3840x2160"), rung("1920x1080"), rung("1280x720")];
        let jobs = generate(
            Resolution::new(1920, 1080),
            &rungs,
            Path::new("up/movie.mov"),
            &default_mode(),
        );

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].resolution, "1280x720");
        assert_eq!(jobs[0].destination, PathBuf::from("up/movie_720p.mp4"));
        assert_eq!(jobs[0].size, Resolution::new(1280, 720));
        assert_eq!(
            jobs[0].args,
            vec![
                "-i",
                "up/movie.mov",
                "-y",
                "-s:v",
                "1280x720",
                "-crf",
                "23",
                "up/movie_720p.mp4"
            ]
        );
    }

    #[test]
    fn test_generate_keeps_rung_order() {
        let rungs = [rung("1920x1080"), rung("640x360"), rung("1280x720")];
        let jobs = generate(
            Resolution::new(3840, 2160),
            &rungs,
            Path::new("a.mkv"),
            &default_mode(),
        );

        let labels: Vec<_> = jobs.iter().map(|j| j.resolution.as_str()).collect();
        assert_eq!(labels, ["1920x1080", "640x360", "1280x720"]);
        assert_eq!(jobs[1].destination, PathBuf::from("a_360p.mp4"));
    }

    #[test]
    fn test_generate_falls_back_to_default() {
        let rungs = [rung("1920x1080"), rung("1280x720")];
        let jobs = generate(
            Resolution::new(640, 480),
            &rungs,
            Path::new("clips/small.avi"),
            &default_mode(),
        );

        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.resolution, DEFAULT_LABEL);
        assert_eq!(job.size, Resolution::new(640, 480));
        assert_eq!(job.destination, PathBuf::from("clips/small_default.mp4"));
        assert_eq!(
            job.args,
            vec![
                "-i",
                "clips/small.avi",
                "-y",
                "-s:v",
                "640x480",
                "-c",
                "copy",
                "clips/small_default.mp4"
            ]
        );
    }

    #[test]
    fn test_generate_with_no_rungs() {
        let jobs = generate(
            Resolution::new(1920, 1080),
            &[],
            Path::new("x.mp4"),
            &default_mode(),
        );
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].resolution, "default");
    }

    #[test]
    fn test_rung_extension_overrides_default() {
        let webm = Rung::parse("1280x720", vec![], Some("webm")).unwrap();
        let jobs = generate(
            Resolution::new(1920, 1080),
            &[webm],
            Path::new("talk.mov"),
            &default_mode(),
        );
        assert_eq!(jobs[0].destination, PathBuf::from("talk_720p.webm"));
    }

    #[test]
    fn test_label_is_configured_string() {
        let jobs = generate(
            Resolution::new(1920, 1200),
            &[rung("1280x720")],
            Path::new("wide.mov"),
            &default_mode(),
        );
        assert_eq!(jobs[0].resolution, "1280x720");
        assert_eq!(jobs[0].size, Resolution::new(1152, 720));
        assert_eq!(jobs[0].args[4], "1152x720");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let rungs = [rung("1920x1080"), rung("1280x720"), rung("854x480")];
        let a = generate(
            Resolution::new(2560, 1440),
            &rungs,
            Path::new("d/e.mkv"),
            &default_mode(),
        );
        let b = generate(
            Resolution::new(2560, 1440),
            &rungs,
            Path::new("d/e.mkv"),
            &default_mode(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_rung_parse_rejects_bad_resolution() {
        let err = Rung::parse("1280*720", vec![], None).unwrap_err();
        assert!(matches!(err, Error::ResolutionParseFailed { .. }));
    }

    #[test]
    fn test_ladder_from_config() {
        let config = LadderConfig {
            default_mode: ModeConfig {
                resolution: None,
                args: vec!["-an".into()],
                file_ext: Some("mkv".into()),
            },
            modes: vec![ModeConfig {
                resolution: Some("1280x720".into()),
                args: vec![],
                file_ext: None,
            }],
        };

        let ladder = Ladder::from_config(&config).unwrap();
        assert_eq!(ladder.rungs().len(), 1);
        assert_eq!(ladder.default_mode().extension, ".mkv");

        let jobs = ladder.plan(Resolution::new(1920, 1080), Path::new("m.mov"));
        assert_eq!(jobs[0].destination, PathBuf::from("m_720p.mkv"));
    }

    #[test]
    fn test_ladder_from_config_requires_resolution() {
        let config = LadderConfig {
            default_mode: ModeConfig::default(),
            modes: vec![ModeConfig::default()],
        };
        assert!(Ladder::from_config(&config).is_err());
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".mp4"), ".mp4");
        assert_eq!(normalize_extension("webm"), ".webm");
        assert_eq!(normalize_extension("  "), ".mp4");
    }
}
