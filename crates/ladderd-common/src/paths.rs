//! Path utilities for deriving output files and confining request paths.
//!
//! Output files are written next to their source: the source's final
//! extension is replaced by a suffix plus the output extension. Request paths
//! are always interpreted relative to a configured work root and may not
//! leave it.

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Strip the final extension from a path, keeping its directory.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ladderd_common::paths::strip_extension;
///
/// assert_eq!(strip_extension(Path::new("a/b/movie.mkv")), Path::new("a/b/movie"));
/// assert_eq!(strip_extension(Path::new("movie")), Path::new("movie"));
/// ```
pub fn strip_extension(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Build `stem(source) + suffix + extension`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ladderd_common::paths::sibling_with_suffix;
///
/// let out = sibling_with_suffix(Path::new("up/talk.mov"), "_720p", ".mp4");
/// assert_eq!(out, Path::new("up/talk_720p.mp4"));
/// ```
pub fn sibling_with_suffix(source: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut name: OsString = strip_extension(source).into_os_string();
    name.push(suffix);
    name.push(extension);
    PathBuf::from(name)
}

/// Check that a request path is relative and never climbs out of its root.
pub fn validate_relative(rel: &Path) -> Result<()> {
    if rel.as_os_str().is_empty() {
        return Err(Error::invalid_path("empty path"));
    }

    for component in rel.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::invalid_path(format!(
                    "{} must not contain '..'",
                    rel.display()
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::invalid_path(format!(
                    "{} must be relative to the work directory",
                    rel.display()
                )));
            }
        }
    }

    Ok(())
}

/// Join a validated request path onto the work root.
pub fn resolve_in_root(root: &Path, rel: &Path) -> Result<PathBuf> {
    validate_relative(rel)?;
    Ok(root.join(rel))
}
