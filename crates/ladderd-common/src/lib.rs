//! ladderd-common: shared types and helpers.
//!
//! This crate provides functionality used across ladderd:
//!
//! - **Resolution**: the `"<width>x<height>"` value used by configuration,
//!   encoder arguments, and completion reports
//! - **Path Utilities**: output path derivation and work-root containment
//! - **Error Handling**: common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use ladderd_common::{Resolution, Result};
//! use ladderd_common::paths::sibling_with_suffix;
//! use std::path::Path;
//!
//! fn example() -> Result<()> {
//!     let res: Resolution = "1920x1080".parse()?;
//!     assert_eq!(res.height, 1080);
//!
//!     let out = sibling_with_suffix(Path::new("clips/intro.mov"), "_1080p", ".mp4");
//!     assert_eq!(out, Path::new("clips/intro_1080p.mp4"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod error;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
