//! Core value types shared between configuration, probing, and the ladder.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A pixel size written as `"<width>x<height>"`.
///
/// Parsing accepts only two positive decimal integers joined by a lowercase
/// `x`. Serialized form is the same string, so a `Resolution` can be used
/// directly in TOML/JSON documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Construct a resolution without validation.
    ///
    /// Used for computed sizes; only parsed input is required to be positive.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether this size fits inside `other` on both axes.
    pub fn fits_within(&self, other: &Resolution) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    /// Width divided by height, or `None` when the height is zero.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            None
        } else {
            Some(f64::from(self.width) / f64::from(self.height))
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| Error::resolution(s, "missing 'x' separator"))?;

        let width = parse_dimension(s, w, "width")?;
        let height = parse_dimension(s, h, "height")?;

        Ok(Self { width, height })
    }
}

fn parse_dimension(input: &str, part: &str, name: &str) -> Result<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::resolution(input, format!("{name} is not a number")));
    }
    let value: u32 = part
        .parse()
        .map_err(|e| Error::resolution(input, format!("{name}: {e}")))?;
    if value == 0 {
        return Err(Error::resolution(input, format!("{name} must be positive")));
    }
    Ok(value)
}

impl TryFrom<String> for Resolution {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}
