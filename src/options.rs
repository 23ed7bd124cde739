//! Formatting settings for query encoding.
//!
//! This module provides the types that select how nested keys and collections
//! are rendered:
//!
//! - [`Settings`]: Main configuration struct, one encoder exists per distinct value
//! - [`NestedFormat`]: How compound key paths are joined (`dots` or `brackets`)
//! - [`ArrayFormat`]: How sequences are flattened (`comma`, `repeat`, `brackets`)
//!
//! ## Examples
//!
//! ```rust
//! use apiquery::{ArrayFormat, NestedFormat, Settings};
//!
//! let settings = Settings::new()
//!     .with_nested_format(NestedFormat::Dots)
//!     .with_array_format(ArrayFormat::Repeat);
//!
//! assert_eq!(settings.nested_format.render_key("filter", "name"), "filter.name");
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy for rendering compound key paths.
///
/// # Examples
///
/// ```rust
/// use apiquery::NestedFormat;
///
/// assert_eq!(NestedFormat::Brackets.render_key("user", "name"), "user[name]");
/// assert_eq!(NestedFormat::Dots.render_key("user", "name"), "user.name");
/// assert_eq!(NestedFormat::Dots.render_key("", "name"), "name");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedFormat {
    Dots,
    #[default]
    Brackets,
}

impl NestedFormat {
    /// Returns the configuration name of this format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            NestedFormat::Dots => "dots",
            NestedFormat::Brackets => "brackets",
        }
    }

    /// Joins a parent key and a child segment.
    ///
    /// A top-level child (empty parent) is returned unchanged.
    #[must_use]
    pub fn render_key(&self, parent: &str, child: &str) -> String {
        if parent.is_empty() {
            return child.to_string();
        }
        match self {
            NestedFormat::Dots => format!("{parent}.{child}"),
            NestedFormat::Brackets => format!("{parent}[{child}]"),
        }
    }
}

impl fmt::Display for NestedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NestedFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dots" => Ok(NestedFormat::Dots),
            "brackets" => Ok(NestedFormat::Brackets),
            other => Err(Error::unknown_format("nested", other)),
        }
    }
}

/// Strategy for rendering sequences.
///
/// - **Comma**: Default, `key=v1,v2,v3`
/// - **Repeat**: `key=v1&key=v2&key=v3`
/// - **Brackets**: `key[]=v1&key[]=v2`
/// - **Indices**: `key[0]=v1&key[1]=v2`, declared for compatibility but not
///   supported; encoders built with it fail with
///   [`Error::UnsupportedArrayFormat`]
///
/// # Examples
///
/// ```rust
/// use apiquery::ArrayFormat;
///
/// assert_eq!("repeat".parse::<ArrayFormat>().unwrap(), ArrayFormat::Repeat);
/// assert!("pipes".parse::<ArrayFormat>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayFormat {
    #[default]
    Comma,
    Repeat,
    Brackets,
    Indices,
}

impl ArrayFormat {
    /// Returns the configuration name of this format.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ArrayFormat::Comma => "comma",
            ArrayFormat::Repeat => "repeat",
            ArrayFormat::Brackets => "brackets",
            ArrayFormat::Indices => "indices",
        }
    }
}

impl fmt::Display for ArrayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "comma" => Ok(ArrayFormat::Comma),
            "repeat" => Ok(ArrayFormat::Repeat),
            "brackets" => Ok(ArrayFormat::Brackets),
            "indices" => Ok(ArrayFormat::Indices),
            other => Err(Error::unknown_format("array", other)),
        }
    }
}

/// Formatting configuration for query encoding.
///
/// Each distinct `Settings` value owns its own [`Encoder`](crate::Encoder)
/// and stringifier cache. Fields missing from a deserialized configuration
/// take their defaults (`brackets` nesting, `comma` arrays).
///
/// # Examples
///
/// ```rust
/// use apiquery::{ArrayFormat, NestedFormat, Settings};
///
/// let settings = Settings::new();
/// assert_eq!(settings.nested_format, NestedFormat::Brackets);
/// assert_eq!(settings.array_format, ArrayFormat::Comma);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub nested_format: NestedFormat,
    pub array_format: ArrayFormat,
}

impl Settings {
    /// Creates default settings (`brackets` nesting, `comma` arrays).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nested key format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use apiquery::{NestedFormat, Settings};
    ///
    /// let settings = Settings::new().with_nested_format(NestedFormat::Dots);
    /// assert_eq!(settings.nested_format, NestedFormat::Dots);
    /// ```
    #[must_use]
    pub fn with_nested_format(mut self, nested_format: NestedFormat) -> Self {
        self.nested_format = nested_format;
        self
    }

    /// Sets the array format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use apiquery::{ArrayFormat, Settings};
    ///
    /// let settings = Settings::new().with_array_format(ArrayFormat::Brackets);
    /// assert_eq!(settings.array_format, ArrayFormat::Brackets);
    /// ```
    #[must_use]
    pub fn with_array_format(mut self, array_format: ArrayFormat) -> Self {
        self.array_format = array_format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_key_top_level() {
        assert_eq!(NestedFormat::Brackets.render_key("", "a"), "a");
        assert_eq!(NestedFormat::Dots.render_key("", "a"), "a");
    }

    #[test]
    fn test_render_key_nested() {
        let key = NestedFormat::Brackets.render_key("a", "b");
        assert_eq!(NestedFormat::Brackets.render_key(&key, "c"), "a[b][c]");

        let key = NestedFormat::Dots.render_key("a", "b");
        assert_eq!(NestedFormat::Dots.render_key(&key, "c"), "a.b.c");
    }

    #[test]
    fn test_format_names_roundtrip() {
        for format in [
            ArrayFormat::Comma,
            ArrayFormat::Repeat,
            ArrayFormat::Brackets,
            ArrayFormat::Indices,
        ] {
            assert_eq!(format.as_str().parse::<ArrayFormat>().unwrap(), format);
        }
        for format in [NestedFormat::Dots, NestedFormat::Brackets] {
            assert_eq!(format.as_str().parse::<NestedFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_format_names() {
        let err = "Comma".parse::<ArrayFormat>().unwrap_err();
        assert_eq!(
            err,
            Error::UnknownFormat {
                kind: "array",
                value: "Comma".to_string()
            }
        );
        assert!("slashes".parse::<NestedFormat>().is_err());
    }
}
