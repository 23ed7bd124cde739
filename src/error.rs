//! Error types for query encoding.
//!
//! Encoding a well-formed, tagged value graph never fails. The errors in this
//! module report configuration or shape mistakes, and they are reported the
//! first time the offending type or setting is exercised:
//!
//! - **Unsupported array format**: [`ArrayFormat::Indices`] is declared but not
//!   implemented; building any sequence encoder under it fails.
//! - **Unknown format names**: parsing a [`Settings`](crate::Settings) value from
//!   text with an unrecognized nested or array format name.
//! - **Non-scalar map keys**: a map key whose encoding does not reduce to
//!   exactly one pair.
//!
//! Values of kinds with no query representation (unit, channels, phantom data)
//! are *not* errors; they simply produce no pairs.
//!
//! ## Examples
//!
//! ```rust
//! use apiquery::{to_pairs_with_settings, ArrayFormat, Error, Settings};
//!
//! let settings = Settings::new().with_array_format(ArrayFormat::Indices);
//! let err = to_pairs_with_settings(&vec![1, 2, 3], settings).unwrap_err();
//! assert!(matches!(err, Error::UnsupportedArrayFormat(ArrayFormat::Indices)));
//! ```

use crate::ArrayFormat;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while building or running a
/// query encoder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The configured array format has no encoding strategy.
    #[error("unsupported array format `{0}`: use comma, repeat or brackets")]
    UnsupportedArrayFormat(ArrayFormat),

    /// A nested or array format name that is not recognized.
    #[error("unknown {kind} format `{value}`")]
    UnknownFormat { kind: &'static str, value: String },

    /// A map key type that does not encode to exactly one pair.
    #[error("map key of type `{key_type}` encoded to {pairs} pairs; map keys must encode to a single scalar")]
    NonScalarMapKey { key_type: &'static str, pairs: usize },

    /// Unsupported shape when converting a `Serialize` value into a [`Value`](crate::Value).
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A dynamic stringifier was invoked after its owning encoder was dropped.
    #[error("the encoder that built this stringifier has been dropped")]
    EncoderReleased,

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates an unknown-format error for the given format family
    /// (`"nested"` or `"array"`).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use apiquery::Error;
    ///
    /// let err = Error::unknown_format("array", "pipes");
    /// assert_eq!(err.to_string(), "unknown array format `pipes`");
    /// ```
    pub fn unknown_format(kind: &'static str, value: &str) -> Self {
        Error::UnknownFormat {
            kind,
            value: value.to_string(),
        }
    }

    /// Creates an unsupported type error for shapes that cannot become a
    /// dynamic [`Value`](crate::Value).
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use apiquery::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
