//! # apiquery
//!
//! A type-driven encoder that flattens tagged Rust values into URL query
//! parameters.
//!
//! ## What does it do?
//!
//! API clients describe request parameters as plain structs. `apiquery` walks
//! such a value (nested structs, sequences, maps, optionals, dynamically typed
//! values and primitives) and produces the ordered list of `key=value` pairs
//! that make up a query string.
//!
//! ## Key Features
//!
//! - **Opt-in fields**: only fields tagged with `#[query("…")]` are encoded
//! - **Configurable layout**: nested keys as `a[b]` or `a.b`; sequences as
//!   `a=1,2`, `a=1&a=2` or `a[]=1&a[]=2`
//! - **Compiled once**: each type's encoding is built once per settings value
//!   and cached, including self-referential types
//! - **Thread-safe**: encoders and their caches are shared freely across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use apiquery::{marshal, QueryEncode, Settings};
//!
//! #[derive(QueryEncode)]
//! pub struct ListIssues {
//!     #[query("state")]
//!     pub state: String,
//!     #[query("labels")]
//!     pub labels: Vec<String>,
//!     #[query("page,omitempty")]
//!     pub page: u32,
//!     #[query("since")]
//!     pub since: Option<String>,
//! }
//!
//! let params = ListIssues {
//!     state: "open".to_string(),
//!     labels: vec!["bug".to_string(), "ui".to_string()],
//!     page: 0,
//!     since: None,
//! };
//!
//! let values = marshal(Some(&params), Settings::default()).unwrap();
//! assert_eq!(values.get("labels"), Some("bug,ui"));
//! assert_eq!(values.to_string(), "labels=bug%2Cui&state=open");
//! ```
//!
//! ### Nested Structs and Formats
//!
//! ```rust
//! use apiquery::{to_pairs_with_settings, ArrayFormat, NestedFormat, QueryEncode, Settings};
//!
//! #[derive(QueryEncode)]
//! pub struct Filter {
//!     #[query("status")]
//!     pub status: String,
//! }
//!
//! #[derive(QueryEncode)]
//! pub struct Search {
//!     #[query("filter")]
//!     pub filter: Filter,
//!     #[query("ids")]
//!     pub ids: Vec<u32>,
//! }
//!
//! let search = Search {
//!     filter: Filter { status: "active".to_string() },
//!     ids: vec![1, 2],
//! };
//! let settings = Settings::new()
//!     .with_nested_format(NestedFormat::Dots)
//!     .with_array_format(ArrayFormat::Brackets);
//!
//! let pairs = to_pairs_with_settings(&search, settings).unwrap();
//! assert_eq!(pairs, [("filter.status", "active"), ("ids[]", "1"), ("ids[]", "2")]);
//! ```
//!
//! ### Dynamic Values with the value! Macro
//!
//! ```rust
//! use apiquery::{to_pairs, value};
//!
//! let query = value!({"q": "rust", "page": {"size": 20}});
//! assert_eq!(to_pairs(&query).unwrap(), [("q", "rust"), ("page[size]", "20")]);
//! ```
//!
//! ## Architecture
//!
//! - [`QueryEncode`] classifies a type with a [`Kind`] and builds its
//!   [`Stringifier`], a shared closure that appends pairs for a key prefix
//! - [`Encoder`] caches one stringifier per type for one [`Settings`] value
//! - [`Registry`] keeps one encoder per settings value;
//!   [`Registry::global`] backs [`marshal`] and the `to_*` functions
//! - [`QueryValues`] groups the resulting pairs and renders the query string
//!
//! See the [`format`] module for the complete encoding rules.
//!
//! ## Logging
//!
//! Cache activity is reported through [`tracing`](https://docs.rs/tracing):
//! `debug` when an encoder or a stringifier is built, `trace` for forwarded
//! lookups and skipped fields, `warn` when a build fails. No subscriber is
//! installed by this crate.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Build failures are cached and reported again, never retried
//! - No panics in the public API

extern crate self as apiquery;

pub mod collections;
pub mod dynamic;
pub mod encode;
pub mod encoder;
pub mod error;
pub mod format;
pub mod macros;
pub mod map;
pub mod options;
pub mod registry;
pub mod ser;
pub mod structs;
pub mod tag;
pub mod value;
pub mod values;

pub use dynamic::DynQueryEncode;
pub use encode::{Kind, Pair, QueryEncode, Stringifier};
pub use encoder::{Encoder, EncoderHandle};
pub use error::{Error, Result};
pub use map::Map;
pub use options::{ArrayFormat, NestedFormat, Settings};
pub use registry::Registry;
pub use ser::{to_value, ValueSerializer};
pub use structs::{Field, StructEncoder};
pub use tag::FieldTag;
pub use value::{Number, Value};
pub use values::QueryValues;

/// Derives [`QueryEncode`] for a struct.
///
/// Fields are encoded when they carry a `#[query("name[,omitempty][,inline]")]`
/// attribute. See the [`format`] module for the rules.
///
/// The derived [`QueryEncode::is_zero`] is `true` when every tagged field is
/// zero; untagged fields are not consulted.
#[cfg(feature = "derive")]
pub use apiquery_derive::QueryEncode;

/// Encodes `value` into query values under `settings`.
///
/// A `None` value produces empty query values. The encoder for `settings`
/// comes from [`Registry::global`], so types are only compiled once per
/// settings value for the life of the process.
///
/// # Examples
///
/// ```rust
/// use apiquery::{marshal, Settings};
///
/// let none: Option<&Vec<u8>> = None;
/// assert!(marshal(none, Settings::default()).unwrap().is_empty());
///
/// let values = marshal(Some(&vec![1, 2]), Settings::default()).unwrap();
/// assert_eq!(values.get(""), Some("1,2"));
/// ```
///
/// # Errors
///
/// Returns an error if the settings cannot encode a type in the value graph
/// (see [`ArrayFormat::Indices`]), or if a map key is not a scalar.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn marshal<T: QueryEncode>(value: Option<&T>, settings: Settings) -> Result<QueryValues> {
    let Some(value) = value else {
        return Ok(QueryValues::new());
    };
    to_values_with_settings(value, settings)
}

/// Encode `value` into ordered pairs with the default settings.
///
/// # Errors
///
/// See [`marshal`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_pairs<T: QueryEncode>(value: &T) -> Result<Vec<Pair>> {
    to_pairs_with_settings(value, Settings::default())
}

/// Encode `value` into ordered pairs with custom settings.
///
/// # Examples
///
/// ```rust
/// use apiquery::{to_pairs_with_settings, ArrayFormat, Settings};
///
/// let settings = Settings::new().with_array_format(ArrayFormat::Repeat);
/// let pairs = to_pairs_with_settings(&vec!["a", "b"], settings).unwrap();
/// assert_eq!(pairs, [("", "a"), ("", "b")]);
/// ```
///
/// # Errors
///
/// See [`marshal`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_pairs_with_settings<T: QueryEncode>(value: &T, settings: Settings) -> Result<Vec<Pair>> {
    Registry::global().encoder(settings).encode(value)
}

/// Encode `value` into grouped query values with the default settings.
///
/// # Errors
///
/// See [`marshal`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_values<T: QueryEncode>(value: &T) -> Result<QueryValues> {
    to_values_with_settings(value, Settings::default())
}

/// Encode `value` into grouped query values with custom settings.
///
/// # Errors
///
/// See [`marshal`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_values_with_settings<T: QueryEncode>(value: &T, settings: Settings) -> Result<QueryValues> {
    to_pairs_with_settings(value, settings).map(QueryValues::from_pairs)
}

/// Encode `value` into a query string with the default settings.
///
/// Keys are sorted and percent-encoded; see [`QueryValues::encode`].
///
/// # Errors
///
/// See [`marshal`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T: QueryEncode>(value: &T) -> Result<String> {
    to_string_with_settings(value, Settings::default())
}

/// Encode `value` into a query string with custom settings.
///
/// # Examples
///
/// ```rust
/// use apiquery::{to_string_with_settings, ArrayFormat, Settings};
/// use std::collections::BTreeMap;
///
/// let mut filter = BTreeMap::new();
/// filter.insert("tag", vec!["a b", "c"]);
///
/// let settings = Settings::new().with_array_format(ArrayFormat::Brackets);
/// let query = to_string_with_settings(&filter, settings).unwrap();
/// assert_eq!(query, "tag%5B%5D=a%20b&tag%5B%5D=c");
/// ```
///
/// # Errors
///
/// See [`marshal`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_settings<T: QueryEncode>(value: &T, settings: Settings) -> Result<String> {
    to_values_with_settings(value, settings).map(|values| values.encode())
}

#[cfg(all(test, feature = "derive"))]
mod tests {
    use super::*;

    #[derive(QueryEncode)]
    pub struct Point {
        #[query("x")]
        pub x: i32,
        #[query("y")]
        pub y: i32,
    }

    #[derive(QueryEncode)]
    pub struct Shape {
        #[query("name")]
        pub name: String,
        #[query("origin")]
        pub origin: Point,
        #[query("tags,omitempty")]
        pub tags: Vec<String>,
    }

    fn shape() -> Shape {
        Shape {
            name: "square".to_string(),
            origin: Point { x: 1, y: -2 },
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_to_pairs() {
        let pairs = to_pairs(&shape()).unwrap();
        assert_eq!(
            pairs,
            [("name", "square"), ("origin[x]", "1"), ("origin[y]", "-2")]
        );
    }

    #[test]
    fn test_marshal_none_and_some() {
        assert!(marshal(None::<&Shape>, Settings::default()).unwrap().is_empty());

        let values = marshal(Some(&shape()), Settings::default()).unwrap();
        assert_eq!(values.get("origin[y]"), Some("-2"));
        assert!(!values.contains_key("tags"));
    }

    #[test]
    fn test_to_string_with_dots() {
        let settings = Settings::new().with_nested_format(NestedFormat::Dots);
        assert_eq!(
            to_string_with_settings(&shape(), settings).unwrap(),
            "name=square&origin.x=1&origin.y=-2"
        );
    }

    #[test]
    fn test_to_value_then_encode() {
        #[derive(serde::Serialize)]
        struct Plain {
            a: u8,
            b: Vec<&'static str>,
        }

        let value = to_value(&Plain { a: 1, b: vec!["x", "y"] }).unwrap();
        assert_eq!(to_pairs(&value).unwrap(), [("a", "1"), ("b", "x,y")]);
    }
}
