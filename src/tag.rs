//! Field tag directives.
//!
//! A field opts into query encoding with a directive of the form
//! `name[,omitempty][,inline]`, written as `#[query("…")]` when deriving
//! [`QueryEncode`](crate::QueryEncode).

/// Parsed form of a field's query directive.
///
/// Tags are parsed once per field when a struct encoder is built, never per
/// encoded value.
///
/// # Examples
///
/// ```rust
/// use apiquery::FieldTag;
///
/// let tag = FieldTag::parse("created_at,omitempty");
/// assert_eq!(tag.name, "created_at");
/// assert!(tag.omit_empty);
/// assert!(!tag.inline);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldTag {
    /// Output name; empty when the field relies on `inline`.
    pub name: String,
    /// Skip the field when its value is zero, and drop its empty-valued pairs.
    pub omit_empty: bool,
    /// Merge the field's pairs into the parent key without nesting.
    pub inline: bool,
}

impl FieldTag {
    /// Parses a raw directive. Unknown flags are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(',');
        let mut tag = FieldTag {
            name: parts.next().unwrap_or_default().to_string(),
            ..FieldTag::default()
        };
        for flag in parts {
            match flag {
                "omitempty" => tag.omit_empty = true,
                "inline" => tag.inline = true,
                _ => {}
            }
        }
        tag
    }
}
