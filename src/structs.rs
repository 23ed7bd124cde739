//! Struct encoder builder.
//!
//! `#[derive(QueryEncode)]` expands to a [`StructEncoder`] chain, one
//! [`StructEncoder::field`] call per tagged field in declaration order. The
//! same builder is available for hand-written implementations.
//!
//! Inclusion rules are applied once, when the stringifier is built:
//!
//! - A field without a tag is never encoded.
//! - A field that is not exported (not `pub`) is skipped, unless it is an
//!   embedded (tuple) field whose type is itself a struct.
//!
//! At encode time, `omitempty` skips zero-valued fields and drops the field's
//! pairs whose value is empty; `inline` merges the field's pairs into the
//! parent key instead of nesting them under the field name.

use crate::encode::{stringifier, Kind, Pair, QueryEncode, Stringifier};
use crate::tag::FieldTag;
use crate::{Encoder, Result};
use std::any::type_name;
use tracing::trace;

/// Build-time description of one struct field.
///
/// # Examples
///
/// ```rust
/// use apiquery::Field;
///
/// let field = Field::named("page").tag("page,omitempty");
/// assert!(field.exported);
/// assert!(!field.embedded);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    /// The Rust field name, or its index for tuple fields.
    pub ident: &'static str,
    /// Raw directive, `None` when the field carries no tag.
    pub tag: Option<&'static str>,
    /// Whether the field is `pub`.
    pub exported: bool,
    /// Whether the field is anonymous (a tuple-struct field).
    pub embedded: bool,
}

impl Field {
    /// An exported, named field without a tag.
    #[must_use]
    pub const fn named(ident: &'static str) -> Self {
        Field {
            ident,
            tag: None,
            exported: true,
            embedded: false,
        }
    }

    /// An exported, embedded field without a tag.
    #[must_use]
    pub const fn embedded(ident: &'static str) -> Self {
        Field {
            ident,
            tag: None,
            exported: true,
            embedded: true,
        }
    }

    /// Sets the raw tag directive.
    #[must_use]
    pub const fn tag(mut self, directive: &'static str) -> Self {
        self.tag = Some(directive);
        self
    }

    /// Marks the field as not exported.
    #[must_use]
    pub const fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    fn is_encoded(&self, kind: Kind) -> bool {
        self.tag.is_some() && (self.exported || (self.embedded && kind == Kind::Struct))
    }
}

type FieldStringifier<T> = Box<dyn Fn(&str, &T, &mut Vec<Pair>) -> Result<()> + Send + Sync>;

/// Builds the stringifier of a struct from its fields.
///
/// # Examples
///
/// ```rust
/// use apiquery::{Encoder, Field, Kind, QueryEncode, Result, Settings, Stringifier, StructEncoder};
///
/// struct Page {
///     cursor: Option<String>,
///     limit: u32,
/// }
///
/// impl QueryEncode for Page {
///     const KIND: Kind = Kind::Struct;
///
///     fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
///         Ok(StructEncoder::<Self>::new(encoder)
///             .field(Field::named("cursor").tag("cursor"), |p| &p.cursor)?
///             .field(Field::named("limit").tag("limit,omitempty"), |p| &p.limit)?
///             .finish())
///     }
///
///     fn is_zero(&self) -> bool {
///         self.cursor.is_zero() && self.limit.is_zero()
///     }
/// }
///
/// let encoder = Encoder::new(Settings::default());
/// let page = Page { cursor: None, limit: 20 };
/// assert_eq!(encoder.encode(&page).unwrap(), [("limit", "20")]);
/// ```
pub struct StructEncoder<'e, T> {
    encoder: &'e Encoder,
    fields: Vec<FieldStringifier<T>>,
}

impl<'e, T: 'static> StructEncoder<'e, T> {
    pub fn new(encoder: &'e Encoder) -> Self {
        StructEncoder {
            encoder,
            fields: Vec::new(),
        }
    }

    /// Adds a field, reached from the struct through `get`.
    ///
    /// Fields excluded by the inclusion rules are dropped here, and their type's
    /// stringifier is never requested.
    ///
    /// # Errors
    ///
    /// Returns the build error of the field's type.
    pub fn field<F, G>(mut self, field: Field, get: G) -> Result<Self>
    where
        F: QueryEncode,
        G: Fn(&T) -> &F + Send + Sync + 'static,
    {
        let Some(directive) = field.tag.filter(|_| field.is_encoded(F::KIND)) else {
            trace!(
                struct_name = type_name::<T>(),
                field = field.ident,
                "skipping untagged or unexported field"
            );
            return Ok(self);
        };

        let tag = FieldTag::parse(directive);
        let stringify = self.encoder.stringifier::<F>()?;
        let nested = self.encoder.settings().nested_format;

        self.fields.push(Box::new(
            move |key: &str, value: &T, out: &mut Vec<Pair>| {
                let value = get(value);
                if tag.omit_empty && value.is_zero() {
                    return Ok(());
                }

                let start = out.len();
                if tag.inline {
                    stringify(key, value, out)?;
                } else {
                    stringify(&nested.render_key(key, &tag.name), value, out)?;
                }

                if tag.omit_empty && out[start..].iter().any(|pair| pair.value.is_empty()) {
                    let produced = out.split_off(start);
                    out.extend(produced.into_iter().filter(|pair| !pair.value.is_empty()));
                }
                Ok(())
            },
        ));
        Ok(self)
    }

    /// Finishes the struct, producing its stringifier.
    #[must_use]
    pub fn finish(self) -> Stringifier<T> {
        let fields = self.fields;
        stringifier(move |key: &str, value: &T, out: &mut Vec<Pair>| {
            for field in &fields {
                field(key, value, out)?;
            }
            Ok(())
        })
    }
}
