//! Query Encoding Reference
//!
//! This module documents how values are flattened into query pairs. It has no
//! items; every rule below is exercised by the crate's tests.
//!
//! # Overview
//!
//! Encoding walks a value graph and produces an ordered list of
//! `(key, value)` [`Pair`](crate::Pair)s. The root value is encoded under the
//! empty key; each struct field, map entry or sequence element extends the key
//! of its parent. Pairs keep declaration and iteration order, and duplicate
//! keys are preserved.
//!
//! # Key Paths
//!
//! A child segment is joined to its parent according to
//! [`NestedFormat`](crate::NestedFormat):
//!
//! | Format | Parent | Child | Key |
//! |--------|--------|-------|-----|
//! | `brackets` (default) | `user` | `name` | `user[name]` |
//! | `dots` | `user` | `name` | `user.name` |
//! | either | *(empty)* | `name` | `name` |
//!
//! # Scalars
//!
//! | Type | Text |
//! |------|------|
//! | `String`, `&'static str`, `Cow<str>`, `char` | verbatim |
//! | `bool` | `true` / `false` |
//! | integers (`i8`..`i128`, `u8`..`u128`, `isize`, `usize`) | base 10 |
//! | `f32`, `f64` | shortest round-trip decimal, no exponent (`0.1`, `3`, `NaN`, `inf`) |
//! | `Complex<f32>`, `Complex<f64>` | `(re+imi)`, e.g. `(1+2.5i)`, `(0.5-2i)`, `(1+NaNi)`, `(inf-infi)` |
//! | `DateTime<Utc>` | RFC 3339 with second precision, `Z` suffix |
//! | `NaiveDate` | `%Y-%m-%d` |
//! | `BigInt` | base 10 |
//! | [`Number`](crate::Number) | its `Display` (`42`, `0.5`, `Infinity`, `NaN`) |
//!
//! Unit, `PhantomData`, channel senders and function pointers have no query
//! form. They produce no pairs and no error.
//!
//! # Optional and Pointer Values
//!
//! `None` produces no pairs at all, whether or not the field is `omitempty`.
//! `Some(v)`, `Box<T>` and `Arc<T>` encode their contents under the same key.
//!
//! # Sequences
//!
//! `Vec`, `VecDeque`, slices, arrays and sets are flattened according to
//! [`ArrayFormat`](crate::ArrayFormat). For `tags = ["a", "b"]`:
//!
//! | Format | Pairs |
//! |--------|-------|
//! | `comma` (default) | `tags=a,b` |
//! | `repeat` | `tags=a`, `tags=b` |
//! | `brackets` | `tags[]=a`, `tags[]=b` |
//! | `indices` | error: [`Error::UnsupportedArrayFormat`](crate::Error::UnsupportedArrayFormat) |
//!
//! Under `comma`, every pair an element produces contributes its value, and
//! an empty sequence produces no pair. Element keys are not nested further, so
//! sequences of structs are best combined with `repeat` or `brackets`.
//!
//! # Maps
//!
//! `HashMap`, `BTreeMap`, `IndexMap` and [`Map`](crate::Map) encode each entry
//! under `render_key(parent, key_text)`. The key is encoded on its own and
//! must produce exactly one pair; otherwise encoding fails with
//! [`Error::NonScalarMapKey`](crate::Error::NonScalarMapKey). Entries follow
//! the map's iteration order.
//!
//! ```text
//! filter = {"status": "open"}  ->  filter[status]=open
//! ```
//!
//! # Structs
//!
//! Fields opt in with a directive `#[query("name[,omitempty][,inline]")]`:
//!
//! - no directive: the field is never encoded
//! - `name`: the field's pairs are nested under `name`
//! - `omitempty`: a zero-valued field is skipped, and any of the field's pairs
//!   with an empty value are dropped
//!   (a derived struct is zero when all of its tagged fields are zero)
//! - `inline`: the field's pairs are merged into the parent key, with no added
//!   level of nesting
//!
//! Private fields are skipped even when tagged. Tuple-struct fields count as
//! embedded: a private embedded field is still encoded when its type is itself
//! a struct.
//!
//! # Query Strings
//!
//! [`QueryValues::encode`](crate::QueryValues::encode) sorts keys, keeps the
//! value order of each key, and percent-encodes everything except
//! `A-Z a-z 0-9 - . _ ~`:
//!
//! ```text
//! [("q", "rust lang"), ("page[size]", "20")]  ->  page%5Bsize%5D=20&q=rust%20lang
//! ```
