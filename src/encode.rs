//! The [`QueryEncode`] capability and its terminal implementations.
//!
//! Every encodable type classifies itself with a [`Kind`] and knows how to
//! build its [`Stringifier`] for a given [`Encoder`]. Builders are only ever
//! invoked through [`Encoder::stringifier`], which memoizes the result per
//! type, so a type's encoding strategy is compiled once per settings value.
//!
//! This module covers the leaves of the type graph:
//!
//! - **Scalars**: strings, booleans, integers, floats, complex numbers,
//!   dates and big integers render as exactly one pair
//! - **Pointers**: `Option<T>` vanishes when `None`; `Box<T>` and `Arc<T>`
//!   delegate to their pointee
//! - **Unsupported kinds**: unit, phantom data, channel senders and function
//!   pointers produce no pairs and no error

use crate::{Encoder, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use num_bigint::{BigInt, Sign};
use num_complex::Complex;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::mpsc::{Sender, SyncSender};
use std::sync::Arc;

/// One flattened query parameter.
///
/// # Examples
///
/// ```rust
/// use apiquery::Pair;
///
/// let pair = Pair::new("limit", "10");
/// assert_eq!(pair, ("limit", "10"));
/// assert_eq!(pair.to_string(), "limit=10");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Pair {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl PartialEq<(&str, &str)> for Pair {
    fn eq(&self, other: &(&str, &str)) -> bool {
        self.key == other.0 && self.value == other.1
    }
}

impl From<Pair> for (String, String) {
    fn from(pair: Pair) -> Self {
        (pair.key, pair.value)
    }
}

/// The compiled encoding of one type under one [`Settings`](crate::Settings).
///
/// Called with a key prefix and a value, it appends the value's pairs to the
/// output buffer. Stringifiers are immutable and shared across threads.
pub type Stringifier<T> = Arc<dyn Fn(&str, &T, &mut Vec<Pair>) -> Result<()> + Send + Sync>;

/// Wraps a closure as a [`Stringifier`].
///
/// Useful for hand-written [`QueryEncode`] implementations.
pub fn stringifier<T, F>(f: F) -> Stringifier<T>
where
    T: 'static,
    F: Fn(&str, &T, &mut Vec<Pair>) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Builds a stringifier that renders the value as a single pair.
///
/// # Examples
///
/// ```rust
/// use apiquery::{Encoder, Kind, QueryEncode, Result, Settings, Stringifier};
///
/// struct Cursor(u64);
///
/// impl QueryEncode for Cursor {
///     const KIND: Kind = Kind::Scalar;
///
///     fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
///         Ok(apiquery::encode::scalar(|c: &Cursor| format!("c_{}", c.0)))
///     }
///
///     fn is_zero(&self) -> bool {
///         self.0 == 0
///     }
/// }
///
/// let encoder = Encoder::new(Settings::default());
/// let pairs = encoder.encode_with_prefix("after", &Cursor(7)).unwrap();
/// assert_eq!(pairs, [("after", "c_7")]);
/// ```
pub fn scalar<T, F>(render: F) -> Stringifier<T>
where
    T: 'static,
    F: Fn(&T) -> String + Send + Sync + 'static,
{
    stringifier(move |key: &str, value: &T, out: &mut Vec<Pair>| {
        out.push(Pair::new(key, render(value)));
        Ok(())
    })
}

/// Compile-time classification of an encodable type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A record of tagged fields.
    Struct,
    /// A sequence or set.
    Sequence,
    /// A keyed collection.
    Map,
    /// `Option`, `Box` or `Arc`.
    Pointer,
    /// A value whose concrete type is only known at run time.
    Dynamic,
    /// A single-token value.
    Scalar,
    /// A kind with no query representation.
    Unsupported,
}

/// Types that can be flattened into query pairs.
///
/// Implementations are normally derived with `#[derive(QueryEncode)]` for
/// structs and provided by this crate for standard types.
pub trait QueryEncode: Send + Sync + 'static {
    /// The classification of this type.
    const KIND: Kind;

    /// Builds the stringifier for this type.
    ///
    /// Do not call this directly; request stringifiers (including the ones for
    /// component types) through [`Encoder::stringifier`] so they are cached
    /// and recursive types terminate.
    ///
    /// # Errors
    ///
    /// Returns an error when the active settings cannot encode this type,
    /// such as a sequence under [`ArrayFormat::Indices`](crate::ArrayFormat::Indices).
    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>>
    where
        Self: Sized;

    /// Returns `true` if this is the zero value of its type.
    fn is_zero(&self) -> bool;
}

macro_rules! impl_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl QueryEncode for $ty {
                const KIND: Kind = Kind::Scalar;

                fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
                    Ok(scalar(|v: &$ty| v.to_string()))
                }

                #[inline]
                fn is_zero(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

// `Display` for floats is the shortest text that round-trips and never uses
// exponent notation.
macro_rules! impl_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl QueryEncode for $ty {
                const KIND: Kind = Kind::Scalar;

                fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
                    Ok(scalar(|v: &$ty| v.to_string()))
                }

                #[inline]
                fn is_zero(&self) -> bool {
                    self.to_bits() == 0
                }
            }

            impl QueryEncode for Complex<$ty> {
                const KIND: Kind = Kind::Scalar;

                fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
                    Ok(scalar(|v: &Complex<$ty>| {
                        let im = v.im.to_string();
                        let sign = if im.starts_with('-') { "" } else { "+" };
                        format!("({}{sign}{im}i)", v.re)
                    }))
                }

                #[inline]
                fn is_zero(&self) -> bool {
                    self.re.to_bits() == 0 && self.im.to_bits() == 0
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl QueryEncode for bool {
    const KIND: Kind = Kind::Scalar;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(scalar(|v: &bool| if *v { "true" } else { "false" }.to_string()))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        !*self
    }
}

impl QueryEncode for char {
    const KIND: Kind = Kind::Scalar;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(scalar(|v: &char| v.to_string()))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        *self == '\0'
    }
}

impl QueryEncode for String {
    const KIND: Kind = Kind::Scalar;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(scalar(|v: &String| v.clone()))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl QueryEncode for &'static str {
    const KIND: Kind = Kind::Scalar;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(scalar(|v: &&'static str| (*v).to_string()))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl QueryEncode for Cow<'static, str> {
    const KIND: Kind = Kind::Scalar;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(scalar(|v: &Cow<'static, str>| v.to_string()))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl QueryEncode for DateTime<Utc> {
    const KIND: Kind = Kind::Scalar;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(scalar(|v: &DateTime<Utc>| {
            v.to_rfc3339_opts(SecondsFormat::Secs, true)
        }))
    }

    fn is_zero(&self) -> bool {
        *self == DateTime::<Utc>::default()
    }
}

impl QueryEncode for NaiveDate {
    const KIND: Kind = Kind::Scalar;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(scalar(|v: &NaiveDate| v.format("%Y-%m-%d").to_string()))
    }

    fn is_zero(&self) -> bool {
        *self == NaiveDate::default()
    }
}

impl QueryEncode for BigInt {
    const KIND: Kind = Kind::Scalar;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(scalar(|v: &BigInt| v.to_string()))
    }

    fn is_zero(&self) -> bool {
        self.sign() == Sign::NoSign
    }
}

impl<T: QueryEncode> QueryEncode for Option<T> {
    const KIND: Kind = Kind::Pointer;

    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
        let inner = encoder.stringifier::<T>()?;
        Ok(stringifier(
            move |key: &str, value: &Option<T>, out: &mut Vec<Pair>| match value {
                Some(value) => inner(key, value, out),
                None => Ok(()),
            },
        ))
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

macro_rules! impl_pointer {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl<T: QueryEncode> QueryEncode for $ptr<T> {
                const KIND: Kind = Kind::Pointer;

                fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
                    let inner = encoder.stringifier::<T>()?;
                    Ok(stringifier(
                        move |key: &str, value: &$ptr<T>, out: &mut Vec<Pair>| {
                            inner(key, &**value, out)
                        },
                    ))
                }

                // A present pointer is never the zero value, whatever it points at.
                #[inline]
                fn is_zero(&self) -> bool {
                    false
                }
            }
        )*
    };
}

impl_pointer!(Box, Arc);

fn nothing<T: 'static>() -> Stringifier<T> {
    stringifier(|_: &str, _: &T, _: &mut Vec<Pair>| Ok(()))
}

impl QueryEncode for () {
    const KIND: Kind = Kind::Unsupported;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(nothing())
    }

    fn is_zero(&self) -> bool {
        true
    }
}

impl<T: Send + Sync + 'static> QueryEncode for PhantomData<T> {
    const KIND: Kind = Kind::Unsupported;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(nothing())
    }

    fn is_zero(&self) -> bool {
        true
    }
}

impl<T: Send + 'static> QueryEncode for Sender<T> {
    const KIND: Kind = Kind::Unsupported;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(nothing())
    }

    fn is_zero(&self) -> bool {
        false
    }
}

impl<T: Send + 'static> QueryEncode for SyncSender<T> {
    const KIND: Kind = Kind::Unsupported;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(nothing())
    }

    fn is_zero(&self) -> bool {
        false
    }
}

impl<R: 'static> QueryEncode for fn() -> R {
    const KIND: Kind = Kind::Unsupported;

    fn build_stringifier(_: &Encoder) -> Result<Stringifier<Self>> {
        Ok(nothing())
    }

    fn is_zero(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;

    fn encode<T: QueryEncode>(value: &T) -> Vec<Pair> {
        Encoder::new(Settings::default())
            .encode_with_prefix("k", value)
            .unwrap()
    }

    #[test]
    fn test_integers() {
        assert_eq!(encode(&42u8), [("k", "42")]);
        assert_eq!(encode(&-7i64), [("k", "-7")]);
        assert_eq!(encode(&u128::MAX), [("k", "340282366920938463463374607431768211455")]);
        assert_eq!(encode(&1_000_000usize), [("k", "1000000")]);
    }

    #[test]
    fn test_floats_shortest_without_exponent() {
        assert_eq!(encode(&0.1f64), [("k", "0.1")]);
        assert_eq!(encode(&1.5f32), [("k", "1.5")]);
        assert_eq!(encode(&1e21f64), [("k", "1000000000000000000000")]);
        assert_eq!(encode(&3.0f64), [("k", "3")]);
    }

    #[test]
    fn test_bool_and_strings() {
        assert_eq!(encode(&true), [("k", "true")]);
        assert_eq!(encode(&false), [("k", "false")]);
        assert_eq!(encode(&"a b".to_string()), [("k", "a b")]);
        assert_eq!(encode(&"static"), [("k", "static")]);
        assert_eq!(encode(&'x'), [("k", "x")]);
    }

    #[test]
    fn test_complex() {
        assert_eq!(encode(&Complex::new(1.0f64, 2.5)), [("k", "(1+2.5i)")]);
        assert_eq!(encode(&Complex::new(0.5f32, -2.0)), [("k", "(0.5-2i)")]);
    }

    #[test]
    fn test_complex_non_finite_parts() {
        assert_eq!(encode(&Complex::new(1.0f64, f64::NAN)), [("k", "(1+NaNi)")]);
        assert_eq!(encode(&Complex::new(0.0f64, -f64::NAN)), [("k", "(0+NaNi)")]);
        assert_eq!(
            encode(&Complex::new(f64::INFINITY, f64::NEG_INFINITY)),
            [("k", "(inf-infi)")]
        );
        assert_eq!(
            encode(&Complex::new(f32::NEG_INFINITY, f32::INFINITY)),
            [("k", "(-inf+infi)")]
        );
    }

    #[test]
    fn test_dates_and_bigints() {
        let at = DateTime::parse_from_rfc3339("2024-01-15T10:30:00+02:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(encode(&at), [("k", "2024-01-15T08:30:00Z")]);

        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(encode(&day), [("k", "2024-02-29")]);

        let big: BigInt = "-123456789012345678901234567890".parse().unwrap();
        assert_eq!(encode(&big), [("k", "-123456789012345678901234567890")]);
    }

    #[test]
    fn test_option_and_pointers() {
        assert!(encode(&None::<u32>).is_empty());
        assert_eq!(encode(&Some(5u32)), [("k", "5")]);
        assert_eq!(encode(&Box::new(Some("x".to_string()))), [("k", "x")]);
        assert_eq!(encode(&Arc::new(9i8)), [("k", "9")]);
    }

    #[test]
    fn test_unsupported_kinds_are_silent() {
        let (tx, _rx) = std::sync::mpsc::channel::<u8>();
        assert!(encode(&()).is_empty());
        assert!(encode(&PhantomData::<String>).is_empty());
        assert!(encode(&tx).is_empty());

        fn make() -> u8 {
            1
        }
        assert!(encode(&(make as fn() -> u8)).is_empty());
    }

    #[test]
    fn test_zero_values() {
        assert!(0i32.is_zero());
        assert!(!(-0.0f64).is_zero());
        assert!(0.0f64.is_zero());
        assert!(String::new().is_zero());
        assert!(None::<String>.is_zero());
        assert!(!Some(String::new()).is_zero());
        assert!(!Box::new(0u8).is_zero());
        assert!(BigInt::from(0).is_zero());
        assert!(!true.is_zero());
    }
}
