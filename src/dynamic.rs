//! Values whose concrete type is only known at run time.
//!
//! A field declared as `Box<dyn DynQueryEncode>` (or `Arc<…>`) cannot have its
//! stringifier chosen when the enclosing struct is built. Its stringifier keeps
//! a weak [`EncoderHandle`](crate::EncoderHandle) instead, and resolves the concrete type's cached
//! stringifier each time a value is encoded.

use crate::encode::{stringifier, Kind, Pair, QueryEncode, Stringifier};
use crate::{Encoder, Result};
use std::sync::Arc;

/// Object-safe form of [`QueryEncode`], implemented for every encodable type.
///
/// # Examples
///
/// ```rust
/// use apiquery::{DynQueryEncode, Encoder, Settings};
///
/// let values: Vec<Box<dyn DynQueryEncode>> = vec![Box::new(1u8), Box::new("two")];
/// let encoder = Encoder::new(Settings::default());
/// assert_eq!(encoder.encode_with_prefix("v", &values).unwrap(), [("v", "1,two")]);
/// ```
pub trait DynQueryEncode: Send + Sync + 'static {
    /// Appends the pairs of `self` under `key`, using `encoder`'s cache for the
    /// concrete type.
    ///
    /// # Errors
    ///
    /// Returns the build or encode error of the concrete type.
    fn encode_dyn(&self, encoder: &Encoder, key: &str, out: &mut Vec<Pair>) -> Result<()>;

    /// Returns `true` if the concrete value is the zero value of its type.
    fn is_zero_dyn(&self) -> bool;
}

impl<T: QueryEncode> DynQueryEncode for T {
    fn encode_dyn(&self, encoder: &Encoder, key: &str, out: &mut Vec<Pair>) -> Result<()> {
        encoder.encode_into(key, self, out)
    }

    fn is_zero_dyn(&self) -> bool {
        self.is_zero()
    }
}

macro_rules! impl_dyn_pointer {
    ($($ptr:ident),* $(,)?) => {
        $(
            impl QueryEncode for $ptr<dyn DynQueryEncode> {
                const KIND: Kind = Kind::Dynamic;

                fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
                    let handle = encoder.handle();
                    Ok(stringifier(
                        move |key: &str, value: &$ptr<dyn DynQueryEncode>, out: &mut Vec<Pair>| {
                            let encoder = handle.upgrade()?;
                            (**value).encode_dyn(&encoder, key, out)
                        },
                    ))
                }

                // A present dynamic value is never zero, as for other pointers.
                fn is_zero(&self) -> bool {
                    false
                }
            }
        )*
    };
}

impl_dyn_pointer!(Box, Arc);
