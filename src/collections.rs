//! Sequence and map encoders.
//!
//! Sequences are flattened according to [`ArrayFormat`], chosen once when the
//! stringifier is built:
//!
//! | Format | Output for `[1, 2]` under `ids` |
//! |--------|---------------------------------|
//! | `comma` | `ids=1,2` |
//! | `repeat` | `ids=1&ids=2` |
//! | `brackets` | `ids[]=1&ids[]=2` |
//! | `indices` | build error |
//!
//! Maps nest each value under its encoded key, following
//! [`NestedFormat`](crate::NestedFormat): `m[a]=1` or `m.a=1`. Keys must encode
//! to exactly one pair.

use crate::encode::{stringifier, Kind, Pair, QueryEncode, Stringifier};
use crate::{ArrayFormat, Encoder, Error, Result};
use indexmap::IndexMap;
use std::any::type_name;
use std::collections::{btree_map, btree_set, hash_map, hash_set, vec_deque};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::slice;

/// Containers that encode as a sequence of items.
pub trait Sequence: Send + Sync + 'static {
    type Item: QueryEncode;
    type Iter<'a>: Iterator<Item = &'a Self::Item>
    where
        Self: 'a;

    fn items(&self) -> Self::Iter<'_>;
}

/// Containers that encode as keyed entries.
pub trait Mapping: Send + Sync + 'static {
    type Key: QueryEncode;
    type Value: QueryEncode;
    type Iter<'a>: Iterator<Item = (&'a Self::Key, &'a Self::Value)>
    where
        Self: 'a;

    fn entries(&self) -> Self::Iter<'_>;
}

/// Builds the stringifier for a sequence type under the encoder's array format.
///
/// # Errors
///
/// Returns [`Error::UnsupportedArrayFormat`] for [`ArrayFormat::Indices`], or
/// the build error of the item type.
pub fn sequence_stringifier<S: Sequence>(encoder: &Encoder) -> Result<Stringifier<S>> {
    let format = encoder.settings().array_format;
    if format == ArrayFormat::Indices {
        return Err(Error::UnsupportedArrayFormat(format));
    }
    let item = encoder.stringifier::<S::Item>()?;

    Ok(match format {
        ArrayFormat::Comma => stringifier(move |key: &str, seq: &S, out: &mut Vec<Pair>| {
            let mut scratch = Vec::new();
            for element in seq.items() {
                item("", element, &mut scratch)?;
            }
            if scratch.is_empty() {
                return Ok(());
            }
            let joined = scratch
                .into_iter()
                .map(|pair| pair.value)
                .collect::<Vec<_>>()
                .join(",");
            out.push(Pair::new(key, joined));
            Ok(())
        }),
        ArrayFormat::Repeat => stringifier(move |key: &str, seq: &S, out: &mut Vec<Pair>| {
            for element in seq.items() {
                item(key, element, out)?;
            }
            Ok(())
        }),
        ArrayFormat::Brackets => stringifier(move |key: &str, seq: &S, out: &mut Vec<Pair>| {
            let key = format!("{key}[]");
            for element in seq.items() {
                item(&key, element, out)?;
            }
            Ok(())
        }),
        ArrayFormat::Indices => return Err(Error::UnsupportedArrayFormat(format)),
    })
}

/// Builds the stringifier for a map type.
///
/// # Errors
///
/// Returns the build error of the key or value type. Encoding fails with
/// [`Error::NonScalarMapKey`] when a key does not produce exactly one pair.
pub fn map_stringifier<M: Mapping>(encoder: &Encoder) -> Result<Stringifier<M>> {
    let key_stringifier = encoder.stringifier::<M::Key>()?;
    let value_stringifier = encoder.stringifier::<M::Value>()?;
    let nested = encoder.settings().nested_format;

    Ok(stringifier(move |key: &str, map: &M, out: &mut Vec<Pair>| {
        let mut encoded_key = Vec::with_capacity(1);
        for (k, v) in map.entries() {
            encoded_key.clear();
            key_stringifier("", k, &mut encoded_key)?;
            let segment = match encoded_key.as_slice() {
                [single] => &single.value,
                other => {
                    return Err(Error::NonScalarMapKey {
                        key_type: type_name::<M::Key>(),
                        pairs: other.len(),
                    })
                }
            };
            value_stringifier(&nested.render_key(key, segment), v, out)?;
        }
        Ok(())
    }))
}

macro_rules! impl_sequence {
    ($($ty:ident => $($iter:ident)::+),* $(,)?) => {
        $(
            impl<T: QueryEncode> Sequence for $ty<T> {
                type Item = T;
                type Iter<'a> = $($iter)::+<'a, T> where Self: 'a;

                fn items(&self) -> Self::Iter<'_> {
                    self.iter()
                }
            }

            impl<T: QueryEncode> QueryEncode for $ty<T> {
                const KIND: Kind = Kind::Sequence;

                fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
                    sequence_stringifier::<Self>(encoder)
                }

                #[inline]
                fn is_zero(&self) -> bool {
                    self.is_empty()
                }
            }
        )*
    };
}

impl_sequence! {
    Vec => slice::Iter,
    VecDeque => vec_deque::Iter,
    BTreeSet => btree_set::Iter,
}

impl<T: QueryEncode> Sequence for Box<[T]> {
    type Item = T;
    type Iter<'a> = slice::Iter<'a, T> where Self: 'a;

    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<T: QueryEncode> QueryEncode for Box<[T]> {
    const KIND: Kind = Kind::Sequence;

    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
        sequence_stringifier::<Self>(encoder)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: QueryEncode, const N: usize> Sequence for [T; N] {
    type Item = T;
    type Iter<'a> = slice::Iter<'a, T> where Self: 'a;

    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<T: QueryEncode, const N: usize> QueryEncode for [T; N] {
    const KIND: Kind = Kind::Sequence;

    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
        sequence_stringifier::<Self>(encoder)
    }

    // Arrays have a fixed length; they are zero when every element is.
    fn is_zero(&self) -> bool {
        self.iter().all(QueryEncode::is_zero)
    }
}

impl<T, S> Sequence for HashSet<T, S>
where
    T: QueryEncode,
    S: Send + Sync + 'static,
{
    type Item = T;
    type Iter<'a> = hash_set::Iter<'a, T> where Self: 'a;

    fn items(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<T, S> QueryEncode for HashSet<T, S>
where
    T: QueryEncode,
    S: Send + Sync + 'static,
{
    const KIND: Kind = Kind::Sequence;

    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
        sequence_stringifier::<Self>(encoder)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K: QueryEncode, V: QueryEncode> Mapping for BTreeMap<K, V> {
    type Key = K;
    type Value = V;
    type Iter<'a> = btree_map::Iter<'a, K, V> where Self: 'a;

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<K: QueryEncode, V: QueryEncode> QueryEncode for BTreeMap<K, V> {
    const KIND: Kind = Kind::Map;

    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
        map_stringifier::<Self>(encoder)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Mapping for HashMap<K, V, S>
where
    K: QueryEncode,
    V: QueryEncode,
    S: Send + Sync + 'static,
{
    type Key = K;
    type Value = V;
    type Iter<'a> = hash_map::Iter<'a, K, V> where Self: 'a;

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<K, V, S> QueryEncode for HashMap<K, V, S>
where
    K: QueryEncode,
    V: QueryEncode,
    S: Send + Sync + 'static,
{
    const KIND: Kind = Kind::Map;

    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
        map_stringifier::<Self>(encoder)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Mapping for IndexMap<K, V, S>
where
    K: QueryEncode,
    V: QueryEncode,
    S: Send + Sync + 'static,
{
    type Key = K;
    type Value = V;
    type Iter<'a> = indexmap::map::Iter<'a, K, V> where Self: 'a;

    fn entries(&self) -> Self::Iter<'_> {
        self.iter()
    }
}

impl<K, V, S> QueryEncode for IndexMap<K, V, S>
where
    K: QueryEncode,
    V: QueryEncode,
    S: Send + Sync + 'static,
{
    const KIND: Kind = Kind::Map;

    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
        map_stringifier::<Self>(encoder)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NestedFormat, Settings};

    fn encode_with<T: QueryEncode>(settings: Settings, value: &T) -> Result<Vec<Pair>> {
        Encoder::new(settings).encode_with_prefix("nums", value)
    }

    fn with_array(format: ArrayFormat) -> Settings {
        Settings::new().with_array_format(format)
    }

    #[test]
    fn test_comma_joins_into_one_pair() {
        let pairs = encode_with(Settings::default(), &vec![1, 2, 3]).unwrap();
        assert_eq!(pairs, [("nums", "1,2,3")]);
    }

    #[test]
    fn test_repeat_emits_one_pair_per_element() {
        let pairs = encode_with(with_array(ArrayFormat::Repeat), &vec![1, 2, 3]).unwrap();
        assert_eq!(pairs, [("nums", "1"), ("nums", "2"), ("nums", "3")]);
    }

    #[test]
    fn test_brackets_encodes_each_element() {
        let pairs = encode_with(with_array(ArrayFormat::Brackets), &vec![1, 2]).unwrap();
        assert_eq!(pairs, [("nums[]", "1"), ("nums[]", "2")]);
    }

    #[test]
    fn test_empty_sequence_yields_nothing() {
        for format in [ArrayFormat::Comma, ArrayFormat::Repeat, ArrayFormat::Brackets] {
            let pairs = encode_with(with_array(format), &Vec::<u8>::new()).unwrap();
            assert!(pairs.is_empty(), "{format} produced {pairs:?}");
        }
    }

    #[test]
    fn test_comma_skips_elements_without_pairs() {
        let pairs = encode_with(Settings::default(), &vec![None, Some(2), None]).unwrap();
        assert_eq!(pairs, [("nums", "2")]);

        let pairs = encode_with(Settings::default(), &vec![None::<u8>]).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_indices_is_unsupported() {
        let err = encode_with(with_array(ArrayFormat::Indices), &vec![1]).unwrap_err();
        assert_eq!(err, Error::UnsupportedArrayFormat(ArrayFormat::Indices));
    }

    #[test]
    fn test_other_sequence_containers() {
        let set: BTreeSet<&'static str> = ["b", "a"].into_iter().collect();
        assert_eq!(encode_with(Settings::default(), &set).unwrap(), [("nums", "a,b")]);

        let deque: VecDeque<u8> = VecDeque::from(vec![4, 5]);
        assert_eq!(encode_with(Settings::default(), &deque).unwrap(), [("nums", "4,5")]);

        let boxed: Box<[u8]> = vec![6].into_boxed_slice();
        assert_eq!(encode_with(Settings::default(), &boxed).unwrap(), [("nums", "6")]);

        assert_eq!(encode_with(Settings::default(), &[7u8, 8]).unwrap(), [("nums", "7,8")]);
    }

    #[test]
    fn test_nested_sequences_under_repeat() {
        let pairs = encode_with(with_array(ArrayFormat::Repeat), &vec![vec![1, 2], vec![3]]).unwrap();
        assert_eq!(pairs, [("nums", "1"), ("nums", "2"), ("nums", "3")]);
    }

    #[test]
    fn test_map_brackets_and_dots() {
        let map: BTreeMap<String, i32> = [("a".to_string(), 1), ("b".to_string(), 2)].into();
        let pairs = Encoder::new(Settings::default())
            .encode_with_prefix("m", &map)
            .unwrap();
        assert_eq!(pairs, [("m[a]", "1"), ("m[b]", "2")]);

        let dots = Settings::new().with_nested_format(NestedFormat::Dots);
        let pairs = Encoder::new(dots).encode_with_prefix("m", &map).unwrap();
        assert_eq!(pairs, [("m.a", "1"), ("m.b", "2")]);
    }

    #[test]
    fn test_map_at_root_uses_bare_keys() {
        let map: IndexMap<&'static str, bool> = [("z", true), ("a", false)].into_iter().collect();
        let pairs = Encoder::new(Settings::default()).encode(&map).unwrap();
        assert_eq!(pairs, [("z", "true"), ("a", "false")]);
    }

    #[test]
    fn test_map_with_integer_keys_and_sequence_values() {
        let map: BTreeMap<u16, Vec<u8>> = [(10, vec![1, 2])].into();
        let pairs = Encoder::new(Settings::default())
            .encode_with_prefix("m", &map)
            .unwrap();
        assert_eq!(pairs, [("m[10]", "1,2")]);
    }

    #[test]
    fn test_map_key_must_be_scalar() {
        let map: BTreeMap<Vec<u8>, u8> = [(vec![], 1)].into();
        let err = Encoder::new(Settings::default())
            .encode_with_prefix("m", &map)
            .unwrap_err();
        assert_eq!(
            err,
            Error::NonScalarMapKey {
                key_type: type_name::<Vec<u8>>(),
                pairs: 0
            }
        );

        let map: BTreeMap<Vec<u8>, u8> = [(vec![1, 2], 1)].into();
        let repeat = Settings::new().with_array_format(ArrayFormat::Repeat);
        let err = Encoder::new(repeat).encode_with_prefix("m", &map).unwrap_err();
        assert!(matches!(err, Error::NonScalarMapKey { pairs: 2, .. }));
    }

    #[test]
    fn test_zero_collections() {
        assert!(Vec::<u8>::new().is_zero());
        assert!(!vec![0u8].is_zero());
        assert!([0u8, 0].is_zero());
        assert!(![0u8, 1].is_zero());
        assert!(HashMap::<String, u8>::new().is_zero());
    }
}
