//! Settings-scoped encoder registry.
//!
//! Stringifiers depend on the settings they were built for, so each distinct
//! [`Settings`] value gets its own [`Encoder`] and cache. The registry creates
//! encoders lazily and keeps them for its own lifetime.

use crate::{Encoder, Settings};
use dashmap::DashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Map from settings to their encoder.
///
/// # Examples
///
/// ```rust
/// use apiquery::{ArrayFormat, Registry, Settings};
/// use std::sync::Arc;
///
/// let registry = Registry::new();
/// let comma = registry.encoder(Settings::default());
/// let repeat = registry.encoder(Settings::new().with_array_format(ArrayFormat::Repeat));
///
/// assert!(Arc::ptr_eq(&comma, &registry.encoder(Settings::default())));
/// assert!(!Arc::ptr_eq(&comma, &repeat));
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    encoders: DashMap<Settings, Arc<Encoder>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Registry::default()
    }

    /// The process-wide registry used by [`marshal`](crate::marshal) and the
    /// `to_*` functions.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Returns the encoder for `settings`, creating it on first use.
    ///
    /// Concurrent first requests for the same settings observe one encoder.
    pub fn encoder(&self, settings: Settings) -> Arc<Encoder> {
        self.encoders
            .entry(settings)
            .or_insert_with(|| {
                debug!(
                    nested_format = %settings.nested_format,
                    array_format = %settings.array_format,
                    "creating query encoder"
                );
                Encoder::new(settings)
            })
            .clone()
    }

    /// Number of encoders created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NestedFormat;
    use std::thread;

    #[test]
    fn test_one_encoder_per_settings() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        let dots = Settings::new().with_nested_format(NestedFormat::Dots);
        let a = registry.encoder(dots);
        let b = registry.encoder(dots);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.settings(), &dots);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_first_use() {
        let registry = Registry::new();
        let encoders: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| registry.encoder(Settings::default())))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(encoders.iter().all(|e| Arc::ptr_eq(e, &encoders[0])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(Registry::global(), Registry::global()));
    }
}
