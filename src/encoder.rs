//! Per-settings encoder and its type-keyed stringifier cache.
//!
//! An [`Encoder`] compiles one [`Stringifier`] per concrete type and keeps it
//! for its whole lifetime. Building is lazy and incremental: the first request
//! for a type builds it (and, recursively, the types it contains), later
//! requests return the cached closure.
//!
//! ## Recursive types
//!
//! A type may reach itself, e.g. a node holding `Option<Box<Node>>`. Before a
//! type's builder runs, the cache publishes a *pending* entry for it in one
//! atomic check-and-set. Any request for the same type while it is pending
//! (from the builder itself, or from another thread) receives a forwarding
//! stringifier that captures the pending slot. The forwarding stringifier only
//! looks the real stringifier up when it is invoked, and builders never invoke
//! stringifiers, so building always terminates without blocking.
//!
//! Once the builder returns, the real stringifier replaces the pending entry
//! and the slot's latch is released exactly once. A builder that panics leaves
//! a failed entry behind and releases the latch with that failure. Invoking a forwarding
//! stringifier before that point (only possible from another thread that is
//! encoding while the build is still in flight) waits on the latch.

use crate::encode::{stringifier, Pair, QueryEncode, Stringifier};
use crate::{Error, Result, Settings};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, trace, warn};

type Erased = Arc<dyn Any + Send + Sync>;

enum CacheEntry {
    /// Build in progress; holds an `Arc<Slot<T>>`.
    Pending(Erased),
    /// Holds a `Stringifier<T>`.
    Ready(Erased),
    Failed(Error),
}

/// Latch between a pending cache entry and the forwarding stringifiers that
/// captured it.
struct Slot<T> {
    resolved: OnceLock<Result<Stringifier<T>>>,
    lock: Mutex<()>,
    cvar: Condvar,
}

impl<T: 'static> Slot<T> {
    fn new() -> Self {
        Slot {
            resolved: OnceLock::new(),
            lock: Mutex::new(()),
            cvar: Condvar::new(),
        }
    }

    fn resolve(&self, built: Result<Stringifier<T>>) {
        // Only the owning builder resolves a slot, and it does so once.
        let _ = self.resolved.set(built);
        let _guard = self.lock.lock();
        self.cvar.notify_all();
    }

    fn wait(&self) -> &Result<Stringifier<T>> {
        if let Some(resolved) = self.resolved.get() {
            return resolved;
        }
        let mut guard = self.lock.lock();
        loop {
            if let Some(resolved) = self.resolved.get() {
                return resolved;
            }
            self.cvar.wait(&mut guard);
        }
    }

    fn forwarder(self: Arc<Self>) -> Stringifier<T> {
        stringifier(move |key: &str, value: &T, out: &mut Vec<Pair>| {
            match self.wait() {
                Ok(real) => real(key, value, out),
                Err(e) => Err(e.clone()),
            }
        })
    }
}

/// Publishes the outcome of one build into the cache and releases its slot.
///
/// If the builder unwinds, dropping the guard records a `Failed` entry and
/// resolves the slot with the same error.
struct BuildGuard<'e, T: 'static> {
    encoder: &'e Encoder,
    id: TypeId,
    slot: Arc<Slot<T>>,
    armed: bool,
}

impl<T: 'static> BuildGuard<'_, T> {
    fn publish(mut self, built: Result<Stringifier<T>>) -> Result<Stringifier<T>> {
        self.armed = false;
        match &built {
            Ok(real) => {
                self.encoder
                    .cache
                    .insert(self.id, CacheEntry::Ready(Arc::new(real.clone())));
            }
            Err(e) => {
                warn!(type_name = type_name::<T>(), error = %e, "query stringifier build failed");
                self.encoder
                    .cache
                    .insert(self.id, CacheEntry::Failed(e.clone()));
            }
        }
        self.slot.resolve(built.clone());
        built
    }
}

impl<T: 'static> Drop for BuildGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let e = Error::custom(format!(
            "building the query stringifier for `{}` panicked",
            type_name::<T>()
        ));
        warn!(type_name = type_name::<T>(), "query stringifier build panicked");
        self.encoder
            .cache
            .insert(self.id, CacheEntry::Failed(e.clone()));
        self.slot.resolve(Err(e));
    }
}

/// Compiles and caches stringifiers for one [`Settings`] value.
///
/// Encoders are usually obtained from a [`Registry`](crate::Registry), which
/// keeps one per distinct settings value. They are cheap to share: all state
/// lives behind the returned `Arc`.
///
/// # Examples
///
/// ```rust
/// use apiquery::{Encoder, Settings};
///
/// let encoder = Encoder::new(Settings::default());
/// let pairs = encoder.encode(&vec![1, 2, 3]).unwrap();
/// assert_eq!(pairs, [("", "1,2,3")]);
/// ```
pub struct Encoder {
    settings: Settings,
    cache: DashMap<TypeId, CacheEntry>,
    this: Weak<Encoder>,
}

impl fmt::Debug for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("settings", &self.settings)
            .field("cached_types", &self.cache.len())
            .finish()
    }
}

impl Encoder {
    /// Creates an encoder with an empty cache.
    #[must_use]
    pub fn new(settings: Settings) -> Arc<Self> {
        Arc::new_cyclic(|this| Encoder {
            settings,
            cache: DashMap::new(),
            this: this.clone(),
        })
    }

    /// The settings this encoder compiles stringifiers for.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A weak handle to this encoder, for stringifiers that must reach back
    /// into the cache at invocation time.
    #[must_use]
    pub fn handle(&self) -> EncoderHandle {
        EncoderHandle(self.this.clone())
    }

    /// Returns the stringifier for `T`, building and caching it on first use.
    ///
    /// While `T` is being built, requests for `T` receive a forwarding
    /// stringifier that resolves to the real one when invoked.
    ///
    /// # Errors
    ///
    /// Returns the build error of `T` or of any type it contains, such as
    /// [`Error::UnsupportedArrayFormat`]. A failed build is cached and
    /// reported again on later requests.
    pub fn stringifier<T: QueryEncode>(&self) -> Result<Stringifier<T>> {
        let id = TypeId::of::<T>();
        let slot = match self.cache.entry(id) {
            Entry::Occupied(occupied) => {
                let found = match occupied.get() {
                    CacheEntry::Ready(erased) => Self::downcast_ready::<T>(erased),
                    CacheEntry::Pending(erased) => {
                        trace!(type_name = type_name::<T>(), "forwarding to in-flight build");
                        Self::downcast_slot::<T>(erased).map(Slot::forwarder)
                    }
                    CacheEntry::Failed(e) => Err(e.clone()),
                };
                return found;
            }
            Entry::Vacant(vacant) => {
                let slot = Arc::new(Slot::<T>::new());
                vacant.insert(CacheEntry::Pending(slot.clone()));
                slot
            }
        };

        // The shard lock is released here; building may re-enter the cache.
        debug!(
            type_name = type_name::<T>(),
            kind = ?T::KIND,
            nested_format = %self.settings.nested_format,
            array_format = %self.settings.array_format,
            "building query stringifier"
        );
        let guard = BuildGuard {
            encoder: self,
            id,
            slot,
            armed: true,
        };
        let built = T::build_stringifier(self);
        guard.publish(built)
    }

    fn downcast_ready<T: 'static>(erased: &Erased) -> Result<Stringifier<T>> {
        erased
            .downcast_ref::<Stringifier<T>>()
            .cloned()
            .ok_or_else(|| Error::custom(format!("cache entry mismatch for {}", type_name::<T>())))
    }

    fn downcast_slot<T: 'static>(erased: &Erased) -> Result<Arc<Slot<T>>> {
        erased
            .clone()
            .downcast::<Slot<T>>()
            .map_err(|_| Error::custom(format!("cache entry mismatch for {}", type_name::<T>())))
    }

    /// Appends the pairs of `value` under `key` to `out`.
    ///
    /// # Errors
    ///
    /// See [`Encoder::stringifier`]; also returns encode-time errors such as
    /// [`Error::NonScalarMapKey`].
    pub fn encode_into<T: QueryEncode>(&self, key: &str, value: &T, out: &mut Vec<Pair>) -> Result<()> {
        let stringify = self.stringifier::<T>()?;
        stringify(key, value, out)
    }

    /// Encodes `value` under the key prefix `key`.
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode_into`].
    pub fn encode_with_prefix<T: QueryEncode>(&self, key: &str, value: &T) -> Result<Vec<Pair>> {
        let mut out = Vec::new();
        self.encode_into(key, value, &mut out)?;
        Ok(out)
    }

    /// Encodes `value` as a root value (empty key prefix).
    ///
    /// # Errors
    ///
    /// See [`Encoder::encode_into`].
    pub fn encode<T: QueryEncode>(&self, value: &T) -> Result<Vec<Pair>> {
        self.encode_with_prefix("", value)
    }

    /// Number of types with a cache entry (pending, ready or failed).
    #[must_use]
    pub fn cached_types(&self) -> usize {
        self.cache.len()
    }
}

/// Weak reference to an [`Encoder`], held by stringifiers of dynamic values.
#[derive(Clone, Debug)]
pub struct EncoderHandle(Weak<Encoder>);

impl EncoderHandle {
    /// Upgrades to the encoder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncoderReleased`] if the encoder has been dropped.
    pub fn upgrade(&self) -> Result<Arc<Encoder>> {
        self.0.upgrade().ok_or(Error::EncoderReleased)
    }
}
