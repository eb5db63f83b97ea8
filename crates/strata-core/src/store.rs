//! Lock-free parameter delivery between control and audio threads.
//!
//! A [`ParamStore`] holds one `AtomicU32` (the f32 bit pattern) per
//! parameter and a version counter. Control code publishes through a
//! [`ParamHandle`]; the engine pulls at block start, and only when the
//! version moved since its last pull.
//!
//! Every scalar is loaded and stored whole, so the audio thread never sees a
//! torn value. A block may observe some parameters of a concurrent update
//! and not others; the version bump that follows guarantees the remainder
//! arrives on the next block.
//!
//! ```rust
//! use strata_core::{ParamSpec, ParamStore, ParamUpdate};
//!
//! static SPECS: [ParamSpec; 2] = [
//!     ParamSpec::continuous("Cutoff", "Cutoff", 0.5, 20.0),
//!     ParamSpec::mix(),
//! ];
//!
//! let store = ParamStore::new(&SPECS);
//! let handle = store.handle();
//! handle.update(&ParamUpdate::new().with(0, 0.8).with(5, 1.0));
//!
//! assert_eq!(store.get(0), Some(0.8));
//! assert_eq!(store.get(5), None);
//! ```

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::param_spec::ParamSpec;

/// Capacity of a [`ParamUpdate`].
pub const MAX_UPDATE_ENTRIES: usize = 32;

/// Sparse set of parameter changes, ordered by index.
///
/// Fixed inline capacity, so building one never allocates. Writing an index
/// that is already present replaces the earlier value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamUpdate {
    entries: [(usize, f32); MAX_UPDATE_ENTRIES],
    len: usize,
}

impl ParamUpdate {
    /// Empty update.
    pub const fn new() -> Self {
        Self {
            entries: [(0, 0.0); MAX_UPDATE_ENTRIES],
            len: 0,
        }
    }

    /// Set `index` to `value`.
    ///
    /// Returns `false` when the update is full and `index` is not already
    /// present; the value is dropped in that case.
    pub fn set(&mut self, index: usize, value: f32) -> bool {
        let live = &self.entries[..self.len];
        match live.binary_search_by_key(&index, |&(i, _)| i) {
            Ok(pos) => {
                self.entries[pos].1 = value;
                true
            }
            Err(_) if self.len == MAX_UPDATE_ENTRIES => false,
            Err(pos) => {
                self.entries.copy_within(pos..self.len, pos + 1);
                self.entries[pos] = (index, value);
                self.len += 1;
                true
            }
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, index: usize, value: f32) -> Self {
        self.set(index, value);
        self
    }

    /// Value for `index`, if present.
    pub fn get(&self, index: usize) -> Option<f32> {
        let live = &self.entries[..self.len];
        live.binary_search_by_key(&index, |&(i, _)| i)
            .ok()
            .map(|pos| live[pos].1)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no entries are present.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.entries[..self.len].iter().copied()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for ParamUpdate {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared atomic parameter values for one engine instance.
#[derive(Debug)]
pub struct ParamStore {
    specs: &'static [ParamSpec],
    values: Box<[AtomicU32]>,
    version: AtomicU32,
}

impl ParamStore {
    /// Store initialised to each parameter's default.
    pub fn new(specs: &'static [ParamSpec]) -> Arc<Self> {
        let values = specs
            .iter()
            .map(|spec| AtomicU32::new(spec.clamp(spec.default).to_bits()))
            .collect();
        Arc::new(Self {
            specs,
            values,
            version: AtomicU32::new(0),
        })
    }

    /// Control-thread handle onto this store.
    pub fn handle(self: &Arc<Self>) -> ParamHandle {
        ParamHandle {
            store: Arc::clone(self),
        }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for an engine without parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter descriptions, in index order.
    pub fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    /// Current published value of `index`.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values
            .get(index)
            .map(|v| f32::from_bits(v.load(Ordering::Acquire)))
    }

    /// Publish one value. Out-of-range indices are ignored.
    pub fn set(&self, index: usize, value: f32) -> bool {
        let stored = self.store_value(index, value);
        if stored {
            self.version.fetch_add(1, Ordering::Release);
        }
        stored
    }

    /// Publish every present entry of `update`, then bump the version once.
    ///
    /// Returns how many entries named a real parameter.
    pub fn apply(&self, update: &ParamUpdate) -> usize {
        let applied = update
            .iter()
            .filter(|&(index, value)| self.store_value(index, value))
            .count();
        if applied > 0 {
            self.version.fetch_add(1, Ordering::Release);
        }
        applied
    }

    /// Put every parameter back to its default.
    pub fn reset_to_defaults(&self) {
        for (slot, spec) in self.values.iter().zip(self.specs) {
            slot.store(spec.clamp(spec.default).to_bits(), Ordering::Release);
        }
        self.version.fetch_add(1, Ordering::Release);
    }

    /// Version counter; changes on every publish.
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }

    /// True when something was published after `seen` was read.
    #[inline]
    pub fn changed_since(&self, seen: u32) -> bool {
        self.version() != seen
    }

    /// Copy every value into `out` and return the version they belong to.
    ///
    /// The version is read first, so values are at least that fresh.
    pub fn snapshot_into(&self, out: &mut [f32]) -> u32 {
        let version = self.version();
        for (dst, src) in out.iter_mut().zip(self.values.iter()) {
            *dst = f32::from_bits(src.load(Ordering::Acquire));
        }
        version
    }

    fn store_value(&self, index: usize, value: f32) -> bool {
        match (self.values.get(index), self.specs.get(index)) {
            (Some(slot), Some(spec)) => {
                slot.store(spec.clamp(value).to_bits(), Ordering::Release);
                true
            }
            _ => false,
        }
    }
}

/// Control-thread handle onto an engine's parameters.
///
/// Cheap to clone and safe to move to any thread. Updates published here are
/// picked up by the engine at its next block boundary.
#[derive(Debug, Clone)]
pub struct ParamHandle {
    store: Arc<ParamStore>,
}

impl ParamHandle {
    /// Publish a sparse update. Indices past the parameter count are ignored.
    pub fn update(&self, values: &ParamUpdate) -> usize {
        self.store.apply(values)
    }

    /// Publish a single value.
    pub fn set(&self, index: usize, value: f32) -> bool {
        self.store.set(index, value)
    }

    /// Last published value of `index`.
    pub fn get(&self, index: usize) -> Option<f32> {
        self.store.get(index)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True for an engine without parameters.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
