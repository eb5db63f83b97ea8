//! Engine factory and registry for strata engines.
//!
//! Hosts pick engines by a stable integer id ([`create_engine`]) or by a
//! lowercase key through [`EngineRegistry`], which also carries the
//! metadata needed to build a selection UI.
//!
//! # Example
//!
//! ```rust
//! use strata_core::{AudioBuffer, ProcessSpec};
//! use strata_registry::{EngineCategory, EngineRegistry, create_engine};
//!
//! let mut filter = create_engine(1).expect("filter is built in");
//! filter.prepare(&ProcessSpec::new(44100.0, 128, 1)).unwrap();
//! let mut block = [0.0f32; 128];
//! filter.process(&mut AudioBuffer::interleaved(&mut block, 1));
//!
//! assert!(create_engine(99).is_none());
//!
//! let registry = EngineRegistry::new();
//! for descriptor in registry.in_category(EngineCategory::TimeBased) {
//!     println!("{}: {}", descriptor.name, descriptor.description);
//! }
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! strata-registry = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

use strata_core::{Engine, EngineId};
use strata_engines::{Saturator, TempoDelay, ZdfFilter};

/// Engine family, for grouping in a UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineCategory {
    /// Filters and filter-based voices.
    Filter,
    /// Waveshaping and saturation.
    Distortion,
    /// Delays and other time-based engines.
    TimeBased,
}

impl EngineCategory {
    /// Display name.
    pub const fn name(&self) -> &'static str {
        match self {
            EngineCategory::Filter => "Filter",
            EngineCategory::Distortion => "Distortion",
            EngineCategory::TimeBased => "Time-Based",
        }
    }

    /// One-line description.
    pub const fn description(&self) -> &'static str {
        match self {
            EngineCategory::Filter => "Resonant multi-mode filters",
            EngineCategory::Distortion => "Drive, saturation and waveshaping",
            EngineCategory::TimeBased => "Delays and echoes",
        }
    }
}

/// Metadata for one registered engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineDescriptor {
    /// Stable integer identifier.
    pub id: EngineId,
    /// Lowercase key, no spaces.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Category.
    pub category: EngineCategory,
    /// Number of parameters.
    pub param_count: usize,
}

/// Builds a fresh engine, prepared for the default configuration.
pub type EngineFactory = fn() -> Box<dyn Engine>;

#[derive(Clone, Copy)]
struct RegistryEntry {
    descriptor: EngineDescriptor,
    factory: EngineFactory,
}

static BUILTIN: [RegistryEntry; 3] = [
    RegistryEntry {
        descriptor: EngineDescriptor {
            id: ZdfFilter::ID,
            key: "zdf_filter",
            name: "ZDF Filter",
            description: "Self-oscillating ladder / state-variable filter with analog drift",
            category: EngineCategory::Filter,
            param_count: 10,
        },
        factory: || Box::new(ZdfFilter::new()),
    },
    RegistryEntry {
        descriptor: EngineDescriptor {
            id: Saturator::ID,
            key: "saturator",
            name: "Saturator",
            description: "Waveshaping saturation with tone and output level",
            category: EngineCategory::Distortion,
            param_count: 5,
        },
        factory: || Box::new(Saturator::new()),
    },
    RegistryEntry {
        descriptor: EngineDescriptor {
            id: TempoDelay::ID,
            key: "tempo_delay",
            name: "Tempo Delay",
            description: "Feedback delay with host tempo sync",
            category: EngineCategory::TimeBased,
            param_count: 6,
        },
        factory: || Box::new(TempoDelay::new()),
    },
];

/// Create a built-in engine by integer id.
///
/// Returns `None` for unknown ids.
pub fn create_engine(id: u32) -> Option<Box<dyn Engine>> {
    let entry = BUILTIN.iter().find(|e| e.descriptor.id.0 == id);

    #[cfg(feature = "tracing")]
    {
        if entry.is_none() {
            tracing::debug!("create_engine: no engine with id {id}");
        }
    }

    entry.map(|e| (e.factory)())
}

/// Registry of available engines.
///
/// Starts with every built-in engine; hosts can register their own.
pub struct EngineRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRegistry {
    /// Registry holding the built-in engines.
    pub fn new() -> Self {
        Self {
            entries: BUILTIN.to_vec(),
        }
    }

    /// Add an engine. Returns `false`, leaving the registry unchanged, when
    /// the id or key is already taken.
    pub fn register(&mut self, descriptor: EngineDescriptor, factory: EngineFactory) -> bool {
        let taken = self
            .entries
            .iter()
            .any(|e| e.descriptor.id == descriptor.id || e.descriptor.key == descriptor.key);
        if taken {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "engine_registry: {} ({}) collides with a registered engine",
                descriptor.key,
                descriptor.id
            );
            return false;
        }
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
        true
    }

    /// Every registered descriptor, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &EngineDescriptor> + '_ {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// Descriptors in `category`.
    pub fn in_category(
        &self,
        category: EngineCategory,
    ) -> impl Iterator<Item = &EngineDescriptor> + '_ {
        self.descriptors().filter(move |d| d.category == category)
    }

    /// Descriptor by id.
    pub fn get(&self, id: EngineId) -> Option<&EngineDescriptor> {
        self.descriptors().find(|d| d.id == id)
    }

    /// Descriptor by key.
    pub fn get_by_key(&self, key: &str) -> Option<&EngineDescriptor> {
        self.descriptors().find(|d| d.key == key)
    }

    /// Create an engine by id.
    pub fn create(&self, id: EngineId) -> Option<Box<dyn Engine>> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| (e.factory)())
    }

    /// Create an engine by key.
    pub fn create_by_key(&self, key: &str) -> Option<Box<dyn Engine>> {
        let entry = self.entries.iter().find(|e| e.descriptor.key == key);

        #[cfg(feature = "tracing")]
        {
            if entry.is_none() {
                tracing::debug!("engine_registry: no engine with key {key:?}");
            }
        }

        entry.map(|e| (e.factory)())
    }

    /// Index of the parameter named `name` (full or short name, any case).
    pub fn param_index_by_name(&self, key: &str, name: &str) -> Option<usize> {
        let engine = self.create_by_key(key)?;
        (0..engine.num_parameters()).find(|&i| {
            engine.parameter_spec(i).is_some_and(|spec| {
                spec.name.eq_ignore_ascii_case(name) || spec.short_name.eq_ignore_ascii_case(name)
            })
        })
    }

    /// Number of registered engines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
