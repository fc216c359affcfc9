//! Interpolation registry and helpers.
//!
//! An [`Interpolator`] is a named, stateless easing function. Interpolators
//! are resolved by name once, when a key value is created or loaded, and are
//! carried around as cheap shared handles afterwards. Unknown names resolve
//! to [`LINEAR`]; that fallback is policy, not an error. The requested name is
//! kept on the fallback handle so it is written back unchanged.
//!
//! A process-wide registry backs the free functions [`register`], [`get`],
//! [`count`] and [`at`]. It is seeded with the built-ins on first use and only
//! changes through explicit registration.

pub mod functions;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const LINEAR: &str = "Linear";
pub const EASE_IN: &str = "EaseIn";
pub const EASE_OUT: &str = "EaseOut";
pub const EASE_IN_OUT: &str = "EaseInOut";
pub const EASE: &str = "Ease";
pub const SMOOTH: &str = "Smooth";
pub const STEP: &str = "Step";

type EaseFn = dyn Fn(f64) -> f64 + Send + Sync;

/// Named mapping from normalized progress to eased progress.
#[derive(Clone)]
pub struct Interpolator {
    name: Arc<str>,
    ease: Arc<EaseFn>,
    /// Unregistered name this handle stands in for.
    requested: Option<Arc<str>>,
}

impl Interpolator {
    pub fn new<F>(name: impl Into<String>, ease: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            ease: Arc::new(ease),
            requested: None,
        }
    }

    /// The process-wide Linear interpolator.
    pub fn linear() -> Self {
        get(LINEAR)
    }

    /// Resolve by name against the process-wide registry.
    pub fn named(name: &str) -> Self {
        get(name)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name to persist: the requested name for a fallback, otherwise
    /// [`name`](Self::name).
    #[inline]
    pub fn stored_name(&self) -> &str {
        self.requested.as_deref().unwrap_or(&self.name)
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.requested.is_some()
    }

    #[inline]
    pub fn is_linear(&self) -> bool {
        &*self.name == LINEAR
    }

    /// Eased progress. Input is clamped to [0,1], the endpoints are fixed and
    /// the output is clamped so a misbehaving registered curve cannot
    /// overshoot the control points.
    pub fn ease(&self, progress: f64) -> f64 {
        if progress.is_nan() || progress <= 0.0 {
            return 0.0;
        }
        if progress >= 1.0 {
            return 1.0;
        }
        let eased = (self.ease)(progress);
        if eased.is_nan() {
            progress
        } else {
            eased.clamp(0.0, 1.0)
        }
    }
}

impl fmt::Debug for Interpolator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Interpolator").field(&self.name()).finish()
    }
}

/// Compares the curve that is applied; a fallback equals Linear.
impl PartialEq for Interpolator {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::linear()
    }
}

impl Serialize for Interpolator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.stored_name())
    }
}

impl<'de> Deserialize<'de> for Interpolator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(get(&name))
    }
}

/// Ordered table of interpolators. Index 0 is always Linear.
#[derive(Debug)]
pub struct InterpRegistry {
    entries: Vec<Interpolator>,
    by_name: HashMap<String, usize>,
}

impl InterpRegistry {
    /// Registry seeded with the built-in curves.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            by_name: HashMap::new(),
        };
        registry.register(LINEAR, functions::linear);
        registry.register(EASE_IN, functions::ease_in);
        registry.register(EASE_OUT, functions::ease_out);
        registry.register(EASE_IN_OUT, functions::ease_in_out);
        registry.register(EASE, functions::ease);
        registry.register(SMOOTH, functions::smooth);
        registry.register(STEP, functions::step);
        registry
    }

    /// Register (or replace in place) a named curve.
    pub fn register<F>(&mut self, name: &str, ease: F) -> Interpolator
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let interpolator = Interpolator::new(name, ease);
        self.insert(interpolator.clone());
        interpolator
    }

    pub fn insert(&mut self, interpolator: Interpolator) {
        match self.by_name.get(interpolator.name()) {
            Some(&idx) => self.entries[idx] = interpolator,
            None => {
                self.by_name
                    .insert(interpolator.name().to_string(), self.entries.len());
                self.entries.push(interpolator);
            }
        }
    }

    /// Exact lookup without fallback.
    pub fn lookup(&self, name: &str) -> Option<&Interpolator> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// Lookup with the Linear fallback for unknown names.
    pub fn get(&self, name: &str) -> Interpolator {
        match self.lookup(name) {
            Some(found) => found.clone(),
            None => Interpolator {
                requested: Some(Arc::from(name)),
                ..self.entries[0].clone()
            },
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn at(&self, index: usize) -> Option<&Interpolator> {
        self.entries.get(index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|i| i.name()).collect()
    }
}

impl Default for InterpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<RwLock<InterpRegistry>> = Lazy::new(|| RwLock::new(InterpRegistry::new()));

/// Register a curve in the process-wide registry.
pub fn register<F>(name: &str, ease: F) -> Interpolator
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    log::debug!("interp: registering '{name}'");
    GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, ease)
}

/// Resolve a name in the process-wide registry, falling back to Linear.
pub fn get(name: &str) -> Interpolator {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
}

/// Whether `name` is registered (no fallback applied).
pub fn contains(name: &str) -> bool {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .lookup(name)
        .is_some()
}

pub fn count() -> usize {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).count()
}

pub fn at(index: usize) -> Option<Interpolator> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .at(index)
        .cloned()
}
