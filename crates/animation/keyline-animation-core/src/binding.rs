//! Property-binding seam between the engine and the host document.
//!
//! The engine never inspects shapes. Hosts implement [`PropertyBinding`] to
//! read and write named properties on a target; [`PropertyMap`] is an
//! in-memory implementation for headless hosts and tooling.

use hashbrown::HashMap;

use crate::ids::TargetId;
use crate::keyframe::ChannelKey;
use crate::timeline::TimelineState;
use crate::Value;

/// Get/set a named property on a target shape.
pub trait PropertyBinding {
    fn get_property(&self, target: TargetId, key: &str) -> Option<Value>;
    fn set_property(&mut self, target: TargetId, key: &str, value: Value);
}

/// Write every channel of `state` through `binding`, in channel order.
pub fn apply_state(binding: &mut dyn PropertyBinding, state: TimelineState) {
    for (channel, value) in state {
        binding.set_property(channel.target, &channel.key, value);
    }
}

/// Property store keyed by channel.
#[derive(Clone, Debug, Default)]
pub struct PropertyMap {
    values: HashMap<ChannelKey, Value>,
    writes: usize,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target: TargetId, key: &str) -> Option<&Value> {
        self.values.get(&ChannelKey::new(target, key))
    }

    /// Total number of `set_property` calls received.
    #[inline]
    pub fn writes(&self) -> usize {
        self.writes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertyBinding for PropertyMap {
    fn get_property(&self, target: TargetId, key: &str) -> Option<Value> {
        self.get(target, key).cloned()
    }

    fn set_property(&mut self, target: TargetId, key: &str, value: Value) {
        self.writes += 1;
        self.values.insert(ChannelKey::new(target, key), value);
    }
}
