//! Key values and the key frames that group them by time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{Millis, TargetId};
use crate::interp::Interpolator;
use crate::Value;

/// Channel key: (target shape, property key).
/// Uniquely identifies one animated property within a timeline.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelKey {
    pub target: TargetId,
    pub key: String,
}

impl ChannelKey {
    pub fn new(target: TargetId, key: impl Into<String>) -> Self {
        Self {
            target,
            key: key.into(),
        }
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.target, self.key)
    }
}

/// "At this key frame's time, `target.key` equals `value`, approached using
/// `interpolator`."
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub target: TargetId,
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub interpolator: Interpolator,
}

impl KeyValue {
    pub fn new(
        target: TargetId,
        key: impl Into<String>,
        value: Value,
        interpolator: Option<Interpolator>,
    ) -> Self {
        Self {
            target,
            key: key.into(),
            value,
            interpolator: interpolator.unwrap_or_else(Interpolator::linear),
        }
    }

    pub fn channel(&self) -> ChannelKey {
        ChannelKey::new(self.target, self.key.clone())
    }
}

/// The key values sharing one absolute time. At most one key value per
/// channel; iteration is ordered by target then key.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyFrame {
    time: Millis,
    values: BTreeMap<ChannelKey, KeyValue>,
}

impl KeyFrame {
    pub fn new(time: Millis) -> Self {
        Self {
            time,
            values: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn time(&self) -> Millis {
        self.time
    }

    #[inline]
    pub(crate) fn set_time(&mut self, time: Millis) {
        self.time = time;
    }

    #[inline]
    pub fn is_base(&self) -> bool {
        self.time == 0
    }

    pub fn get_key_value(&self, target: TargetId, key: &str) -> Option<&KeyValue> {
        self.values.get(&ChannelKey::new(target, key))
    }

    #[inline]
    pub fn get(&self, channel: &ChannelKey) -> Option<&KeyValue> {
        self.values.get(channel)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, channel: &ChannelKey) -> Option<&mut KeyValue> {
        self.values.get_mut(channel)
    }

    #[inline]
    pub fn contains(&self, channel: &ChannelKey) -> bool {
        self.values.contains_key(channel)
    }

    /// Insert or replace the binding for (target, key). Returns the replaced one.
    pub fn set_key_value(
        &mut self,
        target: TargetId,
        key: impl Into<String>,
        value: Value,
        interpolator: Option<Interpolator>,
    ) -> Option<KeyValue> {
        self.insert(KeyValue::new(target, key, value, interpolator))
    }

    pub fn insert(&mut self, key_value: KeyValue) -> Option<KeyValue> {
        self.values.insert(key_value.channel(), key_value)
    }

    pub fn remove_key_value(&mut self, target: TargetId, key: &str) -> Option<KeyValue> {
        self.values.remove(&ChannelKey::new(target, key))
    }

    /// Drop every binding of `target`; returns how many were removed.
    pub fn remove_target(&mut self, target: TargetId) -> usize {
        let before = self.values.len();
        self.values.retain(|channel, _| channel.target != target);
        before - self.values.len()
    }

    /// Move all of `other`'s key values into this frame; `other` wins on
    /// channel conflicts.
    pub(crate) fn absorb(&mut self, other: KeyFrame) {
        self.values.extend(other.values);
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.values.values()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&ChannelKey, &KeyValue)> {
        self.values.iter()
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelKey> {
        self.values.keys()
    }

    pub fn has_target(&self, target: TargetId) -> bool {
        self.values.keys().any(|c| c.target == target)
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
