//! Timeline: the ordered key frames of one shape subtree.
//!
//! Invariants held by every public operation:
//! - frames are strictly increasing by time and frame 0 always exists;
//! - no frame other than frame 0 is empty;
//! - a channel appears at most once per frame.
//!
//! Evaluation is a pure function of (frames, time).

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use keyline_api_core::blend::blend_values;
use keyline_api_core::delta::offset;

use crate::error::TimelineError;
use crate::ids::{Millis, TargetId};
use crate::interp::Interpolator;
use crate::keyframe::{ChannelKey, KeyFrame, KeyValue};
use crate::{Result, Value};

/// Interpolated values of every animated channel at one instant.
pub type TimelineState = BTreeMap<ChannelKey, Value>;

/// Outcome of [`Timeline::remove_frames_between_times`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameRemoval {
    pub removed: usize,
    /// The range covered frame 0, which was kept.
    pub base_frame_refused: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    owner: TargetId,
    targets: BTreeSet<TargetId>,
    frames: Vec<KeyFrame>,
}

#[inline]
fn in_range(time: Millis, start: Millis, end: Millis, inclusive_end: bool) -> bool {
    time >= start && (time < end || (inclusive_end && time == end))
}

/// Control point bounding a query time: (frame time, key value).
type ControlPoint<'a> = (Millis, &'a KeyValue);

fn resolve(time: Millis, left: Option<ControlPoint>, right: Option<ControlPoint>) -> Option<Value> {
    match (left, right) {
        (None, None) => None,
        (Some((_, kv)), None) | (None, Some((_, kv))) => Some(kv.value.clone()),
        (Some((lt, l)), Some((rt, _))) if lt == rt => Some(l.value.clone()),
        (Some((lt, l)), Some((rt, r))) => {
            let progress = (time - lt) as f64 / (rt - lt) as f64;
            let eased = r.interpolator.ease(progress);
            Some(blend_values(&l.value, &r.value, eased))
        }
    }
}

impl Timeline {
    /// Empty timeline: only the base frame, with `owner` as the sole known target.
    pub fn new(owner: TargetId) -> Self {
        Self {
            owner,
            targets: BTreeSet::from([owner]),
            frames: vec![KeyFrame::new(0)],
        }
    }

    /// Assemble from already validated parts.
    pub(crate) fn from_parts(
        owner: TargetId,
        targets: BTreeSet<TargetId>,
        frames: Vec<KeyFrame>,
    ) -> Self {
        let mut targets = targets;
        targets.insert(owner);
        Self {
            owner,
            targets,
            frames,
        }
    }

    #[inline]
    pub fn owner(&self) -> TargetId {
        self.owner
    }

    // ----- known targets -----

    pub fn targets(&self) -> impl Iterator<Item = TargetId> + '_ {
        self.targets.iter().copied()
    }

    #[inline]
    pub fn has_target(&self, target: TargetId) -> bool {
        self.targets.contains(&target)
    }

    /// Make `target` addressable by mutating calls. Returns false if already known.
    pub fn add_target(&mut self, target: TargetId) -> bool {
        self.targets.insert(target)
    }

    /// Forget `target`: strip its key values everywhere and prune emptied
    /// frames. The owner stays known. Returns the number of key values removed.
    pub fn remove_target(&mut self, target: TargetId) -> usize {
        if target != self.owner {
            self.targets.remove(&target);
        }
        let removed = self
            .frames
            .iter_mut()
            .map(|f| f.remove_target(target))
            .sum();
        self.prune_empty();
        removed
    }

    fn ensure_target(&self, target: TargetId) -> Result<()> {
        if self.has_target(target) {
            Ok(())
        } else {
            Err(TimelineError::UnknownTarget {
                owner: self.owner,
                target,
            })
        }
    }

    // ----- frames -----

    #[inline]
    pub fn frames(&self) -> &[KeyFrame] {
        &self.frames
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn position(&self, time: Millis) -> std::result::Result<usize, usize> {
        self.frames.binary_search_by_key(&time, |f| f.time())
    }

    pub fn key_frame(&self, time: Millis) -> Option<&KeyFrame> {
        self.position(time).ok().map(|idx| &self.frames[idx])
    }

    fn key_frame_or_insert(&mut self, time: Millis) -> &mut KeyFrame {
        let idx = match self.position(time) {
            Ok(idx) => idx,
            Err(idx) => {
                self.frames.insert(idx, KeyFrame::new(time));
                idx
            }
        };
        &mut self.frames[idx]
    }

    fn prune_empty(&mut self) {
        self.frames.retain(|f| f.is_base() || !f.is_empty());
    }

    /// No key value anywhere.
    pub fn is_empty(&self) -> bool {
        self.frames.iter().all(|f| f.is_empty())
    }

    pub fn key_value_count(&self) -> usize {
        self.frames.iter().map(|f| f.len()).sum()
    }

    /// Every channel that has at least one key value.
    pub fn channels(&self) -> BTreeSet<ChannelKey> {
        self.frames
            .iter()
            .flat_map(|f| f.channels().cloned())
            .collect()
    }

    // ----- discovery -----

    pub fn key_frame_times(&self) -> Vec<Millis> {
        self.frames.iter().map(|f| f.time()).collect()
    }

    /// Times of frames binding `targets`: any of them when `require_any`,
    /// otherwise every one of them.
    pub fn key_frame_times_for(&self, targets: &[TargetId], require_any: bool) -> Vec<Millis> {
        self.frames
            .iter()
            .filter(|f| {
                if require_any {
                    targets.iter().any(|t| f.has_target(*t))
                } else {
                    targets.iter().all(|t| f.has_target(*t))
                }
            })
            .map(|f| f.time())
            .collect()
    }

    pub fn next_key_frame_time(&self, after: Millis) -> Option<Millis> {
        let idx = match self.position(after) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        };
        self.frames.get(idx).map(|f| f.time())
    }

    pub fn previous_key_frame_time(&self, before: Millis) -> Option<Millis> {
        let idx = match self.position(before) {
            Ok(idx) | Err(idx) => idx,
        };
        idx.checked_sub(1).map(|i| self.frames[i].time())
    }

    pub fn last_key_frame_time(&self) -> Millis {
        self.frames.last().map(|f| f.time()).unwrap_or(0)
    }

    // ----- evaluation -----

    /// Interpolated state of every animated channel at `time`.
    pub fn evaluate(&self, time: Millis) -> TimelineState {
        let mut left: BTreeMap<&ChannelKey, ControlPoint> = BTreeMap::new();
        let mut right: BTreeMap<&ChannelKey, ControlPoint> = BTreeMap::new();
        for frame in &self.frames {
            let t = frame.time();
            for kv in frame.entries() {
                if t <= time {
                    left.insert(kv.0, (t, kv.1));
                }
                if t >= time {
                    right.entry(kv.0).or_insert((t, kv.1));
                }
            }
        }
        let channels: BTreeSet<&ChannelKey> = left.keys().chain(right.keys()).copied().collect();
        let state: TimelineState = channels
            .into_iter()
            .filter_map(|ch| {
                resolve(time, left.get(ch).copied(), right.get(ch).copied())
                    .map(|v| (ch.clone(), v))
            })
            .collect();
        log::trace!(
            "timeline {}: evaluated {} channels at {time} ms",
            self.owner,
            state.len()
        );
        state
    }

    /// Interpolated value of one channel at `time`; `None` if unanimated.
    pub fn value_at(&self, time: Millis, target: TargetId, key: &str) -> Option<Value> {
        let channel = ChannelKey::new(target, key);
        let mut left = None;
        let mut right = None;
        for frame in &self.frames {
            if let Some(kv) = frame.get(&channel) {
                let t = frame.time();
                if t <= time {
                    left = Some((t, kv));
                }
                if t >= time {
                    right = Some((t, kv));
                    break;
                }
            }
        }
        resolve(time, left, right)
    }

    // ----- mutation -----

    /// Bind `target.key = value` at `time`, creating the frame if needed.
    /// Returns the key value it replaced.
    pub fn set_key_frame_key_value(
        &mut self,
        time: Millis,
        target: TargetId,
        key: impl Into<String>,
        value: Value,
        interpolator: Option<Interpolator>,
    ) -> Result<Option<KeyValue>> {
        self.ensure_target(target)?;
        Ok(self
            .key_frame_or_insert(time)
            .set_key_value(target, key, value, interpolator))
    }

    /// Remove the (target, key) binding from frames in `[start, end]`
    /// (or `[start, end)`). Frame 0 loses its binding but is never removed.
    /// Returns the number of key values removed.
    pub fn remove_key_frame_key_values(
        &mut self,
        target: TargetId,
        key: &str,
        start: Millis,
        end: Millis,
        inclusive_end: bool,
    ) -> Result<usize> {
        self.ensure_target(target)?;
        let mut removed = 0;
        for frame in self
            .frames
            .iter_mut()
            .filter(|f| in_range(f.time(), start, end, inclusive_end))
        {
            if frame.remove_key_value(target, key).is_some() {
                removed += 1;
            }
        }
        self.prune_empty();
        Ok(removed)
    }

    /// Remove whole frames in `[start, end]` (or `[start, end)`).
    /// Frame 0 is protected; covering it is reported, not an error.
    pub fn remove_frames_between_times(
        &mut self,
        start: Millis,
        end: Millis,
        inclusive_end: bool,
    ) -> FrameRemoval {
        let before = self.frames.len();
        let mut outcome = FrameRemoval::default();
        self.frames.retain(|f| {
            if !in_range(f.time(), start, end, inclusive_end) {
                return true;
            }
            if f.is_base() {
                outcome.base_frame_refused = true;
                return true;
            }
            false
        });
        outcome.removed = before - self.frames.len();
        if outcome.base_frame_refused {
            log::warn!(
                "timeline {}: refused to remove base frame in [{start}, {end}]",
                self.owner
            );
        }
        outcome
    }

    /// Rebuild the frame list, moving each frame through `remap`.
    /// Frames are visited in ascending original order, so on a collision the
    /// later frame's key values win. When frame 0 is remapped elsewhere its
    /// key values move and an empty frame 0 stays behind.
    fn remap_frames<F>(&mut self, mut remap: F) -> usize
    where
        F: FnMut(Millis) -> Option<Millis>,
    {
        let mut moved = 0;
        let mut stationary: BTreeMap<Millis, KeyFrame> = BTreeMap::new();
        let mut moving: Vec<(Millis, KeyFrame)> = Vec::new();
        for frame in self.frames.drain(..) {
            let leaves_base = frame.is_base() && frame.is_empty();
            match remap(frame.time()) {
                Some(new_time) if new_time != frame.time() && !leaves_base => {
                    if frame.is_base() {
                        stationary.insert(0, KeyFrame::new(0));
                    }
                    moving.push((new_time, frame));
                }
                _ => {
                    stationary.insert(frame.time(), frame);
                }
            }
        }
        for (new_time, mut frame) in moving {
            moved += 1;
            match stationary.entry(new_time) {
                Entry::Occupied(mut slot) => slot.get_mut().absorb(frame),
                Entry::Vacant(slot) => {
                    frame.set_time(new_time);
                    slot.insert(frame);
                }
            }
        }
        self.frames = stationary.into_values().collect();
        moved
    }

    /// Move every frame at or after `from` by `amount` ms, keeping their
    /// spacing. Shifting from 0 moves frame 0's key values and leaves an empty
    /// frame 0; frames pushed below zero land on 0. Returns the number of
    /// frames moved.
    pub fn shift_frames(&mut self, from: Millis, amount: i64) -> usize {
        if amount == 0 {
            return 0;
        }
        let moved = self.remap_frames(|t| {
            (t >= from).then(|| {
                let shifted = t as i64 + amount;
                shifted.max(0) as Millis
            })
        });
        log::debug!(
            "timeline {}: shifted {moved} frames from {from} ms by {amount} ms",
            self.owner
        );
        moved
    }

    /// Linearly remap frames at or after `from` from `[from, old_max]` onto
    /// `[from, new_max]`, rounding to the nearest ms. `new_max == from`
    /// collapses them onto `from`, the latest frame winning. Returns false
    /// when `old_max <= from` or `new_max < from` and nothing was scaled.
    pub fn scale_frames(&mut self, from: Millis, old_max: Millis, new_max: Millis) -> bool {
        if old_max <= from || new_max < from {
            log::warn!(
                "timeline {}: degenerate scale from {from} ms ({old_max} -> {new_max})",
                self.owner
            );
            return false;
        }
        let ratio = (new_max - from) as f64 / (old_max - from) as f64;
        self.remap_frames(|t| {
            (t >= from).then(|| from + ((t - from) as f64 * ratio).round() as Millis)
        });
        true
    }

    /// Lock the interpolated appearance at `at` into a new frame. Only valid
    /// strictly between two frames where no frame exists yet; returns false
    /// when refused.
    pub fn add_freeze_frame(&mut self, at: Millis) -> bool {
        let between = self.previous_key_frame_time(at).is_some()
            && self.next_key_frame_time(at).is_some()
            && self.key_frame(at).is_none();
        if !between {
            log::warn!(
                "timeline {}: freeze at {at} ms refused (not an intermediate frame)",
                self.owner
            );
            return false;
        }
        let state = self.evaluate(at);
        if state.is_empty() {
            return false;
        }
        let mut frame = KeyFrame::new(at);
        for (channel, value) in state {
            let interpolator = self.approach_interpolator(&channel, at);
            frame.insert(KeyValue {
                target: channel.target,
                key: channel.key,
                value,
                interpolator,
            });
        }
        let idx = self.position(at).unwrap_or_else(|idx| idx);
        self.frames.insert(idx, frame);
        true
    }

    /// Interpolator of the next control point after `time` for `channel`.
    fn approach_interpolator(&self, channel: &ChannelKey, time: Millis) -> Interpolator {
        self.frames
            .iter()
            .filter(|f| f.time() > time)
            .find_map(|f| f.get(channel))
            .map(|kv| kv.interpolator.clone())
            .unwrap_or_else(Interpolator::linear)
    }

    /// Add `delta` to every numeric key value of (target, key) in frames
    /// within `[start, end]`. Discrete values are replaced by `absolute`.
    /// Returns the number of key values touched.
    pub fn apply_relative_edit(
        &mut self,
        target: TargetId,
        key: &str,
        start: Millis,
        end: Millis,
        delta: Option<&Value>,
        absolute: &Value,
    ) -> Result<usize> {
        self.ensure_target(target)?;
        let channel = ChannelKey::new(target, key);
        let mut touched = 0;
        for frame in self
            .frames
            .iter_mut()
            .filter(|f| in_range(f.time(), start, end, true))
        {
            if let Some(kv) = frame.get_mut(&channel) {
                kv.value = delta
                    .and_then(|d| offset(&kv.value, d))
                    .unwrap_or_else(|| absolute.clone());
                touched += 1;
            }
        }
        Ok(touched)
    }
}
