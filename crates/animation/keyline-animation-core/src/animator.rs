//! Animator: per-owner playback controller around one [`Timeline`].
//!
//! The animator owns a clock bounded by `max_time`, the playback flags and
//! the authoring scope. Evaluated state is pushed through a
//! [`PropertyBinding`] and listeners are told about every transition.
//!
//! Nested playback (children following a parent clock) is driven by the
//! [`Engine`](crate::engine::Engine); a standalone animator only drives its
//! own timeline.

use serde::{Deserialize, Serialize};

use keyline_api_core::delta::difference;

use crate::binding::{apply_state, PropertyBinding};
use crate::config::{clamp_frame_rate, AnimatorConfig, MIN_MAX_TIME_MS};
use crate::ids::{AnimatorId, ListenerId, Millis, TargetId};
use crate::interp::Interpolator;
use crate::keyframe::KeyValue;
use crate::listener::{AnimatorEvent, AnimatorListener, ListenerSet};
use crate::timeline::{FrameRemoval, Timeline, TimelineState};
use crate::{Result, Value};

/// Playback state machine: `Stopped <-> Playing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Where a child animator sits on its parent's clock.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildTiming {
    /// Parent time at which the child's local time starts at 0.
    pub start_offset_ms: Millis,
    /// Local ms per parent ms.
    pub time_scale: f64,
}

impl Default for ChildTiming {
    fn default() -> Self {
        Self {
            start_offset_ms: 0,
            time_scale: 1.0,
        }
    }
}

impl ChildTiming {
    /// Copy with a non-finite or negative scale replaced by 0 (frozen child).
    pub fn sanitized(self) -> Self {
        let time_scale = if self.time_scale.is_finite() && self.time_scale > 0.0 {
            self.time_scale
        } else {
            0.0
        };
        Self { time_scale, ..self }
    }

    /// Unwrapped local time for `parent_time`.
    #[inline]
    pub fn local_time(&self, parent_time: Millis) -> Millis {
        let elapsed = parent_time.saturating_sub(self.start_offset_ms) as f64;
        (elapsed * self.time_scale).round() as Millis
    }
}

/// Outcome of one clock step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Step {
    pub time: Millis,
    /// A non-looping animator hit `max_time` and stopped.
    pub ended: bool,
}

#[derive(Debug)]
pub struct Animator {
    id: AnimatorId,
    timeline: Timeline,
    time: Millis,
    frame_rate: f64,
    max_time: Millis,
    loops: bool,
    state: PlaybackState,
    reset_time_on_stop: bool,
    /// Set by an end-of-animation stop; the next play restarts from 0.
    pending_reset: bool,
    scope_time: Option<Millis>,
    listeners: ListenerSet,
    parent: Option<AnimatorId>,
    children: Vec<AnimatorId>,
    timing: ChildTiming,
}

impl Animator {
    pub fn new(id: AnimatorId, owner: TargetId, cfg: &AnimatorConfig) -> Self {
        Self::with_timeline(id, Timeline::new(owner), cfg)
    }

    /// Wrap an existing (for example, deserialized) timeline.
    pub fn with_timeline(id: AnimatorId, timeline: Timeline, cfg: &AnimatorConfig) -> Self {
        let cfg = cfg.sanitized();
        Self {
            id,
            timeline,
            time: 0,
            frame_rate: cfg.frame_rate,
            max_time: cfg.max_time_ms,
            loops: cfg.loops,
            state: PlaybackState::Stopped,
            reset_time_on_stop: cfg.reset_time_on_stop,
            pending_reset: false,
            scope_time: None,
            listeners: ListenerSet::default(),
            parent: None,
            children: Vec::new(),
            timing: ChildTiming::default(),
        }
    }

    // ----- accessors -----

    #[inline]
    pub fn id(&self) -> AnimatorId {
        self.id
    }

    #[inline]
    pub fn owner(&self) -> TargetId {
        self.timeline.owner()
    }

    #[inline]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[inline]
    pub fn time(&self) -> Millis {
        self.time
    }

    #[inline]
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    #[inline]
    pub fn max_time(&self) -> Millis {
        self.max_time
    }

    #[inline]
    pub fn loops(&self) -> bool {
        self.loops
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    #[inline]
    pub fn reset_time_on_stop(&self) -> bool {
        self.reset_time_on_stop
    }

    #[inline]
    pub fn scope_time(&self) -> Option<Millis> {
        self.scope_time
    }

    #[inline]
    pub fn parent(&self) -> Option<AnimatorId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[AnimatorId] {
        &self.children
    }

    #[inline]
    pub fn timing(&self) -> ChildTiming {
        self.timing
    }

    #[inline]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Duration of one frame in ms.
    #[inline]
    pub fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.frame_rate
    }

    /// Index of the frame containing the current time.
    pub fn current_frame(&self) -> u64 {
        (self.time as f64 / self.frame_duration_ms() + 1e-9).floor() as u64
    }

    // ----- settings -----

    /// Set frames per second; values below the minimum (or non-finite) are
    /// clamped.
    pub fn set_frame_rate(&mut self, fps: f64) {
        self.frame_rate = clamp_frame_rate(fps);
    }

    /// Set the animation length. The current time is pulled back inside
    /// the new bounds. Key frames beyond it are kept but never reached.
    pub fn set_max_time(&mut self, max_time: Millis) {
        self.max_time = max_time.max(MIN_MAX_TIME_MS);
        self.time = self.time.min(self.max_time);
    }

    /// Seconds-based variant of [`set_max_time`](Self::set_max_time).
    pub fn set_max_time_seconds(&mut self, seconds: f64) {
        let ms = if seconds.is_finite() && seconds > 0.0 {
            (seconds * 1000.0).round() as Millis
        } else {
            MIN_MAX_TIME_MS
        };
        self.set_max_time(ms);
    }

    /// Grow or shrink `max_time` to the last key frame.
    pub fn fit_max_time_to_key_frames(&mut self) {
        self.set_max_time(self.timeline.last_key_frame_time());
    }

    pub fn set_loops(&mut self, loops: bool) {
        self.loops = loops;
    }

    pub fn set_reset_time_on_stop(&mut self, reset: bool) {
        self.reset_time_on_stop = reset;
    }

    // ----- listeners -----

    pub fn add_listener(&mut self, listener: Box<dyn AnimatorListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub(crate) fn notify(&mut self, event: AnimatorEvent) {
        let mut listeners = std::mem::take(&mut self.listeners);
        listeners.dispatch(event, self);
        self.listeners = listeners;
    }

    // ----- clock -----

    /// Evaluated state at the current time.
    pub fn state_now(&self) -> TimelineState {
        self.timeline.evaluate(self.time)
    }

    /// Push the state at the current time through `binding`.
    pub fn apply(&self, binding: &mut dyn PropertyBinding) {
        apply_state(binding, self.state_now());
    }

    /// Re-apply the current time and tell listeners.
    pub fn refresh(&mut self, binding: &mut dyn PropertyBinding) {
        self.apply(binding);
        self.notify(AnimatorEvent::Updated);
    }

    /// Move the clock without side effects; clamps to `[0, max_time]`.
    pub(crate) fn seek(&mut self, time: Millis) -> Millis {
        self.pending_reset = false;
        self.time = time.min(self.max_time);
        self.time
    }

    /// Follow a parent clock: local time wraps when looping, clamps otherwise.
    pub(crate) fn follow_parent(&mut self, parent_time: Millis) -> Millis {
        let local = self.timing.local_time(parent_time);
        self.time = if self.loops {
            local % (self.max_time + 1)
        } else {
            local.min(self.max_time)
        };
        self.time
    }

    /// Advance the clock by `delta` if playing.
    pub(crate) fn step_time(&mut self, delta: Millis) -> Option<Step> {
        if !self.is_running() {
            return None;
        }
        let next = self.time.saturating_add(delta);
        let mut ended = false;
        self.time = if next <= self.max_time {
            next
        } else if self.loops {
            next % (self.max_time + 1)
        } else {
            ended = true;
            self.state = PlaybackState::Stopped;
            self.pending_reset = self.reset_time_on_stop;
            self.max_time
        };
        Some(Step {
            time: self.time,
            ended,
        })
    }

    /// Enter `Playing`. Returns `None` when already playing, otherwise
    /// whether the clock was reset to 0 after an end-of-animation stop.
    pub(crate) fn begin_play(&mut self) -> Option<bool> {
        if self.is_running() {
            return None;
        }
        self.state = PlaybackState::Playing;
        let pending = std::mem::take(&mut self.pending_reset);
        let reset = pending && self.reset_time_on_stop && self.time != 0;
        if reset {
            self.time = 0;
        }
        Some(reset)
    }

    /// Enter `Stopped`. Returns `None` when already stopped, otherwise
    /// whether the clock was reset to 0.
    pub(crate) fn end_play(&mut self) -> Option<bool> {
        if !self.is_running() {
            return None;
        }
        self.state = PlaybackState::Stopped;
        let reset = self.reset_time_on_stop && self.time != 0;
        if reset {
            self.time = 0;
        }
        Some(reset)
    }

    /// Jump to `time` (clamped to `[0, max_time]`), apply and notify.
    pub fn set_time(&mut self, time: Millis, binding: &mut dyn PropertyBinding) {
        self.seek(time);
        self.refresh(binding);
    }

    /// Step by `frames` frames (negative steps go backwards).
    pub fn step_frames(&mut self, frames: i64, binding: &mut dyn PropertyBinding) {
        let target = self.time as f64 + frames as f64 * self.frame_duration_ms();
        let target = target.round().clamp(0.0, self.max_time as f64) as Millis;
        self.set_time(target, binding);
    }

    /// Start playback. Returns false when already playing.
    pub fn play(&mut self, binding: &mut dyn PropertyBinding) -> bool {
        let Some(reset) = self.begin_play() else {
            return false;
        };
        log::debug!("{}: play from {} ms", self.id, self.time);
        if reset {
            self.apply(binding);
        }
        self.notify(AnimatorEvent::Started);
        if reset {
            self.notify(AnimatorEvent::Updated);
        }
        true
    }

    /// Stop playback. Returns false when already stopped.
    pub fn stop(&mut self, binding: &mut dyn PropertyBinding) -> bool {
        let Some(reset) = self.end_play() else {
            return false;
        };
        log::debug!("{}: stop at {} ms", self.id, self.time);
        if reset {
            self.apply(binding);
        }
        self.notify(AnimatorEvent::Stopped);
        if reset {
            self.notify(AnimatorEvent::Updated);
        }
        true
    }

    /// Driver tick. No-op while stopped; returns whether still playing.
    pub fn advance(&mut self, delta: Millis, binding: &mut dyn PropertyBinding) -> bool {
        let Some(step) = self.step_time(delta) else {
            return false;
        };
        log::trace!("{}: advance {delta} ms -> {} ms", self.id, step.time);
        self.refresh(binding);
        if step.ended {
            self.notify(AnimatorEvent::Stopped);
        }
        self.is_running()
    }

    // ----- scope -----

    /// Anchor for range edits; `None` edits only the current frame.
    pub fn set_scope_time(&mut self, scope: Option<Millis>) {
        self.scope_time = scope;
    }

    /// Key frame the scope resolves to: the frame at the scope time, else the
    /// nearest earlier frame. Frame 0 when no scope is set.
    pub fn scope_key_frame_time(&self) -> Millis {
        match self.scope_time {
            None => 0,
            Some(scope) if self.timeline.key_frame(scope).is_some() => scope,
            Some(scope) => self.timeline.previous_key_frame_time(scope).unwrap_or(0),
        }
    }

    /// Record a property edit made on the host at the current time.
    ///
    /// Without a scope the value is written at the current time. With a scope
    /// the edit is relative: every key value of the channel between the scope
    /// frame and the current time moves by the same difference. Returns the
    /// number of key values written.
    pub fn record_property_edit(
        &mut self,
        target: TargetId,
        key: &str,
        value: Value,
        binding: &mut dyn PropertyBinding,
    ) -> Result<usize> {
        let now = self.time;
        let current = self.timeline.value_at(now, target, key);
        let touched = match (self.scope_time, current) {
            (Some(_), Some(current)) => {
                let anchor = self.scope_key_frame_time();
                let (start, end) = (anchor.min(now), anchor.max(now));
                for edge in [start, end] {
                    self.pin_channel(edge, target, key)?;
                }
                let delta = difference(&current, &value);
                self.timeline
                    .apply_relative_edit(target, key, start, end, delta.as_ref(), &value)?
            }
            _ => {
                let interpolator = self
                    .timeline
                    .key_frame(now)
                    .and_then(|f| f.get_key_value(target, key))
                    .map(|kv| kv.interpolator.clone());
                self.timeline
                    .set_key_frame_key_value(now, target, key, value, interpolator)?;
                1
            }
        };
        if let Some(value) = self.timeline.value_at(now, target, key) {
            binding.set_property(target, key, value);
        }
        self.notify(AnimatorEvent::Updated);
        Ok(touched)
    }

    /// Make sure the frame at `time` binds the channel, using its evaluated
    /// value so the appearance does not change.
    fn pin_channel(&mut self, time: Millis, target: TargetId, key: &str) -> Result<()> {
        let bound = self
            .timeline
            .key_frame(time)
            .is_some_and(|f| f.get_key_value(target, key).is_some());
        if bound {
            return Ok(());
        }
        if let Some(value) = self.timeline.value_at(time, target, key) {
            self.timeline
                .set_key_frame_key_value(time, target, key, value, None)?;
        }
        Ok(())
    }

    // ----- editing -----

    pub fn set_key_value(
        &mut self,
        time: Millis,
        target: TargetId,
        key: &str,
        value: Value,
        interpolator: Option<Interpolator>,
    ) -> Result<Option<KeyValue>> {
        self.timeline
            .set_key_frame_key_value(time, target, key, value, interpolator)
    }

    pub fn remove_key_values(
        &mut self,
        target: TargetId,
        key: &str,
        start: Millis,
        end: Millis,
        inclusive_end: bool,
    ) -> Result<usize> {
        self.timeline
            .remove_key_frame_key_values(target, key, start, end, inclusive_end)
    }

    pub fn remove_frames_between_times(
        &mut self,
        start: Millis,
        end: Millis,
        inclusive_end: bool,
    ) -> FrameRemoval {
        self.timeline
            .remove_frames_between_times(start, end, inclusive_end)
    }

    pub fn shift_frames(&mut self, from: Millis, amount: i64) -> usize {
        self.timeline.shift_frames(from, amount)
    }

    /// Rescale frames at or after `from` so `[from, max_time]` becomes
    /// `[from, new_max]`, then adopt `new_max` as the animation length.
    pub fn scale_frames(&mut self, from: Millis, new_max: Millis) -> bool {
        if !self.timeline.scale_frames(from, self.max_time, new_max) {
            return false;
        }
        self.set_max_time(new_max);
        true
    }

    /// Freeze the interpolated appearance at the current time.
    pub fn add_freeze_frame(&mut self) -> bool {
        self.timeline.add_freeze_frame(self.time)
    }

    /// Swap in a new timeline for the same owner, keeping known targets.
    pub(crate) fn replace_timeline(&mut self, mut timeline: Timeline) {
        for target in self.timeline.targets() {
            timeline.add_target(target);
        }
        self.timeline = timeline;
    }

    pub fn add_target(&mut self, target: TargetId) -> bool {
        self.timeline.add_target(target)
    }

    /// Forget `target` and every key value bound to it.
    pub fn remove_target(&mut self, target: TargetId) -> usize {
        self.timeline.remove_target(target)
    }

    // ----- hierarchy (engine-managed) -----

    pub(crate) fn set_parent(&mut self, parent: Option<AnimatorId>) {
        self.parent = parent;
    }

    pub(crate) fn add_child(&mut self, child: AnimatorId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn remove_child(&mut self, child: AnimatorId) {
        self.children.retain(|c| *c != child);
    }

    pub(crate) fn set_timing(&mut self, timing: ChildTiming) {
        self.timing = timing.sanitized();
    }

    /// Nothing left to animate or observe.
    pub(crate) fn is_idle(&self) -> bool {
        self.timeline.is_empty() && self.listeners.len() == 0 && self.children.is_empty()
    }
}
