//! Keyline Animation Core (host-agnostic)
//!
//! Keyframe timelines for a hierarchical shape document. An [`Animator`]
//! owns playback state for one shape subtree and drives a [`Timeline`] of
//! [`KeyFrame`]s; named [`Interpolator`]s shape the curve between frames.
//! The host supplies a [`PropertyBinding`] to receive evaluated values.

pub mod animator;
pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod interp;
pub mod keyframe;
pub mod listener;
pub mod stored_timeline;
pub mod timeline;

// Re-exports for hosts
pub use animator::{Animator, ChildTiming, PlaybackState};
pub use binding::{apply_state, PropertyBinding, PropertyMap};
pub use config::{AnimatorConfig, Config, MIN_FRAME_RATE, MIN_MAX_TIME_MS};
pub use engine::Engine;
pub use error::TimelineError;
pub use ids::{AnimatorId, IdAllocator, ListenerId, Millis, TargetId};
pub use interp::{InterpRegistry, Interpolator};
pub use keyframe::{ChannelKey, KeyFrame, KeyValue};
pub use keyline_api_core::{Value, ValueKind};
pub use listener::{AnimatorEvent, AnimatorListener};
pub use stored_timeline::{
    parse_stored_timeline_json, to_stored_json, KeyFrameRecord, KeyValueRecord,
};
pub use timeline::{FrameRemoval, Timeline, TimelineState};

pub type Result<T> = core::result::Result<T, TimelineError>;
