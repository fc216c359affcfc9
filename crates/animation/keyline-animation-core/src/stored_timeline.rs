//! Persistence: timelines as ordered key frame records, and a JSON form.
//!
//! A stored timeline looks like:
//!
//! ```json
//! {
//!   "owner": 1,
//!   "targets": [2, 3],
//!   "frames": [
//!     { "time": 0,    "values": [{ "target": 2, "key": "x", "value": 0 }] },
//!     { "time": 1000, "values": [{ "target": 2, "key": "x", "value": 100, "interpolator": "EaseIn" }] }
//!   ]
//! }
//! ```
//!
//! Values accept the shorthands of `keyline_api_core::json`. Loading fails
//! closed: a malformed timeline is rejected rather than repaired.

use std::collections::BTreeSet;

use keyline_api_core::json::parse_value;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::ids::{Millis, TargetId};
use crate::interp::{self, LINEAR};
use crate::keyframe::{KeyFrame, KeyValue};
use crate::timeline::Timeline;
use crate::{Result, Value};

fn linear_name() -> String {
    LINEAR.to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyValueRecord {
    pub target: TargetId,
    pub key: String,
    pub value: Value,
    #[serde(default = "linear_name")]
    pub interpolator: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyFrameRecord {
    pub time: Millis,
    pub values: Vec<KeyValueRecord>,
}

impl Timeline {
    /// Ordered records, one per key frame (frame 0 included even when empty).
    pub fn to_records(&self) -> Vec<KeyFrameRecord> {
        self.frames()
            .iter()
            .map(|frame| KeyFrameRecord {
                time: frame.time(),
                values: frame
                    .iter()
                    .map(|kv| KeyValueRecord {
                        target: kv.target,
                        key: kv.key.clone(),
                        value: kv.value.clone(),
                        interpolator: kv.interpolator.stored_name().to_string(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Rebuild a timeline from records. Every target referenced by a record
    /// becomes a known target. Rejects non-increasing times, duplicate
    /// channels within a frame, a missing frame 0 and empty frames.
    pub fn from_records(owner: TargetId, records: Vec<KeyFrameRecord>) -> Result<Self> {
        match records.first() {
            Some(first) if first.time == 0 => {}
            _ => return Err(TimelineError::MissingBaseFrame),
        }
        let mut targets = BTreeSet::new();
        let mut frames: Vec<KeyFrame> = Vec::with_capacity(records.len());
        for record in records {
            if let Some(previous) = frames.last().map(|f| f.time()) {
                if record.time <= previous {
                    return Err(TimelineError::NonIncreasingTimes {
                        previous,
                        time: record.time,
                    });
                }
            }
            if record.time != 0 && record.values.is_empty() {
                return Err(TimelineError::EmptyKeyFrame { time: record.time });
            }
            let mut frame = KeyFrame::new(record.time);
            for kv in record.values {
                targets.insert(kv.target);
                let replaced = frame.insert(KeyValue {
                    target: kv.target,
                    key: kv.key.clone(),
                    value: kv.value,
                    interpolator: interp::get(&kv.interpolator),
                });
                if replaced.is_some() {
                    return Err(TimelineError::DuplicateKeyValue {
                        time: record.time,
                        target: kv.target,
                        key: kv.key,
                    });
                }
            }
            frames.push(frame);
        }
        Ok(Timeline::from_parts(owner, targets, frames))
    }
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct StoredTimeline {
    owner: TargetId,
    #[serde(default)]
    targets: Vec<TargetId>,
    frames: Vec<StoredFrame>,
}

#[derive(Debug, Deserialize)]
struct StoredFrame {
    time: Millis,
    #[serde(default)]
    values: Vec<StoredKeyValue>,
}

#[derive(Debug, Deserialize)]
struct StoredKeyValue {
    target: TargetId,
    key: String,
    value: serde_json::Value,
    #[serde(default = "linear_name")]
    interpolator: String,
}

#[derive(Serialize)]
struct StoredTimelineOut<'a> {
    owner: TargetId,
    targets: Vec<TargetId>,
    frames: &'a [KeyFrameRecord],
}

/// Parse a stored timeline JSON document.
pub fn parse_stored_timeline_json(s: &str) -> Result<Timeline> {
    let stored: StoredTimeline = serde_json::from_str(s)?;
    let mut records = Vec::with_capacity(stored.frames.len());
    for frame in stored.frames {
        let mut values = Vec::with_capacity(frame.values.len());
        for kv in frame.values {
            let value = parse_value(kv.value).map_err(|e| TimelineError::InvalidValue {
                time: frame.time,
                key: kv.key.clone(),
                reason: e.to_string(),
            })?;
            values.push(KeyValueRecord {
                target: kv.target,
                key: kv.key,
                value,
                interpolator: kv.interpolator,
            });
        }
        records.push(KeyFrameRecord {
            time: frame.time,
            values,
        });
    }
    let mut timeline = Timeline::from_records(stored.owner, records)?;
    for target in stored.targets {
        timeline.add_target(target);
    }
    Ok(timeline)
}

/// Serialize a timeline into the stored JSON form (canonical value encoding).
pub fn to_stored_json(timeline: &Timeline) -> Result<String> {
    let records = timeline.to_records();
    let out = StoredTimelineOut {
        owner: timeline.owner(),
        targets: timeline.targets().collect(),
        frames: &records,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}
