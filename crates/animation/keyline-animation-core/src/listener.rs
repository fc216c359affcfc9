//! Animator listeners: explicit subscriptions, notified synchronously in
//! subscription order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animator::Animator;
use crate::ids::{IdAllocator, ListenerId};

/// Discrete playback signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimatorEvent {
    Started,
    Stopped,
    Updated,
}

/// Observer of one animator. `on_updated` may fire at driver cadence, so
/// implementations should be cheap.
pub trait AnimatorListener {
    fn on_started(&mut self, _animator: &Animator) {}
    fn on_stopped(&mut self, _animator: &Animator) {}
    fn on_updated(&mut self, _animator: &Animator) {}
}

#[derive(Default)]
pub(crate) struct ListenerSet {
    ids: IdAllocator,
    entries: Vec<(ListenerId, Box<dyn AnimatorListener>)>,
}

impl ListenerSet {
    pub(crate) fn add(&mut self, listener: Box<dyn AnimatorListener>) -> ListenerId {
        let id = self.ids.alloc_listener();
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(lid, _)| *lid != id);
        before != self.entries.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn dispatch(&mut self, event: AnimatorEvent, animator: &Animator) {
        for (_, listener) in self.entries.iter_mut() {
            match event {
                AnimatorEvent::Started => listener.on_started(animator),
                AnimatorEvent::Stopped => listener.on_stopped(animator),
                AnimatorEvent::Updated => listener.on_updated(animator),
            }
        }
    }
}

impl fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.entries.len())
            .finish()
    }
}
