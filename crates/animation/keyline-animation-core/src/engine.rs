//! Engine: arena of animators plus a mirror of the host shape hierarchy.
//!
//! Methods:
//! - shape_added / shape_removed keep the hierarchy mirror and the
//!   animators' known targets in sync with the host document
//! - animator_for lazily creates the animator owned by a shape
//! - set_time / advance / play / stop drive an animator and every nested
//!   child animator below it (parent first)

use hashbrown::{HashMap, HashSet};

use crate::animator::{Animator, ChildTiming};
use crate::binding::PropertyBinding;
use crate::config::Config;
use crate::error::TimelineError;
use crate::ids::{AnimatorId, IdAllocator, ListenerId, Millis, TargetId};
use crate::listener::{AnimatorEvent, AnimatorListener};
use crate::timeline::Timeline;
use crate::Result;

#[derive(Debug, Default)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    animators: HashMap<AnimatorId, Animator>,
    by_owner: HashMap<TargetId, AnimatorId>,
    /// child shape -> parent shape
    parents: HashMap<TargetId, TargetId>,
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ..Self::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // ----- lookup -----

    pub fn animator(&self, id: AnimatorId) -> Result<&Animator> {
        self.animators
            .get(&id)
            .ok_or(TimelineError::AnimatorNotFound { id })
    }

    pub fn animator_mut(&mut self, id: AnimatorId) -> Result<&mut Animator> {
        self.animators
            .get_mut(&id)
            .ok_or(TimelineError::AnimatorNotFound { id })
    }

    /// Animator owned by `owner`, if one exists.
    pub fn animator_of(&self, owner: TargetId) -> Option<AnimatorId> {
        self.by_owner.get(&owner).copied()
    }

    pub fn animators(&self) -> impl Iterator<Item = &Animator> {
        self.animators.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.animators.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }

    pub fn parent_of(&self, shape: TargetId) -> Option<TargetId> {
        self.parents.get(&shape).copied()
    }

    // ----- hierarchy -----

    /// Shapes from `shape` up to the root, `shape` first. Stops on cycles.
    fn lineage(&self, shape: TargetId) -> Vec<TargetId> {
        let mut chain = vec![shape];
        let mut cursor = shape;
        while let Some(parent) = self.parent_of(cursor) {
            if chain.contains(&parent) {
                log::warn!("shape hierarchy cycle at {parent}");
                break;
            }
            chain.push(parent);
            cursor = parent;
        }
        chain
    }

    fn is_descendant_or_self(&self, shape: TargetId, ancestor: TargetId) -> bool {
        self.lineage(shape).contains(&ancestor)
    }

    /// Nearest animator owned by `shape` or one of its ancestors.
    fn animator_at_or_above(&self, shape: TargetId) -> Option<AnimatorId> {
        self.lineage(shape)
            .into_iter()
            .find_map(|s| self.animator_of(s))
    }

    /// Nearest animator owned strictly above `shape`.
    fn animator_above(&self, shape: TargetId) -> Option<AnimatorId> {
        self.parent_of(shape)
            .and_then(|parent| self.animator_at_or_above(parent))
    }

    /// Register a new shape. A shape born inside an animated subtree becomes
    /// a known target of the nearest ancestor animator, which is returned.
    pub fn shape_added(&mut self, shape: TargetId, parent: Option<TargetId>) -> Option<AnimatorId> {
        match parent {
            Some(parent) => {
                self.parents.insert(shape, parent);
            }
            None => {
                self.parents.remove(&shape);
            }
        }
        let owner = self.animator_above(shape)?;
        if let Some(animator) = self.animators.get_mut(&owner) {
            if animator.add_target(shape) {
                log::debug!("{owner}: adopted newborn {shape}");
            }
        }
        Some(owner)
    }

    /// Unregister `shape` and its whole subtree. Animators owned inside the
    /// subtree are destroyed (returned); the rest forget the removed targets.
    pub fn shape_removed(&mut self, shape: TargetId) -> Vec<AnimatorId> {
        let mut doomed: HashSet<TargetId> = self
            .parents
            .keys()
            .copied()
            .filter(|s| self.is_descendant_or_self(*s, shape))
            .collect();
        doomed.insert(shape);

        let mut destroyed = Vec::new();
        for owner in &doomed {
            if let Some(id) = self.animator_of(*owner) {
                destroyed.extend(self.destroy(id));
            }
        }
        for animator in self.animators.values_mut() {
            for target in &doomed {
                if animator.timeline().has_target(*target) {
                    animator.remove_target(*target);
                }
            }
        }
        self.parents.retain(|child, _| !doomed.contains(child));
        log::debug!(
            "removed {shape}: {} shapes, {} animators",
            doomed.len(),
            destroyed.len()
        );
        if self.cfg.prune_idle_on_remove {
            destroyed.extend(self.prune_idle());
        }
        destroyed
    }

    // ----- animators -----

    /// Animator owned by `owner`, created on first use.
    pub fn animator_for(&mut self, owner: TargetId) -> AnimatorId {
        if let Some(id) = self.animator_of(owner) {
            return id;
        }
        let id = self.ids.alloc_animator();
        let animator = Animator::new(id, owner, &self.cfg.animator);
        self.install(animator);
        id
    }

    /// Install a deserialized timeline as the animator of its owner. An
    /// existing animator keeps its id, children and known targets.
    pub fn load_timeline(&mut self, timeline: Timeline) -> AnimatorId {
        if let Some(existing) = self.animator_of(timeline.owner()) {
            if let Some(animator) = self.animators.get_mut(&existing) {
                animator.replace_timeline(timeline);
                return existing;
            }
        }
        let id = self.ids.alloc_animator();
        let animator = Animator::with_timeline(id, timeline, &self.cfg.animator);
        self.install(animator);
        id
    }

    fn install(&mut self, mut animator: Animator) {
        let id = animator.id();
        let owner = animator.owner();
        let parent = self.animator_above(owner);
        animator.set_parent(parent);
        self.by_owner.insert(owner, id);

        let descendants: Vec<TargetId> = self
            .parents
            .keys()
            .copied()
            .filter(|s| *s != owner && self.is_descendant_or_self(*s, owner))
            .collect();
        for shape in descendants {
            animator.add_target(shape);
        }

        // Existing animators inside the new subtree now nest under it.
        let adopted: Vec<AnimatorId> = self
            .animators
            .values()
            .filter(|a| a.parent() == parent && self.is_descendant_or_self(a.owner(), owner))
            .map(|a| a.id())
            .collect();
        for child in &adopted {
            if let Some(old) = parent.and_then(|p| self.animators.get_mut(&p)) {
                old.remove_child(*child);
            }
            if let Some(c) = self.animators.get_mut(child) {
                c.set_parent(Some(id));
            }
            animator.add_child(*child);
        }
        if let Some(p) = parent.and_then(|p| self.animators.get_mut(&p)) {
            p.add_child(id);
        }
        log::debug!("created {id} for {owner} (parent {parent:?})");
        self.animators.insert(id, animator);
    }

    /// Destroy `id` and every animator nested below it.
    pub fn remove_animator(&mut self, id: AnimatorId) -> Result<Vec<AnimatorId>> {
        self.animator(id)?;
        Ok(self.destroy(id))
    }

    fn destroy(&mut self, id: AnimatorId) -> Vec<AnimatorId> {
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(animator) = self.animators.remove(&next) else {
                continue;
            };
            self.by_owner.remove(&animator.owner());
            if let Some(parent) = animator.parent().and_then(|p| self.animators.get_mut(&p)) {
                parent.remove_child(next);
            }
            stack.extend_from_slice(animator.children());
            removed.push(next);
        }
        removed
    }

    /// Drop animators with no key values, listeners or children.
    pub fn prune_idle(&mut self) -> Vec<AnimatorId> {
        let mut pruned = Vec::new();
        loop {
            let idle: Vec<AnimatorId> = self
                .animators
                .values()
                .filter(|a| a.is_idle())
                .map(|a| a.id())
                .collect();
            if idle.is_empty() {
                break;
            }
            for id in idle {
                pruned.extend(self.destroy(id));
            }
        }
        if !pruned.is_empty() {
            log::debug!("pruned {} idle animators", pruned.len());
        }
        pruned
    }

    pub fn set_child_timing(&mut self, id: AnimatorId, timing: ChildTiming) -> Result<()> {
        self.animator_mut(id)?.set_timing(timing);
        Ok(())
    }

    pub fn add_listener(
        &mut self,
        id: AnimatorId,
        listener: Box<dyn AnimatorListener>,
    ) -> Result<ListenerId> {
        Ok(self.animator_mut(id)?.add_listener(listener))
    }

    pub fn remove_listener(&mut self, id: AnimatorId, listener: ListenerId) -> Result<bool> {
        Ok(self.animator_mut(id)?.remove_listener(listener))
    }

    // ----- playback -----

    /// Apply `root` and every nested child, parent first. Children derive
    /// their local time from their parent's.
    fn evaluate_tree(&mut self, root: AnimatorId, binding: &mut dyn PropertyBinding) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(animator) = self.animators.get_mut(&id) else {
                continue;
            };
            animator.apply(binding);
            animator.notify(AnimatorEvent::Updated);
            let parent_time = animator.time();
            let children = animator.children().to_vec();
            for child in children.iter().rev() {
                if let Some(c) = self.animators.get_mut(child) {
                    c.follow_parent(parent_time);
                    stack.push(*child);
                }
            }
        }
    }

    pub fn set_time(
        &mut self,
        id: AnimatorId,
        time: Millis,
        binding: &mut dyn PropertyBinding,
    ) -> Result<()> {
        self.animator_mut(id)?.seek(time);
        self.evaluate_tree(id, binding);
        Ok(())
    }

    /// Driver tick for `id`. Returns whether it is still playing.
    pub fn advance(
        &mut self,
        id: AnimatorId,
        delta: Millis,
        binding: &mut dyn PropertyBinding,
    ) -> Result<bool> {
        let Some(step) = self.animator_mut(id)?.step_time(delta) else {
            return Ok(false);
        };
        self.evaluate_tree(id, binding);
        let animator = self.animator_mut(id)?;
        if step.ended {
            animator.notify(AnimatorEvent::Stopped);
        }
        Ok(animator.is_running())
    }

    /// Tick every playing root animator.
    pub fn advance_all(&mut self, delta: Millis, binding: &mut dyn PropertyBinding) {
        let mut roots: Vec<AnimatorId> = self
            .animators
            .values()
            .filter(|a| a.parent().is_none() && a.is_running())
            .map(|a| a.id())
            .collect();
        roots.sort();
        for id in roots {
            if let Err(err) = self.advance(id, delta, binding) {
                log::warn!("advance {id} failed ({}): {err}", err.category());
            }
        }
    }

    pub fn play(&mut self, id: AnimatorId, binding: &mut dyn PropertyBinding) -> Result<bool> {
        let animator = self.animator_mut(id)?;
        let Some(reset) = animator.begin_play() else {
            return Ok(false);
        };
        animator.notify(AnimatorEvent::Started);
        if reset {
            self.evaluate_tree(id, binding);
        }
        Ok(true)
    }

    pub fn stop(&mut self, id: AnimatorId, binding: &mut dyn PropertyBinding) -> Result<bool> {
        let animator = self.animator_mut(id)?;
        let Some(reset) = animator.end_play() else {
            return Ok(false);
        };
        animator.notify(AnimatorEvent::Stopped);
        if reset {
            self.evaluate_tree(id, binding);
        }
        Ok(true)
    }
}
