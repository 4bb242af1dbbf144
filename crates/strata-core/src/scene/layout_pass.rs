use std::collections::HashSet;

use crate::scene::Dirty;
use crate::{ActorId, Basis, Rect, Scene};

impl Scene {
    /// Queues `id` for the next layout pass. Queuing is idempotent.
    pub fn set_layout_dirty(&mut self, id: ActorId) {
        if let Some(actor) = self.actors.get_mut(id) {
            if !actor.dirty.contains(Dirty::LAYOUT) {
                actor.dirty.insert(Dirty::LAYOUT);
                self.dirty.push(id);
            }
        }
    }

    pub fn is_layout_dirty(&self, id: ActorId) -> bool {
        self.actors
            .get(id)
            .is_some_and(|a| a.dirty.contains(Dirty::LAYOUT))
    }

    /// Resolves every queued layout change, shallowest node first. Nodes
    /// re-dirtied by behaviors during a pass are picked up by the next pass,
    /// up to the configured cap. Returns the number of passes run.
    pub fn resolve_layouts(&mut self) -> u32 {
        let mut passes = 0;
        loop {
            let mut queue = std::mem::take(&mut self.dirty);
            queue.retain(|id| self.is_layout_dirty(*id));
            if queue.is_empty() {
                break;
            }
            if passes >= self.config.max_layout_passes {
                log::warn!(
                    "layout still dirty after {passes} passes; dropping {} node(s)",
                    queue.len()
                );
                for id in queue {
                    if let Some(a) = self.actors.get_mut(id) {
                        a.dirty = Dirty::empty();
                    }
                }
                break;
            }
            passes += 1;
            queue.sort_by_cached_key(|id| self.ancestors(*id).count());

            let mut touched = Vec::new();
            for id in queue {
                if self.is_layout_dirty(id) {
                    self.resolve_subtree(id, &mut touched);
                }
            }
            self.update_bounds_after(&touched);
        }
        self.stats.layout_passes += passes;
        passes
    }

    fn resolve_subtree(&mut self, id: ActorId, touched: &mut Vec<ActorId>) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        let flags = std::mem::take(&mut actor.dirty);
        let changed = self.resolve_node(id, flags);
        touched.push(id);

        if let Some(cb) = self
            .widget(id)
            .and_then(|w| w.events.on_layout_updated.clone())
        {
            cb();
        }
        self.with_behavior(id, |b, scene| b.on_layout_updated(scene, id));

        let kids: Vec<ActorId> = {
            let a = &self.actors[id];
            let internal = a.widget.as_ref().map(|w| w.internal_widgets.as_slice()).unwrap_or(&[]);
            a.children.iter().chain(internal).copied().collect()
        };
        for k in kids {
            if changed || self.is_layout_dirty(k) {
                self.resolve_subtree(k, touched);
            }
        }
    }

    /// Recomputes one node from its already resolved parent. Returns whether
    /// the frame its children depend on changed.
    fn resolve_node(&mut self, id: ActorId, flags: Dirty) -> bool {
        let (parent, internal) = {
            let a = &self.actors[id];
            (a.parent, a.internal)
        };
        let (parent_matrix, parent_rect) = match parent.and_then(|p| self.actors.get(p)) {
            Some(pa) => match &pa.widget {
                Some(pw) if internal => (pa.world_matrix, pw.world_rect),
                Some(pw) => (pa.world_matrix, pw.children_world_rect),
                None => (pa.world_matrix, pa.world_basis.aabb(Rect::new(0.0, 0.0, 1.0, 1.0))),
            },
            None => (Basis::IDENTITY, self.config.view_rect),
        };
        let threshold = self.config.top_layers_depth;

        let actor = &mut self.actors[id];
        match actor.widget.as_mut() {
            Some(w) => {
                if flags.contains(Dirty::LAYER_SEQUENCE) {
                    w.rebuild_layer_sequence(threshold);
                }
                let rect = w.layout.layout.calculate(parent_rect);
                let children_rect = w
                    .behavior
                    .as_ref()
                    .map(|b| b.children_rect(rect))
                    .unwrap_or(rect);
                let changed = rect != w.world_rect || children_rect != w.children_world_rect;
                w.world_rect = rect;
                w.children_world_rect = children_rect;
                w.update_layer_rects();

                let size = rect.size();
                let position = rect.min() + size.scale(actor.transform.pivot());
                if actor.transform.size() != size {
                    actor.transform.set_size(size);
                }
                if actor.transform.position() != position {
                    actor.transform.set_position(position);
                }
                actor.world_matrix = Basis::translation(rect.min());
                actor.world_basis = Basis::from_rect(rect);
                changed
            }
            None => {
                let matrix = parent_matrix.mul(&actor.transform.matrix());
                let basis = parent_matrix.mul(&actor.transform.basis());
                let changed = matrix != actor.world_matrix || basis != actor.world_basis;
                actor.world_matrix = matrix;
                actor.world_basis = basis;
                changed
            }
        }
    }

    fn update_bounds_after(&mut self, touched: &[ActorId]) {
        for id in touched.iter().rev() {
            self.update_bounds_with_children(*id);
        }
        let touched_set: HashSet<ActorId> = touched.iter().copied().collect();
        for id in touched {
            let Some(parent) = self.actors.get(*id).and_then(|a| a.parent) else {
                continue;
            };
            if touched_set.contains(&parent) {
                continue;
            }
            let mut cur = Some(parent);
            while let Some(p) = cur {
                if !self.update_bounds_with_children(p) {
                    break;
                }
                cur = self.actors.get(p).and_then(|a| a.parent);
            }
        }
    }

    /// Returns whether `bounds_with_children` changed.
    pub(crate) fn update_bounds_with_children(&mut self, id: ActorId) -> bool {
        let Some(w) = self.actors.get_mut(id).and_then(|a| a.widget.as_mut()) else {
            return false;
        };
        w.update_bounds();
        let mut bounds = w.bounds;
        let kids: Vec<ActorId> = w.child_widgets.iter().chain(&w.internal_widgets).copied().collect();
        for k in kids {
            let Some(ka) = self.actors.get(k) else {
                continue;
            };
            if let Some(kw) = ka.widget.as_ref().filter(|kw| ka.res_enabled && !kw.fully_disabled) {
                bounds.expand(&kw.bounds_with_children);
            }
        }
        let Some(w) = self.actors.get_mut(id).and_then(|a| a.widget.as_mut()) else {
            return false;
        };
        let changed = w.bounds_with_children != bounds;
        w.bounds_with_children = bounds;
        changed
    }
}
