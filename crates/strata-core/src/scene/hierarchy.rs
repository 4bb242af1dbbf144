use crate::{ActorId, Scene, SceneError, SceneResult};

impl Scene {
    /// Appends `child` to `parent`'s children, or inserts it at `index`.
    /// Fails without touching the tree when this would create a cycle.
    pub fn add_child(&mut self, parent: ActorId, child: ActorId, index: Option<usize>) -> SceneResult<()> {
        self.attach(child, Some(parent), index, false)
    }

    /// Like [`add_child`](Self::add_child), requiring both ends to be
    /// widgets.
    pub fn add_child_widget(&mut self, parent: ActorId, child: ActorId) -> SceneResult<()> {
        for id in [parent, child] {
            self.check(id)?;
            if !self.actors[id].is_widget() {
                return Err(SceneError::NotAWidget(id));
            }
        }
        self.attach(child, Some(parent), None, false)
    }

    /// Reparents `child`; `None` makes it a root.
    pub fn set_parent(&mut self, child: ActorId, parent: Option<ActorId>, index: Option<usize>) -> SceneResult<()> {
        self.attach(child, parent, index, false)
    }

    /// Detaches `child` from `parent`; it becomes a root and stays in the
    /// scene.
    pub fn remove_child(&mut self, parent: ActorId, child: ActorId) -> SceneResult<()> {
        self.check(parent)?;
        self.check(child)?;
        if self.actors[child].parent != Some(parent) {
            return Ok(());
        }
        self.attach(child, None, None, false)
    }

    /// Makes `widget` an internal widget of `host`: owned and drawn by the
    /// host but not listed among its children.
    pub fn add_internal_widget(&mut self, host: ActorId, widget: ActorId) -> SceneResult<()> {
        for id in [host, widget] {
            self.check(id)?;
            if !self.actors[id].is_widget() {
                return Err(SceneError::NotAWidget(id));
            }
        }
        self.attach(widget, Some(host), None, true)
    }

    /// Alias kept for symmetry with `set_parent`.
    pub fn set_internal_parent(&mut self, widget: ActorId, host: ActorId) -> SceneResult<()> {
        self.add_internal_widget(host, widget)
    }

    pub fn set_index_in_siblings(&mut self, id: ActorId, index: usize) -> SceneResult<()> {
        self.check(id)?;
        let (parent, internal) = {
            let a = &self.actors[id];
            (a.parent, a.internal)
        };
        let list = match parent {
            Some(p) if internal => match self.actors[p].widget.as_mut() {
                Some(w) => &mut w.internal_widgets,
                None => return Ok(()),
            },
            Some(p) => &mut self.actors[p].children,
            None => &mut self.roots,
        };
        if let Some(pos) = list.iter().position(|c| *c == id) {
            list.remove(pos);
            let index = index.min(list.len());
            list.insert(index, id);
        }
        if let Some(p) = parent {
            self.rebuild_child_widgets(p);
            self.set_layout_dirty(p);
        }
        Ok(())
    }

    fn attach(&mut self, child: ActorId, parent: Option<ActorId>, index: Option<usize>, internal: bool) -> SceneResult<()> {
        self.check(child)?;
        if let Some(p) = parent {
            self.check(p)?;
            if p == child {
                return Err(SceneError::SelfParent(child));
            }
            if self.is_ancestor_of(child, p) {
                return Err(SceneError::CycleDetected { child, parent: p });
            }
            if internal && !self.actors[p].is_widget() {
                return Err(SceneError::NotAWidget(p));
            }
        }

        let old_parent = self.detach(child);
        match parent {
            Some(p) => {
                let list = if internal {
                    match self.actors[p].widget.as_mut() {
                        Some(w) => &mut w.internal_widgets,
                        None => return Err(SceneError::NotAWidget(p)),
                    }
                } else {
                    &mut self.actors[p].children
                };
                let at = index.unwrap_or(list.len()).min(list.len());
                list.insert(at, child);
            }
            None => {
                let at = index.unwrap_or(self.roots.len()).min(self.roots.len());
                self.roots.insert(at, child);
            }
        }
        {
            let a = &mut self.actors[child];
            a.parent = parent;
            a.internal = internal && parent.is_some();
        }
        log::debug!("attached {child:?} to {parent:?} (internal: {internal})");

        if let Some(p) = parent {
            let on_scene = self.actors[p].on_scene;
            if on_scene != self.actors[child].on_scene {
                self.set_on_scene(child, on_scene);
            }
        }
        if let Some(old) = old_parent.filter(|o| Some(*o) != parent) {
            self.after_child_removed(old, child);
        }
        if let Some(p) = parent {
            self.rebuild_child_widgets(p);
        }
        self.update_res_enabled(child);
        self.sync_drawables(child);
        if self.actors[child].is_widget() {
            self.update_visibility(child);
            self.update_transparency(child);
        }
        self.set_layout_dirty(child);
        if let Some(p) = parent.filter(|_| !internal) {
            self.with_behavior(p, |b, scene| b.on_child_added(scene, p, child));
        }
        Ok(())
    }

    /// Unlinks `id` from its parent (or the root list). Returns the old
    /// parent.
    pub(crate) fn detach(&mut self, id: ActorId) -> Option<ActorId> {
        let (parent, internal) = {
            let a = self.actors.get_mut(id)?;
            let out = (a.parent.take(), a.internal);
            a.internal = false;
            out
        };
        match parent {
            Some(p) => {
                if let Some(pa) = self.actors.get_mut(p) {
                    if internal {
                        if let Some(w) = pa.widget.as_mut() {
                            w.internal_widgets.retain(|c| *c != id);
                        }
                    } else {
                        pa.children.retain(|c| *c != id);
                    }
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        parent
    }

    pub(crate) fn after_child_removed(&mut self, parent: ActorId, child: ActorId) {
        if !self.contains(parent) {
            return;
        }
        self.rebuild_child_widgets(parent);
        self.set_layout_dirty(parent);
        self.with_behavior(parent, |b, scene| b.on_child_removed(scene, parent, child));
    }

    /// Recomputes `child_widgets` and `drawing_children` from the child list.
    pub(crate) fn rebuild_child_widgets(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get(id) else {
            return;
        };
        if actor.widget.is_none() {
            return;
        }
        let mut widgets = Vec::new();
        let mut drawing = Vec::new();
        for c in &actor.children {
            if let Some(w) = self.actors.get(*c).and_then(|a| a.widget.as_ref()) {
                widgets.push(*c);
                if !w.override_depth {
                    drawing.push(*c);
                }
            }
        }
        if let Some(w) = self.actors.get_mut(id).and_then(|a| a.widget.as_mut()) {
            w.child_widgets = widgets;
            w.drawing_children = drawing;
        }
    }

    /// Recomputes resolved-enabled for `id` and, on change, its subtree.
    /// Drawables enter or leave their layer's enabled list on transitions
    /// only.
    pub(crate) fn update_res_enabled(&mut self, id: ActorId) {
        let parent_res = self
            .actors
            .get(id)
            .and_then(|a| a.parent)
            .and_then(|p| self.actors.get(p))
            .map(|p| p.res_enabled)
            .unwrap_or(true);
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        let res = actor.enabled && parent_res;
        let changed = res != actor.res_enabled;
        actor.res_enabled = res;
        for slot in &mut actor.components {
            slot.res_enabled = slot.enabled && res;
        }
        if !changed {
            return;
        }
        self.sync_drawables(id);
        if self.actors[id].is_widget() {
            self.set_layout_dirty(id);
        }
        let kids: Vec<ActorId> = {
            let a = &self.actors[id];
            let internal = a.widget.as_ref().map(|w| w.internal_widgets.as_slice()).unwrap_or(&[]);
            a.children.iter().chain(internal).copied().collect()
        };
        for k in kids {
            self.update_res_enabled(k);
        }
    }
}
