use crate::scene::Dirty;
use crate::widget::{FOCUSED_STATE, VISIBLE_STATE};
use crate::{
    ActorId, AnimatedProperty, DrawableKey, Layout, RectDrawable, Scene, SceneError, SceneResult, Vec2,
    WidgetBehavior, WidgetEvents, WidgetLayer, WidgetLayout, WidgetState,
};

impl Scene {
    /// Runs `f` with the widget's behavior detached, so the behavior can
    /// mutate the scene. `None` when `id` has no behavior.
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut dyn WidgetBehavior, &mut Scene) -> R,
    ) -> Option<R> {
        let mut behavior = self.actors.get_mut(id)?.widget.as_mut()?.behavior.take()?;
        let out = f(behavior.as_mut(), self);
        if let Some(w) = self.actors.get_mut(id).and_then(|a| a.widget.as_mut()) {
            if w.behavior.is_none() {
                w.behavior = Some(behavior);
            }
        }
        Some(out)
    }

    pub fn set_behavior(&mut self, id: ActorId, behavior: Box<dyn WidgetBehavior>) -> SceneResult<()> {
        self.widget_mut(id)?.behavior = Some(behavior);
        self.with_behavior(id, |b, scene| b.on_attached(scene, id));
        self.set_layout_dirty(id);
        Ok(())
    }

    pub fn take_behavior(&mut self, id: ActorId) -> Option<Box<dyn WidgetBehavior>> {
        let out = self.actors.get_mut(id)?.widget.as_mut()?.behavior.take();
        self.set_layout_dirty(id);
        out
    }

    /// Mutates the widget's behavior as `T` and re-lays the widget out.
    pub fn edit_behavior<T: WidgetBehavior, R>(&mut self, id: ActorId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let behavior = self.actors.get_mut(id)?.widget.as_mut()?.behavior.as_mut()?;
        let out = f(behavior.as_any_mut().downcast_mut::<T>()?);
        self.set_layout_dirty(id);
        Some(out)
    }

    pub fn widget_events_mut(&mut self, id: ActorId) -> Option<&mut WidgetEvents> {
        Some(&mut self.actors.get_mut(id)?.widget.as_mut()?.events)
    }

    // Layout

    pub fn edit_layout(&mut self, id: ActorId, f: impl FnOnce(&mut WidgetLayout)) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        let before = w.layout;
        f(&mut w.layout);
        let after = w.layout;
        if before == after {
            return Ok(());
        }
        self.set_layout_dirty(id);
        let hints_changed = before.min_size != after.min_size
            || before.max_size != after.max_size
            || before.weight != after.weight;
        if hints_changed {
            if let Some(p) = self.parent_widget(id) {
                self.set_layout_dirty(p);
            }
        }
        Ok(())
    }

    pub fn set_widget_layout(&mut self, id: ActorId, layout: impl Into<WidgetLayout>) -> SceneResult<()> {
        let layout = layout.into();
        self.edit_layout(id, |l| *l = layout)
    }

    pub fn set_anchors(&mut self, id: ActorId, min: Vec2, max: Vec2) -> SceneResult<()> {
        self.edit_layout(id, |l| {
            l.layout.anchor_min = min;
            l.layout.anchor_max = max;
        })
    }

    pub fn set_offsets(&mut self, id: ActorId, min: Vec2, max: Vec2) -> SceneResult<()> {
        self.edit_layout(id, |l| {
            l.layout.offset_min = min;
            l.layout.offset_max = max;
        })
    }

    pub fn set_layout(&mut self, id: ActorId, layout: Layout) -> SceneResult<()> {
        self.edit_layout(id, |l| l.layout = layout)
    }

    pub fn set_min_size(&mut self, id: ActorId, size: Vec2) -> SceneResult<()> {
        self.edit_layout(id, |l| l.min_size = size)
    }

    pub fn set_max_size(&mut self, id: ActorId, size: Vec2) -> SceneResult<()> {
        self.edit_layout(id, |l| l.max_size = size)
    }

    pub fn set_weight(&mut self, id: ActorId, weight: Vec2) -> SceneResult<()> {
        self.edit_layout(id, |l| l.weight = weight)
    }

    // Layers

    fn layers_changed(&mut self, id: ActorId) {
        if let Some(a) = self.actors.get_mut(id) {
            a.dirty.insert(Dirty::LAYER_SEQUENCE);
            if let Some(w) = a.widget.as_mut() {
                for l in &mut w.layers {
                    l.set_owner(Some(id));
                }
            }
        }
        self.set_layout_dirty(id);
    }

    /// Live owner of the layer at `path`.
    pub fn layer_owner(&self, id: ActorId, path: &str) -> Option<ActorId> {
        self.widget(id)?
            .layer(path)?
            .owner()
            .filter(|o| self.contains(*o))
    }

    pub fn add_layer(&mut self, id: ActorId, layer: WidgetLayer) -> SceneResult<()> {
        self.widget_mut(id)?.layers.push(layer);
        self.layers_changed(id);
        Ok(())
    }

    /// Adds a top-level layer holding `drawable`. A `depth` of zero places
    /// it after every existing drawing layer.
    pub fn add_layer_with(
        &mut self,
        id: ActorId,
        name: &str,
        drawable: impl RectDrawable,
        layout: Layout,
        depth: f32,
    ) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        let depth = if depth == 0.0 {
            fn count(layers: &[WidgetLayer]) -> usize {
                layers
                    .iter()
                    .map(|l| usize::from(l.drawable.is_some()) + count(l.children()))
                    .sum()
            }
            count(&w.layers) as f32
        } else {
            depth
        };
        let layer = WidgetLayer::new(name)
            .with_drawable(drawable)
            .with_layout(layout)
            .with_depth(depth);
        self.add_layer(id, layer)
    }

    /// Adds `layer` under the layer at `parent_path`.
    pub fn add_child_layer(&mut self, id: ActorId, parent_path: &str, layer: WidgetLayer) -> SceneResult<()> {
        let parent = self
            .widget_mut(id)?
            .layer_mut(parent_path)
            .ok_or_else(|| SceneError::MissingLayer {
                path: parent_path.to_string(),
            })?;
        parent.add_child(layer);
        self.layers_changed(id);
        Ok(())
    }

    pub fn remove_layer(&mut self, id: ActorId, path: &str) -> SceneResult<Option<WidgetLayer>> {
        let w = self.widget_mut(id)?;
        let removed = match path.trim_matches('/').rsplit_once('/') {
            Some((parent, name)) => w.layer_mut(parent).and_then(|p| p.remove_child(name)),
            None => {
                let name = path.trim_matches('/');
                w.layers
                    .iter()
                    .position(|l| l.name == name)
                    .map(|i| w.layers.remove(i))
            }
        };
        let removed = removed.map(|mut l| {
            l.set_owner(None);
            l
        });
        if removed.is_some() {
            self.layers_changed(id);
        }
        Ok(removed)
    }

    pub fn remove_all_layers(&mut self, id: ActorId) -> SceneResult<()> {
        self.widget_mut(id)?.layers.clear();
        self.layers_changed(id);
        Ok(())
    }

    /// Mutates the layer at `path`; sequences and rects are refreshed on the
    /// next layout pass.
    pub fn edit_layer<R>(&mut self, id: ActorId, path: &str, f: impl FnOnce(&mut WidgetLayer) -> R) -> SceneResult<R> {
        let layer = self
            .widget_mut(id)?
            .layer_mut(path)
            .ok_or_else(|| SceneError::MissingLayer { path: path.to_string() })?;
        let out = f(layer);
        self.layers_changed(id);
        Ok(out)
    }

    // States

    /// Adds or replaces a state. The `visible` and `focused` states are
    /// snapped to the widget's current flags.
    pub fn add_state(&mut self, id: ActorId, mut state: WidgetState) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        state.bind(id);
        if state.name == VISIBLE_STATE {
            state.set_state_forcible(w.visible);
            w.fully_disabled = !w.res_visible;
        } else if state.name == FOCUSED_STATE {
            state.set_state_forcible(w.focused);
        }
        let name = state.name.clone();
        match w.states.iter().position(|s| s.name == name) {
            Some(i) => w.states[i] = state,
            None => w.states.push(state),
        }
        self.apply_state_pose(id, &name);
        Ok(())
    }

    pub fn remove_state(&mut self, id: ActorId, name: &str) -> Option<WidgetState> {
        let w = self.actors.get_mut(id)?.widget.as_mut()?;
        let idx = w.states.iter().position(|s| s.name == name)?;
        let removed = w.states.remove(idx);
        if name == VISIBLE_STATE {
            w.fully_disabled = !w.res_visible;
        }
        Some(removed)
    }

    pub fn remove_all_states(&mut self, id: ActorId) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        w.states.clear();
        w.fully_disabled = !w.res_visible;
        Ok(())
    }

    pub fn state(&self, id: ActorId, name: &str) -> Option<bool> {
        Some(self.widget(id)?.state(name)?.state())
    }

    pub fn set_state(&mut self, id: ActorId, name: &str, value: bool) -> SceneResult<()> {
        self.widget_mut(id)?
            .state_mut(name)
            .ok_or_else(|| SceneError::MissingState { name: name.to_string() })?
            .set_state(value);
        Ok(())
    }

    pub fn set_state_forcible(&mut self, id: ActorId, name: &str, value: bool) -> SceneResult<()> {
        self.widget_mut(id)?
            .state_mut(name)
            .ok_or_else(|| SceneError::MissingState { name: name.to_string() })?
            .set_state_forcible(value);
        self.apply_state_pose(id, name);
        Ok(())
    }

    /// Edits a state in place, e.g. to install callbacks.
    pub fn edit_state<R>(&mut self, id: ActorId, name: &str, f: impl FnOnce(&mut WidgetState) -> R) -> SceneResult<R> {
        let state = self
            .widget_mut(id)?
            .state_mut(name)
            .ok_or_else(|| SceneError::MissingState { name: name.to_string() })?;
        Ok(f(state))
    }

    fn apply_state_pose(&mut self, id: ActorId, name: &str) {
        let samples: Vec<(AnimatedProperty, f32)> = match self.widget(id).and_then(|w| w.state(name)) {
            Some(s) => s.animation.sample().map(|(p, v)| (p.clone(), v)).collect(),
            None => return,
        };
        self.apply_animation(id, samples);
    }

    /// Writes sampled track values into the widget's properties.
    pub(crate) fn apply_animation(&mut self, id: ActorId, samples: Vec<(AnimatedProperty, f32)>) {
        for (property, value) in samples {
            match property {
                AnimatedProperty::Transparency => {
                    let _ = self.set_transparency(id, value);
                }
                AnimatedProperty::LayerTransparency(path) => {
                    if let Some(l) = self
                        .actors
                        .get_mut(id)
                        .and_then(|a| a.widget.as_mut())
                        .and_then(|w| w.layer_mut(&path))
                    {
                        l.transparency = value;
                    }
                }
                AnimatedProperty::ChildTransparency(path) => match self.child_widget(id, &path) {
                    Some(child) => {
                        let _ = self.set_transparency(child, value);
                    }
                    None => log::warn!("animated child `{path}` not found"),
                },
            }
        }
    }

    // Appearance

    pub fn set_transparency(&mut self, id: ActorId, transparency: f32) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        if w.transparency == transparency {
            return Ok(());
        }
        w.transparency = transparency;
        self.update_transparency(id);
        Ok(())
    }

    pub(crate) fn update_transparency(&mut self, id: ActorId) {
        let parent_res = self
            .parent_widget(id)
            .and_then(|p| self.widget(p))
            .map(|p| p.res_transparency)
            .unwrap_or(1.0);
        let Some(w) = self.actors.get_mut(id).and_then(|a| a.widget.as_mut()) else {
            return;
        };
        w.res_transparency = w.transparency * parent_res;
        let kids: Vec<ActorId> = w.child_widgets.iter().chain(&w.internal_widgets).copied().collect();
        for k in kids {
            self.update_transparency(k);
        }
    }

    pub fn show(&mut self, id: ActorId, forcible: bool) -> SceneResult<()> {
        if forcible {
            self.set_visible_forcible(id, true)
        } else {
            self.set_visible(id, true)
        }
    }

    pub fn hide(&mut self, id: ActorId, forcible: bool) -> SceneResult<()> {
        if forcible {
            self.set_visible_forcible(id, false)
        } else {
            self.set_visible(id, false)
        }
    }

    pub fn set_visible(&mut self, id: ActorId, visible: bool) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        if w.visible == visible {
            return Ok(());
        }
        w.visible = visible;
        self.update_visibility_with(id, false);
        self.visibility_changed(id);
        Ok(())
    }

    /// Sets visibility and snaps the visible state with no animation.
    pub fn set_visible_forcible(&mut self, id: ActorId, visible: bool) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        let changed = w.visible != visible;
        w.visible = visible;
        self.update_visibility_with(id, true);
        if changed {
            self.visibility_changed(id);
        }
        Ok(())
    }

    /// Containers arrange only visible children.
    fn visibility_changed(&mut self, id: ActorId) {
        if let Some(p) = self.parent_widget(id) {
            self.set_layout_dirty(p);
        }
    }

    pub(crate) fn update_visibility(&mut self, id: ActorId) {
        self.update_visibility_with(id, false);
    }

    fn update_visibility_with(&mut self, id: ActorId, forcible: bool) {
        let parent_res = self
            .parent_widget(id)
            .and_then(|p| self.widget(p))
            .map(|p| p.res_visible)
            .unwrap_or(true);
        let Some(w) = self.actors.get_mut(id).and_then(|a| a.widget.as_mut()) else {
            return;
        };
        let was = w.res_visible;
        let now = w.visible && parent_res;
        w.res_visible = now;

        if forcible {
            if let Some(s) = w.state_mut(VISIBLE_STATE) {
                s.set_state_forcible(now);
            }
            w.fully_disabled = !now;
        } else if was != now {
            match w.state_mut(VISIBLE_STATE) {
                Some(s) => s.set_state(now),
                None => w.fully_disabled = !now,
            }
        }
        if was != now {
            let cb = if now { w.events.on_show.clone() } else { w.events.on_hide.clone() };
            if let Some(cb) = cb {
                cb();
            }
        }
        let kids: Vec<ActorId> = w.child_widgets.iter().chain(&w.internal_widgets).copied().collect();
        if forcible {
            self.apply_state_pose(id, VISIBLE_STATE);
        }
        if was != now || forcible {
            self.set_layout_dirty(id);
        }
        for k in kids {
            self.update_visibility_with(k, false);
        }
    }

    pub fn set_focusable(&mut self, id: ActorId, focusable: bool) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        w.focusable = focusable;
        if !focusable && w.focused {
            self.unfocus(id);
        }
        Ok(())
    }

    // Depth

    /// Draws the widget from its own scene layer slot instead of as part of
    /// its parent.
    pub fn set_depth_overridden(&mut self, id: ActorId, overridden: bool) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        if w.override_depth == overridden {
            return Ok(());
        }
        w.override_depth = overridden;
        if let Some(p) = self.actors[id].parent {
            self.rebuild_child_widgets(p);
        }
        self.sync_drawables(id);
        Ok(())
    }

    pub fn set_drawing_depth(&mut self, id: ActorId, depth: f32) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        w.drawing_depth = depth;
        if let Some(layer) = self.actors[id].registered.clone() {
            if let Some(l) = self.layers.iter_mut().find(|l| l.name() == layer) {
                l.depth_changed(DrawableKey::Widget(id), depth);
            }
        }
        Ok(())
    }

    // Lookups

    /// Nearest widget ancestor that owns `id` as a child or internal widget.
    pub fn parent_widget(&self, id: ActorId) -> Option<ActorId> {
        let parent = self.actors.get(id)?.parent?;
        self.actors.get(parent)?.is_widget().then_some(parent)
    }

    pub fn child_widget(&self, id: ActorId, path: &str) -> Option<ActorId> {
        self.find_child(id, path).filter(|c| self.widget(*c).is_some())
    }

    /// Internal widget of `id` by name, optionally followed by a child path.
    pub fn internal_widget(&self, id: ActorId, path: &str) -> Option<ActorId> {
        let (head, rest) = crate::widget::split_path(path);
        let host = self.widget(id)?;
        let first = host
            .internal_widgets
            .iter()
            .copied()
            .find(|w| self.actors.get(*w).is_some_and(|a| a.name == head))?;
        match rest {
            Some(rest) => self.child_widget(first, rest),
            None => Some(first),
        }
    }

    pub fn is_under_point(&self, id: ActorId, point: Vec2) -> bool {
        self.widget(id).is_some_and(|w| w.is_under_point(point))
    }
}
