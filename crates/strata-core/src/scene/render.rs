use crate::widget::{StateEvent, VISIBLE_STATE};
use crate::{
    ActorId, AnimatedProperty, ComponentId, DrawCommand, DrawContext, DrawList, DrawableKey, Frame, FrameStats, Rect,
    Scene, Widget,
};

impl Scene {
    /// Advances components, widget layers, states and behaviors of every
    /// enabled actor in the scene.
    pub fn update(&mut self, dt: f32) {
        let mut updated = 0;
        for root in self.roots.clone() {
            self.update_actor(root, dt, &mut updated);
        }
        self.stats.actors_updated += updated;
    }

    fn update_actor(&mut self, id: ActorId, dt: f32, updated: &mut usize) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        if !actor.on_scene || !actor.res_enabled {
            return;
        }
        *updated += 1;
        for slot in &mut actor.components {
            if slot.res_enabled {
                slot.component.update(dt);
            }
        }
        let fully_disabled = match actor.widget.as_mut() {
            Some(w) if w.fully_disabled => true,
            Some(w) => {
                for l in &mut w.layers {
                    l.update(dt);
                }
                false
            }
            None => false,
        };
        let is_widget = actor.widget.is_some();
        if fully_disabled {
            self.update_states(id, dt, true);
            return;
        }
        if is_widget {
            self.update_states(id, dt, false);
            self.with_behavior(id, |b, scene| b.update(scene, id, dt));
        }

        let kids: Vec<ActorId> = match self.actors.get(id) {
            Some(a) => {
                let internal = a.widget.as_ref().map(|w| w.internal_widgets.as_slice()).unwrap_or(&[]);
                a.children.iter().chain(internal).copied().collect()
            }
            None => return,
        };
        for k in kids {
            self.update_actor(k, dt, updated);
        }
    }

    /// Ticks widget states, applies their edges to `fully_disabled` and
    /// writes animated values back.
    fn update_states(&mut self, id: ActorId, dt: f32, only_visible: bool) {
        let Some(w) = self.actors.get_mut(id).and_then(|a| a.widget.as_mut()) else {
            return;
        };
        let mut visible_edge = None;
        let mut samples: Vec<(AnimatedProperty, f32)> = Vec::new();
        for s in w
            .states
            .iter_mut()
            .filter(|s| !only_visible || s.name == VISIBLE_STATE)
        {
            let (moved, edge) = s.update(dt);
            if s.name == VISIBLE_STATE && edge.is_some() {
                visible_edge = edge;
            }
            if moved {
                samples.extend(s.animation.sample().map(|(p, v)| (p.clone(), v)));
            }
        }
        let mut toggled = false;
        if let Some(edge) = visible_edge {
            let disabled = edge == StateEvent::FullyFalse;
            toggled = w.fully_disabled != disabled;
            w.fully_disabled = disabled;
        }
        if !samples.is_empty() {
            self.apply_animation(id, samples);
        }
        if toggled {
            self.set_layout_dirty(id);
        }
    }

    /// Resolves pending layout, then draws every scene layer into `out`.
    /// Returns the number of widgets drawn.
    pub fn draw(&mut self, out: &mut DrawList) -> usize {
        self.resolve_layouts();
        let drawn = self.draw_resolved(out, &mut Vec::new());
        self.stats.widgets_drawn += drawn;
        drawn
    }

    /// Widgets in the order they would be drawn. Later entries are on top.
    pub fn draw_order(&self) -> Vec<ActorId> {
        let mut order = Vec::new();
        self.draw_resolved(&mut DrawList::default(), &mut order);
        order
    }

    fn draw_resolved(&self, out: &mut DrawList, order: &mut Vec<ActorId>) -> usize {
        for layer in &self.layers {
            for key in layer.enabled_drawables() {
                match key {
                    DrawableKey::Widget(id) => self.draw_widget(id, out, order),
                    DrawableKey::Component(id, cid) => self.draw_component(id, cid, out),
                }
            }
        }
        order.len()
    }

    fn draw_widget(&self, id: ActorId, out: &mut DrawList, order: &mut Vec<ActorId>) {
        let Some(actor) = self.actors.get(id) else {
            return;
        };
        let Some(w) = actor.widget.as_ref() else {
            return;
        };
        if !actor.on_scene || !actor.res_enabled || w.fully_disabled {
            return;
        }
        if self.is_clipped(w) {
            return;
        }
        order.push(id);

        for path in &w.back_layers {
            draw_layer(w, path, out);
        }
        let clip = w.behavior.as_ref().is_some_and(|b| b.clip_children());
        if clip {
            out.push(DrawCommand::PushClip { rect: w.world_rect });
        }
        for child in &w.drawing_children {
            self.draw_widget(*child, out, order);
        }
        if clip {
            out.push(DrawCommand::PopClip);
        }
        for internal in &w.internal_widgets {
            if self.widget(*internal).is_some_and(|iw| !iw.override_depth) {
                self.draw_widget(*internal, out, order);
            }
        }
        for path in &w.top_layers {
            draw_layer(w, path, out);
        }
    }

    fn draw_component(&self, id: ActorId, cid: ComponentId, out: &mut DrawList) {
        let Some(actor) = self.actors.get(id).filter(|a| a.on_scene) else {
            return;
        };
        let Some(slot) = actor.slot(cid).filter(|s| s.res_enabled) else {
            return;
        };
        let ctx = DrawContext {
            world_basis: actor.world_basis,
            world_rect: actor.world_basis.aabb(Rect::new(0.0, 0.0, 1.0, 1.0)),
        };
        slot.component.draw(&ctx, out);
    }

    /// Whether the widget and all its children lie outside the view rect.
    pub(crate) fn is_clipped(&self, w: &Widget) -> bool {
        self.config.cull_clipped && !w.bounds_with_children.intersects(&self.config.view_rect)
    }

    /// Runs one frame: update, layout, draw.
    pub fn frame(&mut self, dt: f32) -> Frame {
        self.stats = FrameStats::default();
        self.update(dt);
        self.resolve_layouts();
        let mut draw_list = DrawList::new(self.config.clear_color);
        self.stats.widgets_drawn = self.draw_resolved(&mut draw_list, &mut Vec::new());
        self.stats.draw_commands = draw_list.len();
        Frame {
            draw_list,
            stats: self.stats.clone(),
        }
    }
}

fn draw_layer(w: &Widget, path: &[u16], out: &mut DrawList) {
    if !w.layer_res_enabled(path) {
        return;
    }
    if let Some(drawable) = w.layer_at(path).and_then(|l| l.drawable.as_ref()) {
        drawable.draw(out, w.layer_res_transparency(path));
    }
}
