use crate::widget::FOCUSED_STATE;
use crate::{ActorId, InputEvent, Key, Scene, SceneError, SceneResult, Vec2};

impl Scene {
    /// Routes one input event to the widgets it concerns. Returns whether any
    /// widget handled it.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.resolve_layouts();
        match event {
            InputEvent::CursorPressed(at) => self.cursor_pressed(*at),
            InputEvent::CursorReleased(at) => self.cursor_released(*at),
            InputEvent::CursorMoved(at) => self.cursor_moved(*at),
            InputEvent::CursorScrolled { position, delta } => self.cursor_scrolled(*position, *delta),
            InputEvent::KeyPressed(key) => {
                if key.key == Key::Tab {
                    return self.focus_next(key.modifiers.shift);
                }
                let Some(id) = self.focused else {
                    return false;
                };
                self.with_behavior(id, |b, scene| b.on_key_pressed(scene, id, key))
                    .is_some()
            }
            InputEvent::KeyReleased(key) => {
                let Some(id) = self.focused else {
                    return false;
                };
                self.with_behavior(id, |b, scene| b.on_key_released(scene, id, key))
                    .is_some()
            }
        }
    }

    /// Topmost drawn widget under `point`.
    pub fn widget_at(&self, point: Vec2) -> Option<ActorId> {
        self.draw_order()
            .into_iter()
            .rev()
            .find(|id| self.is_under_point(*id, point))
    }

    /// `id` or its nearest widget ancestor carrying a behavior.
    fn handler_for(&self, id: ActorId) -> Option<ActorId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|x| self.widget(*x).is_some_and(|w| w.behavior.is_some()))
    }

    fn cursor_pressed(&mut self, at: Vec2) -> bool {
        let Some(hit) = self.widget_at(at) else {
            if let Some(f) = self.focused {
                self.unfocus(f);
            }
            self.pressed = None;
            return false;
        };
        let focus_target = std::iter::once(hit)
            .chain(self.ancestors(hit))
            .find(|x| self.widget(*x).is_some_and(|w| w.focusable));
        match focus_target {
            Some(t) => {
                let _ = self.focus(t);
            }
            None => {
                if let Some(f) = self.focused {
                    self.unfocus(f);
                }
            }
        }
        self.pressed = self.handler_for(hit);
        match self.pressed {
            Some(h) => self
                .with_behavior(h, |b, scene| b.on_cursor_pressed(scene, h, at))
                .is_some(),
            None => false,
        }
    }

    fn cursor_released(&mut self, at: Vec2) -> bool {
        let Some(h) = self.pressed.take() else {
            return false;
        };
        let inside = self.is_under_point(h, at);
        self.with_behavior(h, |b, scene| b.on_cursor_released(scene, h, at, inside))
            .is_some()
    }

    fn cursor_moved(&mut self, at: Vec2) -> bool {
        let hovered = self.widget_at(at).and_then(|hit| self.handler_for(hit));
        if hovered == self.hovered {
            return false;
        }
        if let Some(old) = self.hovered.take() {
            self.with_behavior(old, |b, scene| b.on_cursor_exit(scene, old));
        }
        self.hovered = hovered;
        if let Some(new) = hovered {
            self.with_behavior(new, |b, scene| b.on_cursor_enter(scene, new));
        }
        true
    }

    fn cursor_scrolled(&mut self, at: Vec2, delta: Vec2) -> bool {
        let Some(hit) = self.widget_at(at) else {
            return false;
        };
        let chain: Vec<ActorId> = std::iter::once(hit).chain(self.ancestors(hit)).collect();
        chain.into_iter().any(|id| {
            self.with_behavior(id, |b, scene| b.on_cursor_scrolled(scene, id, delta))
                .unwrap_or(false)
        })
    }

    /// Moves focus to the next (or previous) focusable widget in draw order.
    fn focus_next(&mut self, backwards: bool) -> bool {
        let candidates: Vec<ActorId> = self
            .draw_order()
            .into_iter()
            .filter(|id| self.widget(*id).is_some_and(|w| w.focusable))
            .collect();
        if candidates.is_empty() {
            return false;
        }
        let n = candidates.len();
        let next = match self.focused.and_then(|f| candidates.iter().position(|c| *c == f)) {
            Some(i) if backwards => (i + n - 1) % n,
            Some(i) => (i + 1) % n,
            None if backwards => n - 1,
            None => 0,
        };
        self.focus(candidates[next]).is_ok()
    }

    /// Focuses a focusable widget, unfocusing the previous one. Widget
    /// ancestors are told through `on_child_focused`.
    pub fn focus(&mut self, id: ActorId) -> SceneResult<()> {
        let w = self.widget_mut(id)?;
        if !w.focusable {
            log::debug!("{id:?} is not focusable");
            return Err(SceneError::NotFocusable(id));
        }
        if w.focused {
            return Ok(());
        }
        if let Some(prev) = self.focused {
            self.unfocus(prev);
        }
        let w = self.widget_mut(id)?;
        w.focused = true;
        if let Some(s) = w.state_mut(FOCUSED_STATE) {
            s.set_state(true);
        }
        let cb = w.events.on_focused.clone();
        self.focused = Some(id);
        if let Some(cb) = cb {
            cb();
        }
        self.with_behavior(id, |b, scene| b.on_focused(scene, id));
        let ancestors: Vec<ActorId> = self.ancestors(id).collect();
        for a in ancestors {
            self.with_behavior(a, |b, scene| b.on_child_focused(scene, a, id));
        }
        Ok(())
    }

    pub fn unfocus(&mut self, id: ActorId) {
        let Some(w) = self.actors.get_mut(id).and_then(|a| a.widget.as_mut()) else {
            return;
        };
        if !w.focused {
            return;
        }
        w.focused = false;
        if let Some(s) = w.state_mut(FOCUSED_STATE) {
            s.set_state(false);
        }
        let cb = w.events.on_unfocused.clone();
        if self.focused == Some(id) {
            self.focused = None;
        }
        if let Some(cb) = cb {
            cb();
        }
        self.with_behavior(id, |b, scene| b.on_unfocused(scene, id));
    }
}
