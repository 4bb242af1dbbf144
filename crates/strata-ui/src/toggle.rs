use std::any::Any;
use std::fmt;
use std::rc::Rc;

use strata_core::{ActorId, DataNode, Key, KeyEvent, Scene, SceneError, Vec2, WidgetBehavior};

use crate::set_optional_state;

pub const VALUE_STATE: &str = "value";
pub const PRESSED_STATE: &str = "pressed";
pub const SELECT_STATE: &str = "select";

pub type ToggleCallback = Rc<dyn Fn(bool)>;

/// Two-valued button. Flips on a click released over the widget, or on
/// Space/Enter while focused, and mirrors its value into the `value` state.
/// `pressed` and `select` states follow the cursor when present.
#[derive(Clone, Default)]
pub struct Toggle {
    value: bool,
    pub on_toggle: Option<ToggleCallback>,
}

impl fmt::Debug for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toggle")
            .field("value", &self.value)
            .field("on_toggle", &self.on_toggle.is_some())
            .finish()
    }
}

impl Toggle {
    pub fn new(value: bool) -> Self {
        Self { value, on_toggle: None }
    }

    pub fn on_toggle(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_toggle = Some(Rc::new(f));
        self
    }

    pub fn value(&self) -> bool {
        self.value
    }

    /// Value of the `Toggle` on `id`, if it has one.
    pub fn value_of(scene: &Scene, id: ActorId) -> Option<bool> {
        scene.widget(id)?.behavior_as::<Toggle>().map(|t| t.value)
    }

    /// Sets the value of the `Toggle` on `id`. The callback fires only when
    /// the value changes. Returns `None` when `id` has no toggle.
    pub fn set_value_of(scene: &mut Scene, id: ActorId, value: bool) -> Option<()> {
        let fired = scene.edit_behavior::<Toggle, _>(id, |t| {
            let changed = t.value != value;
            t.value = value;
            changed.then(|| t.on_toggle.clone()).flatten()
        })?;
        set_optional_state(scene, id, VALUE_STATE, value);
        if let Some(cb) = fired {
            cb(value);
        }
        Some(())
    }

    fn set_value(&mut self, scene: &mut Scene, id: ActorId, value: bool) {
        if self.value == value {
            return;
        }
        self.value = value;
        log::debug!("toggle {id:?} -> {value}");
        set_optional_state(scene, id, VALUE_STATE, value);
        if let Some(cb) = self.on_toggle.clone() {
            cb(value);
        }
    }

    fn is_activation_key(key: &KeyEvent) -> bool {
        matches!(key.key, Key::Space | Key::Enter) && !key.is_repeat
    }
}

impl WidgetBehavior for Toggle {
    fn type_name(&self) -> &'static str {
        "Toggle"
    }

    fn clone_box(&self) -> Box<dyn WidgetBehavior> {
        Box::new(self.clone())
    }

    fn on_attached(&mut self, scene: &mut Scene, id: ActorId) {
        if let Err(err) = scene.set_focusable(id, true) {
            log::warn!("toggle {id:?}: {err}");
        }
        match scene.set_state_forcible(id, VALUE_STATE, self.value) {
            Ok(()) | Err(SceneError::MissingState { .. }) => {}
            Err(err) => log::warn!("toggle {id:?}: {err}"),
        }
    }

    fn on_cursor_pressed(&mut self, scene: &mut Scene, id: ActorId, _at: Vec2) {
        set_optional_state(scene, id, PRESSED_STATE, true);
    }

    fn on_cursor_released(&mut self, scene: &mut Scene, id: ActorId, _at: Vec2, inside: bool) {
        set_optional_state(scene, id, PRESSED_STATE, false);
        if inside {
            self.set_value(scene, id, !self.value);
        }
    }

    fn on_cursor_enter(&mut self, scene: &mut Scene, id: ActorId) {
        set_optional_state(scene, id, SELECT_STATE, true);
    }

    fn on_cursor_exit(&mut self, scene: &mut Scene, id: ActorId) {
        set_optional_state(scene, id, SELECT_STATE, false);
    }

    fn on_key_pressed(&mut self, scene: &mut Scene, id: ActorId, key: &KeyEvent) {
        if Self::is_activation_key(key) {
            set_optional_state(scene, id, PRESSED_STATE, true);
        }
    }

    fn on_key_released(&mut self, scene: &mut Scene, id: ActorId, key: &KeyEvent) {
        if Self::is_activation_key(key) {
            set_optional_state(scene, id, PRESSED_STATE, false);
            self.set_value(scene, id, !self.value);
        }
    }

    fn serialize(&self, node: &mut DataNode) {
        node.write("value", &self.value);
    }

    fn deserialize(&mut self, node: &DataNode) {
        self.value = node.read_opt_or("value", self.value);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
