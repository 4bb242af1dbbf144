use std::any::Any;
use std::fmt;
use std::rc::Rc;

use strata_core::{ActorId, DataNode, Layout, Scene, Vec2, WidgetBehavior};

use crate::set_optional_state;
use crate::toggle::{PRESSED_STATE, SELECT_STATE};

/// Layer resized to show the current value.
pub const PROGRESS_BAR: &str = "bar";
/// Layer spanning the whole track.
pub const PROGRESS_BACK: &str = "back";

/// Rate at which the displayed fill closes the gap to the value.
const SMOOTH_RATE: f32 = 30.0;
const SNAP_THRESHOLD: f32 = 0.01;

/// Side the bar grows from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressOrientation {
    /// Fills from the left edge towards the right.
    #[default]
    Right,
    /// Fills from the right edge towards the left.
    Left,
}

impl ProgressOrientation {
    pub fn name(self) -> &'static str {
        match self {
            ProgressOrientation::Right => "Right",
            ProgressOrientation::Left => "Left",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Right" => Some(ProgressOrientation::Right),
            "Left" => Some(ProgressOrientation::Left),
            _ => None,
        }
    }
}

pub type ProgressCallback = Rc<dyn Fn(f32)>;

/// Horizontal value bar. Sizes its `bar` layer to the value within
/// `[min_value, max_value]`, easing the displayed fill towards it. A click
/// sets the value from the cursor, the wheel nudges it by `scroll_sense`.
#[derive(Clone)]
pub struct HorizontalProgress {
    value: f32,
    smooth_value: f32,
    min_value: f32,
    max_value: f32,
    pub orientation: ProgressOrientation,
    pub scroll_sense: f32,
    pub on_change: Option<ProgressCallback>,
}

impl Default for HorizontalProgress {
    fn default() -> Self {
        Self {
            value: 0.0,
            smooth_value: 0.0,
            min_value: 0.0,
            max_value: 1.0,
            orientation: ProgressOrientation::Right,
            scroll_sense: 1.0,
            on_change: None,
        }
    }
}

impl fmt::Debug for HorizontalProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HorizontalProgress")
            .field("value", &self.value)
            .field("smooth_value", &self.smooth_value)
            .field("range", &(self.min_value..=self.max_value))
            .field("orientation", &self.orientation)
            .finish()
    }
}

impl HorizontalProgress {
    /// Progress over `[min, max]` starting at `min`. Bounds given in the
    /// wrong order are swapped.
    pub fn new(min: f32, max: f32) -> Self {
        let (min_value, max_value) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: min_value,
            smooth_value: min_value,
            min_value,
            max_value,
            ..Default::default()
        }
    }

    pub fn orientation(mut self, orientation: ProgressOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn on_change(mut self, f: impl Fn(f32) + 'static) -> Self {
        self.on_change = Some(Rc::new(f));
        self
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value the bar currently shows while easing towards [`value`](Self::value).
    pub fn smooth_value(&self) -> f32 {
        self.smooth_value
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min_value, self.max_value)
    }

    pub fn value_of(scene: &Scene, id: ActorId) -> Option<f32> {
        scene.widget(id)?.behavior_as::<HorizontalProgress>().map(|p| p.value)
    }

    /// Sets the value of the progress on `id`; the bar eases to it over the
    /// next frames. Returns `None` when `id` has no progress.
    pub fn set_value_of(scene: &mut Scene, id: ActorId, value: f32) -> Option<()> {
        let fired = scene.edit_behavior::<HorizontalProgress, _>(id, |p| p.assign(value))?;
        if let Some((cb, v)) = fired {
            cb(v);
        }
        Some(())
    }

    /// Like [`set_value_of`](Self::set_value_of) but the bar jumps to the
    /// new value at once.
    pub fn set_value_forcible_of(scene: &mut Scene, id: ActorId, value: f32) -> Option<()> {
        let (fired, bar) = scene.edit_behavior::<HorizontalProgress, _>(id, |p| {
            let fired = p.assign(value);
            p.smooth_value = p.value;
            (fired, p.bar_layout())
        })?;
        apply_bar_layout(scene, id, bar);
        if let Some((cb, v)) = fired {
            cb(v);
        }
        Some(())
    }

    /// Changes the range and clamps the value into it.
    pub fn set_range_of(scene: &mut Scene, id: ActorId, min: f32, max: f32) -> Option<()> {
        let fired = scene.edit_behavior::<HorizontalProgress, _>(id, |p| {
            let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
            p.min_value = lo;
            p.max_value = hi;
            p.smooth_value = p.smooth_value.clamp(lo, hi);
            p.assign(p.value)
        })?;
        if let Some((cb, v)) = fired {
            cb(v);
        }
        Some(())
    }

    /// Clamps and stores `value`. Returns the callback to run when the value
    /// changed; callers fire it once the scene borrow is released.
    fn assign(&mut self, value: f32) -> Option<(ProgressCallback, f32)> {
        let value = value.clamp(self.min_value, self.max_value);
        if value == self.value {
            return None;
        }
        self.value = value;
        self.on_change.clone().map(|cb| (cb, value))
    }

    fn set_value(&mut self, id: ActorId, value: f32) {
        let before = self.value;
        let fired = self.assign(value);
        if self.value != before {
            log::debug!("progress {id:?} -> {}", self.value);
        }
        if let Some((cb, v)) = fired {
            cb(v);
        }
    }

    fn fraction(&self) -> f32 {
        let span = self.max_value - self.min_value;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.smooth_value - self.min_value) / span).clamp(0.0, 1.0)
    }

    fn bar_layout(&self) -> Layout {
        let f = self.fraction();
        let (min_x, max_x) = match self.orientation {
            ProgressOrientation::Right => (0.0, f),
            ProgressOrientation::Left => (1.0 - f, 1.0),
        };
        Layout::new(Vec2::new(min_x, 0.0), Vec2::new(max_x, 1.0), Vec2::ZERO, Vec2::ZERO)
    }

    fn value_at(&self, scene: &Scene, id: ActorId, at: Vec2) -> Option<f32> {
        let rect = scene.widget(id)?.world_rect();
        if rect.w <= 0.0 {
            return None;
        }
        let t = ((at.x - rect.x) / rect.w).clamp(0.0, 1.0);
        let t = match self.orientation {
            ProgressOrientation::Right => t,
            ProgressOrientation::Left => 1.0 - t,
        };
        Some(self.min_value + t * (self.max_value - self.min_value))
    }
}

/// Writes `bar` into the bar layer when it differs. Widgets without a bar
/// layer are left alone.
fn apply_bar_layout(scene: &mut Scene, id: ActorId, bar: Layout) {
    let current = scene
        .widget(id)
        .and_then(|w| w.layer(PROGRESS_BAR))
        .map(|l| l.layout);
    if current.is_some_and(|l| l != bar) {
        let _ = scene.edit_layer(id, PROGRESS_BAR, |l| l.layout = bar);
    }
}

impl WidgetBehavior for HorizontalProgress {
    fn type_name(&self) -> &'static str {
        "HorizontalProgress"
    }

    fn clone_box(&self) -> Box<dyn WidgetBehavior> {
        Box::new(self.clone())
    }

    fn on_attached(&mut self, scene: &mut Scene, id: ActorId) {
        self.smooth_value = self.value;
        apply_bar_layout(scene, id, self.bar_layout());
    }

    fn update(&mut self, scene: &mut Scene, id: ActorId, dt: f32) {
        if self.smooth_value == self.value {
            return;
        }
        let t = (dt * SMOOTH_RATE).clamp(0.0, 1.0);
        self.smooth_value = (self.smooth_value + (self.value - self.smooth_value) * t)
            .clamp(self.min_value, self.max_value);
        if (self.value - self.smooth_value).abs() < SNAP_THRESHOLD {
            self.smooth_value = self.value;
        }
        apply_bar_layout(scene, id, self.bar_layout());
    }

    fn on_cursor_pressed(&mut self, scene: &mut Scene, id: ActorId, at: Vec2) {
        set_optional_state(scene, id, PRESSED_STATE, true);
        if let Some(v) = self.value_at(scene, id, at) {
            self.set_value(id, v);
        }
    }

    fn on_cursor_released(&mut self, scene: &mut Scene, id: ActorId, _at: Vec2, _inside: bool) {
        set_optional_state(scene, id, PRESSED_STATE, false);
    }

    fn on_cursor_enter(&mut self, scene: &mut Scene, id: ActorId) {
        set_optional_state(scene, id, SELECT_STATE, true);
    }

    fn on_cursor_exit(&mut self, scene: &mut Scene, id: ActorId) {
        set_optional_state(scene, id, SELECT_STATE, false);
    }

    fn on_cursor_scrolled(&mut self, _scene: &mut Scene, id: ActorId, delta: Vec2) -> bool {
        let before = self.value;
        self.set_value(id, before + delta.y * self.scroll_sense);
        self.value != before
    }

    fn serialize(&self, node: &mut DataNode) {
        node.write("value", &self.value)
            .write("min_value", &self.min_value)
            .write("max_value", &self.max_value)
            .write("orientation", self.orientation.name())
            .write("scroll_sense", &self.scroll_sense);
    }

    fn deserialize(&mut self, node: &DataNode) {
        self.min_value = node.read_opt_or("min_value", self.min_value);
        self.max_value = node.read_opt_or("max_value", self.max_value).max(self.min_value);
        self.value = node
            .read_opt_or("value", self.value)
            .clamp(self.min_value, self.max_value);
        self.smooth_value = self.value;
        self.scroll_sense = node.read_opt_or("scroll_sense", self.scroll_sense);
        let name: String = node.read_opt_or("orientation", self.orientation.name().to_string());
        self.orientation = ProgressOrientation::from_name(&name).unwrap_or_else(|| {
            log::warn!("unknown progress orientation `{name}`, using Right");
            ProgressOrientation::default()
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
