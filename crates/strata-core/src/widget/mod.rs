//! Widget part of an actor: layout, layers, states and visibility.
//!
//! Widgets are mutated through [`Scene`](crate::Scene) so layout dirtiness,
//! registration and propagation stay consistent; this type exposes the
//! read side.

mod behavior;
mod layer;
mod state;

pub use behavior::WidgetBehavior;
pub use layer::WidgetLayer;
pub use state::{Callback, StateEvent, WidgetState};

pub(crate) use layer::split_path;

use smallvec::SmallVec;

use crate::{ActorId, Rect, Vec2, WidgetLayout};

/// Index path from a top-level widget layer down through child layers.
pub type LayerPath = SmallVec<[u16; 4]>;

/// State whose edges switch the widget between fully disabled and drawn.
pub const VISIBLE_STATE: &str = "visible";
/// State toggled by focus changes.
pub const FOCUSED_STATE: &str = "focused";

#[derive(Clone, Default)]
pub struct WidgetEvents {
    pub on_layout_updated: Option<Callback>,
    pub on_focused: Option<Callback>,
    pub on_unfocused: Option<Callback>,
    pub on_show: Option<Callback>,
    pub on_hide: Option<Callback>,
}

pub struct Widget {
    pub(crate) layout: WidgetLayout,
    pub(crate) layers: Vec<WidgetLayer>,
    pub(crate) states: Vec<WidgetState>,
    pub(crate) child_widgets: Vec<ActorId>,
    pub(crate) internal_widgets: Vec<ActorId>,
    pub(crate) drawing_children: Vec<ActorId>,
    pub(crate) override_depth: bool,
    pub(crate) drawing_depth: f32,
    pub(crate) transparency: f32,
    pub(crate) res_transparency: f32,
    pub(crate) visible: bool,
    pub(crate) res_visible: bool,
    pub(crate) fully_disabled: bool,
    pub(crate) focusable: bool,
    pub(crate) focused: bool,
    pub(crate) world_rect: Rect,
    pub(crate) children_world_rect: Rect,
    pub(crate) bounds: Rect,
    pub(crate) bounds_with_children: Rect,
    pub(crate) back_layers: Vec<LayerPath>,
    pub(crate) top_layers: Vec<LayerPath>,
    pub(crate) behavior: Option<Box<dyn WidgetBehavior>>,
    pub events: WidgetEvents,
}

impl Default for Widget {
    fn default() -> Self {
        Self {
            layout: WidgetLayout::default(),
            layers: Vec::new(),
            states: Vec::new(),
            child_widgets: Vec::new(),
            internal_widgets: Vec::new(),
            drawing_children: Vec::new(),
            override_depth: false,
            drawing_depth: 0.0,
            transparency: 1.0,
            res_transparency: 1.0,
            visible: true,
            res_visible: true,
            fully_disabled: false,
            focusable: false,
            focused: false,
            world_rect: Rect::ZERO,
            children_world_rect: Rect::ZERO,
            bounds: Rect::ZERO,
            bounds_with_children: Rect::ZERO,
            back_layers: Vec::new(),
            top_layers: Vec::new(),
            behavior: None,
            events: WidgetEvents::default(),
        }
    }
}

impl Widget {
    pub fn layout(&self) -> &WidgetLayout {
        &self.layout
    }

    pub fn layers(&self) -> &[WidgetLayer] {
        &self.layers
    }

    /// Layer by slash path from the top-level layers, e.g. `back/icon`.
    pub fn layer(&self, path: &str) -> Option<&WidgetLayer> {
        let (head, rest) = split_path(path);
        let top = self.layers.iter().find(|l| l.name == head)?;
        match rest {
            Some(rest) => top.child(rest),
            None => Some(top),
        }
    }

    pub(crate) fn layer_mut(&mut self, path: &str) -> Option<&mut WidgetLayer> {
        let (head, rest) = split_path(path);
        let top = self.layers.iter_mut().find(|l| l.name == head)?;
        match rest {
            Some(rest) => top.child_mut(rest),
            None => Some(top),
        }
    }

    /// First layer named `name` anywhere in the layer tree.
    pub fn find_layer(&self, name: &str) -> Option<&WidgetLayer> {
        self.layers
            .iter()
            .find_map(|l| if l.name == name { Some(l) } else { l.find_child(name) })
    }

    pub fn layer_at(&self, path: &[u16]) -> Option<&WidgetLayer> {
        let (first, rest) = path.split_first()?;
        let mut layer = self.layers.get(*first as usize)?;
        for i in rest {
            layer = layer.children().get(*i as usize)?;
        }
        Some(layer)
    }

    /// Layers drawn before the children, by ascending depth.
    pub fn back_layers(&self) -> impl Iterator<Item = &WidgetLayer> + '_ {
        self.back_layers.iter().filter_map(|p| self.layer_at(p))
    }

    /// Layers drawn after the children, by ascending depth.
    pub fn top_layers(&self) -> impl Iterator<Item = &WidgetLayer> + '_ {
        self.top_layers.iter().filter_map(|p| self.layer_at(p))
    }

    pub fn states(&self) -> &[WidgetState] {
        &self.states
    }

    pub fn state(&self, name: &str) -> Option<&WidgetState> {
        self.states.iter().find(|s| s.name == name)
    }

    pub(crate) fn state_mut(&mut self, name: &str) -> Option<&mut WidgetState> {
        self.states.iter_mut().find(|s| s.name == name)
    }

    pub fn child_widgets(&self) -> &[ActorId] {
        &self.child_widgets
    }

    pub fn internal_widgets(&self) -> &[ActorId] {
        &self.internal_widgets
    }

    /// Child widgets drawn as part of this widget.
    pub fn drawing_children(&self) -> &[ActorId] {
        &self.drawing_children
    }

    pub fn is_depth_overridden(&self) -> bool {
        self.override_depth
    }

    pub fn drawing_depth(&self) -> f32 {
        self.drawing_depth
    }

    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    /// Own transparency times every widget ancestor's.
    pub fn res_transparency(&self) -> f32 {
        self.res_transparency
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Visible and every widget ancestor visible.
    pub fn is_res_visible(&self) -> bool {
        self.res_visible
    }

    /// Not drawn or updated until the visible state becomes true again.
    pub fn is_fully_disabled(&self) -> bool {
        self.fully_disabled
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn world_rect(&self) -> Rect {
        self.world_rect
    }

    pub fn children_rect(&self) -> Rect {
        self.children_world_rect
    }

    /// World rect grown by the back layers.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn bounds_with_children(&self) -> Rect {
        self.bounds_with_children
    }

    pub fn behavior(&self) -> Option<&dyn WidgetBehavior> {
        self.behavior.as_deref()
    }

    pub fn behavior_as<T: WidgetBehavior>(&self) -> Option<&T> {
        self.behavior.as_ref()?.as_any().downcast_ref::<T>()
    }

    pub(crate) fn layer_res_enabled(&self, path: &[u16]) -> bool {
        self.walk_layer_path(path).all(|l| l.enabled)
    }

    pub(crate) fn layer_res_transparency(&self, path: &[u16]) -> f32 {
        self.walk_layer_path(path)
            .fold(self.res_transparency, |acc, l| acc * l.transparency)
    }

    fn walk_layer_path<'a>(&'a self, path: &'a [u16]) -> impl Iterator<Item = &'a WidgetLayer> + 'a {
        (1..=path.len()).filter_map(move |n| self.layer_at(&path[..n]))
    }

    /// Splits the layers that carry a drawable into the back or top sequence
    /// at `threshold` and sorts each by depth.
    pub(crate) fn rebuild_layer_sequence(&mut self, threshold: f32) {
        fn visit(layers: &[WidgetLayer], prefix: &mut LayerPath, out: &mut Vec<(f32, LayerPath)>) {
            for (i, l) in layers.iter().enumerate() {
                prefix.push(i as u16);
                if l.drawable.is_some() {
                    out.push((l.depth, prefix.clone()));
                }
                visit(l.children(), prefix, out);
                prefix.pop();
            }
        }
        let mut all = Vec::new();
        visit(&self.layers, &mut LayerPath::new(), &mut all);
        all.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (back, top): (Vec<_>, Vec<_>) = all.into_iter().partition(|(d, _)| *d < threshold);
        self.back_layers = back.into_iter().map(|(_, p)| p).collect();
        self.top_layers = top.into_iter().map(|(_, p)| p).collect();
    }

    pub(crate) fn update_layer_rects(&mut self) {
        let rect = self.world_rect;
        for l in &mut self.layers {
            l.update_rects(rect);
        }
    }

    pub(crate) fn update_bounds(&mut self) {
        let mut bounds = self.world_rect;
        for l in self.back_layers() {
            bounds.expand(&l.rect());
        }
        self.bounds = bounds;
    }

    /// Any enabled drawing layer's hit area contains `point`. A widget with
    /// no enabled drawing layers is hit anywhere inside its world rect.
    pub fn is_under_point(&self, point: Vec2) -> bool {
        let mut hit_layers = self
            .back_layers
            .iter()
            .chain(self.top_layers.iter())
            .filter(|p| self.layer_res_enabled(p))
            .filter_map(|p| self.layer_at(p))
            .peekable();
        if hit_layers.peek().is_none() {
            return self.world_rect.contains(point);
        }
        hit_layers.any(|l| l.is_under_point(point))
    }
}
