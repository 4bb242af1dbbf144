use std::any::Any;

use crate::{ActorId, DataNode, KeyEvent, Rect, Scene, Vec2};

/// Widget subtype hooks. A behavior is detached from its widget while one of
/// its hooks runs, so hooks get the whole [`Scene`] mutably and may edit any
/// widget, including their own through the scene API.
pub trait WidgetBehavior: Any {
    /// Registry name used for persistence.
    fn type_name(&self) -> &'static str;
    fn clone_box(&self) -> Box<dyn WidgetBehavior>;

    /// Called once the behavior is installed on `id`.
    fn on_attached(&mut self, _scene: &mut Scene, _id: ActorId) {}

    /// Rect children are laid out in, given the widget's world rect.
    fn children_rect(&self, world_rect: Rect) -> Rect {
        world_rect
    }

    /// Whether drawing children are clipped to the widget's world rect.
    fn clip_children(&self) -> bool {
        false
    }

    /// Called after the widget's rect and layers were recomputed and before
    /// its children are.
    fn on_layout_updated(&mut self, _scene: &mut Scene, _id: ActorId) {}

    fn on_child_added(&mut self, scene: &mut Scene, id: ActorId, _child: ActorId) {
        scene.set_layout_dirty(id);
    }

    fn on_child_removed(&mut self, scene: &mut Scene, id: ActorId, _child: ActorId) {
        scene.set_layout_dirty(id);
    }

    /// A descendant of this widget received focus.
    fn on_child_focused(&mut self, _scene: &mut Scene, _id: ActorId, _child: ActorId) {}

    fn update(&mut self, _scene: &mut Scene, _id: ActorId, _dt: f32) {}

    fn on_focused(&mut self, _scene: &mut Scene, _id: ActorId) {}
    fn on_unfocused(&mut self, _scene: &mut Scene, _id: ActorId) {}

    fn on_cursor_pressed(&mut self, _scene: &mut Scene, _id: ActorId, _at: Vec2) {}
    /// `inside` is whether the release happened over the widget.
    fn on_cursor_released(&mut self, _scene: &mut Scene, _id: ActorId, _at: Vec2, _inside: bool) {}
    fn on_cursor_enter(&mut self, _scene: &mut Scene, _id: ActorId) {}
    fn on_cursor_exit(&mut self, _scene: &mut Scene, _id: ActorId) {}
    /// Returns `true` when the scroll was consumed.
    fn on_cursor_scrolled(&mut self, _scene: &mut Scene, _id: ActorId, _delta: Vec2) -> bool {
        false
    }

    fn on_key_pressed(&mut self, _scene: &mut Scene, _id: ActorId, _key: &KeyEvent) {}
    fn on_key_released(&mut self, _scene: &mut Scene, _id: ActorId, _key: &KeyEvent) {}

    fn serialize(&self, _node: &mut DataNode) {}
    fn deserialize(&mut self, _node: &DataNode) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
