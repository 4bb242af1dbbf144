use std::any::Any;
use std::fmt;

use crate::{Basis, DataNode, DrawList, Rect, RectDrawable, Sprite};

/// Index of a component within its actor. Stable for the actor's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub u32);

/// Where a drawable component is being drawn.
#[derive(Clone, Copy, Debug)]
pub struct DrawContext {
    /// Maps the unit square onto the owner's oriented rect.
    pub world_basis: Basis,
    pub world_rect: Rect,
}

/// Behavior attached to an actor. Drawable components return `true` from
/// [`is_drawable`](Component::is_drawable) and get registered in the owner's
/// scene layer while enabled.
pub trait Component: Any {
    fn type_name(&self) -> &'static str;
    fn clone_box(&self) -> Box<dyn Component>;

    fn update(&mut self, _dt: f32) {}

    fn is_drawable(&self) -> bool {
        false
    }

    fn drawing_depth(&self) -> f32 {
        0.0
    }

    fn draw(&self, _ctx: &DrawContext, _out: &mut DrawList) {}

    fn serialize(&self, _node: &mut DataNode) {}
    fn deserialize(&mut self, _node: &DataNode) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Draws a sprite over the owner's world rect.
#[derive(Clone, Debug, Default)]
pub struct ImageComponent {
    pub sprite: Sprite,
    pub depth: f32,
}

impl ImageComponent {
    pub fn new(sprite: Sprite) -> Self {
        Self { sprite, depth: 0.0 }
    }
}

impl Component for ImageComponent {
    fn type_name(&self) -> &'static str {
        "ImageComponent"
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn is_drawable(&self) -> bool {
        true
    }

    fn drawing_depth(&self) -> f32 {
        self.depth
    }

    fn draw(&self, ctx: &DrawContext, out: &mut DrawList) {
        let mut sprite = self.sprite.clone();
        sprite.set_rect(ctx.world_rect);
        sprite.draw(out, 1.0);
    }

    fn serialize(&self, node: &mut DataNode) {
        node.write("depth", &self.depth);
        self.sprite.serialize(node.node_mut("sprite"));
    }

    fn deserialize(&mut self, node: &DataNode) {
        self.depth = node.read_or("depth", 0.0);
        if let Some(sprite) = node.child("sprite") {
            self.sprite.deserialize(sprite);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
