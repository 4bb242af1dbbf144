//! Rect-shaped drawables bound to widget layers.

use std::any::Any;
use std::fmt;

use crate::{Color, DataNode, DrawCommand, DrawList, Rect, Vec2};

/// Something a widget layer can draw inside its computed rect.
pub trait RectDrawable: Any {
    /// Registry name used for persistence.
    fn type_name(&self) -> &'static str;
    fn clone_box(&self) -> Box<dyn RectDrawable>;

    fn rect(&self) -> Rect;
    fn set_rect(&mut self, rect: Rect);

    fn update(&mut self, _dt: f32) {}
    /// Emits commands with alpha scaled by `transparency`.
    fn draw(&self, out: &mut DrawList, transparency: f32);

    fn is_under_point(&self, point: Vec2) -> bool {
        self.rect().contains(point)
    }

    fn serialize(&self, node: &mut DataNode);
    fn deserialize(&mut self, node: &DataNode);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Clone for Box<dyn RectDrawable> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Debug for dyn RectDrawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.type_name())
            .field("rect", &self.rect())
            .finish()
    }
}

/// Filled rect, or an image when `image` is set.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub rect: Rect,
    pub color: Color,
    pub radius: f32,
    pub image: Option<String>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            rect: Rect::ZERO,
            color: Color::WHITE,
            radius: 0.0,
            image: None,
        }
    }
}

impl Sprite {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn image(name: impl Into<String>) -> Self {
        Self {
            image: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

impl RectDrawable for Sprite {
    fn type_name(&self) -> &'static str {
        "Sprite"
    }

    fn clone_box(&self) -> Box<dyn RectDrawable> {
        Box::new(self.clone())
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    fn draw(&self, out: &mut DrawList, transparency: f32) {
        if self.rect.is_empty() {
            return;
        }
        let color = self.color.mul_alpha(transparency);
        match &self.image {
            Some(image) => out.push(DrawCommand::Image {
                rect: self.rect,
                image: image.clone(),
                tint: color,
            }),
            None => out.push(DrawCommand::Rect {
                rect: self.rect,
                color,
                radius: self.radius,
            }),
        }
    }

    fn serialize(&self, node: &mut DataNode) {
        node.write("color", &self.color).write("radius", &self.radius);
        if let Some(image) = &self.image {
            node.write("image", image);
        }
    }

    fn deserialize(&mut self, node: &DataNode) {
        self.color = node.read_or("color", self.color);
        self.radius = node.read_opt_or("radius", self.radius);
        let image: String = node.read_opt_or("image", String::new());
        self.image = (!image.is_empty()).then_some(image);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub rect: Rect,
    pub text: String,
    pub color: Color,
    pub font_size: f32,
}

impl Default for Label {
    fn default() -> Self {
        Self {
            rect: Rect::ZERO,
            text: String::new(),
            color: Color::WHITE,
            font_size: 14.0,
        }
    }
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

impl RectDrawable for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn clone_box(&self) -> Box<dyn RectDrawable> {
        Box::new(self.clone())
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    fn draw(&self, out: &mut DrawList, transparency: f32) {
        if self.text.is_empty() {
            return;
        }
        out.push(DrawCommand::Text {
            rect: self.rect,
            text: self.text.clone(),
            color: self.color.mul_alpha(transparency),
            size: self.font_size,
        });
    }

    fn serialize(&self, node: &mut DataNode) {
        node.write("text", &self.text)
            .write("color", &self.color)
            .write("font_size", &self.font_size);
    }

    fn deserialize(&mut self, node: &DataNode) {
        self.text = node.read_or("text", String::new());
        self.color = node.read_or("color", self.color);
        self.font_size = node.read_or("font_size", self.font_size);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
