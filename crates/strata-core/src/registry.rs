use std::collections::HashMap;

use crate::{Component, DataError, ImageComponent, Label, RectDrawable, Sprite, WidgetBehavior};

pub type DrawableCtor = fn() -> Box<dyn RectDrawable>;
pub type ComponentCtor = fn() -> Box<dyn Component>;
pub type BehaviorCtor = fn() -> Box<dyn WidgetBehavior>;

/// Maps persisted type names to constructors so trees can be rebuilt from
/// data.
#[derive(Clone)]
pub struct TypeRegistry {
    drawables: HashMap<&'static str, DrawableCtor>,
    components: HashMap<&'static str, ComponentCtor>,
    behaviors: HashMap<&'static str, BehaviorCtor>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        let mut reg = Self::empty();
        reg.register_drawable("Sprite", || Box::new(Sprite::default()));
        reg.register_drawable("Label", || Box::new(Label::default()));
        reg.register_component("ImageComponent", || Box::new(ImageComponent::default()));
        reg
    }
}

impl TypeRegistry {
    pub fn empty() -> Self {
        Self {
            drawables: HashMap::new(),
            components: HashMap::new(),
            behaviors: HashMap::new(),
        }
    }

    pub fn register_drawable(&mut self, name: &'static str, ctor: DrawableCtor) {
        self.drawables.insert(name, ctor);
    }

    pub fn register_component(&mut self, name: &'static str, ctor: ComponentCtor) {
        self.components.insert(name, ctor);
    }

    pub fn register_behavior(&mut self, name: &'static str, ctor: BehaviorCtor) {
        self.behaviors.insert(name, ctor);
    }

    pub fn make_drawable(&self, name: &str) -> Result<Box<dyn RectDrawable>, DataError> {
        self.drawables
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| unknown("drawable", name))
    }

    pub fn make_component(&self, name: &str) -> Result<Box<dyn Component>, DataError> {
        self.components
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| unknown("component", name))
    }

    pub fn make_behavior(&self, name: &str) -> Result<Box<dyn WidgetBehavior>, DataError> {
        self.behaviors
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| unknown("behavior", name))
    }
}

fn unknown(kind: &'static str, name: &str) -> DataError {
    DataError::UnknownType {
        kind,
        name: name.to_string(),
    }
}
