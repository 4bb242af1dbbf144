//! Stock widget behaviors for Strata: row/column layout containers, a
//! clipping scroll area, a progress bar and a toggle.
//!
//! Behaviors attach to any widget with [`Scene::set_behavior`]. Call
//! [`register`] on the scene's registry before loading saved trees that use
//! them.
//!
//! ```rust
//! use strata_core::*;
//! use strata_ui::*;
//!
//! let mut scene = Scene::default();
//! strata_ui::register(scene.registry_mut());
//!
//! let row = scene.create_widget("row", ActorCreateMode::InScene);
//! scene.set_layout(row, Layout::fixed(Vec2::ZERO, Vec2::new(200.0, 40.0), Vec2::ZERO)).unwrap();
//! scene.set_behavior(row, Box::new(HorizontalLayout().spacing(10.0))).unwrap();
//!
//! for name in ["a", "b"] {
//!     let cell = scene.create_widget(name, ActorCreateMode::InScene);
//!     scene.add_child(row, cell, None).unwrap();
//! }
//! scene.resolve_layouts();
//!
//! let b = scene.find_actor("row/b").unwrap();
//! assert_eq!(scene.widget(b).unwrap().world_rect(), Rect::new(105.0, 0.0, 95.0, 40.0));
//! ```

use strata_core::{ActorId, Scene, SceneError, TypeRegistry};

pub mod linear;
pub mod progress;
pub mod scroll;
pub mod toggle;

#[cfg(test)]
mod tests;

pub use linear::*;
pub use progress::*;
pub use scroll::*;
pub use toggle::*;

/// Registers the behaviors of this crate under their persisted names.
pub fn register(registry: &mut TypeRegistry) {
    registry.register_behavior("HorizontalLayout", || Box::new(HorizontalLayout()));
    registry.register_behavior("VerticalLayout", || Box::new(VerticalLayout()));
    registry.register_behavior("HorizontalProgress", || Box::new(HorizontalProgress::default()));
    registry.register_behavior("ScrollArea", || Box::new(ScrollArea::default()));
    registry.register_behavior("Toggle", || Box::new(Toggle::default()));
}

/// Drives an interaction state when the widget has one.
pub(crate) fn set_optional_state(scene: &mut Scene, id: ActorId, name: &str, value: bool) {
    match scene.set_state(id, name, value) {
        Ok(()) | Err(SceneError::MissingState { .. }) => {}
        Err(err) => log::warn!("{id:?}: {err}"),
    }
}
