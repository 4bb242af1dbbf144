//! # Strata core
//!
//! A retained scene graph for 2D UI. Everything lives in a [`Scene`]:
//!
//! - **Actors** form a tree. Each has a name, an enabled flag, a local
//!   [`Transform`], [`Component`]s, and a scene layer it draws into.
//! - **Widgets** are actors with a widget part: an anchor/offset [`Layout`]
//!   relative to the parent's rect, a tree of [`WidgetLayer`]s holding
//!   drawables, boolean [`WidgetState`]s that drive [`Animation`]s, and an
//!   optional [`WidgetBehavior`] for subtype hooks.
//! - **Scene layers** ([`SceneLayer`]) keep root-level drawables sorted by
//!   depth. Draw order is layer order, then depth, then the widget's own
//!   back layers, children and top layers.
//!
//! ```rust
//! use strata_core::*;
//!
//! let mut scene = Scene::default();
//! let panel = scene.create_widget("panel", ActorCreateMode::InScene);
//! scene.set_layout(panel, Layout::fixed(Vec2::ZERO, Vec2::new(200.0, 100.0), Vec2::ZERO)).unwrap();
//! scene
//!     .add_layer(panel, WidgetLayer::new("back").with_drawable(Sprite::new(Color::WHITE)))
//!     .unwrap();
//!
//! let frame = scene.frame(1.0 / 60.0);
//! assert_eq!(frame.draw_list.filled_rects().count(), 1);
//! ```
//!
//! Mutations go through `Scene` methods; they keep layout queues and layer
//! registration in sync. Handles ([`ActorId`]) are weak: once an actor is
//! destroyed, calls with its id return [`SceneError::StaleHandle`].

pub mod animation;
pub mod color;
pub mod component;
pub mod config;
pub mod data;
pub mod draw;
pub mod drawable;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod prelude;
pub mod registry;
pub mod render_api;
pub mod runtime;
pub mod scene;
pub mod scene_layer;
pub mod transform;
pub mod widget;

#[cfg(test)]
mod tests;

pub use animation::*;
pub use color::*;
pub use component::*;
pub use config::*;
pub use data::*;
pub use draw::*;
pub use drawable::*;
pub use error::*;
pub use geometry::*;
pub use input::*;
pub use layout::*;
pub use registry::*;
pub use render_api::*;
pub use runtime::*;
pub use scene::*;
pub use scene_layer::*;
pub use transform::*;
pub use widget::*;
