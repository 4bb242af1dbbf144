pub use crate::animation::{AnimatedProperty, Animation, Easing};
pub use crate::color::Color;
pub use crate::component::{Component, ComponentId, ImageComponent};
pub use crate::config::SceneConfig;
pub use crate::data::{DataNode, FromData, ToData};
pub use crate::draw::{DrawCommand, DrawList};
pub use crate::drawable::{Label, RectDrawable, Sprite};
pub use crate::error::{SceneError, SceneResult};
pub use crate::geometry::{Basis, Rect, Vec2};
pub use crate::input::{InputEvent, Key, KeyEvent, Modifiers};
pub use crate::layout::{Layout, WidgetLayout};
pub use crate::render_api::RenderBackend;
pub use crate::runtime::Frame;
pub use crate::scene::{ActorCreateMode, ActorId, Scene};
pub use crate::widget::{WidgetBehavior, WidgetLayer, WidgetState};
