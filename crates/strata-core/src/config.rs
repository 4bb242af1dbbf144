use serde::{Deserialize, Serialize};

use crate::{Color, DataError, Rect};

/// Scene-wide settings. Loadable from JSON; absent fields keep defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Root rect for widgets without a widget parent, and the culling rect.
    pub view_rect: Rect,
    /// Widget layers at or above this depth draw after the children.
    pub top_layers_depth: f32,
    /// Upper bound on layout resolution passes per frame.
    pub max_layout_passes: u32,
    pub cull_clipped: bool,
    pub clear_color: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            view_rect: Rect::new(0.0, 0.0, 1280.0, 800.0),
            top_layers_depth: 1000.0,
            max_layout_passes: 8,
            cull_clipped: true,
            clear_color: Color::from_hex("#121212"),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }
}
