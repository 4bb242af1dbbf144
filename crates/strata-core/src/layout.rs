use crate::{DataError, DataNode, FromData, Rect, ToData, Vec2};

/// Anchors and offsets relative to a parent rect. Anchors are fractions of
/// the parent rect (`(0, 0)` is the top-left corner), offsets are absolute
/// deltas added after anchoring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub anchor_min: Vec2,
    pub anchor_max: Vec2,
    pub offset_min: Vec2,
    pub offset_max: Vec2,
}

impl Default for Layout {
    fn default() -> Self {
        Self::both_stretch()
    }
}

impl Layout {
    pub fn new(anchor_min: Vec2, anchor_max: Vec2, offset_min: Vec2, offset_max: Vec2) -> Self {
        Self {
            anchor_min,
            anchor_max,
            offset_min,
            offset_max,
        }
    }

    /// Fills the parent rect exactly.
    pub fn both_stretch() -> Self {
        Self::new(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Vec2::ZERO)
    }

    /// Fills the parent rect inset by the given borders.
    pub fn both_stretch_with(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(
            Vec2::ZERO,
            Vec2::ONE,
            Vec2::new(left, top),
            Vec2::new(-right, -bottom),
        )
    }

    /// Fixed `size` placed so the rect's own `anchor` point lands on the
    /// parent's `anchor` point shifted by `offset`.
    pub fn fixed(anchor: Vec2, size: Vec2, offset: Vec2) -> Self {
        let min = offset - size.scale(anchor);
        Self::new(anchor, anchor, min, min + size)
    }

    /// Stretches horizontally, fixed height at vertical anchor `y`.
    pub fn horizontal_stretch(y: f32, height: f32, left: f32, right: f32) -> Self {
        Self::new(
            Vec2::new(0.0, y),
            Vec2::new(1.0, y),
            Vec2::new(left, -height * y),
            Vec2::new(-right, height * (1.0 - y)),
        )
    }

    /// Stretches vertically, fixed width at horizontal anchor `x`.
    pub fn vertical_stretch(x: f32, width: f32, top: f32, bottom: f32) -> Self {
        Self::new(
            Vec2::new(x, 0.0),
            Vec2::new(x, 1.0),
            Vec2::new(-width * x, top),
            Vec2::new(width * (1.0 - x), -bottom),
        )
    }

    /// Absolute rect inside a parent, measured from the parent's top-left.
    pub fn absolute(rect: Rect) -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO, rect.min(), rect.max())
    }

    pub fn calculate(&self, parent: Rect) -> Rect {
        let min = parent.min().lerp(parent.max(), self.anchor_min) + self.offset_min;
        let max = parent.min().lerp(parent.max(), self.anchor_max) + self.offset_max;
        Rect::from_min_max(min, max)
    }
}

impl ToData for Layout {
    fn to_data(&self, node: &mut DataNode) {
        node.write("anchor_min", &self.anchor_min)
            .write("anchor_max", &self.anchor_max)
            .write("offset_min", &self.offset_min)
            .write("offset_max", &self.offset_max);
    }
}

impl FromData for Layout {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        let d = Layout::default();
        Ok(Layout {
            anchor_min: node.read_or("anchor_min", d.anchor_min),
            anchor_max: node.read_or("anchor_max", d.anchor_max),
            offset_min: node.read_or("offset_min", d.offset_min),
            offset_max: node.read_or("offset_max", d.offset_max),
        })
    }
}

/// Layout of a widget: anchors plus the sizing hints layout containers read.
/// A zero `max_size` axis means unbounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WidgetLayout {
    pub layout: Layout,
    pub min_size: Vec2,
    pub max_size: Vec2,
    pub weight: Vec2,
}

impl Default for WidgetLayout {
    fn default() -> Self {
        Self {
            layout: Layout::both_stretch(),
            min_size: Vec2::ZERO,
            max_size: Vec2::ZERO,
            weight: Vec2::ONE,
        }
    }
}

impl From<Layout> for WidgetLayout {
    fn from(layout: Layout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }
}

impl ToData for WidgetLayout {
    fn to_data(&self, node: &mut DataNode) {
        self.layout.to_data(node);
        node.write("min_size", &self.min_size)
            .write("max_size", &self.max_size)
            .write("weight", &self.weight);
    }
}

impl FromData for WidgetLayout {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        let d = WidgetLayout::default();
        Ok(WidgetLayout {
            layout: Layout::from_data(node)?,
            min_size: node.read_opt_or("min_size", d.min_size),
            max_size: node.read_opt_or("max_size", d.max_size),
            weight: node.read_opt_or("weight", d.weight),
        })
    }
}
