//! Horizontal and vertical arrangement of child widgets.
//!
//! The container builds a throwaway taffy flex tree from its children's
//! sizing hints each time its own layout is resolved, then writes the
//! resulting boxes back as absolute child layouts.

use std::any::Any;

use strata_core::{ActorId, DataNode, Layout, Rect, Scene, Vec2, WidgetBehavior};
use taffy::TaffyTree;
use taffy::prelude::{auto, length};
use taffy::style::{AlignItems, AvailableSpace, Dimension, Display, FlexDirection, JustifyContent, Style};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Corner (or edge) children are packed against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BaseCorner {
    Left,
    Right,
    Top,
    Bottom,
    Center,
    LeftBottom,
    #[default]
    LeftTop,
    RightBottom,
    RightTop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Align {
    Start,
    Center,
    End,
}

impl BaseCorner {
    const ALL: [BaseCorner; 9] = [
        BaseCorner::Left,
        BaseCorner::Right,
        BaseCorner::Top,
        BaseCorner::Bottom,
        BaseCorner::Center,
        BaseCorner::LeftBottom,
        BaseCorner::LeftTop,
        BaseCorner::RightBottom,
        BaseCorner::RightTop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BaseCorner::Left => "Left",
            BaseCorner::Right => "Right",
            BaseCorner::Top => "Top",
            BaseCorner::Bottom => "Bottom",
            BaseCorner::Center => "Center",
            BaseCorner::LeftBottom => "LeftBottom",
            BaseCorner::LeftTop => "LeftTop",
            BaseCorner::RightBottom => "RightBottom",
            BaseCorner::RightTop => "RightTop",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    fn horizontal(self) -> Align {
        match self {
            BaseCorner::Left | BaseCorner::LeftBottom | BaseCorner::LeftTop => Align::Start,
            BaseCorner::Right | BaseCorner::RightBottom | BaseCorner::RightTop => Align::End,
            BaseCorner::Top | BaseCorner::Bottom | BaseCorner::Center => Align::Center,
        }
    }

    fn vertical(self) -> Align {
        match self {
            BaseCorner::Top | BaseCorner::LeftTop | BaseCorner::RightTop => Align::Start,
            BaseCorner::Bottom | BaseCorner::LeftBottom | BaseCorner::RightBottom => Align::End,
            BaseCorner::Left | BaseCorner::Right | BaseCorner::Center => Align::Center,
        }
    }
}

/// Inner padding of a layout container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Border {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Border {
    pub fn all(v: f32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }
}

/// Arranges child widgets in a row or a column. Expanding axes share free
/// space by the children's weights within their min/max sizes; fixed axes
/// use each child's min size.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearLayout {
    pub axis: Axis,
    pub base_corner: BaseCorner,
    pub spacing: f32,
    pub border: Border,
    pub expand_width: bool,
    pub expand_height: bool,
}

#[allow(non_snake_case)]
pub fn HorizontalLayout() -> LinearLayout {
    LinearLayout::new(Axis::Horizontal)
}

#[allow(non_snake_case)]
pub fn VerticalLayout() -> LinearLayout {
    LinearLayout::new(Axis::Vertical)
}

impl LinearLayout {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            base_corner: BaseCorner::LeftTop,
            spacing: 0.0,
            border: Border::default(),
            expand_width: true,
            expand_height: true,
        }
    }

    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn base_corner(mut self, corner: BaseCorner) -> Self {
        self.base_corner = corner;
        self
    }

    pub fn expand(mut self, width: bool, height: bool) -> Self {
        self.expand_width = width;
        self.expand_height = height;
        self
    }

    fn is_horizontal(&self) -> bool {
        self.axis == Axis::Horizontal
    }

    /// Child boxes relative to the container's children rect, in child
    /// order.
    pub fn arrange(&self, size: Vec2, children: &[ChildHints]) -> Result<Vec<Rect>, taffy::TaffyError> {
        let mut tree: TaffyTree<()> = TaffyTree::new();
        tree.disable_rounding();

        let (main_align, cross_align) = match self.axis {
            Axis::Horizontal => (self.base_corner.horizontal(), self.base_corner.vertical()),
            Axis::Vertical => (self.base_corner.vertical(), self.base_corner.horizontal()),
        };
        let (expand_main, expand_cross) = match self.axis {
            Axis::Horizontal => (self.expand_width, self.expand_height),
            Axis::Vertical => (self.expand_height, self.expand_width),
        };

        let mut nodes = Vec::with_capacity(children.len());
        for hints in children {
            nodes.push(tree.new_leaf(self.child_style(hints, expand_main, expand_cross))?);
        }

        let container = Style {
            display: Display::Flex,
            flex_direction: if self.is_horizontal() {
                FlexDirection::Row
            } else {
                FlexDirection::Column
            },
            justify_content: Some(match main_align {
                Align::Start => JustifyContent::FlexStart,
                Align::Center => JustifyContent::Center,
                Align::End => JustifyContent::FlexEnd,
            }),
            align_items: Some(match (expand_cross, cross_align) {
                (true, _) => AlignItems::Stretch,
                (false, Align::Start) => AlignItems::FlexStart,
                (false, Align::Center) => AlignItems::Center,
                (false, Align::End) => AlignItems::FlexEnd,
            }),
            size: taffy::geometry::Size {
                width: length(size.x.max(0.0)),
                height: length(size.y.max(0.0)),
            },
            padding: taffy::geometry::Rect {
                left: length(self.border.left),
                right: length(self.border.right),
                top: length(self.border.top),
                bottom: length(self.border.bottom),
            },
            gap: taffy::geometry::Size {
                width: length(if self.is_horizontal() { self.spacing } else { 0.0 }),
                height: length(if self.is_horizontal() { 0.0 } else { self.spacing }),
            },
            ..Default::default()
        };
        let root = tree.new_with_children(container, &nodes)?;
        tree.compute_layout(
            root,
            taffy::geometry::Size {
                width: AvailableSpace::Definite(size.x.max(0.0)),
                height: AvailableSpace::Definite(size.y.max(0.0)),
            },
        )?;

        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            let l = tree.layout(node)?;
            out.push(Rect::new(l.location.x, l.location.y, l.size.width, l.size.height));
        }
        Ok(out)
    }

    fn child_style(&self, hints: &ChildHints, expand_main: bool, expand_cross: bool) -> Style {
        let (min_main, min_cross) = self.split(hints.min_size);
        let (max_main, max_cross) = self.split(hints.max_size);
        let (weight_main, _) = self.split(hints.weight);
        let bounded = |v: f32| -> Dimension { if v > 0.0 { length(v) } else { auto() } };

        let (main_size, main_min, main_max, grow, shrink, basis) = if expand_main {
            (auto(), length(min_main), bounded(max_main), weight_main.max(0.0), 1.0, length(0.0))
        } else {
            (length(min_main), length(min_main), length(min_main), 0.0, 0.0, auto())
        };
        let (cross_size, cross_min, cross_max) = if expand_cross {
            (auto(), length(min_cross), bounded(max_cross))
        } else {
            (length(min_cross), length(min_cross), length(min_cross))
        };

        let size = |main: Dimension, cross: Dimension| match self.axis {
            Axis::Horizontal => taffy::geometry::Size { width: main, height: cross },
            Axis::Vertical => taffy::geometry::Size { width: cross, height: main },
        };
        Style {
            size: size(main_size, cross_size),
            min_size: size(main_min, cross_min),
            max_size: size(main_max, cross_max),
            flex_grow: grow,
            flex_shrink: shrink,
            flex_basis: basis,
            ..Default::default()
        }
    }

    /// `(main, cross)` components of `v` for this axis.
    fn split(&self, v: Vec2) -> (f32, f32) {
        match self.axis {
            Axis::Horizontal => (v.x, v.y),
            Axis::Vertical => (v.y, v.x),
        }
    }

    /// Smallest container size that fits every arranged child's min size.
    fn content_min_size(&self, children: &[ChildHints]) -> Vec2 {
        let gaps = self.spacing * children.len().saturating_sub(1) as f32;
        let main: f32 = children.iter().map(|c| self.split(c.min_size).0).sum::<f32>() + gaps;
        let cross = children
            .iter()
            .map(|c| self.split(c.min_size).1)
            .fold(0.0, f32::max);
        let (main_border, cross_border) = self.split(Vec2::new(
            self.border.left + self.border.right,
            self.border.top + self.border.bottom,
        ));
        match self.axis {
            Axis::Horizontal => Vec2::new(main + main_border, cross + cross_border),
            Axis::Vertical => Vec2::new(cross + cross_border, main + main_border),
        }
    }
}

/// Sizing hints read from a child widget's layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChildHints {
    pub min_size: Vec2,
    pub max_size: Vec2,
    pub weight: Vec2,
}

fn arranged_children(scene: &Scene, id: ActorId) -> Vec<(ActorId, ChildHints)> {
    let Some(w) = scene.widget(id) else {
        return Vec::new();
    };
    w.child_widgets()
        .iter()
        .filter_map(|c| {
            let actor = scene.actor(*c)?;
            let cw = actor.widget()?;
            if !actor.is_enabled() || !cw.is_visible() {
                return None;
            }
            let l = cw.layout();
            Some((
                *c,
                ChildHints {
                    min_size: l.min_size,
                    max_size: l.max_size,
                    weight: l.weight,
                },
            ))
        })
        .collect()
}

impl WidgetBehavior for LinearLayout {
    fn type_name(&self) -> &'static str {
        match self.axis {
            Axis::Horizontal => "HorizontalLayout",
            Axis::Vertical => "VerticalLayout",
        }
    }

    fn clone_box(&self) -> Box<dyn WidgetBehavior> {
        Box::new(self.clone())
    }

    fn on_layout_updated(&mut self, scene: &mut Scene, id: ActorId) {
        let Some(area) = scene.widget(id).map(|w| w.children_rect()) else {
            return;
        };
        let children = arranged_children(scene, id);
        let hints: Vec<ChildHints> = children.iter().map(|(_, h)| *h).collect();
        let boxes = match self.arrange(area.size(), &hints) {
            Ok(boxes) => boxes,
            Err(err) => {
                log::warn!("{} {id:?}: arrangement failed: {err}", self.type_name());
                return;
            }
        };
        for ((child, _), rect) in children.iter().zip(boxes) {
            if let Err(err) = scene.set_layout(*child, Layout::absolute(rect)) {
                log::warn!("{} {id:?}: {err}", self.type_name());
            }
        }

        let min = self.content_min_size(&hints);
        let current = scene.widget(id).map(|w| w.layout().min_size);
        if current != Some(min) {
            let _ = scene.set_min_size(id, min);
        }
    }

    fn serialize(&self, node: &mut DataNode) {
        node.write("base_corner", self.base_corner.name())
            .write("spacing", &self.spacing)
            .write("border_left", &self.border.left)
            .write("border_top", &self.border.top)
            .write("border_right", &self.border.right)
            .write("border_bottom", &self.border.bottom)
            .write("expand_width", &self.expand_width)
            .write("expand_height", &self.expand_height);
    }

    fn deserialize(&mut self, node: &DataNode) {
        let corner: String = node.read_opt_or("base_corner", self.base_corner.name().to_string());
        self.base_corner = BaseCorner::from_name(&corner).unwrap_or_else(|| {
            log::warn!("unknown base corner `{corner}`");
            BaseCorner::default()
        });
        self.spacing = node.read_opt_or("spacing", self.spacing);
        self.border = Border {
            left: node.read_opt_or("border_left", 0.0),
            top: node.read_opt_or("border_top", 0.0),
            right: node.read_opt_or("border_right", 0.0),
            bottom: node.read_opt_or("border_bottom", 0.0),
        };
        self.expand_width = node.read_opt_or("expand_width", self.expand_width);
        self.expand_height = node.read_opt_or("expand_height", self.expand_height);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
