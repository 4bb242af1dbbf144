use std::any::Any;

use strata_core::{
    ActorCreateMode, ActorId, Color, DataNode, Layout, Rect, Scene, Sprite, Vec2, WidgetBehavior, WidgetLayer,
};

pub const SCROLLBAR: &str = "scrollbar";
pub const SCROLLBAR_HANDLE: &str = "handle";

/// Clips its children to its rect and offsets them by a scroll position.
/// A vertical scrollbar is kept as an internal widget and shown only while
/// the content overflows.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollArea {
    pub scroll: Vec2,
    pub scroll_speed: f32,
    pub bar_width: f32,
    max_scroll: Vec2,
    content: Rect,
}

impl Default for ScrollArea {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            scroll_speed: 30.0,
            bar_width: 6.0,
            max_scroll: Vec2::ZERO,
            content: Rect::ZERO,
        }
    }
}

impl ScrollArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_scroll(&self) -> Vec2 {
        self.max_scroll
    }

    /// Content bounds in unscrolled coordinates, as of the last layout.
    pub fn content_rect(&self) -> Rect {
        self.content
    }

    fn clamped(&self, scroll: Vec2) -> Vec2 {
        scroll.max(Vec2::ZERO).min(self.max_scroll)
    }

    /// Sets the scroll position of the `ScrollArea` on `id`, clamped to the
    /// content. Returns the applied position.
    pub fn scroll_to(scene: &mut Scene, id: ActorId, scroll: Vec2) -> Option<Vec2> {
        scene.edit_behavior::<ScrollArea, _>(id, |area| {
            area.scroll = area.clamped(scroll);
            area.scroll
        })
    }

    fn ensure_scrollbar(scene: &mut Scene, id: ActorId, width: f32) -> Option<ActorId> {
        if let Some(bar) = scene.internal_widget(id, SCROLLBAR) {
            return Some(bar);
        }
        let mode = if scene.actor(id)?.is_on_scene() {
            ActorCreateMode::InScene
        } else {
            ActorCreateMode::NotInScene
        };
        let bar = scene.create_widget(SCROLLBAR, mode);
        let built = scene
            .add_internal_widget(id, bar)
            .and_then(|_| scene.set_layout(bar, Layout::vertical_stretch(1.0, width, 0.0, 0.0)))
            .and_then(|_| {
                scene.add_layer(
                    bar,
                    WidgetLayer::new("back").with_drawable(Sprite::new(Color(0, 0, 0, 60))),
                )
            })
            .and_then(|_| {
                scene.add_layer(
                    bar,
                    WidgetLayer::new(SCROLLBAR_HANDLE)
                        .with_drawable(Sprite::new(Color(200, 200, 200, 255)).with_radius(width * 0.5))
                        .with_depth(1.0),
                )
            })
            .and_then(|_| scene.set_visible_forcible(bar, false));
        if let Err(err) = built {
            log::warn!("scroll area {id:?}: failed to build scrollbar: {err}");
            let _ = scene.destroy(bar);
            return None;
        }
        Some(bar)
    }

    fn update_scrollbar(&self, scene: &mut Scene, id: ActorId, view: Rect) {
        let Some(bar) = scene.internal_widget(id, SCROLLBAR) else {
            return;
        };
        let overflow = self.max_scroll.y > 0.0 && self.content.h > 0.0;
        let _ = scene.set_visible(bar, overflow);
        if !overflow {
            return;
        }
        let top = (self.scroll.y / self.content.h).clamp(0.0, 1.0);
        let bottom = ((self.scroll.y + view.h) / self.content.h).clamp(top, 1.0);
        let handle = Layout::new(Vec2::new(0.0, top), Vec2::new(1.0, bottom), Vec2::ZERO, Vec2::ZERO);
        let unchanged = scene
            .widget(bar)
            .and_then(|w| w.layer(SCROLLBAR_HANDLE))
            .is_some_and(|l| l.layout == handle);
        if !unchanged {
            let _ = scene.edit_layer(bar, SCROLLBAR_HANDLE, |l| l.layout = handle);
        }
    }
}

/// World rect of the area and the union of it with every enabled child
/// widget's unscrolled rect, relative to the area's top-left.
fn measure(scene: &Scene, id: ActorId) -> Option<(Rect, Rect)> {
    let w = scene.widget(id)?;
    let view = w.world_rect();
    let bounds = w
        .child_widgets()
        .iter()
        .filter_map(|c| {
            let actor = scene.actor(*c)?;
            let cw = actor.widget()?;
            (actor.is_enabled() && cw.is_visible()).then(|| cw.layout().layout.calculate(view))
        })
        .fold(view, |acc, r| acc.union(&r));
    Some((view, bounds.translate(-view.min())))
}

impl WidgetBehavior for ScrollArea {
    fn type_name(&self) -> &'static str {
        "ScrollArea"
    }

    fn clone_box(&self) -> Box<dyn WidgetBehavior> {
        Box::new(self.clone())
    }

    fn on_attached(&mut self, scene: &mut Scene, id: ActorId) {
        Self::ensure_scrollbar(scene, id, self.bar_width);
    }

    fn children_rect(&self, world_rect: Rect) -> Rect {
        world_rect.translate(-self.scroll)
    }

    fn clip_children(&self) -> bool {
        true
    }

    fn update(&mut self, scene: &mut Scene, id: ActorId, _dt: f32) {
        // Child layouts can change without dirtying this widget.
        if let Some((_, content)) = measure(scene, id) {
            if content != self.content {
                scene.set_layout_dirty(id);
            }
        }
    }

    fn on_layout_updated(&mut self, scene: &mut Scene, id: ActorId) {
        let Some((view, content)) = measure(scene, id) else {
            return;
        };
        self.content = content;
        self.max_scroll = (content.max() - view.size()).max(Vec2::ZERO);

        let clamped = self.clamped(self.scroll);
        if clamped != self.scroll {
            log::debug!("scroll area {id:?}: clamping scroll to {clamped:?}");
            self.scroll = clamped;
            scene.set_layout_dirty(id);
        }
        self.update_scrollbar(scene, id, view);
    }

    fn on_cursor_scrolled(&mut self, scene: &mut Scene, id: ActorId, delta: Vec2) -> bool {
        let next = self.clamped(self.scroll - delta * self.scroll_speed);
        if next == self.scroll {
            return false;
        }
        self.scroll = next;
        scene.set_layout_dirty(id);
        true
    }

    fn serialize(&self, node: &mut DataNode) {
        node.write("scroll", &self.scroll)
            .write("scroll_speed", &self.scroll_speed)
            .write("bar_width", &self.bar_width);
    }

    fn deserialize(&mut self, node: &DataNode) {
        self.scroll = node.read_opt_or("scroll", self.scroll);
        self.scroll_speed = node.read_opt_or("scroll_speed", self.scroll_speed);
        self.bar_width = node.read_opt_or("bar_width", self.bar_width);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
