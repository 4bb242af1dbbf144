use std::fmt::Write as _;

use web_time::Instant;

use strata_core::{ActorId, Color, DrawCommand, DrawList, Rect, Scene};


#[derive(Clone, Debug, PartialEq)]
pub struct HudConfig {
    /// Outline every drawn widget rect.
    pub debug_frames: bool,
    pub show_stats: bool,
    pub frame_color: Color,
    pub hovered_color: Color,
    pub text_color: Color,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            debug_frames: false,
            show_stats: true,
            frame_color: Color::from_hex("#FF44AA"),
            hovered_color: Color::from_hex("#44AAFF"),
            text_color: Color::from_hex("#AAAAAA"),
        }
    }
}

pub struct Hud {
    pub config: HudConfig,
    pub hovered: Option<ActorId>,
    frame_count: u64,
    last_frame: Option<Instant>,
    fps_smooth: f32,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new(HudConfig::default())
    }
}

impl Hud {
    pub fn new(config: HudConfig) -> Self {
        Self {
            config,
            hovered: None,
            frame_count: 0,
            last_frame: None,
            fps_smooth: 0.0,
        }
    }

    pub fn toggle_debug_frames(&mut self) {
        self.config.debug_frames = !self.config.debug_frames;
    }

    pub fn set_hovered(&mut self, id: Option<ActorId>) {
        self.hovered = id;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f32 {
        self.fps_smooth
    }

    fn tick(&mut self) {
        self.frame_count += 1;
        let now = Instant::now();
        if let Some(prev) = self.last_frame.replace(now) {
            let dt = (now - prev).as_secs_f32();
            if dt > 0.0 {
                let fps = 1.0 / dt;
                // simple EMA
                let a = 0.2;
                self.fps_smooth = if self.fps_smooth == 0.0 {
                    fps
                } else {
                    (1.0 - a) * self.fps_smooth + a * fps
                };
            }
        }
    }

    /// Appends the overlay for the frame just drawn from `scene` to `out`.
    /// Call after [`Scene::frame`] so stats and draw order are current.
    pub fn overlay(&mut self, scene: &Scene, out: &mut DrawList) {
        self.tick();

        if self.config.debug_frames {
            for id in scene.draw_order() {
                let Some(w) = scene.widget(id) else {
                    continue;
                };
                out.push(DrawCommand::Border {
                    rect: w.world_rect(),
                    color: self.config.frame_color,
                    width: 1.0,
                    radius: 0.0,
                });
            }
        }

        if let Some(r) = self.hovered.and_then(|id| scene.widget(id)).map(|w| w.world_rect()) {
            out.push(DrawCommand::Border {
                rect: r,
                color: self.config.hovered_color,
                width: 2.0,
                radius: 0.0,
            });
        }

        if self.config.show_stats {
            let stats = scene.stats();
            let text = [
                format!("frame: {}", self.frame_count),
                format!("fps: {:.1}", self.fps_smooth),
                format!("actors: {}", scene.len()),
                format!("updated: {}", stats.actors_updated),
                format!("drawn: {}", stats.widgets_drawn),
                format!("layout passes: {}", stats.layout_passes),
                format!("commands: {}", stats.draw_commands),
            ]
            .join("  |  ");
            out.push(DrawCommand::Text {
                rect: Rect::new(8.0, 8.0, 480.0, 16.0),
                text,
                color: self.config.text_color,
                size: 14.0,
            });
        }
    }
}

/// Indented outline of every root actor's subtree, one actor per line.
/// Internal widgets are listed after children and tagged `internal`.
pub fn dump_tree(scene: &Scene) -> String {
    let mut out = String::new();
    for root in scene.roots() {
        dump_actor(scene, *root, 0, false, &mut out);
    }
    out
}

fn dump_actor(scene: &Scene, id: ActorId, depth: usize, internal: bool, out: &mut String) {
    let Some(actor) = scene.actor(id) else {
        return;
    };
    let _ = write!(out, "{:indent$}{}", "", actor.name(), indent = depth * 2);
    if let Some(w) = actor.widget() {
        let r = w.world_rect();
        let _ = write!(out, " [{:.0} {:.0} {:.0} {:.0}]", r.x, r.y, r.w, r.h);
        if !w.is_visible() {
            out.push_str(" hidden");
        }
        if w.is_focused() {
            out.push_str(" focused");
        }
        if let Some(b) = w.behavior() {
            let _ = write!(out, " <{}>", b.type_name());
        }
    }
    if !actor.is_enabled() {
        out.push_str(" disabled");
    }
    if internal {
        out.push_str(" internal");
    }
    out.push('\n');

    for child in actor.children() {
        dump_actor(scene, *child, depth + 1, false, out);
    }
    if let Some(w) = actor.widget() {
        for iw in w.internal_widgets() {
            dump_actor(scene, *iw, depth + 1, true, out);
        }
    }
}
