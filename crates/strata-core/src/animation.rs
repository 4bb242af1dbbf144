//! Frame-stepped property animations.
//!
//! An [`Animation`] owns a normalized playhead (`rel_time`, `0..=1`) and a set
//! of tracks. The scene advances it by `dt` every update and applies the
//! sampled values to the widget the animation is bound to.

use crate::{ActorId, Color, DataError, DataNode, FromData, ToData, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Spring { damping: f32, stiffness: f32 },
}

impl Easing {
    pub fn interpolate(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::Spring { damping, stiffness } => {
                let omega = (stiffness / damping).sqrt();
                let zeta = damping / (2.0 * (stiffness * damping).sqrt());

                if t >= 1.0 {
                    1.0
                } else if zeta < 1.0 {
                    let omega_d = omega * (1.0 - zeta * zeta).sqrt();
                    let t = t * 2.0;
                    1.0 - ((-zeta * omega * t).exp() * (omega_d * t).cos())
                } else {
                    t * (2.0 - t)
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease_in",
            Easing::EaseOut => "ease_out",
            Easing::EaseInOut => "ease_in_out",
            Easing::Spring { .. } => "spring",
        }
    }
}

impl ToData for Easing {
    fn to_data(&self, node: &mut DataNode) {
        self.name().to_data(node);
        if let Easing::Spring { damping, stiffness } = self {
            node.write("damping", damping).write("stiffness", stiffness);
        }
    }
}

impl FromData for Easing {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        let name = String::from_data(node)?;
        Ok(match name.as_str() {
            "linear" => Easing::Linear,
            "ease_in" => Easing::EaseIn,
            "ease_out" => Easing::EaseOut,
            "ease_in_out" => Easing::EaseInOut,
            "spring" => Easing::Spring {
                damping: node.read_or("damping", 0.8),
                stiffness: node.read_or("stiffness", 200.0),
            },
            _ => {
                return Err(DataError::UnknownType {
                    kind: "easing",
                    name,
                });
            }
        })
    }
}

pub trait Interpolate {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for Vec2 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self.lerp(*other, Vec2::splat(t))
    }
}

impl Interpolate for Color {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Color(
            (self.0 as f32 + (other.0 as f32 - self.0 as f32) * t) as u8,
            (self.1 as f32 + (other.1 as f32 - self.1 as f32) * t) as u8,
            (self.2 as f32 + (other.2 as f32 - self.2 as f32) * t) as u8,
            (self.3 as f32 + (other.3 as f32 - self.3 as f32) * t) as u8,
        )
    }
}

/// Widget property an animation track drives, addressed by path:
/// `transparency`, `layers/<layer path>/transparency` or
/// `children/<child path>/transparency`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnimatedProperty {
    Transparency,
    LayerTransparency(String),
    ChildTransparency(String),
}

impl AnimatedProperty {
    pub fn parse(path: &str) -> Option<Self> {
        if path == "transparency" {
            return Some(AnimatedProperty::Transparency);
        }
        let inner = |prefix: &str| {
            path.strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix("/transparency"))
                .filter(|p| !p.is_empty())
                .map(str::to_string)
        };
        inner("layers/")
            .map(AnimatedProperty::LayerTransparency)
            .or_else(|| inner("children/").map(AnimatedProperty::ChildTransparency))
    }

    pub fn path(&self) -> String {
        match self {
            AnimatedProperty::Transparency => "transparency".to_string(),
            AnimatedProperty::LayerTransparency(p) => format!("layers/{p}/transparency"),
            AnimatedProperty::ChildTransparency(p) => format!("children/{p}/transparency"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimationTrack {
    pub property: AnimatedProperty,
    pub from: f32,
    pub to: f32,
}

impl AnimationTrack {
    pub fn value_at(&self, t: f32) -> f32 {
        self.from.interpolate(&self.to, t)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    pub duration: f32,
    pub easing: Easing,
    tracks: Vec<AnimationTrack>,
    rel_time: f32,
    heading: Option<f32>,
    target: Option<ActorId>,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(0.3, Easing::EaseInOut)
    }
}

impl Animation {
    pub fn new(duration: f32, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            tracks: Vec::new(),
            rel_time: 0.0,
            heading: None,
            target: None,
        }
    }

    /// Adds a track. Paths that don't name an animatable property are
    /// dropped with a warning.
    pub fn with_track(mut self, path: &str, from: f32, to: f32) -> Self {
        self.add_track(path, from, to);
        self
    }

    pub fn add_track(&mut self, path: &str, from: f32, to: f32) -> bool {
        match AnimatedProperty::parse(path) {
            Some(property) => {
                self.tracks.push(AnimationTrack { property, from, to });
                true
            }
            None => {
                log::warn!("animation track `{path}` does not name an animatable property");
                false
            }
        }
    }

    pub fn tracks(&self) -> &[AnimationTrack] {
        &self.tracks
    }

    pub fn rel_time(&self) -> f32 {
        self.rel_time
    }

    /// Moves the playhead without playing.
    pub fn set_rel_time(&mut self, t: f32) {
        self.rel_time = t.clamp(0.0, 1.0);
        self.heading = None;
    }

    pub fn play_forward(&mut self) {
        self.heading = Some(1.0);
    }

    pub fn play_backward(&mut self) {
        self.heading = Some(0.0);
    }

    pub fn is_playing(&self) -> bool {
        self.heading.is_some()
    }

    /// Widget whose properties the tracks drive.
    pub fn target(&self) -> Option<ActorId> {
        self.target
    }

    pub fn bind(&mut self, target: ActorId) {
        self.target = Some(target);
    }

    /// Advances the playhead. Returns `true` when it moved.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(goal) = self.heading else {
            return false;
        };
        let step = if self.duration <= 0.0 {
            1.0
        } else {
            dt / self.duration
        };
        let before = self.rel_time;
        self.rel_time = if goal > self.rel_time {
            (self.rel_time + step).min(goal)
        } else {
            (self.rel_time - step).max(goal)
        };
        if self.rel_time == goal {
            self.heading = None;
        }
        self.rel_time != before
    }

    pub fn eased_time(&self) -> f32 {
        self.easing.interpolate(self.rel_time)
    }

    /// Current value of every track.
    pub fn sample(&self) -> impl Iterator<Item = (&AnimatedProperty, f32)> + '_ {
        let t = self.eased_time();
        self.tracks.iter().map(move |tr| (&tr.property, tr.value_at(t)))
    }
}

impl ToData for Animation {
    fn to_data(&self, node: &mut DataNode) {
        node.write("duration", &self.duration)
            .write("easing", &self.easing);
        let tracks = node.node_mut("tracks");
        for tr in &self.tracks {
            tracks
                .add_node("track")
                .write("path", &tr.property.path())
                .write("from", &tr.from)
                .write("to", &tr.to);
        }
    }
}

impl FromData for Animation {
    fn from_data(node: &DataNode) -> Result<Self, DataError> {
        let mut anim = Animation::new(
            node.read_or("duration", 0.3),
            node.read_or("easing", Easing::EaseInOut),
        );
        if let Some(tracks) = node.child("tracks") {
            for tr in &tracks.children {
                let path: String = tr.read_or("path", String::new());
                anim.add_track(&path, tr.read_or("from", 0.0), tr.read_or("to", 1.0));
            }
        }
        Ok(anim)
    }
}
