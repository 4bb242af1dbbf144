use std::fmt;
use std::rc::Rc;

use crate::{ActorId, Animation, DataNode};

pub type Callback = Rc<dyn Fn()>;

/// Edge reported by [`WidgetState::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateEvent {
    /// Playhead left zero while the state is true.
    BecameTrue,
    /// Playhead reached zero while the state is false.
    FullyFalse,
}

/// Named boolean driving an animation forward (true) or backward (false).
/// Each transition reports its edge exactly once.
#[derive(Clone)]
pub struct WidgetState {
    pub name: String,
    pub animation: Animation,
    state: bool,
    true_fired: bool,
    false_fired: bool,
    pub on_state_becomes_true: Option<Callback>,
    pub on_state_fully_false: Option<Callback>,
}

impl fmt::Debug for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetState")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("rel_time", &self.animation.rel_time())
            .finish()
    }
}

impl WidgetState {
    pub fn new(name: impl Into<String>, animation: Animation) -> Self {
        Self {
            name: name.into(),
            animation,
            state: false,
            true_fired: false,
            false_fired: true,
            on_state_becomes_true: None,
            on_state_fully_false: None,
        }
    }

    pub fn state(&self) -> bool {
        self.state
    }

    pub fn set_state(&mut self, state: bool) {
        if state == self.state {
            return;
        }
        self.state = state;
        if state {
            self.true_fired = false;
            self.animation.play_forward();
        } else {
            self.false_fired = false;
            self.animation.play_backward();
        }
    }

    /// Snaps the animation to the end for `state` without reporting edges.
    pub fn set_state_forcible(&mut self, state: bool) {
        self.state = state;
        self.animation.set_rel_time(if state { 1.0 } else { 0.0 });
        self.true_fired = state;
        self.false_fired = !state;
    }

    /// Advances the animation. Returns `(moved, edge)`.
    pub fn update(&mut self, dt: f32) -> (bool, Option<StateEvent>) {
        let moved = self.animation.update(dt);
        let rel = self.animation.rel_time();
        let edge = if self.state && !self.true_fired && rel > 0.0 {
            self.true_fired = true;
            if let Some(cb) = &self.on_state_becomes_true {
                cb();
            }
            Some(StateEvent::BecameTrue)
        } else if !self.state && !self.false_fired && rel <= 0.0 {
            self.false_fired = true;
            if let Some(cb) = &self.on_state_fully_false {
                cb();
            }
            Some(StateEvent::FullyFalse)
        } else {
            None
        };
        (moved, edge)
    }

    pub(crate) fn bind(&mut self, target: ActorId) {
        self.animation.bind(target);
    }

    pub fn serialize(&self, node: &mut DataNode) {
        node.write("name", &self.name)
            .write("state", &self.state)
            .write("animation", &self.animation);
    }

    pub fn deserialize(node: &DataNode) -> WidgetState {
        let mut s = WidgetState::new(
            node.read_or("name", String::new()),
            node.read_or("animation", Animation::default()),
        );
        s.set_state_forcible(node.read_or("state", false));
        s
    }
}
