use crate::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    Space,
    F(u8),
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub is_repeat: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
            is_repeat: false,
        }
    }
}

/// Input fed to [`Scene::handle_input`](crate::Scene::handle_input).
/// Positions are in scene space.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    CursorMoved(Vec2),
    CursorPressed(Vec2),
    CursorReleased(Vec2),
    CursorScrolled { position: Vec2, delta: Vec2 },
    KeyPressed(KeyEvent),
    KeyReleased(KeyEvent),
}
