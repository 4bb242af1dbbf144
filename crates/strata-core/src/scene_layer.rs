use crate::{ActorId, ComponentId};

/// Registered top-level drawable: a widget root (or depth-overridden widget),
/// or a drawable component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawableKey {
    Widget(ActorId),
    Component(ActorId, ComponentId),
}

impl DrawableKey {
    pub fn actor(&self) -> ActorId {
        match *self {
            DrawableKey::Widget(id) | DrawableKey::Component(id, _) => id,
        }
    }
}

/// Named drawing layer. Keeps every registered drawable plus a depth-sorted
/// list of the enabled ones.
#[derive(Clone, Debug)]
pub struct SceneLayer {
    name: String,
    drawables: Vec<DrawableKey>,
    enabled: Vec<(f32, DrawableKey)>,
}

/// Below this many candidates the insertion point is found by a linear scan.
const LINEAR_SCAN_RANGE: usize = 5;

impl SceneLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            drawables: Vec::new(),
            enabled: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn drawables(&self) -> &[DrawableKey] {
        &self.drawables
    }

    /// Enabled drawables in draw order.
    pub fn enabled_drawables(&self) -> impl Iterator<Item = DrawableKey> + '_ {
        self.enabled.iter().map(|(_, k)| *k)
    }

    pub fn enabled_depths(&self) -> impl Iterator<Item = f32> + '_ {
        self.enabled.iter().map(|(d, _)| *d)
    }

    pub fn contains(&self, key: DrawableKey) -> bool {
        self.drawables.contains(&key)
    }

    pub fn is_enabled(&self, key: DrawableKey) -> bool {
        self.enabled.iter().any(|(_, k)| *k == key)
    }

    pub(crate) fn register(&mut self, key: DrawableKey, depth: f32, enabled: bool) {
        if self.contains(key) {
            return;
        }
        self.drawables.push(key);
        if enabled {
            self.insert_enabled(key, depth);
        }
    }

    pub(crate) fn unregister(&mut self, key: DrawableKey) {
        self.drawables.retain(|k| *k != key);
        self.remove_enabled(key);
    }

    pub(crate) fn set_enabled(&mut self, key: DrawableKey, depth: f32, enabled: bool) {
        if !self.contains(key) {
            return;
        }
        let present = self.is_enabled(key);
        if enabled && !present {
            self.insert_enabled(key, depth);
        } else if !enabled && present {
            self.remove_enabled(key);
        }
    }

    pub(crate) fn depth_changed(&mut self, key: DrawableKey, depth: f32) {
        if self.is_enabled(key) {
            self.remove_enabled(key);
            self.insert_enabled(key, depth);
        }
    }

    fn remove_enabled(&mut self, key: DrawableKey) {
        self.enabled.retain(|(_, k)| *k != key);
    }

    /// Inserts after every entry with depth `<= depth`, so equal depths keep
    /// registration order.
    fn insert_enabled(&mut self, key: DrawableKey, depth: f32) {
        let (mut lo, mut hi) = (0, self.enabled.len());
        while hi - lo > LINEAR_SCAN_RANGE {
            let mid = lo + (hi - lo) / 2;
            if self.enabled[mid].0 <= depth {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        let pos = (lo..hi)
            .find(|&i| self.enabled[i].0 > depth)
            .unwrap_or(hi);
        self.enabled.insert(pos, (depth, key));
    }
}
