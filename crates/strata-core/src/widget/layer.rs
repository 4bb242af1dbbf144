use crate::{ActorId, DataNode, Layout, Rect, RectDrawable, TypeRegistry, Vec2};

/// Drawable slot of a widget. Layers nest; a child layer's rect is computed
/// from its parent layer's rect, a top-level layer's from the widget rect.
#[derive(Clone, Debug)]
pub struct WidgetLayer {
    pub name: String,
    pub enabled: bool,
    pub depth: f32,
    pub transparency: f32,
    pub layout: Layout,
    /// Hit area, relative to the layer rect.
    pub interactable_layout: Layout,
    pub drawable: Option<Box<dyn RectDrawable>>,
    children: Vec<WidgetLayer>,
    owner: Option<ActorId>,
    rect: Rect,
    interactable_rect: Rect,
}

impl Default for WidgetLayer {
    fn default() -> Self {
        Self {
            name: String::new(),
            enabled: true,
            depth: 0.0,
            transparency: 1.0,
            layout: Layout::both_stretch(),
            interactable_layout: Layout::both_stretch(),
            drawable: None,
            children: Vec::new(),
            owner: None,
            rect: Rect::ZERO,
            interactable_rect: Rect::ZERO,
        }
    }
}

impl WidgetLayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_drawable(mut self, drawable: impl RectDrawable) -> Self {
        self.drawable = Some(Box::new(drawable));
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_child(mut self, child: WidgetLayer) -> Self {
        self.children.push(child);
        self
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn interactable_rect(&self) -> Rect {
        self.interactable_rect
    }

    /// Widget this layer is attached to. The handle is weak: a layer copied
    /// out of a destroyed widget keeps a stale id, so check it with
    /// [`Scene::contains`](crate::Scene::contains).
    pub fn owner(&self) -> Option<ActorId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<ActorId>) {
        self.owner = owner;
        for c in &mut self.children {
            c.set_owner(owner);
        }
    }

    pub fn children(&self) -> &[WidgetLayer] {
        &self.children
    }

    pub fn add_child(&mut self, child: WidgetLayer) -> &mut WidgetLayer {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn remove_child(&mut self, name: &str) -> Option<WidgetLayer> {
        let idx = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(idx))
    }

    /// Direct child by name, or a descendant by slash path.
    pub fn child(&self, path: &str) -> Option<&WidgetLayer> {
        let (head, rest) = split_path(path);
        let c = self.children.iter().find(|c| c.name == head)?;
        match rest {
            Some(rest) => c.child(rest),
            None => Some(c),
        }
    }

    pub fn child_mut(&mut self, path: &str) -> Option<&mut WidgetLayer> {
        let (head, rest) = split_path(path);
        let c = self.children.iter_mut().find(|c| c.name == head)?;
        match rest {
            Some(rest) => c.child_mut(rest),
            None => Some(c),
        }
    }

    /// Depth-first search for the first descendant named `name`.
    pub fn find_child(&self, name: &str) -> Option<&WidgetLayer> {
        self.children
            .iter()
            .find_map(|c| if c.name == name { Some(c) } else { c.find_child(name) })
    }

    /// All descendants in depth-first order.
    pub fn all_children(&self) -> Vec<&WidgetLayer> {
        let mut out = Vec::new();
        for c in &self.children {
            out.push(c);
            out.extend(c.all_children());
        }
        out
    }

    pub fn drawable_as<T: RectDrawable>(&self) -> Option<&T> {
        self.drawable.as_ref()?.as_any().downcast_ref::<T>()
    }

    pub fn drawable_as_mut<T: RectDrawable>(&mut self) -> Option<&mut T> {
        self.drawable.as_mut()?.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<WidgetLayer> {
        &mut self.children
    }

    /// Recomputes this layer's rects from `parent` and recurses.
    pub(crate) fn update_rects(&mut self, parent: Rect) {
        self.rect = self.layout.calculate(parent);
        self.interactable_rect = self.interactable_layout.calculate(self.rect);
        if let Some(d) = self.drawable.as_mut() {
            d.set_rect(self.rect);
        }
        let rect = self.rect;
        for c in &mut self.children {
            c.update_rects(rect);
        }
    }

    pub(crate) fn update(&mut self, dt: f32) {
        if let Some(d) = self.drawable.as_mut() {
            d.update(dt);
        }
        for c in &mut self.children {
            c.update(dt);
        }
    }

    /// Hit test against the interactable rect only; the visual rect and the
    /// drawable's own shape do not count.
    pub fn is_under_point(&self, point: Vec2) -> bool {
        self.interactable_rect.contains(point)
    }

    pub fn serialize(&self, node: &mut DataNode) {
        node.write("name", &self.name)
            .write("enabled", &self.enabled)
            .write("depth", &self.depth)
            .write("transparency", &self.transparency)
            .write("layout", &self.layout)
            .write("interactable_layout", &self.interactable_layout);
        if let Some(d) = &self.drawable {
            let dn = node.node_mut("drawable");
            dn.write("type", d.type_name());
            d.serialize(dn.node_mut("data"));
        }
        if !self.children.is_empty() {
            let kids = node.node_mut("children");
            for c in &self.children {
                c.serialize(kids.add_node("layer"));
            }
        }
    }

    pub fn deserialize(node: &DataNode, registry: &TypeRegistry) -> WidgetLayer {
        let d = WidgetLayer::default();
        let mut layer = WidgetLayer {
            name: node.read_or("name", String::new()),
            enabled: node.read_or("enabled", d.enabled),
            depth: node.read_or("depth", d.depth),
            transparency: node.read_or("transparency", d.transparency),
            layout: node.read_or("layout", d.layout),
            interactable_layout: node.read_opt_or("interactable_layout", d.interactable_layout),
            ..d
        };
        if let Some(dn) = node.child("drawable") {
            let kind: String = dn.read_or("type", String::new());
            match registry.make_drawable(&kind) {
                Ok(mut drawable) => {
                    if let Some(data) = dn.child("data") {
                        drawable.deserialize(data);
                    }
                    layer.drawable = Some(drawable);
                }
                Err(err) => log::warn!("layer `{}`: {err}; drawable dropped", layer.name),
            }
        }
        if let Some(kids) = node.child("children") {
            layer.children = kids
                .children
                .iter()
                .map(|c| WidgetLayer::deserialize(c, registry))
                .collect();
        }
        layer
    }
}

pub(crate) fn split_path(path: &str) -> (&str, Option<&str>) {
    let path = path.trim_matches('/');
    match path.split_once('/') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}
