//! Actor trees to and from [`DataNode`]s, plus prototype links.
//!
//! Loading is forgiving: a malformed field falls back to its default with a
//! warning and unknown component or behavior types are skipped.

use crate::scene::Dirty;
use crate::{
    ActorCreateMode, ActorId, DataNode, Scene, SceneError, SceneResult, Transform, Widget, WidgetLayer,
    WidgetLayout, WidgetState,
};

/// A field whose instance value differs from its prototype's.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChange {
    /// Slash path of field names, e.g. `widget/transparency`.
    pub path: String,
    pub prototype: DataNode,
    pub instance: DataNode,
}

/// Fields that identify an actor rather than describe it.
const IDENTITY_FIELDS: &[&str] = &["uid", "prototype", "children", "internal_widgets", "on_scene"];

struct LoadCtx {
    fresh_uids: bool,
    links: Vec<(ActorId, u64)>,
}

impl Scene {
    /// Serializes `id` and its subtree.
    pub fn serialize_actor(&self, id: ActorId) -> Option<DataNode> {
        let mut node = DataNode::new("actor");
        self.write_actor(id, &mut node)?;
        Some(node)
    }

    fn write_actor(&self, id: ActorId, node: &mut DataNode) -> Option<()> {
        let actor = self.actors.get(id)?;
        node.write("uid", &actor.uid)
            .write("name", &actor.name)
            .write("enabled", &actor.enabled)
            .write("layer", &actor.layer);
        if let Some(proto) = actor.prototype.and_then(|p| self.actors.get(p)) {
            node.write("prototype", &proto.uid);
        }
        if actor.widget.is_none() {
            node.write("transform", &actor.transform);
        }
        if !actor.components.is_empty() {
            let comps = node.node_mut("components");
            for slot in &actor.components {
                let c = comps.add_node("component");
                c.write("type", slot.component.type_name())
                    .write("enabled", &slot.enabled);
                slot.component.serialize(c.node_mut("data"));
            }
        }
        if let Some(w) = &actor.widget {
            self.write_widget(w, node.node_mut("widget"));
        }
        if !actor.children.is_empty() {
            let kids = node.node_mut("children");
            for c in &actor.children {
                self.write_actor(*c, kids.add_node("actor"));
            }
        }
        Some(())
    }

    fn write_widget(&self, w: &Widget, node: &mut DataNode) {
        node.write("layout", &w.layout)
            .write("override_depth", &w.override_depth)
            .write("drawing_depth", &w.drawing_depth)
            .write("transparency", &w.transparency)
            .write("visible", &w.visible)
            .write("focusable", &w.focusable);
        if !w.layers.is_empty() {
            let layers = node.node_mut("layers");
            for l in &w.layers {
                l.serialize(layers.add_node("layer"));
            }
        }
        if !w.states.is_empty() {
            let states = node.node_mut("states");
            for s in &w.states {
                s.serialize(states.add_node("state"));
            }
        }
        if let Some(b) = &w.behavior {
            let bn = node.node_mut("behavior");
            bn.write("type", b.type_name());
            b.serialize(bn.node_mut("data"));
        }
        if !w.internal_widgets.is_empty() {
            let kids = node.node_mut("internal_widgets");
            for c in &w.internal_widgets {
                self.write_actor(*c, kids.add_node("actor"));
            }
        }
    }

    /// Rebuilds an actor tree from `node`, attaching it under `parent`.
    /// Persisted uids are kept when free and prototype links are resolved
    /// by uid once the whole tree is loaded.
    pub fn deserialize_actor(
        &mut self,
        node: &DataNode,
        parent: Option<ActorId>,
        mode: ActorCreateMode,
    ) -> SceneResult<ActorId> {
        if let Some(p) = parent {
            self.check(p)?;
        }
        let mut ctx = LoadCtx {
            fresh_uids: false,
            links: Vec::new(),
        };
        let id = self.load_actor(node, parent, false, mode, &mut ctx)?;
        self.resolve_prototype_links(ctx.links);
        Ok(id)
    }

    fn load_actor(
        &mut self,
        node: &DataNode,
        parent: Option<ActorId>,
        internal: bool,
        mode: ActorCreateMode,
        ctx: &mut LoadCtx,
    ) -> SceneResult<ActorId> {
        let uid = match ctx.fresh_uids {
            true => None,
            false => Some(node.read_opt_or("uid", 0u64)),
        };
        let name: String = node.read_or("name", String::new());
        let widget = node.child("widget").map(|_| Widget::default());
        let id = self.insert_actor(&name, mode, widget, uid);
        match parent {
            Some(p) if internal => self.add_internal_widget(p, id)?,
            Some(p) => self.add_child(p, id, None)?,
            None => {}
        }
        self.apply_fields(id, node)?;

        if let Some(proto) = node.read_opt::<u64>("prototype").ok().flatten() {
            ctx.links.push((id, proto));
        }
        if let Some(kids) = node.child("children") {
            for c in &kids.children {
                self.load_actor(c, Some(id), false, mode, ctx)?;
            }
        }
        if let Some(wn) = node.child("widget") {
            if let Some(kids) = wn.child("internal_widgets") {
                for c in &kids.children {
                    self.load_actor(c, Some(id), true, mode, ctx)?;
                }
            }
            self.load_behavior(id, wn)?;
        }
        Ok(id)
    }

    /// Applies an actor's own fields: everything except identity, children
    /// and behavior.
    fn apply_fields(&mut self, id: ActorId, node: &DataNode) -> SceneResult<()> {
        self.set_name(id, &node.read_or("name", String::new()))?;
        self.set_scene_layer(id, &node.read_opt_or("layer", crate::DEFAULT_LAYER.to_string()))?;
        self.set_enabled(id, node.read_opt_or("enabled", true))?;
        if !self.actors[id].is_widget() {
            let transform: Transform = node.read_opt_or("transform", Transform::default());
            self.actors[id].transform = transform;
            self.set_layout_dirty(id);
        }

        for cid in self.actors[id].component_ids().collect::<Vec<_>>() {
            self.remove_component(id, cid);
        }
        if let Some(comps) = node.child("components") {
            for c in &comps.children {
                let kind: String = c.read_or("type", String::new());
                let mut component = match self.registry.make_component(&kind) {
                    Ok(component) => component,
                    Err(err) => {
                        log::warn!("actor `{}`: {err}; component skipped", self.actors[id].name);
                        continue;
                    }
                };
                if let Some(data) = c.child("data") {
                    component.deserialize(data);
                }
                let cid = self.add_component(id, component)?;
                self.set_component_enabled(id, cid, c.read_opt_or("enabled", true))?;
            }
        }

        let Some(wn) = node.child("widget") else {
            return Ok(());
        };
        let d = Widget::default();
        self.set_widget_layout(id, wn.read_opt_or("layout", WidgetLayout::default()))?;
        self.remove_all_layers(id)?;
        if let Some(layers) = wn.child("layers") {
            for l in &layers.children {
                let layer = WidgetLayer::deserialize(l, &self.registry);
                self.add_layer(id, layer)?;
            }
        }
        self.set_depth_overridden(id, wn.read_opt_or("override_depth", d.override_depth))?;
        self.set_drawing_depth(id, wn.read_opt_or("drawing_depth", d.drawing_depth))?;
        self.set_transparency(id, wn.read_opt_or("transparency", d.transparency))?;
        self.set_focusable(id, wn.read_opt_or("focusable", d.focusable))?;

        self.remove_all_states(id)?;
        if let Some(states) = wn.child("states") {
            for s in &states.children {
                self.add_state(id, WidgetState::deserialize(s))?;
            }
        }
        self.set_visible_forcible(id, wn.read_opt_or("visible", d.visible))?;
        self.actor_mut(id)?.dirty.insert(Dirty::LAYER_SEQUENCE);
        self.set_layout_dirty(id);
        Ok(())
    }

    fn load_behavior(&mut self, id: ActorId, widget_node: &DataNode) -> SceneResult<()> {
        let Some(bn) = widget_node.child("behavior") else {
            return Ok(());
        };
        let kind: String = bn.read_or("type", String::new());
        match self.registry.make_behavior(&kind) {
            Ok(mut behavior) => {
                if let Some(data) = bn.child("data") {
                    behavior.deserialize(data);
                }
                self.set_behavior(id, behavior)
            }
            Err(err) => {
                log::warn!("widget `{}`: {err}; behavior skipped", self.actors[id].name);
                Ok(())
            }
        }
    }

    fn resolve_prototype_links(&mut self, links: Vec<(ActorId, u64)>) {
        for (id, uid) in links {
            let proto = self.find_by_uid(uid);
            if proto.is_none() {
                log::warn!("prototype uid {uid} not found");
            }
            if let Some(a) = self.actors.get_mut(id) {
                a.prototype = proto;
            }
        }
    }

    /// Serializes every scene layer name and root actor.
    pub fn save(&self) -> DataNode {
        let mut node = DataNode::new("scene");
        let layers = node.node_mut("layers");
        for l in &self.layers {
            layers.add_node("layer").set(l.name());
        }
        let actors = node.node_mut("actors");
        for root in &self.roots {
            let a = actors.add_node("actor");
            if self.write_actor(*root, a).is_some() {
                a.write("on_scene", &self.actors[*root].on_scene);
            }
        }
        node
    }

    /// Loads layers and root actors saved by [`save`](Self::save) into this
    /// scene. Returns the new roots.
    pub fn load(&mut self, node: &DataNode) -> SceneResult<Vec<ActorId>> {
        if let Some(layers) = node.child("layers") {
            for l in &layers.children {
                let name: String = l.get()?;
                if self.scene_layer(&name).is_none() {
                    self.add_scene_layer(&name);
                }
            }
        }
        let mut ctx = LoadCtx {
            fresh_uids: false,
            links: Vec::new(),
        };
        let mut roots = Vec::new();
        if let Some(actors) = node.child("actors") {
            for a in &actors.children {
                let mode = match a.read_opt_or("on_scene", true) {
                    true => ActorCreateMode::InScene,
                    false => ActorCreateMode::NotInScene,
                };
                roots.push(self.load_actor(a, None, false, mode, &mut ctx)?);
            }
        }
        self.resolve_prototype_links(ctx.links);
        log::info!("loaded {} root actor(s)", roots.len());
        Ok(roots)
    }

    pub fn save_json(&self) -> SceneResult<String> {
        Ok(self.save().to_json()?)
    }

    pub fn load_json(&mut self, json: &str) -> SceneResult<Vec<ActorId>> {
        self.load(&DataNode::from_json(json)?)
    }

    /// Deep copies `proto` into the scene as a new root with fresh uids.
    /// Every copied actor is linked to the actor it was copied from.
    /// Callbacks are not copied.
    pub fn instantiate(&mut self, proto: ActorId) -> SceneResult<ActorId> {
        let node = self.serialize_actor(proto).ok_or(SceneError::StaleHandle(proto))?;
        let mut ctx = LoadCtx {
            fresh_uids: true,
            links: Vec::new(),
        };
        let id = self.load_actor(&node, None, false, ActorCreateMode::InScene, &mut ctx)?;
        for (src, copy) in self.subtree(proto).into_iter().zip(self.subtree(id)) {
            self.actors[copy].prototype = Some(src);
        }
        Ok(id)
    }

    /// The live actor `id` was instantiated from.
    pub fn prototype(&self, id: ActorId) -> Option<ActorId> {
        self.actors.get(id)?.prototype.filter(|p| self.contains(*p))
    }

    /// Own fields where `id` differs from its prototype. Children are
    /// compared through their own links.
    pub fn prototype_changes(&self, id: ActorId) -> SceneResult<Vec<PropertyChange>> {
        self.check(id)?;
        let proto = self.prototype(id).ok_or(SceneError::NoPrototype(id))?;
        let (Some(p), Some(i)) = (self.own_fields(proto), self.own_fields(id)) else {
            return Err(SceneError::StaleHandle(proto));
        };
        let mut out = Vec::new();
        diff_children("", &p, &i, &mut out);
        Ok(out)
    }

    /// Re-applies the prototype's own fields and behavior to `id`. Children
    /// and uid are left alone.
    pub fn revert_to_prototype(&mut self, id: ActorId) -> SceneResult<()> {
        self.check(id)?;
        let proto = self.prototype(id).ok_or(SceneError::NoPrototype(id))?;
        let node = self.own_fields(proto).ok_or(SceneError::StaleHandle(proto))?;
        self.apply_fields(id, &node)?;
        if let Some(wn) = node.child("widget") {
            if self.actors[id].is_widget() {
                self.load_behavior(id, wn)?;
            }
        }
        log::debug!("reverted {id:?} to {proto:?}");
        Ok(())
    }

    fn own_fields(&self, id: ActorId) -> Option<DataNode> {
        let mut node = self.serialize_actor(id)?;
        node.children.retain(|c| !IDENTITY_FIELDS.contains(&c.name.as_str()));
        if let Some(w) = node.child_mut("widget") {
            w.children.retain(|c| !IDENTITY_FIELDS.contains(&c.name.as_str()));
        }
        Some(node)
    }
}

fn diff_children(path: &str, proto: &DataNode, inst: &DataNode, out: &mut Vec<PropertyChange>) {
    let mut names: Vec<&str> = proto.children.iter().map(|c| c.name.as_str()).collect();
    for c in &inst.children {
        if !names.contains(&c.name.as_str()) {
            names.push(&c.name);
        }
    }
    for name in names {
        let field = if path.is_empty() { name.to_string() } else { format!("{path}/{name}") };
        match (proto.child(name), inst.child(name)) {
            (Some(p), Some(i)) => diff_node(&field, p, i, out),
            (p, i) => out.push(PropertyChange {
                prototype: p.cloned().unwrap_or_else(|| DataNode::new(name)),
                instance: i.cloned().unwrap_or_else(|| DataNode::new(name)),
                path: field,
            }),
        }
    }
}

fn diff_node(path: &str, proto: &DataNode, inst: &DataNode, out: &mut Vec<PropertyChange>) {
    if proto == inst {
        return;
    }
    let unique_names = {
        let mut seen: Vec<&str> = proto.children.iter().map(|c| c.name.as_str()).collect();
        seen.sort_unstable();
        seen.windows(2).all(|w| w[0] != w[1])
    };
    let nested = !proto.children.is_empty() && !inst.children.is_empty() && proto.value == inst.value;
    if nested && unique_names {
        diff_children(path, proto, inst, out);
    } else {
        out.push(PropertyChange {
            path: path.to_string(),
            prototype: proto.clone(),
            instance: inst.clone(),
        });
    }
}
