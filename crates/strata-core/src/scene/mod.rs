//! The actor arena and everything that mutates it.
//!
//! `Scene` owns every actor (and its optional widget part) in a generational
//! arena. [`ActorId`]s are weak handles: after [`Scene::destroy`] they stop
//! resolving and mutating calls report [`SceneError::StaleHandle`].

mod hierarchy;
mod input;
mod layout_pass;
mod persist;
mod render;
mod widget_ops;

pub use persist::PropertyChange;

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::{
    Basis, Component, ComponentId, DrawableKey, FrameStats, SceneConfig, SceneError, SceneLayer,
    SceneResult, Transform, TypeRegistry, Widget,
};

slotmap::new_key_type! {
    /// Weak handle to an actor in a [`Scene`].
    pub struct ActorId;
}

pub const DEFAULT_LAYER: &str = "Default";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActorCreateMode {
    #[default]
    InScene,
    /// Kept out of update, draw and layer registration; used for prototypes.
    NotInScene,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct Dirty: u8 {
        const LAYOUT = 1;
        const LAYER_SEQUENCE = 1 << 1;
    }
}

pub(crate) struct ComponentSlot {
    pub(crate) id: ComponentId,
    pub(crate) enabled: bool,
    pub(crate) res_enabled: bool,
    pub(crate) registered: Option<(String, f32)>,
    pub(crate) component: Box<dyn Component>,
}

pub struct Actor {
    pub(crate) uid: u64,
    pub(crate) name: String,
    pub(crate) enabled: bool,
    pub(crate) res_enabled: bool,
    pub(crate) on_scene: bool,
    pub(crate) parent: Option<ActorId>,
    pub(crate) internal: bool,
    pub(crate) children: Vec<ActorId>,
    pub(crate) components: Vec<ComponentSlot>,
    pub(crate) next_component: u32,
    pub(crate) layer: String,
    pub(crate) prototype: Option<ActorId>,
    pub(crate) transform: Transform,
    pub(crate) world_matrix: Basis,
    pub(crate) world_basis: Basis,
    pub(crate) dirty: Dirty,
    pub(crate) registered: Option<String>,
    pub(crate) widget: Option<Widget>,
}

impl Actor {
    fn new(uid: u64, name: &str, on_scene: bool, widget: Option<Widget>) -> Self {
        Self {
            uid,
            name: name.to_string(),
            enabled: true,
            res_enabled: true,
            on_scene,
            parent: None,
            internal: false,
            children: Vec::new(),
            components: Vec::new(),
            next_component: 0,
            layer: DEFAULT_LAYER.to_string(),
            prototype: None,
            transform: Transform::default(),
            world_matrix: Basis::IDENTITY,
            world_basis: Basis::IDENTITY,
            dirty: Dirty::empty(),
            registered: None,
            widget,
        }
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enabled and every ancestor enabled.
    pub fn is_res_enabled(&self) -> bool {
        self.res_enabled
    }

    pub fn is_on_scene(&self) -> bool {
        self.on_scene
    }

    pub fn parent(&self) -> Option<ActorId> {
        self.parent
    }

    /// Whether this widget is an internal widget of its parent.
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn children(&self) -> &[ActorId] {
        &self.children
    }

    pub fn layer_name(&self) -> &str {
        &self.layer
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Frame children are placed in, resolved by the layout pass.
    pub fn world_matrix(&self) -> Basis {
        self.world_matrix
    }

    /// Maps the unit square onto the actor's rect in world space.
    pub fn world_basis(&self) -> Basis {
        self.world_basis
    }

    pub fn widget(&self) -> Option<&Widget> {
        self.widget.as_ref()
    }

    pub fn is_widget(&self) -> bool {
        self.widget.is_some()
    }

    pub fn component_ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.iter().map(|c| c.id)
    }

    pub(crate) fn slot(&self, cid: ComponentId) -> Option<&ComponentSlot> {
        self.components.iter().find(|c| c.id == cid)
    }

    pub(crate) fn slot_mut(&mut self, cid: ComponentId) -> Option<&mut ComponentSlot> {
        self.components.iter_mut().find(|c| c.id == cid)
    }
}

pub struct Scene {
    actors: SlotMap<ActorId, Actor>,
    roots: Vec<ActorId>,
    layers: Vec<SceneLayer>,
    uids: HashMap<u64, ActorId>,
    next_uid: u64,
    config: SceneConfig,
    registry: TypeRegistry,
    dirty: Vec<ActorId>,
    focused: Option<ActorId>,
    hovered: Option<ActorId>,
    pressed: Option<ActorId>,
    stats: FrameStats,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            actors: SlotMap::with_key(),
            roots: Vec::new(),
            layers: vec![SceneLayer::new(DEFAULT_LAYER)],
            uids: HashMap::new(),
            next_uid: 1,
            config,
            registry: TypeRegistry::default(),
            dirty: Vec::new(),
            focused: None,
            hovered: None,
            pressed: None,
            stats: FrameStats::default(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Changing the view rect re-lays out every root.
    pub fn set_view_rect(&mut self, rect: crate::Rect) {
        self.config.view_rect = rect;
        for id in self.roots.clone() {
            self.set_layout_dirty(id);
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    pub fn widget(&self, id: ActorId) -> Option<&Widget> {
        self.actors.get(id)?.widget.as_ref()
    }

    pub fn roots(&self) -> &[ActorId] {
        &self.roots
    }

    pub fn focused(&self) -> Option<ActorId> {
        self.focused
    }

    pub(crate) fn check(&self, id: ActorId) -> SceneResult<()> {
        if self.actors.contains_key(id) {
            Ok(())
        } else {
            Err(SceneError::StaleHandle(id))
        }
    }

    pub(crate) fn actor_mut(&mut self, id: ActorId) -> SceneResult<&mut Actor> {
        self.actors.get_mut(id).ok_or(SceneError::StaleHandle(id))
    }

    pub(crate) fn widget_mut(&mut self, id: ActorId) -> SceneResult<&mut Widget> {
        self.actors
            .get_mut(id)
            .ok_or(SceneError::StaleHandle(id))?
            .widget
            .as_mut()
            .ok_or(SceneError::NotAWidget(id))
    }

    fn alloc_uid(&mut self, wanted: Option<u64>) -> u64 {
        if let Some(uid) = wanted.filter(|u| *u != 0 && !self.uids.contains_key(u)) {
            self.next_uid = self.next_uid.max(uid + 1);
            return uid;
        }
        while self.uids.contains_key(&self.next_uid) {
            self.next_uid += 1;
        }
        let uid = self.next_uid;
        self.next_uid += 1;
        uid
    }

    pub(crate) fn insert_actor(
        &mut self,
        name: &str,
        mode: ActorCreateMode,
        widget: Option<Widget>,
        uid: Option<u64>,
    ) -> ActorId {
        let uid = self.alloc_uid(uid);
        let on_scene = mode == ActorCreateMode::InScene;
        let id = self.actors.insert(Actor::new(uid, name, on_scene, widget));
        self.uids.insert(uid, id);
        self.roots.push(id);
        self.sync_drawables(id);
        self.set_layout_dirty(id);
        id
    }

    pub fn create_actor(&mut self, name: &str, mode: ActorCreateMode) -> ActorId {
        self.insert_actor(name, mode, None, None)
    }

    pub fn create_widget(&mut self, name: &str, mode: ActorCreateMode) -> ActorId {
        self.insert_actor(name, mode, Some(Widget::default()), None)
    }

    /// Destroys `id`, its children, internal widgets and components.
    pub fn destroy(&mut self, id: ActorId) -> SceneResult<()> {
        self.check(id)?;
        let parent = self.actors[id].parent;
        self.detach(id);
        let doomed = self.subtree(id);
        log::debug!("destroying {} actor(s) under {id:?}", doomed.len());
        for x in &doomed {
            self.unregister_all(*x);
        }
        for x in doomed {
            if self.focused == Some(x) {
                self.focused = None;
            }
            if self.hovered == Some(x) {
                self.hovered = None;
            }
            if self.pressed == Some(x) {
                self.pressed = None;
            }
            if let Some(actor) = self.actors.remove(x) {
                self.uids.remove(&actor.uid);
            }
        }
        if let Some(p) = parent {
            self.after_child_removed(p, id);
        }
        Ok(())
    }

    /// `id` followed by all descendants (children, then internal widgets),
    /// depth first.
    pub fn subtree(&self, id: ActorId) -> Vec<ActorId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(x) = stack.pop() {
            let Some(actor) = self.actors.get(x) else {
                continue;
            };
            out.push(x);
            let internal = actor.widget.as_ref().map(|w| w.internal_widgets.as_slice()).unwrap_or(&[]);
            stack.extend(internal.iter().rev());
            stack.extend(actor.children.iter().rev());
        }
        out
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: ActorId) -> impl Iterator<Item = ActorId> + '_ {
        std::iter::successors(self.actors.get(id).and_then(|a| a.parent), move |p| {
            self.actors.get(*p).and_then(|a| a.parent)
        })
    }

    /// `true` when `ancestor` is on `id`'s parent chain.
    pub fn is_ancestor_of(&self, ancestor: ActorId, id: ActorId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    pub fn set_name(&mut self, id: ActorId, name: &str) -> SceneResult<()> {
        self.actor_mut(id)?.name = name.to_string();
        Ok(())
    }

    pub fn set_enabled(&mut self, id: ActorId, enabled: bool) -> SceneResult<()> {
        let actor = self.actor_mut(id)?;
        if actor.enabled == enabled {
            return Ok(());
        }
        actor.enabled = enabled;
        self.update_res_enabled(id);
        if let Some(p) = self.parent_widget(id) {
            self.set_layout_dirty(p);
        }
        Ok(())
    }

    /// Edits the local transform of a plain actor.
    pub fn edit_transform(&mut self, id: ActorId, f: impl FnOnce(&mut Transform)) -> SceneResult<()> {
        let actor = self.actor_mut(id)?;
        if actor.widget.is_some() {
            return Err(SceneError::DerivedTransform(id));
        }
        f(&mut actor.transform);
        self.set_layout_dirty(id);
        Ok(())
    }

    pub fn find_by_uid(&self, uid: u64) -> Option<ActorId> {
        self.uids.get(&uid).copied()
    }

    /// Root actor by name, then descendants by slash path.
    pub fn find_actor(&self, path: &str) -> Option<ActorId> {
        let (head, rest) = crate::widget::split_path(path);
        let root = self
            .roots
            .iter()
            .copied()
            .find(|r| self.actors.get(*r).is_some_and(|a| a.name == head))?;
        match rest {
            Some(rest) => self.find_child(root, rest),
            None => Some(root),
        }
    }

    /// Descendant of `id` by slash path of names. Each segment matches a
    /// child first, then an internal widget.
    pub fn find_child(&self, id: ActorId, path: &str) -> Option<ActorId> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(id, |cur, seg| {
                let actor = self.actors.get(cur)?;
                let internal = actor.widget.as_ref().map(|w| w.internal_widgets.as_slice()).unwrap_or(&[]);
                actor
                    .children
                    .iter()
                    .chain(internal)
                    .copied()
                    .find(|c| self.actors.get(*c).is_some_and(|a| a.name == seg))
            })
    }

    /// First descendant named `name`, depth first.
    pub fn find_descendant(&self, id: ActorId, name: &str) -> Option<ActorId> {
        self.subtree(id)
            .into_iter()
            .skip(1)
            .find(|x| self.actors.get(*x).is_some_and(|a| a.name == name))
    }

    // Scene layers

    pub fn scene_layers(&self) -> &[SceneLayer] {
        &self.layers
    }

    pub fn scene_layer(&self, name: &str) -> Option<&SceneLayer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    /// Appends a layer. A taken name gets `_` appended until unique; the
    /// final name is returned.
    pub fn add_scene_layer(&mut self, name: &str) -> String {
        let mut name = name.to_string();
        while self.scene_layer(&name).is_some() {
            name.push('_');
        }
        self.layers.push(SceneLayer::new(name.clone()));
        name
    }

    /// Removes a layer, moving its actors to the default layer. The default
    /// layer can't be removed.
    pub fn remove_scene_layer(&mut self, name: &str) -> bool {
        if name == DEFAULT_LAYER || self.scene_layer(name).is_none() {
            return false;
        }
        let movers: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|(_, a)| a.layer == name)
            .map(|(id, _)| id)
            .collect();
        for id in movers {
            let _ = self.set_scene_layer(id, DEFAULT_LAYER);
        }
        self.layers.retain(|l| l.name() != name);
        true
    }

    pub fn rename_scene_layer(&mut self, from: &str, to: &str) -> bool {
        if self.scene_layer(to).is_some() {
            return false;
        }
        let Some(layer) = self.layers.iter_mut().find(|l| l.name() == from) else {
            return false;
        };
        layer.set_name(to.to_string());
        for actor in self.actors.values_mut() {
            if actor.layer == from {
                actor.layer = to.to_string();
            }
            if actor.registered.as_deref() == Some(from) {
                actor.registered = Some(to.to_string());
            }
            for slot in &mut actor.components {
                if let Some((layer, _)) = slot.registered.as_mut().filter(|(l, _)| l == from) {
                    *layer = to.to_string();
                }
            }
        }
        true
    }

    /// Moves the actor's drawables to layer `name`, creating it when absent.
    pub fn set_scene_layer(&mut self, id: ActorId, name: &str) -> SceneResult<()> {
        let actor = self.actor_mut(id)?;
        if actor.layer == name {
            return Ok(());
        }
        actor.layer = name.to_string();
        if self.scene_layer(name).is_none() {
            self.layers.push(SceneLayer::new(name));
        }
        self.sync_drawables(id);
        Ok(())
    }

    fn scene_layer_mut(&mut self, name: &str) -> &mut SceneLayer {
        let idx = match self.layers.iter().position(|l| l.name() == name) {
            Some(i) => i,
            None => {
                self.layers.push(SceneLayer::new(name));
                self.layers.len() - 1
            }
        };
        &mut self.layers[idx]
    }

    pub fn include_in_scene(&mut self, id: ActorId) -> SceneResult<()> {
        self.check(id)?;
        self.set_on_scene(id, true);
        Ok(())
    }

    pub fn exclude_from_scene(&mut self, id: ActorId) -> SceneResult<()> {
        self.check(id)?;
        self.set_on_scene(id, false);
        Ok(())
    }

    pub(crate) fn set_on_scene(&mut self, id: ActorId, on_scene: bool) {
        for x in self.subtree(id) {
            if let Some(a) = self.actors.get_mut(x) {
                a.on_scene = on_scene;
            }
            self.sync_drawables(x);
        }
    }

    // Components

    pub fn add_component(&mut self, id: ActorId, component: Box<dyn Component>) -> SceneResult<ComponentId> {
        let actor = self.actor_mut(id)?;
        let cid = ComponentId(actor.next_component);
        actor.next_component += 1;
        let res_enabled = actor.res_enabled;
        actor.components.push(ComponentSlot {
            id: cid,
            enabled: true,
            res_enabled,
            registered: None,
            component,
        });
        self.sync_drawables(id);
        Ok(cid)
    }

    pub fn remove_component(&mut self, id: ActorId, cid: ComponentId) -> Option<Box<dyn Component>> {
        let actor = self.actors.get_mut(id)?;
        let idx = actor.components.iter().position(|c| c.id == cid)?;
        let slot = actor.components.remove(idx);
        if let Some((layer, _)) = slot.registered {
            self.scene_layer_mut(&layer).unregister(DrawableKey::Component(id, cid));
        }
        Some(slot.component)
    }

    pub fn component(&self, id: ActorId, cid: ComponentId) -> Option<&dyn Component> {
        Some(self.actors.get(id)?.slot(cid)?.component.as_ref())
    }

    pub fn find_component<T: Component>(&self, id: ActorId) -> Option<&T> {
        self.actors
            .get(id)?
            .components
            .iter()
            .find_map(|c| c.component.as_any().downcast_ref::<T>())
    }

    /// Mutates a component in place; drawing depth changes are picked up
    /// afterwards.
    pub fn edit_component<T: Component, R>(
        &mut self,
        id: ActorId,
        cid: ComponentId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let slot = self.actors.get_mut(id)?.slot_mut(cid)?;
        let out = f(slot.component.as_any_mut().downcast_mut::<T>()?);
        self.sync_drawables(id);
        Some(out)
    }

    pub fn is_component_enabled(&self, id: ActorId, cid: ComponentId) -> Option<bool> {
        Some(self.actors.get(id)?.slot(cid)?.res_enabled)
    }

    pub fn set_component_enabled(&mut self, id: ActorId, cid: ComponentId, enabled: bool) -> SceneResult<()> {
        let actor = self.actor_mut(id)?;
        let parent_res = actor.res_enabled;
        if let Some(slot) = actor.slot_mut(cid) {
            slot.enabled = enabled;
            slot.res_enabled = enabled && parent_res;
        }
        self.sync_drawables(id);
        Ok(())
    }

    /// Reconciles the layer registrations of `id`'s widget and drawable
    /// components with its current state. Layer membership only changes on
    /// an actual transition.
    pub(crate) fn sync_drawables(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get(id) else {
            return;
        };
        let has_widget_parent = actor.parent.is_some_and(|p| self.actors.get(p).is_some_and(|a| a.widget.is_some()));
        let layer_name = actor.layer.clone();
        let res_enabled = actor.res_enabled;
        let on_scene = actor.on_scene;

        let widget_want = actor
            .widget
            .as_ref()
            .filter(|w| on_scene && (w.override_depth || !has_widget_parent))
            .map(|w| w.drawing_depth);
        let current = actor.registered.clone();
        let key = DrawableKey::Widget(id);
        if let Some(cur) = current.as_deref() {
            if widget_want.is_none() || cur != layer_name {
                self.scene_layer_mut(cur).unregister(key);
            }
        }
        if let Some(depth) = widget_want {
            let layer = self.scene_layer_mut(&layer_name);
            if layer.contains(key) {
                layer.set_enabled(key, depth, res_enabled);
            } else {
                layer.register(key, depth, res_enabled);
            }
        }
        if let Some(actor) = self.actors.get_mut(id) {
            actor.registered = widget_want.map(|_| layer_name.clone());
        }

        let slots: Vec<(ComponentId, Option<(String, f32)>, Option<f32>, bool)> = self.actors[id]
            .components
            .iter()
            .map(|c| {
                let want = (on_scene && c.component.is_drawable()).then(|| c.component.drawing_depth());
                (c.id, c.registered.clone(), want, c.res_enabled)
            })
            .collect();
        for (cid, current, want, enabled) in slots {
            let key = DrawableKey::Component(id, cid);
            if let Some((cur, _)) = current.as_ref() {
                if want.is_none() || *cur != layer_name {
                    self.scene_layer_mut(cur).unregister(key);
                }
            }
            if let Some(depth) = want {
                let layer = self.scene_layer_mut(&layer_name);
                if layer.contains(key) {
                    if current.as_ref().is_some_and(|(_, d)| *d != depth) {
                        layer.depth_changed(key, depth);
                    }
                    layer.set_enabled(key, depth, enabled);
                } else {
                    layer.register(key, depth, enabled);
                }
            }
            if let Some(slot) = self.actors.get_mut(id).and_then(|a| a.slot_mut(cid)) {
                slot.registered = want.map(|d| (layer_name.clone(), d));
            }
        }
    }

    fn unregister_all(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        let widget = actor.registered.take();
        let comps: Vec<(ComponentId, String)> = actor
            .components
            .iter_mut()
            .filter_map(|c| c.registered.take().map(|(l, _)| (c.id, l)))
            .collect();
        if let Some(layer) = widget {
            self.scene_layer_mut(&layer).unregister(DrawableKey::Widget(id));
        }
        for (cid, layer) in comps {
            self.scene_layer_mut(&layer).unregister(DrawableKey::Component(id, cid));
        }
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}
