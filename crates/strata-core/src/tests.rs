use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::*;

fn boxed(scene: &mut Scene, name: &str, parent: Option<ActorId>, layout: Layout) -> ActorId {
    let id = scene.create_widget(name, ActorCreateMode::InScene);
    scene.set_layout(id, layout).unwrap();
    if let Some(p) = parent {
        scene.add_child(p, id, None).unwrap();
    }
    id
}

fn sprite(name: &str, depth: f32, color: Color) -> WidgetLayer {
    WidgetLayer::new(name)
        .with_depth(depth)
        .with_drawable(Sprite::new(color))
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixed(x: f32, y: f32, w: f32, h: f32) -> Layout {
    Layout::fixed(Vec2::ZERO, Vec2::new(w, h), Vec2::new(x, y))
}

fn colors(list: &DrawList) -> Vec<Color> {
    list.commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Rect { color, .. } => Some(*color),
            _ => None,
        })
        .collect()
}

#[test]
fn test_cycle_is_rejected_and_tree_unchanged() {
    let mut scene = Scene::default();
    let a = scene.create_actor("a", ActorCreateMode::InScene);
    let b = scene.create_actor("b", ActorCreateMode::InScene);
    let c = scene.create_actor("c", ActorCreateMode::InScene);
    scene.add_child(a, b, None).unwrap();
    scene.add_child(b, c, None).unwrap();

    let err = scene.add_child(c, a, None).unwrap_err();
    assert!(matches!(err, SceneError::CycleDetected { child, parent } if child == a && parent == c));
    assert!(matches!(scene.add_child(a, a, None), Err(SceneError::SelfParent(_))));

    assert_eq!(scene.roots(), &[a]);
    assert_eq!(scene.actor(a).unwrap().children(), &[b]);
    assert_eq!(scene.actor(c).unwrap().parent(), Some(b));
    assert!(scene.actor(c).unwrap().children().is_empty());
}

#[test]
fn test_reparent_keeps_index_and_updates_old_parent() {
    let mut scene = Scene::default();
    let p = boxed(&mut scene, "p", None, fixed(0.0, 0.0, 100.0, 100.0));
    let q = boxed(&mut scene, "q", None, fixed(0.0, 0.0, 100.0, 100.0));
    let x = boxed(&mut scene, "x", Some(p), Layout::both_stretch());
    let y = boxed(&mut scene, "y", Some(q), Layout::both_stretch());

    scene.add_child(q, x, Some(0)).unwrap();
    assert!(scene.widget(p).unwrap().child_widgets().is_empty());
    assert_eq!(scene.widget(q).unwrap().child_widgets(), &[x, y]);

    scene.set_index_in_siblings(x, 5).unwrap();
    assert_eq!(scene.actor(q).unwrap().children(), &[y, x]);
}

#[test]
fn test_disabled_subtree_leaves_draw_list() {
    let mut scene = Scene::default();
    let root = boxed(&mut scene, "root", None, fixed(0.0, 0.0, 100.0, 100.0));
    let child = boxed(&mut scene, "child", Some(root), Layout::both_stretch_with(10.0, 10.0, 10.0, 10.0));
    scene.add_layer(root, sprite("back", 0.0, Color::WHITE)).unwrap();
    scene.add_layer(child, sprite("back", 0.0, Color::BLACK)).unwrap();

    assert_eq!(scene.frame(0.016).draw_list.filled_rects().count(), 2);

    scene.set_enabled(root, false).unwrap();
    let layer = scene.scene_layer(DEFAULT_LAYER).unwrap();
    assert!(layer.contains(DrawableKey::Widget(root)));
    assert_eq!(layer.enabled_drawables().count(), 0);
    assert!(!scene.actor(child).unwrap().is_res_enabled());
    assert!(scene.actor(child).unwrap().is_enabled());
    assert!(scene.frame(0.016).draw_list.is_empty());

    scene.set_enabled(root, true).unwrap();
    assert!(scene.actor(child).unwrap().is_res_enabled());
    assert_eq!(scene.frame(0.016).draw_list.filled_rects().count(), 2);
}

#[test]
fn test_root_stretch_fills_view() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, Layout::both_stretch());
    scene.resolve_layouts();
    let view = scene.config().view_rect;
    assert_eq!(scene.widget(w).unwrap().world_rect(), view);
    assert_eq!(scene.actor(w).unwrap().transform().size(), view.size());
    assert_eq!(scene.actor(w).unwrap().transform().position(), view.center());
}

#[test]
fn test_three_level_chain_resolves_in_one_pass() {
    let mut scene = Scene::default();
    let a = boxed(&mut scene, "a", None, fixed(0.0, 0.0, 400.0, 300.0));
    let b = boxed(&mut scene, "b", Some(a), Layout::both_stretch_with(10.0, 10.0, 10.0, 10.0));
    let c = boxed(&mut scene, "c", Some(b), Layout::both_stretch());

    assert_eq!(scene.resolve_layouts(), 1);
    assert_eq!(scene.widget(c).unwrap().world_rect(), Rect::new(10.0, 10.0, 380.0, 280.0));
    assert!(!scene.is_layout_dirty(a));
    assert_eq!(scene.resolve_layouts(), 0);

    scene.set_layout(a, fixed(100.0, 0.0, 400.0, 300.0)).unwrap();
    assert_eq!(scene.resolve_layouts(), 1);
    assert_eq!(scene.widget(c).unwrap().world_rect().x, 110.0);
    assert_eq!(
        scene.widget(a).unwrap().bounds_with_children(),
        Rect::new(100.0, 0.0, 400.0, 300.0)
    );
}

#[test]
fn test_widget_transform_is_derived() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, Layout::both_stretch());
    let err = scene.edit_transform(w, |t| t.set_angle(1.0)).unwrap_err();
    assert!(matches!(err, SceneError::DerivedTransform(_)));
}

#[test]
fn test_plain_actor_follows_parent_widget() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(50.0, 20.0, 100.0, 100.0));
    let a = scene.create_actor("icon", ActorCreateMode::InScene);
    scene.add_child(w, a, None).unwrap();
    scene
        .edit_transform(a, |t| {
            t.set_position(Vec2::new(10.0, 10.0));
            t.set_size(Vec2::new(20.0, 20.0));
        })
        .unwrap();
    scene.resolve_layouts();
    let rect = scene.actor(a).unwrap().world_basis().aabb(Rect::new(0.0, 0.0, 1.0, 1.0));
    assert!(rect.approx_eq(&Rect::new(50.0, 20.0, 20.0, 20.0), 1e-4));
}

#[test]
fn test_layers_draw_around_children() {
    let mut scene = Scene::default();
    let root = boxed(&mut scene, "root", None, fixed(0.0, 0.0, 100.0, 100.0));
    let child = boxed(&mut scene, "child", Some(root), Layout::both_stretch());
    let red = Color::from_rgb(255, 0, 0);
    let green = Color::from_rgb(0, 255, 0);
    let blue = Color::from_rgb(0, 0, 255);
    scene.add_layer(root, sprite("top", 1000.0, blue)).unwrap();
    scene.add_layer(root, sprite("back", 0.0, red)).unwrap();
    scene.add_layer(child, sprite("fill", 0.0, green)).unwrap();

    let frame = scene.frame(0.016);
    assert_eq!(colors(&frame.draw_list), [red, green, blue]);
    assert_eq!(frame.stats.widgets_drawn, 2);
}

#[test]
fn test_overridden_depth_draws_from_scene_layer() {
    let mut scene = Scene::default();
    let root = boxed(&mut scene, "root", None, fixed(0.0, 0.0, 100.0, 100.0));
    let child = boxed(&mut scene, "child", Some(root), Layout::both_stretch());
    scene.set_drawing_depth(root, 20.0).unwrap();
    scene.resolve_layouts();
    assert_eq!(scene.draw_order(), [root, child]);

    scene.set_depth_overridden(child, true).unwrap();
    scene.set_drawing_depth(child, 10.0).unwrap();
    assert!(scene.widget(root).unwrap().drawing_children().is_empty());
    assert_eq!(scene.draw_order(), [child, root]);
}

#[test]
fn test_offscreen_widget_is_culled() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(5000.0, 5000.0, 10.0, 10.0));
    scene.add_layer(w, sprite("back", 0.0, Color::WHITE)).unwrap();
    assert!(scene.frame(0.016).draw_list.is_empty());
}

#[test]
fn test_component_depths_stay_sorted() {
    let mut scene = Scene::default();
    let mut ids = Vec::new();
    for (name, depth) in [("a", 5.0), ("b", 1.0), ("c", 3.0)] {
        let id = scene.create_actor(name, ActorCreateMode::InScene);
        scene.edit_transform(id, |t| t.set_size(Vec2::new(10.0, 10.0))).unwrap();
        let mut image = ImageComponent::new(Sprite::new(Color::WHITE));
        image.depth = depth;
        let cid = scene.add_component(id, Box::new(image)).unwrap();
        ids.push((id, cid));
    }
    let depths = |scene: &Scene| -> Vec<f32> {
        scene.scene_layer(DEFAULT_LAYER).unwrap().enabled_depths().collect()
    };
    assert_eq!(depths(&scene), [1.0, 3.0, 5.0]);

    let (a, acid) = ids[0];
    scene
        .edit_component::<ImageComponent, _>(a, acid, |c| c.depth = 0.0)
        .unwrap();
    assert_eq!(depths(&scene), [0.0, 1.0, 3.0]);
    let first = scene.scene_layer(DEFAULT_LAYER).unwrap().enabled_drawables().next();
    assert_eq!(first, Some(DrawableKey::Component(a, acid)));

    scene.set_component_enabled(a, acid, false).unwrap();
    assert_eq!(depths(&scene), [1.0, 3.0]);
    assert_eq!(scene.frame(0.016).draw_list.filled_rects().count(), 2);
}

#[test]
fn test_scene_layers_order_drawing() {
    let mut scene = Scene::default();
    let ui = scene.add_scene_layer("UI");
    assert_eq!(scene.add_scene_layer("UI"), "UI_");
    let front = boxed(&mut scene, "front", None, fixed(0.0, 0.0, 10.0, 10.0));
    let back = boxed(&mut scene, "back", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene.set_scene_layer(front, &ui).unwrap();
    scene.set_drawing_depth(front, -100.0).unwrap();
    scene.resolve_layouts();
    assert_eq!(scene.draw_order(), [back, front]);

    assert!(scene.remove_scene_layer(&ui));
    assert_eq!(scene.actor(front).unwrap().layer_name(), DEFAULT_LAYER);
    assert!(!scene.remove_scene_layer(DEFAULT_LAYER));
}

#[test]
fn test_destroyed_handles_are_stale() {
    let mut scene = Scene::default();
    let parent = boxed(&mut scene, "parent", None, fixed(0.0, 0.0, 10.0, 10.0));
    let child = boxed(&mut scene, "child", Some(parent), Layout::both_stretch());
    let uid = scene.actor(child).unwrap().uid();

    scene.destroy(parent).unwrap();
    assert!(scene.is_empty());
    assert!(scene.actor(child).is_none());
    assert!(scene.find_by_uid(uid).is_none());
    assert!(matches!(scene.set_name(child, "x"), Err(SceneError::StaleHandle(id)) if id == child));
    assert!(matches!(scene.destroy(child), Err(SceneError::StaleHandle(_))));
    assert!(scene.scene_layer(DEFAULT_LAYER).unwrap().drawables().is_empty());

    let fresh = scene.create_actor("fresh", ActorCreateMode::InScene);
    assert_ne!(fresh, parent);
    assert_ne!(fresh, child);
}

#[test]
fn test_find_by_path() {
    let mut scene = Scene::default();
    let root = boxed(&mut scene, "root", None, Layout::both_stretch());
    let panel = boxed(&mut scene, "panel", Some(root), Layout::both_stretch());
    let button = boxed(&mut scene, "button", Some(panel), Layout::both_stretch());
    assert_eq!(scene.find_actor("root/panel/button"), Some(button));
    assert_eq!(scene.find_child(root, "panel/button"), Some(button));
    assert_eq!(scene.find_descendant(root, "button"), Some(button));
    assert_eq!(scene.find_actor("root/missing"), None);
}

#[test]
fn test_state_edges_fire_once_and_animate() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene
        .add_state(
            w,
            WidgetState::new(
                "hover",
                Animation::new(0.5, Easing::Linear).with_track("transparency", 1.0, 0.5),
            ),
        )
        .unwrap();
    let became_true = Rc::new(Cell::new(0));
    let fully_false = Rc::new(Cell::new(0));
    {
        let t = became_true.clone();
        let f = fully_false.clone();
        scene
            .edit_state(w, "hover", move |s| {
                s.on_state_becomes_true = Some(Rc::new(move || t.set(t.get() + 1)));
                s.on_state_fully_false = Some(Rc::new(move || f.set(f.get() + 1)));
            })
            .unwrap();
    }

    scene.set_state(w, "hover", true).unwrap();
    scene.frame(0.25);
    assert_eq!(became_true.get(), 1);
    assert!((scene.widget(w).unwrap().transparency() - 0.75).abs() < 1e-5);
    scene.frame(0.25);
    scene.frame(0.25);
    assert_eq!(became_true.get(), 1);
    assert!((scene.widget(w).unwrap().transparency() - 0.5).abs() < 1e-5);

    scene.set_state(w, "hover", false).unwrap();
    scene.frame(0.25);
    assert_eq!(fully_false.get(), 0);
    scene.frame(0.25);
    scene.frame(0.25);
    assert_eq!(fully_false.get(), 1);
    assert_eq!(scene.state(w, "hover"), Some(false));
    assert!(matches!(
        scene.set_state(w, "missing", true),
        Err(SceneError::MissingState { .. })
    ));
}

#[test]
fn test_hide_without_visible_state_is_immediate() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene.add_layer(w, sprite("back", 0.0, Color::WHITE)).unwrap();
    scene.hide(w, false).unwrap();
    assert!(scene.widget(w).unwrap().is_fully_disabled());
    assert!(scene.frame(0.016).draw_list.is_empty());
    scene.show(w, false).unwrap();
    assert!(!scene.widget(w).unwrap().is_fully_disabled());
    assert!(!scene.frame(0.016).draw_list.is_empty());
}

#[test]
fn test_hide_with_visible_state_waits_for_animation() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 10.0, 10.0));
    let child = boxed(&mut scene, "child", Some(w), Layout::both_stretch());
    scene.add_layer(w, sprite("back", 0.0, Color::WHITE)).unwrap();
    scene
        .add_state(
            w,
            WidgetState::new(
                VISIBLE_STATE,
                Animation::new(0.5, Easing::Linear).with_track("transparency", 0.0, 1.0),
            ),
        )
        .unwrap();
    assert_eq!(scene.state(w, VISIBLE_STATE), Some(true));

    scene.hide(w, false).unwrap();
    assert!(!scene.widget(w).unwrap().is_fully_disabled());
    assert!(!scene.widget(child).unwrap().is_res_visible());
    let frame = scene.frame(0.25);
    assert_eq!(frame.draw_list.filled_rects().count(), 1);
    scene.frame(0.3);
    assert!(scene.widget(w).unwrap().is_fully_disabled());
    assert!(scene.frame(0.016).draw_list.is_empty());

    scene.show(w, false).unwrap();
    scene.frame(0.1);
    assert!(!scene.widget(w).unwrap().is_fully_disabled());

    scene.hide(w, true).unwrap();
    assert!(scene.widget(w).unwrap().is_fully_disabled());
    assert_eq!(scene.widget(w).unwrap().transparency(), 0.0);
}

#[test]
fn test_actor_round_trips_through_json() {
    let mut scene = Scene::default();
    let root = boxed(&mut scene, "root", None, fixed(0.0, 0.0, 200.0, 100.0));
    let label = boxed(&mut scene, "label", Some(root), Layout::both_stretch_with(4.0, 4.0, 4.0, 4.0));
    scene
        .add_layer(root, sprite("back", 0.0, Color::from_hex("#336699")).with_child(sprite("glow", 2.0, Color::WHITE)))
        .unwrap();
    scene
        .add_layer(label, WidgetLayer::new("text").with_drawable(Label::new("hello")))
        .unwrap();
    scene
        .add_state(
            root,
            WidgetState::new("hover", Animation::new(0.2, Easing::EaseOut).with_track("layers/back/transparency", 1.0, 0.5)),
        )
        .unwrap();
    scene.set_transparency(root, 0.5).unwrap();
    let icon = scene.create_actor("icon", ActorCreateMode::InScene);
    scene.add_child(root, icon, None).unwrap();
    scene.edit_transform(icon, |t| t.set_size(Vec2::new(8.0, 8.0))).unwrap();
    let cid = scene
        .add_component(icon, Box::new(ImageComponent::new(Sprite::image("icon.png"))))
        .unwrap();
    scene.set_component_enabled(icon, cid, false).unwrap();
    scene.set_scene_layer(root, "UI").unwrap();

    let json = scene.save_json().unwrap();
    let mut loaded = Scene::default();
    let roots = loaded.load_json(&json).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(loaded.serialize_actor(roots[0]), scene.serialize_actor(root));

    let label2 = loaded.find_actor("root/label").unwrap();
    let text = loaded.widget(label2).unwrap().layer("text").unwrap();
    assert_eq!(text.drawable_as::<Label>().unwrap().text, "hello");
    let icon2 = loaded.find_actor("root/icon").unwrap();
    assert!(loaded.find_component::<ImageComponent>(icon2).is_some());
    assert!(loaded.scene_layer("UI").is_some());
}

#[test]
fn test_malformed_field_falls_back_to_default() {
    init_logger();
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "panel", None, fixed(0.0, 0.0, 40.0, 40.0));
    scene.set_transparency(w, 0.5).unwrap();
    scene.set_focusable(w, true).unwrap();
    let mut node = scene.serialize_actor(w).unwrap();
    node.child_mut("widget")
        .and_then(|wn| wn.child_mut("transparency"))
        .unwrap()
        .value = DataValue::Str("opaque".into());
    node.add_node("components")
        .add_node("component")
        .write("type", "NoSuchComponent");

    let mut other = Scene::default();
    let id = other
        .deserialize_actor(&node, None, ActorCreateMode::InScene)
        .unwrap();
    let widget = other.widget(id).unwrap();
    assert_eq!(widget.transparency(), 1.0);
    assert!(widget.is_focusable());
    assert_eq!(other.actor(id).unwrap().name(), "panel");
    assert_eq!(other.actor(id).unwrap().component_ids().count(), 0);
}

#[test]
fn test_instantiate_links_and_reverts() {
    let mut scene = Scene::default();
    let proto = scene.create_widget("button", ActorCreateMode::NotInScene);
    scene.set_layout(proto, fixed(0.0, 0.0, 80.0, 30.0)).unwrap();
    scene.add_layer(proto, sprite("back", 0.0, Color::WHITE)).unwrap();
    let caption = scene.create_widget("caption", ActorCreateMode::NotInScene);
    scene.add_child(proto, caption, None).unwrap();
    assert!(scene.scene_layer(DEFAULT_LAYER).unwrap().drawables().is_empty());

    let inst = scene.instantiate(proto).unwrap();
    assert!(scene.actor(inst).unwrap().is_on_scene());
    assert_eq!(scene.prototype(inst), Some(proto));
    let inst_caption = scene.find_child(inst, "caption").unwrap();
    assert_eq!(scene.prototype(inst_caption), Some(caption));
    assert_ne!(scene.actor(inst).unwrap().uid(), scene.actor(proto).unwrap().uid());
    assert!(scene.prototype_changes(inst).unwrap().is_empty());

    scene.set_transparency(inst, 0.25).unwrap();
    let changes = scene.prototype_changes(inst).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].path, "widget/transparency");

    scene.revert_to_prototype(inst).unwrap();
    assert_eq!(scene.widget(inst).unwrap().transparency(), 1.0);
    assert!(scene.prototype_changes(inst).unwrap().is_empty());
    assert_eq!(scene.find_child(inst, "caption"), Some(inst_caption));

    assert!(matches!(scene.prototype_changes(proto), Err(SceneError::NoPrototype(_))));
}

#[derive(Clone, Default)]
struct KeyLog {
    keys: Rc<RefCell<Vec<Key>>>,
    focus_changes: Rc<Cell<i32>>,
}

impl WidgetBehavior for KeyLog {
    fn type_name(&self) -> &'static str {
        "KeyLog"
    }

    fn clone_box(&self) -> Box<dyn WidgetBehavior> {
        Box::new(self.clone())
    }

    fn on_focused(&mut self, _scene: &mut Scene, _id: ActorId) {
        self.focus_changes.set(self.focus_changes.get() + 1);
    }

    fn on_key_pressed(&mut self, _scene: &mut Scene, _id: ActorId, key: &KeyEvent) {
        self.keys.borrow_mut().push(key.key.clone());
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[test]
fn test_press_focuses_and_tab_cycles() {
    let mut scene = Scene::default();
    let a = boxed(&mut scene, "a", None, fixed(0.0, 0.0, 100.0, 100.0));
    let b = boxed(&mut scene, "b", None, fixed(200.0, 0.0, 100.0, 100.0));
    let log = KeyLog::default();
    scene.set_behavior(a, Box::new(log.clone())).unwrap();
    for id in [a, b] {
        scene.set_focusable(id, true).unwrap();
        scene
            .add_state(id, WidgetState::new(FOCUSED_STATE, Animation::new(0.1, Easing::Linear)))
            .unwrap();
    }

    scene.handle_input(&InputEvent::CursorPressed(Vec2::new(50.0, 50.0)));
    assert_eq!(scene.focused(), Some(a));
    assert_eq!(scene.state(a, FOCUSED_STATE), Some(true));
    assert_eq!(log.focus_changes.get(), 1);

    assert!(scene.handle_input(&InputEvent::KeyPressed(KeyEvent::new(Key::Character('x')))));
    assert_eq!(*log.keys.borrow(), [Key::Character('x')]);

    scene.handle_input(&InputEvent::KeyPressed(KeyEvent::new(Key::Tab)));
    assert_eq!(scene.focused(), Some(b));
    assert_eq!(scene.state(a, FOCUSED_STATE), Some(false));
    assert!(!scene.widget(a).unwrap().is_focused());

    let mut back = KeyEvent::new(Key::Tab);
    back.modifiers.shift = true;
    scene.handle_input(&InputEvent::KeyPressed(back));
    assert_eq!(scene.focused(), Some(a));

    scene.handle_input(&InputEvent::CursorPressed(Vec2::new(600.0, 600.0)));
    assert_eq!(scene.focused(), None);
    assert_eq!(scene.widget_at(Vec2::new(250.0, 50.0)), Some(b));
}

#[test]
fn test_hidden_widget_is_not_hit() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 100.0, 100.0));
    scene.resolve_layouts();
    assert_eq!(scene.widget_at(Vec2::new(10.0, 10.0)), Some(w));
    scene.hide(w, true).unwrap();
    assert_eq!(scene.widget_at(Vec2::new(10.0, 10.0)), None);
}

#[test]
fn test_transparency_multiplies_down_the_tree() {
    let mut scene = Scene::default();
    let root = boxed(&mut scene, "root", None, Layout::both_stretch());
    let child = boxed(&mut scene, "child", Some(root), Layout::both_stretch());
    scene.set_transparency(child, 0.5).unwrap();
    scene.set_transparency(root, 0.5).unwrap();
    assert!((scene.widget(child).unwrap().res_transparency() - 0.25).abs() < 1e-6);
}

#[test]
fn test_scene_config_from_json_keeps_defaults() {
    let cfg = SceneConfig::from_json(r#"{ "top_layers_depth": 500.0 }"#).unwrap();
    assert_eq!(cfg.top_layers_depth, 500.0);
    assert_eq!(cfg.max_layout_passes, SceneConfig::default().max_layout_passes);
}

#[test]
fn test_rename_scene_layer_moves_members() {
    let mut scene = Scene::default();
    let ui = scene.add_scene_layer("UI");
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene.set_scene_layer(w, &ui).unwrap();

    assert!(!scene.rename_scene_layer("UI", DEFAULT_LAYER));
    assert!(!scene.rename_scene_layer("missing", "other"));
    assert!(scene.rename_scene_layer("UI", "HUD"));
    assert!(scene.scene_layer("UI").is_none());
    assert_eq!(scene.actor(w).unwrap().layer_name(), "HUD");
    scene.resolve_layouts();
    assert_eq!(scene.draw_order(), [w]);
}

#[test]
fn test_excluded_subtree_is_not_drawn() {
    let mut scene = Scene::default();
    let root = boxed(&mut scene, "root", None, fixed(0.0, 0.0, 100.0, 100.0));
    let child = boxed(&mut scene, "child", Some(root), Layout::both_stretch());
    scene.add_layer(child, sprite("fill", 0.0, Color::WHITE)).unwrap();

    scene.exclude_from_scene(root).unwrap();
    assert!(!scene.actor(child).unwrap().is_on_scene());
    assert!(scene.frame(0.016).draw_list.is_empty());

    scene.include_in_scene(root).unwrap();
    assert!(scene.actor(child).unwrap().is_on_scene());
    scene.resolve_layouts();
    assert_eq!(scene.draw_order(), [root, child]);
}

#[test]
fn test_child_layer_by_path() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene.add_layer(w, sprite("back", 0.0, Color::WHITE)).unwrap();
    scene
        .add_child_layer(w, "back", sprite("icon", 1.0, Color::BLACK))
        .unwrap();
    assert!(scene.widget(w).unwrap().layer("back/icon").is_some());
    assert_eq!(scene.widget(w).unwrap().find_layer("icon").unwrap().name, "icon");

    let err = scene
        .add_child_layer(w, "back/missing", sprite("x", 0.0, Color::WHITE))
        .unwrap_err();
    assert!(matches!(err, SceneError::MissingLayer { path } if path == "back/missing"));
}

#[test]
fn test_remove_state_drops_it() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene
        .add_state(w, WidgetState::new("hover", Animation::new(0.1, Easing::Linear)))
        .unwrap();
    scene.set_state(w, "hover", true).unwrap();
    assert_eq!(scene.state(w, "hover"), Some(true));

    let removed = scene.remove_state(w, "hover").unwrap();
    assert_eq!(removed.name, "hover");
    assert_eq!(scene.state(w, "hover"), None);
    assert!(scene.remove_state(w, "hover").is_none());
}

#[test]
fn test_disabling_interior_node_spares_siblings() {
    let mut scene = Scene::default();
    let root = boxed(&mut scene, "root", None, fixed(0.0, 0.0, 100.0, 100.0));
    let a = boxed(&mut scene, "a", Some(root), fixed(0.0, 0.0, 50.0, 50.0));
    let a1 = boxed(&mut scene, "a1", Some(a), Layout::both_stretch());
    let b = boxed(&mut scene, "b", Some(root), fixed(50.0, 50.0, 50.0, 50.0));
    for id in [root, a, a1, b] {
        scene.add_layer(id, sprite("back", 0.0, Color::WHITE)).unwrap();
    }
    assert_eq!(scene.frame(0.016).draw_list.filled_rects().count(), 4);

    scene.set_enabled(a, false).unwrap();
    let res = |scene: &Scene, id| scene.actor(id).unwrap().is_res_enabled();
    assert!(!res(&scene, a));
    assert!(!res(&scene, a1));
    assert!(scene.actor(a1).unwrap().is_enabled());
    assert!(res(&scene, root));
    assert!(res(&scene, b));

    assert_eq!(scene.frame(0.016).draw_list.filled_rects().count(), 2);
    let order = scene.draw_order();
    assert!(order.contains(&root) && order.contains(&b));
    assert!(!order.contains(&a) && !order.contains(&a1));

    scene.set_enabled(a, true).unwrap();
    assert!(res(&scene, a1));
    assert_eq!(scene.frame(0.016).draw_list.filled_rects().count(), 4);
}

#[test]
fn test_state_reversed_mid_flight_waits_for_zero() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene
        .add_state(
            w,
            WidgetState::new(
                "hover",
                Animation::new(1.0, Easing::Linear).with_track("transparency", 1.0, 0.5),
            ),
        )
        .unwrap();
    let became_true = Rc::new(Cell::new(0));
    let fully_false = Rc::new(Cell::new(0));
    {
        let t = became_true.clone();
        let f = fully_false.clone();
        scene
            .edit_state(w, "hover", move |s| {
                s.on_state_becomes_true = Some(Rc::new(move || t.set(t.get() + 1)));
                s.on_state_fully_false = Some(Rc::new(move || f.set(f.get() + 1)));
            })
            .unwrap();
    }
    let rel = |scene: &Scene| scene.widget(w).unwrap().state("hover").unwrap().animation.rel_time();

    scene.set_state(w, "hover", true).unwrap();
    scene.frame(0.5);
    assert_eq!(became_true.get(), 1);
    assert!((rel(&scene) - 0.5).abs() < 1e-5);

    scene.set_state(w, "hover", false).unwrap();
    scene.frame(0.25);
    assert_eq!(fully_false.get(), 0);
    scene.frame(0.2);
    assert!(rel(&scene) > 0.0);
    assert_eq!(fully_false.get(), 0);
    scene.frame(0.1);
    assert_eq!(rel(&scene), 0.0);
    assert_eq!(fully_false.get(), 1);
    scene.frame(0.1);
    assert_eq!(fully_false.get(), 1);
    assert_eq!(became_true.get(), 1);
}

#[test]
fn test_hit_area_follows_layer_interactable_rects() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 100.0, 100.0));
    scene.add_layer(w, sprite("back", 0.0, Color::WHITE)).unwrap();
    scene
        .edit_layer(w, "back", |l| {
            l.interactable_layout = Layout::both_stretch_with(40.0, 40.0, 40.0, 40.0)
        })
        .unwrap();
    scene.resolve_layouts();
    assert_eq!(scene.widget_at(Vec2::new(5.0, 5.0)), None);
    assert_eq!(scene.widget_at(Vec2::new(50.0, 50.0)), Some(w));

    scene.edit_layer(w, "back", |l| l.enabled = false).unwrap();
    scene.resolve_layouts();
    assert_eq!(scene.widget_at(Vec2::new(5.0, 5.0)), Some(w));
}

#[test]
fn test_layers_track_their_owner() {
    let mut scene = Scene::default();
    let w = boxed(&mut scene, "w", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene.add_layer(w, sprite("back", 0.0, Color::WHITE)).unwrap();
    scene
        .add_child_layer(w, "back", sprite("icon", 1.0, Color::BLACK))
        .unwrap();
    assert_eq!(scene.layer_owner(w, "back"), Some(w));
    assert_eq!(scene.layer_owner(w, "back/icon"), Some(w));

    let copy = scene.instantiate(w).unwrap();
    assert_eq!(scene.layer_owner(copy, "back/icon"), Some(copy));

    let json = scene.save_json().unwrap();
    let mut loaded = Scene::default();
    let roots = loaded.load_json(&json).unwrap();
    assert_eq!(loaded.layer_owner(roots[0], "back/icon"), Some(roots[0]));

    let removed = scene.remove_layer(w, "back").unwrap().unwrap();
    assert_eq!(removed.owner(), None);
    assert_eq!(removed.child("icon").unwrap().owner(), None);

    let kept = scene.widget(copy).unwrap().layer("back").unwrap().clone();
    scene.destroy(copy).unwrap();
    assert_eq!(kept.owner(), Some(copy));
    assert!(!scene.contains(copy));
    assert_eq!(scene.layer_owner(copy, "back"), None);
}
