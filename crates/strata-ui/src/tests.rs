use std::cell::RefCell;
use std::rc::Rc;

use strata_core::*;

use crate::*;

fn widget(scene: &mut Scene, name: &str, parent: Option<ActorId>, layout: impl Into<WidgetLayout>) -> ActorId {
    let id = scene.create_widget(name, ActorCreateMode::InScene);
    scene.set_widget_layout(id, layout).unwrap();
    if let Some(p) = parent {
        scene.add_child(p, id, None).unwrap();
    }
    id
}

fn fixed(x: f32, y: f32, w: f32, h: f32) -> Layout {
    Layout::fixed(Vec2::ZERO, Vec2::new(w, h), Vec2::new(x, y))
}

fn min_sized(w: f32, h: f32) -> WidgetLayout {
    WidgetLayout {
        min_size: Vec2::new(w, h),
        ..Default::default()
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Named child of a persisted node in its JSON form.
fn json_field<'a>(node: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    node["children"]
        .as_array()
        .and_then(|kids| kids.iter().find(|k| k["name"] == name))
        .unwrap_or_else(|| panic!("no field `{name}` in {node}"))
}

fn rect_of(scene: &Scene, id: ActorId) -> Rect {
    scene.widget(id).unwrap().world_rect()
}

fn assert_rect(actual: Rect, expected: Rect) {
    assert!(actual.approx_eq(&expected, 0.01), "{actual:?} != {expected:?}");
}

#[test]
fn test_horizontal_layout_shares_free_space() {
    let mut scene = Scene::default();
    let row = widget(&mut scene, "row", None, fixed(0.0, 0.0, 200.0, 40.0));
    scene.set_behavior(row, Box::new(HorizontalLayout().spacing(10.0))).unwrap();
    let cells: Vec<ActorId> = (0..3)
        .map(|i| widget(&mut scene, &format!("c{i}"), Some(row), min_sized(50.0, 0.0)))
        .collect();

    scene.resolve_layouts();

    assert_rect(rect_of(&scene, cells[0]), Rect::new(0.0, 0.0, 60.0, 40.0));
    assert_rect(rect_of(&scene, cells[1]), Rect::new(70.0, 0.0, 60.0, 40.0));
    assert_rect(rect_of(&scene, cells[2]), Rect::new(140.0, 0.0, 60.0, 40.0));
    assert_eq!(scene.widget(row).unwrap().layout().min_size, Vec2::new(170.0, 0.0));
}

#[test]
fn test_weights_and_max_size_split_the_row() {
    let mut scene = Scene::default();
    let row = widget(&mut scene, "row", None, fixed(0.0, 0.0, 300.0, 20.0));
    scene.set_behavior(row, Box::new(HorizontalLayout())).unwrap();
    let a = widget(
        &mut scene,
        "a",
        Some(row),
        WidgetLayout {
            weight: Vec2::new(3.0, 1.0),
            ..Default::default()
        },
    );
    let b = widget(&mut scene, "b", Some(row), WidgetLayout::default());
    let c = widget(
        &mut scene,
        "c",
        Some(row),
        WidgetLayout {
            max_size: Vec2::new(20.0, 0.0),
            ..Default::default()
        },
    );

    scene.resolve_layouts();

    assert_rect(rect_of(&scene, a), Rect::new(0.0, 0.0, 210.0, 20.0));
    assert_rect(rect_of(&scene, b), Rect::new(210.0, 0.0, 70.0, 20.0));
    assert_rect(rect_of(&scene, c), Rect::new(280.0, 0.0, 20.0, 20.0));
}

#[test]
fn test_vertical_layout_centers_fixed_width_children() {
    let mut scene = Scene::default();
    let col = widget(&mut scene, "col", None, fixed(0.0, 0.0, 100.0, 100.0));
    scene
        .set_behavior(
            col,
            Box::new(
                VerticalLayout()
                    .border(Border::all(5.0))
                    .base_corner(BaseCorner::Top)
                    .expand(false, true),
            ),
        )
        .unwrap();
    let a = widget(&mut scene, "a", Some(col), min_sized(40.0, 20.0));
    let b = widget(&mut scene, "b", Some(col), min_sized(60.0, 20.0));

    scene.resolve_layouts();

    assert_rect(rect_of(&scene, a), Rect::new(30.0, 5.0, 40.0, 45.0));
    assert_rect(rect_of(&scene, b), Rect::new(20.0, 50.0, 60.0, 45.0));
}

#[test]
fn test_right_corner_packs_children_in_order() {
    let mut scene = Scene::default();
    let row = widget(&mut scene, "row", None, fixed(0.0, 0.0, 200.0, 30.0));
    scene
        .set_behavior(
            row,
            Box::new(
                HorizontalLayout()
                    .spacing(10.0)
                    .base_corner(BaseCorner::RightTop)
                    .expand(false, true),
            ),
        )
        .unwrap();
    let a = widget(&mut scene, "a", Some(row), min_sized(30.0, 0.0));
    let b = widget(&mut scene, "b", Some(row), min_sized(40.0, 0.0));

    scene.resolve_layouts();

    assert_rect(rect_of(&scene, a), Rect::new(120.0, 0.0, 30.0, 30.0));
    assert_rect(rect_of(&scene, b), Rect::new(160.0, 0.0, 40.0, 30.0));
}

#[test]
fn test_hidden_and_disabled_children_are_skipped() {
    let mut scene = Scene::default();
    let row = widget(&mut scene, "row", None, fixed(0.0, 0.0, 100.0, 10.0));
    scene.set_behavior(row, Box::new(HorizontalLayout())).unwrap();
    let a = widget(&mut scene, "a", Some(row), WidgetLayout::default());
    let b = widget(&mut scene, "b", Some(row), WidgetLayout::default());
    let c = widget(&mut scene, "c", Some(row), WidgetLayout::default());
    scene.resolve_layouts();
    assert_rect(rect_of(&scene, c), Rect::new(66.67, 0.0, 33.33, 10.0));

    scene.hide(b, true).unwrap();
    scene.set_enabled(c, false).unwrap();
    scene.resolve_layouts();
    assert_rect(rect_of(&scene, a), Rect::new(0.0, 0.0, 100.0, 10.0));

    scene.set_enabled(c, true).unwrap();
    scene.resolve_layouts();
    assert_rect(rect_of(&scene, c), Rect::new(50.0, 0.0, 50.0, 10.0));
}

#[test]
fn test_nested_layouts_settle_within_pass_cap() {
    let mut scene = Scene::default();
    let col = widget(&mut scene, "col", None, fixed(0.0, 0.0, 100.0, 200.0));
    scene.set_behavior(col, Box::new(VerticalLayout().spacing(4.0))).unwrap();
    let row = widget(&mut scene, "row", Some(col), WidgetLayout::default());
    scene.set_behavior(row, Box::new(HorizontalLayout())).unwrap();
    let leaf = widget(&mut scene, "leaf", Some(row), min_sized(10.0, 30.0));
    let _spacer = widget(&mut scene, "spacer", Some(col), WidgetLayout::default());

    let passes = scene.resolve_layouts();
    assert!(passes <= scene.config().max_layout_passes);
    assert!(!scene.is_layout_dirty(leaf));

    // The row picked up its child's min height and pushed it to the column.
    assert_eq!(scene.widget(row).unwrap().layout().min_size, Vec2::new(10.0, 30.0));
    assert_rect(rect_of(&scene, row), Rect::new(0.0, 0.0, 100.0, 98.0));
    assert_rect(rect_of(&scene, leaf), Rect::new(0.0, 0.0, 100.0, 98.0));
}

#[test]
fn test_layout_behavior_round_trips() {
    let mut scene = Scene::default();
    crate::register(scene.registry_mut());
    let col = widget(&mut scene, "col", None, fixed(0.0, 0.0, 100.0, 100.0));
    let layout = VerticalLayout()
        .spacing(3.0)
        .border(Border {
            left: 1.0,
            top: 2.0,
            right: 3.0,
            bottom: 4.0,
        })
        .base_corner(BaseCorner::Center)
        .expand(false, false);
    scene.set_behavior(col, Box::new(layout.clone())).unwrap();

    let json = scene.serialize_actor(col).unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let behavior = json_field(json_field(&value, "widget"), "behavior");
    assert_eq!(json_field(behavior, "type")["value"], "VerticalLayout");

    let copy = scene
        .deserialize_actor(&DataNode::from_json(&json).unwrap(), None, ActorCreateMode::NotInScene)
        .unwrap();
    assert_eq!(scene.widget(copy).unwrap().behavior_as::<LinearLayout>(), Some(&layout));
}

#[test]
fn test_unknown_base_corner_falls_back() {
    init_logger();
    let mut node = DataNode::new("data");
    node.write("base_corner", "Diagonal").write("spacing", &4.0f32);
    let mut layout = HorizontalLayout().base_corner(BaseCorner::Bottom);
    layout.deserialize(&node);
    assert_eq!(layout.base_corner, BaseCorner::LeftTop);
    assert_eq!(layout.spacing, 4.0);
    assert_eq!(layout.type_name(), "HorizontalLayout");
}

fn scroll_fixture(scene: &mut Scene) -> (ActorId, ActorId) {
    let area = widget(scene, "area", None, fixed(0.0, 0.0, 100.0, 100.0));
    scene.set_behavior(area, Box::new(ScrollArea::new())).unwrap();
    let content = widget(scene, "content", Some(area), fixed(0.0, 0.0, 100.0, 300.0));
    scene
        .add_layer(content, WidgetLayer::new("bg").with_drawable(Sprite::new(Color::WHITE)))
        .unwrap();
    (area, content)
}

#[test]
fn test_scroll_clamps_and_moves_children() {
    let mut scene = Scene::default();
    let (area, content) = scroll_fixture(&mut scene);
    scene.resolve_layouts();

    let max = scene.widget(area).unwrap().behavior_as::<ScrollArea>().unwrap().max_scroll();
    assert_eq!(max, Vec2::new(0.0, 200.0));

    assert_eq!(ScrollArea::scroll_to(&mut scene, area, Vec2::new(0.0, 500.0)), Some(Vec2::new(0.0, 200.0)));
    scene.resolve_layouts();
    assert_rect(rect_of(&scene, content), Rect::new(0.0, -200.0, 100.0, 300.0));

    let consumed = scene.handle_input(&InputEvent::CursorScrolled {
        position: Vec2::new(50.0, 50.0),
        delta: Vec2::new(0.0, 1.0),
    });
    assert!(consumed);
    scene.resolve_layouts();
    assert_rect(rect_of(&scene, content), Rect::new(0.0, -170.0, 100.0, 300.0));

    // Shrinking the content pulls the scroll back into range on the next
    // frame.
    scene.set_layout(content, fixed(0.0, 0.0, 100.0, 150.0)).unwrap();
    scene.frame(0.0);
    let area_behavior = scene.widget(area).unwrap().behavior_as::<ScrollArea>().unwrap();
    assert_eq!(area_behavior.scroll, Vec2::new(0.0, 50.0));
    assert_rect(rect_of(&scene, content), Rect::new(0.0, -50.0, 100.0, 150.0));
}

#[test]
fn test_scrollbar_tracks_overflow() {
    let mut scene = Scene::default();
    let (area, content) = scroll_fixture(&mut scene);
    scene.resolve_layouts();

    let bar = scene.internal_widget(area, SCROLLBAR).unwrap();
    assert!(scene.widget(bar).unwrap().is_visible());
    assert_rect(rect_of(&scene, bar), Rect::new(94.0, 0.0, 6.0, 100.0));
    let handle = scene.widget(bar).unwrap().layer(SCROLLBAR_HANDLE).unwrap().rect();
    assert_rect(handle, Rect::new(94.0, 0.0, 6.0, 33.33));

    scene.set_layout(content, fixed(0.0, 0.0, 100.0, 80.0)).unwrap();
    scene.frame(0.0);
    assert!(!scene.widget(bar).unwrap().is_visible());

    // Reattaching the behavior does not build a second bar.
    let behavior = scene.take_behavior(area).unwrap();
    scene.set_behavior(area, behavior).unwrap();
    assert_eq!(scene.widget(area).unwrap().internal_widgets().len(), 1);
}

#[test]
fn test_scroll_area_clips_drawing() {
    let mut scene = Scene::default();
    let (_area, _content) = scroll_fixture(&mut scene);
    let frame = scene.frame(0.0);
    let cmds = &frame.draw_list.commands;
    let push = cmds
        .iter()
        .position(|c| matches!(c, DrawCommand::PushClip { .. }))
        .unwrap();
    let pop = cmds
        .iter()
        .position(|c| matches!(c, DrawCommand::PopClip))
        .unwrap();
    let white = cmds
        .iter()
        .position(|c| matches!(c, DrawCommand::Rect { color, .. } if *color == Color::WHITE))
        .unwrap();
    assert!(push < white && white < pop);
}

fn toggle_fixture(scene: &mut Scene, log: Rc<RefCell<Vec<bool>>>) -> ActorId {
    let id = widget(scene, "toggle", None, fixed(0.0, 0.0, 40.0, 20.0));
    for name in [VALUE_STATE, PRESSED_STATE, SELECT_STATE] {
        scene
            .add_state(id, WidgetState::new(name, Animation::new(0.1, Easing::Linear)))
            .unwrap();
    }
    let toggle = Toggle::new(false).on_toggle(move |v| log.borrow_mut().push(v));
    scene.set_behavior(id, Box::new(toggle)).unwrap();
    id
}

#[test]
fn test_toggle_flips_on_click_inside_only() {
    let mut scene = Scene::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let id = toggle_fixture(&mut scene, log.clone());
    assert!(scene.widget(id).unwrap().is_focusable());

    scene.handle_input(&InputEvent::CursorMoved(Vec2::new(10.0, 10.0)));
    assert_eq!(scene.state(id, SELECT_STATE), Some(true));

    scene.handle_input(&InputEvent::CursorPressed(Vec2::new(10.0, 10.0)));
    assert_eq!(scene.state(id, PRESSED_STATE), Some(true));
    assert_eq!(scene.focused(), Some(id));
    scene.handle_input(&InputEvent::CursorReleased(Vec2::new(10.0, 10.0)));
    assert_eq!(scene.state(id, PRESSED_STATE), Some(false));
    assert_eq!(Toggle::value_of(&scene, id), Some(true));
    assert_eq!(scene.state(id, VALUE_STATE), Some(true));

    scene.handle_input(&InputEvent::CursorPressed(Vec2::new(10.0, 10.0)));
    scene.handle_input(&InputEvent::CursorReleased(Vec2::new(300.0, 300.0)));
    assert_eq!(Toggle::value_of(&scene, id), Some(true));

    scene.handle_input(&InputEvent::CursorMoved(Vec2::new(300.0, 300.0)));
    assert_eq!(scene.state(id, SELECT_STATE), Some(false));
    assert_eq!(*log.borrow(), [true]);
}

#[test]
fn test_toggle_responds_to_keys_when_focused() {
    let mut scene = Scene::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let id = toggle_fixture(&mut scene, log.clone());
    scene.focus(id).unwrap();

    scene.handle_input(&InputEvent::KeyPressed(KeyEvent::new(Key::Space)));
    assert_eq!(scene.state(id, PRESSED_STATE), Some(true));
    assert_eq!(Toggle::value_of(&scene, id), Some(false));
    scene.handle_input(&InputEvent::KeyReleased(KeyEvent::new(Key::Space)));
    assert_eq!(Toggle::value_of(&scene, id), Some(true));

    scene.handle_input(&InputEvent::KeyReleased(KeyEvent::new(Key::Character('q'))));
    assert_eq!(Toggle::value_of(&scene, id), Some(true));

    Toggle::set_value_of(&mut scene, id, true).unwrap();
    Toggle::set_value_of(&mut scene, id, false).unwrap();
    assert_eq!(scene.state(id, VALUE_STATE), Some(false));
    assert_eq!(*log.borrow(), [true, false]);
}

#[test]
fn test_toggle_without_states_still_toggles() {
    let mut scene = Scene::default();
    let id = widget(&mut scene, "bare", None, fixed(0.0, 0.0, 10.0, 10.0));
    scene.set_behavior(id, Box::new(Toggle::new(true))).unwrap();
    scene.handle_input(&InputEvent::CursorPressed(Vec2::new(5.0, 5.0)));
    scene.handle_input(&InputEvent::CursorReleased(Vec2::new(5.0, 5.0)));
    assert_eq!(Toggle::value_of(&scene, id), Some(false));
}

fn progress_fixture(scene: &mut Scene, y: f32, progress: HorizontalProgress) -> ActorId {
    let id = widget(scene, "progress", None, fixed(0.0, y, 200.0, 20.0));
    scene
        .add_layer(id, WidgetLayer::new(PROGRESS_BACK).with_drawable(Sprite::new(Color::BLACK)))
        .unwrap();
    scene
        .add_layer(
            id,
            WidgetLayer::new(PROGRESS_BAR)
                .with_depth(1.0)
                .with_drawable(Sprite::new(Color::WHITE)),
        )
        .unwrap();
    for name in [PRESSED_STATE, SELECT_STATE] {
        scene
            .add_state(id, WidgetState::new(name, Animation::new(0.1, Easing::Linear)))
            .unwrap();
    }
    scene.set_behavior(id, Box::new(progress)).unwrap();
    scene.resolve_layouts();
    id
}

fn bar_rect(scene: &Scene, id: ActorId) -> Rect {
    scene.widget(id).unwrap().layer(PROGRESS_BAR).unwrap().rect()
}

#[test]
fn test_progress_bar_eases_to_value() {
    let mut scene = Scene::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let id = progress_fixture(
        &mut scene,
        0.0,
        HorizontalProgress::new(0.0, 100.0).on_change(move |v| sink.borrow_mut().push(v)),
    );
    assert_rect(bar_rect(&scene, id), Rect::new(0.0, 0.0, 0.0, 20.0));

    HorizontalProgress::set_value_forcible_of(&mut scene, id, 25.0).unwrap();
    scene.resolve_layouts();
    assert_rect(bar_rect(&scene, id), Rect::new(0.0, 0.0, 50.0, 20.0));

    HorizontalProgress::set_value_of(&mut scene, id, 75.0).unwrap();
    assert_eq!(HorizontalProgress::value_of(&scene, id), Some(75.0));
    scene.frame(1.0 / 60.0);
    let shown = scene
        .widget(id)
        .unwrap()
        .behavior_as::<HorizontalProgress>()
        .unwrap()
        .smooth_value();
    assert!((shown - 50.0).abs() < 1e-3, "{shown}");
    assert_rect(bar_rect(&scene, id), Rect::new(0.0, 0.0, 100.0, 20.0));
    scene.frame(0.1);
    assert_rect(bar_rect(&scene, id), Rect::new(0.0, 0.0, 150.0, 20.0));

    HorizontalProgress::set_value_of(&mut scene, id, 500.0).unwrap();
    HorizontalProgress::set_value_of(&mut scene, id, 100.0).unwrap();
    assert_eq!(HorizontalProgress::value_of(&scene, id), Some(100.0));
    assert_eq!(*log.borrow(), [25.0, 75.0, 100.0]);

    HorizontalProgress::set_range_of(&mut scene, id, 0.0, 40.0).unwrap();
    assert_eq!(HorizontalProgress::value_of(&scene, id), Some(40.0));
}

#[test]
fn test_progress_follows_cursor_and_wheel() {
    let mut scene = Scene::default();
    let right = progress_fixture(&mut scene, 0.0, HorizontalProgress::new(0.0, 100.0));
    let left = progress_fixture(
        &mut scene,
        50.0,
        HorizontalProgress::new(0.0, 100.0).orientation(ProgressOrientation::Left),
    );

    scene.handle_input(&InputEvent::CursorPressed(Vec2::new(50.0, 10.0)));
    assert_eq!(scene.state(right, PRESSED_STATE), Some(true));
    assert_eq!(HorizontalProgress::value_of(&scene, right), Some(25.0));
    scene.handle_input(&InputEvent::CursorReleased(Vec2::new(50.0, 10.0)));
    assert_eq!(scene.state(right, PRESSED_STATE), Some(false));

    scene.handle_input(&InputEvent::CursorScrolled {
        position: Vec2::new(50.0, 10.0),
        delta: Vec2::new(0.0, 2.0),
    });
    assert_eq!(HorizontalProgress::value_of(&scene, right), Some(27.0));

    scene.handle_input(&InputEvent::CursorPressed(Vec2::new(50.0, 60.0)));
    assert_eq!(HorizontalProgress::value_of(&scene, left), Some(75.0));
    HorizontalProgress::set_value_forcible_of(&mut scene, left, 75.0).unwrap();
    scene.resolve_layouts();
    assert_rect(bar_rect(&scene, left), Rect::new(50.0, 50.0, 150.0, 20.0));
}

#[test]
fn test_progress_survives_instantiate() {
    init_logger();
    let mut scene = Scene::default();
    crate::register(scene.registry_mut());
    let id = progress_fixture(
        &mut scene,
        0.0,
        HorizontalProgress::new(0.0, 10.0).orientation(ProgressOrientation::Left),
    );
    HorizontalProgress::set_value_forcible_of(&mut scene, id, 4.0).unwrap();

    let copy = scene.instantiate(id).unwrap();
    let p = scene
        .widget(copy)
        .unwrap()
        .behavior_as::<HorizontalProgress>()
        .unwrap();
    assert_eq!(p.value(), 4.0);
    assert_eq!(p.range(), (0.0, 10.0));
    assert_eq!(p.orientation, ProgressOrientation::Left);
}
