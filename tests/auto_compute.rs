use glam::Vec2;
use kestrel_stage::camera::Camera2D;
use kestrel_stage::compute::{AutoComputeEngine, ComputeEnvironment};
use kestrel_stage::events::{EventBus, StageEvent};
use kestrel_stage::geometry::Rectangle;
use kestrel_stage::input::InputEvent;
use kestrel_stage::stage::{EntityId, Section, Stage, StageManager, TextNode};
use kestrel_stage::StageConfig;

struct Harness {
    stage: StageManager,
    engine: AutoComputeEngine,
    camera: Camera2D,
    events: EventBus,
    mouse_world: Vec2,
}

impl Harness {
    fn new() -> Self {
        Self {
            stage: StageManager::new(),
            engine: AutoComputeEngine::with_seed(11),
            camera: Camera2D::new(),
            events: EventBus::default(),
            mouse_world: Vec2::ZERO,
        }
    }

    fn node(&mut self, text: &str, x: f32, y: f32) -> EntityId {
        self.stage.add_text_node(TextNode::new(text, Vec2::new(x, y), Vec2::new(40.0, 20.0))).expect("add node")
    }

    fn connect(&mut self, source: EntityId, target: EntityId) -> EntityId {
        self.stage.connect_entity(source, target).expect("connect")
    }

    fn edge(&mut self, source: EntityId, target: EntityId, text: &str) -> EntityId {
        self.stage.connect_entity_with_text(source, target, text).expect("connect")
    }

    fn tick(&mut self) -> kestrel_stage::TickReport {
        let mut env = ComputeEnvironment {
            camera: &mut self.camera,
            mouse_world: self.mouse_world,
            now_millis: 1_700_000_000_000.0,
            events: &mut self.events,
        };
        self.engine.tick(&mut self.stage, &mut env)
    }

    fn text(&self, id: EntityId) -> &str {
        &self.stage.text_node(id).expect("node exists").text
    }
}

#[test]
fn named_operator_reads_parents_and_writes_child() {
    let mut h = Harness::new();
    let two = h.node("2", 0.0, 0.0);
    let three = h.node("3", 100.0, 0.0);
    let add = h.node("##ADD##", 50.0, 100.0);
    let out = h.node("", 50.0, 200.0);
    h.connect(three, add);
    h.connect(two, add);
    h.connect(add, out);

    let report = h.tick();
    assert_eq!(h.text(out), "5");
    assert_eq!(report.nodes, 1);
    assert_eq!(report.writes, 1);
    let events = h.events.drain();
    assert!(events.iter().any(|ev| matches!(ev, StageEvent::OperatorHighlighted { entity, .. } if *entity == add)));
    assert!(events.contains(&StageEvent::NodeRenamed { entity: out, text: "5".to_string() }));
}

#[test]
fn operands_follow_x_order() {
    let mut h = Harness::new();
    let ten = h.node("10", 5.0, 0.0);
    let four = h.node("4", 1.0, 0.0);
    let sub = h.node("##SUBTRACT##", 0.0, 100.0);
    let out = h.node("", 0.0, 200.0);
    h.connect(ten, sub);
    h.connect(four, sub);
    h.connect(sub, out);
    h.tick();
    assert_eq!(h.text(out), "-6", "4 is left of 10, so 4 - 10");
}

#[test]
fn ticks_are_idempotent() {
    let mut h = Harness::new();
    let a = h.node("7", 0.0, 0.0);
    let b = h.node("3", 10.0, 0.0);
    let modulo = h.node("##MODULO##", 0.0, 100.0);
    let out = h.node("old", 0.0, 200.0);
    let shifted = h.node("0", 0.0, 300.0);
    h.connect(a, modulo);
    h.connect(b, modulo);
    h.connect(modulo, out);
    h.edge(out, shifted, "*10");

    let first = h.tick();
    let snapshot: Vec<String> = h.stage.text_nodes().iter().map(|n| n.text.clone()).collect();
    let second = h.tick();
    let again: Vec<String> = h.stage.text_nodes().iter().map(|n| n.text.clone()).collect();
    assert_eq!(h.text(out), "1");
    assert_eq!(h.text(shifted), "10");
    assert_eq!(snapshot, again);
    assert!(first.writes > 0);
    assert_eq!(second.writes, 0);
}

#[test]
fn excess_outputs_are_dropped_and_missing_outputs_leave_text() {
    let mut h = Harness::new();
    let input = h.node("a,b,c", 0.0, 0.0);
    let sep = h.node(",", 10.0, 0.0);
    let split = h.node("##SPLIT##", 0.0, 100.0);
    let left = h.node("", 0.0, 200.0);
    let right = h.node("", 100.0, 200.0);
    h.connect(input, split);
    h.connect(sep, split);
    h.connect(split, right);
    h.connect(split, left);
    h.tick();
    assert_eq!(h.text(left), "a");
    assert_eq!(h.text(right), "b");

    let mut h = Harness::new();
    let word = h.node("hi", 0.0, 0.0);
    let upper = h.node("##UPPER##", 0.0, 100.0);
    let first = h.node("x", 0.0, 200.0);
    let second = h.node("keep", 100.0, 200.0);
    h.connect(word, upper);
    h.connect(upper, first);
    h.connect(upper, second);
    h.tick();
    assert_eq!(h.text(first), "HI");
    assert_eq!(h.text(second), "keep");
}

#[test]
fn division_by_zero_does_not_stop_the_tick() {
    let mut h = Harness::new();
    let four = h.node("4", 0.0, 0.0);
    let zero = h.node("0", 10.0, 0.0);
    let div = h.node("##DIVIDE##", 0.0, 100.0);
    let out = h.node("", 0.0, 200.0);
    h.connect(four, div);
    h.connect(zero, div);
    h.connect(div, out);

    let junk = h.node("abc", 500.0, 0.0);
    let add = h.node("##ADD##", 500.0, 100.0);
    let sum = h.node("", 500.0, 200.0);
    h.connect(junk, add);
    h.connect(add, sum);

    h.tick();
    assert_eq!(h.text(out), "NaN");
    assert_eq!(h.text(sum), "0");
}

#[test]
fn random_over_the_full_f64_range_does_not_stop_the_tick() {
    let mut h = Harness::new();
    let low = h.node("-1e308", 0.0, 0.0);
    let high = h.node("1e308", 10.0, 0.0);
    let random = h.node("##RANDOM##", 0.0, 100.0);
    let out = h.node("", 0.0, 200.0);
    h.connect(low, random);
    h.connect(high, random);
    h.connect(random, out);

    let one = h.node("1", 500.0, 0.0);
    let add = h.node("##ADD##", 500.0, 100.0);
    let sum = h.node("", 500.0, 200.0);
    h.connect(one, add);
    h.connect(add, sum);

    h.tick();
    let value: f64 = h.text(out).parse().expect("numeric output");
    assert!(value.is_finite());
    assert_eq!(h.text(sum), "1");
}

#[test]
fn chained_operators_resolve_top_down_in_one_tick() {
    let mut h = Harness::new();
    let a = h.node("1", 0.0, 0.0);
    let b = h.node("2", 10.0, 0.0);
    let add = h.node("##ADD##", 0.0, 100.0);
    let mid = h.node("", 0.0, 200.0);
    let neg = h.node("-1", 100.0, 200.0);
    let mul = h.node("##MULTIPLY##", 0.0, 300.0);
    let out = h.node("", 0.0, 400.0);
    h.connect(a, add);
    h.connect(b, add);
    h.connect(add, mid);
    h.connect(mid, mul);
    h.connect(neg, mul);
    h.connect(mul, out);
    h.tick();
    assert_eq!(h.text(out), "-3");
}

#[test]
fn edge_binary_operator_combines_source_and_target() {
    let mut h = Harness::new();
    let source = h.node("2", 0.0, 0.0);
    let target = h.node("10", 0.0, 100.0);
    h.edge(source, target, "<");
    h.tick();
    assert_eq!(h.text(target), "1");
}

#[test]
fn edge_shorthand_applies_constant() {
    let mut h = Harness::new();
    let source = h.node("10", 0.0, 0.0);
    let target = h.node("", 0.0, 100.0);
    h.edge(source, target, "+5");
    let report = h.tick();
    assert_eq!(h.text(target), "15");
    assert_eq!(report.edges, 1);
}

#[test]
fn edge_shorthand_with_zero_operand_is_evaluated() {
    let mut h = Harness::new();
    let source = h.node("10", 0.0, 0.0);
    let target = h.node("old", 0.0, 100.0);
    h.edge(source, target, "*0");
    let report = h.tick();
    assert_eq!(h.text(target), "0");
    assert_eq!(report.edges, 1);
}

#[test]
fn edge_with_non_numeric_suffix_is_ignored() {
    let mut h = Harness::new();
    let source = h.node("10", 0.0, 0.0);
    let target = h.node("untouched", 0.0, 100.0);
    h.edge(source, target, "+abc");
    let report = h.tick();
    assert_eq!(h.text(target), "untouched");
    assert_eq!(report.edges, 0);
    assert_eq!(report.writes, 0);
}

#[test]
fn edges_into_connect_points_are_skipped() {
    let mut h = Harness::new();
    let source = h.node("10", 0.0, 0.0);
    let point = h
        .stage
        .add_connect_point(kestrel_stage::stage::ConnectPoint::new(Vec2::new(0.0, 100.0)))
        .expect("point");
    h.edge(source, point, "+5");
    assert_eq!(h.tick().edges, 0);
}

#[test]
fn section_operator_uses_children_in_x_order() {
    let mut h = Harness::new();
    let four = h.node("4", 100.0, 0.0);
    let three = h.node("3", 0.0, 0.0);
    let mut section = Section::new("##ADD##", Rectangle::default());
    section.children = vec![four, three];
    let section = h.stage.add_section(section).expect("section");
    let out = h.node("", 0.0, 300.0);
    h.connect(section, out);

    let report = h.tick();
    assert_eq!(h.text(out), "7");
    assert_eq!(report.sections, 1);

    let mut h2 = Harness::new();
    let a = h2.node("a", 100.0, 0.0);
    let b = h2.node("b", 0.0, 0.0);
    let mut section = Section::new("##CONCAT##", Rectangle::default());
    section.children = vec![a, b];
    let section = h2.stage.add_section(section).expect("section");
    let out = h2.node("", 0.0, 300.0);
    h2.connect(section, out);
    h2.tick();
    assert_eq!(h2.text(out), "ba");
}

#[test]
fn environment_functions_touch_camera_and_geometry() {
    let mut h = Harness::new();
    let x = h.node("120", 0.0, 0.0);
    let y = h.node("-40", 10.0, 0.0);
    let set_camera = h.node("##SET_CAMERA_LOCATION##", 0.0, 100.0);
    h.connect(x, set_camera);
    h.connect(y, set_camera);

    let get_camera = h.node("##GET_CAMERA_LOCATION##", 300.0, 200.0);
    let cam_x = h.node("", 300.0, 300.0);
    let cam_y = h.node("", 400.0, 300.0);
    h.connect(get_camera, cam_x);
    h.connect(get_camera, cam_y);

    let probe = h.node("probe", 600.0, 0.0);
    let get_location = h.node("##GET_LOCATION##", 600.0, 100.0);
    let loc_x = h.node("", 600.0, 200.0);
    let loc_y = h.node("", 700.0, 200.0);
    h.connect(probe, get_location);
    h.connect(get_location, loc_x);
    h.connect(get_location, loc_y);

    h.tick();
    assert_eq!(h.camera.position, Vec2::new(120.0, -40.0));
    assert_eq!((h.text(cam_x), h.text(cam_y)), ("120", "-40"));
    assert_eq!((h.text(loc_x), h.text(loc_y)), ("600", "0"));
}

#[test]
fn set_location_moves_children() {
    let mut h = Harness::new();
    let x = h.node("300", 0.0, 0.0);
    let y = h.node("250", 10.0, 0.0);
    let setter = h.node("##SET_LOCATION##", 0.0, 100.0);
    let moved = h.node("moved", 0.0, 200.0);
    h.connect(x, setter);
    h.connect(y, setter);
    h.connect(setter, moved);
    h.tick();
    let rect = h.stage.collision_box(moved).expect("moved node");
    assert_eq!(rect.location, Vec2::new(300.0, 250.0));
    assert_eq!(h.text(moved), "moved");
}

#[test]
fn collision_rgb_and_time() {
    let mut h = Harness::new();
    let a = h.node("a", 0.0, 0.0);
    let b = h.node("b", 20.0, 10.0);
    let collide = h.node("##IS_COLLISION##", 0.0, 100.0);
    let hit = h.node("", 0.0, 200.0);
    h.connect(a, collide);
    h.connect(b, collide);
    h.connect(collide, hit);

    let r = h.node("255", 300.0, 0.0);
    let g = h.node("300", 310.0, 0.0);
    let bl = h.node("-4", 320.0, 0.0);
    let rgb = h.node("##RGB##", 300.0, 100.0);
    let color = h.node("", 300.0, 200.0);
    for channel in [r, g, bl] {
        h.connect(channel, rgb);
    }
    h.connect(rgb, color);

    let clock = h.node("##GET_TIME##", 600.0, 100.0);
    let now = h.node("", 600.0, 200.0);
    h.connect(clock, now);

    h.mouse_world = Vec2::new(5.0, 6.0);
    let mouse = h.node("##GET_MOUSE_LOCATION##", 900.0, 100.0);
    let mx = h.node("", 900.0, 200.0);
    h.connect(mouse, mx);

    h.tick();
    assert_eq!(h.text(hit), "1");
    assert_eq!(h.text(color), "rgb(255, 255, 0)");
    assert_eq!(h.text(now), "1700000000000");
    assert_eq!(h.text(mx), "5");
}

#[test]
fn stage_tick_is_gated_by_trigger_key() {
    let mut stage = Stage::new(StageConfig::default());
    let a = stage.manager.add_text_node(TextNode::new("2", Vec2::ZERO, Vec2::splat(10.0))).expect("a");
    let b = stage.manager.add_text_node(TextNode::new("", Vec2::new(0.0, 50.0), Vec2::splat(10.0))).expect("b");
    stage.manager.connect_entity_with_text(a, b, "*3").expect("edge");

    assert!(stage.tick().is_none());
    assert_eq!(stage.manager.text_node(b).expect("b").text, "");

    stage.input.push(InputEvent::Key { key: "x".to_string(), pressed: true });
    let report = stage.tick().expect("engine ran while x is held");
    assert_eq!(report.writes, 1);
    assert_eq!(stage.manager.text_node(b).expect("b").text, "6");

    let report = stage.auto_compute_engine_tick();
    assert_eq!(report.writes, 0);
}
