// tests/turtle_motion.rs
mod common;

use canvas_turtle::{ActionKind, ColorValue, GotoOptions};
use common::{EPS, Harness, of_kind, of_turtle};
use glam::DVec2;

fn close(a: DVec2, b: DVec2, eps: f64) -> bool {
    (a - b).length() < eps
}

#[test]
fn new_turtle_starts_home() {
    let h = Harness::new();
    let t = h.session.turtle().unwrap();

    assert_eq!(t.pos(), DVec2::ZERO);
    assert_eq!(t.heading(), 0.0);
    assert!(t.isdown());
    assert!(t.isvisible());
    assert_eq!(t.pencolor(), ColorValue::Name("black".to_string()));
    assert_eq!(t.canvas_pos(), DVec2::new(400.0, 250.0));

    let id = t.id();
    let actions = h.finish();
    let first = &of_turtle(&actions, id)[0];
    assert_eq!(first.kind, ActionKind::UpdateState);
    assert_eq!(first.position, DVec2::new(400.0, 250.0));
    assert!(!first.needs_delay);
}

#[test]
fn forward_then_backward_returns() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.left(33.0);
    for d in [0.0, 1.0, 80.0, -12.5, 1234.5678] {
        let start = t.pos();
        t.forward(d);
        t.backward(d);
        assert!(close(t.pos(), start, EPS), "d = {d}");
    }
}

#[test]
fn forward_follows_logical_axes() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.forward(80.0);
    assert!(close(t.pos(), DVec2::new(80.0, 0.0), EPS));
    assert!(close(t.canvas_pos(), DVec2::new(480.0, 250.0), EPS));

    t.right(90.0);
    t.forward(80.0);
    // Heading south in logical space means moving down the canvas.
    assert!(close(t.pos(), DVec2::new(80.0, -80.0), EPS));
    assert!(close(t.canvas_pos(), DVec2::new(480.0, 330.0), EPS));
}

#[test]
fn left_then_right_restores_heading() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    for a in [0.0, 15.0, 90.0, 359.0, 725.5, -40.0] {
        let before = t.heading();
        t.left(a);
        t.right(a);
        let diff = (t.heading() - before).rem_euclid(360.0);
        assert!(diff < 1e-9 || 360.0 - diff < 1e-9, "a = {a}");
    }
}

#[test]
fn headings_stay_normalized() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.right(90.0);
    t.right(360.0);
    assert_eq!(t.heading(), 270.0);

    t.setheading(0.0);
    t.left(90.0);
    t.left(360.0);
    assert_eq!(t.heading(), 90.0);

    t.setheading(-450.0);
    assert_eq!(t.heading(), 270.0);
}

#[test]
fn full_circle_returns_to_start() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.goto(13.0, -7.0);
    t.setheading(25.0);
    for r in [1.0, 50.0, -30.0, 120.5, -0.25] {
        let start = t.pos();
        let heading = t.heading();
        t.circle(r, 360.0);
        assert!(close(t.pos(), start, 1e-5), "r = {r}");
        assert!((t.heading() - heading).abs() < 1e-5, "r = {r}");
    }
}

#[test]
fn circle_emits_half_turn_segments() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.circle(100.0, 360.0);
    t.circle(-20.0, 90.0);
    let actions = h.finish();
    let arcs = of_kind(&actions, ActionKind::Circle);

    assert_eq!(arcs.len(), 3);
    for arc in &arcs[..2] {
        assert!((arc.distance - 100.0 * std::f64::consts::PI).abs() < 1e-9);
        assert_eq!(arc.radius, 100.0);
        assert!(!arc.clockwise);
        assert!(!arc.large_arc);
        assert!(arc.needs_delay);
    }
    assert!((arcs[2].distance - 10.0 * std::f64::consts::PI).abs() < 1e-9);
    assert_eq!(arcs[2].radius, 20.0);
    assert!(arcs[2].clockwise);
}

#[test]
fn circle_then_line_lands_where_formulas_say() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();

    // Half turn of radius 120 to the left: center (0, 120), ends at (0, 240)
    // facing west. The full circle of radius 10 is a round trip. The final
    // 100 units head west.
    t.circle(120.0, 180.0);
    assert!(close(t.pos(), DVec2::new(0.0, 240.0), 1e-9));
    t.circle(10.0, 360.0);
    t.forward(100.0);

    assert!(close(t.pos(), DVec2::new(-100.0, 240.0), 1e-9));
    assert!((t.heading() - 180.0).abs() < 1e-9);
    assert!(close(t.canvas_pos(), DVec2::new(300.0, 10.0), 1e-9));
}

#[test]
fn goto_round_trips_through_canvas() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    for (x, y) in [(0.0, 0.0), (120.25, -33.0), (-400.0, 250.0), (1e4, 1e-3)] {
        t.goto(x, y);
        assert!(close(t.pos(), DVec2::new(x, y), EPS));
        assert!(close(t.canvas_pos(), DVec2::new(x + 400.0, 250.0 - y), EPS));
        assert!(close(t.screen().canvas().to_logical(t.canvas_pos()), DVec2::new(x, y), EPS));
    }
}

#[test]
fn motion_distances_are_magnitudes() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.backward(50.0);
    t.forward(-20.0);
    t.goto(30.0, 40.0);
    t.circle(-15.0, -90.0);
    t.penup();
    t.home();
    t.teleport(3.0, 4.0);

    let actions = h.finish();
    assert!(actions.iter().all(|a| a.distance >= 0.0));
    let moves: Vec<f64> = of_turtle(&actions, actions[0].id)
        .iter()
        .filter(|a| a.needs_delay || a.kind == ActionKind::MoveAbsolute)
        .map(|a| a.distance)
        .collect();
    assert_eq!(moves[0], 50.0);
    assert_eq!(moves[1], 20.0);
    assert!((moves[2] - (100.0f64 * 100.0 + 40.0 * 40.0).sqrt()).abs() < 1e-9);
    assert!((moves[3] - 7.5 * std::f64::consts::PI).abs() < 1e-9);
    assert!((moves.last().unwrap() - 5.0).abs() < 1e-9);
}

#[test]
fn pen_state_selects_line_or_move() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.forward(10.0);
    t.penup();
    t.forward(10.0);
    t.circle(5.0, 90.0);
    t.pendown();
    t.teleport(0.0, 0.0);
    t.goto_with(1.0, 1.0, GotoOptions { need_delay: false });

    let kinds: Vec<ActionKind> = h
        .finish()
        .iter()
        .filter(|a| a.kind != ActionKind::UpdateState)
        .map(|a| a.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::LineAbsolute,
            ActionKind::MoveAbsolute,
            ActionKind::MoveAbsolute,
            ActionKind::MoveAbsolute,
            ActionKind::LineAbsolute,
        ]
    );
}

#[test]
fn towards_and_distance() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.forward(10.0);
    let bearing = t.towards(0.0, 0.0);
    assert!((bearing - 180.0).abs() < EPS);
    assert!((t.distance(0.0, 0.0) - 10.0).abs() < EPS);

    t.setheading(bearing);
    t.forward(10.0);
    assert!(t.pos().length() < 1e-5);
    // Coincident target keeps the heading.
    assert_eq!(t.towards(t.xcor(), t.ycor()), t.heading());
}

#[test]
fn setx_sety_keep_other_coordinate() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    t.goto(5.0, 6.0);
    t.setx(-2.0);
    assert_eq!(t.pos(), DVec2::new(-2.0, 6.0));
    t.sety(9.0);
    assert_eq!(t.pos(), DVec2::new(-2.0, 9.0));
}

#[test]
fn canvas_resize_applies_to_next_action() {
    let h = Harness::new();
    let mut t = h.session.turtle().unwrap();
    h.session.screen().setup(200, 100);
    t.forward(10.0);
    assert_eq!(t.canvas_pos(), DVec2::new(110.0, 50.0));
}
