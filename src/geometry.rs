//! Pose math for the turtle.
//!
//! Two coordinate spaces are in play:
//! * **Logical** space is centered on the canvas with `+y` pointing up. All
//!   turtle commands take and report logical coordinates.
//! * **Canvas** space has its origin at the top-left corner with `+y`
//!   pointing down. Every [`Action`](crate::Action) carries canvas coordinates.
//!
//! Headings are degrees measured counter-clockwise from `+x` in logical
//! space and are kept normalized to `[0, 360)`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Position and heading of a turtle in logical space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec2,
    pub heading: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            heading: 0.0,
        }
    }
}

impl Pose {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            heading: normalize_heading(heading),
        }
    }

    /// Unit vector pointing along the current heading.
    pub fn direction(&self) -> DVec2 {
        let rad = self.heading.to_radians();
        DVec2::new(rad.cos(), rad.sin())
    }
}

/// Canvas dimensions used to convert between the two spaces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
        }
    }

    pub fn to_canvas(&self, logical: DVec2) -> DVec2 {
        DVec2::new(logical.x + self.width / 2.0, self.height / 2.0 - logical.y)
    }

    pub fn to_logical(&self, canvas: DVec2) -> DVec2 {
        DVec2::new(canvas.x - self.width / 2.0, self.height / 2.0 - canvas.y)
    }
}

/// Folds any angle into `[0, 360)`.
pub fn normalize_heading(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if folded >= 360.0 { 0.0 } else { folded }
}

/// Moves `distance` units along the heading. Negative distances move backward.
pub fn forward(pose: Pose, distance: f64) -> Pose {
    Pose {
        position: pose.position + pose.direction() * distance,
        heading: pose.heading,
    }
}

/// Rotates counter-clockwise by `delta` degrees (clockwise when negative).
pub fn turn(pose: Pose, delta: f64) -> Pose {
    Pose {
        position: pose.position,
        heading: normalize_heading(pose.heading + delta),
    }
}

/// Result of sweeping one arc segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcStep {
    /// Pose at the end of the segment.
    pub pose: Pose,
    /// Center of the circle the segment lies on, in logical space.
    pub center: DVec2,
    /// True when the segment spans more than 180 degrees.
    pub large_arc: bool,
    /// True when the sweep runs clockwise as seen on screen.
    pub clockwise: bool,
    /// Arc length, always non-negative.
    pub length: f64,
}

/// Sweeps an arc of `extent` degrees on a circle of the given radius.
///
/// A positive radius turns counter-clockwise around a center 90 degrees to
/// the left of the heading; a negative radius turns clockwise around a center
/// to the right. A negative extent runs the same circle backwards. Callers
/// must keep `|extent| <= 180` (see [`decompose_extent`]).
pub fn arc(pose: Pose, radius: f64, extent: f64) -> ArcStep {
    debug_assert!(extent.abs() <= 180.0 + 1e-9);
    let sweep = radius.signum() * extent;
    let h = pose.heading.to_radians();
    let center = pose.position + DVec2::new(-h.sin(), h.cos()) * radius;

    let heading = pose.heading + sweep;
    let h_end = heading.to_radians();
    let position = center + DVec2::new(h_end.sin(), -h_end.cos()) * radius;

    ArcStep {
        pose: Pose {
            position,
            heading: normalize_heading(heading),
        },
        center,
        large_arc: extent.abs() > 180.0,
        clockwise: sweep < 0.0,
        length: radius.abs() * extent.abs().to_radians(),
    }
}

/// Splits a sweep into pieces of at most 180 degrees, preserving its sign.
/// A non-finite sweep yields no pieces.
pub fn decompose_extent(extent: f64) -> Vec<f64> {
    let mut pieces = Vec::new();
    if !extent.is_finite() {
        return pieces;
    }
    let sign = extent.signum();
    let mut remaining = extent.abs();
    while remaining > 180.0 {
        pieces.push(180.0 * sign);
        remaining -= 180.0;
    }
    if remaining > 0.0 {
        pieces.push(remaining * sign);
    }
    pieces
}

/// Bearing from the pose to `target`, normalized. Returns the current
/// heading when the target coincides with the position.
pub fn towards(pose: Pose, target: DVec2) -> f64 {
    let delta = target - pose.position;
    if delta == DVec2::ZERO {
        return pose.heading;
    }
    normalize_heading(delta.y.atan2(delta.x).to_degrees())
}

pub fn distance(a: DVec2, b: DVec2) -> f64 {
    a.distance(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: DVec2, b: DVec2, eps: f64) -> bool {
        (a - b).length() < eps
    }

    #[test]
    fn canvas_round_trip() {
        let canvas = Canvas::new(800, 500);
        let logical = DVec2::new(-120.5, 33.25);
        let c = canvas.to_canvas(logical);
        assert_eq!(c, DVec2::new(279.5, 216.75));
        assert!(close(canvas.to_logical(c), logical, EPS));
    }

    #[test]
    fn forward_and_back_cancel() {
        let start = Pose::new(3.0, -7.0, 33.0);
        for d in [0.0, 1.0, 17.5, -250.0, 1e6] {
            let back = forward(forward(start, d), -d);
            assert!(close(back.position, start.position, 1e-9 * d.abs().max(1.0)));
            assert_eq!(back.heading, start.heading);
        }
    }

    #[test]
    fn headings_are_normalized() {
        assert_eq!(normalize_heading(450.0), 90.0);
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(-1e-20), 0.0);
        assert_eq!(turn(Pose::default(), -90.0).heading, 270.0);
    }

    #[test]
    fn semicircle_lands_two_radii_left() {
        let step = arc(Pose::default(), 50.0, 180.0);
        assert!(close(step.center, DVec2::new(0.0, 50.0), EPS));
        assert!(close(step.pose.position, DVec2::new(0.0, 100.0), 1e-9));
        assert!((step.pose.heading - 180.0).abs() < EPS);
        assert!(!step.clockwise);
        assert!(!step.large_arc);
        assert!((step.length - 50.0 * std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn negative_radius_turns_right() {
        let step = arc(Pose::default(), -50.0, 90.0);
        assert!(close(step.center, DVec2::new(0.0, -50.0), EPS));
        assert!(close(step.pose.position, DVec2::new(50.0, -50.0), 1e-9));
        assert!((step.pose.heading - 270.0).abs() < EPS);
        assert!(step.clockwise);
        assert!(step.length > 0.0);
    }

    #[test]
    fn extents_split_at_half_turns() {
        assert_eq!(decompose_extent(360.0), vec![180.0, 180.0]);
        assert_eq!(decompose_extent(450.0), vec![180.0, 180.0, 90.0]);
        assert_eq!(decompose_extent(-200.0), vec![-180.0, -20.0]);
        assert_eq!(decompose_extent(180.0), vec![180.0]);
        assert!(decompose_extent(0.0).is_empty());
        assert!(decompose_extent(f64::INFINITY).is_empty());
        assert!(decompose_extent(f64::NEG_INFINITY).is_empty());
        assert!(decompose_extent(f64::NAN).is_empty());
    }

    #[test]
    fn towards_uses_logical_bearing() {
        let pose = Pose::new(10.0, 0.0, 0.0);
        assert!((towards(pose, DVec2::ZERO) - 180.0).abs() < EPS);
        assert!((towards(pose, DVec2::new(10.0, -5.0)) - 270.0).abs() < EPS);
        assert_eq!(towards(Pose::new(1.0, 1.0, 42.0), DVec2::new(1.0, 1.0)), 42.0);
    }
}
