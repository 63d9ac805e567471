//! # Hand Geometry
//!
//! Builds the outline of a clock hand: a tapered blade that widens toward the pivot, unioned with
//! a round hub centered on the pivot. Paths are built in display coordinates pointing straight up
//! (toward decreasing Y) and emitted as [`tiny_skia::Path`]s; the angle a hand shows is applied
//! later as a [`Transform`] from [`rotate_about`].

use tiny_skia::{Path, PathBuilder, Rect, Transform};

/// Point or vector in display coordinates (Y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point at `radius` from `self` along a dial angle (0° = up, clockwise positive).
    pub fn polar(self, radius: f32, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(self.x + sin * radius, self.y - cos * radius)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(center.x - width / 2.0, center.y - height / 2.0),
            max: Vec2::new(center.x + width / 2.0, center.y + height / 2.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// True when the boxes share interior area; touching edges do not count.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Clockwise (on screen) rotation by `degrees` about `pivot`.
///
/// Rotations about one pivot compose with [`Transform::pre_concat`], which is how the composer
/// walks hour → minute → second without re-deriving absolute angles.
pub fn rotate_about(pivot: Vec2, degrees: f32) -> Transform {
    Transform::from_rotate_at(degrees, pivot.x, pivot.y)
}

/// Circular hub at the hand's pivot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hub {
    pub center: Vec2,
    pub radius: f32,
}

/// Closed hand outline: tapered blade ∪ hub, pointing up from `pivot`.
#[derive(Clone, Debug)]
pub struct HandPath {
    pivot: Vec2,
    length: f32,
    /// Closed ring, first vertex repeated last. Empty for a degenerate hand.
    blade: Vec<Vec2>,
    hub: Option<Hub>,
    outline: Option<Path>,
}

/// Where the blade starts to narrow, as a fraction of the hand length.
const SHOULDER: f32 = 0.75;
/// Hub radius is `width / HUB_DIVISOR`.
const HUB_DIVISOR: f32 = 1.5;

/// Build a hand of `length` and `width` pivoting at `pivot`.
///
/// Non-positive (or NaN) dimensions give an empty path, which draws as an invisible hand.
pub fn build_hand_path(pivot: Vec2, length: f32, width: f32) -> HandPath {
    if !(length > 0.0 && width > 0.0) {
        return HandPath {
            pivot,
            length: 0.0,
            blade: Vec::new(),
            hub: None,
            outline: None,
        };
    }

    let Vec2 { x, y } = pivot;
    let blade = vec![
        Vec2::new(x - width / 3.0, y),
        Vec2::new(x - width / 2.0, y - length * SHOULDER),
        Vec2::new(x, y - length),
        Vec2::new(x + width / 2.0, y - length * SHOULDER),
        Vec2::new(x + width / 3.0, y),
        Vec2::new(x - width / 3.0, y),
    ];
    let hub = Hub {
        center: pivot,
        radius: width / HUB_DIVISOR,
    };

    let mut pb = PathBuilder::new();
    pb.move_to(blade[0].x, blade[0].y);
    for v in &blade[1..blade.len() - 1] {
        pb.line_to(v.x, v.y);
    }
    pb.close();
    pb.push_circle(hub.center.x, hub.center.y, hub.radius);

    HandPath {
        pivot,
        length,
        blade,
        hub: Some(hub),
        outline: pb.finish(),
    }
}

impl HandPath {
    pub fn is_empty(&self) -> bool {
        self.outline.is_none()
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Blade vertices as a closed ring.
    pub fn blade(&self) -> &[Vec2] {
        &self.blade
    }

    pub fn hub(&self) -> Option<Hub> {
        self.hub
    }

    /// Blade and hub as one path, or `None` for an empty hand.
    pub fn outline(&self) -> Option<&Path> {
        self.outline.as_ref()
    }

    /// Y coordinate (unrotated) beyond which the accent section of the hand begins.
    ///
    /// The accent covers everything farther than `fraction × length` from the pivot.
    pub fn accent_boundary(&self, fraction: f32) -> f32 {
        self.pivot.y - self.length * fraction
    }

    /// Unrotated region past the accent boundary, grown sideways and beyond the tip by `margin`.
    ///
    /// `None` when the hand is empty or the boundary sits at or past the tip.
    pub fn accent_region(&self, fraction: f32, margin: f32) -> Option<Path> {
        if self.is_empty() || !(fraction < 1.0) {
            return None;
        }
        let half_width = self.blade.iter().map(|v| (v.x - self.pivot.x).abs()).fold(0.0, f32::max);
        let reach = half_width + margin.max(0.0);
        let rect = Rect::from_ltrb(
            self.pivot.x - reach,
            self.pivot.y - self.length - margin.max(0.0),
            self.pivot.x + reach,
            self.accent_boundary(fraction),
        )?;
        Some(PathBuilder::from_rect(rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Point;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn mapped(transform: Transform, p: Vec2) -> Vec2 {
        let mut points = [Point::from_xy(p.x, p.y)];
        transform.map_points(&mut points);
        Vec2::new(points[0].x, points[0].y)
    }

    #[test]
    fn test_blade_is_closed_six_vertex_ring() {
        let path = build_hand_path(Vec2::new(100.0, 100.0), 50.0, 6.0);
        let blade = path.blade();
        assert_eq!(blade.len(), 6);
        assert_eq!(blade.first(), blade.last());
        // Tip is straight above the pivot
        assert_eq!(blade[2], Vec2::new(100.0, 50.0));
        // Widest point is the shoulder at 3/4 of the length
        assert!(approx(blade[3].x - blade[1].x, 6.0));
        assert!(approx(blade[1].y, 100.0 - 37.5));
    }

    #[test]
    fn test_hub_radius_follows_width() {
        let path = build_hand_path(Vec2::new(0.0, 0.0), 10.0, 3.0);
        let hub = path.hub().unwrap();
        assert!(approx(hub.radius, 2.0));
        assert_eq!(hub.center, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_degenerate_dimensions_give_empty_path() {
        for (length, width) in [(0.0, 5.0), (5.0, 0.0), (-1.0, 5.0), (5.0, -2.0), (f32::NAN, 1.0)] {
            let path = build_hand_path(Vec2::new(10.0, 10.0), length, width);
            assert!(path.is_empty(), "{length}x{width} should be empty");
            assert!(path.outline().is_none());
            assert!(path.accent_region(0.25, 1.0).is_none());
        }
    }

    #[test]
    fn test_outline_spans_blade_and_hub() {
        let path = build_hand_path(Vec2::new(50.0, 50.0), 40.0, 6.0);
        let b = path.outline().unwrap().bounds();
        // Tip above, hub below the pivot where the blade does not reach
        assert!(approx(b.top(), 10.0));
        assert!(approx(b.bottom(), 54.0));
        // The hub is wider than the blade's shoulder
        assert!(approx(b.left(), 46.0) && approx(b.right(), 54.0));
    }

    #[test]
    fn test_rotation_is_clockwise_on_screen() {
        let pivot = Vec2::new(100.0, 100.0);
        let up = Vec2::new(100.0, 50.0);
        let p = mapped(rotate_about(pivot, 90.0), up);
        assert!(approx(p.x, 150.0) && approx(p.y, 100.0));
        let q = mapped(rotate_about(pivot, 180.0), up);
        assert!(approx(q.x, 100.0) && approx(q.y, 150.0));
    }

    #[test]
    fn test_rotations_compose_cumulatively() {
        let pivot = Vec2::new(20.0, 30.0);
        let chained = rotate_about(pivot, 30.0)
            .pre_concat(rotate_about(pivot, 45.0))
            .pre_concat(rotate_about(pivot, -15.0));
        let direct = rotate_about(pivot, 60.0);
        let p = Vec2::new(20.0, 0.0);
        let (a, b) = (mapped(chained, p), mapped(direct, p));
        assert!(approx(a.x, b.x) && approx(a.y, b.y));
    }

    #[test]
    fn test_accent_boundary() {
        let path = build_hand_path(Vec2::new(0.0, 90.0), 90.0, 4.0);
        assert!(approx(path.accent_boundary(1.0 / 3.0), 60.0));
    }

    #[test]
    fn test_accent_region_covers_outer_part_only() {
        let path = build_hand_path(Vec2::new(0.0, 90.0), 90.0, 4.0);
        let region = path.accent_region(1.0 / 3.0, 2.0).unwrap().bounds();
        assert!(approx(region.bottom(), 60.0));
        assert!(approx(region.top(), -2.0));
        assert!(region.left() <= -2.0 && region.right() >= 2.0);
        // Boundary at the tip leaves nothing to accent
        assert!(path.accent_region(1.0, 2.0).is_none());
    }

    #[test]
    fn test_polar_points_follow_dial_angles() {
        let c = Vec2::new(0.0, 0.0);
        let three = c.polar(10.0, 90.0);
        assert!(approx(three.x, 10.0) && approx(three.y, 0.0));
        let six = c.polar(10.0, 180.0);
        assert!(approx(six.x, 0.0) && approx(six.y, 10.0));
    }

    #[test]
    fn test_bounds_intersection_excludes_touching() {
        let a = Bounds::from_center(Vec2::new(0.0, 0.0), 2.0, 2.0);
        let b = Bounds::from_center(Vec2::new(2.0, 0.0), 2.0, 2.0);
        let c = Bounds::from_center(Vec2::new(1.5, 0.0), 2.0, 2.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
    }
}
