// Closed-form 2D geometry for the shape silhouettes
//
// Everything here is total: zero or negative sizes produce collapsed,
// zero-area outlines instead of panicking.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A point in screen space (Y grows downward)
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its top-left corner and extent
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding square of a shape at `(x, y)` with side `size`
    pub const fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(x, y, size, size)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Isosceles triangle inscribed in `bounds`, apex up
pub fn triangle_points(bounds: Rect) -> [Point; 3] {
    [
        Point::new(bounds.x + bounds.width / 2.0, bounds.y), // apex
        Point::new(bounds.x, bounds.bottom()),               // bottom left
        Point::new(bounds.right(), bounds.bottom()),         // bottom right
    ]
}

/// Five-point star inscribed in `bounds`
///
/// Vertices alternate between the outer radius (half the width) and the
/// inner radius (a quarter of the width), starting at the top and walking
/// counter-clockwise in 36° steps.
pub fn star_points(bounds: Rect) -> [Point; 10] {
    let center = bounds.center();
    let outer = bounds.width / 2.0;
    let inner = bounds.width / 4.0;

    let mut points = [Point::default(); 10];
    for (i, point) in points.iter_mut().enumerate() {
        let angle = PI / 2.0 + i as f64 * PI / 5.0;
        let radius = if i % 2 == 0 { outer } else { inner };
        *point = Point::new(
            center.x + (radius as f64 * angle.cos()) as f32,
            // screen Y points down, so the sine is subtracted
            center.y - (radius as f64 * angle.sin()) as f32,
        );
    }
    points
}

/// Specular spot for a circle: offset toward the upper left, 30% of the size
pub fn highlight_rect(bounds: Rect) -> Rect {
    let size = bounds.width;
    Rect::square(bounds.x + size * 0.2, bounds.y + size * 0.1, size * 0.3)
}

/// Closed outline of a rectangle with rounded corners
///
/// Each corner is a quarter arc approximated by `segments` line segments.
/// The radius is clamped to half of the shorter side; a non-positive radius
/// yields the plain four corners.
pub fn rounded_rect_path(rect: Rect, radius: f32, segments: usize) -> Vec<Point> {
    let max_radius = (rect.width.min(rect.height) / 2.0).max(0.0);
    let radius = radius.min(max_radius);

    if radius <= 0.0 || segments == 0 {
        return vec![
            Point::new(rect.x, rect.y),
            Point::new(rect.right(), rect.y),
            Point::new(rect.right(), rect.bottom()),
            Point::new(rect.x, rect.bottom()),
        ];
    }

    // Arc centers and start angles, clockwise from the top-left corner
    let corners = [
        (rect.x + radius, rect.y + radius, 180.0_f64),
        (rect.right() - radius, rect.y + radius, 270.0),
        (rect.right() - radius, rect.bottom() - radius, 0.0),
        (rect.x + radius, rect.bottom() - radius, 90.0),
    ];

    let mut path = Vec::with_capacity(4 * (segments + 1));
    for (cx, cy, start) in corners {
        for step in 0..=segments {
            let angle = (start + 90.0 * step as f64 / segments as f64).to_radians();
            path.push(Point::new(
                cx + (radius as f64 * angle.cos()) as f32,
                cy + (radius as f64 * angle.sin()) as f32,
            ));
        }
    }
    path
}

/// Signed area of a closed polygon (shoelace formula)
pub fn signed_area(points: &[Point]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        twice_area += a.x * b.y - b.x * a.y;
    }
    twice_area / 2.0
}
