use super::geometry::{highlight_rect, star_points, triangle_points, Rect};
use super::ShapeKind;
use crate::palette::{Color, COLOR_PAIRS, HIGHLIGHT, SQUARE_BORDER};
use crate::surface::{Brush, Gradient, GradientDirection, Pen, Surface};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Smallest and largest (exclusive) side length the random factory picks
const RANDOM_SIZE: std::ops::Range<i32> = 25..55;

/// Distance the random factory keeps from the viewport edges
const RANDOM_MARGIN: i32 = 10;

/// A shape that drifts across a viewport and bounces off its edges
///
/// `position` is the top-left corner of the shape's bounding square and
/// `velocity` is the displacement applied on every tick. Both are mutated in
/// place by `advance`; nothing else changes after construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatedShape {
    position: (f32, f32),
    velocity: (f32, f32),
    size: f32,
    primary: Color,
    secondary: Color,
    kind: ShapeKind,
}

impl AnimatedShape {
    /// Create a shape with explicit state
    ///
    /// No validation is done: a zero velocity keeps the shape still and a
    /// negative size simply draws nothing.
    ///
    /// # Arguments
    /// * `position` - Top-left corner of the bounding square (pixels)
    /// * `size` - Side of the bounding square (pixels)
    /// * `velocity` - Displacement per tick on each axis
    /// * `primary` - Gradient start color (top-left)
    /// * `secondary` - Gradient end color (bottom-right)
    /// * `kind` - Which figure is drawn inside the bounding square
    pub fn new(
        position: (f32, f32),
        size: f32,
        velocity: (f32, f32),
        primary: Color,
        secondary: Color,
        kind: ShapeKind,
    ) -> Self {
        Self {
            position,
            velocity,
            size,
            primary,
            secondary,
            kind,
        }
    }

    /// Random shape that fits inside a `max_width` x `max_height` viewport
    ///
    /// The random source is passed in so callers can seed it.
    ///
    /// # Arguments
    /// * `rng` - Random source (seed it for reproducible shapes)
    /// * `max_width` - Viewport width the shape is placed in
    /// * `max_height` - Viewport height the shape is placed in
    pub fn random<R: Rng + ?Sized>(rng: &mut R, max_width: u32, max_height: u32) -> Self {
        Self::random_of(rng, max_width, max_height, &ShapeKind::ALL)
    }

    /// Like `random`, but picks the kind from `kinds` (all kinds when empty)
    pub fn random_of<R: Rng + ?Sized>(
        rng: &mut R,
        max_width: u32,
        max_height: u32,
        kinds: &[ShapeKind],
    ) -> Self {
        let (primary, secondary) = COLOR_PAIRS[rng.gen_range(0..COLOR_PAIRS.len())];

        let size = rng.gen_range(RANDOM_SIZE);

        // Keep a margin on both sides; a viewport too small for that
        // collapses the range to the single value 10
        let x = rng.gen_range(RANDOM_MARGIN..span_end(max_width, size));
        let y = rng.gen_range(RANDOM_MARGIN..span_end(max_height, size));

        let vx = random_speed(rng);
        let vy = random_speed(rng);

        let kinds = if kinds.is_empty() {
            &ShapeKind::ALL[..]
        } else {
            kinds
        };
        let kind = *kinds.choose(rng).unwrap_or(&ShapeKind::Circle);

        Self::new(
            (x as f32, y as f32),
            size as f32,
            (vx as f32, vy as f32),
            primary,
            secondary,
            kind,
        )
    }

    /// Move one tick and bounce off the viewport edges
    ///
    /// Both coordinates are updated before either axis is tested, and the
    /// two axes react independently, so a shape driven into a corner flips
    /// both velocity components in the same tick. After the call the
    /// position lies in `[0, bound - size]` on each axis; when the viewport
    /// is smaller than the shape it is pinned to 0.
    pub fn advance(&mut self, bounds_width: f32, bounds_height: f32) {
        self.position.0 += self.velocity.0;
        self.position.1 += self.velocity.1;

        let bounced_x = bounce(&mut self.position.0, &mut self.velocity.0, bounds_width - self.size);
        let bounced_y = bounce(&mut self.position.1, &mut self.velocity.1, bounds_height - self.size);

        if bounced_x || bounced_y {
            log::trace!(
                "{} bounced at ({:.1}, {:.1}), velocity now ({}, {})",
                self.kind,
                self.position.0,
                self.position.1,
                self.velocity.0,
                self.velocity.1
            );
        }
    }

    /// Draw the shape with a diagonal gradient between its two colors
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let bounds = self.bounds();
        let brush = Brush::Gradient(Gradient::linear(
            bounds,
            self.primary,
            self.secondary,
            GradientDirection::ForwardDiagonal,
        ));

        match self.kind {
            ShapeKind::Circle => {
                surface.fill_ellipse(bounds, &brush);
                surface.fill_ellipse(highlight_rect(bounds), &Brush::Solid(HIGHLIGHT));
            }
            ShapeKind::Square => {
                surface.fill_rect(bounds, &brush);
                surface.stroke_rect(bounds, Pen::new(SQUARE_BORDER, 2.0));
            }
            ShapeKind::Triangle => surface.fill_polygon(&triangle_points(bounds), &brush),
            ShapeKind::Star => surface.fill_polygon(&star_points(bounds), &brush),
        }
    }

    /// Top-left corner of the bounding square
    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    /// Displacement applied on the next tick
    pub fn velocity(&self) -> (f32, f32) {
        self.velocity
    }

    /// Side length of the bounding square
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Gradient start and end colors
    pub fn colors(&self) -> (Color, Color) {
        (self.primary, self.secondary)
    }

    /// Bounding square at the current position
    pub fn bounds(&self) -> Rect {
        Rect::square(self.position.0, self.position.1, self.size)
    }
}

/// Exclusive upper end of the factory's placement range on one axis
fn span_end(extent: u32, size: i32) -> i32 {
    let extent = i32::try_from(extent).unwrap_or(i32::MAX);
    extent
        .saturating_sub(size)
        .saturating_sub(RANDOM_MARGIN)
        .max(RANDOM_MARGIN + 1)
}

/// Magnitude 1..=3 with a random sign, never zero
fn random_speed<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    let magnitude = rng.gen_range(1..4);
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

/// Reflect one axis if the position touched either edge, then clamp
///
/// Returns true when the velocity was flipped.
fn bounce(position: &mut f32, velocity: &mut f32, max: f32) -> bool {
    if *position <= 0.0 || *position >= max {
        *velocity = -*velocity;
        // `f32::clamp` panics when max < 0, so apply the bounds one at a time
        *position = position.min(max).max(0.0);
        true
    } else {
        false
    }
}
