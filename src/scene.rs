// A scene owns an ordered list of shapes
//
// Order matters: shapes are rendered in insertion order, so later shapes
// are painted on top of earlier ones. Shapes never interact with each other,
// only with the viewport edges.

use crate::shapes::AnimatedShape;
use crate::surface::Surface;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Most shapes a host lets into a scene
///
/// Scene does not enforce this itself; `Animator::add_random` does.
pub const MAX_SHAPES: usize = 20;

/// Shapes a freshly created or reset animation starts with
pub const INITIAL_SHAPES: usize = 5;

/// The shapes on one animation panel
///
/// A scene only stores and iterates; the capacity limit and the tick timing
/// belong to the host (`Animator`). Serializes to a plain list of shapes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    shapes: Vec<AnimatedShape>,
}

impl Scene {
    /// Empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `count` random shapes for the given viewport
    ///
    /// # Arguments
    /// * `rng` - Random source handed to `AnimatedShape::random`
    /// * `count` - Number of shapes after the call
    /// * `width` - Viewport width the shapes are placed in
    /// * `height` - Viewport height the shapes are placed in
    pub fn populate<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize, width: u32, height: u32) {
        self.shapes.clear();
        self.shapes
            .extend((0..count).map(|_| AnimatedShape::random(rng, width, height)));
    }

    /// Append a shape; it is drawn above everything already in the scene
    pub fn add(&mut self, shape: AnimatedShape) {
        self.shapes.push(shape);
    }

    /// Remove every shape
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Advance every shape one tick against the current viewport
    pub fn advance_all(&mut self, bounds_width: f32, bounds_height: f32) {
        for shape in &mut self.shapes {
            shape.advance(bounds_width, bounds_height);
        }
    }

    /// Render every shape in insertion order
    pub fn render_all<S: Surface + ?Sized>(&self, surface: &mut S) {
        for shape in &self.shapes {
            shape.render(surface);
        }
    }

    /// Shapes in drawing order, bottom first
    pub fn shapes(&self) -> &[AnimatedShape] {
        &self.shapes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnimatedShape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl<'a> IntoIterator for &'a Scene {
    type Item = &'a AnimatedShape;
    type IntoIter = std::slice::Iter<'a, AnimatedShape>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
