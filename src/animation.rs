// The host side of the animation: a tick driver around a Scene
//
// The animator plays the role of the panel timer. It owns the scene, knows
// whether it is running, enforces the shape capacity and renders complete
// frames onto the panel background. Ticks are plain synchronous calls, so a
// caller that never overlaps them gets the single-threaded guarantees the
// scene relies on.

use crate::error::AnimationError;
use crate::palette::{argb, rgb, Color, PANEL_BACKGROUND};
use crate::raster::RasterSurface;
use crate::scene::{Scene, INITIAL_SHAPES, MAX_SHAPES};
use crate::shapes::geometry::{Point, Rect};
use crate::shapes::{AnimatedShape, ShapeKind};
use crate::surface::{draw_rounded_rect, Brush, Pen};
use crate::text::{draw_text_with_shadow, Label, Typeface, PX_PER_POINT};
use image::RgbaImage;
use rand::Rng;
use std::time::Duration;

/// Smallest viewport used when seeding the initial shapes
const MIN_SEED_VIEWPORT: u32 = 100;

/// Where a backdrop image is placed on the panel
const BACKDROP_OFFSET: i64 = 10;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Caption drawn across the top of every frame when a font is set
pub const TITLE: &str = "Анимация";

/// 14pt
const TITLE_SIZE: f32 = 14.0 * PX_PER_POINT;
/// The title is centred horizontally with its top this far down
const TITLE_TOP: f32 = 10.0;
const TITLE_COLOR: Color = rgb(255, 255, 255);
const TITLE_SHADOW: Color = argb(100, 0, 0, 0);
const TITLE_SHADOW_OFFSET: i64 = 2;

/// Outline of the optional panel frame
const FRAME_PEN: Pen = Pen::new([90, 90, 110, 255], 1.0);

/// Settings for an animation panel
#[derive(Clone, Debug)]
pub struct AnimationConfig {
    /// Viewport width in pixels
    pub width: u32,

    /// Viewport height in pixels
    pub height: u32,

    /// Shapes created on start and on reset
    pub initial_shapes: usize,

    /// Capacity enforced by `Animator::add_random`
    pub max_shapes: usize,

    /// Time between ticks
    pub interval: Duration,

    /// Panel fill behind the shapes
    pub background: Color,

    /// Corner radius of a frame drawn around the panel; no frame when `None`
    pub frame_radius: Option<f32>,

    /// Kinds the random factory may pick (all kinds when empty)
    pub kinds: Vec<ShapeKind>,

    /// Font for the shadowed title; frames carry no title when `None`
    pub title_font: Option<Typeface>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 300,
            initial_shapes: INITIAL_SHAPES,
            max_shapes: MAX_SHAPES,
            interval: Duration::from_millis(16), // roughly 60 ticks per second
            background: PANEL_BACKGROUND,
            frame_radius: None,
            kinds: ShapeKind::ALL.to_vec(),
            title_font: None,
        }
    }
}

/// Drives a scene one tick at a time
#[derive(Clone, Debug)]
pub struct Animator {
    scene: Scene,
    config: AnimationConfig,
    running: bool,
    ticks: u64,
}

impl Animator {
    /// Running animator seeded with `config.initial_shapes` random shapes
    ///
    /// # Arguments
    /// * `config` - Panel settings (viewport, capacity, interval, look)
    /// * `rng` - Random source for the initial shapes
    pub fn new<R: Rng + ?Sized>(config: AnimationConfig, rng: &mut R) -> Self {
        let mut animator = Self {
            scene: Scene::new(),
            config,
            running: true,
            ticks: 0,
        };
        animator.seed_scene(rng);
        animator
    }

    /// Resume ticking; the scene continues from where it stopped
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Pause ticking; `tick` becomes a no-op until `start`
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether `tick` currently advances the scene
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance every shape against a `width` x `height` viewport
    ///
    /// The viewport may change from tick to tick (a resized window); it is
    /// remembered for later frames and random shapes. Returns false without
    /// touching the scene while stopped.
    pub fn tick(&mut self, width: u32, height: u32) -> bool {
        if !self.running {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.scene.advance_all(width as f32, height as f32);
        self.ticks += 1;
        true
    }

    /// Add one random shape sized to the current viewport
    pub fn add_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), AnimationError> {
        let limit = self.config.max_shapes;
        if self.scene.len() >= limit {
            log::warn!("shape limit of {} reached, not adding another", limit);
            return Err(AnimationError::CapacityReached { limit });
        }

        let shape = AnimatedShape::random_of(
            rng,
            self.config.width,
            self.config.height,
            &self.config.kinds,
        );
        log::debug!(
            "adding {} of size {} at ({}, {})",
            shape.kind(),
            shape.size(),
            shape.position().0,
            shape.position().1
        );
        self.scene.add(shape);
        Ok(())
    }

    /// Start over with a fresh set of initial shapes
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.seed_scene(rng);
        self.ticks = 0;
        log::debug!("scene reset with {} shapes", self.scene.len());
    }

    /// Ticks applied since creation or the last `reset`
    ///
    /// Ticks ignored while stopped are not counted.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Animation time covered by the ticks so far
    ///
    /// Counts every tick (no `u32` truncation) and saturates at
    /// `Duration::MAX`.
    pub fn elapsed(&self) -> Duration {
        let nanos = self
            .config
            .interval
            .as_nanos()
            .saturating_mul(self.ticks as u128);
        let secs = nanos / NANOS_PER_SEC;
        match u64::try_from(secs) {
            Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
            Err(_) => Duration::MAX,
        }
    }

    /// The shapes being animated
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Current settings; `width`/`height` follow the last tick's viewport
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Render the current scene onto a fresh panel-sized canvas
    pub fn render_frame(&self) -> RasterSurface {
        self.render_scene(&self.scene, None)
    }

    /// Like `render_frame`, with `backdrop` composited beneath the shapes
    pub fn render_frame_with(&self, backdrop: &RgbaImage) -> RasterSurface {
        self.render_scene(&self.scene, Some(backdrop))
    }

    /// Render any scene (such as a saved snapshot) with this panel's settings
    ///
    /// Layers, bottom to top: background, optional frame, backdrop, shapes
    /// in scene order, then the title when a font is configured.
    pub fn render_scene(&self, scene: &Scene, backdrop: Option<&RgbaImage>) -> RasterSurface {
        let mut surface =
            RasterSurface::new(self.config.width, self.config.height, self.config.background);

        if let Some(radius) = self.config.frame_radius {
            let panel = Rect::new(
                0.0,
                0.0,
                self.config.width.saturating_sub(1) as f32,
                self.config.height.saturating_sub(1) as f32,
            );
            draw_rounded_rect(
                &mut surface,
                panel,
                radius,
                &Brush::Solid(self.config.background),
                Some(FRAME_PEN),
            );
        }

        if let Some(image) = backdrop {
            surface.draw_image(image, BACKDROP_OFFSET, BACKDROP_OFFSET);
        }

        scene.render_all(&mut surface);

        if let Some(typeface) = &self.config.title_font {
            let (text_width, _) = typeface.measure(TITLE, TITLE_SIZE);
            let x = (self.config.width as f32 - text_width as f32) / 2.0;
            let label = Label::new(TITLE, TITLE_SIZE, Point::new(x, TITLE_TOP));
            draw_text_with_shadow(
                &mut surface,
                typeface,
                &label,
                TITLE_COLOR,
                TITLE_SHADOW,
                TITLE_SHADOW_OFFSET,
            );
        }
        surface
    }

    fn seed_scene<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let width = self.config.width.max(MIN_SEED_VIEWPORT);
        let height = self.config.height.max(MIN_SEED_VIEWPORT);
        let count = self.config.initial_shapes.min(self.config.max_shapes);

        self.scene.clear();
        for _ in 0..count {
            self.scene.add(AnimatedShape::random_of(
                rng,
                width,
                height,
                &self.config.kinds,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn animator(seed: u64) -> (Animator, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let animator = Animator::new(AnimationConfig::default(), &mut rng);
        (animator, rng)
    }

    #[test]
    fn test_starts_running_with_initial_shapes() {
        let (animator, _) = animator(1);
        assert!(animator.is_running());
        assert_eq!(animator.scene().len(), INITIAL_SHAPES);
        assert_eq!(animator.ticks(), 0);
    }

    #[test]
    fn test_stopped_animator_ignores_ticks() {
        let (mut animator, _) = animator(2);
        let before = animator.scene().clone();

        animator.stop();
        assert!(!animator.tick(400, 300));
        assert_eq!(animator.scene(), &before);
        assert_eq!(animator.ticks(), 0);

        animator.start();
        assert!(animator.tick(400, 300));
        assert_ne!(animator.scene(), &before);
        assert_eq!(animator.ticks(), 1);
        assert_eq!(animator.elapsed(), Duration::from_millis(16));
    }

    #[test]
    fn test_elapsed_saturates_on_huge_interval() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = AnimationConfig {
            interval: Duration::from_millis(u64::MAX),
            initial_shapes: 0,
            ..AnimationConfig::default()
        };
        let mut animator = Animator::new(config, &mut rng);
        for _ in 0..2000 {
            animator.tick(400, 300);
        }
        assert_eq!(animator.ticks(), 2000);
        assert_eq!(animator.elapsed(), Duration::MAX);
    }

    #[test]
    fn test_elapsed_counts_past_u32_ticks() {
        let (mut animator, _) = animator(10);
        animator.config.interval = Duration::from_nanos(1);
        animator.ticks = u32::MAX as u64 + 5;
        assert_eq!(animator.elapsed(), Duration::from_nanos(u32::MAX as u64 + 5));
    }

    #[test]
    fn test_capacity_guard() {
        let (mut animator, mut rng) = animator(3);
        while animator.scene().len() < MAX_SHAPES {
            animator.add_random(&mut rng).unwrap();
        }

        let before = animator.scene().clone();
        let err = animator.add_random(&mut rng).unwrap_err();
        assert!(matches!(err, AnimationError::CapacityReached { limit: MAX_SHAPES }));
        assert_eq!(animator.scene(), &before);
    }

    #[test]
    fn test_reset_restores_initial_population() {
        let (mut animator, mut rng) = animator(4);
        for _ in 0..5 {
            animator.add_random(&mut rng).unwrap();
        }
        animator.tick(400, 300);

        animator.reset(&mut rng);
        assert_eq!(animator.scene().len(), INITIAL_SHAPES);
        assert_eq!(animator.ticks(), 0);
    }

    #[test]
    fn test_tiny_viewport_still_seeds() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = AnimationConfig {
            width: 0,
            height: 0,
            ..AnimationConfig::default()
        };
        let mut animator = Animator::new(config, &mut rng);
        assert_eq!(animator.scene().len(), INITIAL_SHAPES);

        // Ticking against an empty viewport must not panic
        animator.tick(0, 0);
        let frame = animator.render_frame();
        assert_eq!(frame.dimensions(), (0, 0));
    }

    #[test]
    fn test_frame_uses_viewport_and_background() {
        let mut rng = StdRng::seed_from_u64(6);
        let config = AnimationConfig {
            initial_shapes: 0,
            ..AnimationConfig::default()
        };
        let mut animator = Animator::new(config, &mut rng);
        animator.tick(64, 48);

        let frame = animator.render_frame();
        assert_eq!(frame.dimensions(), (64, 48));
        assert!(frame.image().pixels().all(|p| p.0 == PANEL_BACKGROUND));
    }

    #[test]
    fn test_title_drawn_over_shapes() {
        let Some(typeface) = crate::text::system_typeface() else {
            return;
        };
        let mut rng = StdRng::seed_from_u64(11);
        let config = AnimationConfig {
            initial_shapes: 0,
            title_font: Some(typeface.clone()),
            ..AnimationConfig::default()
        };
        let animator = Animator::new(config, &mut rng);
        let frame = animator.render_frame();

        let (text_width, text_height) = typeface.measure(TITLE, TITLE_SIZE);
        let left = (400 - text_width) / 2;
        let band = |x: u32, y: u32| frame.image().get_pixel(x, y).0;

        // Antialiased glyph cores come out near white over the dark panel
        let inked = (left..left + text_width)
            .flat_map(|x| (10..10 + text_height).map(move |y| (x, y)))
            .filter(|&(x, y)| band(x, y)[0] > 200)
            .count();
        assert!(inked > 20, "only {} title pixels", inked);

        // Everything away from the title keeps the background
        assert_eq!(band(5, 150), PANEL_BACKGROUND);
        assert_eq!(band(200, 200), PANEL_BACKGROUND);
    }

    #[test]
    fn test_frame_border_and_backdrop() {
        let mut rng = StdRng::seed_from_u64(8);
        let config = AnimationConfig {
            width: 60,
            height: 40,
            initial_shapes: 0,
            frame_radius: Some(6.0),
            ..AnimationConfig::default()
        };
        let animator = Animator::new(config, &mut rng);

        let backdrop = RgbaImage::from_pixel(5, 5, image::Rgba([200, 0, 0, 255]));
        let frame = animator.render_frame_with(&backdrop);

        assert_eq!(frame.image().get_pixel(30, 0).0, FRAME_PEN.color);
        assert_eq!(frame.image().get_pixel(12, 12).0, [200, 0, 0, 255]);
        assert_eq!(frame.image().get_pixel(30, 30).0, PANEL_BACKGROUND);
    }
}
