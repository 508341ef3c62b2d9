// The free drawing panel: a white canvas and its canned drawing actions
//
// Every action picks its placement from an injected random source and
// paints with the canvas's current color, then reports what it drew. A
// seeded run always produces the same picture.

use crate::error::AnimationError;
use crate::palette::{argb, darken, lighten, rgb, Color, RAINBOW};
use crate::raster::RasterSurface;
use crate::shapes::geometry::{Point, Rect};
use crate::surface::{
    draw_line, draw_rounded_rect, Brush, Gradient, GradientDirection, LineCap, Pen, Surface,
};
use crate::text::{
    draw_gradient_text, draw_outlined_text, draw_text_with_shadow, Label, Typeface, PX_PER_POINT,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

/// Paper color of a fresh or cleared canvas
pub const CANVAS_BACKGROUND: Color = rgb(255, 255, 255);

/// Color a new canvas draws with (dark blue)
pub const DEFAULT_COLOR: Color = rgb(0, 0, 139);

/// Pen width a new canvas draws with
pub const DEFAULT_LINE_WIDTH: f32 = 3.0;

/// Closest any action places its shape to the top-left edges
const EDGE: i32 = 10;

/// Side lengths (exclusive end) of random rectangles and ellipses
const SHAPE_SIZE: Range<i32> = 50..100;

/// Space kept free right of and below a random shape's corner
const SHAPE_ROOM: i32 = 110;

/// Space kept free right of and below a random text's corner
const TEXT_ROOM: (i32, i32) = (200, 100);

/// Text actions never collapse their placement range below this
const TEXT_MIN_END: i32 = 20;

const RECT_BORDER_WIDTH: f32 = 2.0;
const ELLIPSE_HIGHLIGHT: Color = argb(80, 255, 255, 255);
const RAINBOW_RADIUS: f32 = 12.0;

/// 24pt, the size of the canvas text
const TEXT_SIZE: f32 = 24.0 * PX_PER_POINT;
const TEXT_SHADOW: Color = rgb(128, 128, 128);
const TEXT_EFFECT_WIDTH: f32 = 3.0;

/// A canned drawing action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasAction {
    /// Gradient rectangle with a dark border
    Rect,
    /// Gradient ellipse with a highlight spot
    Ellipse,
    /// Thick line with a round start and an arrow head
    Line,
    /// One of three styled greetings (needs a font)
    Text,
    /// Rounded rectangle filled with the rainbow
    Rainbow,
    /// Wipe the canvas back to white
    Clear,
}

impl CanvasAction {
    pub const ALL: [CanvasAction; 6] = [
        CanvasAction::Rect,
        CanvasAction::Ellipse,
        CanvasAction::Line,
        CanvasAction::Text,
        CanvasAction::Rainbow,
        CanvasAction::Clear,
    ];

    /// Actions run when none are requested; none of them needs a font
    pub const DEFAULT: [CanvasAction; 4] = [
        CanvasAction::Rect,
        CanvasAction::Ellipse,
        CanvasAction::Line,
        CanvasAction::Rainbow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanvasAction::Rect => "rect",
            CanvasAction::Ellipse => "ellipse",
            CanvasAction::Line => "line",
            CanvasAction::Text => "text",
            CanvasAction::Rainbow => "rainbow",
            CanvasAction::Clear => "clear",
        }
    }
}

impl fmt::Display for CanvasAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CanvasAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanvasAction::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown canvas action '{}', expected one of: rect, ellipse, line, text, rainbow, clear",
                    s
                )
            })
    }
}

/// Style the text action picked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEffect {
    /// "Hello!" over a gray drop shadow
    Shadow,
    /// "Здравей!" with a white outline
    Outline,
    /// "Graphics" filled with a vertical gradient
    Gradient,
}

/// White drawing panel with a current color and pen width
#[derive(Clone, Debug)]
pub struct DrawingCanvas {
    surface: RasterSurface,
    color: Color,
    line_width: f32,
}

impl DrawingCanvas {
    /// Blank white canvas drawing in dark blue with a 3 px pen
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: RasterSurface::new(width, height, CANVAS_BACKGROUND),
            color: DEFAULT_COLOR,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Color used by every following action
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Base pen width; the line action draws 2 px wider than this
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn into_surface(self) -> RasterSurface {
        self.surface
    }

    /// Write the canvas to `path`, format by extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AnimationError> {
        self.surface.save(path)
    }

    /// Run one action
    ///
    /// # Arguments
    /// * `action` - What to draw
    /// * `rng` - Random source for the placement
    /// * `typeface` - Font for `CanvasAction::Text`; other actions ignore it
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        action: CanvasAction,
        rng: &mut R,
        typeface: Option<&Typeface>,
    ) -> Result<(), AnimationError> {
        match action {
            CanvasAction::Rect => {
                let rect = self.draw_random_rect(rng);
                log::debug!("rect at ({}, {}) {}x{}", rect.x, rect.y, rect.width, rect.height);
            }
            CanvasAction::Ellipse => {
                let rect = self.draw_random_ellipse(rng);
                log::debug!("ellipse at ({}, {}) {}x{}", rect.x, rect.y, rect.width, rect.height);
            }
            CanvasAction::Line => {
                let (from, to) = self.draw_random_line(rng);
                log::debug!("line ({}, {}) -> ({}, {})", from.x, from.y, to.x, to.y);
            }
            CanvasAction::Text => {
                let typeface = typeface.ok_or(AnimationError::MissingFont)?;
                let effect = self.draw_random_text(rng, typeface);
                log::debug!("text with {:?} effect", effect);
            }
            CanvasAction::Rainbow => {
                let rect = self.draw_rainbow(rng);
                log::debug!("rainbow at ({}, {}) {}x{}", rect.x, rect.y, rect.width, rect.height);
            }
            CanvasAction::Clear => self.clear(),
        }
        Ok(())
    }

    /// Gradient rectangle at a random spot, outlined in a darker shade
    pub fn draw_random_rect<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Rect {
        let rect = self.random_shape_rect(rng);
        let brush = Brush::Gradient(Gradient::linear(
            rect,
            self.color,
            lighten(self.color, 0.5),
            GradientDirection::ForwardDiagonal,
        ));
        self.surface.fill_rect(rect, &brush);
        self.surface
            .stroke_rect(rect, Pen::new(darken(self.color, 0.5), RECT_BORDER_WIDTH));
        rect
    }

    /// Gradient ellipse at a random spot with a soft white highlight
    pub fn draw_random_ellipse<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Rect {
        let rect = self.random_shape_rect(rng);
        let brush = Brush::Gradient(Gradient::linear(
            rect,
            self.color,
            lighten(self.color, 0.8),
            GradientDirection::ForwardDiagonal,
        ));
        self.surface.fill_ellipse(rect, &brush);

        // Integer pixel math: the spot sits a quarter in and a sixth down
        let (width, height) = (rect.width as i32, rect.height as i32);
        let spot = Rect::new(
            rect.x + (width / 4) as f32,
            rect.y + (height / 6) as f32,
            (width / 3) as f32,
            (height / 3) as f32,
        );
        self.surface
            .fill_ellipse(spot, &Brush::Solid(ELLIPSE_HIGHLIGHT));
        rect
    }

    /// Line between two random points, 2 px wider than the pen
    pub fn draw_random_line<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (Point, Point) {
        let (width, height) = self.surface.dimensions();
        let x_end = range_end(width, EDGE, EDGE + 1);
        let y_end = range_end(height, EDGE, EDGE + 1);

        let from = Point::new(
            rng.gen_range(EDGE..x_end) as f32,
            rng.gen_range(EDGE..y_end) as f32,
        );
        let to = Point::new(
            rng.gen_range(EDGE..x_end) as f32,
            rng.gen_range(EDGE..y_end) as f32,
        );

        draw_line(
            &mut self.surface,
            from,
            to,
            Pen::new(self.color, self.line_width + 2.0),
            (LineCap::Round, LineCap::Arrow),
        );
        (from, to)
    }

    /// A greeting at a random spot in one of three randomly chosen styles
    pub fn draw_random_text<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        typeface: &Typeface,
    ) -> TextEffect {
        let (width, height) = self.surface.dimensions();
        let x = rng.gen_range(EDGE..range_end(width, TEXT_ROOM.0, TEXT_MIN_END));
        let y = rng.gen_range(EDGE..range_end(height, TEXT_ROOM.1, TEXT_MIN_END));
        let origin = Point::new(x as f32, y as f32);

        match rng.gen_range(0..3) {
            0 => {
                let label = Label::new("Hello!", TEXT_SIZE, origin);
                draw_text_with_shadow(&mut self.surface, typeface, &label, self.color, TEXT_SHADOW, 3);
                TextEffect::Shadow
            }
            1 => {
                let label = Label::new("Здравей!", TEXT_SIZE, origin);
                draw_outlined_text(
                    &mut self.surface,
                    typeface,
                    &label,
                    self.color,
                    CANVAS_BACKGROUND,
                    TEXT_EFFECT_WIDTH,
                );
                TextEffect::Outline
            }
            _ => {
                let label = Label::new("Graphics", TEXT_SIZE, origin);
                draw_gradient_text(
                    &mut self.surface,
                    typeface,
                    &label,
                    self.color,
                    lighten(self.color, 0.5),
                );
                TextEffect::Gradient
            }
        }
    }

    /// Rounded rectangle at a random spot with the rainbow running left to right
    pub fn draw_rainbow<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Rect {
        let rect = self.random_shape_rect(rng);
        let brush = Brush::Gradient(Gradient::even(rect, &RAINBOW, GradientDirection::Horizontal));
        draw_rounded_rect(&mut self.surface, rect, RAINBOW_RADIUS, &brush, None);
        rect
    }

    /// Paint the whole canvas white again
    pub fn clear(&mut self) {
        let (width, height) = self.surface.dimensions();
        self.surface = RasterSurface::new(width, height, CANVAS_BACKGROUND);
    }

    /// Corner then size, each drawn in that order from `rng`
    fn random_shape_rect<R: Rng + ?Sized>(&self, rng: &mut R) -> Rect {
        let (width, height) = self.surface.dimensions();
        let x = rng.gen_range(EDGE..range_end(width, SHAPE_ROOM, EDGE + 1));
        let y = rng.gen_range(EDGE..range_end(height, SHAPE_ROOM, EDGE + 1));
        let w = rng.gen_range(SHAPE_SIZE);
        let h = rng.gen_range(SHAPE_SIZE);
        Rect::new(x as f32, y as f32, w as f32, h as f32)
    }
}

/// Exclusive end of a placement range: `extent - room`, but at least `min_end`
fn range_end(extent: u32, room: i32, min_end: i32) -> i32 {
    i32::try_from(extent)
        .unwrap_or(i32::MAX)
        .saturating_sub(room)
        .max(min_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(canvas: &DrawingCanvas, x: f32, y: f32) -> Color {
        canvas.surface().image().get_pixel(x as u32, y as u32).0
    }

    #[test]
    fn test_new_canvas_is_white() {
        let canvas = DrawingCanvas::new(50, 40);
        assert_eq!(canvas.color(), DEFAULT_COLOR);
        assert_eq!(canvas.line_width(), DEFAULT_LINE_WIDTH);
        assert!(canvas
            .surface()
            .image()
            .pixels()
            .all(|p| p.0 == CANVAS_BACKGROUND));
    }

    #[test]
    fn test_rect_placement_and_paint() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut canvas = DrawingCanvas::new(400, 300);
        for _ in 0..20 {
            let rect = canvas.draw_random_rect(&mut rng);
            assert!(rect.x >= 10.0 && rect.x < 290.0);
            assert!(rect.y >= 10.0 && rect.y < 190.0);
            assert!(rect.width >= 50.0 && rect.width < 100.0);
            assert!(rect.height >= 50.0 && rect.height < 100.0);
        }

        let mut canvas = DrawingCanvas::new(400, 300);
        let rect = canvas.draw_random_rect(&mut rng);
        // Border in the darker shade, gradient starting at the current color
        assert_eq!(at(&canvas, rect.x, rect.y + rect.height / 2.0), darken(DEFAULT_COLOR, 0.5));
        assert_eq!(at(&canvas, rect.x + 2.0, rect.y + 2.0)[3], 255);
        let inner = at(&canvas, rect.x + 3.0, rect.y + 3.0);
        assert!(inner[2] >= DEFAULT_COLOR[2] && inner[2] < 200);
        // The far corner is close to the lighter end
        let far = at(&canvas, rect.right() - 3.0, rect.bottom() - 3.0);
        assert!(far[0] > inner[0]);
    }

    #[test]
    fn test_ellipse_with_highlight() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut canvas = DrawingCanvas::new(400, 300);
        let rect = canvas.draw_random_ellipse(&mut rng);

        // Bounding box corner stays white
        assert_eq!(at(&canvas, rect.x + 1.0, rect.y + 1.0), CANVAS_BACKGROUND);

        let width = rect.width as i32;
        let height = rect.height as i32;
        let spot_center = (
            rect.x + (width / 4 + width / 6) as f32,
            rect.y + (height / 6 + height / 6) as f32,
        );
        let bare = Gradient::linear(
            rect,
            DEFAULT_COLOR,
            lighten(DEFAULT_COLOR, 0.8),
            GradientDirection::ForwardDiagonal,
        )
        .color_at(spot_center.0.floor() + 0.5, spot_center.1.floor() + 0.5);
        let lit = at(&canvas, spot_center.0, spot_center.1);
        assert!(lit[0] > bare[0], "highlight brightens {:?} to {:?}", bare, lit);

        // Below the spot only the gradient shows
        let center = rect.center();
        let low = at(&canvas, center.x, rect.y + rect.height * 0.8);
        assert_eq!(low[3], 255);
        assert_ne!(low, CANVAS_BACKGROUND);
    }

    #[test]
    fn test_line_uses_wider_pen() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut canvas = DrawingCanvas::new(400, 300);
        canvas.set_line_width(6.0);
        let (from, to) = canvas.draw_random_line(&mut rng);

        for point in [from, to] {
            assert!(point.x >= 10.0 && point.x < 390.0);
            assert!(point.y >= 10.0 && point.y < 290.0);
        }
        // Round start cap: the start point and its 3 px neighbourhood are inked
        assert_eq!(at(&canvas, from.x, from.y), DEFAULT_COLOR);
        assert_eq!(at(&canvas, from.x - 3.0, from.y), DEFAULT_COLOR);
    }

    #[test]
    fn test_rainbow_spans_stops() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut canvas = DrawingCanvas::new(400, 300);
        let rect = canvas.draw_rainbow(&mut rng);

        let mid_y = rect.y + rect.height / 2.0;
        let left = at(&canvas, rect.x + 1.0, mid_y);
        let right = at(&canvas, rect.right() - 1.0, mid_y);
        assert!(left[0] > 200 && left[2] < 60, "red end: {:?}", left);
        assert!(right[2] > 60 && right[1] < 60, "purple end: {:?}", right);
    }

    #[test]
    fn test_clear_restores_white() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut canvas = DrawingCanvas::new(200, 200);
        canvas.apply(CanvasAction::Rect, &mut rng, None).unwrap();
        assert!(canvas.surface().image().pixels().any(|p| p.0 != CANVAS_BACKGROUND));

        canvas.apply(CanvasAction::Clear, &mut rng, None).unwrap();
        assert_eq!(canvas.surface().dimensions(), (200, 200));
        assert!(canvas.surface().image().pixels().all(|p| p.0 == CANVAS_BACKGROUND));
    }

    #[test]
    fn test_text_without_font_fails() {
        let mut rng = StdRng::seed_from_u64(16);
        let mut canvas = DrawingCanvas::new(200, 200);
        let err = canvas.apply(CanvasAction::Text, &mut rng, None).unwrap_err();
        assert!(matches!(err, AnimationError::MissingFont));
        assert!(canvas.surface().image().pixels().all(|p| p.0 == CANVAS_BACKGROUND));
    }

    #[test]
    fn test_small_canvas_does_not_panic() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut canvas = DrawingCanvas::new(30, 30);
        for action in CanvasAction::DEFAULT {
            canvas.apply(action, &mut rng, None).unwrap();
        }
        let mut empty = DrawingCanvas::new(0, 0);
        for action in CanvasAction::DEFAULT {
            empty.apply(action, &mut rng, None).unwrap();
        }
    }

    #[test]
    fn test_seeded_actions_repeat() {
        let paint = || {
            let mut rng = StdRng::seed_from_u64(18);
            let mut canvas = DrawingCanvas::new(300, 200);
            for action in CanvasAction::DEFAULT {
                canvas.apply(action, &mut rng, None).unwrap();
            }
            canvas.into_surface().into_image()
        };
        assert_eq!(paint(), paint());
    }

    #[test]
    fn test_action_parse() {
        for action in CanvasAction::ALL {
            assert_eq!(action.to_string().parse::<CanvasAction>(), Ok(action));
        }
        assert_eq!(" Rainbow ".parse::<CanvasAction>(), Ok(CanvasAction::Rainbow));
        assert!("spiral".parse::<CanvasAction>().is_err());
    }
}
