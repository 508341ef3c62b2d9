// Text drawn onto the raster canvas
//
// Fonts are loaded at runtime with rusttype and imageproc rasterizes the
// glyphs into an antialiased coverage mask. Shadowed, outlined and gradient
// text are all the same mask painted with different brushes and offsets.

use crate::error::AnimationError;
use crate::palette::Color;
use crate::raster::RasterSurface;
use crate::shapes::geometry::{Point, Rect};
use crate::surface::{Brush, Gradient, GradientDirection};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::drawing::{draw_text_mut, text_size};
use imageproc::morphology::dilate;
use rusttype::{Font, Scale};
use std::fs;
use std::path::Path;

/// Pixels per typographic point on a 96 DPI display
pub const PX_PER_POINT: f32 = 96.0 / 72.0;

/// Blank border kept around a rasterized string for overhanging glyphs
const GLYPH_MARGIN: u32 = 2;

/// A loaded font
///
/// Cloning shares the parsed font data, so one typeface can be handed to
/// every rendering thread.
#[derive(Clone, Debug)]
pub struct Typeface {
    font: Font<'static>,
}

impl Typeface {
    /// Parse a TrueType/OpenType font from memory
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, AnimationError> {
        Font::try_from_vec(data)
            .map(|font| Self { font })
            .ok_or(AnimationError::InvalidFont)
    }

    /// Read and parse the font file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AnimationError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| AnimationError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let typeface = Self::from_bytes(data)?;
        log::debug!("loaded font {}", path.display());
        Ok(typeface)
    }

    /// Width and height in pixels of `text` set at `size` pixels
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        if !(size > 0.0) {
            return (0, 0);
        }
        let (width, height) = text_size(Scale::uniform(size), &self.font, text);
        (width.max(0) as u32, height.max(0) as u32)
    }

    pub fn font(&self) -> &Font<'static> {
        &self.font
    }
}

/// A single line of text and where it goes
#[derive(Clone, Copy, Debug)]
pub struct Label<'a> {
    pub text: &'a str,

    /// Glyph height in pixels (use `PX_PER_POINT` to convert from points)
    pub size: f32,

    /// Top-left corner of the text box
    pub origin: Point,
}

impl<'a> Label<'a> {
    pub fn new(text: &'a str, size: f32, origin: Point) -> Self {
        Self { text, size, origin }
    }
}

/// Coverage of a rasterized string, positioned on the canvas
#[derive(Clone, Debug)]
struct TextMask {
    x: i64,
    y: i64,
    mask: GrayImage,
}

impl TextMask {
    /// Rasterize `label` with `margin` blank pixels on every side
    fn render(typeface: &Typeface, label: &Label, margin: u32) -> Self {
        let (width, height) = typeface.measure(label.text, label.size);
        let x = label.origin.x.round() as i64 - margin as i64;
        let y = label.origin.y.round() as i64 - margin as i64;
        if width == 0 || height == 0 {
            return Self {
                x,
                y,
                mask: GrayImage::new(0, 0),
            };
        }

        let mut mask = GrayImage::new(width + 2 * margin, height + 2 * margin);
        draw_text_mut(
            &mut mask,
            Luma([255]),
            margin as i32,
            margin as i32,
            Scale::uniform(label.size),
            typeface.font(),
            label.text,
        );
        Self { x, y, mask }
    }

    /// Every covered pixel grown by `radius` pixels, fully covered
    fn dilated(&self, radius: u8) -> Self {
        Self {
            x: self.x,
            y: self.y,
            mask: dilate(&self.mask, Norm::L1, radius),
        }
    }

    /// Tight box around the covered pixels, in canvas coordinates
    fn bounds(&self) -> Option<Rect> {
        let mut covered = self
            .mask
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 0)
            .map(|(x, y, _)| (x, y));
        let (x0, y0) = covered.next()?;
        let (mut left, mut top, mut right, mut bottom) = (x0, y0, x0, y0);
        for (x, y) in covered {
            left = left.min(x);
            top = top.min(y);
            right = right.max(x);
            bottom = bottom.max(y);
        }
        Some(Rect::new(
            (self.x + left as i64) as f32,
            (self.y + top as i64) as f32,
            (right - left + 1) as f32,
            (bottom - top + 1) as f32,
        ))
    }

    fn paint(&self, surface: &mut RasterSurface, dx: i64, dy: i64, brush: &Brush) {
        surface.fill_mask(self.x + dx, self.y + dy, &self.mask, brush);
    }
}

/// Draw `label` with any brush
pub fn draw_text(surface: &mut RasterSurface, typeface: &Typeface, label: &Label, brush: &Brush) {
    TextMask::render(typeface, label, GLYPH_MARGIN).paint(surface, 0, 0, brush);
}

/// Draw `label` over a copy of itself shifted `offset` pixels down and right
///
/// # Arguments
/// * `surface` - Canvas to draw on
/// * `typeface` - Font for the glyphs
/// * `label` - Text, size and position
/// * `color` - Color of the text itself
/// * `shadow` - Color of the shadow, usually translucent
/// * `offset` - Shadow displacement on both axes (pixels)
pub fn draw_text_with_shadow(
    surface: &mut RasterSurface,
    typeface: &Typeface,
    label: &Label,
    color: Color,
    shadow: Color,
    offset: i64,
) {
    let mask = TextMask::render(typeface, label, GLYPH_MARGIN);
    paint_shadowed(surface, &mask, color, shadow, offset);
}

/// Draw `label` filled with `fill` inside an `outline` stroke `width` wide
///
/// The stroke is centred on the glyph edges, so half of it overlaps the
/// fill; the fill is painted last.
pub fn draw_outlined_text(
    surface: &mut RasterSurface,
    typeface: &Typeface,
    label: &Label,
    fill: Color,
    outline: Color,
    width: f32,
) {
    let radius = outline_radius(width);
    let mask = TextMask::render(typeface, label, GLYPH_MARGIN + radius as u32);
    paint_outlined(surface, &mask, fill, outline, radius);
}

/// Draw `label` with a vertical gradient from `start` (top) to `end` (bottom)
///
/// The gradient spans the glyphs' own bounds, not the line box.
pub fn draw_gradient_text(
    surface: &mut RasterSurface,
    typeface: &Typeface,
    label: &Label,
    start: Color,
    end: Color,
) {
    let mask = TextMask::render(typeface, label, GLYPH_MARGIN);
    paint_gradient(surface, &mask, start, end);
}

/// Pixels the outline grows outward from the glyph edge
fn outline_radius(width: f32) -> u8 {
    if width.is_nan() {
        return 1;
    }
    (width / 2.0).ceil().clamp(1.0, 64.0) as u8
}

fn paint_shadowed(
    surface: &mut RasterSurface,
    mask: &TextMask,
    color: Color,
    shadow: Color,
    offset: i64,
) {
    mask.paint(surface, offset, offset, &Brush::Solid(shadow));
    mask.paint(surface, 0, 0, &Brush::Solid(color));
}

fn paint_outlined(surface: &mut RasterSurface, mask: &TextMask, fill: Color, outline: Color, radius: u8) {
    mask.dilated(radius).paint(surface, 0, 0, &Brush::Solid(outline));
    mask.paint(surface, 0, 0, &Brush::Solid(fill));
}

fn paint_gradient(surface: &mut RasterSurface, mask: &TextMask, start: Color, end: Color) {
    let Some(bounds) = mask.bounds() else {
        return;
    };
    let brush = Brush::Gradient(Gradient::linear(
        bounds,
        start,
        end,
        GradientDirection::Vertical,
    ));
    mask.paint(surface, 0, 0, &brush);
}

/// Any common system font; tests that rasterize glyphs are skipped without one
#[cfg(test)]
pub(crate) fn system_typeface() -> Option<Typeface> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .find_map(|path| Typeface::open(path).ok())
}
