// Raster canvas backed by an RGBA image
//
// Every primitive is drawn in two steps: imageproc rasterizes the outline
// into a coverage mask clipped to the canvas, then each covered pixel takes
// the brush color at its center and is blended over the canvas with
// Porter-Duff "over". Painting through a mask is what lets gradients and
// translucent colors work with imageproc's solid-color drawing functions.

use crate::error::AnimationError;
use crate::palette::Color;
use crate::shapes::geometry::{Point, Rect};
use crate::surface::{Brush, Pen, Surface};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_ellipse_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_polygon_mut,
};
use imageproc::point::Point as PixelPoint;
use imageproc::rect::Rect as PixelRect;
use std::path::Path;

const COVERED: Luma<u8> = Luma([255]);

/// Part of the canvas a primitive may touch, already clipped to the canvas
#[derive(Clone, Copy, Debug)]
struct Clip {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Clip {
    /// Canvas-space coordinates shifted into mask space
    fn local(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.x as f32, y - self.y as f32)
    }

    fn mask(&self) -> GrayImage {
        GrayImage::new(self.width, self.height)
    }
}

/// Check if a pixel polygon has too few distinct corners or no area
///
/// imageproc panics on polygons whose first and last points coincide, and
/// collinear outlines would paint nothing, so both are skipped.
fn is_degenerate(points: &[PixelPoint<i32>]) -> bool {
    if points.len() < 3 {
        return true;
    }
    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum();
    twice_area == 0
}

/// Round a polygon to pixels, dropping repeated and closing vertices
fn pixel_polygon(points: &[Point], clip: &Clip) -> Vec<PixelPoint<i32>> {
    let mut pixels: Vec<PixelPoint<i32>> = Vec::with_capacity(points.len());
    for point in points {
        let (x, y) = clip.local(point.x, point.y);
        let pixel = PixelPoint::new(x.round() as i32, y.round() as i32);
        if pixels.last() != Some(&pixel) {
            pixels.push(pixel);
        }
    }
    while pixels.len() > 1 && pixels.first() == pixels.last() {
        pixels.pop();
    }
    pixels
}

/// Blend `src` over `dst` in place
fn blend_over(dst: &mut Rgba<u8>, src: Color) {
    let src_alpha = src[3] as f32 / 255.0;
    if src_alpha <= 0.0 {
        return;
    }
    if src_alpha >= 1.0 {
        *dst = Rgba(src);
        return;
    }

    let dst_alpha = dst.0[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    for channel in 0..3 {
        let blended = (src[channel] as f32 * src_alpha
            + dst.0[channel] as f32 * dst_alpha * (1.0 - src_alpha))
            / out_alpha;
        dst.0[channel] = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_alpha * 255.0).round() as u8;
}

/// Drawing surface that paints into an owned `RgbaImage`
#[derive(Clone, Debug)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Blank canvas filled with `background`
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(background)),
        }
    }

    /// Canvas width and height in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Pixels painted so far
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Give up the canvas and keep its pixels
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Composite another image with its top-left corner at `(x, y)`
    pub fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.image, image, x, y);
    }

    /// Write the canvas to `path`
    ///
    /// `.jpg`/`.jpeg` and `.bmp` are written in those formats (without
    /// alpha); every other extension gets PNG.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AnimationError> {
        let path = path.as_ref();
        match ImageFormat::from_path(path) {
            Ok(format @ (ImageFormat::Jpeg | ImageFormat::Bmp)) => {
                let rgb = DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
                rgb.save_with_format(path, format)?;
            }
            _ => self.image.save_with_format(path, ImageFormat::Png)?,
        }
        Ok(())
    }

    /// Canvas region covering `[left, right] x [top, bottom]`, or `None` when
    /// it misses the canvas entirely
    fn clip(&self, left: f32, top: f32, right: f32, bottom: f32) -> Option<Clip> {
        if ![left, top, right, bottom].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (width, height) = self.image.dimensions();
        let x0 = left.floor().max(0.0);
        let y0 = top.floor().max(0.0);
        // imageproc includes the far edge, hence the extra pixel
        let x1 = (right.ceil() + 1.0).min(width as f32);
        let y1 = (bottom.ceil() + 1.0).min(height as f32);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Clip {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    fn composite(&mut self, clip: &Clip, mask: &GrayImage, brush: &Brush) {
        self.fill_mask(clip.x as i64, clip.y as i64, mask, brush);
    }

    /// Paint a coverage mask with its top-left corner at `(x, y)`
    ///
    /// Each non-zero mask pixel takes the brush color at its center, with the
    /// brush alpha scaled by the coverage (255 is full). Mask pixels that fall
    /// outside the canvas are dropped.
    pub fn fill_mask(&mut self, x: i64, y: i64, mask: &GrayImage, brush: &Brush) {
        let (width, height) = self.image.dimensions();
        for (mx, my, coverage) in mask.enumerate_pixels() {
            let coverage = coverage.0[0] as u32;
            if coverage == 0 {
                continue;
            }
            let px = x + mx as i64;
            let py = y + my as i64;
            if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                continue;
            }
            let mut color = brush.color_at(px as f32 + 0.5, py as f32 + 0.5);
            if coverage < 255 {
                color[3] = ((color[3] as u32 * coverage + 127) / 255) as u8;
            }
            blend_over(self.image.get_pixel_mut(px as u32, py as u32), color);
        }
    }

    fn points_clip(&self, points: &[Point], margin: f32) -> Option<Clip> {
        let first = points.first()?;
        let (mut left, mut top, mut right, mut bottom) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            left = left.min(p.x);
            top = top.min(p.y);
            right = right.max(p.x);
            bottom = bottom.max(p.y);
        }
        self.clip(left - margin, top - margin, right + margin, bottom + margin)
    }
}

impl Surface for RasterSurface {
    fn fill_ellipse(&mut self, bounds: Rect, brush: &Brush) {
        let width_radius = (bounds.width / 2.0).round() as i32;
        let height_radius = (bounds.height / 2.0).round() as i32;
        if width_radius < 1 || height_radius < 1 {
            return;
        }
        let Some(clip) = self.clip(bounds.x, bounds.y, bounds.right(), bounds.bottom()) else {
            return;
        };

        let center = bounds.center();
        let (cx, cy) = clip.local(center.x, center.y);
        let mut mask = clip.mask();
        draw_filled_ellipse_mut(
            &mut mask,
            (cx.round() as i32, cy.round() as i32),
            width_radius,
            height_radius,
            COVERED,
        );
        self.composite(&clip, &mask, brush);
    }

    fn fill_rect(&mut self, bounds: Rect, brush: &Brush) {
        let width = bounds.width.round();
        let height = bounds.height.round();
        if !(width >= 1.0 && height >= 1.0) {
            return;
        }
        let Some(clip) = self.clip(bounds.x, bounds.y, bounds.right(), bounds.bottom()) else {
            return;
        };

        let (x, y) = clip.local(bounds.x, bounds.y);
        let mut mask = clip.mask();
        draw_filled_rect_mut(
            &mut mask,
            PixelRect::at(x.round() as i32, y.round() as i32).of_size(width as u32, height as u32),
            COVERED,
        );
        self.composite(&clip, &mask, brush);
    }

    fn fill_polygon(&mut self, points: &[Point], brush: &Brush) {
        let Some(clip) = self.points_clip(points, 0.0) else {
            return;
        };
        let polygon = pixel_polygon(points, &clip);
        if is_degenerate(&polygon) {
            return;
        }

        let mut mask = clip.mask();
        draw_polygon_mut(&mut mask, &polygon, COVERED);
        self.composite(&clip, &mask, brush);
    }

    fn stroke_rect(&mut self, bounds: Rect, pen: Pen) {
        let thickness = pen.width.round().max(1.0) as i32;
        let half = (thickness / 2) as f32;
        let Some(clip) = self.clip(
            bounds.x - half,
            bounds.y - half,
            bounds.right() + half,
            bounds.bottom() + half,
        ) else {
            return;
        };

        // Concentric one-pixel outlines centered on the edge
        let mut mask = clip.mask();
        for ring in 0..thickness {
            let inset = ring as f32 - half;
            let width = (bounds.width - 2.0 * inset).round();
            let height = (bounds.height - 2.0 * inset).round();
            if !(width >= 1.0 && height >= 1.0) {
                continue;
            }
            let (x, y) = clip.local(bounds.x + inset, bounds.y + inset);
            draw_hollow_rect_mut(
                &mut mask,
                PixelRect::at(x.round() as i32, y.round() as i32)
                    .of_size(width as u32, height as u32),
                COVERED,
            );
        }
        self.composite(&clip, &mask, &Brush::Solid(pen.color));
    }

    fn stroke_polygon(&mut self, points: &[Point], pen: Pen) {
        let thickness = pen.width.round().max(1.0) as i32;
        let half = (thickness / 2) as f32;
        let Some(clip) = self.points_clip(points, half) else {
            return;
        };

        let mut mask = clip.mask();
        for (a, b) in points.iter().zip(points.iter().cycle().skip(1)) {
            let start = clip.local(a.x, a.y);
            let end = clip.local(b.x, b.y);
            for offset in 0..thickness {
                let shift = offset as f32 - half;
                draw_line_segment_mut(
                    &mut mask,
                    (start.0 + shift, start.1),
                    (end.0 + shift, end.1),
                    COVERED,
                );
                draw_line_segment_mut(
                    &mut mask,
                    (start.0, start.1 + shift),
                    (end.0, end.1 + shift),
                    COVERED,
                );
            }
        }
        self.composite(&clip, &mask, &Brush::Solid(pen.color));
    }
}

/// Copy of `image` with its alpha channel scaled by `opacity` (0.0-1.0)
pub fn apply_opacity(image: &RgbaImage, opacity: f32) -> RgbaImage {
    let opacity = if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    };
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[3] = (pixel.0[3] as f32 * opacity).round() as u8;
    }
    out
}

/// Shrink `image` to fit inside `max_width` x `max_height`, keeping its
/// aspect ratio. Images that already fit come back unchanged.
pub fn fit_within(image: &RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return image.clone();
    }

    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_width = ((width as f64 * ratio) as u32).max(1);
    let new_height = ((height as f64 * ratio) as u32).max(1);
    imageops::resize(image, new_width, new_height, FilterType::CatmullRom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{argb, rgb};
    use crate::shapes::geometry::{star_points, triangle_points};
    use crate::surface::{Gradient, GradientDirection};

    const BLACK: Color = rgb(0, 0, 0);

    fn canvas() -> RasterSurface {
        RasterSurface::new(100, 100, BLACK)
    }

    fn at(surface: &RasterSurface, x: u32, y: u32) -> Color {
        surface.image().get_pixel(x, y).0
    }

    #[test]
    fn test_background_fill() {
        let surface = RasterSurface::new(8, 4, rgb(30, 30, 40));
        assert_eq!(surface.dimensions(), (8, 4));
        assert!(surface.image().pixels().all(|p| p.0 == [30, 30, 40, 255]));
    }

    #[test]
    fn test_fill_rect_covers_interior_only() {
        let mut surface = canvas();
        let red = rgb(255, 0, 0);
        surface.fill_rect(Rect::new(10.0, 10.0, 20.0, 20.0), &Brush::Solid(red));

        assert_eq!(at(&surface, 15, 15), red);
        assert_eq!(at(&surface, 5, 5), BLACK);
        assert_eq!(at(&surface, 40, 40), BLACK);
    }

    #[test]
    fn test_fill_ellipse_center_and_corner() {
        let mut surface = canvas();
        let green = rgb(0, 255, 0);
        surface.fill_ellipse(Rect::square(20.0, 20.0, 40.0), &Brush::Solid(green));

        assert_eq!(at(&surface, 40, 40), green);
        // The bounding box corner is outside the inscribed ellipse
        assert_eq!(at(&surface, 21, 21), BLACK);
    }

    #[test]
    fn test_gradient_fill_runs_between_colors() {
        let mut surface = canvas();
        let bounds = Rect::square(0.0, 0.0, 100.0);
        let brush = Brush::Gradient(Gradient::linear(
            bounds,
            rgb(255, 0, 0),
            rgb(0, 0, 255),
            GradientDirection::ForwardDiagonal,
        ));
        surface.fill_rect(bounds, &brush);

        let top_left = at(&surface, 0, 0);
        let bottom_right = at(&surface, 99, 99);
        assert!(top_left[0] > 250 && top_left[2] < 5);
        assert!(bottom_right[2] > 250 && bottom_right[0] < 5);
    }

    #[test]
    fn test_translucent_blend() {
        let mut surface = RasterSurface::new(4, 4, rgb(0, 0, 0));
        surface.fill_rect(
            Rect::new(0.0, 0.0, 4.0, 4.0),
            &Brush::Solid(argb(100, 255, 255, 255)),
        );
        let pixel = at(&surface, 1, 1);
        assert_eq!(pixel[3], 255);
        assert_eq!(pixel[0], 100);
    }

    #[test]
    fn test_polygons_fill() {
        let mut surface = canvas();
        let white = rgb(255, 255, 255);
        let bounds = Rect::square(10.0, 10.0, 80.0);

        surface.fill_polygon(&triangle_points(bounds), &Brush::Solid(white));
        assert_eq!(at(&surface, 50, 80), white);
        assert_eq!(at(&surface, 12, 12), BLACK);

        let mut surface = canvas();
        surface.fill_polygon(&star_points(bounds), &Brush::Solid(white));
        assert_eq!(at(&surface, 50, 50), white);
    }

    #[test]
    fn test_degenerate_input_is_skipped() {
        let mut surface = canvas();
        let brush = Brush::Solid(rgb(255, 255, 255));

        surface.fill_polygon(&[], &brush);
        surface.fill_polygon(&star_points(Rect::square(50.0, 50.0, 0.0)), &brush);
        surface.fill_polygon(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(20.0, 20.0),
            ],
            &brush,
        );
        surface.fill_ellipse(Rect::square(50.0, 50.0, 0.0), &brush);
        surface.fill_rect(Rect::new(50.0, 50.0, -5.0, 10.0), &brush);
        surface.fill_rect(Rect::new(f32::NAN, 0.0, 10.0, 10.0), &brush);

        assert!(surface.image().pixels().all(|p| p.0 == BLACK));
    }

    #[test]
    fn test_offscreen_primitives_are_clipped() {
        let mut surface = canvas();
        let brush = Brush::Solid(rgb(255, 255, 255));
        surface.fill_ellipse(Rect::square(-500.0, -500.0, 40.0), &brush);
        surface.fill_rect(Rect::new(90.0, 90.0, 50.0, 50.0), &brush);

        assert_eq!(at(&surface, 95, 95), rgb(255, 255, 255));
        assert_eq!(at(&surface, 0, 0), BLACK);
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut surface = canvas();
        let pen = Pen::new(rgb(255, 255, 0), 2.0);
        surface.stroke_rect(Rect::new(20.0, 20.0, 40.0, 40.0), pen);

        assert_eq!(at(&surface, 20, 40), pen.color);
        assert_eq!(at(&surface, 40, 40), BLACK);
    }

    #[test]
    fn test_fill_mask_scales_by_coverage() {
        let mut surface = RasterSurface::new(4, 4, BLACK);
        let mut mask = GrayImage::new(3, 3);
        mask.put_pixel(0, 0, Luma([255]));
        mask.put_pixel(1, 0, Luma([100]));
        mask.put_pixel(2, 2, Luma([255]));

        // Shifted so the last row and column hang off the canvas
        surface.fill_mask(2, 2, &mask, &Brush::Solid(rgb(255, 255, 255)));

        assert_eq!(at(&surface, 2, 2), rgb(255, 255, 255));
        assert_eq!(at(&surface, 3, 2), rgb(100, 100, 100));
        assert_eq!(at(&surface, 3, 3), BLACK);
        assert_eq!(at(&surface, 0, 0), BLACK);
    }

    #[test]
    fn test_apply_opacity_scales_alpha() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 200]));
        let faded = apply_opacity(&image, 0.5);
        assert!(faded.pixels().all(|p| p.0 == [10, 20, 30, 100]));
        assert_eq!(apply_opacity(&image, 7.0), image);
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        let image = RgbaImage::new(400, 200);
        assert_eq!(fit_within(&image, 100, 100).dimensions(), (100, 50));
        assert_eq!(fit_within(&image, 500, 500).dimensions(), (400, 200));
    }
}
