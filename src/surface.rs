// The drawing capability shapes render into
//
// A `Surface` only needs to know how to fill and stroke a handful of
// primitives with a `Brush` or a `Pen`. The core never reads pixels back, so
// the same shape code drives both the raster canvas and the recording
// surface used in tests.

use crate::palette::{lerp, Color};
use crate::shapes::geometry::{rounded_rect_path, Point, Rect};
use serde::{Deserialize, Serialize};

/// Axis a linear gradient runs along
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientDirection {
    /// Left to right
    Horizontal,
    /// Top to bottom
    Vertical,
    /// Top-left to bottom-right
    ForwardDiagonal,
    /// Top-right to bottom-left
    BackwardDiagonal,
}

/// Linear gradient with evenly spaced color stops over a bounding box
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub bounds: Rect,
    pub direction: GradientDirection,
    pub stops: Vec<Color>,
}

impl Gradient {
    /// Two-color gradient from `start` to `end`
    pub fn linear(bounds: Rect, start: Color, end: Color, direction: GradientDirection) -> Self {
        Self {
            bounds,
            direction,
            stops: vec![start, end],
        }
    }

    /// Gradient through every color in `colors`, spaced evenly
    pub fn even(bounds: Rect, colors: &[Color], direction: GradientDirection) -> Self {
        Self {
            bounds,
            direction,
            stops: colors.to_vec(),
        }
    }

    /// Position of `(x, y)` along the gradient axis, in [0, 1]
    pub fn progress(&self, x: f32, y: f32) -> f32 {
        let Rect {
            x: bx,
            y: by,
            width: w,
            height: h,
        } = self.bounds;

        let t = match self.direction {
            GradientDirection::Horizontal if w != 0.0 => (x - bx) / w,
            GradientDirection::Vertical if h != 0.0 => (y - by) / h,
            GradientDirection::ForwardDiagonal | GradientDirection::BackwardDiagonal => {
                let len_sq = w * w + h * h;
                if len_sq == 0.0 {
                    0.0
                } else if self.direction == GradientDirection::ForwardDiagonal {
                    ((x - bx) * w + (y - by) * h) / len_sq
                } else {
                    ((bx + w - x) * w + (y - by) * h) / len_sq
                }
            }
            _ => 0.0,
        };

        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, 1.0)
        }
    }

    /// Interpolated color at `(x, y)`
    pub fn color_at(&self, x: f32, y: f32) -> Color {
        match self.stops.len() {
            0 => [0, 0, 0, 0],
            1 => self.stops[0],
            n => {
                let scaled = self.progress(x, y) * (n - 1) as f32;
                let index = (scaled.floor() as usize).min(n - 2);
                lerp(self.stops[index], self.stops[index + 1], scaled - index as f32)
            }
        }
    }
}

/// How a filled primitive is painted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Brush {
    Solid(Color),
    Gradient(Gradient),
}

impl Brush {
    /// Color the brush paints at `(x, y)`
    pub fn color_at(&self, x: f32, y: f32) -> Color {
        match self {
            Brush::Solid(color) => *color,
            Brush::Gradient(gradient) => gradient.color_at(x, y),
        }
    }
}

/// Outline style for stroked primitives
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub color: Color,
    pub width: f32,
}

impl Pen {
    /// Pen of `width` pixels, centred on the outline it strokes
    pub const fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Immediate-mode drawing target
pub trait Surface {
    /// Fill the ellipse inscribed in `bounds`
    fn fill_ellipse(&mut self, bounds: Rect, brush: &Brush);

    /// Fill the axis-aligned rectangle `bounds`
    fn fill_rect(&mut self, bounds: Rect, brush: &Brush);

    /// Fill a closed polygon; the last point connects back to the first
    fn fill_polygon(&mut self, points: &[Point], brush: &Brush);

    /// Outline `bounds` with the pen centred on its edges
    fn stroke_rect(&mut self, bounds: Rect, pen: Pen);

    /// Outline a closed polygon
    fn stroke_polygon(&mut self, points: &[Point], pen: Pen);
}

/// Fill a rounded rectangle and optionally outline it
pub fn draw_rounded_rect<S: Surface + ?Sized>(
    surface: &mut S,
    rect: Rect,
    radius: f32,
    fill: &Brush,
    border: Option<Pen>,
) {
    let path = rounded_rect_path(rect, radius, 8);
    surface.fill_polygon(&path, fill);
    if let Some(pen) = border {
        surface.stroke_polygon(&path, pen);
    }
}

/// How the end of a stroked line is finished
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    /// Cut square at the end point
    Flat,
    /// Half disc of the pen's width around the end point
    Round,
    /// Triangular arrow head centred on the end point
    Arrow,
}

/// Stroke the segment `from`-`to` as a filled band `pen.width` wide
///
/// # Arguments
/// * `surface` - Target to draw into
/// * `from` - Start point of the segment
/// * `to` - End point of the segment
/// * `pen` - Color and width of the stroke
/// * `caps` - Finish at `from` and at `to`
pub fn draw_line<S: Surface + ?Sized>(
    surface: &mut S,
    from: Point,
    to: Point,
    pen: Pen,
    caps: (LineCap, LineCap),
) {
    let half = pen.width / 2.0;
    let brush = Brush::Solid(pen.color);
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length = (dx * dx + dy * dy).sqrt();
    if !(length > 0.0) || !(half > 0.0) {
        // Nothing to orient the band with; a round cap still leaves a dot
        if caps.0 == LineCap::Round || caps.1 == LineCap::Round {
            surface.fill_ellipse(
                Rect::square(from.x - half, from.y - half, pen.width),
                &brush,
            );
        }
        return;
    }

    // Unit direction and the half-width normal
    let (ux, uy) = (dx / length, dy / length);
    let (nx, ny) = (-uy * half, ux * half);

    surface.fill_polygon(
        &[
            Point::new(from.x + nx, from.y + ny),
            Point::new(to.x + nx, to.y + ny),
            Point::new(to.x - nx, to.y - ny),
            Point::new(from.x - nx, from.y - ny),
        ],
        &brush,
    );

    for (point, cap, sign) in [(from, caps.0, -1.0), (to, caps.1, 1.0)] {
        match cap {
            LineCap::Flat => {}
            LineCap::Round => surface.fill_ellipse(
                Rect::square(point.x - half, point.y - half, pen.width),
                &brush,
            ),
            LineCap::Arrow => {
                // Head twice the pen wide, tip one pen width past the point
                let (ax, ay) = (ux * sign * pen.width, uy * sign * pen.width);
                surface.fill_polygon(
                    &[
                        Point::new(point.x + ax, point.y + ay),
                        Point::new(point.x - ax + 2.0 * nx, point.y - ay + 2.0 * ny),
                        Point::new(point.x - ax - 2.0 * nx, point.y - ay - 2.0 * ny),
                    ],
                    &brush,
                );
            }
        }
    }
}

/// One recorded drawing primitive
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillEllipse { bounds: Rect, brush: Brush },
    FillRect { bounds: Rect, brush: Brush },
    FillPolygon { points: Vec<Point>, brush: Brush },
    StrokeRect { bounds: Rect, pen: Pen },
    StrokePolygon { points: Vec<Point>, pen: Pen },
}

/// Surface that records primitives instead of painting them
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything drawn so far, in call order
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded primitives, leaving the surface empty
    pub fn take(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }
}

impl Surface for RecordingSurface {
    fn fill_ellipse(&mut self, bounds: Rect, brush: &Brush) {
        self.ops.push(DrawOp::FillEllipse {
            bounds,
            brush: brush.clone(),
        });
    }

    fn fill_rect(&mut self, bounds: Rect, brush: &Brush) {
        self.ops.push(DrawOp::FillRect {
            bounds,
            brush: brush.clone(),
        });
    }

    fn fill_polygon(&mut self, points: &[Point], brush: &Brush) {
        self.ops.push(DrawOp::FillPolygon {
            points: points.to_vec(),
            brush: brush.clone(),
        });
    }

    fn stroke_rect(&mut self, bounds: Rect, pen: Pen) {
        self.ops.push(DrawOp::StrokeRect { bounds, pen });
    }

    fn stroke_polygon(&mut self, points: &[Point], pen: Pen) {
        self.ops.push(DrawOp::StrokePolygon {
            points: points.to_vec(),
            pen,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{rgb, RAINBOW};

    const BOX: Rect = Rect::new(0.0, 0.0, 100.0, 50.0);

    #[test]
    fn test_linear_gradient_endpoints() {
        let start = rgb(255, 0, 0);
        let end = rgb(0, 0, 255);

        let diagonal = Gradient::linear(BOX, start, end, GradientDirection::ForwardDiagonal);
        assert_eq!(diagonal.color_at(0.0, 0.0), start);
        assert_eq!(diagonal.color_at(100.0, 50.0), end);
        // Outside the box clamps to the nearest stop
        assert_eq!(diagonal.color_at(-20.0, -20.0), start);

        let vertical = Gradient::linear(BOX, start, end, GradientDirection::Vertical);
        assert_eq!(vertical.color_at(80.0, 0.0), start);
        assert_eq!(vertical.color_at(3.0, 50.0), end);

        let backward = Gradient::linear(BOX, start, end, GradientDirection::BackwardDiagonal);
        assert_eq!(backward.color_at(100.0, 0.0), start);
        assert_eq!(backward.color_at(0.0, 50.0), end);
    }

    #[test]
    fn test_even_gradient_hits_every_stop() {
        let gradient = Gradient::even(BOX, &RAINBOW, GradientDirection::Horizontal);
        for (i, stop) in RAINBOW.iter().enumerate() {
            let x = 100.0 * i as f32 / (RAINBOW.len() - 1) as f32;
            assert_eq!(gradient.color_at(x, 10.0), *stop);
        }
    }

    #[test]
    fn test_degenerate_gradient_uses_first_stop() {
        let flat = Rect::new(10.0, 10.0, 0.0, 0.0);
        let gradient = Gradient::linear(
            flat,
            rgb(1, 2, 3),
            rgb(4, 5, 6),
            GradientDirection::ForwardDiagonal,
        );
        assert_eq!(gradient.color_at(10.0, 10.0), rgb(1, 2, 3));
    }

    #[test]
    fn test_line_band_and_caps() {
        let mut surface = RecordingSurface::new();
        let pen = Pen::new(rgb(0, 0, 139), 4.0);
        draw_line(
            &mut surface,
            Point::new(10.0, 10.0),
            Point::new(50.0, 10.0),
            pen,
            (LineCap::Round, LineCap::Arrow),
        );

        let ops = surface.take();
        assert_eq!(ops.len(), 3);
        let DrawOp::FillPolygon { points, .. } = &ops[0] else {
            panic!("band expected first, got {:?}", ops[0]);
        };
        assert_eq!(points[0], Point::new(10.0, 12.0));
        assert_eq!(points[2], Point::new(50.0, 8.0));
        assert_eq!(
            ops[1],
            DrawOp::FillEllipse {
                bounds: Rect::square(8.0, 8.0, 4.0),
                brush: Brush::Solid(pen.color),
            }
        );
        let DrawOp::FillPolygon { points: head, .. } = &ops[2] else {
            panic!("arrow head expected last, got {:?}", ops[2]);
        };
        assert_eq!(head[0], Point::new(54.0, 10.0));
        assert_eq!(head.len(), 3);
    }

    #[test]
    fn test_zero_length_line() {
        let mut surface = RecordingSurface::new();
        let pen = Pen::new(rgb(0, 0, 0), 2.0);
        let p = Point::new(5.0, 5.0);

        draw_line(&mut surface, p, p, pen, (LineCap::Flat, LineCap::Arrow));
        assert!(surface.ops().is_empty());

        draw_line(&mut surface, p, p, pen, (LineCap::Round, LineCap::Flat));
        assert_eq!(surface.ops().len(), 1);
    }

    #[test]
    fn test_recording_surface_keeps_order() {
        let mut surface = RecordingSurface::new();
        let brush = Brush::Solid(rgb(9, 9, 9));

        draw_rounded_rect(
            &mut surface,
            BOX,
            8.0,
            &brush,
            Some(Pen::new(rgb(0, 0, 0), 1.0)),
        );

        let ops = surface.take();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DrawOp::FillPolygon { .. }));
        assert!(matches!(ops[1], DrawOp::StrokePolygon { .. }));
        assert!(surface.ops().is_empty());
    }
}
