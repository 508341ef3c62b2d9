// Library root for the bouncing shapes animation
//
// The model is split in layers:
// - shapes: a single animated shape (physics, random factory, rendering)
// - scene: the ordered collection advanced and rendered every tick
// - surface: the drawing capability shapes render into
// - raster: an image-backed surface with file export
// - text: fonts and styled text on the raster
// - animation: the tick driver that hosts a scene
// - canvas: the free drawing panel and its canned actions

pub mod palette;
pub mod shapes;
pub mod surface;
pub mod raster;
pub mod text;
pub mod scene;
pub mod animation;
pub mod canvas;
pub mod error;

// Re-export the types a host needs so it can write
//   use bouncing_shapes::{Animator, Scene};
// instead of reaching into each module.
pub use animation::{AnimationConfig, Animator};
pub use canvas::{CanvasAction, DrawingCanvas};
pub use error::AnimationError;
pub use raster::RasterSurface;
pub use scene::{Scene, INITIAL_SHAPES, MAX_SHAPES};
pub use shapes::{AnimatedShape, ShapeKind};
pub use surface::{Brush, Pen, RecordingSurface, Surface};
pub use text::{Label, Typeface};
