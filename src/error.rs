use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the animation host, raster export and text setup
///
/// The shape physics and geometry are total and never fail; only the host
/// policy (capacity), image encoding and font loading can.
#[derive(Debug, Error)]
pub enum AnimationError {
    #[error("maximum number of shapes reached ({limit})")]
    CapacityReached { limit: usize },

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot read font {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a usable TrueType/OpenType font")]
    InvalidFont,

    #[error("drawing text needs a font")]
    MissingFont,
}
