// The shapes module: the animated entity and the geometry it draws with
//
// `animated` holds the moving shape itself (physics, random factory and
// rendering). `geometry` holds the pure vertex math used to render it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod animated;
pub mod geometry;

pub use animated::AnimatedShape;

/// Silhouette a shape renders as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Star,
}

impl ShapeKind {
    /// Every kind, in declaration order
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Star,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Star => "star",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown shape '{}', expected one of: circle, square, triangle, star",
                    s
                )
            })
    }
}
