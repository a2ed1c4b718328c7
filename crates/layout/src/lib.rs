//! # Code City Layout
//!
//! Pure geometry and styling for the city: a squarified treemap that packs
//! one rectangle per file into a square canvas, and the encoder that turns a
//! complexity score into a color bucket and a building height.
//!
//! Nothing here allocates threads or touches the filesystem; given the same
//! ordered input every function returns the same output.

mod error;
mod treemap;
mod visual;

pub use error::{LayoutError, Result};
pub use treemap::{canvas_side, normalize_sizes, squarify, worst_ratio, Rectangle};
pub use visual::{Visual, VisualEncoder, DEFAULT_COLORS, DEFAULT_HEIGHT_SCALE, DEFAULT_THRESHOLDS};
