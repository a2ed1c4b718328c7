use crate::error::{CityError, Result};
use crate::stats::RunStats;
use codecity_analyzer::FileMetric;
use codecity_layout::{Rectangle, VisualEncoder};
use serde::{Deserialize, Serialize};

/// One building. Field names are the output wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub d: f64,
    pub h: f64,
    pub color: String,
    pub size: usize,
}

/// Output of a successful build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub tiles: Vec<Tile>,
    pub stats: RunStats,
}

/// Zip metrics with their same-index rectangles and encoded visuals
pub fn assemble(
    metrics: &[FileMetric],
    rects: &[Rectangle],
    encoder: &VisualEncoder,
) -> Result<Vec<Tile>> {
    if metrics.len() != rects.len() {
        return Err(CityError::LayoutMismatch {
            metrics: metrics.len(),
            rectangles: rects.len(),
        });
    }

    Ok(metrics
        .iter()
        .zip(rects)
        .map(|(metric, rect)| {
            let visual = encoder.encode(metric.complexity);
            Tile {
                name: metric.name.clone(),
                x: rect.x,
                y: rect.y,
                w: rect.width,
                d: rect.depth,
                h: visual.height,
                color: visual.color,
                size: metric.line_count,
            }
        })
        .collect())
}
