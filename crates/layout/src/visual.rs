use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};

/// Upper bounds (inclusive) of every bucket but the last
pub const DEFAULT_THRESHOLDS: [u32; 4] = [5, 15, 30, 50];

/// One color per bucket, lowest complexity first
pub const DEFAULT_COLORS: [&str; 5] = ["#00ffcc", "#00ff88", "#FFC300", "#ff9900", "#ff4444"];

pub const DEFAULT_HEIGHT_SCALE: f64 = 2.0;

/// Encoded appearance of one building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    /// 1-based bucket index
    pub bucket: usize,
    pub color: String,
    pub height: f64,
}

/// Maps complexity to a color bucket and a height
#[derive(Debug, Clone, PartialEq)]
pub struct VisualEncoder {
    thresholds: Vec<u32>,
    colors: Vec<String>,
    height_scale: f64,
}

impl Default for VisualEncoder {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            colors: DEFAULT_COLORS.iter().map(|c| (*c).to_string()).collect(),
            height_scale: DEFAULT_HEIGHT_SCALE,
        }
    }
}

impl VisualEncoder {
    /// `colors` must hold exactly one more entry than `thresholds`, and
    /// thresholds must be strictly ascending.
    pub fn new(thresholds: Vec<u32>, colors: Vec<String>, height_scale: f64) -> Result<Self> {
        if colors.len() != thresholds.len() + 1 {
            return Err(LayoutError::InvalidPalette(format!(
                "expected {} colors for {} thresholds, got {}",
                thresholds.len() + 1,
                thresholds.len(),
                colors.len()
            )));
        }
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LayoutError::InvalidPalette(format!(
                "thresholds must be strictly ascending: {thresholds:?}"
            )));
        }
        if !height_scale.is_finite() || height_scale <= 0.0 {
            return Err(LayoutError::InvalidPalette(format!(
                "height scale must be positive, got {height_scale}"
            )));
        }
        Ok(Self {
            thresholds,
            colors,
            height_scale,
        })
    }

    /// 1-based bucket for `complexity`
    #[must_use]
    pub fn bucket(&self, complexity: u32) -> usize {
        self.thresholds
            .iter()
            .position(|&limit| complexity <= limit)
            .unwrap_or(self.thresholds.len())
            + 1
    }

    /// Never below 1, so minimum-complexity files stay visible
    #[must_use]
    pub fn height(&self, complexity: u32) -> f64 {
        (f64::from(complexity) * self.height_scale).max(1.0)
    }

    #[must_use]
    pub fn encode(&self, complexity: u32) -> Visual {
        let bucket = self.bucket(complexity);
        Visual {
            bucket,
            color: self.colors[bucket - 1].clone(),
            height: self.height(complexity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bucket_boundaries_are_inclusive() {
        let encoder = VisualEncoder::default();
        let cases = [
            (1, 1),
            (5, 1),
            (6, 2),
            (15, 2),
            (16, 3),
            (30, 3),
            (31, 4),
            (50, 4),
            (51, 5),
            (10_000, 5),
        ];
        for (complexity, bucket) in cases {
            assert_eq!(encoder.bucket(complexity), bucket, "complexity {complexity}");
        }
    }

    #[test]
    fn encode_uses_default_palette() {
        let encoder = VisualEncoder::default();
        assert_eq!(
            encoder.encode(3),
            Visual {
                bucket: 1,
                color: "#00ffcc".to_string(),
                height: 6.0
            }
        );
        assert_eq!(encoder.encode(51).color, "#ff4444");
    }

    #[test]
    fn height_has_floor_of_one() {
        let encoder = VisualEncoder::new(vec![5], vec!["a".into(), "b".into()], 0.1).unwrap();
        assert_eq!(encoder.height(1), 1.0);
        assert_eq!(encoder.height(0), 1.0);
        assert!((encoder.height(20) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_inconsistent_palettes() {
        let colors = |n: usize| (0..n).map(|i| format!("#{i}")).collect::<Vec<_>>();
        assert!(VisualEncoder::new(vec![5, 15], colors(2), 2.0).is_err());
        assert!(VisualEncoder::new(vec![15, 5], colors(3), 2.0).is_err());
        assert!(VisualEncoder::new(vec![5, 5], colors(3), 2.0).is_err());
        assert!(VisualEncoder::new(vec![5, 15], colors(3), 0.0).is_err());
        assert!(VisualEncoder::new(vec![5, 15], colors(3), 2.0).is_ok());
        assert!(VisualEncoder::new(vec![], colors(1), 1.0).is_ok());
    }
}
