use crate::error::{LayoutError, Result};
use serde::{Deserialize, Serialize};

/// Axis-aligned tile on the canvas. `depth` is the extent along y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
}

impl Rectangle {
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.depth
    }
}

/// Remaining free space while rows are being placed
#[derive(Debug, Clone, Copy)]
struct Free {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// Canvas side for `file_count` tiles: `max(floor, ⌊scale·√n⌋)`
#[must_use]
pub fn canvas_side(file_count: usize, scale: f64, floor: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = file_count as f64;
    (scale * n.sqrt()).floor().max(floor)
}

/// Rescale sizes so they sum to `side²`.
///
/// Non-finite and non-positive sizes are treated as 1.
#[must_use]
pub fn normalize_sizes(sizes: &[f64], side: f64) -> Vec<f64> {
    let floored: Vec<f64> = sizes
        .iter()
        .map(|&s| if s.is_finite() && s > 0.0 { s } else { 1.0 })
        .collect();
    let total: f64 = floored.iter().sum();
    let target = side * side;
    floored.iter().map(|s| s * target / total).collect()
}

/// Worst aspect ratio of a row with the given stats laid along `short`
#[must_use]
pub fn worst_ratio(row_min: f64, row_max: f64, row_sum: f64, short: f64) -> f64 {
    if row_sum <= 0.0 || short <= 0.0 || row_min <= 0.0 || row_max <= 0.0 {
        return f64::MAX;
    }
    let short_sq = short * short;
    let sum_sq = row_sum * row_sum;
    let a = (short_sq * row_max) / sum_sq;
    let b = sum_sq / (short_sq * row_min);
    a.max(b)
}

/// Squarified treemap over a `side`×`side` square.
///
/// Sizes are consumed in input order (no sorting); `result[i]` belongs to
/// `sizes[i]`. A row keeps growing while its worst aspect ratio does not
/// increase and is laid along the shorter side of the free space.
pub fn squarify(sizes: &[f64], side: f64) -> Result<Vec<Rectangle>> {
    if !side.is_finite() || side <= 0.0 {
        return Err(LayoutError::InvalidSide(side));
    }
    if sizes.is_empty() {
        return Ok(Vec::new());
    }

    let values = normalize_sizes(sizes, side);
    let mut free = Free {
        x: 0.0,
        y: 0.0,
        w: side,
        h: side,
    };
    let mut out = Vec::with_capacity(values.len());

    let mut start = 0usize;
    while start < values.len() {
        let short = free.w.min(free.h);
        let mut end = start + 1;
        let mut row_min = values[start];
        let mut row_max = values[start];
        let mut row_sum = values[start];
        let mut current = worst_ratio(row_min, row_max, row_sum, short);

        while end < values.len() {
            let c = values[end];
            let next_min = row_min.min(c);
            let next_max = row_max.max(c);
            let next_sum = row_sum + c;
            let next = worst_ratio(next_min, next_max, next_sum, short);
            if next > current {
                break;
            }
            row_min = next_min;
            row_max = next_max;
            row_sum = next_sum;
            current = next;
            end += 1;
        }

        let last_row = end == values.len();
        layout_row(&values[start..end], row_sum, last_row, &mut free, &mut out);
        start = end;
    }

    Ok(out)
}

fn layout_row(row: &[f64], row_sum: f64, last_row: bool, free: &mut Free, out: &mut Vec<Rectangle>) {
    // Row runs along the shorter side; its thickness is taken from the longer one.
    let horizontal = free.w <= free.h;
    let short = if horizontal { free.w } else { free.h };
    let long = if horizontal { free.h } else { free.w };
    let nominal = row_sum / short;
    let thickness = if last_row { long } else { nominal.min(long) };

    let mut offset = 0.0;
    for (i, &value) in row.iter().enumerate() {
        let length = if i + 1 == row.len() {
            (short - offset).max(0.0)
        } else {
            value / nominal
        };

        let rect = if horizontal {
            Rectangle {
                x: free.x + offset,
                y: free.y,
                width: length,
                depth: thickness,
            }
        } else {
            Rectangle {
                x: free.x,
                y: free.y + offset,
                width: thickness,
                depth: length,
            }
        };
        out.push(rect);
        offset += length;
    }

    if horizontal {
        free.y += thickness;
        free.h = (free.h - thickness).max(0.0);
    } else {
        free.x += thickness;
        free.w = (free.w - thickness).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn overlap(a: &Rectangle, b: &Rectangle) -> f64 {
        let w = (a.x + a.width).min(b.x + b.width) - a.x.max(b.x);
        let d = (a.y + a.depth).min(b.y + b.depth) - a.y.max(b.y);
        if w > 0.0 && d > 0.0 {
            w * d
        } else {
            0.0
        }
    }

    fn assert_tiles_square(rects: &[Rectangle], side: f64) {
        let area_tol = EPS * side * side;
        let edge_tol = EPS * side;
        let total: f64 = rects.iter().map(Rectangle::area).sum();
        assert!(
            (total - side * side).abs() < area_tol,
            "area {total} != {}",
            side * side
        );
        for r in rects {
            assert!(r.x >= -edge_tol && r.y >= -edge_tol, "negative origin {r:?}");
            assert!(r.width > 0.0 && r.depth > 0.0, "degenerate {r:?}");
            assert!(r.x + r.width <= side + edge_tol, "overflows x {r:?}");
            assert!(r.y + r.depth <= side + edge_tol, "overflows y {r:?}");
        }
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(overlap(a, b) < area_tol, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn four_sizes_tile_ten_by_ten() {
        let rects = squarify(&[10.0, 20.0, 30.0, 40.0], 10.0).unwrap();
        assert_eq!(rects.len(), 4);
        assert_tiles_square(&rects, 10.0);

        let areas: Vec<f64> = rects.iter().map(Rectangle::area).collect();
        for (area, expected) in areas.iter().zip([10.0, 20.0, 30.0, 40.0]) {
            assert!((area - expected).abs() < EPS, "{areas:?}");
        }
        let largest = areas
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(largest, Some(3));
    }

    #[test]
    fn single_size_fills_canvas() {
        let rects = squarify(&[5.0], 8.0).unwrap();
        assert_eq!(
            rects,
            vec![Rectangle {
                x: 0.0,
                y: 0.0,
                width: 8.0,
                depth: 8.0
            }]
        );
    }

    #[test]
    fn first_row_stops_when_ratio_worsens() {
        let rects = squarify(&[10.0, 20.0, 30.0, 40.0], 10.0).unwrap();
        // [10, 20] share a 3-deep strip across the top.
        assert!((rects[0].depth - 3.0).abs() < EPS);
        assert!((rects[1].depth - 3.0).abs() < EPS);
        assert!((rects[1].y).abs() < EPS);
        // 30 becomes a column on the left of the remaining 10×7 space.
        assert!((rects[2].y - 3.0).abs() < EPS);
        assert!((rects[2].depth - 7.0).abs() < EPS);
    }

    #[test]
    fn invalid_sizes_are_floored_to_one() {
        let rects = squarify(&[0.0, -3.0, f64::NAN, 1.0], 2.0).unwrap();
        assert_eq!(rects.len(), 4);
        assert_tiles_square(&rects, 2.0);
        for r in &rects {
            assert!((r.area() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn empty_input_and_bad_side() {
        assert_eq!(squarify(&[], 10.0).unwrap(), Vec::new());
        assert_eq!(
            squarify(&[1.0], 0.0),
            Err(LayoutError::InvalidSide(0.0))
        );
        assert!(squarify(&[1.0], f64::INFINITY).is_err());
    }

    #[test]
    fn normalize_matches_target_area() {
        let values = normalize_sizes(&[1.0, 3.0], 4.0);
        assert_eq!(values, vec![4.0, 12.0]);
    }

    #[test]
    fn canvas_side_grows_with_file_count() {
        assert_eq!(canvas_side(1, 45.0, 150.0), 150.0);
        assert_eq!(canvas_side(11, 45.0, 150.0), 150.0);
        assert_eq!(canvas_side(12, 45.0, 150.0), 155.0);
        assert_eq!(canvas_side(100, 45.0, 150.0), 450.0);
    }

    proptest! {
        #[test]
        fn rectangles_tile_the_square(
            sizes in prop::collection::vec(1.0f64..1e6, 1..200),
            side in 1.0f64..5000.0,
        ) {
            let rects = squarify(&sizes, side).unwrap();
            prop_assert_eq!(rects.len(), sizes.len());
            assert_tiles_square(&rects, side);
        }

        #[test]
        fn area_is_proportional_to_size(
            sizes in prop::collection::vec(1.0f64..1e6, 1..200),
            side in 1.0f64..5000.0,
        ) {
            let rects = squarify(&sizes, side).unwrap();
            let total: f64 = sizes.iter().sum();
            for (rect, size) in rects.iter().zip(&sizes) {
                let expected = size * side * side / total;
                prop_assert!(
                    (rect.area() - expected).abs() < 1e-6 * side * side,
                    "{} vs {expected}",
                    rect.area()
                );
            }
        }

        #[test]
        fn layout_is_deterministic(
            sizes in prop::collection::vec(1.0f64..1e6, 1..200),
            side in 1.0f64..5000.0,
        ) {
            prop_assert_eq!(squarify(&sizes, side), squarify(&sizes, side));
        }
    }
}
