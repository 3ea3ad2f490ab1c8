//! Distance and segment helpers on the tile grid.

use crate::domain::{Line, Point};

/// Consecutive pairs of `points`, in order. Fewer than two points yield none.
pub fn calc_segments(points: &[Point]) -> Vec<Line> {
    points
        .windows(2)
        .map(|pair| Line::new(pair[0], pair[1]))
        .collect()
}

/// Chebyshev distance: diagonal steps cost the same as orthogonal ones.
pub fn calc_tile_distance(line: &Line) -> f64 {
    line.dx().abs().max(line.dy().abs())
}

/// Straight-line Euclidean distance.
pub fn calc_real_distance(line: &Line) -> f64 {
    line.dx().hypot(line.dy())
}

/// Tile length of the polyline through `points`.
pub fn calc_path_length(points: &[Point]) -> f64 {
    calc_segments(points).iter().map(calc_tile_distance).sum()
}

/// Whole-tile span measured through `points`: straight-line distances,
/// rounded up so a partial tile still counts.
pub fn calc_span_length(points: &[Point]) -> u32 {
    let length: f64 = calc_segments(points).iter().map(calc_real_distance).sum();
    length.ceil().max(0.0) as u32
}
