//! Highway material calculator.

use serde::Serialize;

use crate::domain::{raw_ingredient_weights, ItemCode, Line, MaterialAmounts, Point};
use crate::geometry::calc_tile_distance;

pub const DEFAULT_WIDTH: u32 = 2;
pub const DEFAULT_PAVING: ItemCode = ItemCode::StoneBrick;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighwayCost {
    pub length: f64,
    pub total_mats: MaterialAmounts,
}

impl HighwayCost {
    /// Raw ingredient weights (kg) needed to craft the totals.
    pub fn raw_materials(&self) -> MaterialAmounts {
        raw_ingredient_weights(&self.total_mats)
    }
}

/// Paving covers every tile across the width, sand lines both edges and one
/// catseye marks each tile regardless of width.
pub fn calc_highway_cost(
    segments: &[Line],
    width: u32,
    paving: ItemCode,
    sand_lining: bool,
) -> HighwayCost {
    let length: f64 = segments.iter().map(calc_tile_distance).sum();
    let mut total_mats = MaterialAmounts::new();
    total_mats.set(paving, length * f64::from(width));
    total_mats.set(
        ItemCode::PileOfSand,
        if sand_lining { length * 2.0 } else { 0.0 },
    );
    total_mats.set(ItemCode::Catseye, length);
    HighwayCost { length, total_mats }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("At least two points are required for a highway segment!")]
    TooFewPoints,
    #[error("All points must be numbers!")]
    NotANumber,
    #[error("All points must be positive!")]
    Negative,
}

pub fn validate_points(points: &[Point]) -> Result<(), ValidationError> {
    if points.len() < 2 {
        return Err(ValidationError::TooFewPoints);
    }
    for point in points {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(ValidationError::NotANumber);
        }
        if point.x < 0.0 || point.y < 0.0 {
            return Err(ValidationError::Negative);
        }
    }
    Ok(())
}
