//! Geometric helpers for fitting piece sizes onto press sheets.
//!
//! This module answers two questions per axis: does a requested length land on an
//! integer multiple of a base length, and what is the nearest such multiple.

use crate::types::{Dims2, ceil_tolerant};

/// Nearest whole number of base lengths for a requested length, never below 1.
///
/// # Parameters
/// * `value` - Requested length in mm
/// * `base` - Base sheet length in mm
///
/// # Examples
/// ```
/// use print_estimator::geometry::rounded_ratio;
///
/// assert_eq!(rounded_ratio(172.0, 86.0), 2.0);
/// assert_eq!(rounded_ratio(30.0, 86.0), 1.0);
/// ```
pub fn rounded_ratio(value: f64, base: f64) -> f64 {
    (value / base).round().max(1.0)
}

/// Checks whether `value` lies within `tolerance` of an integer multiple (≥ 1) of `base`.
pub fn is_near_multiple(value: f64, base: f64, tolerance: f64) -> bool {
    let multiple = (value / base).round();
    if multiple < 1.0 {
        return false;
    }
    (multiple * base - value).abs() <= tolerance
}

/// Snaps a requested length to the nearest integer multiple (≥ 1) of `base`.
pub fn snap_to_multiple(value: f64, base: f64) -> f64 {
    rounded_ratio(value, base) * base
}

/// Checks whether a piece fits a base sheet as an integer grid in the given orientation.
///
/// Returns the number of pieces of the grid (`cols × rows`) when both axes fit.
pub fn grid_fit(piece: Dims2, base: Dims2, tolerance: f64) -> Option<f64> {
    if is_near_multiple(piece.width, base.width, tolerance)
        && is_near_multiple(piece.height, base.height, tolerance)
    {
        Some(rounded_ratio(piece.width, base.width) * rounded_ratio(piece.height, base.height))
    } else {
        None
    }
}

/// Number of base sheets needed to cover a rectangular tile without rotating the sheet.
pub fn sheets_to_cover(tile: Dims2, base: Dims2) -> u64 {
    let across = ceil_tolerant(tile.width / base.width).max(1.0);
    let down = ceil_tolerant(tile.height / base.height).max(1.0);
    (across * down) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_multiple_respects_tolerance() {
        assert!(is_near_multiple(86.0, 86.0, 0.5));
        assert!(is_near_multiple(172.4, 86.0, 0.5));
        assert!(!is_near_multiple(90.0, 86.0, 0.5));
        assert!(!is_near_multiple(0.3, 86.0, 0.5));
    }

    #[test]
    fn snap_rounds_to_nearest_multiple() {
        assert_eq!(snap_to_multiple(90.0, 86.0), 86.0);
        assert_eq!(snap_to_multiple(130.0, 86.0), 172.0);
        assert_eq!(snap_to_multiple(20.0, 86.0), 86.0);
    }

    #[test]
    fn grid_fit_counts_pieces() {
        let base = Dims2::new(86.0, 54.0);
        assert_eq!(grid_fit(Dims2::new(172.0, 108.0), base, 0.5), Some(4.0));
        assert_eq!(grid_fit(Dims2::new(86.0, 54.0), base, 0.5), Some(1.0));
        assert_eq!(grid_fit(Dims2::new(54.0, 86.0), base, 0.5), None);
        assert_eq!(grid_fit(Dims2::new(90.0, 54.0), base, 0.5), None);
    }

    #[test]
    fn sheets_to_cover_rounds_up_per_axis() {
        let base = Dims2::new(86.0, 54.0);
        assert_eq!(sheets_to_cover(Dims2::new(90.0, 54.0), base), 2);
        assert_eq!(sheets_to_cover(Dims2::new(172.0, 108.0), base), 4);
        assert_eq!(sheets_to_cover(Dims2::new(40.0, 20.0), base), 1);
    }
}
