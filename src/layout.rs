//! Layout search for pieces that do not fit a base sheet as a clean grid.
//!
//! Scaling the per-piece sheet count linearly overcounts whenever several pieces
//! can share sheets. The search below arranges `n` pieces as a regular super-tile
//! of `r` rows by `c` columns (and its transpose) and counts how many base sheets
//! the tile covers in either sheet orientation. Only regular row×column tilings
//! are considered; irregular arrangements are out of reach of this heuristic.

use crate::types::{Dims2, ceil_tolerant};

use crate::geometry::sheets_to_cover;

/// One evaluated super-tile arrangement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileLayout {
    pub rows: u64,
    pub cols: u64,
    /// Base sheet orientation the tile was measured against.
    pub base: Dims2,
    pub sheets: u64,
}

/// Returns the smallest number of base sheets that covers `piece_count` pieces.
///
/// # Parameters
/// * `piece` - Requested piece size in mm
/// * `base` - Base sheet size in mm
/// * `piece_count` - Number of pieces (fractional counts are rounded up)
///
/// # Returns
/// A multiplier of at least 1
pub fn minimize_sheets(piece: Dims2, base: Dims2, piece_count: f64) -> u32 {
    best_layout(piece, base, piece_count)
        .map(|layout| layout.sheets.clamp(1, u32::MAX as u64) as u32)
        .unwrap_or(1)
}

/// Finds the cheapest regular tiling for `piece_count` pieces.
///
/// Returns `None` only for degenerate inputs (non-positive sizes).
pub fn best_layout(piece: Dims2, base: Dims2, piece_count: f64) -> Option<TileLayout> {
    if !piece.is_valid() || !base.is_valid() {
        return None;
    }

    let n = if piece_count.is_finite() {
        ceil_tolerant(piece_count).max(1.0) as u64
    } else {
        1
    };

    let mut best: Option<TileLayout> = None;
    for (r, c) in factor_pairs(n) {
        for (rows, cols) in [(r, c), (c, r)] {
            let tile = Dims2::new(cols as f64 * piece.width, rows as f64 * piece.height);
            for orientation in base.orientations() {
                let sheets = sheets_to_cover(tile, orientation);
                let candidate = TileLayout {
                    rows,
                    cols,
                    base: orientation,
                    sheets,
                };
                if best.is_none_or(|current| sheets < current.sheets) {
                    best = Some(candidate);
                }
            }
        }
    }
    best
}

/// Factor pairs `(r, c)` with `r × c = n` and `r ≤ √n`.
fn factor_pairs(n: u64) -> Vec<(u64, u64)> {
    let mut pairs = Vec::new();
    let mut r = 1;
    while r * r <= n {
        if n % r == 0 {
            pairs.push((r, n / r));
        }
        r += 1;
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_multiplier(piece: Dims2, base: Dims2) -> u64 {
        sheets_to_cover(piece, base).min(sheets_to_cover(piece, base.rotated()))
    }

    #[test]
    fn factor_pairs_cover_each_divisor_once() {
        assert_eq!(factor_pairs(1), vec![(1, 1)]);
        assert_eq!(factor_pairs(12), vec![(1, 12), (2, 6), (3, 4)]);
        assert_eq!(factor_pairs(16), vec![(1, 16), (2, 8), (4, 4)]);
        assert_eq!(factor_pairs(7), vec![(1, 7)]);
    }

    #[test]
    fn oversized_piece_needs_two_sheets() {
        let card = Dims2::new(86.0, 54.0);
        assert_eq!(minimize_sheets(Dims2::new(90.0, 54.0), card, 1.0), 2);
    }

    #[test]
    fn half_size_pieces_share_a_sheet() {
        let base = Dims2::new(200.0, 100.0);
        let piece = Dims2::new(95.0, 95.0);
        // Two pieces side by side fit one 200 x 100 sheet.
        assert_eq!(minimize_sheets(piece, base, 2.0), 1);
        assert_eq!(minimize_sheets(piece, base, 4.0), 2);
    }

    #[test]
    fn fractional_counts_round_up() {
        let base = Dims2::new(100.0, 100.0);
        let piece = Dims2::new(100.0, 100.0);
        assert_eq!(minimize_sheets(piece, base, 2.5), 3);
        assert_eq!(minimize_sheets(piece, base, 0.5), 1);
    }

    #[test]
    fn rotated_sheet_is_considered() {
        let base = Dims2::new(100.0, 300.0);
        let piece = Dims2::new(290.0, 95.0);
        let layout = best_layout(piece, base, 1.0).unwrap();
        assert_eq!(layout.sheets, 1);
        assert_eq!(layout.base, base.rotated());
    }

    #[test]
    fn never_worse_than_linear_scaling() {
        let bases = [Dims2::new(86.0, 54.0), Dims2::new(210.0, 297.0)];
        let pieces = [
            Dims2::new(90.0, 54.0),
            Dims2::new(45.0, 30.0),
            Dims2::new(100.0, 150.0),
            Dims2::new(301.0, 12.0),
        ];
        for base in bases {
            for piece in pieces {
                for k in 1..=24u32 {
                    let optimized = minimize_sheets(piece, base, k as f64) as u64;
                    let linear = naive_multiplier(piece, base) * k as u64;
                    assert!(
                        optimized <= linear,
                        "{:?} on {:?} x{}: {} > {}",
                        piece,
                        base,
                        k,
                        optimized,
                        linear
                    );
                    assert!(optimized >= 1);
                }
            }
        }
    }

    #[test]
    fn degenerate_input_has_no_layout() {
        assert!(best_layout(Dims2::new(0.0, 10.0), Dims2::new(10.0, 10.0), 1.0).is_none());
        assert_eq!(minimize_sheets(Dims2::new(0.0, 10.0), Dims2::new(10.0, 10.0), 1.0), 1);
    }
}
