//! Price evaluation of single catalog entries.
//!
//! Every category maps to one `CategoryRule` in the `EstimatorConfig`:
//! - `Formula`: free-form sizes priced by area, rate and quantity
//! - `Imposition`: unit price of the entry times the number of base sheets needed
//!
//! Categories without a rule are not priced automatically and evaluate to `None`.

use crate::estimator::{BaseDimsSource, CategoryRule, EstimatorConfig};
use crate::geometry::grid_fit;
use crate::layout::minimize_sheets;
use crate::model::{CatalogEntry, PricingStrategy};
use crate::types::{Dims2, ceil_tolerant};

/// Price of one catalog entry for a requested size and quantity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceOutcome {
    pub strategy: PricingStrategy,
    pub price: f64,
    pub is_standard_fit: bool,
    /// Number of base sheet lots billed (imposition only).
    pub multiplier: Option<u32>,
    pub quantity_ratio: f64,
    pub base_dims: Option<Dims2>,
}

/// Base sheet size of an entry under the given rule.
///
/// # Returns
/// `None` when the rule reads the size label and the label names no size
pub fn base_dims(
    config: &EstimatorConfig,
    source: BaseDimsSource,
    entry: &CatalogEntry,
) -> Option<Dims2> {
    match source {
        BaseDimsSource::Fixed => Some(config.fixed_base_dims),
        BaseDimsSource::SizeLabel => entry.size_mm.filter(Dims2::is_valid),
    }
}

/// Prices one entry for a requested piece size and quantity.
///
/// # Parameters
/// * `config` - Engine configuration with the category rules
/// * `entry` - Catalog entry whose price is used
/// * `piece` - Requested piece size in mm
/// * `target_qty` - Requested quantity
///
/// # Returns
/// `None` if the entry's category has no rule or its base size is unknown
pub fn evaluate(
    config: &EstimatorConfig,
    entry: &CatalogEntry,
    piece: Dims2,
    target_qty: u32,
) -> Option<PriceOutcome> {
    let rule = config.rule_for(&entry.category)?;
    let strategy = rule.strategy();
    let quantity = target_qty as f64;

    match rule {
        CategoryRule::Formula => Some(PriceOutcome {
            strategy,
            price: piece.area() * config.magnet_unit_rate * (quantity / 1000.0),
            is_standard_fit: false,
            multiplier: None,
            quantity_ratio: quantity / 1000.0,
            base_dims: None,
        }),
        CategoryRule::Imposition(source) => {
            let base = base_dims(config, source, entry)?;
            let tier = entry
                .quantity_tier
                .filter(|tier| *tier > 0)
                .unwrap_or(config.default_quantity_tier);
            let quantity_ratio = quantity / tier as f64;

            let imposed = standard_fit(piece, base, config.fit_tolerance_mm);
            let multiplier = match imposed {
                Some(pieces_per_grid) => ceil_tolerant(pieces_per_grid * quantity_ratio)
                    .clamp(1.0, u32::MAX as f64) as u32,
                None => minimize_sheets(piece, base, quantity_ratio),
            };

            Some(PriceOutcome {
                strategy,
                price: entry.unit_price * multiplier as f64,
                is_standard_fit: imposed.is_some(),
                multiplier: Some(multiplier),
                quantity_ratio,
                base_dims: Some(base),
            })
        }
    }
}

/// Standard-fit test in both orientations of the requested piece.
///
/// Returns the imposed multiplier of the first orientation that lands on an integer grid.
pub fn standard_fit(piece: Dims2, base: Dims2, tolerance: f64) -> Option<f64> {
    piece
        .orientations()
        .into_iter()
        .find_map(|oriented| grid_fit(oriented, base, tolerance))
}

/// Evaluates every entry and keeps the cheapest outcome.
///
/// Entries that cannot be priced are ignored; on equal prices the earlier entry wins.
pub fn select_best<'a, I>(
    config: &EstimatorConfig,
    entries: I,
    piece: Dims2,
    target_qty: u32,
) -> Option<(PriceOutcome, &'a CatalogEntry)>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    let mut best: Option<(PriceOutcome, &'a CatalogEntry)> = None;
    for entry in entries {
        let Some(outcome) = evaluate(config, entry, piece, target_qty) else {
            continue;
        };
        if best
            .as_ref()
            .is_none_or(|(current, _)| outcome.price < current.price)
        {
            best = Some((outcome, entry));
        }
    }
    best
}
