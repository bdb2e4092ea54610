//! Searches the neighborhood of a priced request for better alternatives.
//!
//! Two independent searches run against an already computed result:
//! - size-snap: nearby sizes that land on an integer grid of a base sheet
//! - quantity tiers: the best price one tier below and one tier above
//!
//! Neither search changes the result it starts from.

use tracing::debug;

use crate::estimator::{CategoryRule, EstimatorConfig};
use crate::geometry::snap_to_multiple;
use crate::grouping::PaperGroup;
use crate::model::{EstimateRequest, PricingStrategy, QuantitySuggestion, SizeSuggestion};
use crate::pricing::{PriceOutcome, base_dims, select_best};
use crate::types::{Dims2, EPSILON_GENERAL};

/// Looks for a nearby size that is cheaper or fits a standard grid.
///
/// Every distinct size of the group is tried in both sheet orientations. A snap is
/// accepted when it is strictly cheaper, or equally priced but standard where the
/// current result is not. The cheapest accepted snap wins.
///
/// # Parameters
/// * `config` - Engine configuration
/// * `group` - Paper-type group of the current result
/// * `request` - The validated request
/// * `current` - Outcome of the current result
pub fn suggest_size(
    config: &EstimatorConfig,
    group: &PaperGroup<'_>,
    request: &EstimateRequest,
    current: &PriceOutcome,
) -> Option<SizeSuggestion> {
    if current.strategy == PricingStrategy::FormulaBased {
        return None;
    }

    let requested = request.piece();
    let mut best: Option<SizeSuggestion> = None;

    for size_entry in group.distinct_sizes() {
        let Some(CategoryRule::Imposition(source)) = config.rule_for(&size_entry.category) else {
            continue;
        };
        let Some(base) = base_dims(config, source, size_entry) else {
            continue;
        };

        for orientation in base.orientations() {
            let snapped = Dims2::new(
                snap_to_multiple(requested.width, orientation.width),
                snap_to_multiple(requested.height, orientation.height),
            );
            let delta_w = (requested.width - snapped.width).abs();
            let delta_h = (requested.height - snapped.height).abs();

            if delta_w > config.snap_window_mm || delta_h > config.snap_window_mm {
                continue;
            }
            if delta_w < config.fit_tolerance_mm && delta_h < config.fit_tolerance_mm {
                continue;
            }

            let Some((outcome, matched)) = select_best(
                config,
                group.entries_with_size(&size_entry.size_label),
                snapped,
                request.quantity,
            ) else {
                continue;
            };

            let cheaper = outcome.price + EPSILON_GENERAL < current.price;
            let same_price = (outcome.price - current.price).abs() <= EPSILON_GENERAL;
            let better_fit = same_price && outcome.is_standard_fit && !current.is_standard_fit;
            if !cheaper && !better_fit {
                continue;
            }
            if best
                .as_ref()
                .is_some_and(|kept| kept.price <= outcome.price)
            {
                continue;
            }

            let savings = (current.price - outcome.price).max(0.0);
            let savings_percent = if cheaper && current.price > 0.0 {
                savings / current.price * 100.0
            } else {
                0.0
            };

            debug!(
                group = %group.name,
                width = snapped.width,
                height = snapped.height,
                price = outcome.price,
                "size snap accepted"
            );
            best = Some(SizeSuggestion {
                width_mm: snapped.width,
                height_mm: snapped.height,
                price: outcome.price,
                is_standard_fit: outcome.is_standard_fit,
                savings,
                savings_percent,
                waste_width_mm: reported_waste(delta_w, config.waste_report_threshold_mm),
                waste_height_mm: reported_waste(delta_h, config.waste_report_threshold_mm),
                matched_code: matched.code.clone(),
            });
        }
    }

    best
}

fn reported_waste(delta: f64, threshold: f64) -> Option<f64> {
    (delta >= threshold).then_some(delta)
}

/// Previous and next quantity tier around `quantity`.
///
/// Applies the configured skip rules to the next tier (2000 jumps over 3000 to 4000).
pub fn neighbor_tiers(config: &EstimatorConfig, quantity: u32) -> (Option<u32>, Option<u32>) {
    let prev = config
        .quantity_tiers
        .iter()
        .rev()
        .copied()
        .find(|tier| *tier < quantity);
    let mut next = config
        .quantity_tiers
        .iter()
        .copied()
        .find(|tier| *tier > quantity);

    for rule in &config.tier_skip_rules {
        if quantity == rule.from
            && next == Some(rule.skip)
            && config.quantity_tiers.contains(&rule.to)
        {
            next = Some(rule.to);
        }
    }

    (prev, next)
}

/// Best price of the group at another quantity tier.
///
/// Candidates are the entries priced at exactly that tier, else the default-tier
/// entries, else the whole group.
pub fn suggest_quantity(
    config: &EstimatorConfig,
    group: &PaperGroup<'_>,
    request: &EstimateRequest,
    tier: u32,
) -> Option<QuantitySuggestion> {
    let mut candidates = group.entries_at_tier(tier);
    if candidates.is_empty() {
        candidates = group.entries_at_tier(config.default_quantity_tier);
    }
    if candidates.is_empty() {
        candidates = group.entries.clone();
    }

    let (outcome, matched) = select_best(config, candidates, request.piece(), tier)?;
    Some(QuantitySuggestion {
        quantity: tier,
        price: outcome.price,
        price_per_piece: outcome.price / tier as f64,
        matched_code: matched.code.clone(),
    })
}

/// Runs the quantity search for both neighbors.
pub fn suggest_quantities(
    config: &EstimatorConfig,
    group: &PaperGroup<'_>,
    request: &EstimateRequest,
) -> (Option<QuantitySuggestion>, Option<QuantitySuggestion>) {
    let (prev, next) = neighbor_tiers(config, request.quantity);
    (
        prev.and_then(|tier| suggest_quantity(config, group, request, tier)),
        next.and_then(|tier| suggest_quantity(config, group, request, tier)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::categories;
    use crate::grouping::group_entries;
    use crate::model::CatalogEntry;
    use crate::pricing::evaluate;

    fn entry(
        category: &str,
        code: &str,
        size_label: &str,
        size_mm: Option<Dims2>,
        tier: u32,
        price: f64,
    ) -> CatalogEntry {
        CatalogEntry {
            category: category.to_string(),
            size_label: size_label.to_string(),
            size_mm,
            code: code.to_string(),
            description: "C300 - matte".to_string(),
            quantity_tier: Some(tier),
            unit_price: price,
        }
    }

    fn card_catalog() -> Vec<CatalogEntry> {
        vec![
            entry(categories::BUSINESS_CARD, "NC-1000", "8.6 x 5.4 cm", None, 1000, 550.0),
            entry(categories::BUSINESS_CARD, "NC-2000", "8.6 x 5.4 cm", None, 2000, 900.0),
            entry(categories::BUSINESS_CARD, "NC-4000", "8.6 x 5.4 cm", None, 4000, 1500.0),
        ]
    }

    #[test]
    fn snaps_oversized_card_back_to_standard() {
        let config = EstimatorConfig::default();
        let catalog = card_catalog();
        let groups = group_entries(&catalog, categories::BUSINESS_CARD, &config);
        let request = EstimateRequest::new(90.0, 54.0, categories::BUSINESS_CARD, 1000).unwrap();
        let (current, _) =
            select_best(&config, groups[0].entries.iter().copied(), request.piece(), 1000)
                .unwrap();
        assert!(!current.is_standard_fit);

        let suggestion = suggest_size(&config, &groups[0], &request, &current).unwrap();
        assert_eq!((suggestion.width_mm, suggestion.height_mm), (86.0, 54.0));
        assert!(suggestion.is_standard_fit);
        assert!(suggestion.price < current.price);
        assert!(suggestion.savings > 0.0);
        assert!((suggestion.savings_percent - 50.0).abs() < 1e-9);
        assert_eq!(suggestion.waste_width_mm, Some(4.0));
        assert_eq!(suggestion.waste_height_mm, None);
    }

    #[test]
    fn no_snap_for_exact_fit_or_far_sizes() {
        let config = EstimatorConfig::default();
        let catalog = card_catalog();
        let groups = group_entries(&catalog, categories::BUSINESS_CARD, &config);

        for (w, h) in [(86.0, 54.0), (120.0, 54.0)] {
            let request = EstimateRequest::new(w, h, categories::BUSINESS_CARD, 1000).unwrap();
            let current = evaluate(&config, &catalog[0], request.piece(), 1000).unwrap();
            assert!(suggest_size(&config, &groups[0], &request, &current).is_none(), "{}x{}", w, h);
        }
    }

    #[test]
    fn snap_limits_are_inclusive() {
        let config = EstimatorConfig::default();
        let catalog = card_catalog();
        let groups = group_entries(&catalog, categories::BUSINESS_CARD, &config);
        let snap_for = |width: f64| {
            let request =
                EstimateRequest::new(width, 54.0, categories::BUSINESS_CARD, 1000).unwrap();
            let (current, _) =
                select_best(&config, groups[0].entries.iter().copied(), request.piece(), 1000)
                    .unwrap();
            (
                current.is_standard_fit,
                suggest_size(&config, &groups[0], &request, &current)
                    .map(|s| (s.width_mm, s.price)),
            )
        };

        // 10 mm window
        assert_eq!(snap_for(96.0), (false, Some((86.0, 550.0))));
        assert_eq!(snap_for(96.01), (false, None));
        // 0.5 mm fit tolerance
        assert_eq!(snap_for(86.5), (true, None));
        assert_eq!(snap_for(86.6), (false, Some((86.0, 550.0))));
    }

    #[test]
    fn equal_price_snap_is_accepted_for_better_fit() {
        let config = EstimatorConfig::default();
        // 200 x 100 sheet; a 195 x 100 piece costs one sheet either way.
        let catalog = vec![entry(
            categories::FLYER,
            "FL-1",
            "20 x 10 cm",
            Some(Dims2::new(200.0, 100.0)),
            1000,
            700.0,
        )];
        let groups = group_entries(&catalog, categories::FLYER, &config);
        let request = EstimateRequest::new(195.0, 100.0, categories::FLYER, 1000).unwrap();
        let current = evaluate(&config, &catalog[0], request.piece(), 1000).unwrap();
        assert!(!current.is_standard_fit);
        assert_eq!(current.multiplier, Some(1));

        let suggestion = suggest_size(&config, &groups[0], &request, &current).unwrap();
        assert!(suggestion.is_standard_fit);
        assert_eq!(suggestion.savings, 0.0);
        assert_eq!(suggestion.savings_percent, 0.0);
        assert_eq!(suggestion.waste_width_mm, Some(5.0));
    }

    #[test]
    fn magnet_has_no_size_suggestion() {
        let config = EstimatorConfig::default();
        let code = config.magnet_product_code.clone();
        let catalog = vec![entry(categories::MAGNET, &code, "custom", None, 1000, 0.0)];
        let groups = group_entries(&catalog, categories::MAGNET, &config);
        let request = EstimateRequest::new(100.0, 150.0, categories::MAGNET, 2000).unwrap();
        let current = evaluate(&config, &catalog[0], request.piece(), 2000).unwrap();
        assert!(suggest_size(&config, &groups[0], &request, &current).is_none());
    }

    #[test]
    fn neighbor_tiers_follow_tier_list() {
        let config = EstimatorConfig::default();
        assert_eq!(neighbor_tiers(&config, 1000), (None, Some(2000)));
        assert_eq!(neighbor_tiers(&config, 5000), (Some(4000), Some(6000)));
        assert_eq!(neighbor_tiers(&config, 7000), (Some(6000), Some(8000)));
        assert_eq!(neighbor_tiers(&config, 20000), (Some(12000), None));
        assert_eq!(neighbor_tiers(&config, 500), (None, Some(1000)));
    }

    #[test]
    fn two_thousand_skips_to_four_thousand() {
        let config = EstimatorConfig::default();
        assert_eq!(neighbor_tiers(&config, 2000), (Some(1000), Some(4000)));

        let without_four = EstimatorConfig::builder()
            .quantity_tiers(vec![1000, 2000, 3000, 5000])
            .build();
        assert_eq!(neighbor_tiers(&without_four, 2000), (Some(1000), Some(3000)));
    }

    #[test]
    fn quantity_suggestions_use_matching_tiers() {
        let config = EstimatorConfig::default();
        let catalog = card_catalog();
        let groups = group_entries(&catalog, categories::BUSINESS_CARD, &config);
        let request = EstimateRequest::new(86.0, 54.0, categories::BUSINESS_CARD, 2000).unwrap();

        let (prev, next) = suggest_quantities(&config, &groups[0], &request);
        let prev = prev.unwrap();
        assert_eq!(prev.quantity, 1000);
        assert_eq!(prev.matched_code, "NC-1000");
        assert!((prev.price - 550.0).abs() < EPSILON_GENERAL);

        let next = next.unwrap();
        assert_eq!(next.quantity, 4000);
        assert_eq!(next.matched_code, "NC-4000");
        assert!((next.price - 1500.0).abs() < EPSILON_GENERAL);
        assert!((next.price_per_piece - 0.375).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn quantity_suggestion_falls_back_to_default_tier() {
        let config = EstimatorConfig::default();
        let catalog = card_catalog();
        let groups = group_entries(&catalog, categories::BUSINESS_CARD, &config);
        let request = EstimateRequest::new(86.0, 54.0, categories::BUSINESS_CARD, 4000).unwrap();

        let (_, next) = suggest_quantities(&config, &groups[0], &request);
        let next = next.unwrap();
        assert_eq!(next.quantity, 5000);
        assert_eq!(next.matched_code, "NC-1000");
        assert!((next.price - 2750.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn quantity_suggestion_falls_back_to_any_entry() {
        let config = EstimatorConfig::default();
        let catalog = vec![entry(
            categories::BUSINESS_CARD,
            "NC-2",
            "8.6 x 5.4 cm",
            None,
            2000,
            900.0,
        )];
        let groups = group_entries(&catalog, categories::BUSINESS_CARD, &config);
        let request = EstimateRequest::new(86.0, 54.0, categories::BUSINESS_CARD, 2000).unwrap();

        let suggestion = suggest_quantity(&config, &groups[0], &request, 4000).unwrap();
        assert_eq!(suggestion.quantity, 4000);
        assert_eq!(suggestion.matched_code, "NC-2");
        assert!((suggestion.price - 1800.0).abs() < EPSILON_GENERAL);
        assert!((suggestion.price_per_piece - 0.45).abs() < EPSILON_GENERAL);
    }
}
