//! Price calculation for print jobs.
//!
//! This module ties the engine together:
//! - `EstimatorConfig`: every constant and category rule of the engine
//! - `Estimator::compute_options`: grouping, best-candidate selection, suggestions, ranking
//!
//! The estimator holds no mutable state; one instance can serve concurrent requests.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::grouping::group_entries;
use crate::model::{CalculationResult, CatalogEntry, EstimateError, EstimateRequest, PricingStrategy};
use crate::pricing::select_best;
use crate::suggestions::{suggest_quantities, suggest_size};
use crate::types::Dims2;

/// Category identifiers of the default rule table.
pub mod categories {
    pub const BUSINESS_CARD: &str = "business_card";
    pub const LABEL: &str = "label";
    pub const BROCHURE: &str = "brochure";
    pub const FLYER: &str = "flyer";
    pub const MAGNET: &str = "magnet";
    pub const MAGNET_SHEET: &str = "magnet_sheet";
    pub const PAPER_300GSM: &str = "paper_300gsm";
}

/// Where the base sheet size of an entry comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseDimsSource {
    /// The configured fixed size (business cards, labels).
    Fixed,
    /// The entry's parsed size label.
    SizeLabel,
}

/// Pricing rule of a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryRule {
    Formula,
    Imposition(BaseDimsSource),
}

impl CategoryRule {
    pub fn strategy(&self) -> PricingStrategy {
        match self {
            CategoryRule::Formula => PricingStrategy::FormulaBased,
            CategoryRule::Imposition(_) => PricingStrategy::ImpositionMultiplier,
        }
    }
}

/// Replaces the next quantity tier `skip` by `to` when the request is for `from`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierSkipRule {
    pub from: u32,
    pub skip: u32,
    pub to: u32,
}

/// Configuration of the pricing engine.
///
/// Holds all tolerances, constants and the category → rule table.
#[derive(Clone, Debug)]
pub struct EstimatorConfig {
    /// Maximum distance in mm to an integer multiple of the base size for a standard fit
    pub fit_tolerance_mm: f64,
    /// Maximum distance in mm between the requested and a snapped size
    pub snap_window_mm: f64,
    /// Waste below this value in mm is not reported
    pub waste_report_threshold_mm: f64,
    /// Price per mm² per 1000 pieces for formula-priced categories
    pub magnet_unit_rate: f64,
    /// Base sheet for categories with `BaseDimsSource::Fixed`
    pub fixed_base_dims: Dims2,
    /// Tier assumed for entries whose quantity could not be parsed
    pub default_quantity_tier: u32,
    /// Ascending list of supported order quantities
    pub quantity_tiers: Vec<u32>,
    pub tier_skip_rules: Vec<TierSkipRule>,
    pub category_rules: HashMap<String, CategoryRule>,
    pub magnet_category: String,
    pub magnet_product_code: String,
    pub magnet_group_name: String,
    /// Results of this category whose paper type contains `pinned_paper_marker` rank first
    pub pinned_category: String,
    pub pinned_paper_marker: String,
    pub suggest_sizes: bool,
    pub suggest_quantities: bool,
}

impl EstimatorConfig {
    pub const DEFAULT_FIT_TOLERANCE_MM: f64 = 0.5;
    pub const DEFAULT_SNAP_WINDOW_MM: f64 = 10.0;
    pub const DEFAULT_WASTE_REPORT_THRESHOLD_MM: f64 = 0.1;
    pub const DEFAULT_MAGNET_UNIT_RATE: f64 = 0.21;
    pub const DEFAULT_FIXED_BASE_DIMS: Dims2 = Dims2::new(86.0, 54.0);
    pub const DEFAULT_QUANTITY_TIER: u32 = 1000;
    pub const DEFAULT_QUANTITY_TIERS: [u32; 10] =
        [1000, 2000, 3000, 4000, 5000, 6000, 8000, 10000, 12000, 20000];
    pub const DEFAULT_MAGNET_PRODUCT_CODE: &'static str = "MAGNET-CUSTOM";
    pub const DEFAULT_MAGNET_GROUP_NAME: &'static str = "Magnet (custom size)";
    pub const DEFAULT_PINNED_PAPER_MARKER: &'static str = "115";

    /// Creates a builder for a custom configuration.
    pub fn builder() -> EstimatorConfigBuilder {
        EstimatorConfigBuilder::default()
    }

    /// Pricing rule of a category, if it is priced automatically.
    pub fn rule_for(&self, category: &str) -> Option<CategoryRule> {
        self.category_rules.get(category).copied()
    }

    /// Whether entries of the category are billed from their catalog price.
    ///
    /// Formula-priced categories ignore the entry price.
    pub fn uses_entry_price(&self, category: &str) -> bool {
        self.rule_for(category) != Some(CategoryRule::Formula)
    }

    fn default_category_rules() -> HashMap<String, CategoryRule> {
        use BaseDimsSource::{Fixed, SizeLabel};
        [
            (categories::BUSINESS_CARD, CategoryRule::Imposition(Fixed)),
            (categories::LABEL, CategoryRule::Imposition(Fixed)),
            (categories::BROCHURE, CategoryRule::Imposition(SizeLabel)),
            (categories::FLYER, CategoryRule::Imposition(SizeLabel)),
            (categories::MAGNET_SHEET, CategoryRule::Imposition(SizeLabel)),
            (categories::PAPER_300GSM, CategoryRule::Imposition(SizeLabel)),
            (categories::MAGNET, CategoryRule::Formula),
        ]
        .into_iter()
        .map(|(name, rule)| (name.to_string(), rule))
        .collect()
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            fit_tolerance_mm: Self::DEFAULT_FIT_TOLERANCE_MM,
            snap_window_mm: Self::DEFAULT_SNAP_WINDOW_MM,
            waste_report_threshold_mm: Self::DEFAULT_WASTE_REPORT_THRESHOLD_MM,
            magnet_unit_rate: Self::DEFAULT_MAGNET_UNIT_RATE,
            fixed_base_dims: Self::DEFAULT_FIXED_BASE_DIMS,
            default_quantity_tier: Self::DEFAULT_QUANTITY_TIER,
            quantity_tiers: Self::DEFAULT_QUANTITY_TIERS.to_vec(),
            tier_skip_rules: vec![TierSkipRule {
                from: 2000,
                skip: 3000,
                to: 4000,
            }],
            category_rules: Self::default_category_rules(),
            magnet_category: categories::MAGNET.to_string(),
            magnet_product_code: Self::DEFAULT_MAGNET_PRODUCT_CODE.to_string(),
            magnet_group_name: Self::DEFAULT_MAGNET_GROUP_NAME.to_string(),
            pinned_category: categories::BROCHURE.to_string(),
            pinned_paper_marker: Self::DEFAULT_PINNED_PAPER_MARKER.to_string(),
            suggest_sizes: true,
            suggest_quantities: true,
        }
    }
}

/// Builder for EstimatorConfig.
#[derive(Clone, Debug, Default)]
pub struct EstimatorConfigBuilder {
    config: EstimatorConfig,
}

impl EstimatorConfigBuilder {
    pub fn fit_tolerance_mm(mut self, tolerance: f64) -> Self {
        self.config.fit_tolerance_mm = tolerance;
        self
    }

    pub fn snap_window_mm(mut self, window: f64) -> Self {
        self.config.snap_window_mm = window;
        self
    }

    pub fn magnet_unit_rate(mut self, rate: f64) -> Self {
        self.config.magnet_unit_rate = rate;
        self
    }

    /// Sets the tier list; it is sorted and deduplicated.
    pub fn quantity_tiers(mut self, mut tiers: Vec<u32>) -> Self {
        tiers.retain(|tier| *tier > 0);
        tiers.sort_unstable();
        tiers.dedup();
        self.config.quantity_tiers = tiers;
        self
    }

    /// Adds or replaces the rule of a category.
    pub fn category_rule(mut self, category: impl Into<String>, rule: CategoryRule) -> Self {
        self.config.category_rules.insert(category.into(), rule);
        self
    }

    pub fn suggest_sizes(mut self, enabled: bool) -> Self {
        self.config.suggest_sizes = enabled;
        self
    }

    pub fn suggest_quantities(mut self, enabled: bool) -> Self {
        self.config.suggest_quantities = enabled;
        self
    }

    pub fn build(self) -> EstimatorConfig {
        self.config
    }
}

/// The pricing engine.
#[derive(Clone, Debug, Default)]
pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Computes the ranked price options of a request.
    ///
    /// Groups the catalog entries of the requested category by paper type, keeps the
    /// cheapest outcome of every group, attaches size and quantity suggestions and
    /// ranks the results.
    ///
    /// # Parameters
    /// * `catalog` - Parsed catalog entries
    /// * `request` - The customer's request
    ///
    /// # Returns
    /// The ranked results, `EstimateError::InvalidInput` for an invalid request or
    /// `EstimateError::NoResults` when no group could be priced
    pub fn compute_options(
        &self,
        catalog: &[CatalogEntry],
        request: &EstimateRequest,
    ) -> Result<Vec<CalculationResult>, EstimateError> {
        request.validate()?;

        let config = &self.config;
        let piece = request.piece();
        let groups = group_entries(catalog, &request.category, config);
        let mut results = Vec::with_capacity(groups.len());

        for group in &groups {
            let Some((outcome, matched)) =
                select_best(config, group.entries.iter().copied(), piece, request.quantity)
            else {
                debug!(group = %group.name, "no priceable entry, group skipped");
                continue;
            };

            let size_suggestion = if config.suggest_sizes {
                suggest_size(config, group, request, &outcome)
            } else {
                None
            };
            let (prev_quantity_suggestion, next_quantity_suggestion) =
                if config.suggest_quantities {
                    suggest_quantities(config, group, request)
                } else {
                    (None, None)
                };

            results.push(CalculationResult {
                paper_type_name: group.name.clone(),
                strategy: outcome.strategy,
                matched_entry: matched.clone(),
                price: outcome.price,
                is_standard_fit: outcome.is_standard_fit,
                multiplier: outcome.multiplier,
                quantity_ratio: outcome.quantity_ratio,
                base_dims: outcome.base_dims,
                size_suggestion,
                prev_quantity_suggestion,
                next_quantity_suggestion,
            });
        }

        if results.is_empty() {
            return Err(EstimateError::NoResults {
                category: request.category.clone(),
            });
        }

        rank_results(&mut results, config);
        Ok(results)
    }
}

/// Sorts results: pinned paper types first, then ascending price. Stable for ties.
pub fn rank_results(results: &mut [CalculationResult], config: &EstimatorConfig) {
    results.sort_by(|a, b| {
        is_pinned(b, config)
            .cmp(&is_pinned(a, config))
            .then_with(|| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal))
    });
}

fn is_pinned(result: &CalculationResult, config: &EstimatorConfig) -> bool {
    result.matched_entry.category == config.pinned_category
        && result.paper_type_name.contains(&config.pinned_paper_marker)
}
