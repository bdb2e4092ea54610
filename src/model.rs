//! Data models for the print-job estimator.
//!
//! This module defines the fundamental data structures of a price calculation:
//! - `CatalogEntry`: One priced press-sheet offering from the catalog
//! - `EstimateRequest`: The customer's requested size, category and quantity
//! - `CalculationResult`: The cheapest outcome for one paper-type group, with suggestions

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Dims2, validation};

/// Validation error for request data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Category must not be empty")]
    MissingCategory,
}

/// Errors reported by `Estimator::compute_options`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),
    #[error("No priceable catalog entries for category '{category}'")]
    NoResults { category: String },
}

/// One priced offering of the catalog, already parsed into numbers.
///
/// # Fields
/// * `category` - Product category the entry belongs to
/// * `size_label` - Printed size as written in the catalog ("9 x 5.5 cm", "A4", ...)
/// * `size_mm` - Size label parsed into millimetres, if it names a size
/// * `code` - Product code
/// * `description` - Free text; its first hyphen-delimited segment names the paper type
/// * `quantity_tier` - Order quantity the price applies to, if parseable
/// * `unit_price` - Price for one base sheet lot at `quantity_tier`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    pub category: String,
    pub size_label: String,
    #[schema(nullable = true)]
    pub size_mm: Option<Dims2>,
    pub code: String,
    pub description: String,
    #[schema(nullable = true)]
    pub quantity_tier: Option<u32>,
    pub unit_price: f64,
}

impl CatalogEntry {
    /// Name of the paper-type group this entry belongs to.
    ///
    /// The substring before the first hyphen of the description, trimmed. Falls back
    /// to the code when the description yields nothing.
    ///
    /// # Examples
    /// ```
    /// use print_estimator::model::CatalogEntry;
    ///
    /// let entry = CatalogEntry {
    ///     category: "business_card".into(),
    ///     size_label: "8.6 x 5.4 cm".into(),
    ///     size_mm: None,
    ///     code: "NC-01".into(),
    ///     description: "Couche 300gsm - matte lamination".into(),
    ///     quantity_tier: Some(1000),
    ///     unit_price: 550.0,
    /// };
    /// assert_eq!(entry.paper_type(), "Couche 300gsm");
    /// ```
    pub fn paper_type(&self) -> &str {
        let head = self
            .description
            .split('-')
            .next()
            .unwrap_or_default()
            .trim();
        if head.is_empty() {
            self.code.trim()
        } else {
            head
        }
    }
}

/// Request for a price calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "width_mm": 90.0,
        "height_mm": 54.0,
        "category": "business_card",
        "quantity": 1000
    })
)]
pub struct EstimateRequest {
    pub width_mm: f64,
    pub height_mm: f64,
    pub category: String,
    pub quantity: u32,
}

impl EstimateRequest {
    /// Creates a new request with validation.
    ///
    /// # Examples
    /// ```
    /// use print_estimator::model::EstimateRequest;
    ///
    /// assert!(EstimateRequest::new(86.0, 54.0, "business_card", 1000).is_ok());
    /// assert!(EstimateRequest::new(-86.0, 54.0, "business_card", 1000).is_err());
    /// ```
    pub fn new(
        width_mm: f64,
        height_mm: f64,
        category: impl Into<String>,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            width_mm,
            height_mm,
            category: category.into(),
            quantity,
        };
        request.validate()?;
        Ok(request)
    }

    /// Checks dimensions, quantity and category.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_dimension(self.width_mm, "Width")?;
        validation::validate_dimension(self.height_mm, "Height")?;
        validation::validate_quantity(self.quantity)?;
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        Ok(())
    }

    /// Requested piece size.
    #[inline]
    pub fn piece(&self) -> Dims2 {
        Dims2::new(self.width_mm, self.height_mm)
    }
}

/// Pricing strategy used for a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PricingStrategy {
    /// Area × unit rate × quantity, for free-form custom sizes.
    FormulaBased,
    /// Unit price × number of base sheets needed.
    ImpositionMultiplier,
}

/// A cheaper or better-fitting size close to the requested one.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct SizeSuggestion {
    pub width_mm: f64,
    pub height_mm: f64,
    pub price: f64,
    pub is_standard_fit: bool,
    pub savings: f64,
    pub savings_percent: f64,
    #[schema(nullable = true)]
    pub waste_width_mm: Option<f64>,
    #[schema(nullable = true)]
    pub waste_height_mm: Option<f64>,
    pub matched_code: String,
}

/// Best price at a neighboring quantity tier.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct QuantitySuggestion {
    pub quantity: u32,
    pub price: f64,
    pub price_per_piece: f64,
    pub matched_code: String,
}

/// Cheapest outcome for one paper-type group.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct CalculationResult {
    pub paper_type_name: String,
    pub strategy: PricingStrategy,
    pub matched_entry: CatalogEntry,
    pub price: f64,
    pub is_standard_fit: bool,
    #[schema(nullable = true)]
    pub multiplier: Option<u32>,
    pub quantity_ratio: f64,
    #[schema(nullable = true)]
    pub base_dims: Option<Dims2>,
    #[schema(nullable = true)]
    pub size_suggestion: Option<SizeSuggestion>,
    #[schema(nullable = true)]
    pub prev_quantity_suggestion: Option<QuantitySuggestion>,
    #[schema(nullable = true)]
    pub next_quantity_suggestion: Option<QuantitySuggestion>,
}
