//! Common types for 2D sheet geometry.
//!
//! This module defines the small value types shared by the pricing engine,
//! the layout optimizer and the API layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Numerical tolerance for floating-point comparisons of prices and ratios.
pub const EPSILON_GENERAL: f64 = 1e-6;

/// Slack applied before `ceil` so that `2.0000000001` still counts as 2 sheets.
pub const EPSILON_CEIL: f64 = 1e-9;

/// Width and height of a rectangle in millimetres.
///
/// Used for requested piece sizes, press-sheet base sizes and snapped sizes.
///
/// # Examples
/// ```
/// use print_estimator::types::Dims2;
///
/// let card = Dims2::new(86.0, 54.0);
/// assert_eq!(card.rotated(), Dims2::new(54.0, 86.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dims2 {
    pub width: f64,
    pub height: f64,
}

impl Dims2 {
    /// Creates a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the size turned by 90°.
    #[inline]
    pub const fn rotated(&self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Both orientations, as-is first.
    #[inline]
    pub const fn orientations(&self) -> [Self; 2] {
        [*self, self.rotated()]
    }

    /// Calculates the area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Checks if both components are positive and finite.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Scales both components by a factor.
    #[inline]
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// `ceil` with a small slack against floating-point noise.
#[inline]
pub fn ceil_tolerant(value: f64) -> f64 {
    (value - EPSILON_CEIL).ceil()
}

/// Validation helpers shared by the request model and configuration.
pub mod validation {
    use crate::model::ValidationError;

    /// Validates a single dimension.
    ///
    /// # Parameters
    /// * `value` - The value to validate
    /// * `name` - Name of the dimension for error messages
    pub fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
        if value.is_nan() {
            return Err(ValidationError::InvalidDimension(format!(
                "{} must not be NaN",
                name
            )));
        }
        if value.is_infinite() {
            return Err(ValidationError::InvalidDimension(format!(
                "{} must not be infinite",
                name
            )));
        }
        if value <= 0.0 {
            return Err(ValidationError::InvalidDimension(format!(
                "{} must be positive, got: {}",
                name, value
            )));
        }
        Ok(())
    }

    /// Validates an order quantity.
    pub fn validate_quantity(value: u32) -> Result<(), ValidationError> {
        if value == 0 {
            return Err(ValidationError::InvalidQuantity(
                "Quantity must be a positive integer, got: 0".to_string(),
            ));
        }
        Ok(())
    }
}
