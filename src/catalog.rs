//! Catalog boundary: reads the raw, text-typed catalog and parses it into numbers.
//!
//! Prices, quantities and sizes arrive as free text ("1.250.000 đ", "1.000 pcs",
//! "21 x 29,7 cm"). They are parsed exactly once here so the engine only sees
//! typed `CatalogEntry` values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

use crate::estimator::EstimatorConfig;
use crate::model::CatalogEntry;
use crate::types::Dims2;

/// Millimetres per centimetre; size labels are written in cm.
const MM_PER_CM: f64 = 10.0;

/// Errors while loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Could not read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse catalog {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One catalog row as supplied by the upload/extraction side.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RawCatalogEntry {
    pub category: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: String,
    pub price: String,
}

impl RawCatalogEntry {
    /// Parses the text fields.
    ///
    /// A row whose price is not read (`price_required == false`) keeps a unit
    /// price of 0 when the price text does not parse.
    ///
    /// # Returns
    /// `None` if the price is required and not a positive number
    pub fn parse(&self, price_required: bool) -> Option<CatalogEntry> {
        let unit_price = match parse_price(&self.price) {
            Some(price) => price,
            None if !price_required => 0.0,
            None => return None,
        };
        Some(CatalogEntry {
            category: self.category.trim().to_string(),
            size_label: self.size.trim().to_string(),
            size_mm: parse_size_label(&self.size),
            code: self.code.trim().to_string(),
            description: self.description.clone(),
            quantity_tier: parse_quantity(&self.quantity),
            unit_price,
        })
    }
}

/// Number of entries of one category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct CategorySummary {
    pub category: String,
    pub entries: usize,
}

/// Parsed, read-only catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parses raw rows, skipping priced rows without a usable price.
    ///
    /// Rows of formula-priced categories in `config` are kept without a price.
    pub fn from_raw(rows: &[RawCatalogEntry], config: &EstimatorConfig) -> Self {
        let entries = rows
            .iter()
            .filter_map(|row| {
                let parsed = row.parse(config.uses_entry_price(row.category.trim()));
                if parsed.is_none() {
                    warn!(
                        code = %row.code,
                        price = %row.price,
                        "catalog entry skipped: price is not a positive number"
                    );
                }
                parsed
            })
            .collect();
        Self { entries }
    }

    /// Reads a JSON array of raw rows from disk.
    pub fn load(path: &Path, config: &EstimatorConfig) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rows: Vec<RawCatalogEntry> =
            serde_json::from_str(&text).map_err(|source| CatalogError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_raw(&rows, config))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Categories in first-seen order with their entry counts.
    pub fn categories(&self) -> Vec<CategorySummary> {
        let mut summary: Vec<CategorySummary> = Vec::new();
        for entry in &self.entries {
            match summary.iter_mut().find(|s| s.category == entry.category) {
                Some(existing) => existing.entries += 1,
                None => summary.push(CategorySummary {
                    category: entry.category.clone(),
                    entries: 1,
                }),
            }
        }
        summary
    }
}

/// Parses a currency amount with `.` as thousands and `,` as decimal separator.
///
/// # Examples
/// ```
/// use print_estimator::catalog::parse_price;
///
/// assert_eq!(parse_price("1.250.000 đ"), Some(1_250_000.0));
/// assert_eq!(parse_price("12,5"), Some(12.5));
/// assert_eq!(parse_price("contact us"), None);
/// ```
pub fn parse_price(raw: &str) -> Option<f64> {
    let normalized: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let value = normalized.parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Extracts the first integer of a quantity text; `.`/`,` between digits group thousands.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    let chars: Vec<char> = raw.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;

    let mut digits = String::new();
    let mut idx = start;
    while idx < chars.len() {
        let c = chars[idx];
        if c.is_ascii_digit() {
            digits.push(c);
        } else if (c == '.' || c == ',')
            && chars.get(idx + 1).is_some_and(|next| next.is_ascii_digit())
        {
            // group separator
        } else {
            break;
        }
        idx += 1;
    }
    digits.parse::<u32>().ok()
}

/// Parses the first `<number> x <number>` pair of a size label into millimetres.
///
/// Accepts `x`, `X`, `*` and `×` as separators and `,` as decimal separator.
/// Numbers are read as centimetres.
///
/// # Examples
/// ```
/// use print_estimator::catalog::parse_size_label;
/// use print_estimator::types::Dims2;
///
/// assert_eq!(parse_size_label("21 x 29,7 cm"), Some(Dims2::new(210.0, 297.0)));
/// assert_eq!(parse_size_label("A4 (21*29.7cm)"), Some(Dims2::new(210.0, 297.0)));
/// assert_eq!(parse_size_label("custom"), None);
/// ```
pub fn parse_size_label(raw: &str) -> Option<Dims2> {
    let chars: Vec<char> = raw.chars().collect();
    for (idx, c) in chars.iter().enumerate() {
        if !matches!(c, 'x' | 'X' | '*' | '×') {
            continue;
        }
        let Some(width) = number_before(&chars, idx) else {
            continue;
        };
        let Some(height) = number_after(&chars, idx + 1) else {
            continue;
        };
        let dims = Dims2::new(width, height).scaled(MM_PER_CM);
        if dims.is_valid() {
            return Some(dims);
        }
    }
    None
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == ','
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.replace(',', ".").parse::<f64>().ok()
}

fn number_before(chars: &[char], end: usize) -> Option<f64> {
    let mut stop = end;
    while stop > 0 && chars[stop - 1].is_whitespace() {
        stop -= 1;
    }
    let mut start = stop;
    while start > 0 && is_number_char(chars[start - 1]) {
        start -= 1;
    }
    if start == stop {
        return None;
    }
    parse_decimal(&chars[start..stop].iter().collect::<String>())
}

fn number_after(chars: &[char], begin: usize) -> Option<f64> {
    let mut start = begin;
    while start < chars.len() && chars[start].is_whitespace() {
        start += 1;
    }
    let mut stop = start;
    while stop < chars.len() && is_number_char(chars[stop]) {
        stop += 1;
    }
    if start == stop {
        return None;
    }
    parse_decimal(&chars[start..stop].iter().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::estimator::{Estimator, categories};
    use crate::model::EstimateRequest;
    use crate::types::EPSILON_GENERAL;

    fn raw(category: &str, size: &str, quantity: &str, price: &str) -> RawCatalogEntry {
        RawCatalogEntry {
            category: category.to_string(),
            size: size.to_string(),
            code: "X-1".to_string(),
            description: "C150 - glossy".to_string(),
            quantity: quantity.to_string(),
            price: price.to_string(),
        }
    }

    #[test]
    fn prices_use_dot_grouping_and_comma_decimals() {
        assert_eq!(parse_price("550"), Some(550.0));
        assert_eq!(parse_price("1.250.000"), Some(1_250_000.0));
        assert_eq!(parse_price("1.250,50 đ"), Some(1250.5));
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("1,2,3"), None);
    }

    #[test]
    fn quantities_take_the_first_number() {
        assert_eq!(parse_quantity("1000"), Some(1000));
        assert_eq!(parse_quantity("1.000 pcs"), Some(1000));
        assert_eq!(parse_quantity("Qty: 2,000 / box of 50"), Some(2000));
        assert_eq!(parse_quantity("5000."), Some(5000));
        assert_eq!(parse_quantity("on request"), None);
    }

    #[test]
    fn size_labels_parse_into_millimetres() {
        assert_eq!(parse_size_label("8.6 x 5.4 cm"), Some(Dims2::new(86.0, 54.0)));
        assert_eq!(parse_size_label("21X29,7"), Some(Dims2::new(210.0, 297.0)));
        assert_eq!(parse_size_label("10 × 15 cm"), Some(Dims2::new(100.0, 150.0)));
        assert_eq!(parse_size_label("box 5 x 0 cm"), None);
        assert_eq!(parse_size_label("Tri-fold A4"), None);
    }

    #[test]
    fn rows_without_price_are_skipped() {
        let rows = vec![
            raw("flyer", "21 x 29.7 cm", "1.000", "1.200"),
            raw("flyer", "21 x 29.7 cm", "2.000", "call"),
            raw("label", "", "", "300"),
        ];
        let catalog = Catalog::from_raw(&rows, &EstimatorConfig::default());
        assert_eq!(catalog.len(), 2);

        let flyer = &catalog.entries()[0];
        assert_eq!(flyer.quantity_tier, Some(1000));
        assert_eq!(flyer.unit_price, 1200.0);
        assert_eq!(flyer.size_mm, Some(Dims2::new(210.0, 297.0)));

        let label = &catalog.entries()[1];
        assert_eq!(label.quantity_tier, None);
        assert_eq!(label.size_mm, None);

        assert_eq!(
            catalog.categories(),
            vec![
                CategorySummary {
                    category: "flyer".to_string(),
                    entries: 1
                },
                CategorySummary {
                    category: "label".to_string(),
                    entries: 1
                },
            ]
        );
    }

    #[test]
    fn formula_priced_rows_need_no_price() {
        let config = EstimatorConfig::default();
        let mut magnet = raw(categories::MAGNET, "custom", "1.000 pcs", "");
        magnet.code = config.magnet_product_code.clone();
        let rows = vec![magnet, raw(categories::FLYER, "21 x 29.7 cm", "1.000", "")];

        let catalog = Catalog::from_raw(&rows, &config);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].category, categories::MAGNET);
        assert_eq!(catalog.entries()[0].unit_price, 0.0);

        let request = EstimateRequest::new(100.0, 150.0, categories::MAGNET, 1000).unwrap();
        let results = Estimator::new(config)
            .compute_options(catalog.entries(), &request)
            .expect("magnet is priced by formula");
        assert_eq!(results.len(), 1);
        assert!((results[0].price - 3150.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn loads_catalog_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"category": "business_card", "size": "8.6 x 5.4 cm", "code": "NC-1",
                 "description": "C300 - matte", "quantity": "1000", "price": "550"}}]"#
        )
        .expect("write catalog");

        let catalog =
            Catalog::load(file.path(), &EstimatorConfig::default()).expect("catalog loads");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].paper_type(), "C300");
    }

    #[test]
    fn reports_missing_and_malformed_files() {
        let config = EstimatorConfig::default();
        let missing = Catalog::load(Path::new("/definitely/not/here.json"), &config);
        assert!(matches!(missing, Err(CatalogError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write catalog");
        assert!(matches!(
            Catalog::load(file.path(), &config),
            Err(CatalogError::Json { .. })
        ));
    }
}
