//! Partitioning of catalog entries into paper-type groups.

use crate::estimator::EstimatorConfig;
use crate::model::CatalogEntry;

/// Entries of one category that represent the same physical stock.
///
/// Members differ only by printed size or quantity tier.
#[derive(Clone, Debug)]
pub struct PaperGroup<'a> {
    pub name: String,
    pub entries: Vec<&'a CatalogEntry>,
}

impl<'a> PaperGroup<'a> {
    /// Distinct size labels of the group in catalog order, each with its first entry.
    pub fn distinct_sizes(&self) -> Vec<&'a CatalogEntry> {
        let mut seen: Vec<&'a CatalogEntry> = Vec::new();
        for &entry in &self.entries {
            if !seen.iter().any(|e| e.size_label == entry.size_label) {
                seen.push(entry);
            }
        }
        seen
    }

    /// Entries sharing the given size label.
    pub fn entries_with_size<'s>(
        &'s self,
        size_label: &'s str,
    ) -> impl Iterator<Item = &'a CatalogEntry> + 's {
        self.entries
            .iter()
            .copied()
            .filter(move |entry| entry.size_label == size_label)
    }

    /// Entries priced for exactly the given quantity tier.
    pub fn entries_at_tier(&self, tier: u32) -> Vec<&'a CatalogEntry> {
        self.entries
            .iter()
            .copied()
            .filter(|entry| entry.quantity_tier == Some(tier))
            .collect()
    }
}

/// Groups the entries of `category` by paper type, in first-seen catalog order.
///
/// The magnet category collapses into a single synthetic group that only keeps
/// entries carrying the magnet product code.
///
/// # Parameters
/// * `entries` - The whole catalog
/// * `category` - Requested category
/// * `config` - Engine configuration
///
/// # Returns
/// One `PaperGroup` per paper type; empty when the category has no entries
pub fn group_entries<'a>(
    entries: &'a [CatalogEntry],
    category: &str,
    config: &EstimatorConfig,
) -> Vec<PaperGroup<'a>> {
    let in_category = entries.iter().filter(|entry| entry.category == category);

    if category == config.magnet_category {
        let members: Vec<&CatalogEntry> = in_category
            .filter(|entry| {
                entry
                    .code
                    .trim()
                    .eq_ignore_ascii_case(&config.magnet_product_code)
            })
            .collect();
        if members.is_empty() {
            return Vec::new();
        }
        return vec![PaperGroup {
            name: config.magnet_group_name.clone(),
            entries: members,
        }];
    }

    let mut groups: Vec<PaperGroup<'a>> = Vec::new();
    for entry in in_category {
        let name = entry.paper_type();
        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.entries.push(entry),
            None => groups.push(PaperGroup {
                name: name.to_string(),
                entries: vec![entry],
            }),
        }
    }
    groups
}
