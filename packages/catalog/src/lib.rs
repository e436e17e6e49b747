//! Static reference data for FruitScan
//!
//! This crate contains the data the classifier is interpreted against:
//! - The ordered class labels (position = model output index)
//! - Display-name and species-key derivation for labels
//! - The nutrition facts table, keyed by species

pub mod error;
pub mod labels;
pub mod nutrition;

pub use error::{CatalogError, CatalogResult};
pub use labels::{CLASS_NAMES, NUM_CLASSES, class_name, display_name, species_key};
pub use nutrition::{NutritionFact, NutritionRecord, NutritionTable, parse_leading_number};

/// Labels and nutrition facts bundled together for label → facts resolution.
#[derive(Debug, Clone)]
pub struct Catalog {
    labels: &'static [&'static str],
    nutrition: NutritionTable,
}

impl Catalog {
    pub fn new(labels: &'static [&'static str], nutrition: NutritionTable) -> Self {
        Self { labels, nutrition }
    }

    /// Catalog backed by the built-in labels and the embedded nutrition table.
    pub fn builtin() -> CatalogResult<Self> {
        Ok(Self::new(&CLASS_NAMES, NutritionTable::builtin()?.clone()))
    }

    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, index: usize) -> Option<&'static str> {
        self.labels.get(index).copied()
    }

    pub fn nutrition(&self) -> &NutritionTable {
        &self.nutrition
    }

    /// Nutrition facts for a raw class label, if the table knows the species.
    pub fn nutrition_for(&self, raw_label: &str) -> Option<&NutritionRecord> {
        self.nutrition.lookup_label(raw_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_covers_every_label() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.num_classes(), NUM_CLASSES);
        for idx in 0..catalog.num_classes() {
            let label = catalog.label(idx).unwrap();
            assert!(
                catalog.nutrition_for(label).is_some(),
                "no nutrition facts for {label}"
            );
        }
        assert!(catalog.label(NUM_CLASSES).is_none());
    }
}
