//! Nutrition facts table
//!
//! Facts are free-form strings per species, kept in the order they were
//! authored so a front-end can lay them out consistently. A missing species is
//! a normal outcome, callers render "no data" instead of failing.

use crate::error::{CatalogError, CatalogResult};
use crate::labels::{display_name, species_key};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

static BUILTIN_JSON: &str = include_str!("../assets/nutrition.json");

static BUILTIN: LazyLock<CatalogResult<NutritionTable>> =
    LazyLock::new(|| NutritionTable::from_json(BUILTIN_JSON));

/// A single named fact, e.g. `Calories = "52 kcal"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionFact {
    pub name: String,
    pub value: String,
}

/// Ordered facts for one species (per 100 g)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub species: String,
    pub facts: Vec<NutritionFact>,
}

impl NutritionRecord {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.facts
            .iter()
            .find(|fact| fact.name.eq_ignore_ascii_case(name))
            .map(|fact| fact.value.as_str())
    }

    /// Numeric part of a fact (`"52 kcal"` → 52.0), 0.0 when absent or unparsable.
    pub fn numeric(&self, name: &str) -> f64 {
        self.get(name).map(parse_leading_number).unwrap_or(0.0)
    }

    pub fn calories_kcal(&self) -> f64 {
        self.numeric("Calories")
    }

    pub fn fiber_grams(&self) -> f64 {
        self.numeric("Fiber")
    }

    /// Splits the facts into two display columns; the left one takes the odd item.
    pub fn columns(&self) -> (&[NutritionFact], &[NutritionFact]) {
        let half = self.facts.len().div_ceil(2);
        self.facts.split_at(half)
    }
}

/// Extracts the number out of a free-form value such as `"2,4g"` or `"160 kcal"`.
///
/// Every character that is not a digit or a decimal separator is dropped, a
/// comma counts as a decimal point. Anything that does not parse afterwards is 0.0.
pub fn parse_leading_number(value: &str) -> f64 {
    let filtered: String = value
        .trim()
        .chars()
        .map(|c| if c == ',' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if filtered.is_empty() || filtered == "." {
        return 0.0;
    }
    filtered.parse::<f64>().unwrap_or(0.0)
}

#[derive(Deserialize)]
struct RawEntry {
    species: String,
    facts: Vec<(String, String)>,
}

/// Species → nutrition facts
#[derive(Debug, Clone, Default)]
pub struct NutritionTable {
    records: HashMap<String, NutritionRecord>,
}

impl NutritionTable {
    /// The table embedded in the crate.
    pub fn builtin() -> CatalogResult<&'static NutritionTable> {
        BUILTIN.as_ref().map_err(CatalogError::clone)
    }

    /// Parses a table from `[{"species": "...", "facts": [["name", "value"], ...]}, ...]`.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let entries: Vec<RawEntry> =
            serde_json::from_str(json).map_err(|e| CatalogError::invalid_table(e.to_string()))?;

        let mut records = HashMap::with_capacity(entries.len());
        for entry in entries {
            let species = entry.species.trim().to_string();
            if species.is_empty() {
                return Err(CatalogError::invalid_table("entry without species"));
            }
            let record = NutritionRecord {
                species: species.clone(),
                facts: entry
                    .facts
                    .into_iter()
                    .map(|(name, value)| NutritionFact { name, value })
                    .collect(),
            };
            if records.insert(species.clone(), record).is_some() {
                return Err(CatalogError::DuplicateSpecies { species });
            }
        }

        tracing::debug!("Loaded nutrition table with {} species", records.len());
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact lookup by canonical species key.
    pub fn lookup(&self, species: &str) -> Option<&NutritionRecord> {
        self.records.get(species)
    }

    /// Lookup for a class label: the display name first, then the species key.
    pub fn lookup_label(&self, label: &str) -> Option<&NutritionRecord> {
        self.lookup(&display_name(label))
            .or_else(|| self.lookup(species_key(label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"[
        {"species": "Apple", "facts": [
            ["Calories", "52 kcal"], ["Vitamins", "C"], ["Fiber", "2.4g"]
        ]},
        {"species": "Cactus fruit", "facts": [["Calories", "41 kcal"]]}
    ]"#;

    #[test]
    fn builtin_table_loads() {
        let table = NutritionTable::builtin().unwrap();
        assert_eq!(table.len(), 50);
        let apple = table.lookup("Apple").unwrap();
        assert_eq!(apple.get("Calories"), Some("52 kcal"));
        assert_eq!(apple.facts[0].name, "Calories");
    }

    #[test]
    fn lookup_miss_is_none() {
        let table = NutritionTable::from_json(SMALL).unwrap();
        assert!(table.lookup("Dragonfruit").is_none());
        assert!(table.lookup_label("Dragonfruit 2").is_none());
    }

    #[test]
    fn lookup_label_prefers_display_name_then_species_key() {
        let table = NutritionTable::from_json(SMALL).unwrap();
        assert_eq!(
            table.lookup_label("Cactus fruit").unwrap().species,
            "Cactus fruit"
        );
        assert_eq!(table.lookup_label("Apple 3").unwrap().species, "Apple");
        assert_eq!(table.lookup_label("Apple Golden 2").unwrap().species, "Apple");
    }

    #[test]
    fn duplicate_species_is_rejected() {
        let json = r#"[{"species": "Fig", "facts": []}, {"species": "Fig", "facts": []}]"#;
        assert_eq!(
            NutritionTable::from_json(json).unwrap_err(),
            CatalogError::DuplicateSpecies {
                species: "Fig".to_string()
            }
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            NutritionTable::from_json("{not json"),
            Err(CatalogError::InvalidTable { .. })
        ));
    }

    #[test]
    fn numeric_values() {
        assert_eq!(parse_leading_number("52 kcal"), 52.0);
        assert_eq!(parse_leading_number("2,4g"), 2.4);
        assert_eq!(parse_leading_number("10g"), 10.0);
        assert_eq!(parse_leading_number("n/a"), 0.0);
        assert_eq!(parse_leading_number("."), 0.0);
        assert_eq!(parse_leading_number("1.2.3"), 0.0);

        let table = NutritionTable::from_json(SMALL).unwrap();
        let apple = table.lookup("Apple").unwrap();
        assert_eq!(apple.calories_kcal(), 52.0);
        assert_eq!(apple.fiber_grams(), 2.4);
        assert_eq!(apple.numeric("Sugar"), 0.0);
    }

    #[test]
    fn columns_put_extra_item_left() {
        let table = NutritionTable::from_json(SMALL).unwrap();
        let (left, right) = table.lookup("Apple").unwrap().columns();
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 1);
        assert_eq!(right[0].name, "Fiber");
    }
}
