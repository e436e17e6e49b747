//! Plain-text presentation of session results

use fruitscan::catalog::{NutritionFact, NutritionRecord};
use fruitscan::model::{ModelLocation, ProvisionEvent};
use fruitscan::{PredictionResult, SessionError};

const BAR_WIDTH: usize = 30;

fn bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

pub fn result(result: &PredictionResult) -> String {
    let mut out = format!("Prediction: {}\n", result.display_label);
    out.push_str(&format!(
        "Confidence: {:5.1}% [{}]\n",
        result.confidence,
        bar(f64::from(result.confidence) / 100.0, BAR_WIDTH)
    ));

    match &result.nutrition {
        Some(record) => out.push_str(&nutrition(record)),
        None => out.push_str(&format!(
            "\nNo nutrition data available for {}.\n",
            result.display_label
        )),
    }
    out
}

pub fn nutrition(record: &NutritionRecord) -> String {
    let mut out = format!("\nNutrition facts for {} (per 100 g)\n", record.species);

    let (left, right) = record.columns();
    let width = left
        .iter()
        .map(|fact| fact.name.len() + fact.value.len() + 2)
        .max()
        .unwrap_or(0);
    for (i, fact) in left.iter().enumerate() {
        let left_cell = cell(fact);
        let row = match right.get(i) {
            Some(other) => format!("  {left_cell:<width$}    {}\n", cell(other)),
            None => format!("  {left_cell}\n"),
        };
        out.push_str(&row);
    }

    let calories = record.calories_kcal();
    let fiber = record.fiber_grams();
    let scale = calories.max(fiber);
    if scale > 0.0 {
        out.push_str(&format!(
            "\n  Calories [{}] {calories} kcal\n",
            bar(calories / scale, BAR_WIDTH)
        ));
        out.push_str(&format!(
            "  Fiber    [{}] {fiber} g\n",
            bar(fiber / scale, BAR_WIDTH)
        ));
    }
    out
}

fn cell(fact: &NutritionFact) -> String {
    format!("{}: {}", fact.name, fact.value)
}

pub fn error(err: &SessionError) -> String {
    if err.is_model_unavailable() {
        format!(
            "Classifier not available: {err}\n\
             Type `retry` to attempt loading the model again."
        )
    } else {
        format!("Could not classify the image: {err}")
    }
}

pub fn provenance(location: &ModelLocation) -> String {
    format!("Model ({}) at {}", location.source, location.dir.display())
}

/// One status line per provisioning event.
pub fn progress(event: &ProvisionEvent) -> String {
    match event {
        ProvisionEvent::Phase(phase) => format!("{phase}..."),
        ProvisionEvent::Download {
            downloaded,
            total: Some(total),
        } if *total > 0 => format!(
            "  {:.1} / {:.1} MiB ({:.0}%)",
            *downloaded as f64 / 1_048_576.0,
            *total as f64 / 1_048_576.0,
            *downloaded as f64 * 100.0 / *total as f64
        ),
        ProvisionEvent::Download { downloaded, .. } => {
            format!("  {:.1} MiB", *downloaded as f64 / 1_048_576.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fruitscan::catalog::NutritionTable;
    use fruitscan::model::{ModelError, ModelSource, ProvisionPhase};
    use std::path::PathBuf;

    fn apple() -> NutritionRecord {
        NutritionTable::from_json(
            r#"[{"species": "Apple", "facts": [
                ["Calories", "52 kcal"], ["Vitamins", "C"], ["Fiber", "2.4g"]
            ]}]"#,
        )
        .unwrap()
        .lookup("Apple")
        .cloned()
        .unwrap()
    }

    fn prediction(nutrition: Option<NutritionRecord>) -> PredictionResult {
        PredictionResult {
            class_index: 0,
            raw_label: "Apple 3".into(),
            display_label: "Apple".into(),
            species_key: "Apple".into(),
            confidence: 87.25,
            nutrition,
        }
    }

    #[test]
    fn bar_is_clamped() {
        assert_eq!(bar(0.5, 4), "##..");
        assert_eq!(bar(2.0, 3), "###");
        assert_eq!(bar(-1.0, 3), "...");
    }

    #[test]
    fn renders_label_confidence_and_facts() {
        let text = result(&prediction(Some(apple())));
        assert!(text.contains("Prediction: Apple"));
        assert!(text.contains(" 87.2%") || text.contains(" 87.3%"));
        assert!(text.contains("Calories: 52 kcal"));
        assert!(text.contains("Fiber: 2.4g"));
        assert!(text.contains("52 kcal"));
        assert!(text.contains("2.4 g"));
    }

    #[test]
    fn facts_are_laid_out_in_two_columns() {
        let text = nutrition(&apple());
        let first_row = text
            .lines()
            .find(|line| line.contains("Calories: 52 kcal"))
            .unwrap();
        assert!(first_row.contains("Fiber: 2.4g"));
        let second_row = text.lines().find(|line| line.contains("Vitamins")).unwrap();
        assert!(!second_row.contains("Fiber"));
    }

    #[test]
    fn missing_nutrition_is_stated() {
        let text = result(&prediction(None));
        assert!(text.contains("No nutrition data available for Apple."));
    }

    #[test]
    fn every_section_ends_its_own_line() {
        let text = result(&prediction(None));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Prediction: Apple");
        assert!(lines[1].starts_with("Confidence: "));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "No nutrition data available for Apple.");
        assert!(text.ends_with("Apple.\n"));

        let facts = nutrition(&apple());
        assert!(facts.starts_with("\nNutrition facts for Apple (per 100 g)\n"));
        assert!(facts.lines().any(|line| line.starts_with("  Calories [")));
        assert!(facts.ends_with(" g\n"));
    }

    #[test]
    fn unavailable_model_is_reported_as_such() {
        let unavailable = SessionError::from(ModelError::Unavailable {
            reason: "download failed".into(),
        });
        assert!(error(&unavailable).contains("\nType `retry`"));
        let err = SessionError::from(ModelError::Unavailable {
            reason: "download failed".into(),
        });
        assert!(error(&err).starts_with("Classifier not available"));
        assert!(error(&SessionError::EmptyImage).starts_with("Could not classify"));
    }

    #[test]
    fn provenance_and_progress_lines() {
        let location = ModelLocation {
            dir: PathBuf::from("/cache/model"),
            source: ModelSource::Downloaded,
        };
        assert_eq!(provenance(&location), "Model (downloaded) at /cache/model");
        assert_eq!(
            progress(&ProvisionEvent::Phase(ProvisionPhase::Extracting)),
            "Extracting model..."
        );
        assert_eq!(
            progress(&ProvisionEvent::Download {
                downloaded: 1_048_576,
                total: Some(2_097_152)
            }),
            "  1.0 / 2.0 MiB (50%)"
        );
    }
}
