use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use foodgram::domain::types::NewIngredient;

#[derive(Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

impl From<IngredientRecord> for NewIngredient {
    fn from(record: IngredientRecord) -> Self {
        Self {
            name: record.name,
            measurement_unit: record.measurement_unit,
        }
    }
}

/// Parse by extension: `.json` is a JSON array, anything else headerless CSV.
pub fn parse(path: &Path, raw: &[u8]) -> Result<Vec<NewIngredient>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        parse_json(raw)
    } else {
        parse_csv(raw)
    }
}

fn parse_json(raw: &[u8]) -> Result<Vec<NewIngredient>> {
    let records: Vec<IngredientRecord> =
        serde_json::from_slice(raw).context("parse ingredients JSON")?;
    Ok(records.into_iter().map(NewIngredient::from).collect())
}

fn parse_csv(raw: &[u8]) -> Result<Vec<NewIngredient>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(raw);
    reader
        .deserialize::<(String, String)>()
        .enumerate()
        .map(|(i, row)| {
            let (name, measurement_unit) =
                row.with_context(|| format!("parse ingredients CSV row {}", i + 1))?;
            Ok(NewIngredient {
                name,
                measurement_unit,
            })
        })
        .collect()
}
