use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use prefeas_core::project::assumptions::ProjectInput;

use crate::input::formula::parse_number_input;

/// Fields stored verbatim rather than parsed as numbers.
const TEXT_FIELDS: [&str; 4] = ["project_name", "location", "date", "type_label"];

/// Apply `field=value` overrides to a project.
///
/// Bare names resolve against the assumptions, then the thresholds; dotted
/// paths address anything (`thresholds.irr_min`, `unit_mix.0.price_per_unit`).
/// Numeric values may be formulas (`cost==900*1.05`). A value that does not
/// evaluate leaves the field unchanged and is reported in the returned
/// warnings; malformed or unknown fields are errors.
pub fn apply_overrides(
    project: &ProjectInput,
    sets: &[String],
) -> Result<(ProjectInput, Vec<String>), Box<dyn std::error::Error>> {
    if sets.is_empty() {
        return Ok((project.clone(), Vec::new()));
    }

    let mut doc = serde_json::to_value(project)?;
    let mut warnings = Vec::new();

    for raw in sets {
        let (path, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("--set expects field=value, got '{raw}'"))?;
        let path = path.trim().replace('-', "_");
        let (parent_ptr, key) = resolve_field(&doc, &path)?;
        let parent = doc
            .pointer_mut(&parent_ptr)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| format!("Unknown field '{path}'"))?;

        if TEXT_FIELDS.contains(&key.as_str()) {
            parent.insert(key, Value::String(value.trim().to_string()));
            continue;
        }

        match numeric_value(parent, &key, value) {
            Ok(new_value) => {
                tracing::debug!(field = %path, value = %new_value, "override applied");
                parent.insert(key, new_value);
            }
            Err(reason) => {
                tracing::warn!(field = %path, input = value, %reason, "numeric input rejected");
                warnings.push(format!("Ignored --set {path}: {reason}; field left unchanged"));
            }
        }
    }

    let updated: ProjectInput = serde_json::from_value(doc)?;
    Ok((updated, warnings))
}

/// JSON pointer of the object holding `path`'s field, and the field name.
fn resolve_field(doc: &Value, path: &str) -> Result<(String, String), Box<dyn std::error::Error>> {
    if let Some((parent, key)) = path.rsplit_once('.') {
        let parent_ptr = format!("/{}", parent.replace('.', "/"));
        let known = doc
            .pointer(&parent_ptr)
            .and_then(Value::as_object)
            .map(|obj| obj.contains_key(key) || key == "date")
            .unwrap_or(false);
        if !known {
            return Err(format!("Unknown field '{path}'").into());
        }
        return Ok((parent_ptr, key.to_string()));
    }

    for section in ["assumptions", "thresholds"] {
        let has_key = doc
            .get(section)
            .and_then(Value::as_object)
            .map(|obj| obj.contains_key(path))
            .unwrap_or(false);
        if has_key || (section == "assumptions" && path == "date") {
            return Ok((format!("/{section}"), path.to_string()));
        }
    }

    Err(format!(
        "Unknown field '{path}'. Use an assumption or threshold name, or a dotted path such as unit_mix.0.price_per_unit"
    )
    .into())
}

/// Parse `raw` into the JSON shape the existing field expects.
fn numeric_value(parent: &Map<String, Value>, key: &str, raw: &str) -> Result<Value, String> {
    let number: Decimal = parse_number_input(raw).map_err(|e| e.to_string())?;
    match parent.get(key) {
        // Counts (months, quantities, parking) serialise as JSON integers.
        Some(Value::Number(_)) => {
            if !number.fract().is_zero() {
                return Err(format!("{number} is not a whole number"));
            }
            number
                .to_u32()
                .map(Value::from)
                .ok_or_else(|| format!("{number} is not a non-negative count"))
        }
        _ => Ok(Value::String(number.normalize().to_string())),
    }
}
