pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// A sensitivity grid: `rows` and `cols` of axis ticks plus a `values` matrix.
pub(crate) fn is_grid(value: &Value) -> bool {
    matches!(
        (value.get("rows"), value.get("cols"), value.get("values")),
        (Some(Value::Array(_)), Some(Value::Array(_)), Some(Value::Array(_)))
    )
}

/// Axis labels of a grid (`rows` or `cols`).
pub(crate) fn axis_labels(grid: &Value, axis: &str) -> Vec<String> {
    grid.get(axis)
        .and_then(Value::as_array)
        .map(|ticks| {
            ticks
                .iter()
                .map(|t| {
                    t.get("label")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Scalar rendering shared by the text formatters.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
