use serde_json::Value;

use super::scalar_text;

/// Key answer per command, as JSON pointers into the result, in priority order.
const PRIORITY_POINTERS: [&str; 9] = [
    "/decision/verdict",
    "/report/decision/verdict",
    "/base_value",
    "/min_price_per_m2",
    "/min_optimal_equity",
    "/complete",
    "/project_name",
    "/assumptions/project_name",
    "/step",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in priority order, then falls back to
/// the first field of the result object. Scenario lists print one
/// `name: verdict` line per scenario.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Array(items) = result {
        for item in items {
            println!("{}", item_line(item));
        }
        return;
    }

    for pointer in PRIORITY_POINTERS {
        if let Some(val) = result.pointer(pointer) {
            if !val.is_null() {
                println!("{}", format_minimal(val));
                return;
            }
        }
    }

    if let Value::Object(map) = result {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result));
}

fn item_line(item: &Value) -> String {
    let name = item
        .get("name")
        .or_else(|| item.get("title"))
        .map(format_minimal);
    let answer = item
        .get("verdict")
        .or_else(|| item.get("base_value"))
        .map(format_minimal);
    match (name, answer) {
        (Some(n), Some(a)) => format!("{n}: {a}"),
        _ => format_minimal(item),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        _ => scalar_text(value),
    }
}
