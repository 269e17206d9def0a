use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{axis_labels, is_grid};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        grid if is_grid(grid) => print_grid(grid),
        Value::Object(res_map) => {
            print_flat_object(res_map);
            // Nested row lists (capital-structure sweep) get their own table
            if let Some(Value::Array(rows)) = res_map.get("rows") {
                println!();
                print_array_table(rows);
            }
        }
        Value::Array(items) => print_array_table(items),
        _ => print_flat_object(envelope),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if val.is_array() && val.as_array().is_some_and(|a| a.iter().any(Value::is_object)) {
            continue;
        }
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

/// Row labels down the side, column labels across the top.
fn print_grid(grid: &Value) {
    if let Some(Value::String(title)) = grid.get("title") {
        println!("{}", title);
    }
    let corner = grid
        .get("row_name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut builder = Builder::default();
    let mut header = vec![corner];
    header.extend(axis_labels(grid, "cols"));
    builder.push_record(header);

    let values = grid.get("values").and_then(Value::as_array);
    for (i, label) in axis_labels(grid, "rows").into_iter().enumerate() {
        let mut record = vec![label];
        if let Some(Value::Array(cells)) = values.and_then(|v| v.get(i)) {
            record.extend(cells.iter().map(format_value));
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if arr.iter().all(is_grid) {
        for (i, grid) in arr.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print_grid(grid);
        }
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        // Nested objects (full reports inside scenarios) do not fit a cell
        let headers: Vec<String> = first
            .iter()
            .filter(|(_, v)| !v.is_object())
            .map(|(k, _)| k.clone())
            .collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
