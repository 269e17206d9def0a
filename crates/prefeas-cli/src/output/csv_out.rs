use serde_json::Value;
use std::io;

use super::{axis_labels, is_grid, scalar_text};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(grid) if is_grid(grid) => write_grid_csv(&mut wtr, grid),
            Some(Value::Object(result)) => {
                if let Some(Value::Array(rows)) = result.get("rows") {
                    // Capital-structure sweep
                    write_array_csv(&mut wtr, rows);
                } else {
                    write_field_value_csv(&mut wtr, result);
                }
            }
            Some(Value::Array(results)) => write_array_csv(&mut wtr, results),
            _ => write_field_value_csv(&mut wtr, map),
        },
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&scalar_text(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_field_value_csv(wtr: &mut StdoutWriter<'_>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &scalar_text(val)]);
    }
}

/// Header row of column labels, then one row per row label.
fn write_grid_csv(wtr: &mut StdoutWriter<'_>, grid: &Value) {
    let row_name = grid.get("row_name").map(scalar_text).unwrap_or_default();
    let mut header = vec![row_name];
    header.extend(axis_labels(grid, "cols"));
    let _ = wtr.write_record(&header);

    let values = grid.get("values").and_then(Value::as_array);
    for (i, label) in axis_labels(grid, "rows").into_iter().enumerate() {
        let mut record = vec![label];
        if let Some(Value::Array(cells)) = values.and_then(|v| v.get(i)) {
            record.extend(cells.iter().map(scalar_text));
        }
        let _ = wtr.write_record(&record);
    }
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Several grids: one block per grid, separated by a title row
    if arr.iter().all(is_grid) {
        for grid in arr {
            let title = grid.get("title").map(scalar_text).unwrap_or_default();
            let _ = wtr.write_record([title.as_str()]);
            write_grid_csv(wtr, grid);
        }
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first
            .iter()
            .filter(|(_, v)| !v.is_object())
            .map(|(k, _)| k.as_str())
            .collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(scalar_text).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&scalar_text(item)]);
        }
    }
}
