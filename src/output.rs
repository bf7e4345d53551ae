//! Rendering command results as JSON or plain-text tables

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::AppError;

const MAX_CELL: usize = 60;

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_table(&serde_json::to_value(value)?)),
    }
}

fn value_to_cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => items
            .iter()
            .map(value_to_cell)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    let text = text.replace('\n', " ");
    if text.chars().count() > MAX_CELL {
        let cut: String = text.chars().take(MAX_CELL - 1).collect();
        format!("{}…", cut)
    } else {
        text
    }
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(items) => render_rows(items),
        Value::Object(map) => {
            let rows: Vec<Vec<String>> = map
                .iter()
                .map(|(k, v)| vec![k.clone(), value_to_cell(v)])
                .collect();
            grid(&["key".to_string(), "value".to_string()], &rows)
        }
        scalar => value_to_cell(scalar),
    }
}

fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return "(no rows)".to_string();
    }
    if !items.iter().all(Value::is_object) {
        let rows: Vec<Vec<String>> = items.iter().map(|v| vec![value_to_cell(v)]).collect();
        return grid(&["value".to_string()], &rows);
    }

    let mut headers: Vec<String> = Vec::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    let rows: Vec<Vec<String>> = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|h| map.get(h).map(value_to_cell).unwrap_or_default())
                .collect()
        })
        .collect();
    grid(&headers, &rows)
}

fn grid(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{}{}", cell, " ".repeat(w - cell.chars().count())))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers)];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(rows.iter().map(|r| line(r)));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_objects_becomes_aligned_columns() {
        let table = render_table(&json!([
            { "id": 1, "docType": "brand_canvas" },
            { "id": 12, "docType": "cv_pdf" }
        ]));
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "id  docType");
        assert_eq!(lines[1], "--  ------------");
        assert_eq!(lines[3], "12  cv_pdf");
    }

    #[test]
    fn empty_list_and_long_cells() {
        assert_eq!(render_table(&json!([])), "(no rows)");
        let cell = value_to_cell(&json!("x".repeat(100)));
        assert_eq!(cell.chars().count(), MAX_CELL);
        assert!(cell.ends_with('…'));
    }

    #[test]
    fn json_output_is_pretty() {
        let out = render(&json!({ "a": 1 }), OutputFormat::Json).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }
}
