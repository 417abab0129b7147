use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// A pricing envelope flattens into a single record with one named column
/// per result field; a convergence sweep becomes one record per step count.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(result) = value.get("result").and_then(Value::as_object) {
        write_single_record(&mut wtr, result);
    } else if let Some(rows) = value.get("results").and_then(Value::as_array) {
        write_records(&mut wtr, rows);
    } else if let Some(map) = value.as_object() {
        write_single_record(&mut wtr, map);
    } else {
        let _ = wtr.write_record([scalar(value)]);
    }

    let _ = wtr.flush();
}

fn write_single_record(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    map: &serde_json::Map<String, Value>,
) {
    let headers: Vec<&str> = map.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    let record: Vec<String> = map.values().map(scalar).collect();
    let _ = wtr.write_record(&record);
}

fn write_records(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(first) = rows.first().and_then(Value::as_object) else {
        for row in rows {
            let _ = wtr.write_record([scalar(row)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for row in rows {
        if let Some(map) = row.as_object() {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(scalar).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&record);
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
