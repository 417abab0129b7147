use serde_json::Value;

/// Print just the key answer value from the output.
///
/// For a pricing envelope that is the price; for a convergence sweep it is
/// the price at the finest step count.
pub fn print_minimal(value: &Value) {
    if let Some(map) = value.as_object() {
        if let Some(result) = map.get("result").and_then(Value::as_object) {
            if let Some(price) = result.get("price") {
                println!("{}", format_minimal(price));
                return;
            }
            if let Some((key, val)) = result.iter().next() {
                println!("{}: {}", key, format_minimal(val));
                return;
            }
        }

        if let Some(rows) = map.get("results").and_then(Value::as_array) {
            if let Some(price) = rows
                .last()
                .and_then(Value::as_object)
                .and_then(|row| row.get("price"))
            {
                println!("{}", format_minimal(price));
                return;
            }
        }
    }

    println!("{}", format_minimal(value));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
