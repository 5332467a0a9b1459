use serde_json::Value;

/// Converts a feed amount (`null`, number or formatted string) into a
/// finite, non-negative float. Never fails; anything unusable becomes 0.0.
pub fn normalize_value(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => clamp_amount(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => parse_amount(s),
        _ => 0.0,
    }
}

/// Parses amounts such as `"R$ 1.234,56"`, `"1234.56"` or `"$ 10"`.
///
/// When a comma is present it is the decimal separator and every period is a
/// thousands separator.
pub fn parse_amount(text: &str) -> f64 {
    let stripped = text.trim().replace("R$", "").replace('$', "");
    let mut cleaned = stripped.trim().to_string();
    if cleaned.is_empty() {
        return 0.0;
    }
    if cleaned.contains(',') {
        cleaned = cleaned.replace('.', "").replace(',', ".");
    }
    cleaned.parse::<f64>().map(clamp_amount).unwrap_or(0.0)
}

/// Non-finite and negative amounts collapse to 0.0
pub fn clamp_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
