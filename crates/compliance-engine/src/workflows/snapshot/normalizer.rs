/// Trimmed, lowercased text; blank or absent cells become the empty string.
pub(crate) fn clean_text(value: Option<&str>) -> String {
    value.map(|raw| raw.trim().to_lowercase()).unwrap_or_default()
}

/// Join key for a registration identifier.
pub(crate) fn normalize_key(value: Option<&str>) -> String {
    value.map(|raw| raw.trim().to_string()).unwrap_or_default()
}

/// Outcome of coercing a cell to a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NumericCell {
    Value(f64),
    Blank,
    Unparseable,
}

impl NumericCell {
    pub(crate) fn value(self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(value),
            Self::Blank | Self::Unparseable => None,
        }
    }
}

pub(crate) fn parse_number(value: Option<&str>) -> NumericCell {
    let trimmed = match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => return NumericCell::Blank,
    };

    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_nan() => NumericCell::Blank,
        Ok(parsed) => NumericCell::Value(parsed),
        Err(_) => NumericCell::Unparseable,
    }
}

/// Free-text smart-meter answers count as yes when they mention `yes`, `true` or `1`.
pub(crate) fn smart_meter_flag(value: Option<&str>) -> bool {
    let lowered = match value {
        Some(raw) => raw.to_lowercase(),
        None => return false,
    };
    ["yes", "true", "1"]
        .iter()
        .any(|token| lowered.contains(token))
}
