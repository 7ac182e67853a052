use crate::common::{DomainError, DomainResult};

/// Parse a state vector stored as bracketed, whitespace-separated decimals,
/// e.g. `"[0.0 1.5708 -0.3]"`. Brackets are optional; any non-numeric token
/// fails the whole vector.
pub fn parse_state_vector(text: &str) -> DomainResult<Vec<f64>> {
    let stripped = text.replace(['[', ']'], " ");
    let mut values = Vec::new();
    for token in stripped.split_whitespace() {
        let value = token.parse::<f64>().map_err(|_| DomainError::Parse {
            reason: format!("invalid numeric token {:?} in {:?}", token, text),
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Render a state vector in the stored form. Parsing the output yields the
/// original values back.
pub fn format_state_vector(values: &[f64]) -> String {
    let body = values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{}]", body)
}
