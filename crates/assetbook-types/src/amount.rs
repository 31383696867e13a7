//! Parsing of numeric arguments.
//!
//! Every numeric argument reaches the contract as a string. The whole string
//! must parse as a decimal and the result must be finite; there is no lenient
//! prefix parsing and no silent NaN.

use crate::error::TypeError;

/// Parse a caller-supplied decimal for the named field.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64, TypeError> {
    let value: f64 = raw.parse().map_err(|_| TypeError::InvalidNumber {
        field,
        value: raw.to_string(),
    })?;
    if !value.is_finite() {
        return Err(TypeError::NonFiniteNumber {
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}
