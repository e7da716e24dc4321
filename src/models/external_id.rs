//! External artifact identifiers.
//!
//! Callers never see the raw integer id: it is rendered as a
//! fixed-width zero-padded decimal string to obscure sequential
//! growth. Lookups strip the padding and reject anything that is not
//! purely numeric before the store is touched.

use crate::error::{AppError, Result};

/// Width of the zero-padded external form.
pub const WIDTH: usize = 16;

/// Render an internal id in its external zero-padded form.
pub fn render(id: i64) -> String {
    format!("{id:0width$}", width = WIDTH)
}

/// Resolve an external identifier back to the internal integer id.
///
/// Leading zeros are stripped; any non-numeric remainder (or a value
/// too large for an id) is rejected as an invalid id format.
pub fn parse(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidId(format!(
            "'{trimmed}' is not a numeric artifact id"
        )));
    }

    let stripped = trimmed.trim_start_matches('0');
    if stripped.is_empty() {
        // All zeros: numerically valid, resolves to id 0 (never issued).
        return Ok(0);
    }

    stripped
        .parse::<i64>()
        .map_err(|_| AppError::InvalidId(format!("'{trimmed}' is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_zero_padded() {
        assert_eq!(render(42), "0000000000000042");
        assert_eq!(render(42).len(), WIDTH);
    }

    #[test]
    fn round_trips() {
        for id in [1, 42, 999_999, i64::MAX] {
            assert_eq!(parse(&render(id)).unwrap(), id);
        }
    }

    #[test]
    fn accepts_unpadded_numeric_input() {
        assert_eq!(parse("42").unwrap(), 42);
        assert_eq!(parse(" 42 ").unwrap(), 42);
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert!(matches!(parse("abc"), Err(AppError::InvalidId(_))));
        assert!(matches!(parse("00000000000000a1"), Err(AppError::InvalidId(_))));
        assert!(matches!(parse("-5"), Err(AppError::InvalidId(_))));
        assert!(matches!(parse(""), Err(AppError::InvalidId(_))));
    }

    #[test]
    fn rejects_out_of_range_input() {
        assert!(matches!(
            parse("99999999999999999999"),
            Err(AppError::InvalidId(_))
        ));
    }

    #[test]
    fn all_zeros_resolves_to_id_zero() {
        assert_eq!(parse("0000000000000000").unwrap(), 0);
    }
}
