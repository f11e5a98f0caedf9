//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// The id a new record is stored under: the caller's, trimmed, or a fresh
/// UUID when it is absent or blank. Ids are opaque otherwise.
pub(crate) fn record_id(requested: Option<&str>) -> String {
    optional_text(requested).unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
        .map_err(|_| EngineError::InvalidCurrency(format!("invalid currency: {value}")))
}

/// Trim a required text field, rejecting blanks.
pub(crate) fn required_text(value: &str, field: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blanks become `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Amounts are never negative; direction carries the sign.
pub(crate) fn ensure_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "amount_minor must be >= 0".to_string(),
        ));
    }
    Ok(())
}
