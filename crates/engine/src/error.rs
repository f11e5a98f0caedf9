//! The module contains the errors the engine can throw.
//!
//! They fall in four groups:
//!
//! - validation errors ([`InvalidCurrency`], [`InvalidLimit`], [`InvalidAmount`],
//!   [`InvalidAttachment`], [`InvalidCode`], [`InvalidField`],
//!   [`MissingField`]), raised before anything is written;
//! - [`KeyNotFound`] when a lookup by id or code yields nothing;
//! - [`ExistingKey`] when an id or code is already taken, carrying the field name;
//! - internal errors ([`Aggregation`], [`Corrupted`], [`Database`]).
//!
//!  [`InvalidCurrency`]: EngineError::InvalidCurrency
//!  [`InvalidLimit`]: EngineError::InvalidLimit
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidAttachment`]: EngineError::InvalidAttachment
//!  [`InvalidCode`]: EngineError::InvalidCode
//!  [`InvalidField`]: EngineError::InvalidField
//!  [`MissingField`]: EngineError::MissingField
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Aggregation`]: EngineError::Aggregation
//!  [`Corrupted`]: EngineError::Corrupted
//!  [`Database`]: EngineError::Database
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),
    #[error("Invalid code: {0}")]
    InvalidCode(String),
    #[error("Invalid value: {0}")]
    InvalidField(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("\"{0}\" not found")]
    KeyNotFound(String),
    #[error("{0} already exists")]
    ExistingKey(String),
    #[error("Error computing balance: {0}")]
    Aggregation(String),
    #[error("Corrupted record: {0}")]
    Corrupted(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` for errors caused by the caller's input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidCurrency(_)
                | Self::InvalidLimit(_)
                | Self::InvalidAmount(_)
                | Self::InvalidAttachment(_)
                | Self::InvalidCode(_)
                | Self::InvalidField(_)
                | Self::MissingField(_)
        )
    }

    /// `true` for failures the caller can do nothing about.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Aggregation(_) | Self::Corrupted(_) | Self::Database(_)
        )
    }

    /// Converts a store error raised by an insert/update into a uniqueness
    /// conflict when the store reports one.
    ///
    /// The store message names the violated column (`transactions.code`);
    /// `fallback` is used when it cannot be recognised.
    pub(crate) fn from_write(err: DbErr, fallback: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                let field = if detail.contains(".code") {
                    "code"
                } else if detail.contains(".id") {
                    "id"
                } else {
                    fallback
                };
                Self::ExistingKey(field.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidLimit(a), Self::InvalidLimit(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidAttachment(a), Self::InvalidAttachment(b)) => a == b,
            (Self::InvalidCode(a), Self::InvalidCode(b)) => a == b,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Aggregation(a), Self::Aggregation(b)) => a == b,
            (Self::Corrupted(a), Self::Corrupted(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
