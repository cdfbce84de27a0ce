//! Typed errors for the identity and ledger core.
//!
//! Recoverable conditions (not-found, duplicates, invalid discounts) carry
//! their kind to the call boundary instead of collapsing into a generic
//! failure; only genuinely transient storage trouble becomes
//! [`LedgerError::StorageUnavailable`].

use sea_orm::{DbErr, TransactionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Store owner not found")]
    StoreOwnerNotFound,

    #[error("Discount not found")]
    DiscountNotFound,

    #[error("Discount has already been used")]
    DiscountAlreadyUsed,

    #[error("Discount has expired")]
    DiscountExpired,

    #[error("Discount belongs to a different customer")]
    DiscountWrongCustomer,

    #[error("Barcode is already registered")]
    DuplicateBarcode,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage unavailable")]
    StorageUnavailable,

    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Transient failures are the only kind callers may retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable)
    }
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::StorageUnavailable,
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<TransactionError<Self>> for LedgerError {
    fn from(err: TransactionError<Self>) -> Self {
        match err {
            TransactionError::Connection(db_err) => db_err.into(),
            TransactionError::Transaction(inner) => inner,
        }
    }
}

impl From<anyhow::Error> for LedgerError {
    fn from(err: anyhow::Error) -> Self {
        // Repository errors wrap DbErr with context; scan the chain so
        // transient connection trouble still classifies as such.
        for cause in err.chain() {
            if let Some(db_err) = cause.downcast_ref::<DbErr>() {
                return match db_err {
                    DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::StorageUnavailable,
                    other => Self::Database(other.to_string()),
                };
            }
        }

        Self::Database(err.to_string())
    }
}

/// Whether a raw database error is a unique-constraint violation. Used to
/// turn barcode and email collisions into their typed duplicates.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
}
