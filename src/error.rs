use thiserror::Error;

use crate::parcel::{ParcelNumber, ParcelStatus};

/// Failures surfaced by the parcel store and service.
///
/// A guard failure (`NotFound`, `InvalidState`, `InvalidTransition`) is
/// raised before any statement mutates the record.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The backing SQLite connection failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A previous holder of the shared connection panicked mid-operation.
    #[error("storage error: connection lock poisoned")]
    ConnectionPoisoned,

    #[error("parcel {number} not found")]
    NotFound { number: ParcelNumber },

    /// The mutation is not allowed while the parcel is in `status`.
    #[error("parcel {number} is {status}; only registered parcels can be changed")]
    InvalidState {
        number: ParcelNumber,
        status: ParcelStatus,
    },

    #[error("parcel {number} cannot move from {from} to {to}")]
    InvalidTransition {
        number: ParcelNumber,
        from: ParcelStatus,
        to: ParcelStatus,
    },
}

impl TrackerError {
    /// Whether this is a failure of the backing store rather than a domain rule.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::ConnectionPoisoned)
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
