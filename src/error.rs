//! Error types for the key-value store.

use crate::types::SubscriptionId;
use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The destination buffer was absent or shorter than the stored value.
    #[error("Buffer too small: value needs {required} bytes")]
    BufferTooSmall { required: usize },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(SubscriptionId),

    #[error("Subscription capacity exceeded ({capacity} active)")]
    CapacityExceeded { capacity: usize },

    #[error("Allocation of {bytes} bytes failed")]
    AllocationFailed { bytes: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl StoreError {
    /// Collapse this error onto the status taxonomy exposed at the boundary.
    pub fn status(&self) -> Status {
        match self {
            StoreError::BufferTooSmall { .. } => Status::BufferTooSmall,
            StoreError::KeyNotFound(_) | StoreError::SubscriptionNotFound(_) => Status::NotFound,
            StoreError::CapacityExceeded { .. }
            | StoreError::AllocationFailed { .. }
            | StoreError::InvalidArgument(_) => Status::GenericFailure,
        }
    }
}

/// Status codes returned across the C boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    Success = 0,
    BufferTooSmall = 1,
    NotFound = 2,
    GenericFailure = -1,
}

impl Status {
    /// Status of a finished operation.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_match_c_header() {
        assert_eq!(Status::Success.code(), 0);
        assert_eq!(Status::BufferTooSmall.code(), 1);
        assert_eq!(Status::NotFound.code(), 2);
        assert_eq!(Status::GenericFailure.code(), -1);
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            StoreError::BufferTooSmall { required: 3 }.status(),
            Status::BufferTooSmall
        );
        assert_eq!(StoreError::KeyNotFound("a".into()).status(), Status::NotFound);
        assert_eq!(
            StoreError::SubscriptionNotFound(SubscriptionId(7)).status(),
            Status::NotFound
        );
        assert_eq!(
            StoreError::CapacityExceeded { capacity: 100 }.status(),
            Status::GenericFailure
        );
        assert_eq!(
            StoreError::AllocationFailed { bytes: 1 }.status(),
            Status::GenericFailure
        );
    }

    #[test]
    fn test_status_of_result() {
        let ok: Result<usize> = Ok(4);
        assert_eq!(Status::of(&ok), Status::Success);

        let err: Result<()> = Err(StoreError::KeyNotFound("missing".into()));
        assert_eq!(Status::of(&err), Status::NotFound);
    }
}
