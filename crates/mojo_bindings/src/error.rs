//! Encoder error types

use mojo_system::Status;
use thiserror::Error;

/// Errors raised while encoding a message
///
/// Every variant aborts the whole message: the partially encoded buffer is
/// discarded and nothing is transmitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Null written to a non-nullable pointer field
    #[error("Trying to encode a null pointer for a non-nullable type")]
    NullPointer,

    /// Invalid handle written to a non-nullable handle field
    #[error("Trying to encode an invalid handle for a non-nullable type")]
    InvalidHandle,

    /// Fixed-size array with the wrong number of elements
    #[error("Trying to encode a fixed array of incorrect length: expected {expected}, got {actual}")]
    FixedArrayLength {
        expected: usize,
        actual: usize,
    },

    /// Null written to a non-nullable union field
    #[error("Trying to encode a null union for a non-nullable type")]
    NullUnion,

    /// Finished message exceeds the configured limit
    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge {
        size: usize,
        max: usize,
    },

    /// Live interface implementation encoded without a handle-pipe factory
    #[error("The encoder has been created without a Core; it cannot encode an interface implementation")]
    MissingCore,

    /// Associated interface encoded while strict mode is enabled
    #[error("Associated interfaces are not supported")]
    AssociatedInterface,

    /// The system layer failed (for example while creating a pipe)
    #[error("System error: {0}")]
    System(#[from] Status),
}

impl EncodeError {
    /// Whether this is a malformed-value failure
    pub fn is_serialization(&self) -> bool {
        matches!(
            self,
            EncodeError::NullPointer
                | EncodeError::InvalidHandle
                | EncodeError::FixedArrayLength { .. }
                | EncodeError::NullUnion
                | EncodeError::MessageTooLarge { .. }
        )
    }

    /// Whether this failure comes from a capability the encoder lacks
    pub fn is_unsupported(&self) -> bool {
        matches!(self, EncodeError::MissingCore | EncodeError::AssociatedInterface)
    }
}

/// Result type for encoding operations
pub type Result<T> = std::result::Result<T, EncodeError>;
