//! Error types for GOT-ID fusion infrastructure
//!
//! The fusion engine itself is total and never errors; these cover intake
//! validation and collaborator failures around it.

use thiserror::Error;

/// Errors raised by intake, collaborators and the scan pipeline
#[derive(Error, Debug)]
pub enum FusionError {
    /// Low-level input the engine cannot accept (non-hex key, bad number)
    #[error("malformed input: {field} - {message}")]
    MalformedInput {
        field: &'static str,
        message: String,
    },

    /// ANPR read without a plate
    #[error("missing plate")]
    MissingPlate,

    /// Registry already holds a vehicle with this plate
    #[error("plate already enrolled: {0}")]
    DuplicatePlate(String),

    /// Registry already binds this public key (in either `04` form)
    #[error("public key already enrolled: {0}")]
    DuplicatePublicKey(String),

    /// Storage collaborator failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl FusionError {
    pub fn malformed(field: &'static str, message: impl Into<String>) -> Self {
        FusionError::MalformedInput {
            field,
            message: message.into(),
        }
    }

    /// Whether the caller supplied bad input, as opposed to a system fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FusionError::MalformedInput { .. }
                | FusionError::MissingPlate
                | FusionError::DuplicatePlate(_)
                | FusionError::DuplicatePublicKey(_)
        )
    }
}

/// Result type for fusion infrastructure operations
pub type Result<T> = std::result::Result<T, FusionError>;
