//! Error types for the math core

use thiserror::Error;

/// Errors raised by conversions that validate their input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// The top-left 3x3 block is not a proper rotation (orthonormal, det = +1)
    #[error(
        "malformed rotation matrix: determinant {determinant}, orthogonality error {orthogonality_error}"
    )]
    MalformedRotationMatrix {
        determinant: f32,
        orthogonality_error: f32,
    },

    /// A matrix or vector contained NaN or infinite components
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

pub type Result<T> = std::result::Result<T, MathError>;
