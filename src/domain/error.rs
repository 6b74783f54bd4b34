//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and `FromStr`
//! implementations when input violates a domain rule.
//!
//! # Examples
//!
//! ```
//! use peloton::domain::error::DomainError;
//! use peloton::domain::unit::UnitRef;
//!
//! let result: Result<UnitRef, _> = "criterium:4".parse();
//! assert!(matches!(result, Err(DomainError::InvalidUnitRef { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Unit references are written `one-day:<id>` or `stage:<id>`.
    #[error("invalid unit reference '{input}': expected one-day:<id> or stage:<id>")]
    InvalidUnitRef {
        /// The rejected input.
        input: String,
    },

    /// Official result positions start at 1.
    #[error("result position must be at least 1, got {position}")]
    InvalidPosition {
        /// The rejected position.
        position: u32,
    },

    /// Stage types are FLAT, HILLY, MOUNTAIN or TT.
    #[error("unknown stage type '{value}'")]
    UnknownStageType {
        /// The rejected value.
        value: String,
    },

    /// Tour classification categories.
    #[error("unknown tour category '{value}'")]
    UnknownCategory {
        /// The rejected value.
        value: String,
    },

    /// The five picks of a bet must name distinct riders.
    #[error("rider {rider} is picked more than once")]
    DuplicatePick {
        /// The repeated rider.
        rider: i64,
    },
}
