//! Unified error types for the domain layer
//!
//! Provides a common error type used across all domain operations so the
//! engine can match on failures without resorting to String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid roster composition)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Player name is not part of the session roster
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    /// A player's game view was accessed before initialization.
    /// This is a programming-contract violation and is never recovered.
    #[error("Game view not initialized for {0}")]
    ViewUninitialized(String),

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for role and team names)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for roster or report violations.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create a parse error for string-to-type conversion failures
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
