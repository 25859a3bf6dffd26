//! # Error Types
//!
//! Domain-specific error types for vinylflow-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vinylflow-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vinylflow-db errors (separate crate)                                  │
//! │  └── DbError          - Storage failures, wraps CoreError              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → UI client               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (record id, username, etc.)
//! 3. Errors are enum variants, never String
//! 4. Validation errors are raised before any mutation occurs

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. The UI layer is
/// responsible for presenting them; this core never prompts or blocks.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An inventory item referenced by id does not exist.
    ///
    /// ## When This Occurs
    /// - A sale line names a record id not present in the catalog
    /// - The record was hard-deleted between browse and checkout
    #[error("Record not found: {0}")]
    ItemNotFound(i64),

    /// Requested quantity exceeds the current stock level.
    ///
    /// ## When This Occurs
    /// - Checkout requests more units than remain
    /// - An administrative stock correction over-decrements
    #[error("Insufficient stock for record {record_id}: available {available}, requested {requested}")]
    InsufficientStock {
        record_id: i64,
        available: i64,
        requested: i64,
    },

    /// A sale was requested with no line items.
    #[error("Sale must contain at least one item")]
    EmptySale,

    /// Registration attempted with a username that already exists.
    /// Matching is case-sensitive and exact.
    #[error("Username '{username}' already exists")]
    DuplicateUsername { username: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements.
/// Used for early validation before any storage mutation runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., unparseable decimal amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
