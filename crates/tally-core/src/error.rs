//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  CoreError                                                              │
//! │  ├── Negative*            - an input that must be >= 0 is negative      │
//! │  ├── DiscountExceeds...   - invoice discount larger than subtotal       │
//! │  ├── InvalidLimit         - credit limit below zero                     │
//! │  ├── StateMismatch        - operation aimed at another product/branch   │
//! │  ├── Insufficient*        - a decrease would drive stock below zero     │
//! │  ├── Unknown* / Invalid*  - tag outside a closed enumeration            │
//! │  ├── Overflow             - result does not fit the fixed-point range   │
//! │  ├── Validation           - wraps ValidationError                       │
//! │  └── InvalidConfig        - kernel configuration rejected               │
//! │                                                                         │
//! │  Host flow: CoreError ──► transaction boundary ──► user-facing message  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product, branch, amounts)
//! 3. Errors are enum variants, never String
//! 4. Errors are raised before any output is produced

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Core Error
// =============================================================================

/// Calculation kernel errors.
///
/// Every fallible operation returns one of these instead of clamping or
/// panicking. Hosts branch on [`CoreError::kind`] and show the `Display`
/// text (or their own translation) to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A monetary amount that must be non-negative is negative.
    ///
    /// Ledger amounts are always stored positive; the direction comes from
    /// the transaction kind.
    #[error("{field} cannot be negative (got {value})")]
    NegativeAmount { field: &'static str, value: Money },

    /// A quantity that must be non-negative is negative.
    #[error("{field} cannot be negative (got {value})")]
    NegativeQuantity {
        field: &'static str,
        value: Quantity,
    },

    /// A unit cost is negative.
    #[error("Unit cost cannot be negative (got {0})")]
    NegativeCost(Money),

    /// An arithmetic operand of the invoice calculator is negative.
    #[error("{field} cannot be negative (got {value})")]
    NegativeOperand { field: &'static str, value: String },

    /// Discount is larger than the amount it is taken from.
    ///
    /// ## User Workflow
    /// ```text
    /// Subtotal: $50.00
    ///      │
    ///      ▼
    /// Cashier enters discount $60.00
    ///      │
    ///      ▼
    /// DiscountExceedsSubtotal { discount: $60.00, subtotal: $50.00 }
    ///      │
    ///      ▼
    /// UI shows: "Discount $60.00 exceeds subtotal $50.00"
    /// ```
    #[error("Discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: Money, subtotal: Money },

    /// Credit limit below zero.
    #[error("Credit limit cannot be negative (got {0})")]
    InvalidLimit(Money),

    /// Operation targets a different product/branch than the state.
    #[error(
        "Operation for product {operation_product} at branch {operation_branch} \
         cannot be applied to product {state_product} at branch {state_branch}"
    )]
    StateMismatch {
        state_product: String,
        state_branch: String,
        operation_product: String,
        operation_branch: String,
    },

    /// A decreasing operation would drive stock below zero.
    ///
    /// The operation is rejected wholesale; stock is never clamped.
    #[error(
        "Insufficient inventory for product {product_id} at branch {branch_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientInventory {
        product_id: String,
        branch_id: String,
        available: Quantity,
        requested: Quantity,
    },

    /// The source location of a transfer does not hold enough stock.
    #[error("Insufficient quantity at source: available {available}, requested {requested}")]
    InsufficientSource {
        available: Quantity,
        requested: Quantity,
    },

    /// Inventory operation tag outside the closed set.
    #[error("Unknown inventory operation: '{0}'")]
    UnknownOperation(String),

    /// Ledger transaction tag outside the closed set.
    #[error("Unknown transaction kind: '{0}'")]
    UnknownTransactionKind(String),

    /// Transfer between states describing different products.
    #[error("Cannot transfer between products {source_product} and {destination_product}")]
    ProductMismatch {
        source_product: String,
        destination_product: String,
    },

    /// Source and destination are the same stock row.
    #[error("Cannot transfer product {product_id} from branch {branch_id} to itself")]
    SameBranch {
        product_id: String,
        branch_id: String,
    },

    /// Transfer quantity must be strictly positive.
    #[error("Transfer quantity must be greater than zero (got {0})")]
    InvalidQuantity(Quantity),

    /// Damage type outside the closed enumeration.
    #[error("Invalid damage type: '{0}'")]
    InvalidDamageType(String),

    /// Sequence numbers start at zero.
    #[error("Sequence number cannot be negative (got {0})")]
    NegativeSequence(i64),

    /// A computed amount or quantity left the `i64` fixed-point range.
    ///
    /// Reported instead of wrapping around or panicking; the field names
    /// the computation that overflowed.
    #[error("{0} is out of range")]
    Overflow(&'static str),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Kernel configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Fieldless tag for every [`CoreError`] variant.
///
/// Lets the host branch on the cause (or send it over IPC) without matching
/// on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NegativeAmount,
    NegativeQuantity,
    NegativeCost,
    NegativeOperand,
    DiscountExceedsSubtotal,
    InvalidLimit,
    StateMismatch,
    InsufficientInventory,
    InsufficientSource,
    UnknownOperation,
    UnknownTransactionKind,
    ProductMismatch,
    SameBranch,
    InvalidQuantity,
    InvalidDamageType,
    NegativeSequence,
    Overflow,
    Validation,
    InvalidConfig,
}

impl CoreError {
    /// Returns the error kind tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NegativeAmount { .. } => ErrorKind::NegativeAmount,
            CoreError::NegativeQuantity { .. } => ErrorKind::NegativeQuantity,
            CoreError::NegativeCost(_) => ErrorKind::NegativeCost,
            CoreError::NegativeOperand { .. } => ErrorKind::NegativeOperand,
            CoreError::DiscountExceedsSubtotal { .. } => ErrorKind::DiscountExceedsSubtotal,
            CoreError::InvalidLimit(_) => ErrorKind::InvalidLimit,
            CoreError::StateMismatch { .. } => ErrorKind::StateMismatch,
            CoreError::InsufficientInventory { .. } => ErrorKind::InsufficientInventory,
            CoreError::InsufficientSource { .. } => ErrorKind::InsufficientSource,
            CoreError::UnknownOperation(_) => ErrorKind::UnknownOperation,
            CoreError::UnknownTransactionKind(_) => ErrorKind::UnknownTransactionKind,
            CoreError::ProductMismatch { .. } => ErrorKind::ProductMismatch,
            CoreError::SameBranch { .. } => ErrorKind::SameBranch,
            CoreError::InvalidQuantity(_) => ErrorKind::InvalidQuantity,
            CoreError::InvalidDamageType(_) => ErrorKind::InvalidDamageType,
            CoreError::NegativeSequence(_) => ErrorKind::NegativeSequence,
            CoreError::Overflow(_) => ErrorKind::Overflow,
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    pub(crate) fn negative_money_operand(field: &'static str, value: Money) -> Self {
        CoreError::NegativeOperand {
            field,
            value: value.to_string(),
        }
    }

    pub(crate) fn negative_quantity_operand(field: &'static str, value: Quantity) -> Self {
        CoreError::NegativeOperand {
            field,
            value: value.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid decimal, invalid code prefix).
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
