//! # Return Constraint Validator
//!
//! A line can be returned in several partial returns, but never more in
//! total than was originally sold (or bought).
//!
//! ```text
//! original 10, already returned 3
//!      │
//!      ▼
//! remaining = 10 - 3 = 7
//!      │
//!      ├── return 5 → valid
//!      └── return 8 → invalid, allowed_quantity = 7
//! ```
//!
//! Callers with no earlier returns pass `Quantity::ZERO` as
//! `previous_returns`.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::ReturnCheck;

impl ReturnCheck {
    fn valid() -> Self {
        ReturnCheck {
            valid: true,
            error: None,
            allowed_quantity: None,
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        ReturnCheck {
            valid: false,
            error: Some(error.into()),
            allowed_quantity: None,
        }
    }
}

/// Checks a requested return quantity against what is still returnable.
///
/// Never fails; the outcome carries the reason when the request is invalid.
pub fn validate_return(
    return_qty: Quantity,
    original_qty: Quantity,
    previous_returns: Quantity,
) -> ReturnCheck {
    if return_qty.is_negative() {
        return ReturnCheck::invalid("Return quantity cannot be negative");
    }
    if original_qty.is_negative() {
        return ReturnCheck::invalid("Original quantity cannot be negative");
    }
    if previous_returns.is_negative() {
        return ReturnCheck::invalid("Previous returns cannot be negative");
    }

    let remaining = original_qty - previous_returns;
    if return_qty > remaining {
        let allowed = remaining.non_negative();
        return ReturnCheck {
            valid: false,
            error: Some(format!(
                "Return quantity {} exceeds remaining returnable quantity {}",
                return_qty, allowed
            )),
            allowed_quantity: Some(allowed),
        };
    }

    ReturnCheck::valid()
}

/// Most that can still be returned: `max(0, original - previous)`.
///
/// # Errors
/// `NegativeQuantity` if either input is negative.
pub fn max_return_quantity(
    original_qty: Quantity,
    previous_returns: Quantity,
) -> CoreResult<Quantity> {
    if original_qty.is_negative() {
        return Err(CoreError::NegativeQuantity {
            field: "original quantity",
            value: original_qty,
        });
    }
    if previous_returns.is_negative() {
        return Err(CoreError::NegativeQuantity {
            field: "previous returns",
            value: previous_returns,
        });
    }
    Ok((original_qty - previous_returns).non_negative())
}

/// True while anything is left to return.
pub fn can_return(original_qty: Quantity, previous_returns: Quantity) -> CoreResult<bool> {
    Ok(max_return_quantity(original_qty, previous_returns)?.is_positive())
}

/// Value of the returned units at the original unit price.
///
/// # Errors
/// `NegativeQuantity` for a negative quantity, `NegativeAmount` for a
/// negative price, `Overflow` if the refund does not fit in cents.
pub fn refund_amount(return_qty: Quantity, unit_price: Money) -> CoreResult<Money> {
    if return_qty.is_negative() {
        return Err(CoreError::NegativeQuantity {
            field: "return quantity",
            value: return_qty,
        });
    }
    if unit_price.is_negative() {
        return Err(CoreError::NegativeAmount {
            field: "unit price",
            value: unit_price,
        });
    }
    unit_price.times(return_qty)
}
