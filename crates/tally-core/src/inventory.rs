//! # Inventory State Machine
//!
//! Single-location stock transitions.
//!
//! ## Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 apply(state, operation) → new state                     │
//! │                                                                         │
//! │   SALE, TRANSFER_OUT, DAMAGE        PURCHASE, TRANSFER_IN, RETURN       │
//! │   ───────────────────────────       ─────────────────────────────       │
//! │   quantity - op.quantity            quantity + op.quantity              │
//! │   rejected if the result < 0        always accepted                     │
//! │                                                                         │
//! │   The input state is never touched. A rejected operation produces no   │
//! │   state at all (no clamping to zero).                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Host Contract
//! `apply` is the pure half of read-snapshot → compute → compare-and-write.
//! If the host's write fails because the row changed since the snapshot, the
//! host must re-read and call `apply` again rather than retry the stale
//! result.

use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{InventoryOperation, InventoryState, OperationCheck};

/// Applies a stock movement to a state snapshot and returns the next state.
///
/// ```rust
/// use tally_core::{apply, InventoryOperation, InventoryOperationType, InventoryState, Quantity};
///
/// let q = Quantity::from_units;
/// let state = InventoryState::new("p1", "main", q(100), q(10));
/// let sale = InventoryOperation::new("p1", "main", q(20), InventoryOperationType::Sale);
///
/// let next = apply(&state, &sale).unwrap();
/// assert_eq!(next.quantity, Quantity::from_units(80));
/// assert_eq!(state.quantity, Quantity::from_units(100)); // untouched
/// ```
///
/// # Errors
/// - `StateMismatch` if the operation targets another product or branch
/// - `NegativeQuantity` if the operation quantity is negative
/// - `InsufficientInventory` if a decrease would go below zero
/// - `Overflow` if an increase would leave the `i64` range
pub fn apply(state: &InventoryState, operation: &InventoryOperation) -> CoreResult<InventoryState> {
    if state.product_id != operation.product_id || state.branch_id != operation.branch_id {
        debug!(
            state_product = %state.product_id,
            state_branch = %state.branch_id,
            operation_product = %operation.product_id,
            operation_branch = %operation.branch_id,
            "Rejected inventory operation for another state"
        );
        return Err(CoreError::StateMismatch {
            state_product: state.product_id.clone(),
            state_branch: state.branch_id.clone(),
            operation_product: operation.product_id.clone(),
            operation_branch: operation.branch_id.clone(),
        });
    }

    if operation.quantity.is_negative() {
        return Err(CoreError::NegativeQuantity {
            field: "operation quantity",
            value: operation.quantity,
        });
    }

    let next = if operation.operation_type.is_decrease() {
        let next = state
            .quantity
            .checked_sub(operation.quantity)
            .filter(|next| !next.is_negative());
        let Some(next) = next else {
            debug!(
                product_id = %state.product_id,
                branch_id = %state.branch_id,
                operation = %operation.operation_type,
                available = %state.quantity,
                requested = %operation.quantity,
                "Rejected inventory decrease"
            );
            return Err(CoreError::InsufficientInventory {
                product_id: state.product_id.clone(),
                branch_id: state.branch_id.clone(),
                available: state.quantity,
                requested: operation.quantity,
            });
        };
        next
    } else {
        state
            .quantity
            .checked_add(operation.quantity)
            .ok_or(CoreError::Overflow("stock quantity"))?
    };

    trace!(
        product_id = %state.product_id,
        branch_id = %state.branch_id,
        operation = %operation.operation_type,
        from = %state.quantity,
        to = %next,
        "Inventory transition"
    );
    Ok(state.with_quantity(next))
}

/// Non-throwing precheck mirroring [`apply`].
///
/// The error text is exactly what `apply` would report, so the UI can show
/// it before the host commits anything.
pub fn validate(state: &InventoryState, operation: &InventoryOperation) -> OperationCheck {
    match apply(state, operation) {
        Ok(_) => OperationCheck::ok(),
        Err(err) => OperationCheck::rejected(err.to_string()),
    }
}

/// True when stock is strictly below the minimum level.
pub fn is_low_stock(state: &InventoryState) -> bool {
    state.quantity < state.min_quantity
}

/// Stock not held for pending orders, floored at zero.
pub fn available_quantity(state: &InventoryState) -> Quantity {
    let reserved = state.reserved_quantity.unwrap_or(Quantity::ZERO);
    state.quantity.saturating_sub(reserved).non_negative()
}

/// True when there is any stock on hand.
pub fn is_in_stock(state: &InventoryState) -> bool {
    state.quantity.is_positive()
}

/// How much must be bought to get back to the minimum level.
pub fn reorder_shortfall(state: &InventoryState) -> Quantity {
    state.min_quantity.saturating_sub(state.quantity).non_negative()
}

/// Value of the stock on hand at a unit cost.
///
/// # Errors
/// - `NegativeCost` if the unit cost is negative
/// - `Overflow` if the value does not fit in cents
pub fn stock_value(state: &InventoryState, unit_cost: Money) -> CoreResult<Money> {
    if unit_cost.is_negative() {
        return Err(CoreError::NegativeCost(unit_cost));
    }
    unit_cost.times(state.quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================
