//! # Transfer Conservation
//!
//! Moves stock of one product between two locations as a single operation.
//!
//! ## Conservation Invariant
//! ```text
//!   source.quantity - source'.quantity
//!     == destination'.quantity - destination.quantity
//!     == quantity
//! ```
//!
//! Both legs are computed before anything is returned, so a caller gets
//! either both new states or an error. Writing them is the host's job: both
//! rows in one storage transaction, each guarded by its snapshot version.

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::inventory::apply;
use crate::quantity::Quantity;
use crate::types::{InventoryOperation, InventoryOperationType, InventoryState, TransferOutcome};

/// True when the source holds at least `transfer_qty`.
///
/// # Errors
/// `NegativeQuantity` if either input is negative.
pub fn can_transfer(source_qty: Quantity, transfer_qty: Quantity) -> CoreResult<bool> {
    if source_qty.is_negative() {
        return Err(CoreError::NegativeQuantity {
            field: "source quantity",
            value: source_qty,
        });
    }
    if transfer_qty.is_negative() {
        return Err(CoreError::NegativeQuantity {
            field: "transfer quantity",
            value: transfer_qty,
        });
    }
    Ok(source_qty >= transfer_qty)
}

/// Transfers `quantity` from `source` to `destination`.
///
/// ```rust
/// use tally_core::{transfer, InventoryState, Quantity};
///
/// let source = InventoryState::new("p1", "warehouse", Quantity::from_units(100), Quantity::ZERO);
/// let destination = InventoryState::new("p1", "shop", Quantity::from_units(50), Quantity::ZERO);
///
/// let outcome = transfer(&source, &destination, Quantity::from_units(30)).unwrap();
/// assert_eq!(outcome.source.quantity, Quantity::from_units(70));
/// assert_eq!(outcome.destination.quantity, Quantity::from_units(80));
/// ```
///
/// # Errors
/// - `InvalidQuantity` if `quantity <= 0`
/// - `ProductMismatch` if the states describe different products
/// - `SameBranch` if source and destination are the same branch
/// - `InsufficientSource` if the source holds less than `quantity`
/// - `Overflow` if the destination would leave the `i64` range
pub fn transfer(
    source: &InventoryState,
    destination: &InventoryState,
    quantity: Quantity,
) -> CoreResult<TransferOutcome> {
    if !quantity.is_positive() {
        return Err(CoreError::InvalidQuantity(quantity));
    }

    if source.product_id != destination.product_id {
        debug!(
            source_product = %source.product_id,
            destination_product = %destination.product_id,
            "Rejected transfer between different products"
        );
        return Err(CoreError::ProductMismatch {
            source_product: source.product_id.clone(),
            destination_product: destination.product_id.clone(),
        });
    }

    if source.branch_id == destination.branch_id {
        debug!(
            product_id = %source.product_id,
            branch_id = %source.branch_id,
            "Rejected transfer to the same branch"
        );
        return Err(CoreError::SameBranch {
            product_id: source.product_id.clone(),
            branch_id: source.branch_id.clone(),
        });
    }

    if !can_transfer(source.quantity, quantity)? {
        debug!(
            product_id = %source.product_id,
            from_branch = %source.branch_id,
            to_branch = %destination.branch_id,
            available = %source.quantity,
            requested = %quantity,
            "Rejected transfer from short source"
        );
        return Err(CoreError::InsufficientSource {
            available: source.quantity,
            requested: quantity,
        });
    }

    let out = InventoryOperation::for_state(source, quantity, InventoryOperationType::TransferOut);
    let inbound =
        InventoryOperation::for_state(destination, quantity, InventoryOperationType::TransferIn);

    let new_source = apply(source, &out)?;
    let new_destination = apply(destination, &inbound)?;

    debug_assert_eq!(
        source.quantity - new_source.quantity,
        new_destination.quantity - destination.quantity
    );

    Ok(TransferOutcome {
        source: new_source,
        destination: new_destination,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
