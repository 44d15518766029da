//! # Domain Types
//!
//! Value types exchanged between the host and the kernel.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌─────────────────────┐  │
//! │  │    CartLine     │   │ LedgerTransaction│   │  InventoryState     │  │
//! │  │  ─────────────  │   │  ──────────────  │   │  ─────────────────  │  │
//! │  │  product_id     │   │  kind            │   │  product_id         │  │
//! │  │  quantity       │   │  amount (>= 0)   │   │  branch_id          │  │
//! │  │  unit_price     │   └──────────────────┘   │  quantity (>= 0)    │  │
//! │  │  discount?      │                          │  min_quantity       │  │
//! │  └─────────────────┘   ┌──────────────────┐   │  reserved?          │  │
//! │                        │ InventoryOperation│  └─────────────────────┘  │
//! │  ┌─────────────────┐   │  ──────────────  │                            │
//! │  │  InvoiceResult  │   │  operation_type  │   ┌─────────────────────┐  │
//! │  │  (derived)      │   │  quantity        │   │   DamageRecord      │  │
//! │  └─────────────────┘   └──────────────────┘   └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Values, Not Rows
//! Nothing here has identity inside the kernel. Each value is built by a
//! function call, handed back to the host, and dropped once the host has
//! persisted the fields it needs.
//!
//! ## Closed Enumerations
//! Every kind set is a Rust enum matched exhaustively. Tags coming from
//! storage are parsed with `FromStr`; an unknown tag is an error, never a
//! default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::quantity::Quantity;

/// Normalizes a storage tag (`credit-sale`, `Credit_Sale`) to its wire form
/// (`CREDIT_SALE`).
fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_uppercase().replace(['-', ' '], "_")
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1400 bps = 14% VAT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Invoice Types
// =============================================================================

/// One line of an invoice draft.
///
/// Ephemeral: created per draft, never persisted by the kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: Quantity,
    pub unit_price: Money,
    /// Discount taken off this line only.
    #[serde(default)]
    pub discount_amount: Option<Money>,
}

impl CartLine {
    /// Creates a line without a line-level discount.
    pub fn new(product_id: impl Into<String>, quantity: Quantity, unit_price: Money) -> Self {
        CartLine {
            product_id: product_id.into(),
            quantity,
            unit_price,
            discount_amount: None,
        }
    }

    /// Sets the line-level discount.
    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount_amount = Some(discount);
        self
    }
}

/// Everything needed to price a whole invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub lines: Vec<CartLine>,
    /// Discount on the invoice as a whole, on top of line discounts.
    #[serde(default)]
    pub invoice_discount: Money,
    #[serde(default)]
    pub tax_rate: TaxRate,
    #[serde(default)]
    pub paid_amount: Money,
}

/// Derived invoice figures.
///
/// ## Invariants
/// - `total_amount = subtotal - discount_amount + tax_amount`
/// - `remaining_amount = total_amount - paid_amount`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResult {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub remaining_amount: Money,
}

/// Settlement state of an invoice, derived from total and paid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
    /// Paid more than the total; the host decides whether a refund is due.
    Overpaid,
}

// =============================================================================
// Ledger Types
// =============================================================================

/// Kind of an account ledger entry.
///
/// The amount of a transaction is always non-negative; its direction is
/// decided entirely by the kind and by whose ledger it is folded into.
///
/// ```text
///                    Customer ledger     Supplier ledger
/// CREDIT_SALE             +                   ·
/// CREDIT_PURCHASE         ·                   +
/// OPENING_BALANCE         +                   +
/// PAYMENT                 -                   -
/// REFUND                  -                   ·
/// RETURN                  ·                   -
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerTransactionKind {
    CreditSale,
    Payment,
    Refund,
    CreditPurchase,
    Return,
    OpeningBalance,
}

impl LedgerTransactionKind {
    /// Every kind, in declaration order.
    pub const ALL: [LedgerTransactionKind; 6] = [
        LedgerTransactionKind::CreditSale,
        LedgerTransactionKind::Payment,
        LedgerTransactionKind::Refund,
        LedgerTransactionKind::CreditPurchase,
        LedgerTransactionKind::Return,
        LedgerTransactionKind::OpeningBalance,
    ];

    /// Wire tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerTransactionKind::CreditSale => "CREDIT_SALE",
            LedgerTransactionKind::Payment => "PAYMENT",
            LedgerTransactionKind::Refund => "REFUND",
            LedgerTransactionKind::CreditPurchase => "CREDIT_PURCHASE",
            LedgerTransactionKind::Return => "RETURN",
            LedgerTransactionKind::OpeningBalance => "OPENING_BALANCE",
        }
    }

    /// Sign of this kind in the given party's ledger: `1`, `-1`, or `0` when
    /// the kind does not belong to that ledger.
    pub const fn sign_for(&self, party: AccountParty) -> i64 {
        use LedgerTransactionKind::*;
        match (party, self) {
            (_, OpeningBalance) => 1,
            (_, Payment) => -1,
            (AccountParty::Customer, CreditSale) => 1,
            (AccountParty::Customer, Refund) => -1,
            (AccountParty::Customer, CreditPurchase | Return) => 0,
            (AccountParty::Supplier, CreditPurchase) => 1,
            (AccountParty::Supplier, Return) => -1,
            (AccountParty::Supplier, CreditSale | Refund) => 0,
        }
    }
}

impl fmt::Display for LedgerTransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerTransactionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = normalize_tag(s);
        LedgerTransactionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| CoreError::UnknownTransactionKind(s.to_string()))
    }
}

/// Which side of the business an account ledger belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountParty {
    Customer,
    Supplier,
}

/// A single ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTransaction {
    pub kind: LedgerTransactionKind,
    pub amount: Money,
}

impl LedgerTransaction {
    pub const fn new(kind: LedgerTransactionKind, amount: Money) -> Self {
        LedgerTransaction { kind, amount }
    }
}

/// One line of an account statement: the entry and the balance after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StatementLine {
    pub kind: LedgerTransactionKind,
    pub amount: Money,
    pub balance: Money,
}

/// Account classification, recomputed from balance and limit on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Nothing owed (balance <= 0).
    Clear,
    /// Owes something, within the limit.
    Active,
    /// Balance above the credit limit.
    OverLimit,
}

// =============================================================================
// Inventory Types
// =============================================================================

/// Stock of one product at one location.
///
/// ## Invariants
/// - `quantity >= 0` in every state the kernel returns
/// - `available = max(0, quantity - reserved)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryState {
    pub product_id: String,
    pub branch_id: String,
    pub quantity: Quantity,
    pub min_quantity: Quantity,
    #[serde(default)]
    pub reserved_quantity: Option<Quantity>,
}

impl InventoryState {
    pub fn new(
        product_id: impl Into<String>,
        branch_id: impl Into<String>,
        quantity: Quantity,
        min_quantity: Quantity,
    ) -> Self {
        InventoryState {
            product_id: product_id.into(),
            branch_id: branch_id.into(),
            quantity,
            min_quantity,
            reserved_quantity: None,
        }
    }

    /// Sets the quantity held for pending orders.
    pub fn with_reserved(mut self, reserved: Quantity) -> Self {
        self.reserved_quantity = Some(reserved);
        self
    }

    /// Copy of this state with a different on-hand quantity.
    pub(crate) fn with_quantity(&self, quantity: Quantity) -> Self {
        InventoryState {
            quantity,
            ..self.clone()
        }
    }
}

/// Kind of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryOperationType {
    Sale,
    Purchase,
    TransferOut,
    TransferIn,
    Return,
    Damage,
}

impl InventoryOperationType {
    pub const ALL: [InventoryOperationType; 6] = [
        InventoryOperationType::Sale,
        InventoryOperationType::Purchase,
        InventoryOperationType::TransferOut,
        InventoryOperationType::TransferIn,
        InventoryOperationType::Return,
        InventoryOperationType::Damage,
    ];

    /// Wire tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InventoryOperationType::Sale => "SALE",
            InventoryOperationType::Purchase => "PURCHASE",
            InventoryOperationType::TransferOut => "TRANSFER_OUT",
            InventoryOperationType::TransferIn => "TRANSFER_IN",
            InventoryOperationType::Return => "RETURN",
            InventoryOperationType::Damage => "DAMAGE",
        }
    }

    /// True for kinds that take stock away.
    pub const fn is_decrease(&self) -> bool {
        matches!(
            self,
            InventoryOperationType::Sale
                | InventoryOperationType::TransferOut
                | InventoryOperationType::Damage
        )
    }
}

impl fmt::Display for InventoryOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryOperationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = normalize_tag(s);
        InventoryOperationType::ALL
            .into_iter()
            .find(|op| op.as_str() == tag)
            .ok_or_else(|| CoreError::UnknownOperation(s.to_string()))
    }
}

/// A stock movement command. Applying it yields a new [`InventoryState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOperation {
    pub product_id: String,
    pub branch_id: String,
    pub quantity: Quantity,
    pub operation_type: InventoryOperationType,
}

impl InventoryOperation {
    pub fn new(
        product_id: impl Into<String>,
        branch_id: impl Into<String>,
        quantity: Quantity,
        operation_type: InventoryOperationType,
    ) -> Self {
        InventoryOperation {
            product_id: product_id.into(),
            branch_id: branch_id.into(),
            quantity,
            operation_type,
        }
    }

    /// Builds an operation from a raw storage tag.
    ///
    /// # Errors
    /// `UnknownOperation` if the tag is outside the closed set.
    pub fn from_tag(
        product_id: impl Into<String>,
        branch_id: impl Into<String>,
        quantity: Quantity,
        tag: &str,
    ) -> Result<Self, CoreError> {
        let operation_type = tag.parse()?;
        Ok(Self::new(product_id, branch_id, quantity, operation_type))
    }

    /// Same operation aimed at the given state's product and branch.
    pub fn for_state(
        state: &InventoryState,
        quantity: Quantity,
        operation_type: InventoryOperationType,
    ) -> Self {
        Self::new(
            state.product_id.clone(),
            state.branch_id.clone(),
            quantity,
            operation_type,
        )
    }
}

/// Result of a non-throwing precheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OperationCheck {
    pub valid: bool,
    pub error: Option<String>,
}

impl OperationCheck {
    pub fn ok() -> Self {
        OperationCheck {
            valid: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        OperationCheck {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Both sides of a completed transfer. The host persists them together or
/// not at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub source: InventoryState,
    pub destination: InventoryState,
}

// =============================================================================
// Return Types
// =============================================================================

/// Outcome of a return-quantity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReturnCheck {
    pub valid: bool,
    pub error: Option<String>,
    /// Set when the requested quantity is too large: the most that may still
    /// be returned.
    pub allowed_quantity: Option<Quantity>,
}

// =============================================================================
// Damage Types
// =============================================================================

/// Cause of a damage write-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DamageType {
    PhysicalDamage,
    WaterDamage,
    Expired,
    ManufacturingDefect,
    StorageDamage,
    TransitDamage,
    Other,
}

impl DamageType {
    pub const ALL: [DamageType; 7] = [
        DamageType::PhysicalDamage,
        DamageType::WaterDamage,
        DamageType::Expired,
        DamageType::ManufacturingDefect,
        DamageType::StorageDamage,
        DamageType::TransitDamage,
        DamageType::Other,
    ];

    /// Wire tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DamageType::PhysicalDamage => "PHYSICAL_DAMAGE",
            DamageType::WaterDamage => "WATER_DAMAGE",
            DamageType::Expired => "EXPIRED",
            DamageType::ManufacturingDefect => "MANUFACTURING_DEFECT",
            DamageType::StorageDamage => "STORAGE_DAMAGE",
            DamageType::TransitDamage => "TRANSIT_DAMAGE",
            DamageType::Other => "OTHER",
        }
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = normalize_tag(s);
        DamageType::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| CoreError::InvalidDamageType(s.to_string()))
    }
}

/// A priced damage event.
///
/// `total_cost = quantity × unit_cost`, rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DamageRecord {
    pub product_id: String,
    pub quantity: Quantity,
    pub unit_cost: Money,
    pub damage_type: DamageType,
    pub total_cost: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
