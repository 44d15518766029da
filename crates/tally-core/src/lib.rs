//! # tally-core: Ledger & Inventory Invariant Engine
//!
//! The calculation kernel of a retail back office. Every function here is
//! pure: it takes snapshots, returns new values, and never touches storage,
//! the network, the clock or the process environment.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Retail Back Office                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host (UI, commands, reports)                 │   │
//! │  │    reads snapshots ──► calls kernel ──► compare-and-write      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ plain function calls                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  invoice  │  │  balance  │  │ inventory │  │  transfer │  │   │
//! │  │   │  totals   │  │  credit   │  │   apply   │  │ conserve  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  returns  │  │  damage   │  │   codes   │  │ validation│  │   │
//! │  │   │   caps    │  │ write-off │  │ INV-...   │  │  fields   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL STATE • SAME INPUT = SAME OUTPUT          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Storage (owned by the host)                  │   │
//! │  │      persists results, makes both transfer legs atomic          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] / [`quantity`] - exact fixed-point amounts (cents, hundredths)
//! - [`types`] - value types and closed enumerations
//! - [`invoice`] - line totals, discounts, tax, remaining balance
//! - [`balance`] - customer/supplier balances and credit policy
//! - [`inventory`] - stock state machine
//! - [`transfer`] - paired decrement/increment between branches
//! - [`returns`] - caps on returnable quantity
//! - [`damage`] - write-off costs
//! - [`codes`] - business identifiers (`INV-20240115-0001`)
//! - [`validation`] - field validators
//! - [`config`] - deployment settings
//! - [`error`] - typed errors
//!
//! ## Design Principles
//!
//! 1. **Integer Money**: cents and hundredths in `i64`, never floats
//! 2. **Round Once**: half away from zero, at the output of each computation
//! 3. **Reject, Never Clamp**: an operation that would break an invariant
//!    returns an error and produces nothing
//! 4. **Closed Kinds**: unknown operation, transaction or damage tags fail
//!    at parse time
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{invoice_total, line_total, CartLine, Money, Quantity};
//!
//! let line = CartLine::new("p1", Quantity::from_units(3), Money::from_cents(1_750));
//! let subtotal = line_total(&line).unwrap();
//! assert_eq!(subtotal, Money::from_cents(5_250));
//!
//! let total = invoice_total(subtotal, Money::from_cents(250), Money::from_cents(700)).unwrap();
//! assert_eq!(total.to_string(), "$57.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod codes;
pub mod config;
pub mod damage;
pub mod error;
pub mod inventory;
pub mod invoice;
pub mod money;
pub mod quantity;
pub mod returns;
pub mod transfer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::apply` instead of
// `use tally_core::inventory::apply`

pub use balance::{
    account_balance, account_status, available_credit, can_purchase, customer_balance,
    exceeds_credit_limit, statement, supplier_balance,
};
pub use codes::{
    all_unique, extract_sequence, format_code, generate_code, next_sequence, parse_code,
    CodeGenerator, CodeKind, ParsedCode,
};
pub use config::{CodeConfig, KernelConfig, PhoneConfig};
pub use damage::{build_damage_record, damage_cost, damage_cost_by_type, total_damage_cost};
pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use inventory::{
    apply, available_quantity, is_in_stock, is_low_stock, reorder_shortfall, stock_value,
    validate,
};
pub use invoice::{
    calculate_invoice, change_due, invoice_total, line_net, line_total, payment_status,
    percentage_discount, remaining, subtotal, tax_amount,
};
pub use money::Money;
pub use quantity::Quantity;
pub use returns::{can_return, max_return_quantity, refund_amount, validate_return};
pub use transfer::{can_transfer, transfer};
pub use types::*;
pub use validation::{
    is_non_negative_number, is_positive_number, is_valid_date_range, is_valid_email,
    is_valid_length, is_valid_number, is_valid_phone, validate_required_fields,
    PhoneValidator, RequiredFieldsCheck, ValidationResult,
};
