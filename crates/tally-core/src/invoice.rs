//! # Invoice Calculator
//!
//! Cart and invoice arithmetic.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Pipeline                                  │
//! │                                                                         │
//! │  CartLine ──► line_total ──┐                                           │
//! │  CartLine ──► line_total ──┼──► subtotal                               │
//! │  CartLine ──► line_total ──┘       │                                   │
//! │                                    ▼                                   │
//! │             line discounts + invoice discount ──► discount             │
//! │                                    │                                   │
//! │                                    ▼                                   │
//! │              tax_amount(subtotal - discount, rate) ──► tax             │
//! │                                    │                                   │
//! │                                    ▼                                   │
//! │          invoice_total = subtotal - discount + tax                     │
//! │                                    │                                   │
//! │                                    ▼                                   │
//! │               remaining = total - paid   (may be negative)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! Line totals are rounded half away from zero to cents when they are
//! computed. Everything after that is exact integer arithmetic on cents, so
//! no value is rounded twice.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLine, InvoiceDraft, InvoiceResult, PaymentStatus, TaxRate};

/// Largest percentage discount, in basis points (100%).
pub const MAX_DISCOUNT_BPS: u32 = 10_000;

fn require_non_negative(field: &'static str, value: Money) -> CoreResult<()> {
    if value.is_negative() {
        return Err(CoreError::negative_money_operand(field, value));
    }
    Ok(())
}

/// Calculates `quantity × unit_price` for one line, rounded to cents.
///
/// ```rust
/// use tally_core::{line_total, CartLine, Money, Quantity};
///
/// let line = CartLine::new("p1", Quantity::from_units(5), Money::parse("10.5").unwrap());
/// assert_eq!(line_total(&line).unwrap(), Money::parse("52.5").unwrap());
/// ```
///
/// # Errors
/// - `NegativeOperand` if quantity or unit price is negative
/// - `Overflow` if the product does not fit in cents
pub fn line_total(line: &CartLine) -> CoreResult<Money> {
    if line.quantity.is_negative() {
        return Err(CoreError::negative_quantity_operand("quantity", line.quantity));
    }
    require_non_negative("unit price", line.unit_price)?;
    line.unit_price.times(line.quantity)
}

/// Line total minus the line's own discount.
///
/// # Errors
/// - `NegativeOperand` for a negative quantity, price, or discount
/// - `DiscountExceedsSubtotal` if the discount is larger than the line total
pub fn line_net(line: &CartLine) -> CoreResult<Money> {
    let total = line_total(line)?;
    let discount = line.discount_amount.unwrap_or(Money::ZERO);
    require_non_negative("line discount", discount)?;
    if discount > total {
        return Err(CoreError::DiscountExceedsSubtotal {
            discount,
            subtotal: total,
        });
    }
    Ok(total - discount)
}

/// Sums the line totals of a cart. An empty cart has a zero subtotal.
///
/// # Errors
/// Errors of [`line_total`], or `Overflow` if the sum leaves the `i64` range.
pub fn subtotal(lines: &[CartLine]) -> CoreResult<Money> {
    lines.iter().try_fold(Money::ZERO, |sum, line| {
        sum.checked_add(line_total(line)?)
            .ok_or(CoreError::Overflow("subtotal"))
    })
}

/// Calculates `subtotal - discount + tax`.
///
/// # Errors
/// - `NegativeOperand` if any input is negative
/// - `DiscountExceedsSubtotal` if `discount > subtotal`
/// - `Overflow` if adding the tax leaves the `i64` range
pub fn invoice_total(subtotal: Money, discount: Money, tax: Money) -> CoreResult<Money> {
    require_non_negative("subtotal", subtotal)?;
    require_non_negative("discount", discount)?;
    require_non_negative("tax", tax)?;
    if discount > subtotal {
        return Err(CoreError::DiscountExceedsSubtotal { discount, subtotal });
    }
    // 0 <= discount <= subtotal, so only the addition can overflow
    (subtotal - discount)
        .checked_add(tax)
        .ok_or(CoreError::Overflow("invoice total"))
}

/// Amount still owed. Negative when the customer overpaid; the host decides
/// whether that means change or a refund.
///
/// Exact for the non-negative amounts of any invoice; out-of-range inputs
/// saturate.
pub fn remaining(total: Money, paid: Money) -> Money {
    total.saturating_sub(paid)
}

/// Tax on a taxable amount at a basis-point rate, rounded half away from zero.
///
/// # Errors
/// - `NegativeOperand` if the taxable amount is negative
/// - `Overflow` for rates so large the tax does not fit in cents
pub fn tax_amount(taxable: Money, rate: TaxRate) -> CoreResult<Money> {
    require_non_negative("taxable amount", taxable)?;
    taxable.calculate_tax(rate)
}

/// Discount amount for a percentage given in basis points (`1000` = 10%).
///
/// # Errors
/// - `NegativeOperand` if the subtotal is negative
/// - `Validation` if the percentage is above 100%
pub fn percentage_discount(subtotal: Money, discount_bps: u32) -> CoreResult<Money> {
    require_non_negative("subtotal", subtotal)?;
    if discount_bps > MAX_DISCOUNT_BPS {
        return Err(ValidationError::OutOfRange {
            field: "discount percentage".to_string(),
            min: 0,
            max: MAX_DISCOUNT_BPS as i64,
        }
        .into());
    }
    subtotal.percentage_of(discount_bps)
}

/// Prices a whole invoice draft.
///
/// ## Steps
/// 1. `subtotal` of all lines (before any discount)
/// 2. discount = sum of line discounts + invoice discount
/// 3. tax on `subtotal - discount`
/// 4. `total` and `remaining` as in [`invoice_total`] and [`remaining`]
///
/// # Errors
/// Any error of the steps above, or `NegativeOperand` for a negative paid
/// amount. Nothing is returned unless every step succeeds.
pub fn calculate_invoice(draft: &InvoiceDraft) -> CoreResult<InvoiceResult> {
    let subtotal = subtotal(&draft.lines)?;

    let mut discount = draft.invoice_discount;
    require_non_negative("invoice discount", discount)?;
    for line in &draft.lines {
        let line_discount = line.discount_amount.unwrap_or(Money::ZERO);
        // validates the line discount against its own line total
        line_net(line)?;
        discount = discount
            .checked_add(line_discount)
            .ok_or(CoreError::Overflow("invoice discount"))?;
    }
    if discount > subtotal {
        return Err(CoreError::DiscountExceedsSubtotal { discount, subtotal });
    }

    let tax = tax_amount(subtotal - discount, draft.tax_rate)?;
    let total = invoice_total(subtotal, discount, tax)?;
    require_non_negative("paid amount", draft.paid_amount)?;

    Ok(InvoiceResult {
        subtotal,
        discount_amount: discount,
        tax_amount: tax,
        total_amount: total,
        paid_amount: draft.paid_amount,
        remaining_amount: remaining(total, draft.paid_amount),
    })
}

/// Cash to hand back when `tendered` exceeds `total`; zero otherwise.
pub fn change_due(total: Money, tendered: Money) -> Money {
    tendered.saturating_sub(total).max(Money::ZERO)
}

/// Classifies how far an invoice has been paid.
///
/// ```text
/// paid == 0 and total > 0   → UNPAID
/// remaining == 0            → PAID
/// remaining < 0             → OVERPAID
/// otherwise                 → PARTIAL
/// ```
pub fn payment_status(total: Money, paid: Money) -> PaymentStatus {
    let left = remaining(total, paid);
    if paid.is_zero() && total.is_positive() {
        PaymentStatus::Unpaid
    } else if left.is_zero() {
        PaymentStatus::Paid
    } else if left.is_negative() {
        PaymentStatus::Overpaid
    } else {
        PaymentStatus::Partial
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::quantity::Quantity;

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    fn line(qty: i64, price: &str) -> CartLine {
        CartLine::new("p", Quantity::from_units(qty), money(price))
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(&line(5, "10.5")).unwrap(), money("52.5"));
        assert_eq!(line_total(&line(0, "10.5")).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_line_total_fractional_quantity() {
        // 0.333 kg is stored as 0.33; 0.33 × 2.99 = 0.9867 → 0.99
        let l = CartLine::new("cheese", Quantity::parse("0.333").unwrap(), money("2.99"));
        assert_eq!(line_total(&l).unwrap(), money("0.99"));
    }

    #[test]
    fn test_line_total_rejects_negative() {
        let err = line_total(&line(-1, "10")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NegativeOperand);
        let err = line_total(&line(1, "-10")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NegativeOperand);
    }

    #[test]
    fn test_subtotal() {
        assert_eq!(subtotal(&[]).unwrap(), Money::ZERO);
        let lines = vec![line(2, "1.25"), line(3, "0.99")];
        assert_eq!(subtotal(&lines).unwrap(), money("5.47"));
        assert!(subtotal(&[line(1, "1"), line(-2, "1")]).is_err());
    }

    #[test]
    fn test_overflow_is_an_error_not_a_wrap() {
        let big = CartLine::new("p", Quantity::from_units(3), Money::from_cents(i64::MAX / 2));
        assert_eq!(line_total(&big), Err(CoreError::Overflow("amount × quantity")));

        let one = Quantity::from_units(1);
        let near_max = CartLine::new("p", one, Money::from_cents(i64::MAX - 10));
        let small = CartLine::new("p", one, Money::from_cents(100));
        assert_eq!(subtotal(&[near_max, small]), Err(CoreError::Overflow("subtotal")));

        assert_eq!(
            invoice_total(Money::from_cents(i64::MAX), Money::ZERO, Money::from_cents(1)),
            Err(CoreError::Overflow("invoice total"))
        );

        let most = Money::from_cents(i64::MAX);
        assert_eq!(change_due(Money::from_cents(-1), most), most);
        assert_eq!(remaining(Money::from_cents(i64::MIN), most).cents(), i64::MIN);
    }

    #[test]
    fn test_invoice_total() {
        assert_eq!(
            invoice_total(money("100"), money("10"), money("5")).unwrap(),
            money("95")
        );
        assert_eq!(
            invoice_total(money("100"), money("100"), Money::ZERO).unwrap(),
            Money::ZERO
        );
    }

    #[test]
    fn test_invoice_total_errors() {
        let err = invoice_total(money("50"), money("60"), Money::ZERO).unwrap_err();
        assert!(matches!(err, CoreError::DiscountExceedsSubtotal { .. }));

        for (s, d, t) in [("-1", "0", "0"), ("1", "-1", "0"), ("1", "0", "-1")] {
            let err = invoice_total(money(s), money(d), money(t)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NegativeOperand);
        }
    }

    #[test]
    fn test_remaining_allows_overpayment() {
        assert_eq!(remaining(money("95"), money("50")), money("45"));
        assert_eq!(remaining(money("95"), money("100")), money("-5"));
    }

    #[test]
    fn test_percentage_discount() {
        assert_eq!(percentage_discount(money("100"), 1000).unwrap(), money("10"));
        assert_eq!(percentage_discount(money("0.05"), 5000).unwrap(), money("0.03"));
        assert!(matches!(
            percentage_discount(money("100"), 10_001),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_calculate_invoice() {
        let draft = InvoiceDraft {
            lines: vec![
                line(2, "50").with_discount(money("10")),
                line(1, "20"),
            ],
            invoice_discount: money("10"),
            tax_rate: TaxRate::from_bps(1400),
            paid_amount: money("50"),
        };
        let result = calculate_invoice(&draft).unwrap();
        assert_eq!(result.subtotal, money("120"));
        assert_eq!(result.discount_amount, money("20"));
        assert_eq!(result.tax_amount, money("14"));
        assert_eq!(result.total_amount, money("114"));
        assert_eq!(result.paid_amount, money("50"));
        assert_eq!(result.remaining_amount, money("64"));
        assert_eq!(
            result.total_amount,
            result.subtotal - result.discount_amount + result.tax_amount
        );
    }

    #[test]
    fn test_calculate_invoice_rejects_oversized_discounts() {
        let draft = InvoiceDraft {
            lines: vec![line(1, "10").with_discount(money("11"))],
            invoice_discount: Money::ZERO,
            tax_rate: TaxRate::zero(),
            paid_amount: Money::ZERO,
        };
        assert!(matches!(
            calculate_invoice(&draft),
            Err(CoreError::DiscountExceedsSubtotal { .. })
        ));

        let draft = InvoiceDraft {
            lines: vec![line(1, "10").with_discount(money("6"))],
            invoice_discount: money("5"),
            tax_rate: TaxRate::zero(),
            paid_amount: Money::ZERO,
        };
        assert!(matches!(
            calculate_invoice(&draft),
            Err(CoreError::DiscountExceedsSubtotal { .. })
        ));
    }

    #[test]
    fn test_calculate_invoice_rejects_negative_paid() {
        let draft = InvoiceDraft {
            lines: vec![line(1, "10")],
            invoice_discount: Money::ZERO,
            tax_rate: TaxRate::zero(),
            paid_amount: money("-1"),
        };
        assert_eq!(
            calculate_invoice(&draft).unwrap_err().kind(),
            ErrorKind::NegativeOperand
        );
    }

    #[test]
    fn test_change_due() {
        assert_eq!(change_due(money("95"), money("100")), money("5"));
        assert_eq!(change_due(money("95"), money("90")), Money::ZERO);
    }

    #[test]
    fn test_payment_status() {
        assert_eq!(payment_status(money("95"), Money::ZERO), PaymentStatus::Unpaid);
        assert_eq!(payment_status(money("95"), money("40")), PaymentStatus::Partial);
        assert_eq!(payment_status(money("95"), money("95")), PaymentStatus::Paid);
        assert_eq!(payment_status(money("95"), money("100")), PaymentStatus::Overpaid);
        assert_eq!(payment_status(Money::ZERO, Money::ZERO), PaymentStatus::Paid);
    }
}
