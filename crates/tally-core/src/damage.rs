//! # Damage & Write-off Calculator
//!
//! Prices damage events. Damage types come from a closed list; anything the
//! host reads from storage that is not on the list is rejected.

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{DamageRecord, DamageType};

/// Cost of a damage event: `quantity × unit_cost`, rounded to cents.
///
/// # Errors
/// - `NegativeQuantity` / `NegativeCost` for negative inputs
/// - `Overflow` if the cost does not fit in cents
pub fn damage_cost(quantity: Quantity, unit_cost: Money) -> CoreResult<Money> {
    if quantity.is_negative() {
        return Err(CoreError::NegativeQuantity {
            field: "damaged quantity",
            value: quantity,
        });
    }
    if unit_cost.is_negative() {
        return Err(CoreError::NegativeCost(unit_cost));
    }
    unit_cost.times(quantity)
}

impl DamageRecord {
    /// Builds a priced record from a typed damage type.
    pub fn new(
        product_id: impl Into<String>,
        quantity: Quantity,
        unit_cost: Money,
        damage_type: DamageType,
    ) -> CoreResult<Self> {
        let total_cost = damage_cost(quantity, unit_cost)?;
        Ok(DamageRecord {
            product_id: product_id.into(),
            quantity,
            unit_cost,
            damage_type,
            total_cost,
        })
    }
}

/// Builds a priced record from a raw damage type tag.
///
/// ```rust
/// use tally_core::{build_damage_record, DamageType, Money, Quantity};
///
/// let four = Quantity::from_units(4);
/// let record = build_damage_record("p1", four, Money::from_cents(250), "EXPIRED").unwrap();
/// assert_eq!(record.damage_type, DamageType::Expired);
/// assert_eq!(record.total_cost, Money::from_cents(1_000));
///
/// assert!(build_damage_record("p1", Quantity::from_units(1), Money::ZERO, "MELTED").is_err());
/// ```
///
/// # Errors
/// - `InvalidDamageType` if the tag is not in the closed list
/// - errors of [`damage_cost`]
pub fn build_damage_record(
    product_id: impl Into<String>,
    quantity: Quantity,
    unit_cost: Money,
    damage_type: &str,
) -> CoreResult<DamageRecord> {
    let damage_type: DamageType = damage_type.parse()?;
    DamageRecord::new(product_id, quantity, unit_cost, damage_type)
}

/// Sum of the write-off cost of all records.
///
/// # Errors
/// `Overflow` if the sum does not fit in cents.
pub fn total_damage_cost(records: &[DamageRecord]) -> CoreResult<Money> {
    records.iter().try_fold(Money::ZERO, |sum, record| {
        sum.checked_add(record.total_cost)
            .ok_or(CoreError::Overflow("damage total"))
    })
}

/// Write-off cost grouped by damage type, for the damage report.
///
/// # Errors
/// `Overflow` if any group's sum does not fit in cents.
pub fn damage_cost_by_type(records: &[DamageRecord]) -> CoreResult<BTreeMap<DamageType, Money>> {
    let mut totals = BTreeMap::new();
    for record in records {
        let total = totals.entry(record.damage_type).or_insert(Money::ZERO);
        *total = total
            .checked_add(record.total_cost)
            .ok_or(CoreError::Overflow("damage total"))?;
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_cost() {
        assert_eq!(
            damage_cost(Quantity::from_units(3), Money::from_cents(333)).unwrap(),
            Money::from_cents(999)
        );
        // 0.5 × 0.25 = 0.125 → 0.13
        assert_eq!(
            damage_cost(Quantity::from_hundredths(50), Money::from_cents(25)).unwrap(),
            Money::from_cents(13)
        );
        assert_eq!(damage_cost(Quantity::ZERO, Money::from_cents(999)).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_damage_cost_rejects_negative() {
        assert!(matches!(
            damage_cost(Quantity::from_units(-1), Money::from_cents(1)),
            Err(CoreError::NegativeQuantity { .. })
        ));
        assert!(matches!(
            damage_cost(Quantity::from_units(1), Money::from_cents(-1)),
            Err(CoreError::NegativeCost(_))
        ));
    }

    #[test]
    fn test_build_damage_record() {
        let units = Quantity::from_units(2);
        let record =
            build_damage_record("p1", units, Money::from_cents(150), "transit_damage").unwrap();
        assert_eq!(record.damage_type, DamageType::TransitDamage);
        assert_eq!(record.total_cost, Money::from_cents(300));

        let err = build_damage_record("p1", units, Money::ZERO, "FLOOD").unwrap_err();
        assert_eq!(err, CoreError::InvalidDamageType("FLOOD".to_string()));
    }

    #[test]
    fn test_every_damage_type_accepted() {
        let one = Quantity::from_units(1);
        for damage_type in DamageType::ALL {
            let record =
                build_damage_record("p1", one, Money::from_cents(1), damage_type.as_str()).unwrap();
            assert_eq!(record.damage_type, damage_type);
        }
    }

    fn record(units: i64, cents: i64, damage_type: DamageType) -> DamageRecord {
        DamageRecord::new("p1", Quantity::from_units(units), Money::from_cents(cents), damage_type)
            .unwrap()
    }

    #[test]
    fn test_totals() {
        let records = vec![
            record(1, 100, DamageType::Expired),
            record(2, 100, DamageType::Expired),
            record(1, 50, DamageType::Other),
        ];
        assert_eq!(total_damage_cost(&records).unwrap(), Money::from_cents(350));

        let by_type = damage_cost_by_type(&records).unwrap();
        assert_eq!(by_type[&DamageType::Expired], Money::from_cents(300));
        assert_eq!(by_type[&DamageType::Other], Money::from_cents(50));
        assert!(!by_type.contains_key(&DamageType::WaterDamage));
    }

    #[test]
    fn test_cost_overflow_is_reported() {
        let half = Money::from_cents(i64::MAX / 2);
        assert_eq!(
            damage_cost(Quantity::from_units(3), half),
            Err(CoreError::Overflow("amount × quantity"))
        );

        let big = record(1, i64::MAX / 2 + 1, DamageType::Expired);
        let records = vec![big.clone(), big];
        assert_eq!(total_damage_cost(&records), Err(CoreError::Overflow("damage total")));
        assert_eq!(damage_cost_by_type(&records), Err(CoreError::Overflow("damage total")));
        assert_eq!(total_damage_cost(&records[..1]).unwrap(), Money::from_cents(i64::MAX / 2 + 1));
    }
}
