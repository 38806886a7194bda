// Copyright 2023 Remi Bernotavicius

use crate::database::models::Unit;

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum MeasurementKind {
    Weight,
    Volume,
    Count,
}

impl From<Unit> for MeasurementKind {
    fn from(m: Unit) -> Self {
        match m {
            Unit::Grams => Self::Weight,
            Unit::Kilograms => Self::Weight,
            Unit::Milliliters => Self::Volume,
            Unit::Liters => Self::Volume,
            Unit::Pieces => Self::Count,
            Unit::Sheets => Self::Count,
            Unit::Sticks => Self::Count,
        }
    }
}

/// Size of one `unit` in its kind's base unit (g, ml, or itself for counts).
fn as_base(unit: Unit) -> f64 {
    match unit {
        Unit::Kilograms | Unit::Liters => 1_000.0,
        Unit::Grams | Unit::Milliliters => 1.0,
        Unit::Pieces | Unit::Sheets | Unit::Sticks => 1.0,
    }
}

/// How many `b` make up one `a`. `None` when the two can't be converted: different kinds, or two
/// different count units.
pub fn conversion_factor(a: Unit, b: Unit) -> Option<f64> {
    if a == b {
        return Some(1.0);
    }
    match (MeasurementKind::from(a), MeasurementKind::from(b)) {
        (MeasurementKind::Count, _) | (_, MeasurementKind::Count) => None,
        (a_kind, b_kind) if a_kind == b_kind => Some(as_base(a) / as_base(b)),
        _ => None,
    }
}

/// Scales a value given in `kg` or `L` down by 1000 and passes every other unit through.
///
/// This is applied to quantity and unit price separately when computing material cost, so a
/// recipe line in `kg` is scaled twice. Stored costs depend on it, so it stays.
pub fn to_base(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Kilograms | Unit::Liters => value / 1_000.0,
        _ => value,
    }
}

/// Price of one usage unit of an ingredient bought as `purchase_quantity` `purchase_unit`s for
/// `purchase_price`.
pub fn unit_price(
    purchase_price: f64,
    purchase_quantity: f64,
    purchase_unit: Unit,
    usage_unit: Unit,
) -> f64 {
    if purchase_quantity <= 0.0 {
        return 0.0;
    }
    let per_purchase_unit = purchase_price / purchase_quantity;
    match conversion_factor(purchase_unit, usage_unit) {
        Some(factor) => per_purchase_unit / factor,
        None => per_purchase_unit,
    }
}

#[test]
fn unit_conversion_metric() {
    use Unit::*;

    let expected = maplit::btreemap! {
        (Kilograms, Grams) => 1_000.0,
        (Grams, Kilograms) => 1.0 / 1_000.0,
        (Liters, Milliliters) => 1_000.0,
        (Milliliters, Liters) => 1.0 / 1_000.0,
        (Grams, Grams) => 1.0,
        (Liters, Liters) => 1.0,
    };
    for ((a, b), factor) in expected {
        assert_eq!(conversion_factor(a, b), Some(factor), "{a} -> {b}");
    }
}

#[test]
fn unit_conversion_incompatible() {
    use Unit::*;

    assert_eq!(conversion_factor(Grams, Milliliters), None);
    assert_eq!(conversion_factor(Pieces, Sheets), None);
    assert_eq!(conversion_factor(Pieces, Grams), None);
    assert_eq!(conversion_factor(Sticks, Sticks), Some(1.0));
}

#[test]
fn unit_conversion_to_base() {
    assert_eq!(to_base(1_500.0, Unit::Kilograms), 1.5);
    assert_eq!(to_base(1_500.0, Unit::Liters), 1.5);
    assert_eq!(to_base(1_500.0, Unit::Grams), 1_500.0);
    assert_eq!(to_base(3.0, Unit::Pieces), 3.0);
}

#[test]
fn unit_conversion_unit_price() {
    use Unit::*;

    assert_eq!(unit_price(2_000.0, 1.0, Kilograms, Grams), 2.0);
    assert_eq!(unit_price(300.0, 500.0, Milliliters, Milliliters), 0.6);
    assert_eq!(unit_price(600.0, 10.0, Pieces, Pieces), 60.0);
    assert_eq!(unit_price(600.0, 10.0, Pieces, Grams), 60.0);
    assert_eq!(unit_price(600.0, 0.0, Grams, Grams), 0.0);
}
