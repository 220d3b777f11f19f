//! Cost allocation rules for disposals and capital distributions

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::bucket::CashType;
use crate::config::GainsRules;
use crate::date_math::years_held_inclusive;
use crate::money::{proportion, round_money};

/// Classify cash returned alongside (or out of) remaining stock.
///
/// Cash is large when it exceeds both the absolute threshold and the
/// fraction of the total consideration. Both comparisons are strict.
pub fn classify_cash(cash: Decimal, stock_value: Decimal, rules: &GainsRules) -> CashType {
    let consideration = cash + stock_value;
    if cash > rules.large_cash_threshold && cash > rules.large_cash_fraction * consideration {
        CashType::LargeCash
    } else {
        CashType::SmallCash
    }
}

/// Cost allowed against `cash` returned from a holding with cost `cost`
pub fn allowed_cost(
    cost: Decimal,
    cash: Decimal,
    stock_value: Decimal,
    cash_type: CashType,
    minor_units: u32,
) -> Decimal {
    match cash_type {
        CashType::LargeCash => proportion(cost, cash, cash + stock_value, minor_units),
        CashType::SmallCash => cost.min(cash),
    }
}

/// Cost attributable to `sold` of `held` units
pub fn unit_cost_fraction(cost: Decimal, sold: Decimal, held: Decimal, minor_units: u32) -> Decimal {
    if sold >= held {
        return cost;
    }
    proportion(cost, sold, held, minor_units)
}

/// Years a chargeable holding was held and the gain per year
pub fn slice_gain(gain: Decimal, start: Date, end: Date, minor_units: u32) -> (u32, Decimal) {
    let years = years_held_inclusive(start, end);
    let sliced = round_money(gain / Decimal::from(years), minor_units);
    (years, sliced)
}
