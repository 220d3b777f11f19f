//! Decimal money helpers
//!
//! Money amounts are rounded to the currency's minor units after every
//! conversion or proportional split. Units and prices keep full precision.

use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_MINOR_UNITS: u32 = 2;

/// Round a money amount to `minor_units` decimal places, half away from zero
#[inline]
pub fn round_money(value: Decimal, minor_units: u32) -> Decimal {
    value.round_dp_with_strategy(minor_units, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a foreign amount into the reporting currency.
///
/// `rate` is the number of foreign units per one reporting unit and must be
/// positive; the caller validates it when the rate is looked up.
#[inline]
pub fn convert(foreign: Decimal, rate: Decimal, minor_units: u32) -> Decimal {
    if rate == Decimal::ONE {
        return round_money(foreign, minor_units);
    }
    round_money(foreign / rate, minor_units)
}

/// Convert a reporting-currency amount into a foreign currency
#[inline]
pub fn convert_back(local: Decimal, rate: Decimal, minor_units: u32) -> Decimal {
    round_money(local * rate, minor_units)
}

/// `amount × numerator / denominator`, rounded; zero when the denominator is zero
pub fn proportion(
    amount: Decimal,
    numerator: Decimal,
    denominator: Decimal,
    minor_units: u32,
) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    round_money(amount * numerator / denominator, minor_units)
}

/// Split a signed amount into `(income, expense)` contributions
#[inline]
pub fn split_signed(amount: Decimal) -> (Decimal, Decimal) {
    if amount.is_sign_negative() {
        (Decimal::ZERO, -amount)
    } else {
        (amount, Decimal::ZERO)
    }
}
