use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::money::{convert, round_money};

use super::BucketValues;

/// Outcome of the large/small cash test on a capital distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CashType {
    /// Part-disposal: cost is apportioned between cash and remaining stock
    LargeCash,
    /// Cash is deducted from cost without realising a gain where possible
    SmallCash,
}

/// Details of the corporate action processed in the current event
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorporateAction {
    pub xferred_cost: Option<Decimal>,
    pub xferred_value: Option<Decimal>,
    pub cost_dilution: Option<Decimal>,
    pub cash_type: Option<CashType>,
    pub capital_gain: Option<Decimal>,
    pub allowed_cost: Option<Decimal>,
    pub consideration: Option<Decimal>,
    pub returned_cash: Option<Decimal>,
    pub years: Option<u32>,
    pub sliced_gain: Option<Decimal>,
    /// Signed valuation moved in or out by a position transfer
    pub moved_value: Option<Decimal>,
    /// Signed investment moved in or out by a position transfer
    pub moved_invested: Option<Decimal>,
}

/// Values of a security held in a portfolio
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecurityValues {
    pub units: Decimal,
    /// Cost still attributed to the units held
    pub residual_cost: Decimal,
    pub realised_gains: Decimal,
    /// Money invested without a unit change (e.g. regular premiums)
    pub funded: Decimal,
    /// Dividends paid out in cash
    pub dividend: Decimal,
    /// Net cash put into the holding
    pub invested: Decimal,
    pub valuation: Decimal,
    pub foreign_value: Decimal,
    pub price: Decimal,
    pub exchange_rate: Decimal,
    pub market_growth: Decimal,
    pub currency_fluct: Decimal,
    pub start_date: Option<Date>,

    pub action: CorporateAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityAttribute {
    Units,
    ResidualCost,
    RealisedGains,
    Funded,
    Dividend,
    Invested,
    Valuation,
    ForeignValue,
    Price,
    ExchangeRate,
    MarketGrowth,
    CurrencyFluct,
    /// Valuation less residual cost
    UnrealisedGains,
    /// Realised plus unrealised gains and dividends
    Profit,
    CapitalGain,
    SlicedGain,
}

impl SecurityValues {
    /// Recompute the valuation from units, `price` and `rate`
    pub(crate) fn revalue(
        &mut self,
        price: Decimal,
        rate: Decimal,
        foreign_minor_units: u32,
        local_minor_units: u32,
    ) {
        self.price = price;
        self.exchange_rate = rate;
        self.foreign_value = round_money(self.units * price, foreign_minor_units);
        self.valuation = convert(self.foreign_value, rate, local_minor_units);
    }

    /// Holdings with units, cost or funding left take part in portfolio transfers
    pub fn is_active(&self) -> bool {
        !self.units.is_zero() || !self.residual_cost.is_zero() || !self.funded.is_zero()
    }

    pub fn unrealised_gains(&self) -> Decimal {
        self.valuation - self.residual_cost
    }

    /// Move every running value out of `self`, leaving it empty
    pub(crate) fn take_position(&mut self) -> SecurityValues {
        let taken = SecurityValues {
            units: self.units,
            residual_cost: self.residual_cost,
            realised_gains: self.realised_gains,
            funded: self.funded,
            dividend: self.dividend,
            invested: self.invested,
            start_date: self.start_date,
            ..SecurityValues::default()
        };
        self.units = Decimal::ZERO;
        self.residual_cost = Decimal::ZERO;
        self.realised_gains = Decimal::ZERO;
        self.funded = Decimal::ZERO;
        self.dividend = Decimal::ZERO;
        self.invested = Decimal::ZERO;
        taken
    }

    /// Add a position taken from another holding
    pub(crate) fn absorb_position(&mut self, position: &SecurityValues) {
        self.units += position.units;
        self.residual_cost += position.residual_cost;
        self.realised_gains += position.realised_gains;
        self.funded += position.funded;
        self.dividend += position.dividend;
        self.invested += position.invested;
        self.start_date = match (self.start_date, position.start_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }
}

impl BucketValues for SecurityValues {
    type Attribute = SecurityAttribute;

    fn clear_transients(&mut self) {
        self.action = CorporateAction::default();
    }

    fn delta_from(&self, base: &Self) -> Self {
        Self {
            units: self.units - base.units,
            residual_cost: self.residual_cost - base.residual_cost,
            realised_gains: self.realised_gains - base.realised_gains,
            funded: self.funded - base.funded,
            dividend: self.dividend - base.dividend,
            invested: self.invested - base.invested,
            valuation: self.valuation - base.valuation,
            foreign_value: self.foreign_value - base.foreign_value,
            market_growth: self.market_growth - base.market_growth,
            currency_fluct: self.currency_fluct - base.currency_fluct,
            ..self.clone()
        }
    }

    fn attribute(&self, attribute: SecurityAttribute) -> Option<Decimal> {
        match attribute {
            SecurityAttribute::Units => Some(self.units),
            SecurityAttribute::ResidualCost => Some(self.residual_cost),
            SecurityAttribute::RealisedGains => Some(self.realised_gains),
            SecurityAttribute::Funded => Some(self.funded),
            SecurityAttribute::Dividend => Some(self.dividend),
            SecurityAttribute::Invested => Some(self.invested),
            SecurityAttribute::Valuation => Some(self.valuation),
            SecurityAttribute::ForeignValue => Some(self.foreign_value),
            SecurityAttribute::Price => Some(self.price),
            SecurityAttribute::ExchangeRate => Some(self.exchange_rate),
            SecurityAttribute::MarketGrowth => Some(self.market_growth),
            SecurityAttribute::CurrencyFluct => Some(self.currency_fluct),
            SecurityAttribute::UnrealisedGains => Some(self.unrealised_gains()),
            SecurityAttribute::Profit => {
                Some(self.unrealised_gains() + self.realised_gains + self.dividend)
            }
            SecurityAttribute::CapitalGain => self.action.capital_gain,
            SecurityAttribute::SlicedGain => self.action.sliced_gain,
        }
    }

    fn is_zero(&self) -> bool {
        self.units.is_zero()
            && self.residual_cost.is_zero()
            && self.realised_gains.is_zero()
            && self.funded.is_zero()
            && self.dividend.is_zero()
            && self.invested.is_zero()
            && self.valuation.is_zero()
            && self.market_growth.is_zero()
            && self.currency_fluct.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_revalue_foreign_holding() {
        let mut v = SecurityValues {
            units: d("10"),
            ..SecurityValues::default()
        };
        v.revalue(d("12.50"), d("1.25"), 2, 2);
        assert_eq!(v.foreign_value, d("125.00"));
        assert_eq!(v.valuation, d("100.00"));
    }

    #[test]
    fn test_take_and_absorb_position_conserves_cost() {
        let mut source = SecurityValues {
            units: d("40"),
            residual_cost: d("1000"),
            realised_gains: d("25"),
            invested: d("1000"),
            start_date: Some(date(2020, 5, 1)),
            ..SecurityValues::default()
        };
        let mut target = SecurityValues {
            units: d("10"),
            residual_cost: d("300"),
            start_date: Some(date(2022, 1, 1)),
            ..SecurityValues::default()
        };
        let position = source.take_position();
        target.absorb_position(&position);

        assert!(!source.is_active());
        assert_eq!(target.units, d("50"));
        assert_eq!(target.residual_cost, d("1300"));
        assert_eq!(target.realised_gains, d("25"));
        assert_eq!(target.start_date, Some(date(2020, 5, 1)));
    }
}
