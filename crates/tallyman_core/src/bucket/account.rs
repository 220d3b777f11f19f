use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cursor::DepositTerms;
use crate::model::{Account, AutoExpense, DepositClass};
use crate::money::convert;

use super::BucketValues;

/// Values of a deposit, cash, loan or portfolio-cash account
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountValues {
    /// Balance in the reporting currency
    pub valuation: Decimal,
    /// Balance in the account's own currency
    pub foreign_value: Decimal,
    pub exchange_rate: Decimal,
    /// Cumulative valuation change caused by exchange rates and rounding
    pub currency_fluct: Decimal,
    pub bad_debt: Decimal,
    pub deposit_rate: Option<Decimal>,
    pub bonus_rate: Option<Decimal>,
    pub maturity: Option<Date>,

    /// Reporting-currency value of the flows booked in the current event
    pub local_flow: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAttribute {
    Valuation,
    ForeignValue,
    ExchangeRate,
    CurrencyFluct,
    BadDebt,
    DepositRate,
    BonusRate,
    LocalFlow,
}

impl AccountValues {
    /// Move `native` into the account, worth `local` in the reporting currency
    pub(crate) fn apply_flow(
        &mut self,
        native: Decimal,
        local: Decimal,
        rate: Decimal,
        minor_units: u32,
    ) {
        self.foreign_value += native;
        self.local_flow += local;
        self.revalue(rate, minor_units);
    }

    pub(crate) fn revalue(&mut self, rate: Decimal, minor_units: u32) {
        self.exchange_rate = rate;
        self.valuation = convert(self.foreign_value, rate, minor_units);
    }

    pub(crate) fn set_terms(&mut self, terms: DepositTerms) {
        self.deposit_rate = Some(terms.rate);
        self.bonus_rate = terms.bonus;
        self.maturity = terms.maturity;
    }
}

impl BucketValues for AccountValues {
    type Attribute = AccountAttribute;

    fn clear_transients(&mut self) {
        self.local_flow = Decimal::ZERO;
    }

    fn delta_from(&self, base: &Self) -> Self {
        Self {
            valuation: self.valuation - base.valuation,
            foreign_value: self.foreign_value - base.foreign_value,
            currency_fluct: self.currency_fluct - base.currency_fluct,
            bad_debt: self.bad_debt - base.bad_debt,
            ..self.clone()
        }
    }

    fn attribute(&self, attribute: AccountAttribute) -> Option<Decimal> {
        match attribute {
            AccountAttribute::Valuation => Some(self.valuation),
            AccountAttribute::ForeignValue => Some(self.foreign_value),
            AccountAttribute::ExchangeRate => Some(self.exchange_rate),
            AccountAttribute::CurrencyFluct => Some(self.currency_fluct),
            AccountAttribute::BadDebt => Some(self.bad_debt),
            AccountAttribute::DepositRate => self.deposit_rate,
            AccountAttribute::BonusRate => self.bonus_rate,
            AccountAttribute::LocalFlow => Some(self.local_flow),
        }
    }

    fn is_zero(&self) -> bool {
        self.valuation.is_zero()
            && self.foreign_value.is_zero()
            && self.currency_fluct.is_zero()
            && self.bad_debt.is_zero()
    }
}

/// Behaviour that varies by the kind of account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountStrategy {
    /// Peer-to-peer deposits record written-off capital and interest
    pub tracks_bad_debt: bool,
    /// Money moved into the account is spent immediately
    pub auto_expense: Option<AutoExpense>,
}

impl AccountStrategy {
    pub fn for_account(account: &Account) -> Self {
        Self {
            tracks_bad_debt: account.deposit_class() == Some(DepositClass::PeerToPeer),
            auto_expense: account.auto_expense(),
        }
    }
}
