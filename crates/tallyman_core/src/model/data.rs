//! Input records consumed by an analysis pass
//!
//! A [`DataSet`] is the closed, read-only input of the engine. Ordering is
//! not required here; [`super::DataView`] sorts the event streams before a
//! pass starts.

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::classes::{AccountKind, CategoryClass, DepositClass, PayeeClass, SecurityClass};
use super::ids::{AccountId, CategoryId, CurrencyId, PayeeId, SecurityId, TagId};
use super::transaction::Transaction;

fn default_minor_units() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    pub code: String,
    /// Number of decimal places money in this currency is rounded to
    #[serde(default = "default_minor_units")]
    pub minor_units: u32,
}

/// Expense booked automatically when money is moved into a cash account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoExpense {
    pub category: CategoryId,
    pub payee: PayeeId,
}

/// Kind-specific account details
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AccountClass {
    Deposit(DepositClass),
    Cash {
        #[serde(default)]
        auto_expense: Option<AutoExpense>,
    },
    Loan,
    Portfolio {
        #[serde(default)]
        tax_free: bool,
    },
}

impl AccountClass {
    pub fn kind(&self) -> AccountKind {
        match self {
            AccountClass::Deposit(_) => AccountKind::Deposit,
            AccountClass::Cash { .. } => AccountKind::Cash,
            AccountClass::Loan => AccountKind::Loan,
            AccountClass::Portfolio { .. } => AccountKind::Portfolio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub class: AccountClass,
    pub currency: CurrencyId,
    /// Institution (or person) that holds the account
    pub parent: PayeeId,
    #[serde(default)]
    pub opening_balance: Decimal,
}

impl Account {
    pub fn kind(&self) -> AccountKind {
        self.class.kind()
    }

    pub fn deposit_class(&self) -> Option<DepositClass> {
        match self.class {
            AccountClass::Deposit(class) => Some(class),
            _ => None,
        }
    }

    pub fn auto_expense(&self) -> Option<AutoExpense> {
        match self.class {
            AccountClass::Cash { auto_expense } => auto_expense,
            _ => None,
        }
    }

    pub fn is_tax_free(&self) -> bool {
        match self.class {
            AccountClass::Deposit(class) => class.is_tax_free(),
            AccountClass::Portfolio { tax_free } => tax_free,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    pub id: SecurityId,
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub class: SecurityClass,
    pub currency: CurrencyId,
    /// Issuer; receives dividends and returned capital
    pub parent: PayeeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payee {
    pub id: PayeeId,
    pub name: String,
    #[serde(default)]
    pub class: PayeeClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub class: CategoryClass,
    #[serde(default)]
    pub parent: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecurityPrice {
    pub security: SecurityId,
    pub date: Date,
    pub price: Decimal,
}

/// Rate expressed as units of `currency` per one unit of the reporting currency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub currency: CurrencyId,
    pub date: Date,
    pub rate: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositRate {
    pub account: AccountId,
    pub date: Date,
    pub rate: Decimal,
    #[serde(default)]
    pub bonus: Option<Decimal>,
    /// Maturity date for fixed-term deposits
    #[serde(default)]
    pub end_date: Option<Date>,
}

/// The complete input of an analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSet {
    pub reporting_currency: CurrencyId,
    /// Defaults to the earliest date in any event stream
    pub start_date: Option<Date>,
    pub currencies: Vec<Currency>,
    pub payees: Vec<Payee>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub accounts: Vec<Account>,
    pub securities: Vec<Security>,
    pub prices: Vec<SecurityPrice>,
    pub exchange_rates: Vec<ExchangeRate>,
    pub deposit_rates: Vec<DepositRate>,
    pub transactions: Vec<Transaction>,
}

impl Default for DataSet {
    fn default() -> Self {
        Self {
            reporting_currency: CurrencyId(0),
            start_date: None,
            currencies: Vec::new(),
            payees: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            accounts: Vec::new(),
            securities: Vec::new(),
            prices: Vec::new(),
            exchange_rates: Vec::new(),
            deposit_rates: Vec::new(),
            transactions: Vec::new(),
        }
    }
}

impl DataSet {
    /// Earliest date found in any of the event streams
    pub fn earliest_date(&self) -> Option<Date> {
        let prices = self.prices.iter().map(|p| p.date);
        let rates = self.exchange_rates.iter().map(|r| r.date);
        let deposits = self.deposit_rates.iter().map(|r| r.date);
        let transactions = self
            .transactions
            .iter()
            .filter(|t| !t.deleted)
            .map(|t| t.date);
        prices.chain(rates).chain(deposits).chain(transactions).min()
    }

    /// Start date of the pass: explicit, or the earliest event date
    pub fn effective_start_date(&self) -> Option<Date> {
        self.start_date.or_else(|| self.earliest_date())
    }

    pub fn latest_date(&self) -> Option<Date> {
        let prices = self.prices.iter().map(|p| p.date);
        let rates = self.exchange_rates.iter().map(|r| r.date);
        let deposits = self.deposit_rates.iter().map(|r| r.date);
        let transactions = self
            .transactions
            .iter()
            .filter(|t| !t.deleted)
            .map(|t| t.date);
        prices.chain(rates).chain(deposits).chain(transactions).max()
    }

    /// Copy of this data set restricted to events dated on or before `cutoff`.
    ///
    /// The start date is pinned so that the opening balances land on the same
    /// date as in the full data set.
    #[must_use]
    pub fn truncated(&self, cutoff: Date) -> DataSet {
        DataSet {
            start_date: self.effective_start_date(),
            prices: self
                .prices
                .iter()
                .filter(|p| p.date <= cutoff)
                .copied()
                .collect(),
            exchange_rates: self
                .exchange_rates
                .iter()
                .filter(|r| r.date <= cutoff)
                .copied()
                .collect(),
            deposit_rates: self
                .deposit_rates
                .iter()
                .filter(|r| r.date <= cutoff)
                .copied()
                .collect(),
            transactions: self
                .transactions
                .iter()
                .filter(|t| t.date <= cutoff)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}
