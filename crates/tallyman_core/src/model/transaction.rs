use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, CategoryId, HoldingKey, PayeeId, TagId, TransactionId};

/// Something money can move into or out of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionAsset {
    Account(AccountId),
    Holding(HoldingKey),
    Payee(PayeeId),
}

impl TransactionAsset {
    pub fn is_payee(&self) -> bool {
        matches!(self, TransactionAsset::Payee(_))
    }

    pub fn is_holding(&self) -> bool {
        matches!(self, TransactionAsset::Holding(_))
    }

    pub fn as_payee(&self) -> Option<PayeeId> {
        match self {
            TransactionAsset::Payee(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_holding(&self) -> Option<HoldingKey> {
        match self {
            TransactionAsset::Holding(key) => Some(*key),
            _ => None,
        }
    }

    pub fn as_account(&self) -> Option<AccountId> {
        match self {
            TransactionAsset::Account(id) => Some(*id),
            _ => None,
        }
    }
}

/// Direction of the money flow relative to the transaction's account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Money flows from the account to the partner
    #[default]
    To,
    /// Money flows from the partner to the account
    From,
}

/// A raw transaction as recorded by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub date: Date,
    /// An account or a security holding
    pub account: TransactionAsset,
    /// An account, a holding or a payee
    pub partner: TransactionAsset,
    #[serde(default)]
    pub direction: Direction,
    pub category: CategoryId,
    /// Amount in the currency of `account`
    pub amount: Decimal,
    /// Amount in the currency of `partner`, when it differs
    #[serde(default)]
    pub partner_amount: Option<Decimal>,
    /// Signed unit change on the account leg
    #[serde(default)]
    pub account_units: Option<Decimal>,
    /// Signed unit change on the partner leg
    #[serde(default)]
    pub partner_units: Option<Decimal>,
    #[serde(default)]
    pub tax_credit: Option<Decimal>,
    #[serde(default)]
    pub employer_ni: Option<Decimal>,
    #[serde(default)]
    pub employee_ni: Option<Decimal>,
    #[serde(default)]
    pub benefit: Option<Decimal>,
    #[serde(default)]
    pub withheld: Option<Decimal>,
    #[serde(default)]
    pub returned_cash: Option<Decimal>,
    #[serde(default)]
    pub returned_cash_account: Option<AccountId>,
    /// Fraction of cost retained by the original holding on a demerger
    #[serde(default)]
    pub dilution: Option<Decimal>,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub deleted: bool,
}

impl Transaction {
    pub fn debit(&self) -> TransactionAsset {
        match self.direction {
            Direction::To => self.account,
            Direction::From => self.partner,
        }
    }

    pub fn credit(&self) -> TransactionAsset {
        match self.direction {
            Direction::To => self.partner,
            Direction::From => self.account,
        }
    }

    /// Amount on the partner leg, in the partner's currency
    pub fn partner_value(&self) -> Decimal {
        self.partner_amount.unwrap_or(self.amount)
    }

    pub fn debit_units(&self) -> Option<Decimal> {
        match self.direction {
            Direction::To => self.account_units,
            Direction::From => self.partner_units,
        }
    }

    pub fn credit_units(&self) -> Option<Decimal> {
        match self.direction {
            Direction::To => self.partner_units,
            Direction::From => self.account_units,
        }
    }
}
