//! Account builder for the data set DSL
//!
//! Provides a fluent API for declaring accounts by name. Parent payees,
//! currencies and auto-expense targets are resolved when the data set is
//! built.

use rust_decimal::Decimal;

use crate::model::DepositClass;

/// Kind of account being declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Deposit(DepositClass),
    Cash,
    Loan,
    Portfolio { tax_free: bool },
}

/// Names of the category and payee an auto-expense cash account books to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoExpenseNames {
    pub category: String,
    pub payee: String,
}

/// Builder for creating accounts with a fluent API
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) account_type: AccountType,
    pub(crate) parent: String,
    pub(crate) currency: Option<String>,
    pub(crate) opening_balance: Decimal,
    pub(crate) auto_expense: Option<AutoExpenseNames>,
}

impl AccountBuilder {
    // =========================================================================
    // Preset Constructors
    // =========================================================================

    fn new(name: impl Into<String>, parent: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: name.into(),
            description: None,
            account_type,
            parent: parent.into(),
            currency: None,
            opening_balance: Decimal::ZERO,
            auto_expense: None,
        }
    }

    /// Current account
    #[must_use]
    pub fn deposit(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Deposit(DepositClass::Checking))
    }

    /// Savings account paying taxed interest
    #[must_use]
    pub fn savings(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Deposit(DepositClass::Savings))
    }

    /// Savings account paying interest gross
    #[must_use]
    pub fn gross_savings(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Deposit(DepositClass::GrossSavings))
    }

    /// Cash ISA or similar
    #[must_use]
    pub fn tax_free_savings(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Deposit(DepositClass::TaxFreeSavings))
    }

    #[must_use]
    pub fn bond(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Deposit(DepositClass::Bond))
    }

    #[must_use]
    pub fn peer_to_peer(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Deposit(DepositClass::PeerToPeer))
    }

    /// Wallet or petty cash
    #[must_use]
    pub fn cash(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Cash)
    }

    /// Mortgage, credit card or money lent
    #[must_use]
    pub fn loan(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Loan)
    }

    /// Taxable investment portfolio
    #[must_use]
    pub fn portfolio(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Portfolio { tax_free: false })
    }

    /// Stocks and shares ISA or pension wrapper
    #[must_use]
    pub fn tax_free_portfolio(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(name, parent, AccountType::Portfolio { tax_free: true })
    }

    // =========================================================================
    // Configuration Methods
    // =========================================================================

    #[must_use]
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Currency code; defaults to the reporting currency
    #[must_use]
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    /// Balance booked against the parent payee on the start date
    #[must_use]
    pub fn opening_balance(mut self, amount: Decimal) -> Self {
        self.opening_balance = amount;
        self
    }

    /// Money moved into this cash account is spent immediately.
    ///
    /// Only meaningful on cash accounts; ignored elsewhere.
    #[must_use]
    pub fn auto_expense(mut self, category: impl Into<String>, payee: impl Into<String>) -> Self {
        self.auto_expense = Some(AutoExpenseNames {
            category: category.into(),
            payee: payee.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let isa = AccountBuilder::tax_free_portfolio("ISA", "Vanguard");
        assert_eq!(isa.account_type, AccountType::Portfolio { tax_free: true });
        assert_eq!(isa.parent, "Vanguard");

        let wallet = AccountBuilder::cash("Wallet", "Me")
            .auto_expense("Groceries", "Tesco")
            .opening_balance(Decimal::from(40));
        assert_eq!(wallet.account_type, AccountType::Cash);
        assert_eq!(wallet.opening_balance, Decimal::from(40));
        assert_eq!(wallet.auto_expense.unwrap().payee, "Tesco");
    }
}
