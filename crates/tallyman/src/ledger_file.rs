//! Human-readable ledger files
//!
//! A ledger file names every entity and refers to others by name, the same
//! way the builder DSL does. Files ending in `.json` are read with
//! `serde_json`, anything else as YAML.
//!
//! ```yaml
//! start: 2024-01-01
//! payees:
//!   - { name: Barclays, class: Institution }
//!   - { name: Acme, class: Employer }
//! categories:
//!   - { name: Salary, class: Salary }
//! accounts:
//!   - { name: Current, type: deposit, parent: Barclays, opening_balance: 500 }
//! transactions:
//!   - date: 2024-01-31
//!     category: Salary
//!     from: { payee: Acme }
//!     to: { account: Current }
//!     amount: 2500
//!     tax: { credit: 500 }
//! ```

use std::fs;
use std::path::Path;

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tallyman_core::config::{AccountBuilder, DataSetBuilder, SecurityBuilder, TransactionBuilder};
use tallyman_core::model::{CategoryClass, PayeeClass, SecurityClass};

#[derive(Debug)]
pub enum LedgerFileError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for LedgerFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerFileError::Io(msg) => write!(f, "IO error: {msg}"),
            LedgerFileError::Parse(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerFileError {}

// ============================================================================
// File Format
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerFile {
    /// Date of the opening balances; the earliest event when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_currency: Option<String>,
    #[serde(default)]
    pub currencies: Vec<CurrencyData>,
    #[serde(default)]
    pub payees: Vec<PayeeData>,
    #[serde(default)]
    pub categories: Vec<CategoryData>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub accounts: Vec<AccountData>,
    #[serde(default)]
    pub securities: Vec<SecurityData>,
    #[serde(default)]
    pub prices: Vec<PriceData>,
    #[serde(default)]
    pub exchange_rates: Vec<ExchangeRateData>,
    #[serde(default)]
    pub deposit_rates: Vec<DepositRateData>,
    #[serde(default)]
    pub transactions: Vec<TransactionData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyData {
    pub code: String,
    #[serde(default = "default_minor_units")]
    pub minor_units: u32,
}

fn default_minor_units() -> u32 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayeeData {
    pub name: String,
    #[serde(default)]
    pub class: PayeeClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryData {
    pub name: String,
    pub class: CategoryClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Deposit,
    Savings,
    GrossSavings,
    TaxFreeSavings,
    Bond,
    PeerToPeer,
    Cash,
    Loan,
    Portfolio,
    TaxFreePortfolio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoExpenseData {
    pub category: String,
    pub payee: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    pub name: String,
    #[serde(rename = "type", default)]
    pub account_type: AccountType,
    /// Payee that holds the account
    pub parent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_expense: Option<AutoExpenseData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityData {
    pub name: String,
    pub issuer: String,
    #[serde(default)]
    pub class: SecurityClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceData {
    pub security: String,
    pub date: Date,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateData {
    pub currency: String,
    pub date: Date,
    /// Units of the currency per one unit of the reporting currency
    pub rate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRateData {
    pub account: String,
    pub date: Date,
    pub rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<Decimal>,
    /// Maturity of a fixed-term rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Date>,
}

/// One side of a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegData {
    Account(String),
    Payee(String),
    Holding { portfolio: String, security: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer_ni: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_ni: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withheld: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnedCashData {
    pub amount: Decimal,
    pub account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub date: Date,
    pub category: String,
    pub from: LegData,
    pub to: LegData,
    pub amount: Decimal,
    /// Amount in the destination currency when it differs from the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_out: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_in: Option<Decimal>,
    /// Units added or removed by a split or units adjustment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_change: Option<Decimal>,
    #[serde(default)]
    pub tax: TaxData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned_cash: Option<ReturnedCashData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dilution: Option<Decimal>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub deleted: bool,
}

// ============================================================================
// Loading
// ============================================================================

impl LedgerFile {
    pub fn load(path: &Path) -> Result<Self, LedgerFileError> {
        let content = fs::read_to_string(path).map_err(|e| {
            LedgerFileError::Io(format!("Failed to read {}: {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let ledger = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };

        tracing::info!(
            path = %path.display(),
            accounts = ledger.accounts.len(),
            transactions = ledger.transactions.len(),
            "Loaded ledger file"
        );
        Ok(ledger)
    }

    pub fn from_yaml(content: &str) -> Result<Self, LedgerFileError> {
        serde_saphyr::from_str(content)
            .map_err(|e| LedgerFileError::Parse(format!("Failed to parse ledger: {e}")))
    }

    pub fn from_json(content: &str) -> Result<Self, LedgerFileError> {
        serde_json::from_str(content)
            .map_err(|e| LedgerFileError::Parse(format!("Failed to parse ledger: {e}")))
    }

    /// Translate the file into builder calls; names are resolved by `build`
    pub fn into_builder(self) -> DataSetBuilder {
        let mut builder = DataSetBuilder::new();
        if let Some(start) = self.start {
            builder = builder.start(start);
        }
        if let Some(code) = self.reporting_currency {
            builder = builder.reporting_currency(code);
        }

        for currency in self.currencies {
            builder = builder.currency(currency.code, currency.minor_units);
        }
        for payee in self.payees {
            builder = builder.payee(payee.name, payee.class);
        }
        for category in self.categories {
            builder = match category.parent {
                Some(parent) => builder.subcategory(category.name, category.class, parent),
                None => builder.category(category.name, category.class),
            };
        }
        for tag in self.tags {
            builder = builder.tag(tag);
        }
        for account in self.accounts {
            builder = builder.account(account.into_builder());
        }
        for security in self.securities {
            builder = builder.security(security.into_builder());
        }

        for price in self.prices {
            builder = builder.price(price.security, price.date, price.price);
        }
        for rate in self.exchange_rates {
            builder = builder.exchange_rate(rate.currency, rate.date, rate.rate);
        }
        for rate in self.deposit_rates {
            builder = match rate.end_date {
                Some(end_date) => {
                    builder.fixed_term_rate(rate.account, rate.date, rate.rate, rate.bonus, end_date)
                }
                None => builder.deposit_rate(rate.account, rate.date, rate.rate),
            };
        }

        for transaction in self.transactions {
            builder = builder.transaction(transaction.into_builder());
        }
        builder
    }
}

impl AccountData {
    fn into_builder(self) -> AccountBuilder {
        let (name, parent) = (self.name, self.parent);
        let mut account = match self.account_type {
            AccountType::Deposit => AccountBuilder::deposit(name, parent),
            AccountType::Savings => AccountBuilder::savings(name, parent),
            AccountType::GrossSavings => AccountBuilder::gross_savings(name, parent),
            AccountType::TaxFreeSavings => AccountBuilder::tax_free_savings(name, parent),
            AccountType::Bond => AccountBuilder::bond(name, parent),
            AccountType::PeerToPeer => AccountBuilder::peer_to_peer(name, parent),
            AccountType::Cash => AccountBuilder::cash(name, parent),
            AccountType::Loan => AccountBuilder::loan(name, parent),
            AccountType::Portfolio => AccountBuilder::portfolio(name, parent),
            AccountType::TaxFreePortfolio => AccountBuilder::tax_free_portfolio(name, parent),
        };

        if let Some(desc) = self.description {
            account = account.description(desc);
        }
        if let Some(code) = self.currency {
            account = account.currency(code);
        }
        if let Some(balance) = self.opening_balance {
            account = account.opening_balance(balance);
        }
        if let Some(auto) = self.auto_expense {
            account = account.auto_expense(auto.category, auto.payee);
        }
        account
    }
}

impl SecurityData {
    fn into_builder(self) -> SecurityBuilder {
        let mut security = SecurityBuilder::new(self.name, self.issuer, self.class);
        if let Some(symbol) = self.symbol {
            security = security.symbol(symbol);
        }
        if let Some(desc) = self.description {
            security = security.description(desc);
        }
        if let Some(code) = self.currency {
            security = security.currency(code);
        }
        security
    }
}

impl TransactionData {
    fn into_builder(self) -> TransactionBuilder {
        let mut tx = TransactionBuilder::new(self.date, self.category);
        if let Some(id) = self.id {
            tx = tx.id(id);
        }

        tx = match self.from {
            LegData::Account(name) => tx.from_account(name),
            LegData::Payee(name) => tx.from_payee(name),
            LegData::Holding {
                portfolio,
                security,
            } => tx.from_holding(portfolio, security),
        };
        tx = match self.to {
            LegData::Account(name) => tx.to_account(name),
            LegData::Payee(name) => tx.to_payee(name),
            LegData::Holding {
                portfolio,
                security,
            } => tx.to_holding(portfolio, security),
        };

        tx = tx.amount(self.amount);
        if let Some(amount) = self.partner_amount {
            tx = tx.partner_amount(amount);
        }
        if let Some(units) = self.units_out {
            tx = tx.units_out(units);
        }
        if let Some(units) = self.units_in {
            tx = tx.units_in(units);
        }
        if let Some(units) = self.unit_change {
            tx = tx.unit_change(units);
        }

        let tax = self.tax;
        if let Some(amount) = tax.credit {
            tx = tx.tax_credit(amount);
        }
        if let Some(amount) = tax.employer_ni {
            tx = tx.employer_ni(amount);
        }
        if let Some(amount) = tax.employee_ni {
            tx = tx.employee_ni(amount);
        }
        if let Some(amount) = tax.benefit {
            tx = tx.benefit(amount);
        }
        if let Some(amount) = tax.withheld {
            tx = tx.withheld(amount);
        }

        if let Some(cash) = self.returned_cash {
            tx = tx.returned_cash(cash.amount, cash.account);
        }
        if let Some(ratio) = self.dilution {
            tx = tx.dilution(ratio);
        }
        for tag in self.tags {
            tx = tx.tag(tag);
        }
        if self.deleted {
            tx = tx.deleted();
        }
        tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    const SALARY_YAML: &str = r#"
start: 2024-01-01
payees:
  - { name: Barclays, class: Institution }
  - { name: Acme, class: Employer }
categories:
  - { name: Salary, class: Salary }
  - { name: Living, class: Expense }
  - { name: Food, class: Expense, parent: Living }
accounts:
  - { name: Current, type: deposit, parent: Barclays, opening_balance: 500 }
transactions:
  - date: 2024-01-31
    category: Salary
    from: { payee: Acme }
    to: { account: Current }
    amount: 2500
    tax: { credit: 500 }
"#;

    #[test]
    fn test_parse_yaml() {
        let ledger = LedgerFile::from_yaml(SALARY_YAML).unwrap();
        assert_eq!(ledger.start, Some(date(2024, 1, 1)));
        assert_eq!(ledger.accounts[0].account_type, AccountType::Deposit);
        assert_eq!(ledger.accounts[0].opening_balance, Some(Decimal::from(500)));
        assert_eq!(ledger.categories[2].parent.as_deref(), Some("Living"));
        assert!(matches!(&ledger.transactions[0].from, LegData::Payee(name) if name == "Acme"));
        assert_eq!(ledger.transactions[0].tax.credit, Some(Decimal::from(500)));
    }

    #[test]
    fn test_parse_json_holding_leg() {
        let json = r#"{
            "transactions": [{
                "date": "2024-02-01",
                "category": "Transfer",
                "from": {"account": "Trading"},
                "to": {"holding": {"portfolio": "Trading", "security": "VOD"}},
                "amount": "1000",
                "units_in": "100"
            }]
        }"#;
        let ledger = LedgerFile::from_json(json).unwrap();
        let tx = &ledger.transactions[0];
        assert!(matches!(
            &tx.to,
            LegData::Holding { portfolio, security } if portfolio == "Trading" && security == "VOD"
        ));
        assert_eq!(tx.units_in, Some(Decimal::from(100)));
        assert!(!tx.deleted);
    }

    #[test]
    fn test_into_builder_resolves_names() {
        let (data, names) = LedgerFile::from_yaml(SALARY_YAML)
            .unwrap()
            .into_builder()
            .build()
            .unwrap();

        assert!(names.account_id("Current").is_some());
        assert!(names.category_id("Food").is_some());
        assert_eq!(data.transactions.len(), 1);
    }

    #[test]
    fn test_unknown_name_fails_build() {
        let yaml = r#"
accounts:
  - { name: Current, parent: Nobody }
"#;
        let result = LedgerFile::from_yaml(yaml).unwrap().into_builder().build();
        assert!(result.is_err());
    }
}
