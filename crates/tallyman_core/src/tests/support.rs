//! Shared fixtures for the integration tests

use std::str::FromStr;

use jiff::civil::{Date, date};
use rust_decimal::Decimal;

use crate::analysis::Analysis;
use crate::bucket::{AccountValues, FlowValues, SecurityValues, TaxBasisValues};
use crate::config::{
    AccountBuilder, AnalysisConfig, DataSetBuilder, DataSetMetadata, SecurityBuilder,
    TransactionBuilder,
};
use crate::model::{CategoryClass, DataSet, HoldingKey, PayeeClass, TaxBasisClass};

pub fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn on(y: i16, m: i8, day: i8, category: &str) -> TransactionBuilder {
    TransactionBuilder::new(date(y, m, day), category)
}

/// Current and savings accounts at a bank, a taxable portfolio with 5000
/// cash and an empty ISA
pub fn household() -> DataSetBuilder {
    DataSetBuilder::new()
        .start(date(2024, 1, 1))
        .payee("Barclays", PayeeClass::Institution)
        .payee("Acme", PayeeClass::Employer)
        .payee("Vanguard", PayeeClass::Institution)
        .payee("Vodafone", PayeeClass::Institution)
        .payee("Newco", PayeeClass::Institution)
        .payee("Tesco", PayeeClass::Other)
        .category("Salary", CategoryClass::Salary)
        .category("Groceries", CategoryClass::Expense)
        .category("Transfer", CategoryClass::Transfer)
        .category("Interest", CategoryClass::Interest)
        .category("Dividend", CategoryClass::Dividend)
        .category("Split", CategoryClass::StockSplit)
        .category("Demerger", CategoryClass::StockDeMerger)
        .category("Takeover", CategoryClass::StockTakeOver)
        .category("Move Portfolio", CategoryClass::PortfolioXfer)
        .account(AccountBuilder::deposit("Current", "Barclays").opening_balance(d("500")))
        .account(AccountBuilder::savings("Savings", "Barclays"))
        .account(AccountBuilder::portfolio("Trading", "Vanguard").opening_balance(d("5000")))
        .account(AccountBuilder::tax_free_portfolio("ISA", "Vanguard"))
        .security(SecurityBuilder::shares("VOD", "Vodafone"))
        .security(SecurityBuilder::shares("NEWCO", "Newco"))
}

/// Household with 100 VOD bought at 10 in the taxable portfolio
pub fn invested() -> DataSetBuilder {
    household().price("VOD", date(2024, 1, 1), d("10")).transaction(
        on(2024, 1, 10, "Transfer")
            .from_account("Trading")
            .to_holding("Trading", "VOD")
            .amount(d("1000"))
            .units_in(d("100")),
    )
}

/// An analysis with the names it was built from
pub struct Ledger {
    pub data: DataSet,
    pub names: DataSetMetadata,
    pub analysis: Analysis,
}

impl Ledger {
    pub fn run(builder: DataSetBuilder) -> Self {
        let (data, names) = builder.build().unwrap();
        let analysis = Analysis::run(data.clone(), &AnalysisConfig::default()).unwrap();
        Self {
            data,
            names,
            analysis,
        }
    }

    pub fn dated(&self, date: Date) -> Analysis {
        self.analysis.dated(date)
    }

    pub fn account(&self, name: &str) -> AccountValues {
        account(&self.analysis, &self.names, name)
    }

    pub fn holding(&self, portfolio: &str, security: &str) -> SecurityValues {
        holding(&self.analysis, &self.names, portfolio, security)
    }

    pub fn payee(&self, name: &str) -> FlowValues {
        let id = self.names.payee_id(name).unwrap();
        self.analysis
            .payees()
            .get(id)
            .map(|b| *b.values())
            .unwrap_or_default()
    }

    pub fn category(&self, name: &str) -> FlowValues {
        let id = self.names.category_id(name).unwrap();
        self.analysis
            .categories()
            .get(id)
            .map(|b| *b.values())
            .unwrap_or_default()
    }

    pub fn tax_basis(&self, class: TaxBasisClass) -> TaxBasisValues {
        self.analysis
            .tax_bases()
            .get(class)
            .map(|b| *b.values())
            .unwrap_or_default()
    }
}

pub fn account(analysis: &Analysis, names: &DataSetMetadata, name: &str) -> AccountValues {
    let id = names.account_id(name).unwrap();
    analysis
        .accounts()
        .get(id)
        .map(|b| b.values().clone())
        .unwrap_or_default()
}

pub fn holding(
    analysis: &Analysis,
    names: &DataSetMetadata,
    portfolio: &str,
    security: &str,
) -> SecurityValues {
    let key = HoldingKey::new(
        names.account_id(portfolio).unwrap(),
        names.security_id(security).unwrap(),
    );
    analysis
        .holdings()
        .get(key)
        .map(|b| b.values().clone())
        .unwrap_or_default()
}

/// Every dimension sums to the same change
pub fn assert_reconciles(analysis: &Analysis) {
    let report = analysis.consistency().unwrap();
    assert!(report.is_consistent(), "{:?}", report.warning);
}
