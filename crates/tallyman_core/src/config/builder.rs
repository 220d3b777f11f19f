//! Fluent builder for analysis input data
//!
//! Entities are declared by name in any order; [`DataSetBuilder::build`]
//! assigns ids, resolves every name reference and returns the data set
//! together with the metadata needed to map ids back to names.

use std::hash::Hash;

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::error::BuildError;
use crate::model::{
    Account, AccountClass, AccountId, AutoExpense, Category, CategoryClass, CategoryId, Currency,
    CurrencyId, DataSet, DepositRate, Direction, ExchangeRate, HoldingKey, Payee, PayeeClass,
    PayeeId, Security, SecurityClass, SecurityId, SecurityPrice, Tag, TagId, Transaction,
    TransactionAsset, TransactionId,
};

use super::account_builder::{AccountBuilder, AccountType};
use super::metadata::{DataSetMetadata, NameTable};
use super::security_builder::SecurityBuilder;
use super::transaction_builder::{LegRef, TransactionBuilder};

/// Payee the builder registers for market movements
pub const MARKET_PAYEE: &str = "Market";
/// Payee the builder registers for tax and national insurance
pub const TAX_MAN_PAYEE: &str = "TaxMan";
/// Security the builder registers to collect employee NI contributions
pub const STATE_PENSION_SECURITY: &str = "State Pension";

/// Display name of the category registered for a singular class
pub fn singular_category_name(class: CategoryClass) -> &'static str {
    match class {
        CategoryClass::OpeningBalance => "Opening Balance",
        CategoryClass::TaxCredit => "Tax Credit",
        CategoryClass::EmployeeNatIns => "Employee NI",
        CategoryClass::EmployerNatIns => "Employer NI",
        CategoryClass::Benefit => "Benefit",
        CategoryClass::Withheld => "Withheld",
        CategoryClass::MarketGrowth => "Market Growth",
        CategoryClass::CurrencyFluctuation => "Currency Fluctuation",
        CategoryClass::CapitalGain => "Capital Gain",
        CategoryClass::ChargeableGain => "Chargeable Gain",
        _ => "Other",
    }
}

#[derive(Debug, Clone)]
struct PendingCategory {
    name: String,
    class: CategoryClass,
    parent: Option<String>,
}

#[derive(Debug, Clone)]
struct PendingRate {
    name: String,
    date: Date,
    rate: Decimal,
}

#[derive(Debug, Clone)]
struct PendingDepositRate {
    account: String,
    date: Date,
    rate: Decimal,
    bonus: Option<Decimal>,
    end_date: Option<Date>,
}

/// Builder for analysis input data
#[derive(Debug, Clone)]
pub struct DataSetBuilder {
    start_date: Option<Date>,
    reporting_currency: String,
    currencies: Vec<(String, u32)>,
    payees: Vec<(String, PayeeClass)>,
    categories: Vec<PendingCategory>,
    tags: Vec<String>,
    accounts: Vec<AccountBuilder>,
    securities: Vec<SecurityBuilder>,
    prices: Vec<PendingRate>,
    exchange_rates: Vec<PendingRate>,
    deposit_rates: Vec<PendingDepositRate>,
    transactions: Vec<TransactionBuilder>,
}

impl Default for DataSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSetBuilder {
    /// A builder with GBP reporting, the singular payees, the state pension
    /// and every singular category already registered
    #[must_use]
    pub fn new() -> Self {
        let categories = CategoryClass::SINGULAR
            .iter()
            .map(|&class| PendingCategory {
                name: singular_category_name(class).to_string(),
                class,
                parent: None,
            })
            .collect();
        Self {
            start_date: None,
            reporting_currency: "GBP".to_string(),
            currencies: Vec::new(),
            payees: vec![
                (MARKET_PAYEE.to_string(), PayeeClass::Market),
                (TAX_MAN_PAYEE.to_string(), PayeeClass::TaxMan),
            ],
            categories,
            tags: Vec::new(),
            accounts: Vec::new(),
            securities: vec![SecurityBuilder::new(
                STATE_PENSION_SECURITY,
                TAX_MAN_PAYEE,
                SecurityClass::StatePension,
            )],
            prices: Vec::new(),
            exchange_rates: Vec::new(),
            deposit_rates: Vec::new(),
            transactions: Vec::new(),
        }
    }

    // =========================================================================
    // Data Set Settings
    // =========================================================================

    /// Date the opening balances are booked on
    #[must_use]
    pub fn start(mut self, date: Date) -> Self {
        self.start_date = Some(date);
        self
    }

    #[must_use]
    pub fn reporting_currency(mut self, code: impl Into<String>) -> Self {
        self.reporting_currency = code.into();
        self
    }

    #[must_use]
    pub fn currency(mut self, code: impl Into<String>, minor_units: u32) -> Self {
        self.currencies.push((code.into(), minor_units));
        self
    }

    // =========================================================================
    // Entities
    // =========================================================================

    #[must_use]
    pub fn payee(mut self, name: impl Into<String>, class: PayeeClass) -> Self {
        self.payees.push((name.into(), class));
        self
    }

    #[must_use]
    pub fn category(mut self, name: impl Into<String>, class: CategoryClass) -> Self {
        self.categories.push(PendingCategory {
            name: name.into(),
            class,
            parent: None,
        });
        self
    }

    /// Category grouped under `parent` for hierarchical totals
    #[must_use]
    pub fn subcategory(
        mut self,
        name: impl Into<String>,
        class: CategoryClass,
        parent: impl Into<String>,
    ) -> Self {
        self.categories.push(PendingCategory {
            name: name.into(),
            class,
            parent: Some(parent.into()),
        });
        self
    }

    #[must_use]
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(name.into());
        self
    }

    #[must_use]
    pub fn account(mut self, account: AccountBuilder) -> Self {
        self.accounts.push(account);
        self
    }

    #[must_use]
    pub fn security(mut self, security: SecurityBuilder) -> Self {
        self.securities.push(security);
        self
    }

    // =========================================================================
    // Market Data
    // =========================================================================

    #[must_use]
    pub fn price(mut self, security: impl Into<String>, date: Date, price: Decimal) -> Self {
        self.prices.push(PendingRate {
            name: security.into(),
            date,
            rate: price,
        });
        self
    }

    /// Units of `currency` per one unit of the reporting currency
    #[must_use]
    pub fn exchange_rate(mut self, currency: impl Into<String>, date: Date, rate: Decimal) -> Self {
        self.exchange_rates.push(PendingRate {
            name: currency.into(),
            date,
            rate,
        });
        self
    }

    #[must_use]
    pub fn deposit_rate(mut self, account: impl Into<String>, date: Date, rate: Decimal) -> Self {
        self.deposit_rates.push(PendingDepositRate {
            account: account.into(),
            date,
            rate,
            bonus: None,
            end_date: None,
        });
        self
    }

    /// Fixed-term rate with an optional bonus, maturing on `end_date`
    #[must_use]
    pub fn fixed_term_rate(
        mut self,
        account: impl Into<String>,
        date: Date,
        rate: Decimal,
        bonus: Option<Decimal>,
        end_date: Date,
    ) -> Self {
        self.deposit_rates.push(PendingDepositRate {
            account: account.into(),
            date,
            rate,
            bonus,
            end_date: Some(end_date),
        });
        self
    }

    #[must_use]
    pub fn transaction(mut self, transaction: TransactionBuilder) -> Self {
        self.transactions.push(transaction);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Assign ids and resolve every name reference
    pub fn build(self) -> Result<(DataSet, DataSetMetadata), BuildError> {
        let mut metadata = DataSetMetadata::new();
        let mut data = DataSet {
            start_date: self.start_date,
            ..DataSet::default()
        };

        // Reporting currency always takes id 0
        let reporting_minor = self
            .currencies
            .iter()
            .find(|(code, _)| *code == self.reporting_currency)
            .map_or(2, |(_, minor)| *minor);
        let mut currencies = vec![(self.reporting_currency.clone(), reporting_minor)];
        currencies.extend(
            self.currencies
                .into_iter()
                .filter(|(code, _)| *code != self.reporting_currency),
        );
        for (index, (code, minor_units)) in currencies.into_iter().enumerate() {
            let id = CurrencyId(next_id(index));
            register(&mut metadata.currencies, "currency", id, &code, None)?;
            data.currencies.push(Currency {
                id,
                code,
                minor_units,
            });
        }
        data.reporting_currency = CurrencyId(0);

        for (index, (name, class)) in self.payees.into_iter().enumerate() {
            let id = PayeeId(next_id(index));
            register(&mut metadata.payees, "payee", id, &name, None)?;
            data.payees.push(Payee { id, name, class });
        }

        for (index, name) in self.tags.into_iter().enumerate() {
            let id = TagId(next_id(index));
            register(&mut metadata.tags, "tag", id, &name, None)?;
            data.tags.push(Tag { id, name });
        }

        // Categories in two passes so parents may be declared after children
        for (index, category) in self.categories.iter().enumerate() {
            let id = CategoryId(next_id(index));
            register(&mut metadata.categories, "category", id, &category.name, None)?;
        }
        for (index, category) in self.categories.into_iter().enumerate() {
            let parent = category
                .parent
                .as_deref()
                .map(|name| lookup(&metadata.categories, "category", name))
                .transpose()?;
            data.categories.push(Category {
                id: CategoryId(next_id(index)),
                name: category.name,
                class: category.class,
                parent,
            });
        }

        for (index, account) in self.accounts.into_iter().enumerate() {
            let id = AccountId(next_id(index));
            let parent = lookup(&metadata.payees, "payee", &account.parent)?;
            let currency = resolve_currency(&metadata, account.currency.as_deref())?;
            let class = match account.account_type {
                AccountType::Deposit(class) => AccountClass::Deposit(class),
                AccountType::Cash => {
                    let auto_expense = account
                        .auto_expense
                        .as_ref()
                        .map(|names| -> Result<AutoExpense, BuildError> {
                            Ok(AutoExpense {
                                category: lookup(&metadata.categories, "category", &names.category)?,
                                payee: lookup(&metadata.payees, "payee", &names.payee)?,
                            })
                        })
                        .transpose()?;
                    AccountClass::Cash { auto_expense }
                }
                AccountType::Loan => AccountClass::Loan,
                AccountType::Portfolio { tax_free } => AccountClass::Portfolio { tax_free },
            };
            register(
                &mut metadata.accounts,
                "account",
                id,
                &account.name,
                account.description,
            )?;
            data.accounts.push(Account {
                id,
                name: account.name,
                class,
                currency,
                parent,
                opening_balance: account.opening_balance,
            });
        }

        for (index, security) in self.securities.into_iter().enumerate() {
            let id = SecurityId(next_id(index));
            let parent = lookup(&metadata.payees, "payee", &security.issuer)?;
            let currency = resolve_currency(&metadata, security.currency.as_deref())?;
            register(
                &mut metadata.securities,
                "security",
                id,
                &security.name,
                security.description,
            )?;
            data.securities.push(Security {
                id,
                name: security.name,
                symbol: security.symbol,
                class: security.class,
                currency,
                parent,
            });
        }

        for price in self.prices {
            data.prices.push(SecurityPrice {
                security: lookup(&metadata.securities, "security", &price.name)?,
                date: price.date,
                price: price.rate,
            });
        }
        for rate in self.exchange_rates {
            data.exchange_rates.push(ExchangeRate {
                currency: lookup(&metadata.currencies, "currency", &rate.name)?,
                date: rate.date,
                rate: rate.rate,
            });
        }
        for rate in self.deposit_rates {
            data.deposit_rates.push(DepositRate {
                account: lookup(&metadata.accounts, "account", &rate.account)?,
                date: rate.date,
                rate: rate.rate,
                bonus: rate.bonus,
                end_date: rate.end_date,
            });
        }

        let mut next_transaction: u32 = 0;
        for builder in self.transactions {
            let id = match builder.id {
                Some(id) => {
                    next_transaction = next_transaction.max(id);
                    id
                }
                None => {
                    next_transaction += 1;
                    next_transaction
                }
            };
            data.transactions
                .push(resolve_transaction(&metadata, TransactionId(id), builder)?);
        }

        tracing::debug!(
            accounts = data.accounts.len(),
            securities = data.securities.len(),
            transactions = data.transactions.len(),
            "data set built"
        );
        Ok((data, metadata))
    }
}

fn next_id(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

fn register<Id: Copy + Hash + Eq>(
    table: &mut NameTable<Id>,
    kind: &'static str,
    id: Id,
    name: &str,
    description: Option<String>,
) -> Result<(), BuildError> {
    if table.register(id, name.to_string(), description) {
        Ok(())
    } else {
        Err(BuildError::DuplicateName {
            kind,
            name: name.to_string(),
        })
    }
}

fn lookup<Id: Copy + Hash + Eq>(
    table: &NameTable<Id>,
    kind: &'static str,
    name: &str,
) -> Result<Id, BuildError> {
    table.id(name).ok_or_else(|| BuildError::UnknownName {
        kind,
        name: name.to_string(),
    })
}

fn resolve_currency(
    metadata: &DataSetMetadata,
    code: Option<&str>,
) -> Result<CurrencyId, BuildError> {
    match code {
        Some(code) => lookup(&metadata.currencies, "currency", code),
        None => Ok(CurrencyId(0)),
    }
}

fn resolve_leg(metadata: &DataSetMetadata, leg: &LegRef) -> Result<TransactionAsset, BuildError> {
    Ok(match leg {
        LegRef::Account(name) => {
            TransactionAsset::Account(lookup(&metadata.accounts, "account", name)?)
        }
        LegRef::Holding {
            portfolio,
            security,
        } => TransactionAsset::Holding(HoldingKey::new(
            lookup(&metadata.accounts, "account", portfolio)?,
            lookup(&metadata.securities, "security", security)?,
        )),
        LegRef::Payee(name) => TransactionAsset::Payee(lookup(&metadata.payees, "payee", name)?),
    })
}

/// Store the transaction against its source leg, or against the destination
/// when the source is a payee
fn resolve_transaction(
    metadata: &DataSetMetadata,
    id: TransactionId,
    builder: TransactionBuilder,
) -> Result<Transaction, BuildError> {
    let missing = |what: &str| BuildError::UnknownName {
        kind: "leg",
        name: format!("{what} of transaction {}", id.0),
    };
    let from = builder.from.as_ref().ok_or_else(|| missing("source"))?;
    let to = builder.to.as_ref().ok_or_else(|| missing("destination"))?;
    let from_asset = resolve_leg(metadata, from)?;
    let to_asset = resolve_leg(metadata, to)?;

    let (account, partner, direction, account_units, partner_units) = if from.is_payee() {
        (
            to_asset,
            from_asset,
            Direction::From,
            builder.to_units,
            builder.from_units,
        )
    } else {
        (
            from_asset,
            to_asset,
            Direction::To,
            builder.from_units,
            builder.to_units,
        )
    };

    let (returned_cash, returned_cash_account) = match &builder.returned_cash {
        Some((amount, name)) => (
            Some(*amount),
            Some(lookup(&metadata.accounts, "account", name)?),
        ),
        None => (None, None),
    };
    let tags = builder
        .tags
        .iter()
        .map(|name| lookup(&metadata.tags, "tag", name))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Transaction {
        id,
        date: builder.date,
        account,
        partner,
        direction,
        category: lookup(&metadata.categories, "category", &builder.category)?,
        amount: builder.amount,
        partner_amount: builder.partner_amount,
        account_units,
        partner_units,
        tax_credit: builder.tax_credit,
        employer_ni: builder.employer_ni,
        employee_ni: builder.employee_ni,
        benefit: builder.benefit,
        withheld: builder.withheld,
        returned_cash,
        returned_cash_account,
        dilution: builder.dilution,
        tags,
        deleted: builder.deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn base() -> DataSetBuilder {
        DataSetBuilder::new()
            .start(date(2024, 1, 1))
            .payee("Barclays", PayeeClass::Institution)
            .payee("Acme", PayeeClass::Employer)
            .category("Salary", CategoryClass::Salary)
            .account(AccountBuilder::deposit("Current", "Barclays"))
    }

    #[test]
    fn test_singular_entities_registered() {
        let (data, metadata) = DataSetBuilder::new().build().unwrap();
        assert_eq!(data.reporting_currency, CurrencyId(0));
        assert_eq!(data.currencies[0].code, "GBP");
        assert_eq!(data.categories.len(), CategoryClass::SINGULAR.len());
        assert!(metadata.payee_id(MARKET_PAYEE).is_some());
        assert!(metadata.payee_id(TAX_MAN_PAYEE).is_some());
        assert!(metadata.category_id("Capital Gain").is_some());

        let pension = metadata.security_id(STATE_PENSION_SECURITY).unwrap();
        assert_eq!(data.securities.len(), 1);
        assert_eq!(data.securities[0].id, pension);
        assert_eq!(data.securities[0].class, SecurityClass::StatePension);
    }

    #[test]
    fn test_income_is_stored_against_the_account() {
        let (data, metadata) = base()
            .transaction(
                TransactionBuilder::new(date(2024, 1, 31), "Salary")
                    .from_payee("Acme")
                    .to_account("Current")
                    .amount(Decimal::from(2500)),
            )
            .build()
            .unwrap();
        let tx = &data.transactions[0];
        let current = metadata.account_id("Current").unwrap();
        assert_eq!(tx.id, TransactionId(1));
        assert_eq!(tx.account, TransactionAsset::Account(current));
        assert_eq!(tx.direction, Direction::From);
        assert_eq!(tx.credit(), TransactionAsset::Account(current));
        assert!(tx.debit().is_payee());
    }

    #[test]
    fn test_unknown_and_duplicate_names() {
        let unknown = base()
            .transaction(
                TransactionBuilder::new(date(2024, 1, 31), "Salary")
                    .from_payee("Nobody")
                    .to_account("Current"),
            )
            .build();
        assert_eq!(
            unknown.unwrap_err(),
            BuildError::UnknownName {
                kind: "payee",
                name: "Nobody".into()
            }
        );

        let duplicate = base().category("Salary", CategoryClass::OtherIncome).build();
        assert!(matches!(
            duplicate,
            Err(BuildError::DuplicateName { kind: "category", .. })
        ));
    }

    #[test]
    fn test_subcategory_parent_declared_later() {
        let (data, metadata) = DataSetBuilder::new()
            .subcategory("Food", CategoryClass::Expense, "Living")
            .category("Living", CategoryClass::Expense)
            .build()
            .unwrap();
        let food = metadata.category_id("Food").unwrap();
        let living = metadata.category_id("Living").unwrap();
        let category = data.categories.iter().find(|c| c.id == food).unwrap();
        assert_eq!(category.parent, Some(living));
    }

    #[test]
    fn test_reporting_currency_takes_first_id() {
        let (data, metadata) = DataSetBuilder::new()
            .currency("USD", 2)
            .currency("JPY", 0)
            .reporting_currency("JPY")
            .build()
            .unwrap();
        assert_eq!(metadata.currency_id("JPY"), Some(CurrencyId(0)));
        assert_eq!(data.currencies[0].minor_units, 0);
        assert_eq!(data.currencies.len(), 2);
    }
}
