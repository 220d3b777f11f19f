use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::error::LookupError;

use super::classes::{CategoryClass, PayeeClass, SecurityClass};
use super::data::{Account, Category, Currency, DataSet, Payee, Security, Tag};
use super::ids::{AccountId, CategoryId, CurrencyId, HoldingKey, PayeeId, SecurityId, TagId};
use super::transaction::TransactionAsset;

/// Indexed, sorted read-only view over a [`DataSet`].
///
/// Building the view sorts every event stream by date (transactions by date
/// then id), which is the precondition of an analysis pass.
#[derive(Debug, Clone)]
pub struct DataView {
    data: DataSet,
    start_date: Option<Date>,
    accounts: FxHashMap<AccountId, usize>,
    securities: FxHashMap<SecurityId, usize>,
    payees: FxHashMap<PayeeId, usize>,
    categories: FxHashMap<CategoryId, usize>,
    currencies: FxHashMap<CurrencyId, usize>,
    tags: FxHashMap<TagId, usize>,
    singular_payees: FxHashMap<PayeeClass, PayeeId>,
    singular_categories: FxHashMap<CategoryClass, CategoryId>,
    singular_securities: FxHashMap<SecurityClass, SecurityId>,
}

impl DataView {
    pub fn new(mut data: DataSet) -> Self {
        data.prices.sort_by_key(|p| p.date);
        data.exchange_rates.sort_by_key(|r| r.date);
        data.deposit_rates.sort_by_key(|r| r.date);
        data.transactions.sort_by_key(|t| (t.date, t.id));

        let start_date = data.effective_start_date();

        let accounts = index_by(&data.accounts, |a| a.id);
        let securities = index_by(&data.securities, |s| s.id);
        let payees = index_by(&data.payees, |p| p.id);
        let categories = index_by(&data.categories, |c| c.id);
        let currencies = index_by(&data.currencies, |c| c.id);
        let tags = index_by(&data.tags, |t| t.id);

        // First registration wins for singular lookups
        let mut singular_payees = FxHashMap::default();
        for payee in data.payees.iter().filter(|p| p.class.is_singular()) {
            singular_payees.entry(payee.class).or_insert(payee.id);
        }
        let mut singular_categories = FxHashMap::default();
        for category in data.categories.iter().filter(|c| c.class.is_singular()) {
            singular_categories
                .entry(category.class)
                .or_insert(category.id);
        }
        let mut singular_securities = FxHashMap::default();
        for security in data.securities.iter().filter(|s| s.class.is_singular()) {
            singular_securities
                .entry(security.class)
                .or_insert(security.id);
        }

        Self {
            data,
            start_date,
            accounts,
            securities,
            payees,
            categories,
            currencies,
            tags,
            singular_payees,
            singular_categories,
            singular_securities,
        }
    }

    pub fn data(&self) -> &DataSet {
        &self.data
    }

    pub fn start_date(&self) -> Option<Date> {
        self.start_date
    }

    pub fn reporting_currency(&self) -> CurrencyId {
        self.data.reporting_currency
    }

    pub fn account(&self, id: AccountId) -> Result<&Account, LookupError> {
        self.accounts
            .get(&id)
            .map(|&i| &self.data.accounts[i])
            .ok_or(LookupError::AccountNotFound(id))
    }

    pub fn security(&self, id: SecurityId) -> Result<&Security, LookupError> {
        self.securities
            .get(&id)
            .map(|&i| &self.data.securities[i])
            .ok_or(LookupError::SecurityNotFound(id))
    }

    pub fn payee(&self, id: PayeeId) -> Result<&Payee, LookupError> {
        self.payees
            .get(&id)
            .map(|&i| &self.data.payees[i])
            .ok_or(LookupError::PayeeNotFound(id))
    }

    pub fn category(&self, id: CategoryId) -> Result<&Category, LookupError> {
        self.categories
            .get(&id)
            .map(|&i| &self.data.categories[i])
            .ok_or(LookupError::CategoryNotFound(id))
    }

    pub fn currency(&self, id: CurrencyId) -> Result<&Currency, LookupError> {
        self.currencies
            .get(&id)
            .map(|&i| &self.data.currencies[i])
            .ok_or(LookupError::CurrencyNotFound(id))
    }

    pub fn tag(&self, id: TagId) -> Result<&Tag, LookupError> {
        self.tags
            .get(&id)
            .map(|&i| &self.data.tags[i])
            .ok_or(LookupError::TagNotFound(id))
    }

    /// Decimal places for money in `currency`, defaulting to 2 for unknown currencies
    pub fn minor_units(&self, currency: CurrencyId) -> u32 {
        self.currency(currency).map_or(2, |c| c.minor_units)
    }

    pub fn market_payee(&self) -> Result<PayeeId, LookupError> {
        self.singular_payee(PayeeClass::Market)
    }

    pub fn tax_man(&self) -> Result<PayeeId, LookupError> {
        self.singular_payee(PayeeClass::TaxMan)
    }

    pub fn singular_payee(&self, class: PayeeClass) -> Result<PayeeId, LookupError> {
        self.singular_payees
            .get(&class)
            .copied()
            .ok_or(LookupError::SingularPayeeNotFound(class))
    }

    pub fn singular_category(&self, class: CategoryClass) -> Result<CategoryId, LookupError> {
        self.singular_categories
            .get(&class)
            .copied()
            .ok_or(LookupError::SingularCategoryNotFound(class))
    }

    pub fn singular_security(&self, class: SecurityClass) -> Result<SecurityId, LookupError> {
        self.singular_securities
            .get(&class)
            .copied()
            .ok_or(LookupError::SingularSecurityNotFound(class))
    }

    pub fn state_pension(&self) -> Result<SecurityId, LookupError> {
        self.singular_security(SecurityClass::StatePension)
    }

    /// Currency an asset is denominated in; payees have none
    pub fn asset_currency(&self, asset: TransactionAsset) -> Result<Option<CurrencyId>, LookupError> {
        match asset {
            TransactionAsset::Account(id) => Ok(Some(self.account(id)?.currency)),
            TransactionAsset::Holding(key) => Ok(Some(self.security(key.security)?.currency)),
            TransactionAsset::Payee(_) => Ok(None),
        }
    }

    /// Payee that owns an account or issues a held security
    pub fn parent_payee(&self, asset: TransactionAsset) -> Result<PayeeId, LookupError> {
        match asset {
            TransactionAsset::Account(id) => Ok(self.account(id)?.parent),
            TransactionAsset::Holding(HoldingKey { security, .. }) => {
                Ok(self.security(security)?.parent)
            }
            TransactionAsset::Payee(id) => Ok(id),
        }
    }

    pub fn is_foreign(&self, currency: CurrencyId) -> bool {
        currency != self.data.reporting_currency
    }
}

fn index_by<T, K: std::hash::Hash + Eq>(items: &[T], key: impl Fn(&T) -> K) -> FxHashMap<K, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item), i))
        .collect()
}
