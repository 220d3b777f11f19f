use std::fmt;

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::model::{
    AccountId, CategoryClass, CategoryId, CurrencyId, PayeeClass, PayeeId, SecurityClass,
    SecurityId, TagId, TransactionId,
};

/// Errors related to entity lookups in the input data
#[derive(Debug, Clone, PartialEq)]
pub enum LookupError {
    AccountNotFound(AccountId),
    SecurityNotFound(SecurityId),
    PayeeNotFound(PayeeId),
    CategoryNotFound(CategoryId),
    CurrencyNotFound(CurrencyId),
    TagNotFound(TagId),
    /// A singular payee (Market, TaxMan) is not registered
    SingularPayeeNotFound(PayeeClass),
    /// A singular auto-booking category is not registered
    SingularCategoryNotFound(CategoryClass),
    /// A singular security (the state pension) is not registered
    SingularSecurityNotFound(SecurityClass),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::AccountNotFound(id) => write!(f, "account {id:?} not found"),
            LookupError::SecurityNotFound(id) => write!(f, "security {id:?} not found"),
            LookupError::PayeeNotFound(id) => write!(f, "payee {id:?} not found"),
            LookupError::CategoryNotFound(id) => write!(f, "category {id:?} not found"),
            LookupError::CurrencyNotFound(id) => write!(f, "currency {id:?} not found"),
            LookupError::TagNotFound(id) => write!(f, "tag {id:?} not found"),
            LookupError::SingularPayeeNotFound(class) => {
                write!(f, "no {class:?} payee is registered")
            }
            LookupError::SingularCategoryNotFound(class) => {
                write!(f, "no {class:?} category is registered")
            }
            LookupError::SingularSecurityNotFound(class) => {
                write!(f, "no {class:?} security is registered")
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Errors related to currency conversion
#[derive(Debug, Clone, PartialEq)]
pub enum CurrencyError {
    MissingExchangeRate { currency: CurrencyId, date: Date },
    NonPositiveExchangeRate { currency: CurrencyId, rate: Decimal },
}

impl fmt::Display for CurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyError::MissingExchangeRate { currency, date } => {
                write!(f, "no exchange rate for currency {currency:?} on {date}")
            }
            CurrencyError::NonPositiveExchangeRate { currency, rate } => {
                write!(f, "exchange rate {rate} for currency {currency:?} is not positive")
            }
        }
    }
}

impl std::error::Error for CurrencyError {}

/// Fatal errors that abort an analysis pass.
///
/// These indicate malformed input data; a failed pass publishes nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    Lookup(LookupError),
    Currency(CurrencyError),
    /// The debit/credit pair cannot be processed for this category
    InvalidAssetPair {
        transaction: TransactionId,
        class: CategoryClass,
    },
    /// Category class has no entry in the tax mapping table
    UnmappedCategoryClass {
        transaction: TransactionId,
        class: CategoryClass,
    },
    /// A transaction needs a singular security that the data set lacks
    MissingSingular {
        transaction: TransactionId,
        class: SecurityClass,
    },
    /// Tax credit, NI, benefit or withheld amounts without a payee or tax basis
    TaxItemsWithoutContext { transaction: TransactionId },
    /// A corporate action lacks an asset or detail it needs
    MissingSecondaryAsset {
        transaction: TransactionId,
        what: &'static str,
    },
    /// A disposal removes more units than the holding has
    InsufficientUnits {
        transaction: TransactionId,
        held: Decimal,
        requested: Decimal,
    },
    InvalidRange { start: Date, end: Date },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Lookup(e) => write!(f, "{e}"),
            AnalysisError::Currency(e) => write!(f, "{e}"),
            AnalysisError::InvalidAssetPair { transaction, class } => {
                write!(
                    f,
                    "transaction {transaction:?}: invalid asset pair for {class:?}"
                )
            }
            AnalysisError::UnmappedCategoryClass { transaction, class } => {
                write!(
                    f,
                    "transaction {transaction:?}: category class {class:?} has no tax mapping"
                )
            }
            AnalysisError::MissingSingular { transaction, class } => {
                write!(f, "transaction {transaction:?}: no {class:?} security is registered")
            }
            AnalysisError::TaxItemsWithoutContext { transaction } => {
                write!(
                    f,
                    "transaction {transaction:?}: tax items present without a payee or tax basis"
                )
            }
            AnalysisError::MissingSecondaryAsset { transaction, what } => {
                write!(f, "transaction {transaction:?}: missing {what}")
            }
            AnalysisError::InsufficientUnits {
                transaction,
                held,
                requested,
            } => {
                write!(
                    f,
                    "transaction {transaction:?}: cannot remove {requested} units, only {held} held"
                )
            }
            AnalysisError::InvalidRange { start, end } => {
                write!(f, "invalid date range: {start} is after {end}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Lookup(e) => Some(e),
            AnalysisError::Currency(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LookupError> for AnalysisError {
    fn from(e: LookupError) -> Self {
        AnalysisError::Lookup(e)
    }
}

impl From<CurrencyError> for AnalysisError {
    fn from(e: CurrencyError) -> Self {
        AnalysisError::Currency(e)
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Non-fatal mismatch between the reconciled dimensions of an analysis
#[derive(Debug, Clone, PartialEq)]
pub struct DataIntegrityWarning {
    pub accounts: Decimal,
    pub payees: Decimal,
    pub categories: Decimal,
    pub tax_bases: Decimal,
}

impl fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "totals do not reconcile: accounts={}, payees={}, categories={}, tax bases={}",
            self.accounts, self.payees, self.categories, self.tax_bases
        )
    }
}

impl std::error::Error for DataIntegrityWarning {}

/// Errors raised while resolving names in the builder DSL
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    UnknownName { kind: &'static str, name: String },
    DuplicateName { kind: &'static str, name: String },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnknownName { kind, name } => write!(f, "unknown {kind} '{name}'"),
            BuildError::DuplicateName { kind, name } => {
                write!(f, "{kind} '{name}' registered twice")
            }
        }
    }
}

impl std::error::Error for BuildError {}
