//! Transaction classification
//!
//! Resolves the debit and credit legs of a raw transaction, substitutes
//! parent payees, narrows generic interest and dividend classes and decides
//! which processor handles the transaction.

use rust_decimal::Decimal;

use crate::error::{AnalysisError, Result};
use crate::model::{
    AccountKind, CategoryClass, CategoryId, DataView, DepositClass, Direction, HoldingKey, PayeeId,
    SecurityClass, TaxBasisClass, TaxMapping, Transaction, TransactionAsset, TransactionId,
    tax_basis_for,
};

use super::state::AnalysisState;

/// Tax and national insurance amounts deducted at source, in the account currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TaxItems {
    pub tax_credit: Decimal,
    pub employee_ni: Decimal,
    pub employer_ni: Decimal,
    pub benefit: Decimal,
    pub withheld: Decimal,
}

impl TaxItems {
    fn from_transaction(tx: &Transaction) -> Self {
        Self {
            tax_credit: tx.tax_credit.unwrap_or_default(),
            employee_ni: tx.employee_ni.unwrap_or_default(),
            employer_ni: tx.employer_ni.unwrap_or_default(),
            benefit: tx.benefit.unwrap_or_default(),
            withheld: tx.withheld.unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tax_credit.is_zero()
            && self.employee_ni.is_zero()
            && self.employer_ni.is_zero()
            && self.benefit.is_zero()
            && self.withheld.is_zero()
    }
}

/// Processor a transaction is handed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Route {
    /// Accounts and payees only
    Standard,
    /// At least one leg is a security holding
    Security,
    PortfolioTransfer,
}

/// A transaction with resolved legs, amounts and treatment
#[derive(Debug, Clone)]
pub(crate) struct ClassifiedTransaction<'a> {
    pub transaction: &'a Transaction,
    pub category: CategoryId,
    pub class: CategoryClass,
    pub basis: Option<TaxBasisClass>,
    pub debit: TransactionAsset,
    pub credit: TransactionAsset,
    /// Asset replaced by its parent payee
    pub child: Option<TransactionAsset>,
    /// Signed amount leaving the debit leg, in its own currency
    pub debit_amount: Decimal,
    /// Amount arriving on the credit leg, in its own currency
    pub credit_amount: Decimal,
    /// Reporting-currency value of the transaction
    pub local: Decimal,
    pub tax: TaxItems,
    pub route: Route,
}

impl ClassifiedTransaction<'_> {
    pub fn id(&self) -> TransactionId {
        self.transaction.id
    }

    /// The payee leg, if any
    pub fn payee(&self) -> Option<PayeeId> {
        self.debit.as_payee().or_else(|| self.credit.as_payee())
    }

    /// Money coming to us from a payee is positive, money paid to one negative
    pub fn profit(&self) -> Decimal {
        if self.debit.is_payee() {
            self.local
        } else if self.credit.is_payee() {
            -self.local
        } else {
            Decimal::ZERO
        }
    }

    /// Holding a dividend or distribution originates from
    pub fn source_holding(&self) -> Option<HoldingKey> {
        self.child
            .and_then(|c| c.as_holding())
            .or_else(|| self.debit.as_holding())
    }

    pub(crate) fn invalid_pair(&self) -> AnalysisError {
        AnalysisError::InvalidAssetPair {
            transaction: self.id(),
            class: self.class,
        }
    }

    pub(crate) fn missing(&self, what: &'static str) -> AnalysisError {
        AnalysisError::MissingSecondaryAsset {
            transaction: self.id(),
            what,
        }
    }
}

/// Classify `tx`, converting its amount at today's rates
pub(crate) fn classify<'a>(
    state: &mut AnalysisState<'_>,
    tx: &'a Transaction,
) -> Result<ClassifiedTransaction<'a>> {
    let data = state.data;
    let category = data.category(tx.category)?;
    let declared = category.class;
    let invalid = || AnalysisError::InvalidAssetPair {
        transaction: tx.id,
        class: declared,
    };

    if tx.account.is_payee() {
        return Err(invalid());
    }
    if declared.is_totals() {
        return Err(AnalysisError::UnmappedCategoryClass {
            transaction: tx.id,
            class: declared,
        });
    }

    let (mut debit, mut credit) = (tx.debit(), tx.credit());
    let mut child = None;
    if declared.needs_parent_substitution() {
        if declared.is_income() {
            if !debit.is_payee() {
                child = Some(debit);
                debit = TransactionAsset::Payee(data.parent_payee(debit)?);
            }
        } else if !credit.is_payee() {
            child = Some(credit);
            credit = TransactionAsset::Payee(data.parent_payee(credit)?);
        }
    }

    for payee in [debit.as_payee(), credit.as_payee()].into_iter().flatten() {
        data.payee(payee)?;
    }

    let payee_legs = usize::from(debit.is_payee()) + usize::from(credit.is_payee());
    let pair_ok = if declared.is_transfer() {
        payee_legs == 0
    } else {
        payee_legs == 1
    };
    if !pair_ok {
        return Err(invalid());
    }

    let class = resolve_class(data, declared, child, credit)?;
    let basis = match tax_basis_for(class) {
        TaxMapping::Basis(basis) => Some(basis),
        TaxMapping::NoEffect => None,
        TaxMapping::Unmapped => {
            return Err(AnalysisError::UnmappedCategoryClass {
                transaction: tx.id,
                class,
            });
        }
    };

    let route = if class == CategoryClass::PortfolioXfer {
        let is_portfolio = |asset: TransactionAsset| -> Result<bool> {
            Ok(match asset {
                TransactionAsset::Account(id) => data.account(id)?.kind() == AccountKind::Portfolio,
                _ => false,
            })
        };
        if !is_portfolio(debit)? || !is_portfolio(credit)? {
            return Err(invalid());
        }
        Route::PortfolioTransfer
    } else if debit.is_holding()
        || credit.is_holding()
        || child.is_some_and(|c| c.is_holding())
    {
        Route::Security
    } else {
        Route::Standard
    };

    let (debit_amount, credit_amount) = match tx.direction {
        Direction::To => (-tx.amount, tx.partner_value()),
        Direction::From => (-tx.partner_value(), tx.amount),
    };
    let local = local_amount(state, tx)?;

    Ok(ClassifiedTransaction {
        transaction: tx,
        category: tx.category,
        class,
        basis,
        debit,
        credit,
        child,
        debit_amount,
        credit_amount,
        local,
        tax: TaxItems::from_transaction(tx),
        route,
    })
}

/// Reporting-currency value of a transaction.
///
/// Uses the account leg unless the account is foreign and the partner is
/// already in the reporting currency.
fn local_amount(state: &mut AnalysisState<'_>, tx: &Transaction) -> Result<Decimal> {
    let data = state.data;
    let Some(account_currency) = data.asset_currency(tx.account)? else {
        return Ok(Decimal::ZERO);
    };
    if data.is_foreign(account_currency)
        && let Some(partner_currency) = data.asset_currency(tx.partner)?
        && !data.is_foreign(partner_currency)
    {
        return state.to_local(tx.partner_value(), partner_currency);
    }
    state.to_local(tx.amount, account_currency)
}

/// Narrow generic interest, dividend and loyalty classes by the account or
/// security involved.
fn resolve_class(
    data: &DataView,
    class: CategoryClass,
    child: Option<TransactionAsset>,
    credit: TransactionAsset,
) -> Result<CategoryClass> {
    let target = child.unwrap_or(credit);
    let resolved = match class {
        CategoryClass::Interest => match target {
            TransactionAsset::Account(id) => {
                let account = data.account(id)?;
                match account.deposit_class() {
                    Some(deposit) if deposit.is_tax_free() => CategoryClass::TaxFreeInterest,
                    Some(DepositClass::GrossSavings) => CategoryClass::GrossInterest,
                    Some(DepositClass::PeerToPeer) => {
                        CategoryClass::PeerToPeerInterest
                    }
                    None if account.is_tax_free() => CategoryClass::TaxFreeInterest,
                    _ => CategoryClass::TaxedInterest,
                }
            }
            TransactionAsset::Holding(key) if data.account(key.portfolio)?.is_tax_free() => {
                CategoryClass::TaxFreeInterest
            }
            _ => CategoryClass::TaxedInterest,
        },
        CategoryClass::Dividend => {
            let holding = child
                .and_then(|c| c.as_holding())
                .or_else(|| credit.as_holding());
            match holding {
                Some(key) => dividend_class(data, key)?,
                None => match credit.as_account() {
                    Some(id) if data.account(id)?.is_tax_free() => CategoryClass::TaxFreeDividend,
                    _ => CategoryClass::ShareDividend,
                },
            }
        }
        CategoryClass::LoyaltyBonus => {
            let tax_free = match target {
                TransactionAsset::Account(id) => data.account(id)?.is_tax_free(),
                TransactionAsset::Holding(key) => data.account(key.portfolio)?.is_tax_free(),
                TransactionAsset::Payee(_) => false,
            };
            if tax_free {
                CategoryClass::TaxFreeLoyaltyBonus
            } else {
                CategoryClass::LoyaltyBonus
            }
        }
        other => other,
    };
    Ok(resolved)
}

fn dividend_class(data: &DataView, key: HoldingKey) -> Result<CategoryClass> {
    if data.account(key.portfolio)?.is_tax_free() {
        return Ok(CategoryClass::TaxFreeDividend);
    }
    let security = data.security(key.security)?;
    Ok(if security.class == SecurityClass::UnitTrust {
        CategoryClass::UnitTrustDividend
    } else if data.is_foreign(security.currency) {
        CategoryClass::ForeignDividend
    } else {
        CategoryClass::ShareDividend
    })
}
