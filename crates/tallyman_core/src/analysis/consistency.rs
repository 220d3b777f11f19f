//! Cross-dimension reconciliation
//!
//! Every booking has a counterpart in the account valuations, so the change
//! of all accounts must equal the profit of all payees, the profit of all
//! categories and the gross of all tax bases.

use rust_decimal::Decimal;

use crate::error::DataIntegrityWarning;

use super::totals::Totals;

/// Outcome of comparing the reconciled dimensions
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    pub accounts: Decimal,
    pub payees: Decimal,
    pub categories: Decimal,
    pub tax_bases: Decimal,
    pub warning: Option<DataIntegrityWarning>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.warning.is_none()
    }
}

pub(crate) fn check(totals: &Totals) -> ConsistencyReport {
    let accounts = totals.accounts.total().delta;
    let payees = totals.payees.profit();
    let categories = totals.categories.profit();
    let tax_bases = totals.tax_bases.gross;

    let consistent = accounts == payees && payees == categories && categories == tax_bases;
    let warning = (!consistent).then_some(DataIntegrityWarning {
        accounts,
        payees,
        categories,
        tax_bases,
    });

    ConsistencyReport {
        accounts,
        payees,
        categories,
        tax_bases,
        warning,
    }
}
