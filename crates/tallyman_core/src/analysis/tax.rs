//! Tax basis booking
//!
//! The main booking adds a transaction's profit to the tax basis its
//! category maps onto. Amounts deducted at source are then threaded through
//! the payee, category and tax basis dimensions as matching income and
//! expense entries, so each dimension still sums to the same profit.

use rust_decimal::Decimal;

use crate::error::{AnalysisError, Result};
use crate::model::{CategoryClass, CategoryId, PayeeId, SecurityClass, TaxBasisClass};

use super::classify::ClassifiedTransaction;
use super::state::AnalysisState;

/// One side of a deduction
#[derive(Debug, Clone, Copy)]
struct Side {
    payee: PayeeId,
    category: CategoryId,
    basis: TaxBasisClass,
}

pub(crate) fn book(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    if let Some(basis) = c.basis {
        state.tax_basis(basis).book(c.profit());
    }
    if c.tax.is_empty() {
        return Ok(());
    }

    // Deductions only make sense on income received from a payee
    let (Some(payee), Some(basis)) = (c.debit.as_payee(), c.basis) else {
        return Err(AnalysisError::TaxItemsWithoutContext {
            transaction: c.id(),
        });
    };

    let data = state.data;
    let currency = data
        .asset_currency(c.transaction.account)?
        .unwrap_or_else(|| data.reporting_currency());
    let tax_man = data.tax_man()?;
    let category = |class| data.singular_category(class);

    let income = Side {
        payee,
        category: c.category,
        basis,
    };

    let tax_credit = state.to_local(c.tax.tax_credit, currency)?;
    if !tax_credit.is_zero() {
        let paid = Side {
            payee: tax_man,
            category: category(CategoryClass::TaxCredit)?,
            basis: TaxBasisClass::TaxPaid,
        };
        thread(state, income, paid, tax_credit);
        state.tax_basis(basis).tax_credit += tax_credit;
    }

    let employee_ni = state.to_local(c.tax.employee_ni, currency)?;
    if !employee_ni.is_zero() {
        let pension = data
            .state_pension()
            .map_err(|_| AnalysisError::MissingSingular {
                transaction: c.id(),
                class: SecurityClass::StatePension,
            })?;
        let paid = Side {
            payee: tax_man,
            category: category(CategoryClass::EmployeeNatIns)?,
            basis: TaxBasisClass::TaxPaid,
        };
        thread(state, income, paid, employee_ni);

        // Entitlement only; the contribution itself is spent with the TaxMan
        let start = state.date();
        let contribution = state.pension(pension);
        contribution.funded += employee_ni;
        contribution.invested += employee_ni;
        contribution.start_date.get_or_insert(start);
    }

    let employer_ni = state.to_local(c.tax.employer_ni, currency)?;
    if !employer_ni.is_zero() {
        let ni = category(CategoryClass::EmployerNatIns)?;
        let source = Side {
            payee,
            category: ni,
            basis: TaxBasisClass::Virtual,
        };
        let paid = Side {
            payee: tax_man,
            category: ni,
            basis: TaxBasisClass::TaxPaid,
        };
        thread(state, source, paid, employer_ni);
    }

    let benefit = state.to_local(c.tax.benefit, currency)?;
    if !benefit.is_zero() {
        let benefits = category(CategoryClass::Benefit)?;
        let source = Side {
            payee,
            category: benefits,
            basis,
        };
        let spent = Side {
            payee,
            category: benefits,
            basis: TaxBasisClass::Expense,
        };
        thread(state, source, spent, benefit);
    }

    let withheld = state.to_local(c.tax.withheld, currency)?;
    if !withheld.is_zero() {
        let spent = Side {
            payee,
            category: category(CategoryClass::Withheld)?,
            basis: TaxBasisClass::Expense,
        };
        thread(state, income, spent, withheld);
    }

    Ok(())
}

/// Book `amount` as income on `source` and as expense on `target`
fn thread(state: &mut AnalysisState<'_>, source: Side, target: Side, amount: Decimal) {
    state.payee(source.payee).income += amount;
    state.category(source.category).income += amount;
    state.tax_basis(source.basis).gross += amount;

    state.payee(target.payee).expense += amount;
    state.category(target.category).expense += amount;
    state.tax_basis(target.basis).gross -= amount;
}
