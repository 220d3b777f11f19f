//! Transaction dispatch
//!
//! Every transaction is classified, handed to the processor for its route
//! and then booked against its payee, category, tax basis and tags.

use rust_decimal::Decimal;

use crate::bucket::AccountStrategy;
use crate::error::Result;
use crate::model::{AccountId, AutoExpense, TaxBasisClass, Transaction, TransactionAsset};

use super::classify::{ClassifiedTransaction, Route, classify};
use super::state::AnalysisState;
use super::{security, tax};

pub(crate) fn process_transaction(state: &mut AnalysisState<'_>, tx: &Transaction) -> Result<()> {
    let classified = classify(state, tx)?;

    tracing::debug!(
        transaction = tx.id.0,
        date = %tx.date,
        class = ?classified.class,
        route = ?classified.route,
        local = %classified.local,
        "processing transaction"
    );

    match classified.route {
        Route::Standard => apply_standard(state, &classified)?,
        Route::Security => security::process(state, &classified)?,
        Route::PortfolioTransfer => security::portfolio_transfer(state, &classified)?,
    }

    book_payee(state, &classified);
    book_category(state, &classified);
    tax::book(state, &classified)?;
    book_tags(state, &classified)?;
    Ok(())
}

/// Accounts and payees only: each account leg takes its share of the money
fn apply_standard(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    apply_leg(state, c, c.debit, c.debit_amount, -c.local)?;
    apply_leg(state, c, c.credit, c.credit_amount, c.local)
}

fn apply_leg(
    state: &mut AnalysisState<'_>,
    c: &ClassifiedTransaction<'_>,
    asset: TransactionAsset,
    native: Decimal,
    local: Decimal,
) -> Result<()> {
    match asset {
        TransactionAsset::Account(id) => apply_account_leg(state, c, id, native, local),
        TransactionAsset::Payee(_) => Ok(()),
        TransactionAsset::Holding(_) => Err(c.invalid_pair()),
    }
}

/// Book one account leg. `local` is signed like `native`: positive when
/// money arrives in the account.
pub(crate) fn apply_account_leg(
    state: &mut AnalysisState<'_>,
    c: &ClassifiedTransaction<'_>,
    id: AccountId,
    native: Decimal,
    local: Decimal,
) -> Result<()> {
    let data = state.data;
    let strategy = AccountStrategy::for_account(data.account(id)?);

    if c.class.is_transfer()
        && let Some(auto) = strategy.auto_expense
    {
        book_auto_expense(state, c, auto, local)?;
        return Ok(());
    }

    if strategy.tracks_bad_debt && c.class.is_bad_debt() {
        state.account(id).bad_debt -= local;
    }
    state.apply_account_flow(id, native, local)
}

/// Money moved into an auto-expense cash account is spent on arrival
fn book_auto_expense(
    state: &mut AnalysisState<'_>,
    c: &ClassifiedTransaction<'_>,
    auto: AutoExpense,
    signed_in: Decimal,
) -> Result<()> {
    let data = state.data;
    data.payee(auto.payee)?;
    data.category(auto.category)?;

    state.payee(auto.payee).expense += signed_in;
    state.category(auto.category).expense += signed_in;
    state.tax_basis(TaxBasisClass::Expense).book(-signed_in);
    for &tag in &c.transaction.tags {
        state.tag(tag).flow.expense += signed_in;
    }
    Ok(())
}

fn book_payee(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) {
    if let Some(payee) = c.payee() {
        state
            .payee(payee)
            .book_by_nature(c.class.is_income(), c.profit());
    }
}

fn book_category(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) {
    state
        .category(c.category)
        .book_by_nature(c.class.is_income(), c.profit());
}

fn book_tags(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    let data = state.data;
    for &tag in &c.transaction.tags {
        data.tag(tag)?;
        let values = state.tag(tag);
        values.transactions += 1;
        values.flow.book_by_nature(c.class.is_income(), c.profit());
    }
    Ok(())
}
