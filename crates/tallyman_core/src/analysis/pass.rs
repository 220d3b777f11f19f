//! The chronological analysis pass

use std::time::Instant;

use crate::config::AnalysisConfig;
use crate::cursor::EventCursor;
use crate::error::Result;
use crate::metrics::AnalysisMetrics;
use crate::model::{
    AccountId, CategoryClass, DataView, DepositRate, Event, EventId, ExchangeRate, HoldingKey,
    SecurityPrice, TaxBasisClass,
};

use super::Buckets;
use super::dispatch::process_transaction;
use super::state::AnalysisState;

/// Run every event of `data` through the processors.
///
/// The first error aborts the pass; nothing built so far is returned.
pub(crate) fn run_pass(
    data: &DataView,
    config: &AnalysisConfig,
) -> Result<(Buckets, AnalysisMetrics)> {
    let started = Instant::now();
    let mut state = AnalysisState::new(data, config);
    let mut cursor = EventCursor::new(data.data(), data.start_date());

    tracing::info!(
        transactions = data.data().transactions.len(),
        accounts = data.data().accounts.len(),
        start = ?data.start_date(),
        "analysis pass starting"
    );

    let mut next_id: u32 = 0;
    while let Some(event) = cursor.next_event() {
        next_id += 1;
        state.begin_event(EventId(next_id), &event);
        state.metrics.record_event(event.kind(), event.date());

        match event {
            Event::SecurityPrice(price) => on_price(&mut state, price)?,
            Event::ExchangeRate(rate) => on_exchange_rate(&mut state, rate)?,
            Event::DepositRate(rate) => on_deposit_rate(&mut state, rate)?,
            Event::OpeningBalance(_) => on_opening_balance(&mut state)?,
            Event::Transaction(tx) => process_transaction(&mut state, tx)?,
        }
        state.finish_event()?;
    }
    state.metrics.transactions_skipped = cursor.skipped() as u64;

    let (buckets, metrics) = state.into_parts();
    tracing::info!(
        events = metrics.events(),
        transactions = metrics.transactions,
        skipped = metrics.transactions_skipped,
        snapshots = metrics.snapshots,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "analysis pass finished"
    );
    Ok((buckets, metrics))
}

/// Revalue every holding of the security that still has units
fn on_price(state: &mut AnalysisState<'_>, price: &SecurityPrice) -> Result<()> {
    let keys: Vec<HoldingKey> = state
        .buckets
        .holdings
        .iter()
        .filter(|b| b.key().security == price.security && !b.values().units.is_zero())
        .map(|b| b.key())
        .collect();
    tracing::debug!(
        security = price.security.0,
        date = %price.date,
        price = %price.price,
        holdings = keys.len(),
        "security price"
    );
    for key in keys {
        state.revalue_holding(key)?;
    }
    Ok(())
}

/// Revalue every account and active holding denominated in the currency
fn on_exchange_rate(state: &mut AnalysisState<'_>, rate: &ExchangeRate) -> Result<()> {
    let data = state.data;
    let mut accounts: Vec<AccountId> = Vec::new();
    for id in state.buckets.accounts.keys() {
        if data.account(id)?.currency == rate.currency {
            accounts.push(id);
        }
    }
    let mut holdings: Vec<HoldingKey> = Vec::new();
    for bucket in state.buckets.holdings.iter() {
        if bucket.values().is_active()
            && data.security(bucket.key().security)?.currency == rate.currency
        {
            holdings.push(bucket.key());
        }
    }

    tracing::debug!(
        currency = rate.currency.0,
        date = %rate.date,
        rate = %rate.rate,
        accounts = accounts.len(),
        holdings = holdings.len(),
        "exchange rate"
    );
    for id in accounts {
        state.revalue_account(id)?;
    }
    for key in holdings {
        state.revalue_holding(key)?;
    }
    Ok(())
}

fn on_deposit_rate(state: &mut AnalysisState<'_>, rate: &DepositRate) -> Result<()> {
    tracing::debug!(
        account = rate.account.0,
        date = %rate.date,
        rate = %rate.rate,
        "deposit rate"
    );
    state.apply_deposit_terms(rate.account)
}

/// Book each account's opening balance against its parent payee
fn on_opening_balance(state: &mut AnalysisState<'_>) -> Result<()> {
    let data = state.data;
    let mut accounts: Vec<_> = data
        .data()
        .accounts
        .iter()
        .filter(|a| !a.opening_balance.is_zero())
        .collect();
    accounts.sort_by_key(|a| a.id);
    if accounts.is_empty() {
        return Ok(());
    }
    let category = data.singular_category(CategoryClass::OpeningBalance)?;

    for account in &accounts {
        data.payee(account.parent)?;
        let local = state.to_local(account.opening_balance, account.currency)?;
        state.apply_account_flow(account.id, account.opening_balance, local)?;
        state.payee(account.parent).book_by_nature(true, local);
        state.category(category).book_by_nature(true, local);
        state.tax_basis(TaxBasisClass::Virtual).book(local);
    }
    tracing::debug!(
        date = %state.date(),
        accounts = accounts.len(),
        "opening balances"
    );
    Ok(())
}
