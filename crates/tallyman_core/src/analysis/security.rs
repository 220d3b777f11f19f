//! Security and corporate-action processing
//!
//! Tracks units, residual cost, realised gains and invested cash per
//! holding. Every path revalues the holdings it changes; the market growth
//! the changes imply is derived when the event finishes.

use rust_decimal::Decimal;

use crate::error::{AnalysisError, Result};
use crate::model::{CategoryClass, HoldingKey, TransactionAsset};
use crate::money::{convert, convert_back, round_money};

use super::classify::ClassifiedTransaction;
use super::dispatch::apply_account_leg;
use super::gains::{allowed_cost, classify_cash, slice_gain, unit_cost_fraction};
use super::state::AnalysisState;

pub(crate) fn process(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    match c.class {
        class if class.is_dividend() => dividend(state, c),
        CategoryClass::StockSplit | CategoryClass::UnitsAdjust => adjust_units(state, c),
        CategoryClass::StockDeMerger => demerger(state, c),
        CategoryClass::StockTakeOver => takeover(state, c),
        _ => transfer(state, c),
    }
}

// =============================================================================
// Transfers
// =============================================================================

/// Money in or out of a holding, or a switch between two holdings
fn transfer(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    let tx = c.transaction;
    match (c.debit, c.credit) {
        (TransactionAsset::Holding(from), TransactionAsset::Holding(to)) => {
            transfer_out(state, c, from, c.local, tx.debit_units())?;
            transfer_in(state, to, c.local, tx.credit_units())
        }
        (TransactionAsset::Holding(from), other) => {
            transfer_out(state, c, from, c.local, tx.debit_units())?;
            apply_other_leg(state, c, other, c.credit_amount, c.local)
        }
        (other, TransactionAsset::Holding(to)) => {
            apply_other_leg(state, c, other, c.debit_amount, -c.local)?;
            transfer_in(state, to, c.local, tx.credit_units())
        }
        _ => Err(c.invalid_pair()),
    }
}

fn apply_other_leg(
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

/// Invest `local` in a holding, buying `units` when known
pub(crate) fn transfer_in(
    state: &mut AnalysisState<'_>,
    key: HoldingKey,
    local: Decimal,
    units: Option<Decimal>,
) -> Result<()> {
    let date = state.date();
    let holding = state.holding(key);
    holding.invested += local;
    match units.filter(|u| !u.is_zero()) {
        Some(units) => {
            holding.residual_cost += local;
            holding.units += units;
        }
        None => holding.funded += local,
    }
    holding.start_date.get_or_insert(date);
    state.revalue_holding(key)
}

/// Take `cash` out of a holding, allowing cost against it and realising the gain.
///
/// With a known unit change the cost of the units sold is allowed. Without
/// one the cash is a capital distribution and the large/small cash rule
/// decides the cost allowed.
pub(crate) fn transfer_out(
    state: &mut AnalysisState<'_>,
    c: &ClassifiedTransaction<'_>,
    key: HoldingKey,
    cash: Decimal,
    units: Option<Decimal>,
) -> Result<()> {
    state.revalue_holding(key)?;
    let minor = state.reporting_minor_units();
    let rules = state.config.gains;

    let holding = state.holding(key);
    let cost = holding.residual_cost;
    let allowed = match units.filter(|u| !u.is_zero()) {
        Some(units) => {
            let sold = units.abs();
            if sold > holding.units {
                return Err(AnalysisError::InsufficientUnits {
                    transaction: c.id(),
                    held: holding.units,
                    requested: sold,
                });
            }
            let allowed = unit_cost_fraction(cost, sold, holding.units, minor);
            holding.units -= sold;
            allowed
        }
        None => {
            let stock_value = holding.valuation;
            let cash_type = classify_cash(cash, stock_value, &rules);
            holding.action.cash_type = Some(cash_type);
            holding.action.consideration = Some(cash + stock_value);
            allowed_cost(cost, cash, stock_value, cash_type, minor)
        }
    };
    let allowed = allowed.max(Decimal::ZERO).min(cost);

    holding.residual_cost -= allowed;
    holding.invested -= cash;
    holding.action.allowed_cost = Some(allowed);

    realise_gain(state, key, cash - allowed)?;
    state.revalue_holding(key)
}

/// Record a realised gain on a holding and queue it for the market flush.
///
/// Gains on chargeable securities are sliced by the inclusive number of
/// years held.
fn realise_gain(state: &mut AnalysisState<'_>, key: HoldingKey, gain: Decimal) -> Result<()> {
    if gain.is_zero() {
        return Ok(());
    }
    let data = state.data;
    let chargeable = data.security(key.security)?.class.is_chargeable();
    let date = state.date();
    let minor = state.reporting_minor_units();

    {
        let holding = state.holding(key);
        holding.realised_gains += gain;
        let booked = holding.action.capital_gain.unwrap_or_default() + gain;
        holding.action.capital_gain = Some(booked);
        if chargeable {
            let start = holding.start_date.unwrap_or(date);
            let (years, sliced) = slice_gain(booked, start, date, minor);
            holding.action.years = Some(years);
            holding.action.sliced_gain = Some(sliced);
        }
    }

    if chargeable {
        state.market.chargeable_gains += gain;
    } else {
        state.market.capital_gains += gain;
    }
    Ok(())
}

// =============================================================================
// Dividends and unit changes
// =============================================================================

fn dividend(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    match c.credit {
        TransactionAsset::Holding(target) => {
            // Reinvested: the dividend buys units, the cash never arrives
            let units = c.transaction.credit_units().unwrap_or_default();
            let date = state.date();
            let holding = state.holding(target);
            holding.residual_cost += c.local;
            holding.units += units;
            holding.invested += c.local;
            holding.start_date.get_or_insert(date);
            state.revalue_holding(target)
        }
        TransactionAsset::Account(id) => {
            if let Some(source) = c.source_holding() {
                state.holding(source).dividend += c.local;
                state.revalue_holding(source)?;
            }
            apply_account_leg(state, c, id, c.credit_amount, c.local)
        }
        TransactionAsset::Payee(_) => Err(c.invalid_pair()),
    }
}

/// Stock split or bonus issue: units change, cost does not
fn adjust_units(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    let tx = c.transaction;
    let key = tx
        .account
        .as_holding()
        .ok_or_else(|| c.missing("holding to adjust"))?;
    let units = tx.account_units.ok_or_else(|| c.missing("unit change"))?;
    state.holding(key).units += units;
    state.revalue_holding(key)
}

// =============================================================================
// Corporate actions
// =============================================================================

/// Move `1 - dilution` of the debit holding's cost and investment to the
/// demerged holding. Units given up by the debit holding leave it.
fn demerger(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    let (Some(from), Some(to)) = (c.debit.as_holding(), c.credit.as_holding()) else {
        return Err(c.invalid_pair());
    };
    let tx = c.transaction;
    let dilution = tx.dilution.ok_or_else(|| c.missing("dilution ratio"))?;
    let new_units = tx.credit_units().unwrap_or_default();
    let given_up = tx.debit_units().unwrap_or_default().abs();
    let minor = state.reporting_minor_units();
    let date = state.date();
    let moved = Decimal::ONE - dilution;

    state.revalue_holding(from)?;
    let source = state.holding(from);
    if given_up > source.units {
        return Err(AnalysisError::InsufficientUnits {
            transaction: c.id(),
            held: source.units,
            requested: given_up,
        });
    }
    source.units -= given_up;
    let moved_cost = round_money(source.residual_cost * moved, minor);
    let moved_invested = round_money(source.invested * moved, minor);
    source.residual_cost -= moved_cost;
    source.invested -= moved_invested;
    source.action.cost_dilution = Some(dilution);
    source.action.xferred_cost = Some(-moved_cost);
    source.action.moved_invested = Some(-moved_invested);
    let start_date = source.start_date;

    let target = state.holding(to);
    target.residual_cost += moved_cost;
    target.invested += moved_invested;
    target.units += new_units;
    target.start_date = target.start_date.or(start_date).or(Some(date));
    target.action.cost_dilution = Some(dilution);
    target.action.xferred_cost = Some(moved_cost);
    target.action.moved_invested = Some(moved_invested);

    state.revalue_holding(from)?;
    state.revalue_holding(to)?;
    let value = state.holding(to).valuation;
    state.holding(to).action.xferred_value = Some(value);
    Ok(())
}

/// Exchange the debit holding for units of the credit holding, with
/// optional cash returned to an account.
fn takeover(state: &mut AnalysisState<'_>, c: &ClassifiedTransaction<'_>) -> Result<()> {
    let (Some(from), Some(to)) = (c.debit.as_holding(), c.credit.as_holding()) else {
        return Err(c.invalid_pair());
    };
    let tx = c.transaction;
    let data = state.data;
    let new_units = tx.credit_units().ok_or_else(|| c.missing("units of the new holding"))?;
    let minor = state.reporting_minor_units();
    let rules = state.config.gains;

    let returned = tx.returned_cash.unwrap_or_default();
    let cash_account = if returned.is_zero() {
        None
    } else {
        Some(
            tx.returned_cash_account
                .ok_or_else(|| c.missing("returned cash account"))?,
        )
    };
    let cash = match cash_account {
        Some(id) => {
            let currency = data.account(id)?.currency;
            state.to_local(returned, currency)?
        }
        None => Decimal::ZERO,
    };

    // Value of the new stock at today's price
    let security = data.security(to.security)?;
    let price = state.price(to.security);
    let rate = state.rate(security.currency)?;
    let foreign_value = round_money(new_units * price, data.minor_units(security.currency));
    let stock_value = convert(foreign_value, rate, minor);

    state.revalue_holding(from)?;
    let mut gain = Decimal::ZERO;
    if cash > Decimal::ZERO {
        let source = state.holding(from);
        let cost = source.residual_cost;
        let cash_type = classify_cash(cash, stock_value, &rules);
        let allowed = allowed_cost(cost, cash, stock_value, cash_type, minor)
            .max(Decimal::ZERO)
            .min(cost);
        source.residual_cost -= allowed;
        source.invested -= cash;
        source.action.cash_type = Some(cash_type);
        source.action.allowed_cost = Some(allowed);
        source.action.consideration = Some(cash + stock_value);
        source.action.returned_cash = Some(cash);
        gain = cash - allowed;
    }
    realise_gain(state, from, gain)?;

    let source = state.holding(from);
    let mut position = source.take_position();
    source.action.xferred_cost = Some(-position.residual_cost);
    source.action.moved_value = Some(-stock_value);
    source.action.moved_invested = Some(-position.invested);
    position.units = new_units;

    let target = state.holding(to);
    target.absorb_position(&position);
    target.action.xferred_cost = Some(position.residual_cost);
    target.action.xferred_value = Some(stock_value);
    target.action.moved_value = Some(stock_value);
    target.action.moved_invested = Some(position.invested);

    state.revalue_holding(from)?;
    state.revalue_holding(to)?;

    if let Some(id) = cash_account {
        apply_account_leg(state, c, id, returned, cash)?;
    }
    Ok(())
}

/// Move the cash and every active holding of one portfolio into another
pub(crate) fn portfolio_transfer(
    state: &mut AnalysisState<'_>,
    c: &ClassifiedTransaction<'_>,
) -> Result<()> {
    let (Some(from), Some(to)) = (c.debit.as_account(), c.credit.as_account()) else {
        return Err(c.invalid_pair());
    };
    let data = state.data;
    let source_currency = data.account(from)?.currency;
    let target_currency = data.account(to)?.currency;

    state.revalue_account(from)?;
    let (native, value) = {
        let cash = state.account(from);
        (cash.foreign_value, cash.valuation)
    };
    if !native.is_zero() {
        state.apply_account_flow(from, -native, -value)?;
        let target_native = if source_currency == target_currency {
            native
        } else {
            let rate = state.rate(target_currency)?;
            convert_back(value, rate, data.minor_units(target_currency))
        };
        state.apply_account_flow(to, target_native, value)?;
    }

    let keys: Vec<HoldingKey> = state
        .buckets
        .holdings
        .keys()
        .into_iter()
        .filter(|key| key.portfolio == from)
        .collect();
    let mut moved = 0usize;
    for key in keys {
        let active = state
            .buckets
            .holdings
            .get(key)
            .is_some_and(|b| b.values().is_active());
        if !active {
            continue;
        }
        state.revalue_holding(key)?;
        let target_key = HoldingKey::new(to, key.security);

        let source = state.holding(key);
        let value = source.valuation;
        let position = source.take_position();
        source.action.xferred_cost = Some(-position.residual_cost);
        source.action.moved_value = Some(-value);
        source.action.moved_invested = Some(-position.invested);

        let target = state.holding(target_key);
        target.absorb_position(&position);
        target.action.xferred_cost = Some(position.residual_cost);
        target.action.xferred_value = Some(value);
        target.action.moved_value = Some(value);
        target.action.moved_invested = Some(position.invested);

        state.revalue_holding(key)?;
        state.revalue_holding(target_key)?;
        moved += 1;
    }

    tracing::debug!(
        from = from.0,
        to = to.0,
        holdings = moved,
        "portfolio transferred"
    );
    Ok(())
}
