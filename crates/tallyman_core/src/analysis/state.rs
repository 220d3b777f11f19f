use jiff::civil::Date;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use crate::bucket::{AccountValues, FlowValues, SecurityValues, TagValues, TaxBasisValues};
use crate::config::AnalysisConfig;
use crate::cursor::{DepositRateCursor, ExchangeRateCursor, PriceCursor};
use crate::error::Result;
use crate::metrics::AnalysisMetrics;
use crate::model::{
    AccountId, CategoryId, CurrencyId, DataView, Event, EventId, EventStamp, HoldingKey, PayeeId,
    SecurityId, TagId, TaxBasisClass,
};
use crate::money::convert;

use super::Buckets;
use super::market::{self, MarketTotals};

/// Buckets touched by the current event, snapshotted when it finishes
#[derive(Debug, Default)]
struct Touched {
    accounts: FxHashSet<AccountId>,
    holdings: FxHashSet<HoldingKey>,
    payees: FxHashSet<PayeeId>,
    categories: FxHashSet<CategoryId>,
    tax_bases: FxHashSet<TaxBasisClass>,
    tags: FxHashSet<TagId>,
    pensions: FxHashSet<SecurityId>,
}

impl Touched {
    fn len(&self) -> usize {
        self.accounts.len()
            + self.holdings.len()
            + self.payees.len()
            + self.categories.len()
            + self.tax_bases.len()
            + self.tags.len()
            + self.pensions.len()
    }

    fn clear(&mut self) {
        self.accounts.clear();
        self.holdings.clear();
        self.payees.clear();
        self.categories.clear();
        self.tax_bases.clear();
        self.tags.clear();
        self.pensions.clear();
    }
}

fn sorted<K: Copy + Ord>(set: &FxHashSet<K>) -> Vec<K> {
    let mut keys: Vec<K> = set.iter().copied().collect();
    keys.sort_unstable();
    keys
}

/// Context of one analysis pass
pub(crate) struct AnalysisState<'a> {
    pub data: &'a DataView,
    pub config: &'a AnalysisConfig,
    pub buckets: Buckets,
    pub market: MarketTotals,
    pub metrics: AnalysisMetrics,
    prices: PriceCursor,
    rates: ExchangeRateCursor,
    deposit_rates: DepositRateCursor,
    touched: Touched,
    stamp: EventStamp,
    reporting_minor_units: u32,
}

impl<'a> AnalysisState<'a> {
    pub fn new(data: &'a DataView, config: &'a AnalysisConfig) -> Self {
        Self {
            data,
            config,
            buckets: Buckets::default(),
            market: MarketTotals::default(),
            metrics: AnalysisMetrics::new(),
            prices: PriceCursor::from_data(data.data()),
            rates: ExchangeRateCursor::from_data(data.data()),
            deposit_rates: DepositRateCursor::from_data(data.data()),
            touched: Touched::default(),
            stamp: EventStamp {
                id: EventId(0),
                date: Date::MIN,
                transaction: None,
            },
            reporting_minor_units: data.minor_units(data.reporting_currency()),
        }
    }

    /// Finished buckets and the metrics of the pass
    pub fn into_parts(self) -> (Buckets, AnalysisMetrics) {
        (self.buckets, self.metrics)
    }

    pub fn begin_event(&mut self, id: EventId, event: &Event<'_>) {
        self.stamp = EventStamp::for_event(id, event);
    }

    pub fn event_id(&self) -> EventId {
        self.stamp.id
    }

    pub fn date(&self) -> Date {
        self.stamp.date
    }

    pub fn reporting_minor_units(&self) -> u32 {
        self.reporting_minor_units
    }

    // =========================================================================
    // Bucket access
    // =========================================================================

    pub fn account(&mut self, id: AccountId) -> &mut AccountValues {
        let event = self.event_id();
        self.touched.accounts.insert(id);
        self.buckets.accounts.touch(id, event)
    }

    pub fn holding(&mut self, key: HoldingKey) -> &mut SecurityValues {
        let event = self.event_id();
        self.touched.holdings.insert(key);
        self.buckets.holdings.touch(key, event)
    }

    pub fn payee(&mut self, id: PayeeId) -> &mut FlowValues {
        let event = self.event_id();
        self.touched.payees.insert(id);
        self.buckets.payees.touch(id, event)
    }

    pub fn category(&mut self, id: CategoryId) -> &mut FlowValues {
        let event = self.event_id();
        self.touched.categories.insert(id);
        self.buckets.categories.touch(id, event)
    }

    pub fn tax_basis(&mut self, class: TaxBasisClass) -> &mut TaxBasisValues {
        let event = self.event_id();
        self.touched.tax_bases.insert(class);
        self.buckets.tax_bases.touch(class, event)
    }

    pub fn tag(&mut self, id: TagId) -> &mut TagValues {
        let event = self.event_id();
        self.touched.tags.insert(id);
        self.buckets.tags.touch(id, event)
    }

    pub fn pension(&mut self, id: SecurityId) -> &mut SecurityValues {
        let event = self.event_id();
        self.touched.pensions.insert(id);
        self.buckets.pensions.touch(id, event)
    }

    // =========================================================================
    // Rates
    // =========================================================================

    pub fn rate(&mut self, currency: CurrencyId) -> Result<Decimal> {
        let date = self.date();
        Ok(self.rates.rate_at(currency, date)?)
    }

    pub fn price(&mut self, security: SecurityId) -> Decimal {
        let date = self.date();
        self.prices.price_at(security, date)
    }

    /// Reporting-currency value of `native` units of `currency`
    pub fn to_local(&mut self, native: Decimal, currency: CurrencyId) -> Result<Decimal> {
        let rate = self.rate(currency)?;
        Ok(convert(native, rate, self.reporting_minor_units))
    }

    // =========================================================================
    // Revaluation
    // =========================================================================

    /// Add `native` to an account, worth `local` in the reporting currency
    pub fn apply_account_flow(
        &mut self,
        id: AccountId,
        native: Decimal,
        local: Decimal,
    ) -> Result<()> {
        let data = self.data;
        let account = data.account(id)?;
        let rate = self.rate(account.currency)?;
        let minor = self.reporting_minor_units;
        self.account(id).apply_flow(native, local, rate, minor);
        Ok(())
    }

    pub fn revalue_account(&mut self, id: AccountId) -> Result<()> {
        let data = self.data;
        let account = data.account(id)?;
        let rate = self.rate(account.currency)?;
        let minor = self.reporting_minor_units;
        self.account(id).revalue(rate, minor);
        Ok(())
    }

    pub fn apply_deposit_terms(&mut self, id: AccountId) -> Result<()> {
        self.data.account(id)?;
        let date = self.date();
        if let Some(terms) = self.deposit_rates.terms_at(id, date) {
            self.account(id).set_terms(terms);
        }
        Ok(())
    }

    /// Revalue a holding at the price and exchange rate in effect today
    pub fn revalue_holding(&mut self, key: HoldingKey) -> Result<()> {
        let data = self.data;
        let security = data.security(key.security)?;
        let price = self.price(key.security);
        let rate = self.rate(security.currency)?;
        let foreign_minor = data.minor_units(security.currency);
        let local_minor = self.reporting_minor_units;
        self.holding(key)
            .revalue(price, rate, foreign_minor, local_minor);
        Ok(())
    }

    // =========================================================================
    // Event completion
    // =========================================================================

    /// Book valuation changes not explained by flows, flush the market
    /// totals and snapshot every touched bucket once.
    pub fn finish_event(&mut self) -> Result<()> {
        self.reconcile_accounts();
        self.reconcile_holdings();
        if market::flush(self)? {
            self.metrics.market_flushes += 1;
        }
        self.snapshot_touched();
        Ok(())
    }

    fn reconcile_accounts(&mut self) {
        let event = self.event_id();
        for id in sorted(&self.touched.accounts) {
            let previous = self.buckets.accounts.previous_values(id);
            let values = self.buckets.accounts.touch(id, event);
            let fluct = (values.valuation - previous.valuation) - values.local_flow;
            if !fluct.is_zero() {
                values.currency_fluct += fluct;
                self.market.fluctuation += fluct;
            }
        }
    }

    fn reconcile_holdings(&mut self) {
        let event = self.event_id();
        let minor = self.reporting_minor_units;
        for key in sorted(&self.touched.holdings) {
            let previous = self.buckets.holdings.previous_values(key);
            let values = self.buckets.holdings.touch(key, event);

            // Exchange movement on what was held before this event
            let fluct = if values.exchange_rate.is_zero() {
                Decimal::ZERO
            } else {
                convert(previous.foreign_value, values.exchange_rate, minor) - previous.valuation
            };
            let action = &values.action;
            let gain = action.capital_gain.unwrap_or_default();
            let moved = action.moved_value.unwrap_or_default()
                - action.moved_invested.unwrap_or_default();
            let growth = (values.valuation - previous.valuation)
                - (values.invested - previous.invested)
                - gain
                - moved
                - fluct;

            values.market_growth += growth;
            values.currency_fluct += fluct;
            self.market.growth += growth;
            self.market.fluctuation += fluct;
        }
    }

    fn snapshot_touched(&mut self) {
        let stamp = self.stamp;
        self.metrics.snapshots += self.touched.len() as u64;

        for &id in &self.touched.accounts {
            self.buckets.accounts.snapshot(id, stamp);
        }
        for &key in &self.touched.holdings {
            self.buckets.holdings.snapshot(key, stamp);
        }
        for &id in &self.touched.payees {
            self.buckets.payees.snapshot(id, stamp);
        }
        for &id in &self.touched.categories {
            self.buckets.categories.snapshot(id, stamp);
        }
        for &class in &self.touched.tax_bases {
            self.buckets.tax_bases.snapshot(class, stamp);
        }
        for &id in &self.touched.tags {
            self.buckets.tags.snapshot(id, stamp);
        }
        for &id in &self.touched.pensions {
            self.buckets.pensions.snapshot(id, stamp);
        }
        self.touched.clear();
    }
}
