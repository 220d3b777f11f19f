//! Ledger analysis
//!
//! [`Analysis::run`] makes one chronological pass over a data set and keeps
//! the resulting bucket registries. Dated and ranged views are derived from
//! the recorded snapshot history without running the pass again.
//!
//! The pass is split into:
//! - `classify` - resolves debit/credit legs and picks a processor
//! - `dispatch` - standard account/payee processing and common bookings
//! - `security` - holdings and corporate actions
//! - `gains` - cost allocation rules
//! - `tax` / `market` - tax basis and market reconciliation
//! - `totals` / `consistency` - derived totals and their cross-check

mod classify;
mod consistency;
mod dispatch;
mod gains;
mod market;
mod pass;
mod security;
mod state;
mod tax;
mod totals;

use std::sync::Arc;

use jiff::civil::Date;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bucket::{
    AccountValues, Bucket, FlowValues, Registry, SecurityValues, TagValues, TaxBasisValues,
};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::metrics::AnalysisMetrics;
use crate::model::{
    AccountId, CategoryId, DataSet, DataView, DateRange, HoldingKey, PayeeId, SecurityId, TagId,
    TaxBasisClass,
};

pub use consistency::ConsistencyReport;
pub use gains::{allowed_cost, classify_cash, slice_gain, unit_cost_fraction};
pub use totals::{AccountTotals, PortfolioTotals, Totals, ValueTotals};

/// Registries of every dimension
#[derive(Debug, Clone, Default)]
pub(crate) struct Buckets {
    pub accounts: Registry<AccountId, AccountValues>,
    pub holdings: Registry<HoldingKey, SecurityValues>,
    pub payees: Registry<PayeeId, FlowValues>,
    pub categories: Registry<CategoryId, FlowValues>,
    pub tax_bases: Registry<TaxBasisClass, TaxBasisValues>,
    pub tags: Registry<TagId, TagValues>,
    /// Contributions to singular pension securities, outside the reconciled totals
    pub pensions: Registry<SecurityId, SecurityValues>,
}

impl Buckets {
    fn calculate_deltas(&mut self) {
        self.accounts.calculate_deltas();
        self.holdings.calculate_deltas();
        self.payees.calculate_deltas();
        self.categories.calculate_deltas();
        self.tax_bases.calculate_deltas();
        self.tags.calculate_deltas();
        self.pensions.calculate_deltas();
    }

    fn dated(&self, date: Date) -> Self {
        Self {
            accounts: self.accounts.dated(date),
            holdings: self.holdings.dated(date),
            payees: self.payees.dated(date),
            categories: self.categories.dated(date),
            tax_bases: self.tax_bases.dated(date),
            tags: self.tags.dated(date),
            pensions: self.pensions.dated(date),
        }
    }

    fn ranged(&self, range: &DateRange) -> Self {
        Self {
            accounts: self.accounts.ranged(range),
            holdings: self.holdings.ranged(range),
            payees: self.payees.ranged(range),
            categories: self.categories.ranged(range),
            tax_bases: self.tax_bases.ranged(range),
            tags: self.tags.ranged(range),
            pensions: self.pensions.ranged(range),
        }
    }
}

/// Which part of the history an [`Analysis`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisView {
    /// The full pass
    Base,
    /// Everything up to and including a date
    Dated(Date),
    /// Changes within a date range
    Ranged(DateRange),
}

/// Result of an analysis pass, or a view derived from one
#[derive(Debug, Clone)]
pub struct Analysis {
    data: Arc<DataView>,
    config: AnalysisConfig,
    view: AnalysisView,
    buckets: Buckets,
    totals: Totals,
    consistency: Option<ConsistencyReport>,
    metrics: AnalysisMetrics,
}

impl Analysis {
    /// Sort `data` and run a full pass over it
    pub fn run(data: DataSet, config: &AnalysisConfig) -> Result<Self> {
        Self::run_view(Arc::new(DataView::new(data)), config)
    }

    /// Run a full pass over an already indexed view
    pub fn run_view(data: Arc<DataView>, config: &AnalysisConfig) -> Result<Self> {
        let (buckets, metrics) = pass::run_pass(&data, config)?;
        let mut analysis = Self {
            data,
            config: config.clone(),
            view: AnalysisView::Base,
            buckets,
            totals: Totals::default(),
            consistency: None,
            metrics,
        };
        analysis.produce_totals();
        Ok(analysis)
    }

    /// Recompute deltas and totals, then check the dimensions reconcile.
    ///
    /// A mismatch is logged and reported, never fatal.
    pub fn produce_totals(&mut self) -> &Totals {
        self.totals = totals::produce(&mut self.buckets, &self.data);
        if self.config.check_consistency {
            let report = consistency::check(&self.totals);
            if let Some(warning) = &report.warning {
                tracing::warn!(view = ?self.view, %warning, "data integrity warning");
            }
            self.consistency = Some(report);
        }
        &self.totals
    }

    fn derive(&self, view: AnalysisView, buckets: Buckets) -> Self {
        let mut analysis = Self {
            data: Arc::clone(&self.data),
            config: self.config.clone(),
            view,
            buckets,
            totals: Totals::default(),
            consistency: None,
            metrics: self.metrics.clone(),
        };
        analysis.produce_totals();
        analysis
    }

    /// The analysis as it stood at the end of `date`
    pub fn dated(&self, date: Date) -> Self {
        self.derive(AnalysisView::Dated(date), self.buckets.dated(date))
    }

    /// Changes made within `range`
    pub fn ranged(&self, range: DateRange) -> Self {
        self.derive(AnalysisView::Ranged(range), self.buckets.ranged(&range))
    }

    /// Dated views for several dates, derived in parallel when possible
    pub fn dated_many(&self, dates: &[Date]) -> Vec<Self> {
        #[cfg(feature = "parallel")]
        let views = dates.par_iter().map(|&date| self.dated(date)).collect();

        #[cfg(not(feature = "parallel"))]
        let views = dates.iter().map(|&date| self.dated(date)).collect();

        views
    }

    /// Ranged views for several ranges, derived in parallel when possible
    pub fn ranged_many(&self, ranges: &[DateRange]) -> Vec<Self> {
        #[cfg(feature = "parallel")]
        let views = ranges.par_iter().map(|&range| self.ranged(range)).collect();

        #[cfg(not(feature = "parallel"))]
        let views = ranges.iter().map(|&range| self.ranged(range)).collect();

        views
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn data(&self) -> &DataView {
        &self.data
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn view(&self) -> AnalysisView {
        self.view
    }

    pub fn accounts(&self) -> &Registry<AccountId, AccountValues> {
        &self.buckets.accounts
    }

    pub fn holdings(&self) -> &Registry<HoldingKey, SecurityValues> {
        &self.buckets.holdings
    }

    pub fn payees(&self) -> &Registry<PayeeId, FlowValues> {
        &self.buckets.payees
    }

    pub fn categories(&self) -> &Registry<CategoryId, FlowValues> {
        &self.buckets.categories
    }

    pub fn tax_bases(&self) -> &Registry<TaxBasisClass, TaxBasisValues> {
        &self.buckets.tax_bases
    }

    pub fn tags(&self) -> &Registry<TagId, TagValues> {
        &self.buckets.tags
    }

    /// Employee NI credited to the state pension
    pub fn pensions(&self) -> &Registry<SecurityId, SecurityValues> {
        &self.buckets.pensions
    }

    /// Holdings of one portfolio, in security order
    pub fn portfolio_holdings(
        &self,
        portfolio: AccountId,
    ) -> impl Iterator<Item = &Bucket<HoldingKey, SecurityValues>> {
        self.buckets
            .holdings
            .iter()
            .filter(move |b| b.key().portfolio == portfolio)
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Report of the last `produce_totals`; `None` when checking is disabled
    pub fn consistency(&self) -> Option<&ConsistencyReport> {
        self.consistency.as_ref()
    }

    pub fn metrics(&self) -> &AnalysisMetrics {
        &self.metrics
    }
}
