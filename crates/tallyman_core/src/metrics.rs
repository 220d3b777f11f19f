//! Counters collected during an analysis pass

use jiff::civil::Date;
use serde::Serialize;

use crate::date_math::days_between;
use crate::model::EventKind;

/// Metrics collected during a pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisMetrics {
    pub prices: u64,
    pub exchange_rates: u64,
    pub deposit_rates: u64,
    pub opening_balances: u64,
    pub transactions: u64,
    /// Deleted transactions passed over by the event cursor
    pub transactions_skipped: u64,
    /// Bucket snapshots recorded across all dimensions
    pub snapshots: u64,
    /// Events whose market movements were booked
    pub market_flushes: u64,
    pub first_date: Option<Date>,
    pub last_date: Option<Date>,
}

impl AnalysisMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self, kind: EventKind, date: Date) {
        match kind {
            EventKind::SecurityPrice => self.prices += 1,
            EventKind::ExchangeRate => self.exchange_rates += 1,
            EventKind::DepositRate => self.deposit_rates += 1,
            EventKind::OpeningBalance => self.opening_balances += 1,
            EventKind::Transaction => self.transactions += 1,
        }
        if self.first_date.is_none() {
            self.first_date = Some(date);
        }
        self.last_date = Some(date);
    }

    pub fn events(&self) -> u64 {
        self.prices
            + self.exchange_rates
            + self.deposit_rates
            + self.opening_balances
            + self.transactions
    }

    /// Calendar days covered by the processed events
    pub fn span_days(&self) -> i32 {
        match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => days_between(first, last),
            _ => 0,
        }
    }
}
