//! Date-indexed rate lookups with a monotonic cursor per key.
//!
//! The pass queries rates in date order, so each series keeps the position
//! of the last lookup and only moves forward. A query for an earlier date
//! falls back to a binary search and resets the position.

use std::hash::Hash;

use jiff::civil::Date;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::error::CurrencyError;
use crate::model::{AccountId, CurrencyId, DataSet, SecurityId};

#[derive(Debug, Clone)]
struct Series<V> {
    points: Vec<(Date, V)>,
    /// Number of points dated on or before the last queried date
    position: usize,
}

impl<V> Series<V> {
    fn locate(&mut self, date: Date) -> Option<&V> {
        let rewind = self.position > 0 && self.points[self.position - 1].0 > date;
        if rewind {
            self.position = self.points.partition_point(|(d, _)| *d <= date);
        } else {
            while self.position < self.points.len() && self.points[self.position].0 <= date {
                self.position += 1;
            }
        }
        self.position.checked_sub(1).map(|i| &self.points[i].1)
    }
}

/// Per-key series of dated values
#[derive(Debug, Clone)]
pub struct RateCursor<K, V = Decimal> {
    series: FxHashMap<K, Series<V>>,
}

impl<K, V> Default for RateCursor<K, V> {
    fn default() -> Self {
        Self {
            series: FxHashMap::default(),
        }
    }
}

impl<K: Copy + Eq + Hash, V> RateCursor<K, V> {
    /// Build from unordered `(key, date, value)` entries.
    ///
    /// Entries sharing a key and date keep their input order; the last one wins.
    pub fn new(entries: impl IntoIterator<Item = (K, Date, V)>) -> Self {
        let mut series: FxHashMap<K, Series<V>> = FxHashMap::default();
        for (key, date, value) in entries {
            series
                .entry(key)
                .or_insert_with(|| Series {
                    points: Vec::new(),
                    position: 0,
                })
                .points
                .push((date, value));
        }
        for s in series.values_mut() {
            s.points.sort_by_key(|(d, _)| *d);
        }
        Self { series }
    }

    /// Value in effect on `date`: the latest entry dated on or before it
    pub fn value_at(&mut self, key: K, date: Date) -> Option<&V> {
        self.series.get_mut(&key)?.locate(date)
    }

    pub fn has_key(&self, key: K) -> bool {
        self.series.contains_key(&key)
    }
}

/// Security prices; a security without a price yet is worth one per unit
#[derive(Debug, Clone, Default)]
pub struct PriceCursor {
    inner: RateCursor<SecurityId>,
}

impl PriceCursor {
    pub fn from_data(data: &DataSet) -> Self {
        Self {
            inner: RateCursor::new(data.prices.iter().map(|p| (p.security, p.date, p.price))),
        }
    }

    pub fn price_at(&mut self, security: SecurityId, date: Date) -> Decimal {
        self.inner
            .value_at(security, date)
            .copied()
            .unwrap_or(Decimal::ONE)
    }
}

/// Exchange rates against the reporting currency
#[derive(Debug, Clone)]
pub struct ExchangeRateCursor {
    inner: RateCursor<CurrencyId>,
    reporting: CurrencyId,
}

impl ExchangeRateCursor {
    pub fn from_data(data: &DataSet) -> Self {
        Self {
            inner: RateCursor::new(
                data.exchange_rates
                    .iter()
                    .map(|r| (r.currency, r.date, r.rate)),
            ),
            reporting: data.reporting_currency,
        }
    }

    /// Rate in effect on `date`; the reporting currency is always 1
    pub fn rate_at(&mut self, currency: CurrencyId, date: Date) -> Result<Decimal, CurrencyError> {
        if currency == self.reporting {
            return Ok(Decimal::ONE);
        }
        let rate = self
            .inner
            .value_at(currency, date)
            .copied()
            .ok_or(CurrencyError::MissingExchangeRate { currency, date })?;
        if rate <= Decimal::ZERO {
            return Err(CurrencyError::NonPositiveExchangeRate { currency, rate });
        }
        Ok(rate)
    }
}

/// Interest terms of a deposit from a given date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositTerms {
    pub rate: Decimal,
    pub bonus: Option<Decimal>,
    pub maturity: Option<Date>,
}

#[derive(Debug, Clone, Default)]
pub struct DepositRateCursor {
    inner: RateCursor<AccountId, DepositTerms>,
}

impl DepositRateCursor {
    pub fn from_data(data: &DataSet) -> Self {
        Self {
            inner: RateCursor::new(data.deposit_rates.iter().map(|r| {
                let terms = DepositTerms {
                    rate: r.rate,
                    bonus: r.bonus,
                    maturity: r.end_date,
                };
                (r.account, r.date, terms)
            })),
        }
    }

    pub fn terms_at(&mut self, account: AccountId, date: Date) -> Option<DepositTerms> {
        self.inner.value_at(account, date).copied()
    }
}
