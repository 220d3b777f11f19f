//! Aggregation buckets
//!
//! A [`Bucket`] holds the running values of one entity (account, holding,
//! payee, category, tax basis or tag), the base values a delta is measured
//! from, and the snapshot [`History`] used to derive dated and ranged views.

mod account;
mod flow;
mod history;
mod registry;
mod security;
mod tag;
mod tax_basis;

use std::fmt;

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::{DateRange, EventId, EventStamp, TransactionId};

pub use account::{AccountAttribute, AccountStrategy, AccountValues};
pub use flow::{FlowAttribute, FlowValues};
pub use history::{History, Snapshot};
pub use registry::Registry;
pub use security::{CashType, CorporateAction, SecurityAttribute, SecurityValues};
pub use tag::{TagAttribute, TagValues};
pub use tax_basis::{TaxBasisAttribute, TaxBasisValues};

/// Value set carried by a bucket
pub trait BucketValues: Clone + Default + PartialEq + fmt::Debug {
    /// Symbolic names for the values reporting collaborators may query
    type Attribute: Copy + fmt::Debug;

    /// Reset the values that only describe the current event
    fn clear_transients(&mut self);

    /// Running values of `self` minus those of `base`; transients are kept
    #[must_use]
    fn delta_from(&self, base: &Self) -> Self;

    fn attribute(&self, attribute: Self::Attribute) -> Option<Decimal>;

    /// True when every running value is zero
    fn is_zero(&self) -> bool;
}

/// Running, base and historical values of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket<K, V> {
    key: K,
    values: V,
    base: V,
    delta: V,
    history: History<V>,
    #[serde(skip)]
    active_event: Option<EventId>,
}

impl<K: Copy, V: BucketValues> Bucket<K, V> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            values: V::default(),
            base: V::default(),
            delta: V::default(),
            history: History::default(),
            active_event: None,
        }
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn values(&self) -> &V {
        &self.values
    }

    pub fn base(&self) -> &V {
        &self.base
    }

    /// Values minus base, as of the last `calculate_delta`
    pub fn delta(&self) -> &V {
        &self.delta
    }

    pub fn history(&self) -> &History<V> {
        &self.history
    }

    pub fn attribute(&self, attribute: V::Attribute) -> Option<Decimal> {
        self.values.attribute(attribute)
    }

    /// A bucket with no recorded snapshot never took part in an event
    pub fn is_idle(&self) -> bool {
        self.history.is_empty()
    }

    /// Mutable access for the event `event`; transients are cleared on the
    /// first access within an event.
    pub(crate) fn touch(&mut self, event: EventId) -> &mut V {
        if self.active_event != Some(event) {
            self.active_event = Some(event);
            self.values.clear_transients();
        }
        &mut self.values
    }

    /// Values at the end of the previous event that touched this bucket
    pub(crate) fn previous_values(&self) -> V {
        self.history
            .last()
            .map(|s| s.values.clone())
            .unwrap_or_default()
    }

    pub(crate) fn snapshot(&mut self, stamp: EventStamp) {
        self.history.record(stamp, &self.values);
    }

    pub fn calculate_delta(&mut self) {
        self.delta = self.values.delta_from(&self.base);
    }

    pub fn values_at(&self, date: Date) -> Option<&V> {
        self.history.value_at(date)
    }

    pub fn values_at_transaction(&self, transaction: TransactionId) -> Option<&V> {
        self.history.values_at_transaction(transaction)
    }

    /// Change a transaction made to this bucket
    pub fn delta_at_transaction(&self, transaction: TransactionId) -> Option<V> {
        let current = self.history.values_at_transaction(transaction)?;
        let previous = self.history.values_before_transaction(transaction)?;
        Some(match previous {
            Some(prev) => current.delta_from(prev),
            None => current.delta_from(&V::default()),
        })
    }

    /// Copy of this bucket as it stood at the end of `date`
    pub(crate) fn dated(&self, date: Date) -> Option<Self> {
        let values = self.history.value_at(date)?.clone();
        let mut bucket = Self {
            key: self.key,
            values,
            base: V::default(),
            delta: V::default(),
            history: self.history.truncated(date),
            active_event: None,
        };
        bucket.calculate_delta();
        Some(bucket)
    }

    /// Copy of this bucket measured across `range`; `None` when idle in it
    pub(crate) fn ranged(&self, range: &DateRange) -> Option<Self> {
        if !self.history.has_activity_in(range) {
            return None;
        }
        let values = self.history.value_at(range.end())?.clone();
        let mut base = self
            .history
            .value_before(range.start())
            .cloned()
            .unwrap_or_default();
        base.clear_transients();
        let mut bucket = Self {
            key: self.key,
            values,
            base,
            delta: V::default(),
            history: self.history.truncated(range.end()),
            active_event: None,
        };
        bucket.calculate_delta();
        Some(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountId, EventId};
    use jiff::civil::date;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn stamp(id: u32, day: i8, tx: Option<u32>) -> EventStamp {
        EventStamp {
            id: EventId(id),
            date: date(2024, 1, day),
            transaction: tx.map(TransactionId),
        }
    }

    fn bucket() -> Bucket<AccountId, AccountValues> {
        let mut b: Bucket<AccountId, AccountValues> = Bucket::new(AccountId(1));
        b.touch(EventId(1)).valuation = d("100");
        b.snapshot(stamp(1, 1, Some(1)));
        b.touch(EventId(2)).valuation = d("250");
        b.snapshot(stamp(2, 5, Some(2)));
        b.touch(EventId(3)).valuation = d("200");
        b.snapshot(stamp(3, 9, Some(3)));
        b
    }

    #[test]
    fn test_delta_matches_values_minus_base() {
        let mut b = bucket();
        b.calculate_delta();
        assert_eq!(b.delta().valuation, b.values().valuation - b.base().valuation);
    }

    #[test]
    fn test_transients_clear_once_per_event() {
        let mut b: Bucket<AccountId, AccountValues> = Bucket::new(AccountId(1));
        b.touch(EventId(1)).local_flow = d("10");
        b.touch(EventId(1)).local_flow += d("5");
        assert_eq!(b.values().local_flow, d("15"));
        b.touch(EventId(2));
        assert_eq!(b.values().local_flow, Decimal::ZERO);
    }

    #[test]
    fn test_delta_at_transaction() {
        let b = bucket();
        let delta = b.delta_at_transaction(TransactionId(2)).unwrap();
        assert_eq!(delta.valuation, d("150"));
        let first = b.delta_at_transaction(TransactionId(1)).unwrap();
        assert_eq!(first.valuation, d("100"));
        assert!(b.delta_at_transaction(TransactionId(9)).is_none());
    }

    #[test]
    fn test_dated_and_ranged_copies() {
        let b = bucket();
        assert!(b.dated(date(2023, 12, 31)).is_none());
        let dated = b.dated(date(2024, 1, 6)).unwrap();
        assert_eq!(dated.values().valuation, d("250"));
        assert_eq!(dated.history().len(), 2);

        let range = DateRange::new(date(2024, 1, 2), date(2024, 1, 9)).unwrap();
        let ranged = b.ranged(&range).unwrap();
        assert_eq!(ranged.base().valuation, d("100"));
        assert_eq!(ranged.delta().valuation, d("100"));

        let quiet = DateRange::new(date(2024, 1, 10), date(2024, 1, 20)).unwrap();
        assert!(b.ranged(&quiet).is_none());
    }
}
