use std::hash::Hash;

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::model::{DateRange, EventId, EventStamp, TransactionId};

use super::{Bucket, BucketValues};

/// Lazily populated buckets of one dimension plus a synthetic totals entry
#[derive(Debug, Clone)]
pub struct Registry<K, V> {
    buckets: FxHashMap<K, Bucket<K, V>>,
    totals: V,
}

impl<K, V: Default> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            buckets: FxHashMap::default(),
            totals: V::default(),
        }
    }
}

impl<K: Copy + Eq + Hash + Ord, V: BucketValues> Registry<K, V> {
    pub fn get(&self, key: K) -> Option<&Bucket<K, V>> {
        self.buckets.get(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.buckets.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = self.buckets.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Buckets in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = &Bucket<K, V>> {
        let mut buckets: Vec<&Bucket<K, V>> = self.buckets.values().collect();
        buckets.sort_unstable_by_key(|b| b.key());
        buckets.into_iter()
    }

    /// Totals computed by the last `produce_totals`
    pub fn totals(&self) -> &V {
        &self.totals
    }

    pub(crate) fn set_totals(&mut self, totals: V) {
        self.totals = totals;
    }

    pub fn values_at(&self, key: K, date: Date) -> Option<&V> {
        self.buckets.get(&key)?.values_at(date)
    }

    pub fn values_at_transaction(&self, key: K, transaction: TransactionId) -> Option<&V> {
        self.buckets.get(&key)?.values_at_transaction(transaction)
    }

    pub fn delta_at_transaction(&self, key: K, transaction: TransactionId) -> Option<V> {
        self.buckets.get(&key)?.delta_at_transaction(transaction)
    }

    /// Values of `key` for mutation within `event`, creating the bucket on first use
    pub(crate) fn touch(&mut self, key: K, event: EventId) -> &mut V {
        self.buckets
            .entry(key)
            .or_insert_with(|| Bucket::new(key))
            .touch(event)
    }

    pub(crate) fn previous_values(&self, key: K) -> V {
        self.buckets
            .get(&key)
            .map(Bucket::previous_values)
            .unwrap_or_default()
    }

    pub(crate) fn snapshot(&mut self, key: K, stamp: EventStamp) {
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.snapshot(stamp);
        }
    }

    pub(crate) fn calculate_deltas(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.calculate_delta();
        }
    }

    /// Registry as it stood at the end of `date`, without buckets idle until then
    pub(crate) fn dated(&self, date: Date) -> Self {
        Self {
            buckets: self
                .buckets
                .iter()
                .filter_map(|(k, b)| b.dated(date).map(|b| (*k, b)))
                .collect(),
            totals: V::default(),
        }
    }

    /// Registry measured across `range`, without buckets idle in it
    pub(crate) fn ranged(&self, range: &DateRange) -> Self {
        Self {
            buckets: self
                .buckets
                .iter()
                .filter_map(|(k, b)| b.ranged(range).map(|b| (*k, b)))
                .collect(),
            totals: V::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::FlowValues;
    use crate::model::PayeeId;
    use jiff::civil::date;
    use rust_decimal::Decimal;

    fn stamp(id: u32, day: i8) -> EventStamp {
        EventStamp {
            id: EventId(id),
            date: date(2024, 1, day),
            transaction: None,
        }
    }

    #[test]
    fn test_lazy_creation_and_sorted_iteration() {
        let mut registry: Registry<PayeeId, FlowValues> = Registry::default();
        assert!(registry.is_empty());
        registry.touch(PayeeId(5), EventId(1)).income += Decimal::TEN;
        registry.touch(PayeeId(2), EventId(1)).expense += Decimal::ONE;
        registry.snapshot(PayeeId(5), stamp(1, 1));
        registry.snapshot(PayeeId(2), stamp(1, 1));

        assert_eq!(registry.keys(), vec![PayeeId(2), PayeeId(5)]);
        let keys: Vec<_> = registry.iter().map(|b| b.key()).collect();
        assert_eq!(keys, vec![PayeeId(2), PayeeId(5)]);
        assert_eq!(registry.previous_values(PayeeId(5)).income, Decimal::TEN);
        assert_eq!(registry.previous_values(PayeeId(9)), FlowValues::default());
    }

    #[test]
    fn test_dated_drops_idle_buckets() {
        let mut registry: Registry<PayeeId, FlowValues> = Registry::default();
        registry.touch(PayeeId(1), EventId(1)).income += Decimal::ONE;
        registry.snapshot(PayeeId(1), stamp(1, 1));
        registry.touch(PayeeId(2), EventId(2)).income += Decimal::ONE;
        registry.snapshot(PayeeId(2), stamp(2, 10));

        let dated = registry.dated(date(2024, 1, 5));
        assert!(dated.contains(PayeeId(1)));
        assert!(!dated.contains(PayeeId(2)));

        let range = DateRange::new(date(2024, 1, 5), date(2024, 1, 31)).unwrap();
        let ranged = registry.ranged(&range);
        assert!(!ranged.contains(PayeeId(1)));
        assert!(ranged.contains(PayeeId(2)));
    }
}
