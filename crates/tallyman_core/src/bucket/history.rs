//! Append-only snapshot history of a bucket's values

use jiff::civil::Date;
use serde::Serialize;

use crate::model::{DateRange, EventId, EventStamp, TransactionId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<V> {
    pub stamp: EventStamp,
    pub values: V,
}

/// Snapshots in event order; dates and event ids never decrease
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History<V> {
    snapshots: Vec<Snapshot<V>>,
}

impl<V> Default for History<V> {
    fn default() -> Self {
        Self {
            snapshots: Vec::new(),
        }
    }
}

impl<V: Clone> History<V> {
    /// Record the values at the end of an event.
    ///
    /// A second record for the same event replaces the first, so a bucket
    /// never carries two snapshots for one event.
    pub fn record(&mut self, stamp: EventStamp, values: &V) {
        if let Some(last) = self.snapshots.last_mut() {
            debug_assert!(last.stamp.id <= stamp.id && last.stamp.date <= stamp.date);
            if last.stamp.id == stamp.id {
                last.values = values.clone();
                return;
            }
        }
        self.snapshots.push(Snapshot {
            stamp,
            values: values.clone(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot<V>> {
        self.snapshots.iter()
    }

    pub fn last(&self) -> Option<&Snapshot<V>> {
        self.snapshots.last()
    }

    /// Values in effect at the end of `cutoff`
    pub fn value_at(&self, cutoff: Date) -> Option<&V> {
        let n = self.snapshots.partition_point(|s| s.stamp.date <= cutoff);
        n.checked_sub(1).map(|i| &self.snapshots[i].values)
    }

    /// Values in effect at the start of `date`
    pub fn value_before(&self, date: Date) -> Option<&V> {
        let n = self.snapshots.partition_point(|s| s.stamp.date < date);
        n.checked_sub(1).map(|i| &self.snapshots[i].values)
    }

    pub fn value_at_event(&self, id: EventId) -> Option<&V> {
        let n = self.snapshots.partition_point(|s| s.stamp.id <= id);
        n.checked_sub(1).map(|i| &self.snapshots[i].values)
    }

    fn position_of(&self, transaction: TransactionId) -> Option<usize> {
        self.snapshots
            .iter()
            .position(|s| s.stamp.transaction == Some(transaction))
    }

    /// Values recorded for `transaction`, if it touched this bucket
    pub fn values_at_transaction(&self, transaction: TransactionId) -> Option<&V> {
        self.position_of(transaction)
            .map(|i| &self.snapshots[i].values)
    }

    /// Values before `transaction` touched this bucket (`None` inside when it was the first touch)
    pub fn values_before_transaction(&self, transaction: TransactionId) -> Option<Option<&V>> {
        self.position_of(transaction)
            .map(|i| i.checked_sub(1).map(|p| &self.snapshots[p].values))
    }

    pub fn has_activity_in(&self, range: &DateRange) -> bool {
        let first = self
            .snapshots
            .partition_point(|s| s.stamp.date < range.start());
        self.snapshots
            .get(first)
            .is_some_and(|s| s.stamp.date <= range.end())
    }

    /// History restricted to snapshots dated on or before `cutoff`
    #[must_use]
    pub fn truncated(&self, cutoff: Date) -> Self {
        let n = self.snapshots.partition_point(|s| s.stamp.date <= cutoff);
        Self {
            snapshots: self.snapshots[..n].to_vec(),
        }
    }
}
