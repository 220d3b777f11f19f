use rust_decimal::Decimal;
use serde::Serialize;

use super::{BucketValues, FlowValues};

/// Activity of transactions carrying a tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagValues {
    pub transactions: u32,
    pub flow: FlowValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAttribute {
    Transactions,
    Income,
    Expense,
    Profit,
}

impl TagValues {
    pub(crate) fn accumulate(&mut self, other: &TagValues) {
        self.transactions += other.transactions;
        self.flow.accumulate(&other.flow);
    }
}

impl BucketValues for TagValues {
    type Attribute = TagAttribute;

    fn clear_transients(&mut self) {}

    fn delta_from(&self, base: &Self) -> Self {
        Self {
            transactions: self.transactions.saturating_sub(base.transactions),
            flow: self.flow.delta_from(&base.flow),
        }
    }

    fn attribute(&self, attribute: TagAttribute) -> Option<Decimal> {
        Some(match attribute {
            TagAttribute::Transactions => Decimal::from(self.transactions),
            TagAttribute::Income => self.flow.income,
            TagAttribute::Expense => self.flow.expense,
            TagAttribute::Profit => self.flow.profit(),
        })
    }

    fn is_zero(&self) -> bool {
        self.transactions == 0 && self.flow.is_zero()
    }
}
