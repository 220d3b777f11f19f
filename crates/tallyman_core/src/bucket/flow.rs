use rust_decimal::Decimal;
use serde::Serialize;

use crate::money::split_signed;

use super::BucketValues;

/// Income and expense totals of a payee or category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlowValues {
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAttribute {
    Income,
    Expense,
    Profit,
}

impl FlowValues {
    pub fn profit(&self) -> Decimal {
        self.income - self.expense
    }

    /// Book an amount of money coming to us under an income or expense heading.
    ///
    /// Income headings grow their income; expense headings shrink their
    /// expense (a refund) or grow it when `amount` is negative.
    pub(crate) fn book_by_nature(&mut self, is_income: bool, amount: Decimal) {
        if is_income {
            self.income += amount;
        } else {
            self.expense -= amount;
        }
    }

    /// Book a signed amount by its sign: gains to income, losses to expense
    pub(crate) fn book_signed(&mut self, amount: Decimal) {
        let (income, expense) = split_signed(amount);
        self.income += income;
        self.expense += expense;
    }

    pub(crate) fn accumulate(&mut self, other: &FlowValues) {
        self.income += other.income;
        self.expense += other.expense;
    }
}

impl BucketValues for FlowValues {
    type Attribute = FlowAttribute;

    fn clear_transients(&mut self) {}

    fn delta_from(&self, base: &Self) -> Self {
        Self {
            income: self.income - base.income,
            expense: self.expense - base.expense,
        }
    }

    fn attribute(&self, attribute: FlowAttribute) -> Option<Decimal> {
        Some(match attribute {
            FlowAttribute::Income => self.income,
            FlowAttribute::Expense => self.expense,
            FlowAttribute::Profit => self.profit(),
        })
    }

    fn is_zero(&self) -> bool {
        self.income.is_zero() && self.expense.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_by_nature() {
        let mut income = FlowValues::default();
        income.book_by_nature(true, Decimal::from(100));
        income.book_by_nature(true, Decimal::from(-20));
        assert_eq!(income.income, Decimal::from(80));
        assert_eq!(income.profit(), Decimal::from(80));

        let mut expense = FlowValues::default();
        expense.book_by_nature(false, Decimal::from(-50));
        expense.book_by_nature(false, Decimal::from(10));
        assert_eq!(expense.expense, Decimal::from(40));
        assert_eq!(expense.profit(), Decimal::from(-40));
    }

    #[test]
    fn test_book_signed() {
        let mut v = FlowValues::default();
        v.book_signed(Decimal::from(30));
        v.book_signed(Decimal::from(-12));
        assert_eq!(v.income, Decimal::from(30));
        assert_eq!(v.expense, Decimal::from(12));
    }
}
