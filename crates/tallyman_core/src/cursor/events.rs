//! Merges the sorted input streams into one chronological event sequence.

use jiff::civil::Date;

use crate::model::{DataSet, DepositRate, Event, EventKind, ExchangeRate, SecurityPrice, Transaction};

/// Yields prices, exchange rates, deposit rates, the opening-balance
/// pseudo-event and transactions in `(date, kind)` order.
///
/// The streams of the data set must already be sorted by date, as done by
/// [`crate::model::DataView::new`].
#[derive(Debug, Clone)]
pub struct EventCursor<'a> {
    prices: &'a [SecurityPrice],
    rates: &'a [ExchangeRate],
    deposit_rates: &'a [DepositRate],
    transactions: &'a [Transaction],
    next_price: usize,
    next_rate: usize,
    next_deposit_rate: usize,
    next_transaction: usize,
    opening_date: Option<Date>,
    skipped: usize,
}

impl<'a> EventCursor<'a> {
    pub fn new(data: &'a DataSet, start_date: Option<Date>) -> Self {
        let mut cursor = Self {
            prices: &data.prices,
            rates: &data.exchange_rates,
            deposit_rates: &data.deposit_rates,
            transactions: &data.transactions,
            next_price: 0,
            next_rate: 0,
            next_deposit_rate: 0,
            next_transaction: 0,
            opening_date: start_date,
            skipped: 0,
        };
        cursor.skip_deleted();
        cursor
    }

    /// Number of deleted transactions passed over so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn skip_deleted(&mut self) {
        while let Some(t) = self.transactions.get(self.next_transaction) {
            if !t.deleted {
                break;
            }
            self.next_transaction += 1;
            self.skipped += 1;
        }
    }

    fn head(&self, kind: EventKind) -> Option<Date> {
        match kind {
            EventKind::SecurityPrice => self.prices.get(self.next_price).map(|p| p.date),
            EventKind::ExchangeRate => self.rates.get(self.next_rate).map(|r| r.date),
            EventKind::DepositRate => self
                .deposit_rates
                .get(self.next_deposit_rate)
                .map(|r| r.date),
            EventKind::OpeningBalance => self.opening_date,
            EventKind::Transaction => self
                .transactions
                .get(self.next_transaction)
                .map(|t| t.date),
        }
    }

    /// Kind of the event `next_event` will return, without consuming it
    pub fn next_event_kind(&self) -> Option<EventKind> {
        const STREAMS: [EventKind; 4] = [
            EventKind::SecurityPrice,
            EventKind::ExchangeRate,
            EventKind::DepositRate,
            EventKind::Transaction,
        ];

        let earliest = STREAMS
            .iter()
            .filter_map(|&kind| self.head(kind).map(|date| (date, kind)))
            .min();

        let Some(opening) = self.opening_date else {
            return earliest.map(|(_, kind)| kind);
        };

        // Opening balances follow every price/rate on or before the start
        // date and precede every transaction.
        match earliest {
            Some((date, kind)) if kind != EventKind::Transaction && date <= opening => Some(kind),
            _ => Some(EventKind::OpeningBalance),
        }
    }

    pub fn next_event(&mut self) -> Option<Event<'a>> {
        let event = match self.next_event_kind()? {
            EventKind::SecurityPrice => {
                let price = &self.prices[self.next_price];
                self.next_price += 1;
                Event::SecurityPrice(price)
            }
            EventKind::ExchangeRate => {
                let rate = &self.rates[self.next_rate];
                self.next_rate += 1;
                Event::ExchangeRate(rate)
            }
            EventKind::DepositRate => {
                let rate = &self.deposit_rates[self.next_deposit_rate];
                self.next_deposit_rate += 1;
                Event::DepositRate(rate)
            }
            EventKind::OpeningBalance => {
                // Never dated after an event that is still pending
                let pending = self.head(EventKind::Transaction);
                let date = self.opening_date.take()?;
                Event::OpeningBalance(pending.map_or(date, |p| p.min(date)))
            }
            EventKind::Transaction => {
                let transaction = &self.transactions[self.next_transaction];
                self.next_transaction += 1;
                self.skip_deleted();
                Event::Transaction(transaction)
            }
        };
        Some(event)
    }
}

impl<'a> Iterator for EventCursor<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AccountId, CategoryId, CurrencyId, Direction, PayeeId, SecurityId, TransactionAsset,
        TransactionId,
    };
    use jiff::civil::date;
    use rust_decimal::Decimal;

    fn price(day: i8) -> SecurityPrice {
        SecurityPrice {
            security: SecurityId(0),
            date: date(2024, 1, day),
            price: Decimal::ONE,
        }
    }

    fn rate(day: i8) -> ExchangeRate {
        ExchangeRate {
            currency: CurrencyId(1),
            date: date(2024, 1, day),
            rate: Decimal::ONE,
        }
    }

    fn transaction(id: u32, day: i8, deleted: bool) -> Transaction {
        Transaction {
            id: TransactionId(id),
            date: date(2024, 1, day),
            account: TransactionAsset::Account(AccountId(0)),
            partner: TransactionAsset::Payee(PayeeId(0)),
            direction: Direction::To,
            category: CategoryId(0),
            amount: Decimal::ONE,
            partner_amount: None,
            account_units: None,
            partner_units: None,
            tax_credit: None,
            employer_ni: None,
            employee_ni: None,
            benefit: None,
            withheld: None,
            returned_cash: None,
            returned_cash_account: None,
            dilution: None,
            tags: Vec::new(),
            deleted,
        }
    }

    fn kinds(data: &DataSet) -> Vec<(Date, EventKind)> {
        EventCursor::new(data, data.effective_start_date())
            .map(|e| (e.date(), e.kind()))
            .collect()
    }

    #[test]
    fn test_same_date_priority() {
        let data = DataSet {
            prices: vec![price(1), price(2)],
            exchange_rates: vec![rate(2)],
            transactions: vec![transaction(1, 2, false)],
            ..DataSet::default()
        };
        assert_eq!(
            kinds(&data),
            vec![
                (date(2024, 1, 1), EventKind::SecurityPrice),
                (date(2024, 1, 1), EventKind::OpeningBalance),
                (date(2024, 1, 2), EventKind::SecurityPrice),
                (date(2024, 1, 2), EventKind::ExchangeRate),
                (date(2024, 1, 2), EventKind::Transaction),
            ]
        );
    }

    #[test]
    fn test_opening_balance_precedes_first_transaction() {
        let data = DataSet {
            prices: vec![price(1)],
            transactions: vec![transaction(1, 1, false)],
            ..DataSet::default()
        };
        assert_eq!(
            kinds(&data),
            vec![
                (date(2024, 1, 1), EventKind::SecurityPrice),
                (date(2024, 1, 1), EventKind::OpeningBalance),
                (date(2024, 1, 1), EventKind::Transaction),
            ]
        );
    }

    #[test]
    fn test_opening_balance_without_transactions() {
        let data = DataSet {
            prices: vec![price(3)],
            ..DataSet::default()
        };
        assert_eq!(
            kinds(&data),
            vec![
                (date(2024, 1, 3), EventKind::SecurityPrice),
                (date(2024, 1, 3), EventKind::OpeningBalance),
            ]
        );
    }

    #[test]
    fn test_empty_data_yields_nothing() {
        let data = DataSet::default();
        let mut cursor = EventCursor::new(&data, data.effective_start_date());
        assert_eq!(cursor.next_event_kind(), None);
        assert!(cursor.next_event().is_none());
    }

    #[test]
    fn test_deleted_transactions_are_skipped() {
        let data = DataSet {
            transactions: vec![
                transaction(1, 1, true),
                transaction(2, 2, false),
                transaction(3, 3, true),
            ],
            ..DataSet::default()
        };
        let mut cursor = EventCursor::new(&data, data.effective_start_date());
        let ids: Vec<_> = cursor
            .by_ref()
            .filter_map(|e| e.transaction_id())
            .collect();
        assert_eq!(ids, vec![TransactionId(2)]);
        assert_eq!(cursor.skipped(), 2);
    }

    #[test]
    fn test_sequence_is_non_decreasing() {
        let data = DataSet {
            prices: vec![price(1), price(5), price(9)],
            exchange_rates: vec![rate(3), rate(5)],
            transactions: vec![transaction(1, 2, false), transaction(2, 5, false)],
            ..DataSet::default()
        };
        let events = kinds(&data);
        assert_eq!(events.len(), 8);
        assert!(events.windows(2).all(|w| w[0] <= w[1]));
    }
}
