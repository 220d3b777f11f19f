use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::data::{DepositRate, ExchangeRate, SecurityPrice};
use super::ids::{EventId, TransactionId};
use super::transaction::Transaction;

/// Kind of event yielded by the event cursor.
///
/// Declaration order is the priority used to break ties between events on
/// the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    SecurityPrice,
    ExchangeRate,
    DepositRate,
    OpeningBalance,
    Transaction,
}

/// A single event of the merged input streams
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    SecurityPrice(&'a SecurityPrice),
    ExchangeRate(&'a ExchangeRate),
    DepositRate(&'a DepositRate),
    /// Pseudo-event booking every account's opening balance
    OpeningBalance(Date),
    Transaction(&'a Transaction),
}

impl Event<'_> {
    pub fn date(&self) -> Date {
        match self {
            Event::SecurityPrice(p) => p.date,
            Event::ExchangeRate(r) => r.date,
            Event::DepositRate(r) => r.date,
            Event::OpeningBalance(date) => *date,
            Event::Transaction(t) => t.date,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::SecurityPrice(_) => EventKind::SecurityPrice,
            Event::ExchangeRate(_) => EventKind::ExchangeRate,
            Event::DepositRate(_) => EventKind::DepositRate,
            Event::OpeningBalance(_) => EventKind::OpeningBalance,
            Event::Transaction(_) => EventKind::Transaction,
        }
    }

    pub fn transaction_id(&self) -> Option<TransactionId> {
        match self {
            Event::Transaction(t) => Some(t.id),
            _ => None,
        }
    }
}

/// Identifies the event a bucket snapshot was taken for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStamp {
    pub id: EventId,
    pub date: Date,
    pub transaction: Option<TransactionId>,
}

impl EventStamp {
    pub fn for_event(id: EventId, event: &Event<'_>) -> Self {
        Self {
            id,
            date: event.date(),
            transaction: event.transaction_id(),
        }
    }
}
