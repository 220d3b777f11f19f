mod events;
mod rates;

pub use events::EventCursor;
pub use rates::{DepositRateCursor, DepositTerms, ExchangeRateCursor, PriceCursor, RateCursor};
