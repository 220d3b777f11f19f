//! Integration tests for the ledger analysis engine
//!
//! Tests are organized by topic:
//! - `reconciliation` - Accounts, payees, categories and tax bases agree
//! - `securities` - Purchases, disposals, dividends and corporate actions
//! - `currency` - Foreign accounts and exchange rate movements
//! - `history` - Dated and ranged views derived from one pass
//! - `events` - Event ordering, deleted transactions, tags and errors

mod securities;
mod support;
