//! Personal ledger analysis library
//!
//! This crate replays a household ledger (accounts, security holdings,
//! payees, categories, tags, prices and exchange rates) in date order and
//! keeps a value history for every dimension. It supports:
//! - Deposit, cash, loan and portfolio accounts in any currency
//! - Security transfers, dividends, splits, demergers and takeovers
//! - Capital and chargeable gains with the large/small cash rule
//! - Tax basis bookings for tax credits, national insurance and benefits
//! - Dated and ranged views derived from a single pass
//! - A cross-check that accounts, payees, categories and tax bases reconcile
//!
//! # Builder DSL
//!
//! ```ignore
//! use tallyman_core::{AccountBuilder, Analysis, AnalysisConfig, DataSetBuilder, TransactionBuilder};
//!
//! let (data, metadata) = DataSetBuilder::new()
//!     .start(date(2024, 1, 1))
//!     .payee("Barclays", PayeeClass::Institution)
//!     .payee("Employer", PayeeClass::Employer)
//!     .category("Salary", CategoryClass::Salary)
//!     .account(AccountBuilder::deposit("Current", "Barclays").opening_balance(d("500")))
//!     .transaction(
//!         TransactionBuilder::new(date(2024, 1, 31), "Salary")
//!             .from_payee("Employer")
//!             .to_account("Current")
//!             .amount(d("2500")),
//!     )
//!     .build()?;
//!
//! let analysis = Analysis::run(data, &AnalysisConfig::default())?;
//! let january = analysis.dated(date(2024, 1, 31));
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod bucket;
pub mod cursor;
pub mod date_math;
pub mod error;
pub mod metrics;
pub mod money;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{Analysis, AnalysisView, ConsistencyReport, Totals};
pub use config::{
    AccountBuilder, AnalysisConfig, DataSetBuilder, DataSetMetadata, GainsRules, SecurityBuilder,
    TransactionBuilder,
};
pub use error::{AnalysisError, BuildError, DataIntegrityWarning, Result};
pub use metrics::AnalysisMetrics;
pub use model::{DataSet, DataView, DateRange};
