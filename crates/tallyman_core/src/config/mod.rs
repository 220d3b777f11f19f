//! Analysis configuration
//!
//! [`AnalysisConfig`] holds the tunable rules of an analysis pass. Input data
//! is usually assembled with the builder DSL:
//!
//! ```ignore
//! use tallyman_core::config::{AccountBuilder, DataSetBuilder, TransactionBuilder};
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
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod account_builder;
pub mod builder;
pub mod metadata;
pub mod security_builder;
pub mod transaction_builder;

pub use account_builder::AccountBuilder;
pub use builder::{
    DataSetBuilder, MARKET_PAYEE, STATE_PENSION_SECURITY, TAX_MAN_PAYEE, singular_category_name,
};
pub use metadata::{DataSetMetadata, EntityMetadata, NameTable};
pub use security_builder::SecurityBuilder;
pub use transaction_builder::TransactionBuilder;

fn default_true() -> bool {
    true
}

/// Thresholds of the large/small cash test applied to capital distributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GainsRules {
    /// Cash must exceed this amount to count as large
    pub large_cash_threshold: Decimal,
    /// ...and exceed this fraction of the total consideration
    pub large_cash_fraction: Decimal,
}

impl Default for GainsRules {
    fn default() -> Self {
        Self {
            large_cash_threshold: Decimal::from(3000),
            large_cash_fraction: Decimal::new(5, 2),
        }
    }
}

/// Settings of an analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub gains: GainsRules,
    /// Compare the reconciled dimensions whenever totals are produced
    #[serde(default = "default_true")]
    pub check_consistency: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            gains: GainsRules::default(),
            check_consistency: true,
        }
    }
}
