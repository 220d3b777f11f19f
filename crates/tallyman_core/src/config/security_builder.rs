//! Security builder for the data set DSL

use crate::model::SecurityClass;

/// Builder for creating securities with a fluent API
#[derive(Debug, Clone)]
pub struct SecurityBuilder {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) symbol: Option<String>,
    pub(crate) class: SecurityClass,
    pub(crate) issuer: String,
    pub(crate) currency: Option<String>,
}

impl SecurityBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>, issuer: impl Into<String>, class: SecurityClass) -> Self {
        Self {
            name: name.into(),
            description: None,
            symbol: None,
            class,
            issuer: issuer.into(),
            currency: None,
        }
    }

    #[must_use]
    pub fn shares(name: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self::new(name, issuer, SecurityClass::Shares)
    }

    #[must_use]
    pub fn unit_trust(name: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self::new(name, issuer, SecurityClass::UnitTrust)
    }

    /// Life assurance bond; its gains are chargeable
    #[must_use]
    pub fn life_bond(name: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self::new(name, issuer, SecurityClass::LifeBond)
    }

    #[must_use]
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    #[must_use]
    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Currency code; defaults to the reporting currency
    #[must_use]
    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }
}
