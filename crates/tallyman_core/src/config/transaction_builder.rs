//! Transaction builder for the data set DSL
//!
//! Transactions are declared as money moving from a source leg to a
//! destination leg. When the data set is built the legs are resolved and the
//! transaction is stored against whichever leg is not a payee.

use jiff::civil::Date;
use rust_decimal::Decimal;

/// A transaction leg referenced by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegRef {
    Account(String),
    Holding { portfolio: String, security: String },
    Payee(String),
}

impl LegRef {
    pub fn is_payee(&self) -> bool {
        matches!(self, LegRef::Payee(_))
    }
}

/// Builder for creating transactions with a fluent API
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    pub(crate) id: Option<u32>,
    pub(crate) date: Date,
    pub(crate) category: String,
    pub(crate) from: Option<LegRef>,
    pub(crate) to: Option<LegRef>,
    pub(crate) amount: Decimal,
    pub(crate) partner_amount: Option<Decimal>,
    pub(crate) from_units: Option<Decimal>,
    pub(crate) to_units: Option<Decimal>,
    pub(crate) tax_credit: Option<Decimal>,
    pub(crate) employer_ni: Option<Decimal>,
    pub(crate) employee_ni: Option<Decimal>,
    pub(crate) benefit: Option<Decimal>,
    pub(crate) withheld: Option<Decimal>,
    pub(crate) returned_cash: Option<(Decimal, String)>,
    pub(crate) dilution: Option<Decimal>,
    pub(crate) tags: Vec<String>,
    pub(crate) deleted: bool,
}

impl TransactionBuilder {
    #[must_use]
    pub fn new(date: Date, category: impl Into<String>) -> Self {
        Self {
            id: None,
            date,
            category: category.into(),
            from: None,
            to: None,
            amount: Decimal::ZERO,
            partner_amount: None,
            from_units: None,
            to_units: None,
            tax_credit: None,
            employer_ni: None,
            employee_ni: None,
            benefit: None,
            withheld: None,
            returned_cash: None,
            dilution: None,
            tags: Vec::new(),
            deleted: false,
        }
    }

    /// Explicit id; otherwise ids are assigned in declaration order
    #[must_use]
    pub fn id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    // =========================================================================
    // Legs
    // =========================================================================

    #[must_use]
    pub fn from_payee(mut self, name: impl Into<String>) -> Self {
        self.from = Some(LegRef::Payee(name.into()));
        self
    }

    #[must_use]
    pub fn to_payee(mut self, name: impl Into<String>) -> Self {
        self.to = Some(LegRef::Payee(name.into()));
        self
    }

    #[must_use]
    pub fn from_account(mut self, name: impl Into<String>) -> Self {
        self.from = Some(LegRef::Account(name.into()));
        self
    }

    #[must_use]
    pub fn to_account(mut self, name: impl Into<String>) -> Self {
        self.to = Some(LegRef::Account(name.into()));
        self
    }

    #[must_use]
    pub fn from_holding(mut self, portfolio: impl Into<String>, security: impl Into<String>) -> Self {
        self.from = Some(LegRef::Holding {
            portfolio: portfolio.into(),
            security: security.into(),
        });
        self
    }

    #[must_use]
    pub fn to_holding(mut self, portfolio: impl Into<String>, security: impl Into<String>) -> Self {
        self.to = Some(LegRef::Holding {
            portfolio: portfolio.into(),
            security: security.into(),
        });
        self
    }

    // =========================================================================
    // Amounts
    // =========================================================================

    /// Amount in the currency of the source leg, or of the destination when
    /// the source is a payee
    #[must_use]
    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Amount in the currency of the other leg, when the currencies differ
    #[must_use]
    pub fn partner_amount(mut self, amount: Decimal) -> Self {
        self.partner_amount = Some(amount);
        self
    }

    /// Units leaving the source holding
    #[must_use]
    pub fn units_out(mut self, units: Decimal) -> Self {
        self.from_units = Some(-units.abs());
        self
    }

    /// Units arriving in the destination holding
    #[must_use]
    pub fn units_in(mut self, units: Decimal) -> Self {
        self.to_units = Some(units);
        self
    }

    /// Signed unit change of a split or adjustment; the holding is the source leg
    #[must_use]
    pub fn unit_change(mut self, units: Decimal) -> Self {
        self.from_units = Some(units);
        self
    }

    // =========================================================================
    // Tax items and corporate actions
    // =========================================================================

    #[must_use]
    pub fn tax_credit(mut self, amount: Decimal) -> Self {
        self.tax_credit = Some(amount);
        self
    }

    #[must_use]
    pub fn employer_ni(mut self, amount: Decimal) -> Self {
        self.employer_ni = Some(amount);
        self
    }

    #[must_use]
    pub fn employee_ni(mut self, amount: Decimal) -> Self {
        self.employee_ni = Some(amount);
        self
    }

    #[must_use]
    pub fn benefit(mut self, amount: Decimal) -> Self {
        self.benefit = Some(amount);
        self
    }

    #[must_use]
    pub fn withheld(mut self, amount: Decimal) -> Self {
        self.withheld = Some(amount);
        self
    }

    /// Cash paid out by a takeover into `account`
    #[must_use]
    pub fn returned_cash(mut self, amount: Decimal, account: impl Into<String>) -> Self {
        self.returned_cash = Some((amount, account.into()));
        self
    }

    /// Fraction of cost the original holding keeps on a demerger
    #[must_use]
    pub fn dilution(mut self, ratio: Decimal) -> Self {
        self.dilution = Some(ratio);
        self
    }

    #[must_use]
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tags.push(name.into());
        self
    }

    #[must_use]
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }
}
