use rust_decimal::Decimal;
use serde::Serialize;

use super::BucketValues;

/// Totals of one tax treatment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaxBasisValues {
    /// Income before deductions at source
    pub gross: Decimal,
    /// Money actually received or paid
    pub nett: Decimal,
    pub tax_credit: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxBasisAttribute {
    Gross,
    Nett,
    TaxCredit,
}

impl TaxBasisValues {
    pub(crate) fn book(&mut self, amount: Decimal) {
        self.gross += amount;
        self.nett += amount;
    }

    pub(crate) fn accumulate(&mut self, other: &TaxBasisValues) {
        self.gross += other.gross;
        self.nett += other.nett;
        self.tax_credit += other.tax_credit;
    }
}

impl BucketValues for TaxBasisValues {
    type Attribute = TaxBasisAttribute;

    fn clear_transients(&mut self) {}

    fn delta_from(&self, base: &Self) -> Self {
        Self {
            gross: self.gross - base.gross,
            nett: self.nett - base.nett,
            tax_credit: self.tax_credit - base.tax_credit,
        }
    }

    fn attribute(&self, attribute: TaxBasisAttribute) -> Option<Decimal> {
        Some(match attribute {
            TaxBasisAttribute::Gross => self.gross,
            TaxBasisAttribute::Nett => self.nett,
            TaxBasisAttribute::TaxCredit => self.tax_credit,
        })
    }

    fn is_zero(&self) -> bool {
        self.gross.is_zero() && self.nett.is_zero() && self.tax_credit.is_zero()
    }
}
