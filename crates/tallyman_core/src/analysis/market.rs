//! Market reconciliation
//!
//! Valuation changes not explained by booked flows are collected per event
//! and booked against the singular Market payee when the event finishes.

use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::{CategoryClass, TaxBasisClass};

use super::state::AnalysisState;

/// Market movements accumulated during the current event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MarketTotals {
    /// Holding valuation change net of invested cash, realised gains and FX
    pub growth: Decimal,
    /// Valuation change of foreign buckets not explained by their flows
    pub fluctuation: Decimal,
    pub capital_gains: Decimal,
    pub chargeable_gains: Decimal,
}

impl MarketTotals {
    pub fn is_zero(&self) -> bool {
        self.growth.is_zero()
            && self.fluctuation.is_zero()
            && self.capital_gains.is_zero()
            && self.chargeable_gains.is_zero()
    }

    pub fn total(&self) -> Decimal {
        self.growth + self.fluctuation + self.capital_gains + self.chargeable_gains
    }
}

/// Book the accumulated market totals and reset them.
///
/// Returns whether anything was booked.
pub(crate) fn flush(state: &mut AnalysisState<'_>) -> Result<bool> {
    let totals = std::mem::take(&mut state.market);
    if totals.is_zero() {
        return Ok(false);
    }

    let data = state.data;
    let market = data.market_payee()?;
    state.payee(market).book_signed(totals.total());

    let unrealised = totals.growth + totals.fluctuation;
    if !totals.growth.is_zero() || !totals.fluctuation.is_zero() {
        let growth = data.singular_category(CategoryClass::MarketGrowth)?;
        let fluct = data.singular_category(CategoryClass::CurrencyFluctuation)?;
        state.category(growth).book_signed(totals.growth);
        state.category(fluct).book_signed(totals.fluctuation);
        state.tax_basis(TaxBasisClass::Market).book(unrealised);
    }

    if !totals.capital_gains.is_zero() {
        let category = data.singular_category(CategoryClass::CapitalGain)?;
        state.category(category).book_signed(totals.capital_gains);
        state
            .tax_basis(TaxBasisClass::CapitalGains)
            .book(totals.capital_gains);
    }

    if !totals.chargeable_gains.is_zero() {
        let category = data.singular_category(CategoryClass::ChargeableGain)?;
        state.category(category).book_signed(totals.chargeable_gains);
        state
            .tax_basis(TaxBasisClass::ChargeableGains)
            .book(totals.chargeable_gains);
    }

    tracing::trace!(
        growth = %totals.growth,
        fluctuation = %totals.fluctuation,
        gains = %totals.capital_gains,
        chargeable = %totals.chargeable_gains,
        "market totals flushed"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_sums_every_component() {
        let totals = MarketTotals {
            growth: Decimal::from(10),
            fluctuation: Decimal::from(-3),
            capital_gains: Decimal::from(5),
            chargeable_gains: Decimal::ONE,
        };
        assert!(!totals.is_zero());
        assert_eq!(totals.total(), Decimal::from(13));
        assert!(MarketTotals::default().is_zero());
    }
}
