//! Tests for holdings and corporate actions
//!
//! These tests verify:
//! - Purchases and sales with unit-proportional cost
//! - Capital distributions under the large/small cash rule
//! - Reinvested and cash dividends
//! - Splits, demergers and takeovers conserve cost
//! - Portfolio transfers move cash and holdings together
//! - Chargeable gains are sliced by years held

use jiff::civil::date;

use super::support::*;
use crate::analysis::Analysis;
use crate::bucket::CashType;
use crate::config::{AccountBuilder, AnalysisConfig, SecurityBuilder};
use crate::error::AnalysisError;
use crate::model::{CategoryClass, PayeeClass, TaxBasisClass};

#[test]
fn test_purchase() {
    let ledger = Ledger::run(invested());

    let vod = ledger.holding("Trading", "VOD");
    assert_eq!(vod.units, d("100"));
    assert_eq!(vod.residual_cost, d("1000"));
    assert_eq!(vod.invested, d("1000"));
    assert_eq!(vod.valuation, d("1000"));
    assert_eq!(vod.start_date, Some(date(2024, 1, 10)));
    assert_eq!(ledger.account("Trading").valuation, d("4000"));
    assert_eq!(ledger.payee("Market"), Default::default());
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_sale_allows_unit_proportional_cost() {
    let ledger = Ledger::run(
        invested()
            .price("VOD", date(2024, 3, 1), d("12"))
            .transaction(
                on(2024, 3, 1, "Transfer")
                    .from_holding("Trading", "VOD")
                    .to_account("Trading")
                    .amount(d("600"))
                    .units_out(d("50")),
            ),
    );

    let vod = ledger.holding("Trading", "VOD");
    assert_eq!(vod.units, d("50"));
    assert_eq!(vod.residual_cost, d("500"));
    assert_eq!(vod.realised_gains, d("100"));
    assert_eq!(vod.valuation, d("600"));
    assert_eq!(vod.action.allowed_cost, Some(d("500")));
    assert_eq!(vod.action.capital_gain, Some(d("100")));

    assert_eq!(ledger.account("Trading").valuation, d("4600"));
    assert_eq!(ledger.tax_basis(TaxBasisClass::CapitalGains).gross, d("100"));
    assert_eq!(ledger.category("Capital Gain").income, d("100"));
    // 200 of price growth, of which 100 has since been realised
    assert_eq!(ledger.payee("Market").profit(), d("200"));
    assert_eq!(ledger.category("Market Growth").profit(), d("100"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_selling_more_than_held_fails() {
    let (data, _) = invested()
        .transaction(
            on(2024, 3, 1, "Transfer")
                .from_holding("Trading", "VOD")
                .to_account("Trading")
                .amount(d("1500"))
                .units_out(d("150")),
        )
        .build()
        .unwrap();

    let err = Analysis::run(data, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::InsufficientUnits { held, requested, .. }
            if held == d("100") && requested == d("150")
    ));
}

#[test]
fn test_small_capital_distribution() {
    let ledger = Ledger::run(
        invested().transaction(
            on(2024, 2, 1, "Transfer")
                .from_holding("Trading", "VOD")
                .to_account("Trading")
                .amount(d("200")),
        ),
    );

    let vod = ledger.holding("Trading", "VOD");
    assert_eq!(vod.units, d("100"));
    assert_eq!(vod.residual_cost, d("800"));
    assert_eq!(vod.realised_gains, d("0"));
    assert_eq!(vod.action.cash_type, Some(CashType::SmallCash));
    assert_eq!(vod.action.consideration, Some(d("1200")));
    assert_eq!(vod.action.allowed_cost, Some(d("200")));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_large_capital_distribution() {
    let ledger = Ledger::run(
        invested().transaction(
            on(2024, 2, 1, "Transfer")
                .from_holding("Trading", "VOD")
                .to_account("Trading")
                .amount(d("4000")),
        ),
    );

    // 1000 × 4000 / (4000 + 1000)
    let vod = ledger.holding("Trading", "VOD");
    assert_eq!(vod.action.cash_type, Some(CashType::LargeCash));
    assert_eq!(vod.action.allowed_cost, Some(d("800")));
    assert_eq!(vod.residual_cost, d("200"));
    assert_eq!(vod.realised_gains, d("3200"));
    assert_eq!(ledger.tax_basis(TaxBasisClass::CapitalGains).gross, d("3200"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_reinvested_dividend_buys_units() {
    let ledger = Ledger::run(
        invested().transaction(
            on(2024, 2, 1, "Dividend")
                .from_holding("Trading", "VOD")
                .to_holding("Trading", "VOD")
                .amount(d("100"))
                .units_in(d("10")),
        ),
    );

    let vod = ledger.holding("Trading", "VOD");
    assert_eq!(vod.units, d("110"));
    assert_eq!(vod.residual_cost, d("1100"));
    assert_eq!(vod.invested, d("1100"));
    assert_eq!(vod.dividend, d("0"));
    assert_eq!(vod.valuation, d("1100"));
    assert_eq!(ledger.payee("Vodafone").income, d("100"));
    assert_eq!(ledger.category("Dividend").income, d("100"));
    assert_eq!(ledger.tax_basis(TaxBasisClass::Dividend).gross, d("100"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_cash_dividend_in_tax_free_portfolio() {
    let ledger = Ledger::run(
        invested()
            .transaction(
                on(2024, 1, 15, "Transfer")
                    .from_account("Current")
                    .to_holding("ISA", "VOD")
                    .amount(d("200"))
                    .units_in(d("20")),
            )
            .transaction(
                on(2024, 3, 1, "Dividend")
                    .from_holding("ISA", "VOD")
                    .to_account("ISA")
                    .amount(d("15")),
            ),
    );

    assert_eq!(ledger.holding("ISA", "VOD").dividend, d("15"));
    assert_eq!(ledger.account("ISA").valuation, d("15"));
    assert_eq!(ledger.tax_basis(TaxBasisClass::TaxFree).gross, d("15"));
    assert_eq!(ledger.tax_basis(TaxBasisClass::Dividend).gross, d("0"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_stock_split_keeps_cost() {
    let ledger = Ledger::run(
        invested().transaction(
            on(2024, 6, 1, "Split")
                .from_holding("Trading", "VOD")
                .to_holding("Trading", "VOD")
                .unit_change(d("100")),
        ),
    );

    let vod = ledger.holding("Trading", "VOD");
    assert_eq!(vod.units, d("200"));
    assert_eq!(vod.residual_cost, d("1000"));
    assert_eq!(vod.invested, d("1000"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_demerger_moves_diluted_cost() {
    let ledger = Ledger::run(
        invested()
            .security(SecurityBuilder::shares("SPIN", "Vodafone"))
            .price("SPIN", date(2024, 6, 1), d("4"))
            .transaction(
                on(2024, 6, 1, "Demerger")
                    .from_holding("Trading", "VOD")
                    .to_holding("Trading", "SPIN")
                    .dilution(d("0.8"))
                    .units_in(d("50")),
            ),
    );

    let vod = ledger.holding("Trading", "VOD");
    let spin = ledger.holding("Trading", "SPIN");
    assert_eq!(vod.units, d("100"));
    assert_eq!(vod.residual_cost, d("800"));
    assert_eq!(spin.units, d("50"));
    assert_eq!(spin.residual_cost, d("200"));
    assert_eq!(spin.invested, d("200"));
    assert_eq!(spin.action.xferred_value, Some(d("200")));
    assert_eq!(vod.residual_cost + spin.residual_cost, d("1000"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_demerger_gives_up_source_units() {
    let ledger = Ledger::run(
        invested()
            .security(SecurityBuilder::shares("SPIN", "Vodafone"))
            .price("SPIN", date(2024, 6, 1), d("4"))
            .transaction(
                on(2024, 6, 1, "Demerger")
                    .from_holding("Trading", "VOD")
                    .to_holding("Trading", "SPIN")
                    .dilution(d("0.8"))
                    .units_out(d("50"))
                    .units_in(d("50")),
            ),
    );

    let vod = ledger.holding("Trading", "VOD");
    let spin = ledger.holding("Trading", "SPIN");
    assert_eq!(vod.units, d("50"));
    assert_eq!(vod.valuation, d("500"));
    assert_eq!(vod.residual_cost, d("800"));
    assert_eq!(spin.units, d("50"));
    assert_eq!(spin.residual_cost, d("200"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_demerger_of_more_units_than_held_fails() {
    let (data, _) = invested()
        .security(SecurityBuilder::shares("SPIN", "Vodafone"))
        .transaction(
            on(2024, 6, 1, "Demerger")
                .from_holding("Trading", "VOD")
                .to_holding("Trading", "SPIN")
                .dilution(d("0.8"))
                .units_out(d("150"))
                .units_in(d("50")),
        )
        .build()
        .unwrap();

    let err = Analysis::run(data, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::InsufficientUnits { .. }));
}

#[test]
fn test_takeover_for_shares_only() {
    let ledger = Ledger::run(
        invested()
            .price("NEWCO", date(2024, 4, 1), d("18"))
            .transaction(
                on(2024, 4, 1, "Takeover")
                    .from_holding("Trading", "VOD")
                    .to_holding("Trading", "NEWCO")
                    .units_in(d("50")),
            ),
    );

    let vod = ledger.holding("Trading", "VOD");
    let newco = ledger.holding("Trading", "NEWCO");
    assert_eq!(vod.units, d("0"));
    assert_eq!(vod.residual_cost, d("0"));
    assert_eq!(vod.action.xferred_cost, Some(d("-1000")));
    assert_eq!(newco.units, d("50"));
    assert_eq!(newco.residual_cost, d("1000"));
    assert_eq!(newco.invested, d("1000"));
    assert_eq!(newco.valuation, d("900"));
    assert_eq!(newco.action.xferred_value, Some(d("900")));
    assert_eq!(newco.start_date, Some(date(2024, 1, 10)));
    // The offer is worth 100 less than the holding was
    assert_eq!(ledger.payee("Market").profit(), d("-100"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_takeover_with_small_cash() {
    let ledger = Ledger::run(
        invested()
            .price("NEWCO", date(2024, 4, 1), d("18"))
            .transaction(
                on(2024, 4, 1, "Takeover")
                    .from_holding("Trading", "VOD")
                    .to_holding("Trading", "NEWCO")
                    .units_in(d("50"))
                    .returned_cash(d("300"), "Trading"),
            ),
    );

    let vod = ledger.holding("Trading", "VOD");
    let newco = ledger.holding("Trading", "NEWCO");
    assert_eq!(vod.action.cash_type, Some(CashType::SmallCash));
    assert_eq!(vod.action.allowed_cost, Some(d("300")));
    assert_eq!(vod.action.returned_cash, Some(d("300")));
    assert_eq!(newco.residual_cost, d("700"));
    assert_eq!(ledger.account("Trading").valuation, d("4300"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_takeover_with_large_cash_conserves_cost() {
    let ledger = Ledger::run(
        invested()
            .price("NEWCO", date(2024, 4, 1), d("18"))
            .transaction(
                on(2024, 4, 1, "Takeover")
                    .from_holding("Trading", "VOD")
                    .to_holding("Trading", "NEWCO")
                    .units_in(d("50"))
                    .returned_cash(d("4000"), "Trading"),
            ),
    );

    let vod = ledger.holding("Trading", "VOD");
    let newco = ledger.holding("Trading", "NEWCO");
    let allowed = vod.action.allowed_cost.unwrap();
    assert_eq!(vod.action.cash_type, Some(CashType::LargeCash));
    assert_eq!(allowed, d("816.33"));
    assert_eq!(vod.action.capital_gain, Some(d("3183.67")));
    assert_eq!(allowed + newco.residual_cost, d("1000"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_takeover_cash_into_auto_expense_account_is_spent() {
    let ledger = Ledger::run(
        invested()
            .category("Pocket Money", CategoryClass::Expense)
            .payee("Sundries", PayeeClass::Other)
            .account(
                AccountBuilder::cash("Wallet", "Barclays").auto_expense("Pocket Money", "Sundries"),
            )
            .price("NEWCO", date(2024, 4, 1), d("18"))
            .transaction(
                on(2024, 4, 1, "Takeover")
                    .from_holding("Trading", "VOD")
                    .to_holding("Trading", "NEWCO")
                    .units_in(d("50"))
                    .returned_cash(d("300"), "Wallet"),
            ),
    );

    let vod = ledger.holding("Trading", "VOD");
    assert_eq!(vod.action.returned_cash, Some(d("300")));
    assert_eq!(ledger.account("Wallet").valuation, d("0"));
    assert_eq!(ledger.account("Trading").valuation, d("4000"));
    assert_eq!(ledger.payee("Sundries").expense, d("300"));
    assert_eq!(ledger.category("Pocket Money").expense, d("300"));
    assert_eq!(ledger.tax_basis(TaxBasisClass::Expense).gross, d("-300"));
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_takeover_without_new_units_fails() {
    let (data, _) = invested()
        .transaction(
            on(2024, 4, 1, "Takeover")
                .from_holding("Trading", "VOD")
                .to_holding("Trading", "NEWCO"),
        )
        .build()
        .unwrap();

    let err = Analysis::run(data, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::MissingSecondaryAsset { .. }));
}

#[test]
fn test_portfolio_transfer_moves_cash_and_holdings() {
    let ledger = Ledger::run(
        invested().transaction(
            on(2024, 5, 1, "Move Portfolio")
                .from_account("Trading")
                .to_account("ISA"),
        ),
    );

    assert_eq!(ledger.account("Trading").valuation, d("0"));
    assert_eq!(ledger.account("ISA").valuation, d("4000"));

    let old = ledger.holding("Trading", "VOD");
    let new = ledger.holding("ISA", "VOD");
    assert_eq!(old.units, d("0"));
    assert_eq!(old.action.xferred_cost, Some(d("-1000")));
    assert_eq!(new.units, d("100"));
    assert_eq!(new.residual_cost, d("1000"));
    assert_eq!(new.invested, d("1000"));
    assert_eq!(new.valuation, d("1000"));

    let isa = ledger.names.account_id("ISA").unwrap();
    let totals = ledger.analysis.totals().portfolio(isa).unwrap();
    assert_eq!(totals.total().valuation, d("5000"));
    assert_eq!(ledger.payee("Market"), Default::default());
    assert_reconciles(&ledger.analysis);
}

#[test]
fn test_chargeable_gain_is_sliced_by_years_held() {
    let ledger = Ledger::run(
        household()
            .start(date(2021, 1, 1))
            .payee("Prudential", PayeeClass::Institution)
            .account(AccountBuilder::portfolio("Bonds", "Prudential").opening_balance(d("1000")))
            .security(SecurityBuilder::life_bond("Bond", "Prudential"))
            .price("Bond", date(2021, 3, 1), d("1"))
            .price("Bond", date(2024, 2, 28), d("1.3"))
            .transaction(
                on(2021, 3, 1, "Transfer")
                    .from_account("Bonds")
                    .to_holding("Bonds", "Bond")
                    .amount(d("1000"))
                    .units_in(d("1000")),
            )
            .transaction(
                on(2024, 2, 28, "Transfer")
                    .from_holding("Bonds", "Bond")
                    .to_account("Bonds")
                    .amount(d("1300"))
                    .units_out(d("1000")),
            ),
    );

    let bond = ledger.holding("Bonds", "Bond");
    assert_eq!(bond.units, d("0"));
    assert_eq!(bond.realised_gains, d("300"));
    assert_eq!(bond.action.years, Some(3));
    assert_eq!(bond.action.sliced_gain, Some(d("100")));
    assert_eq!(ledger.tax_basis(TaxBasisClass::ChargeableGains).gross, d("300"));
    assert_eq!(ledger.tax_basis(TaxBasisClass::CapitalGains).gross, d("0"));
    assert_eq!(ledger.category("Chargeable Gain").income, d("300"));
    assert_reconciles(&ledger.analysis);
}
