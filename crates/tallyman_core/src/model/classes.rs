//! Classification metadata for ledger entities
//!
//! Category classes drive how a transaction is processed and which tax basis
//! it lands in. Payee classes identify the singular system payees.

use serde::{Deserialize, Serialize};

/// Broad kind of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Deposit,
    Cash,
    Loan,
    Portfolio,
}

/// Deposit sub-classification, used to resolve interest tax treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DepositClass {
    #[default]
    Checking,
    Savings,
    /// Pays interest without deduction of tax
    GrossSavings,
    TaxFreeSavings,
    Bond,
    PeerToPeer,
}

impl DepositClass {
    pub fn is_tax_free(&self) -> bool {
        matches!(self, DepositClass::TaxFreeSavings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SecurityClass {
    #[default]
    Shares,
    UnitTrust,
    /// Life assurance bond; gains are chargeable events
    LifeBond,
    Endowment,
    Asset,
    /// Singular entitlement funded by employee national insurance
    StatePension,
}

impl SecurityClass {
    /// Gains on these securities are taxed as chargeable gains
    pub fn is_chargeable(&self) -> bool {
        matches!(self, SecurityClass::LifeBond | SecurityClass::Endowment)
    }

    pub fn is_singular(&self) -> bool {
        matches!(self, SecurityClass::StatePension)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PayeeClass {
    /// Singular counterparty for market movements and realised gains
    Market,
    /// Singular counterparty for tax and national insurance
    TaxMan,
    Employer,
    Institution,
    Government,
    Individual,
    #[default]
    Other,
}

impl PayeeClass {
    pub fn is_singular(&self) -> bool {
        matches!(self, PayeeClass::Market | PayeeClass::TaxMan)
    }
}

/// Classification of a transaction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryClass {
    // Income
    Salary,
    StatePension,
    OtherIncome,
    RentalIncome,
    RoomRentalIncome,
    GiftedIncome,
    Inheritance,
    Interest,
    TaxedInterest,
    GrossInterest,
    TaxFreeInterest,
    PeerToPeerInterest,
    Dividend,
    ShareDividend,
    UnitTrustDividend,
    ForeignDividend,
    TaxFreeDividend,
    LoyaltyBonus,
    TaxFreeLoyaltyBonus,
    Cashback,
    LoanInterestEarned,

    // Expense
    Expense,
    LocalTaxes,
    IncomeTax,
    LoanInterestCharged,
    WriteOff,
    BadDebtCapital,
    BadDebtInterest,

    // Transfers and structural security events
    Transfer,
    StockSplit,
    UnitsAdjust,
    StockDeMerger,
    StockTakeOver,
    PortfolioXfer,

    // Singular auto-booking categories
    OpeningBalance,
    TaxCredit,
    EmployeeNatIns,
    EmployerNatIns,
    Benefit,
    Withheld,
    MarketGrowth,
    CurrencyFluctuation,
    CapitalGain,
    ChargeableGain,

    // Parent-only grouping categories
    IncomeTotals,
    ExpenseTotals,
    Totals,
}

impl CategoryClass {
    /// Categories whose main booking counts as income
    pub fn is_income(&self) -> bool {
        use CategoryClass::*;
        matches!(
            self,
            Salary
                | StatePension
                | OtherIncome
                | RentalIncome
                | RoomRentalIncome
                | GiftedIncome
                | Inheritance
                | Interest
                | TaxedInterest
                | GrossInterest
                | TaxFreeInterest
                | PeerToPeerInterest
                | Dividend
                | ShareDividend
                | UnitTrustDividend
                | ForeignDividend
                | TaxFreeDividend
                | LoyaltyBonus
                | TaxFreeLoyaltyBonus
                | Cashback
                | LoanInterestEarned
                | OpeningBalance
        )
    }

    /// Transfers and structural security events carry no profit or tax effect
    pub fn is_transfer(&self) -> bool {
        use CategoryClass::*;
        matches!(
            self,
            Transfer | StockSplit | UnitsAdjust | StockDeMerger | StockTakeOver | PortfolioXfer
        )
    }

    pub fn is_dividend(&self) -> bool {
        use CategoryClass::*;
        matches!(
            self,
            Dividend | ShareDividend | UnitTrustDividend | ForeignDividend | TaxFreeDividend
        )
    }

    pub fn is_interest(&self) -> bool {
        use CategoryClass::*;
        matches!(
            self,
            Interest | TaxedInterest | GrossInterest | TaxFreeInterest | PeerToPeerInterest
        )
    }

    pub fn is_bad_debt(&self) -> bool {
        matches!(self, CategoryClass::BadDebtCapital | CategoryClass::BadDebtInterest)
    }

    /// Classes whose counterparty account or holding is replaced by its parent payee
    pub fn needs_parent_substitution(&self) -> bool {
        use CategoryClass::*;
        self.is_interest()
            || self.is_dividend()
            || matches!(
                self,
                LoyaltyBonus
                    | TaxFreeLoyaltyBonus
                    | LoanInterestEarned
                    | Cashback
                    | WriteOff
                    | LoanInterestCharged
                    | RentalIncome
                    | RoomRentalIncome
            )
    }

    /// Classes that exist exactly once and are booked automatically
    pub fn is_singular(&self) -> bool {
        use CategoryClass::*;
        matches!(
            self,
            OpeningBalance
                | TaxCredit
                | EmployeeNatIns
                | EmployerNatIns
                | Benefit
                | Withheld
                | MarketGrowth
                | CurrencyFluctuation
                | CapitalGain
                | ChargeableGain
        )
    }

    /// Every singular class, in registration order
    pub const SINGULAR: [CategoryClass; 10] = [
        CategoryClass::OpeningBalance,
        CategoryClass::TaxCredit,
        CategoryClass::EmployeeNatIns,
        CategoryClass::EmployerNatIns,
        CategoryClass::Benefit,
        CategoryClass::Withheld,
        CategoryClass::MarketGrowth,
        CategoryClass::CurrencyFluctuation,
        CategoryClass::CapitalGain,
        CategoryClass::ChargeableGain,
    ];

    pub fn is_totals(&self) -> bool {
        use CategoryClass::*;
        matches!(self, IncomeTotals | ExpenseTotals | Totals)
    }
}

/// Tax treatment bucket that category classes map onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxBasisClass {
    Salary,
    RentalIncome,
    RoomRental,
    OtherIncome,
    TaxedInterest,
    UntaxedInterest,
    PeerToPeerInterest,
    Dividend,
    UnitTrustDividend,
    ForeignDividend,
    TaxFree,
    Market,
    CapitalGains,
    ChargeableGains,
    TaxPaid,
    Virtual,
    Expense,
}

/// Outcome of looking a category class up in the tax mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxMapping {
    Basis(TaxBasisClass),
    /// Transfers and structural security events
    NoEffect,
    /// Grouping classes that can never be attached to a transaction
    Unmapped,
}

/// Maps a category class onto its tax basis
pub fn tax_basis_for(class: CategoryClass) -> TaxMapping {
    use CategoryClass as C;
    use TaxBasisClass as T;

    let basis = match class {
        C::Salary | C::StatePension => T::Salary,
        C::OtherIncome => T::OtherIncome,
        C::RentalIncome => T::RentalIncome,
        C::RoomRentalIncome => T::RoomRental,
        C::Interest | C::TaxedInterest | C::LoyaltyBonus => T::TaxedInterest,
        C::GrossInterest | C::LoanInterestEarned => T::UntaxedInterest,
        C::PeerToPeerInterest => T::PeerToPeerInterest,
        C::Dividend | C::ShareDividend => T::Dividend,
        C::UnitTrustDividend => T::UnitTrustDividend,
        C::ForeignDividend => T::ForeignDividend,
        C::TaxFreeInterest
        | C::TaxFreeDividend
        | C::TaxFreeLoyaltyBonus
        | C::Cashback
        | C::GiftedIncome
        | C::Inheritance => T::TaxFree,
        C::Expense
        | C::LocalTaxes
        | C::LoanInterestCharged
        | C::WriteOff
        | C::BadDebtCapital
        | C::BadDebtInterest
        | C::Withheld => T::Expense,
        C::IncomeTax | C::TaxCredit | C::EmployeeNatIns | C::EmployerNatIns => T::TaxPaid,
        C::OpeningBalance | C::Benefit => T::Virtual,
        C::MarketGrowth | C::CurrencyFluctuation => T::Market,
        C::CapitalGain => T::CapitalGains,
        C::ChargeableGain => T::ChargeableGains,
        C::Transfer
        | C::StockSplit
        | C::UnitsAdjust
        | C::StockDeMerger
        | C::StockTakeOver
        | C::PortfolioXfer => return TaxMapping::NoEffect,
        C::IncomeTotals | C::ExpenseTotals | C::Totals => return TaxMapping::Unmapped,
    };
    TaxMapping::Basis(basis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfers_have_no_tax_basis() {
        assert_eq!(tax_basis_for(CategoryClass::Transfer), TaxMapping::NoEffect);
        assert_eq!(tax_basis_for(CategoryClass::StockTakeOver), TaxMapping::NoEffect);
        assert_eq!(tax_basis_for(CategoryClass::PortfolioXfer), TaxMapping::NoEffect);
    }

    #[test]
    fn grouping_classes_are_unmapped() {
        assert_eq!(tax_basis_for(CategoryClass::Totals), TaxMapping::Unmapped);
        assert_eq!(tax_basis_for(CategoryClass::IncomeTotals), TaxMapping::Unmapped);
    }

    #[test]
    fn singular_classes_all_map_to_a_basis() {
        for class in CategoryClass::SINGULAR {
            assert!(class.is_singular());
            assert!(
                matches!(tax_basis_for(class), TaxMapping::Basis(_)),
                "{class:?}"
            );
        }
    }

    #[test]
    fn substitution_classes() {
        assert!(CategoryClass::ForeignDividend.needs_parent_substitution());
        assert!(CategoryClass::GrossInterest.needs_parent_substitution());
        assert!(CategoryClass::RoomRentalIncome.needs_parent_substitution());
        assert!(!CategoryClass::Salary.needs_parent_substitution());
        assert!(!CategoryClass::Transfer.needs_parent_substitution());
    }
}
