//! Totals derived from the bucket registries
//!
//! Totals are recomputed from scratch every time, so producing them twice
//! gives the same result.

use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::bucket::{AccountValues, FlowValues, SecurityValues, TagValues, TaxBasisValues};
use crate::model::{AccountId, AccountKind, CategoryId, DataView};

use super::Buckets;

/// Valuation of a group of buckets now, at the base and the change between
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValueTotals {
    pub valuation: Decimal,
    pub base: Decimal,
    pub delta: Decimal,
}

impl ValueTotals {
    fn add(&mut self, valuation: Decimal, base: Decimal, delta: Decimal) {
        self.valuation += valuation;
        self.base += base;
        self.delta += delta;
    }

    fn accumulate(&mut self, other: &ValueTotals) {
        self.add(other.valuation, other.base, other.delta);
    }
}

/// Valuations per account kind; portfolios include their holdings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccountTotals {
    pub deposit: ValueTotals,
    pub cash: ValueTotals,
    pub loan: ValueTotals,
    pub portfolio: ValueTotals,
}

impl AccountTotals {
    pub fn kind(&self, kind: AccountKind) -> &ValueTotals {
        match kind {
            AccountKind::Deposit => &self.deposit,
            AccountKind::Cash => &self.cash,
            AccountKind::Loan => &self.loan,
            AccountKind::Portfolio => &self.portfolio,
        }
    }

    fn kind_mut(&mut self, kind: AccountKind) -> &mut ValueTotals {
        match kind {
            AccountKind::Deposit => &mut self.deposit,
            AccountKind::Cash => &mut self.cash,
            AccountKind::Loan => &mut self.loan,
            AccountKind::Portfolio => &mut self.portfolio,
        }
    }

    pub fn total(&self) -> ValueTotals {
        let mut total = self.deposit;
        total.accumulate(&self.cash);
        total.accumulate(&self.loan);
        total.accumulate(&self.portfolio);
        total
    }
}

/// Cash and holdings of one portfolio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortfolioTotals {
    pub cash: ValueTotals,
    pub holdings: ValueTotals,
    pub residual_cost: Decimal,
    pub realised_gains: Decimal,
    pub dividend: Decimal,
    pub invested: Decimal,
}

impl PortfolioTotals {
    pub fn total(&self) -> ValueTotals {
        let mut total = self.cash;
        total.accumulate(&self.holdings);
        total
    }

    pub fn unrealised_gains(&self) -> Decimal {
        self.holdings.valuation - self.residual_cost
    }
}

/// Totals of every dimension of an analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub accounts: AccountTotals,
    pub portfolios: FxHashMap<AccountId, PortfolioTotals>,
    /// Change of every payee, summed
    pub payees: FlowValues,
    /// Change of every category, summed once
    pub categories: FlowValues,
    /// Change of each category including all its descendants
    pub category_parents: FxHashMap<CategoryId, FlowValues>,
    pub tax_bases: TaxBasisValues,
    pub tags: TagValues,
}

impl Totals {
    pub fn portfolio(&self, id: AccountId) -> Option<&PortfolioTotals> {
        self.portfolios.get(&id)
    }

    /// Change of a category and its descendants
    pub fn category(&self, id: CategoryId) -> FlowValues {
        self.category_parents.get(&id).copied().unwrap_or_default()
    }
}

/// Recompute deltas and every total, storing registry totals on the way
pub(crate) fn produce(buckets: &mut Buckets, data: &DataView) -> Totals {
    buckets.calculate_deltas();

    let mut totals = Totals::default();
    account_totals(buckets, data, &mut totals);
    flow_totals(buckets, data, &mut totals);
    totals
}

fn account_totals(buckets: &mut Buckets, data: &DataView, totals: &mut Totals) {
    let mut registry_total = AccountValues::default();
    for bucket in buckets.accounts.iter() {
        let Ok(account) = data.account(bucket.key()) else {
            continue;
        };
        let (values, base, delta) = (bucket.values(), bucket.base(), bucket.delta());
        totals
            .accounts
            .kind_mut(account.kind())
            .add(values.valuation, base.valuation, delta.valuation);
        if account.kind() == AccountKind::Portfolio {
            totals
                .portfolios
                .entry(account.id)
                .or_default()
                .cash
                .add(values.valuation, base.valuation, delta.valuation);
        }
        registry_total.valuation += delta.valuation;
        registry_total.currency_fluct += delta.currency_fluct;
        registry_total.bad_debt += delta.bad_debt;
    }
    buckets.accounts.set_totals(registry_total);

    let mut holdings_total = SecurityValues::default();
    for bucket in buckets.holdings.iter() {
        let (values, base, delta) = (bucket.values(), bucket.base(), bucket.delta());
        totals
            .accounts
            .portfolio
            .add(values.valuation, base.valuation, delta.valuation);
        let portfolio = totals.portfolios.entry(bucket.key().portfolio).or_default();
        portfolio
            .holdings
            .add(values.valuation, base.valuation, delta.valuation);
        portfolio.residual_cost += values.residual_cost;
        portfolio.realised_gains += delta.realised_gains;
        portfolio.dividend += delta.dividend;
        portfolio.invested += delta.invested;

        holdings_total.residual_cost += delta.residual_cost;
        holdings_total.realised_gains += delta.realised_gains;
        holdings_total.funded += delta.funded;
        holdings_total.dividend += delta.dividend;
        holdings_total.invested += delta.invested;
        holdings_total.valuation += delta.valuation;
        holdings_total.market_growth += delta.market_growth;
        holdings_total.currency_fluct += delta.currency_fluct;
    }
    buckets.holdings.set_totals(holdings_total);
}

fn flow_totals(buckets: &mut Buckets, data: &DataView, totals: &mut Totals) {
    for bucket in buckets.payees.iter() {
        totals.payees.accumulate(bucket.delta());
    }
    buckets.payees.set_totals(totals.payees);

    for bucket in buckets.categories.iter() {
        let delta = bucket.delta();
        totals.categories.accumulate(delta);
        for id in ancestry(data, bucket.key()) {
            totals.category_parents.entry(id).or_default().accumulate(delta);
        }
    }
    buckets.categories.set_totals(totals.categories);

    for bucket in buckets.tax_bases.iter() {
        totals.tax_bases.accumulate(bucket.delta());
    }
    buckets.tax_bases.set_totals(totals.tax_bases);

    for bucket in buckets.tags.iter() {
        totals.tags.accumulate(bucket.delta());
    }
    buckets.tags.set_totals(totals.tags);
}

/// `id` followed by its parents, one level at a time, stopping at a cycle
fn ancestry(data: &DataView, id: CategoryId) -> Vec<CategoryId> {
    let mut chain = vec![id];
    let mut seen = FxHashSet::default();
    seen.insert(id);
    let mut current = id;
    while let Ok(category) = data.category(current) {
        let Some(parent) = category.parent else {
            break;
        };
        if !seen.insert(parent) {
            tracing::warn!(category = parent.0, "category parent chain has a cycle");
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, CategoryClass, DataSet};

    fn category(id: u16, parent: Option<u16>) -> Category {
        Category {
            id: CategoryId(id),
            name: format!("c{id}"),
            class: CategoryClass::Expense,
            parent: parent.map(CategoryId),
        }
    }

    #[test]
    fn test_ancestry_walks_parents() {
        let data = DataView::new(DataSet {
            categories: vec![category(1, None), category(2, Some(1)), category(3, Some(2))],
            ..DataSet::default()
        });
        assert_eq!(
            ancestry(&data, CategoryId(3)),
            vec![CategoryId(3), CategoryId(2), CategoryId(1)]
        );
        assert_eq!(ancestry(&data, CategoryId(1)), vec![CategoryId(1)]);
    }

    #[test]
    fn test_ancestry_stops_at_cycle() {
        let data = DataView::new(DataSet {
            categories: vec![category(1, Some(2)), category(2, Some(1))],
            ..DataSet::default()
        });
        assert_eq!(ancestry(&data, CategoryId(1)), vec![CategoryId(1), CategoryId(2)]);
    }

    #[test]
    fn test_account_totals_sum_kinds() {
        let mut totals = AccountTotals::default();
        totals.kind_mut(AccountKind::Deposit).add(
            Decimal::from(100),
            Decimal::from(40),
            Decimal::from(60),
        );
        totals.kind_mut(AccountKind::Loan).add(
            Decimal::from(-30),
            Decimal::ZERO,
            Decimal::from(-30),
        );
        let total = totals.total();
        assert_eq!(total.valuation, Decimal::from(70));
        assert_eq!(total.delta, Decimal::from(30));
        assert_eq!(totals.kind(AccountKind::Cash), &ValueTotals::default());
    }
}
