//! Name-keyed summary of an analysis, serialized as the command output

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tallyman_core::analysis::AccountTotals;
use tallyman_core::bucket::{AccountValues, FlowValues, SecurityValues, TaxBasisValues};
use tallyman_core::{Analysis, AnalysisMetrics, AnalysisView, DataSetMetadata};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub view: String,
    pub accounts: BTreeMap<String, AccountValues>,
    /// Keyed by `portfolio/security`
    pub holdings: BTreeMap<String, SecurityValues>,
    pub payees: BTreeMap<String, FlowValues>,
    pub categories: BTreeMap<String, FlowValues>,
    pub totals: TotalsReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencySummary>,
    pub metrics: AnalysisMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalsReport {
    pub accounts: AccountTotals,
    pub payees: FlowValues,
    pub categories: FlowValues,
    pub tax_bases: TaxBasisValues,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencySummary {
    pub consistent: bool,
    pub accounts: Decimal,
    pub payees: Decimal,
    pub categories: Decimal,
    pub tax_bases: Decimal,
}

impl Report {
    /// Summarize the buckets of `analysis`; ranged views report their deltas
    pub fn new(analysis: &Analysis, names: &DataSetMetadata) -> Self {
        let ranged = matches!(analysis.view(), AnalysisView::Ranged(_));
        let pick = |values: &AccountValues, delta: &AccountValues| {
            if ranged { delta.clone() } else { values.clone() }
        };

        let accounts = analysis
            .accounts()
            .iter()
            .map(|b| {
                let name = label(names.account_name(b.key()), b.key().0);
                (name, pick(b.values(), b.delta()))
            })
            .collect();

        let holdings = analysis
            .holdings()
            .iter()
            .map(|b| {
                let key = b.key();
                let name = format!(
                    "{}/{}",
                    label(names.account_name(key.portfolio), key.portfolio.0),
                    label(names.security_name(key.security), key.security.0),
                );
                let values = if ranged { b.delta() } else { b.values() };
                (name, values.clone())
            })
            .collect();

        let payees = analysis
            .payees()
            .iter()
            .map(|b| {
                let name = label(names.payee_name(b.key()), b.key().0);
                (name, if ranged { *b.delta() } else { *b.values() })
            })
            .collect();

        let categories = analysis
            .categories()
            .iter()
            .map(|b| {
                let name = label(names.category_name(b.key()), b.key().0);
                (name, if ranged { *b.delta() } else { *b.values() })
            })
            .collect();

        let totals = analysis.totals();
        let consistency = analysis.consistency().map(|report| ConsistencySummary {
            consistent: report.is_consistent(),
            accounts: report.accounts,
            payees: report.payees,
            categories: report.categories,
            tax_bases: report.tax_bases,
        });

        Self {
            view: view_label(analysis.view()),
            accounts,
            holdings,
            payees,
            categories,
            totals: TotalsReport {
                accounts: totals.accounts,
                payees: totals.payees,
                categories: totals.categories,
                tax_bases: totals.tax_bases,
            },
            consistency,
            metrics: analysis.metrics().clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn label(name: Option<&str>, id: impl std::fmt::Display) -> String {
    name.map_or_else(|| format!("#{id}"), str::to_string)
}

fn view_label(view: AnalysisView) -> String {
    match view {
        AnalysisView::Base => "base".to_string(),
        AnalysisView::Dated(date) => format!("dated {date}"),
        AnalysisView::Ranged(range) => format!("ranged {range}"),
    }
}
