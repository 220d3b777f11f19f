//! Command-line driver for the tallyman ledger analysis
//!
//! Loads a ledger file, runs the chronological pass and reports a base,
//! dated or ranged view keyed by entity name.

pub mod ledger_file;
pub mod logging;
pub mod report;

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, eyre};
use jiff::civil::Date;
use tallyman_core::{Analysis, AnalysisConfig, DateRange};

pub use ledger_file::{LedgerFile, LedgerFileError};
pub use logging::init_logging;
pub use report::Report;

/// Which view of the pass to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewRequest {
    #[default]
    Base,
    Dated(Date),
    Ranged { from: Date, to: Date },
}

/// Read analysis rules from YAML or JSON; missing fields take their defaults
pub fn load_config(path: &Path) -> color_eyre::Result<AnalysisConfig> {
    let content =
        fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_saphyr::from_str(&content).map_err(|e| eyre!("parsing {}: {e}", path.display()))?
    };
    Ok(config)
}

/// Load `ledger`, run the pass and summarize the requested view
pub fn analyse_file(
    ledger: &Path,
    config: &AnalysisConfig,
    view: ViewRequest,
) -> color_eyre::Result<Report> {
    let (data, names) = LedgerFile::load(ledger)?.into_builder().build()?;
    let analysis = Analysis::run(data, config)?;

    let analysis = match view {
        ViewRequest::Base => analysis,
        ViewRequest::Dated(date) => analysis.dated(date),
        ViewRequest::Ranged { from, to } => analysis.ranged(DateRange::new(from, to)?),
    };

    tracing::info!(
        view = ?analysis.view(),
        accounts = analysis.accounts().len(),
        payees = analysis.payees().len(),
        consistent = analysis.consistency().is_none_or(|r| r.is_consistent()),
        "Analysis complete"
    );

    Ok(Report::new(&analysis, &names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use rust_decimal::Decimal;

    const LEDGER: &str = r#"
start: 2024-01-01
payees:
  - { name: Barclays, class: Institution }
  - { name: Acme, class: Employer }
  - { name: Tesco }
categories:
  - { name: Salary, class: Salary }
  - { name: Groceries, class: Expense }
accounts:
  - { name: Current, type: deposit, parent: Barclays, opening_balance: 500 }
transactions:
  - date: 2024-01-31
    category: Salary
    from: { payee: Acme }
    to: { account: Current }
    amount: 2500
    tax: { credit: 500 }
  - date: 2024-02-10
    category: Groceries
    from: { account: Current }
    to: { payee: Tesco }
    amount: 120
"#;

    fn write_ledger(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("ledger.yaml");
        fs::write(&path, LEDGER).unwrap();
        path
    }

    #[test]
    fn test_analyse_base_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ledger(&dir);

        let report = analyse_file(&path, &AnalysisConfig::default(), ViewRequest::Base).unwrap();
        assert_eq!(report.accounts["Current"].valuation, Decimal::from(2880));
        assert_eq!(report.payees["Acme"].income, Decimal::from(3000));
        assert_eq!(report.payees["TaxMan"].expense, Decimal::from(500));
        assert!(report.consistency.unwrap().consistent);
    }

    #[test]
    fn test_analyse_dated_and_ranged_views() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ledger(&dir);
        let config = AnalysisConfig::default();

        let january = analyse_file(&path, &config, ViewRequest::Dated(date(2024, 1, 31))).unwrap();
        assert_eq!(january.accounts["Current"].valuation, Decimal::from(3000));

        let february = ViewRequest::Ranged {
            from: date(2024, 2, 1),
            to: date(2024, 2, 29),
        };
        let february = analyse_file(&path, &config, february).unwrap();
        assert_eq!(february.accounts["Current"].valuation, Decimal::from(-120));
        assert!(!february.payees.contains_key("Acme"));
    }

    #[test]
    fn test_inverted_range_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_ledger(&dir);
        let view = ViewRequest::Ranged {
            from: date(2024, 3, 1),
            to: date(2024, 2, 1),
        };
        assert!(analyse_file(&path, &AnalysisConfig::default(), view).is_err());
    }

    #[test]
    fn test_missing_ledger_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(analyse_file(&missing, &AnalysisConfig::default(), ViewRequest::Base).is_err());
    }

    #[test]
    fn test_load_config_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        fs::write(&path, "check_consistency: false\n").unwrap();

        let config = load_config(&path).unwrap();
        assert!(!config.check_consistency);
        assert_eq!(config.gains, AnalysisConfig::default().gains);
    }
}
