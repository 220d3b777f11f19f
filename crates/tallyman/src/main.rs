use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::bail;
use jiff::civil::Date;
use tallyman::{ViewRequest, analyse_file, init_logging, load_config};
use tallyman_core::AnalysisConfig;

#[derive(Parser, Debug)]
#[command(name = "tallyman")]
#[command(about = "Chronological aggregation of a household ledger")]
struct Args {
    /// Ledger file (YAML, or JSON by extension)
    #[arg(short, long)]
    data: PathBuf,

    /// Analysis rules file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report everything up to and including this date
    #[arg(long, conflicts_with_all = ["from", "to"])]
    date: Option<Date>,

    /// Start of a ranged view
    #[arg(long, requires = "to")]
    from: Option<Date>,

    /// End of a ranged view
    #[arg(long, requires = "from")]
    to: Option<Date>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn view(&self) -> color_eyre::Result<ViewRequest> {
        Ok(match (self.date, self.from, self.to) {
            (Some(date), None, None) => ViewRequest::Dated(date),
            (None, Some(from), Some(to)) => ViewRequest::Ranged { from, to },
            (None, None, None) => ViewRequest::Base,
            _ => bail!("use either --date or both --from and --to"),
        })
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let _guard = init_logging(&args.log_level, args.log_file.as_deref())?;

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    let view = args.view()?;
    tracing::info!(data = %args.data.display(), ?view, "Starting analysis");

    let report = analyse_file(&args.data, &config, view)?;
    println!("{}", report.to_json()?);

    Ok(())
}
