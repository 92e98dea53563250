use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use netreport_engine::AnalysisReport;
use netreport_model::VariantConfig;
use netreport_store::{ResultStore, analyze};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyze OMNeT++ SQLite result stores")]
struct Args {
    /// Scalar result store (.sca) holding runParam, scalar and runAttr.
    #[arg(long)]
    sca: PathBuf,

    /// Companion vector result store (.vec) for the throughput estimate.
    #[arg(long)]
    vec: Option<PathBuf>,

    /// Topology the results were produced on.
    #[arg(long, value_enum)]
    variant: Variant,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Owcell,
    Spineleaf,
}

impl Variant {
    fn config(self) -> VariantConfig {
        match self {
            Variant::Owcell => VariantConfig::owcell(),
            Variant::Spineleaf => VariantConfig::spineleaf(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    info!("netreport starting...");

    let config = args.variant.config();
    let sca = ResultStore::open(&args.sca)?;
    let vec = match &args.vec {
        Some(path) => Some(ResultStore::open(path)?),
        None => None,
    };

    let report = analyze(&sca, vec.as_ref(), &config)?;
    log_summary(&report);
    write_report(args.out.as_deref(), &report)?;
    Ok(())
}

fn log_summary(report: &AnalysisReport) {
    info!(
        network = %report.run.network,
        config = %report.run.config_name,
        flows = report.flows.flow_count,
        total_bytes = report.flows.total_traffic_bytes,
        avg_utilization = report.scalars.average_utilization,
        "analysis complete"
    );
}

fn write_report(out: Option<&Path>, report: &AnalysisReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize report")?;
    match out {
        Some(path) => fs::write(path, &data)
            .with_context(|| format!("Failed to write report file {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            use std::io::Write;
            stdout.write_all(&data).context("Failed to write report")?;
            stdout.write_all(b"\n").context("Failed to write report")?;
        }
    }
    Ok(())
}
