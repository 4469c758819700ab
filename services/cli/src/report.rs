use crate::render::{print_json, print_text, RenderOptions};
use clap::Args;
use compliance_engine::config::{AppConfig, IdentifierPolicy};
use compliance_engine::error::AppError;
use compliance_engine::telemetry;
use compliance_engine::workflows::compliance::{BuildingFilter, ComplianceStatus, RiskCategory};
use compliance_engine::workflows::export::ReportExporter;
use compliance_engine::workflows::pipeline::{self, PipelineInputs, SnapshotSource};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Registered buildings CSV snapshot
    #[arg(long)]
    pub(crate) registered: Option<PathBuf>,
    /// Issued EPC certificates CSV snapshot
    #[arg(long)]
    pub(crate) certified: Option<PathBuf>,
    /// Write the report sections, manifest and flat table into this directory
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Case-insensitive search over registration number, city and province
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Only show buildings in this rule risk category (LOW, MEDIUM, HIGH)
    #[arg(long, value_parser = parse_risk)]
    pub(crate) risk: Option<RiskCategory>,
    /// Only show buildings with this status (compliant, non-compliant)
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<ComplianceStatus>,
    /// Number of filtered rows to print
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: usize,
    /// Override the model seed
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Override the number of trees in the forest
    #[arg(long, value_parser = parse_trees)]
    pub(crate) trees: Option<usize>,
    /// Skip training the HIGH risk model
    #[arg(long)]
    pub(crate) no_model: bool,
    /// Accept snapshots without a Registration Number column
    #[arg(long)]
    pub(crate) allow_missing_identifier: bool,
    /// Print the results as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_report(args: RunArgs) -> Result<(), AppError> {
    let RunArgs {
        registered,
        certified,
        out,
        search,
        risk,
        status,
        limit,
        seed,
        trees,
        no_model,
        allow_missing_identifier,
        json,
    } = args;

    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    if let Some(seed) = seed {
        config.engine.forest.seed = seed;
    }
    if let Some(trees) = trees {
        config.engine.forest.n_trees = trees;
    }
    if no_model {
        config.engine.train_model = false;
    }
    if allow_missing_identifier {
        config.engine.identifier_policy = IdentifierPolicy::AllowEmptyKey;
    }

    let inputs = PipelineInputs {
        registered: registered.map(SnapshotSource::Path),
        certified: certified.map(SnapshotSource::Path),
    };
    let run = pipeline::run(inputs, &config.engine)?;
    info!(
        ?config.environment,
        buildings = run.metrics.total,
        orphans = run.orphans.len(),
        "compliance run finished"
    );

    let manifest = match &out {
        Some(dir) => Some(ReportExporter::default().write(&run, dir)?),
        None => None,
    };

    let filter = BuildingFilter {
        search,
        category: risk,
        status,
    };
    let options = RenderOptions {
        filter: &filter,
        limit,
        manifest: manifest.as_ref(),
        export_dir: out.as_deref(),
    };

    if json {
        print_json(&run, &options)?;
    } else {
        print_text(&run, &options);
    }

    Ok(())
}

fn parse_risk(raw: &str) -> Result<RiskCategory, String> {
    RiskCategory::from_label(raw)
        .ok_or_else(|| format!("unknown risk category '{raw}' (expected LOW, MEDIUM or HIGH)"))
}

fn parse_status(raw: &str) -> Result<ComplianceStatus, String> {
    ComplianceStatus::from_label(raw)
        .or_else(|| ComplianceStatus::from_label(&raw.trim().replace(['_', ' '], "-")))
        .ok_or_else(|| format!("unknown status '{raw}' (expected compliant or non-compliant)"))
}

fn parse_trees(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("the forest needs at least one tree".to_string()),
        Ok(trees) => Ok(trees),
        Err(err) => Err(format!("invalid tree count '{raw}' ({err})")),
    }
}
