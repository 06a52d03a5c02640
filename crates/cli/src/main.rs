use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polydecomp::DecompCfg;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod report;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Planar decomposition checks and overlays")]
struct Cmd {
    /// Colocation and snapping distance used when rebuilding inputs
    #[arg(long, global = true, default_value_t = DecompCfg::default().tolerance)]
    tolerance: f64,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Import a node-set JSON file and verify its topology
    Check {
        #[arg(long)]
        input: PathBuf,
    },
    /// Overlay two node-set files and write the refined node set with its maps
    Overlay {
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a JSON summary of a node-set file (or just the build info)
    Report {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    let cfg = DecompCfg {
        tolerance: cmd.tolerance,
    };
    match cmd.action {
        Action::Check { input } => check(input, cfg),
        Action::Overlay { a, b, out } => overlay(a, b, out, cfg),
        Action::Report { input } => report(input, cfg),
    }
}

fn check(input: PathBuf, cfg: DecompCfg) -> Result<()> {
    let d = report::load(&input, cfg)?;
    d.check_consistency()
        .with_context(|| format!("checking {}", input.display()))?;
    tracing::info!(
        input = %input.display(),
        points = d.points().len(),
        segments = d.segments().len(),
        polygons = d.polygons().len(),
        "consistent"
    );
    Ok(())
}

fn overlay(a: PathBuf, b: PathBuf, out: PathBuf, cfg: DecompCfg) -> Result<()> {
    let da = report::load(&a, cfg)?;
    let db = report::load(&b, cfg)?;
    let result = da
        .intersection(&db)
        .with_context(|| format!("overlaying {} with {}", a.display(), b.display()))?;
    tracing::info!(
        points = result.decomp.points().len(),
        segments = result.decomp.segments().len(),
        polygons = result.decomp.polygons().len(),
        "overlay"
    );
    let mut doc = report::overlay_doc(&result, &da, &db)?;
    doc["code_rev"] = report::current_git_rev().into();
    report::write_json(&out, &doc)
}

fn report(input: Option<PathBuf>, cfg: DecompCfg) -> Result<()> {
    let summary = match &input {
        Some(path) => report::summary(&report::load(path, cfg)?)?,
        None => serde_json::Value::Null,
    };
    let obj = serde_json::json!({
        "code_rev": report::current_git_rev(),
        "version": polydecomp::VERSION,
        "input": input.map(|p| p.display().to_string()),
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
