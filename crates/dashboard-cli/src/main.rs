//! dashboard-cli: resolve a route against a snapshot and print the entity
//! views as JSON for the presentation layer.
//!
//! Usage:
//!   dashboard-cli --data data.csv
//!   dashboard-cli --data data.csv --route '{"view":"pool","key":"0x..."}'
//!   dashboard-cli --data data.csv --cache-ttl 60
//!   dashboard-cli check --dir .          # validate the JSON documents

use std::path::Path;

use analytic_session::SessionEngine;
use loop_core::Route;
use sheet_loader::cache::CACHE_TTL_SECS;
use sheet_loader::snapshot::{
    load_complete_analysis, load_optional, PendleAnalysis, PendleSummary,
};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard_cli=info,sheet_loader=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return Ok(());
    }
    if args.iter().any(|a| a == "check") {
        let dir = flag_value(&args, "--dir").unwrap_or_else(|| ".".to_string());
        return check_documents(Path::new(&dir));
    }

    let data_path = flag_value(&args, "--data")
        .or_else(|| std::env::var("LOOPLENS_DATA").ok())
        .unwrap_or_else(|| "data.csv".to_string());

    let route: Route = match flag_value(&args, "--route") {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid --route value: {e}"))?,
        None => Route::default(),
    };

    let cache_ttl: i64 = flag_value(&args, "--cache-ttl")
        .and_then(|v| v.parse().ok())
        .unwrap_or(CACHE_TTL_SECS);

    let engine = SessionEngine::with_cache_ttl(cache_ttl);
    let output = engine.run(Path::new(&data_path), &route)?;
    tracing::info!(
        pools = output.pools.len(),
        vaults = output.vaults.len(),
        curators = output.curators.len(),
        detail = output.detail.is_some(),
        "session built"
    );

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Report on the secondary JSON documents the collectors produce. Optional
/// documents that are absent only reduce functionality.
fn check_documents(dir: &Path) -> anyhow::Result<()> {
    match load_complete_analysis(&dir.join("morpho_complete_analysis.json")) {
        Ok(doc) => {
            println!(
                "morpho_complete_analysis.json: {} markets (declared {}), generated at {}",
                doc.data.len(),
                doc.metadata
                    .total_markets
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                doc.metadata.generated_at.as_deref().unwrap_or("?"),
            );
            let with_borrowers = doc
                .data
                .iter()
                .filter(|m| !m.top_borrowers.is_empty())
                .count();
            println!("  markets with top-borrower data: {with_borrowers}");
        }
        Err(e) => println!("morpho_complete_analysis.json: {e}"),
    }

    match load_optional::<PendleSummary>(&dir.join("pendle_morpho_summary.json")) {
        Some(doc) => println!(
            "pendle_morpho_summary.json: {} PT markets, borrower lists for {} markets",
            doc.pt_markets.len(),
            doc.top_borrowers_by_market.len(),
        ),
        None => println!("pendle_morpho_summary.json: absent (PT summary unavailable)"),
    }

    match load_optional::<PendleAnalysis>(&dir.join("pendle_morpho_analysis.json")) {
        Some(doc) => println!(
            "pendle_morpho_analysis.json: detail for {} PT markets (declared {})",
            doc.pt_markets_data.len(),
            doc.metadata
                .total_pt_markets
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string()),
        ),
        None => println!("pendle_morpho_analysis.json: absent (PT detail unavailable)"),
    }

    Ok(())
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn usage() {
    eprintln!("Usage:");
    eprintln!("  dashboard-cli [--data PATH] [--route JSON] [--cache-ttl SECS]");
    eprintln!("  dashboard-cli check [--dir PATH]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --data PATH        Sectioned snapshot file (default: data.csv,");
    eprintln!("                     or the LOOPLENS_DATA environment variable)");
    eprintln!("  --route JSON       Route object, e.g. '{{\"view\":\"pool\",\"key\":\"0x..\"}}'");
    eprintln!("                     (default: the filtered list view)");
    eprintln!("  --cache-ttl SECS   Snapshot cache validity (default: {CACHE_TTL_SECS})");
    eprintln!("  --dir PATH         Directory holding the JSON documents for `check`");
}
