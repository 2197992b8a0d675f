//! xrp-courier - submit one XRP Ledger payment and report its outcome
//!
//! Loads the payment intent from config/environment, derives the wallet
//! from the seed in the environment, connects to a ledger node, runs the
//! payment workflow to settlement (or expiry), and prints a report with
//! before/after balances, the transaction hash, and the actual cost.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xrp_courier::builder::TransactionBuilder;
use xrp_courier::config::{self, Config};
use xrp_courier::ledger::{HttpLedgerSession, LedgerSession};
use xrp_courier::types::PaymentReport;
use xrp_courier::wallet::Wallet;
use xrp_courier::workflow::{run_and_release, PaymentWorkflow};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("🚀 Starting xrp-courier v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;
    let plan = config.payment_plan()?;
    let seed = config::wallet_seed()?;

    let wallet = Wallet::from_seed(&seed).context("Failed to derive wallet from seed")?;
    info!("🔑 Wallet address: {}", wallet.address());
    info!(
        "💸 Sending {} XRP to {}",
        plan.amount, plan.destination
    );

    info!("🌐 Connecting to {}", config.network.endpoint);
    let session = Arc::new(
        HttpLedgerSession::connect(&config.network.endpoint, config.request_timeout())
            .await
            .context("Failed to reach the ledger node")?,
    );

    let builder = TransactionBuilder::new(config.submission.expiry_buffer)
        .context("Invalid expiry buffer in configuration")?;
    let workflow = PaymentWorkflow::new(
        Arc::clone(&session) as Arc<dyn LedgerSession>,
        wallet,
        builder,
        config.poll_interval(),
    );

    let result = tokio::select! {
        result = run_and_release(&workflow, &plan.destination, plan.amount) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match result {
        Some(Ok(report)) => {
            print_report(&report, args.json)?;
            if !report.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Err(err)) => {
            error!(category = err.category(), "Payment failed: {}", err);
            if err.is_safe_to_retry() {
                info!("💡 No transaction was submitted; retrying is safe");
            }
            std::process::exit(1);
        }
        None => {
            warn!("🛑 Interrupted; releasing session");
            if let Err(err) = session.close().await {
                warn!(error = %err, "Session release failed");
            }
            std::process::exit(130);
        }
    }
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "xrp_courier=debug,info"
    } else {
        "xrp_courier=info,warn,error"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Load configuration from file with fallback to defaults
fn load_config(path: &str) -> Result<Config> {
    if !std::path::Path::new(path).exists() {
        warn!("Config file '{}' not found, using defaults", path);
    }
    Config::load(path).with_context(|| format!("Failed to load config from {}", path))
}

/// Print the terminal report
fn print_report(report: &PaymentReport, as_json: bool) -> Result<()> {
    info!("📋 Payment report");
    info!("   Hash:           {}", report.tx_hash);
    info!("   Outcome:        {}", report.outcome);
    info!("   Balance before: {} XRP", report.balance_before);
    match report.balance_after {
        Some(after) => info!("   Balance after:  {} XRP", after),
        None => warn!("   Balance after:  unavailable (post-submission read failed)"),
    }
    if let Some(cost) = report.actual_cost {
        info!("   Actual cost:    {} XRP", cost);
    }
    info!("   Explorer:       {}", report.explorer_url);

    if report.outcome.is_safe_to_retry() {
        info!("💡 The transaction expired; rerun to rebuild with a fresh sequence and expiry window");
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}
