// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Donation Node
//!
//! Entry point for the `donation-node` binary. Parses CLI arguments,
//! initializes logging and metrics, loads the merchant credentials, and
//! serves the HTTP API.
//!
//! Subcommands:
//!
//! - `run`: start the HTTP service
//! - `sign`: sign one request offline and print the gateway payload
//! - `version`: print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Read;
use std::sync::Arc;
use tokio::signal;

use donation_protocol::config::GatewayEndpoints;
use donation_protocol::{
    build_payload, MerchantCredentials, OutcomeResolver, TransactionRequest, TxnIdGenerator,
};

use cli::{Commands, DonationNodeCli};
use logging::LogFormat;
use metrics::DonationMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DonationNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Sign(args) => sign_offline(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the HTTP service and the metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "donation_node=info,donation_protocol=info,tower_http=debug",
        LogFormat::from_str_lossy(&args.log_format),
    );

    let profile = args.gateway.profile;
    if args.expose_error_detail && profile.is_production() {
        bail!("--expose-error-detail is not allowed with the production profile");
    }

    // --- Credentials ---
    let credentials = args
        .gateway
        .credentials()
        .context("refusing to start without merchant credentials")?
        .map(Arc::new);
    let endpoints = args.gateway.endpoints();

    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        %profile,
        payment_url = %endpoints.payment_url,
        signing_enabled = credentials.is_some(),
        "starting donation-node"
    );
    if args.expose_error_detail {
        tracing::warn!("error detail exposure enabled; do not use this outside development");
    }

    // --- Metrics ---
    let node_metrics = Arc::new(DonationMetrics::new());

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            donation_protocol::config::PROTOCOL_VERSION,
        ),
        profile,
        credentials,
        resolver: Arc::new(OutcomeResolver::from_endpoints(&endpoints)),
        endpoints: Arc::new(endpoints),
        txnids: Arc::new(TxnIdGenerator::new()),
        metrics: Arc::clone(&node_metrics),
        expose_error_detail: args.expose_error_detail,
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("donation-node stopped");
    Ok(())
}

/// Signs a single request read from a file or stdin and prints the gateway
/// payload as JSON on stdout.
fn sign_offline(args: cli::SignArgs) -> Result<()> {
    logging::init_logging("donation_node=warn,donation_protocol=warn", LogFormat::Pretty);

    let credentials = args
        .gateway
        .credentials()
        .context("cannot sign without merchant credentials")?;

    let raw = match args.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request from {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };

    let output = sign_document(
        &raw,
        args.txnid.as_deref(),
        credentials.as_ref(),
        &args.gateway.endpoints(),
    )?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Signs one JSON request document and returns `{ action, params }`, the
/// same shape the HTTP create routes answer with.
///
/// A non-blank `txnid` argument wins over the document's own `txnId`.
fn sign_document(
    raw: &str,
    txnid: Option<&str>,
    credentials: Option<&MerchantCredentials>,
    endpoints: &GatewayEndpoints,
) -> Result<serde_json::Value> {
    let credentials = credentials.context("merchant key and salt must be supplied to sign")?;
    let request: TransactionRequest =
        serde_json::from_str(raw).context("request is not a valid JSON object")?;

    let requested = txnid
        .filter(|id| !id.trim().is_empty())
        .or(request.txn_id.as_deref());
    let txnid = TxnIdGenerator::new().resolve(requested);

    let payload = build_payload(&request, &txnid, credentials, endpoints)?;
    Ok(serde_json::json!({
        "action": endpoints.payment_url,
        "params": payload,
    }))
}

/// Prints version information to stdout.
fn print_version() {
    println!("donation-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol      {}", donation_protocol::config::PROTOCOL_VERSION);
    println!("rustc         {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
