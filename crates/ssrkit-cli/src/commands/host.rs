//! `ssrkit host` command implementation.
//!
//! Compiles the registered entry points and serves the bundles over HTTP
//! until Ctrl+C.

use super::prepare;
use axum::{routing::get, Router};
use miette::{IntoDiagnostic, Result};
use ssrkit_core::statics::normalize_mount_path;
use ssrkit_core::RouterStatics;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Address used when neither the flag nor the config sets one.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:4100";

/// Host command action.
#[derive(Debug, Clone)]
pub struct HostAction {
    /// Working directory.
    pub cwd: PathBuf,
    /// Entry points (empty = use ssrkit.json).
    pub entries: Vec<PathBuf>,
    /// Address override.
    pub addr: Option<String>,
    /// Mount path override.
    pub mount: Option<String>,
}

/// Run the host server.
pub async fn run(action: HostAction) -> Result<()> {
    let prepared = prepare(&action.cwd, &action.entries).into_diagnostic()?;

    // CLI flags override the config file
    let address = action
        .addr
        .clone()
        .or_else(|| prepared.config.host.address.clone())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
    let mount = action
        .mount
        .clone()
        .unwrap_or_else(|| prepared.config.mount_path().to_string());

    let addr: SocketAddr = address.parse().into_diagnostic()?;

    let base = Router::new().route("/healthz", get(|| async { "ok" }));
    let app = prepared
        .compiled
        .host_statics(&RouterStatics, base, Some(&mount))
        .await
        .into_diagnostic()?
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let mount = normalize_mount_path(Some(&mount));
    println!();
    println!("  Hosting {} bundles at http://{}{}/", prepared.compiled.pending_builds(), addr, mount);
    println!("  Manifest: http://{addr}{mount}/manifest.json");
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .into_diagnostic()?;

    Ok(())
}
