//! Consult MCP Server Binary
//!
//! Runs the dialog MCP server on stdio for coding agents.
//!
//! ## Usage
//!
//! ```bash
//! ./target/debug/consult_mcp
//! ```
//!
//! ## Environment Variables
//!
//! - `CONSULT_DIALOG_BIN` (optional): path of the presentation helper
//! - `CONSULT_SETTINGS` (optional): path of the settings JSON
//! - `CONSULT_DIALOG_TIMEOUT_SECS` (optional): dialog ceiling, default 600
//! - `CONSULT_HEARTBEAT_SECS` (optional): heartbeat interval, default 15
//! - `RUST_LOG` (optional): log filter, default `consult=info`

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use consult::dialog::{DialogSession, ProcessProvider};
use consult::mcp::McpServer;
use consult::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("consult=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(
        platform = config.platform.as_str(),
        helper = %config.helper_path.display(),
        settings = %config.settings_path.display(),
        timeout_secs = config.dialog_timeout.as_secs(),
        "Starting consult MCP server"
    );

    let provider = Arc::new(ProcessProvider::from_config(&config));
    let session = Arc::new(DialogSession::new(provider, config));

    McpServer::new(session).run().await
}
