//! MCP Tool Handlers
//!
//! Parses tool arguments and hands them to the dialog session. Every error
//! becomes an `isError` tool result carrying the error message.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::dialog::{AskParams, DialogSession, NotifyParams, ProgressSink, TweakParams};

use super::protocol::ToolCallResult;
use super::tools::{ASK, NOTIFY, TWEAK};

/// Tool handlers backed by one dialog session
#[derive(Clone)]
pub struct ToolHandlers {
    session: Arc<DialogSession>,
}

impl ToolHandlers {
    pub fn new(session: Arc<DialogSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &DialogSession {
        &self.session
    }

    /// Handle a tool call by name
    pub async fn handle(
        &self,
        name: &str,
        args: Value,
        progress: Option<&dyn ProgressSink>,
    ) -> ToolCallResult {
        match self.dispatch(name, args, progress).await {
            Ok(text) => ToolCallResult::text(text),
            Err(e) => {
                let message = format!("{e:#}");
                warn!(tool = name, error = %message, "Tool call failed");
                ToolCallResult::error(message)
            }
        }
    }

    async fn dispatch(
        &self,
        name: &str,
        args: Value,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<String> {
        match name {
            ASK => self.ask(args, progress).await,
            NOTIFY => self.notify(args).await,
            TWEAK => self.tweak(args, progress).await,
            _ => Err(anyhow!("Unknown tool: {}", name)),
        }
    }

    async fn ask(&self, args: Value, progress: Option<&dyn ProgressSink>) -> Result<String> {
        let params: AskParams =
            serde_json::from_value(args).context("Invalid arguments for 'ask'")?;
        info!(kind = %params.kind, "ask");
        Ok(self.session.ask(params, progress).await?)
    }

    async fn tweak(&self, args: Value, progress: Option<&dyn ProgressSink>) -> Result<String> {
        let params: TweakParams =
            serde_json::from_value(args).context("Invalid arguments for 'tweak'")?;
        info!(parameters = params.parameters.len(), "tweak");
        Ok(self.session.tweak(params, progress).await?)
    }

    /// Never a tool error; failures report `success: false`.
    async fn notify(&self, args: Value) -> Result<String> {
        let success = match serde_json::from_value::<NotifyParams>(args) {
            Ok(params) => self.session.notify(params).await.success,
            Err(e) => {
                warn!(error = %e, "Invalid arguments for 'notify'");
                false
            }
        };
        Ok(json!({ "success": success }).to_string())
    }
}
