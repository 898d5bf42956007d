//! MCP Server
//!
//! Main server loop handling JSON-RPC messages over stdio.
//!
//! Requests are read line by line. `tools/call` runs on its own task so a
//! second `ask` can arrive (and join the open dialog) while the first one
//! is still waiting on the user. All output goes through one writer task.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::dialog::{DialogSession, ProgressSink};

use super::handlers::ToolHandlers;
use super::protocol::*;
use super::tools::get_tools;

/// Characters of each message echoed to the debug log.
const LOG_PREVIEW_CHARS: usize = 100;

/// MCP Server
pub struct McpServer {
    handlers: ToolHandlers,
}

impl McpServer {
    pub fn new(session: Arc<DialogSession>) -> Self {
        Self {
            handlers: ToolHandlers::new(session),
        }
    }

    /// Run the server, reading from stdin and writing to stdout
    pub async fn run(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until `input` is closed and every pending tool call has answered.
    pub async fn serve<R, W>(&self, input: R, output: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer = tokio::spawn(write_loop(output, rx));
        let mut calls = JoinSet::new();
        let mut lines = BufReader::new(input).lines();

        info!("MCP server started, waiting for messages");

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            debug!(message = %preview(line), "<-");
            self.dispatch(line, &tx, &mut calls);
        }

        info!(pending = calls.len(), "Input closed, finishing pending calls");
        while let Some(joined) = calls.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Tool call task failed");
            }
        }

        drop(tx);
        writer.await??;
        info!("MCP server shutting down");
        Ok(())
    }

    fn dispatch(&self, line: &str, tx: &UnboundedSender<String>, calls: &mut JoinSet<()>) {
        let req: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                send(tx, &JsonRpcResponse::error(None, PARSE_ERROR, e.to_string()));
                return;
            }
        };

        if req.method == "tools/call" {
            self.spawn_tool_call(req, tx.clone(), calls);
            return;
        }

        if let Some(response) = self.handle(req) {
            send(tx, &response);
        }
    }

    /// Handle a non-tool message; notifications get no reply.
    fn handle(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = req.id.clone();
        let notification = req.is_notification();

        let response = match req.method.as_str() {
            "initialize" => {
                let params: InitializeParams =
                    serde_json::from_value(req.params).unwrap_or_default();
                if let Some(client) = params.client_info {
                    info!(client = %client.name, version = ?client.version, "Client connected");
                    self.handlers.session().context().set_client_name(client.name);
                }
                to_response(
                    id,
                    InitializeResult {
                        protocol_version: PROTOCOL_VERSION.into(),
                        capabilities: ServerCapabilities {
                            tools: ToolsCapability {
                                list_changed: false,
                            },
                        },
                        server_info: ServerInfo {
                            name: "consult".into(),
                            version: env!("CARGO_PKG_VERSION").into(),
                        },
                    },
                )
            }

            "notifications/initialized" | "notifications/cancelled" => return None,

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => to_response(id, ToolsListResult { tools: get_tools() }),

            _ if notification => {
                debug!(method = %req.method, "Ignoring unknown notification");
                return None;
            }

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown method: {}", req.method),
            ),
        };

        (!notification).then_some(response)
    }

    fn spawn_tool_call(
        &self,
        req: JsonRpcRequest,
        tx: UnboundedSender<String>,
        calls: &mut JoinSet<()>,
    ) {
        let id = req.id;
        let params: ToolCallParams = match serde_json::from_value(req.params) {
            Ok(p) => p,
            Err(e) => {
                send(&tx, &JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()));
                return;
            }
        };

        let handlers = self.handlers.clone();
        calls.spawn(async move {
            info!(tool = %params.name, "Calling tool");
            let notifier = params
                .progress_token()
                .map(|token| ProgressNotifier::new(token, tx.clone()));
            let progress = notifier.as_ref().map(|n| n as &dyn ProgressSink);

            let result = handlers
                .handle(&params.name, params.arguments, progress)
                .await;
            send(&tx, &to_response(id, result));
        });
    }
}

/// Forwards heartbeat ticks as `notifications/progress`.
pub struct ProgressNotifier {
    token: Value,
    tx: UnboundedSender<String>,
}

impl ProgressNotifier {
    pub fn new(token: Value, tx: UnboundedSender<String>) -> Self {
        Self { token, tx }
    }
}

impl ProgressSink for ProgressNotifier {
    fn progress(&self, progress: u64, message: &str) {
        let notification = JsonRpcNotification::new(
            "notifications/progress",
            json!({
                "progressToken": self.token,
                "progress": progress,
                "message": message,
            }),
        );
        send(&self.tx, &notification);
    }
}

fn to_response<T: Serialize>(id: Option<Value>, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse::success(id, v),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e)),
    }
}

fn send<T: Serialize>(tx: &UnboundedSender<String>, message: &T) {
    match serde_json::to_string(message) {
        Ok(out) => {
            debug!(message = %preview(&out), "->");
            if tx.send(out).is_err() {
                warn!("Output closed, dropping message");
            }
        }
        Err(e) => warn!(error = %e, "Failed to serialize outgoing message"),
    }
}

async fn write_loop<W>(mut output: W, mut rx: UnboundedReceiver<String>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}

fn preview(message: &str) -> String {
    if message.chars().count() > LOG_PREVIEW_CHARS {
        let head: String = message.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        message.to_string()
    }
}
