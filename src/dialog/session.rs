//! Dialog session: the unified `ask` / `tweak` / `notify` operations
//!
//! ```text
//! AskParams ──validate──▶ DialogRequest ──┐
//!                                         ▼
//!                     SingleFlight::acquire (join or start)
//!                                         │
//!         timeout(provider) → compact → humanize | JSON → preview?
//!                                         │
//!                 with_heartbeat (per caller) ──▶ text for the agent
//! ```
//!
//! Validation and tweak resolution run before the guard is touched, so a bad
//! request never joins someone else's dialog.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use futures::FutureExt;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::compact::compact;
use super::flight::{DialogFuture, SingleFlight};
use super::heartbeat::{with_heartbeat, ProgressSink};
use super::humanize::humanize;
use super::provider::{present, DialogProvider};
use super::request::AskParams;
use super::types::{DialogPosition, DialogRequest, NotifyOptions, NotifyResult, TweakOptions};
use crate::config::{ServerConfig, Settings};
use crate::error::{AskError, ValidationError};
use crate::tweak::{resolve_parameter_file, TweakParameter};

/// Dialog title when the client has not identified itself.
pub const DEFAULT_TITLE: &str = "Consult";

// ============================================================================
// Tool parameters
// ============================================================================

/// Arguments of the `tweak` tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweakParams {
    #[serde(default)]
    pub parameters: Vec<TweakParameter>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub position: Option<DialogPosition>,
    #[serde(default)]
    pub project_path: Option<String>,
}

/// Arguments of the `notify` tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

// ============================================================================
// Client context
// ============================================================================

/// Process-wide facts about the connected client.
#[derive(Debug, Default)]
pub struct ClientContext {
    client_name: OnceLock<String>,
    project_path: RwLock<Option<PathBuf>>,
}

impl ClientContext {
    /// Record the client name; only the first value sticks.
    pub fn set_client_name(&self, name: impl Into<String>) {
        let name = name.into();
        if name.trim().is_empty() {
            return;
        }
        if self.client_name.set(name).is_err() {
            debug!("Client name already set, ignoring");
        }
    }

    pub fn client_name(&self) -> Option<&str> {
        self.client_name.get().map(String::as_str)
    }

    /// Use `explicit` when given (and remember it), else the last known path.
    pub fn project_path(&self, explicit: Option<&str>) -> Option<PathBuf> {
        match explicit.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => {
                let path = PathBuf::from(path);
                let mut cached = self
                    .project_path
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                *cached = Some(path.clone());
                Some(path)
            }
            None => self
                .project_path
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone(),
        }
    }

    /// `"<client> · <project dir>"`, falling back to the parts that are known.
    pub fn dialog_title(&self, project: Option<&Path>) -> String {
        let base = self.client_name().unwrap_or(DEFAULT_TITLE);
        match project.and_then(Path::file_name) {
            Some(dir) => format!("{base} · {}", dir.to_string_lossy()),
            None => base.to_string(),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Owns the provider and the single-flight guard.
pub struct DialogSession {
    provider: Arc<dyn DialogProvider>,
    config: ServerConfig,
    flight: SingleFlight,
    context: ClientContext,
}

impl DialogSession {
    pub fn new(provider: Arc<dyn DialogProvider>, config: ServerConfig) -> Self {
        Self {
            provider,
            config,
            flight: SingleFlight::new(),
            context: ClientContext::default(),
        }
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// True when no dialog is open.
    pub fn is_idle(&self) -> bool {
        self.flight.is_idle()
    }

    /// Show a confirm / pick / text / form dialog and return the agent text.
    pub async fn ask(
        &self,
        params: AskParams,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<String, AskError> {
        let project = self.context.project_path(params.project_path.as_deref());
        let title = self.context.dialog_title(project.as_deref());
        let request = params.into_request(&title)?;
        self.run(request, progress).await
    }

    /// Resolve tweak parameters against their files and show the sliders.
    pub async fn tweak(
        &self,
        params: TweakParams,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<String, AskError> {
        if params.parameters.is_empty() {
            return Err(ValidationError::NoParameters.into());
        }
        let project = self.context.project_path(params.project_path.as_deref());

        let parameters = params
            .parameters
            .iter()
            .map(|p| resolve_parameter_file(p, project.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;

        let title = params
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.context.dialog_title(project.as_deref()));

        let request = DialogRequest::Tweak(TweakOptions {
            title,
            parameters,
            position: params.position.unwrap_or_default(),
        });
        self.run(request, progress).await
    }

    /// Post a non-blocking notification. Never fails.
    pub async fn notify(&self, params: NotifyParams) -> NotifyResult {
        let title = params
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                let project = self.context.project_path(None);
                self.context.dialog_title(project.as_deref())
            });
        let options = NotifyOptions {
            title,
            body: params.body,
            subtitle: params.subtitle,
        };
        match self.provider.notify(&options).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Notification failed");
                NotifyResult { success: false }
            }
        }
    }

    async fn run(
        &self,
        request: DialogRequest,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<String, AskError> {
        let kind = request.kind();
        let flight = self.flight.acquire(|| self.start(request));
        if flight.is_joined() {
            info!(kind = %kind, "Dialog already open, waiting on it");
        } else {
            info!(kind = %kind, provider = self.provider.name(), "Opening dialog");
        }

        with_heartbeat(
            flight.into_future(),
            progress,
            self.config.heartbeat_interval,
        )
        .await
    }

    /// The shared part of a dialog: everything every waiter observes.
    fn start(&self, request: DialogRequest) -> DialogFuture {
        let provider = Arc::clone(&self.provider);
        let timeout = self.config.dialog_timeout;
        let settings_path = self.config.settings_path.clone();

        async move {
            let pulse = Arc::clone(&provider);
            tokio::spawn(async move { pulse.pulse().await });

            let raw = tokio::time::timeout(timeout, present(provider.as_ref(), &request))
                .await
                .map_err(|_| {
                    warn!(kind = %request.kind(), timeout_secs = timeout.as_secs(), "Dialog timed out");
                    AskError::DialogTimeout(timeout)
                })??;

            let compacted = compact(&raw);
            let settings = Settings::load(&settings_path);
            let text = if settings.humanize_responses {
                humanize(&compacted)
            } else {
                compacted.to_json_string()
            };

            if settings.review_before_send {
                let preview = Arc::clone(&provider);
                let shown = text.clone();
                tokio::spawn(async move { preview.preview(&shown).await });
            }

            debug!(kind = %raw.kind(), "Dialog settled");
            Ok::<_, AskError>(text)
        }
        .boxed()
    }
}
