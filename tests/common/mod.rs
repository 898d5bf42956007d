//! Shared fixtures: a scripted provider and a throwaway configuration.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Semaphore;

use consult::config::{Platform, ServerConfig};
use consult::dialog::{
    ChooseOptions, ChooseResult, ConfirmOptions, ConfirmResult, DialogKind, DialogProvider,
    DialogSession, NotifyOptions, NotifyResult, ProgressSink, QuestionsOptions, QuestionsResult,
    TextInputOptions, TextInputResult, TweakOptions, TweakResult,
};
use consult::ProviderError;

/// Provider that records every call and answers with a canned JSON line.
pub struct FakeProvider {
    response: Value,
    error: Option<ProviderError>,
    delay: Option<Duration>,
    gate: Option<Arc<Semaphore>>,
    pub calls: AtomicUsize,
    pub pulses: AtomicUsize,
    pub kinds: Mutex<Vec<DialogKind>>,
    pub confirms: Mutex<Vec<ConfirmOptions>>,
    pub picks: Mutex<Vec<ChooseOptions>>,
    pub forms: Mutex<Vec<QuestionsOptions>>,
    pub tweaks: Mutex<Vec<TweakOptions>>,
    pub notifications: Mutex<Vec<NotifyOptions>>,
}

impl FakeProvider {
    pub fn answering(response: Value) -> Self {
        Self {
            response,
            error: None,
            delay: None,
            gate: None,
            calls: AtomicUsize::new(0),
            pulses: AtomicUsize::new(0),
            kinds: Mutex::new(Vec::new()),
            confirms: Mutex::new(Vec::new()),
            picks: Mutex::new(Vec::new()),
            forms: Mutex::new(Vec::new()),
            tweaks: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            error: Some(error),
            ..Self::answering(Value::Null)
        }
    }

    /// Take `delay` (virtual time under a paused clock) before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every dialog open until the test adds a permit to `gate`.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond<T: DeserializeOwned>(&self, kind: DialogKind) -> Result<T, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.kinds.lock().unwrap().push(kind);

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(serde_json::from_value(self.response.clone()).unwrap())
    }
}

#[async_trait]
impl DialogProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn confirm(&self, options: &ConfirmOptions) -> Result<ConfirmResult, ProviderError> {
        self.confirms.lock().unwrap().push(options.clone());
        self.respond(DialogKind::Confirm).await
    }

    async fn choose(&self, options: &ChooseOptions) -> Result<ChooseResult, ProviderError> {
        self.picks.lock().unwrap().push(options.clone());
        self.respond(DialogKind::Pick).await
    }

    async fn text_input(
        &self,
        _options: &TextInputOptions,
    ) -> Result<TextInputResult, ProviderError> {
        self.respond(DialogKind::Text).await
    }

    async fn questions(
        &self,
        options: &QuestionsOptions,
    ) -> Result<QuestionsResult, ProviderError> {
        self.forms.lock().unwrap().push(options.clone());
        self.respond(DialogKind::Form).await
    }

    async fn tweak(&self, options: &TweakOptions) -> Result<TweakResult, ProviderError> {
        self.tweaks.lock().unwrap().push(options.clone());
        self.respond(DialogKind::Tweak).await
    }

    async fn notify(&self, options: &NotifyOptions) -> Result<NotifyResult, ProviderError> {
        self.notifications.lock().unwrap().push(options.clone());
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(NotifyResult { success: true }),
        }
    }

    async fn pulse(&self) {
        self.pulses.fetch_add(1, Ordering::SeqCst);
    }
}

/// Configuration pointing at a settings file inside `dir`.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        platform: Platform::Linux,
        helper_path: dir.join("consult-dialog"),
        settings_path: dir.join("settings.json"),
        dialog_timeout: Duration::from_secs(600),
        heartbeat_interval: Duration::from_secs(15),
    }
}

pub fn write_settings(dir: &Path, settings: Value) {
    std::fs::write(dir.join("settings.json"), settings.to_string()).unwrap();
}

/// Session plus the concrete provider so tests can inspect its calls.
pub fn session(provider: FakeProvider, config: ServerConfig) -> (Arc<DialogSession>, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    let session = Arc::new(DialogSession::new(provider.clone(), config));
    (session, provider)
}

/// Records heartbeat ticks.
#[derive(Default)]
pub struct ProgressRecorder(pub Mutex<Vec<(u64, String)>>);

impl ProgressRecorder {
    pub fn ticks(&self) -> Vec<u64> {
        self.0.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }
}

impl ProgressSink for ProgressRecorder {
    fn progress(&self, progress: u64, message: &str) {
        self.0.lock().unwrap().push((progress, message.to_string()));
    }
}
