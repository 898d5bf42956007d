//! Process-backed presentation provider
//!
//! The helper is invoked as `helper <command> <json>` and must print exactly
//! one line of JSON on stdout and exit 0.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::provider::DialogProvider;
use super::types::{
    ChooseOptions, ChooseResult, ConfirmOptions, ConfirmResult, NotifyOptions, NotifyResult,
    QuestionsOptions, QuestionsResult, TextInputOptions, TextInputResult, TweakOptions,
    TweakResult,
};
use crate::config::{Platform, ServerConfig};
use crate::error::ProviderError;

/// Provider that shells out to the platform's dialog helper.
#[derive(Debug, Clone)]
pub struct ProcessProvider {
    platform: Platform,
    helper_path: PathBuf,
}

impl ProcessProvider {
    pub fn new(platform: Platform, helper_path: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            helper_path: helper_path.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.platform, config.helper_path.clone())
    }

    pub fn helper_path(&self) -> &Path {
        &self.helper_path
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.helper_path);
        #[cfg(windows)]
        {
            // CREATE_NO_WINDOW: the helper draws its own window.
            if self.platform == Platform::Windows {
                command.creation_flags(0x0800_0000);
            }
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Run one helper command and parse its single JSON line.
    async fn invoke<T, A>(&self, name: &str, args: &A) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
        A: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(args)?;
        let stdout = self.run(name, &payload).await?;
        parse_single_line(&stdout)
    }

    async fn run(&self, name: &str, payload: &str) -> Result<String, ProviderError> {
        if !self.helper_path.exists() {
            return Err(ProviderError::NotInstalled(self.helper_path.clone()));
        }

        let start = Instant::now();
        debug!(
            command = name,
            helper = %self.helper_path.display(),
            platform = self.platform.as_str(),
            "Invoking dialog helper"
        );

        let output = self
            .command()
            .arg(name)
            .arg(payload)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ProviderError::NotInstalled(self.helper_path.clone())
                }
                _ => ProviderError::Spawn(Arc::new(e)),
            })?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(command = name, status = %output.status, elapsed_ms, "Dialog helper failed");
            return Err(exit_error(output.status, stderr));
        }

        info!(command = name, elapsed_ms, "Dialog helper finished");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Exactly one non-empty line of JSON, nothing else.
fn parse_single_line<T: DeserializeOwned>(stdout: &str) -> Result<T, ProviderError> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = match (lines.next(), lines.next()) {
        (Some(line), None) => line,
        _ => return Err(ProviderError::invalid_output(stdout)),
    };
    serde_json::from_str(line).map_err(|_| ProviderError::invalid_output(stdout))
}

fn exit_error(status: ExitStatus, stderr: String) -> ProviderError {
    if let Some(code) = status.code() {
        return ProviderError::NonZeroExit { code, stderr };
    }
    match termination_signal(status) {
        Some(signal) => ProviderError::Signal(signal),
        None => ProviderError::NonZeroExit { code: -1, stderr },
    }
}

#[cfg(unix)]
fn termination_signal(status: ExitStatus) -> Option<String> {
    use std::os::unix::process::ExitStatusExt;

    status.signal().map(|signal| {
        let name = match signal {
            1 => "SIGHUP",
            2 => "SIGINT",
            3 => "SIGQUIT",
            6 => "SIGABRT",
            9 => "SIGKILL",
            11 => "SIGSEGV",
            13 => "SIGPIPE",
            15 => "SIGTERM",
            _ => return format!("signal {signal}"),
        };
        name.to_string()
    })
}

#[cfg(not(unix))]
fn termination_signal(_status: ExitStatus) -> Option<String> {
    None
}

#[async_trait]
impl DialogProvider for ProcessProvider {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn confirm(&self, options: &ConfirmOptions) -> Result<ConfirmResult, ProviderError> {
        self.invoke("confirm", options).await
    }

    async fn choose(&self, options: &ChooseOptions) -> Result<ChooseResult, ProviderError> {
        self.invoke("choose", options).await
    }

    async fn text_input(
        &self,
        options: &TextInputOptions,
    ) -> Result<TextInputResult, ProviderError> {
        self.invoke("textInput", options).await
    }

    async fn questions(
        &self,
        options: &QuestionsOptions,
    ) -> Result<QuestionsResult, ProviderError> {
        self.invoke("questions", options).await
    }

    async fn tweak(&self, options: &TweakOptions) -> Result<TweakResult, ProviderError> {
        self.invoke("tweak", options).await
    }

    async fn notify(&self, options: &NotifyOptions) -> Result<NotifyResult, ProviderError> {
        self.invoke("notify", options).await
    }

    async fn pulse(&self) {
        if let Err(e) = self.invoke::<Value, _>("pulse", &json!({})).await {
            debug!(error = %e, "Pulse failed");
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::dialog::types::DialogPosition;
    use std::os::unix::fs::PermissionsExt;

    fn helper(dir: &tempfile::TempDir, body: &str) -> ProcessProvider {
        let path = dir.path().join("helper.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        ProcessProvider::new(Platform::Linux, path)
    }

    fn text_options() -> TextInputOptions {
        TextInputOptions {
            body: "Name?".into(),
            title: "Agent".into(),
            default_value: String::new(),
            hidden: false,
            position: DialogPosition::Center,
        }
    }

    #[tokio::test]
    async fn test_passes_command_and_json_argument() {
        let dir = tempfile::tempdir().unwrap();
        let provider = helper(
            &dir,
            r#"case "$2" in *'"body":"Name?"'*) printf '{"answer":"%s"}\n' "$1";; *) exit 9;; esac"#,
        );
        let result = provider.text_input(&text_options()).await.unwrap();
        assert_eq!(result.answer.as_deref(), Some("textInput"));
    }

    #[tokio::test]
    async fn test_parses_outcome_fields() {
        let dir = tempfile::tempdir().unwrap();
        let provider = helper(&dir, r#"echo '{"confirmed":false,"dismissed":true}'"#);
        let options = ConfirmOptions {
            body: "Go?".into(),
            title: "Agent".into(),
            confirm_label: "Yes".into(),
            cancel_label: "No".into(),
            position: DialogPosition::Left,
        };
        let result = provider.confirm(&options).await.unwrap();
        assert_eq!(result.confirmed, Some(false));
        assert!(result.outcome.is_cancelled());
    }

    #[tokio::test]
    async fn test_non_zero_exit_includes_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let provider = helper(&dir, "echo 'window server unavailable' 1>&2\nexit 3");
        match provider.text_input(&text_options()).await {
            Err(ProviderError::NonZeroExit { code, stderr }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "window server unavailable");
            }
            other => panic!("expected non-zero exit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_killed_by_signal() {
        let dir = tempfile::tempdir().unwrap();
        let provider = helper(&dir, "kill -9 $$");
        match provider.text_input(&text_options()).await {
            Err(ProviderError::Signal(name)) => assert_eq!(name, "SIGKILL"),
            other => panic!("expected signal error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_and_multi_line_output() {
        let dir = tempfile::tempdir().unwrap();
        let provider = helper(&dir, "echo 'Segmentation fault (core dumped)'");
        match provider.text_input(&text_options()).await {
            Err(ProviderError::InvalidOutput { snippet }) => {
                assert_eq!(snippet, "Segmentation fault (core dumped)")
            }
            other => panic!("expected invalid output, got {other:?}"),
        }

        let dir = tempfile::tempdir().unwrap();
        let provider = helper(&dir, "echo '{\"answer\":\"a\"}'\necho '{\"answer\":\"b\"}'");
        assert!(matches!(
            provider.text_input(&text_options()).await,
            Err(ProviderError::InvalidOutput { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_helper() {
        let provider = ProcessProvider::new(Platform::MacOs, "/nonexistent/consult-dialog");
        let err = provider.text_input(&text_options()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotInstalled(_)));
        assert!(err.to_string().contains("/nonexistent/consult-dialog"));

        // Swallowed, never panics.
        provider.pulse().await;
        provider.preview("hello").await;
    }
}
