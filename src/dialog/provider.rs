//! Presentation provider seam
//!
//! One implementation per target platform renders dialogs; tests substitute
//! a fake that returns canned raw results.

use async_trait::async_trait;
use tracing::debug;

use super::types::{
    ChooseOptions, ChooseResult, ConfirmOptions, ConfirmResult, DialogRequest, NotifyOptions,
    NotifyResult, QuestionsOptions, QuestionsResult, RawResult, TextInputOptions,
    TextInputResult, TweakOptions, TweakResult,
};
use crate::error::ProviderError;

/// Title used when previewing an outgoing response.
pub const PREVIEW_TITLE: &str = "Review response";

/// Renders dialogs and returns their raw results.
#[async_trait]
pub trait DialogProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn confirm(&self, options: &ConfirmOptions) -> Result<ConfirmResult, ProviderError>;

    async fn choose(&self, options: &ChooseOptions) -> Result<ChooseResult, ProviderError>;

    async fn text_input(&self, options: &TextInputOptions)
        -> Result<TextInputResult, ProviderError>;

    async fn questions(&self, options: &QuestionsOptions)
        -> Result<QuestionsResult, ProviderError>;

    async fn tweak(&self, options: &TweakOptions) -> Result<TweakResult, ProviderError>;

    async fn notify(&self, options: &NotifyOptions) -> Result<NotifyResult, ProviderError>;

    /// Liveness ping to the companion app. Never fails and never matters.
    async fn pulse(&self);

    /// Show the outgoing response to the user before it reaches the agent.
    ///
    /// Best effort: failures are logged and swallowed.
    async fn preview(&self, text: &str) {
        let options = NotifyOptions {
            title: PREVIEW_TITLE.to_string(),
            body: text.to_string(),
            subtitle: None,
        };
        if let Err(e) = self.notify(&options).await {
            debug!(provider = self.name(), error = %e, "Preview failed");
        }
    }
}

/// Route a validated request to the matching provider operation.
pub async fn present(
    provider: &dyn DialogProvider,
    request: &DialogRequest,
) -> Result<RawResult, ProviderError> {
    Ok(match request {
        DialogRequest::Confirm(opts) => RawResult::Confirm(provider.confirm(opts).await?),
        DialogRequest::Pick(opts) => RawResult::Pick(provider.choose(opts).await?),
        DialogRequest::Text(opts) => RawResult::Text(provider.text_input(opts).await?),
        DialogRequest::Form(opts) => RawResult::Form(provider.questions(opts).await?),
        DialogRequest::Tweak(opts) => RawResult::Tweak(provider.tweak(opts).await?),
    })
}
