//! Dialog request and raw result types
//!
//! Requests are what the presentation helper receives as its JSON argument;
//! raw results are what it prints back. Every raw result shares the same
//! `DialogOutcome` tail so the compactor can apply one priority rule to all
//! dialog kinds.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::tweak::ResolvedParameter;

// ============================================================================
// Shared
// ============================================================================

/// Placement hint passed through to the helper untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogPosition {
    Left,
    #[default]
    Center,
    Right,
}

/// Dialog kinds as seen by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Confirm,
    Pick,
    Text,
    Form,
    Tweak,
}

impl DialogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DialogKind::Confirm => "confirm",
            DialogKind::Pick => "pick",
            DialogKind::Text => "text",
            DialogKind::Form => "form",
            DialogKind::Tweak => "tweak",
        }
    }

    /// Command name understood by the presentation helper.
    pub fn command(self) -> &'static str {
        match self {
            DialogKind::Confirm => "confirm",
            DialogKind::Pick => "choose",
            DialogKind::Text => "textInput",
            DialogKind::Form => "questions",
            DialogKind::Tweak => "tweak",
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOptions {
    pub body: String,
    pub title: String,
    pub confirm_label: String,
    pub cancel_label: String,
    #[serde(default)]
    pub position: DialogPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChooseOptions {
    pub body: String,
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptions: Option<Vec<String>>,
    #[serde(default)]
    pub allow_multiple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_selection: Option<String>,
    #[serde(default)]
    pub position: DialogPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInputOptions {
    pub body: String,
    pub title: String,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub position: DialogPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub multi_select: bool,
}

/// How a multi-question form is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    #[default]
    Wizard,
    Accordion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsOptions {
    pub questions: Vec<Question>,
    #[serde(default)]
    pub mode: FormMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub position: DialogPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweakOptions {
    pub title: String,
    pub parameters: Vec<ResolvedParameter>,
    #[serde(default)]
    pub position: DialogPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyOptions {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

/// A fully validated dialog, ready to hand to a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogRequest {
    Confirm(ConfirmOptions),
    Pick(ChooseOptions),
    Text(TextInputOptions),
    Form(QuestionsOptions),
    Tweak(TweakOptions),
}

impl DialogRequest {
    pub fn kind(&self) -> DialogKind {
        match self {
            DialogRequest::Confirm(_) => DialogKind::Confirm,
            DialogRequest::Pick(_) => DialogKind::Pick,
            DialogRequest::Text(_) => DialogKind::Text,
            DialogRequest::Form(_) => DialogKind::Form,
            DialogRequest::Tweak(_) => DialogKind::Tweak,
        }
    }
}

// ============================================================================
// Raw results
// ============================================================================

/// Outcome fields every helper result may carry.
///
/// Only one of these is meaningful for a given call, but the wire shape
/// always allows all of them; `compact` decides which one wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snoozed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snooze_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_differently: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

impl DialogOutcome {
    pub fn is_snoozed(&self) -> bool {
        self.snoozed.unwrap_or(false)
    }

    /// Cancel and window-chrome dismissal look the same to the agent.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.unwrap_or(false) || self.dismissed.unwrap_or(false)
    }

    /// Seconds until the snooze expires, falling back to the snooze length.
    pub fn snooze_seconds(&self) -> Option<u64> {
        self.remaining_seconds
            .or_else(|| self.snooze_minutes.map(|m| m.saturating_mul(60)))
    }
}

/// A pick answer: one label, or several when `allowMultiple` was set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
    #[serde(flatten)]
    pub outcome: DialogOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChooseResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Selection>,
    #[serde(flatten)]
    pub outcome: DialogOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInputResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(flatten)]
    pub outcome: DialogOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResult {
    /// Question id → label, list of labels, or free text, in question order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub answers: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_count: Option<usize>,
    #[serde(flatten)]
    pub outcome: DialogOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweakResult {
    /// Parameter label → final value.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replay_animations: Option<bool>,
    #[serde(flatten)]
    pub outcome: DialogOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyResult {
    #[serde(default)]
    pub success: bool,
}

/// Helpers report an untouched map as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw helper result, tagged by the dialog that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    Confirm(ConfirmResult),
    Pick(ChooseResult),
    Text(TextInputResult),
    Form(QuestionsResult),
    Tweak(TweakResult),
}

impl RawResult {
    pub fn kind(&self) -> DialogKind {
        match self {
            RawResult::Confirm(_) => DialogKind::Confirm,
            RawResult::Pick(_) => DialogKind::Pick,
            RawResult::Text(_) => DialogKind::Text,
            RawResult::Form(_) => DialogKind::Form,
            RawResult::Tweak(_) => DialogKind::Tweak,
        }
    }

    pub fn outcome(&self) -> &DialogOutcome {
        match self {
            RawResult::Confirm(r) => &r.outcome,
            RawResult::Pick(r) => &r.outcome,
            RawResult::Text(r) => &r.outcome,
            RawResult::Form(r) => &r.outcome,
            RawResult::Tweak(r) => &r.outcome,
        }
    }
}
