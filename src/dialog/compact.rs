//! Response compactor
//!
//! Collapses a helper's verbose raw result into the smallest object the
//! agent needs. Outcomes are checked in a fixed priority order:
//!
//! 1. snoozed → `{snoozed, remainingSeconds}` and nothing else
//! 2. askDifferently → `{askDifferently}` and nothing else
//! 3. feedbackText → kept, and suppresses cancellation
//! 4. cancelled / dismissed → `{cancelled: true}`
//! 5. type-specific answer (form answers survive cancellation)
//!
//! The serialized form never contains explicit nulls.

use serde::ser::Serializer;
use serde::Serialize;
use serde_json::{Map, Value};

use super::types::{RawResult, Selection};

/// The agent-visible answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    /// Confirm dialogs.
    Confirmed(bool),
    /// Text input, or a single pick.
    Text(String),
    /// Multi-select pick, in the user's order.
    Selected(Vec<String>),
    /// Form answers by question id, or tweak values by label.
    Fields(Map<String, Value>),
}

/// Exactly one outcome per dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum CompactResponse {
    Snoozed {
        remaining_seconds: Option<u64>,
    },
    AskDifferently {
        format: String,
    },
    Feedback {
        feedback_text: String,
        answer: Option<Answer>,
        completed_count: Option<usize>,
    },
    Cancelled {
        /// Partial form progress survives cancellation.
        answer: Option<Answer>,
        completed_count: Option<usize>,
    },
    Answered {
        answer: Option<Answer>,
        completed_count: Option<usize>,
        action: Option<String>,
        replay_animations: Option<bool>,
        comment: Option<String>,
        instruction: Option<String>,
    },
}

/// Reduce a raw helper result to its compact form.
pub fn compact(raw: &RawResult) -> CompactResponse {
    let outcome = raw.outcome();

    if outcome.is_snoozed() {
        return CompactResponse::Snoozed {
            remaining_seconds: outcome.snooze_seconds(),
        };
    }

    if let Some(format) = non_blank(&outcome.ask_differently) {
        return CompactResponse::AskDifferently {
            format: format.to_string(),
        };
    }

    let feedback = non_blank(&outcome.feedback_text).map(str::to_string);
    let cancelled = feedback.is_none() && outcome.is_cancelled();
    let answer = extract_answer(raw, feedback.is_some(), cancelled);

    match feedback {
        Some(feedback_text) => CompactResponse::Feedback {
            feedback_text,
            answer: answer.answer,
            completed_count: answer.completed_count,
        },
        None if cancelled => CompactResponse::Cancelled {
            answer: answer.answer,
            completed_count: answer.completed_count,
        },
        None => CompactResponse::Answered {
            answer: answer.answer,
            completed_count: answer.completed_count,
            action: answer.action,
            replay_animations: answer.replay_animations,
            comment: non_blank(&outcome.comment).map(str::to_string),
            instruction: non_blank(&outcome.instruction).map(str::to_string),
        },
    }
}

#[derive(Default)]
struct Extracted {
    answer: Option<Answer>,
    completed_count: Option<usize>,
    action: Option<String>,
    replay_animations: Option<bool>,
}

fn extract_answer(raw: &RawResult, has_feedback: bool, cancelled: bool) -> Extracted {
    match raw {
        RawResult::Confirm(r) if !has_feedback && !cancelled => Extracted {
            answer: r.confirmed.map(Answer::Confirmed),
            ..Default::default()
        },
        RawResult::Confirm(_) => Extracted::default(),

        RawResult::Form(r) => {
            let answers = without_nulls(&r.answers);
            Extracted {
                answer: (!answers.is_empty()).then_some(Answer::Fields(answers)),
                completed_count: r.completed_count.filter(|n| *n > 0),
                ..Default::default()
            }
        }

        RawResult::Pick(r) if !cancelled => Extracted {
            answer: r.answer.clone().map(|selection| match selection {
                Selection::One(label) => Answer::Text(label),
                Selection::Many(labels) => Answer::Selected(labels),
            }),
            ..Default::default()
        },

        RawResult::Text(r) if !cancelled => Extracted {
            answer: r.answer.clone().map(Answer::Text),
            ..Default::default()
        },

        RawResult::Tweak(r) if !cancelled => {
            let values = without_nulls(&r.values);
            Extracted {
                answer: (!values.is_empty()).then_some(Answer::Fields(values)),
                action: non_blank(&r.action).map(str::to_string),
                replay_animations: r.replay_animations,
                ..Default::default()
            }
        }

        RawResult::Pick(_) | RawResult::Text(_) | RawResult::Tweak(_) => Extracted::default(),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn without_nulls(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

// ============================================================================
// Serialization
// ============================================================================

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct CompactView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    snoozed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ask_differently: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancelled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<&'a Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay_animations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instruction: Option<&'a str>,
}

impl CompactResponse {
    fn view(&self) -> CompactView<'_> {
        match self {
            CompactResponse::Snoozed { remaining_seconds } => CompactView {
                snoozed: Some(true),
                remaining_seconds: *remaining_seconds,
                ..Default::default()
            },
            CompactResponse::AskDifferently { format } => CompactView {
                ask_differently: Some(format),
                ..Default::default()
            },
            CompactResponse::Feedback {
                feedback_text,
                answer,
                completed_count,
            } => CompactView {
                feedback_text: Some(feedback_text),
                answer: answer.as_ref(),
                completed_count: *completed_count,
                ..Default::default()
            },
            CompactResponse::Cancelled {
                answer,
                completed_count,
            } => CompactView {
                cancelled: Some(true),
                answer: answer.as_ref(),
                completed_count: *completed_count,
                ..Default::default()
            },
            CompactResponse::Answered {
                answer,
                completed_count,
                action,
                replay_animations,
                comment,
                instruction,
            } => CompactView {
                answer: answer.as_ref(),
                completed_count: *completed_count,
                action: action.as_deref(),
                replay_animations: *replay_animations,
                comment: comment.as_deref(),
                instruction: instruction.as_deref(),
                ..Default::default()
            },
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Single-line JSON, as returned to the agent in compact mode.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for CompactResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.view().serialize(serializer)
    }
}
