//! Humanizer: one plain sentence per compact response
//!
//! Checked in the same priority order as the compactor, so the agent never
//! has to parse JSON when humanized responses are enabled.

use serde_json::{Map, Value};

use super::compact::{Answer, CompactResponse};

/// Sleep used when a snooze carries no remaining time.
pub const DEFAULT_SNOOZE_SECONDS: u64 = 60;

/// Describe an `askDifferently` identifier; unknown ids pass through verbatim.
pub fn describe_format(id: &str) -> &str {
    match id {
        "confirm" => "a yes/no confirmation",
        "pick" => "a single-choice list",
        "pick-multi" => "a multiple-choice list",
        "text" => "a free-text input",
        "text-hidden" => "a hidden text input",
        "form-wizard" => "a step-by-step form",
        "form-accordion" => "a single-page form with all questions visible",
        other => other,
    }
}

/// Turn a compact response into a sentence for the agent.
pub fn humanize(response: &CompactResponse) -> String {
    match response {
        CompactResponse::Snoozed { remaining_seconds } => {
            let secs = remaining_seconds.unwrap_or(DEFAULT_SNOOZE_SECONDS);
            format!(
                "The user snoozed this question. Wait {secs} seconds (e.g. run `sleep {secs}`), \
                 then ask the exact same question again."
            )
        }
        CompactResponse::AskDifferently { format } => format!(
            "The user wants this question re-asked as {}. Ask again using that format.",
            describe_format(format)
        ),
        CompactResponse::Feedback {
            feedback_text,
            answer,
            completed_count,
        } => {
            let mut out = format!(
                "The user responded with feedback instead of an answer: \"{feedback_text}\". \
                 Adjust your approach based on this feedback and ask again."
            );
            if let Some(Answer::Fields(fields)) = answer {
                out.push_str(&format!(
                    " Their partial answer was: {}{}.",
                    render_fields(fields),
                    progress_suffix(*completed_count, fields.len())
                ));
            } else if let Some(answer) = answer {
                out.push_str(&format!(" Their partial answer was: {}.", render_answer(answer)));
            }
            out
        }
        CompactResponse::Cancelled {
            answer,
            completed_count,
        } => {
            let mut out = "The user cancelled the dialog. Proceed with a reasonable default."
                .to_string();
            if let Some(Answer::Fields(fields)) = answer {
                out.push_str(&format!(
                    " Before cancelling they answered: {}{}.",
                    render_fields(fields),
                    progress_suffix(*completed_count, fields.len())
                ));
            } else if let Some(answer) = answer {
                out.push_str(&format!(" Before cancelling they answered: {}.", render_answer(answer)));
            }
            out
        }
        CompactResponse::Answered {
            answer,
            completed_count,
            action,
            replay_animations,
            comment,
            instruction,
        } => {
            let mut out = match answer {
                Some(Answer::Confirmed(true)) => "The user confirmed.".to_string(),
                Some(Answer::Confirmed(false)) => "The user declined.".to_string(),
                Some(Answer::Text(text)) => format!("The user responded: {text}"),
                Some(Answer::Selected(labels)) => {
                    format!("The user selected: {}", labels.join(", "))
                }
                Some(Answer::Fields(fields)) => format!(
                    "The user answered: {}{}",
                    render_fields(fields),
                    progress_suffix(*completed_count, fields.len())
                ),
                None => "The user closed the dialog without choosing anything.".to_string(),
            };
            if let Some(action) = action {
                out.push_str(&format!(" Requested action: {action}."));
            }
            if *replay_animations == Some(true) {
                out.push_str(" Replay the animations so the change is visible.");
            }
            if let Some(comment) = comment {
                out.push_str(&format!(" Comment: \"{comment}\"."));
            }
            if let Some(instruction) = instruction {
                out.push_str(&format!(" Additional instruction: {instruction}"));
            }
            out
        }
    }
}

fn render_answer(answer: &Answer) -> String {
    match answer {
        Answer::Confirmed(true) => "confirmed".to_string(),
        Answer::Confirmed(false) => "declined".to_string(),
        Answer::Text(text) => text.clone(),
        Answer::Selected(labels) => labels.join(", "),
        Answer::Fields(fields) => render_fields(fields),
    }
}

fn render_fields(fields: &Map<String, Value>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}: {}", render_value(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(render_value).collect::<Vec<_>>().join(", ")
        ),
        other => other.to_string(),
    }
}

fn progress_suffix(completed: Option<usize>, total: usize) -> String {
    match completed {
        Some(n) => format!(" ({n}/{total} completed)"),
        None => String::new(),
    }
}
