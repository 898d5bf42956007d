//! Agent-facing `ask` parameters and their conversion into a typed dialog

use serde::Deserialize;

use super::types::{
    ChooseOptions, ConfirmOptions, DialogPosition, DialogRequest, FormMode, Question,
    QuestionOption, QuestionsOptions, TextInputOptions,
};
use super::validation::{
    check_unique_ids, normalize_escapes, reject_all_of_the_above, validate_choices,
};
use crate::error::ValidationError;

/// Arguments of the `ask` tool, as the agent sends them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskParams {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub yes: Option<String>,
    #[serde(default)]
    pub no: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    #[serde(default)]
    pub multi: bool,
    #[serde(default)]
    pub descriptions: Option<Vec<String>>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub questions: Option<Vec<QuestionParams>>,
    #[serde(default)]
    pub mode: Option<FormMode>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub position: Option<DialogPosition>,
    #[serde(default)]
    pub project_path: Option<String>,
}

/// One form question as the agent sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionParams {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    #[serde(default)]
    pub options: Vec<OptionParams>,
    #[serde(default, alias = "multi")]
    pub multi_select: bool,
}

/// Options may be bare labels or `{label, description}` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionParams {
    Label(String),
    Full(QuestionOption),
}

impl From<OptionParams> for QuestionOption {
    fn from(value: OptionParams) -> Self {
        match value {
            OptionParams::Label(label) => QuestionOption {
                label,
                description: None,
            },
            OptionParams::Full(option) => option,
        }
    }
}

impl AskParams {
    /// Validate and convert into a dialog request.
    ///
    /// `default_title` is used when the agent did not supply one.
    pub fn into_request(self, default_title: &str) -> Result<DialogRequest, ValidationError> {
        let kind = self.kind.trim().to_ascii_lowercase();
        let position = self.position.unwrap_or_default();
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_title.to_string());

        match kind.as_str() {
            "confirm" => Ok(DialogRequest::Confirm(ConfirmOptions {
                body: required_body(self.body, "confirm")?,
                title,
                confirm_label: self.yes.unwrap_or_else(|| "Yes".to_string()),
                cancel_label: self.no.unwrap_or_else(|| "No".to_string()),
                position,
            })),
            "pick" => {
                let body = required_body(self.body, "pick")?;
                let choices = self.choices.unwrap_or_default();
                validate_choices(
                    &choices,
                    self.descriptions.as_deref(),
                    self.default.as_deref(),
                )?;
                Ok(DialogRequest::Pick(ChooseOptions {
                    body,
                    choices,
                    descriptions: self.descriptions,
                    allow_multiple: self.multi,
                    default_selection: self.default,
                    position,
                }))
            }
            "text" => Ok(DialogRequest::Text(TextInputOptions {
                body: required_body(self.body, "text")?,
                title,
                default_value: self.default.unwrap_or_default(),
                hidden: self.hidden,
                position,
            })),
            "form" => {
                let params = self.questions.unwrap_or_default();
                if params.is_empty() {
                    return Err(ValidationError::NoQuestions);
                }

                let questions = params
                    .into_iter()
                    .enumerate()
                    .map(|(i, q)| build_question(i, q))
                    .collect::<Result<Vec<_>, _>>()?;
                check_unique_ids(questions.iter().map(|q| q.id.as_str()))?;

                let title = match self.body {
                    Some(body) if !body.trim().is_empty() => normalize_escapes(&body),
                    _ => title,
                };
                Ok(DialogRequest::Form(QuestionsOptions {
                    questions,
                    mode: self.mode.unwrap_or_default(),
                    title: Some(title),
                    position,
                }))
            }
            other => Err(ValidationError::UnknownType(other.to_string())),
        }
    }
}

fn required_body(body: Option<String>, kind: &'static str) -> Result<String, ValidationError> {
    match body {
        Some(body) if !body.trim().is_empty() => Ok(normalize_escapes(&body)),
        _ => Err(ValidationError::MissingField {
            field: "body",
            kind,
        }),
    }
}

fn build_question(index: usize, params: QuestionParams) -> Result<Question, ValidationError> {
    let id = params
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("q{}", index + 1));

    let options: Vec<QuestionOption> = params.options.into_iter().map(Into::into).collect();
    if options.is_empty() {
        return Err(ValidationError::NoOptions(id));
    }
    reject_all_of_the_above(options.iter().map(|o| o.label.as_str()))?;

    Ok(Question {
        id,
        question: normalize_escapes(&params.question),
        options,
        multi_select: params.multi_select,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> AskParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_confirm_defaults() {
        let req = params(json!({"type": "confirm", "body": "Deploy?\\nNow"}))
            .into_request("Agent")
            .unwrap();
        match req {
            DialogRequest::Confirm(opts) => {
                assert_eq!(opts.body, "Deploy?\nNow");
                assert_eq!(opts.title, "Agent");
                assert_eq!(opts.confirm_label, "Yes");
                assert_eq!(opts.cancel_label, "No");
                assert_eq!(opts.position, DialogPosition::Center);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_pick_rejects_all_of_the_above() {
        let err = params(json!({
            "type": "pick",
            "body": "Which?",
            "choices": ["Red", "Blue", "All of the above"]
        }))
        .into_request("Agent")
        .unwrap_err();
        assert!(matches!(err, ValidationError::AllOfTheAbove { label } if label == "All of the above"));
    }

    #[test]
    fn test_pick_requires_choices() {
        let err = params(json!({"type": "pick", "body": "Which?"}))
            .into_request("Agent")
            .unwrap_err();
        assert_eq!(err, ValidationError::NoChoices);
    }

    #[test]
    fn test_missing_body() {
        let err = params(json!({"type": "text", "body": "   "}))
            .into_request("Agent")
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                field: "body",
                kind: "text"
            }
        );
    }

    #[test]
    fn test_form_builds_questions() {
        let req = params(json!({
            "type": "form",
            "mode": "accordion",
            "questions": [
                {"question": "DB?\\tpick one", "options": ["Postgres", {"label": "SQLite", "description": "file"}]},
                {"id": "langs", "question": "Languages", "options": ["Rust", "Go"], "multiSelect": true}
            ]
        }))
        .into_request("Agent")
        .unwrap();
        match req {
            DialogRequest::Form(opts) => {
                assert_eq!(opts.mode, FormMode::Accordion);
                assert_eq!(opts.questions[0].id, "q1");
                assert_eq!(opts.questions[0].question, "DB?\tpick one");
                assert_eq!(
                    opts.questions[0].options[1].description.as_deref(),
                    Some("file")
                );
                assert!(opts.questions[1].multi_select);
                assert_eq!(opts.title.as_deref(), Some("Agent"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_form_checks_each_option_list() {
        let err = params(json!({
            "type": "form",
            "questions": [
                {"question": "A", "options": ["x"]},
                {"question": "B", "options": ["y", "None of these"]}
            ]
        }))
        .into_request("Agent")
        .unwrap_err();
        assert!(matches!(err, ValidationError::AllOfTheAbove { .. }));
    }

    #[test]
    fn test_form_rejects_duplicate_ids_and_empty() {
        let err = params(json!({
            "type": "form",
            "questions": [
                {"id": "a", "question": "A", "options": ["x"]},
                {"id": "a", "question": "B", "options": ["y"]}
            ]
        }))
        .into_request("Agent")
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateQuestionId("a".into()));

        let err = params(json!({"type": "form", "questions": []}))
            .into_request("Agent")
            .unwrap_err();
        assert_eq!(err, ValidationError::NoQuestions);
    }

    #[test]
    fn test_unknown_type() {
        let err = params(json!({"type": "slider", "body": "x"}))
            .into_request("Agent")
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownType("slider".into()));
    }
}
