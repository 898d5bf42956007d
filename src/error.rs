//! Error taxonomy for dialogs and location resolution
//!
//! Validation and resolver errors are deterministic and never retried.
//! Provider errors and timeouts are surfaced to the agent as-is; the agent
//! decides whether to try again.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Maximum number of characters of helper output quoted in an error.
pub const OUTPUT_SNIPPET_LIMIT: usize = 200;

/// Top-level error for a single `ask` / `tweak` dialog
///
/// `Clone` so one in-flight dialog can hand the same failure to every caller
/// waiting on it.
#[derive(Error, Debug, Clone)]
pub enum AskError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Dialog failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Could not resolve tweak parameter: {0}")]
    Resolve(#[from] ResolveError),

    /// Distinct from provider failures so callers can choose to retry.
    #[error("DialogTimeout: no response from the user within {}s", .0.as_secs())]
    DialogTimeout(Duration),
}

impl AskError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AskError::DialogTimeout(_))
    }
}

/// Malformed or rule-violating request shape, raised before any dialog opens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{field}' is required for type '{kind}'")]
    MissingField { field: &'static str, kind: &'static str },

    #[error("unknown dialog type '{0}' (expected confirm, pick, text or form)")]
    UnknownType(String),

    #[error("'pick' needs at least one choice")]
    NoChoices,

    #[error("'pick' supports at most {max} choices, got {count}")]
    TooManyChoices { count: usize, max: usize },

    #[error("'descriptions' has {descriptions} entries but there are {choices} choices")]
    DescriptionsMismatch { choices: usize, descriptions: usize },

    #[error("default '{0}' is not one of the choices")]
    UnknownDefault(String),

    #[error(
        "option '{label}' looks like an \"all/none of the above\" choice; \
         use multi: true (or multiSelect for form questions) instead"
    )]
    AllOfTheAbove { label: String },

    #[error("'form' needs at least one question")]
    NoQuestions,

    #[error("question '{0}' has no options")]
    NoOptions(String),

    #[error("duplicate question id '{0}'")]
    DuplicateQuestionId(String),

    #[error("'tweak' needs at least one parameter")]
    NoParameters,
}

/// Failure invoking the external presentation helper
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error(
        "dialog helper not found at {}; install the Consult app or point CONSULT_DIALOG_BIN at the helper",
        .0.display()
    )]
    NotInstalled(PathBuf),

    #[error("failed to launch dialog helper: {0}")]
    Spawn(#[source] Arc<std::io::Error>),

    #[error("dialog helper exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("dialog helper was killed by {0}")]
    Signal(String),

    #[error("dialog helper returned invalid output: {snippet}")]
    InvalidOutput { snippet: String },

    #[error("failed to encode dialog options: {0}")]
    Encode(#[source] Arc<serde_json::Error>),
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Encode(Arc::new(e))
    }
}

impl ProviderError {
    /// Build an `InvalidOutput` error quoting at most `OUTPUT_SNIPPET_LIMIT` chars.
    pub fn invalid_output(output: &str) -> Self {
        let trimmed = output.trim();
        let snippet = if trimmed.is_empty() {
            "<empty>".to_string()
        } else if trimmed.chars().count() > OUTPUT_SNIPPET_LIMIT {
            let head: String = trimmed.chars().take(OUTPUT_SNIPPET_LIMIT).collect();
            format!("{head}...")
        } else {
            trimmed.to_string()
        };
        ProviderError::InvalidOutput { snippet }
    }
}

/// Failure locating a numeric literal for a tweak parameter
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("selector '{selector}' not found in {file}")]
    SelectorNotFound { selector: String, file: String },

    #[error("property '{property}' not found in '{selector}' block of {file}")]
    PropertyNotFound {
        selector: String,
        property: String,
        file: String,
    },

    #[error("function '{function}' not found in '{property}' of {file}")]
    FunctionNotFound {
        function: String,
        property: String,
        file: String,
    },

    #[error("'{property}' in {file} has no value at index {index}")]
    IndexOutOfRange {
        property: String,
        index: usize,
        file: String,
    },

    #[error("value '{value}' in {file} is not numeric")]
    NotNumeric { value: String, file: String },

    #[error("search pattern '{pattern}' must contain exactly one {{v}} placeholder, found {count}")]
    Placeholder { pattern: String, count: usize },

    #[error("pattern '{pattern}' not found in {file}")]
    PatternNotFound { pattern: String, file: String },

    #[error("no <style> block found in {0}")]
    NoStyleBlock(String),

    #[error("expected '{expected}' at {line}:{column} of {file}, found '{found}'")]
    StaleLocation {
        expected: String,
        found: String,
        line: usize,
        column: usize,
        file: String,
    },

    #[error("parameter '{0}' needs a selector + property, a search pattern, or a line/column/expectedText location")]
    NoMode(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: Arc<std::io::Error>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_output_snippet_is_truncated() {
        let long = "x".repeat(500);
        match ProviderError::invalid_output(&long) {
            ProviderError::InvalidOutput { snippet } => {
                assert_eq!(snippet.len(), OUTPUT_SNIPPET_LIMIT + 3);
                assert!(snippet.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_output_marks_empty_output() {
        let err = ProviderError::invalid_output("  \n");
        assert_eq!(
            err.to_string(),
            "dialog helper returned invalid output: <empty>"
        );
    }

    #[test]
    fn timeout_is_distinguishable() {
        let err = AskError::DialogTimeout(Duration::from_secs(600));
        assert!(err.is_timeout());
        assert!(err.to_string().contains("600s"));
        let err = AskError::from(ValidationError::NoChoices);
        assert!(!err.is_timeout());
    }
}
