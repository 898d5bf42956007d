//! Request invariants checked before any dialog is shown

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ValidationError;

/// Upper bound on choices in a single pick dialog.
pub const MAX_CHOICES: usize = 20;

static ALL_OF_THE_ABOVE: OnceLock<Regex> = OnceLock::new();

fn all_of_the_above_pattern() -> &'static Regex {
    ALL_OF_THE_ABOVE.get_or_init(|| {
        Regex::new(
            r"(?ix)^(?:
                (?:all|none|both|any|neither)\s+of\s+(?:the\s+)?(?:above|these|them|those|the\s+options|the\s+choices)
              | (?:select|choose|pick)\s+(?:all|none|everything)
              | all\s+(?:above|options|choices)
              | none\s+(?:above|apply)
            )$",
        )
        .expect("static regex")
    })
}

/// True for pseudo-options such as "All of the above" or "Select all".
///
/// Multi-select intent has to be expressed with `multi` / `multiSelect`,
/// never as an extra option. Plain labels that merely start with "All" or
/// "None" ("All sizes", "None") are fine.
pub fn is_all_of_the_above(label: &str) -> bool {
    let collapsed = label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let trimmed = collapsed.trim_end_matches(['.', '!', ')']).trim_start_matches('(');
    all_of_the_above_pattern().is_match(trimmed)
}

/// Reject the first label that is an "all/none of the above" pseudo-option.
pub fn reject_all_of_the_above<'a, I>(labels: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    match labels.into_iter().find(|l| is_all_of_the_above(l)) {
        Some(label) => Err(ValidationError::AllOfTheAbove {
            label: label.to_string(),
        }),
        None => Ok(()),
    }
}

/// Turn literal `\n` / `\t` escape sequences into real control characters.
///
/// Language-model callers routinely emit the two-character sequence instead
/// of the character itself.
pub fn normalize_escapes(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }
    text.replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

pub fn validate_choices(
    choices: &[String],
    descriptions: Option<&[String]>,
    default: Option<&str>,
) -> Result<(), ValidationError> {
    if choices.is_empty() {
        return Err(ValidationError::NoChoices);
    }
    if choices.len() > MAX_CHOICES {
        return Err(ValidationError::TooManyChoices {
            count: choices.len(),
            max: MAX_CHOICES,
        });
    }
    reject_all_of_the_above(choices.iter().map(String::as_str))?;

    if let Some(descriptions) = descriptions {
        if descriptions.len() != choices.len() {
            return Err(ValidationError::DescriptionsMismatch {
                choices: choices.len(),
                descriptions: descriptions.len(),
            });
        }
    }

    if let Some(default) = default {
        if !choices.iter().any(|c| c == default) {
            return Err(ValidationError::UnknownDefault(default.to_string()));
        }
    }
    Ok(())
}

/// Ids must be unique within one form.
pub fn check_unique_ids<'a, I>(ids: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateQuestionId(id.to_string()));
        }
    }
    Ok(())
}
