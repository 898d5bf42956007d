//! Line/column arithmetic and numeric-literal parsing shared by the resolvers
//!
//! Lines and columns are 1-indexed; columns count characters, not bytes.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Signed decimal, as written in CSS and most source languages.
pub(crate) const NUMBER_PATTERN: &str = r"-?(?:\d+(?:\.\d+)?|\.\d+)";

static NUMERIC_TOKEN: OnceLock<Regex> = OnceLock::new();

fn numeric_token() -> &'static Regex {
    NUMERIC_TOKEN.get_or_init(|| {
        Regex::new(&format!(r"^({NUMBER_PATTERN})([A-Za-z%]*)")).expect("static regex")
    })
}

/// Where a numeric literal sits in a file and how to read it.
///
/// `expected_text` appears verbatim at (`line`, `column`) at the moment of
/// resolution; rewriters check that before substituting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub line: usize,
    pub column: usize,
    pub expected_text: String,
    pub current: f64,
    pub unit: String,
}

/// A numeric literal split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NumericLiteral<'a> {
    pub number: &'a str,
    pub unit: &'a str,
    pub value: f64,
}

impl NumericLiteral<'_> {
    pub fn text_len(&self) -> usize {
        self.number.len() + self.unit.len()
    }
}

/// Split `token` into a leading signed decimal and a trailing unit.
pub(crate) fn split_numeric(token: &str) -> Option<NumericLiteral<'_>> {
    let caps = numeric_token().captures(token)?;
    let number = caps.get(1)?.as_str();
    let unit = caps.get(2).map_or("", |m| m.as_str());
    let value = number.parse::<f64>().ok()?;
    Some(NumericLiteral {
        number,
        unit,
        value,
    })
}

/// 1-indexed (line, column) of a byte offset.
pub fn line_col(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

/// Byte offset of a 1-indexed (line, column), if it lies inside `content`.
pub fn byte_offset(content: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }
    let mut line_start = 0;
    for _ in 1..line {
        line_start += content[line_start..].find('\n')? + 1;
    }
    let line_text = content[line_start..].split('\n').next().unwrap_or("");
    if column == 1 {
        return Some(line_start);
    }
    line_text
        .char_indices()
        .nth(column - 1)
        .map(|(i, _)| line_start + i)
        .or_else(|| (line_text.chars().count() + 1 == column).then(|| line_start + line_text.len()))
}

/// Build a location record for a literal starting at byte `offset`.
pub(crate) fn locate(content: &str, offset: usize, literal: &NumericLiteral<'_>) -> ResolvedLocation {
    let (line, column) = line_col(content, offset);
    ResolvedLocation {
        line,
        column,
        expected_text: content[offset..offset + literal.text_len()].to_string(),
        current: literal.value,
        unit: literal.unit.to_string(),
    }
}

/// Check that `expected` still sits at (`line`, `column`); return its byte offset.
pub fn verify_location(
    content: &str,
    file: &str,
    line: usize,
    column: usize,
    expected: &str,
) -> Result<usize, ResolveError> {
    let offset = byte_offset(content, line, column);
    match offset {
        Some(offset) if content[offset..].starts_with(expected) => Ok(offset),
        _ => {
            let found = offset
                .map(|o| content[o..].chars().take(expected.chars().count()).collect())
                .unwrap_or_default();
            Err(ResolveError::StaleLocation {
                expected: expected.to_string(),
                found,
                line,
                column,
                file: file.to_string(),
            })
        }
    }
}

/// Replace the literal at `location` with `replacement`, refusing stale locations.
pub fn splice_value(
    content: &str,
    file: &str,
    location: &ResolvedLocation,
    replacement: &str,
) -> Result<String, ResolveError> {
    let offset = verify_location(
        content,
        file,
        location.line,
        location.column,
        &location.expected_text,
    )?;
    let end = offset + location.expected_text.len();
    let mut out = String::with_capacity(content.len() + replacement.len());
    out.push_str(&content[..offset]);
    out.push_str(replacement);
    out.push_str(&content[end..]);
    Ok(out)
}

/// Render a value the way it would be written back into source.
pub fn format_value(value: f64, unit: &str) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}{unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_numeric() {
        let lit = split_numeric("2.5rem").unwrap();
        assert_eq!((lit.number, lit.unit, lit.value), ("2.5", "rem", 2.5));

        let lit = split_numeric("-12px;").unwrap();
        assert_eq!((lit.number, lit.unit), ("-12", "px"));

        let lit = split_numeric(".5").unwrap();
        assert_eq!((lit.value, lit.unit), (0.5, ""));

        let lit = split_numeric("50%").unwrap();
        assert_eq!(lit.unit, "%");

        assert!(split_numeric("auto").is_none());
    }

    #[test]
    fn test_line_col_counts_characters() {
        let content = "a\nβγ 42\n";
        let offset = content.find("42").unwrap();
        assert_eq!(line_col(content, offset), (2, 4));
        assert_eq!(byte_offset(content, 2, 4), Some(offset));
        assert_eq!(byte_offset(content, 1, 1), Some(0));
        assert_eq!(byte_offset(content, 9, 1), None);
    }

    #[test]
    fn test_splice_value_checks_expected_text() {
        let content = "div { padding: 16px; }";
        let loc = ResolvedLocation {
            line: 1,
            column: 16,
            expected_text: "16px".into(),
            current: 16.0,
            unit: "px".into(),
        };
        let updated = splice_value(content, "a.css", &loc, "40px").unwrap();
        assert_eq!(updated, "div { padding: 40px; }");

        let err = splice_value(&updated, "a.css", &loc, "8px").unwrap_err();
        assert!(matches!(err, ResolveError::StaleLocation { found, .. } if found == "40px"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(16.0, "px"), "16px");
        assert_eq!(format_value(2.5, "rem"), "2.5rem");
        assert_eq!(format_value(0.1 + 0.2, ""), "0.3");
        assert_eq!(format_value(-0.0, "deg"), "0deg");
    }
}
