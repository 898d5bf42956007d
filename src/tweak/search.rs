//! Text-search resolver: `"padding: {v}px"` → location of the number in `{v}`

use regex::Regex;

use super::location::{locate, split_numeric, ResolvedLocation, NUMBER_PATTERN};
use crate::error::ResolveError;

/// Placeholder marking the value inside a search pattern.
pub const PLACEHOLDER: &str = "{v}";

/// A search pattern split around its single placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern<'a> {
    pub left: &'a str,
    pub right: &'a str,
    /// Leading letters / `%` of the right-hand literal.
    pub unit: &'a str,
}

impl<'a> SearchPattern<'a> {
    /// Rejects patterns without exactly one `{v}`, before any file is read.
    pub fn parse(pattern: &'a str) -> Result<Self, ResolveError> {
        let count = pattern.matches(PLACEHOLDER).count();
        let (left, right) = match (count, pattern.split_once(PLACEHOLDER)) {
            (1, Some(parts)) => parts,
            _ => {
                return Err(ResolveError::Placeholder {
                    pattern: pattern.to_string(),
                    count,
                })
            }
        };
        let unit_len = right
            .find(|c: char| !(c.is_ascii_alphabetic() || c == '%'))
            .unwrap_or(right.len());
        Ok(Self {
            left,
            right,
            unit: &right[..unit_len],
        })
    }

    fn regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(
            "{}({}){}",
            regex::escape(self.left),
            NUMBER_PATTERN,
            regex::escape(self.right)
        ))
    }
}

/// Resolve the first occurrence of `pattern` in `content`.
pub fn resolve_search(
    content: &str,
    file: &str,
    pattern: &str,
) -> Result<ResolvedLocation, ResolveError> {
    let parsed = SearchPattern::parse(pattern)?;
    let not_found = || ResolveError::PatternNotFound {
        pattern: pattern.to_string(),
        file: file.to_string(),
    };

    let re = parsed.regex().map_err(|_| not_found())?;
    let value = re
        .captures(content)
        .and_then(|caps| caps.get(1))
        .ok_or_else(not_found)?;

    // The unit comes from the pattern; the match guarantees it follows.
    let text = &content[value.start()..value.end() + parsed.unit.len()];
    let literal = split_numeric(text).ok_or_else(not_found)?;
    Ok(locate(content, value.start(), &literal))
}
