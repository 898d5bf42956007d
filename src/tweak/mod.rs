//! Tweak parameters and source-location resolution
//!
//! A tweak exposes numeric literals in source files as sliders. Each
//! parameter names its literal in one of three ways:
//!
//! - CSS: `selector` + `property` (optional `index`, optional `fn`)
//! - Text search: `search` containing exactly one `{v}` placeholder
//! - Direct: `line` + `column` + `expectedText` (+ `current`)
//!
//! Resolution is pure over the file content; `resolve_parameter_file` is the
//! thin wrapper that reads the file first. Columns shift after every write,
//! so callers re-resolve after each substitution.

pub mod css;
pub mod location;
pub mod search;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use css::{resolve_css, CssTarget};
pub use location::{format_value, splice_value, verify_location, ResolvedLocation};
pub use search::{resolve_search, SearchPattern};

use crate::error::ResolveError;
use location::split_numeric;

/// A slider definition as supplied by the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweakParameter {
    pub label: String,
    pub file: String,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    // CSS mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, rename = "fn", skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    // Text-search mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    // Direct mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
}

/// The way a parameter locates its literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweakTarget<'a> {
    Css(CssTarget<'a>),
    Search(&'a str),
    Direct {
        line: usize,
        column: usize,
        expected_text: &'a str,
        current: Option<f64>,
    },
}

impl TweakParameter {
    /// Pick the resolution mode. CSS wins over search, search over a direct
    /// location, when an agent supplies more than one.
    pub fn target(&self) -> Result<TweakTarget<'_>, ResolveError> {
        if let (Some(selector), Some(property)) = (&self.selector, &self.property) {
            return Ok(TweakTarget::Css(CssTarget {
                selector,
                property,
                index: self.index,
                function: self.function.as_deref(),
            }));
        }
        if let Some(pattern) = &self.search {
            return Ok(TweakTarget::Search(pattern));
        }
        if let (Some(line), Some(column), Some(expected_text)) =
            (self.line, self.column, &self.expected_text)
        {
            return Ok(TweakTarget::Direct {
                line,
                column,
                expected_text,
                current: self.current,
            });
        }
        Err(ResolveError::NoMode(self.label.clone()))
    }
}

/// A parameter bound to an exact location, as handed to the tweak dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedParameter {
    pub label: String,
    /// Absolute path when a project directory was known.
    pub file: String,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(flatten)]
    pub location: ResolvedLocation,
}

/// Resolve a target against file content.
pub fn resolve_target(
    content: &str,
    file: &str,
    target: TweakTarget<'_>,
) -> Result<ResolvedLocation, ResolveError> {
    match target {
        TweakTarget::Css(css) => resolve_css(content, file, css),
        TweakTarget::Search(pattern) => resolve_search(content, file, pattern),
        TweakTarget::Direct {
            line,
            column,
            expected_text,
            current,
        } => {
            verify_location(content, file, line, column, expected_text)?;
            let literal = split_numeric(expected_text);
            let current = current
                .or_else(|| literal.as_ref().map(|l| l.value))
                .ok_or_else(|| ResolveError::NotNumeric {
                    value: expected_text.to_string(),
                    file: file.to_string(),
                })?;
            Ok(ResolvedLocation {
                line,
                column,
                expected_text: expected_text.to_string(),
                current,
                unit: literal.map(|l| l.unit.to_string()).unwrap_or_default(),
            })
        }
    }
}

/// Resolve a parameter against already-loaded content.
pub fn resolve_parameter(
    param: &TweakParameter,
    content: &str,
) -> Result<ResolvedParameter, ResolveError> {
    // Search patterns are validated before the content is touched.
    if let Some(pattern) = &param.search {
        SearchPattern::parse(pattern)?;
    }
    let target = param.target()?;
    let mut location = resolve_target(content, &param.file, target)?;
    if location.unit.is_empty() {
        if let Some(unit) = &param.unit {
            location.unit = unit.clone();
        }
    }
    Ok(ResolvedParameter {
        label: param.label.clone(),
        file: param.file.clone(),
        min: param.min,
        max: param.max,
        step: param.step,
        location,
    })
}

/// Read the parameter's file (relative to `base_dir` when given) and resolve it.
pub fn resolve_parameter_file(
    param: &TweakParameter,
    base_dir: Option<&Path>,
) -> Result<ResolvedParameter, ResolveError> {
    if let Some(pattern) = &param.search {
        SearchPattern::parse(pattern)?;
    }
    let path = resolve_path(&param.file, base_dir);
    let content = std::fs::read_to_string(&path).map_err(|source| ResolveError::Io {
        path: path.display().to_string(),
        source: Arc::new(source),
    })?;
    let mut resolved = resolve_parameter(param, &content)?;
    resolved.file = path.display().to_string();
    Ok(resolved)
}

fn resolve_path(file: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(file);
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}
