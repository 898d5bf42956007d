//! CSS resolver: selector + property (+ token index or function) → literal location

use regex::Regex;

use super::location::{locate, split_numeric, ResolvedLocation};
use crate::error::ResolveError;

/// What to look for inside a stylesheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssTarget<'a> {
    pub selector: &'a str,
    pub property: &'a str,
    /// Token index for multi-value properties (`margin: 10px 20px`), or
    /// argument index when `function` is set.
    pub index: Option<usize>,
    /// Function whose argument holds the value, e.g. `rotateY`.
    pub function: Option<&'a str>,
}

/// Resolve a CSS target inside `content`. `file` is used for the `.svelte`
/// check and in error messages.
pub fn resolve_css(
    content: &str,
    file: &str,
    target: CssTarget<'_>,
) -> Result<ResolvedLocation, ResolveError> {
    let (region_start, region_end) = style_region(content, file)?;
    let region = &content[region_start..region_end];

    let (open, close) = find_block(region, target.selector).ok_or_else(|| {
        ResolveError::SelectorNotFound {
            selector: target.selector.to_string(),
            file: file.to_string(),
        }
    })?;
    let body_start = open + 1;
    let body = &region[body_start..close];

    let (value_start, value) = find_declaration(body, target.property).ok_or_else(|| {
        ResolveError::PropertyNotFound {
            selector: target.selector.to_string(),
            property: target.property.to_string(),
            file: file.to_string(),
        }
    })?;

    let index = target.index.unwrap_or(0);
    let (token_start, token) = match target.function {
        Some(function) => {
            let (args_start, args) = find_function_args(value, function).ok_or_else(|| {
                ResolveError::FunctionNotFound {
                    function: function.to_string(),
                    property: target.property.to_string(),
                    file: file.to_string(),
                }
            })?;
            let (offset, token) = tokens(args, |c| c.is_whitespace() || c == ',')
                .into_iter()
                .nth(index)
                .ok_or_else(|| ResolveError::IndexOutOfRange {
                    property: format!("{}({})", function, target.property),
                    index,
                    file: file.to_string(),
                })?;
            (args_start + offset, token)
        }
        None => tokens(value, char::is_whitespace)
            .into_iter()
            .nth(index)
            .ok_or_else(|| ResolveError::IndexOutOfRange {
                property: target.property.to_string(),
                index,
                file: file.to_string(),
            })?,
    };

    let literal = split_numeric(token).ok_or_else(|| ResolveError::NotNumeric {
        value: token.to_string(),
        file: file.to_string(),
    })?;

    let absolute = region_start + body_start + value_start + token_start;
    Ok(locate(content, absolute, &literal))
}

/// Byte range of the stylesheet text: the `<style>` body for Svelte
/// components, the whole file otherwise.
fn style_region(content: &str, file: &str) -> Result<(usize, usize), ResolveError> {
    if !file.ends_with(".svelte") {
        return Ok((0, content.len()));
    }

    let missing = || ResolveError::NoStyleBlock(file.to_string());
    let tag = content.find("<style").ok_or_else(missing)?;
    let start = tag + content[tag..].find('>').ok_or_else(missing)? + 1;
    let end = content[start..]
        .find("</style>")
        .map_or(content.len(), |i| start + i);
    Ok((start, end))
}

/// Locate the first rule for `selector`; returns the byte offsets of its
/// opening brace and the matching closing brace.
fn find_block(css: &str, selector: &str) -> Option<(usize, usize)> {
    let pattern = format!(
        r"(?:^|[{{}};,/])\s*{}\s*(?:,[^{{}};]*)?\{{",
        regex::escape(selector)
    );
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(css)?;
    let open = m.end() - 1;
    Some((open, matching_brace(css, open)))
}

/// Depth-aware scan so nested rules do not end the block early.
fn matching_brace(css: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, b) in css.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    css.len()
}

/// First top-level `property: value` in `body`; declarations inside nested
/// rules are skipped. The value runs to the next `;` (or the end of the
/// block). Returns the value's offset within `body`.
fn find_declaration<'a>(body: &'a str, property: &str) -> Option<(usize, &'a str)> {
    let pattern = format!(r"(?:^|[\s;{{}}]){}\s*:\s*", regex::escape(property));
    let re = Regex::new(&pattern).ok()?;
    let m = re.find_iter(body).find(|m| depth_at(body, m.end()) == 0)?;
    let start = m.end();
    let rest = &body[start..];
    let end = rest.find([';', '}']).unwrap_or(rest.len());
    Some((start, rest[..end].trim_end()))
}

/// Brace nesting depth just before byte `at`.
fn depth_at(body: &str, at: usize) -> usize {
    body[..at].bytes().fold(0usize, |depth, b| match b {
        b'{' => depth + 1,
        b'}' => depth.saturating_sub(1),
        _ => depth,
    })
}

/// Argument list of `function(...)` inside a declaration value.
fn find_function_args<'a>(value: &'a str, function: &str) -> Option<(usize, &'a str)> {
    let pattern = format!(r"(?:^|[^\w-]){}\(", regex::escape(function));
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(value)?;
    let start = m.end();
    let end = value[start..].find(')').map_or(value.len(), |i| start + i);
    Some((start, &value[start..end]))
}

/// Non-empty tokens of `text` with their byte offsets.
fn tokens(text: &str, is_sep: impl Fn(char) -> bool) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (is_sep(c), start) {
            (true, Some(s)) => {
                out.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target<'a>(selector: &'a str, property: &'a str) -> CssTarget<'a> {
        CssTarget {
            selector,
            property,
            index: None,
            function: None,
        }
    }

    fn slice_at<'a>(content: &'a str, loc: &ResolvedLocation) -> &'a str {
        let offset = super::super::location::byte_offset(content, loc.line, loc.column).unwrap();
        &content[offset..offset + loc.expected_text.len()]
    }

    #[test]
    fn test_simple_property() {
        let css = "h1 { font-size: 2.5rem; }";
        let loc = resolve_css(css, "style.css", target("h1", "font-size")).unwrap();
        assert_eq!(loc.current, 2.5);
        assert_eq!(loc.unit, "rem");
        assert_eq!(loc.expected_text, "2.5rem");
        assert_eq!((loc.line, loc.column), (1, 17));
        assert_eq!(slice_at(css, &loc), "2.5rem");
    }

    #[test]
    fn test_multi_line_and_token_index() {
        let css = "body {\n  color: red;\n}\n\n.card {\n  margin: 10px 20px;\n}\n";
        let mut t = target(".card", "margin");
        t.index = Some(1);
        let loc = resolve_css(css, "app.css", t).unwrap();
        assert_eq!(loc.current, 20.0);
        assert_eq!((loc.line, loc.column), (6, 16));
        assert_eq!(slice_at(css, &loc), "20px");
    }

    #[test]
    fn test_nested_rule_does_not_end_block() {
        let css = ".outer {\n  .inner { padding: 1px; }\n  gap: 8px;\n}\n";
        let loc = resolve_css(css, "nested.css", target(".outer", "gap")).unwrap();
        assert_eq!(loc.current, 8.0);
        assert_eq!(loc.line, 3);
    }

    #[test]
    fn test_nested_declaration_is_not_the_block_declaration() {
        let css = ".a { .b { gap: 1px } gap: 8px }";
        let loc = resolve_css(css, "a.css", target(".a", "gap")).unwrap();
        assert_eq!(loc.current, 8.0);
        assert_eq!(slice_at(css, &loc), "8px");

        let inner = resolve_css(css, "a.css", target(".b", "gap")).unwrap();
        assert_eq!(inner.current, 1.0);
    }

    #[test]
    fn test_property_only_in_nested_rule_is_not_found() {
        let css = ".a {\n  .b { gap: 1px; }\n}\n";
        let err = resolve_css(css, "a.css", target(".a", "gap")).unwrap_err();
        assert!(matches!(err, ResolveError::PropertyNotFound { .. }));
    }

    #[test]
    fn test_selector_prefix_is_not_a_match() {
        let css = ".card:hover { opacity: 0.5; }\n.card { opacity: 0.9; }";
        let loc = resolve_css(css, "a.css", target(".card", "opacity")).unwrap();
        assert_eq!(loc.current, 0.9);
        assert_eq!(loc.line, 2);
    }

    #[test]
    fn test_selector_in_group() {
        let css = "h1, h2 { line-height: 1.2; }";
        let loc = resolve_css(css, "a.css", target("h2", "line-height")).unwrap();
        assert_eq!(loc.current, 1.2);
        let loc = resolve_css(css, "a.css", target("h1", "line-height")).unwrap();
        assert_eq!(loc.unit, "");
    }

    #[test]
    fn test_property_name_is_exact() {
        let css = ".box { margin-top: 4px; margin: 12px; }";
        let loc = resolve_css(css, "a.css", target(".box", "margin")).unwrap();
        assert_eq!(loc.current, 12.0);
    }

    #[test]
    fn test_function_argument() {
        let css = ".cube { transform: rotateX(10deg) rotateY(-35.5deg); }";
        let mut t = target(".cube", "transform");
        t.function = Some("rotateY");
        let loc = resolve_css(css, "a.css", t).unwrap();
        assert_eq!(loc.current, -35.5);
        assert_eq!(loc.unit, "deg");
        assert_eq!(slice_at(css, &loc), "-35.5deg");
    }

    #[test]
    fn test_svelte_offsets_are_file_relative() {
        let file = "<script>\n  let h1 = 3;\n</script>\n\n<style>\n  h1 { font-size: 3rem; }\n</style>\n";
        let loc = resolve_css(file, "Hero.svelte", target("h1", "font-size")).unwrap();
        assert_eq!(loc.line, 6);
        assert_eq!(slice_at(file, &loc), "3rem");

        let err = resolve_css("<div/>", "Empty.svelte", target("h1", "x")).unwrap_err();
        assert!(matches!(err, ResolveError::NoStyleBlock(_)));
    }

    #[test]
    fn test_errors_name_target_and_file() {
        let css = "h1 { color: red; }";
        let err = resolve_css(css, "site.css", target("h2", "color")).unwrap_err();
        assert_eq!(err.to_string(), "selector 'h2' not found in site.css");

        let err = resolve_css(css, "site.css", target("h1", "font-size")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "property 'font-size' not found in 'h1' block of site.css"
        );

        let err = resolve_css(css, "site.css", target("h1", "color")).unwrap_err();
        assert!(matches!(err, ResolveError::NotNumeric { value, .. } if value == "red"));
    }
}
