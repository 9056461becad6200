//! URL extraction from `llms.txt` link lists
//!
//! Handles the link forms found in markdown:
//! - Inline links: `[text](url)`
//! - Reference definitions: `[ref]: url`
//! - Bare URLs: `https://example.com/page`

use super::probe::ProbeParse;
use crate::ProbeError;
use regex::Regex;

/// Trailing characters that end a sentence rather than a bare URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', ')', '!', '?'];

struct LinkPatterns {
    inline: Regex,
    reference: Regex,
    bare: Regex,
}

impl LinkPatterns {
    fn compile() -> Result<Self, ProbeError> {
        Ok(Self {
            inline: Regex::new(r"\[([^\]]*)\]\(([^)\s]+)(?:\s+[^)]*)?\)")?,
            reference: Regex::new(r"(?m)^\s*\[([^\]]+)\]:\s*(\S+)")?,
            bare: Regex::new(r#"https?://[^\s<>\[\]"'`]+"#)?,
        })
    }
}

/// Extracts link targets from an `llms.txt` body, in order of appearance
/// per link form
///
/// Relative targets are returned as written; resolution happens against the
/// discovery base.
pub(crate) fn parse_llms_txt(content: &str) -> Result<ProbeParse, ProbeError> {
    if looks_like_html(content) {
        return Err(ProbeError::UnexpectedFormat("expected markdown, got HTML"));
    }

    let patterns = LinkPatterns::compile()?;
    let mut parsed = ProbeParse::default();

    for cap in patterns.inline.captures_iter(content) {
        if let Some(target) = cap.get(2) {
            push_target(&mut parsed, target.as_str());
        }
    }

    for cap in patterns.reference.captures_iter(content) {
        if let Some(target) = cap.get(2) {
            push_target(&mut parsed, target.as_str());
        }
    }

    for found in patterns.bare.find_iter(content) {
        let url = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        push_target(&mut parsed, url);
    }

    Ok(parsed)
}

fn push_target(parsed: &mut ProbeParse, target: &str) {
    let target = target.trim().trim_start_matches('<').trim_end_matches('>');
    if target.is_empty() || target.starts_with('#') {
        return;
    }
    parsed.push_page(target);
}

fn looks_like_html(content: &str) -> bool {
    let head: String = content
        .trim_start()
        .chars()
        .take(15)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_links() {
        let content = "# Project\n\n> Summary\n\n## Docs\n\n\
                       - [Getting Started](/docs/getting-started): first steps\n\
                       - [API](https://example.com/api \"API reference\")\n";
        let parsed = parse_llms_txt(content).unwrap();
        assert_eq!(
            parsed.pages,
            vec!["/docs/getting-started", "https://example.com/api"]
        );
    }

    #[test]
    fn test_reference_and_bare_links() {
        let content = "See [the guide][guide].\n\n[guide]: /docs/guide\n\n\
                       Full list at https://example.com/docs/all.";
        let parsed = parse_llms_txt(content).unwrap();
        assert_eq!(
            parsed.pages,
            vec!["/docs/guide", "https://example.com/docs/all"]
        );
    }

    #[test]
    fn test_dedupes_inline_and_bare_forms() {
        let content = "- [Intro](https://example.com/intro)\n";
        let parsed = parse_llms_txt(content).unwrap();
        assert_eq!(parsed.pages, vec!["https://example.com/intro"]);
    }

    #[test]
    fn test_skips_fragment_only() {
        let parsed = parse_llms_txt("[Top](#top)").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_no_links() {
        let parsed = parse_llms_txt("# Title\n\nNothing to see.").unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_html_soft_404_is_rejected() {
        let html = "<!DOCTYPE html><html><body><a href=\"/\">Home</a></body></html>";
        assert!(parse_llms_txt(html).is_err());
    }
}
