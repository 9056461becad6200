use super::{llms, search_index, sitemap};
use crate::ProbeError;

/// Page inventory format a probe understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// Markdown link list (`llms.txt`)
    LlmsTxt,

    /// Sitemap or sitemap index XML
    Sitemap,

    /// MkDocs `search_index.json`
    MkDocs,

    /// Docusaurus local search index
    Docusaurus,

    /// Hugo JSON output format
    Hugo,

    /// Any JSON search index listing page URLs
    SearchJson,

    /// VitePress `hashmap.json`
    VitePress,
}

impl ProbeKind {
    /// Parses a manifest body into raw page references
    ///
    /// References are returned as written in the manifest (possibly
    /// relative); callers resolve them against the discovery base.
    pub fn parse(&self, body: &str) -> Result<ProbeParse, ProbeError> {
        match self {
            Self::LlmsTxt => llms::parse_llms_txt(body),
            Self::Sitemap => sitemap::parse_sitemap(body),
            Self::MkDocs => search_index::parse_mkdocs(body),
            Self::Docusaurus => search_index::parse_docusaurus(body),
            Self::Hugo => search_index::parse_hugo(body),
            Self::SearchJson => search_index::parse_generic(body),
            Self::VitePress => search_index::parse_vitepress(body),
        }
    }
}

/// Raw references extracted from one manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeParse {
    /// Page references, in manifest order, without duplicates
    pub pages: Vec<String>,

    /// Child sitemaps listed by a sitemap index
    pub sitemaps: Vec<String>,
}

impl ProbeParse {
    /// True if the manifest listed nothing at all
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.sitemaps.is_empty()
    }

    pub(crate) fn push_page(&mut self, reference: &str) {
        if !self.pages.iter().any(|existing| existing == reference) {
            self.pages.push(reference.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dispatches_by_kind() {
        let sitemap = "<urlset><url><loc>https://example.com/a</loc></url></urlset>";
        assert_eq!(ProbeKind::Sitemap.parse(sitemap).unwrap().pages.len(), 1);
        assert!(ProbeKind::MkDocs.parse(sitemap).is_err());

        let mkdocs = r#"{"docs": [{"location": "a/"}]}"#;
        assert_eq!(ProbeKind::MkDocs.parse(mkdocs).unwrap().pages, vec!["a/"]);
        assert!(ProbeKind::Sitemap.parse(mkdocs).is_err());
    }

    #[test]
    fn test_push_page_dedupes() {
        let mut parsed = ProbeParse::default();
        parsed.push_page("/a");
        parsed.push_page("/a");
        parsed.push_page("/b");
        assert_eq!(parsed.pages, vec!["/a", "/b"]);
        assert!(!parsed.is_empty());
    }
}
