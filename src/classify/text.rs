use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never visible to a reader
const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Visible text of a page, whitespace-collapsed
pub(crate) struct PageText {
    text: String,
    title: Option<String>,
}

impl PageText {
    pub(crate) fn analyze(html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = Selector::parse("title").ok().and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|element| element.text().collect::<String>().trim().to_string())
                .filter(|s| !s.is_empty())
        });

        let body = Selector::parse("body")
            .ok()
            .and_then(|selector| document.select(&selector).next());

        let mut raw = String::new();
        if let Some(body) = body {
            collect_visible_text(body, &mut raw);
        }

        Self {
            text: raw.split_whitespace().collect::<Vec<_>>().join(" "),
            title,
        }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub(crate) fn text_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

fn collect_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if !INVISIBLE_ELEMENTS.contains(&el.name()) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_visible_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}
