//! HTML-to-text conversion for fetched pages.
//!
//! The page is parsed with `scraper`, so entities, comments and stray `<` or
//! `>` characters are handled by the HTML parser. Text is gathered per block
//! element and blocks are separated by a blank line.

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never visible text.
const SKIPPED_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "template", "svg", "iframe"];

/// Elements that start and end a block of text.
const BLOCK_ELEMENTS: [&str; 30] = [
    "title", "body", "p", "div", "br", "hr", "li", "ul", "ol", "dl", "dt", "dd", "h1", "h2",
    "h3", "h4", "h5", "h6", "tr", "td", "th", "table", "section", "article", "header", "footer",
    "main", "nav", "blockquote", "pre",
];

/// Visible text of an HTML document, one paragraph per block element.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut collector = BlockCollector::default();
    collector.walk(document.root_element());
    collector.finish()
}

#[derive(Default)]
struct BlockCollector {
    body_text: String,
    pending: String,
}

impl BlockCollector {
    fn walk(&mut self, element: ElementRef<'_>) {
        let tag = element.value().name();
        if SKIPPED_ELEMENTS.contains(&tag) {
            return;
        }

        let is_block = BLOCK_ELEMENTS.contains(&tag);
        if is_block {
            self.flush();
        }

        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.pending.push_str(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.walk(child);
                    }
                }
                _ => {}
            }
        }

        if is_block {
            self.flush();
        }
    }

    /// Close the text gathered since the last block edge.
    fn flush(&mut self) {
        let text = collapse_whitespace(&self.pending);
        self.pending.clear();
        if text.is_empty() {
            return;
        }
        if !self.body_text.is_empty() {
            self.body_text.push_str("\n\n");
        }
        self.body_text.push_str(&text);
    }

    fn finish(mut self) -> String {
        self.flush();
        self.body_text
    }
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
