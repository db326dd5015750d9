//! Readable-text extraction from a loaded [`Page`].
//!
//! The heuristic, in priority order:
//!
//! 1. the first `<article>` element's rendered text;
//! 2. else the first `<main>` element's rendered text;
//! 3. else every `p`/`h1`..`h6` element longer than the paragraph threshold,
//!    joined by a blank line.
//!
//! "Rendered text" approximates a browser's `innerText`: whitespace runs
//! collapse to one space, script-like and `hidden` subtrees are skipped, block
//! elements start new lines and paragraphs/headings are separated by a blank
//! line. Text inside `pre` and `textarea` keeps its whitespace verbatim.

use glean_common::{GleanError, Result};
use scraper::{ElementRef, Html, Node, Selector};

use crate::page::Page;

/// Paragraphs must be strictly longer than this many characters to count.
pub const MIN_PARAGRAPH_CHARS: usize = 50;

const SKIPPED: &[&str] = &["script", "style", "noscript", "template", "head", "iframe"];
const PREFORMATTED: &[&str] = &["pre", "textarea"];
const PARAGRAPH_LIKE: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6"];
const BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "header", "hr", "html", "li", "main",
    "nav", "ol", "pre", "section", "summary", "table", "tbody", "thead", "tfoot", "tr", "ul",
];

#[derive(Debug, Clone)]
pub struct ContentExtractor {
    min_paragraph_chars: usize,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self {
            min_paragraph_chars: MIN_PARAGRAPH_CHARS,
        }
    }
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best-guess body text of the page.
    ///
    /// An article or main container wins even when its text is empty; only the
    /// paragraph fallback can fail with [`GleanError::NoContentFound`].
    pub fn extract(&self, page: &Page) -> Result<String> {
        let doc = Html::parse_document(&page.html);

        if let Some(article) = doc.select(&selector("article")?).next() {
            tracing::debug!(strategy = "article", "extract.container");
            return Ok(rendered_text(article));
        }

        if let Some(main) = doc.select(&selector("main")?).next() {
            tracing::debug!(strategy = "main", "extract.container");
            return Ok(rendered_text(main));
        }

        let blocks = selector("p, h1, h2, h3, h4, h5, h6")?;
        let paragraphs: Vec<String> = doc
            .select(&blocks)
            .map(rendered_text)
            .filter(|text| text.chars().count() > self.min_paragraph_chars)
            .collect();

        tracing::debug!(
            strategy = "paragraphs",
            kept = paragraphs.len(),
            "extract.container"
        );

        let text = paragraphs.join("\n\n");
        if text.is_empty() {
            return Err(GleanError::NoContentFound);
        }
        Ok(text)
    }

    /// The user's selection, trimmed; empty when nothing is selected.
    pub fn extract_selection(&self, page: &Page) -> String {
        page.selection
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| GleanError::Page(format!("bad selector {css:?}: {e}")))
}

/// Text of `el` as a browser would lay it out, trimmed.
pub fn rendered_text(el: ElementRef<'_>) -> String {
    let mut sink = TextSink::default();
    walk(el, &mut sink);
    sink.buf
}

fn walk(el: ElementRef<'_>, sink: &mut TextSink) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => sink.text(text),
            Node::Element(element) => {
                let name = element.name();
                if SKIPPED.contains(&name) || element.attr("hidden").is_some() {
                    continue;
                }
                if name == "br" {
                    sink.line_break();
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let gap = if PARAGRAPH_LIKE.contains(&name) {
                    2
                } else if BLOCK.contains(&name) {
                    1
                } else {
                    0
                };
                if name == "td" || name == "th" {
                    sink.space();
                }
                let verbatim = PREFORMATTED.contains(&name);
                sink.block(gap);
                sink.preformatted += usize::from(verbatim);
                walk(child_el, sink);
                sink.preformatted -= usize::from(verbatim);
                sink.block(gap);
            }
            _ => {}
        }
    }
}

/// Accumulates words, deferring separators until the next word so that
/// leading and trailing whitespace never reaches the output. Inside
/// preformatted elements text is appended as is.
#[derive(Default)]
struct TextSink {
    buf: String,
    newlines: usize,
    space: bool,
    /// Depth of enclosing `pre`/`textarea` elements.
    preformatted: usize,
}

impl TextSink {
    fn block(&mut self, gap: usize) {
        self.newlines = self.newlines.max(gap);
    }

    fn line_break(&mut self) {
        // at most one blank line in a row
        self.newlines = (self.newlines + 1).min(2);
    }

    fn space(&mut self) {
        self.space = true;
    }

    fn text(&mut self, raw: &str) {
        if self.preformatted > 0 {
            self.verbatim(raw);
            return;
        }
        if raw.starts_with(char::is_whitespace) {
            self.space = true;
        }
        for (i, word) in raw.split_whitespace().enumerate() {
            if i > 0 {
                self.space = true;
            }
            self.word(word);
        }
        if raw.ends_with(char::is_whitespace) {
            self.space = true;
        }
    }

    fn verbatim(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        self.separate();
        self.buf.push_str(raw);
    }

    fn word(&mut self, word: &str) {
        self.separate();
        self.buf.push_str(word);
    }

    /// Emit the pending separator, if any, before new content.
    fn separate(&mut self) {
        if !self.buf.is_empty() {
            if self.newlines > 0 {
                self.buf.extend(std::iter::repeat_n('\n', self.newlines));
            } else if self.space {
                self.buf.push(' ');
            }
        }
        self.newlines = 0;
        self.space = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str) -> Page {
        Page::from_html(None, html)
    }

    const LONG_A: &str = "This paragraph is comfortably longer than fifty characters in total.";
    const LONG_B: &str = "Another paragraph that also clears the fifty character threshold easily.";

    #[test]
    fn article_wins_over_main_and_paragraphs() {
        let html = format!(
            "<body><main><p>{LONG_A}</p></main><article><h1>Title</h1><p>Short body.</p></article><p>{LONG_B}</p></body>"
        );
        let text = ContentExtractor::new().extract(&page(&html)).unwrap();
        assert_eq!(text, "Title\n\nShort body.");
    }

    #[test]
    fn main_is_used_without_article() {
        let html = "<body><nav>Menu</nav><main><div>One</div><div>Two</div></main></body>";
        let text = ContentExtractor::new().extract(&page(html)).unwrap();
        assert_eq!(text, "One\nTwo");
    }

    #[test]
    fn empty_article_is_still_returned() {
        let html = format!("<body><article>   </article><p>{LONG_A}</p></body>");
        let text = ContentExtractor::new().extract(&page(&html)).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn paragraph_fallback_filters_short_entries() {
        let html = format!(
            "<body><h2>Too short heading</h2><p>{LONG_A}</p><div><p>tiny</p></div><p>{LONG_B}</p></body>"
        );
        let text = ContentExtractor::new().extract(&page(&html)).unwrap();
        assert_eq!(text, format!("{LONG_A}\n\n{LONG_B}"));
    }

    #[test]
    fn exactly_fifty_characters_is_not_enough() {
        let fifty = "x".repeat(50);
        let html = format!("<body><p>{fifty}</p></body>");
        let err = ContentExtractor::new().extract(&page(&html)).unwrap_err();
        assert!(matches!(err, GleanError::NoContentFound));
    }

    #[test]
    fn no_containers_and_no_long_paragraphs_fails() {
        let html = "<body><div>Lots of text but not inside any paragraph element at all, really.</div><p>short</p></body>";
        let err = ContentExtractor::new().extract(&page(html)).unwrap_err();
        assert!(matches!(err, GleanError::NoContentFound));
    }

    #[test]
    fn scripts_and_styles_are_not_rendered() {
        let html = "<article>Visible<script>var hidden = 1;</script><style>p{}</style> text</article>";
        let text = ContentExtractor::new().extract(&page(html)).unwrap();
        assert_eq!(text, "Visible text");
    }

    #[test]
    fn whitespace_collapses_and_breaks_are_kept() {
        let html = "<article>  Line   one<br>Line\n\n two  <em>emphasis</em>!</article>";
        let text = ContentExtractor::new().extract(&page(html)).unwrap();
        assert_eq!(text, "Line one\nLine two emphasis!");
    }

    #[test]
    fn hidden_elements_are_not_rendered() {
        let html = "<article><p hidden>SECRET hidden</p><p>Shown</p><span hidden=\"\">gone</span></article>";
        let text = ContentExtractor::new().extract(&page(html)).unwrap();
        assert_eq!(text, "Shown");
    }

    #[test]
    fn preformatted_text_keeps_its_whitespace() {
        let html = "<article><p hidden>SECRET hidden</p><pre>a   b\n  c</pre></article>";
        let text = ContentExtractor::new().extract(&page(html)).unwrap();
        assert_eq!(text, "a   b\n  c");
    }

    #[test]
    fn code_block_sits_between_collapsed_paragraphs() {
        let html = "<article><p>Run   this:</p><pre><code>fn main() {\n    go();\n}</code></pre><p>then  stop.</p></article>";
        let text = ContentExtractor::new().extract(&page(html)).unwrap();
        assert_eq!(text, "Run this:\n\nfn main() {\n    go();\n}\n\nthen stop.");
    }

    #[test]
    fn textarea_content_is_verbatim() {
        let html = "<main>Draft: <textarea>line one\n   line two</textarea></main>";
        let text = ContentExtractor::new().extract(&page(html)).unwrap();
        assert_eq!(text, "Draft: line one\n   line two");
    }

    #[test]
    fn list_items_are_separate_lines() {
        let html = "<main><ul><li>alpha</li><li>beta</li></ul></main>";
        let text = ContentExtractor::new().extract(&page(html)).unwrap();
        assert_eq!(text, "alpha\nbeta");
    }

    #[test]
    fn selection_is_trimmed() {
        let p = page("<p>x</p>").with_selection("  picked words \n");
        assert_eq!(ContentExtractor::new().extract_selection(&p), "picked words");
    }

    #[test]
    fn missing_selection_is_empty() {
        assert_eq!(ContentExtractor::new().extract_selection(&page("")), "");
    }
}
