//! HTML reduction: turn raw pages into something a model (or a human) can
//! actually read.
//!
//! Two modes share the same node-removal pass:
//!
//! * [`clean_document`] keeps markup but drops scripts, styles and comments.
//!   Used when the downstream consumer needs element structure (XPath work).
//! * [`extract_text`] goes further: boilerplate containers are removed, a
//!   content root is chosen, and the result is collapsed to single-spaced
//!   prose. Used for question answering over a page.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Node, Selector};

/// Tags that are never content, in either mode.
const MARKUP_NOISE_TAGS: &[&str] = &["script", "style"];

/// Additional boilerplate stripped in text mode.
const TEXT_NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "noscript",
];

/// Class-attribute fragments that mark a likely content container.
const CONTENT_CLASS_HINTS: &[&str] = &["content", "main", "body"];

/// Title used when a page has none.
pub const UNTITLED: &str = "Untitled Page";

#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub title: String,
    pub text: String,
    pub word_count: usize,
}

/// Reparses `html` and serializes it back without scripts, styles or
/// comments. The parser normalizes broken markup along the way, which is
/// fine: consumers only need a well-formed document.
pub fn clean_document(html: &str) -> String {
    let mut doc = Html::parse_document(html);
    remove_nodes(&mut doc, MARKUP_NOISE_TAGS);
    doc.root_element().html()
}

/// Pulls the readable text out of a page.
///
/// The content root is chosen in priority order: `<main>`, `<article>`, the
/// first element whose class hints at content, then `<body>`. Title and text
/// are whitespace-normalized; a missing or blank `<title>` becomes
/// [`UNTITLED`].
pub fn extract_text(html: &str) -> ExtractedText {
    let mut doc = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    remove_nodes(&mut doc, TEXT_NOISE_TAGS);

    let root = content_root(&doc);
    let text = normalize_whitespace(&root.text().collect::<String>());
    let word_count = text.split_whitespace().count();

    ExtractedText {
        title,
        text,
        word_count,
    }
}

/// Collapses all whitespace runs to single spaces. Idempotent.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Detaches every comment node and every element whose tag is in `tags`.
/// Ids are collected first so the tree is not mutated mid-traversal.
fn remove_nodes(doc: &mut Html, tags: &[&str]) {
    let doomed: Vec<NodeId> = doc
        .tree
        .root()
        .descendants()
        .filter(|node| match node.value() {
            Node::Comment(_) => true,
            Node::Element(el) => tags.contains(&el.name()),
            _ => false,
        })
        .map(|node| node.id())
        .collect();

    for id in doomed {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn content_root(doc: &Html) -> ElementRef<'_> {
    for tag in ["main", "article"] {
        if let Some(el) = Selector::parse(tag)
            .ok()
            .and_then(|sel| doc.select(&sel).next())
        {
            return el;
        }
    }

    // First element (document order) whose class looks content-ish.
    let by_class = doc.root_element().descendants().find_map(|node| {
        let el = ElementRef::wrap(node)?;
        let class = el.value().attr("class")?.to_ascii_lowercase();
        CONTENT_CLASS_HINTS
            .iter()
            .any(|hint| class.contains(hint))
            .then_some(el)
    });
    if let Some(el) = by_class {
        return el;
    }

    Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .unwrap_or_else(|| doc.root_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_document_drops_scripts_styles_and_comments() {
        let html = "<html><head><title>T</title><script>var x = 1;</script>\
                    <style>p { color: red }</style></head>\
                    <body><p>Hi</p><!-- hidden --></body></html>";
        let cleaned = clean_document(html);
        assert!(cleaned.contains("<p>Hi</p>"));
        assert!(cleaned.contains("<title>T</title>"));
        assert!(!cleaned.contains("var x"));
        assert!(!cleaned.contains("color: red"));
        assert!(!cleaned.contains("hidden"));
    }

    #[test]
    fn clean_document_keeps_interactive_elements() {
        let cleaned = clean_document("<button id=\"go\">Go</button>");
        assert!(cleaned.contains("<button id=\"go\">Go</button>"));
    }

    #[test]
    fn clean_document_is_deterministic() {
        let html = "<div><script>a()</script><p>x</p></div>";
        assert_eq!(clean_document(html), clean_document(html));
    }

    #[test]
    fn extract_text_reads_title_and_counts_words() {
        let html = "<html><head><title>Docs</title></head>\
                    <body>Hello world</body></html>";
        let extracted = extract_text(html);
        assert_eq!(extracted.title, "Docs");
        assert_eq!(extracted.text, "Hello world");
        assert_eq!(extracted.word_count, 2);
    }

    #[test]
    fn extract_text_prefers_main_over_body() {
        let html = "<body>outside <main>inside the main area</main></body>";
        let extracted = extract_text(html);
        assert_eq!(extracted.text, "inside the main area");
        assert_eq!(extracted.word_count, 4);
    }

    #[test]
    fn extract_text_falls_back_to_article() {
        let html = "<body>noise <article>story text</article></body>";
        assert_eq!(extract_text(html).text, "story text");
    }

    #[test]
    fn extract_text_finds_content_by_class_hint() {
        let html = "<body><div class=\"sidebar\">menu</div>\
                    <div class=\"Post-Content\">the real thing</div></body>";
        assert_eq!(extract_text(html).text, "the real thing");
    }

    #[test]
    fn extract_text_skips_boilerplate_containers() {
        let html = "<body><nav>Home About</nav><header>Logo</header>\
                    <p>keep me</p><footer>copyright</footer>\
                    <aside>ads</aside><noscript>enable js</noscript></body>";
        let extracted = extract_text(html);
        assert_eq!(extracted.text, "keep me");
        assert_eq!(extracted.word_count, 2);
    }

    #[test]
    fn missing_title_becomes_sentinel() {
        assert_eq!(extract_text("<body>x</body>").title, UNTITLED);
        assert_eq!(
            extract_text("<head><title>   </title></head><body>x</body>").title,
            UNTITLED
        );
    }

    #[test]
    fn empty_document_has_zero_words() {
        let extracted = extract_text("");
        assert_eq!(extracted.title, UNTITLED);
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.word_count, 0);
    }

    #[test]
    fn normalize_whitespace_collapses_runs_and_is_idempotent() {
        let messy = "  a\tb\n\n   c  \r\n d  ";
        let once = normalize_whitespace(messy);
        assert_eq!(once, "a b c d");
        assert_eq!(normalize_whitespace(&once), once);
    }
}
