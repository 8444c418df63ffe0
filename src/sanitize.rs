use scraper::{Html, Node};

use crate::constants::MAX_INPUT_CHARS;

/// Elements whose contents are never message text: executable or styling
/// blocks, and raw-text containers whose bodies would come back out as markup.
const DROPPED_ELEMENTS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "template",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "textarea",
];

/// Upper bound on strip passes; each pass only ever shortens the text.
const MAX_STRIP_PASSES: usize = 16;

/// Strip all markup from `input`, keep the visible text, trim the result.
///
/// The input is parsed as an HTML body fragment: tags disappear, entities are
/// decoded, and the contents of script, style and raw-text elements are
/// dropped entirely. Decoding can surface new markup (`&lt;b&gt;`), so the
/// strip repeats until the text stops changing. Plain text passes through
/// unchanged apart from trimming.
pub(crate) fn sanitize(input: &str) -> String {
    let mut current = strip_markup(input);
    for _ in 1..MAX_STRIP_PASSES {
        let next = strip_markup(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn strip_markup(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());

    for node in fragment.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if DROPPED_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            out.push_str(text);
        }
    }

    out.trim().to_string()
}

/// Clamp raw input to the draft length limit, on a character boundary.
pub(crate) fn clamp_input(raw: &str) -> &str {
    match raw.char_indices().nth(MAX_INPUT_CHARS) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    }
}

pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}
