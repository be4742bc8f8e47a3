//! Markup translator - transforms platform HTML into JVCode markup
//!
//! This module implements the whole translation engine as a sequence of
//! ordered passes over a freshly parsed fragment tree. The order is load
//! bearing and must not be rearranged:
//!
//! 1. Blockquote folding (innermost first) so later passes see exactly one
//!    quoting convention, the `<q>` wrapper.
//! 2. List flattening, which replaces list items with `*`/`#` marker
//!    prefixes that encode nesting depth and list type per level.
//! 3. Generic tag substitution from the static [`TAG_RULES`] table.
//! 4. Link de-obfuscation and anchor flattening (the markup has no
//!    hyperlink syntax, links become bare URLs).
//! 5. Smiley and sticker flattening to their `alt` shortcodes.
//! 6. Serialization and whitespace normalization.
//! 7. Optional rewrite of `<q>` blocks to `> `-prefixed lines.
//!
//! The translator is pure and synchronous: no I/O, no shared mutable state,
//! all per-call state lives on the stack or in the call-owned tree. It never
//! fails on malformed input; the HTML5 recovery algorithm plus empty-string
//! attribute fallbacks degrade everything to best-effort plain text, and
//! pathologically deep nesting is truncated at [`MAX_NESTING_DEPTH`] before
//! the recursive passes run.
//!
//! # Examples
//!
//! ```rust
//! use jvcode::translate;
//!
//! assert_eq!(translate("<p>Hello <strong>world</strong></p>"), "Hello '''world'''");
//! ```

use crate::deobfuscate::decode;
use crate::dom::{self, Selector};
use crate::parser::parse_fragment;
use crate::rules::{
    OBFUSCATED_LINK_CLASS, SMILEY_SRC_PREFIX, STICKER_CLASS, TAG_RULES,
};
use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;
use std::sync::OnceLock;

/// Translation options
#[derive(Debug, Clone, Copy)]
pub struct TranslateOptions {
    /// Rewrite `<q>` blocks to `> `-prefixed lines (the human-facing
    /// convention). When false the literal `<q>...</q>` delimiters are kept
    /// so downstream code can detect quote boundaries programmatically.
    pub fold_quotes_as_angle_brackets: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            fold_quotes_as_angle_brackets: true,
        }
    }
}

/// HTML to JVCode markup translator
///
/// Stateless apart from its options; a single instance may be shared freely
/// across threads and each [`translate`](MarkupTranslator::translate) call
/// is independent.
///
/// # Usage
///
/// ```rust
/// use jvcode::{MarkupTranslator, TranslateOptions};
///
/// let translator = MarkupTranslator::new();
/// assert_eq!(translator.translate("<ul><li>a</li><li>b</li></ul>"), "* a \n* b");
///
/// // Raw quote mode for programmatic quote detection
/// let raw = MarkupTranslator::with_options(TranslateOptions {
///     fold_quotes_as_angle_brackets: false,
/// });
/// assert_eq!(raw.translate("<blockquote>x</blockquote>"), "<q>x</q>");
/// ```
pub struct MarkupTranslator {
    options: TranslateOptions,
}

impl Default for MarkupTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupTranslator {
    /// Create a translator with default options (angle-bracket quotes)
    pub fn new() -> Self {
        Self {
            options: TranslateOptions::default(),
        }
    }

    /// Create a translator with custom options
    pub fn with_options(options: TranslateOptions) -> Self {
        Self { options }
    }

    /// Translate a platform HTML fragment into JVCode markup
    ///
    /// Pure function: the fragment is parsed into a tree owned by this call,
    /// rewritten in place by the passes, serialized and discarded. Malformed
    /// input degrades to best-effort plain text; missing attributes fall
    /// back to empty strings. The empty fragment translates to the empty
    /// string.
    pub fn translate(&self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }

        let dom = parse_fragment(html);
        let root = &dom.document;

        prune_depth(root);
        fold_blockquotes(root);
        flatten_lists(root);
        apply_tag_rules(root);
        flatten_links(root);
        flatten_smileys(root);

        let mut output = String::with_capacity(html.len());
        serialize(root, &mut output);
        let output = normalize_whitespace(&output);

        if self.options.fold_quotes_as_angle_brackets {
            rewrite_quotes(&output)
        } else {
            output
        }
    }
}

/// Translate with default options
///
/// Convenience wrapper over [`MarkupTranslator::new`].
pub fn translate(html: &str) -> String {
    MarkupTranslator::new().translate(html)
}

// ---------------------------------------------------------------------------
// Depth capping
// ---------------------------------------------------------------------------

/// Maximum element nesting depth retained after parsing
///
/// The HTML5 tree builder is iterative and accepts arbitrarily deep
/// fragments, but every rewriting pass and the serializer recurse once per
/// nesting level. Anything below this depth is cut off before the passes
/// run, so a hostile fragment degrades instead of exhausting the stack.
const MAX_NESTING_DEPTH: usize = 1000;

/// Truncate the tree at [`MAX_NESTING_DEPTH`]
///
/// Walks with an explicit stack rather than recursion, for the same reason
/// the cap exists. Nodes sitting exactly at the cap keep their own data but
/// lose their children.
fn prune_depth(root: &Handle) {
    let mut pending: Vec<(Handle, usize)> = vec![(root.clone(), 0)];
    while let Some((node, depth)) = pending.pop() {
        if depth == MAX_NESTING_DEPTH {
            dom::take_children(&node);
            continue;
        }
        for child in node.children.borrow().iter() {
            pending.push((child.clone(), depth + 1));
        }
    }
}

// ---------------------------------------------------------------------------
// Pass 1: blockquote folding
// ---------------------------------------------------------------------------

/// Fold every `blockquote` into a `<q>` element, innermost first
///
/// Post-order is required: replacing an outer quote first would splice its
/// children before the inner quotes were visited, and each nested quote must
/// be resolved exactly once.
fn fold_blockquotes(node: &Handle) {
    let children: Vec<Handle> = node.children.borrow().clone();
    for child in &children {
        fold_blockquotes(child);
    }
    if dom::element_name(node) == Some("blockquote") {
        let quote = dom::new_element("q");
        dom::reparent_children(node, &quote);
        dom::replace_with(node, vec![quote]);
    }
}

// ---------------------------------------------------------------------------
// Pass 2: list flattening
// ---------------------------------------------------------------------------

fn is_list(node: &Handle) -> bool {
    matches!(dom::element_name(node), Some("ul" | "ol"))
}

/// Flatten all lists in the tree
///
/// The top scan picks up lists that are not nested inside any other list
/// element; everything below them, including mixed ordered/unordered
/// nesting in either direction, is owned by the recursion so that marker
/// suffixes concatenate outer to inner.
fn flatten_lists(root: &Handle) {
    for tag in ["ul", "ol"] {
        let top_level: Vec<Handle> = dom::select_all(root, &Selector::tag(tag))
            .into_iter()
            .filter(|list| !dom::has_ancestor(list, is_list))
            .collect();
        for list in top_level {
            flatten_list(&list, "");
        }
    }
}

/// Flatten one list, prefixing each item with its accumulated marker suffix
///
/// Each level appends one marker character to the suffix handed down by its
/// parent: `*` for unordered, `#` for ordered. An item whose own surface
/// text is empty (it exists only to hold a nested sub-list) is spliced in
/// without a marker, otherwise a phantom empty bullet line would appear.
fn flatten_list(list: &Handle, parent_suffix: &str) {
    let marker = if dom::element_name(list) == Some("ol") {
        '#'
    } else {
        '*'
    };
    let mut suffix = String::with_capacity(parent_suffix.len() + 1);
    suffix.push_str(parent_suffix);
    suffix.push(marker);

    let items: Vec<Handle> = list
        .children
        .borrow()
        .iter()
        .filter(|child| dom::element_name(child) == Some("li"))
        .cloned()
        .collect();

    for item in items {
        // Surface text is measured before the sub-lists are flattened,
        // otherwise their marker text would count as item content.
        let nested = direct_nested_lists(&item);
        let own_text = dom::text_excluding(&item, &nested);
        for sublist in &nested {
            flatten_list(sublist, &suffix);
        }

        if own_text.trim().is_empty() {
            dom::replace_with(&item, dom::take_children(&item));
        } else {
            let mut replacement = vec![dom::new_text(&format!("\n{} ", suffix))];
            replacement.extend(dom::take_children(&item));
            replacement.push(dom::new_text(" "));
            dom::replace_with(&item, replacement);
        }
    }

    dom::remove_attr(list, "class");
    if !parent_suffix.is_empty() {
        // Nested container: depth is already encoded in the markers, only
        // the flattened item sequence survives.
        dom::replace_with(list, dom::take_children(list));
    }
}

/// Lists nested directly under an item, without descending into them
///
/// Deeper lists belong to the found list's own recursion step.
fn direct_nested_lists(item: &Handle) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_direct_nested(item, &mut found);
    found
}

fn collect_direct_nested(node: &Handle, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_list(child) {
            found.push(child.clone());
            continue;
        }
        collect_direct_nested(child, found);
    }
}

// ---------------------------------------------------------------------------
// Pass 3: generic tag substitution
// ---------------------------------------------------------------------------

/// Apply the static substitution table, one rule at a time, in table order
fn apply_tag_rules(root: &Handle) {
    for rule in TAG_RULES {
        for node in dom::select_all(root, &rule.selector) {
            if rule.remove {
                dom::detach(&node);
                continue;
            }
            let mut replacement = Vec::new();
            if !rule.open.is_empty() {
                replacement.push(dom::new_text(rule.open));
            }
            replacement.extend(dom::take_children(&node));
            if !rule.close.is_empty() {
                replacement.push(dom::new_text(rule.close));
            }
            dom::replace_with(&node, replacement);
        }
    }
}

// ---------------------------------------------------------------------------
// Pass 4: link de-obfuscation and flattening
// ---------------------------------------------------------------------------

/// Replace obfuscated links with their decoded URL and plain anchors with
/// their `href`
///
/// The markup format has no hyperlink syntax, so links are represented as
/// bare URLs. An obfuscated element whose payload fails to decode degrades
/// to its visible inner text; an anchor without `href` degrades to the
/// empty string.
fn flatten_links(root: &Handle) {
    for node in dom::select_all(root, &Selector::class(OBFUSCATED_LINK_CLASS)) {
        let url = obfuscated_payload(&node).and_then(|payload| decode(&payload).ok());
        match url {
            Some(url) => dom::replace_with(&node, vec![dom::new_text(&url)]),
            None => dom::replace_with(&node, dom::take_children(&node)),
        }
    }

    for node in dom::select_all(root, &Selector::tag("a")) {
        let href = dom::attr_value(&node, "href").unwrap_or_default();
        dom::replace_with(&node, vec![dom::new_text(&href)]);
    }
}

/// The encoded payload is the class token accompanying the marker class
fn obfuscated_payload(node: &Handle) -> Option<String> {
    dom::classes(node)
        .into_iter()
        .find(|token| token != OBFUSCATED_LINK_CLASS && !token.is_empty())
}

// ---------------------------------------------------------------------------
// Pass 5: smiley and sticker flattening
// ---------------------------------------------------------------------------

/// Replace smiley and sticker images with their `alt` shortcode text
///
/// Smileys are recognized by their asset URL prefix, stickers by class. A
/// missing `alt` yields the empty string, not a failure. Other images have
/// no markup counterpart and simply fall away at serialization.
fn flatten_smileys(root: &Handle) {
    for node in dom::select_all(root, &Selector::tag("img")) {
        let src = dom::attr_value(&node, "src").unwrap_or_default();
        let is_smiley = src.starts_with(SMILEY_SRC_PREFIX);
        let is_sticker = dom::has_class(&node, STICKER_CLASS);
        if is_smiley || is_sticker {
            let alt = dom::attr_value(&node, "alt").unwrap_or_default();
            dom::replace_with(&node, vec![dom::new_text(&alt)]);
        }
    }
}

// ---------------------------------------------------------------------------
// Pass 6: serialization and whitespace normalization
// ---------------------------------------------------------------------------

/// Serialize the rewritten tree to text
///
/// By this point only structural elements remain: `br` becomes a newline,
/// list containers become bare newlines (their items already carry per-line
/// markers), paragraphs become double newlines and `<q>` elements become
/// literal delimiters padded with paragraph breaks. Anything else
/// contributes its children only.
fn serialize(node: &Handle, output: &mut String) {
    match &node.data {
        NodeData::Document => serialize_children(node, output),
        NodeData::Text { contents } => output.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => match name.local.as_ref() {
            "br" => output.push('\n'),
            "p" => {
                output.push_str("\n\n");
                serialize_children(node, output);
                output.push_str("\n\n");
            }
            "ul" | "ol" => {
                output.push('\n');
                serialize_children(node, output);
                output.push('\n');
            }
            "q" => {
                output.push_str("\n\n<q>");
                serialize_children(node, output);
                output.push_str("</q>\n\n");
            }
            "script" | "style" => {}
            _ => serialize_children(node, output),
        },
        // Comments, doctypes and processing instructions have no markup.
        _ => {}
    }
}

fn serialize_children(node: &Handle, output: &mut String) {
    for child in node.children.borrow().iter() {
        serialize(child, output);
    }
}

fn newline_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("static pattern compiles"))
}

fn space_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" {2,}").expect("static pattern compiles"))
}

fn quote_open_gap() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<q>\s+").expect("static pattern compiles"))
}

fn quote_close_gap() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+</q>").expect("static pattern compiles"))
}

/// Collapse runs of newlines and spaces and trim the result
///
/// Exactly this order: 3+ newlines collapse to the paragraph break, 2+
/// spaces collapse to one, whitespace hugging the inside of a quote
/// delimiter is dropped, then the whole result is trimmed. Single trailing
/// spaces before a newline (a list-marker artifact) survive on purpose; the
/// platform's own parser sees those exact bytes.
fn normalize_whitespace(text: &str) -> String {
    let text = newline_runs().replace_all(text, "\n\n");
    let text = space_runs().replace_all(&text, " ");
    let text = quote_open_gap().replace_all(&text, "<q>");
    let text = quote_close_gap().replace_all(&text, "</q>");
    text.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 7: quote bracket rewriting
// ---------------------------------------------------------------------------

/// Rewrite `<q>` blocks to `> `-prefixed lines, innermost first
///
/// The innermost balanced pair is always the first close delimiter paired
/// with the nearest open delimiter before it. Rewriting it splices its
/// prefixed lines into the enclosing quote, so each enclosing level adds one
/// more `> ` prefix. Unbalanced delimiters are left untouched.
///
/// Each quoted line is stripped of leading whitespace before the prefix is
/// attached; the prefix runs after space collapsing, so a line-leading space
/// would otherwise reintroduce a two-space run.
fn rewrite_quotes(text: &str) -> String {
    let mut result = text.to_string();
    loop {
        let Some(close) = result.find("</q>") else {
            break;
        };
        let Some(open) = result[..close].rfind("<q>") else {
            break;
        };
        let content = result[open + 3..close].to_string();
        let prefixed = content
            .split('\n')
            .map(|line| format!("> {}", line.trim_start()))
            .collect::<Vec<_>>()
            .join("\n");
        result.replace_range(open..close + 4, &prefixed);
    }
    result
}
