//! Static substitution table and platform selectors
//!
//! Platform CSS classes and asset URLs referenced by the translation passes.
//! These are scraped-page contract constants: they change only when the
//! platform ships a new front end, and they are never mutated at runtime.

use crate::dom::Selector;

/// Class carried by blockquote elements in post bodies
///
/// Documents the scraped-page contract only: the quote pass matches by tag
/// name so that bare blockquotes fold too. Useful for fixtures and for
/// callers inspecting raw post HTML.
pub const QUOTE_CLASS: &str = "blockquote-jv";

/// Class carried by list containers in post bodies
///
/// Like [`QUOTE_CLASS`], a contract constant rather than a match
/// precondition; lists are matched by tag name.
pub const LIST_CLASS: &str = "liste-default-jv";

/// Class of the spoiler widget container
pub const SPOILER_BLOCK_CLASS: &str = "bloc-spoil-jv";

/// Class of the collapsible content region inside a spoiler widget
pub const SPOILER_CONTENT_CLASS: &str = "contenu-spoil";

/// Class of the checkbox that toggles a spoiler widget open
pub const SPOILER_TOGGLE_CLASS: &str = "open-spoil";

/// Class of the clickable "Spoiler" label bar
pub const SPOILER_LABEL_CLASS: &str = "barre-head";

/// Class carried by inline/block code elements
pub const CODE_CLASS: &str = "code-jv";

/// Marker class of obfuscated link elements; the sibling class token is the
/// encoded URL payload
pub const OBFUSCATED_LINK_CLASS: &str = "JvCare";

/// Class carried by sticker images; their `alt` is a `[[sticker:id]]` token
pub const STICKER_CLASS: &str = "img-stickers";

/// URL prefix of smiley image assets; their `alt` is the smiley shortcode
pub const SMILEY_SRC_PREFIX: &str = "https://image.jeuxvideo.com/smileys_v4/";

/// One entry of the generic substitution table
///
/// If `remove` is set the whole matching subtree is deleted (interactive
/// form controls that have no markup counterpart). Otherwise the element is
/// replaced by `open` + its children + `close`, which strips its attributes.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    /// Elements this rule applies to
    pub selector: Selector,
    /// Text spliced before the element's content
    pub open: &'static str,
    /// Text spliced after the element's content
    pub close: &'static str,
    /// Delete the element and its subtree instead of substituting
    pub remove: bool,
}

impl TagRule {
    const fn substitute(selector: Selector, open: &'static str, close: &'static str) -> Self {
        Self {
            selector,
            open,
            close,
            remove: false,
        }
    }

    const fn remove(selector: Selector) -> Self {
        Self {
            selector,
            open: "",
            close: "",
            remove: true,
        }
    }
}

/// The ordered substitution table
///
/// Order matters twice over: removals fire before the spoiler content is
/// unwrapped so the widget's form controls never leak into the output, and
/// the attribute-less `div` catch-all is last so it only unwraps structural
/// wrappers left over after every more specific rule has fired.
pub static TAG_RULES: &[TagRule] = &[
    // Spoiler widget form controls carry no content.
    TagRule::remove(Selector::tag_class("input", SPOILER_TOGGLE_CLASS)),
    TagRule::remove(Selector::tag_class("label", SPOILER_LABEL_CLASS)),
    TagRule::remove(Selector::tag("button")),
    // Code before emphasis: a code block may contain literal quote marks
    // that must not be re-read as emphasis delimiters later.
    TagRule::substitute(Selector::class(CODE_CLASS), "<code>", "</code>"),
    TagRule::substitute(Selector::tag("pre"), "", ""),
    TagRule::substitute(Selector::tag("strong"), "'''", "'''"),
    TagRule::substitute(Selector::tag("b"), "'''", "'''"),
    TagRule::substitute(Selector::tag("em"), "''", "''"),
    TagRule::substitute(Selector::tag("i"), "''", "''"),
    // Underline and strikethrough pass through as literal tags.
    TagRule::substitute(Selector::tag("u"), "<u>", "</u>"),
    TagRule::substitute(Selector::tag("s"), "<s>", "</s>"),
    TagRule::substitute(Selector::tag("strike"), "<s>", "</s>"),
    TagRule::substitute(Selector::class(SPOILER_CONTENT_CLASS), "<spoil>", "</spoil>"),
    TagRule::substitute(Selector::class(SPOILER_BLOCK_CLASS), "", ""),
    // Catch-all: must stay last. Spans are NOT in the table: obfuscated
    // links are spans and the link pass has not run yet when this table is
    // applied; unmatched spans fall away at serialization instead.
    TagRule::substitute(Selector::tag("div"), "", ""),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_catch_all_is_last() {
        let last = TAG_RULES.last().expect("table is non-empty");
        assert_eq!(last.selector.tag, Some("div"));
        assert_eq!(last.selector.class, None);
        assert!(!last.remove);
        assert!(last.open.is_empty() && last.close.is_empty());
    }

    #[test]
    fn test_removals_are_form_controls_only() {
        for rule in TAG_RULES.iter().filter(|rule| rule.remove) {
            assert!(
                matches!(rule.selector.tag, Some("input" | "label" | "button")),
                "unexpected removal rule: {:?}",
                rule
            );
        }
    }

    #[test]
    fn test_spoiler_content_unwraps_before_its_container() {
        let content = TAG_RULES
            .iter()
            .position(|rule| rule.selector.class == Some(SPOILER_CONTENT_CLASS))
            .expect("spoiler content rule present");
        let container = TAG_RULES
            .iter()
            .position(|rule| rule.selector.class == Some(SPOILER_BLOCK_CLASS))
            .expect("spoiler container rule present");
        assert!(content < container);
    }
}
