//! Tree-walking matcher and mutation helpers for `RcDom`
//!
//! The translation passes query the tree with a deliberately narrow selector
//! vocabulary (tag name, single class, tag + class) and rewrite it in place.
//! The tree is exclusively owned by one `translate()` call and never escapes
//! it, so in-place mutation through the `RefCell`/`Cell` interior of
//! `markup5ever_rcdom` nodes is safe: no handle is shared across calls.
//!
//! All helpers tolerate detached nodes and missing attributes; a query that
//! matches nothing is a no-op for the caller.

use html5ever::tendril::StrTendril;
use html5ever::{namespace_url, ns, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData};
use std::cell::RefCell;
use std::rc::Rc;

/// A tag-and-class element matcher
///
/// This is the explicit tree-walking replacement for CSS-selector queries.
/// Both fields are optional; a selector with neither set matches every
/// element.
#[derive(Debug, Clone, Copy)]
pub struct Selector {
    /// Required tag name, if any
    pub tag: Option<&'static str>,
    /// Required class token, if any
    pub class: Option<&'static str>,
}

impl Selector {
    /// Match elements by tag name
    pub const fn tag(tag: &'static str) -> Self {
        Self {
            tag: Some(tag),
            class: None,
        }
    }

    /// Match elements carrying a class token, any tag
    pub const fn class(class: &'static str) -> Self {
        Self {
            tag: None,
            class: Some(class),
        }
    }

    /// Match elements by tag name and class token
    pub const fn tag_class(tag: &'static str, class: &'static str) -> Self {
        Self {
            tag: Some(tag),
            class: Some(class),
        }
    }

    /// Test whether a node is an element matching this selector
    pub fn matches(&self, node: &Handle) -> bool {
        let Some(name) = element_name(node) else {
            return false;
        };
        if let Some(tag) = self.tag {
            if name != tag {
                return false;
            }
        }
        if let Some(class) = self.class {
            if !has_class(node, class) {
                return false;
            }
        }
        true
    }
}

/// Tag name of an element node, `None` for any other node kind
pub fn element_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Value of an attribute, if present
pub fn attr_value(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Whitespace-split class tokens of an element
pub fn classes(node: &Handle) -> Vec<String> {
    attr_value(node, "class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Test whether an element carries a class token
pub fn has_class(node: &Handle, class: &str) -> bool {
    classes(node).iter().any(|token| token == class)
}

/// Drop an attribute from an element, if present
pub fn remove_attr(node: &Handle, attr_name: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs
            .borrow_mut()
            .retain(|attr| attr.name.local.as_ref() != attr_name);
    }
}

/// Collect all matching elements under `root` in document order
///
/// Handles are collected before any mutation, so callers may rewrite the
/// tree while iterating the returned vector.
pub fn select_all(root: &Handle, selector: &Selector) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_matches(root, selector, &mut found);
    found
}

fn collect_matches(node: &Handle, selector: &Selector, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if selector.matches(child) {
            found.push(child.clone());
        }
        collect_matches(child, selector, found);
    }
}

/// Upgraded parent handle of a node, if attached
pub fn parent_of(node: &Handle) -> Option<Handle> {
    // `parent` is a Cell<Option<Weak<..>>>; take and restore to read it.
    let weak = node.parent.take();
    node.parent.set(weak.clone());
    weak.and_then(|weak| weak.upgrade())
}

/// Test whether any ancestor of a node satisfies a predicate
pub fn has_ancestor(node: &Handle, pred: impl Fn(&Handle) -> bool) -> bool {
    let mut current = parent_of(node);
    while let Some(ancestor) = current {
        if pred(&ancestor) {
            return true;
        }
        current = parent_of(&ancestor);
    }
    false
}

/// Create a detached text node
pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

/// Create a detached, attribute-less element in the HTML namespace
pub fn new_element(tag: &str) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Replace a node in its parent with a sequence of nodes
///
/// Parent links of the replacements are fixed up; the replaced node is
/// detached. A node without a parent is left untouched.
pub fn replace_with(node: &Handle, replacements: Vec<Handle>) {
    let Some(parent) = parent_of(node) else {
        return;
    };
    let mut siblings = parent.children.borrow_mut();
    let Some(position) = siblings.iter().position(|sibling| Rc::ptr_eq(sibling, node)) else {
        return;
    };
    for replacement in &replacements {
        replacement.parent.set(Some(Rc::downgrade(&parent)));
    }
    siblings.splice(position..=position, replacements);
    node.parent.set(None);
}

/// Detach a node (and its subtree) from its parent
pub fn detach(node: &Handle) {
    replace_with(node, Vec::new());
}

/// Remove and return all children of a node, detached
pub fn take_children(node: &Handle) -> Vec<Handle> {
    let children: Vec<Handle> = node.children.borrow_mut().drain(..).collect();
    for child in &children {
        child.parent.set(None);
    }
    children
}

/// Move all children of `from` to the end of `to`
pub fn reparent_children(from: &Handle, to: &Handle) {
    let moved = take_children(from);
    for child in &moved {
        child.parent.set(Some(Rc::downgrade(to)));
    }
    to.children.borrow_mut().extend(moved);
}

/// Concatenated text content of a subtree, skipping excluded subtrees
///
/// Used by list flattening to decide whether an item has any surface text of
/// its own once its nested sub-lists are set aside.
pub fn text_excluding(node: &Handle, excluded: &[Handle]) -> String {
    let mut text = String::new();
    collect_text(node, excluded, &mut text);
    text
}

fn collect_text(node: &Handle, excluded: &[Handle], text: &mut String) {
    for child in node.children.borrow().iter() {
        if excluded.iter().any(|skip| Rc::ptr_eq(skip, child)) {
            continue;
        }
        if let NodeData::Text { contents } = &child.data {
            text.push_str(&contents.borrow());
        }
        collect_text(child, excluded, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fragment;

    fn fragment_root(html: &str) -> Handle {
        parse_fragment(html).document.clone()
    }

    #[test]
    fn test_selector_matches_tag() {
        let root = fragment_root("<p>x</p><span>y</span>");
        assert_eq!(select_all(&root, &Selector::tag("p")).len(), 1);
        assert_eq!(select_all(&root, &Selector::tag("span")).len(), 1);
        assert_eq!(select_all(&root, &Selector::tag("ul")).len(), 0);
    }

    #[test]
    fn test_selector_matches_class() {
        let root = fragment_root(r#"<div class="a b">x</div><div class="c">y</div>"#);
        assert_eq!(select_all(&root, &Selector::class("b")).len(), 1);
        assert_eq!(select_all(&root, &Selector::tag_class("div", "c")).len(), 1);
        assert_eq!(select_all(&root, &Selector::tag_class("span", "c")).len(), 0);
    }

    #[test]
    fn test_attr_value_missing_is_none() {
        let root = fragment_root("<a>no href</a>");
        let anchors = select_all(&root, &Selector::tag("a"));
        assert_eq!(attr_value(&anchors[0], "href"), None);
    }

    #[test]
    fn test_replace_with_splices_children() {
        let root = fragment_root("<div><b>x</b></div>");
        let bolds = select_all(&root, &Selector::tag("b"));
        let mut replacement = vec![new_text("[")];
        replacement.extend(take_children(&bolds[0]));
        replacement.push(new_text("]"));
        replace_with(&bolds[0], replacement);

        let divs = select_all(&root, &Selector::tag("div"));
        assert_eq!(text_excluding(&divs[0], &[]), "[x]");
        assert!(select_all(&root, &Selector::tag("b")).is_empty());
    }

    #[test]
    fn test_detach_removes_subtree() {
        let root = fragment_root("<div>keep<span>drop</span></div>");
        let spans = select_all(&root, &Selector::tag("span"));
        detach(&spans[0]);
        let divs = select_all(&root, &Selector::tag("div"));
        assert_eq!(text_excluding(&divs[0], &[]), "keep");
    }

    #[test]
    fn test_has_ancestor_walks_to_root() {
        let root = fragment_root("<ul><li><ul><li>x</li></ul></li></ul>");
        let lists = select_all(&root, &Selector::tag("ul"));
        assert_eq!(lists.len(), 2);
        assert!(!has_ancestor(&lists[0], |n| element_name(n) == Some("ul")));
        assert!(has_ancestor(&lists[1], |n| element_name(n) == Some("ul")));
    }

    #[test]
    fn test_text_excluding_skips_subtree() {
        let root = fragment_root("<li>a<ul><li>b</li></ul></li>");
        let items = select_all(&root, &Selector::tag("li"));
        let nested = select_all(&items[0], &Selector::tag("ul"));
        assert_eq!(text_excluding(&items[0], &nested), "a");
    }

    #[test]
    fn test_remove_attr() {
        let root = fragment_root(r#"<ul class="liste-default-jv"><li>x</li></ul>"#);
        let lists = select_all(&root, &Selector::tag("ul"));
        remove_attr(&lists[0], "class");
        assert_eq!(attr_value(&lists[0], "class"), None);
    }
}
