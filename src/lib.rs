//! JVCode markup engine
//!
//! This library is the markup core of a jeuxvideo.com client: it translates
//! the platform's rich-text post HTML (nested lists, blockquotes, spoiler
//! widgets, obfuscated links, smileys, code blocks) into JVCode, the compact
//! forum markup the platform accepts for posting and that clients use as the
//! normalized storage form of message content.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `translator`: the ordered translation passes and public entry point
//! - `parser`: HTML fragment parsing using html5ever
//! - `dom`: tree-walking matcher and in-place mutation helpers
//! - `rules`: static substitution table and platform CSS selectors
//! - `deobfuscate`: link de-obfuscation primitive
//! - `error`: error types
//!
//! # Guarantees
//!
//! Translation is a pure synchronous function. Malformed HTML degrades to
//! best-effort plain text (the HTML5 recovery algorithm), missing attributes
//! fall back to empty strings, and nothing is ever thrown at the caller.
//! The static rule table is immutable, so concurrent callers need no
//! coordination.
//!
//! # Example
//!
//! ```rust
//! use jvcode::translate;
//!
//! let markup = translate("<blockquote><p>quoted</p></blockquote><p>I agree</p>");
//! assert_eq!(markup, "> quoted\n\nI agree");
//! ```

pub mod deobfuscate;
pub mod dom;
pub mod error;
pub mod parser;
pub mod rules;
pub mod translator;

// Re-export main types for convenience
pub use deobfuscate::decode;
pub use error::DecodeError;
pub use translator::{translate, MarkupTranslator, TranslateOptions};
