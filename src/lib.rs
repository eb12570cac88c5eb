//! # Constant-time name lookup (html-lookup)
//!
//! Classifies a byte string (a tag, attribute or entity name) into one of a
//! fixed set of values with a handful of integer comparisons, however many
//! names are registered.
//!
//! ## Design
//!
//! Every generated finder switches on the first `min(len, 4)` bytes packed
//! into a `u32`, then settles names that share a 4-byte prefix by exact
//! length and remaining bytes:
//!
//! ```text
//! find(b"blockquote")
//!   lead_key → (4, 0x636f6c62)            "bloc"
//!     len == 10 && suffix == "kquote"     → Tag_Blockquote
//!   otherwise                              → Tag_NotFound
//! ```
//!
//! Tables come from two places:
//!
//! - [`lookup_table!`] builds them inline at compile time;
//! - `html-lookup-build` renders them from a `lookup.toml` in `build.rs`.
//!
//! Both paths share the same tree builder and call into [`key`] at runtime.
//!
//! ```
//! use html_lookup::lookup_table;
//!
//! lookup_table! {
//!     #[case_insensitive]
//!     #[prefix = "Tag"]
//!     pub enum Tag { "a", "br", "body", "blockquote" }
//!
//!     impl Tag {
//!         pub fn is_void = ["br"];
//!     }
//! }
//!
//! assert_eq!(Tag::find(b"BODY"), Tag::Tag_Body);
//! assert_eq!(Tag::find(b"bod"), Tag::Tag_NotFound);
//! assert!(Tag::Tag_Br.is_void());
//! ```

// Generated code names this crate by its absolute path, including here.
extern crate self as html_lookup;

pub mod html;
pub mod key;

pub use html_lookup_macro::lookup_table;
