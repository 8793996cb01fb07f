//! # mdpipe-commonmark
//!
//! The document engine behind the `mdpipe` converter: a streaming parse
//! front end over `comrak`, an owned mutable document tree that filter
//! scripts can rewrite in place, and renderers for five output formats.
//!
//! ## Quick Start
//!
//! ```rust
//! use mdpipe_commonmark::{Format, ParseOptions, StreamParser, render};
//!
//! let options = ParseOptions::default();
//! let mut parser = StreamParser::new(&options);
//! parser.feed(b"# Hi\n");
//! let document = parser.finish();
//!
//! let html = render(&document, Format::Html, &options, 0);
//! assert!(html.contains("<h1>Hi</h1>"));
//! ```
//!
//! ## Design
//!
//! - **Streaming feed**: input arrives in arbitrarily sized byte chunks;
//!   chunk boundaries are invisible to the parse, so feeding a document in
//!   N pieces yields the same tree as feeding it whole.
//! - **Owned tree**: the parsed document is converted out of comrak's
//!   arena into a reference-counted tree ([`Node`]) so it can outlive the
//!   parse and be mutated by independently authored passes.
//! - **Render dispatch**: [`render`] is a total mapping from [`Format`] to
//!   one of the five writers; the reflowing writers (commonmark, LaTeX)
//!   honor a wrap width, the rest ignore it.

mod parser;
pub mod render;
mod tree;
mod types;

pub use crate::{
  parser::StreamParser,
  render::render,
  tree::{Document, ListData, ListDelim, ListKind, Node, NodeData, NodeValue, Sourcepos},
  types::{Format, ParseOptions, UnknownFormatError},
};
