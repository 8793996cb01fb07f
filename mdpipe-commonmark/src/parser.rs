//! Streaming parse front end.
//!
//! The pipeline feeds input in arbitrarily sized byte chunks as it reads
//! them; the parse itself runs at [`StreamParser::finish`], so chunk
//! boundaries (including boundaries inside a UTF-8 sequence) are invisible
//! to the result. comrak produces the arena-backed AST and we convert it
//! into the owned [`Node`] tree that filters and renderers share.

use comrak::{
  Arena,
  nodes::{AstNode, ListDelimType, ListType, NodeList, NodeValue as AstValue},
  options::Options,
  parse_document,
};
use log::{debug, trace};

use crate::{
  tree::{Document, ListData, ListDelim, ListKind, Node, NodeValue, Sourcepos},
  types::ParseOptions,
};

/// Incremental parser handle.
///
/// Owns the input buffer for the duration of feeding; consumed by
/// [`finish`](Self::finish), which yields the [`Document`]. There is no
/// way to touch the parser after `finish`, so the exclusive-ownership
/// window the pipeline requires holds by construction.
pub struct StreamParser {
  options: ParseOptions,
  buffer:  Vec<u8>,
}

impl StreamParser {
  /// Create a parser with an immutable snapshot of the options.
  #[must_use]
  pub fn new(options: &ParseOptions) -> Self {
    Self {
      options: options.clone(),
      buffer:  Vec::new(),
    }
  }

  /// Feed one chunk of input bytes.
  pub fn feed(&mut self, bytes: &[u8]) {
    trace!("feeding {} bytes", bytes.len());
    self.buffer.extend_from_slice(bytes);
  }

  /// Total bytes fed so far.
  #[must_use]
  pub fn buffered_len(&self) -> usize {
    self.buffer.len()
  }

  /// Finish the parse and hand the document tree to the caller.
  ///
  /// Invalid UTF-8 sequences are replaced with U+FFFD. comrak only
  /// consumes well-formed text, so decoding validates unconditionally;
  /// `validate_utf8` exists for command-line compatibility and logs when
  /// replacement actually happened without it.
  #[must_use]
  pub fn finish(self) -> Document {
    let text = String::from_utf8_lossy(&self.buffer);
    if !self.options.validate_utf8 && text.contains('\u{FFFD}') {
      debug!("input contained invalid UTF-8; sequences were replaced");
    }

    let arena = Arena::new();
    let mut comrak_options = Options::default();
    comrak_options.parse.smart = self.options.smart;

    let ast_root = parse_document(&arena, &text, &comrak_options);
    let root = convert_node(ast_root, &self.options)
      .unwrap_or_else(|| Node::new(NodeValue::Document));

    if self.options.normalize {
      merge_adjacent_text(&root);
    }

    debug!("parsed document with {} nodes", root.descendants().len());
    Document::new(root)
  }
}

/// Convert one comrak AST node (and its subtree) into the owned tree.
///
/// Returns `None` for node kinds outside core CommonMark; none are
/// produced with the comrak options used here.
fn convert_node<'a>(node: &'a AstNode<'a>, options: &ParseOptions) -> Option<Node> {
  let ast = node.data.borrow();
  let value = match &ast.value {
    AstValue::Document => NodeValue::Document,
    AstValue::Heading(heading) => NodeValue::Heading {
      level: heading.level,
    },
    AstValue::Paragraph => NodeValue::Paragraph,
    AstValue::BlockQuote => NodeValue::BlockQuote,
    AstValue::List(list) => NodeValue::List(convert_list(list)),
    AstValue::Item(..) => NodeValue::Item,
    AstValue::CodeBlock(block) => NodeValue::CodeBlock {
      info:    block.info.clone(),
      literal: block.literal.clone(),
    },
    AstValue::HtmlBlock(block) => NodeValue::HtmlBlock(block.literal.clone()),
    AstValue::ThematicBreak => NodeValue::ThematicBreak,
    AstValue::Text(text) => NodeValue::Text(text.to_string()),
    AstValue::Emph => NodeValue::Emph,
    AstValue::Strong => NodeValue::Strong,
    AstValue::Code(code) => NodeValue::Code(code.literal.clone()),
    AstValue::HtmlInline(html) => NodeValue::HtmlInline(html.clone()),
    AstValue::SoftBreak => NodeValue::SoftBreak,
    AstValue::LineBreak => NodeValue::LineBreak,
    AstValue::Link(link) => NodeValue::Link {
      url:   link.url.clone(),
      title: link.title.clone(),
    },
    AstValue::Image(link) => NodeValue::Image {
      url:   link.url.clone(),
      title: link.title.clone(),
    },
    other => {
      trace!("skipping unsupported node kind {other:?}");
      return None;
    },
  };

  let converted = Node::new(value);
  if options.sourcepos {
    converted.data_mut().sourcepos = Some(Sourcepos {
      start_line:   ast.sourcepos.start.line,
      start_column: ast.sourcepos.start.column,
      end_line:     ast.sourcepos.end.line,
      end_column:   ast.sourcepos.end.column,
    });
  }
  drop(ast);

  for child in node.children() {
    if let Some(converted_child) = convert_node(child, options) {
      converted.append(converted_child);
    }
  }

  Some(converted)
}

fn convert_list(list: &NodeList) -> ListData {
  ListData {
    kind:      match list.list_type {
      ListType::Bullet => ListKind::Bullet,
      ListType::Ordered => ListKind::Ordered,
    },
    start:     list.start,
    delimiter: match list.delimiter {
      ListDelimType::Period => ListDelim::Period,
      ListDelimType::Paren => ListDelim::Paren,
    },
    tight:     list.tight,
  }
}

/// Merge runs of adjacent `Text` siblings into single nodes, recursively.
fn merge_adjacent_text(node: &Node) {
  let mut previous_text: Option<Node> = None;
  for child in node.children() {
    let addition = match &child.data().value {
      NodeValue::Text(text) => Some(text.clone()),
      _ => None,
    };
    match addition {
      Some(addition) => {
        if let Some(previous) = &previous_text {
          if let NodeValue::Text(existing) = &mut previous.data_mut().value {
            existing.push_str(&addition);
          }
          child.detach();
        } else {
          previous_text = Some(child);
        }
      },
      None => {
        previous_text = None;
        merge_adjacent_text(&child);
      },
    }
  }
}
