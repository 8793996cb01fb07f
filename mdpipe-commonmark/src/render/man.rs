//! Groff man page writer.
//!
//! Level-1 headings become `.SH`, deeper ones `.SS`; paragraphs fill under
//! `.PP`; list items ride on `.IP` markers and block quotes on `.RS`/`.RE`
//! indents. Troff fills lines itself, so the wrap width does not apply.
//! Raw HTML has no representation here and is dropped.

use crate::{
  tree::{Document, ListData, ListKind, Node, NodeValue},
  types::ParseOptions,
};

pub(super) fn render(document: &Document, options: &ParseOptions) -> String {
  let mut out = String::new();
  for child in document.root().children() {
    render_block(&child, options, &mut out);
  }
  if !out.is_empty() && !out.ends_with('\n') {
    out.push('\n');
  }
  out
}

fn cr(out: &mut String) {
  if !out.is_empty() && !out.ends_with('\n') {
    out.push('\n');
  }
}

fn render_block(node: &Node, options: &ParseOptions, out: &mut String) {
  let value = node.data().value.clone();
  match value {
    NodeValue::Document => {
      for child in node.children() {
        render_block(&child, options, out);
      }
    },
    NodeValue::Heading { level } => {
      cr(out);
      out.push_str(if level == 1 { ".SH\n" } else { ".SS\n" });
      render_inlines(&node.children(), options, out);
      out.push('\n');
    },
    NodeValue::Paragraph => {
      cr(out);
      if !is_first_block_of_item(node) {
        out.push_str(".PP\n");
      }
      render_inlines(&node.children(), options, out);
      out.push('\n');
    },
    NodeValue::BlockQuote => {
      cr(out);
      out.push_str(".RS\n");
      for child in node.children() {
        render_block(&child, options, out);
      }
      cr(out);
      out.push_str(".RE\n");
    },
    NodeValue::List(data) => {
      for (index, item) in node.children().iter().enumerate() {
        render_item(item, &data, index, options, out);
      }
    },
    NodeValue::CodeBlock { literal, .. } => {
      cr(out);
      out.push_str(".IP\n.nf\n\\f[C]\n");
      push_escaped(out, &literal);
      cr(out);
      out.push_str("\\f[]\n.fi\n");
    },
    NodeValue::ThematicBreak => {
      cr(out);
      out.push_str(".PP\n  *  *  *  *  *\n");
    },
    NodeValue::HtmlBlock(_) => {},
    NodeValue::Item => {
      // Items are rendered by their list; an orphaned item (filter-built
      // tree) falls back to a plain bullet.
      render_item(node, &orphan_list_data(), 0, options, out);
    },
    _ => render_inlines(&[node.clone()], options, out),
  }
}

fn render_item(
  item: &Node,
  list: &ListData,
  index: usize,
  options: &ParseOptions,
  out: &mut String,
) {
  cr(out);
  match list.kind {
    ListKind::Bullet => out.push_str(".IP \\[bu] 2\n"),
    ListKind::Ordered => {
      out.push_str(&format!(".IP \"{}.\" 4\n", list.start + index));
    },
  }
  for child in item.children() {
    render_block(&child, options, out);
  }
}

fn orphan_list_data() -> ListData {
  ListData {
    kind:      ListKind::Bullet,
    start:     1,
    delimiter: crate::tree::ListDelim::Period,
    tight:     true,
  }
}

fn is_first_block_of_item(node: &Node) -> bool {
  let Some(parent) = node.parent() else {
    return false;
  };
  if !matches!(parent.data().value, NodeValue::Item) {
    return false;
  }
  parent
    .first_child()
    .is_some_and(|first| first.same_node(node))
}

fn render_inlines(nodes: &[Node], options: &ParseOptions, out: &mut String) {
  for node in nodes {
    let value = node.data().value.clone();
    match value {
      NodeValue::Text(text) => push_escaped(out, &text),
      NodeValue::SoftBreak => out.push('\n'),
      NodeValue::LineBreak => {
        cr(out);
        out.push_str(".br\n");
      },
      NodeValue::Code(literal) => {
        out.push_str("\\f[C]");
        push_escaped(out, &literal);
        out.push_str("\\f[]");
      },
      NodeValue::Emph => {
        out.push_str("\\f[I]");
        render_inlines(&node.children(), options, out);
        out.push_str("\\f[]");
      },
      NodeValue::Strong => {
        out.push_str("\\f[B]");
        render_inlines(&node.children(), options, out);
        out.push_str("\\f[]");
      },
      NodeValue::Link { url, .. } => {
        render_inlines(&node.children(), options, out);
        out.push_str(" (");
        push_escaped(out, &url);
        out.push(')');
      },
      NodeValue::Image { .. } => {
        out.push_str("[IMAGE: ");
        render_inlines(&node.children(), options, out);
        out.push(']');
      },
      NodeValue::HtmlInline(_) => {},
      _ => render_block(node, options, out),
    }
  }
}

/// Troff escaping: backslashes, hyphens and quotes everywhere; a period or
/// apostrophe at the start of an output line would read as a macro call
/// and is replaced with its character escape.
fn push_escaped(out: &mut String, text: &str) {
  for ch in text.chars() {
    let at_line_start = out.is_empty() || out.ends_with('\n');
    match ch {
      '.' if at_line_start => out.push_str("\\[char46]"),
      '\'' if at_line_start => out.push_str("\\[char39]"),
      '\\' => out.push_str("\\e"),
      '-' => out.push_str("\\-"),
      _ => out.push(ch),
    }
  }
}
