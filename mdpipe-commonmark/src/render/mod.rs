//! Render dispatch and helpers shared by the writers.

mod commonmark;
mod html;
mod latex;
mod man;
mod wrap;
mod xml;

use log::debug;

use crate::{
  tree::{Document, Node, NodeValue},
  types::{Format, ParseOptions},
};

/// Serialize the document in the requested format.
///
/// A total mapping: every [`Format`] has exactly one writer. `width` is
/// honored by the reflowing writers (commonmark, LaTeX); the others have
/// no wrap concept and ignore it. A width of zero disables wrapping.
#[must_use]
pub fn render(
  document: &Document,
  format: Format,
  options: &ParseOptions,
  width: usize,
) -> String {
  debug!("rendering document as {format} (width {width})");
  match format {
    Format::Html => html::render(document, options),
    Format::Xml => xml::render(document, options),
    Format::Man => man::render(document, options),
    Format::CommonMark => commonmark::render(document, options, width),
    Format::Latex => latex::render(document, options, width),
  }
}

/// Concatenated text content of a subtree, used where a format needs a
/// flat rendition of inline content (image alt text, for one).
pub(crate) fn plain_text(node: &Node) -> String {
  let mut out = String::new();
  collect_plain_text(node, &mut out);
  out
}

fn collect_plain_text(node: &Node, out: &mut String) {
  match &node.data().value {
    NodeValue::Text(text) | NodeValue::Code(text) => out.push_str(text),
    NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
    _ => {},
  }
  for child in node.children() {
    collect_plain_text(&child, out);
  }
}

/// Whether `node` is a paragraph living directly inside a tight list item.
pub(crate) fn in_tight_item(node: &Node) -> bool {
  let Some(item) = node.parent() else {
    return false;
  };
  if !matches!(item.data().value, NodeValue::Item) {
    return false;
  }
  let Some(list) = item.parent() else {
    return false;
  };
  matches!(&list.data().value, NodeValue::List(data) if data.tight)
}
