//! CommonMark XML writer: one element per tree node, two-space indent per
//! depth, literals preserved as element text.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::{
  tree::{Document, ListDelim, ListKind, Node, NodeValue},
  types::ParseOptions,
};

pub(super) fn render(document: &Document, options: &ParseOptions) -> String {
  let mut out = String::with_capacity(256);
  out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
  out.push_str("<!DOCTYPE document SYSTEM \"CommonMark.dtd\">\n");
  render_node(document.root(), options, 0, &mut out);
  out
}

fn render_node(node: &Node, options: &ParseOptions, depth: usize, out: &mut String) {
  let data = node.data();
  let name = data.value.name();

  out.push_str(&"  ".repeat(depth));
  out.push('<');
  out.push_str(name);
  if matches!(data.value, NodeValue::Document) {
    out.push_str(" xmlns=\"http://commonmark.org/xml/1.0\"");
  }
  if options.sourcepos {
    if let Some(pos) = data.sourcepos {
      out.push_str(&format!(" sourcepos=\"{pos}\""));
    }
  }
  push_attributes(&data.value, out);

  let literal = data.value.literal().map(ToString::to_string);
  drop(data);

  let children = node.children();
  if let Some(literal) = literal {
    out.push_str(" xml:space=\"preserve\">");
    out.push_str(&encode_text(&literal));
    out.push_str(&format!("</{name}>\n"));
  } else if children.is_empty() {
    out.push_str(" />\n");
  } else {
    out.push_str(">\n");
    for child in children {
      render_node(&child, options, depth + 1, out);
    }
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("</{name}>\n"));
  }
}

fn push_attributes(value: &NodeValue, out: &mut String) {
  match value {
    NodeValue::Heading { level } => {
      out.push_str(&format!(" level=\"{level}\""));
    },
    NodeValue::List(data) => {
      match data.kind {
        ListKind::Bullet => out.push_str(" type=\"bullet\""),
        ListKind::Ordered => {
          out.push_str(&format!(
            " type=\"ordered\" start=\"{}\" delim=\"{}\"",
            data.start,
            match data.delimiter {
              ListDelim::Period => "period",
              ListDelim::Paren => "paren",
            }
          ));
        },
      }
      out.push_str(&format!(" tight=\"{}\"", data.tight));
    },
    NodeValue::CodeBlock { info, .. } if !info.is_empty() => {
      out.push_str(&format!(
        " info=\"{}\"",
        encode_double_quoted_attribute(info)
      ));
    },
    NodeValue::Link { url, title } | NodeValue::Image { url, title } => {
      out.push_str(&format!(
        " destination=\"{}\"",
        encode_double_quoted_attribute(url)
      ));
      if !title.is_empty() {
        out.push_str(&format!(
          " title=\"{}\"",
          encode_double_quoted_attribute(title)
        ));
      }
    },
    _ => {},
  }
}
