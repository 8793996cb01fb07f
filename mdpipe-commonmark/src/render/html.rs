//! HTML writer.
//!
//! Emits an HTML fragment in the conventional CommonMark shape: one tag
//! pair per block, `data-sourcepos` attributes on blocks when source
//! positions were captured, and tight-list paragraphs inlined into their
//! `<li>`. Safe mode replaces raw HTML with a placeholder comment and
//! empties unsafe link destinations.

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{in_tight_item, plain_text};
use crate::{
  tree::{Document, ListKind, Node, NodeValue},
  types::ParseOptions,
};

pub(super) fn render(document: &Document, options: &ParseOptions) -> String {
  let mut out = String::new();
  for child in document.root().children() {
    render_block(&child, options, &mut out);
  }
  out
}

/// Start a fresh line unless already at one.
fn cr(out: &mut String) {
  if !out.is_empty() && !out.ends_with('\n') {
    out.push('\n');
  }
}

fn sourcepos_attr(node: &Node, options: &ParseOptions) -> String {
  if !options.sourcepos {
    return String::new();
  }
  node
    .data()
    .sourcepos
    .map(|pos| format!(" data-sourcepos=\"{pos}\""))
    .unwrap_or_default()
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
      out.push_str(&format!("<h{level}{}>", sourcepos_attr(node, options)));
      render_inlines(&node.children(), options, out);
      out.push_str(&format!("</h{level}>\n"));
    },
    NodeValue::Paragraph => {
      if in_tight_item(node) {
        render_inlines(&node.children(), options, out);
      } else {
        cr(out);
        out.push_str(&format!("<p{}>", sourcepos_attr(node, options)));
        render_inlines(&node.children(), options, out);
        out.push_str("</p>\n");
      }
    },
    NodeValue::BlockQuote => {
      cr(out);
      out.push_str(&format!(
        "<blockquote{}>\n",
        sourcepos_attr(node, options)
      ));
      for child in node.children() {
        render_block(&child, options, out);
      }
      cr(out);
      out.push_str("</blockquote>\n");
    },
    NodeValue::List(data) => {
      cr(out);
      match data.kind {
        ListKind::Bullet => {
          out.push_str(&format!("<ul{}>\n", sourcepos_attr(node, options)));
        },
        ListKind::Ordered => {
          let start = if data.start == 1 {
            String::new()
          } else {
            format!(" start=\"{}\"", data.start)
          };
          out.push_str(&format!(
            "<ol{start}{}>\n",
            sourcepos_attr(node, options)
          ));
        },
      }
      for child in node.children() {
        render_block(&child, options, out);
      }
      out.push_str(match data.kind {
        ListKind::Bullet => "</ul>\n",
        ListKind::Ordered => "</ol>\n",
      });
    },
    NodeValue::Item => {
      cr(out);
      out.push_str(&format!("<li{}>", sourcepos_attr(node, options)));
      for child in node.children() {
        render_block(&child, options, out);
      }
      out.push_str("</li>\n");
    },
    NodeValue::CodeBlock { info, literal } => {
      cr(out);
      let language = info.split_whitespace().next().unwrap_or_default();
      if language.is_empty() {
        out.push_str(&format!(
          "<pre{}><code>",
          sourcepos_attr(node, options)
        ));
      } else {
        out.push_str(&format!(
          "<pre{}><code class=\"language-{}\">",
          sourcepos_attr(node, options),
          encode_double_quoted_attribute(language)
        ));
      }
      out.push_str(&encode_text(&literal));
      out.push_str("</code></pre>\n");
    },
    NodeValue::HtmlBlock(literal) => {
      cr(out);
      if options.safe {
        out.push_str("<!-- raw HTML omitted -->\n");
      } else {
        out.push_str(&literal);
        cr(out);
      }
    },
    NodeValue::ThematicBreak => {
      cr(out);
      out.push_str(&format!("<hr{} />\n", sourcepos_attr(node, options)));
    },
    // Inline nodes at block position only occur in trees rewritten by
    // filters; render them rather than lose content.
    _ => render_inlines(&[node.clone()], options, out),
  }
}

fn render_inlines(nodes: &[Node], options: &ParseOptions, out: &mut String) {
  for node in nodes {
    let value = node.data().value.clone();
    match value {
      NodeValue::Text(text) => out.push_str(&encode_text(&text)),
      NodeValue::SoftBreak => {
        out.push_str(if options.hardbreaks { "<br />\n" } else { "\n" });
      },
      NodeValue::LineBreak => out.push_str("<br />\n"),
      NodeValue::Code(literal) => {
        out.push_str("<code>");
        out.push_str(&encode_text(&literal));
        out.push_str("</code>");
      },
      NodeValue::HtmlInline(literal) => {
        if options.safe {
          out.push_str("<!-- raw HTML omitted -->");
        } else {
          out.push_str(&literal);
        }
      },
      NodeValue::Emph => {
        out.push_str("<em>");
        render_inlines(&node.children(), options, out);
        out.push_str("</em>");
      },
      NodeValue::Strong => {
        out.push_str("<strong>");
        render_inlines(&node.children(), options, out);
        out.push_str("</strong>");
      },
      NodeValue::Link { url, title } => {
        out.push_str(&format!("<a href=\"{}\"", safe_url(&url, options)));
        if !title.is_empty() {
          out.push_str(&format!(
            " title=\"{}\"",
            encode_double_quoted_attribute(&title)
          ));
        }
        out.push('>');
        render_inlines(&node.children(), options, out);
        out.push_str("</a>");
      },
      NodeValue::Image { url, title } => {
        out.push_str(&format!(
          "<img src=\"{}\" alt=\"{}\"",
          safe_url(&url, options),
          encode_double_quoted_attribute(&plain_text(node))
        ));
        if !title.is_empty() {
          out.push_str(&format!(
            " title=\"{}\"",
            encode_double_quoted_attribute(&title)
          ));
        }
        out.push_str(" />");
      },
      // Block nodes nested at inline position: fall through to the block
      // writer so filter-built trees still serialize.
      _ => render_block(node, options, out),
    }
  }
}

fn safe_url(url: &str, options: &ParseOptions) -> String {
  if options.safe && is_unsafe_url(url) {
    String::new()
  } else {
    encode_double_quoted_attribute(url).into_owned()
  }
}

/// Destinations suppressed in safe mode: script-ish schemes and `data:`
/// payloads other than common image types.
fn is_unsafe_url(url: &str) -> bool {
  let lower = url.to_ascii_lowercase();
  if lower.starts_with("javascript:")
    || lower.starts_with("vbscript:")
    || lower.starts_with("file:")
  {
    return true;
  }
  lower.starts_with("data:")
    && ![
      "data:image/png",
      "data:image/gif",
      "data:image/jpeg",
      "data:image/webp",
    ]
    .iter()
    .any(|prefix| lower.starts_with(prefix))
}

#[cfg(test)]
mod tests {
  use super::is_unsafe_url;

  #[test]
  fn unsafe_url_detection() {
    assert!(is_unsafe_url("javascript:alert(1)"));
    assert!(is_unsafe_url("JAVASCRIPT:alert(1)"));
    assert!(is_unsafe_url("data:text/html,x"));
    assert!(!is_unsafe_url("data:image/png;base64,x"));
    assert!(!is_unsafe_url("https://example.com"));
  }
}
