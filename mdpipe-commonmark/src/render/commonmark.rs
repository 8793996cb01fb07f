//! CommonMark source round-trip writer.
//!
//! Produces markdown that parses back to the same tree: ATX headings,
//! blank-line separated blocks, fenced code with collision-aware fences,
//! and marker-indented list continuation lines. Paragraph text reflows at
//! the wrap width; soft breaks become wrap opportunities when wrapping is
//! on and plain newlines when it is off.

use super::wrap::{reduced, reflow};
use crate::{
  tree::{Document, ListDelim, ListKind, Node, NodeValue},
  types::ParseOptions,
};

pub(super) fn render(document: &Document, options: &ParseOptions, width: usize) -> String {
  let mut out = String::new();
  render_blocks(&document.root().children(), options, width, &mut out);
  out
}

fn render_blocks(blocks: &[Node], options: &ParseOptions, width: usize, out: &mut String) {
  for (index, block) in blocks.iter().enumerate() {
    if index > 0 {
      out.push('\n');
    }
    render_block(block, options, width, out);
  }
}

/// Render one block, ending with exactly one newline.
fn render_block(node: &Node, options: &ParseOptions, width: usize, out: &mut String) {
  let value = node.data().value.clone();
  match value {
    NodeValue::Document => {
      render_blocks(&node.children(), options, width, out);
    },
    NodeValue::Heading { level } => {
      out.push_str(&"#".repeat(usize::from(level)));
      out.push(' ');
      // Headings stay on one line regardless of width.
      out.push_str(&render_inlines(&node.children(), options, " ", " "));
      out.push('\n');
    },
    NodeValue::Paragraph => {
      let soft = if options.hardbreaks {
        "\\\n"
      } else if width > 0 {
        " "
      } else {
        "\n"
      };
      let text = render_inlines(&node.children(), options, soft, "\\\n");
      out.push_str(&reflow(&text, width));
      out.push('\n');
    },
    NodeValue::BlockQuote => {
      let mut inner = String::new();
      render_blocks(
        &node.children(),
        options,
        reduced(width, 2),
        &mut inner,
      );
      for line in inner.lines() {
        if line.is_empty() {
          out.push_str(">\n");
        } else {
          out.push_str("> ");
          out.push_str(line);
          out.push('\n');
        }
      }
    },
    NodeValue::List(data) => {
      for (index, item) in node.children().iter().enumerate() {
        if index > 0 && !data.tight {
          out.push('\n');
        }
        let marker = match data.kind {
          ListKind::Bullet => "- ".to_string(),
          ListKind::Ordered => {
            let delimiter = match data.delimiter {
              ListDelim::Period => '.',
              ListDelim::Paren => ')',
            };
            format!("{}{delimiter} ", data.start + index)
          },
        };
        let mut inner = String::new();
        render_blocks(
          &item.children(),
          options,
          reduced(width, marker.len()),
          &mut inner,
        );
        if inner.is_empty() {
          out.push_str(marker.trim_end());
          out.push('\n');
          continue;
        }
        for (line_index, line) in inner.lines().enumerate() {
          if line_index == 0 {
            out.push_str(&marker);
          } else if !line.is_empty() {
            out.push_str(&" ".repeat(marker.len()));
          }
          out.push_str(line);
          out.push('\n');
        }
      }
    },
    NodeValue::CodeBlock { info, literal } => {
      let fence = "`".repeat(fence_length(&literal));
      out.push_str(&fence);
      out.push_str(&info);
      out.push('\n');
      out.push_str(&literal);
      if !literal.ends_with('\n') {
        out.push('\n');
      }
      out.push_str(&fence);
      out.push('\n');
    },
    NodeValue::HtmlBlock(literal) => {
      out.push_str(&literal);
      if !literal.ends_with('\n') {
        out.push('\n');
      }
    },
    NodeValue::ThematicBreak => out.push_str("***\n"),
    NodeValue::Item => {
      render_blocks(&node.children(), options, width, out);
    },
    _ => {
      out.push_str(&render_inlines(&[node.clone()], options, " ", "\\\n"));
      out.push('\n');
    },
  }
}

/// A fence one backtick longer than the longest run inside the literal,
/// and never shorter than three.
fn fence_length(literal: &str) -> usize {
  let mut longest = 0usize;
  let mut current = 0usize;
  for ch in literal.chars() {
    if ch == '`' {
      current += 1;
      longest = longest.max(current);
    } else {
      current = 0;
    }
  }
  (longest + 1).max(3)
}

fn render_inlines(
  nodes: &[Node],
  options: &ParseOptions,
  soft: &str,
  hard: &str,
) -> String {
  let mut out = String::new();
  for node in nodes {
    render_inline(node, options, soft, hard, &mut out);
  }
  out
}

fn render_inline(
  node: &Node,
  options: &ParseOptions,
  soft: &str,
  hard: &str,
  out: &mut String,
) {
  let value = node.data().value.clone();
  match value {
    NodeValue::Text(text) => out.push_str(&escape_text(&text)),
    NodeValue::SoftBreak => out.push_str(soft),
    NodeValue::LineBreak => out.push_str(hard),
    NodeValue::Code(literal) => out.push_str(&code_span(&literal)),
    NodeValue::HtmlInline(literal) => out.push_str(&literal),
    NodeValue::Emph => {
      out.push('*');
      out.push_str(&render_inlines(&node.children(), options, soft, hard));
      out.push('*');
    },
    NodeValue::Strong => {
      out.push_str("**");
      out.push_str(&render_inlines(&node.children(), options, soft, hard));
      out.push_str("**");
    },
    NodeValue::Link { url, title } => {
      out.push('[');
      out.push_str(&render_inlines(&node.children(), options, soft, hard));
      out.push_str("](");
      out.push_str(&destination(&url));
      out.push_str(&title_suffix(&title));
      out.push(')');
    },
    NodeValue::Image { url, title } => {
      out.push_str("![");
      out.push_str(&render_inlines(&node.children(), options, soft, hard));
      out.push_str("](");
      out.push_str(&destination(&url));
      out.push_str(&title_suffix(&title));
      out.push(')');
    },
    _ => {
      // Block node at inline position: render it standalone.
      render_block(node, options, 0, out);
    },
  }
}

/// Backslash-escape characters that could be re-read as markup.
fn escape_text(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>') {
      out.push('\\');
    }
    out.push(ch);
  }
  out
}

/// Wrap a code span in one more backtick than its longest internal run,
/// padding with spaces when the content begins or ends with a backtick.
fn code_span(literal: &str) -> String {
  let mut longest = 0usize;
  let mut current = 0usize;
  for ch in literal.chars() {
    if ch == '`' {
      current += 1;
      longest = longest.max(current);
    } else {
      current = 0;
    }
  }
  let delimiter = "`".repeat(longest + 1);
  let pad = literal.is_empty()
    || literal.starts_with('`')
    || literal.ends_with('`');
  if pad {
    format!("{delimiter} {literal} {delimiter}")
  } else {
    format!("{delimiter}{literal}{delimiter}")
  }
}

fn destination(url: &str) -> String {
  if url.is_empty() || url.chars().any(|c| c.is_whitespace() || c.is_control()) {
    format!("<{url}>")
  } else {
    url.to_string()
  }
}

fn title_suffix(title: &str) -> String {
  if title.is_empty() {
    String::new()
  } else {
    format!(" \"{}\"", title.replace('"', "\\\""))
  }
}
