//! LaTeX writer.
//!
//! Headings map onto the sectioning ladder, code blocks become `verbatim`
//! environments, lists become `itemize`/`enumerate`. Paragraphs share the
//! reflow machinery with the commonmark writer. Raw HTML is dropped.

use super::wrap::reflow;
use crate::{
  tree::{Document, ListKind, Node, NodeValue},
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

fn render_block(node: &Node, options: &ParseOptions, width: usize, out: &mut String) {
  let value = node.data().value.clone();
  match value {
    NodeValue::Document => {
      render_blocks(&node.children(), options, width, out);
    },
    NodeValue::Heading { level } => {
      let command = match level {
        1 => "section",
        2 => "subsection",
        3 => "subsubsection",
        4 => "paragraph",
        _ => "subparagraph",
      };
      out.push_str(&format!(
        "\\{command}{{{}}}\n",
        render_inlines(&node.children(), options, " ", " ")
      ));
    },
    NodeValue::Paragraph => {
      let soft = if options.hardbreaks {
        "\\\\\n"
      } else if width > 0 {
        " "
      } else {
        "\n"
      };
      let text = render_inlines(&node.children(), options, soft, "\\\\\n");
      out.push_str(&reflow(&text, width));
      out.push('\n');
    },
    NodeValue::BlockQuote => {
      out.push_str("\\begin{quote}\n");
      render_blocks(&node.children(), options, width, out);
      out.push_str("\\end{quote}\n");
    },
    NodeValue::List(data) => {
      let environment = match data.kind {
        ListKind::Bullet => "itemize",
        ListKind::Ordered => "enumerate",
      };
      out.push_str(&format!("\\begin{{{environment}}}\n"));
      if data.kind == ListKind::Ordered && data.start != 1 {
        out.push_str(&format!("\\setcounter{{enumi}}{{{}}}\n", data.start - 1));
      }
      for item in node.children() {
        out.push_str("\\item ");
        let mut inner = String::new();
        render_blocks(&item.children(), options, width, &mut inner);
        out.push_str(&inner);
        if !out.ends_with('\n') {
          out.push('\n');
        }
      }
      out.push_str(&format!("\\end{{{environment}}}\n"));
    },
    NodeValue::CodeBlock { literal, .. } => {
      out.push_str("\\begin{verbatim}\n");
      out.push_str(&literal);
      if !literal.ends_with('\n') {
        out.push('\n');
      }
      out.push_str("\\end{verbatim}\n");
    },
    NodeValue::ThematicBreak => {
      out.push_str(
        "\\begin{center}\\rule{0.5\\linewidth}{\\linethickness}\\end{center}\n",
      );
    },
    NodeValue::HtmlBlock(_) => {},
    NodeValue::Item => render_blocks(&node.children(), options, width, out),
    _ => {
      out.push_str(&render_inlines(&[node.clone()], options, " ", "\\\\\n"));
      out.push('\n');
    },
  }
}

fn render_inlines(
  nodes: &[Node],
  options: &ParseOptions,
  soft: &str,
  hard: &str,
) -> String {
  let mut out = String::new();
  for node in nodes {
    let value = node.data().value.clone();
    match value {
      NodeValue::Text(text) => out.push_str(&escape(&text)),
      NodeValue::SoftBreak => out.push_str(soft),
      NodeValue::LineBreak => out.push_str(hard),
      NodeValue::Code(literal) => {
        out.push_str(&format!("\\texttt{{{}}}", escape(&literal)));
      },
      NodeValue::Emph => {
        out.push_str(&format!(
          "\\emph{{{}}}",
          render_inlines(&node.children(), options, soft, hard)
        ));
      },
      NodeValue::Strong => {
        out.push_str(&format!(
          "\\textbf{{{}}}",
          render_inlines(&node.children(), options, soft, hard)
        ));
      },
      NodeValue::Link { url, .. } => {
        out.push_str(&format!(
          "\\href{{{}}}{{{}}}",
          escape_url(&url),
          render_inlines(&node.children(), options, soft, hard)
        ));
      },
      NodeValue::Image { url, .. } => {
        out.push_str(&format!(
          "\\protect\\includegraphics{{{}}}",
          escape_url(&url)
        ));
      },
      NodeValue::HtmlInline(_) => {},
      _ => {
        let mut block = String::new();
        render_block(node, options, 0, &mut block);
        out.push_str(&block);
      },
    }
  }
  out
}

fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '{' => out.push_str("\\{"),
      '}' => out.push_str("\\}"),
      '#' | '$' | '%' | '&' | '_' => {
        out.push('\\');
        out.push(ch);
      },
      '\\' => out.push_str("\\textbackslash{}"),
      '~' => out.push_str("\\textasciitilde{}"),
      '^' => out.push_str("\\textasciicircum{}"),
      '<' => out.push_str("\\textless{}"),
      '>' => out.push_str("\\textgreater{}"),
      '"' => out.push_str("\\textquotedbl{}"),
      _ => out.push(ch),
    }
  }
  out
}

fn escape_url(url: &str) -> String {
  let mut out = String::with_capacity(url.len());
  for ch in url.chars() {
    match ch {
      '%' => out.push_str("\\%"),
      '#' => out.push_str("\\#"),
      '{' => out.push_str("\\{"),
      '}' => out.push_str("\\}"),
      _ => out.push(ch),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::escape;

  #[test]
  fn special_characters_are_escaped() {
    assert_eq!(escape("50% of $x"), "50\\% of \\$x");
    assert_eq!(escape("a_b"), "a\\_b");
    assert_eq!(escape("x\\y"), "x\\textbackslash{}y");
  }
}
