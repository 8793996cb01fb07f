//! Greedy line filling for the reflowing writers.

/// Reflow `text` to at most `width` columns per line, breaking at spaces.
///
/// Existing newlines (hard breaks) are kept; each segment between them is
/// filled independently. Tokens longer than the width are emitted on their
/// own line unbroken. A width of zero returns the text unchanged.
pub(crate) fn reflow(text: &str, width: usize) -> String {
  if width == 0 {
    return text.to_string();
  }
  let mut out = String::with_capacity(text.len());
  for (index, segment) in text.split('\n').enumerate() {
    if index > 0 {
      out.push('\n');
    }
    reflow_segment(segment, width, &mut out);
  }
  out
}

fn reflow_segment(segment: &str, width: usize, out: &mut String) {
  let mut column = 0usize;
  for word in segment.split(' ').filter(|word| !word.is_empty()) {
    let length = word.chars().count();
    if column == 0 {
      out.push_str(word);
      column = length;
    } else if column + 1 + length <= width {
      out.push(' ');
      out.push_str(word);
      column += 1 + length;
    } else {
      out.push('\n');
      out.push_str(word);
      column = length;
    }
  }
}

/// Width available inside a prefixed context (block quote, list item).
pub(crate) fn reduced(width: usize, indent: usize) -> usize {
  if width == 0 {
    0
  } else {
    width.saturating_sub(indent).max(1)
  }
}
