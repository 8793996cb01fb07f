//! Configuration types shared by the parser front end and the renderers.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Feature toggles for parsing and rendering.
///
/// Constructed once from command-line flags and passed by reference into
/// the parser, the filter loop and the renderers. Never mutated after
/// parsing begins.
#[derive(Debug, Clone, Default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct ParseOptions {
  /// Capture source positions on parsed nodes and include them in output
  /// formats that can carry them (HTML `data-sourcepos`, XML `sourcepos`).
  pub sourcepos: bool,

  /// Treat single newlines as hard line breaks when rendering.
  pub hardbreaks: bool,

  /// Substitute smart punctuation (curly quotes, en/em dashes, ellipses)
  /// during parsing.
  pub smart: bool,

  /// Suppress raw embedded HTML and unsafe link destinations in output.
  pub safe: bool,

  /// Merge adjacent text runs after parsing.
  pub normalize: bool,

  /// Replace invalid UTF-8 sequences with U+FFFD instead of assuming
  /// well-formed input.
  pub validate_utf8: bool,
}

/// Output serialization selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  /// HTML fragment output.
  Html,
  /// CommonMark XML representation of the document tree.
  Xml,
  /// Groff man page output.
  Man,
  /// CommonMark source round-trip output.
  CommonMark,
  /// LaTeX output.
  Latex,
}

impl Format {
  /// The name used on the command line and passed to filter scripts.
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Html => "html",
      Self::Xml => "xml",
      Self::Man => "man",
      Self::CommonMark => "commonmark",
      Self::Latex => "latex",
    }
  }
}

impl fmt::Display for Format {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Error produced when a format name does not match any known writer.
#[derive(Debug, Clone, Error)]
#[error("unknown format `{0}` (expected html, xml, man, commonmark or latex)")]
pub struct UnknownFormatError(pub String);

impl FromStr for Format {
  type Err = UnknownFormatError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "html" => Ok(Self::Html),
      "xml" => Ok(Self::Xml),
      "man" => Ok(Self::Man),
      "commonmark" => Ok(Self::CommonMark),
      "latex" => Ok(Self::Latex),
      other => Err(UnknownFormatError(other.to_string())),
    }
  }
}
