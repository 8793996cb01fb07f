use std::path::PathBuf;

use clap::Parser;
use mdpipe_commonmark::{Format, ParseOptions, UnknownFormatError};

/// Command line interface for mdpipe.
#[derive(Parser, Debug)]
#[command(
  name = "mdpipe",
  version,
  about = "mdpipe: convert CommonMark to HTML, XML, man, commonmark or LaTeX",
  after_help = "A filter is a Lua file returning a function(document, format). \
                The function may rewrite the document tree; a numeric return \
                of -1 skips rendering."
)]
pub struct Cli {
  /// Input files, processed in order; standard input when none are given
  pub files: Vec<PathBuf>,

  /// Output format
  #[arg(
    short = 't',
    long = "to",
    value_name = "FORMAT",
    default_value = "html",
    value_parser = parse_format
  )]
  pub to: Format,

  /// Wrap width for reflowing formats (0 = no wrap)
  #[arg(long, value_name = "N", default_value_t = 0)]
  pub width: usize,

  /// Include source position metadata in the output
  #[arg(long)]
  pub sourcepos: bool,

  /// Treat single newlines as hard line breaks
  #[arg(long)]
  pub hardbreaks: bool,

  /// Suppress raw HTML and unsafe link destinations
  #[arg(long)]
  pub safe: bool,

  /// Substitute smart punctuation
  #[arg(long)]
  pub smart: bool,

  /// Merge adjacent text runs after parsing
  #[arg(long)]
  pub normalize: bool,

  /// Replace invalid UTF-8 sequences with U+FFFD
  #[arg(long = "validate-utf8")]
  pub validate_utf8: bool,

  /// Register a Lua filter script (repeatable, run in order)
  #[arg(long = "lua", value_name = "FILE", action = clap::ArgAction::Append)]
  pub filters: Vec<PathBuf>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,
}

impl Cli {
  /// Snapshot the parse/render feature toggles from the flags.
  #[must_use]
  pub const fn parse_options(&self) -> ParseOptions {
    ParseOptions {
      sourcepos:     self.sourcepos,
      hardbreaks:    self.hardbreaks,
      smart:         self.smart,
      safe:          self.safe,
      normalize:     self.normalize,
      validate_utf8: self.validate_utf8,
    }
  }
}

fn parse_format(value: &str) -> Result<Format, UnknownFormatError> {
  value.parse()
}
