#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
//! Feed-protocol properties: chunk boundaries must be invisible to the
//! parse, whatever the option set.

use mdpipe_commonmark::{Format, ParseOptions, StreamParser, render};

const INPUT: &str = "# Héading\n\nSome *text* with ❤ and `code`.\n\n\
                     - one\n- two\n\n> quoted\n\n```rust\nfn main() {}\n```\n";

fn parse_in_chunks(input: &[u8], chunk_size: usize, options: &ParseOptions) -> mdpipe_commonmark::Document {
  let mut parser = StreamParser::new(options);
  for chunk in input.chunks(chunk_size) {
    parser.feed(chunk);
  }
  parser.finish()
}

fn option_sets() -> Vec<ParseOptions> {
  vec![
    ParseOptions::default(),
    ParseOptions {
      smart: true,
      ..ParseOptions::default()
    },
    ParseOptions {
      hardbreaks: true,
      sourcepos: true,
      ..ParseOptions::default()
    },
    ParseOptions {
      normalize: true,
      validate_utf8: true,
      safe: true,
      ..ParseOptions::default()
    },
  ]
}

#[test]
fn chunked_feed_is_equivalent_to_whole_feed() {
  for options in option_sets() {
    let whole = parse_in_chunks(INPUT.as_bytes(), INPUT.len(), &options);
    // One-byte chunks split every UTF-8 sequence and every line.
    for chunk_size in [1, 2, 3, 7, 4096] {
      let chunked = parse_in_chunks(INPUT.as_bytes(), chunk_size, &options);
      for format in [Format::Html, Format::Xml, Format::CommonMark] {
        assert_eq!(
          render(&whole, format, &options, 0),
          render(&chunked, format, &options, 0),
          "chunk size {chunk_size} diverged for {format}"
        );
      }
    }
  }
}

#[test]
fn feeding_nothing_yields_an_empty_document() {
  let options = ParseOptions::default();
  let parser = StreamParser::new(&options);
  let document = parser.finish();
  assert!(document.root().children().is_empty());
  assert_eq!(render(&document, Format::Html, &options, 0), "");
}

#[test]
fn buffered_len_tracks_fed_bytes() {
  let mut parser = StreamParser::new(&ParseOptions::default());
  parser.feed(b"abc");
  parser.feed(b"de");
  assert_eq!(parser.buffered_len(), 5);
}
