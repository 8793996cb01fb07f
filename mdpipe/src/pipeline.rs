//! Pipeline orchestration.
//!
//! INIT → READING → PARSED → FILTERING → RENDERED-or-SKIPPED → TEARDOWN.
//! Exactly one document tree is created per run and dropped at the end of
//! [`run`] on every path that reaches the parse; each filter runs in its
//! own Lua state, strictly in registration order, with exclusive access
//! to the tree for the duration of its call.

use std::{
  io::{self, Write},
  path::Path,
};

use log::debug;
use mdpipe_commonmark::{StreamParser, render};

use crate::{cli::Cli, error::PipelineError, input};

/// Whether the renderer runs after the filter chain.
///
/// Updated by every filter that returns a number: −1 sets `Skip`, any
/// other number resets to `Proceed`. Non-numeric returns leave the state
/// as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderControl {
  Proceed,
  Skip,
}

/// Run the whole conversion pipeline for one invocation.
///
/// # Errors
///
/// Propagates the first failure from input reading, filter loading, or
/// filter invocation; `main` maps the variant to an exit status.
pub fn run(cli: &Cli) -> Result<(), PipelineError> {
  let options = cli.parse_options();
  let format = cli.to;

  let mut parser = StreamParser::new(&options);
  input::feed_all(&mut parser, &cli.files)?;
  debug!("fed {} bytes", parser.buffered_len());
  let document = parser.finish();

  let mut control = RenderControl::Proceed;
  for path in &cli.filters {
    let outcome = mdpipe_lua::run_filter(path, &document, format.name())?;
    if let Some(value) = outcome {
      #[allow(
        clippy::float_cmp,
        reason = "The skip signal is the exact value -1"
      )]
      {
        control = if value == -1.0 {
          RenderControl::Skip
        } else {
          RenderControl::Proceed
        };
      }
      debug!(
        "filter {} set render control to {control:?}",
        path.display()
      );
    }
  }

  if control == RenderControl::Proceed {
    let output = render(&document, format, &options, cli.width);
    write_output(output.as_bytes())?;
  } else {
    debug!("rendering skipped by filter request");
  }

  drop(document);
  Ok(())
}

/// Write the rendered buffer to standard output in one piece.
fn write_output(bytes: &[u8]) -> Result<(), PipelineError> {
  let stdout = io::stdout();
  let mut handle = stdout.lock();
  handle
    .write_all(bytes)
    .and_then(|()| handle.flush())
    .map_err(|source| {
      PipelineError::Io {
        path: Path::new("<stdout>").to_path_buf(),
        source,
      }
    })
}
