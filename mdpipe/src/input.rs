//! Input aggregation.
//!
//! Reads the named files in argument order, or standard input when none
//! are given, and pushes fixed-size chunks into the parser as they are
//! read. The parser buffers incrementally, so nothing here ever holds a
//! whole file beyond the chunk in flight.

use std::{
  fs::File,
  io::{self, ErrorKind, Read},
  path::{Path, PathBuf},
};

use log::debug;
use mdpipe_commonmark::StreamParser;

use crate::error::PipelineError;

/// Chunk size for the incremental feed.
const READ_BUFFER_SIZE: usize = 4096;

/// Feed every input into the parser. A file that cannot be opened or
/// read is fatal; nothing has been rendered at that point, so the run
/// produces no partial output.
pub fn feed_all(
  parser: &mut StreamParser,
  files: &[PathBuf],
) -> Result<(), PipelineError> {
  if files.is_empty() {
    debug!("reading from standard input");
    return feed_reader(parser, io::stdin().lock(), Path::new("<stdin>"));
  }
  for path in files {
    debug!("reading {}", path.display());
    let file = File::open(path).map_err(|source| {
      PipelineError::Io {
        path: path.clone(),
        source,
      }
    })?;
    feed_reader(parser, file, path)?;
  }
  Ok(())
}

fn feed_reader<R: Read>(
  parser: &mut StreamParser,
  mut reader: R,
  path: &Path,
) -> Result<(), PipelineError> {
  let mut buffer = [0u8; READ_BUFFER_SIZE];
  loop {
    match reader.read(&mut buffer) {
      Ok(0) => return Ok(()),
      Ok(count) => parser.feed(&buffer[..count]),
      Err(err) if err.kind() == ErrorKind::Interrupted => {},
      Err(source) => {
        return Err(PipelineError::Io {
          path: path.to_path_buf(),
          source,
        });
      },
    }
  }
}
