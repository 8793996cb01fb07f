//! Lua filter runtime.
//!
//! A filter is a Lua file that returns a function of two arguments: a
//! handle to the document tree and the output format name. The function
//! may rewrite the tree through the handle, print diagnostics, or return
//! a number; a return value of exactly −1 asks the pipeline to skip
//! rendering.
//!
//! Each invocation gets a fresh, isolated [`mlua::Lua`] state with the
//! standard library and a `markdown` module (node constructors and the
//! `SKIP_RENDERING` constant) preloaded. The state is dropped before
//! `run_filter` returns, on the error paths too, so no filter can leak
//! state or resources into the next one.
//!
//! Failures are split into the two categories the pipeline distinguishes:
//! a script that cannot be read, compiled, or evaluated to a function is
//! a [`FilterError::Load`]; a script whose function raises once invoked
//! is a [`FilterError::Runtime`].

mod node;

use std::{
  fs,
  path::{Path, PathBuf},
};

use log::debug;
use mdpipe_commonmark::Document;
use mlua::{Function, Lua, Value};
use thiserror::Error;

pub use crate::node::LuaNode;

/// Failure categories for a filter run. The pipeline maps each to a
/// distinct exit status, so the split is part of the contract.
#[derive(Debug, Error)]
pub enum FilterError {
  /// The script could not be read, compiled, or evaluated to a function.
  #[error("{0}")]
  Load(String),

  /// The filter function raised while running against the document.
  #[error("Error running filter {}: {message}", filter.display())]
  Runtime { filter: PathBuf, message: String },
}

/// Load the filter at `path` and invoke it against `document`.
///
/// Returns the numeric result of the filter when it returned one, `None`
/// otherwise — the caller folds that into its render-control state.
///
/// # Errors
///
/// [`FilterError::Load`] when the script cannot be loaded as a function;
/// [`FilterError::Runtime`] when the loaded function raises.
pub fn run_filter(
  path: &Path,
  document: &Document,
  format: &str,
) -> Result<Option<f64>, FilterError> {
  let source = fs::read_to_string(path).map_err(|err| {
    FilterError::Load(format!("cannot load filter {}: {err}", path.display()))
  })?;

  let lua = Lua::new();
  node::register(&lua).map_err(|err| FilterError::Load(err.to_string()))?;

  let filter: Function = lua
    .load(&source)
    .set_name(path.display().to_string())
    .eval()
    .map_err(|err| FilterError::Load(err.to_string()))?;

  debug!("invoking filter {} (format {format})", path.display());
  let result: Value = filter
    .call((LuaNode::new(document.root().clone()), format))
    .map_err(|err| {
      FilterError::Runtime {
        filter:  path.to_path_buf(),
        message: err.to_string(),
      }
    })?;

  #[allow(
    clippy::cast_precision_loss,
    reason = "Filter results are small control values, not precise data"
  )]
  let numeric = match result {
    Value::Integer(value) => Some(value as f64),
    Value::Number(value) => Some(value),
    _ => None,
  };
  debug!("filter {} returned {numeric:?}", path.display());
  Ok(numeric)
}
