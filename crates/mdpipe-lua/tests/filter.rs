#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
//! Filter runtime contracts: load/invoke separation, the numeric return
//! protocol, tree mutation through the handle, and per-filter isolation.

use std::{fs, path::PathBuf};

use mdpipe_commonmark::{Document, Format, ParseOptions, StreamParser, render};
use mdpipe_lua::{FilterError, run_filter};
use tempfile::TempDir;

fn parse(input: &str) -> Document {
  let mut parser = StreamParser::new(&ParseOptions::default());
  parser.feed(input.as_bytes());
  parser.finish()
}

fn html(document: &Document) -> String {
  render(document, Format::Html, &ParseOptions::default(), 0)
}

fn write_filter(dir: &TempDir, name: &str, source: &str) -> PathBuf {
  let path = dir.path().join(name);
  fs::write(&path, source).expect("write filter");
  path
}

#[test]
fn numeric_return_is_reported() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(
    &dir,
    "skip.lua",
    "return function(doc, fmt) return -1 end",
  );
  let document = parse("# Hi\n");
  let outcome = run_filter(&path, &document, "html").expect("filter runs");
  assert_eq!(outcome, Some(-1.0));
}

#[test]
fn skip_constant_matches_protocol_value() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(
    &dir,
    "skip.lua",
    "return function(doc, fmt) return markdown.SKIP_RENDERING end",
  );
  let document = parse("x\n");
  assert_eq!(
    run_filter(&path, &document, "html").expect("filter runs"),
    Some(-1.0)
  );
}

#[test]
fn non_numeric_return_is_none() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(&dir, "nil.lua", "return function(doc, fmt) end");
  let document = parse("x\n");
  assert_eq!(run_filter(&path, &document, "html").expect("filter runs"), None);
}

#[test]
fn format_name_is_passed_to_the_filter() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(
    &dir,
    "format.lua",
    "return function(doc, fmt)\n\
       if fmt == \"latex\" then return 1 end\n\
       return 0\n\
     end",
  );
  let document = parse("x\n");
  assert_eq!(
    run_filter(&path, &document, "latex").expect("filter runs"),
    Some(1.0)
  );
  assert_eq!(
    run_filter(&path, &document, "html").expect("filter runs"),
    Some(0.0)
  );
}

#[test]
fn filter_can_delete_nodes() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(
    &dir,
    "strip_headings.lua",
    "return function(doc, fmt)\n\
       for _, node in ipairs(doc:descendants()) do\n\
         if node:type() == \"heading\" then node:unlink() end\n\
       end\n\
     end",
  );
  let document = parse("# Hi\n\nkept\n");
  run_filter(&path, &document, "html").expect("filter runs");
  assert_eq!(html(&document), "<p>kept</p>\n");
}

#[test]
fn filter_can_rewrite_literals() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(
    &dir,
    "shout.lua",
    "return function(doc, fmt)\n\
       for _, node in ipairs(doc:descendants()) do\n\
         if node:type() == \"text\" then\n\
           node:set_literal(string.upper(node:literal()))\n\
         end\n\
       end\n\
     end",
  );
  let document = parse("quiet words\n");
  run_filter(&path, &document, "html").expect("filter runs");
  assert_eq!(html(&document), "<p>QUIET WORDS</p>\n");
}

#[test]
fn filter_can_build_new_nodes() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(
    &dir,
    "append.lua",
    "return function(doc, fmt)\n\
       local para = markdown.node(\"paragraph\")\n\
       para:append_child(markdown.node(\"text\", \"added\"))\n\
       doc:append_child(para)\n\
     end",
  );
  let document = parse("original\n");
  run_filter(&path, &document, "html").expect("filter runs");
  assert_eq!(html(&document), "<p>original</p>\n<p>added</p>\n");
}

#[test]
fn mutations_accumulate_across_filters() {
  let dir = TempDir::new().expect("tempdir");
  let strip = write_filter(
    &dir,
    "strip.lua",
    "return function(doc, fmt)\n\
       for _, node in ipairs(doc:descendants()) do\n\
         if node:type() == \"heading\" then node:unlink() end\n\
       end\n\
     end",
  );
  let count = write_filter(
    &dir,
    "count.lua",
    "return function(doc, fmt)\n\
       local total = 0\n\
       for _, node in ipairs(doc:descendants()) do total = total + 1 end\n\
       return total\n\
     end",
  );
  let document = parse("# Hi\n");
  // document + heading + text
  assert_eq!(
    run_filter(&count, &document, "html").expect("count runs"),
    Some(3.0)
  );
  run_filter(&strip, &document, "html").expect("strip runs");
  assert_eq!(
    run_filter(&count, &document, "html").expect("count runs again"),
    Some(1.0)
  );
}

#[test]
fn syntax_error_is_a_load_failure() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(&dir, "broken.lua", "this is not lua at all (");
  let document = parse("x\n");
  match run_filter(&path, &document, "html") {
    Err(FilterError::Load(message)) => {
      assert!(!message.is_empty());
    },
    other => panic!("expected load failure, got {other:?}"),
  }
}

#[test]
fn missing_file_is_a_load_failure() {
  let dir = TempDir::new().expect("tempdir");
  let path = dir.path().join("does_not_exist.lua");
  let document = parse("x\n");
  assert!(matches!(
    run_filter(&path, &document, "html"),
    Err(FilterError::Load(_))
  ));
}

#[test]
fn chunk_not_returning_a_function_is_a_load_failure() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(&dir, "notafn.lua", "return 42");
  let document = parse("x\n");
  assert!(matches!(
    run_filter(&path, &document, "html"),
    Err(FilterError::Load(_))
  ));
}

#[test]
fn raised_error_is_a_runtime_failure_with_the_filter_path() {
  let dir = TempDir::new().expect("tempdir");
  let path = write_filter(
    &dir,
    "boom.lua",
    "return function(doc, fmt) error(\"boom\") end",
  );
  let document = parse("x\n");
  match run_filter(&path, &document, "html") {
    Err(err @ FilterError::Runtime { .. }) => {
      let message = err.to_string();
      assert!(message.contains("boom"), "got: {message}");
      assert!(message.contains("boom.lua"), "got: {message}");
    },
    other => panic!("expected runtime failure, got {other:?}"),
  }
}

#[test]
fn filters_do_not_share_lua_state() {
  let dir = TempDir::new().expect("tempdir");
  let leaker = write_filter(
    &dir,
    "leaker.lua",
    "return function(doc, fmt) leaked_global = 1 return 0 end",
  );
  let checker = write_filter(
    &dir,
    "checker.lua",
    "return function(doc, fmt)\n\
       if leaked_global ~= nil then error(\"state leaked\") end\n\
       return 0\n\
     end",
  );
  let document = parse("x\n");
  run_filter(&leaker, &document, "html").expect("leaker runs");
  run_filter(&checker, &document, "html").expect("no state leaks");
}
