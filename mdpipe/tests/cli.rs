#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
//! End-to-end pipeline runs through the binary: flag surface, exit-status
//! taxonomy, filter chaining, and render dispatch.

use std::{
  fs,
  io::Write as _,
  path::PathBuf,
  process::{Command, Output, Stdio},
};

use tempfile::TempDir;

fn mdpipe() -> Command {
  Command::new(env!("CARGO_BIN_EXE_mdpipe"))
}

fn run_args(args: &[&str]) -> Output {
  mdpipe()
    .args(args)
    .stdin(Stdio::null())
    .output()
    .expect("run mdpipe")
}

fn run_stdin(args: &[&str], input: &str) -> Output {
  let mut child = mdpipe()
    .args(args)
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .expect("spawn mdpipe");
  {
    let mut stdin = child.stdin.take().expect("stdin handle");
    stdin.write_all(input.as_bytes()).expect("write stdin");
  }
  child.wait_with_output().expect("wait for mdpipe")
}

fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
  let path = dir.path().join(name);
  fs::write(&path, content).expect("write fixture");
  path
}

#[test]
fn converts_stdin_to_html_by_default() {
  let output = run_stdin(&[], "# Hi\n");
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "<h1>Hi</h1>\n");
}

#[test]
fn converts_a_named_file() {
  let dir = TempDir::new().expect("tempdir");
  let input = write_file(&dir, "input.md", "# Hi\n");
  let output = run_args(&[input.to_str().expect("utf8 path")]);
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "<h1>Hi</h1>\n");
}

#[test]
fn concatenates_multiple_files_in_order() {
  let dir = TempDir::new().expect("tempdir");
  let first = write_file(&dir, "a.md", "# One\n");
  let second = write_file(&dir, "b.md", "Two\n");
  let output = run_args(&[
    first.to_str().expect("utf8 path"),
    second.to_str().expect("utf8 path"),
  ]);
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "<h1>One</h1>\n<p>Two</p>\n");
}

#[test]
fn missing_input_file_exits_1_with_no_output() {
  let output = run_args(&["/no/such/file.md"]);
  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).is_empty());
  assert!(stderr(&output).contains("/no/such/file.md"));
}

#[test]
fn unknown_flag_exits_1() {
  let output = run_args(&["-x"]);
  assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unknown_format_exits_1() {
  let output = run_args(&["--to", "markdown"]);
  assert_eq!(output.status.code(), Some(1));
  assert!(stdout(&output).is_empty());
  assert!(!stderr(&output).is_empty());
}

#[test]
fn non_numeric_width_exits_1() {
  let output = run_args(&["--width", "abc"]);
  assert_eq!(output.status.code(), Some(1));
}

#[test]
fn help_and_version_exit_0() {
  let help = run_args(&["--help"]);
  assert_eq!(help.status.code(), Some(0));
  assert!(stdout(&help).contains("--to"));

  let version = run_args(&["--version"]);
  assert_eq!(version.status.code(), Some(0));
  assert!(stdout(&version).contains("mdpipe"));
}

#[test]
fn render_dispatch_covers_every_format() {
  let cases = [
    ("html", "<h1>Hi</h1>\n"),
    ("xml", "<heading"),
    ("man", ".SH\nHi\n"),
    ("commonmark", "# Hi\n"),
    ("latex", "\\section{Hi}\n"),
  ];
  for (format, expected) in cases {
    let output = run_stdin(&["--to", format], "# Hi\n");
    assert_eq!(output.status.code(), Some(0), "format {format}");
    assert!(
      stdout(&output).contains(expected),
      "format {format} produced: {}",
      stdout(&output)
    );
  }
}

#[test]
fn sourcepos_flag_is_visible_in_output() {
  let output = run_stdin(&["--sourcepos"], "# Hi\n");
  assert_eq!(stdout(&output), "<h1 data-sourcepos=\"1:1-1:4\">Hi</h1>\n");
}

#[test]
fn hardbreaks_flag_is_visible_in_output() {
  let output = run_stdin(&["--hardbreaks"], "a\nb\n");
  assert_eq!(stdout(&output), "<p>a<br />\nb</p>\n");
}

#[test]
fn safe_flag_suppresses_raw_html() {
  let output = run_stdin(&["--safe"], "<div>x</div>\n");
  assert_eq!(stdout(&output), "<!-- raw HTML omitted -->\n");
}

#[test]
fn smart_flag_substitutes_punctuation() {
  let output = run_stdin(&["--smart"], "\"Hi\"\n");
  assert!(stdout(&output).contains('\u{201C}'));
}

#[test]
fn width_wraps_reflowing_formats() {
  let input = "The quick brown fox jumps over the lazy dog and keeps on \
               going until every line is wrapped.\n";
  let output = run_stdin(&["--to", "commonmark", "--width", "20"], input);
  assert_eq!(output.status.code(), Some(0));
  let text = stdout(&output);
  assert!(text.lines().count() > 1);
  for line in text.lines() {
    assert!(line.chars().count() <= 20, "line too long: {line:?}");
  }
}

#[test]
fn filter_returning_minus_one_skips_rendering() {
  let dir = TempDir::new().expect("tempdir");
  let skip = write_file(
    &dir,
    "skip.lua",
    "return function(doc, fmt) return -1 end",
  );
  let output = run_stdin(&["--lua", skip.to_str().expect("utf8 path")], "# Hi\n");
  assert_eq!(output.status.code(), Some(0));
  assert!(stdout(&output).is_empty());
}

#[test]
fn later_numeric_return_resets_an_earlier_skip() {
  let dir = TempDir::new().expect("tempdir");
  let skip = write_file(
    &dir,
    "skip.lua",
    "return function(doc, fmt) return -1 end",
  );
  let proceed = write_file(
    &dir,
    "proceed.lua",
    "return function(doc, fmt) return 0 end",
  );
  let output = run_stdin(
    &[
      "--lua",
      skip.to_str().expect("utf8 path"),
      "--lua",
      proceed.to_str().expect("utf8 path"),
    ],
    "# Hi\n",
  );
  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output), "<h1>Hi</h1>\n");
}

#[test]
fn non_numeric_return_leaves_skip_in_place() {
  let dir = TempDir::new().expect("tempdir");
  let skip = write_file(
    &dir,
    "skip.lua",
    "return function(doc, fmt) return -1 end",
  );
  let silent = write_file(&dir, "silent.lua", "return function(doc, fmt) end");
  let output = run_stdin(
    &[
      "--lua",
      skip.to_str().expect("utf8 path"),
      "--lua",
      silent.to_str().expect("utf8 path"),
    ],
    "# Hi\n",
  );
  assert_eq!(output.status.code(), Some(0));
  assert!(stdout(&output).is_empty());
}

#[test]
fn filters_run_in_registration_order() {
  let dir = TempDir::new().expect("tempdir");
  let first = write_file(
    &dir,
    "first.lua",
    "return function(doc, fmt)\n\
       local para = markdown.node(\"paragraph\")\n\
       para:append_child(markdown.node(\"text\", \"first\"))\n\
       doc:append_child(para)\n\
     end",
  );
  let second = write_file(
    &dir,
    "second.lua",
    "return function(doc, fmt)\n\
       local para = markdown.node(\"paragraph\")\n\
       para:append_child(markdown.node(\"text\", \"second\"))\n\
       doc:append_child(para)\n\
     end",
  );
  let first_arg = first.to_str().expect("utf8 path");
  let second_arg = second.to_str().expect("utf8 path");

  let forward = run_stdin(&["--lua", first_arg, "--lua", second_arg], "");
  assert_eq!(stdout(&forward), "<p>first</p>\n<p>second</p>\n");

  let reversed = run_stdin(&["--lua", second_arg, "--lua", first_arg], "");
  assert_eq!(stdout(&reversed), "<p>second</p>\n<p>first</p>\n");
}

#[test]
fn deleting_filter_then_vetoing_counter_yields_empty_output() {
  let dir = TempDir::new().expect("tempdir");
  let strip = write_file(
    &dir,
    "strip_headings.lua",
    "return function(doc, fmt)\n\
       for _, node in ipairs(doc:descendants()) do\n\
         if node:type() == \"heading\" then node:unlink() end\n\
       end\n\
     end",
  );
  let count_and_skip = write_file(
    &dir,
    "count_and_skip.lua",
    "return function(doc, fmt)\n\
       local total = 0\n\
       for _, node in ipairs(doc:descendants()) do total = total + 1 end\n\
       io.stderr:write(\"nodes left: \" .. total .. \"\\n\")\n\
       return -1\n\
     end",
  );
  let output = run_stdin(
    &[
      "--lua",
      strip.to_str().expect("utf8 path"),
      "--lua",
      count_and_skip.to_str().expect("utf8 path"),
    ],
    "# One\n\n## Two\n",
  );
  assert_eq!(output.status.code(), Some(0));
  assert!(stdout(&output).is_empty());
  assert!(stderr(&output).contains("nodes left: 1"));
}

#[test]
fn filter_load_failure_exits_3() {
  let dir = TempDir::new().expect("tempdir");
  let broken = write_file(&dir, "broken.lua", "this is not lua at all (");
  let output = run_stdin(&["--lua", broken.to_str().expect("utf8 path")], "# Hi\n");
  assert_eq!(output.status.code(), Some(3));
  assert!(stdout(&output).is_empty());
  assert!(!stderr(&output).is_empty());
}

#[test]
fn filter_runtime_failure_exits_5() {
  let dir = TempDir::new().expect("tempdir");
  let boom = write_file(
    &dir,
    "boom.lua",
    "return function(doc, fmt) error(\"boom\") end",
  );
  let output = run_stdin(&["--lua", boom.to_str().expect("utf8 path")], "# Hi\n");
  assert_eq!(output.status.code(), Some(5));
  assert!(stdout(&output).is_empty());
  let diagnostics = stderr(&output);
  assert!(diagnostics.contains("boom.lua"), "got: {diagnostics}");
  assert!(diagnostics.contains("boom"), "got: {diagnostics}");
}

#[test]
fn filter_receives_the_resolved_format_name() {
  let dir = TempDir::new().expect("tempdir");
  let gate = write_file(
    &dir,
    "gate.lua",
    "return function(doc, fmt)\n\
       if fmt == \"man\" then return -1 end\n\
       return 0\n\
     end",
  );
  let gate_arg = gate.to_str().expect("utf8 path");

  let man = run_stdin(&["--to", "man", "--lua", gate_arg], "# Hi\n");
  assert_eq!(man.status.code(), Some(0));
  assert!(stdout(&man).is_empty());

  let html = run_stdin(&["--lua", gate_arg], "# Hi\n");
  assert_eq!(stdout(&html), "<h1>Hi</h1>\n");
}

#[test]
fn no_filters_means_direct_deterministic_render() {
  let first = run_stdin(&[], "# Hi\n\ntext\n");
  let second = run_stdin(&[], "# Hi\n\ntext\n");
  assert_eq!(stdout(&first), stdout(&second));
  assert_eq!(stdout(&first), "<h1>Hi</h1>\n<p>text</p>\n");
}
