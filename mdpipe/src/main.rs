use std::process;

use clap::Parser as _;
use log::LevelFilter;

mod cli;
mod error;
mod input;
mod pipeline;

use cli::Cli;

fn main() {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => {
      // clap routes --help and --version through the error path; those
      // exit 0, real usage errors exit 1 before any parsing begins.
      let clean = matches!(
        err.kind(),
        clap::error::ErrorKind::DisplayHelp
          | clap::error::ErrorKind::DisplayVersion
      );
      let _ = err.print();
      process::exit(if clean { 0 } else { 1 });
    },
  };

  // Initialize logging first so the pipeline can log from the start
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Err(err) = pipeline::run(&cli) {
    eprintln!("{err}");
    process::exit(err.exit_code());
  }
}
