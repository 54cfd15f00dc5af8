use std::env;
use std::path::Path;
use std::process;

use blc::error::IoSnafu;
use blc::{BlResult, printer};
use snafu::ResultExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// What the input file is expected to contain.
#[derive(Debug, Clone, Copy)]
enum Mode {
  Program,
  Block,
  Statement,
}

fn init_logging() {
  let filter = EnvFilter::try_from_env("BLC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn run(mode: Mode, path: &Path) -> BlResult<String> {
  let source = std::fs::read_to_string(path).context(IoSnafu { path })?;
  info!(path = %path.display(), ?mode, bytes = source.len(), "parsing input");

  match mode {
    Mode::Program => blc::format_program_source(&source),
    Mode::Block => {
      let block = blc::parse_block_source(&source)?;
      Ok(printer::pretty_print_statement(&block, 0))
    }
    Mode::Statement => {
      let stmt = blc::parse_statement_source(&source)?;
      Ok(printer::pretty_print_statement(&stmt, 0))
    }
  }
}

fn main() {
  init_logging();

  let args: Vec<String> = env::args().collect();
  let program = args.first().map(String::as_str).unwrap_or("blc");
  let (mode, file) = match args.get(1..).unwrap_or_default() {
    [file] => (Mode::Program, file),
    [flag, file] if flag == "--block" => (Mode::Block, file),
    [flag, file] if flag == "--statement" => (Mode::Statement, file),
    _ => {
      eprintln!("usage: {program} [--block | --statement] <file>");
      process::exit(1);
    }
  };

  match run(mode, Path::new(file)) {
    Ok(text) => print!("{text}"),
    Err(err) => {
      eprintln!("{program}: {err}");
      process::exit(1);
    }
  }
}
