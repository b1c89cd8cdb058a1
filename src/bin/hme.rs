// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

mod common;
mod error;

use std::process::exit;

use clap::Parser;
use log::info;

use crate::common::CliOptions;
use crate::error::{CliError, ToError};
use hme::{YuvCapture, YuvWriter};

fn run() -> Result<(), CliError> {
  let cli = CliOptions::parse();

  let estimator =
    cli.estimator().map_err(|e| e.context("Invalid configuration"))?;
  let mut source = YuvCapture::open(&cli.input, cli.width, cli.height)
    .map_err(|e| e.context("Cannot open the input file"))?;
  let mut sink = YuvWriter::new(cli.width, cli.height);

  let stats = estimator
    .run(&mut source, &mut sink)
    .map_err(|e| e.context("Estimation failed"))?;

  sink
    .write_to_file(&cli.output)
    .map_err(|e| e.context("Cannot write the output file"))?;

  info!(
    "done: {} frames, {} macroblocks, annotated output in {}",
    stats.frames,
    stats.macroblocks,
    cli.output.display()
  );
  Ok(())
}

fn main() {
  init_logger();

  run().unwrap_or_else(|e| {
    error::print_error(&e);
    exit(1);
  });
}

fn init_logger() {
  use std::str::FromStr;
  fn level_colored(l: log::Level) -> console::StyledObject<&'static str> {
    use console::style;
    use log::Level;
    match l {
      Level::Trace => style("??").dim(),
      Level::Debug => style("? ").dim(),
      Level::Info => style("> ").green(),
      Level::Warn => style("! ").yellow(),
      Level::Error => style("!!").red(),
    }
  }

  let level = std::env::var("HME_LOG")
    .ok()
    .and_then(|l| log::LevelFilter::from_str(&l).ok())
    .unwrap_or(log::LevelFilter::Info);

  fern::Dispatch::new()
    .format(move |out, message, record| {
      out.finish(format_args!(
        "{level} {message}",
        level = level_colored(record.level()),
        message = message,
      ));
    })
    // keep dependencies quiet by default, opt this crate in via HME_LOG
    .level(log::LevelFilter::Warn)
    .level_for("hme", level)
    .chain(std::io::stderr())
    .apply()
    .unwrap();
}
