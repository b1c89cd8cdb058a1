// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

use std::path::PathBuf;

use clap::Parser;
use hme::{Config, Estimator, InvalidConfig};

#[derive(Parser, Debug)]
#[command(
  name = "hme",
  version,
  about = "Hierarchical motion estimation over raw I420 video"
)]
pub struct CliOptions {
  /// Raw I420 input file
  #[arg(short, long, value_name = "INPUT")]
  pub input: PathBuf,

  /// Annotated I420 output file
  #[arg(short, long, value_name = "OUTPUT", default_value = "output.yuv")]
  pub output: PathBuf,

  /// Picture width in samples
  #[arg(short = 'W', long, default_value_t = 1280)]
  pub width: usize,

  /// Picture height in samples
  #[arg(short = 'H', long, default_value_t = 720)]
  pub height: usize,

  /// Number of frames to process, 0 for the whole file
  #[arg(short = 'f', long, default_value_t = 0)]
  pub frames: usize,

  /// Quantization parameter, 0 to 51
  #[arg(short, long, default_value_t = 49)]
  pub qp: u8,

  /// Skip the intra search and decide inter only
  #[arg(long)]
  pub no_intra: bool,

  /// Decision log path
  #[arg(long, value_name = "FILE", default_value = "output_results.dat")]
  pub results: PathBuf,
}

impl CliOptions {
  pub fn estimator(&self) -> Result<Estimator, InvalidConfig> {
    Estimator::new(Config {
      width: self.width,
      height: self.height,
      frames: self.frames,
      qp: self.qp,
      enable_intra: !self.no_intra,
      results_path: self.results.clone(),
    })
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn defaults_mirror_the_library_config() {
    let cli =
      CliOptions::parse_from(["hme", "--input", "in.yuv"]);
    let config = Config::default();
    assert_eq!(cli.width, config.width);
    assert_eq!(cli.height, config.height);
    assert_eq!(cli.frames, config.frames);
    assert_eq!(cli.qp, config.qp);
    assert_eq!(cli.results, config.results_path);
    assert!(!cli.no_intra);
  }

  #[test]
  fn out_of_range_qp_is_caught_at_startup() {
    let cli =
      CliOptions::parse_from(["hme", "--input", "in.yuv", "--qp", "52"]);
    assert!(cli.estimator().is_err());
  }
}
