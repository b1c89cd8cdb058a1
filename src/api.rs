// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Top-level configuration and entry point.

use std::path::PathBuf;

use thiserror::Error;

use crate::capture::{FrameSink, FrameSource};
use crate::pipeline::{self, PipelineError, PipelineStats};
use crate::results::{ResultWriter, DEFAULT_RESULTS_PATH};

/// Largest accepted quantization parameter.
pub const MAX_QP: u8 = 51;

#[derive(Clone, Debug)]
pub struct Config {
  pub width: usize,
  pub height: usize,
  /// Frames to process; zero means the whole source.
  pub frames: usize,
  pub qp: u8,
  pub enable_intra: bool,
  pub results_path: PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      width: 1280,
      height: 720,
      frames: 0,
      qp: 49,
      enable_intra: true,
      results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
    }
  }
}

#[derive(Debug, Error)]
pub enum InvalidConfig {
  #[error("invalid qp {0}, expected at most {MAX_QP}")]
  QpOutOfRange(u8),
  #[error("invalid picture size {0}x{1}")]
  EmptyPicture(usize, usize),
}

impl Config {
  pub fn validate(&self) -> Result<(), InvalidConfig> {
    if self.qp > MAX_QP {
      return Err(InvalidConfig::QpOutOfRange(self.qp));
    }
    if self.width == 0 || self.height == 0 {
      return Err(InvalidConfig::EmptyPicture(self.width, self.height));
    }
    Ok(())
  }
}

/// A validated pipeline ready to run over a frame source.
pub struct Estimator {
  config: Config,
}

impl Estimator {
  pub fn new(config: Config) -> Result<Self, InvalidConfig> {
    config.validate()?;
    Ok(Estimator { config })
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn run(
    &self, source: &mut dyn FrameSource, sink: &mut dyn FrameSink,
  ) -> Result<PipelineStats, PipelineError> {
    let results = ResultWriter::new(&self.config.results_path);
    pipeline::run(&self.config, source, sink, &results)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn default_config_is_valid() {
    assert!(Config::default().validate().is_ok());
  }

  #[test]
  fn qp_above_limit_is_rejected() {
    let config = Config { qp: 52, ..Default::default() };
    assert!(matches!(
      Estimator::new(config),
      Err(InvalidConfig::QpOutOfRange(52))
    ));
  }

  #[test]
  fn zero_sized_picture_is_rejected() {
    let config = Config { width: 0, ..Default::default() };
    assert!(matches!(
      config.validate(),
      Err(InvalidConfig::EmptyPicture(0, 720))
    ));
  }
}
