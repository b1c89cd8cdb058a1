// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

use log::error;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
  #[error("{msg}: {io}")]
  Io { msg: String, io: std::io::Error },
  #[error("{msg}: {status}")]
  Config { msg: String, status: hme::InvalidConfig },
  #[error("{msg}: {err}")]
  Capture { msg: String, err: hme::CaptureError },
  #[error("{msg}: {err}")]
  Pipeline { msg: String, err: hme::PipelineError },
}

pub trait ToError {
  fn context(self, msg: &str) -> CliError;
}

impl ToError for std::io::Error {
  fn context(self, msg: &str) -> CliError {
    CliError::Io { msg: msg.to_owned(), io: self }
  }
}

impl ToError for hme::InvalidConfig {
  fn context(self, msg: &str) -> CliError {
    CliError::Config { msg: msg.to_owned(), status: self }
  }
}

impl ToError for hme::CaptureError {
  fn context(self, msg: &str) -> CliError {
    CliError::Capture { msg: msg.to_owned(), err: self }
  }
}

impl ToError for hme::PipelineError {
  fn context(self, msg: &str) -> CliError {
    CliError::Pipeline { msg: msg.to_owned(), err: self }
  }
}

pub fn print_error(e: &dyn std::error::Error) {
  error!("{}", e);
  let mut cause = e.source();
  while let Some(e) = cause {
    error!("Caused by: {}", e);
    cause = e.source();
  }
}
