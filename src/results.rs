// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Plain-text decision log, one line per macroblock per frame.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::partition::{IntraModes, ShapeError, INTRA_NOT_COMPUTED};
use crate::rdo::ModeDecision;

pub const DEFAULT_RESULTS_PATH: &str = "output_results.dat";

#[derive(Debug, Error)]
pub enum ResultsError {
  #[error("i/o error: {0}")]
  Io(#[from] io::Error),
  #[error("corrupt decision buffer: {0}")]
  Shape(#[from] ShapeError),
}

/// Appends one frame's decisions per call. The file is truncated on frame
/// zero and extended afterwards, so rerunning a sequence always starts a
/// fresh log.
pub struct ResultWriter {
  path: PathBuf,
}

impl ResultWriter {
  pub fn new<P: AsRef<Path>>(path: P) -> Self {
    ResultWriter { path: path.as_ref().to_path_buf() }
  }

  pub fn write_frame(
    &self, decision: &ModeDecision, frame_idx: usize,
  ) -> Result<(), ResultsError> {
    let file = OpenOptions::new()
      .write(true)
      .create(true)
      .truncate(frame_idx == 0)
      .append(frame_idx > 0)
      .open(&self.path)?;
    let mut out = BufWriter::new(file);

    for mb_y in 0..decision.mb_rows {
      for mb_x in 0..decision.mb_cols {
        let mb_idx = decision.mb_index(mb_x, mb_y);
        write!(
          out,
          "pic={} mb=({},{}): {}: {}: ",
          frame_idx,
          mb_x,
          mb_y,
          decision.inter_residuals[mb_idx],
          decision.intra_residuals[mb_idx],
        )?;

        let shape = decision.intra_shapes[mb_idx];
        if shape == INTRA_NOT_COMPUTED {
          // No intra search ran; log the chosen inter major shape instead.
          writeln!(out, "{}", decision.inter_shapes[mb_idx][0])?;
        } else {
          let modes =
            IntraModes::unpack(shape, decision.intra_modes[mb_idx])?;
          let fields: Vec<String> =
            modes.fields().iter().map(u8::to_string).collect();
          writeln!(out, "{}", fields.join(", "))?;
        }
      }
    }

    out.flush()?;
    Ok(())
  }
}
