// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! The per-frame pipeline: load, pyramid, tier propagation, mode
//! decision, annotation, output. Two buffer sets alternate between the
//! current and reference roles, so nothing is copied between frames.

use thiserror::Error;

use crate::api::Config;
use crate::capture::{CaptureError, FrameSink, FrameSource};
use crate::frame::FramePair;
use crate::hme::{propagate_tiers, PredictorGeometry};
use crate::me::lambda_for_qp;
use crate::overlay::overlay_decisions;
use crate::pyramid::build_pyramid;
use crate::rdo::decide_modes;
use crate::results::{ResultWriter, ResultsError};

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("frame source: {0}")]
  Capture(#[from] CaptureError),
  #[error("result log: {0}")]
  Results(#[from] ResultsError),
}

/// Totals reported after a completed run.
#[derive(Clone, Copy, Debug, Default)]
pub struct PipelineStats {
  pub frames: usize,
  pub macroblocks: usize,
}

/// Processes `config.frames` frames (or the whole source when zero)
/// through the estimation pipeline. Each annotated frame goes to `sink`
/// and each frame's decisions to `results`. Any source or output failure
/// ends the run.
pub fn run(
  config: &Config, source: &mut dyn FrameSource, sink: &mut dyn FrameSink,
  results: &ResultWriter,
) -> Result<PipelineStats, PipelineError> {
  let frame_count = if config.frames == 0 {
    source.num_frames()
  } else {
    config.frames
  };

  let geometry = PredictorGeometry::new(config.width, config.height);
  let mut pair = FramePair::new(config.width, config.height, &geometry);
  let lambda = lambda_for_qp(config.qp);

  log::info!(
    "processing {} frames at {}x{}, qp {}",
    frame_count,
    config.width,
    config.height,
    config.qp
  );

  let mut stats = PipelineStats::default();

  for frame_idx in 0..frame_count {
    if frame_idx > 0 {
      pair.swap_roles();
    }
    let (current, reference) = pair.split();

    source.read_frame(frame_idx, &mut current.frame)?;
    current.frame.y.pad();

    build_pyramid(&current.frame.y, &mut current.tiers);

    if frame_idx > 0 {
      propagate_tiers(current, reference, &geometry, lambda);
    } else {
      current.clear_predictors();
    }

    let reference_luma =
      if frame_idx > 0 { Some(&reference.frame.y) } else { None };
    // The first frame has nothing to predict from, so it is always
    // described intra even when the intra search is otherwise off.
    let decision = decide_modes(
      &current.frame.y,
      reference_luma,
      &current.predictors[2],
      &geometry,
      config.width,
      config.height,
      lambda,
      config.enable_intra || frame_idx == 0,
    );

    overlay_decisions(&mut current.frame.y, &decision);

    results.write_frame(&decision, frame_idx)?;
    sink.append_frame(&current.frame)?;

    stats.frames += 1;
    stats.macroblocks += decision.mb_cols * decision.mb_rows;
    log::debug!(
      "frame {}: {}x{} macroblocks decided",
      frame_idx,
      decision.mb_cols,
      decision.mb_rows
    );
  }

  Ok(stats)
}
