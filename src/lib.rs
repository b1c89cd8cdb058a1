// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Hierarchical motion estimation over raw I420 video.
//!
//! Each frame is downsampled into three tiers, searched coarse to fine to
//! propagate motion predictors, then decided per 16x16 macroblock between
//! a partitioned inter description and an intra mode set. Decisions are
//! drawn onto the output frames and logged as text.
//!
//! ```no_run
//! use hme::{Config, Estimator, YuvCapture, YuvWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config { width: 176, height: 144, ..Default::default() };
//! let mut source = YuvCapture::open("input.yuv", 176, 144)?;
//! let mut sink = YuvWriter::new(176, 144);
//! let stats = Estimator::new(config)?.run(&mut source, &mut sink)?;
//! println!("{} frames", stats.frames);
//! sink.write_to_file("annotated.yuv")?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod capture;
pub mod dist;
pub mod frame;
pub mod hme;
pub mod me;
pub mod overlay;
pub mod partition;
pub mod pipeline;
pub mod plane;
pub mod predict;
pub mod pyramid;
pub mod rdo;
pub mod results;
pub mod util;

pub use crate::api::{Config, Estimator, InvalidConfig};
pub use crate::capture::{
  CaptureError, FrameSink, FrameSource, YuvCapture, YuvWriter,
};
pub use crate::frame::PlanarFrame;
pub use crate::partition::MotionVector;
pub use crate::pipeline::{PipelineError, PipelineStats};
