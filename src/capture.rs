// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Raw I420 frame input and output.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use thiserror::Error;

use crate::frame::PlanarFrame;
use crate::plane::Plane;

#[derive(Debug, Error)]
pub enum CaptureError {
  #[error("i/o error: {0}")]
  Io(#[from] io::Error),
  #[error(
    "file size {file_size} is not a multiple of the {frame_size} byte frame"
  )]
  TruncatedFile { file_size: u64, frame_size: u64 },
  #[error("frame {requested} requested but the source holds {available}")]
  FrameOutOfRange { requested: usize, available: usize },
  #[error(
    "source is {source_width}x{source_height} but the frame is \
     {frame_width}x{frame_height}"
  )]
  DimensionMismatch {
    source_width: usize,
    source_height: usize,
    frame_width: usize,
    frame_height: usize,
  },
}

/// A provider of planar 4:2:0 frames, addressed by index.
pub trait FrameSource {
  fn num_frames(&self) -> usize;
  fn read_frame(
    &mut self, frame_idx: usize, frame: &mut PlanarFrame,
  ) -> Result<(), CaptureError>;
}

/// A consumer of planar 4:2:0 frames, written in order.
pub trait FrameSink {
  fn append_frame(&mut self, frame: &PlanarFrame) -> Result<(), CaptureError>;
}

fn i420_frame_size(width: usize, height: usize) -> usize {
  width * height * 3 / 2
}

/// Raw I420 file reader. The frame count is inferred from the file length,
/// which must be an exact multiple of the frame size.
pub struct YuvCapture {
  file: File,
  width: usize,
  height: usize,
  frames: usize,
}

impl YuvCapture {
  pub fn open<P: AsRef<Path>>(
    path: P, width: usize, height: usize,
  ) -> Result<Self, CaptureError> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let frame_size = i420_frame_size(width, height) as u64;
    if frame_size == 0 || file_size % frame_size != 0 {
      return Err(CaptureError::TruncatedFile { file_size, frame_size });
    }
    let frames = (file_size / frame_size) as usize;
    Ok(YuvCapture { file, width, height, frames })
  }

  fn read_plane(
    &mut self, plane: &mut Plane, width: usize, height: usize,
  ) -> Result<(), CaptureError> {
    for y in 0..height {
      self.file.read_exact(&mut plane.row_mut(y)[..width])?;
    }
    Ok(())
  }
}

impl FrameSource for YuvCapture {
  fn num_frames(&self) -> usize {
    self.frames
  }

  fn read_frame(
    &mut self, frame_idx: usize, frame: &mut PlanarFrame,
  ) -> Result<(), CaptureError> {
    if frame_idx >= self.frames {
      return Err(CaptureError::FrameOutOfRange {
        requested: frame_idx,
        available: self.frames,
      });
    }
    if frame.width() != self.width || frame.height() != self.height {
      return Err(CaptureError::DimensionMismatch {
        source_width: self.width,
        source_height: self.height,
        frame_width: frame.width(),
        frame_height: frame.height(),
      });
    }

    let frame_size = i420_frame_size(self.width, self.height) as u64;
    self.file.seek(SeekFrom::Start(frame_idx as u64 * frame_size))?;

    let (w, h) = (self.width, self.height);
    self.read_plane(&mut frame.y, w, h)?;
    self.read_plane(&mut frame.u, w / 2, h / 2)?;
    self.read_plane(&mut frame.v, w / 2, h / 2)?;
    Ok(())
  }
}

/// Accumulates I420 frames in memory, then writes them as one raw file.
pub struct YuvWriter {
  width: usize,
  height: usize,
  data: Vec<u8>,
}

impl YuvWriter {
  pub fn new(width: usize, height: usize) -> Self {
    YuvWriter { width, height, data: Vec::new() }
  }

  pub fn frame_count(&self) -> usize {
    self.data.len() / i420_frame_size(self.width, self.height)
  }

  pub fn write_to_file<P: AsRef<Path>>(
    &self, path: P,
  ) -> Result<(), CaptureError> {
    let mut file = File::create(path)?;
    file.write_all(&self.data)?;
    Ok(())
  }

  fn push_plane(&mut self, plane: &Plane, width: usize, height: usize) {
    for y in 0..height {
      self.data.extend_from_slice(&plane.row(y)[..width]);
    }
  }
}

impl FrameSink for YuvWriter {
  fn append_frame(&mut self, frame: &PlanarFrame) -> Result<(), CaptureError> {
    if frame.width() != self.width || frame.height() != self.height {
      return Err(CaptureError::DimensionMismatch {
        source_width: self.width,
        source_height: self.height,
        frame_width: frame.width(),
        frame_height: frame.height(),
      });
    }
    let (w, h) = (self.width, self.height);
    self.push_plane(&frame.y, w, h);
    self.push_plane(&frame.u, w / 2, h / 2);
    self.push_plane(&frame.v, w / 2, h / 2);
    Ok(())
  }
}
