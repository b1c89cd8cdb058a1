// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

use crate::util::*;

/// Plane-specific configuration.
///
/// The visible picture is `width`x`height`; rows are `stride` samples long
/// and `alloc_height` rows are allocated, so the right/bottom margins up to
/// the macroblock grid carry replicated edge samples after [`Plane::pad`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneConfig {
  /// Data stride.
  pub stride: usize,
  /// Allocated height in samples.
  pub alloc_height: usize,
  /// Width in samples.
  pub width: usize,
  /// Height in samples.
  pub height: usize,
}

impl PlaneConfig {
  #[inline]
  pub fn new(width: usize, height: usize) -> Self {
    PlaneConfig {
      stride: align16(width),
      alloc_height: align16(height),
      width,
      height,
    }
  }

  /// Samples of right-edge replication carried by each row.
  #[inline]
  pub const fn xpad(&self) -> usize {
    self.stride - self.width
  }

  /// Rows of bottom-edge replication below the picture.
  #[inline]
  pub const fn ypad(&self) -> usize {
    self.alloc_height - self.height
  }
}

/// Absolute offset in samples inside a plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaneOffset {
  pub x: usize,
  pub y: usize,
}

/// One 8-bit sample plane of a frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Plane {
  pub data: Box<[u8]>,
  pub cfg: PlaneConfig,
}

impl std::fmt::Debug for Plane {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Plane {{ {}x{}, stride {} }}", self.cfg.width, self.cfg.height, self.cfg.stride)
  }
}

impl Plane {
  /// Allocates and returns a new zeroed plane.
  pub fn new(width: usize, height: usize) -> Self {
    let cfg = PlaneConfig::new(width, height);
    let data = vec![0u8; cfg.stride * cfg.alloc_height].into_boxed_slice();

    Plane { data, cfg }
  }

  pub fn from_slice(data: &[u8], stride: usize) -> Self {
    assert!(stride > 0 && data.len() % stride == 0);
    let height = data.len() / stride;

    Plane {
      data: data.into(),
      cfg: PlaneConfig { stride, alloc_height: height, width: stride, height },
    }
  }

  #[inline]
  fn index(&self, x: usize, y: usize) -> usize {
    y * self.cfg.stride + x
  }

  /// Returns the sample at the given coordinates.
  #[inline]
  pub fn p(&self, x: usize, y: usize) -> u8 {
    self.data[self.index(x, y)]
  }

  /// Returns one allocated row, including the replication margin.
  #[inline]
  pub fn row(&self, y: usize) -> &[u8] {
    &self.data[y * self.cfg.stride..(y + 1) * self.cfg.stride]
  }

  #[inline]
  pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
    &mut self.data[y * self.cfg.stride..(y + 1) * self.cfg.stride]
  }

  /// Iterates over the visible rows, `width` samples each.
  pub fn rows_iter(&self) -> impl Iterator<Item = &[u8]> {
    self
      .data
      .chunks(self.cfg.stride.max(1))
      .map(|row| &row[..self.cfg.width])
      .take(self.cfg.height)
  }

  pub fn slice(&self, po: PlaneOffset) -> PlaneSlice<'_> {
    PlaneSlice { plane: self, x: po.x, y: po.y }
  }

  /// Overwrites the visible region from packed rows of `source_stride`.
  pub fn copy_from_raw_u8(&mut self, source: &[u8], source_stride: usize) {
    let stride = self.cfg.stride;
    let width = self.cfg.width;
    for (self_row, source_row) in self
      .data
      .chunks_mut(stride.max(1))
      .take(self.cfg.height)
      .zip(source.chunks(source_stride.max(1)))
    {
      self_row[..width].copy_from_slice(&source_row[..width]);
    }
  }

  /// Fills the right and bottom margins by replicating the last visible
  /// column and row, so block reads straddling the picture edge see
  /// continuous content rather than zero fill.
  pub fn pad(&mut self) {
    let PlaneConfig { stride, alloc_height, width, height } = self.cfg;
    if width == 0 || height == 0 {
      return;
    }

    if width < stride {
      for y in 0..height {
        let row = &mut self.data[y * stride..(y + 1) * stride];
        let fill_val = row[width - 1];
        for val in &mut row[width..] {
          *val = fill_val;
        }
      }
    }

    if height < alloc_height {
      let (visible, margin) = self.data.split_at_mut(height * stride);
      let src = &visible[(height - 1) * stride..];
      for dst in margin.chunks_mut(stride) {
        dst.copy_from_slice(src);
      }
    }
  }
}

/// Macroblock grid dimensions covering a picture.
#[inline]
pub const fn mb_dims(width: usize, height: usize) -> (usize, usize) {
  (align_units(width, 16), align_units(height, 16))
}

/// Read-only window into a plane, anchored at an absolute offset.
#[derive(Clone, Copy, Debug)]
pub struct PlaneSlice<'a> {
  pub plane: &'a Plane,
  pub x: usize,
  pub y: usize,
}

impl<'a> PlaneSlice<'a> {
  /// Row `y` of the window, running to the end of the allocated row.
  #[inline]
  pub fn row(&self, y: usize) -> &'a [u8] {
    let start = (self.y + y) * self.plane.cfg.stride + self.x;
    let end = (self.y + y + 1) * self.plane.cfg.stride;
    &self.plane.data[start..end]
  }

  #[inline]
  pub fn p(&self, add_x: usize, add_y: usize) -> u8 {
    self.plane.p(self.x + add_x, self.y + add_y)
  }
}
