// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

use thiserror::Error;

/// Residual value meaning "not computed".
pub const RESIDUAL_NOT_COMPUTED: u16 = u16::MAX;

/// Intra shape byte meaning "intra was not evaluated".
pub const INTRA_NOT_COMPUTED: u8 = 0xFF;

/// Motion vector slots carried per macroblock (4x4 granularity).
pub const MVS_PER_MB: usize = 16;

/// A displacement in quarter-sample units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotionVector {
  pub x: i16,
  pub y: i16,
}

impl MotionVector {
  pub const ZERO: MotionVector = MotionVector { x: 0, y: 0 };

  /// Doubles the vector when handing it to the next finer resolution tier.
  #[inline]
  pub const fn scale_up(self) -> MotionVector {
    MotionVector { x: self.x * 2, y: self.y * 2 }
  }

  /// Full-sample part of the displacement, truncated toward zero.
  #[inline]
  pub const fn fullpel(self) -> (isize, isize) {
    ((self.x / 4) as isize, (self.y / 4) as isize)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
  #[error("invalid inter major shape code {0}")]
  InvalidMajor(u8),
  #[error("invalid intra shape code {0}")]
  InvalidIntra(u8),
}

/// Top-level subdivision of a macroblock for motion compensation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MajorShape {
  /// One vector for the whole macroblock (slot 0).
  M16x16 = 0,
  /// Two 16x8 bands (slots 0 and 8).
  M16x8 = 1,
  /// Two 8x16 halves (slots 0 and 8).
  M8x16 = 2,
  /// Four 8x8 quadrants, each with its own minor shape.
  Split8x8 = 3,
}

impl MajorShape {
  pub fn from_code(code: u8) -> Result<MajorShape, ShapeError> {
    match code {
      0 => Ok(MajorShape::M16x16),
      1 => Ok(MajorShape::M16x8),
      2 => Ok(MajorShape::M8x16),
      3 => Ok(MajorShape::Split8x8),
      c => Err(ShapeError::InvalidMajor(c)),
    }
  }

  #[inline]
  pub const fn code(self) -> u8 {
    self as u8
  }
}

/// Subdivision of one 8x8 quadrant. Meaningful only under
/// [`MajorShape::Split8x8`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinorShape {
  S8x8 = 0,
  S8x4 = 1,
  S4x8 = 2,
  S4x4 = 3,
}

impl MinorShape {
  #[inline]
  fn from_bits(bits: u8) -> MinorShape {
    match bits & 0x3 {
      0 => MinorShape::S8x8,
      1 => MinorShape::S8x4,
      2 => MinorShape::S4x8,
      _ => MinorShape::S4x4,
    }
  }
}

/// Packs four 2-bit minor codes, quadrant 0 in the low bits.
pub fn pack_minor_shapes(minors: [MinorShape; 4]) -> u8 {
  minors
    .iter()
    .enumerate()
    .fold(0u8, |acc, (m, &shape)| acc | (shape as u8) << (2 * m))
}

pub fn unpack_minor_shapes(byte: u8) -> [MinorShape; 4] {
  [
    MinorShape::from_bits(byte),
    MinorShape::from_bits(byte >> 2),
    MinorShape::from_bits(byte >> 4),
    MinorShape::from_bits(byte >> 6),
  ]
}

/// Inter partition decision for one macroblock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterShape {
  pub major: MajorShape,
  pub minors: [MinorShape; 4],
}

impl InterShape {
  pub const WHOLE: InterShape = InterShape {
    major: MajorShape::M16x16,
    minors: [MinorShape::S8x8; 4],
  };

  /// Wire form: one major-shape byte, one packed minor-shape byte.
  pub fn pack(self) -> [u8; 2] {
    [self.major.code(), pack_minor_shapes(self.minors)]
  }

  pub fn unpack(bytes: [u8; 2]) -> Result<InterShape, ShapeError> {
    Ok(InterShape {
      major: MajorShape::from_code(bytes[0])?,
      minors: unpack_minor_shapes(bytes[1]),
    })
  }
}

/// Directional intra sub-modes at the macroblock's chosen granularity.
///
/// The packed form keeps the accelerator's nibble layout: the 16x16 mode in
/// the low nibble, 8x8 sub-modes at bits 0/16/32/48, and 4x4 sub-modes in 16
/// contiguous nibbles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntraModes {
  Mode16x16(u8),
  Mode8x8([u8; 4]),
  Mode4x4([u8; 16]),
}

impl IntraModes {
  #[inline]
  pub const fn shape_code(&self) -> u8 {
    match self {
      IntraModes::Mode16x16(_) => 0,
      IntraModes::Mode8x8(_) => 1,
      IntraModes::Mode4x4(_) => 2,
    }
  }

  pub fn pack(&self) -> u64 {
    match *self {
      IntraModes::Mode16x16(mode) => u64::from(mode & 0xF),
      IntraModes::Mode8x8(modes) => modes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &m)| acc | u64::from(m & 0xF) << (16 * i)),
      IntraModes::Mode4x4(modes) => modes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &m)| acc | u64::from(m & 0xF) << (4 * i)),
    }
  }

  pub fn unpack(shape: u8, bits: u64) -> Result<IntraModes, ShapeError> {
    match shape {
      0 => Ok(IntraModes::Mode16x16((bits & 0xF) as u8)),
      1 => Ok(IntraModes::Mode8x8(std::array::from_fn(|i| {
        (bits >> (16 * i) & 0xF) as u8
      }))),
      2 => Ok(IntraModes::Mode4x4(std::array::from_fn(|i| {
        (bits >> (4 * i) & 0xF) as u8
      }))),
      c => Err(ShapeError::InvalidIntra(c)),
    }
  }

  /// Sub-mode selectors in raster order (1, 4 or 16 of them).
  pub fn fields(&self) -> &[u8] {
    match self {
      IntraModes::Mode16x16(mode) => std::slice::from_ref(mode),
      IntraModes::Mode8x8(modes) => modes,
      IntraModes::Mode4x4(modes) => modes,
    }
  }
}
