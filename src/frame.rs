// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

use crate::hme::PredictorGeometry;
use crate::partition::MotionVector;
use crate::plane::Plane;
use crate::util::*;

/// One I420 picture: full-resolution luma plus two half-resolution chroma
/// planes. Only luma participates in estimation; chroma is carried through
/// so the sink can emit complete frames.
#[derive(Clone, Debug)]
pub struct PlanarFrame {
  pub y: Plane,
  pub u: Plane,
  pub v: Plane,
}

impl PlanarFrame {
  pub fn new(width: usize, height: usize) -> Self {
    PlanarFrame {
      y: Plane::new(width, height),
      u: Plane::new(width / 2, height / 2),
      v: Plane::new(width / 2, height / 2),
    }
  }

  #[inline]
  pub fn width(&self) -> usize {
    self.y.cfg.width
  }

  #[inline]
  pub fn height(&self) -> usize {
    self.y.cfg.height
  }
}

/// Downsampling factors of the three auxiliary tiers, coarsest first.
pub const TIER_FACTORS: [usize; 3] = [8, 4, 2];

/// Everything the pipeline derives from one input frame: the picture
/// itself, its three downsampled tiers and the per-tier motion predictor
/// buffers. Two of these make up the ping-pong pair; all allocations are
/// reused for the whole sequence.
#[derive(Debug)]
pub struct FrameBuffers {
  pub frame: PlanarFrame,
  /// Downsampled luma, indexed like [`TIER_FACTORS`].
  pub tiers: [Plane; 3],
  /// One vector per 8x8 quadrant of each tier macroblock, 64-element
  /// aligned, indexed like [`TIER_FACTORS`].
  pub predictors: [Vec<MotionVector>; 3],
}

impl FrameBuffers {
  pub fn new(width: usize, height: usize, geometry: &PredictorGeometry) -> Self {
    let tiers = TIER_FACTORS.map(|factor| {
      Plane::new(align_units(width, factor), align_units(height, factor))
    });
    let predictors = std::array::from_fn(|t| {
      vec![MotionVector::ZERO; geometry.tiers[t].buffer_len()]
    });

    FrameBuffers { frame: PlanarFrame::new(width, height), tiers, predictors }
  }

  /// Resets every predictor to the zero vector ("no information").
  pub fn clear_predictors(&mut self) {
    for buffer in &mut self.predictors {
      buffer.fill(MotionVector::ZERO);
    }
  }
}

/// Which of the two pipeline slots holds the frame being worked on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
  Current,
  Reference,
}

impl Role {
  #[inline]
  const fn toggled(self) -> Role {
    match self {
      Role::Current => Role::Reference,
      Role::Reference => Role::Current,
    }
  }
}

/// The two-slot frame state. Swapping roles each frame makes the previous
/// frame's buffers the reference for the next one without copying data.
#[derive(Debug)]
pub struct FramePair {
  slots: [FrameBuffers; 2],
  current: Role,
}

impl FramePair {
  pub fn new(width: usize, height: usize, geometry: &PredictorGeometry) -> Self {
    FramePair {
      slots: [
        FrameBuffers::new(width, height, geometry),
        FrameBuffers::new(width, height, geometry),
      ],
      current: Role::Current,
    }
  }

  /// The previous current slot becomes the reference and vice versa.
  pub fn swap_roles(&mut self) {
    self.current = self.current.toggled();
  }

  #[inline]
  fn index(&self, role: Role) -> usize {
    match (self.current, role) {
      (Role::Current, Role::Current) | (Role::Reference, Role::Reference) => 0,
      _ => 1,
    }
  }

  pub fn current(&self) -> &FrameBuffers {
    &self.slots[self.index(Role::Current)]
  }

  pub fn reference(&self) -> &FrameBuffers {
    &self.slots[self.index(Role::Reference)]
  }

  /// Mutable current slot together with the immutable reference slot.
  pub fn split(&mut self) -> (&mut FrameBuffers, &FrameBuffers) {
    let cur = self.index(Role::Current);
    let (first, second) = self.slots.split_at_mut(1);
    if cur == 0 {
      (&mut first[0], &second[0])
    } else {
      (&mut second[0], &first[0])
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::hme::PredictorGeometry;

  #[test]
  fn role_swap_is_a_toggle() {
    let geometry = PredictorGeometry::new(64, 64);
    let mut pair = FramePair::new(64, 64, &geometry);

    pair.split().0.frame.y.row_mut(0)[0] = 42;
    assert_eq!(pair.current().frame.y.p(0, 0), 42);

    pair.swap_roles();
    assert_eq!(pair.reference().frame.y.p(0, 0), 42);
    assert_eq!(pair.current().frame.y.p(0, 0), 0);

    pair.swap_roles();
    assert_eq!(pair.current().frame.y.p(0, 0), 42);
  }

  #[test]
  fn tier_plane_dimensions() {
    let geometry = PredictorGeometry::new(176, 144);
    let bufs = FrameBuffers::new(176, 144, &geometry);
    // ceil(dim / factor) per tier, coarsest first.
    assert_eq!(bufs.tiers[0].cfg.width, 22);
    assert_eq!(bufs.tiers[0].cfg.height, 18);
    assert_eq!(bufs.tiers[1].cfg.width, 44);
    assert_eq!(bufs.tiers[2].cfg.width, 88);
  }
}
