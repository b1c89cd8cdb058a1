// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

use crate::dist::get_sad;
use crate::partition::MotionVector;
use crate::plane::{Plane, PlaneOffset};

/// Outcome of one block search. Cost is SAD plus the weighted vector rate,
/// so inter and intra candidates stay in directly comparable units.
#[derive(Clone, Copy, Debug)]
pub struct SearchResult {
  pub mv: MotionVector,
  pub cost: u32,
}

impl SearchResult {
  /// No candidate could be evaluated.
  pub const NOT_FOUND: SearchResult =
    SearchResult { mv: MotionVector::ZERO, cost: u32::MAX };
}

/// Cost weight derived from the quantization parameter. Higher QP weighs
/// vector and partition signaling more, biasing toward coarser decisions.
#[inline]
pub fn lambda_for_qp(qp: u8) -> u32 {
  ((u32::from(qp) * u32::from(qp)) >> 4).max(1)
}

/// Signaling rate estimate for coding `a` against predictor `b`.
fn mv_rate(a: MotionVector, b: MotionVector) -> u32 {
  fn diff_to_rate(diff: i16) -> u32 {
    let d = diff >> 1;
    if d == 0 {
      0
    } else {
      2 * (16 - u32::from(d.unsigned_abs()).leading_zeros().saturating_sub(16))
    }
  }

  diff_to_rate(a.x - b.x) + diff_to_rate(a.y - b.y)
}

/// Clamps a block origin so the whole block lies inside the allocated
/// (edge-replicated) plane area.
#[inline]
pub fn clamp_block_origin(
  po: PlaneOffset, plane: &Plane, blk_w: usize, blk_h: usize,
) -> PlaneOffset {
  PlaneOffset {
    x: po.x.min(plane.cfg.stride.saturating_sub(blk_w)),
    y: po.y.min(plane.cfg.alloc_height.saturating_sub(blk_h)),
  }
}

/// Exhaustive full-sample search in a window of ±`range` around the seed
/// displacement, scored by SAD plus `lambda`-weighted vector rate against
/// `pmv`. Candidates outside the allocated reference area are not
/// generated, so any motion estimate is clamped to a valid, if poor,
/// result. Returns the winning quarter-sample vector.
pub fn full_search(
  org: &Plane, reference: &Plane, po: PlaneOffset, blk_w: usize,
  blk_h: usize, seed: MotionVector, range: isize, lambda: u32,
  pmv: MotionVector,
) -> SearchResult {
  if reference.cfg.stride < blk_w || reference.cfg.alloc_height < blk_h {
    return SearchResult::NOT_FOUND;
  }
  let max_x = (reference.cfg.stride - blk_w) as isize;
  let max_y = (reference.cfg.alloc_height - blk_h) as isize;

  let (seed_x, seed_y) = seed.fullpel();
  let center_x = (po.x as isize + seed_x).clamp(0, max_x);
  let center_y = (po.y as isize + seed_y).clamp(0, max_y);

  let x_lo = (center_x - range).max(0);
  let x_hi = (center_x + range).min(max_x);
  let y_lo = (center_y - range).max(0);
  let y_hi = (center_y + range).min(max_y);

  let plane_org = org.slice(po);
  let mut best = SearchResult::NOT_FOUND;

  for y in y_lo..=y_hi {
    for x in x_lo..=x_hi {
      let plane_ref =
        reference.slice(PlaneOffset { x: x as usize, y: y as usize });
      let sad = get_sad(&plane_org, &plane_ref, blk_w, blk_h);

      let mv = MotionVector {
        x: (4 * (x - po.x as isize)) as i16,
        y: (4 * (y - po.y as isize)) as i16,
      };
      let cost = sad + ((mv_rate(mv, pmv) * lambda) >> 6);

      if cost < best.cost {
        best = SearchResult { mv, cost };
      }
    }
  }

  best
}

#[cfg(test)]
mod test {
  use super::*;

  fn textured_plane(width: usize, height: usize) -> Plane {
    let mut plane = Plane::new(width, height);
    for y in 0..height {
      for x in 0..width {
        plane.row_mut(y)[x] = ((7 * x + 13 * y) % 251) as u8;
      }
    }
    plane.pad();
    plane
  }

  fn shifted_copy(src: &Plane, dx: usize, dy: usize) -> Plane {
    let mut out = Plane::new(src.cfg.width, src.cfg.height);
    for y in 0..src.cfg.height {
      for x in 0..src.cfg.width {
        // Clamp at the far edges so the shift never reads past the plane.
        let sx = (x + dx).min(src.cfg.width - 1);
        let sy = (y + dy).min(src.cfg.height - 1);
        out.row_mut(y)[x] = src.p(sx, sy);
      }
    }
    out.pad();
    out
  }

  #[test]
  fn finds_known_translation() {
    let reference = textured_plane(64, 64);
    // Current frame content moved left/up by (3, 2): the best match in the
    // reference lies at +(3, 2).
    let current = shifted_copy(&reference, 3, 2);

    let result = full_search(
      &current,
      &reference,
      PlaneOffset { x: 16, y: 16 },
      16,
      16,
      MotionVector::ZERO,
      8,
      lambda_for_qp(30),
      MotionVector::ZERO,
    );

    assert_eq!(result.mv, MotionVector { x: 12, y: 8 });
  }

  #[test]
  fn zero_motion_on_identical_frames() {
    let plane = textured_plane(48, 48);
    let result = full_search(
      &plane,
      &plane,
      PlaneOffset { x: 16, y: 16 },
      16,
      16,
      MotionVector::ZERO,
      6,
      lambda_for_qp(45),
      MotionVector::ZERO,
    );
    assert_eq!(result.mv, MotionVector::ZERO);
    assert_eq!(result.cost, 0);
  }

  #[test]
  fn window_clamps_at_picture_corner() {
    let plane = textured_plane(32, 32);
    // Block at the origin with a seed pointing far out of the picture:
    // every generated candidate must still be valid.
    let result = full_search(
      &plane,
      &plane,
      PlaneOffset { x: 0, y: 0 },
      16,
      16,
      MotionVector { x: -120, y: -120 },
      4,
      lambda_for_qp(10),
      MotionVector::ZERO,
    );
    assert!(result.cost < u32::MAX);
    assert!(result.mv.x >= 0 && result.mv.y >= 0);
  }

  #[test]
  fn reference_smaller_than_the_block_yields_not_found() {
    // An 8x8 plane allocates a 16x16 padded area, so only a block larger
    // than that is unsearchable.
    let tiny = Plane::new(8, 8);
    let org = textured_plane(32, 32);
    let result = full_search(
      &org,
      &tiny,
      PlaneOffset { x: 0, y: 0 },
      32,
      32,
      MotionVector::ZERO,
      4,
      1,
      MotionVector::ZERO,
    );
    assert_eq!(result.cost, u32::MAX);
  }
}
