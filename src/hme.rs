// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Hierarchical predictor propagation across the downsampled tiers.

use rayon::prelude::*;

use crate::frame::{FrameBuffers, TIER_FACTORS};
use crate::me::{clamp_block_origin, full_search};
use crate::partition::MotionVector;
use crate::plane::{Plane, PlaneOffset};
use crate::util::{align64, align_units};

/// Predictors stored per macroblock in each dimension: one per 8x8
/// quadrant.
pub const MV_PER_DIM: usize = 2;

/// Full-sample search radius for the macroblock search at each tier,
/// coarsest first. The coarsest tier has no seed and casts the widest net.
const TIER_SEARCH_RANGE: [isize; 3] = [16, 8, 8];

/// Radius of the per-quadrant refinement around the macroblock result.
const QUADRANT_REFINE_RANGE: isize = 4;

/// Macroblock and predictor grid dimensions of one tier.
///
/// Grids are derived top down from the coarsest tier so that every tier's
/// grid is exactly twice the next coarser one in each dimension. This
/// makes a tier's predictor grid line up one-to-one with the macroblock
/// grid of the next finer tier; the overhang on unaligned picture sizes is
/// handled by clamping block origins into the allocated plane area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierGeometry {
  pub factor: usize,
  pub mb_cols: usize,
  pub mb_rows: usize,
  pub pred_cols: usize,
  pub pred_rows: usize,
}

impl TierGeometry {
  /// Predictor buffer length, rounded up to dispatch granularity.
  pub const fn buffer_len(&self) -> usize {
    align64(self.pred_cols * self.pred_rows)
  }

  #[inline]
  pub const fn pred_index(&self, x: usize, y: usize) -> usize {
    y * self.pred_cols + x
  }
}

/// Grid dimensions for all three tiers, coarsest first.
#[derive(Clone, Debug)]
pub struct PredictorGeometry {
  pub tiers: [TierGeometry; 3],
}

impl PredictorGeometry {
  pub fn new(width: usize, height: usize) -> Self {
    let base_cols = align_units(align_units(width, TIER_FACTORS[0]), 16);
    let base_rows = align_units(align_units(height, TIER_FACTORS[0]), 16);

    let mut t = 0;
    let tiers = TIER_FACTORS.map(|factor| {
      let mb_cols = base_cols << t;
      let mb_rows = base_rows << t;
      t += 1;
      TierGeometry {
        factor,
        mb_cols,
        mb_rows,
        pred_cols: MV_PER_DIM * mb_cols,
        pred_rows: MV_PER_DIM * mb_rows,
      }
    });

    PredictorGeometry { tiers }
  }

  /// The finest tier, whose predictors seed the full-resolution decision.
  pub fn finest(&self) -> &TierGeometry {
    &self.tiers[2]
  }
}

/// Runs the coarse-to-fine search chain for one frame, filling the current
/// buffers' predictor grids. Each tier searches the current tier plane
/// against the reference tier plane, seeded by the next coarser tier's
/// predictors scaled up to the new sample grid.
pub fn propagate_tiers(
  current: &mut FrameBuffers, reference: &FrameBuffers,
  geometry: &PredictorGeometry, lambda: u32,
) {
  for t in 0..TIER_FACTORS.len() {
    let (coarser, remaining) = current.predictors.split_at_mut(t);
    let seeds = coarser
      .last()
      .map(|buf| (buf.as_slice(), &geometry.tiers[t - 1]));

    search_tier(
      &current.tiers[t],
      &reference.tiers[t],
      &geometry.tiers[t],
      seeds,
      &mut remaining[0],
      TIER_SEARCH_RANGE[t],
      lambda,
    );
  }
}

/// Searches every macroblock of one tier and writes the four quadrant
/// vectors of each into the tier's predictor grid.
fn search_tier(
  org: &Plane, reference: &Plane, geom: &TierGeometry,
  seeds: Option<(&[MotionVector], &TierGeometry)>,
  predictors: &mut [MotionVector], range: isize, lambda: u32,
) {
  let mb_count = geom.mb_cols * geom.mb_rows;

  let results: Vec<[MotionVector; 4]> = (0..mb_count)
    .into_par_iter()
    .map(|idx| {
      let bx = idx % geom.mb_cols;
      let by = idx / geom.mb_cols;

      let seed = match seeds {
        None => MotionVector::ZERO,
        Some((buf, coarse)) => buf[coarse.pred_index(bx, by)].scale_up(),
      };

      search_mb(org, reference, bx, by, seed, range, lambda)
    })
    .collect();

  for (idx, quadrants) in results.iter().enumerate() {
    let bx = idx % geom.mb_cols;
    let by = idx / geom.mb_cols;
    for (q, &mv) in quadrants.iter().enumerate() {
      let px = MV_PER_DIM * bx + (q & 1);
      let py = MV_PER_DIM * by + (q >> 1);
      predictors[geom.pred_index(px, py)] = mv;
    }
  }
}

/// One macroblock of the tier search: a seeded 16x16 search followed by an
/// 8x8 refinement per quadrant around the macroblock winner.
fn search_mb(
  org: &Plane, reference: &Plane, bx: usize, by: usize, seed: MotionVector,
  range: isize, lambda: u32,
) -> [MotionVector; 4] {
  let po = clamp_block_origin(
    PlaneOffset { x: bx * 16, y: by * 16 },
    org,
    16,
    16,
  );

  let mb = full_search(org, reference, po, 16, 16, seed, range, lambda, seed);
  let mb_mv = if mb.cost == u32::MAX { seed } else { mb.mv };

  let mut quadrants = [mb_mv; 4];
  for (q, out) in quadrants.iter_mut().enumerate() {
    let qpo = clamp_block_origin(
      PlaneOffset { x: po.x + 8 * (q & 1), y: po.y + 8 * (q >> 1) },
      org,
      8,
      8,
    );
    let refined = full_search(
      org,
      reference,
      qpo,
      8,
      8,
      mb_mv,
      QUADRANT_REFINE_RANGE,
      lambda,
      mb_mv,
    );
    if refined.cost != u32::MAX {
      *out = refined.mv;
    }
  }

  quadrants
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::me::lambda_for_qp;

  #[test]
  fn geometry_doubles_between_tiers() {
    let geometry = PredictorGeometry::new(176, 144);
    assert_eq!(geometry.tiers[0].mb_cols, 2);
    assert_eq!(geometry.tiers[0].mb_rows, 2);
    for t in 1..3 {
      assert_eq!(geometry.tiers[t].mb_cols, 2 * geometry.tiers[t - 1].mb_cols);
      assert_eq!(geometry.tiers[t].mb_rows, 2 * geometry.tiers[t - 1].mb_rows);
    }
  }

  #[test]
  fn coarse_predictor_grid_matches_finer_mb_grid() {
    for (w, h) in [(176, 144), (1280, 720), (100, 60)] {
      let geometry = PredictorGeometry::new(w, h);
      for t in 1..3 {
        assert_eq!(geometry.tiers[t - 1].pred_cols, geometry.tiers[t].mb_cols);
        assert_eq!(geometry.tiers[t - 1].pred_rows, geometry.tiers[t].mb_rows);
      }
    }
  }

  #[test]
  fn finest_grid_covers_full_resolution_macroblocks() {
    for (w, h) in [(176, 144), (1280, 720), (1920, 1080), (100, 60)] {
      let geometry = PredictorGeometry::new(w, h);
      assert!(geometry.finest().pred_cols >= align_units(w, 16));
      assert!(geometry.finest().pred_rows >= align_units(h, 16));
    }
  }

  #[test]
  fn buffer_len_is_dispatch_aligned() {
    let geometry = PredictorGeometry::new(1280, 720);
    for tier in &geometry.tiers {
      assert_eq!(tier.buffer_len() % 64, 0);
      assert!(tier.buffer_len() >= tier.pred_cols * tier.pred_rows);
    }
  }

  #[test]
  fn propagation_tracks_global_motion() {
    let width = 128;
    let height = 128;
    let geometry = PredictorGeometry::new(width, height);
    let mut reference = FrameBuffers::new(width, height, &geometry);
    let mut current = FrameBuffers::new(width, height, &geometry);

    // Reference content, then the same content shifted by (8, 0) samples,
    // which is (1, 0) at the coarsest tier.
    for y in 0..height {
      for x in 0..width {
        reference.frame.y.row_mut(y)[x] = ((11 * x + 17 * y) % 240) as u8;
      }
    }
    for y in 0..height {
      for x in 0..width {
        current.frame.y.row_mut(y)[x] = reference.frame.y.p(
          (x + 8).min(width - 1),
          y,
        );
      }
    }
    reference.frame.y.pad();
    current.frame.y.pad();

    crate::pyramid::build_pyramid(&reference.frame.y, &mut reference.tiers);
    crate::pyramid::build_pyramid(&current.frame.y, &mut current.tiers);

    propagate_tiers(&mut current, &reference, &geometry, lambda_for_qp(30));

    // Interior predictors at the finest tier should land on the true
    // displacement: 4 samples at one-half scale, 16 quarter-sample units.
    let finest = geometry.finest();
    let mv = current.predictors[2][finest.pred_index(2, 2)];
    assert_eq!(mv, MotionVector { x: 16, y: 0 });
  }
}
