// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Full-resolution mode decision: the partitioned inter search seeded by
//! the finest tier's predictors, the intra search, and the choice between
//! them per macroblock.

use arrayvec::ArrayVec;
use rayon::prelude::*;

use crate::hme::PredictorGeometry;
use crate::me::{clamp_block_origin, full_search, SearchResult};
use crate::partition::{
  InterShape, IntraModes, MajorShape, MinorShape, MotionVector,
  INTRA_NOT_COMPUTED, MVS_PER_MB, RESIDUAL_NOT_COMPUTED,
};
use crate::plane::{mb_dims, Plane, PlaneOffset};
use crate::predict::search_intra;
use crate::util::align64;

/// Full-sample radius of the seeded macroblock search.
const MB_SEARCH_RANGE: isize = 8;

/// Radius of each sub-block refinement around its parent's vector.
const SUB_REFINE_RANGE: isize = 4;

/// Largest storable residual. One less than the not-computed sentinel.
const RESIDUAL_MAX: u32 = (RESIDUAL_NOT_COMPUTED - 1) as u32;

/// Per-frame decision output, stored as one buffer per field with
/// dispatch-aligned length. `mvs` holds [`MVS_PER_MB`] quarter-sample
/// slots per macroblock; unused slots stay zero.
#[derive(Clone, Debug)]
pub struct ModeDecision {
  pub mb_cols: usize,
  pub mb_rows: usize,
  pub mvs: Vec<MotionVector>,
  pub inter_shapes: Vec<[u8; 2]>,
  pub inter_residuals: Vec<u16>,
  pub intra_shapes: Vec<u8>,
  pub intra_modes: Vec<u64>,
  pub intra_residuals: Vec<u16>,
}

impl ModeDecision {
  pub fn new(width: usize, height: usize) -> Self {
    let (mb_cols, mb_rows) = mb_dims(width, height);
    let len = align64(mb_cols * mb_rows);
    ModeDecision {
      mb_cols,
      mb_rows,
      mvs: vec![MotionVector::ZERO; len * MVS_PER_MB],
      inter_shapes: vec![InterShape::WHOLE.pack(); len],
      inter_residuals: vec![RESIDUAL_NOT_COMPUTED; len],
      intra_shapes: vec![INTRA_NOT_COMPUTED; len],
      intra_modes: vec![0; len],
      intra_residuals: vec![RESIDUAL_NOT_COMPUTED; len],
    }
  }

  #[inline]
  pub fn mb_index(&self, x: usize, y: usize) -> usize {
    y * self.mb_cols + x
  }

  pub fn mv_slots(&self, mb_idx: usize) -> &[MotionVector] {
    &self.mvs[mb_idx * MVS_PER_MB..(mb_idx + 1) * MVS_PER_MB]
  }

  /// A macroblock is coded intra when its intra cost strictly beats the
  /// inter cost. Ties and the not-computed intra sentinel go to inter.
  #[inline]
  pub fn is_intra(&self, mb_idx: usize) -> bool {
    self.intra_residuals[mb_idx] < self.inter_residuals[mb_idx]
  }
}

/// Decision for a single macroblock before scattering into the per-field
/// buffers.
struct MbDecision {
  mvs: [MotionVector; MVS_PER_MB],
  inter_shape: InterShape,
  inter_cost: u32,
  intra: Option<(IntraModes, u32)>,
}

#[inline]
fn saturate(cost: u32) -> u16 {
  cost.min(RESIDUAL_MAX) as u16
}

fn search_block(
  org: &Plane, reference: &Plane, po: PlaneOffset, blk_w: usize,
  blk_h: usize, seed: MotionVector, range: isize, lambda: u32,
) -> SearchResult {
  let po = clamp_block_origin(po, org, blk_w, blk_h);
  full_search(org, reference, po, blk_w, blk_h, seed, range, lambda, seed)
}

/// Picks the minor shape of one 8x8 quadrant. Returns the winning shape,
/// its vectors at slot offsets 0/1/2/3 within the quadrant's group, and
/// its cost including the extra signaling for finer splits.
fn decide_quadrant(
  org: &Plane, reference: &Plane, qpo: PlaneOffset, seed: MotionVector,
  lambda: u32,
) -> (MinorShape, [MotionVector; 4], u32) {
  let whole = search_block(org, reference, qpo, 8, 8, seed, SUB_REFINE_RANGE, lambda);

  let halves_h = [
    search_block(org, reference, qpo, 8, 4, whole.mv, SUB_REFINE_RANGE, lambda),
    search_block(
      org,
      reference,
      PlaneOffset { x: qpo.x, y: qpo.y + 4 },
      8,
      4,
      whole.mv,
      SUB_REFINE_RANGE,
      lambda,
    ),
  ];
  let cost_8x4 =
    halves_h[0].cost.saturating_add(halves_h[1].cost).saturating_add(lambda / 2);

  let halves_v = [
    search_block(org, reference, qpo, 4, 8, whole.mv, SUB_REFINE_RANGE, lambda),
    search_block(
      org,
      reference,
      PlaneOffset { x: qpo.x + 4, y: qpo.y },
      4,
      8,
      whole.mv,
      SUB_REFINE_RANGE,
      lambda,
    ),
  ];
  let cost_4x8 =
    halves_v[0].cost.saturating_add(halves_v[1].cost).saturating_add(lambda / 2);

  let mut quarters = [SearchResult::NOT_FOUND; 4];
  let mut cost_4x4 = 3 * lambda / 2;
  for (b, out) in quarters.iter_mut().enumerate() {
    *out = search_block(
      org,
      reference,
      PlaneOffset { x: qpo.x + 4 * (b & 1), y: qpo.y + 4 * (b >> 1) },
      4,
      4,
      whole.mv,
      SUB_REFINE_RANGE,
      lambda,
    );
    cost_4x4 = cost_4x4.saturating_add(out.cost);
  }

  let mut best =
    (MinorShape::S8x8, [whole.mv, MotionVector::ZERO, MotionVector::ZERO, MotionVector::ZERO], whole.cost);
  if cost_8x4 < best.2 {
    best = (
      MinorShape::S8x4,
      [halves_h[0].mv, MotionVector::ZERO, halves_h[1].mv, MotionVector::ZERO],
      cost_8x4,
    );
  }
  if cost_4x8 < best.2 {
    best = (
      MinorShape::S4x8,
      [halves_v[0].mv, MotionVector::ZERO, halves_v[1].mv, MotionVector::ZERO],
      cost_4x8,
    );
  }
  if cost_4x4 < best.2 {
    best = (
      MinorShape::S4x4,
      [quarters[0].mv, quarters[1].mv, quarters[2].mv, quarters[3].mv],
      cost_4x4,
    );
  }

  best
}

/// Full partitioned inter search for one macroblock.
fn decide_inter(
  org: &Plane, reference: &Plane, po: PlaneOffset, seed: MotionVector,
  lambda: u32,
) -> (InterShape, [MotionVector; MVS_PER_MB], u32) {
  // The propagated predictor is the primary candidate; the zero vector
  // catches macroblocks the tier chain mispredicted. Ties keep the
  // earlier candidate.
  let mut candidates = ArrayVec::<MotionVector, 2>::new();
  candidates.push(seed);
  if seed != MotionVector::ZERO {
    candidates.push(MotionVector::ZERO);
  }

  let mut whole = SearchResult::NOT_FOUND;
  for &candidate in &candidates {
    let result = full_search(
      org,
      reference,
      po,
      16,
      16,
      candidate,
      MB_SEARCH_RANGE,
      lambda,
      candidate,
    );
    if result.cost < whole.cost {
      whole = result;
    }
  }

  let top =
    search_block(org, reference, po, 16, 8, whole.mv, SUB_REFINE_RANGE, lambda);
  let bottom = search_block(
    org,
    reference,
    PlaneOffset { x: po.x, y: po.y + 8 },
    16,
    8,
    whole.mv,
    SUB_REFINE_RANGE,
    lambda,
  );
  let cost_16x8 = top.cost.saturating_add(bottom.cost).saturating_add(lambda);

  let left =
    search_block(org, reference, po, 8, 16, whole.mv, SUB_REFINE_RANGE, lambda);
  let right = search_block(
    org,
    reference,
    PlaneOffset { x: po.x + 8, y: po.y },
    8,
    16,
    whole.mv,
    SUB_REFINE_RANGE,
    lambda,
  );
  let cost_8x16 = left.cost.saturating_add(right.cost).saturating_add(lambda);

  let mut minors = [MinorShape::S8x8; 4];
  let mut quadrant_mvs = [[MotionVector::ZERO; 4]; 4];
  let mut cost_split = lambda;
  for q in 0..4 {
    let qpo = PlaneOffset { x: po.x + 8 * (q & 1), y: po.y + 8 * (q >> 1) };
    let (minor, mvs, cost) =
      decide_quadrant(org, reference, qpo, whole.mv, lambda);
    minors[q] = minor;
    quadrant_mvs[q] = mvs;
    cost_split = cost_split.saturating_add(cost);
  }

  let mut slots = [MotionVector::ZERO; MVS_PER_MB];
  let (major, cost) = {
    let mut best = (MajorShape::M16x16, whole.cost);
    if cost_16x8 < best.1 {
      best = (MajorShape::M16x8, cost_16x8);
    }
    if cost_8x16 < best.1 {
      best = (MajorShape::M8x16, cost_8x16);
    }
    if cost_split < best.1 {
      best = (MajorShape::Split8x8, cost_split);
    }
    best
  };

  match major {
    MajorShape::M16x16 => {
      slots[0] = whole.mv;
    }
    MajorShape::M16x8 => {
      slots[0] = top.mv;
      slots[8] = bottom.mv;
    }
    MajorShape::M8x16 => {
      slots[0] = left.mv;
      slots[8] = right.mv;
    }
    MajorShape::Split8x8 => {
      for q in 0..4 {
        let base = 4 * q;
        match minors[q] {
          MinorShape::S8x8 => slots[base] = quadrant_mvs[q][0],
          MinorShape::S8x4 | MinorShape::S4x8 => {
            slots[base] = quadrant_mvs[q][0];
            slots[base + 2] = quadrant_mvs[q][2];
          }
          MinorShape::S4x4 => {
            slots[base..base + 4].copy_from_slice(&quadrant_mvs[q]);
          }
        }
      }
    }
  }

  let minors = if major == MajorShape::Split8x8 {
    minors
  } else {
    [MinorShape::S8x8; 4]
  };

  (InterShape { major, minors }, slots, cost)
}

fn decide_mb(
  org: &Plane, reference: Option<&Plane>, seed: MotionVector,
  mb_x: usize, mb_y: usize, lambda: u32, enable_intra: bool,
) -> MbDecision {
  let po = clamp_block_origin(
    PlaneOffset { x: mb_x * 16, y: mb_y * 16 },
    org,
    16,
    16,
  );

  let (inter_shape, mvs, inter_cost) = match reference {
    Some(reference) => decide_inter(org, reference, po, seed, lambda),
    None => (InterShape::WHOLE, [MotionVector::ZERO; MVS_PER_MB], u32::MAX),
  };

  let intra = if enable_intra {
    let result = search_intra(org, mb_x, mb_y, lambda);
    Some((result.modes, result.cost))
  } else {
    None
  };

  MbDecision { mvs, inter_shape, inter_cost, intra }
}

/// Decides every macroblock of a frame. `reference` is absent for the
/// first frame, which then codes everything intra. Each macroblock's
/// search is seeded from the finest tier's predictor at its position.
pub fn decide_modes(
  org: &Plane, reference: Option<&Plane>, predictors: &[MotionVector],
  geometry: &PredictorGeometry, width: usize, height: usize, lambda: u32,
  enable_intra: bool,
) -> ModeDecision {
  let mut decision = ModeDecision::new(width, height);
  let finest = geometry.finest();
  let mb_count = decision.mb_cols * decision.mb_rows;
  let mb_cols = decision.mb_cols;

  let results: Vec<MbDecision> = (0..mb_count)
    .into_par_iter()
    .map(|idx| {
      let mb_x = idx % mb_cols;
      let mb_y = idx / mb_cols;
      let seed = if reference.is_some() {
        predictors[finest.pred_index(mb_x, mb_y)].scale_up()
      } else {
        MotionVector::ZERO
      };
      decide_mb(org, reference, seed, mb_x, mb_y, lambda, enable_intra)
    })
    .collect();

  for (idx, mb) in results.into_iter().enumerate() {
    decision.mvs[idx * MVS_PER_MB..(idx + 1) * MVS_PER_MB]
      .copy_from_slice(&mb.mvs);
    decision.inter_shapes[idx] = mb.inter_shape.pack();
    decision.inter_residuals[idx] = if mb.inter_cost == u32::MAX {
      RESIDUAL_NOT_COMPUTED
    } else {
      saturate(mb.inter_cost)
    };
    if let Some((modes, cost)) = mb.intra {
      decision.intra_shapes[idx] = modes.shape_code();
      decision.intra_modes[idx] = modes.pack();
      decision.intra_residuals[idx] = saturate(cost);
    }
  }

  decision
}
