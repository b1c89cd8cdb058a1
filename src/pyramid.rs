// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Downsampled tier construction for the hierarchical search.

use rayon::prelude::*;

use crate::frame::TIER_FACTORS;
use crate::plane::Plane;

/// Fills the three tier planes from the full-resolution luma. Every tier
/// reads the full-resolution plane directly, so the three downscales are
/// independent and run concurrently.
pub fn build_pyramid(src: &Plane, tiers: &mut [Plane; 3]) {
  let [tier8, tier4, tier2] = tiers;
  rayon::join(
    || downscale_into(src, tier8, TIER_FACTORS[0]),
    || {
      rayon::join(
        || downscale_into(src, tier4, TIER_FACTORS[1]),
        || downscale_into(src, tier2, TIER_FACTORS[2]),
      )
    },
  );
}

/// Box-filter downscale by `factor` in each dimension, with rounding.
/// Source samples past the right and bottom picture edges are clamped to
/// the last valid row or column, then the destination padding is refreshed.
fn downscale_into(src: &Plane, dst: &mut Plane, factor: usize) {
  let dst_width = dst.cfg.width;
  let dst_height = dst.cfg.height;
  let dst_stride = dst.cfg.stride;
  let src_width = src.cfg.width;
  let src_height = src.cfg.height;

  let box_area = (factor * factor) as u32;
  let half_box = box_area / 2;

  dst.data[..dst_height * dst_stride]
    .par_chunks_mut(dst_stride)
    .enumerate()
    .for_each(|(y, dst_row)| {
      for (x, out) in dst_row[..dst_width].iter_mut().enumerate() {
        let mut sum = 0u32;
        for j in 0..factor {
          let src_row = src.row((y * factor + j).min(src_height - 1));
          for i in 0..factor {
            sum += u32::from(src_row[(x * factor + i).min(src_width - 1)]);
          }
        }
        *out = ((sum + half_box) / box_area) as u8;
      }
    });

  dst.pad();
}
