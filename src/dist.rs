// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

use crate::plane::PlaneSlice;

/// Sum of absolute differences between two block windows.
///
/// This is the block-matching cost primitive behind every motion search in
/// the pipeline. Both slices must have `blk_w` x `blk_h` samples of
/// allocated data below and to the right of their anchor.
#[inline]
pub fn get_sad(
  plane_org: &PlaneSlice<'_>, plane_ref: &PlaneSlice<'_>, blk_w: usize,
  blk_h: usize,
) -> u32 {
  let mut sum = 0u32;

  for y in 0..blk_h {
    let slice_org = &plane_org.row(y)[..blk_w];
    let slice_ref = &plane_ref.row(y)[..blk_w];
    sum += slice_org
      .iter()
      .zip(slice_ref)
      .map(|(&a, &b)| (i32::from(a) - i32::from(b)).unsigned_abs())
      .sum::<u32>();
  }

  sum
}
