// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Intra prediction and the per-macroblock intra mode search.
//!
//! Prediction always reads neighbor samples from the source plane. Border
//! samples outside the picture take the neutral value 128, so every mode
//! can be evaluated for every block.

use crate::me::clamp_block_origin;
use crate::partition::IntraModes;
use crate::plane::{Plane, PlaneOffset};

/// 16x16 luma modes.
pub mod mode16 {
  pub const VERTICAL: u8 = 0;
  pub const HORIZONTAL: u8 = 1;
  pub const DC: u8 = 2;
  pub const PLANE: u8 = 3;
}

/// 8x8 and 4x4 luma modes.
pub mod mode_sub {
  pub const VERTICAL: u8 = 0;
  pub const HORIZONTAL: u8 = 1;
  pub const DC: u8 = 2;
  pub const DIAG_DOWN_LEFT: u8 = 3;
  pub const DIAG_DOWN_RIGHT: u8 = 4;
}

const NEUTRAL: u8 = 128;

/// Winning intra configuration for one macroblock.
#[derive(Clone, Debug)]
pub struct IntraResult {
  pub modes: IntraModes,
  pub cost: u32,
}

/// Neighbor samples of one block: the row above (extended to twice the
/// block width for the down-left diagonal), the column to the left, and
/// the corner.
struct Neighbors {
  above: [u8; 32],
  left: [u8; 16],
  above_left: u8,
}

fn gather_neighbors(src: &Plane, x0: usize, y0: usize, n: usize) -> Neighbors {
  let last_col = src.cfg.stride - 1;
  let mut neighbors = Neighbors {
    above: [NEUTRAL; 32],
    left: [NEUTRAL; 16],
    above_left: NEUTRAL,
  };

  if y0 > 0 {
    for i in 0..2 * n {
      neighbors.above[i] = src.p((x0 + i).min(last_col), y0 - 1);
    }
  }
  if x0 > 0 {
    for (j, l) in neighbors.left[..n].iter_mut().enumerate() {
      *l = src.p(x0 - 1, y0 + j);
    }
  }
  if x0 > 0 && y0 > 0 {
    neighbors.above_left = src.p(x0 - 1, y0 - 1);
  }

  neighbors
}

fn pred_vertical(output: &mut [u8], n: usize, above: &[u8]) {
  for row in output.chunks_exact_mut(n) {
    row.copy_from_slice(&above[..n]);
  }
}

fn pred_horizontal(output: &mut [u8], n: usize, left: &[u8]) {
  for (row, &l) in output.chunks_exact_mut(n).zip(left.iter()) {
    row.fill(l);
  }
}

fn pred_dc(output: &mut [u8], n: usize, above: &[u8], left: &[u8]) {
  let sum: u32 = above[..n]
    .iter()
    .chain(left[..n].iter())
    .map(|&v| u32::from(v))
    .sum();
  let dc = ((sum + n as u32) / (2 * n as u32)) as u8;
  output.fill(dc);
}

/// 16x16 plane mode: a linear ramp fitted to the border samples.
fn pred_plane(output: &mut [u8], nb: &Neighbors) {
  let sample = |v: u8| i32::from(v);

  let mut h = 0i32;
  let mut v = 0i32;
  for i in 0..8i32 {
    let far_above =
      if i == 7 { sample(nb.above_left) } else { sample(nb.above[(6 - i) as usize]) };
    h += (i + 1) * (sample(nb.above[(8 + i) as usize]) - far_above);
    let far_left =
      if i == 7 { sample(nb.above_left) } else { sample(nb.left[(6 - i) as usize]) };
    v += (i + 1) * (sample(nb.left[(8 + i) as usize]) - far_left);
  }

  let a = 16 * (sample(nb.left[15]) + sample(nb.above[15]));
  let b = (5 * h + 32) >> 6;
  let c = (5 * v + 32) >> 6;

  for y in 0..16i32 {
    for x in 0..16i32 {
      let p = (a + b * (x - 7) + c * (y - 7) + 16) >> 5;
      output[(y * 16 + x) as usize] = p.clamp(0, 255) as u8;
    }
  }
}

fn pred_diag_down_left(output: &mut [u8], n: usize, above: &[u8]) {
  for y in 0..n {
    for x in 0..n {
      let i = x + y;
      output[y * n + x] = if i == 2 * n - 2 {
        ((u16::from(above[i]) + 3 * u16::from(above[i + 1]) + 2) >> 2) as u8
      } else {
        ((u16::from(above[i])
          + 2 * u16::from(above[i + 1])
          + u16::from(above[i + 2])
          + 2)
          >> 2) as u8
      };
    }
  }
}

fn pred_diag_down_right(output: &mut [u8], n: usize, nb: &Neighbors) {
  // Unified border: left column reversed, the corner, then the above row.
  let mut edge = [NEUTRAL; 33];
  for j in 0..n {
    edge[n - 1 - j] = nb.left[j];
  }
  edge[n] = nb.above_left;
  edge[n + 1..n + 1 + n].copy_from_slice(&nb.above[..n]);

  for y in 0..n {
    for x in 0..n {
      let k = n + x - y;
      output[y * n + x] = ((u16::from(edge[k - 1])
        + 2 * u16::from(edge[k])
        + u16::from(edge[k + 1])
        + 2)
        >> 2) as u8;
    }
  }
}

fn predict_into(
  output: &mut [u8], n: usize, mode: u8, nb: &Neighbors, is_16x16: bool,
) {
  if is_16x16 {
    match mode {
      mode16::VERTICAL => pred_vertical(output, n, &nb.above),
      mode16::HORIZONTAL => pred_horizontal(output, n, &nb.left),
      mode16::DC => pred_dc(output, n, &nb.above, &nb.left),
      _ => pred_plane(output, nb),
    }
  } else {
    match mode {
      mode_sub::VERTICAL => pred_vertical(output, n, &nb.above),
      mode_sub::HORIZONTAL => pred_horizontal(output, n, &nb.left),
      mode_sub::DC => pred_dc(output, n, &nb.above, &nb.left),
      mode_sub::DIAG_DOWN_LEFT => pred_diag_down_left(output, n, &nb.above),
      _ => pred_diag_down_right(output, n, nb),
    }
  }
}

fn block_sad(src: &Plane, x0: usize, y0: usize, n: usize, pred: &[u8]) -> u32 {
  let mut sad = 0u32;
  for y in 0..n {
    let row = &src.row(y0 + y)[x0..x0 + n];
    for x in 0..n {
      sad += u32::from(row[x].abs_diff(pred[y * n + x]));
    }
  }
  sad
}

/// Evaluates every mode of one block and returns the winner. Ties keep the
/// lower mode number.
fn best_mode(
  src: &Plane, x0: usize, y0: usize, n: usize, modes: u8, is_16x16: bool,
) -> (u8, u32) {
  let nb = gather_neighbors(src, x0, y0, n);
  let mut pred = [0u8; 256];
  let mut best = (0u8, u32::MAX);

  for mode in 0..modes {
    predict_into(&mut pred[..n * n], n, mode, &nb, is_16x16);
    let sad = block_sad(src, x0, y0, n, &pred[..n * n]);
    if sad < best.1 {
      best = (mode, sad);
    }
  }

  best
}

/// Full intra search for one macroblock: the best mode at each of the
/// three granularities, then the granularity with the lowest total cost.
/// Finer granularities pay a larger signaling charge per block. Ties go to
/// the coarser granularity.
pub fn search_intra(
  src: &Plane, mb_x: usize, mb_y: usize, lambda: u32,
) -> IntraResult {
  let po = clamp_block_origin(
    PlaneOffset { x: mb_x * 16, y: mb_y * 16 },
    src,
    16,
    16,
  );

  let (mode_16, sad_16) = best_mode(src, po.x, po.y, 16, 4, true);
  let total_16 = sad_16 + lambda;

  let mut modes_8 = [0u8; 4];
  let mut total_8 = 4 * lambda;
  for (q, m) in modes_8.iter_mut().enumerate() {
    let (mode, sad) =
      best_mode(src, po.x + 8 * (q & 1), po.y + 8 * (q >> 1), 8, 5, false);
    *m = mode;
    total_8 += sad;
  }

  let mut modes_4 = [0u8; 16];
  let mut total_4 = 16 * lambda;
  for (b, m) in modes_4.iter_mut().enumerate() {
    let (mode, sad) =
      best_mode(src, po.x + 4 * (b % 4), po.y + 4 * (b / 4), 4, 5, false);
    *m = mode;
    total_4 += sad;
  }

  if total_16 <= total_8 && total_16 <= total_4 {
    IntraResult { modes: IntraModes::Mode16x16(mode_16), cost: total_16 }
  } else if total_8 <= total_4 {
    IntraResult { modes: IntraModes::Mode8x8(modes_8), cost: total_8 }
  } else {
    IntraResult { modes: IntraModes::Mode4x4(modes_4), cost: total_4 }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn plane_from(f: impl Fn(usize, usize) -> u8, w: usize, h: usize) -> Plane {
    let mut plane = Plane::new(w, h);
    for y in 0..h {
      for x in 0..w {
        plane.row_mut(y)[x] = f(x, y);
      }
    }
    plane.pad();
    plane
  }

  #[test]
  fn vertical_stripes_pick_vertical() {
    // Columns repeat exactly, so vertical prediction from the row above is
    // a perfect match for any block not on the top edge.
    let src = plane_from(|x, _| if x % 2 == 0 { 40 } else { 200 }, 48, 48);
    let (mode, sad) = best_mode(&src, 16, 16, 16, 4, true);
    assert_eq!(mode, mode16::VERTICAL);
    assert_eq!(sad, 0);
  }

  #[test]
  fn horizontal_stripes_pick_horizontal() {
    let src = plane_from(|_, y| if y % 2 == 0 { 40 } else { 200 }, 48, 48);
    let (mode, sad) = best_mode(&src, 16, 16, 8, 5, false);
    assert_eq!(mode, mode_sub::HORIZONTAL);
    assert_eq!(sad, 0);
  }

  #[test]
  fn top_left_block_falls_back_to_neutral_dc() {
    // No neighbors exist at the picture origin. All modes see 128 borders,
    // and DC predicts a flat 128 block.
    let src = plane_from(|_, _| 128, 32, 32);
    let (_, sad) = best_mode(&src, 0, 0, 16, 4, true);
    assert_eq!(sad, 0);
  }

  #[test]
  fn flat_block_costs_favor_coarse_granularity() {
    let src = plane_from(|_, _| 70, 48, 48);
    let result = search_intra(&src, 1, 1, 100);
    assert!(matches!(result.modes, IntraModes::Mode16x16(_)));
    assert_eq!(result.cost, 100);
  }

  #[test]
  fn busy_block_can_prefer_fine_granularity() {
    // Each 4x4 cell is a flat patch of a distinct value, with hard edges
    // every 4 samples. 4x4 prediction nails each patch from its neighbors,
    // while a single 16x16 mode cannot.
    let src = plane_from(|x, y| ((x / 4) * 40 + (y / 4) * 24) as u8, 48, 48);
    let zero_lambda = search_intra(&src, 1, 1, 0);
    let coarse = search_intra(&src, 1, 1, 10_000);
    assert!(zero_lambda.cost <= coarse.cost);
    assert!(matches!(coarse.modes, IntraModes::Mode16x16(_)));
  }

  #[test]
  fn diag_down_left_follows_diagonal() {
    // Content constant along x+y matches the down-left diagonal exactly
    // for interior blocks.
    let src = plane_from(|x, y| (30 + 3 * (x + y)) as u8, 32, 32);
    let (mode, sad) = best_mode(&src, 8, 8, 4, 5, false);
    assert_eq!(mode, mode_sub::DIAG_DOWN_LEFT);
    // The bottom-right sample rounds off the ramp by one.
    assert!(sad <= 1);
  }

  #[test]
  fn diag_down_right_follows_diagonal() {
    // Content constant along x-y matches the down-right diagonal.
    let src = plane_from(|x, y| (120 - 2 * (x as i32) + 2 * y as i32) as u8, 32, 32);
    let (mode, sad) = best_mode(&src, 8, 8, 4, 5, false);
    assert_eq!(sad, 0);
    assert_eq!(mode, mode_sub::DIAG_DOWN_RIGHT);
  }
}
