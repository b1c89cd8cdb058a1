// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

//! Luma annotation of the per-macroblock decisions: motion vectors drawn
//! from each block center, grid marks for intra macroblocks.

use crate::partition::{unpack_minor_shapes, MinorShape, MotionVector};
use crate::plane::Plane;
use crate::rdo::ModeDecision;

/// Sample value of all overlay marks.
const MARK: u8 = 180;

/// Quarter-sample vector component rounded to whole samples.
#[inline]
fn off(v: i16) -> i32 {
  (i32::from(v) + 2) >> 2
}

/// Writes one sample, silently dropping coordinates outside the picture.
fn draw_pixel(luma: &mut Plane, x: i32, y: i32, value: u8) {
  if x < 0 || x >= luma.cfg.width as i32 || y < 0 || y >= luma.cfg.height as i32
  {
    return;
  }
  luma.row_mut(y as usize)[x as usize] = value;
}

/// Bresenham line from (x0, y0) over the displacement (dx, dy). Endpoints
/// outside the picture are clipped per sample.
fn draw_line(luma: &mut Plane, x0: i32, y0: i32, dx: i32, dy: i32, value: u8) {
  let (mut x0, mut y0) = (x0, y0);
  let mut x1 = x0 + dx;
  let mut y1 = y0 + dy;

  let steep = dy.abs() > dx.abs();
  if steep {
    std::mem::swap(&mut x0, &mut y0);
    std::mem::swap(&mut x1, &mut y1);
  }
  if x0 > x1 {
    std::mem::swap(&mut x0, &mut x1);
    std::mem::swap(&mut y0, &mut y1);
  }

  let delta_x = x1 - x0;
  let delta_y = (y1 - y0).abs();
  let mut error = delta_x / 2;
  let y_step = if y0 < y1 { 1 } else { -1 };

  while x0 <= x1 {
    if steep {
      draw_pixel(luma, y0, x0, value);
    } else {
      draw_pixel(luma, x0, y0, value);
    }
    error -= delta_y;
    if error < 0 {
      y0 += y_step;
      error += delta_x;
    }
    x0 += 1;
  }
}

fn draw_mv(luma: &mut Plane, cx: i32, cy: i32, mv: MotionVector) {
  draw_line(luma, cx, cy, off(mv.x), off(mv.y), MARK);
}

fn draw_inter(
  luma: &mut Plane, decision: &ModeDecision, mb_idx: usize, x0: i32, y0: i32,
) {
  let slots = decision.mv_slots(mb_idx);
  let [major, minors_byte] = decision.inter_shapes[mb_idx];

  match major {
    0 => draw_mv(luma, x0 + 8, y0 + 8, slots[0]),
    1 => {
      draw_mv(luma, x0 + 8, y0 + 4, slots[0]);
      draw_mv(luma, x0 + 8, y0 + 12, slots[8]);
    }
    2 => {
      draw_mv(luma, x0 + 4, y0 + 8, slots[0]);
      draw_mv(luma, x0 + 12, y0 + 8, slots[8]);
    }
    3 => {
      let minors = unpack_minor_shapes(minors_byte);
      for (m, minor) in minors.into_iter().enumerate() {
        let base = 4 * m;
        let qx = x0 + 8 * (m as i32 & 1);
        let qy = y0 + 8 * (m as i32 >> 1);
        match minor {
          MinorShape::S8x8 => draw_mv(luma, qx + 4, qy + 4, slots[base]),
          MinorShape::S8x4 => {
            for n in 0..2 {
              draw_mv(luma, qx + 4, qy + 4 * n + 2, slots[base + 2 * n as usize]);
            }
          }
          MinorShape::S4x8 => {
            for n in 0..2 {
              draw_mv(luma, qx + 4 * n + 2, qy + 4, slots[base + 2 * n as usize]);
            }
          }
          MinorShape::S4x4 => {
            for n in 0..4 {
              draw_mv(
                luma,
                x0 + 4 * (n as i32) + 2,
                y0 + 4 * (m as i32) + 2,
                slots[base + n],
              );
            }
          }
        }
      }
    }
    other => panic!("invalid inter major shape code {other}"),
  }
}

fn draw_intra(luma: &mut Plane, shape: u8, x0: i32, y0: i32) {
  if shape > 2 {
    panic!("invalid intra shape code {shape}");
  }

  // Macroblock outline for every granularity.
  draw_line(luma, x0, y0, 16, 0, MARK);
  draw_line(luma, x0, y0, 0, 16, MARK);
  draw_line(luma, x0 + 16, y0, 0, 16, MARK);
  draw_line(luma, x0, y0 + 16, 16, 0, MARK);

  if shape >= 1 {
    // Halving cross for 8x8 and below.
    draw_line(luma, x0 + 8, y0, 0, 16, MARK);
    draw_line(luma, x0, y0 + 8, 16, 0, MARK);
  }
  if shape == 2 {
    draw_line(luma, x0 + 4, y0, 0, 16, MARK);
    draw_line(luma, x0 + 12, y0, 0, 16, MARK);
    draw_line(luma, x0, y0 + 4, 16, 0, MARK);
    draw_line(luma, x0, y0 + 12, 16, 0, MARK);
  }
}

/// Annotates the luma plane with the decision of every macroblock.
pub fn overlay_decisions(luma: &mut Plane, decision: &ModeDecision) {
  for mb_y in 0..decision.mb_rows {
    for mb_x in 0..decision.mb_cols {
      let mb_idx = decision.mb_index(mb_x, mb_y);
      let x0 = (mb_x * 16) as i32;
      let y0 = (mb_y * 16) as i32;

      if decision.is_intra(mb_idx) {
        draw_intra(luma, decision.intra_shapes[mb_idx], x0, y0);
      } else {
        draw_inter(luma, decision, mb_idx, x0, y0);
      }
    }
  }
}
