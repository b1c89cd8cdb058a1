// Copyright (c) 2026, the hme contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License. If
// the BSD 2 Clause License was not distributed with this source code in the
// LICENSE file, you can obtain it at
// https://opensource.org/license/bsd-2-clause.

/// Number of `unit`-sized groups needed to cover `x` (ceiling division).
#[inline]
pub const fn align_units(x: usize, unit: usize) -> usize {
  (x + unit - 1) / unit
}

/// `x` rounded up to the next multiple of 16.
#[inline]
pub const fn align16(x: usize) -> usize {
  align_units(x, 16) * 16
}

/// `x` rounded up to the next multiple of 64.
///
/// Dispatch buffers are sized at this granularity.
#[inline]
pub const fn align64(x: usize) -> usize {
  align_units(x, 64) * 64
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn align_units_rounds_up() {
    assert_eq!(align_units(0, 16), 0);
    assert_eq!(align_units(1, 16), 1);
    assert_eq!(align_units(16, 16), 1);
    assert_eq!(align_units(17, 16), 2);
    assert_eq!(align_units(176, 8), 22);
  }

  #[test]
  fn align_multiples() {
    assert_eq!(align16(0), 0);
    assert_eq!(align16(44), 48);
    assert_eq!(align16(48), 48);
    assert_eq!(align64(1), 64);
    assert_eq!(align64(64), 64);
    assert_eq!(align64(99), 128);
  }
}
