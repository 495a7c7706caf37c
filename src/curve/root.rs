// SPDX-License-Identifier: AGPL-3.0-only

//! Integer n-th root extraction over 256-bit operands.

use spl_math::uint::U256;

/// Returns the greatest integer `y` such that `y^n <= x`.
///
/// `n` must be at least 1. `x == 0` yields 0. The search bracket starts at
/// 1, so the terminal `left - 1` can never underflow; a probe whose `n`-th
/// power overflows 256 bits is treated as lying above `x` and narrows the
/// bracket from the right.
pub fn integer_nth_root(x: U256, n: u32) -> U256 {
    debug_assert!(n >= 1, "root degree must be at least 1");
    if x.is_zero() {
        return U256::zero();
    }
    let exponent = U256::from(n);
    let mut left = U256::one();
    let mut right = x;
    while left <= right {
        // midpoint without overflowing left + right
        let mid = left + ((right - left) >> 1);
        match mid.checked_pow(exponent) {
            Some(power) if power <= x => left = mid + U256::one(),
            _ => right = mid - U256::one(),
        }
    }
    left - U256::one()
}
