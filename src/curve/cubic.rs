// SPDX-License-Identifier: AGPL-3.0-only

//! Closed-form integral of the cubic curve and its inverse.
//!
//! The pool value backing a supply `s` is `(s+1)^3 / 3` curve units; the
//! price of moving supply from `s` to `s + a` is the difference of cubes,
//! divided by 3 once (truncating), then scaled into the smallest value
//! denomination. Rounding is always toward zero on both the price and the
//! inverse, favoring the issuer's solvency.

use {crate::error::IssuerError, crate::curve::root::integer_nth_root, spl_math::uint::U256};

/// Number of value units per curve unit.
pub const SCALE: u128 = 1_000_000;

/// Cube of a 256-bit operand, overflow-checked.
fn cube(value: U256) -> Result<U256, IssuerError> {
    value
        .checked_pow(U256::from(3))
        .ok_or(IssuerError::Overflow)
}

fn narrow(value: U256) -> Result<u128, IssuerError> {
    if value > U256::from(u128::MAX) {
        return Err(IssuerError::Overflow);
    }
    Ok(value.as_u128())
}

/// Price of issuing `amount` additional units on top of `supply`.
///
/// Exact under the single truncating division; monotonically non-decreasing
/// in both arguments. Fails with [`IssuerError::Overflow`] when a cube term
/// or the scaled result exceeds the representable width.
pub fn price_for_tokens(amount: u128, supply: u128) -> Result<u128, IssuerError> {
    let lower = U256::from(supply) + U256::one();
    let upper = U256::from(supply) + U256::from(amount) + U256::one();
    let spread = cube(upper)? - cube(lower)?;
    let price = (spread / U256::from(3))
        .checked_mul(U256::from(SCALE))
        .ok_or(IssuerError::Overflow)?;
    narrow(price)
}

/// Number of units `value` can issue at `supply`.
///
/// `value` is truncated toward zero when divided by [`SCALE`]; anything
/// below one scale unit contributes no additional units. Fails with
/// [`IssuerError::BelowMinimum`] if the extracted root falls below
/// `supply + 1`, which the radicand construction makes unreachable for
/// well-formed inputs but is guarded rather than assumed.
pub fn tokens_for_price(value: u128, supply: u128) -> Result<u128, IssuerError> {
    let base = U256::from(supply) + U256::one();
    let radicand = U256::from(value / SCALE)
        .checked_mul(U256::from(3))
        .ok_or(IssuerError::Overflow)?
        .checked_add(cube(base)?)
        .ok_or(IssuerError::Overflow)?;
    let root = integer_nth_root(radicand, 3);
    if root < base {
        return Err(IssuerError::BelowMinimum);
    }
    narrow(root - base)
}
