// SPDX-License-Identifier: AGPL-3.0-only

//! Deterministic pricing math for the cubic bonding curve.

pub mod cubic;
pub mod root;
