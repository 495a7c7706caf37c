// SPDX-License-Identifier: AGPL-3.0-only

//! Error types

use num_derive::{FromPrimitive, ToPrimitive};
use thiserror::Error;

/// Errors that may be returned by the curve math or the issuance engine.
///
/// Every failure is atomic: when an operation returns one of these, the
/// supply, the unit balances, and the value reserve are exactly as they
/// were before the call.
#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq, ToPrimitive)]
pub enum IssuerError {
    /// A buy was requested for zero units.
    #[error("Requested amount is zero")]
    ZeroAmount,
    /// A buy was requested for more units than the per-call maximum.
    #[error("Requested amount exceeds the per-call maximum")]
    AmountTooHigh,
    /// No value was attached, or the attached value is below the curve price.
    #[error("Deposited value does not cover the curve price")]
    InsufficientFunds,
    /// The seller's unit balance is smaller than the amount being redeemed.
    #[error("Unit balance too low for redemption")]
    InsufficientAmount,
    /// Minting the requested amount would push supply past the ceiling.
    #[error("Supply ceiling reached")]
    SupplyCeilingReached,
    /// The deposited value truncates to fewer than zero additional units.
    ///
    /// Only reachable through the truncating division inside the inverse
    /// curve; callers passing values at or above one scale unit per unit of
    /// price never see this.
    #[error("Value below the minimum priceable increment")]
    BelowMinimum,
    /// An intermediate curve term exceeded the representable width.
    #[error("Arithmetic overflow in curve computation")]
    Overflow,
    /// A buy or sell was re-entered while another one was in flight.
    #[error("Reentrant call rejected")]
    ReentrantCall,
    /// The collaborating ledger refused an outbound value transfer.
    #[error("Outbound value transfer failed")]
    ValueTransferFailed,
}
