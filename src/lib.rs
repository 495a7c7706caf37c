#![allow(clippy::arithmetic_side_effects)]
#![deny(missing_docs)]

//! An issuance and redemption engine for a fungible unit priced on a cubic
//! bonding curve.
//!
//! The issuer is always the counterparty: holders buy units by depositing
//! value and sell units back for a payout computed from the current supply.
//! There is no order book and no oracle; the unit price is a deterministic
//! function of outstanding supply, evaluated in exact integer arithmetic.

pub mod curve;
pub mod error;
pub mod issuer;
pub mod ledger;

pub use crate::{
    curve::{cubic, root::integer_nth_root},
    error::IssuerError,
    issuer::{CurveIssuer, IssuerConfig, IssuerEvent},
    ledger::{AccountId, MemoryLedger, UnitLedger},
};
