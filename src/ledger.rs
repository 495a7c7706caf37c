// SPDX-License-Identifier: AGPL-3.0-only

//! Capability interface to the external fungible-unit ledger.
//!
//! The engine never owns balances; it consumes the ledger through
//! [`UnitLedger`] and mutates only the supply counter it tracks itself.
//! [`MemoryLedger`] is the in-process reference implementation used by the
//! test suite.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::error::IssuerError;

/// Opaque 32-byte account identity assigned by the surrounding ledger.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct AccountId([u8; 32]);

impl AccountId {
    /// Builds an account identity from raw bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns a process-unique account identity.
    pub fn new_unique() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
        Self(bytes)
    }

    /// Raw byte view of the identity.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Operations the engine consumes from the external ledger collaborator.
///
/// Receivers are shared because the engine calls into the ledger while the
/// caller may still hold a reference to the engine; a value or unit
/// transfer is allowed to re-invoke the engine synchronously, and the
/// engine's reentry guard is what rejects it. Implementations use interior
/// mutability.
pub trait UnitLedger {
    /// Current unit balance of `account`.
    fn balance_of(&self, account: AccountId) -> u128;

    /// Creates `amount` units in `account`.
    fn mint(&self, account: AccountId, amount: u128) -> Result<(), IssuerError>;

    /// Destroys `amount` units held by `account`.
    fn burn(&self, account: AccountId, amount: u128) -> Result<(), IssuerError>;

    /// Moves `amount` units between two accounts.
    fn transfer(&self, from: AccountId, to: AccountId, amount: u128) -> Result<(), IssuerError>;

    /// Pays `amount` of collected value out to `to`.
    ///
    /// Returns `false` when the transfer cannot be honored; the engine
    /// treats that as fatal for the in-flight call and unwinds.
    fn transfer_value(&self, to: AccountId, amount: u128) -> bool;
}

/// In-memory unit ledger plus value reserve.
///
/// Tracks unit balances per account, the value the issuer currently holds,
/// and the value credited back to each account through refunds and
/// payouts.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    balances: RefCell<HashMap<AccountId, u128>>,
    reserve: Cell<u128>,
    value_credits: RefCell<HashMap<AccountId, u128>>,
}

impl MemoryLedger {
    /// Creates an empty ledger with no reserve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` arriving in the issuer's reserve alongside a buy.
    pub fn deposit(&self, value: u128) {
        self.reserve.set(self.reserve.get().saturating_add(value));
    }

    /// Removes `value` from the reserve.
    ///
    /// Harnesses use this to model an inbound deposit handed back after a
    /// failed call. Returns `false` when the reserve is short.
    pub fn withdraw(&self, value: u128) -> bool {
        let reserve = self.reserve.get();
        if reserve < value {
            return false;
        }
        self.reserve.set(reserve - value);
        true
    }

    /// Value currently held by the issuer.
    pub fn reserve(&self) -> u128 {
        self.reserve.get()
    }

    /// Total value ever credited back to `account`.
    pub fn value_credited(&self, account: AccountId) -> u128 {
        self.value_credits
            .borrow()
            .get(&account)
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all unit balances.
    pub fn total_units(&self) -> u128 {
        self.balances.borrow().values().sum()
    }
}

impl UnitLedger for MemoryLedger {
    fn balance_of(&self, account: AccountId) -> u128 {
        self.balances.borrow().get(&account).copied().unwrap_or(0)
    }

    fn mint(&self, account: AccountId, amount: u128) -> Result<(), IssuerError> {
        let mut balances = self.balances.borrow_mut();
        let balance = balances.entry(account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(IssuerError::Overflow)?;
        Ok(())
    }

    fn burn(&self, account: AccountId, amount: u128) -> Result<(), IssuerError> {
        let mut balances = self.balances.borrow_mut();
        let balance = balances.entry(account).or_insert(0);
        *balance = balance
            .checked_sub(amount)
            .ok_or(IssuerError::InsufficientAmount)?;
        Ok(())
    }

    fn transfer(&self, from: AccountId, to: AccountId, amount: u128) -> Result<(), IssuerError> {
        self.burn(from, amount)?;
        self.mint(to, amount)
    }

    fn transfer_value(&self, to: AccountId, amount: u128) -> bool {
        let reserve = self.reserve.get();
        if reserve < amount {
            return false;
        }
        self.reserve.set(reserve - amount);
        let mut credits = self.value_credits.borrow_mut();
        let credit = credits.entry(to).or_insert(0);
        *credit = credit.saturating_add(amount);
        true
    }
}
