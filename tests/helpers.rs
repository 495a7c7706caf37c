// SPDX-License-Identifier: AGPL-3.0-only

//! Shared scenario plumbing for the end-to-end tests.
//!
//! A [`Scenario`] wraps the engine together with a [`MemoryLedger`] and
//! models the transport semantics the engine assumes: a deposit arrives
//! atomically with the call that spends it, and comes back to the sender
//! when that call fails.

#![allow(dead_code)]

use curve_issuer::{AccountId, CurveIssuer, IssuerConfig, IssuerError, MemoryLedger, UnitLedger};

pub const DEFAULT_MAX_BUY: u128 = 100_000;
pub const DEFAULT_CEILING: u128 = 1_000_000;

pub struct Scenario {
    pub issuer: CurveIssuer<MemoryLedger>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_BUY, DEFAULT_CEILING)
    }

    pub fn with_limits(max_buy_amount: u128, supply_ceiling: u128) -> Self {
        let config = IssuerConfig {
            issuer_account: AccountId::new_unique(),
            max_buy_amount,
            supply_ceiling,
        };
        Self {
            issuer: CurveIssuer::new(config, MemoryLedger::new()),
        }
    }

    /// Deposits `value` and buys `amount` for `buyer` in one atomic step.
    pub fn buy(&self, buyer: AccountId, amount: u128, value: u128) -> Result<u128, IssuerError> {
        self.issuer.ledger().deposit(value);
        let result = self.issuer.buy(buyer, amount, value);
        if result.is_err() {
            assert!(self.issuer.ledger().withdraw(value));
        }
        result
    }

    /// Buys `amount` at the exact current curve price.
    pub fn buy_at_cost(&self, buyer: AccountId, amount: u128) -> u128 {
        let cost = self.issuer.calculate_price_for_tokens(amount).unwrap();
        assert_eq!(self.buy(buyer, amount, cost), Ok(cost));
        cost
    }

    /// Sends a raw value deposit, exercising the implicit-buy hook.
    pub fn deposit_value(&self, from: AccountId, value: u128) -> Result<u128, IssuerError> {
        self.issuer.ledger().deposit(value);
        let result = self.issuer.on_value_received(from, value);
        if result.is_err() {
            assert!(self.issuer.ledger().withdraw(value));
        }
        result
    }

    /// Transfers units to the issuer's own account and notifies it,
    /// exercising the implicit-sell hook. Reverts the transfer when the
    /// hook fails, as the external ledger is required to.
    pub fn send_units_to_issuer(
        &self,
        from: AccountId,
        amount: u128,
    ) -> Result<u128, IssuerError> {
        let issuer_account = self.issuer.config().issuer_account;
        self.issuer.ledger().transfer(from, issuer_account, amount)?;
        let result = self.issuer.on_units_received(from, amount);
        if result.is_err() {
            self.issuer
                .ledger()
                .transfer(issuer_account, from, amount)
                .unwrap();
        }
        result
    }
}
