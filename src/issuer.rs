// SPDX-License-Identifier: AGPL-3.0-only

//! Buy/sell state transition over the cubic curve.
//!
//! [`CurveIssuer`] owns the supply counter and nothing else; unit balances
//! live behind the [`UnitLedger`] capability and value moves through it.
//! Every entry point is guarded against reentrancy for its full duration
//! and either commits completely or unwinds completely.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    curve::cubic,
    error::IssuerError,
    ledger::{AccountId, UnitLedger},
};

/// Immutable deployment parameters, fixed at construction.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct IssuerConfig {
    /// The issuer's own account on the external ledger; units transferred
    /// here are redeemed implicitly.
    pub issuer_account: AccountId,
    /// Largest amount a single buy may request.
    pub max_buy_amount: u128,
    /// Hard upper bound on total outstanding supply.
    pub supply_ceiling: u128,
}

/// Observable outcome of a committed transition.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum IssuerEvent {
    /// `account` bought `amount` units.
    Bought {
        /// Buyer account.
        account: AccountId,
        /// Units issued.
        amount: u128,
    },
    /// `account` sold `amount` units.
    Sold {
        /// Beneficiary of the payout.
        account: AccountId,
        /// Units redeemed.
        amount: u128,
    },
}

/// Mutual-exclusion flag held for the duration of a buy or sell.
///
/// Released by `Drop` on every exit path. Acquiring an already-held flag
/// leaves it held (the outer call still owns it) and fails the nested call.
struct ReentryGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> ReentryGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Result<Self, IssuerError> {
        if flag.replace(true) {
            return Err(IssuerError::ReentrantCall);
        }
        Ok(Self { flag })
    }
}

impl Drop for ReentryGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// The issuance/redemption engine.
///
/// Entry points take `&self` deliberately: the collaborating ledger may
/// call back into the engine from within a value or unit transfer, and the
/// reentry guard — not the borrow checker — is the mechanism that rejects
/// the nested call.
pub struct CurveIssuer<L: UnitLedger> {
    config: IssuerConfig,
    ledger: L,
    supply: Cell<u128>,
    entered: Cell<bool>,
    events: RefCell<Vec<IssuerEvent>>,
}

impl<L: UnitLedger> CurveIssuer<L> {
    /// Creates an engine with zero outstanding supply.
    pub fn new(config: IssuerConfig, ledger: L) -> Self {
        Self {
            config,
            ledger,
            supply: Cell::new(0),
            entered: Cell::new(false),
            events: RefCell::new(Vec::new()),
        }
    }

    /// Deployment parameters.
    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    /// The collaborating ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Total outstanding units.
    pub fn supply(&self) -> u128 {
        self.supply.get()
    }

    /// Value required to back the current supply, `price(supply, 0)`.
    pub fn reserve_backing(&self) -> Result<u128, IssuerError> {
        cubic::price_for_tokens(self.supply.get(), 0)
    }

    /// Drains and returns the events recorded since the last call.
    pub fn take_events(&self) -> Vec<IssuerEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// Price of buying `amount` units at the current supply.
    pub fn calculate_price_for_tokens(&self, amount: u128) -> Result<u128, IssuerError> {
        cubic::price_for_tokens(amount, self.supply.get())
    }

    /// Units `value` can buy at the current supply.
    pub fn calculate_tokens_for_price(&self, value: u128) -> Result<u128, IssuerError> {
        cubic::tokens_for_price(value, self.supply.get())
    }

    /// Buys `amount` units for `requester` against `deposited_value`.
    ///
    /// Returns the curve price actually charged; any excess deposit is
    /// refunded through the ledger before the call returns. Fails without
    /// any observable state change on every error path.
    pub fn buy(
        &self,
        requester: AccountId,
        amount: u128,
        deposited_value: u128,
    ) -> Result<u128, IssuerError> {
        let _guard = ReentryGuard::acquire(&self.entered)?;
        if amount == 0 {
            return Err(IssuerError::ZeroAmount);
        }
        if amount > self.config.max_buy_amount {
            return Err(IssuerError::AmountTooHigh);
        }
        if deposited_value == 0 {
            return Err(IssuerError::InsufficientFunds);
        }
        let supply = self.supply.get();
        let cost = cubic::price_for_tokens(amount, supply)?;
        if deposited_value < cost {
            return Err(IssuerError::InsufficientFunds);
        }
        let minted_supply = supply.checked_add(amount).ok_or(IssuerError::Overflow)?;

        // Units are issued before any value moves, so code executing
        // during the refund observes the post-mint supply.
        self.ledger.mint(requester, amount)?;
        self.supply.set(minted_supply);

        if minted_supply > self.config.supply_ceiling {
            self.unwind_mint(requester, amount, supply)?;
            return Err(IssuerError::SupplyCeilingReached);
        }

        let refund = deposited_value - cost;
        if refund > 0 && !self.ledger.transfer_value(requester, refund) {
            self.unwind_mint(requester, amount, supply)?;
            return Err(IssuerError::ValueTransferFailed);
        }

        self.events.borrow_mut().push(IssuerEvent::Bought {
            account: requester,
            amount,
        });
        debug!(account = %requester, amount, cost, supply = minted_supply, "bought");
        Ok(cost)
    }

    /// Redeems `amount` of `requester`'s units for a curve payout.
    ///
    /// The payout is priced at the post-burn supply, the same price a buy
    /// restoring those units would be charged.
    pub fn sell(&self, requester: AccountId, amount: u128) -> Result<u128, IssuerError> {
        let _guard = ReentryGuard::acquire(&self.entered)?;
        if self.ledger.balance_of(requester) < amount {
            return Err(IssuerError::InsufficientAmount);
        }
        self.redeem(requester, requester, amount)
    }

    /// Implicit buy: converts an inbound value deposit into units at the
    /// current supply and routes it through [`Self::buy`] with the exact
    /// deposited value. Returns the amount issued.
    pub fn on_value_received(
        &self,
        from: AccountId,
        deposited_value: u128,
    ) -> Result<u128, IssuerError> {
        let amount = cubic::tokens_for_price(deposited_value, self.supply.get())?;
        self.buy(from, amount, deposited_value)?;
        Ok(amount)
    }

    /// Implicit sell: redeems `amount` units that the external ledger has
    /// already moved into the issuer's own account, paying `from`.
    ///
    /// The ledger invokes this after any unit transfer whose destination is
    /// the issuer; if the call fails, reverting that transfer is the
    /// ledger's responsibility.
    pub fn on_units_received(&self, from: AccountId, amount: u128) -> Result<u128, IssuerError> {
        let _guard = ReentryGuard::acquire(&self.entered)?;
        if self.ledger.balance_of(self.config.issuer_account) < amount {
            return Err(IssuerError::InsufficientAmount);
        }
        self.redeem(self.config.issuer_account, from, amount)
    }

    fn redeem(
        &self,
        holder: AccountId,
        beneficiary: AccountId,
        amount: u128,
    ) -> Result<u128, IssuerError> {
        let supply = self.supply.get();
        let burned_supply = supply
            .checked_sub(amount)
            .ok_or(IssuerError::InsufficientAmount)?;
        let payout = cubic::price_for_tokens(amount, burned_supply)?;

        self.ledger.burn(holder, amount)?;
        self.supply.set(burned_supply);

        if payout > 0 && !self.ledger.transfer_value(beneficiary, payout) {
            self.ledger.mint(holder, amount)?;
            self.supply.set(supply);
            return Err(IssuerError::ValueTransferFailed);
        }

        self.events.borrow_mut().push(IssuerEvent::Sold {
            account: beneficiary,
            amount,
        });
        debug!(account = %beneficiary, amount, payout, supply = burned_supply, "sold");
        Ok(payout)
    }

    fn unwind_mint(
        &self,
        requester: AccountId,
        amount: u128,
        prior_supply: u128,
    ) -> Result<(), IssuerError> {
        self.ledger.burn(requester, amount)?;
        self.supply.set(prior_supply);
        Ok(())
    }
}
