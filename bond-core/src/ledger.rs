//! Bonding state machine
//!
//! Orchestrates Bond / Unbond / CompleteUnbonding across the deposit
//! records, the unbonding queue and the pools, enforcing the ledger's
//! invariants and firing lifecycle hooks.
//!
//! # Ordering discipline
//!
//! Every operation performs its user-shaped checks before its first write,
//! so a rejected call leaves no partially-applied mutations; there is no
//! rollback log.

use chrono::{DateTime, Utc};

use bond_store::Store;

use crate::bank::BankAdapter;
use crate::hooks::{BondHooks, MultiBondHooks};
use crate::params::Params;
use crate::types::{AccountBondState, AccountId, Deposit, Tick, TokenSource, Tokens, UnbondingDeposit};
use crate::{Error, Result};

/// Per-owner result of a maturity sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    /// Account the sweep settled (or tried to)
    pub owner: AccountId,
    /// Tokens released, or the isolated failure
    pub result: Result<Tokens>,
}

/// The deterministic bonding ledger.
///
/// Single-threaded cooperative: every operation runs to completion within
/// one logical tick, and time only enters through [`Tick`] / `as_of`
/// arguments; the core never reads a wall clock.
#[derive(Debug)]
pub struct BondingLedger<S: Store, B: BankAdapter> {
    pub(crate) store: S,
    pub(crate) bank: B,
    pub(crate) params: Params,
    pub(crate) hooks: MultiBondHooks,
}

impl<S: Store, B: BankAdapter> BondingLedger<S, B> {
    /// Create a ledger over the given store and coin-transfer capability.
    ///
    /// Observers are fixed at construction and notified in registration
    /// order for the lifetime of the ledger.
    pub fn new(
        store: S,
        bank: B,
        params: Params,
        observers: Vec<Box<dyn BondHooks>>,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            store,
            bank,
            params,
            hooks: MultiBondHooks::new(observers),
        })
    }

    /// Current parameters
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Replace parameters out of band
    pub fn set_params(&mut self, params: Params) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Unbonding duration
    pub fn unbonding_time(&self) -> chrono::Duration {
        self.params.unbonding_time()
    }

    /// Per-account unbonding entry bound
    pub fn max_entries(&self) -> u16 {
        self.params.max_entries
    }

    /// Name of the pool holding bonded tokens
    pub fn bonded_pool_name(&self) -> &str {
        &self.params.bonded_pool_name
    }

    /// Name of the pool holding not-bonded tokens
    pub fn not_bonded_pool_name(&self) -> &str {
        &self.params.not_bonded_pool_name
    }

    /// Read-only view of the coin-transfer capability
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Read-only view of the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Bonding state of an account, derived from record presence
    pub fn account_state(&self, owner: &AccountId) -> Result<AccountBondState> {
        if self.get_unbonding_deposit(owner)?.is_some() {
            return Ok(AccountBondState::PartiallyUnbonding);
        }
        if self.get_deposit(owner)?.is_some() {
            Ok(AccountBondState::Bonded)
        } else {
            Ok(AccountBondState::Unbonded)
        }
    }

    /// Bond `amount` tokens for `owner`.
    ///
    /// With `debit_account`, the tokens are pulled from the owner's
    /// spendable balance into the bonded pool; `source` must not be
    /// [`TokenSource::Bonded`] on that path. Otherwise an Unbonded or
    /// Unbonding source moves the amount from the not-bonded pool to the
    /// bonded pool.
    pub fn bond(
        &mut self,
        owner: &AccountId,
        amount: Tokens,
        source: TokenSource,
        debit_account: bool,
    ) -> Result<Deposit> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }

        let existing = self.get_deposit(owner)?;
        match existing {
            Some(_) => self.hooks.before_deposit_tokens_modified(owner),
            None => self.hooks.before_deposit_created(owner),
        }

        if debit_account {
            if source == TokenSource::Bonded {
                return Err(Error::InvariantViolation(
                    "bond token source cannot be bonded when debiting the account".to_string(),
                ));
            }
            let denom = self.bond_denom();
            let pool = self.params.bonded_pool_name.clone();
            self.bank.debit_account(owner, &pool, &denom, amount)?;
        } else if matches!(source, TokenSource::Unbonded | TokenSource::Unbonding) {
            self.not_bonded_to_bonded(amount)?;
        }

        let mut deposit =
            existing.unwrap_or_else(|| Deposit::new(owner.clone(), Tokens::zero()));
        deposit.tokens = deposit
            .tokens
            .checked_add(amount)
            .ok_or(Error::ArithmeticOverflow)?;
        self.set_deposit(&deposit)?;

        self.hooks.after_deposit_modified(owner);

        tracing::debug!(depositor = %owner, amount = %amount, "bonded tokens");
        Ok(deposit)
    }

    /// Unbond `amount` tokens for `owner`, scheduling their return at
    /// `tick.time + unbonding_time`.
    ///
    /// Returns the completion time of the new unbonding entry.
    pub fn unbond(
        &mut self,
        tick: &Tick,
        owner: &AccountId,
        amount: Tokens,
    ) -> Result<DateTime<Utc>> {
        if amount.is_zero() {
            return Err(Error::ZeroAmount);
        }
        if self.has_max_unbonding_entries(owner)? {
            return Err(Error::MaxUnbondingEntries);
        }

        let mut deposit = self.get_deposit(owner)?.ok_or(Error::NoDeposit)?;
        let remaining =
            deposit
                .tokens
                .checked_sub(amount)
                .ok_or(Error::InsufficientDepositTokens {
                    available: deposit.tokens,
                })?;

        self.hooks.before_deposit_tokens_modified(owner);

        deposit.tokens = remaining;
        if deposit.tokens.is_zero() {
            self.remove_deposit(&deposit)?;
        } else {
            self.set_deposit(&deposit)?;
            self.hooks.after_deposit_modified(owner);
        }

        self.bonded_to_not_bonded(amount)?;

        let completion_time = tick.time + self.params.unbonding_time();
        self.push_unbonding_entry(owner, tick.height, completion_time, amount)?;
        self.insert_unbonding_queue(owner, completion_time)?;

        tracing::debug!(
            depositor = %owner,
            amount = %amount,
            completion_time = %completion_time,
            "started unbonding"
        );
        Ok(completion_time)
    }

    /// Complete every matured entry of `owner`'s unbonding record as of
    /// `as_of`, crediting the matured total back to the owner's spendable
    /// balance in a single transfer.
    ///
    /// Returns the released total; zero-balance entries are removed
    /// without a transfer. A collaborator failure leaves every record
    /// untouched.
    pub fn complete_unbonding(&mut self, owner: &AccountId, as_of: DateTime<Utc>) -> Result<Tokens> {
        let ubd = self
            .get_unbonding_deposit(owner)?
            .ok_or(Error::NoUnbondingDeposit)?;

        let mut released = Tokens::zero();
        let mut remaining = Vec::with_capacity(ubd.entries.len());
        for entry in &ubd.entries {
            if entry.is_mature(as_of) {
                released = released
                    .checked_add(entry.balance)
                    .ok_or(Error::ArithmeticOverflow)?;
            } else {
                remaining.push(entry.clone());
            }
        }

        if !released.is_zero() {
            let denom = self.bond_denom();
            let pool = self.params.not_bonded_pool_name.clone();
            self.bank.credit_account(owner, &pool, &denom, released)?;
        }

        if remaining.is_empty() {
            self.remove_unbonding_deposit(owner)?;
        } else {
            self.set_unbonding_deposit(&UnbondingDeposit {
                owner: owner.clone(),
                entries: remaining,
            })?;
        }

        tracing::debug!(depositor = %owner, released = %released, "completed unbonding");
        Ok(released)
    }

    /// Release every unbonding entry matured as of `as_of`.
    ///
    /// Driven once per tick by the external scheduler. Owners are settled
    /// in bucket-key ascending order, then insertion order within a
    /// bucket. A failure for one owner is logged and reported in its
    /// outcome without aborting the sweep for the rest.
    pub fn sweep_matured(&mut self, as_of: DateTime<Utc>) -> Result<Vec<SweepOutcome>> {
        let owners = self.dequeue_matured(as_of)?;
        let mut outcomes = Vec::with_capacity(owners.len());

        for owner in owners {
            let result = match self.complete_unbonding(&owner, as_of) {
                // the record is gone when an earlier bucket in this sweep
                // already settled every entry for this owner
                Err(Error::NoUnbondingDeposit) => Ok(Tokens::zero()),
                other => other,
            };
            if let Err(err) = &result {
                tracing::warn!(
                    depositor = %owner,
                    error = %err,
                    "failed to complete unbonding, continuing sweep"
                );
            }
            outcomes.push(SweepOutcome { owner, result });
        }

        Ok(outcomes)
    }

    /// Audit token conservation: the sum of all deposit balances and
    /// pending unbonding balances must equal the combined pool holdings.
    pub fn verify_conservation(&self) -> Result<()> {
        let mut expected = Tokens::zero();

        for deposit in self.iterate_deposits()? {
            let deposit = deposit?;
            expected = expected
                .checked_add(deposit.tokens)
                .ok_or(Error::ArithmeticOverflow)?;
        }
        for ubd in self.iterate_unbonding_deposits()? {
            let ubd = ubd?;
            for entry in &ubd.entries {
                expected = expected
                    .checked_add(entry.balance)
                    .ok_or(Error::ArithmeticOverflow)?;
            }
        }

        let pools = self
            .bonded_total()
            .checked_add(self.not_bonded_total())
            .ok_or(Error::ArithmeticOverflow)?;

        if expected != pools {
            return Err(Error::InvariantViolation(format!(
                "deposits plus unbonding balances ({}) do not match pool holdings ({})",
                expected, pools
            )));
        }
        Ok(())
    }
}
