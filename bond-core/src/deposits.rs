//! Deposit and unbonding-record persistence
//!
//! Pure record plumbing: nothing here enforces pool conservation, that is
//! the state machine's job in [`crate::ledger`].

use bond_store::Store;

use crate::bank::BankAdapter;
use crate::hooks::BondHooks;
use crate::keys;
use crate::ledger::BondingLedger;
use crate::types::{AccountId, Deposit, Tokens, UnbondingDeposit};
use crate::{Error, Result};

impl<S: Store, B: BankAdapter> BondingLedger<S, B> {
    /// Fetch an account's deposit record
    pub fn get_deposit(&self, owner: &AccountId) -> Result<Option<Deposit>> {
        match self.store.get(&keys::deposit_key(owner))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn set_deposit(&mut self, deposit: &Deposit) -> Result<()> {
        let bytes = bincode::serialize(deposit)?;
        self.store.set(&keys::deposit_key(&deposit.owner), &bytes)?;
        Ok(())
    }

    /// Remove a deposit record, notifying observers first
    pub(crate) fn remove_deposit(&mut self, deposit: &Deposit) -> Result<()> {
        self.hooks.before_deposit_removed(&deposit.owner);
        self.store.delete(&keys::deposit_key(&deposit.owner))?;
        Ok(())
    }

    /// Lazily iterate all deposit records, ascending by owner key bytes.
    /// Each call starts a fresh scan.
    pub fn iterate_deposits(
        &self,
    ) -> Result<impl Iterator<Item = Result<Deposit>> + '_> {
        let iter = self.store.iterate_prefix(&keys::DEPOSIT_PREFIX)?;
        Ok(iter.map(|entry| {
            let (_key, value) = entry?;
            Ok(bincode::deserialize(&value)?)
        }))
    }

    /// All deposit records, used by genesis export
    pub fn all_deposits(&self) -> Result<Vec<Deposit>> {
        self.iterate_deposits()?.collect()
    }

    /// Fetch an account's unbonding record
    pub fn get_unbonding_deposit(&self, owner: &AccountId) -> Result<Option<UnbondingDeposit>> {
        match self.store.get(&keys::unbonding_key(owner))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn set_unbonding_deposit(&mut self, ubd: &UnbondingDeposit) -> Result<()> {
        let bytes = bincode::serialize(ubd)?;
        self.store.set(&keys::unbonding_key(&ubd.owner), &bytes)?;
        Ok(())
    }

    pub(crate) fn remove_unbonding_deposit(&mut self, owner: &AccountId) -> Result<()> {
        self.store.delete(&keys::unbonding_key(owner))?;
        Ok(())
    }

    /// Lazily iterate all unbonding records, ascending by owner key bytes
    pub fn iterate_unbonding_deposits(
        &self,
    ) -> Result<impl Iterator<Item = Result<UnbondingDeposit>> + '_> {
        let iter = self.store.iterate_prefix(&keys::UNBONDING_PREFIX)?;
        Ok(iter.map(|entry| {
            let (_key, value) = entry?;
            Ok(bincode::deserialize(&value)?)
        }))
    }

    /// All unbonding records, used by genesis export
    pub fn all_unbonding_deposits(&self) -> Result<Vec<UnbondingDeposit>> {
        self.iterate_unbonding_deposits()?.collect()
    }

    /// Whether the account already carries the maximum number of
    /// unbonding entries
    pub fn has_max_unbonding_entries(&self, owner: &AccountId) -> Result<bool> {
        match self.get_unbonding_deposit(owner)? {
            Some(ubd) => Ok(ubd.entries.len() >= usize::from(self.params().max_entries)),
            None => Ok(false),
        }
    }

    /// Append an unbonding entry, creating the record if absent.
    /// The per-account entry bound is the caller's check.
    pub(crate) fn push_unbonding_entry(
        &mut self,
        owner: &AccountId,
        creation_height: i64,
        completion_time: chrono::DateTime<chrono::Utc>,
        balance: Tokens,
    ) -> Result<UnbondingDeposit> {
        let ubd = match self.get_unbonding_deposit(owner)? {
            Some(mut ubd) => {
                ubd.add_entry(creation_height, completion_time, balance);
                ubd
            }
            None => UnbondingDeposit::new(owner.clone(), creation_height, completion_time, balance),
        };
        self.set_unbonding_deposit(&ubd)?;
        Ok(ubd)
    }

    /// Pre-flight check that `amount` can be unbonded from `owner`
    pub fn validate_unbond_amount(&self, owner: &AccountId, amount: Tokens) -> Result<()> {
        let deposit = self.get_deposit(owner)?.ok_or(Error::NoDeposit)?;
        if amount > deposit.tokens {
            return Err(Error::InsufficientDepositTokens {
                available: deposit.tokens,
            });
        }
        Ok(())
    }
}
