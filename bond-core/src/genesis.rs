//! Genesis import / export
//!
//! State moves in and out as plain data; file framing belongs to the
//! surrounding system. Loading re-derives the maturity queue from the
//! unbonding records, so the index never has to be shipped.

use serde::{Deserialize, Serialize};

use bond_store::Store;

use crate::bank::BankAdapter;
use crate::hooks::BondHooks;
use crate::keys;
use crate::ledger::BondingLedger;
use crate::params::Params;
use crate::types::{Deposit, UnbondingDeposit};
use crate::{Error, Result};

/// All ledger state that must be provided at genesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenesisState {
    /// Module parameters
    pub params: Params,
    /// Deposit records
    pub deposits: Vec<Deposit>,
    /// Unbonding records
    pub unbonding_deposits: Vec<UnbondingDeposit>,
    /// True when this state was exported from a running ledger (observer
    /// notifications are skipped on import)
    pub exported: bool,
}

impl GenesisState {
    /// Fresh genesis with no records
    pub fn new(params: Params) -> Self {
        Self {
            params,
            deposits: Vec::new(),
            unbonding_deposits: Vec::new(),
            exported: false,
        }
    }

    /// Validate the state before import
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;

        for deposit in &self.deposits {
            if deposit.tokens.is_zero() {
                return Err(Error::InvariantViolation(format!(
                    "genesis deposit for {} has zero tokens",
                    deposit.owner
                )));
            }
        }

        for ubd in &self.unbonding_deposits {
            if ubd.entries.is_empty() {
                return Err(Error::InvariantViolation(format!(
                    "genesis unbonding record for {} has no entries",
                    ubd.owner
                )));
            }
            for entry in &ubd.entries {
                if entry.balance > entry.initial_balance {
                    return Err(Error::InvariantViolation(format!(
                        "genesis unbonding entry for {} has balance above its initial balance",
                        ubd.owner
                    )));
                }
            }
        }

        Ok(())
    }
}

impl<S: Store, B: BankAdapter> BondingLedger<S, B> {
    /// Import ledger state, replacing whatever the store holds.
    ///
    /// Deposit observers are notified unless the state was exported from a
    /// running ledger. The maturity queue is rebuilt from the unbonding
    /// entries. Pool balances live behind the coin-transfer capability and
    /// are not touched here.
    pub fn load_state(&mut self, genesis: GenesisState) -> Result<()> {
        genesis.validate()?;

        self.clear_prefix(&keys::DEPOSIT_PREFIX)?;
        self.clear_prefix(&keys::UNBONDING_PREFIX)?;
        self.clear_prefix(&keys::UNBONDING_QUEUE_PREFIX)?;

        self.params = genesis.params;

        for deposit in &genesis.deposits {
            if !genesis.exported {
                self.hooks.before_deposit_created(&deposit.owner);
            }
            self.set_deposit(deposit)?;
            if !genesis.exported {
                self.hooks.after_deposit_modified(&deposit.owner);
            }
        }

        for ubd in &genesis.unbonding_deposits {
            self.set_unbonding_deposit(ubd)?;
            for entry in &ubd.entries {
                self.insert_unbonding_queue(&ubd.owner, entry.completion_time)?;
            }
        }

        tracing::info!(
            deposits = genesis.deposits.len(),
            unbonding = genesis.unbonding_deposits.len(),
            "loaded ledger state"
        );
        Ok(())
    }

    /// Export all ledger state.
    pub fn dump_state(&self) -> Result<GenesisState> {
        Ok(GenesisState {
            params: self.params.clone(),
            deposits: self.all_deposits()?,
            unbonding_deposits: self.all_unbonding_deposits()?,
            exported: true,
        })
    }

    fn clear_prefix(&mut self, prefix: &[u8]) -> Result<()> {
        let keys: Vec<Vec<u8>> = self
            .store
            .iterate_prefix(prefix)?
            .map(|entry| entry.map(|(key, _)| key))
            .collect::<std::result::Result<_, _>>()?;
        for key in keys {
            self.store.delete(&key)?;
        }
        Ok(())
    }
}
