//! Unbonding maturity queue
//!
//! Secondary index over the per-owner unbonding records: one bucket per
//! completion time, holding the accounts with an entry maturing at exactly
//! that time. Buckets are never the source of truth for entry contents.

use chrono::{DateTime, Utc};

use bond_store::Store;

use crate::bank::BankAdapter;
use crate::keys;
use crate::ledger::BondingLedger;
use crate::types::AccountId;
use crate::Result;

impl<S: Store, B: BankAdapter> BondingLedger<S, B> {
    /// Accounts listed in the bucket at exactly `time`
    pub fn queue_time_slice(&self, time: DateTime<Utc>) -> Result<Vec<AccountId>> {
        match self.store.get(&keys::unbonding_queue_key(time))? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn set_queue_time_slice(
        &mut self,
        time: DateTime<Utc>,
        owners: &[AccountId],
    ) -> Result<()> {
        let bytes = bincode::serialize(&owners)?;
        self.store.set(&keys::unbonding_queue_key(time), &bytes)?;
        Ok(())
    }

    /// Index `owner` under `completion_time`.
    ///
    /// Buckets are sets: an owner already listed at that time is not added
    /// again. Insertion order within a bucket is preserved. Completion
    /// times already in the past are legal; the entry is picked up by the
    /// next sweep rather than dropped.
    pub(crate) fn insert_unbonding_queue(
        &mut self,
        owner: &AccountId,
        completion_time: DateTime<Utc>,
    ) -> Result<()> {
        let mut slice = self.queue_time_slice(completion_time)?;
        if !slice.contains(owner) {
            slice.push(owner.clone());
            self.set_queue_time_slice(completion_time, &slice)?;
        }
        Ok(())
    }

    /// Collect and delete every bucket with key `<= as_of` (inclusive).
    ///
    /// Returns the listed accounts in bucket-key ascending order, then
    /// insertion order within a bucket. This ordering is a contract:
    /// earlier-maturing commitments settle first within a single sweep.
    pub(crate) fn dequeue_matured(&mut self, as_of: DateTime<Utc>) -> Result<Vec<AccountId>> {
        let end_key = keys::unbonding_queue_key(as_of);
        let mut matured = Vec::new();
        let mut drained_buckets = Vec::new();

        {
            let iter = self.store.iterate_prefix(&keys::UNBONDING_QUEUE_PREFIX)?;
            for entry in iter {
                let (key, value) = entry?;
                if key > end_key {
                    break;
                }
                let owners: Vec<AccountId> = bincode::deserialize(&value)?;
                matured.extend(owners);
                drained_buckets.push(key);
            }
        }

        for key in drained_buckets {
            self.store.delete(&key)?;
        }

        Ok(matured)
    }
}
