//! Core types for the bonding ledger
//!
//! All stored types are designed for:
//! - Deterministic serialization (bincode)
//! - Checked arithmetic (no silent overflow or negative balances)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key bytes for store lookups
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token denomination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Denom(String);

impl Denom {
    /// Create new denomination
    pub fn new(denom: impl Into<String>) -> Self {
        Self(denom.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Denom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token amount
///
/// Unsigned 128-bit count of base units. All arithmetic is checked:
/// overflow and subtraction below zero are surfaced to the caller, never
/// wrapped or saturated.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tokens(u128);

impl Tokens {
    /// Zero tokens
    pub const ZERO: Tokens = Tokens(0);

    /// Create from a base-unit count
    pub fn new(amount: u128) -> Self {
        Self(amount)
    }

    /// Zero tokens
    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Base-unit count
    pub fn value(&self) -> u128 {
        self.0
    }

    /// True for a zero amount
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, rhs: Tokens) -> Option<Tokens> {
        self.0.checked_add(rhs.0).map(Tokens)
    }

    /// Checked subtraction; `None` when the result would go negative
    pub fn checked_sub(self, rhs: Tokens) -> Option<Tokens> {
        self.0.checked_sub(rhs.0).map(Tokens)
    }
}

impl From<u128> for Tokens {
    fn from(amount: u128) -> Self {
        Self(amount)
    }
}

impl From<u64> for Tokens {
    fn from(amount: u64) -> Self {
        Self(amount as u128)
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bond status of tokens arriving in a bond operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenSource {
    /// Tokens are liquid / not bonded
    Unbonded,
    /// Tokens are held against a pending unbonding entry
    Unbonding,
    /// Tokens are already bonded
    Bonded,
}

/// One discrete step of the external deterministic scheduler.
///
/// Time is data: every operation that needs a clock receives it here,
/// and the caller guarantees monotonic non-decreasing values across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Tick height (e.g. consensus round)
    pub height: i64,
    /// Tick time
    pub time: DateTime<Utc>,
}

impl Tick {
    /// Create a new tick
    pub fn new(height: i64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }
}

/// Tokens bonded by a single account.
///
/// One record per account that has ever bonded; deleted when `tokens`
/// reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    /// Owning account
    pub owner: AccountId,
    /// Bonded token balance
    pub tokens: Tokens,
}

impl Deposit {
    /// Create a new deposit record
    pub fn new(owner: AccountId, tokens: Tokens) -> Self {
        Self { owner, tokens }
    }
}

/// A single in-flight withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingEntry {
    /// Tick height at which the unbonding was requested
    pub creation_height: i64,
    /// Time at which the entry matures
    pub completion_time: DateTime<Utc>,
    /// Tokens scheduled at creation
    pub initial_balance: Tokens,
    /// Tokens returned to liquid balance at completion; `<= initial_balance`
    pub balance: Tokens,
}

impl UnbondingEntry {
    /// Create a new entry; balance starts equal to the scheduled amount
    pub fn new(creation_height: i64, completion_time: DateTime<Utc>, balance: Tokens) -> Self {
        Self {
            creation_height,
            completion_time,
            initial_balance: balance,
            balance,
        }
    }

    /// Whether the entry has matured at `at` (completion time not after `at`)
    pub fn is_mature(&self, at: DateTime<Utc>) -> bool {
        self.completion_time <= at
    }
}

/// All in-flight withdrawals of a single account, in creation order.
///
/// Exists iff `entries` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondingDeposit {
    /// Owning account
    pub owner: AccountId,
    /// Pending entries, insertion order = creation order
    pub entries: Vec<UnbondingEntry>,
}

impl UnbondingDeposit {
    /// Create a record with its first entry
    pub fn new(
        owner: AccountId,
        creation_height: i64,
        completion_time: DateTime<Utc>,
        balance: Tokens,
    ) -> Self {
        Self {
            owner,
            entries: vec![UnbondingEntry::new(creation_height, completion_time, balance)],
        }
    }

    /// Append an entry
    pub fn add_entry(
        &mut self,
        creation_height: i64,
        completion_time: DateTime<Utc>,
        balance: Tokens,
    ) {
        self.entries
            .push(UnbondingEntry::new(creation_height, completion_time, balance));
    }
}

/// Snapshot of the bonded / not-bonded token split, for queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Tokens in transit back to liquidity
    pub not_bonded_tokens: Tokens,
    /// Tokens currently committed
    pub bonded_tokens: Tokens,
}

/// Bonding state of an account, derived from record presence.
///
/// Never stored; recomputed from the deposit and unbonding records so it
/// cannot desynchronize from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountBondState {
    /// No deposit, no unbonding record
    Unbonded,
    /// Deposit exists, nothing unbonding
    Bonded,
    /// Unbonding record is non-empty; a deposit may or may not remain
    PartiallyUnbonding,
}
