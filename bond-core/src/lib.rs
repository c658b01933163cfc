//! BondRail Bonding Core
//!
//! Deterministic bonding ledger: per-account tokens move from a liquid
//! pool into a bonded pool, come back out through time-delayed unbonding
//! entries, and matured entries are swept back to liquid balance once per
//! tick.
//!
//! # Architecture
//!
//! - **Time is data**: every operation receives its tick / as-of time;
//!   the core never reads a wall clock
//! - **Single writer**: all transitions are synchronous and run to
//!   completion within one tick; same operations, same state, bit for bit
//! - **Narrow collaborators**: storage ([`bond_store::Store`]) and coin
//!   movement ([`BankAdapter`]) are injected capabilities
//! - **Derived state**: an account's bonding state is a function of record
//!   presence, never a stored tag
//!
//! # Invariants
//!
//! - Token conservation: Σ(deposits) + Σ(unbonding balances) == pool holdings
//! - Bounded queues: at most `max_entries` unbonding entries per account
//! - Checks before writes: a rejected operation mutates nothing
//! - No negative balances: amounts are unsigned and arithmetic is checked

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod bank;
pub mod deposits;
pub mod error;
pub mod genesis;
pub mod hooks;
pub mod keys;
pub mod ledger;
pub mod params;
pub mod pool;
pub mod queue;
pub mod types;

// Re-exports
pub use bank::{BankAdapter, BankError, MemoryBank};
pub use error::{Error, Result};
pub use genesis::GenesisState;
pub use hooks::{BondHooks, MultiBondHooks};
pub use ledger::{BondingLedger, SweepOutcome};
pub use params::Params;
pub use types::{
    AccountBondState, AccountId, Denom, Deposit, Pool, Tick, TokenSource, Tokens, UnbondingDeposit,
    UnbondingEntry,
};
