//! Error types for the bonding ledger

use thiserror::Error;

use crate::bank::BankError;
use crate::types::Tokens;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Bonding ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Amount must be greater than zero
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// No deposit record for this account
    #[error("no deposit for this account")]
    NoDeposit,

    /// Requested more tokens than the deposit holds
    #[error("not enough deposit tokens, only have {available}")]
    InsufficientDepositTokens {
        /// Tokens currently held by the deposit
        available: Tokens,
    },

    /// Per-account unbonding entry limit reached
    #[error("too many unbonding entries for this account, wait for some to mature")]
    MaxUnbondingEntries,

    /// No unbonding record for this account
    #[error("no unbonding deposit found")]
    NoUnbondingDeposit,

    /// A named pool cannot cover a transfer it must always be able to cover.
    /// Indicates a bug in a caller, never user input.
    #[error("pool {pool} has insufficient funds: {source}")]
    InsufficientPoolFunds {
        /// The pool that came up short
        pool: String,
        /// Underlying bank failure
        source: BankError,
    },

    /// Invariant violation (token conservation, etc.)
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Balance arithmetic exceeded the token range
    #[error("token arithmetic overflow")]
    ArithmeticOverflow,

    /// Transfer rejected by the external coin-transfer capability
    #[error("transfer failed: {0}")]
    Transfer(#[from] BankError),

    /// Storage error
    #[error("storage error: {0}")]
    Store(#[from] bond_store::StoreError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
