//! External coin-transfer capability
//!
//! The ledger never holds coins itself: every token movement goes through a
//! [`BankAdapter`] supplied by the embedder. Pools are named module
//! accounts; the spendable side of a user account lives entirely behind
//! this boundary.
//!
//! [`MemoryBank`] is a conservation-checked in-memory implementation for
//! tests and embedders without a full account model.

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{AccountId, Denom, Tokens};

/// Coin-transfer failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    /// Holder cannot cover the requested amount
    #[error("insufficient funds for {holder}: have {available}, need {required}")]
    InsufficientFunds {
        /// Account or pool that came up short
        holder: String,
        /// Balance currently held
        available: Tokens,
        /// Amount requested
        required: Tokens,
    },

    /// A credit would overflow the holder's balance
    #[error("balance overflow for {holder}")]
    BalanceOverflow {
        /// Account or pool whose balance would overflow
        holder: String,
    },

    /// Any other failure reported by the capability
    #[error("{0}")]
    Other(String),
}

/// Coin-transfer capability consumed by the bonding ledger.
///
/// `debit_account` moves tokens from an account's spendable balance into a
/// pool; `credit_account` is the reverse. Implementations must keep both
/// sides of every transfer consistent (no minting, no burning).
pub trait BankAdapter {
    /// Move `amount` of `denom` between two named pools
    fn move_between_pools(
        &mut self,
        from: &str,
        to: &str,
        denom: &Denom,
        amount: Tokens,
    ) -> std::result::Result<(), BankError>;

    /// Move `amount` from `account`'s spendable balance into `pool`
    fn debit_account(
        &mut self,
        account: &AccountId,
        pool: &str,
        denom: &Denom,
        amount: Tokens,
    ) -> std::result::Result<(), BankError>;

    /// Move `amount` from `pool` back to `account`'s spendable balance
    fn credit_account(
        &mut self,
        account: &AccountId,
        pool: &str,
        denom: &Denom,
        amount: Tokens,
    ) -> std::result::Result<(), BankError>;

    /// Current balance of a named pool
    fn pool_balance(&self, pool: &str, denom: &Denom) -> Tokens;

    /// Total supply of `denom` across all holders
    fn total_supply(&self, denom: &Denom) -> Tokens;
}

/// In-memory bank: holder name → denom → balance, plus a minted supply
/// counter per denom. Accounts and pools share the holder namespace.
#[derive(Debug, Default, Clone)]
pub struct MemoryBank {
    balances: HashMap<String, HashMap<String, u128>>,
    supply: HashMap<String, u128>,
}

impl MemoryBank {
    /// Create an empty bank
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` of `denom` to a holder, growing total supply
    pub fn mint(&mut self, holder: &str, denom: &Denom, amount: Tokens) {
        *self
            .balances
            .entry(holder.to_string())
            .or_default()
            .entry(denom.as_str().to_string())
            .or_insert(0) += amount.value();
        *self.supply.entry(denom.as_str().to_string()).or_insert(0) += amount.value();
    }

    /// Spendable balance of an account
    pub fn account_balance(&self, account: &AccountId, denom: &Denom) -> Tokens {
        self.holder_balance(account.as_str(), denom)
    }

    fn holder_balance(&self, holder: &str, denom: &Denom) -> Tokens {
        Tokens::new(
            self.balances
                .get(holder)
                .and_then(|b| b.get(denom.as_str()))
                .copied()
                .unwrap_or(0),
        )
    }

    fn transfer(
        &mut self,
        from: &str,
        to: &str,
        denom: &Denom,
        amount: Tokens,
    ) -> std::result::Result<(), BankError> {
        let available = self.holder_balance(from, denom);
        let remaining = available
            .checked_sub(amount)
            .ok_or(BankError::InsufficientFunds {
                holder: from.to_string(),
                available,
                required: amount,
            })?;

        let receiving = self.holder_balance(to, denom);
        let received = receiving
            .checked_add(amount)
            .ok_or(BankError::BalanceOverflow {
                holder: to.to_string(),
            })?;

        self.balances
            .entry(from.to_string())
            .or_default()
            .insert(denom.as_str().to_string(), remaining.value());
        self.balances
            .entry(to.to_string())
            .or_default()
            .insert(denom.as_str().to_string(), received.value());
        Ok(())
    }
}

impl BankAdapter for MemoryBank {
    fn move_between_pools(
        &mut self,
        from: &str,
        to: &str,
        denom: &Denom,
        amount: Tokens,
    ) -> std::result::Result<(), BankError> {
        self.transfer(from, to, denom, amount)
    }

    fn debit_account(
        &mut self,
        account: &AccountId,
        pool: &str,
        denom: &Denom,
        amount: Tokens,
    ) -> std::result::Result<(), BankError> {
        self.transfer(account.as_str(), pool, denom, amount)
    }

    fn credit_account(
        &mut self,
        account: &AccountId,
        pool: &str,
        denom: &Denom,
        amount: Tokens,
    ) -> std::result::Result<(), BankError> {
        self.transfer(pool, account.as_str(), denom, amount)
    }

    fn pool_balance(&self, pool: &str, denom: &Denom) -> Tokens {
        self.holder_balance(pool, denom)
    }

    fn total_supply(&self, denom: &Denom) -> Tokens {
        Tokens::new(self.supply.get(denom.as_str()).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denom() -> Denom {
        Denom::new("ubond")
    }

    #[test]
    fn test_mint_and_transfer() {
        let mut bank = MemoryBank::new();
        let alice = AccountId::new("alice");
        bank.mint(alice.as_str(), &denom(), Tokens::new(100));

        assert_eq!(bank.account_balance(&alice, &denom()), Tokens::new(100));
        assert_eq!(bank.total_supply(&denom()), Tokens::new(100));

        bank.debit_account(&alice, "bonded", &denom(), Tokens::new(40))
            .unwrap();
        assert_eq!(bank.account_balance(&alice, &denom()), Tokens::new(60));
        assert_eq!(bank.pool_balance("bonded", &denom()), Tokens::new(40));

        // supply is unchanged by transfers
        assert_eq!(bank.total_supply(&denom()), Tokens::new(100));
    }

    #[test]
    fn test_insufficient_funds_leaves_balances_untouched() {
        let mut bank = MemoryBank::new();
        let alice = AccountId::new("alice");
        bank.mint(alice.as_str(), &denom(), Tokens::new(10));

        let err = bank
            .debit_account(&alice, "bonded", &denom(), Tokens::new(11))
            .unwrap_err();
        assert!(matches!(err, BankError::InsufficientFunds { .. }));
        assert_eq!(bank.account_balance(&alice, &denom()), Tokens::new(10));
        assert_eq!(bank.pool_balance("bonded", &denom()), Tokens::zero());
    }

    #[test]
    fn test_pool_to_pool() {
        let mut bank = MemoryBank::new();
        bank.mint("not_bonded", &denom(), Tokens::new(25));

        bank.move_between_pools("not_bonded", "bonded", &denom(), Tokens::new(25))
            .unwrap();
        assert_eq!(bank.pool_balance("not_bonded", &denom()), Tokens::zero());
        assert_eq!(bank.pool_balance("bonded", &denom()), Tokens::new(25));
    }
}
