//! Pool accounting
//!
//! The bonded and not-bonded pools are named accounts held by the external
//! coin-transfer capability; this module is the only mutation path between
//! them. A source-pool shortfall is a caller bug and surfaces as a fatal
//! error, never as user input.

use bond_store::Store;
use rust_decimal::Decimal;

use crate::bank::{BankAdapter, BankError};
use crate::ledger::BondingLedger;
use crate::types::{Denom, Pool, Tokens};
use crate::{Error, Result};

impl<S: Store, B: BankAdapter> BondingLedger<S, B> {
    /// Bondable denomination
    pub fn bond_denom(&self) -> Denom {
        Denom::new(self.params().bond_denom.clone())
    }

    /// Tokens currently held by the bonded pool
    pub fn bonded_total(&self) -> Tokens {
        self.bank
            .pool_balance(&self.params().bonded_pool_name, &self.bond_denom())
    }

    /// Tokens currently held by the not-bonded pool
    pub fn not_bonded_total(&self) -> Tokens {
        self.bank
            .pool_balance(&self.params().not_bonded_pool_name, &self.bond_denom())
    }

    /// Total supply of the bond denomination
    pub fn token_supply(&self) -> Tokens {
        self.bank.total_supply(&self.bond_denom())
    }

    /// Bonded / not-bonded split, for queries
    pub fn pool(&self) -> Pool {
        Pool {
            not_bonded_tokens: self.not_bonded_total(),
            bonded_tokens: self.bonded_total(),
        }
    }

    /// Fraction of total supply currently bonded, as an 18-decimal-place
    /// fixed-point value. Zero when the supply is zero.
    pub fn bonded_ratio(&self) -> Decimal {
        let supply = self.token_supply();
        if supply.is_zero() {
            return Decimal::ZERO;
        }
        fixed_point_ratio(self.bonded_total().value(), supply.value())
    }

    /// Transfer from the bonded to the not-bonded pool
    pub(crate) fn bonded_to_not_bonded(&mut self, amount: Tokens) -> Result<()> {
        let from = self.params().bonded_pool_name.clone();
        let to = self.params().not_bonded_pool_name.clone();
        self.transfer_between_pools(&from, &to, amount)
    }

    /// Transfer from the not-bonded to the bonded pool
    pub(crate) fn not_bonded_to_bonded(&mut self, amount: Tokens) -> Result<()> {
        let from = self.params().not_bonded_pool_name.clone();
        let to = self.params().bonded_pool_name.clone();
        self.transfer_between_pools(&from, &to, amount)
    }

    fn transfer_between_pools(&mut self, from: &str, to: &str, amount: Tokens) -> Result<()> {
        let denom = self.bond_denom();
        self.bank
            .move_between_pools(from, to, &denom, amount)
            .map_err(|err| match err {
                BankError::InsufficientFunds { .. } => Error::InsufficientPoolFunds {
                    pool: from.to_string(),
                    source: err,
                },
                other => Error::Transfer(other),
            })
    }
}

/// `num / den` at 18 decimal places.
///
/// Both sides are shifted down together until the scaled numerator fits in
/// 128 bits; precision degrades only for values beyond ~3.4e20 base units.
fn fixed_point_ratio(num: u128, den: u128) -> Decimal {
    const SCALE: u32 = 18;
    const SCALE_FACTOR: u128 = 1_000_000_000_000_000_000;

    if den == 0 {
        return Decimal::ZERO;
    }

    let (mut num, mut den) = (num, den);
    while num.checked_mul(SCALE_FACTOR).is_none() {
        num >>= 1;
        den = (den >> 1).max(1);
    }

    let scaled = num * SCALE_FACTOR / den;
    i128::try_from(scaled)
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, SCALE).ok())
        .unwrap_or(Decimal::MAX)
}
