//! Ledger parameters

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Module parameters.
///
/// Read-mostly; changes arrive out of band through
/// [`BondingLedger::set_params`](crate::BondingLedger::set_params).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Duration of unbonding, in seconds
    pub unbonding_time_secs: u64,

    /// Max simultaneous unbonding entries per account
    pub max_entries: u16,

    /// Bondable coin denomination
    pub bond_denom: String,

    /// Pool holding bonded tokens
    pub bonded_pool_name: String,

    /// Pool holding not-bonded tokens
    pub not_bonded_pool_name: String,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            // three weeks
            unbonding_time_secs: 60 * 60 * 24 * 7 * 3,
            max_entries: 7,
            bond_denom: "ubond".to_string(),
            bonded_pool_name: "bonded_tokens_pool".to_string(),
            not_bonded_pool_name: "not_bonded_tokens_pool".to_string(),
        }
    }
}

impl Params {
    /// Unbonding duration as a time delta
    pub fn unbonding_time(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.unbonding_time_secs as i64)
    }

    /// Validate a set of params
    pub fn validate(&self) -> Result<()> {
        if self.bond_denom.is_empty() {
            return Err(Error::Config("bond_denom cannot be empty".to_string()));
        }
        if self.bonded_pool_name.is_empty() {
            return Err(Error::Config("bonded_pool_name cannot be empty".to_string()));
        }
        if self.not_bonded_pool_name.is_empty() {
            return Err(Error::Config(
                "not_bonded_pool_name cannot be empty".to_string(),
            ));
        }
        if self.bonded_pool_name == self.not_bonded_pool_name {
            return Err(Error::Config(
                "bonded and not-bonded pools must be distinct".to_string(),
            ));
        }
        if self.max_entries == 0 {
            return Err(Error::Config("max_entries must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read params file: {}", e)))?;
        let params: Params = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse params: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut params = Params::default();

        if let Ok(secs) = std::env::var("BOND_UNBONDING_TIME_SECS") {
            params.unbonding_time_secs = secs
                .parse()
                .map_err(|e| Error::Config(format!("invalid BOND_UNBONDING_TIME_SECS: {}", e)))?;
        }
        if let Ok(max) = std::env::var("BOND_MAX_ENTRIES") {
            params.max_entries = max
                .parse()
                .map_err(|e| Error::Config(format!("invalid BOND_MAX_ENTRIES: {}", e)))?;
        }
        if let Ok(denom) = std::env::var("BOND_DENOM") {
            params.bond_denom = denom;
        }

        params.validate()?;
        Ok(params)
    }
}
