//! Store key layout
//!
//! Single flat keyspace on the store adapter:
//!
//! - `0x21 ++ owner` → deposit record
//! - `0x22 ++ owner` → unbonding record
//! - `0x31 ++ big-endian time` → unbonding queue bucket
//!
//! Queue keys must sort chronologically as raw bytes, so the completion
//! time is encoded as big-endian epoch microseconds with the sign bit
//! flipped (keeps pre-epoch timestamps ordered below post-epoch ones).

use chrono::{DateTime, Utc};

use crate::types::AccountId;

/// Prefix for deposit records
pub const DEPOSIT_PREFIX: [u8; 1] = [0x21];

/// Prefix for unbonding records
pub const UNBONDING_PREFIX: [u8; 1] = [0x22];

/// Prefix for unbonding queue buckets
pub const UNBONDING_QUEUE_PREFIX: [u8; 1] = [0x31];

/// Key for an account's deposit record
pub fn deposit_key(owner: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + owner.as_bytes().len());
    key.extend_from_slice(&DEPOSIT_PREFIX);
    key.extend_from_slice(owner.as_bytes());
    key
}

/// Key for an account's unbonding record
pub fn unbonding_key(owner: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + owner.as_bytes().len());
    key.extend_from_slice(&UNBONDING_PREFIX);
    key.extend_from_slice(owner.as_bytes());
    key
}

/// Key for the queue bucket at `time`
pub fn unbonding_queue_key(time: DateTime<Utc>) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 8);
    key.extend_from_slice(&UNBONDING_QUEUE_PREFIX);
    key.extend_from_slice(&encode_time(time));
    key
}

/// Sortable 8-byte encoding of a timestamp (microsecond precision)
pub fn encode_time(time: DateTime<Utc>) -> [u8; 8] {
    // sign bit flipped so lexicographic byte order matches chronological order
    ((time.timestamp_micros() as u64) ^ (1 << 63)).to_be_bytes()
}

/// Inverse of [`encode_time`]
pub fn decode_time(bytes: [u8; 8]) -> Option<DateTime<Utc>> {
    let micros = (u64::from_be_bytes(bytes) ^ (1 << 63)) as i64;
    DateTime::from_timestamp_micros(micros)
}
