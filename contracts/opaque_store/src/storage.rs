//! # Storage
//!
//! Typed helpers over Soroban persistent storage for the opaque store.
//!
//! | Key            | Type    | Description                          |
//! |----------------|---------|--------------------------------------|
//! | `Entry(key)`   | `Bytes` | Opaque value written by `set_data`   |
//!
//! Every entry carries its own TTL, bumped by **30 days** whenever it falls
//! below 7 days remaining. Instance storage is bumped by 7 days on each call
//! so the contract itself outlives its entries.

use soroban_sdk::{contracttype, Bytes, Env, String};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Opaque value stored under a caller-chosen string key (Persistent).
    Entry(String),
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Load the value stored under `key`, or an empty `Bytes` if unset.
pub fn load_entry(env: &Env, key: String) -> Bytes {
    bump_instance(env);
    let key = DataKey::Entry(key);
    match env.storage().persistent().get::<DataKey, Bytes>(&key) {
        Some(value) => {
            bump_persistent(env, &key);
            value
        }
        None => Bytes::new(env),
    }
}

/// Upsert `value` under `key`.
pub fn save_entry(env: &Env, key: String, value: &Bytes) {
    bump_instance(env);
    let key = DataKey::Entry(key);
    env.storage().persistent().set(&key, value);
    bump_persistent(env, &key);
}
