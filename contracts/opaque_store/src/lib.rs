//! # Opaque Store Contract
//!
//! The ledger side of the conservation DAO registry: a flat key/value store
//! over opaque byte payloads. It knows nothing about projects, forum posts or
//! key lists. Those conventions live entirely in the off-chain registry, which
//! packs its records into this store under `"{namespace}_keys"` and
//! `"{namespace}_{id}"` keys.
//!
//! | Entry Point      | Description                                   |
//! |------------------|-----------------------------------------------|
//! | `is_available`   | Liveness probe; always `true` once deployed   |
//! | `get_data`       | Read a value; empty bytes when the key is unset |
//! | `set_data`       | Upsert a value                                |
//!
//! There is no compare-and-swap: two clients doing read-modify-write on the
//! same key race, and the last `set_data` wins.

#![no_std]

use soroban_sdk::{contract, contractimpl, Bytes, Env, String};

mod storage;

#[cfg(test)]
mod test;

use storage::{load_entry, save_entry};

#[contract]
pub struct OpaqueStore;

#[contractimpl]
impl OpaqueStore {
    /// Report that the store is deployed and answering.
    pub fn is_available(_env: Env) -> bool {
        true
    }

    /// Read the value stored under `key`.
    ///
    /// Unset keys return an empty byte sequence rather than failing.
    pub fn get_data(env: Env, key: String) -> Bytes {
        load_entry(&env, key)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set_data(env: Env, key: String, value: Bytes) {
        save_entry(&env, key, &value);
    }
}
