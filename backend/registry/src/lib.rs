//! # Conservation DAO Registry
//!
//! Client-side record layer of the conservation DAO: project proposals, votes
//! and forum posts packed into an opaque, append-only key/value store.
//!
//! | Module       | Role                                                  |
//! |--------------|-------------------------------------------------------|
//! | [`codec`]    | Reversible numeric sealing (`FHE-` + base64)          |
//! | [`store`]    | The [`OpaqueStore`](store::OpaqueStore) seam + in-memory store |
//! | [`db`]       | SQLite-backed store                                   |
//! | [`registry`] | Namespaced key lists and record slots                 |
//! | [`records`]  | Stored payload schemas and id generation              |
//! | [`projects`] | Project listing, creation, vote tallies, stats        |
//! | [`forum`]    | Forum listing and posting                             |
//! | [`reveal`]   | Signature-gated reveal of sealed values               |
//! | [`notice`]   | Status banners for create/vote outcomes               |
//! | [`api`]      | Axum REST surface                                     |
//!
//! The sealing in [`codec`] is obfuscation, not encryption. Anyone with a
//! sealed string can decode it; the signature step in [`reveal`] does not
//! change that.

pub mod api;
pub mod codec;
pub mod config;
pub mod db;
pub mod errors;
pub mod forum;
pub mod notice;
pub mod projects;
pub mod records;
pub mod registry;
pub mod reveal;
pub mod store;

#[cfg(test)]
mod testutil;
