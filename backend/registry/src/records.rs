//! # Records
//!
//! Typed shapes for everything the registry stores.
//!
//! ## Stored payloads vs. public records
//!
//! A record's id is its registry key and is not repeated inside the payload.
//! [`ProjectPayload`] / [`PostPayload`] are the exact JSON written to the
//! store; [`Project`] / [`ForumPost`] are what callers see, rebuilt from the
//! payload plus the id it was found under.
//!
//! Payloads are read leniently: a missing or `null` `status` reads as
//! `pending`, missing or `null` vote counters as 0, a missing `description` as
//! empty. A `status` string outside the three known values also reads as
//! `pending` (logged), so the project stays listed; a later vote rewrites it
//! as `pending`. Fields this crate does not know about are carried through a
//! vote rewrite untouched.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::codec::OpaqueValue;

/// Registry namespace for conservation projects.
pub const PROJECT_NAMESPACE: &str = "project";
/// Registry namespace for forum posts.
pub const FORUM_NAMESPACE: &str = "forum";

const PROJECT_ID_PREFIX: &str = "proj";
const POST_ID_PREFIX: &str = "post";

/// Governance status of a project.
///
/// Only `Pending` is ever written here; the decision that moves a project to
/// `Approved` or `Rejected` is taken outside this crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ProjectStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<ProjectStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref() {
        None | Some("") => ProjectStatus::Pending,
        Some(raw) => ProjectStatus::parse(raw).unwrap_or_else(|| {
            warn!("Unknown project status {raw:?}, reading as pending");
            ProjectStatus::Pending
        }),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Project payload exactly as stored under `project_{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub name: String,
    pub location: String,
    pub budget: OpaqueValue,
    pub species_count: OpaqueValue,
    #[serde(default)]
    pub description: String,
    pub timestamp: i64,
    pub proposer: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: ProjectStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes_for: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes_against: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A conservation funding proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub location: String,
    pub encrypted_budget: OpaqueValue,
    pub encrypted_species_count: OpaqueValue,
    pub description: String,
    pub timestamp: i64,
    pub proposer: String,
    pub status: ProjectStatus,
    pub votes_for: u64,
    pub votes_against: u64,
}

impl Project {
    pub fn from_payload(id: impl Into<String>, payload: ProjectPayload) -> Self {
        Project {
            id: id.into(),
            name: payload.name,
            location: payload.location,
            encrypted_budget: payload.budget,
            encrypted_species_count: payload.species_count,
            description: payload.description,
            timestamp: payload.timestamp,
            proposer: payload.proposer,
            status: payload.status,
            votes_for: payload.votes_for,
            votes_against: payload.votes_against,
        }
    }
}

/// Caller-supplied fields of a new project; the numbers are sealed by the
/// codec before anything is stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub location: String,
    pub budget: f64,
    pub species_count: f64,
    #[serde(default)]
    pub description: String,
}

/// Forum payload exactly as stored under `forum_{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPayload {
    pub content: String,
    pub timestamp: i64,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForumPost {
    pub id: String,
    pub content: String,
    pub timestamp: i64,
    pub author: String,
}

impl ForumPost {
    pub fn from_payload(id: impl Into<String>, payload: PostPayload) -> Self {
        ForumPost {
            id: id.into(),
            content: payload.content,
            timestamp: payload.timestamp,
            author: payload.author,
        }
    }
}

pub fn new_project_id() -> String {
    generate_id(PROJECT_ID_PREFIX)
}

pub fn new_post_id() -> String {
    generate_id(POST_ID_PREFIX)
}

/// `"{prefix}-{unix_millis}-{4 base36 chars}"`.
///
/// Nothing checks the result against existing ids; a collision needs two
/// creates in the same millisecond drawing the same suffix.
fn generate_id(prefix: &str) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{prefix}-{}-{suffix}", Utc::now().timestamp_millis())
}

/// Seconds since the Unix epoch.
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}
