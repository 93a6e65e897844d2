//! # Reveal
//!
//! Signature-gated display of sealed values.
//!
//! Every call to [`RevealProtocol::reveal`] asks the [`Signer`] for a fresh
//! signature over the session's challenge message and only decodes the value
//! once one comes back. Nothing is cached between calls, so revealing two
//! fields means two prompts.
//!
//! The gate is a user-experience step. The signature is not verified and the
//! value was never encrypted: [`crate::codec::decode`] works on it directly
//! for anyone who holds the string.
//!
//! ## Challenge format
//!
//! ```text
//! publickey:<0x + 2000 hex digits>
//! contractAddresses:<store contract address>
//! contractsChainId:<chain id>
//! startTimestamp:<session start, unix seconds>
//! durationDays:<validity in days>
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::codec::OpaqueValue;
use crate::records::now_secs;

pub const DEFAULT_DURATION_DAYS: u32 = 30;
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(1500);

const PUBLIC_KEY_HEX_DIGITS: usize = 2000;

/// Parameters quoted in every challenge, fixed for the life of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealSession {
    pub public_key: String,
    pub contract_address: String,
    pub chain_id: u64,
    pub start_timestamp: i64,
    pub duration_days: u32,
}

impl RevealSession {
    /// Start a session now with freshly generated key material.
    pub fn new(contract_address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            public_key: generate_public_key(),
            contract_address: contract_address.into(),
            chain_id,
            start_timestamp: now_secs(),
            duration_days: DEFAULT_DURATION_DAYS,
        }
    }

    pub fn with_duration_days(mut self, duration_days: u32) -> Self {
        self.duration_days = duration_days;
        self
    }

    /// The exact message a signer is asked to sign.
    pub fn challenge(&self) -> String {
        format!(
            "publickey:{}\ncontractAddresses:{}\ncontractsChainId:{}\nstartTimestamp:{}\ndurationDays:{}",
            self.public_key,
            self.contract_address,
            self.chain_id,
            self.start_timestamp,
            self.duration_days
        )
    }
}

fn generate_public_key() -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    let digits: String = (0..PUBLIC_KEY_HEX_DIGITS)
        .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
        .collect();
    format!("0x{digits}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignError {
    #[error("user rejected transaction")]
    Rejected,
    #[error("signing failed: {0}")]
    Failed(String),
}

/// Whoever can sign on behalf of the current identity. Signing may wait on
/// the user indefinitely.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, message: &str) -> Result<Signature, SignError>;
}

/// A signature obtained elsewhere (typically a browser wallet signing the
/// challenge) and handed in with the reveal request.
///
/// No signature, or a blank one, counts as a rejection.
pub struct PresignedSigner {
    signature: Option<String>,
}

impl PresignedSigner {
    pub fn new(signature: Option<String>) -> Self {
        Self { signature }
    }
}

#[async_trait]
impl Signer for PresignedSigner {
    async fn sign(&self, _message: &str) -> Result<Signature, SignError> {
        let raw = match self.signature.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(SignError::Rejected),
        };
        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        hex::decode(digits)
            .map(Signature::new)
            .map_err(|e| SignError::Failed(format!("malformed signature: {e}")))
    }
}

pub struct RevealProtocol<G> {
    session: RevealSession,
    signer: G,
    delay: Duration,
    in_progress: AtomicBool,
}

impl<G: Signer> RevealProtocol<G> {
    pub fn new(session: RevealSession, signer: G) -> Self {
        Self {
            session,
            signer,
            delay: DEFAULT_REVEAL_DELAY,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Pause between a successful signature and returning the value.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Whether a reveal is currently waiting on a signature or the delay.
    ///
    /// This is a display flag only. It does not stop another reveal from
    /// starting, and the first reveal to finish clears it.
    pub fn is_revealing(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Decode `value` once the signer has signed a fresh challenge.
    ///
    /// Returns `None` when the signature is refused or fails; the protocol is
    /// left ready for a retry.
    pub async fn reveal(&self, value: &OpaqueValue) -> Option<f64> {
        self.in_progress.store(true, Ordering::SeqCst);
        let _flag = ClearOnDrop(&self.in_progress);

        let message = self.session.challenge();
        match self.signer.sign(&message).await {
            Ok(signature) => {
                debug!("Challenge signed ({} bytes)", signature.as_bytes().len());
                tokio::time::sleep(self.delay).await;
                Some(value.decode())
            }
            Err(e) => {
                warn!("Reveal failed: {e}");
                None
            }
        }
    }
}

struct ClearOnDrop<'a>(&'a AtomicBool);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
