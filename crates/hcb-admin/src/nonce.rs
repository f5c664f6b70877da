//! Time-limited request tokens.
//!
//! A nonce is tied to an action and a user and stays valid for 12 to 24
//! hours: time is cut into 12 hour ticks, and a token minted in the current
//! or the previous tick verifies.

use std::time::{SystemTime, UNIX_EPOCH};

/// Length of one tick in seconds.
pub const TICK_SECONDS: u64 = 12 * 60 * 60;

const TOKEN_LEN: usize = 10;
const KEY_CONTEXT: &str = "hcb 2024-01-01 admin nonce key";

/// Which tick a verified nonce was minted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceAge {
    /// Minted within the last 12 hours.
    Current,
    /// Minted 12 to 24 hours ago.
    Previous,
}

/// Mints and verifies nonces under a secret salt.
#[derive(Clone)]
pub struct NonceManager {
    key: [u8; 32],
}

impl std::fmt::Debug for NonceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceManager").finish_non_exhaustive()
    }
}

impl NonceManager {
    pub fn new(salt: &str) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, salt.as_bytes()),
        }
    }

    /// A manager with a random salt. Nonces it mints die with the process.
    pub fn random() -> Self {
        Self {
            key: rand::random(),
        }
    }

    pub fn tick_at(now: u64) -> u64 {
        now.div_ceil(TICK_SECONDS)
    }

    pub fn create(&self, action: &str, user: u64) -> String {
        self.create_at(action, user, unix_now())
    }

    pub fn create_at(&self, action: &str, user: u64, now: u64) -> String {
        self.token(Self::tick_at(now), action, user)
    }

    pub fn verify(&self, nonce: &str, action: &str, user: u64) -> Option<NonceAge> {
        self.verify_at(nonce, action, user, unix_now())
    }

    pub fn verify_at(&self, nonce: &str, action: &str, user: u64, now: u64) -> Option<NonceAge> {
        if nonce.len() != TOKEN_LEN {
            return None;
        }
        let tick = Self::tick_at(now);
        if secrets_match(nonce, &self.token(tick, action, user)) {
            return Some(NonceAge::Current);
        }
        if secrets_match(nonce, &self.token(tick.saturating_sub(1), action, user)) {
            return Some(NonceAge::Previous);
        }
        None
    }

    fn token(&self, tick: u64, action: &str, user: u64) -> String {
        let message = format!("{tick}|{action}|{user}");
        let hash = blake3::keyed_hash(&self.key, message.as_bytes());
        hash.to_hex().as_str()[..TOKEN_LEN].to_string()
    }
}

/// Compare two secrets without leaking where, or whether their lengths,
/// differ. `blake3::Hash` equality is constant time.
pub fn secrets_match(given: &str, expected: &str) -> bool {
    blake3::hash(given.as_bytes()) == blake3::hash(expected.as_bytes())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
