//! # License Key Generation
//!
//! Produces fresh license keys: bearer credentials drawn from an
//! unambiguous alphanumeric alphabet with a cryptographically strong
//! random source (`OsRng`). A predictable counter or a weak PRNG would
//! make keys guessable, so the OS entropy pool is non-negotiable here.
//!
//! ## Collision Policy
//!
//! At the default length of 16 characters over a 32-symbol alphabet a key
//! carries 80 bits of entropy, which makes collisions across any realistic
//! license population negligible. The storage layer's unique constraint on
//! `key` remains the backstop, not the primary defense — the lifecycle
//! layer retries generation on the (effectively impossible) conflict.

use rand::rngs::OsRng;
use rand::Rng;

/// Key alphabet: uppercase letters and digits with the ambiguous glyphs
/// `I`, `O`, `0`, and `1` removed, so keys survive being read aloud or
/// retyped from a screenshot.
pub const KEY_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Default number of random characters in a generated key.
pub const DEFAULT_KEY_LENGTH: usize = 16;

/// Generates unique license key strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyIssuer;

impl KeyIssuer {
    /// Create a key issuer.
    pub fn new() -> Self {
        Self
    }

    /// Generate a key of `length` random characters, optionally prefixed.
    ///
    /// A non-empty prefix is joined with a `-` separator, e.g.
    /// `generate("VIP", 16)` → `VIP-8KJM2NQ7RZP4WXAB`.
    pub fn generate(&self, prefix: &str, length: usize) -> String {
        let mut rng = OsRng;
        let mut key = String::with_capacity(prefix.len() + 1 + length);
        if !prefix.is_empty() {
            key.push_str(prefix);
            key.push('-');
        }
        for _ in 0..length {
            let idx = rng.gen_range(0..KEY_ALPHABET.len());
            key.push(KEY_ALPHABET[idx] as char);
        }
        key
    }

    /// Generate a key of the default length.
    pub fn generate_default(&self, prefix: &str) -> String {
        self.generate(prefix, DEFAULT_KEY_LENGTH)
    }
}
