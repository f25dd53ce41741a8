//! Id Hash Algorithm
//!
//! The raw entropy draw is hashed into the opaque token clients see.
//! The algorithm is configurable; an unknown name fails with
//! [`IdError::UnsupportedAlgorithm`] instead of falling back.

use crate::error::IdError;
use sha1::{Digest, Sha1};
use sha2::{Sha256, Sha512};
use std::str::FromStr;

/// Hash algorithm applied to the entropy draw.
///
/// Defaults to SHA-1 (a 40-char hex token). The token only needs to be
/// unguessable, not collision-resistant, so SHA-1 remains the compact
/// default; pick SHA-256/512 for longer tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Hashes `data` and returns the lowercase hex digest.
    #[must_use]
    pub fn digest(&self, data: &[u8]) -> String {
        match self {
            Self::Sha1 => hex::encode(Sha1::digest(data)),
            Self::Sha256 => hex::encode(Sha256::digest(data)),
            Self::Sha512 => hex::encode(Sha512::digest(data)),
        }
    }

    /// Canonical configuration name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(IdError::UnsupportedAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}
