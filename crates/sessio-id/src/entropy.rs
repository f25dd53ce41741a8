//! Entropy Sources
//!
//! The id provider hashes a draw from one of these sources into the
//! session token. A source that cannot produce output fails with
//! [`IdError::EntropyUnavailable`]; id generation never falls back to
//! a weaker scheme.

use crate::error::IdError;
use rand::{rngs::OsRng, RngCore};
use std::io::Read;
use std::path::PathBuf;

/// Number of bytes drawn per id by [`OsEntropy`] (256-bit).
const OS_ENTROPY_BYTES: usize = 32;

/// Default entropy file for [`FileEntropy`].
const DEFAULT_ENTROPY_FILE: &str = "/dev/urandom";

/// Default number of bytes read per draw by [`FileEntropy`].
const DEFAULT_ENTROPY_LENGTH: usize = 512;

/// Source of raw entropy for session id generation.
pub trait EntropySource: Send {
    /// Draws one batch of entropy.
    fn generate(&mut self) -> Result<Vec<u8>, IdError>;
}

/// Entropy from the operating system RNG.
///
/// Draws 32 random bytes per id. This is the recommended source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn generate(&mut self) -> Result<Vec<u8>, IdError> {
        let mut bytes = vec![0u8; OS_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Ok(bytes)
    }
}

/// Entropy read from a file, `/dev/urandom` by default.
///
/// Fails with [`IdError::EntropyUnavailable`] when the file cannot be
/// read or yields no bytes.
#[derive(Debug, Clone)]
pub struct FileEntropy {
    path: PathBuf,
    length: usize,
}

impl FileEntropy {
    /// Creates a source reading `length` bytes from `path` per draw.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, length: usize) -> Self {
        Self {
            path: path.into(),
            length,
        }
    }

    /// Returns the file path this source reads from.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Default for FileEntropy {
    fn default() -> Self {
        Self::new(DEFAULT_ENTROPY_FILE, DEFAULT_ENTROPY_LENGTH)
    }
}

impl EntropySource for FileEntropy {
    fn generate(&mut self) -> Result<Vec<u8>, IdError> {
        let mut file = std::fs::File::open(&self.path).map_err(|e| IdError::EntropyUnavailable {
            reason: format!("cannot open {}: {e}", self.path.display()),
        })?;

        let mut bytes = vec![0u8; self.length];
        let read = file
            .read(&mut bytes)
            .map_err(|e| IdError::EntropyUnavailable {
                reason: format!("cannot read {}: {e}", self.path.display()),
            })?;

        if read == 0 {
            return Err(IdError::EntropyUnavailable {
                reason: format!("entropy file {} is empty", self.path.display()),
            });
        }

        bytes.truncate(read);
        Ok(bytes)
    }
}
