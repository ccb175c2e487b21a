//! Argon2id key derivation with a serialisable parameter spec.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{Error, Result};

pub const SALT_LENGTH: usize = 16;
pub const PARAMS_LENGTH: usize = 3;
pub const SPEC_LENGTH: usize = PARAMS_LENGTH + SALT_LENGTH;
/// Length of the derived key: the 64-byte KEM seed.
pub const DERIVED_KEY_LENGTH: usize = 64;

pub const DEFAULT_ITERATIONS: u8 = 16;
pub const DEFAULT_MEMORY_MB: u8 = 64;
pub const DEFAULT_THREADS: u8 = 1;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KdfSpec {
    iterations: u8,
    memory_mb: u8,
    threads: u8,
    salt: [u8; SALT_LENGTH],
}

impl KdfSpec {
    /// Fresh spec with a random salt. Fails if all three parameters
    /// aren't strictly positive, or if the RNG can't be read.
    pub fn new(iterations: u8, memory_mb: u8, threads: u8) -> Result<Self> {
        if iterations == 0 || memory_mb == 0 || threads == 0 {
            return Err(Error::InvalidKdfSpec);
        }
        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        Ok(Self {
            iterations,
            memory_mb,
            threads,
            salt,
        })
    }

    pub fn default_spec() -> Result<Self> {
        Self::new(DEFAULT_ITERATIONS, DEFAULT_MEMORY_MB, DEFAULT_THREADS)
    }

    /// Derive the 64-byte KEM seed from a password under this spec.
    pub fn derive_key(&self, password: &[u8]) -> Result<[u8; DERIVED_KEY_LENGTH]> {
        let params = Params::new(
            u32::from(self.memory_mb) * 1024,
            u32::from(self.iterations),
            u32::from(self.threads),
            Some(DERIVED_KEY_LENGTH),
        )
        .map_err(|_| Error::InvalidKdfSpec)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = [0u8; DERIVED_KEY_LENGTH];
        argon2
            .hash_password_into(password, &self.salt, &mut out)
            .map_err(|_| Error::InvalidKdfSpec)?;
        Ok(out)
    }

    /// Serialise as `iterations ‖ memory ‖ threads ‖ salt` (19 bytes).
    pub fn to_bytes(&self) -> [u8; SPEC_LENGTH] {
        let mut out = [0u8; SPEC_LENGTH];
        out[0] = self.iterations;
        out[1] = self.memory_mb;
        out[2] = self.threads;
        out[PARAMS_LENGTH..].copy_from_slice(&self.salt);
        out
    }

    /// Parse 19 bytes. An all-zero block is the "no spec" sentinel and
    /// parses to `Ok(None)`; a block with exactly one zero parameter
    /// among otherwise non-zero bytes is `InvalidKdfSpec`. Order
    /// matters: the all-zero check runs before the per-parameter check,
    /// matching the original Go `parseKdfSpec`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Option<Self>> {
        if bytes.len() != SPEC_LENGTH {
            return Err(Error::InvalidKdfSpec);
        }
        if bytes.iter().all(|&b| b == 0) {
            return Ok(None);
        }
        let iterations = bytes[0];
        let memory_mb = bytes[1];
        let threads = bytes[2];
        if iterations == 0 || memory_mb == 0 || threads == 0 {
            return Err(Error::InvalidKdfSpec);
        }
        let mut salt = [0u8; SALT_LENGTH];
        salt.copy_from_slice(&bytes[PARAMS_LENGTH..]);
        Ok(Some(Self {
            iterations,
            memory_mb,
            threads,
            salt,
        }))
    }
}
