//! Tagged dispatch between ECCHybrid and PQHybrid (L4, AsymSelector).

pub mod ecc;
pub mod pq;

use std::io::{Read, Write};

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

pub const ALGO_TAG_ECC: u8 = 0;
pub const ALGO_TAG_PQ: u8 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Algo {
    Ecc,
    Pq,
}

impl Algo {
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::Ecc => ALGO_TAG_ECC,
            Self::Pq => ALGO_TAG_PQ,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            ALGO_TAG_ECC => Ok(Self::Ecc),
            ALGO_TAG_PQ => Ok(Self::Pq),
            _ => Err(Error::InvalidCiphertext),
        }
    }
}

/// The asymmetric public key, tagged by which KEM it belongs to.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum AsymmetricPublicKey {
    Ecc([u8; ecc::PUBLIC_KEY_LENGTH]),
    Pq(Box<[u8; pq::PUBLIC_KEY_LENGTH]>),
}

impl AsymmetricPublicKey {
    #[must_use]
    pub fn algo(&self) -> Algo {
        match self {
            Self::Ecc(_) => Algo::Ecc,
            Self::Pq(_) => Algo::Pq,
        }
    }

    /// Derive the asymmetric public key belonging to a `SecretKey` seed.
    /// `pq=false` selects ECC (X25519 over `SHA-256(seed)`); `pq=true`
    /// selects ML-KEM-1024 (deterministic from the raw seed).
    #[must_use]
    pub fn from_secret_seed(seed: &[u8; 64], pq: bool) -> Self {
        if pq {
            Self::Pq(Box::new(pq::public_key_from_seed(seed)))
        } else {
            let scalar = ecc_scalar_from_seed(seed);
            Self::Ecc(ecc::public_key_from_scalar(&scalar))
        }
    }

    /// `algo_tag(1) ‖ raw_public_bytes`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.algo().tag()];
        match self {
            Self::Ecc(bytes) => out.extend_from_slice(bytes),
            Self::Pq(bytes) => out.extend_from_slice(bytes.as_slice()),
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&tag, raw) = bytes.split_first().ok_or(Error::InvalidPublicKey)?;
        match Algo::from_tag(tag).map_err(|_| Error::InvalidPublicKey)? {
            Algo::Ecc => {
                let arr: [u8; ecc::PUBLIC_KEY_LENGTH] =
                    raw.try_into().map_err(|_| Error::InvalidPublicKey)?;
                Ok(Self::Ecc(arr))
            }
            Algo::Pq => {
                let arr: [u8; pq::PUBLIC_KEY_LENGTH] =
                    raw.try_into().map_err(|_| Error::InvalidPublicKey)?;
                Ok(Self::Pq(Box::new(arr)))
            }
        }
    }

    /// Write the algo tag, then dispatch to the matching hybrid's
    /// encrypting stream.
    pub fn encrypt_stream(
        &self,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        compress: bool,
    ) -> Result<()> {
        writer.write_all(&[self.algo().tag()])?;
        match self {
            Self::Ecc(pk) => ecc::encrypt_stream(pk, reader, writer, compress),
            Self::Pq(pk) => pq::encrypt_stream(pk, reader, writer, compress),
        }
    }
}

/// `SHA-256(seed)` as the 32-byte X25519 scalar.
#[must_use]
pub fn ecc_scalar_from_seed(seed: &[u8; 64]) -> [u8; 32] {
    let digest = Sha256::digest(seed);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Read the algo tag, derive the matching private key material from
/// the `SecretKey` seed, and dispatch to the matching hybrid's
/// decrypting stream.
pub fn decrypt_stream(seed: &[u8; 64], reader: &mut dyn Read, writer: &mut dyn Write) -> Result<()> {
    let mut tag = [0u8; 1];
    reader
        .read_exact(&mut tag)
        .map_err(|_| Error::InvalidCiphertext)?;

    match Algo::from_tag(tag[0])? {
        Algo::Ecc => {
            let scalar = ecc_scalar_from_seed(seed);
            ecc::decrypt_stream(&scalar, reader, writer)
        }
        Algo::Pq => pq::decrypt_stream(seed, reader, writer),
    }
}
