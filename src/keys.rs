//! `SecretKey`/`PublicKey` lifecycle.
//!
//! A `SecretKey` is either `Direct` (a random 64-byte seed, fully
//! serialisable) or `Password` (derived from a password via Argon2id;
//! never serialisable as raw bytes — attempting to serialises one
//! returns `Error::SecretKeyUnavailableForPwd`). Each `Password`
//! instance keeps a small cache from `KdfSpec` bytes to the 64-byte key
//! they derive, so re-deriving under a ciphertext's own (possibly
//! different) spec doesn't repeat the Argon2id work on every call. The
//! cache uses `RefCell`, not a lock: concurrent use of one key instance
//! needs external synchronization.

use std::cell::RefCell;
use std::collections::HashMap;

use rand::RngCore;
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretSlice};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::kdf::{self, KdfSpec};
use crate::kem::AsymmetricPublicKey;
use crate::{envelope, stream_cipher};

pub const VERSION: u8 = 0;
pub const SEED_LENGTH: usize = 64;
/// `version(1) ‖ key_type(1) ‖ seed(64)`.
pub const SECRET_KEY_LENGTH: usize = 2 + SEED_LENGTH;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyType {
    Direct,
    Password,
}

impl KeyType {
    #[must_use]
    pub fn tag(self) -> u8 {
        match self {
            Self::Direct => 0,
            Self::Password => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Direct),
            1 => Ok(Self::Password),
            _ => Err(Error::InvalidSecretKey),
        }
    }

    #[must_use]
    pub fn is_password(self) -> bool {
        matches!(self, Self::Password)
    }
}

pub struct SecretKey {
    version: u8,
    key_type: KeyType,
    seed: SecretSlice<u8>,
    password: Option<SecretSlice<u8>>,
    spec: Option<KdfSpec>,
    cache: RefCell<HashMap<[u8; kdf::SPEC_LENGTH], [u8; kdf::DERIVED_KEY_LENGTH]>>,
}

impl SecretKey {
    fn from_parts(
        key_type: KeyType,
        seed: [u8; SEED_LENGTH],
        password: Option<&[u8]>,
        spec: Option<KdfSpec>,
    ) -> Self {
        let mut cache = HashMap::new();
        if let Some(spec) = &spec {
            cache.insert(spec.to_bytes(), seed);
        }
        Self {
            version: VERSION,
            key_type,
            seed: SecretSlice::from(seed.to_vec()),
            password: password.map(|p| SecretSlice::from(p.to_vec())),
            spec,
            cache: RefCell::new(cache),
        }
    }

    /// A fresh, random `Direct` key.
    #[must_use]
    pub fn new() -> Self {
        let mut seed = [0u8; SEED_LENGTH];
        OsRng.fill_bytes(&mut seed);
        Self::from_parts(KeyType::Direct, seed, None, None)
    }

    /// A `Direct` key from caller-supplied seed bytes.
    #[must_use]
    pub fn from_seed(seed: [u8; SEED_LENGTH]) -> Self {
        Self::from_parts(KeyType::Direct, seed, None, None)
    }

    /// A `Password` key under the default `KdfSpec`.
    pub fn for_password(password: &[u8]) -> Result<Self> {
        if password.is_empty() {
            return Err(Error::InvalidPassword);
        }
        let spec = KdfSpec::default_spec()?;
        Self::for_password_and_spec_inner(password, spec)
    }

    /// A `Password` key under caller-chosen Argon2id parameters.
    pub fn for_password_and_spec(
        password: &[u8],
        iterations: u8,
        memory_mb: u8,
        threads: u8,
    ) -> Result<Self> {
        if password.is_empty() {
            return Err(Error::InvalidPassword);
        }
        let spec = KdfSpec::new(iterations, memory_mb, threads)?;
        Self::for_password_and_spec_inner(password, spec)
    }

    fn for_password_and_spec_inner(password: &[u8], spec: KdfSpec) -> Result<Self> {
        let seed = spec.derive_key(password)?;
        Ok(Self::from_parts(KeyType::Password, seed, Some(password), Some(spec)))
    }

    /// Parse raw `SecretKey` bytes (`version ‖ key_type ‖ seed`).
    /// Password-typed bytes never occur on the wire (they can't be
    /// serialised in the first place), so any non-`Direct` tag here is
    /// malformed input.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(Error::InvalidSecretKey);
        }
        let version = bytes[0];
        let key_type = KeyType::from_tag(bytes[1])?;
        if key_type.is_password() {
            return Err(Error::InvalidSecretKey);
        }
        let mut seed = [0u8; SEED_LENGTH];
        seed.copy_from_slice(&bytes[2..]);
        Ok(Self {
            version,
            key_type,
            seed: SecretSlice::from(seed.to_vec()),
            password: None,
            spec: None,
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// Parse an `XSK_`-prefixed, base32-encoded `SecretKey` string.
    pub fn parse_str(s: &str) -> Result<Self> {
        let bytes = envelope::decode_secret_key_str(s)?;
        Self::parse(&bytes)
    }

    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    #[must_use]
    pub fn is_password(&self) -> bool {
        self.key_type.is_password()
    }

    #[must_use]
    pub(crate) fn spec(&self) -> Option<&KdfSpec> {
        self.spec.as_ref()
    }

    pub(crate) fn seed_bytes(&self) -> [u8; SEED_LENGTH] {
        let mut out = [0u8; SEED_LENGTH];
        out.copy_from_slice(self.seed.expose_secret());
        out
    }

    /// Raw `version ‖ key_type ‖ seed` bytes. Fails for `Password` keys:
    /// nothing short of the password itself can reproduce this key, and
    /// the password is never stored on the wire.
    pub fn to_bytes(&self) -> Result<[u8; SECRET_KEY_LENGTH]> {
        if self.key_type.is_password() {
            return Err(Error::SecretKeyUnavailableForPwd);
        }
        let mut out = [0u8; SECRET_KEY_LENGTH];
        out[0] = self.version;
        out[1] = self.key_type.tag();
        out[2..].copy_from_slice(self.seed.expose_secret());
        Ok(out)
    }

    /// `XSK_`-prefixed, base32-encoded text form.
    pub fn to_envelope_string(&self) -> Result<String> {
        let bytes = self.to_bytes()?;
        Ok(envelope::encode_secret_key(&bytes))
    }

    /// The `PublicKey` matching this secret key. `pq` selects
    /// ML-KEM-1024 over X25519.
    #[must_use]
    pub fn public_key(&self, pq: bool) -> PublicKey {
        let asym = AsymmetricPublicKey::from_secret_seed(&self.seed_bytes(), pq);
        PublicKey {
            version: self.version,
            key_type: self.key_type,
            asym,
            spec: self.spec.clone(),
        }
    }

    /// `SHA-256` of this key's own active seed, for symmetric
    /// (non-KEM) encryption under this `SecretKey` directly.
    #[must_use]
    pub(crate) fn symmetric_key(&self) -> [u8; stream_cipher::KEY_LENGTH] {
        symmetric_key_from_seed(&self.seed_bytes())
    }

    /// Derive (or fetch from cache) the 64-byte seed for an arbitrary
    /// `KdfSpec` — used on decryption when the ciphertext's own spec
    /// differs from the one this key was constructed with (same
    /// password, different parameters). Fails with
    /// `DecryptionFailedPwdRequired` for `Direct` keys, which hold no
    /// password to re-derive from.
    pub(crate) fn seed_for_spec(&self, spec: &KdfSpec) -> Result<[u8; SEED_LENGTH]> {
        let password = self
            .password
            .as_ref()
            .ok_or(Error::DecryptionFailedPwdRequired)?;

        let spec_bytes = spec.to_bytes();
        if let Some(cached) = self.cache.borrow().get(&spec_bytes) {
            return Ok(*cached);
        }
        let derived = spec.derive_key(password.expose_secret())?;
        self.cache.borrow_mut().insert(spec_bytes, derived);
        Ok(derived)
    }
}

impl Default for SecretKey {
    fn default() -> Self {
        Self::new()
    }
}

/// `SHA-256(seed)`, matching the symmetric-key derivation the original
/// implementation applies to whatever 64-byte key material is active
/// (`xipher_crypto.go::newVariableKeySymmCipher`; see `DESIGN.md`).
#[must_use]
pub(crate) fn symmetric_key_from_seed(seed: &[u8; SEED_LENGTH]) -> [u8; stream_cipher::KEY_LENGTH] {
    let digest = Sha256::digest(seed);
    let mut out = [0u8; stream_cipher::KEY_LENGTH];
    out.copy_from_slice(&digest);
    out
}

#[derive(Clone)]
pub struct PublicKey {
    version: u8,
    key_type: KeyType,
    asym: AsymmetricPublicKey,
    spec: Option<KdfSpec>,
}

impl PublicKey {
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    #[must_use]
    pub fn is_password(&self) -> bool {
        self.key_type.is_password()
    }

    #[must_use]
    pub(crate) fn spec(&self) -> Option<&KdfSpec> {
        self.spec.as_ref()
    }

    #[must_use]
    pub(crate) fn asym(&self) -> &AsymmetricPublicKey {
        &self.asym
    }

    /// `version(1) ‖ key_type(1) ‖ [kdf_spec(19) if Password] ‖ algo_tag(1) ‖ raw_public_bytes`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.version, self.key_type.tag()];
        if let Some(spec) = &self.spec {
            out.extend_from_slice(&spec.to_bytes());
        }
        out.extend_from_slice(&self.asym.to_bytes());
        out
    }

    #[must_use]
    pub fn to_envelope_string(&self) -> String {
        envelope::encode_public_key(&self.to_bytes())
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let (&version, rest) = bytes.split_first().ok_or(Error::InvalidPublicKey)?;
        let (&type_tag, rest) = rest.split_first().ok_or(Error::InvalidPublicKey)?;
        let key_type = KeyType::from_tag(type_tag).map_err(|_| Error::InvalidPublicKey)?;

        let (spec, rest) = if key_type.is_password() {
            if rest.len() < kdf::SPEC_LENGTH {
                return Err(Error::InvalidPublicKey);
            }
            let (spec_bytes, rest) = rest.split_at(kdf::SPEC_LENGTH);
            let spec = KdfSpec::from_bytes(spec_bytes)
                .map_err(|_| Error::InvalidPublicKey)?
                .ok_or(Error::InvalidPublicKey)?;
            (Some(spec), rest)
        } else {
            (None, rest)
        };

        let asym = AsymmetricPublicKey::from_bytes(rest)?;
        Ok(Self {
            version,
            key_type,
            asym,
            spec,
        })
    }

    pub fn parse_str(s: &str) -> Result<Self> {
        let bytes = envelope::decode_public_key_str(s)?;
        Self::parse(&bytes)
    }

    /// Encrypt `reader` into `writer` under this public key, writing the
    /// KEM ciphertext (or ephemeral public key) followed by the
    /// `StreamCipher` output. The ciphertext container is
    /// responsible for the mode tag and any `KdfSpec` prefix.
    pub fn encrypt_stream(
        &self,
        reader: &mut dyn std::io::Read,
        writer: &mut dyn std::io::Write,
        compress: bool,
    ) -> Result<()> {
        self.asym.encrypt_stream(reader, writer, compress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_bytes_round_trip() {
        let secret = SecretKey::new();
        let bytes = secret.to_bytes().unwrap();
        let parsed = SecretKey::parse(&bytes).unwrap();
        assert_eq!(parsed.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn direct_key_string_round_trips() {
        let secret = SecretKey::new();
        let s = secret.to_envelope_string().unwrap();
        assert!(s.starts_with(envelope::SECRET_KEY_PREFIX));
        let parsed = SecretKey::parse_str(&s).unwrap();
        assert_eq!(parsed.to_bytes().unwrap(), secret.to_bytes().unwrap());
    }

    #[test]
    fn password_key_cannot_be_serialised() {
        let secret = SecretKey::for_password(b"hunter2").unwrap();
        assert_eq!(secret.to_bytes(), Err(Error::SecretKeyUnavailableForPwd));
        assert_eq!(secret.to_envelope_string().err(), Some(Error::SecretKeyUnavailableForPwd));
    }

    #[test]
    fn for_password_rejects_empty_password() {
        assert_eq!(SecretKey::for_password(b""), Err(Error::InvalidPassword));
    }

    #[test]
    fn public_key_bytes_round_trip_direct() {
        let secret = SecretKey::new();
        let public = secret.public_key(false);
        let bytes = public.to_bytes();
        let parsed = PublicKey::parse(&bytes).unwrap();
        assert_eq!(parsed.to_bytes(), bytes);
        assert!(!parsed.is_password());
    }

    #[test]
    fn public_key_bytes_round_trip_password() {
        let secret = SecretKey::for_password(b"hunter2").unwrap();
        let public = secret.public_key(true);
        let bytes = public.to_bytes();
        let parsed = PublicKey::parse(&bytes).unwrap();
        assert!(parsed.is_password());
        assert_eq!(parsed.spec(), secret.spec());
    }

    #[test]
    fn public_key_string_round_trips() {
        let secret = SecretKey::new();
        let public = secret.public_key(false);
        let s = public.to_envelope_string();
        assert!(s.starts_with(envelope::PUBLIC_KEY_PREFIX));
        let parsed = PublicKey::parse_str(&s).unwrap();
        assert_eq!(parsed.to_bytes(), public.to_bytes());
    }

    #[test]
    fn seed_for_spec_is_cached_and_reproducible() {
        let secret = SecretKey::for_password(b"hunter2").unwrap();
        let other_spec = KdfSpec::new(1, 8, 1).unwrap();
        let a = secret.seed_for_spec(&other_spec).unwrap();
        let b = secret.seed_for_spec(&other_spec).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seed_for_spec_fails_for_direct_key() {
        let secret = SecretKey::new();
        let spec = KdfSpec::default_spec().unwrap();
        assert_eq!(
            secret.seed_for_spec(&spec),
            Err(Error::DecryptionFailedPwdRequired)
        );
    }

    #[test]
    fn symmetric_key_is_sha256_of_seed() {
        let secret = SecretKey::new();
        let expected = Sha256::digest(secret.seed_bytes());
        assert_eq!(secret.symmetric_key().as_slice(), expected.as_slice());
    }
}
