//! ML-KEM-1024 KEM → StreamCipher.
//!
//! The `ml-kem` crate's `KemCore::generate` takes a CSPRNG, not raw seed
//! bytes, so a keypair deterministic in the 64-byte `SecretKey` seed is
//! realised by expanding the first 32 bytes of that seed through
//! `ChaCha20Rng` and handing the resulting deterministic stream to
//! `generate`. See `DESIGN.md` for why this crate was chosen over a raw
//! seed-ingestion API.

use std::io::{Read, Write};

use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Ciphertext, EncodedSizeUser, KemCore, MlKem1024, MlKem1024Params};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::error::{Error, Result};
use crate::stream_cipher::StreamCipher;

pub type EncapsulationKey = ml_kem::kem::EncapsulationKey<MlKem1024Params>;
pub type DecapsulationKey = ml_kem::kem::DecapsulationKey<MlKem1024Params>;

pub const PUBLIC_KEY_LENGTH: usize = 1568;
pub const CIPHERTEXT_LENGTH: usize = 1568;

/// Deterministically derive the ML-KEM-1024 keypair from a `SecretKey`
/// seed (or any 64-byte value — only the first 32 bytes are used to
/// seed the CSPRNG that drives keygen).
pub fn keypair_from_seed(seed: &[u8; 64]) -> (DecapsulationKey, EncapsulationKey) {
    let mut rng_seed = [0u8; 32];
    rng_seed.copy_from_slice(&seed[..32]);
    let mut rng = ChaCha20Rng::from_seed(rng_seed);
    MlKem1024::generate(&mut rng)
}

pub fn public_key_from_seed(seed: &[u8; 64]) -> [u8; PUBLIC_KEY_LENGTH] {
    let (_, ek) = keypair_from_seed(seed);
    let mut out = [0u8; PUBLIC_KEY_LENGTH];
    out.copy_from_slice(ek.as_bytes().as_slice());
    out
}

/// Encrypt `reader` into `writer` under the recipient's raw ML-KEM-1024
/// encapsulation key bytes. Writes the KEM ciphertext (1568 bytes)
/// followed by the `StreamCipher` output.
pub fn encrypt_stream(
    recipient_public: &[u8; PUBLIC_KEY_LENGTH],
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    compress: bool,
) -> Result<()> {
    let ek = EncapsulationKey::from_bytes((*recipient_public).into());

    let mut rng = rand::rngs::OsRng;
    let (kem_ct, shared_secret) = ek
        .encapsulate(&mut rng)
        .map_err(|_| Error::InvalidPublicKey)?;

    writer.write_all(kem_ct.as_slice())?;

    let mut key = [0u8; 32];
    key.copy_from_slice(shared_secret.as_slice());
    StreamCipher::new(&key).encrypt_stream(reader, writer, compress)
}

/// Decrypt `reader` into `writer` using the recipient's 64-byte
/// `SecretKey` seed (the ML-KEM-1024 decapsulation key is rederived
/// from it deterministically).
pub fn decrypt_stream(secret_seed: &[u8; 64], reader: &mut dyn Read, writer: &mut dyn Write) -> Result<()> {
    let (dk, _) = keypair_from_seed(secret_seed);

    let mut kem_ct_bytes = [0u8; CIPHERTEXT_LENGTH];
    reader
        .read_exact(&mut kem_ct_bytes)
        .map_err(|_| Error::InvalidCiphertext)?;
    let kem_ct = Ciphertext::<MlKem1024>::try_from(kem_ct_bytes.as_slice())
        .map_err(|_| Error::InvalidCiphertext)?;

    let shared_secret = dk
        .decapsulate(&kem_ct)
        .map_err(|_| Error::InvalidCiphertext)?;

    let mut key = [0u8; 32];
    key.copy_from_slice(shared_secret.as_slice());
    StreamCipher::new(&key).decrypt_stream(reader, writer)
}
