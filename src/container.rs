//! Four-mode ciphertext container.
//!
//! ```text
//! [ mode_tag(1) ] [ kdf_spec(19) if Pwd* ] [ body ]
//! ```
//!
//! `body` is either an `AsymSelector` stream (asymmetric modes, which
//! themselves prefix an algo tag) or a bare `StreamCipher` stream
//! (symmetric modes).

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::kdf::{self, KdfSpec};
use crate::keys::{self, PublicKey, SecretKey};
use crate::kem;
use crate::stream_cipher::StreamCipher;

pub const MODE_KEY_ASYM: u8 = 0;
pub const MODE_PWD_ASYM: u8 = 1;
pub const MODE_KEY_SYM: u8 = 2;
pub const MODE_PWD_SYM: u8 = 3;

/// Encrypt under a `SecretKey` directly (symmetric modes 2/3).
pub fn encrypt_symmetric(
    secret: &SecretKey,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    compress: bool,
) -> Result<()> {
    if secret.is_password() {
        writer.write_all(&[MODE_PWD_SYM])?;
        writer.write_all(
            &secret
                .spec()
                .expect("a Password SecretKey always carries its own KdfSpec")
                .to_bytes(),
        )?;
    } else {
        writer.write_all(&[MODE_KEY_SYM])?;
    }

    let key = keys::symmetric_key_from_seed(&secret_active_seed(secret));
    StreamCipher::new(&key).encrypt_stream(reader, writer, compress)
}

/// Encrypt under a `PublicKey` (asymmetric modes 0/1).
pub fn encrypt_asymmetric(
    public: &PublicKey,
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    compress: bool,
) -> Result<()> {
    if public.is_password() {
        writer.write_all(&[MODE_PWD_ASYM])?;
        writer.write_all(
            &public
                .spec()
                .expect("a Password PublicKey always carries its own KdfSpec")
                .to_bytes(),
        )?;
    } else {
        writer.write_all(&[MODE_KEY_ASYM])?;
    }

    public.encrypt_stream(reader, writer, compress)
}

/// Decrypt under a `SecretKey`, dispatching on the mode tag. Fails with
/// `DecryptionFailedKeyRequired`/`DecryptionFailedPwdRequired` when the
/// ciphertext's mode doesn't match the key's own type.
pub fn decrypt(secret: &SecretKey, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<()> {
    let mut mode = [0u8; 1];
    reader.read_exact(&mut mode).map_err(|_| Error::InvalidCiphertext)?;

    match mode[0] {
        MODE_KEY_ASYM if secret.is_password() => Err(Error::DecryptionFailedKeyRequired),
        MODE_KEY_SYM if secret.is_password() => Err(Error::DecryptionFailedKeyRequired),
        MODE_PWD_ASYM if !secret.is_password() => Err(Error::DecryptionFailedPwdRequired),
        MODE_PWD_SYM if !secret.is_password() => Err(Error::DecryptionFailedPwdRequired),

        MODE_KEY_ASYM => kem::decrypt_stream(&secret.seed_bytes(), reader, writer),
        MODE_PWD_ASYM => {
            let spec = read_spec(reader)?;
            let seed = secret.seed_for_spec(&spec)?;
            kem::decrypt_stream(&seed, reader, writer)
        }
        MODE_KEY_SYM => {
            let key = secret.symmetric_key();
            StreamCipher::new(&key).decrypt_stream(reader, writer)
        }
        MODE_PWD_SYM => {
            let spec = read_spec(reader)?;
            let seed = secret.seed_for_spec(&spec)?;
            let key = keys::symmetric_key_from_seed(&seed);
            StreamCipher::new(&key).decrypt_stream(reader, writer)
        }
        _ => Err(Error::InvalidCiphertext),
    }
}

fn read_spec(reader: &mut dyn Read) -> Result<KdfSpec> {
    let mut buf = [0u8; kdf::SPEC_LENGTH];
    reader.read_exact(&mut buf).map_err(|_| Error::InvalidCiphertext)?;
    KdfSpec::from_bytes(&buf)?.ok_or(Error::InvalidCiphertext)
}

/// The 64-byte seed currently active for symmetric use: for a `Direct`
/// key this is the key's own seed; for a `Password` key it is the seed
/// already derived at construction (under the key's own spec).
fn secret_active_seed(secret: &SecretKey) -> [u8; keys::SEED_LENGTH] {
    secret.seed_bytes()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn round_trip_symmetric(secret: &SecretKey, plaintext: &[u8]) -> Vec<u8> {
        let mut ciphertext = Vec::new();
        encrypt_symmetric(secret, &mut Cursor::new(plaintext), &mut ciphertext, false).unwrap();
        let mut out = Vec::new();
        decrypt(secret, &mut Cursor::new(ciphertext), &mut out).unwrap();
        out
    }

    #[test]
    fn direct_key_symmetric_round_trips_with_mode_tag() {
        let secret = SecretKey::new();
        let mut ciphertext = Vec::new();
        encrypt_symmetric(&secret, &mut Cursor::new(b"hi".as_slice()), &mut ciphertext, false).unwrap();
        assert_eq!(ciphertext[0], MODE_KEY_SYM);
        assert_eq!(round_trip_symmetric(&secret, b"hello"), b"hello");
    }

    #[test]
    fn password_key_symmetric_round_trips_with_mode_tag_and_spec() {
        let secret = SecretKey::for_password(b"hunter2").unwrap();
        let mut ciphertext = Vec::new();
        encrypt_symmetric(&secret, &mut Cursor::new(b"hi".as_slice()), &mut ciphertext, false).unwrap();
        assert_eq!(ciphertext[0], MODE_PWD_SYM);
        assert_eq!(round_trip_symmetric(&secret, b"hello"), b"hello");
    }

    #[test]
    fn direct_key_asymmetric_round_trips() {
        let secret = SecretKey::new();
        let public = secret.public_key(false);

        let mut ciphertext = Vec::new();
        encrypt_asymmetric(&public, &mut Cursor::new(b"hi".as_slice()), &mut ciphertext, false).unwrap();
        assert_eq!(ciphertext[0], MODE_KEY_ASYM);

        let mut out = Vec::new();
        decrypt(&secret, &mut Cursor::new(ciphertext), &mut out).unwrap();
        assert_eq!(out, b"hi");
    }

    #[test]
    fn password_key_asymmetric_round_trips() {
        let secret = SecretKey::for_password(b"hunter2").unwrap();
        let public = secret.public_key(true);

        let mut ciphertext = Vec::new();
        encrypt_asymmetric(&public, &mut Cursor::new(b"hi".as_slice()), &mut ciphertext, false).unwrap();
        assert_eq!(ciphertext[0], MODE_PWD_ASYM);

        let mut out = Vec::new();
        decrypt(&secret, &mut Cursor::new(ciphertext), &mut out).unwrap();
        assert_eq!(out, b"hi");
    }

    #[test]
    fn mode_mismatch_is_rejected() {
        let direct = SecretKey::new();
        let password = SecretKey::for_password(b"hunter2").unwrap();

        let mut ciphertext = Vec::new();
        encrypt_symmetric(&direct, &mut Cursor::new(b"hi".as_slice()), &mut ciphertext, false).unwrap();

        let mut out = Vec::new();
        assert_eq!(
            decrypt(&password, &mut Cursor::new(ciphertext.clone()), &mut out),
            Err(Error::DecryptionFailedKeyRequired)
        );

        let mut ciphertext = Vec::new();
        encrypt_symmetric(&password, &mut Cursor::new(b"hi".as_slice()), &mut ciphertext, false).unwrap();
        let mut out = Vec::new();
        assert_eq!(
            decrypt(&direct, &mut Cursor::new(ciphertext), &mut out),
            Err(Error::DecryptionFailedPwdRequired)
        );
    }

    #[test]
    fn wrong_key_fails_to_decrypt() {
        let secret = SecretKey::new();
        let other = SecretKey::new();

        let mut ciphertext = Vec::new();
        encrypt_symmetric(&secret, &mut Cursor::new(b"hi".as_slice()), &mut ciphertext, false).unwrap();

        let mut out = Vec::new();
        assert_eq!(
            decrypt(&other, &mut Cursor::new(ciphertext), &mut out),
            Err(Error::InvalidCiphertext)
        );
    }
}
