//! X25519 ephemeral-static KEM → StreamCipher.

use std::io::{Read, Write};

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::Result;
use crate::stream_cipher::StreamCipher;

pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const SCALAR_LENGTH: usize = 32;

/// Derive the X25519 static public key from a 32-byte scalar.
pub fn public_key_from_scalar(scalar: &[u8; SCALAR_LENGTH]) -> [u8; PUBLIC_KEY_LENGTH] {
    let secret = x25519_dalek::StaticSecret::from(*scalar);
    x25519_dalek::PublicKey::from(&secret).to_bytes()
}

/// Encrypt `reader` into `writer` under the recipient's raw X25519
/// public key. Writes the ephemeral public key (32 bytes) followed by
/// the `StreamCipher` output.
pub fn encrypt_stream(
    recipient_public: &[u8; PUBLIC_KEY_LENGTH],
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    compress: bool,
) -> Result<()> {
    let mut ephemeral_scalar = [0u8; SCALAR_LENGTH];
    OsRng.fill_bytes(&mut ephemeral_scalar);

    let ephemeral_public = public_key_from_scalar(&ephemeral_scalar);
    let shared = x25519_dalek::x25519(ephemeral_scalar, *recipient_public);

    writer.write_all(&ephemeral_public)?;
    StreamCipher::new(&shared).encrypt_stream(reader, writer, compress)
}

/// Decrypt `reader` into `writer` under the recipient's 32-byte X25519
/// scalar. Reads the ephemeral public key, recomputes the shared
/// secret, and continues with `StreamCipher`.
pub fn decrypt_stream(
    secret_scalar: &[u8; SCALAR_LENGTH],
    reader: &mut dyn Read,
    writer: &mut dyn Write,
) -> Result<()> {
    let mut ephemeral_public = [0u8; PUBLIC_KEY_LENGTH];
    reader
        .read_exact(&mut ephemeral_public)
        .map_err(|_| crate::error::Error::InvalidCiphertext)?;

    let shared = x25519_dalek::x25519(*secret_scalar, ephemeral_public);
    StreamCipher::new(&shared).decrypt_stream(reader, writer)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn encrypt_decrypt_round_trips() {
        let scalar = [3u8; SCALAR_LENGTH];
        let public = public_key_from_scalar(&scalar);

        let plaintext = b"quantum-safe? not yet.";
        let mut ciphertext = Vec::new();
        encrypt_stream(
            &public,
            &mut Cursor::new(plaintext.as_slice()),
            &mut ciphertext,
            false,
        )
        .unwrap();

        let mut decrypted = Vec::new();
        decrypt_stream(&scalar, &mut Cursor::new(ciphertext), &mut decrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn ephemeral_key_differs_each_time() {
        let scalar = [3u8; SCALAR_LENGTH];
        let public = public_key_from_scalar(&scalar);

        let mut a = Vec::new();
        let mut b = Vec::new();
        encrypt_stream(&public, &mut Cursor::new(b"x".as_slice()), &mut a, false).unwrap();
        encrypt_stream(&public, &mut Cursor::new(b"x".as_slice()), &mut b, false).unwrap();
        assert_ne!(&a[..PUBLIC_KEY_LENGTH], &b[..PUBLIC_KEY_LENGTH]);
    }
}
