//! XChaCha20-Poly1305 framed AEAD with optional zlib compression.
//!
//! # Message Format
//!
//! ```text
//! [ nonce (24) ] [ compress_flag (1) ]
//! [ aead block 1: up to 65536 plaintext bytes -> +16-byte tag ]
//! [ aead block 2: … ]
//!   ⋮
//! [ final aead block: <= 65536 plaintext bytes -> +16-byte tag, possibly empty ]
//! ```
//!
//! This stream reuses a single fresh nonce for
//! every block of the stream and has no length framing at all: the
//! block size is fixed (`P`), so block boundaries are implicit, and
//! end-of-stream is signalled by end-of-source rather than by a marker.
//! A truncated stream is indistinguishable from a short final block
//! until the final block's tag is checked — which is why decryption
//! must never surface plaintext before the corresponding tag verifies.

use std::io::{Read, Write};

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::compress::{CompressSource, ExtractSink};
use crate::error::{Error, Result};

/// Plaintext block size.
pub const BLOCK_SIZE: usize = 64 * 1024;
/// AEAD tag overhead.
pub const TAG_OVERHEAD: usize = 16;
/// Ciphertext block size.
pub const CIPHER_BLOCK_SIZE: usize = BLOCK_SIZE + TAG_OVERHEAD;
/// Nonce size (XChaCha20-Poly1305 uses a 192-bit/24-byte nonce).
pub const NONCE_LENGTH: usize = 24;
/// Symmetric key size.
pub const KEY_LENGTH: usize = 32;

/// A 32-byte symmetric key turned into a streaming, authenticated,
/// optionally-compressed channel.
pub struct StreamCipher {
    aead: XChaCha20Poly1305,
}

impl StreamCipher {
    pub fn new(key: &[u8; KEY_LENGTH]) -> Self {
        Self {
            aead: XChaCha20Poly1305::new(key.into()),
        }
    }

    /// Encrypt `reader` into `writer`. Writes a fresh nonce and the
    /// compression flag up front, then a sequence of sealed blocks
    /// (the same nonce reused for every block of this stream).
    pub fn encrypt_stream(
        &self,
        reader: &mut dyn Read,
        writer: &mut dyn Write,
        compress: bool,
    ) -> Result<()> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = XNonce::from_slice(&nonce_bytes);

        writer.write_all(&nonce_bytes)?;
        writer.write_all(&[u8::from(compress)])?;

        let mut compressed_source;
        let source: &mut dyn Read = if compress {
            compressed_source = CompressSource::new(reader);
            &mut compressed_source
        } else {
            reader
        };

        let mut buf = vec![0u8; BLOCK_SIZE];
        loop {
            let filled = read_fill(source, &mut buf)?;
            let sealed = self
                .aead
                .encrypt(nonce, &buf[..filled])
                .expect("sealing a bounded plaintext block with a valid key/nonce cannot fail");
            writer.write_all(&sealed)?;
            if filled < BLOCK_SIZE {
                break;
            }
        }

        Ok(())
    }

    /// Decrypt `reader` into `writer`. Reads the nonce and compression
    /// flag, then opens blocks until end-of-source. Any AEAD open
    /// failure fails the whole stream with `InvalidCiphertext`, and no
    /// partial plaintext from the failing block is surfaced.
    pub fn decrypt_stream(&self, reader: &mut dyn Read, writer: &mut dyn Write) -> Result<()> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        reader
            .read_exact(&mut nonce_bytes)
            .map_err(|_| Error::InvalidCiphertext)?;
        let nonce = XNonce::from_slice(&nonce_bytes);

        let mut compress_flag = [0u8; 1];
        reader
            .read_exact(&mut compress_flag)
            .map_err(|_| Error::InvalidCiphertext)?;
        let compress = compress_flag[0] != 0;

        if compress {
            let mut extracted = ExtractSink::new(writer);
            self.decrypt_blocks(reader, &mut extracted, nonce)?;
            extracted.finish()?;
        } else {
            self.decrypt_blocks(reader, writer, nonce)?;
        }

        Ok(())
    }

    fn decrypt_blocks(
        &self,
        reader: &mut dyn Read,
        sink: &mut dyn Write,
        nonce: &XNonce,
    ) -> Result<()> {
        let mut buf = vec![0u8; CIPHER_BLOCK_SIZE];
        loop {
            let filled = read_fill(reader, &mut buf)?;
            if filled == 0 {
                break;
            }
            let block = self
                .aead
                .decrypt(nonce, &buf[..filled])
                .map_err(|_| Error::InvalidCiphertext)?;
            sink.write_all(&block)?;
            if filled < CIPHER_BLOCK_SIZE {
                break;
            }
        }
        Ok(())
    }
}

/// Read from `source` until `buf` is full or the source is exhausted.
/// Returns the number of bytes actually filled, which is `< buf.len()`
/// exactly when the source hit EOF before filling the buffer.
fn read_fill(source: &mut dyn Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
