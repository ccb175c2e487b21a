//! `XCT_`/`XPK_`/`XSK_` prefixes + base32 (RFC 4648, no padding).
//!
//! The `base32` crate has no streaming
//! counterpart, so `Base32Sink` buffers to 5-byte groups (the base32
//! block size) and `Base32Source` decodes the whole remaining input
//! eagerly on construction — still presented behind the `Read`/`Write`
//! interface the rest of the pipeline expects, but not memory-bounded
//! the way the ciphertext's own block framing is. See `DESIGN.md`.

use std::io::{self, Read, Write};

use base32::Alphabet;

use crate::error::{Error, Result};

const ALPHABET: Alphabet = Alphabet::Rfc4648 { padding: false };

pub const CIPHERTEXT_PREFIX: &str = "XCT_";
pub const PUBLIC_KEY_PREFIX: &str = "XPK_";
pub const SECRET_KEY_PREFIX: &str = "XSK_";

/// Fixed length of the base32 body of a serialised `XSK_` secret key
/// (66 raw bytes, no padding).
pub const SECRET_KEY_BASE32_LENGTH: usize = 106;

// --- Whole-buffer helpers, for keys (small, always in memory). ---

#[must_use]
pub fn encode_public_key(bytes: &[u8]) -> String {
    format!("{PUBLIC_KEY_PREFIX}{}", base32::encode(ALPHABET, bytes))
}

pub fn decode_public_key_str(s: &str) -> Result<Vec<u8>> {
    let body = s.strip_prefix(PUBLIC_KEY_PREFIX).ok_or(Error::InvalidPublicKey)?;
    base32::decode(ALPHABET, body).ok_or(Error::InvalidPublicKey)
}

#[must_use]
pub fn encode_secret_key(bytes: &[u8]) -> String {
    format!("{SECRET_KEY_PREFIX}{}", base32::encode(ALPHABET, bytes))
}

pub fn decode_secret_key_str(s: &str) -> Result<Vec<u8>> {
    let body = s.strip_prefix(SECRET_KEY_PREFIX).ok_or(Error::InvalidSecretKey)?;
    let is_valid_shape = body.len() == SECRET_KEY_BASE32_LENGTH
        && body.bytes().all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b));
    if !is_valid_shape {
        return Err(Error::InvalidSecretKey);
    }
    base32::decode(ALPHABET, body).ok_or(Error::InvalidSecretKey)
}

#[must_use]
pub fn encode_ciphertext(bytes: &[u8]) -> String {
    format!("{CIPHERTEXT_PREFIX}{}", base32::encode(ALPHABET, bytes))
}

// --- Streaming, for ciphertext (potentially large). ---

/// When written to, it base32-encodes the bytes and forwards them.
pub struct Base32Sink<'a> {
    writer: &'a mut dyn Write,
    pending: Vec<u8>,
}

impl<'a> Base32Sink<'a> {
    pub fn new(writer: &'a mut dyn Write) -> Self {
        Self {
            writer,
            pending: Vec::new(),
        }
    }

    /// Flush any residual (< 5-byte) group. Must be called after the
    /// encryption layer has been closed, so its last AEAD block is
    /// already in `pending`.
    pub fn finish(mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let encoded = base32::encode(ALPHABET, &self.pending);
            self.writer.write_all(encoded.as_bytes())?;
        }
        self.writer.flush()
    }
}

impl Write for Base32Sink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let whole_len = (self.pending.len() / 5) * 5;
        if whole_len > 0 {
            let chunk: Vec<u8> = self.pending.drain(..whole_len).collect();
            let encoded = base32::encode(ALPHABET, &chunk);
            self.writer.write_all(encoded.as_bytes())?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// When read from, it yields the base32-decoded bytes of the remaining
/// input.
pub struct Base32Source {
    cursor: io::Cursor<Vec<u8>>,
}

impl Base32Source {
    pub fn new(reader: &mut dyn Read) -> io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let decoded = base32::decode(ALPHABET, text.trim_end())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "invalid base32"))?;
        Ok(Self {
            cursor: io::Cursor::new(decoded),
        })
    }
}

impl Read for Base32Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

/// Start an encrypting writer with the `XCT_` text envelope: writes the
/// prefix, then returns a base32 sink for the encryption layer to write
/// into. Caller must close the encryption layer *before* calling
/// `Base32Sink::finish` (compressor → AEAD framer → base32 encoder, in
/// that order).
pub fn encoding_writer<'a>(dst: &'a mut dyn Write) -> io::Result<Base32Sink<'a>> {
    dst.write_all(CIPHERTEXT_PREFIX.as_bytes())?;
    Ok(Base32Sink::new(dst))
}

/// Peek the first `len("XCT_")` bytes of `src`. If they match, consume
/// them and wrap the rest in a base32 decoder; otherwise replay the
/// peeked bytes in front of the untouched reader.
pub fn decrypting_reader<'a>(src: &'a mut (dyn Read + 'a)) -> Result<Box<dyn Read + 'a>> {
    let mut peek = [0u8; CIPHERTEXT_PREFIX.len()];
    let mut filled = 0;
    while filled < peek.len() {
        let n = src.read(&mut peek[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    if filled == peek.len() && peek == *CIPHERTEXT_PREFIX.as_bytes() {
        Ok(Box::new(Base32Source::new(src)?))
    } else {
        let replay = io::Cursor::new(peek[..filled].to_vec());
        Ok(Box::new(replay.chain(src)))
    }
}

/// Extract the first query-string value matching `predicate` from a
/// URL, or trim the input when it isn't a URL. CLI convenience only,
/// not part of the core invariants.
#[must_use]
pub fn sanitize_url_or_trim(input: &str, predicate: impl Fn(&str) -> bool) -> String {
    let trimmed = input.trim();
    let Some((_, query)) = trimmed.split_once('?') else {
        return trimmed.to_string();
    };
    let fragment_stripped = query.split('#').next().unwrap_or(query);
    for pair in fragment_stripped.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if predicate(key) {
                return value.to_string();
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_bytes_round_trip_through_envelope() {
        let bytes = vec![1, 2, 3, 4, 5, 6, 7];
        let encoded = encode_public_key(&bytes);
        assert!(encoded.starts_with(PUBLIC_KEY_PREFIX));
        assert_eq!(decode_public_key_str(&encoded).unwrap(), bytes);
    }

    #[test]
    fn secret_key_string_has_fixed_shape() {
        let bytes = vec![0u8; 66];
        let encoded = encode_secret_key(&bytes);
        assert_eq!(encoded.len(), SECRET_KEY_PREFIX.len() + SECRET_KEY_BASE32_LENGTH);
        assert_eq!(decode_secret_key_str(&encoded).unwrap(), bytes);
    }

    #[test]
    fn ciphertext_stream_round_trips_with_prefix() {
        let payload = b"hello, world!".repeat(50);

        let mut encoded = Vec::new();
        {
            let mut sink = encoding_writer(&mut encoded).unwrap();
            sink.write_all(&payload).unwrap();
            sink.finish().unwrap();
        }
        assert!(encoded.starts_with(CIPHERTEXT_PREFIX.as_bytes()));

        let mut reader: &[u8] = &encoded;
        let mut decoding: Box<dyn Read> = decrypting_reader(&mut reader).unwrap();
        let mut decoded = Vec::new();
        decoding.read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn decrypting_reader_passes_through_without_prefix() {
        let payload = b"raw binary container bytes".to_vec();
        let mut reader: &[u8] = &payload;
        let mut passthrough = decrypting_reader(&mut reader).unwrap();
        let mut out = Vec::new();
        passthrough.read_to_end(&mut out).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn sanitize_url_extracts_matching_query_value() {
        let url = "https://example.com/?xt=XCT_ABCDEF";
        assert_eq!(
            sanitize_url_or_trim(url, |k| k == "xt"),
            "XCT_ABCDEF"
        );
    }

    #[test]
    fn sanitize_url_trims_non_url_input() {
        assert_eq!(sanitize_url_or_trim("  XCT_ABCDEF  ", |k| k == "xt"), "XCT_ABCDEF");
    }
}
