//! Boundary API consumed by the CLI (and, in principle, WASM/C callers).
//! Resolves the key-or-password sum type by prefix, then dispatches
//! into the `container` module.

use std::io::{Cursor, Read, Write};

use crate::container;
use crate::envelope;
use crate::error::{Error, Result};
use crate::keys::{PublicKey, SecretKey};

/// Maximum ciphertext length for which `encrypt_data`/`get_public_key`
/// still fabricate a convenience URL.
pub const MAX_URL_CIPHERTEXT_LENGTH: usize = 65_536;

enum KeyOrPassword {
    Public(PublicKey),
    Secret(SecretKey),
    Password(String),
}

fn resolve_key_or_password(s: &str) -> KeyOrPassword {
    if let Ok(public) = PublicKey::parse_str(s) {
        return KeyOrPassword::Public(public);
    }
    if let Ok(secret) = SecretKey::parse_str(s) {
        return KeyOrPassword::Secret(secret);
    }
    KeyOrPassword::Password(s.to_string())
}

fn resolve_secret_or_password(s: &str) -> Result<SecretKey> {
    if let Ok(secret) = SecretKey::parse_str(s) {
        return Ok(secret);
    }
    SecretKey::for_password(s.as_bytes())
}

fn encrypt_into(key_or_pwd: &str, reader: &mut dyn Read, writer: &mut dyn Write, compress: bool) -> Result<()> {
    match resolve_key_or_password(key_or_pwd) {
        KeyOrPassword::Public(public) => container::encrypt_asymmetric(&public, reader, writer, compress),
        KeyOrPassword::Secret(secret) => container::encrypt_symmetric(&secret, reader, writer, compress),
        KeyOrPassword::Password(pwd) => {
            let secret = SecretKey::for_password(pwd.as_bytes())?;
            container::encrypt_symmetric(&secret, reader, writer, compress)
        }
    }
}

fn fabricate_url(web_root: Option<&str>, ct_or_pub: &str, query_key: Option<&str>) -> Option<String> {
    let root = web_root?;
    if ct_or_pub.len() > MAX_URL_CIPHERTEXT_LENGTH {
        return None;
    }
    match query_key {
        Some(key) => Some(format!("{root}?{key}={ct_or_pub}")),
        None => Some(format!("{root}#{ct_or_pub}")),
    }
}

/// Encrypt `plaintext` under `key_or_pwd_str` and return the `XCT_`
/// envelope string, plus a fabricated URL when `web_root` is given and
/// the ciphertext is short enough.
pub fn encrypt_data(
    key_or_pwd_str: &str,
    plaintext: &[u8],
    compress: bool,
    web_root: Option<&str>,
) -> Result<(String, Option<String>)> {
    let mut raw = Vec::new();
    encrypt_into(key_or_pwd_str, &mut Cursor::new(plaintext), &mut raw, compress)?;
    let ct_str = envelope::encode_ciphertext(&raw);
    let url = fabricate_url(web_root, &ct_str, Some("xt"));
    Ok((ct_str, url))
}

/// Decrypt a `ct_str` (an `XCT_…` envelope) under `secret_or_pwd_str`.
pub fn decrypt_data(secret_or_pwd_str: &str, ct_str: &str) -> Result<Vec<u8>> {
    let sanitized = envelope::sanitize_url_or_trim(ct_str, |k| k == "xt");
    if !sanitized.starts_with(envelope::CIPHERTEXT_PREFIX) {
        return Err(Error::InvalidCiphertext);
    }

    let mut reader: &[u8] = sanitized.as_bytes();
    let mut raw = Box::new(envelope::decrypting_reader(&mut reader)?);

    let secret = resolve_secret_or_password(secret_or_pwd_str)?;
    let mut plaintext = Vec::new();
    container::decrypt(&secret, raw.as_mut(), &mut plaintext)?;
    Ok(plaintext)
}

/// Streaming counterpart of `encrypt_data`. `encode` wraps the output
/// in the `XCT_` base32 text envelope; otherwise the raw binary
/// container is written directly.
pub fn encrypt_stream(
    key_or_pwd_str: &str,
    dst: &mut dyn Write,
    src: &mut dyn Read,
    compress: bool,
    encode: bool,
) -> Result<()> {
    if encode {
        let mut sink = envelope::encoding_writer(dst)?;
        encrypt_into(key_or_pwd_str, src, &mut sink, compress)?;
        sink.finish()?;
        Ok(())
    } else {
        encrypt_into(key_or_pwd_str, src, dst, compress)
    }
}

/// Streaming counterpart of `decrypt_data`. Auto-detects the `XCT_`
/// text envelope on `src`.
pub fn decrypt_stream(secret_or_pwd_str: &str, dst: &mut dyn Write, src: &mut dyn Read) -> Result<()> {
    let secret = resolve_secret_or_password(secret_or_pwd_str)?;
    let mut raw = envelope::decrypting_reader(src)?;
    container::decrypt(&secret, raw.as_mut(), dst)
}

/// Resolve `secret_or_pwd_str` to a `SecretKey`, derive its `PublicKey`
/// (ECC or PQ per `pq`), and return the `XPK_` envelope string plus a
/// fabricated URL when `web_root` is given and the key is short enough.
pub fn get_public_key(
    secret_or_pwd_str: &str,
    pq: bool,
    web_root: Option<&str>,
) -> Result<(String, Option<String>)> {
    let secret = resolve_secret_or_password(secret_or_pwd_str)?;
    let public = secret.public_key(pq);
    let pub_str = public.to_envelope_string();
    let url = fabricate_url(web_root, &pub_str, None);
    Ok((pub_str, url))
}
