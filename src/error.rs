//! Error taxonomy shared by every layer of the cryptographic core.

use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A password-based operation was given an empty password.
    InvalidPassword,
    /// Malformed mode tag, truncated header, AEAD open failure, bad
    /// base32, or a base32 length that doesn't match the expected key
    /// shape.
    InvalidCiphertext,
    InvalidPublicKey,
    InvalidSecretKey,
    /// A `KdfSpec` with a zero parameter alongside a non-zero salt.
    InvalidKdfSpec,
    /// Tried to serialise a password-derived `SecretKey`.
    SecretKeyUnavailableForPwd,
    /// Ciphertext demands a password; the key on hand is direct.
    DecryptionFailedPwdRequired,
    /// Ciphertext demands a direct key; the key on hand is password-based.
    DecryptionFailedKeyRequired,
    /// Failed to generate a fresh KDF salt.
    GeneratingSalt,
    /// Wraps an underlying `std::io::Error` from the caller-supplied
    /// reader or writer.
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPassword => write!(f, "Password must not be empty."),
            Self::InvalidCiphertext => write!(
                f,
                "\
Could not decrypt input.
You are likely using the wrong key, or the data is corrupted."
            ),
            Self::InvalidPublicKey => write!(f, "Invalid public key."),
            Self::InvalidSecretKey => write!(f, "Invalid secret key."),
            Self::InvalidKdfSpec => write!(f, "Invalid KDF parameter spec."),
            Self::SecretKeyUnavailableForPwd => write!(
                f,
                "Password-derived secret keys cannot be serialised."
            ),
            Self::DecryptionFailedPwdRequired => {
                write!(f, "This ciphertext requires a password to decrypt.")
            }
            Self::DecryptionFailedKeyRequired => {
                write!(f, "This ciphertext requires a secret key to decrypt.")
            }
            Self::GeneratingSalt => write!(f, "Could not generate a random salt."),
            Self::Io(reason) => write!(f, "I/O error: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
