//! Password/key-based asymmetric and symmetric encryption.
//!
//! See `adapters` for the boundary API the CLI is built on; the
//! cryptographic core lives in `stream_cipher`, `kem`, `kdf`, `keys`,
//! `container`, and `envelope`, layered as described in `DESIGN.md`.

pub mod adapters;
pub mod compress;
pub mod container;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod kem;
pub mod keys;
pub mod stream_cipher;

pub use error::{Error, Result};
