//! The seam between the cipher engine and whatever library provides the
//! actual primitives.
//!
//! Algorithms are addressed by name (`"AES-128/CFB"`, `"ChaCha"`,
//! `"HKDF(HMAC(SHA-160))"`), so the engine never needs to know which concrete
//! type implements a method.

pub mod rust_crypto;

#[cfg(test)]
pub(crate) mod fake;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// A keyed filter. Each call processes one message and returns everything the
/// filter produced for it.
pub trait Transform: Send {
    fn process_msg(&mut self, data: &[u8]) -> anyhow::Result<Vec<u8>>;
}

pub type BoxedTransform = Box<dyn Transform>;

pub trait Kdf: Send + Sync {
    fn derive_key(
        &self,
        len: usize,
        secret: &[u8],
        salt: &[u8],
        label: &[u8],
    ) -> anyhow::Result<Vec<u8>>;
}

pub type BoxedKdf = Box<dyn Kdf>;

pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    /// Whether `keyed_filter` understands `"ChaCha"`. When it doesn't, the
    /// engine falls back to its own ChaCha20 adapter.
    fn provides_chacha20(&self) -> bool;

    fn keyed_filter(
        &self,
        algorithm: &str,
        key: &[u8],
        iv: &[u8],
        direction: Direction,
    ) -> anyhow::Result<BoxedTransform>;

    fn kdf(&self, algorithm: &str) -> anyhow::Result<BoxedKdf>;
}

static DEFAULT_BACKEND: rust_crypto::RustCrypto = rust_crypto::RustCrypto;

/// The backend used by everything that isn't handed one explicitly.
pub fn default_backend() -> &'static dyn Backend {
    &DEFAULT_BACKEND
}
