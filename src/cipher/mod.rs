mod capability;
mod chacha;
mod pipe;
mod rc4_md5;
pub mod registry;


pub use capability::{is_supported, is_supported_by, supported_methods, supported_methods_by};
pub use registry::{lookup, CipherInfo, CipherKind};

use self::chacha::ChaCha;
use self::pipe::Pipe;
use self::rc4_md5::Rc4Md5;
use crate::backend::{default_backend, Backend, BoxedKdf, Direction};
use crate::error::{Error, Result};
use crate::utils::random_bytes;
use std::fmt::{Debug, Formatter};

/// The hash → HMAC → HKDF chain used for AEAD subkeys.
pub const SUBKEY_KDF: &str = "HKDF(HMAC(SHA-160))";
pub const SUBKEY_LABEL: &[u8] = b"ss-subkey";

enum Adapter {
    LegacyStream(Rc4Md5),
    ModernStream(ChaCha),
    Pipe(Pipe),
}

impl Adapter {
    fn name(&self) -> &'static str {
        match self {
            Self::LegacyStream(_) => "RC4-MD5",
            Self::ModernStream(_) => "ChaCha20",
            Self::Pipe(_) => "pipe",
        }
    }
}

/// One direction of an encrypted session.
///
/// An engine is bound to a method, key and IV for its whole life: to re-key,
/// build a new one. `update` keeps the running cipher state, so chunks must be
/// fed in order.
pub struct Cipher {
    method: String,
    info: &'static CipherInfo,
    key: Vec<u8>,
    iv: Vec<u8>,
    direction: Direction,
    adapter: Adapter,
    kdf: Option<BoxedKdf>,
}

impl Debug for Cipher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher")
            .field("method", &self.method)
            .field("direction", &self.direction)
            .field("adapter", &self.adapter.name())
            .field("key", &"******")
            .finish()
    }
}

impl Cipher {
    pub fn new(method: &str, key: &[u8], iv: &[u8], direction: Direction) -> Result<Self> {
        Self::with_backend(default_backend(), method, key, iv, direction)
    }

    pub fn with_backend(
        backend: &dyn Backend,
        method: &str,
        key: &[u8],
        iv: &[u8],
        direction: Direction,
    ) -> Result<Self> {
        let info = registry::lookup(method).map_err(|e| {
            log::error!("Refusing to create cipher: {e}");
            e
        })?;

        let initialise_err = |source: anyhow::Error| Error::Initialise {
            method: method.to_string(),
            source,
        };

        let mut kdf = None;
        let adapter = if method.contains("rc4") {
            Adapter::LegacyStream(Rc4Md5::new(key, iv))
        } else if method.contains("chacha20") && !backend.provides_chacha20() {
            Adapter::ModernStream(ChaCha::new(key, iv).map_err(initialise_err)?)
        } else {
            if info.is_aead() {
                kdf = Some(backend.kdf(SUBKEY_KDF).map_err(initialise_err)?);
            }

            Adapter::Pipe(Pipe::new(
                backend
                    .keyed_filter(info.internal_name, key, iv, direction)
                    .map_err(initialise_err)?,
            ))
        };

        log::debug!(
            "Created {method} {direction:?} cipher using {} adapter ({})",
            adapter.name(),
            backend.name()
        );

        Ok(Self {
            method: method.to_string(),
            info,
            key: key.to_vec(),
            iv: iv.to_vec(),
            direction,
            adapter,
            kdf,
        })
    }

    /// Encrypts or decrypts the next chunk of the session.
    ///
    /// For stream methods the output has the same length as the input and
    /// chunk boundaries don't matter. For AEAD methods each call is one sealed
    /// message: encrypting appends the tag, decrypting verifies and strips it.
    pub fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        match &mut self.adapter {
            Adapter::LegacyStream(c) => c.update(data),
            Adapter::ModernStream(c) => c.update(data),
            Adapter::Pipe(p) => p.update(data),
        }
        .map_err(Error::Transform)
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn info(&self) -> &'static CipherInfo {
        self.info
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Derives a fresh per-session subkey from the pre-shared key and a new
    /// random salt.
    pub fn derive_subkey(&self) -> Result<Vec<u8>> {
        let salt = random_bytes(self.info.salt_len);
        self.derive_subkey_with_salt(&salt)
    }

    /// Derives the subkey for a salt received from the peer.
    pub fn derive_subkey_with_salt(&self, salt: &[u8]) -> Result<Vec<u8>> {
        let kdf = self
            .kdf
            .as_ref()
            .ok_or_else(|| Error::NotAead(self.method.clone()))?;

        kdf.derive_key(self.info.key_len, &self.key, salt, SUBKEY_LABEL)
            .map_err(Error::KeyDerivation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use maplit::hashset;

    fn fake() -> FakeBackend {
        FakeBackend::new(hashset! {"AES-256/CFB", "ChaCha", "AES-128/GCM"}, false)
    }

    #[test]
    fn rc4_method_never_reaches_backend() {
        let backend = fake();
        let c = Cipher::with_backend(
            &backend,
            "rc4-md5",
            &[1u8; 16],
            &[2u8; 16],
            Direction::Encrypt,
        )
        .unwrap();

        assert!(matches!(c.adapter, Adapter::LegacyStream(_)));
        assert!(backend.requests.lock().is_empty());
        assert!(backend.kdf_requests.lock().is_empty());
    }

    #[test]
    fn chacha_uses_native_adapter_when_backend_lacks_it() {
        let backend = fake();
        let c = Cipher::with_backend(
            &backend,
            "chacha20-ietf",
            &[1u8; 32],
            &[2u8; 12],
            Direction::Decrypt,
        )
        .unwrap();

        assert!(matches!(c.adapter, Adapter::ModernStream(_)));
        assert!(backend.requests.lock().is_empty());
    }

    #[test]
    fn chacha_uses_backend_when_available() {
        let backend = FakeBackend::new(hashset! {"ChaCha"}, true);
        let c = Cipher::with_backend(
            &backend,
            "chacha20",
            &[1u8; 32],
            &[2u8; 8],
            Direction::Decrypt,
        )
        .unwrap();

        assert!(matches!(c.adapter, Adapter::Pipe(_)));
        assert_eq!(
            vec![("ChaCha".to_string(), Direction::Decrypt)],
            *backend.requests.lock()
        );
    }

    #[test]
    fn pipe_adapter_is_built_with_internal_name() {
        let backend = fake();
        let mut c = Cipher::with_backend(
            &backend,
            "aes-256-cfb",
            &[3u8; 32],
            &[4u8; 16],
            Direction::Encrypt,
        )
        .unwrap();

        assert!(matches!(c.adapter, Adapter::Pipe(_)));
        assert_eq!(
            vec![("AES-256/CFB".to_string(), Direction::Encrypt)],
            *backend.requests.lock()
        );
        assert!(backend.kdf_requests.lock().is_empty());
        assert!(c.kdf.is_none());
        assert_eq!(&[4u8; 16], c.iv());
        assert_eq!(3, c.update(b"abc").unwrap().len());
    }

    #[test]
    fn aead_method_builds_kdf() {
        let backend = fake();
        let c = Cipher::with_backend(
            &backend,
            "aes-256-gcm",
            &[5u8; 32],
            &[6u8; 12],
            Direction::Encrypt,
        )
        .unwrap();

        assert_eq!(vec![SUBKEY_KDF.to_string()], *backend.kdf_requests.lock());
        assert_eq!(
            vec![("AES-128/GCM".to_string(), Direction::Encrypt)],
            *backend.requests.lock()
        );
        assert!(c.kdf.is_some());
    }

    #[test]
    fn unknown_method_fails() {
        let backend = fake();
        let err = Cipher::with_backend(&backend, "rot13", &[], &[], Direction::Encrypt)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(_)));
        assert!(err.is_configuration());
        assert!(backend.requests.lock().is_empty());
    }

    #[test]
    fn backend_failure_is_a_configuration_error() {
        let backend = fake();
        let err = Cipher::with_backend(
            &backend,
            "seed-cfb",
            &[0u8; 16],
            &[0u8; 16],
            Direction::Encrypt,
        )
        .unwrap_err();

        assert!(matches!(&err, Error::Initialise { method, .. } if method == "seed-cfb"));
        assert!(err.is_configuration());
    }

    #[test]
    fn derive_subkey_works() {
        let backend = fake();
        let c = Cipher::with_backend(
            &backend,
            "aes-256-gcm",
            &rand::random::<[u8; 32]>(),
            &[0u8; 12],
            Direction::Encrypt,
        )
        .unwrap();

        let a = c.derive_subkey().unwrap();
        let b = c.derive_subkey().unwrap();
        assert_eq!(c.info().key_len, a.len());
        assert_eq!(c.info().key_len, b.len());
        assert_ne!(a, b);

        let salt = [9u8; 32];
        assert_eq!(
            c.derive_subkey_with_salt(&salt).unwrap(),
            c.derive_subkey_with_salt(&salt).unwrap()
        );
    }

    #[test]
    fn derive_subkey_on_stream_cipher_fails() {
        let c = Cipher::with_backend(
            &fake(),
            "aes-256-cfb",
            &[0u8; 32],
            &[0u8; 16],
            Direction::Encrypt,
        )
        .unwrap();

        let err = c.derive_subkey().unwrap_err();
        assert!(matches!(err, Error::NotAead(m) if m == "aes-256-cfb"));
    }

    #[test]
    fn debug_hides_key() {
        let c = Cipher::with_backend(
            &fake(),
            "rc4-md5",
            b"very secret key!",
            &[0u8; 16],
            Direction::Encrypt,
        )
        .unwrap();

        let printed = format!("{c:?}");
        assert!(printed.contains("rc4-md5"));
        assert!(!printed.contains("very secret"));
    }
}
