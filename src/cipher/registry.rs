use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    Stream,
    Aead,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherInfo {
    /// Algorithm name understood by the backend.
    pub internal_name: &'static str,
    pub key_len: usize,
    pub iv_len: usize,
    pub kind: CipherKind,
    /// Zero for stream ciphers.
    pub salt_len: usize,
    /// Zero for stream ciphers.
    pub tag_len: usize,
}

impl CipherInfo {
    const fn stream(internal_name: &'static str, key_len: usize, iv_len: usize) -> Self {
        Self {
            internal_name,
            key_len,
            iv_len,
            kind: CipherKind::Stream,
            salt_len: 0,
            tag_len: 0,
        }
    }

    const fn aead(
        internal_name: &'static str,
        key_len: usize,
        iv_len: usize,
        salt_len: usize,
        tag_len: usize,
    ) -> Self {
        Self {
            internal_name,
            key_len,
            iv_len,
            kind: CipherKind::Aead,
            salt_len,
            tag_len,
        }
    }

    pub fn is_aead(&self) -> bool {
        self.kind == CipherKind::Aead
    }
}

static METHODS: Lazy<BTreeMap<&'static str, CipherInfo>> = Lazy::new(|| {
    BTreeMap::from([
        ("aes-128-cfb", CipherInfo::stream("AES-128/CFB", 16, 16)),
        ("aes-192-cfb", CipherInfo::stream("AES-192/CFB", 24, 16)),
        ("aes-256-cfb", CipherInfo::stream("AES-256/CFB", 32, 16)),
        ("aes-128-ctr", CipherInfo::stream("AES-128/CTR-BE", 16, 16)),
        ("aes-192-ctr", CipherInfo::stream("AES-192/CTR-BE", 24, 16)),
        ("aes-256-ctr", CipherInfo::stream("AES-256/CTR-BE", 32, 16)),
        ("bf-cfb", CipherInfo::stream("Blowfish/CFB", 16, 8)),
        ("camellia-128-cfb", CipherInfo::stream("Camellia-128/CFB", 16, 16)),
        ("camellia-192-cfb", CipherInfo::stream("Camellia-192/CFB", 24, 16)),
        ("camellia-256-cfb", CipherInfo::stream("Camellia-256/CFB", 32, 16)),
        ("cast5-cfb", CipherInfo::stream("CAST-128/CFB", 16, 8)),
        ("chacha20", CipherInfo::stream("ChaCha", 32, 8)),
        ("chacha20-ietf", CipherInfo::stream("ChaCha", 32, 12)),
        ("des-cfb", CipherInfo::stream("DES/CFB", 8, 8)),
        ("idea-cfb", CipherInfo::stream("IDEA/CFB", 16, 8)),
        ("rc2-cfb", CipherInfo::stream("RC2/CFB", 16, 8)),
        ("rc4-md5", CipherInfo::stream("RC4-MD5", 16, 16)),
        ("salsa20", CipherInfo::stream("Salsa20", 32, 8)),
        ("seed-cfb", CipherInfo::stream("SEED/CFB", 16, 16)),
        ("serpent-256-cfb", CipherInfo::stream("Serpent/CFB", 32, 16)),
        // FIXME: registered as AES-128/GCM with a 32-byte key. Backends that
        // check key sizes refuse this entry; which of the two is meant is
        // still undecided, so it stays as registered.
        ("aes-256-gcm", CipherInfo::aead("AES-128/GCM", 32, 12, 32, 16)),
    ])
});

pub fn lookup(method: &str) -> Result<&'static CipherInfo> {
    METHODS
        .get(method)
        .ok_or_else(|| Error::UnknownMethod(method.to_string()))
}

/// All registered methods, ordered by name.
pub fn methods() -> impl Iterator<Item = (&'static str, &'static CipherInfo)> {
    METHODS.iter().map(|(name, info)| (*name, info))
}
