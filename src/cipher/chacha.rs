use anyhow::anyhow;
use chacha20::{ChaCha20, ChaCha20Legacy};
use cipher::{KeyIvInit, StreamCipher};

/// ChaCha20 for backends that don't ship it. The nonce length picks the
/// variant: 8 bytes is the original construction, 12 bytes is RFC 8439.
pub enum ChaCha {
    Legacy(ChaCha20Legacy),
    Ietf(ChaCha20),
}

impl ChaCha {
    pub fn new(key: &[u8], iv: &[u8]) -> anyhow::Result<Self> {
        let invalid = || {
            anyhow!(
                "invalid ChaCha20 key/nonce lengths (key: {}, nonce: {})",
                key.len(),
                iv.len()
            )
        };

        match iv.len() {
            8 => Ok(Self::Legacy(
                ChaCha20Legacy::new_from_slices(key, iv).map_err(|_| invalid())?,
            )),
            _ => Ok(Self::Ietf(
                ChaCha20::new_from_slices(key, iv).map_err(|_| invalid())?,
            )),
        }
    }

    pub fn update(&mut self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut out = data.to_vec();
        match self {
            Self::Legacy(c) => c.try_apply_keystream(&mut out),
            Self::Ietf(c) => c.try_apply_keystream(&mut out),
        }
        .map_err(|e| anyhow!("{e}"))?;
        Ok(out)
    }
}
