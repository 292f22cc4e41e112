use anyhow::anyhow;
use cipher::consts::U16;
use cipher::{KeyInit, StreamCipher};
use md5::{Digest, Md5};
use rc4::Rc4;

/// RC4 keyed with `MD5(key || iv)`, so every session gets its own keystream
/// even though RC4 itself takes no IV.
pub struct Rc4Md5(Rc4<U16>);

impl Rc4Md5 {
    pub fn new(key: &[u8], iv: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(key);
        hasher.update(iv);
        Self(Rc4::new(&hasher.finalize()))
    }

    pub fn update(&mut self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut out = data.to_vec();
        self.0
            .try_apply_keystream(&mut out)
            .map_err(|e| anyhow!("{e}"))?;
        Ok(out)
    }
}
