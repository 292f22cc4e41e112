use super::{Backend, BoxedKdf, BoxedTransform, Direction, Kdf, Transform};
use anyhow::bail;
use parking_lot::Mutex;
use std::collections::HashSet;

/// A backend whose "ciphers" XOR data with a key/iv derived byte and whose
/// KDF mixes its inputs byte by byte. Every filter request is recorded.
pub struct FakeBackend {
    algorithms: HashSet<&'static str>,
    chacha20: bool,
    pub requests: Mutex<Vec<(String, Direction)>>,
    pub kdf_requests: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new(algorithms: HashSet<&'static str>, chacha20: bool) -> Self {
        Self {
            algorithms,
            chacha20,
            requests: Default::default(),
            kdf_requests: Default::default(),
        }
    }
}

impl Backend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn provides_chacha20(&self) -> bool {
        self.chacha20
    }

    fn keyed_filter(
        &self,
        algorithm: &str,
        key: &[u8],
        iv: &[u8],
        direction: Direction,
    ) -> anyhow::Result<BoxedTransform> {
        self.requests.lock().push((algorithm.to_string(), direction));
        if !self.algorithms.contains(algorithm) {
            bail!("fake backend has no {algorithm}");
        }

        let pad = key.iter().chain(iv.iter()).fold(0x5au8, |acc, b| acc ^ b);
        Ok(Box::new(XorFilter(pad)))
    }

    fn kdf(&self, algorithm: &str) -> anyhow::Result<BoxedKdf> {
        self.kdf_requests.lock().push(algorithm.to_string());
        Ok(Box::new(MixKdf))
    }
}

struct XorFilter(u8);

impl Transform for XorFilter {
    fn process_msg(&mut self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(data.iter().map(|b| b ^ self.0).collect())
    }
}

struct MixKdf;

impl Kdf for MixKdf {
    fn derive_key(
        &self,
        len: usize,
        secret: &[u8],
        salt: &[u8],
        label: &[u8],
    ) -> anyhow::Result<Vec<u8>> {
        if secret.is_empty() || salt.is_empty() || label.is_empty() {
            bail!("empty KDF input");
        }

        Ok((0..len)
            .map(|i| {
                secret[i % secret.len()] ^ salt[i % salt.len()] ^ label[i % label.len()] ^ i as u8
            })
            .collect())
    }
}
