use crate::backend::Direction;
use crate::cipher::{self, Cipher};
use crate::utils::{evp_bytes_to_key, random_iv};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// What a proxy endpoint needs to agree on: the method and the shared
/// password.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CipherSettings {
    pub method: String,
    pub password: String,
}

impl Debug for CipherSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherSettings")
            .field("method", &self.method)
            .field("password", &"******")
            .finish()
    }
}

impl CipherSettings {
    pub fn new(method: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            password: password.into(),
        }
    }

    pub fn from_yaml(s: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_yaml::from_str(s).context("parsing cipher settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        cipher::lookup(&self.method)?;

        if !cipher::is_supported(&self.method) {
            bail!("cipher method {} is not supported", self.method);
        }

        if self.password.is_empty() {
            bail!("password must not be empty");
        }

        Ok(())
    }

    /// The pre-shared key, derived from the password.
    pub fn key(&self) -> anyhow::Result<Vec<u8>> {
        let info = cipher::lookup(&self.method)?;
        Ok(evp_bytes_to_key(self.password.as_bytes(), info.key_len))
    }

    pub fn new_cipher(&self, iv: &[u8], direction: Direction) -> anyhow::Result<Cipher> {
        Cipher::new(&self.method, &self.key()?, iv, direction)
            .with_context(|| format!("creating {} {direction:?} cipher", self.method))
    }

    /// An encryptor with a fresh IV, available through [Cipher::iv].
    pub fn new_encryptor(&self) -> anyhow::Result<Cipher> {
        let iv = random_iv(&self.method)?;
        self.new_cipher(&iv, Direction::Encrypt)
    }
}
