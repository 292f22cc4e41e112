use super::{Backend, BoxedKdf, BoxedTransform, Direction, Kdf, Transform};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead, AeadCore, KeyInit as AeadKeyInit, Nonce};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use anyhow::{anyhow, bail, Context};
use blowfish::Blowfish;
use camellia::{Camellia128, Camellia192, Camellia256};
use cast5::Cast5;
use cfb_mode::{BufDecryptor, BufEncryptor};
use chacha20::{ChaCha20, ChaCha20Legacy};
use cipher::{BlockCipher, BlockEncryptMut, InnerIvInit, KeyInit, KeyIvInit, StreamCipher};
use des::Des;
use hkdf::Hkdf;
use idea::Idea;
use rc2::Rc2;
use salsa20::Salsa20;
use serpent::Serpent;
use sha1::Sha1;

/// Backend built on the RustCrypto crates.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCrypto;

impl Backend for RustCrypto {
    fn name(&self) -> &str {
        "RustCrypto"
    }

    fn provides_chacha20(&self) -> bool {
        true
    }

    fn keyed_filter(
        &self,
        algorithm: &str,
        key: &[u8],
        iv: &[u8],
        direction: Direction,
    ) -> anyhow::Result<BoxedTransform> {
        let filter = match algorithm {
            "AES-128/CFB" => cfb::<Aes128>(key, iv, direction),
            "AES-192/CFB" => cfb::<Aes192>(key, iv, direction),
            "AES-256/CFB" => cfb::<Aes256>(key, iv, direction),
            "AES-128/CTR-BE" => keystream::<ctr::Ctr128BE<Aes128>>(key, iv),
            "AES-192/CTR-BE" => keystream::<ctr::Ctr128BE<Aes192>>(key, iv),
            "AES-256/CTR-BE" => keystream::<ctr::Ctr128BE<Aes256>>(key, iv),
            "Blowfish/CFB" => cfb::<Blowfish>(key, iv, direction),
            "Camellia-128/CFB" => cfb::<Camellia128>(key, iv, direction),
            "Camellia-192/CFB" => cfb::<Camellia192>(key, iv, direction),
            "Camellia-256/CFB" => cfb::<Camellia256>(key, iv, direction),
            "CAST-128/CFB" => cfb::<Cast5>(key, iv, direction),
            "DES/CFB" => cfb::<Des>(key, iv, direction),
            "IDEA/CFB" => cfb::<Idea>(key, iv, direction),
            "RC2/CFB" => cfb::<Rc2>(key, iv, direction),
            "Serpent/CFB" => cfb::<Serpent>(key, iv, direction),
            "ChaCha" if iv.len() == 8 => keystream::<ChaCha20Legacy>(key, iv),
            "ChaCha" => keystream::<ChaCha20>(key, iv),
            "Salsa20" => keystream::<Salsa20>(key, iv),
            "AES-128/GCM" => gcm::<Aes128Gcm>(key, iv, direction),
            "AES-256/GCM" => gcm::<Aes256Gcm>(key, iv, direction),
            _ => Err(anyhow!("algorithm not available")),
        };

        filter.with_context(|| format!("creating {algorithm} filter"))
    }

    fn kdf(&self, algorithm: &str) -> anyhow::Result<BoxedKdf> {
        match algorithm {
            "HKDF(HMAC(SHA-160))" | "HKDF(HMAC(SHA-1))" => Ok(Box::new(HkdfSha1)),
            _ => bail!("KDF {algorithm} not available"),
        }
    }
}

struct Keystream<C>(C);

impl<C: StreamCipher + Send> Transform for Keystream<C> {
    fn process_msg(&mut self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut out = data.to_vec();
        self.0
            .try_apply_keystream(&mut out)
            .map_err(|e| anyhow!("{e}"))?;
        Ok(out)
    }
}

fn keystream<C>(key: &[u8], iv: &[u8]) -> anyhow::Result<BoxedTransform>
where
    C: KeyIvInit + StreamCipher + Send + 'static,
{
    let cipher = C::new_from_slices(key, iv)
        .map_err(|_| invalid_lengths(key, iv))?;
    Ok(Box::new(Keystream(cipher)))
}

enum Cfb<C: BlockEncryptMut + BlockCipher> {
    Encrypt(BufEncryptor<C>),
    Decrypt(BufDecryptor<C>),
}

impl<C> Transform for Cfb<C>
where
    C: BlockEncryptMut + BlockCipher + Send,
{
    fn process_msg(&mut self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut out = data.to_vec();
        match self {
            Self::Encrypt(c) => c.encrypt(&mut out),
            Self::Decrypt(c) => c.decrypt(&mut out),
        }
        Ok(out)
    }
}

// Variable-length key ciphers (Blowfish, CAST-128, RC2) accept their keys
// through `new_from_slice`, so the block cipher is keyed first and then
// wrapped in the mode.
fn cfb<C>(key: &[u8], iv: &[u8], direction: Direction) -> anyhow::Result<BoxedTransform>
where
    C: BlockEncryptMut + BlockCipher + KeyInit + Send + 'static,
{
    let cipher = C::new_from_slice(key).map_err(|_| invalid_lengths(key, iv))?;
    let filter = match direction {
        Direction::Encrypt => Cfb::Encrypt(
            BufEncryptor::inner_iv_slice_init(cipher, iv).map_err(|_| invalid_lengths(key, iv))?,
        ),
        Direction::Decrypt => Cfb::Decrypt(
            BufDecryptor::inner_iv_slice_init(cipher, iv).map_err(|_| invalid_lengths(key, iv))?,
        ),
    };
    Ok(Box::new(filter))
}

/// Every message is sealed (or opened) as a whole, after which the nonce is
/// incremented as a little-endian counter.
struct Gcm<C: AeadCore> {
    cipher: C,
    nonce: Nonce<C>,
    direction: Direction,
}

impl<C> Transform for Gcm<C>
where
    C: Aead + Send,
{
    fn process_msg(&mut self, data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let out = match self.direction {
            Direction::Encrypt => self.cipher.encrypt(&self.nonce, data),
            Direction::Decrypt => self.cipher.decrypt(&self.nonce, data),
        }
        .map_err(|_| anyhow!("AEAD {:?} failed", self.direction))?;

        increment_nonce(&mut self.nonce);
        Ok(out)
    }
}

fn gcm<C>(key: &[u8], iv: &[u8], direction: Direction) -> anyhow::Result<BoxedTransform>
where
    C: Aead + AeadKeyInit + Send + 'static,
{
    if iv.len() != C::NonceSize::USIZE {
        return Err(invalid_lengths(key, iv));
    }

    let cipher = <C as AeadKeyInit>::new_from_slice(key).map_err(|_| invalid_lengths(key, iv))?;
    Ok(Box::new(Gcm {
        cipher,
        nonce: Nonce::<C>::clone_from_slice(iv),
        direction,
    }))
}

fn increment_nonce(nonce: &mut [u8]) {
    for b in nonce.iter_mut() {
        let (v, overflow) = b.overflowing_add(1);
        *b = v;
        if !overflow {
            break;
        }
    }
}

fn invalid_lengths(key: &[u8], iv: &[u8]) -> anyhow::Error {
    anyhow!(
        "invalid key/iv lengths (key: {}, iv: {})",
        key.len(),
        iv.len()
    )
}

struct HkdfSha1;

impl Kdf for HkdfSha1 {
    fn derive_key(
        &self,
        len: usize,
        secret: &[u8],
        salt: &[u8],
        label: &[u8],
    ) -> anyhow::Result<Vec<u8>> {
        let mut okm = vec![0u8; len];
        Hkdf::<Sha1>::new(Some(salt), secret)
            .expand(label, &mut okm)
            .map_err(|_| anyhow!("HKDF cannot produce {len} bytes"))?;
        Ok(okm)
    }
}
