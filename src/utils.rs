use crate::cipher::registry;
use crate::error::Result;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use rand::RngCore;
use sha1::Sha1;

/// Length of the truncated HMAC-SHA1 tags.
pub const AUTH_LEN: usize = 10;

pub fn random_bytes(len: usize) -> Vec<u8> {
    if len == 0 {
        return Vec::new();
    }

    let mut out = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut out);
    out
}

/// A random IV of the length `method` expects.
pub fn random_iv(method: &str) -> Result<Vec<u8>> {
    Ok(random_bytes(registry::lookup(method)?.iv_len))
}

/// HMAC-SHA1 truncated to [AUTH_LEN] bytes.
pub fn hmac_sha1(key: &[u8], msg: &[u8]) -> [u8; AUTH_LEN] {
    let mut mac =
        <Hmac<Sha1> as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(msg);

    let mut out = [0u8; AUTH_LEN];
    out.copy_from_slice(&mac.finalize().into_bytes()[..AUTH_LEN]);
    out
}

pub fn md5_hash(input: &[u8]) -> [u8; 16] {
    Md5::digest(input).into()
}

/// OpenSSL's `EVP_BytesToKey` with MD5, one iteration and no salt: the
/// password to key derivation every Shadowsocks client agrees on.
pub fn evp_bytes_to_key(password: &[u8], key_len: usize) -> Vec<u8> {
    let mut key = Vec::with_capacity(key_len + 16);
    let mut prev: Option<[u8; 16]> = None;

    while key.len() < key_len {
        let mut hasher = Md5::new();
        if let Some(prev) = prev {
            hasher.update(prev);
        }
        hasher.update(password);

        let digest: [u8; 16] = hasher.finalize().into();
        key.extend_from_slice(&digest);
        prev = Some(digest);
    }

    key.truncate(key_len);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn random_bytes_works() {
        assert!(random_bytes(0).is_empty());

        let a = random_bytes(16);
        let b = random_bytes(16);
        assert_eq!(16, a.len());
        assert_eq!(16, b.len());
        assert_ne!(a, b);

        assert_eq!(1000, random_bytes(1000).len());
    }

    #[test]
    fn random_bytes_is_safe_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..100).map(|_| random_bytes(32)).collect::<Vec<_>>()))
            .collect();

        let mut all = std::collections::HashSet::new();
        for h in handles {
            for v in h.join().unwrap() {
                assert!(all.insert(v));
            }
        }
    }

    #[test]
    fn random_iv_works() {
        assert_eq!(16, random_iv("aes-256-cfb").unwrap().len());
        assert_eq!(8, random_iv("chacha20").unwrap().len());
        assert_eq!(12, random_iv("chacha20-ietf").unwrap().len());
        assert_ne!(
            random_iv("aes-128-ctr").unwrap(),
            random_iv("aes-128-ctr").unwrap()
        );
        assert!(matches!(random_iv("none"), Err(Error::UnknownMethod(_))));
    }

    #[test]
    fn hmac_sha1_works() {
        // RFC 2202 test case 2
        let tag = hmac_sha1(b"Jefe", b"what do ya want for nothing?");
        assert_eq!("effcdf6ae5eb2fa2d274", hex::encode(tag));

        assert_eq!(tag, hmac_sha1(b"Jefe", b"what do ya want for nothing?"));
        assert_ne!(tag, hmac_sha1(b"Jeff", b"what do ya want for nothing?"));
        assert_ne!(tag, hmac_sha1(b"Jefe", b"what do ya want for nothing!"));
        assert_eq!(AUTH_LEN, hmac_sha1(&[], &[]).len());
    }

    #[test]
    fn md5_works() {
        assert_eq!("d41d8cd98f00b204e9800998ecf8427e", hex::encode(md5_hash(b"")));
        assert_eq!("900150983cd24fb0d6963f7d28e17f72", hex::encode(md5_hash(b"abc")));
    }

    #[test]
    fn evp_bytes_to_key_works() {
        let key = evp_bytes_to_key(b"foobar", 32);
        assert_eq!(32, key.len());
        assert_eq!(&md5_hash(b"foobar"), &key[..16]);

        let mut second = md5_hash(b"foobar").to_vec();
        second.extend_from_slice(b"foobar");
        assert_eq!(&md5_hash(&second), &key[16..]);

        assert_eq!(&key[..16], evp_bytes_to_key(b"foobar", 16).as_slice());
        assert_eq!(&key[..24], evp_bytes_to_key(b"foobar", 24).as_slice());
        assert!(evp_bytes_to_key(b"foobar", 0).is_empty());
    }
}
