pub mod backend;
pub mod cipher;
pub mod config;
mod error;
pub mod utils;

pub use backend::Direction;
pub use self::cipher::{is_supported, supported_methods, Cipher, CipherInfo, CipherKind};
pub use error::{Error, Result};
pub use utils::{hmac_sha1, md5_hash, random_bytes, random_iv, AUTH_LEN};
