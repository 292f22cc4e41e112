use super::registry;
use crate::backend::{default_backend, Backend, Direction};
use crate::utils::random_bytes;

pub fn is_supported(method: &str) -> bool {
    is_supported_by(default_backend(), method)
}

/// Whether an engine for `method` can be built on `backend`. Construction failures
/// are expected here and only logged.
pub fn is_supported_by(backend: &dyn Backend, method: &str) -> bool {
    let info = match registry::lookup(method) {
        Ok(info) => info,
        Err(e) => {
            log::debug!("{e}");
            return false;
        }
    };

    if method.contains("rc4") || (method.contains("chacha20") && !backend.provides_chacha20()) {
        return true;
    }

    let key = random_bytes(info.key_len);
    let iv = random_bytes(info.iv_len);
    match backend.keyed_filter(info.internal_name, &key, &iv, Direction::Encrypt) {
        Ok(_) => true,
        Err(e) => {
            log::debug!("{method} is not supported by {}: {e:#}", backend.name());
            false
        }
    }
}

pub fn supported_methods() -> Vec<&'static str> {
    supported_methods_by(default_backend())
}

pub fn supported_methods_by(backend: &dyn Backend) -> Vec<&'static str> {
    registry::methods()
        .map(|(name, _)| name)
        .filter(|name| is_supported_by(backend, name))
        .collect()
}
