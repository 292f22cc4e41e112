use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The method name is not in the registry.
    #[error("unknown cipher method {0:?}")]
    UnknownMethod(String),

    /// The primitive behind a method could not be initialised. The engine is
    /// never handed out half-built, so this is a configuration error and not
    /// worth retrying with the same parameters.
    #[error("initialising cipher {method}")]
    Initialise {
        method: String,
        #[source]
        source: anyhow::Error,
    },

    /// Subkey derivation was requested from a stream cipher.
    #[error("{0} is not an AEAD cipher")]
    NotAead(String),

    #[error("cipher transform failed")]
    Transform(#[source] anyhow::Error),

    #[error("deriving subkey")]
    KeyDerivation(#[source] anyhow::Error),
}

impl Error {
    /// True for errors caused by the method configuration rather than the data
    /// flowing through an engine.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnknownMethod(_) | Self::Initialise { .. })
    }
}
