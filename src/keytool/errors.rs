use crate::keytool::keys::{KeyData, KeyPair};
use crate::keytool::types::{Algorithm, CryptoSystem, KeyUsage, KeyUse};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Key does not exist. Make sure you properly instantiated the keystore.")]
    KeyDoesNotExist,

    #[error("Retrieved a single key when an asymmetric keypair was expected. Please use a different key name.")]
    NotKeyPair,

    #[error("Retrieved an asymmetric keypair when a single key was expected. Please use a different key name.")]
    NotKey,

    #[error("ECC is not enabled on this platform. Please use RSA instead.")]
    EccNotEnabled,

    #[error("Cryptosystem not supported. Please use ECC or RSA")]
    UnsupportedCrypto,

    #[error("Invalid key use. Please use 'exchange' or 'write'")]
    InvalidKeyUse,

    #[error("Max must be less than 256 and greater than 0")]
    InvalidMaxValue,

    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(String),

    #[error("Malformed base64 input: {0}")]
    MalformedEncoding(String),

    #[error("Malformed PEM: missing `{label}' header or footer")]
    MalformedPem { label: String },

    #[error("Key algorithm is {actual}, operation requires {expected}")]
    InvalidKeyAlgorithm { expected: Algorithm, actual: Algorithm },

    #[error("Key usage `{usage}' is not permitted for this key")]
    KeyUsageNotPermitted { usage: KeyUsage },

    #[error("Key is not extractable")]
    KeyNotExtractable,

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Self test failed in {failed} of {total} rounds")]
    SelfTest { failed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rsa::Error> for Error {
    fn from(err: rsa::Error) -> Self {
        Error::Platform(err.to_string())
    }
}

impl From<rsa::pkcs8::Error> for Error {
    fn from(err: rsa::pkcs8::Error) -> Self {
        Error::Platform(err.to_string())
    }
}

impl From<rsa::pkcs8::spki::Error> for Error {
    fn from(err: rsa::pkcs8::spki::Error) -> Self {
        Error::Platform(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Platform(format!("provider task failed: {}", err))
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::MalformedEncoding(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Only RSA is operational; ECC is rejected up front.
pub fn check_valid_crypto_system(system: CryptoSystem) -> Result<()> {
    match system {
        CryptoSystem::Rsa => Ok(()),
        CryptoSystem::Ecc => Err(Error::EccNotEnabled),
    }
}

/// Parses a key use given as text, the way it arrives from config files and
/// command lines.
pub fn check_valid_key_use(key_use: &str) -> Result<KeyUse> {
    key_use.parse()
}

pub fn check_is_key_pair(key: Option<KeyData>) -> Result<KeyPair> {
    match key {
        None => Err(Error::KeyDoesNotExist),
        Some(KeyData::Pair(pair)) => Ok(pair),
        Some(_) => Err(Error::NotKeyPair),
    }
}

pub fn check_is_key(key: Option<KeyData>) -> Result<KeyData> {
    match key {
        None => Err(Error::KeyDoesNotExist),
        Some(KeyData::Pair(_)) => Err(Error::NotKey),
        Some(key) => Ok(key),
    }
}

pub(crate) fn check_algorithm(expected: Algorithm, actual: Algorithm) -> Result<()> {
    if expected != actual {
        return Err(Error::InvalidKeyAlgorithm { expected, actual });
    }
    Ok(())
}

pub(crate) fn check_usage(usages: &[KeyUsage], usage: KeyUsage) -> Result<()> {
    if !usages.contains(&usage) {
        return Err(Error::KeyUsageNotPermitted { usage });
    }
    Ok(())
}
