use std::fmt::{Display, Formatter};
use std::str::FromStr;
use crate::keytool::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CryptoSystem {
    Ecc,
    Rsa,
}

impl CryptoSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            CryptoSystem::Ecc => "ecc",
            CryptoSystem::Rsa => "rsa",
        }
    }
}

impl FromStr for CryptoSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecc" => Ok(CryptoSystem::Ecc),
            "rsa" => Ok(CryptoSystem::Rsa),
            _ => Err(Error::UnsupportedCrypto),
        }
    }
}

/// Role of a key: `Exchange` keys encrypt/decrypt, `Write` keys sign/verify.
/// A key never changes role after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUse {
    Exchange,
    Write,
}

impl KeyUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUse::Exchange => "exchange",
            KeyUse::Write => "write",
        }
    }
}

impl FromStr for KeyUse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exchange" => Ok(KeyUse::Exchange),
            "write" => Ok(KeyUse::Write),
            _ => Err(Error::InvalidKeyUse),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RsaSize {
    B1024,
    B2048,
    B4096,
}

impl RsaSize {
    pub fn bits(&self) -> usize {
        match self {
            RsaSize::B1024 => 1024,
            RsaSize::B2048 => 2048,
            RsaSize::B4096 => 4096,
        }
    }
}

impl TryFrom<usize> for RsaSize {
    type Error = Error;

    fn try_from(bits: usize) -> Result<Self, Self::Error> {
        match bits {
            1024 => Ok(RsaSize::B1024),
            2048 => Ok(RsaSize::B2048),
            4096 => Ok(RsaSize::B4096),
            _ => Err(Error::UnsupportedParameter(format!("RSA modulus of {} bits", bits))),
        }
    }
}

impl FromStr for RsaSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s.trim().parse::<usize>()
            .map_err(|_| Error::UnsupportedParameter(format!("RSA size `{}`", s)))?;
        RsaSize::try_from(bits)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlg {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    pub const ALL: [HashAlg; 4] = [HashAlg::Sha1, HashAlg::Sha256, HashAlg::Sha384, HashAlg::Sha512];

    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlg::Sha1 => "SHA-1",
            HashAlg::Sha256 => "SHA-256",
            HashAlg::Sha384 => "SHA-384",
            HashAlg::Sha512 => "SHA-512",
        }
    }

    /// Digest output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlg::Sha1 => 20,
            HashAlg::Sha256 => 32,
            HashAlg::Sha384 => 48,
            HashAlg::Sha512 => 64,
        }
    }
}

impl FromStr for HashAlg {
    type Err = Error;

    /// Accepts `SHA-256`, `sha256`, `Sha-256` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "");
        match normalized.as_str() {
            "SHA1" => Ok(HashAlg::Sha1),
            "SHA256" => Ok(HashAlg::Sha256),
            "SHA384" => Ok(HashAlg::Sha384),
            "SHA512" => Ok(HashAlg::Sha512),
            _ => Err(Error::UnsupportedParameter(format!("hash algorithm `{}`", s))),
        }
    }
}

/// Bits per UTF-16 code unit when text is turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharSize {
    B8,
    B16,
}

impl CharSize {
    pub fn bytes(&self) -> usize {
        match self {
            CharSize::B8 => 1,
            CharSize::B16 => 2,
        }
    }
}

impl FromStr for CharSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "8" => Ok(CharSize::B8),
            "16" => Ok(CharSize::B16),
            _ => Err(Error::UnsupportedParameter(format!("char size `{}`", s))),
        }
    }
}

/// Provider algorithm bound to a key, derived from its [`KeyUse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    RsaOaep,
    RsaPss,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::RsaOaep => "RSA-OAEP",
            Algorithm::RsaPss => "RSA-PSS",
        }
    }
}

impl From<KeyUse> for Algorithm {
    fn from(key_use: KeyUse) -> Self {
        match key_use {
            KeyUse::Exchange => Algorithm::RsaOaep,
            KeyUse::Write => Algorithm::RsaPss,
        }
    }
}

impl From<Algorithm> for KeyUse {
    fn from(alg: Algorithm) -> Self {
        match alg {
            Algorithm::RsaOaep => KeyUse::Exchange,
            Algorithm::RsaPss => KeyUse::Write,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
}

impl KeyUsage {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUsage::Encrypt => "encrypt",
            KeyUsage::Decrypt => "decrypt",
            KeyUsage::Sign => "sign",
            KeyUsage::Verify => "verify",
        }
    }
}

macro_rules! impl_display_as_str {
    ($($t: ty => $f: ident),* $(,)?) => {
        $(impl Display for $t {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.$f())
            }
        })*
    };
}

impl_display_as_str!(
    CryptoSystem => as_str,
    KeyUse => as_str,
    HashAlg => as_str,
    Algorithm => name,
    KeyUsage => as_str,
);

/// A message handed to an operation: either text, serialized through the
/// codec first, or raw bytes used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for Msg<'a> {
    fn from(s: &'a str) -> Self {
        Msg::Text(s)
    }
}

impl<'a> From<&'a String> for Msg<'a> {
    fn from(s: &'a String) -> Self {
        Msg::Text(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for Msg<'a> {
    fn from(b: &'a [u8]) -> Self {
        Msg::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for Msg<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Msg::Bytes(b.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Msg<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Msg::Bytes(b.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_use() {
        assert_eq!("exchange".parse::<KeyUse>().unwrap(), KeyUse::Exchange);
        assert_eq!("Write".parse::<KeyUse>().unwrap(), KeyUse::Write);
        assert!(matches!("encrypt".parse::<KeyUse>(), Err(Error::InvalidKeyUse)));
    }

    #[test]
    fn test_parse_crypto_system() {
        assert_eq!("rsa".parse::<CryptoSystem>().unwrap(), CryptoSystem::Rsa);
        assert_eq!("ECC".parse::<CryptoSystem>().unwrap(), CryptoSystem::Ecc);
        assert!(matches!("dsa".parse::<CryptoSystem>(), Err(Error::UnsupportedCrypto)));
    }

    #[test]
    fn test_parse_hash_and_sizes() {
        assert_eq!("SHA-384".parse::<HashAlg>().unwrap(), HashAlg::Sha384);
        assert_eq!("sha1".parse::<HashAlg>().unwrap(), HashAlg::Sha1);
        assert!("md5".parse::<HashAlg>().is_err());
        assert_eq!("4096".parse::<RsaSize>().unwrap().bits(), 4096);
        assert!(matches!(RsaSize::try_from(512), Err(Error::UnsupportedParameter(_))));
        assert_eq!("16".parse::<CharSize>().unwrap(), CharSize::B16);
        assert!("32".parse::<CharSize>().is_err());
    }

    #[test]
    fn test_algorithm_follows_key_use() {
        assert_eq!(Algorithm::from(KeyUse::Exchange), Algorithm::RsaOaep);
        assert_eq!(Algorithm::from(KeyUse::Write), Algorithm::RsaPss);
        assert_eq!(KeyUse::from(Algorithm::RsaPss), KeyUse::Write);
        assert_eq!(Algorithm::RsaOaep.to_string(), "RSA-OAEP");
    }
}
