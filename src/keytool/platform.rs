//! Native RSA primitives. Everything here is synchronous and CPU bound;
//! the async layers above hand these calls to the blocking pool via [`run`].

use log::debug;
use rand::thread_rng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{BigUint, Oaep, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::Digest;
use crate::keytool::config::{PUBLIC_EXPONENT, SALT_LENGTH};
use crate::keytool::errors::Result;
use crate::keytool::types::HashAlg;

macro_rules! with_digest {
    ($hash: expr, $D: ident => $body: expr) => {
        match $hash {
            HashAlg::Sha1 => { type $D = sha1::Sha1; $body }
            HashAlg::Sha256 => { type $D = sha2::Sha256; $body }
            HashAlg::Sha384 => { type $D = sha2::Sha384; $body }
            HashAlg::Sha512 => { type $D = sha2::Sha512; $body }
        }
    };
}

/// Runs a provider call on the blocking pool and waits for it.
pub(crate) async fn run<T, F>(task: F) -> Result<T>
    where F: FnOnce() -> Result<T> + Send + 'static,
          T: Send + 'static {
    tokio::task::spawn_blocking(task).await?
}

pub fn generate(bits: usize) -> Result<RsaPrivateKey> {
    debug!("generating {} bit RSA key, e = {:#x}", bits, PUBLIC_EXPONENT);
    let exp = BigUint::from(PUBLIC_EXPONENT);
    Ok(RsaPrivateKey::new_with_exp(&mut thread_rng(), bits, &exp)?)
}

pub fn private_to_pkcs8(key: &RsaPrivateKey) -> Result<Vec<u8>> {
    Ok(key.to_pkcs8_der()?.as_bytes().to_vec())
}

pub fn public_to_spki(key: &RsaPublicKey) -> Result<Vec<u8>> {
    Ok(key.to_public_key_der()?.as_bytes().to_vec())
}

pub fn private_from_pkcs8(der: &[u8]) -> Result<RsaPrivateKey> {
    debug!("decoding {} byte PKCS8 document", der.len());
    Ok(RsaPrivateKey::from_pkcs8_der(der)?)
}

pub fn public_from_spki(der: &[u8]) -> Result<RsaPublicKey> {
    debug!("decoding {} byte SPKI document", der.len());
    Ok(RsaPublicKey::from_public_key_der(der)?)
}

pub fn pss_sign(key: &RsaPrivateKey, hash: HashAlg, msg: &[u8]) -> Result<Vec<u8>> {
    debug!("RSA-PSS sign, {} bytes, {}", msg.len(), hash);
    with_digest!(hash, D => {
        let hashed = D::digest(msg);
        Ok(key.sign_with_rng(&mut thread_rng(), Pss::new_with_salt::<D>(SALT_LENGTH), &hashed)?)
    })
}

/// A signature that does not match is `Ok(false)`, not an error.
pub fn pss_verify(key: &RsaPublicKey, hash: HashAlg, msg: &[u8], sig: &[u8]) -> Result<bool> {
    debug!("RSA-PSS verify, {} bytes, {}", msg.len(), hash);
    with_digest!(hash, D => {
        let hashed = D::digest(msg);
        match key.verify(Pss::new_with_salt::<D>(SALT_LENGTH), &hashed, sig) {
            Ok(()) => Ok(true),
            Err(rsa::Error::Verification) => Ok(false),
            Err(e) => Err(e.into()),
        }
    })
}

pub fn oaep_encrypt(key: &RsaPublicKey, hash: HashAlg, msg: &[u8]) -> Result<Vec<u8>> {
    debug!("RSA-OAEP encrypt, {} bytes, {}", msg.len(), hash);
    with_digest!(hash, D => Ok(key.encrypt(&mut thread_rng(), Oaep::new::<D>(), msg)?))
}

pub fn oaep_decrypt(key: &RsaPrivateKey, hash: HashAlg, ciphertext: &[u8]) -> Result<Vec<u8>> {
    debug!("RSA-OAEP decrypt, {} bytes, {}", ciphertext.len(), hash);
    with_digest!(hash, D => Ok(key.decrypt(Oaep::new::<D>(), ciphertext)?))
}

#[cfg(test)]
mod tests {
    use rsa::traits::PublicKeyParts;
    use super::*;
    use crate::keytool::errors::Error;

    #[test]
    fn test_generate_fixed_exponent() {
        let key = generate(1024).unwrap();
        assert_eq!(key.e(), &BigUint::from(65537u32));
        assert_eq!(key.n().bits(), 1024);
    }

    #[test]
    fn test_der_round_trip() {
        let key = generate(1024).unwrap();
        let der = private_to_pkcs8(&key).unwrap();
        assert_eq!(private_from_pkcs8(&der).unwrap(), key);
        let public = key.to_public_key();
        let der = public_to_spki(&public).unwrap();
        assert_eq!(public_from_spki(&der).unwrap(), public);
        assert!(matches!(public_from_spki(&der[1..]), Err(Error::Platform(_))));
    }

    #[test]
    fn test_oaep_message_too_long() {
        let key = generate(1024).unwrap();
        // 128 byte modulus, SHA-256 OAEP overhead is 66 bytes
        let ok = oaep_encrypt(&key.to_public_key(), HashAlg::Sha256, &[7u8; 62]).unwrap();
        assert_eq!(oaep_decrypt(&key, HashAlg::Sha256, &ok).unwrap(), vec![7u8; 62]);
        assert!(matches!(
            oaep_encrypt(&key.to_public_key(), HashAlg::Sha256, &[7u8; 63]),
            Err(Error::Platform(_))
        ));
    }

    #[test]
    fn test_pss_wrong_hash_is_false() {
        let key = generate(2048).unwrap();
        let sig = pss_sign(&key, HashAlg::Sha256, b"message").unwrap();
        assert!(pss_verify(&key.to_public_key(), HashAlg::Sha256, b"message", &sig).unwrap());
        assert!(!pss_verify(&key.to_public_key(), HashAlg::Sha384, b"message", &sig).unwrap());
    }
}
