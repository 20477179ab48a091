use crate::keytool::codec::{normalize_base64_to_buf, normalize_unicode_to_buf};
use crate::keytool::config::{DEFAULT_CHAR_SIZE, DEFAULT_HASH_ALG};
use crate::keytool::errors::{check_algorithm, check_usage, Result};
use crate::keytool::keys::{import_private_key_with_options, import_public_key_with_options, KeyOptions, KeySource, PrivateKey, PublicKey};
use crate::keytool::platform;
use crate::keytool::types::{Algorithm, CharSize, HashAlg, KeyUsage, KeyUse, Msg};

/// Parameters shared by the operations. `hash` is only consulted when a key
/// arrives as PEM; a live handle always uses the hash it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpOptions {
    pub char_size: CharSize,
    pub hash: HashAlg,
    pub key_options: KeyOptions,
}

impl Default for OpOptions {
    fn default() -> Self {
        Self { char_size: DEFAULT_CHAR_SIZE, hash: DEFAULT_HASH_ALG, key_options: KeyOptions::default() }
    }
}

impl OpOptions {
    pub fn with_hash(hash: HashAlg) -> Self {
        Self { hash, ..Self::default() }
    }
}

async fn resolve_public(key: KeySource<'_, PublicKey>, key_use: KeyUse, opts: &OpOptions) -> Result<PublicKey> {
    match key {
        KeySource::Handle(key) => Ok(key.clone()),
        KeySource::Pem(pem) => import_public_key_with_options(pem, opts.hash, key_use, opts.key_options).await,
    }
}

async fn resolve_private(key: KeySource<'_, PrivateKey>, key_use: KeyUse, opts: &OpOptions) -> Result<PrivateKey> {
    match key {
        KeySource::Handle(key) => Ok(key.clone()),
        KeySource::Pem(pem) => import_private_key_with_options(pem, opts.hash, key_use, opts.key_options).await,
    }
}

/// RSA-PSS signature over the serialized message.
pub async fn sign<'m, 'k>(
    msg: impl Into<Msg<'m>>,
    private_key: impl Into<KeySource<'k, PrivateKey>>,
    opts: OpOptions,
) -> Result<Vec<u8>> {
    let data = normalize_unicode_to_buf(msg.into(), opts.char_size);
    let key = resolve_private(private_key.into(), KeyUse::Write, &opts).await?;
    check_algorithm(Algorithm::RsaPss, key.algorithm().name)?;
    check_usage(key.usages(), KeyUsage::Sign)?;
    platform::run(move || platform::pss_sign(key.inner(), key.hash(), &data)).await
}

/// Text signatures are read as base64. A signature that does not match
/// gives `Ok(false)`.
pub async fn verify<'m, 's, 'k>(
    msg: impl Into<Msg<'m>>,
    sig: impl Into<Msg<'s>>,
    public_key: impl Into<KeySource<'k, PublicKey>>,
    opts: OpOptions,
) -> Result<bool> {
    let data = normalize_unicode_to_buf(msg.into(), opts.char_size);
    let sig = normalize_base64_to_buf(sig.into())?;
    let key = resolve_public(public_key.into(), KeyUse::Write, &opts).await?;
    check_algorithm(Algorithm::RsaPss, key.algorithm().name)?;
    check_usage(key.usages(), KeyUsage::Verify)?;
    platform::run(move || platform::pss_verify(key.inner(), key.hash(), &data, &sig)).await
}

/// RSA-OAEP encryption. The serialized message has to fit in the modulus
/// minus `2 * hash_len + 2` bytes.
pub async fn encrypt<'m, 'k>(
    msg: impl Into<Msg<'m>>,
    public_key: impl Into<KeySource<'k, PublicKey>>,
    opts: OpOptions,
) -> Result<Vec<u8>> {
    let data = normalize_unicode_to_buf(msg.into(), opts.char_size);
    let key = resolve_public(public_key.into(), KeyUse::Exchange, &opts).await?;
    check_algorithm(Algorithm::RsaOaep, key.algorithm().name)?;
    check_usage(key.usages(), KeyUsage::Encrypt)?;
    platform::run(move || platform::oaep_encrypt(key.inner(), key.hash(), &data)).await
}

pub async fn decrypt<'m, 'k>(
    ciphertext: impl Into<Msg<'m>>,
    private_key: impl Into<KeySource<'k, PrivateKey>>,
    hash: HashAlg,
) -> Result<Vec<u8>> {
    decrypt_with_options(ciphertext, private_key, OpOptions::with_hash(hash)).await
}

/// Text ciphertexts are read as base64. `opts.char_size` is not used.
pub async fn decrypt_with_options<'m, 'k>(
    ciphertext: impl Into<Msg<'m>>,
    private_key: impl Into<KeySource<'k, PrivateKey>>,
    opts: OpOptions,
) -> Result<Vec<u8>> {
    let data = normalize_base64_to_buf(ciphertext.into())?;
    let key = resolve_private(private_key.into(), KeyUse::Exchange, &opts).await?;
    check_algorithm(Algorithm::RsaOaep, key.algorithm().name)?;
    check_usage(key.usages(), KeyUsage::Decrypt)?;
    platform::run(move || platform::oaep_decrypt(key.inner(), key.hash(), &data)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keytool::codec::{buffer_to_base64, buffer_to_text, text_to_buffer};
    use crate::keytool::errors::Error;
    use crate::keytool::keys::{export_private_key, export_public_key, generate_key_pair, PrivateWriteUsage};
    use crate::keytool::types::RsaSize;

    #[tokio::test]
    async fn test_encrypt_hello_with_exported_public_key() {
        let pair = generate_key_pair(RsaSize::B2048, HashAlg::Sha256, KeyUse::Exchange).await.unwrap();
        let public_pem = export_public_key(&pair.public_key).await.unwrap();
        assert!(public_pem.starts_with("-----BEGIN PUBLIC KEY-----"));
        let ciphertext = encrypt("hello", &public_pem, OpOptions::default()).await.unwrap();
        assert_eq!(ciphertext.len(), 256);
        let plain = decrypt(&ciphertext, &pair.private_key, HashAlg::Sha256).await.unwrap();
        assert_eq!(plain, text_to_buffer("hello", CharSize::B8));

        // base64 text ciphertext and PEM private key
        let private_pem = export_private_key(&pair.private_key).await.unwrap();
        let plain = decrypt(buffer_to_base64(&ciphertext).as_str(), &private_pem, HashAlg::Sha256).await.unwrap();
        assert_eq!(plain, b"hello");
    }

    #[tokio::test]
    async fn test_encrypt_wide_chars_and_bytes() {
        let pair = generate_key_pair(RsaSize::B1024, HashAlg::Sha1, KeyUse::Exchange).await.unwrap();
        let opts = OpOptions { char_size: CharSize::B16, ..OpOptions::default() };
        let ciphertext = encrypt("Łódź", &pair.public_key, opts).await.unwrap();
        let plain = decrypt(&ciphertext, &pair.private_key, HashAlg::Sha1).await.unwrap();
        assert_eq!(buffer_to_text(&plain, CharSize::B16).unwrap(), "Łódź");

        let bytes = [0u8, 1, 0, 255];
        let ciphertext = encrypt(&bytes, &pair.public_key, OpOptions::default()).await.unwrap();
        assert_eq!(decrypt(&ciphertext, &pair.private_key, HashAlg::Sha1).await.unwrap(), bytes);
        assert!(decrypt(b"", &pair.private_key, HashAlg::Sha1).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_verify_all_hashes() {
        let pair = generate_key_pair(RsaSize::B2048, HashAlg::Sha256, KeyUse::Write).await.unwrap();
        let private_pem = export_private_key(&pair.private_key).await.unwrap();
        let public_pem = export_public_key(&pair.public_key).await.unwrap();
        let key_options = KeyOptions { private_write_usage: PrivateWriteUsage::Sign, ..KeyOptions::default() };
        for hash in HashAlg::ALL {
            let opts = OpOptions { hash, key_options, ..OpOptions::default() };
            for msg in ["", "hello", "a much longer message that is signed as a whole"] {
                let sig = sign(msg, &private_pem, opts).await.unwrap();
                assert_eq!(sig.len(), 256);
                assert!(verify(msg, &sig, &public_pem, opts).await.unwrap());
                assert!(verify(msg, buffer_to_base64(&sig).as_str(), &public_pem, opts).await.unwrap());
            }
        }

        let sig = sign("hello", &pair.private_key, OpOptions::default()).await.unwrap();
        assert!(verify("hello", &sig, &pair.public_key, OpOptions::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_other_message_is_false() {
        let pair = generate_key_pair(RsaSize::B2048, HashAlg::Sha256, KeyUse::Write).await.unwrap();
        let sig = sign("hello", &pair.private_key, OpOptions::default()).await.unwrap();
        assert!(!verify("hellO", &sig, &pair.public_key, OpOptions::default()).await.unwrap());
        assert!(!verify("hello", &sig[..128], &pair.public_key, OpOptions::default()).await.unwrap());
        assert!(matches!(
            verify("hello", "%%%", &pair.public_key, OpOptions::default()).await,
            Err(Error::MalformedEncoding(_))
        ));
    }

    #[tokio::test]
    async fn test_key_use_mismatch_rejected() {
        let exchange = generate_key_pair(RsaSize::B1024, HashAlg::Sha256, KeyUse::Exchange).await.unwrap();
        let write = generate_key_pair(RsaSize::B1024, HashAlg::Sha256, KeyUse::Write).await.unwrap();
        assert!(matches!(
            sign("hello", &exchange.private_key, OpOptions::default()).await,
            Err(Error::InvalidKeyAlgorithm { expected: Algorithm::RsaPss, actual: Algorithm::RsaOaep })
        ));
        assert!(matches!(
            verify("hello", b"sig", &exchange.public_key, OpOptions::default()).await,
            Err(Error::InvalidKeyAlgorithm { .. })
        ));
        assert!(matches!(
            encrypt("hello", &write.public_key, OpOptions::default()).await,
            Err(Error::InvalidKeyAlgorithm { expected: Algorithm::RsaOaep, actual: Algorithm::RsaPss })
        ));
        assert!(matches!(
            decrypt(b"x", &write.private_key, HashAlg::Sha256).await,
            Err(Error::InvalidKeyAlgorithm { .. })
        ));
    }

    #[tokio::test]
    async fn test_sign_with_default_private_pem_import_is_refused() {
        let pair = generate_key_pair(RsaSize::B2048, HashAlg::Sha256, KeyUse::Write).await.unwrap();
        let private_pem = export_private_key(&pair.private_key).await.unwrap();
        assert!(matches!(
            sign("hello", &private_pem, OpOptions::default()).await,
            Err(Error::KeyUsageNotPermitted { usage: KeyUsage::Sign })
        ));
    }

    #[tokio::test]
    async fn test_pss_salt_does_not_fit_1024() {
        let pair = generate_key_pair(RsaSize::B1024, HashAlg::Sha256, KeyUse::Write).await.unwrap();
        assert!(matches!(
            sign("hello", &pair.private_key, OpOptions::default()).await,
            Err(Error::Platform(_))
        ));
    }

    #[tokio::test]
    async fn test_message_too_long() {
        let pair = generate_key_pair(RsaSize::B1024, HashAlg::Sha256, KeyUse::Exchange).await.unwrap();
        let msg = "x".repeat(63);
        assert!(matches!(encrypt(&msg, &pair.public_key, OpOptions::default()).await, Err(Error::Platform(_))));
    }
}
