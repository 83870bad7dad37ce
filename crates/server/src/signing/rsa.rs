use md5::Md5;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pkcs8::der::pem;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::algorithm::DigestAlgorithm;
use super::signer::{DataSigner, SigningError};

/// RSA PKCS#1 v1.5 signer backed by a PEM private key.
///
/// Signatures are deterministic for a given key, digest and message. The
/// key is borrowed for each signature, never copied.
pub struct RsaSigner {
    private_key: RsaPrivateKey,
}

impl RsaSigner {
    pub fn new(private_key: RsaPrivateKey) -> Self {
        Self { private_key }
    }

    /// Loads an `ENCRYPTED PRIVATE KEY` (needs `passphrase`), `PRIVATE KEY`
    /// or `RSA PRIVATE KEY` PEM document.
    pub fn from_pem(pem: &str, passphrase: Option<&str>) -> Result<Self, SigningError> {
        let label =
            pem::decode_label(pem.as_bytes()).map_err(|e| SigningError::KeyMaterial(e.to_string()))?;

        let private_key = match label {
            "ENCRYPTED PRIVATE KEY" => {
                let passphrase = passphrase.ok_or(SigningError::MissingPassphrase)?;
                RsaPrivateKey::from_pkcs8_encrypted_pem(pem, passphrase)
                    .map_err(|e| SigningError::KeyMaterial(e.to_string()))?
            }
            "PRIVATE KEY" => RsaPrivateKey::from_pkcs8_pem(pem)
                .map_err(|e| SigningError::KeyMaterial(e.to_string()))?,
            "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_pem(pem)
                .map_err(|e| SigningError::KeyMaterial(e.to_string()))?,
            other => return Err(SigningError::UnsupportedKeyFormat(other.to_string())),
        };

        Ok(Self::new(private_key))
    }
}

impl DataSigner for RsaSigner {
    fn sign(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>, SigningError> {
        let (scheme, hashed) = match algorithm {
            DigestAlgorithm::Md5 => (Pkcs1v15Sign::new::<Md5>(), Md5::digest(data).to_vec()),
            DigestAlgorithm::Sha1 => (Pkcs1v15Sign::new::<Sha1>(), Sha1::digest(data).to_vec()),
            DigestAlgorithm::Sha256 => {
                (Pkcs1v15Sign::new::<Sha256>(), Sha256::digest(data).to_vec())
            }
            DigestAlgorithm::Sha384 => {
                (Pkcs1v15Sign::new::<Sha384>(), Sha384::digest(data).to_vec())
            }
            DigestAlgorithm::Sha512 => {
                (Pkcs1v15Sign::new::<Sha512>(), Sha512::digest(data).to_vec())
            }
        };
        Ok(self.private_key.sign(scheme, &hashed)?)
    }
}
