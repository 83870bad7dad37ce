use super::algorithm::DigestAlgorithm;

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Unsupported digest algorithm OID {0}")]
    UnsupportedDigestAlgorithm(String),
    #[error("Private key is encrypted but no passphrase was configured")]
    MissingPassphrase,
    #[error("Unsupported private key format {0:?}")]
    UnsupportedKeyFormat(String),
    #[error("Invalid private key: {0}")]
    KeyMaterial(String),
    #[error("Signing failed: {0}")]
    Signature(#[from] rsa::Error),
}

/// Trait for computing raw signatures over data handed out by REST PKI.
///
/// Implementations are sync, signing is CPU-bound.
pub trait DataSigner: Send + Sync {
    /// Hash `data` with `algorithm` and sign it. Returns raw signature bytes.
    fn sign(&self, algorithm: DigestAlgorithm, data: &[u8]) -> Result<Vec<u8>, SigningError>;
}
