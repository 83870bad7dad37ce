use std::fmt;

use super::signer::SigningError;

/// Digest algorithms REST PKI may ask the signer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 5] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Maps the digest OID returned when a signature is started. Anything
    /// outside the fixed table is refused.
    pub fn from_oid(oid: &str) -> Result<Self, SigningError> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.oid() == oid)
            .ok_or_else(|| SigningError::UnsupportedDigestAlgorithm(oid.to_string()))
    }

    pub fn oid(&self) -> &'static str {
        match self {
            Self::Md5 => "1.2.840.113549.2.5",
            Self::Sha1 => "1.3.14.3.2.26",
            Self::Sha256 => "2.16.840.1.101.3.4.2.1",
            Self::Sha384 => "2.16.840.1.101.3.4.2.2",
            Self::Sha512 => "2.16.840.1.101.3.4.2.3",
        }
    }

    /// Name of the RSA signature algorithm over this digest.
    pub fn signature_algorithm(&self) -> &'static str {
        match self {
            Self::Md5 => "RSA-MD5",
            Self::Sha1 => "RSA-SHA1",
            Self::Sha256 => "RSA-SHA256",
            Self::Sha384 => "RSA-SHA384",
            Self::Sha512 => "RSA-SHA512",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signature_algorithm())
    }
}
