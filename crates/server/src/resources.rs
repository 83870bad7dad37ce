use std::io;
use std::path::{Path, PathBuf};

use rsa::pkcs8::der::pem;

const SIGNER_CERTIFICATE: &str = "signer-cert.pem";
const SIGNER_KEY: &str = "signer-key.pem";
const SAMPLE_PDF: &str = "SampleDocument.pdf";
const SAMPLE_XML: &str = "SampleDocument.xml";

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid certificate in {path}: {reason}")]
    Certificate { path: PathBuf, reason: String },
    #[error("{0} is not valid UTF-8")]
    NotUtf8(PathBuf),
}

/// Read-only files shipped with the service: the signer's certificate and
/// private key, and the sample documents signed when no upload is given.
#[derive(Debug, Clone)]
pub struct Resources {
    dir: PathBuf,
}

impl Resources {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// DER bytes of the signer certificate. The file may be PEM or DER.
    pub async fn signer_certificate(&self) -> Result<Vec<u8>, ResourceError> {
        let (path, bytes) = self.read(SIGNER_CERTIFICATE).await?;
        if !bytes.starts_with(b"-----BEGIN") {
            return Ok(bytes);
        }

        let (label, der) = pem::decode_vec(&bytes).map_err(|e| ResourceError::Certificate {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        if label != "CERTIFICATE" {
            return Err(ResourceError::Certificate {
                path,
                reason: format!("unexpected PEM label {label:?}"),
            });
        }
        Ok(der)
    }

    pub async fn signer_key_pem(&self) -> Result<String, ResourceError> {
        let (path, bytes) = self.read(SIGNER_KEY).await?;
        String::from_utf8(bytes).map_err(|_| ResourceError::NotUtf8(path))
    }

    pub async fn sample_pdf(&self) -> Result<Vec<u8>, ResourceError> {
        self.read(SAMPLE_PDF).await.map(|(_, bytes)| bytes)
    }

    pub async fn sample_xml(&self) -> Result<Vec<u8>, ResourceError> {
        self.read(SAMPLE_XML).await.map(|(_, bytes)| bytes)
    }

    async fn read(&self, name: &str) -> Result<(PathBuf, Vec<u8>), ResourceError> {
        let path = self.dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok((path, bytes)),
            Err(source) => Err(ResourceError::Io { path, source }),
        }
    }
}
