use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::RestPkiError;
use crate::model::{
    CadesSignatureRequest, CadesSignatureResult, CertificateModel, ErrorModel,
    FullXmlSignatureRequest, PendingToken, SignatureCompletion, SignatureStarted,
    XmlSignatureResult,
};

/// One kind of remote signature process.
pub trait SignatureProcess {
    /// Short name used in logs.
    const NAME: &'static str;
    /// Path that starts a process.
    const START_PATH: &'static str;
    /// Prefix of the per-token paths (`{prefix}/{token}/...`).
    const PROCESS_PATH: &'static str;

    type Request: Serialize + Send + Sync;
    type Artifact: SignedArtifact + DeserializeOwned + Send;
}

/// Outcome of a completed process: the signed document plus its signer.
pub trait SignedArtifact {
    /// File extension the signed document is stored with.
    const EXTENSION: &'static str;

    fn certificate(&self) -> &CertificateModel;

    fn into_content(self) -> Vec<u8>;
}

/// CMS signature (CAdES), producing a `.p7s` file.
#[derive(Debug, Clone, Copy)]
pub struct Cades;

impl SignatureProcess for Cades {
    const NAME: &'static str = "cades";
    const START_PATH: &'static str = "Api/CadesSignatures";
    const PROCESS_PATH: &'static str = "Api/CadesSignatures";

    type Request = CadesSignatureRequest;
    type Artifact = CadesSignatureResult;
}

impl SignedArtifact for CadesSignatureResult {
    const EXTENSION: &'static str = "p7s";

    fn certificate(&self) -> &CertificateModel {
        &self.certificate
    }

    fn into_content(self) -> Vec<u8> {
        self.cms
    }
}

/// Enveloped XAdES signature of an entire XML document.
#[derive(Debug, Clone, Copy)]
pub struct FullXml;

impl SignatureProcess for FullXml {
    const NAME: &'static str = "full-xml";
    const START_PATH: &'static str = "Api/XmlSignatures/FullXmlSignature";
    const PROCESS_PATH: &'static str = "Api/XmlSignatures";

    type Request = FullXmlSignatureRequest;
    type Artifact = XmlSignatureResult;
}

impl SignedArtifact for XmlSignatureResult {
    const EXTENSION: &'static str = "xml";

    fn certificate(&self) -> &CertificateModel {
        &self.certificate
    }

    fn into_content(self) -> Vec<u8> {
        self.signed_xml
    }
}

/// Bearer-authenticated REST PKI client.
#[derive(Debug)]
pub struct RestPkiClient {
    http: Client,
    endpoint: Url,
    access_token: SecretString,
}

impl RestPkiClient {
    pub fn new(endpoint: &str, access_token: SecretString) -> Result<Self, RestPkiError> {
        Self::with_client(Client::new(), endpoint, access_token)
    }

    pub fn with_client(
        http: Client,
        endpoint: &str,
        access_token: SecretString,
    ) -> Result<Self, RestPkiError> {
        let mut endpoint = Url::parse(endpoint)?;
        // Relative joins drop the last segment unless the base ends with a slash.
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Starts a signature process. The response carries the digest to sign
    /// only when the request included the signer certificate.
    pub async fn start<P: SignatureProcess>(
        &self,
        request: &P::Request,
    ) -> Result<SignatureStarted, RestPkiError> {
        self.post(P::START_PATH, Some(request)).await
    }

    /// Completes a process with a signature computed outside REST PKI.
    pub async fn complete_with_signature<P: SignatureProcess>(
        &self,
        token: &PendingToken,
        signature: Vec<u8>,
    ) -> Result<P::Artifact, RestPkiError> {
        let path = format!("{}/{}/SignedBytes", P::PROCESS_PATH, token);
        self.post(&path, Some(&SignatureCompletion { signature }))
            .await
    }

    /// Completes a process whose signature was computed by Web PKI in the
    /// browser.
    pub async fn finalize<P: SignatureProcess>(
        &self,
        token: &PendingToken,
    ) -> Result<P::Artifact, RestPkiError> {
        let path = format!("{}/{}/Finalize", P::PROCESS_PATH, token);
        self.post::<(), _>(&path, None).await
    }

    async fn post<B, R>(&self, path: &str, body: Option<&B>) -> Result<R, RestPkiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint.join(path)?;
        tracing::debug!(%url, "calling REST PKI");

        let mut builder = self
            .http
            .post(url)
            .bearer_auth(self.access_token.expose_secret());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let error: ErrorModel = serde_json::from_slice(&bytes).unwrap_or_default();
            let message = error.message.or_else(|| {
                let text = String::from_utf8_lossy(&bytes).trim().to_string();
                (!text.is_empty()).then_some(text)
            });
            tracing::warn!(%status, code = ?error.code, "REST PKI call failed");
            return Err(RestPkiError::Api {
                status,
                code: error.code,
                message,
                detail: error.detail,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RestPkiError::Protocol(e.to_string()))
    }
}
