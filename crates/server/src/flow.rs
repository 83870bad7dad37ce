//! Server-side completion of a REST PKI signature.
//!
//! The flow is a chain of states, each consumed by the next transition:
//!
//! 1. [`initiate`] starts the process and yields [`Initiated`], holding the
//!    pending token and the digest descriptor.
//! 2. [`Initiated::sign`] computes the raw signature locally and yields
//!    [`Signed`].
//! 3. [`Signed::finalize`] hands the signature back and yields
//!    [`Finalized`], holding the signed artifact.
//! 4. [`Finalized::persist`] writes the artifact to app-data.
//!
//! Any failure ends the flow; the token is moved into the failing call and
//! cannot be presented again. Web PKI signatures skip steps 1-3 on the
//! server and enter at [`finalize_web_signature`].

use std::marker::PhantomData;

use restpki_client::{
    CertificateModel, PendingToken, RestPkiClient, RestPkiError, SignatureProcess, SignedArtifact,
};
use serde::Serialize;

use crate::resources::ResourceError;
use crate::signing::{DataSigner, DigestAlgorithm, SigningError};
use crate::storage::{AppDataStorage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Remote(#[from] RestPkiError),
    #[error("REST PKI response is missing {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// What has to be signed locally, as returned by the start call.
#[derive(Debug, Clone)]
pub struct DigestDescriptor {
    pub digest_algorithm_oid: String,
    pub to_sign_data: Vec<u8>,
}

/// Started process waiting for a local signature.
#[derive(Debug)]
pub struct Initiated<P> {
    token: PendingToken,
    digest: DigestDescriptor,
    process: PhantomData<P>,
}

/// Locally signed process waiting to be finalized.
#[derive(Debug)]
pub struct Signed<P> {
    token: PendingToken,
    algorithm: DigestAlgorithm,
    signature: Vec<u8>,
    process: PhantomData<P>,
}

/// Completed process holding the signed artifact.
pub struct Finalized<P: SignatureProcess> {
    artifact: P::Artifact,
}

/// A signed file written to app-data, with the certificate that signed it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSignature {
    pub signed_file: String,
    pub signer_cert: CertificateModel,
}

/// Starts a process whose request carries the signer certificate, so the
/// service answers with the digest to sign.
pub async fn initiate<P: SignatureProcess>(
    client: &RestPkiClient,
    request: &P::Request,
) -> Result<Initiated<P>, FlowError> {
    let started = client.start::<P>(request).await?;

    let digest = DigestDescriptor {
        digest_algorithm_oid: started
            .digest_algorithm_oid
            .ok_or(FlowError::MissingField("digestAlgorithmOid"))?,
        to_sign_data: started
            .to_sign_data
            .ok_or(FlowError::MissingField("toSignData"))?,
    };
    tracing::debug!(process = P::NAME, oid = %digest.digest_algorithm_oid, "signature initiated");

    Ok(Initiated {
        token: started.token,
        digest,
        process: PhantomData,
    })
}

impl<P: SignatureProcess> Initiated<P> {
    pub fn token(&self) -> &PendingToken {
        &self.token
    }

    pub fn digest(&self) -> &DigestDescriptor {
        &self.digest
    }

    pub fn sign(self, signer: &dyn DataSigner) -> Result<Signed<P>, FlowError> {
        let algorithm = DigestAlgorithm::from_oid(&self.digest.digest_algorithm_oid)?;
        let signature = signer.sign(algorithm, &self.digest.to_sign_data)?;
        tracing::debug!(process = P::NAME, %algorithm, "to-sign data signed");

        Ok(Signed {
            token: self.token,
            algorithm,
            signature,
            process: PhantomData,
        })
    }
}

impl<P: SignatureProcess> Signed<P> {
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub async fn finalize(self, client: &RestPkiClient) -> Result<Finalized<P>, FlowError> {
        let artifact = client
            .complete_with_signature::<P>(&self.token, self.signature)
            .await?;
        Ok(Finalized { artifact })
    }
}

impl<P: SignatureProcess> Finalized<P> {
    pub fn certificate(&self) -> &CertificateModel {
        self.artifact.certificate()
    }

    pub async fn persist(self, storage: &AppDataStorage) -> Result<CompletedSignature, FlowError> {
        let signer_cert = self.artifact.certificate().clone();
        let content = self.artifact.into_content();
        let extension = <P::Artifact as SignedArtifact>::EXTENSION;
        let signed_file = storage.store(&content, extension).await?;

        Ok(CompletedSignature {
            signed_file,
            signer_cert,
        })
    }
}

/// Runs the whole flow with the server's own key.
#[tracing::instrument(level = "info", skip_all, fields(process = P::NAME))]
pub async fn sign_with_server_key<P: SignatureProcess>(
    client: &RestPkiClient,
    signer: &dyn DataSigner,
    storage: &AppDataStorage,
    request: &P::Request,
) -> Result<CompletedSignature, FlowError> {
    let completed = initiate::<P>(client, request)
        .await?
        .sign(signer)?
        .finalize(client)
        .await?
        .persist(storage)
        .await?;

    tracing::info!(signed_file = %completed.signed_file, "signature completed");
    Ok(completed)
}

/// Finalizes a process signed in the browser and stores the result.
#[tracing::instrument(level = "info", skip_all, fields(process = P::NAME))]
pub async fn finalize_web_signature<P: SignatureProcess>(
    client: &RestPkiClient,
    storage: &AppDataStorage,
    token: PendingToken,
) -> Result<CompletedSignature, FlowError> {
    let artifact = client.finalize::<P>(&token).await?;
    let completed = Finalized::<P> { artifact }.persist(storage).await?;

    tracing::info!(signed_file = %completed.signed_file, "signature completed");
    Ok(completed)
}
