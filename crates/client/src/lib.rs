//! Typed client for the REST PKI signature API.
//!
//! Every signature follows the same shape on the wire: a process is started
//! with a request document, the service answers with a single-use token, and
//! the process is later completed with that token. [`SignatureProcess`]
//! describes one such process kind ([`Cades`], [`FullXml`]) so the calls in
//! [`RestPkiClient`] stay generic.

mod client;
mod error;
mod model;
mod standard;

pub use client::{Cades, FullXml, RestPkiClient, SignatureProcess, SignedArtifact};
pub use error::RestPkiError;
pub use model::{
    CadesSignatureRequest, CadesSignatureResult, CertificateModel, FullXmlSignatureRequest,
    NameModel, NamespaceModel, PendingToken, SignatureCompletion, SignatureElementLocation,
    SignatureStarted, XmlInsertionOption, XmlSignatureResult,
};
pub use standard::{ParseIdentifierError, SecurityContext, SignaturePolicy};
