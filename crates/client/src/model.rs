use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RestPkiError;
use crate::standard::{SecurityContext, SignaturePolicy};

const TOKEN_LENGTH: usize = 43;

/// Single-use identifier of a signature process in progress.
///
/// Tokens are 43-character, case-sensitive, URL-safe strings. Every way of
/// obtaining one, parsing or deserializing, checks that shape, so a token is
/// always safe to put in a request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PendingToken(String);

impl PendingToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PendingToken {
    type Err = RestPkiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == TOKEN_LENGTH
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(RestPkiError::InvalidToken(s.to_string()))
        }
    }
}

impl TryFrom<String> for PendingToken {
    type Error = RestPkiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PendingToken> for String {
    fn from(token: PendingToken) -> Self {
        token.0
    }
}

impl fmt::Display for PendingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Starts a CMS (CAdES) signature.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CadesSignatureRequest {
    #[serde(with = "base64_bytes::option", skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Vec<u8>>,
    #[serde(with = "base64_bytes::option", skip_serializing_if = "Option::is_none")]
    pub content_to_sign: Option<Vec<u8>>,
    #[serde(with = "base64_bytes::option", skip_serializing_if = "Option::is_none")]
    pub cms_to_co_sign: Option<Vec<u8>>,
    pub signature_policy_id: SignaturePolicy,
    pub security_context_id: SecurityContext,
    /// When absent the service encapsulates the content unless co-signing a
    /// CMS that doesn't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encapsulate_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_argument: Option<String>,
}

impl CadesSignatureRequest {
    pub fn new(signature_policy_id: SignaturePolicy, security_context_id: SecurityContext) -> Self {
        Self {
            certificate: None,
            content_to_sign: None,
            cms_to_co_sign: None,
            signature_policy_id,
            security_context_id,
            encapsulate_content: None,
            callback_argument: None,
        }
    }
}

/// Where the service inserts an XML signature element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum XmlInsertionOption {
    AppendChild,
    PrependChild,
    AppendSibling,
    PrependSibling,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamespaceModel {
    pub prefix: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureElementLocation {
    #[serde(rename = "xPath")]
    pub x_path: String,
    pub insertion_option: XmlInsertionOption,
    pub namespaces: Vec<NamespaceModel>,
}

/// Starts an enveloped XAdES signature over a whole XML document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullXmlSignatureRequest {
    #[serde(with = "base64_bytes")]
    pub xml: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_element_location: Option<SignatureElementLocation>,
    pub signature_policy_id: SignaturePolicy,
    pub security_context_id: SecurityContext,
    #[serde(with = "base64_bytes::option", skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Vec<u8>>,
}

impl FullXmlSignatureRequest {
    pub fn new(
        xml: Vec<u8>,
        signature_policy_id: SignaturePolicy,
        security_context_id: SecurityContext,
    ) -> Self {
        Self {
            xml,
            signature_element_location: None,
            signature_policy_id,
            security_context_id,
            certificate: None,
        }
    }
}

/// Response to starting any signature process.
///
/// The digest fields are only present when the request carried the signer
/// certificate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStarted {
    pub token: PendingToken,
    #[serde(default, with = "base64_bytes::option")]
    pub to_sign_data: Option<Vec<u8>>,
    #[serde(default, with = "base64_bytes::option")]
    pub to_sign_hash: Option<Vec<u8>>,
    #[serde(default)]
    pub digest_algorithm_oid: Option<String>,
    #[serde(default)]
    pub certificate: Option<CertificateModel>,
}

/// Body of a `SignedBytes` call.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureCompletion {
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadesSignatureResult {
    #[serde(with = "base64_bytes")]
    pub cms: Vec<u8>,
    pub certificate: CertificateModel,
    #[serde(default)]
    pub callback_argument: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlSignatureResult {
    #[serde(with = "base64_bytes")]
    pub signed_xml: Vec<u8>,
    pub certificate: CertificateModel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NameModel {
    pub common_name: Option<String>,
    pub organization: Option<String>,
    pub organization_unit: Option<String>,
    pub country: Option<String>,
    pub email_address: Option<String>,
}

/// Signer certificate as described by the service. Unknown fields are
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateModel {
    pub subject_name: NameModel,
    pub issuer_name: NameModel,
    pub email_address: Option<String>,
    pub serial_number: Option<String>,
    pub validity_start: Option<String>,
    pub validity_end: Option<String>,
}

/// Error document returned with non-success statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ErrorModel {
    pub code: Option<String>,
    pub message: Option<String>,
    pub detail: Option<String>,
}

mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<T, S>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: AsRef<[u8]>,
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(de::Error::custom)
    }

    pub mod option {
        use base64::Engine as _;
        use base64::engine::general_purpose::STANDARD;
        use serde::{Deserialize, Deserializer, Serializer, de};

        pub fn serialize<S: Serializer>(
            bytes: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(bytes) => super::serialize(bytes, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|encoded| STANDARD.decode(encoded).map_err(de::Error::custom))
                .transpose()
        }
    }
}
