use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use uuid::{Uuid, uuid};

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} {value:?} (expected a known name or a GUID)")]
pub struct ParseIdentifierError {
    kind: &'static str,
    value: String,
}

/// Signature policies published by REST PKI.
///
/// Serialized as the policy GUID. Policies not listed here can still be used
/// through [`SignaturePolicy::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignaturePolicy {
    CadesBes,
    PkiBrazilCadesAdrBasica,
    PkiBrazilCadesAdrTempo,
    XadesBes,
    PkiBrazilXmlAdrBasica,
    Custom(Uuid),
}

impl SignaturePolicy {
    const KNOWN: [SignaturePolicy; 5] = [
        Self::CadesBes,
        Self::PkiBrazilCadesAdrBasica,
        Self::PkiBrazilCadesAdrTempo,
        Self::XadesBes,
        Self::PkiBrazilXmlAdrBasica,
    ];

    pub fn id(&self) -> Uuid {
        match self {
            Self::CadesBes => uuid!("a4522485-c9e5-46c3-950b-0d6e951e17d1"),
            Self::PkiBrazilCadesAdrBasica => uuid!("3ddd8001-1672-4eb5-a4a2-6e32b17ddc46"),
            Self::PkiBrazilCadesAdrTempo => uuid!("a5332ad1-d105-447c-a4bb-b5d02e8b0b9b"),
            Self::XadesBes => uuid!("1beba282-d1b6-4f58-a85f-b3c9d8f28ef0"),
            Self::PkiBrazilXmlAdrBasica => uuid!("1cf5db62-58b6-40ba-88a3-d41bada9b621"),
            Self::Custom(id) => *id,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::CadesBes => Some("cades-bes"),
            Self::PkiBrazilCadesAdrBasica => Some("pki-brazil-cades-adr-basica"),
            Self::PkiBrazilCadesAdrTempo => Some("pki-brazil-cades-adr-tempo"),
            Self::XadesBes => Some("xades-bes"),
            Self::PkiBrazilXmlAdrBasica => Some("pki-brazil-xml-adr-basica"),
            Self::Custom(_) => None,
        }
    }

    pub fn from_id(id: Uuid) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|policy| policy.id() == id)
            .unwrap_or(Self::Custom(id))
    }
}

impl FromStr for SignaturePolicy {
    type Err = ParseIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(policy) = Self::KNOWN.into_iter().find(|p| p.name() == Some(s)) {
            return Ok(policy);
        }
        Uuid::parse_str(s)
            .map(Self::from_id)
            .map_err(|_| ParseIdentifierError {
                kind: "signature policy",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for SignaturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.id()),
        }
    }
}

impl Serialize for SignaturePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.id())
    }
}

/// Security contexts, i.e. the trust anchors REST PKI validates chains against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityContext {
    /// Lacuna Software test PKI. Development only.
    LacunaTest,
    WindowsServer,
    Custom(Uuid),
}

impl SecurityContext {
    const KNOWN: [SecurityContext; 2] = [Self::LacunaTest, Self::WindowsServer];

    pub fn id(&self) -> Uuid {
        match self {
            Self::LacunaTest => uuid!("803517ad-3bbc-4169-b085-60053a8f6dbf"),
            Self::WindowsServer => uuid!("3881384c-a54d-45c5-bbe9-976b674f5ec7"),
            Self::Custom(id) => *id,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::LacunaTest => Some("lacuna-test"),
            Self::WindowsServer => Some("windows-server"),
            Self::Custom(_) => None,
        }
    }

    pub fn from_id(id: Uuid) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|context| context.id() == id)
            .unwrap_or(Self::Custom(id))
    }
}

impl FromStr for SecurityContext {
    type Err = ParseIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(context) = Self::KNOWN.into_iter().find(|c| c.name() == Some(s)) {
            return Ok(context);
        }
        Uuid::parse_str(s)
            .map(Self::from_id)
            .map_err(|_| ParseIdentifierError {
                kind: "security context",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.id()),
        }
    }
}

impl Serialize for SecurityContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.id())
    }
}
