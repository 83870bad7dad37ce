use reqwest::StatusCode;

/// Failures talking to REST PKI.
#[derive(Debug, thiserror::Error)]
pub enum RestPkiError {
    #[error("Failed to reach REST PKI: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(
        "REST PKI responded with {status}: {}",
        .message.as_deref().unwrap_or("no details given")
    )]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: Option<String>,
        detail: Option<String>,
    },
    #[error("Unexpected response from REST PKI: {0}")]
    Protocol(String),
    #[error("Invalid REST PKI endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("Invalid signature token: {0:?}")]
    InvalidToken(String),
}
