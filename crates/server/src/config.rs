use std::path::PathBuf;

use restpki_client::SecurityContext;
use secrecy::SecretString;

/// Everything the service needs to run, resolved once at startup.
#[derive(Debug)]
pub struct Config {
    /// Base URL of the REST PKI instance.
    pub endpoint: String,
    /// API access token sent as a bearer token on every call.
    pub access_token: SecretString,
    /// Signer certificate, signer key and sample documents.
    pub resources_dir: PathBuf,
    /// Where signed files are written and uploads are read from.
    pub app_data_dir: PathBuf,
    /// Passphrase of the signer key, if it is encrypted.
    pub key_passphrase: Option<SecretString>,
    pub security_context: SecurityContext,
}
