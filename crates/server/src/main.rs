use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use restpki_client::SecurityContext;
use restpki_samples::{AppState, Config, run};
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    #[clap(long, default_value = "127.0.0.1")]
    host: String,
    #[clap(long, default_value = "3000")]
    port: u16,
    #[clap(long, env = "REST_PKI_ENDPOINT", default_value = "https://pki.rest/")]
    endpoint: String,
    #[clap(long, env = "REST_PKI_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,
    #[clap(long, env = "RESOURCES_DIR", default_value = "resources")]
    resources_dir: PathBuf,
    #[clap(long, env = "APP_DATA_DIR", default_value = "public/app-data")]
    app_data_dir: PathBuf,
    #[clap(long, env = "SIGNER_KEY_PASSPHRASE", hide_env_values = true)]
    key_passphrase: Option<String>,
    /// Security context name (lacuna-test, windows-server) or GUID.
    /// The Lacuna test PKI is for development only.
    #[clap(long, env = "SECURITY_CONTEXT", default_value = "lacuna-test")]
    security_context: SecurityContext,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,restpki_samples=debug")),
        )
        .init();

    let args = Args::parse();

    let config = Config {
        endpoint: args.endpoint,
        access_token: SecretString::from(args.access_token),
        resources_dir: args.resources_dir,
        app_data_dir: args.app_data_dir,
        key_passphrase: args.key_passphrase.map(SecretString::from),
        security_context: args.security_context,
    };

    let state = AppState::from_config(config).await?;
    run(args.host, args.port, state).await
}
