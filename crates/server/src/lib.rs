pub mod config;
pub mod error;
pub mod flow;
pub mod requests;
pub mod resources;
pub mod server;
pub mod signing;
pub mod storage;

pub use config::Config;
pub use flow::{CompletedSignature, FlowError, finalize_web_signature, sign_with_server_key};
pub use server::{AppState, router, run};
pub use signing::{DataSigner, DigestAlgorithm, RsaSigner};
