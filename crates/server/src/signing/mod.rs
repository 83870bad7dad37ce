mod algorithm;
mod rsa;
mod signer;

pub use algorithm::DigestAlgorithm;
pub use self::rsa::RsaSigner;
pub use signer::{DataSigner, SigningError};
