pub mod digest;
pub mod transport;

pub use digest::DigestChallenge;
pub use transport::{ReqwestTransport, TransportConfig};
