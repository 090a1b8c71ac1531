pub mod error;
pub mod extract;
pub mod observe;
pub mod poll;
pub mod request;
pub mod transport;
pub mod validate;

pub use error::{AttemptFailure, ConfigError, PollError, TransportError};
pub use extract::{FieldPath, extract, render};
pub use observe::{NoopObserver, PollObserver, TracingObserver};
pub use poll::{PollOutcome, PollSuccess, poll, poll_with_tracing};
pub use request::{Credentials, Expectation, PollRequest, PollRequestBuilder};
pub use transport::{HttpResponse, Transport};
pub use validate::validate;
