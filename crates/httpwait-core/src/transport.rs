use std::future::Future;

use crate::error::TransportError;
use crate::request::PollRequest;

/// One fully-read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues a single HTTP request for an attempt.
///
/// Implementations acquire and release their connection within `send`;
/// the poll loop never holds more than one request in flight.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &PollRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}
