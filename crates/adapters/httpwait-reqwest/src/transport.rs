use std::time::Duration;

use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};

use httpwait_core::{Credentials, HttpResponse, PollRequest, Transport, TransportError};

use crate::digest::{DigestChallenge, split_credentials};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client settings shared by every attempt.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound for one attempt, connect through body read.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: format!("httpwait/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::new(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn prepare(
        &self,
        method: &Method,
        url: Url,
        request: &PollRequest,
        authorization: Option<&str>,
    ) -> RequestBuilder {
        let mut builder = self.client.request(method.clone(), url);
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        match (authorization, request.credentials()) {
            (Some(value), _) => builder.header(AUTHORIZATION, value),
            (None, Some(Credentials::Basic(secret))) => {
                let (username, password) = split_credentials(secret);
                builder.basic_auth(username, Some(password))
            },
            _ => builder,
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &PollRequest) -> Result<HttpResponse, TransportError> {
        let method = Method::from_bytes(request.method().as_bytes()).map_err(|e| {
            TransportError::new(format!("invalid method {:?}: {e}", request.method()))
        })?;
        let url = Url::parse(request.url())
            .map_err(|e| TransportError::new(format!("invalid url {:?}: {e}", request.url())))?;

        let mut response = self
            .prepare(&method, url, request, None)
            .send()
            .await
            .map_err(describe)?;

        if let Some(Credentials::Digest(secret)) = request.credentials()
            && response.status() == StatusCode::UNAUTHORIZED
            && let Some(challenge) = digest_challenge(&response)
        {
            let target = response.url().clone();
            let authorization =
                challenge.authorization(secret, method.as_str(), &request_uri(&target));
            tracing::debug!(
                url = %target,
                realm = challenge.realm(),
                "Answering digest challenge"
            );
            response = self
                .prepare(&method, target, request, Some(&authorization))
                .send()
                .await
                .map_err(describe)?;
        }

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(describe)?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn digest_challenge(response: &reqwest::Response) -> Option<DigestChallenge> {
    response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(DigestChallenge::parse)
}

/// The `request-target` form of `url` used in the digest `uri` parameter.
fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

/// Flatten a reqwest error and its causes into one line.
fn describe(err: reqwest::Error) -> TransportError {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    TransportError::new(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uri_keeps_query() {
        let url = Url::parse("http://example.com/dir/index.html?a=1&b=2").unwrap();
        assert_eq!(request_uri(&url), "/dir/index.html?a=1&b=2");
        let url = Url::parse("http://example.com").unwrap();
        assert_eq!(request_uri(&url), "/");
    }

    #[test]
    fn default_config_names_the_tool() {
        let config = TransportConfig::default();
        assert!(config.user_agent.starts_with("httpwait/"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn client_builds_with_defaults() {
        assert!(ReqwestTransport::new(TransportConfig::default()).is_ok());
    }
}
