use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::extract::FieldPath;

pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_INTERVAL_SECS: u64 = 1;

/// Pre-built credential material handed to the transport untouched.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic(String),
    Digest(String),
}

impl Credentials {
    /// The raw credential string, e.g. `user:password`.
    pub fn secret(&self) -> &str {
        match self {
            Self::Basic(s) | Self::Digest(s) => s,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Basic(_) => "basic",
            Self::Digest(_) => "digest",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(_) => f.write_str("Basic(<redacted>)"),
            Self::Digest(_) => f.write_str("Digest(<redacted>)"),
        }
    }
}

/// The success condition of a poll: status, then optional field presence,
/// then optional field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    status: u16,
    field: Option<FieldPath>,
    value: Option<String>,
}

impl Expectation {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn field(&self) -> Option<&FieldPath> {
        self.field.as_ref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Everything one poll loop invocation needs. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollRequest {
    url: String,
    method: String,
    headers: BTreeMap<String, String>,
    credentials: Option<Credentials>,
    expectation: Expectation,
    interval_secs: u64,
    timeout_secs: u64,
}

impl PollRequest {
    pub fn builder(url: impl Into<String>) -> PollRequestBuilder {
        PollRequestBuilder::new(url)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

/// Collects raw inputs and checks every invariant in [`Self::build`].
#[derive(Debug, Clone)]
pub struct PollRequestBuilder {
    url: String,
    method: String,
    headers: BTreeMap<String, String>,
    credentials: Option<Credentials>,
    expected_status: u16,
    expected_field: Option<String>,
    expected_value: Option<String>,
    interval_secs: u64,
    timeout_secs: u64,
}

impl PollRequestBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: DEFAULT_METHOD.to_string(),
            headers: BTreeMap::new(),
            credentials: None,
            expected_status: DEFAULT_EXPECTED_STATUS,
            expected_field: None,
            expected_value: None,
            interval_secs: DEFAULT_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn expected_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    pub fn expected_field(mut self, path: impl Into<String>) -> Self {
        self.expected_field = Some(path.into());
        self
    }

    pub fn expected_value(mut self, value: impl Into<String>) -> Self {
        self.expected_value = Some(value.into());
        self
    }

    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<PollRequest, ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let parsed = url::Url::parse(&self.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.url,
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        if http::Method::from_bytes(self.method.as_bytes()).is_err() {
            return Err(ConfigError::InvalidMethod(self.method));
        }
        if !(100..=599).contains(&self.expected_status) {
            return Err(ConfigError::InvalidStatus(self.expected_status));
        }
        for (name, value) in &self.headers {
            if http::HeaderName::from_bytes(name.as_bytes()).is_err() {
                return Err(ConfigError::InvalidHeaderName(name.clone()));
            }
            if http::HeaderValue::from_str(value).is_err() {
                return Err(ConfigError::InvalidHeaderValue(name.clone()));
            }
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::NonPositive { name: "interval" });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::NonPositive { name: "timeout" });
        }
        if self.expected_value.is_some() && self.expected_field.is_none() {
            return Err(ConfigError::ValueWithoutField);
        }
        let field = self
            .expected_field
            .as_deref()
            .map(FieldPath::parse)
            .transpose()?;

        Ok(PollRequest {
            url: self.url,
            method: self.method.to_ascii_uppercase(),
            headers: self.headers,
            credentials: self.credentials,
            expectation: Expectation {
                status: self.expected_status,
                field,
                value: self.expected_value,
            },
            interval_secs: self.interval_secs,
            timeout_secs: self.timeout_secs,
        })
    }
}
