//! HTTP transport for view fetches.
//!
//! [`Transport`] is the seam between the fetcher and the network. The
//! production implementation is [`ReqwestTransport`]; tests use
//! [`ScriptedTransport`](crate::testing::ScriptedTransport).

use crate::settings::PortalSettings;
use async_trait::async_trait;
use http::header::{HeaderMap, HeaderName, HeaderValue, LOCATION};
use http::StatusCode;
use url::Url;

/// Redirect hops followed before a request fails.
pub const MAX_REDIRECTS: usize = 10;

/// Transport errors
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
	/// No response was received.
	#[error("Network error: {0}")]
	Network(String),

	/// The request timed out.
	#[error("Request to {0} timed out")]
	Timeout(String),

	/// The client could not be constructed.
	#[error("Client configuration error: {0}")]
	Client(String),
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpExchange {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Response body decoded as text.
	pub body: String,
	/// URL the response was finally served from, after any redirects.
	pub final_url: Option<Url>,
}

impl HttpExchange {
	/// Creates an exchange with no headers.
	pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: body.into(),
			final_url: None,
		}
	}

	/// A `200 OK` exchange with an HTML body.
	pub fn ok(body: impl Into<String>) -> Self {
		Self::new(StatusCode::OK, body)
	}

	/// Adds a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}

	/// Sets the final URL.
	pub fn with_final_url(mut self, url: Url) -> Self {
		self.final_url = Some(url);
		self
	}

	/// The `Location` header, if present and valid text.
	pub fn location(&self) -> Option<&str> {
		self.headers
			.get(LOCATION)
			.and_then(|v| v.to_str().ok())
			.filter(|v| !v.is_empty())
	}
}

/// Issues GET requests for portal views.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Fetches `url`. Non-success statuses are returned as exchanges, not errors.
	async fn get(&self, url: &Url) -> Result<HttpExchange, TransportError>;
}

/// [`Transport`] backed by a `reqwest` client with a cookie store.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	/// Builds a client from portal settings.
	///
	/// `302 Found` is surfaced to the session guard unless `follow_redirects`
	/// is set. Other redirects are followed up to [`MAX_REDIRECTS`] hops. No
	/// timeout is applied unless `request_timeout_secs` is set.
	pub fn new(settings: &PortalSettings) -> Result<Self, TransportError> {
		let redirect = if settings.follow_redirects {
			reqwest::redirect::Policy::limited(MAX_REDIRECTS)
		} else {
			reqwest::redirect::Policy::custom(|attempt| {
				if attempt.status() == StatusCode::FOUND {
					attempt.stop()
				} else if attempt.previous().len() > MAX_REDIRECTS {
					attempt.error("too many redirects")
				} else {
					attempt.follow()
				}
			})
		};

		let mut builder = reqwest::Client::builder()
			.cookie_store(true)
			.redirect(redirect);
		if let Some(timeout) = settings.request_timeout() {
			builder = builder.timeout(timeout);
		}

		let client = builder
			.build()
			.map_err(|e| TransportError::Client(format!("Failed to create client: {}", e)))?;

		Ok(Self { client })
	}

	/// Wraps an existing client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}
}

#[async_trait]
impl Transport for ReqwestTransport {
	async fn get(&self, url: &Url) -> Result<HttpExchange, TransportError> {
		let response = self
			.client
			.get(url.clone())
			.header(reqwest::header::ACCEPT, "text/html")
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					TransportError::Timeout(url.to_string())
				} else {
					TransportError::Network(format!("Request failed: {}", e))
				}
			})?;

		let status = response.status();
		let headers = response.headers().clone();
		let final_url = response.url().clone();
		let body = response
			.text()
			.await
			.map_err(|e| TransportError::Network(format!("Failed to read body: {}", e)))?;

		Ok(HttpExchange {
			status,
			headers,
			body,
			final_url: Some(final_url),
		})
	}
}
