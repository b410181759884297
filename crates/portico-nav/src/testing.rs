//! Test doubles for driving the fetcher and router without a network.

use crate::transport::{HttpExchange, Transport, TransportError};
use async_trait::async_trait;
use http::StatusCode;
use parking_lot::Mutex;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
struct Script {
	key: String,
	delay: Option<Duration>,
	reply: Result<HttpExchange, TransportError>,
}

/// A [`Transport`] answering from a script.
///
/// Scripts are keyed by a suffix of the requested URL, typically the view
/// path (`"?cmd=home"`). Unscripted requests answer `404`. Responses carry
/// the requested URL as their final URL unless the script sets one.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
	scripts: Mutex<Vec<Script>>,
	requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
	/// Creates a transport with no scripts.
	pub fn new() -> Self {
		Self::default()
	}

	/// Answers `key` with a `200` HTML body.
	pub fn respond(&self, key: impl Into<String>, body: impl Into<String>) {
		self.script(key.into(), None, Ok(HttpExchange::ok(body)));
	}

	/// Answers `key` with a prepared exchange.
	pub fn respond_with(&self, key: impl Into<String>, exchange: HttpExchange) {
		self.script(key.into(), None, Ok(exchange));
	}

	/// Answers `key` with a `200` body after `delay`.
	pub fn respond_after(&self, key: impl Into<String>, delay: Duration, body: impl Into<String>) {
		self.script(key.into(), Some(delay), Ok(HttpExchange::ok(body)));
	}

	/// Fails requests for `key`.
	pub fn fail(&self, key: impl Into<String>, error: TransportError) {
		self.script(key.into(), None, Err(error));
	}

	/// Every URL requested so far, in order.
	pub fn requests(&self) -> Vec<String> {
		self.requests.lock().clone()
	}

	fn script(&self, key: String, delay: Option<Duration>, reply: Result<HttpExchange, TransportError>) {
		let mut scripts = self.scripts.lock();
		scripts.retain(|s| s.key != key);
		scripts.push(Script { key, delay, reply });
	}

	fn lookup(&self, url: &Url) -> Option<Script> {
		let url = url.as_str();
		self.scripts
			.lock()
			.iter()
			.find(|s| url == s.key || url.ends_with(&s.key))
			.cloned()
	}
}

#[async_trait]
impl Transport for ScriptedTransport {
	async fn get(&self, url: &Url) -> Result<HttpExchange, TransportError> {
		self.requests.lock().push(url.to_string());

		let Some(script) = self.lookup(url) else {
			return Ok(HttpExchange::new(StatusCode::NOT_FOUND, "").with_final_url(url.clone()));
		};

		if let Some(delay) = script.delay {
			tokio::time::sleep(delay).await;
		}

		script.reply.map(|mut exchange| {
			if exchange.final_url.is_none() {
				exchange.final_url = Some(url.clone());
			}
			exchange
		})
	}
}
