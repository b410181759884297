//! Session-timeout detection.
//!
//! An expired portal session shows up in two shapes: a real `302`/`401`, or a
//! `200` whose body is the login form (reverse proxies and embedded contexts
//! swallow the redirect). [`SessionGuard`] folds both into one verdict so a
//! login form is never rendered inside a content pane.

use crate::dom::{DomError, parse_selector};
use crate::settings::{GuardProfileKind, PortalSettings};
use crate::transport::HttpExchange;
use http::StatusCode;
use scraper::{Html, Selector};

/// How the login page is recognised in a `200` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginMarker {
	/// An element matching the selector exists.
	Selector(String),
	/// The body mentions the login path. The first anchor's `href` is the
	/// redirect target.
	AnchorContent,
}

/// Classification of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
	/// Explicit redirect or unauthorized status.
	Redirected(String),
	/// A `200` carrying the login page.
	LoginDetected(String),
	/// Genuine content.
	Genuine,
}

impl Verdict {
	/// The location to navigate to, if the session has expired.
	pub fn location(&self) -> Option<&str> {
		match self {
			Self::Redirected(location) | Self::LoginDetected(location) => Some(location),
			Self::Genuine => None,
		}
	}
}

/// Decides whether an exchange is an authentication failure.
#[derive(Debug, Clone)]
pub struct SessionGuard {
	marker: LoginMarker,
	login_path: String,
	marker_selector: Option<Selector>,
	anchor_selector: Selector,
}

impl SessionGuard {
	/// Creates a guard for `marker`, falling back to `login_path`.
	pub fn new(marker: LoginMarker, login_path: impl Into<String>) -> Result<Self, DomError> {
		let marker_selector = match &marker {
			LoginMarker::Selector(selector) => Some(parse_selector(selector)?),
			LoginMarker::AnchorContent => None,
		};
		Ok(Self {
			marker,
			login_path: login_path.into(),
			marker_selector,
			anchor_selector: parse_selector("a[href]")?,
		})
	}

	/// Builds the guard for the settings' deployment profile.
	pub fn from_settings(settings: &PortalSettings) -> Result<Self, DomError> {
		let marker = match settings.guard {
			GuardProfileKind::BodyMarker => LoginMarker::Selector(settings.login_marker.clone()),
			GuardProfileKind::AnchorContent => LoginMarker::AnchorContent,
		};
		Self::new(marker, settings.login_path.clone())
	}

	/// The configured login marker.
	pub fn marker(&self) -> &LoginMarker {
		&self.marker
	}

	/// Fallback redirect target.
	pub fn login_path(&self) -> &str {
		&self.login_path
	}

	/// Classifies an exchange.
	///
	/// 1. `302`/`401`: redirect to `Location`, else the login path.
	/// 2. `200` with the login marker: redirect to the final URL (or, for
	///    anchor detection, the first link), else the login path.
	/// 3. Anything else is genuine.
	pub fn inspect(&self, exchange: &HttpExchange) -> Verdict {
		if let Some(location) = self.status_redirect(exchange) {
			return Verdict::Redirected(location);
		}

		if exchange.status == StatusCode::OK {
			if let Some(location) = self.detect_login(exchange) {
				return Verdict::LoginDetected(location);
			}
		}

		Verdict::Genuine
	}

	/// Redirect target for `302`/`401` responses.
	pub fn status_redirect(&self, exchange: &HttpExchange) -> Option<String> {
		match exchange.status {
			StatusCode::FOUND | StatusCode::UNAUTHORIZED => Some(
				exchange
					.location()
					.map(str::to_string)
					.unwrap_or_else(|| self.login_path.clone()),
			),
			_ => None,
		}
	}

	fn detect_login(&self, exchange: &HttpExchange) -> Option<String> {
		match (&self.marker, &self.marker_selector) {
			(LoginMarker::Selector(_), Some(selector)) => {
				let document = Html::parse_document(&exchange.body);
				let found = document.select(selector).next().is_some();
				found.then(|| {
					exchange
						.final_url
						.as_ref()
						.map(|u| u.to_string())
						.unwrap_or_else(|| self.login_path.clone())
				})
			}
			(LoginMarker::AnchorContent, _) if exchange.body.contains(&self.login_path) => {
				let document = Html::parse_document(&exchange.body);
				let href = document
					.select(&self.anchor_selector)
					.next()
					.and_then(|a| a.value().attr("href"))
					.filter(|h| !h.is_empty())
					.map(str::to_string);
				Some(href.unwrap_or_else(|| self.login_path.clone()))
			}
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::header::{HeaderValue, LOCATION};
	use rstest::{fixture, rstest};
	use url::Url;

	#[fixture]
	fn body_marker() -> SessionGuard {
		SessionGuard::from_settings(&PortalSettings::bootstrap()).unwrap()
	}

	#[fixture]
	fn anchor_content() -> SessionGuard {
		SessionGuard::from_settings(&PortalSettings::advising()).unwrap()
	}

	#[rstest]
	fn test_found_with_location(body_marker: SessionGuard) {
		let exchange = HttpExchange::new(StatusCode::FOUND, "")
			.with_header(LOCATION, HeaderValue::from_static("/x"));
		assert_eq!(body_marker.inspect(&exchange), Verdict::Redirected("/x".to_string()));
	}

	#[rstest]
	fn test_unauthorized_without_location(body_marker: SessionGuard) {
		let exchange = HttpExchange::new(StatusCode::UNAUTHORIZED, "");
		assert_eq!(
			body_marker.inspect(&exchange),
			Verdict::Redirected("/account/login".to_string())
		);
	}

	#[rstest]
	fn test_login_page_marker(body_marker: SessionGuard) {
		let exchange = HttpExchange::ok("<body id='login-page'><form></form></body>")
			.with_final_url(Url::parse("https://h/final").unwrap());
		assert_eq!(
			body_marker.inspect(&exchange),
			Verdict::LoginDetected("https://h/final".to_string())
		);
	}

	#[rstest]
	fn test_login_page_marker_without_final_url(body_marker: SessionGuard) {
		let exchange = HttpExchange::ok("<html><body id=\"login-page\"></body></html>");
		assert_eq!(
			body_marker.inspect(&exchange),
			Verdict::LoginDetected("/account/login".to_string())
		);
	}

	#[rstest]
	fn test_genuine_content(body_marker: SessionGuard) {
		let exchange = HttpExchange::ok("<div>ok</div>");
		assert_eq!(body_marker.inspect(&exchange), Verdict::Genuine);
	}

	#[rstest]
	fn test_marker_ignored_on_non_200(body_marker: SessionGuard) {
		let exchange = HttpExchange::new(StatusCode::INTERNAL_SERVER_ERROR, "<body id='login-page'></body>");
		assert_eq!(body_marker.inspect(&exchange), Verdict::Genuine);
	}

	#[rstest]
	fn test_body_marker_ignores_login_links(body_marker: SessionGuard) {
		let exchange = HttpExchange::ok("<div><a href=\"/account/login\">Sign out</a></div>");
		assert_eq!(body_marker.inspect(&exchange), Verdict::Genuine);
	}

	#[rstest]
	fn test_anchor_content_uses_first_link(anchor_content: SessionGuard) {
		let exchange = HttpExchange::ok(
			"<p>Session expired</p><a href=\"/account/login?r=%2Fportal\">Log in</a>",
		);
		assert_eq!(
			anchor_content.inspect(&exchange),
			Verdict::LoginDetected("/account/login?r=%2Fportal".to_string())
		);
	}

	#[rstest]
	fn test_anchor_content_without_anchor(anchor_content: SessionGuard) {
		let exchange = HttpExchange::ok("<script>location='/account/login'</script>");
		assert_eq!(
			anchor_content.inspect(&exchange),
			Verdict::LoginDetected("/account/login".to_string())
		);
	}

	#[rstest]
	fn test_anchor_content_genuine(anchor_content: SessionGuard) {
		let exchange = HttpExchange::ok("<div class=\"dynamic-page-wrapper\">grades</div>");
		assert_eq!(anchor_content.inspect(&exchange), Verdict::Genuine);
	}

	#[rstest]
	fn test_anchor_content_still_honours_status(anchor_content: SessionGuard) {
		let exchange = HttpExchange::new(StatusCode::UNAUTHORIZED, "");
		assert_eq!(
			anchor_content.inspect(&exchange),
			Verdict::Redirected("/account/login".to_string())
		);
	}

	#[rstest]
	fn test_invalid_marker_selector() {
		let result = SessionGuard::new(LoginMarker::Selector(":::".to_string()), "/login");
		assert!(result.is_err());
	}

	#[rstest]
	fn test_verdict_location() {
		assert_eq!(Verdict::Redirected("/a".to_string()).location(), Some("/a"));
		assert_eq!(Verdict::Genuine.location(), None);
	}
}
