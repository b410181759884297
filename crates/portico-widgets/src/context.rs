//! Portal context derived from a page URL.

use serde::{Deserialize, Serialize};
use url::Url;

/// Portal name used when the URL names none.
pub const UNKNOWN_PORTAL: &str = "Unknown";

/// Page name used when the URL names none.
pub const UNKNOWN_PAGE: &str = "_unknown";

/// Which portal, page and record a URL refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalContext {
	pub portal_name: String,
	pub page_name: String,
	pub record_id: Option<String>,
}

impl PortalContext {
	/// Resolves the context of `url`.
	///
	/// - portal: `portal` parameter, else the second path segment
	/// - page: `tab`, else `cmd`, else the last path segment
	/// - record: `guid`, else `id`, else `record`
	///
	/// ```
	/// use portico_widgets::context::PortalContext;
	/// use url::Url;
	///
	/// let url = Url::parse("https://h/portal/advising?tab=location_detail&guid=abc123").unwrap();
	/// let context = PortalContext::from_url(&url);
	/// assert_eq!(context.portal_name, "advising");
	/// assert_eq!(context.page_name, "location_detail");
	/// assert_eq!(context.record_id.as_deref(), Some("abc123"));
	/// ```
	pub fn from_url(url: &Url) -> Self {
		let segments: Vec<&str> = url
			.path_segments()
			.map(|s| s.filter(|p| !p.is_empty()).collect())
			.unwrap_or_default();

		let portal_name = param(url, "portal")
			.or_else(|| segments.get(1).map(|s| s.to_string()))
			.unwrap_or_else(|| UNKNOWN_PORTAL.to_string());

		let page_name = param(url, "tab")
			.or_else(|| param(url, "cmd"))
			.or_else(|| segments.last().map(|s| s.to_string()))
			.unwrap_or_else(|| UNKNOWN_PAGE.to_string());

		let record_id = param(url, "guid")
			.or_else(|| param(url, "id"))
			.or_else(|| param(url, "record"));

		Self {
			portal_name,
			page_name,
			record_id,
		}
	}
}

/// First value of `key`, treating an empty value as absent.
fn param(url: &Url, key: &str) -> Option<String> {
	url.query_pairs()
		.find(|(k, _)| k == key)
		.map(|(_, v)| v.into_owned())
		.filter(|v| !v.is_empty())
}
