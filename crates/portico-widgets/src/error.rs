//! Widget errors

use http::StatusCode;
use portico_nav::TransportError;

/// Errors raised by portal widgets.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
	#[error(transparent)]
	Transport(#[from] TransportError),

	#[error("Unexpected status {status} from {url}")]
	Status { status: StatusCode, url: String },

	#[error("Invalid URL '{url}': {source}")]
	InvalidUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},

	#[error("Invalid amount for {field}: '{value}'")]
	InvalidAmount { field: String, value: String },

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}
