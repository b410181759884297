//! Load outcomes and the load error taxonomy.

use crate::dom::DomError;
use crate::fragment::FragmentError;
use crate::settings::SettingsError;
use crate::transport::TransportError;
use http::StatusCode;

/// Errors raised while wiring a fetcher or router from settings.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
	#[error("Settings error: {0}")]
	Settings(#[from] SettingsError),

	#[error("Selector error: {0}")]
	Selector(#[from] DomError),

	#[error("Fragment error: {0}")]
	Fragment(#[from] FragmentError),

	#[error("Transport error: {0}")]
	Transport(#[from] TransportError),
}

/// Why a view load did not produce content.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
	/// The session has expired; the page navigated to `location`.
	#[error("Session expired, redirected to {location}")]
	AuthExpired { location: String },

	/// Transport failure or a non-success status.
	#[error("Load failed: {reason}")]
	LoadFailed { reason: String },

	/// The response had no fragment wrapper. Absorbed as empty content.
	#[error("Response has no fragment wrapper")]
	MissingFragment,

	/// A later load replaced this one before its response arrived.
	#[error("Load superseded by a newer request")]
	Superseded,

	/// The target named no view; nothing was requested.
	#[error("Navigation target has no tab")]
	MissingTab,
}

impl LoadError {
	pub(crate) fn status(status: StatusCode) -> Self {
		Self::LoadFailed {
			reason: format!("HTTP {}", status),
		}
	}
}

impl From<TransportError> for LoadError {
	fn from(err: TransportError) -> Self {
		Self::LoadFailed {
			reason: err.to_string(),
		}
	}
}

/// Result of [`ContentFetcher::load`](crate::fetcher::ContentFetcher::load).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
	/// Content was written to the pane.
	Loaded(String),
	/// `302`/`401`; the page navigated away.
	Redirected(String),
	/// `200` carrying the login page; the page navigated away.
	LoginDetected(String),
	/// The error message was written to the pane.
	Failed(LoadError),
	/// A newer load owns the pane; nothing was written.
	Superseded,
}

impl FetchOutcome {
	/// Whether content reached the pane.
	pub fn is_loaded(&self) -> bool {
		matches!(self, Self::Loaded(_))
	}

	/// Redirect target, if the session expired.
	pub fn redirect_location(&self) -> Option<&str> {
		match self {
			Self::Redirected(location) | Self::LoginDetected(location) => Some(location),
			_ => None,
		}
	}

	/// Converts to a `Result` carrying the loaded fragment.
	pub fn into_result(self) -> Result<String, LoadError> {
		match self {
			Self::Loaded(html) => Ok(html),
			Self::Redirected(location) | Self::LoginDetected(location) => {
				Err(LoadError::AuthExpired { location })
			}
			Self::Failed(err) => Err(err),
			Self::Superseded => Err(LoadError::Superseded),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(FetchOutcome::Loaded("x".into()), Ok("x".to_string()))]
	#[case(
		FetchOutcome::Redirected("/a".into()),
		Err(LoadError::AuthExpired { location: "/a".into() })
	)]
	#[case(
		FetchOutcome::LoginDetected("/b".into()),
		Err(LoadError::AuthExpired { location: "/b".into() })
	)]
	#[case(FetchOutcome::Superseded, Err(LoadError::Superseded))]
	fn test_into_result(#[case] outcome: FetchOutcome, #[case] expected: Result<String, LoadError>) {
		assert_eq!(outcome.into_result(), expected);
	}

	#[rstest]
	fn test_transport_error_maps_to_load_failed() {
		let err: LoadError = TransportError::Network("refused".into()).into();
		assert_eq!(
			err,
			LoadError::LoadFailed {
				reason: "Network error: refused".into()
			}
		);
	}

	#[rstest]
	fn test_status_reason() {
		assert_eq!(
			LoadError::status(StatusCode::NOT_FOUND).to_string(),
			"Load failed: HTTP 404 Not Found"
		);
	}
}
