//! Page-view activity logging.

use crate::context::PortalContext;
use crate::error::WidgetError;
use portico_nav::{PortalSettings, Transport};
use std::sync::Arc;
use url::Url;

/// Reports page views to the portal's activity endpoint.
///
/// Logging never interrupts the user: failures are recorded with `tracing`
/// and otherwise ignored.
#[derive(Clone)]
pub struct ActivityLogger {
	transport: Arc<dyn Transport>,
	endpoint: Url,
}

impl ActivityLogger {
	/// Creates a logger posting to `endpoint`.
	pub fn new(transport: Arc<dyn Transport>, endpoint: Url) -> Self {
		Self { transport, endpoint }
	}

	/// Creates a logger for the configured `activity_endpoint`, resolved
	/// against the base URL. Returns `None` when no endpoint is configured.
	pub fn from_settings(
		settings: &PortalSettings,
		transport: Arc<dyn Transport>,
	) -> Result<Option<Self>, WidgetError> {
		let Some(endpoint) = settings.activity_endpoint.as_deref() else {
			return Ok(None);
		};
		let base = Url::parse(&settings.base_url).map_err(|source| WidgetError::InvalidUrl {
			url: settings.base_url.clone(),
			source,
		})?;
		let endpoint = base.join(endpoint).map_err(|source| WidgetError::InvalidUrl {
			url: endpoint.to_string(),
			source,
		})?;
		Ok(Some(Self::new(transport, endpoint)))
	}

	/// The request URL for one activity record.
	pub fn request_url(
		&self,
		context: &PortalContext,
		additional: Option<&serde_json::Value>,
	) -> Result<Url, WidgetError> {
		let data = match additional {
			Some(value) => serde_json::to_string(value)?,
			None => String::new(),
		};

		let mut url = self.endpoint.clone();
		url.query_pairs_mut()
			.append_pair("portal", &context.portal_name)
			.append_pair("page", &context.page_name)
			.append_pair("record", context.record_id.as_deref().unwrap_or_default())
			.append_pair("data", &data);
		Ok(url)
	}

	/// Logs a page view. Returns whether the endpoint accepted it.
	pub async fn log(&self, context: &PortalContext, additional: Option<&serde_json::Value>) -> bool {
		match self.send(context, additional).await {
			Ok(()) => {
				tracing::debug!(portal = %context.portal_name, page = %context.page_name, "Portal activity logged");
				true
			}
			Err(err) => {
				tracing::warn!(error = %err, "Failed to log portal activity");
				false
			}
		}
	}

	async fn send(&self, context: &PortalContext, additional: Option<&serde_json::Value>) -> Result<(), WidgetError> {
		let url = self.request_url(context, additional)?;
		let exchange = self.transport.get(&url).await?;
		if !exchange.status.is_success() {
			return Err(WidgetError::Status {
				status: exchange.status,
				url: url.to_string(),
			});
		}
		Ok(())
	}
}

impl std::fmt::Debug for ActivityLogger {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActivityLogger")
			.field("endpoint", &self.endpoint.as_str())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use portico_nav::testing::ScriptedTransport;
	use portico_nav::TransportError;
	use rstest::rstest;
	use serde_json::json;

	fn context() -> PortalContext {
		PortalContext {
			portal_name: "Student Portal".to_string(),
			page_name: "grades".to_string(),
			record_id: None,
		}
	}

	fn logger(transport: Arc<ScriptedTransport>) -> ActivityLogger {
		let settings = PortalSettings {
			activity_endpoint: Some("/portal/api_person?cmd=portal_activity".to_string()),
			..PortalSettings::default()
		};
		ActivityLogger::from_settings(&settings, transport).unwrap().unwrap()
	}

	#[rstest]
	fn test_request_url_appends_fields() {
		let logger = logger(Arc::new(ScriptedTransport::new()));

		let url = logger
			.request_url(&context(), Some(&json!({"source": "nav"})))
			.unwrap();

		assert_eq!(
			url.as_str(),
			"http://localhost/portal/api_person?cmd=portal_activity&portal=Student+Portal&page=grades&record=&data=%7B%22source%22%3A%22nav%22%7D"
		);
	}

	#[rstest]
	fn test_no_endpoint_means_no_logger() {
		let logger =
			ActivityLogger::from_settings(&PortalSettings::default(), Arc::new(ScriptedTransport::new()))
				.unwrap();
		assert!(logger.is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_log_success() {
		let transport = Arc::new(ScriptedTransport::new());
		transport.respond("&data=", "ok");

		assert!(logger(transport.clone()).log(&context(), None).await);
		assert_eq!(transport.requests().len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_log_failure_is_swallowed() {
		let transport = Arc::new(ScriptedTransport::new());
		transport.fail("&data=", TransportError::Network("offline".into()));

		assert!(!logger(transport.clone()).log(&context(), None).await);
	}
}
