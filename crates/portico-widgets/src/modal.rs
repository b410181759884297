//! Content loading for the site-wide modal dialog.
//!
//! A modal trigger carries one of two things:
//!
//! - `data-url`: a portal view, loaded like any other content
//! - `data-formguid`: an embeddable form, requested from the form engine as a
//!   script that renders itself into the modal
//!
//! Anything else shows a short message in the modal body.

use crate::error::WidgetError;
use crate::params::collect_param_attributes;
use portico_nav::query::{self, QueryMap};
use portico_nav::{ContentFetcher, ContentPane, ElementData, FetchOutcome, Transport};
use std::sync::Arc;
use url::Url;

/// Title used when the trigger has no `data-title`.
pub const DEFAULT_TITLE: &str = "Details";

/// Container used when the trigger has no `data-target`.
pub const DEFAULT_TARGET: &str = "#form_div";

/// Placeholder shown while the modal body loads.
pub const LOADING_TEXT: &str = "Loading...";

/// Body shown when the trigger names nothing to load.
pub const MISSING_CONTENT_HTML: &str = "<p>No content URL or form GUID provided.</p>";

/// Path of the form engine's embed endpoint.
pub const REGISTER_PATH: &str = "/register/";

/// What filled the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalContent {
	/// A portal view was loaded into the pane.
	View(FetchOutcome),
	/// The form engine returned its embed script.
	FormScript(String),
	/// The trigger named nothing to load.
	Missing,
}

/// Result of opening the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalShown {
	/// Dialog title.
	pub title: String,
	/// Selector of the container that received the content.
	pub target: String,
	/// What was loaded.
	pub content: ModalContent,
}

/// Fills the modal dialog from its trigger element.
#[derive(Clone)]
pub struct ModalLoader {
	fetcher: ContentFetcher,
	transport: Arc<dyn Transport>,
	register_url: Url,
}

impl ModalLoader {
	/// Creates a loader. Form embeds are requested from [`REGISTER_PATH`]
	/// on the host of `base_url`.
	pub fn new(fetcher: ContentFetcher, transport: Arc<dyn Transport>, base_url: &Url) -> Result<Self, WidgetError> {
		let register_url = base_url
			.join(REGISTER_PATH)
			.map_err(|source| WidgetError::InvalidUrl {
				url: base_url.to_string(),
				source,
			})?;
		Ok(Self {
			fetcher,
			transport,
			register_url,
		})
	}

	/// The embed payload for a form trigger.
	///
	/// Starts with `id`, `output`, `div` and `person`, then merges the JSON
	/// object in `data-form-params` and every `data-param-*` attribute. Later
	/// sources override earlier ones. Invalid JSON is logged and skipped.
	pub fn form_payload(trigger: &ElementData, form_guid: &str) -> QueryMap {
		let mut payload = QueryMap::new();
		payload.insert("id".to_string(), form_guid.to_string());
		payload.insert("output".to_string(), "embed".to_string());
		payload.insert("div".to_string(), "form_div".to_string());
		payload.insert(
			"person".to_string(),
			trigger.attr("data-uid").unwrap_or_default().to_string(),
		);

		if let Some(raw) = trigger.attr("data-form-params").filter(|r| !r.is_empty()) {
			match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
				Ok(extra) => {
					for (key, value) in extra {
						payload.insert(key, json_param(value));
					}
				}
				Err(err) => tracing::warn!(error = %err, "Invalid JSON in data-form-params"),
			}
		}

		payload.extend(collect_param_attributes(trigger));
		payload
	}

	/// Opens the modal for `trigger`, writing into `pane`.
	pub async fn show(&self, trigger: &ElementData, pane: &ContentPane) -> Result<ModalShown, WidgetError> {
		let title = non_empty(trigger.attr("data-title")).unwrap_or(DEFAULT_TITLE).to_string();
		let target = non_empty(trigger.attr("data-target")).unwrap_or(DEFAULT_TARGET).to_string();
		pane.replace(LOADING_TEXT);

		let content = if let Some(url) = non_empty(trigger.attr("data-url")) {
			let outcome = self.fetcher.load(url, pane, None::<fn(&ContentPane)>).await;
			ModalContent::View(outcome)
		} else if let Some(guid) = non_empty(trigger.attr("data-formguid")) {
			ModalContent::FormScript(self.fetch_form(trigger, guid).await?)
		} else {
			pane.replace(MISSING_CONTENT_HTML);
			ModalContent::Missing
		};

		Ok(ModalShown {
			title,
			target,
			content,
		})
	}

	async fn fetch_form(&self, trigger: &ElementData, guid: &str) -> Result<String, WidgetError> {
		let payload = Self::form_payload(trigger, guid);
		let mut url = self.register_url.clone();
		url.set_query(Some(&query::encode(&payload)));

		tracing::debug!(url = %url, "Requesting form embed");
		let exchange = self.transport.get(&url).await?;
		if !exchange.status.is_success() {
			return Err(WidgetError::Status {
				status: exchange.status,
				url: url.to_string(),
			});
		}
		Ok(exchange.body)
	}
}

impl std::fmt::Debug for ModalLoader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ModalLoader")
			.field("fetcher", &self.fetcher)
			.field("register_url", &self.register_url.as_str())
			.finish_non_exhaustive()
	}
}

fn non_empty(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.is_empty())
}

fn json_param(value: serde_json::Value) -> String {
	match value {
		serde_json::Value::String(s) => s,
		serde_json::Value::Null => String::new(),
		other => other.to_string(),
	}
}
