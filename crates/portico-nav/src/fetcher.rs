//! Partial-content loading into a content pane.

use crate::browser::Browser;
use crate::dom::{ContentPane, Ticket};
use crate::error::{FetchOutcome, LoadError, SetupError};
use crate::fragment::FragmentExtractor;
use crate::guard::{SessionGuard, Verdict};
use crate::settings::PortalSettings;
use crate::transport::Transport;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Fetches portal views and writes their fragment into a [`ContentPane`].
///
/// Loads are independent: nothing serializes or cancels overlapping calls.
/// Unless the stale-response fence is enabled, whichever response is
/// written last wins the pane.
#[derive(Clone)]
pub struct ContentFetcher {
	transport: Arc<dyn Transport>,
	browser: Arc<dyn Browser>,
	guard: SessionGuard,
	extractor: FragmentExtractor,
	base_url: Url,
	loading_html: String,
	error_html: String,
	fence: bool,
}

impl ContentFetcher {
	/// Creates a fetcher from portal settings.
	pub fn new(
		settings: &PortalSettings,
		transport: Arc<dyn Transport>,
		browser: Arc<dyn Browser>,
	) -> Result<Self, SetupError> {
		Ok(Self {
			transport,
			browser,
			guard: SessionGuard::from_settings(settings)?,
			extractor: FragmentExtractor::new(
				&settings.fragment_selector,
				&settings.sub_tab_selector,
			)?,
			base_url: settings.base_url()?,
			loading_html: settings.loading_html.clone(),
			error_html: settings.error_html.clone(),
			fence: settings.fence_stale_responses,
		})
	}

	/// Replaces the session guard.
	pub fn with_guard(mut self, guard: SessionGuard) -> Self {
		self.guard = guard;
		self
	}

	/// Enables or disables the stale-response fence.
	pub fn with_fence(mut self, enabled: bool) -> Self {
		self.fence = enabled;
		self
	}

	/// The browser redirects are performed on.
	pub fn browser(&self) -> &Arc<dyn Browser> {
		&self.browser
	}

	/// The fragment extractor.
	pub fn extractor(&self) -> &FragmentExtractor {
		&self.extractor
	}

	/// Whether stale responses are dropped.
	pub fn is_fenced(&self) -> bool {
		self.fence
	}

	/// Resolves a view path such as `?cmd=home` against the base URL.
	pub fn resolve(&self, view_path: &str) -> Result<Url, LoadError> {
		self.base_url.join(view_path).map_err(|e| LoadError::LoadFailed {
			reason: format!("Invalid view path '{}': {}", view_path, e),
		})
	}

	/// Loads `view_path` into `target`.
	///
	/// The loading indicator is written before the request is issued.
	/// Session expiry navigates the browser away and leaves the pane alone.
	/// `on_complete` runs only after fragment content has been written.
	///
	/// # Examples
	///
	/// ```
	/// use portico_nav::testing::ScriptedTransport;
	/// use portico_nav::{ContentFetcher, ContentPane, MemoryBrowser, PortalSettings};
	/// use std::sync::Arc;
	///
	/// # tokio_test_block_on(async {
	/// let transport = Arc::new(ScriptedTransport::new());
	/// transport.respond("?cmd=home", "<div class=\"dynamic-page-wrapper\">Welcome</div>");
	///
	/// let settings = PortalSettings::default();
	/// let fetcher = ContentFetcher::new(&settings, transport, Arc::new(MemoryBrowser::default())).unwrap();
	/// let pane = ContentPane::new();
	///
	/// let outcome = fetcher.load("?cmd=home", &pane, None::<fn(&ContentPane)>).await;
	/// assert!(outcome.is_loaded());
	/// assert_eq!(pane.html(), "Welcome");
	/// # });
	/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
	/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
	/// # }
	/// ```
	pub async fn load<F>(&self, view_path: &str, target: &ContentPane, on_complete: Option<F>) -> FetchOutcome
	where
		F: FnOnce(&ContentPane) + Send,
	{
		let ticket = target.begin(&self.loading_html);

		let url = match self.resolve(view_path) {
			Ok(url) => url,
			Err(err) => return self.fail(target, ticket, err),
		};

		tracing::debug!(url = %url, "Fetching view");
		let exchange = match self.transport.get(&url).await {
			Ok(exchange) => exchange,
			Err(err) => return self.fail(target, ticket, err.into()),
		};

		match self.guard.inspect(&exchange) {
			Verdict::Redirected(location) => {
				tracing::info!(url = %url, location = %location, status = %exchange.status, "Session redirect");
				self.browser.assign(&location);
				return FetchOutcome::Redirected(location);
			}
			Verdict::LoginDetected(location) => {
				tracing::info!(url = %url, location = %location, "Login page returned in place of content");
				self.browser.assign(&location);
				return FetchOutcome::LoginDetected(location);
			}
			Verdict::Genuine => {}
		}

		if !exchange.status.is_success() {
			return self.fail(target, ticket, LoadError::status(exchange.status));
		}

		let fragment = self.extractor.extract(&exchange.body).unwrap_or_else(|| {
			tracing::debug!(url = %url, error = %LoadError::MissingFragment, "Using empty content");
			String::new()
		});

		if !target.commit(ticket, fragment.clone(), self.fence) {
			tracing::debug!(url = %url, "Dropping stale response");
			return FetchOutcome::Superseded;
		}

		if let Some(callback) = on_complete {
			callback(target);
		}

		tracing::debug!(url = %url, bytes = fragment.len(), "View loaded");
		FetchOutcome::Loaded(fragment)
	}

	fn fail(&self, target: &ContentPane, ticket: Ticket, err: LoadError) -> FetchOutcome {
		if !target.commit(ticket, self.error_html.clone(), self.fence) {
			tracing::debug!(error = %err, "Dropping stale failure");
			return FetchOutcome::Superseded;
		}
		tracing::warn!(error = %err, "View load failed");
		FetchOutcome::Failed(err)
	}
}

impl fmt::Debug for ContentFetcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContentFetcher")
			.field("base_url", &self.base_url.as_str())
			.field("guard", &self.guard.marker())
			.field("fence", &self.fence)
			.finish_non_exhaustive()
	}
}
