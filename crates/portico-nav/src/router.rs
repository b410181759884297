//! History-synchronized tab navigation.
//!
//! [`NavigationRouter`] keeps three things in step: the browser history and
//! address bar, the active/expanded markers of the navigation panel, and the
//! main content pane. It has three entry points:
//!
//! - [`navigate`](NavigationRouter::navigate) for explicit navigation,
//! - [`on_pop`](NavigationRouter::on_pop) for back/forward,
//! - [`initialize`](NavigationRouter::initialize) once the page is ready.
//!
//! Clicks on `load-content` elements go through
//! [`handle_click`](NavigationRouter::handle_click). Nested tab selection is
//! reported through [`sub_tab_shown`](NavigationRouter::sub_tab_shown) and
//! restored after every successful load, so the router never rebinds
//! per-element listeners after replacing content.

use crate::browser::{Browser, PopStateEvent};
use crate::dom::{ContentPane, ElementData, LOAD_CONTENT_CLASS, LinkMatcher, NavPanel};
use crate::error::{FetchOutcome, LoadError, SetupError};
use crate::fetcher::ContentFetcher;
use crate::query;
use crate::settings::{LinkMatch, PortalSettings};
use crate::store::{KeyValueStore, StoreError};
use crate::target::{HistoryEntry, NavigationTarget};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Tab router for a single portal page.
pub struct NavigationRouter {
	browser: Arc<dyn Browser>,
	fetcher: ContentFetcher,
	panel: Mutex<NavPanel>,
	content: Arc<ContentPane>,
	store: Arc<dyn KeyValueStore>,
	link_match: LinkMatch,
	sub_tab_key: String,
	restore_sub_tabs: bool,
	current: Mutex<Option<NavigationTarget>>,
}

impl NavigationRouter {
	/// Creates a router over `panel`, writing content to a fresh pane.
	///
	/// Link matching and nested tab restoration use their defaults until
	/// overridden with the `with_*` methods.
	pub fn new(fetcher: ContentFetcher, panel: NavPanel, store: Arc<dyn KeyValueStore>) -> Self {
		let defaults = PortalSettings::default();
		Self {
			browser: fetcher.browser().clone(),
			fetcher,
			panel: Mutex::new(panel),
			content: Arc::new(ContentPane::new()),
			store,
			link_match: defaults.link_match,
			sub_tab_key: defaults.sub_tab_key,
			restore_sub_tabs: defaults.restore_sub_tabs,
			current: Mutex::new(None),
		}
	}

	/// Wires a router from settings.
	///
	/// The navigation panel is parsed out of `page_html` using the configured
	/// panel selector.
	pub fn from_settings(
		settings: &PortalSettings,
		transport: Arc<dyn Transport>,
		browser: Arc<dyn Browser>,
		page_html: &str,
		store: Arc<dyn KeyValueStore>,
	) -> Result<Self, SetupError> {
		let fetcher = ContentFetcher::new(settings, transport, browser)?;
		let panel = NavPanel::parse(page_html, &settings.nav_selector)?;
		Ok(Self::new(fetcher, panel, store)
			.with_link_match(settings.link_match)
			.with_sub_tabs(settings.sub_tab_key.clone(), settings.restore_sub_tabs))
	}

	/// Sets the active-link matching scheme.
	pub fn with_link_match(mut self, link_match: LinkMatch) -> Self {
		self.link_match = link_match;
		self
	}

	/// Sets the nested tab storage key and whether it is restored after loads.
	pub fn with_sub_tabs(mut self, key: impl Into<String>, restore: bool) -> Self {
		self.sub_tab_key = key.into();
		self.restore_sub_tabs = restore;
		self
	}

	/// Uses an existing content pane.
	pub fn with_content(mut self, content: Arc<ContentPane>) -> Self {
		self.content = content;
		self
	}

	/// The main content pane.
	pub fn content(&self) -> &Arc<ContentPane> {
		&self.content
	}

	/// A snapshot of the navigation panel.
	pub fn panel(&self) -> NavPanel {
		self.panel.lock().clone()
	}

	/// The fetcher loads go through.
	pub fn fetcher(&self) -> &ContentFetcher {
		&self.fetcher
	}

	/// The target of the most recent navigation.
	pub fn current_target(&self) -> Option<NavigationTarget> {
		self.current.lock().clone()
	}

	/// Navigates to `target`.
	///
	/// With `record_history` set, one history entry is pushed and the address
	/// bar shows `?tab=<tab>[&<rest>]`. Back/forward replays pass `false`
	/// since the browser has already moved. The address bar is not rolled back
	/// if the load fails.
	///
	/// A target with an empty tab is refused: history, the panel and the
	/// content pane are left untouched.
	pub async fn navigate(&self, target: NavigationTarget, record_history: bool) -> FetchOutcome {
		if target.tab().is_empty() {
			tracing::warn!("Refusing to navigate to a target without a tab");
			return FetchOutcome::Failed(LoadError::MissingTab);
		}
		tracing::info!(tab = %target.tab(), record_history, "Navigating");

		if record_history {
			let address = target.address();
			self.browser.push_state(HistoryEntry::for_target(&target), &address);
			tracing::debug!(address = %address, "History entry pushed");
		}

		self.mark_active(&target);
		*self.current.lock() = Some(target.clone());

		let view_path = target.view_path();
		let content = self.content.clone();
		self.fetcher
			.load(
				&view_path,
				&content,
				Some(|pane: &ContentPane| self.restore_sub_tab(pane)),
			)
			.await
	}

	/// Handles a `popstate` event.
	///
	/// Entries without router state, such as the page's initial entry, are
	/// ignored and `None` is returned.
	pub async fn on_pop(&self, event: PopStateEvent) -> Option<FetchOutcome> {
		let Some(entry) = event.state.filter(|e| !e.tab.is_empty()) else {
			tracing::debug!("Ignoring history entry without navigation state");
			return None;
		};
		Some(self.navigate(NavigationTarget::from_entry(&entry), false).await)
	}

	/// Performs the initial load.
	///
	/// An address that already names a tab is loaded without pushing
	/// history. Otherwise the first navigable link in the panel is loaded and
	/// recorded, so the session starts with one canonical entry.
	pub async fn initialize(&self) -> Option<FetchOutcome> {
		let search = self.browser.location_search();
		if let Some(target) = NavigationTarget::from_query(query::decode(&search)) {
			return Some(self.navigate(target, false).await);
		}

		let first = {
			let panel = self.panel.lock();
			panel
				.first_link()
				.and_then(|id| panel.node(id))
				.and_then(|node| NavigationTarget::from_element(node.element()))
		};

		match first {
			Some(target) => Some(self.navigate(target, true).await),
			None => {
				tracing::warn!("No navigable link found for initial load");
				None
			}
		}
	}

	/// Handles a click on `element`.
	///
	/// Only `load-content` elements navigate. The tab comes from `data-tab`
	/// (or `href`) and every `data-*` attribute travels as a parameter.
	pub async fn handle_click(&self, element: &ElementData) -> Option<FetchOutcome> {
		if !element.has_class(LOAD_CONTENT_CLASS) {
			return None;
		}
		let Some(target) = NavigationTarget::from_element(element) else {
			tracing::warn!(tag = %element.tag(), "load-content element names no view");
			return None;
		};
		Some(self.navigate(target, true).await)
	}

	/// Records that the user opened the nested tab `id`.
	pub fn sub_tab_shown(&self, id: &str) -> Result<(), StoreError> {
		self.store.set(&self.sub_tab_key, id)?;
		self.content.show_sub_tab(id);
		Ok(())
	}

	fn mark_active(&self, target: &NavigationTarget) {
		let matcher = match (self.link_match, target.record_uid()) {
			(LinkMatch::Uid, Some(uid)) => LinkMatcher::Uid(uid.to_string()),
			_ => LinkMatcher::Tab(target.tab().to_string()),
		};

		if self.panel.lock().activate(&matcher).is_none() {
			tracing::warn!(matcher = ?matcher, "No navigation link matches target");
		}
	}

	fn restore_sub_tab(&self, pane: &ContentPane) {
		if !self.restore_sub_tabs {
			return;
		}

		let saved = match self.store.get(&self.sub_tab_key) {
			Ok(Some(id)) => id,
			Ok(None) => return,
			Err(err) => {
				tracing::warn!(error = %err, "Failed to read saved sub-tab");
				return;
			}
		};

		if self.fetcher.extractor().has_sub_tab(&pane.html(), &saved) {
			tracing::debug!(sub_tab = %saved, "Restoring sub-tab");
			pane.show_sub_tab(saved);
		}
	}
}

impl fmt::Debug for NavigationRouter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NavigationRouter")
			.field("fetcher", &self.fetcher)
			.field("link_match", &self.link_match)
			.field("sub_tab_key", &self.sub_tab_key)
			.field("restore_sub_tabs", &self.restore_sub_tabs)
			.field("current", &self.current_target())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::browser::MemoryBrowser;
	use crate::dom::{ACTIVE_CLASS, SHOW_CLASS};
	use crate::store::MemoryStore;
	use crate::testing::ScriptedTransport;
	use rstest::rstest;

	const PAGE: &str = r##"<html><body>
<nav id="navbar-sidebar">
  <a href="?tab=home" data-tab="home">Home</a>
  <div class="collapse" id="people">
    <a href="?tab=profile" data-tab="profile" data-uid="42">Ada</a>
  </div>
</nav>
<main id="content"></main>
</body></html>"##;

	fn router(settings: PortalSettings, address: &str) -> (NavigationRouter, Arc<ScriptedTransport>, Arc<MemoryBrowser>) {
		let transport = Arc::new(ScriptedTransport::new());
		let browser = Arc::new(MemoryBrowser::new(address));
		let router = NavigationRouter::from_settings(
			&settings,
			transport.clone(),
			browser.clone(),
			PAGE,
			Arc::new(MemoryStore::new()),
		)
		.unwrap();
		(router, transport, browser)
	}

	#[rstest]
	#[tokio::test]
	async fn test_uid_match_expands_group() {
		// Arrange
		let (router, transport, _) = router(PortalSettings::default(), "/portal");
		transport.respond("?cmd=profile&uid=42", "<div class=\"dynamic-page-wrapper\">Ada</div>");

		// Act
		let outcome = router
			.navigate(NavigationTarget::new("profile").with_parameter("uid", "42"), true)
			.await;

		// Assert
		assert!(outcome.is_loaded());
		let panel = router.panel();
		let active = panel.node(panel.active_link().unwrap()).unwrap();
		assert_eq!(active.element().attr("data-uid"), Some("42"));
		assert!(active.has_class(ACTIVE_CLASS));
		let group = panel.node(active.parent().unwrap()).unwrap();
		assert!(group.has_class(SHOW_CLASS));
	}

	#[rstest]
	#[tokio::test]
	async fn test_unknown_target_clears_markers() {
		let (router, transport, _) = router(PortalSettings::default(), "/portal");
		transport.respond("?cmd=profile&uid=42", "<div class=\"dynamic-page-wrapper\">Ada</div>");
		router
			.navigate(NavigationTarget::new("profile").with_parameter("uid", "42"), true)
			.await;

		router.navigate(NavigationTarget::new("nowhere"), true).await;

		let panel = router.panel();
		assert_eq!(panel.active_link(), None);
		assert!(panel.expanded_groups().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_tab_matching_profile() {
		let (router, transport, _) = router(PortalSettings::advising(), "/portal");
		transport.respond("?cmd=home", "<div class=\"dynamic-page-wrapper\">x</div>");

		router.navigate(NavigationTarget::new("home"), false).await;

		let panel = router.panel();
		let active = panel.node(panel.active_link().unwrap()).unwrap();
		assert_eq!(active.element().attr("data-tab"), Some("home"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_empty_tab_is_refused() {
		// Arrange
		let (router, transport, browser) = router(PortalSettings::default(), "/portal");
		let before = router.content().html();

		// Act
		let outcome = router.navigate(NavigationTarget::new(""), true).await;

		// Assert
		assert_eq!(outcome, FetchOutcome::Failed(LoadError::MissingTab));
		assert!(transport.requests().is_empty());
		assert_eq!(browser.history_len(), 1);
		assert_eq!(router.content().html(), before);
		assert_eq!(router.current_target(), None);
	}

	#[rstest]
	#[tokio::test]
	async fn test_click_requires_load_content_class() {
		let (router, transport, browser) = router(PortalSettings::default(), "/portal");

		let plain = ElementData::new("a").with_attr("data-tab", "home");
		assert!(router.handle_click(&plain).await.is_none());
		assert!(transport.requests().is_empty());
		assert_eq!(browser.history_len(), 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_click_carries_data_attributes() {
		// Arrange
		let (router, transport, browser) = router(PortalSettings::default(), "/portal");
		transport.respond("?cmd=case&recordId=7", "<div class=\"dynamic-page-wrapper\">case</div>");
		let element = ElementData::new("button")
			.with_attr("class", "btn load-content")
			.with_attr("data-tab", "case")
			.with_attr("data-record-id", "7");

		// Act
		let outcome = router.handle_click(&element).await.unwrap();

		// Assert
		assert!(outcome.is_loaded());
		assert_eq!(browser.address(), "?tab=case&recordId=7");
		assert_eq!(
			transport.requests(),
			vec!["http://localhost/portal?cmd=case&recordId=7".to_string()]
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_sub_tab_shown_persists_and_marks_pane() {
		let (router, _, _) = router(PortalSettings::default(), "/portal");

		router.sub_tab_shown("pills-notes-tab").unwrap();

		assert_eq!(router.content().shown_sub_tab().as_deref(), Some("pills-notes-tab"));
		assert_eq!(
			router.store.get("activeTab").unwrap().as_deref(),
			Some("pills-notes-tab")
		);
	}
}
