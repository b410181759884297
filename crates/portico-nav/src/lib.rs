//! # Portico Navigation
//!
//! Tabbed navigation and partial-content loading for hosted portal pages.
//!
//! A portal page has a navigation panel, a main content pane and an address
//! bar. Selecting a view fetches the full server page for it, extracts the
//! embeddable fragment and swaps it into the pane, keeping the browser
//! history in step so back/forward replay the same views.
//!
//! ## Features
//!
//! - **Query codec**: `?tab=<id>&...` addresses decoded to ordered maps and back
//! - **Session guard**: explicit redirects and login pages served as `200` both
//!   end in a top-level navigation, never in-pane content
//! - **Content fetcher**: loading indicator, fragment extraction, in-place
//!   error message, optional stale-response fence
//! - **Navigation router**: history push/pop, active link and expanded group
//!   markers, click delegation, nested tab restoration
//! - **Settings**: deployment profiles layered with TOML files and `PORTICO_*`
//!   environment variables
//!
//! ## Module Organization
//!
//! - [`query`] and [`target`]: addresses, view paths, history entries
//! - [`guard`]: session-timeout detection
//! - [`fetcher`] and [`fragment`]: loading views into a [`ContentPane`]
//! - [`router`]: the [`NavigationRouter`]
//! - [`browser`], [`dom`], [`store`]: the page environment
//! - [`transport`]: HTTP
//! - [`settings`]: configuration
//! - [`testing`]: scripted transport for tests

pub mod browser;
pub mod dom;
pub mod error;
pub mod fetcher;
pub mod fragment;
pub mod guard;
pub mod query;
pub mod router;
pub mod settings;
pub mod store;
pub mod target;
pub mod testing;
pub mod transport;

// Re-export commonly used types at the crate root for convenience
pub use browser::{Browser, MemoryBrowser, PopStateEvent};
pub use dom::{ContentPane, DomError, ElementData, LinkMatcher, NavPanel, NodeId};
pub use error::{FetchOutcome, LoadError, SetupError};
pub use fetcher::ContentFetcher;
pub use fragment::{FragmentError, FragmentExtractor};
pub use guard::{LoginMarker, SessionGuard, Verdict};
pub use query::QueryMap;
pub use router::NavigationRouter;
pub use settings::{
	ConfigSource, EnvSource, GuardProfileKind, LinkMatch, PortalSettings, SettingsBuilder,
	SettingsError, TomlFileSource,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use target::{HistoryEntry, NavigationTarget};
pub use transport::{HttpExchange, ReqwestTransport, Transport, TransportError};
