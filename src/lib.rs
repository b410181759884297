//! # Portico
//!
//! Tabbed navigation, partial-content loading and session-timeout handling
//! for hosted institutional portals.
//!
//! ## Feature Flags
//!
//! - `minimal` - Navigation core only
//! - `widgets` - Modal loader, activity logging, registration fee summary
//! - `full` (default) - Everything
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use portico::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(page_html: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SettingsBuilder::new().add_source(EnvSource::new()).build()?;
//! let transport = Arc::new(ReqwestTransport::new(&settings)?);
//! let browser = Arc::new(MemoryBrowser::new(settings.base_url.clone()));
//! let router = NavigationRouter::from_settings(
//!     &settings,
//!     transport,
//!     browser,
//!     page_html,
//!     Arc::new(MemoryStore::new()),
//! )?;
//!
//! router.initialize().await;
//! router
//!     .navigate(NavigationTarget::new("profile").with_parameter("uid", "42"), true)
//!     .await;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "nav")]
pub mod nav;
#[cfg(feature = "widgets")]
pub mod widgets;

/// Commonly used types.
pub mod prelude {
	#[cfg(feature = "nav")]
	pub use crate::nav::{
		Browser, ContentFetcher, ContentPane, EnvSource, FetchOutcome, HistoryEntry, LoadError,
		MemoryBrowser, MemoryStore, NavigationRouter, NavigationTarget, PortalSettings,
		ReqwestTransport, SessionGuard, SettingsBuilder, Verdict,
	};

	#[cfg(feature = "widgets")]
	pub use crate::widgets::{ActivityLogger, FeeSummary, ModalLoader, PortalContext};
}
