//! # Portico Widgets
//!
//! Page collaborators that sit next to the navigation core.
//!
//! ## Module Organization
//!
//! - [`modal`]: modal dialog content loading (portal views and form embeds)
//! - [`params`]: `data-param-*` attribute collection
//! - [`context`]: portal/page/record context from a URL
//! - [`activity`]: page-view activity logging
//! - [`registration`]: registration fee summary
//!
//! Widgets that bind behaviour inside the content pane must delegate from
//! outside it: the pane's subtree is replaced on every successful load.

pub mod activity;
pub mod context;
pub mod error;
pub mod modal;
pub mod params;
pub mod registration;

pub use activity::ActivityLogger;
pub use context::PortalContext;
pub use error::WidgetError;
pub use modal::{ModalContent, ModalLoader, ModalShown};
pub use params::collect_param_attributes;
pub use registration::{EventOption, FeeSummary, Registrant, SummaryLine};
