//! Facade re-export tests

use portico::nav::testing::ScriptedTransport;
use portico::prelude::*;
use rstest::rstest;
use std::sync::Arc;

#[rstest]
#[tokio::test]
async fn test_prelude_drives_a_navigation() {
	// Arrange
	let settings = PortalSettings::default();
	let transport = Arc::new(ScriptedTransport::new());
	transport.respond("?cmd=home", "<div class=\"dynamic-page-wrapper\">hi</div>");
	let browser = Arc::new(MemoryBrowser::new("http://localhost/portal"));
	let router = NavigationRouter::from_settings(
		&settings,
		transport,
		browser.clone(),
		r##"<nav id="navbar-sidebar"><a href="#" data-tab="home">Home</a></nav>"##,
		Arc::new(MemoryStore::new()),
	)
	.unwrap();

	// Act
	let outcome = router.initialize().await;

	// Assert
	assert_eq!(outcome, Some(FetchOutcome::Loaded("hi".to_string())));
	assert_eq!(browser.address(), "?tab=home");
}

#[rstest]
fn test_widgets_reexported() {
	let summary = FeeSummary::build(&[]).unwrap();
	assert!(summary.lines.is_empty());
	assert_eq!(portico::widgets::params::decode_param_name("a-b"), "a:b");
}
