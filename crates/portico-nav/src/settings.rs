//! Portal settings with layered sources.
//!
//! Values are merged in priority order (environment variables > TOML file >
//! defaults). Two deployment profiles are provided as presets:
//!
//! - [`PortalSettings::bootstrap`]: login detected by a `body#login-page`
//!   marker, active link matched by `data-uid`. This is the default.
//! - [`PortalSettings::advising`]: login detected by anchor content pointing
//!   at the login path, active link matched by tab.
//!
//! ## Example
//!
//! ```
//! use portico_nav::settings::{SettingsBuilder, EnvSource};
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(EnvSource::from_vars([("PORTICO_LOGIN_PATH", "/sso/login")]))
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.login_path, "/sso/login");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default environment variable prefix.
pub const ENV_PREFIX: &str = "PORTICO_";

/// Keys whose environment values are parsed as JSON scalars rather than strings.
const TYPED_KEYS: &[&str] = &[
	"request_timeout_secs",
	"fence_stale_responses",
	"follow_redirects",
	"restore_sub_tabs",
];

/// Error type for settings loading
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid base URL '{url}': {source}")]
	InvalidBaseUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},

	#[error("Invalid setting {key}: {reason}")]
	Invalid { key: &'static str, reason: String },
}

/// How a 200 response is recognised as the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuardProfileKind {
	/// An element matching `login_marker` is present.
	#[default]
	BodyMarker,
	/// The body mentions `login_path`; the first anchor gives the target.
	AnchorContent,
}

/// Which attribute identifies the active navigation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkMatch {
	/// `data-uid` against the target's record uid, falling back to the tab.
	#[default]
	Uid,
	/// `href`/`data-tab` against the tab.
	Tab,
}

/// Settings for one portal deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
	/// Page URL that view paths (`?cmd=...`) are resolved against.
	pub base_url: String,
	/// Fallback redirect target for expired sessions.
	pub login_path: String,
	/// Login-page detection profile.
	pub guard: GuardProfileKind,
	/// Selector identifying the login page for [`GuardProfileKind::BodyMarker`].
	pub login_marker: String,
	/// Selector of the embeddable wrapper inside fetched documents.
	pub fragment_selector: String,
	/// Selector of the navigation panel root.
	pub nav_selector: String,
	/// Active-link lookup scheme.
	pub link_match: LinkMatch,
	/// Store key remembering the last shown nested tab.
	pub sub_tab_key: String,
	/// Selector of nested tab controls inside loaded content.
	pub sub_tab_selector: String,
	/// Whether the nested tab is restored after each load.
	pub restore_sub_tabs: bool,
	/// Placeholder shown while a load is in flight.
	pub loading_html: String,
	/// Message shown when a load fails.
	pub error_html: String,
	/// Request timeout. `None` waits indefinitely.
	pub request_timeout_secs: Option<u64>,
	/// Drop responses superseded by a later load.
	pub fence_stale_responses: bool,
	/// Let the HTTP client follow redirects instead of surfacing them.
	pub follow_redirects: bool,
	/// Endpoint receiving page activity records.
	pub activity_endpoint: Option<String>,
}

impl Default for PortalSettings {
	fn default() -> Self {
		Self::bootstrap()
	}
}

impl PortalSettings {
	/// Bootstrap portals: body marker login detection, uid link matching.
	pub fn bootstrap() -> Self {
		Self {
			base_url: "http://localhost/portal".to_string(),
			login_path: "/account/login".to_string(),
			guard: GuardProfileKind::BodyMarker,
			login_marker: "body#login-page".to_string(),
			fragment_selector: ".dynamic-page-wrapper".to_string(),
			nav_selector: "#navbar-sidebar".to_string(),
			link_match: LinkMatch::Uid,
			sub_tab_key: "activeTab".to_string(),
			sub_tab_selector: "button.nav-link".to_string(),
			restore_sub_tabs: true,
			loading_html: "<div>loading...</div>".to_string(),
			error_html: "<p>Error loading content.</p>".to_string(),
			request_timeout_secs: None,
			fence_stale_responses: false,
			follow_redirects: false,
			activity_endpoint: None,
		}
	}

	/// Advising portals: anchor content login detection, tab link matching.
	pub fn advising() -> Self {
		Self {
			guard: GuardProfileKind::AnchorContent,
			link_match: LinkMatch::Tab,
			restore_sub_tabs: false,
			..Self::bootstrap()
		}
	}

	/// Sets the base URL.
	pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();
		self
	}

	/// Enables or disables the stale-response fence.
	pub fn with_fence(mut self, enabled: bool) -> Self {
		self.fence_stale_responses = enabled;
		self
	}

	/// Parsed base URL.
	pub fn base_url(&self) -> Result<Url, SettingsError> {
		Url::parse(&self.base_url).map_err(|source| SettingsError::InvalidBaseUrl {
			url: self.base_url.clone(),
			source,
		})
	}

	/// Request timeout, if configured.
	pub fn request_timeout(&self) -> Option<Duration> {
		self.request_timeout_secs.map(Duration::from_secs)
	}

	/// Checks values that cannot be expressed in the type system.
	pub fn validate(&self) -> Result<(), SettingsError> {
		self.base_url()?;
		if !self.login_path.starts_with('/') && Url::parse(&self.login_path).is_err() {
			return Err(SettingsError::Invalid {
				key: "login_path",
				reason: format!("'{}' is neither absolute nor a full URL", self.login_path),
			});
		}
		if self.sub_tab_key.is_empty() {
			return Err(SettingsError::Invalid {
				key: "sub_tab_key",
				reason: "must not be empty".to_string(),
			});
		}
		if self.request_timeout_secs == Some(0) {
			return Err(SettingsError::Invalid {
				key: "request_timeout_secs",
				reason: "must be positive when set".to_string(),
			});
		}
		Ok(())
	}
}

/// A source of settings values.
pub trait ConfigSource: Send + Sync {
	/// Load values from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SettingsError>;

	/// Priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Human-readable description
	fn description(&self) -> String;
}

/// TOML file source. A missing file contributes nothing.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Creates a source reading `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SettingsError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let table: toml::Table = toml::from_str(&content)?;
		let json = serde_json::to_value(table)?;

		Ok(json
			.as_object()
			.map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
			.unwrap_or_default())
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variable source.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Reads process environment variables starting with [`ENV_PREFIX`].
	pub fn new() -> Self {
		Self {
			prefix: ENV_PREFIX.to_string(),
			vars: None,
		}
	}

	/// Reads the given variables instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			prefix: ENV_PREFIX.to_string(),
			vars: Some(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	/// Overrides the prefix filter.
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SettingsError> {
		let vars = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let mut config = IndexMap::new();
		for (key, raw) in vars {
			let Some(stripped) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let key = stripped.to_lowercase();
			let value = if TYPED_KEYS.contains(&key.as_str()) {
				parse_typed(&raw)
			} else {
				Value::String(raw)
			};
			config.insert(key, value);
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

fn parse_typed(raw: &str) -> Value {
	match raw.trim().to_lowercase().as_str() {
		"true" | "yes" | "on" => Value::Bool(true),
		"false" | "no" | "off" => Value::Bool(false),
		"" | "none" => Value::Null,
		trimmed => trimmed
			.parse::<u64>()
			.map(|n| Value::Number(n.into()))
			.unwrap_or_else(|_| Value::String(raw.to_string())),
	}
}

/// Merges sources over a base profile.
pub struct SettingsBuilder {
	base: PortalSettings,
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	/// Starts from [`PortalSettings::default`].
	pub fn new() -> Self {
		Self::from_profile(PortalSettings::default())
	}

	/// Starts from a preset profile.
	pub fn from_profile(base: PortalSettings) -> Self {
		Self {
			base,
			sources: Vec::new(),
		}
	}

	/// Adds a source.
	pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Loads all sources and produces validated settings.
	pub fn build(mut self) -> Result<PortalSettings, SettingsError> {
		self.sources.sort_by_key(|s| s.priority());

		let mut merged = match serde_json::to_value(&self.base)? {
			Value::Object(map) => map,
			_ => serde_json::Map::new(),
		};

		for source in &self.sources {
			let values = source.load()?;
			tracing::debug!(
				source = %source.description(),
				keys = values.len(),
				"Loaded settings source"
			);
			merged.extend(values);
		}

		let settings: PortalSettings = serde_json::from_value(Value::Object(merged))?;
		settings.validate()?;
		Ok(settings)
	}
}

impl Default for SettingsBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults_are_bootstrap_profile() {
		let settings = PortalSettings::default();
		assert_eq!(settings.guard, GuardProfileKind::BodyMarker);
		assert_eq!(settings.link_match, LinkMatch::Uid);
		assert_eq!(settings.login_path, "/account/login");
		assert_eq!(settings.request_timeout(), None);
		assert!(!settings.fence_stale_responses);
		settings.validate().unwrap();
	}

	#[rstest]
	fn test_advising_profile() {
		let settings = PortalSettings::advising();
		assert_eq!(settings.guard, GuardProfileKind::AnchorContent);
		assert_eq!(settings.link_match, LinkMatch::Tab);
		assert_eq!(settings.fragment_selector, ".dynamic-page-wrapper");
	}

	#[rstest]
	fn test_toml_source_overrides_defaults() {
		// Arrange
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("portico.toml");
		fs::write(
			&path,
			r#"
base_url = "https://portal.example.edu/portal/advising"
guard = "anchor-content"
link_match = "tab"
request_timeout_secs = 20
"#,
		)
		.unwrap();

		// Act
		let settings = SettingsBuilder::new()
			.add_source(TomlFileSource::new(&path))
			.build()
			.unwrap();

		// Assert
		assert_eq!(settings.guard, GuardProfileKind::AnchorContent);
		assert_eq!(settings.link_match, LinkMatch::Tab);
		assert_eq!(settings.request_timeout(), Some(Duration::from_secs(20)));
		assert_eq!(settings.login_path, "/account/login");
	}

	#[rstest]
	fn test_env_beats_toml() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("portico.toml");
		fs::write(&path, "login_path = \"/from/toml\"\n").unwrap();

		let settings = SettingsBuilder::new()
			.add_source(EnvSource::from_vars([
				("PORTICO_LOGIN_PATH", "/from/env"),
				("PORTICO_FENCE_STALE_RESPONSES", "true"),
				("OTHER_LOGIN_PATH", "/ignored"),
			]))
			.add_source(TomlFileSource::new(&path))
			.build()
			.unwrap();

		assert_eq!(settings.login_path, "/from/env");
		assert!(settings.fence_stale_responses);
	}

	#[rstest]
	fn test_missing_toml_file_is_ignored() {
		let settings = SettingsBuilder::new()
			.add_source(TomlFileSource::new("/nonexistent/portico.toml"))
			.build()
			.unwrap();
		assert_eq!(settings, PortalSettings::default());
	}

	#[rstest]
	fn test_invalid_base_url_rejected() {
		let result = SettingsBuilder::new()
			.add_source(EnvSource::from_vars([("PORTICO_BASE_URL", "not a url")]))
			.build();
		assert!(matches!(result, Err(SettingsError::InvalidBaseUrl { .. })));
	}

	#[rstest]
	fn test_zero_timeout_rejected() {
		let result = SettingsBuilder::new()
			.add_source(EnvSource::from_vars([("PORTICO_REQUEST_TIMEOUT_SECS", "0")]))
			.build();
		assert!(matches!(
			result,
			Err(SettingsError::Invalid {
				key: "request_timeout_secs",
				..
			})
		));
	}

	#[rstest]
	#[case("true", Value::Bool(true))]
	#[case("off", Value::Bool(false))]
	#[case("30", Value::Number(30.into()))]
	#[case("", Value::Null)]
	fn test_parse_typed(#[case] raw: &str, #[case] expected: Value) {
		assert_eq!(parse_typed(raw), expected);
	}
}
