//! Navigation targets and history entries.

use crate::dom::ElementData;
use crate::query::{self, CMD_KEY, QueryMap, TAB_KEY};
use serde::{Deserialize, Serialize};

/// Parameter name carrying the record identifier.
pub const UID_KEY: &str = "uid";

/// A view to load: the positional tab plus passthrough parameters.
///
/// The reserved `tab` key never appears in [`parameters`](Self::parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
	tab: String,
	parameters: QueryMap,
}

impl NavigationTarget {
	/// Creates a target with no extra parameters.
	pub fn new(tab: impl Into<String>) -> Self {
		Self {
			tab: tab.into(),
			parameters: QueryMap::new(),
		}
	}

	/// Adds a single parameter. A `tab` key is ignored.
	pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		let key = key.into();
		if key != TAB_KEY {
			self.parameters.insert(key, value.into());
		}
		self
	}

	/// Merges a parameter map, dropping any `tab` entry.
	pub fn with_parameters(mut self, parameters: QueryMap) -> Self {
		self.parameters.extend(parameters);
		query::strip_reserved(&mut self.parameters);
		self
	}

	/// Builds a target from a decoded address-bar query.
	///
	/// Returns `None` when the query has no non-empty `tab`.
	pub fn from_query(mut query: QueryMap) -> Option<Self> {
		let tab = query::strip_reserved(&mut query).filter(|t| !t.is_empty())?;
		Some(Self {
			tab,
			parameters: query,
		})
	}

	/// Builds a target from a popped history entry.
	pub fn from_entry(entry: &HistoryEntry) -> Self {
		Self::new(entry.tab.clone()).with_parameters(query::decode(&entry.query_string))
	}

	/// Builds a target from a clicked `load-content` element.
	///
	/// The tab comes from `data-tab` (falling back to `href`) and every
	/// `data-*` attribute becomes a parameter.
	pub fn from_element(element: &ElementData) -> Option<Self> {
		let tab = element.tab()?;
		Some(Self::new(tab).with_parameters(element.data_attributes()))
	}

	/// The view identifier.
	pub fn tab(&self) -> &str {
		&self.tab
	}

	/// Passthrough parameters, in insertion order.
	pub fn parameters(&self) -> &QueryMap {
		&self.parameters
	}

	/// The record identifier carried as `uid`, if any.
	pub fn record_uid(&self) -> Option<&str> {
		self.parameters
			.get(UID_KEY)
			.map(String::as_str)
			.filter(|uid| !uid.is_empty())
	}

	/// Serialized parameters prefixed with `&`, or empty when there are none.
	pub fn query_rest(&self) -> String {
		let mut parameters = self.parameters.clone();
		query::strip_reserved(&mut parameters);
		if parameters.is_empty() {
			String::new()
		} else {
			format!("&{}", query::encode(&parameters))
		}
	}

	/// Canonical address-bar form: `?tab=<id>[&<rest>]`.
	pub fn address(&self) -> String {
		format!(
			"?{}={}{}",
			TAB_KEY,
			query::encode_tab(&self.tab),
			self.query_rest()
		)
	}

	/// Outbound view path: `?cmd=<id>[&<rest>]`.
	pub fn view_path(&self) -> String {
		format!(
			"?{}={}{}",
			CMD_KEY,
			query::encode_tab(&self.tab),
			self.query_rest()
		)
	}
}

/// State object pushed onto the browser history for each navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
	/// The view identifier.
	pub tab: String,
	/// Serialized parameters, `&`-prefixed or empty.
	#[serde(rename = "queryString")]
	pub query_string: String,
}

impl HistoryEntry {
	/// Creates the entry recorded for `target`.
	pub fn for_target(target: &NavigationTarget) -> Self {
		Self {
			tab: target.tab.clone(),
			query_string: target.query_rest(),
		}
	}
}
