//! Browser environment: address bar, session history and top-level navigation.
//!
//! [`Browser`] is what the router and fetcher write to instead of reaching
//! for process-wide globals. [`MemoryBrowser`] is a headless implementation
//! with back/forward support.

use crate::target::HistoryEntry;
use parking_lot::Mutex;

/// The state carried by a `popstate` event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopStateEvent {
	/// State object of the entry being returned to, if it has one.
	pub state: Option<HistoryEntry>,
}

/// Session history and address bar.
pub trait Browser: Send + Sync {
	/// Pushes a history entry and shows `url` in the address bar.
	fn push_state(&self, entry: HistoryEntry, url: &str);

	/// The query string of the current address, including the leading `?`
	/// when non-empty.
	fn location_search(&self) -> String;

	/// Performs a full top-level navigation, abandoning the page.
	fn assign(&self, location: &str);
}

#[derive(Debug, Clone)]
struct Slot {
	url: String,
	state: Option<HistoryEntry>,
}

#[derive(Debug)]
struct HistoryState {
	entries: Vec<Slot>,
	cursor: usize,
	assigned: Vec<String>,
}

/// In-memory [`Browser`].
#[derive(Debug)]
pub struct MemoryBrowser {
	state: Mutex<HistoryState>,
}

impl MemoryBrowser {
	/// Opens a page at `url`. The initial entry carries no state.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			state: Mutex::new(HistoryState {
				entries: vec![Slot {
					url: url.into(),
					state: None,
				}],
				cursor: 0,
				assigned: Vec::new(),
			}),
		}
	}

	/// Current address bar contents.
	pub fn address(&self) -> String {
		let state = self.state.lock();
		state.entries[state.cursor].url.clone()
	}

	/// Number of session history entries.
	pub fn history_len(&self) -> usize {
		self.state.lock().entries.len()
	}

	/// State object of the current entry.
	pub fn current_state(&self) -> Option<HistoryEntry> {
		let state = self.state.lock();
		state.entries[state.cursor].state.clone()
	}

	/// Goes back one entry, returning the event to dispatch.
	pub fn back(&self) -> Option<PopStateEvent> {
		let mut state = self.state.lock();
		if state.cursor == 0 {
			return None;
		}
		state.cursor -= 1;
		Some(PopStateEvent {
			state: state.entries[state.cursor].state.clone(),
		})
	}

	/// Goes forward one entry, returning the event to dispatch.
	pub fn forward(&self) -> Option<PopStateEvent> {
		let mut state = self.state.lock();
		if state.cursor + 1 >= state.entries.len() {
			return None;
		}
		state.cursor += 1;
		Some(PopStateEvent {
			state: state.entries[state.cursor].state.clone(),
		})
	}

	/// Every top-level navigation performed, in order.
	pub fn assigned(&self) -> Vec<String> {
		self.state.lock().assigned.clone()
	}
}

impl Default for MemoryBrowser {
	fn default() -> Self {
		Self::new("")
	}
}

impl Browser for MemoryBrowser {
	fn push_state(&self, entry: HistoryEntry, url: &str) {
		let mut state = self.state.lock();
		let keep = state.cursor + 1;
		state.entries.truncate(keep);
		state.entries.push(Slot {
			url: url.to_string(),
			state: Some(entry),
		});
		state.cursor = keep;
	}

	fn location_search(&self) -> String {
		let address = self.address();
		let search = match address.find('?') {
			Some(start) => {
				let rest = &address[start..];
				match rest.find('#') {
					Some(hash) => rest[..hash].to_string(),
					None => rest.to_string(),
				}
			}
			None => String::new(),
		};
		// A bare "?" reads as empty, as in `location.search`.
		if search == "?" { String::new() } else { search }
	}

	fn assign(&self, location: &str) {
		self.state.lock().assigned.push(location.to_string());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn entry(tab: &str, rest: &str) -> HistoryEntry {
		HistoryEntry {
			tab: tab.to_string(),
			query_string: rest.to_string(),
		}
	}

	#[rstest]
	fn test_push_and_back_forward() {
		// Arrange
		let browser = MemoryBrowser::new("/portal");
		browser.push_state(entry("home", ""), "?tab=home");
		browser.push_state(entry("profile", "&uid=42"), "?tab=profile&uid=42");

		// Act
		let back = browser.back().unwrap();

		// Assert
		assert_eq!(back.state, Some(entry("home", "")));
		assert_eq!(browser.address(), "?tab=home");

		let back = browser.back().unwrap();
		assert_eq!(back.state, None);
		assert!(browser.back().is_none());

		let forward = browser.forward().unwrap();
		assert_eq!(forward.state, Some(entry("home", "")));
		assert_eq!(browser.history_len(), 3);
	}

	#[rstest]
	fn test_push_truncates_forward_entries() {
		let browser = MemoryBrowser::new("/portal");
		browser.push_state(entry("a", ""), "?tab=a");
		browser.push_state(entry("b", ""), "?tab=b");
		browser.back();

		browser.push_state(entry("c", ""), "?tab=c");

		assert_eq!(browser.history_len(), 3);
		assert!(browser.forward().is_none());
		assert_eq!(browser.current_state(), Some(entry("c", "")));
	}

	#[rstest]
	#[case("/portal", "")]
	#[case("/portal?", "")]
	#[case("/portal?tab=home", "?tab=home")]
	#[case("https://h/portal?tab=x&uid=1#top", "?tab=x&uid=1")]
	#[case("?tab=profile", "?tab=profile")]
	fn test_location_search(#[case] address: &str, #[case] expected: &str) {
		assert_eq!(MemoryBrowser::new(address).location_search(), expected);
	}

	#[rstest]
	fn test_assign_records_navigation() {
		let browser = MemoryBrowser::new("/portal");
		browser.assign("/account/login");
		assert_eq!(browser.assigned(), vec!["/account/login".to_string()]);
		assert_eq!(browser.history_len(), 1);
	}
}
