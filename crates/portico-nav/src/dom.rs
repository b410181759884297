//! Document model for the portal shell.
//!
//! The navigation router never touches a live browser DOM. It works against
//! three explicit structures instead:
//!
//! - [`NavPanel`]: the navigation sidebar, parsed once into an arena tree whose
//!   `active`/`show` class markers the router rewrites on every navigation.
//! - [`ContentPane`]: the main content container whose HTML is replaced by
//!   each load.
//! - [`ElementData`]: the attributes of a clicked element, used to derive a
//!   [`NavigationTarget`](crate::target::NavigationTarget).

use crate::query::QueryMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use scraper::{ElementRef, Html, Selector};

/// Class marking the active navigation link.
pub const ACTIVE_CLASS: &str = "active";

/// Class marking a collapsible submenu group.
pub const COLLAPSE_CLASS: &str = "collapse";

/// Class marking an expanded submenu group.
pub const SHOW_CLASS: &str = "show";

/// Class marking elements whose clicks load content in place.
pub const LOAD_CONTENT_CLASS: &str = "load-content";

/// Errors raised while building the document model.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
	#[error("Invalid selector '{selector}': {reason}")]
	InvalidSelector { selector: String, reason: String },
}

/// Parses a CSS selector, mapping failures to [`DomError`].
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, DomError> {
	Selector::parse(selector).map_err(|e| DomError::InvalidSelector {
		selector: selector.to_string(),
		reason: e.to_string(),
	})
}

/// Attributes of a single element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
	tag: String,
	attributes: IndexMap<String, String>,
}

impl ElementData {
	/// Creates an element with no attributes.
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attributes: IndexMap::new(),
		}
	}

	/// Adds an attribute.
	pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	/// Parses the first element of an HTML snippet.
	pub fn parse(html: &str) -> Option<Self> {
		let fragment = Html::parse_fragment(html);
		let element = fragment
			.root_element()
			.children()
			.find_map(ElementRef::wrap)
			.map(|el| Self::from_element_ref(&el));
		element
	}

	pub(crate) fn from_element_ref(el: &ElementRef<'_>) -> Self {
		let value = el.value();
		Self {
			tag: value.name().to_string(),
			attributes: value
				.attrs()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
		}
	}

	/// Tag name.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Returns an attribute value.
	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}

	/// All attributes in document order.
	pub fn attributes(&self) -> &IndexMap<String, String> {
		&self.attributes
	}

	/// Whether the `class` attribute lists `class`.
	pub fn has_class(&self, class: &str) -> bool {
		self.attr("class")
			.is_some_and(|list| list.split_whitespace().any(|c| c == class))
	}

	/// The view this element loads: `data-tab`, else `href`.
	///
	/// In-page anchors (`#`, `#people`) never name a view.
	pub fn tab(&self) -> Option<&str> {
		self.attr("data-tab")
			.filter(|t| !t.is_empty())
			.or_else(|| self.attr("href").filter(|h| !h.is_empty() && !h.starts_with('#')))
	}

	/// Whether this element is a navigation link rather than a toggle.
	fn is_nav_link(&self) -> bool {
		self.has_class(LOAD_CONTENT_CLASS) || self.attr("data-tab").is_some_and(|t| !t.is_empty())
	}

	/// `data-*` attributes keyed by their camelCased names.
	///
	/// `data-record-id="7"` becomes `recordId=7`.
	pub fn data_attributes(&self) -> QueryMap {
		self.attributes
			.iter()
			.filter_map(|(name, value)| {
				name.strip_prefix("data-")
					.filter(|rest| !rest.is_empty())
					.map(|rest| (camel_case(rest), value.clone()))
			})
			.collect()
	}
}

fn camel_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	let mut chars = name.chars().peekable();
	while let Some(c) = chars.next() {
		match (c, chars.peek()) {
			('-', Some(next)) if next.is_ascii_lowercase() => {
				out.push(next.to_ascii_uppercase());
				chars.next();
			}
			_ => out.push(c),
		}
	}
	out
}

/// Index of a node within a [`NavPanel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
	/// Position in document order.
	pub fn index(self) -> usize {
		self.0
	}
}

/// One element of the navigation panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavNode {
	element: ElementData,
	classes: Vec<String>,
	parent: Option<NodeId>,
}

impl NavNode {
	/// The element's tag and original attributes.
	pub fn element(&self) -> &ElementData {
		&self.element
	}

	/// Current class list, including router-managed markers.
	pub fn classes(&self) -> &[String] {
		&self.classes
	}

	/// Whether the current class list contains `class`.
	pub fn has_class(&self, class: &str) -> bool {
		self.classes.iter().any(|c| c == class)
	}

	/// Parent node, `None` for the panel root.
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	fn add_class(&mut self, class: &str) {
		if !self.has_class(class) {
			self.classes.push(class.to_string());
		}
	}

	fn remove_class(&mut self, class: &str) {
		self.classes.retain(|c| c != class);
	}

	fn is_link(&self) -> bool {
		self.element.tag() == "a"
	}
}

/// How the router finds the link to mark active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkMatcher {
	/// Link whose `data-uid` equals the record identifier.
	Uid(String),
	/// Link whose `href` or `data-tab` equals the tab.
	Tab(String),
}

impl LinkMatcher {
	fn matches(&self, element: &ElementData) -> bool {
		match self {
			Self::Uid(uid) => element.attr("data-uid") == Some(uid.as_str()),
			Self::Tab(tab) => {
				element.attr("href") == Some(tab.as_str())
					|| element.attr("data-tab") == Some(tab.as_str())
			}
		}
	}
}

/// The navigation sidebar as an arena tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavPanel {
	nodes: Vec<NavNode>,
}

impl NavPanel {
	/// An empty panel with no links.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Parses the panel rooted at the first element matching `selector`.
	///
	/// A document without a matching element yields an empty panel.
	pub fn parse(html: &str, selector: &str) -> Result<Self, DomError> {
		let selector = parse_selector(selector)?;
		let document = Html::parse_document(html);
		let mut nodes = Vec::new();
		if let Some(root) = document.select(&selector).next() {
			collect_nodes(root, None, &mut nodes);
		} else {
			tracing::warn!("Navigation panel not found in document");
		}
		Ok(Self { nodes })
	}

	/// Number of elements in the panel, root included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the panel has no elements.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Returns a node.
	pub fn node(&self, id: NodeId) -> Option<&NavNode> {
		self.nodes.get(id.0)
	}

	/// All anchor elements in document order.
	pub fn links(&self) -> impl Iterator<Item = (NodeId, &NavNode)> {
		self.nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| n.is_link())
			.map(|(i, n)| (NodeId(i), n))
	}

	/// The first `load-content` or `data-tab` link that names a view.
	pub fn first_link(&self) -> Option<NodeId> {
		self.links()
			.find(|(_, n)| n.element().is_nav_link() && n.element().tab().is_some())
			.map(|(id, _)| id)
	}

	/// The first link satisfying `matcher`.
	pub fn find_link(&self, matcher: &LinkMatcher) -> Option<NodeId> {
		self.links()
			.find(|(_, n)| matcher.matches(n.element()))
			.map(|(id, _)| id)
	}

	/// Re-derives the active and expanded markers for `matcher`.
	///
	/// All `active` markers and all expanded groups are cleared first. The
	/// matching link, if any, becomes the only active link and each
	/// collapsible ancestor is expanded.
	pub fn activate(&mut self, matcher: &LinkMatcher) -> Option<NodeId> {
		for node in &mut self.nodes {
			node.remove_class(ACTIVE_CLASS);
			if node.has_class(COLLAPSE_CLASS) {
				node.remove_class(SHOW_CLASS);
			}
		}

		let id = self.find_link(matcher)?;
		self.nodes[id.0].add_class(ACTIVE_CLASS);

		let mut cursor = self.nodes[id.0].parent;
		while let Some(parent) = cursor {
			let node = &mut self.nodes[parent.0];
			if node.has_class(COLLAPSE_CLASS) {
				node.add_class(SHOW_CLASS);
			}
			cursor = node.parent;
		}

		Some(id)
	}

	/// The link currently marked active.
	pub fn active_link(&self) -> Option<NodeId> {
		self.links()
			.find(|(_, n)| n.has_class(ACTIVE_CLASS))
			.map(|(id, _)| id)
	}

	/// Collapsible groups currently expanded.
	pub fn expanded_groups(&self) -> Vec<NodeId> {
		self.nodes
			.iter()
			.enumerate()
			.filter(|(_, n)| n.has_class(COLLAPSE_CLASS) && n.has_class(SHOW_CLASS))
			.map(|(i, _)| NodeId(i))
			.collect()
	}
}

fn collect_nodes(el: ElementRef<'_>, parent: Option<NodeId>, nodes: &mut Vec<NavNode>) {
	let id = NodeId(nodes.len());
	nodes.push(NavNode {
		element: ElementData::from_element_ref(&el),
		classes: el.value().classes().map(str::to_string).collect(),
		parent,
	});
	for child in el.children().filter_map(ElementRef::wrap) {
		collect_nodes(child, Some(id), nodes);
	}
}

/// Proof of a started load, used by the stale-response fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
struct PaneState {
	html: String,
	sub_tab: Option<String>,
	generation: u64,
}

/// The main content container.
#[derive(Debug, Default)]
pub struct ContentPane {
	state: Mutex<PaneState>,
}

impl ContentPane {
	/// Creates an empty pane.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current inner HTML.
	pub fn html(&self) -> String {
		self.state.lock().html.clone()
	}

	/// Replaces the inner HTML unconditionally.
	pub fn replace(&self, html: impl Into<String>) {
		let mut state = self.state.lock();
		state.html = html.into();
		state.sub_tab = None;
	}

	/// Starts a load: shows `placeholder` and issues a fresh ticket.
	pub fn begin(&self, placeholder: &str) -> Ticket {
		let mut state = self.state.lock();
		state.generation += 1;
		state.html = placeholder.to_string();
		state.sub_tab = None;
		Ticket(state.generation)
	}

	/// Writes the result of a load.
	///
	/// With `fenced` set, a stale ticket leaves the pane untouched and
	/// returns `false`.
	pub fn commit(&self, ticket: Ticket, html: impl Into<String>, fenced: bool) -> bool {
		let mut state = self.state.lock();
		if fenced && state.generation != ticket.0 {
			return false;
		}
		state.html = html.into();
		state.sub_tab = None;
		true
	}

	/// Id of the nested tab currently shown inside the content.
	pub fn shown_sub_tab(&self) -> Option<String> {
		self.state.lock().sub_tab.clone()
	}

	/// Marks a nested tab as shown.
	pub fn show_sub_tab(&self, id: impl Into<String>) {
		self.state.lock().sub_tab = Some(id.into());
	}
}
