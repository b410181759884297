//! Fragment extraction from full portal responses.

use crate::dom::{DomError, parse_selector};
use scraper::{Html, Selector};

/// Fragment errors
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
	#[error(transparent)]
	Selector(#[from] DomError),
}

/// Pulls the embeddable payload out of a response document.
#[derive(Debug, Clone)]
pub struct FragmentExtractor {
	wrapper: Selector,
	sub_tab: Selector,
}

impl FragmentExtractor {
	/// Creates an extractor for the wrapper and nested-tab selectors.
	pub fn new(wrapper: &str, sub_tab: &str) -> Result<Self, FragmentError> {
		Ok(Self {
			wrapper: parse_selector(wrapper)?,
			sub_tab: parse_selector(sub_tab)?,
		})
	}

	/// Inner HTML of the first wrapper element, or `None` if the document has none.
	pub fn extract(&self, document: &str) -> Option<String> {
		let document = Html::parse_document(document);
		document.select(&self.wrapper).next().map(|el| el.inner_html())
	}

	/// Whether `fragment` contains a nested tab control with the given id.
	pub fn has_sub_tab(&self, fragment: &str, id: &str) -> bool {
		let fragment = Html::parse_fragment(fragment);
		fragment
			.select(&self.sub_tab)
			.any(|el| el.value().id() == Some(id))
	}
}
