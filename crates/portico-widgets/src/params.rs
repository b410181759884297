//! `data-param-*` attribute collection.
//!
//! Portal form engines use colon-separated field keys (`sys:entity:value`),
//! which cannot appear in HTML attribute names. Triggers spell them with
//! hyphens instead: a single hyphen separates segments and a doubled hyphen
//! stands for a literal one.

use portico_nav::{ElementData, QueryMap};

/// Attribute prefix for form parameters.
pub const PARAM_PREFIX: &str = "data-param-";

/// Decodes the part of an attribute name after [`PARAM_PREFIX`].
///
/// ```
/// use portico_widgets::params::decode_param_name;
///
/// assert_eq!(decode_param_name("sys-entity-value"), "sys:entity:value");
/// assert_eq!(decode_param_name("first--name"), "first-name");
/// ```
pub fn decode_param_name(name: &str) -> String {
	let mut key = String::with_capacity(name.len());
	let mut chars = name.chars().peekable();
	while let Some(c) = chars.next() {
		if c != '-' {
			key.push(c);
		} else if chars.peek() == Some(&'-') {
			chars.next();
			key.push('-');
		} else {
			key.push(':');
		}
	}
	key
}

/// Collects every `data-param-*` attribute of `element`, in attribute order.
pub fn collect_param_attributes(element: &ElementData) -> QueryMap {
	element
		.attributes()
		.iter()
		.filter_map(|(name, value)| {
			name.strip_prefix(PARAM_PREFIX)
				.filter(|rest| !rest.is_empty())
				.map(|rest| (decode_param_name(rest), value.clone()))
		})
		.collect()
}
