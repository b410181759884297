//! Flat query-string codec.
//!
//! Parses `a=1&b=2` style strings into an ordered [`QueryMap`] and serializes
//! them back. Keys and values are percent-decoded independently; `+` is kept
//! literally, matching `decodeURIComponent` rather than form decoding.
//!
//! ## Example
//!
//! ```
//! use portico_nav::query::{decode, encode};
//!
//! let map = decode("tab=profile&uid=42");
//! assert_eq!(map.get("uid").map(String::as_str), Some("42"));
//! assert_eq!(encode(&map), "tab=profile&uid=42");
//! ```

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Ordered mapping of query keys to values.
pub type QueryMap = IndexMap<String, String>;

/// Query key that carries the view identifier positionally.
pub const TAB_KEY: &str = "tab";

/// Query key that carries the backend command in outbound view paths.
pub const CMD_KEY: &str = "cmd";

/// Characters left unescaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'~')
	.remove(b'*')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')');

/// Tab identifiers are opaque paths, so `/` survives.
const TAB_COMPONENT: &AsciiSet = &COMPONENT.remove(b'/');

/// Decodes a raw query string.
///
/// A leading `?` is ignored. Each `&`-separated pair is split on its first
/// `=`; a pair without `=` yields an empty value. Empty pairs are skipped and
/// duplicate keys keep the last value.
pub fn decode(raw: &str) -> QueryMap {
	let raw = raw.strip_prefix('?').unwrap_or(raw);
	let mut map = QueryMap::new();

	for pair in raw.split('&').filter(|p| !p.is_empty()) {
		let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
		map.insert(decode_component(key), decode_component(value));
	}

	map
}

/// Encodes a mapping as `k=v&k=v` in iteration order.
pub fn encode(map: &QueryMap) -> String {
	map.iter()
		.map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
		.collect::<Vec<_>>()
		.join("&")
}

/// Removes the reserved `tab` key, returning its value if it was present.
pub fn strip_reserved(map: &mut QueryMap) -> Option<String> {
	map.shift_remove(TAB_KEY)
}

/// Percent-encodes a single key or value.
pub fn encode_component(raw: &str) -> String {
	utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Percent-encodes a tab identifier, keeping path separators readable.
pub fn encode_tab(tab: &str) -> String {
	utf8_percent_encode(tab, TAB_COMPONENT).to_string()
}

fn decode_component(raw: &str) -> String {
	percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	#[rstest]
	fn test_decode_empty() {
		assert!(decode("").is_empty());
		assert!(decode("?").is_empty());
	}

	#[rstest]
	fn test_decode_pairs() {
		let map = decode("a=1&b=2");
		assert_eq!(map.len(), 2);
		assert_eq!(map["a"], "1");
		assert_eq!(map["b"], "2");
	}

	#[rstest]
	fn test_decode_last_wins() {
		let map = decode("a=1&a=2");
		assert_eq!(map.len(), 1);
		assert_eq!(map["a"], "2");
	}

	#[rstest]
	#[case("flag", "flag", "")]
	#[case("k=a=b", "k", "a=b")]
	#[case("name=Jo%20Ann", "name", "Jo Ann")]
	#[case("q=a+b", "q", "a+b")]
	#[case("%75id=42", "uid", "42")]
	fn test_decode_single_pair(#[case] raw: &str, #[case] key: &str, #[case] value: &str) {
		let map = decode(raw);
		assert_eq!(map.get(key).map(String::as_str), Some(value));
	}

	#[rstest]
	fn test_decode_skips_empty_pairs() {
		let map = decode("&a=1&&b=2&");
		assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[rstest]
	fn test_decode_leading_question_mark() {
		let map = decode("?tab=courses&uid=7");
		assert_eq!(map["tab"], "courses");
		assert_eq!(map["uid"], "7");
	}

	#[rstest]
	fn test_encode_preserves_order() {
		let mut map = QueryMap::new();
		map.insert("z".to_string(), "1".to_string());
		map.insert("a".to_string(), "2".to_string());
		assert_eq!(encode(&map), "z=1&a=2");
	}

	#[rstest]
	fn test_encode_escapes_reserved() {
		let mut map = QueryMap::new();
		map.insert("sys:entity".to_string(), "a b&c".to_string());
		assert_eq!(encode(&map), "sys%3Aentity=a%20b%26c");
	}

	#[rstest]
	fn test_encode_empty() {
		assert_eq!(encode(&QueryMap::new()), "");
	}

	#[rstest]
	fn test_strip_reserved() {
		let mut map = decode("tab=grades&uid=3");
		assert_eq!(strip_reserved(&mut map), Some("grades".to_string()));
		assert_eq!(encode(&map), "uid=3");
		assert_eq!(strip_reserved(&mut map), None);
	}

	#[rstest]
	fn test_encode_tab_keeps_slashes() {
		assert_eq!(encode_tab("student/profile"), "student/profile");
		assert_eq!(encode_tab("a&b"), "a%26b");
	}

	proptest! {
		#[test]
		fn prop_roundtrip_unreserved(
			pairs in proptest::collection::vec(
				("[A-Za-z0-9_.~-]{1,8}", "[A-Za-z0-9_.~-]{0,8}"),
				0..8,
			)
		) {
			let map: QueryMap = pairs.into_iter().collect();
			prop_assert_eq!(decode(&encode(&map)), map);
		}

		#[test]
		fn prop_roundtrip_arbitrary_text(
			pairs in proptest::collection::vec(("\\PC{1,6}", "\\PC{0,6}"), 0..6)
		) {
			let map: QueryMap = pairs.into_iter().collect();
			prop_assert_eq!(decode(&encode(&map)), map);
		}
	}
}
