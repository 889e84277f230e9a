//! The "vector squashing" codec.
//!
//! SQLite has no native collection column, so every multi-valued attribute
//! (author list, citation list, alias list) is stored as a single TEXT value:
//! elements joined by `::`, with the delimiter also prepended and appended.
//! Every element is therefore bounded by delimiters on both sides, which makes
//! substring containment queries (`LIKE '%::X::%'`) exact — a partial name can
//! never match a full one.

/// Element delimiter. Must never occur inside an element.
pub const DELIMITER: &str = "::";

/// Encode an ordered sequence into a single squashed value.
///
/// An empty sequence encodes as the empty string, not a bare delimiter pair,
/// so an empty-string containment query can never match.
pub fn squash<S: AsRef<str>>(items: &[S]) -> String {
  if items.is_empty() {
    return String::new();
  }
  let mut out = String::from(DELIMITER);
  for (i, item) in items.iter().enumerate() {
    if i > 0 {
      out.push_str(DELIMITER);
    }
    out.push_str(item.as_ref());
  }
  out.push_str(DELIMITER);
  out
}

/// Decode a squashed value back into its ordered sequence.
pub fn unsquash(encoded: &str) -> Vec<String> {
  if encoded.is_empty() {
    return Vec::new();
  }
  let inner = encoded.strip_prefix(DELIMITER).unwrap_or(encoded);
  let inner = inner.strip_suffix(DELIMITER).unwrap_or(inner);
  inner.split(DELIMITER).map(str::to_owned).collect()
}

/// The SQL LIKE pattern matching rows whose squashed column contains `item`
/// as a whole element.
pub fn containment_pattern(item: &str) -> String {
  format!("%{DELIMITER}{item}{DELIMITER}%")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn roundtrip_preserves_order() {
    let items = vec!["Anne Canteaut", "Eli Biham", "Orr Dunkelman"];
    let encoded = squash(&items);
    assert_eq!(encoded, "::Anne Canteaut::Eli Biham::Orr Dunkelman::");
    assert_eq!(unsquash(&encoded), items);
  }

  #[test]
  fn empty_roundtrip() {
    let empty: Vec<String> = vec![];
    assert_eq!(squash(&empty), "");
    assert_eq!(unsquash(""), Vec::<String>::new());
  }

  #[test]
  fn single_element() {
    let items = vec!["Alice"];
    assert_eq!(squash(&items), "::Alice::");
    assert_eq!(unsquash("::Alice::"), items);
  }

  #[test]
  fn half_delimited_values_gain_no_empty_elements() {
    assert_eq!(unsquash("::a"), vec!["a"]);
    assert_eq!(unsquash("a::"), vec!["a"]);
    assert_eq!(unsquash("a"), vec!["a"]);
  }

  #[test]
  fn containment_rejects_strict_substrings() {
    // "Smith" is a strict substring of a listed element but not itself
    // listed; the bounded pattern must not match.
    let encoded = squash(&["John Smith", "Jane Doe"]);
    assert!(encoded.contains(&format!("{DELIMITER}John Smith{DELIMITER}")));
    assert!(!encoded.contains(&format!("{DELIMITER}Smith{DELIMITER}")));
    assert!(!encoded.contains(&format!("{DELIMITER}Jane{DELIMITER}")));
  }
}
