//! Body parameters and extension data.
//!
//! Body parts and multiparts share the same extension fields, in the same
//! relative order: parameters (multiparts only, as extension data),
//! disposition and language. Body parts also carry a location.

use crate::field::Field;

/// Ordered, multi-valued parameter map.
///
/// Keys keep the order in which they first appeared. Adding an existing key
/// appends another value. Lookup ignores ASCII case, since MIME parameter
/// names are case-insensitive.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    entries: Vec<(String, Vec<String>)>,
}

impl Params {
    /// Creates an empty parameter map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a value for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.position(&key) {
            Some(idx) => self.entries[idx].1.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Returns the first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    /// Returns all values for `key`, in insertion order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.position(key)
            .map_or(&[][..], |idx| self.entries[idx].1.as_slice())
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over keys and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}

/// Content disposition of a body part or multipart.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    /// Disposition type, e.g. `attachment` or `inline`, as sent by the server.
    pub kind: String,
    /// Disposition parameters such as `filename`.
    pub attributes: Params,
}

impl Disposition {
    /// Returns true if the disposition type is `attachment` (any case).
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.kind.eq_ignore_ascii_case("attachment")
    }
}

/// Decodes a flat `key value key value ...` list into parameters.
///
/// A dangling final key without a value is dropped.
#[must_use]
pub fn decode_attribute_pairs(list: &[Field]) -> Params {
    if list.len() % 2 != 0 {
        tracing::trace!(len = list.len(), "odd-length attribute list, dropping last");
    }

    list.chunks_exact(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect()
}

/// Decodes a `("type" (attributes))` disposition.
///
/// Returns `None` unless the list has exactly two elements and the second is
/// a list (`NIL` attributes are accepted as empty).
#[must_use]
pub fn decode_disposition(list: &[Field]) -> Option<Disposition> {
    let [kind, attributes] = list else {
        if !list.is_empty() {
            tracing::trace!(len = list.len(), "malformed disposition");
        }
        return None;
    };

    if !(attributes.is_list() || attributes.is_nil()) {
        tracing::trace!("disposition attributes are not a list");
        return None;
    }

    Some(Disposition {
        kind: kind.as_str().to_string(),
        attributes: decode_attribute_pairs(attributes.as_list()),
    })
}

/// Decodes a body language field.
///
/// A list yields one tag per element; a single string yields one tag.
/// `NIL` and the empty string yield `None`.
#[must_use]
pub fn decode_language(field: &Field) -> Option<Vec<String>> {
    match field {
        Field::List(list) => Some(list.iter().map(|f| f.as_str().to_string()).collect()),
        _ => match field.as_str() {
            "" => None,
            lang => Some(vec![lang.to_string()]),
        },
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn fields(items: &[&str]) -> Vec<Field> {
        items.iter().map(|s| Field::from(*s)).collect()
    }

    mod params_tests {
        use super::*;

        #[test]
        fn empty_list_gives_empty_map() {
            let params = decode_attribute_pairs(&[]);
            assert!(params.is_empty());
            assert_eq!(params.len(), 0);
        }

        #[test]
        fn single_pair() {
            let params = decode_attribute_pairs(&fields(&["filename", "a.txt"]));
            assert_eq!(params.get_all("filename"), ["a.txt".to_string()]);
            assert_eq!(params.get("filename"), Some("a.txt"));
        }

        #[test]
        fn duplicate_keys_append() {
            let params = decode_attribute_pairs(&fields(&[
                "CHARSET", "us-ascii", "NAME", "x", "charset", "utf-8",
            ]));
            assert_eq!(params.len(), 2);
            assert_eq!(
                params.get_all("charset"),
                ["us-ascii".to_string(), "utf-8".to_string()]
            );
            let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
            assert_eq!(keys, vec!["CHARSET", "NAME"]);
        }

        #[test]
        fn odd_length_drops_dangling_key() {
            let params = decode_attribute_pairs(&fields(&["a", "1", "b"]));
            assert_eq!(params.len(), 1);
            assert!(!params.contains_key("b"));
        }

        #[test]
        fn lookup_ignores_case() {
            let params: Params = [("Name", "report.pdf")].into_iter().collect();
            assert_eq!(params.get("NAME"), Some("report.pdf"));
            assert_eq!(params.get("missing"), None);
            assert!(params.get_all("missing").is_empty());
        }
    }

    mod disposition_tests {
        use super::*;

        #[test]
        fn attachment_with_filename() {
            let list = vec![
                Field::from("ATTACHMENT"),
                Field::List(fields(&["FILENAME", "report.pdf"])),
            ];
            let disposition = decode_disposition(&list).unwrap();
            assert_eq!(disposition.kind, "ATTACHMENT");
            assert!(disposition.is_attachment());
            assert_eq!(disposition.attributes.get("filename"), Some("report.pdf"));
        }

        #[test]
        fn nil_attributes() {
            let list = vec![Field::from("inline"), Field::Nil];
            let disposition = decode_disposition(&list).unwrap();
            assert!(!disposition.is_attachment());
            assert!(disposition.attributes.is_empty());
        }

        #[test]
        fn wrong_shape_is_none() {
            assert!(decode_disposition(&[]).is_none());
            assert!(decode_disposition(&fields(&["attachment"])).is_none());
            assert!(decode_disposition(&fields(&["attachment", "x"])).is_none());
            assert!(decode_disposition(&fields(&["a", "b", "c"])).is_none());
        }
    }

    mod language_tests {
        use super::*;

        #[test]
        fn single_string() {
            assert_eq!(
                decode_language(&Field::from("en")),
                Some(vec!["en".to_string()])
            );
        }

        #[test]
        fn list_of_strings() {
            let field = Field::List(fields(&["en", "de"]));
            assert_eq!(
                decode_language(&field),
                Some(vec!["en".to_string(), "de".to_string()])
            );
        }

        #[test]
        fn empty_or_nil_is_absent() {
            assert_eq!(decode_language(&Field::from("")), None);
            assert_eq!(decode_language(&Field::Nil), None);
        }
    }
}
