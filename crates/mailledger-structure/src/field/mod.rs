//! The generic field tree.
//!
//! A [`Field`] is one tokenized IMAP value: `NIL`, a number, a string (atom,
//! quoted string or literal) or a parenthesized list of further fields. The
//! decoders only ever read fields through the accessors defined here, which
//! are total: asking for a shape the field does not hold yields that shape's
//! empty value instead of failing.

mod reader;

use std::str::FromStr;

pub use reader::{DEFAULT_READER_DEPTH, Reader};

use crate::{Error, Result};

/// A tokenized IMAP value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field {
    /// `NIL`.
    #[default]
    Nil,
    /// Atom, quoted string or literal.
    Atom(String),
    /// Number.
    Number(u32),
    /// Parenthesized list.
    List(Vec<Self>),
}

impl Field {
    /// Reads a single field from raw IMAP text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on malformed syntax or trailing data, and
    /// [`Error::NestingTooDeep`] when lists nest beyond
    /// [`DEFAULT_READER_DEPTH`].
    pub fn parse(input: &[u8]) -> Result<Self> {
        Reader::new(input).read_field()
    }

    /// Returns the string value, or `""` if this is not a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Atom(s) => s,
            _ => "",
        }
    }

    /// Returns the string value, or `None` if this is not a string.
    ///
    /// Unlike [`Field::as_str`], this keeps `NIL` apart from `""`.
    #[must_use]
    pub fn as_nstring(&self) -> Option<&str> {
        match self {
            Self::Atom(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value, or `0` if this is not a number.
    #[must_use]
    pub const fn as_number(&self) -> u32 {
        match self {
            Self::Number(n) => *n,
            _ => 0,
        }
    }

    /// Returns the list elements, or an empty slice if this is not a list.
    #[must_use]
    pub fn as_list(&self) -> &[Self] {
        match self {
            Self::List(list) => list,
            _ => &[],
        }
    }

    /// Returns true if this is a list.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns true if this is `NIL`.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s.as_bytes())
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Self::Atom(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Self::Atom(s)
    }
}

impl From<u32> for Field {
    fn from(n: u32) -> Self {
        Self::Number(n)
    }
}

impl From<Vec<Self>> for Field {
    fn from(list: Vec<Self>) -> Self {
        Self::List(list)
    }
}

impl<T: Into<Self>> From<Option<T>> for Field {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
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
    use proptest::prelude::*;

    #[test]
    fn test_as_str() {
        assert_eq!(Field::from("PLAIN").as_str(), "PLAIN");
        assert_eq!(Field::Nil.as_str(), "");
        assert_eq!(Field::Number(7).as_str(), "");
        assert_eq!(Field::List(vec!["a".into()]).as_str(), "");
    }

    #[test]
    fn test_as_nstring_keeps_nil_apart() {
        assert_eq!(Field::from("").as_nstring(), Some(""));
        assert_eq!(Field::Nil.as_nstring(), None);
        assert_eq!(Field::Number(1).as_nstring(), None);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Field::Number(1152).as_number(), 1152);
        assert_eq!(Field::from("1152").as_number(), 0);
        assert_eq!(Field::Nil.as_number(), 0);
    }

    #[test]
    fn test_as_list() {
        let list = Field::List(vec![Field::from("a"), Field::Number(2)]);
        assert_eq!(list.as_list().len(), 2);
        assert!(Field::Nil.as_list().is_empty());
        assert!(Field::from("a").as_list().is_empty());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Field::from(None::<&str>), Field::Nil);
        assert_eq!(Field::from(Some("x")), Field::Atom("x".to_string()));
    }

    #[test]
    fn test_from_str() {
        let field: Field = "(\"a\" 1 NIL)".parse().unwrap();
        assert_eq!(
            field,
            Field::List(vec![Field::from("a"), Field::Number(1), Field::Nil])
        );
    }

    fn arb_field() -> impl Strategy<Value = Field> {
        let leaf = prop_oneof![
            Just(Field::Nil),
            ".*".prop_map(Field::Atom),
            any::<u32>().prop_map(Field::Number),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop::collection::vec(inner, 0..6).prop_map(Field::List)
        })
    }

    proptest! {
        #[test]
        fn accessors_are_total(field in arb_field()) {
            let s = field.as_str();
            let n = field.as_number();
            let list = field.as_list();

            match &field {
                Field::Atom(a) => prop_assert_eq!(s, a.as_str()),
                _ => prop_assert_eq!(s, ""),
            }
            if !matches!(field, Field::Number(_)) {
                prop_assert_eq!(n, 0);
            }
            prop_assert_eq!(field.is_list(), matches!(field, Field::List(_)));
            if !field.is_list() {
                prop_assert!(list.is_empty());
            }
        }
    }
}
