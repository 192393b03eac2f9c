//! Reader for the textual form of a field tree.
//!
//! Turns the IMAP text of a single value, such as the parenthesized list that
//! follows `BODYSTRUCTURE` in a `FETCH` response, into a [`Field`]. Response
//! framing is not handled here: literals must already be inline, as in
//! `{5}\r\nhello`.

#![allow(clippy::missing_errors_doc)]

use super::Field;
use crate::{Error, Result};

/// Default limit on list nesting accepted by the reader.
pub const DEFAULT_READER_DEPTH: usize = 64;

/// Field reader state.
pub struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader for the given input.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            max_depth: DEFAULT_READER_DEPTH,
        }
    }

    /// Sets the maximum list nesting.
    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Returns the current position in the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns true if at end of input.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    /// Reads exactly one field, rejecting anything but whitespace after it.
    pub fn read_field(&mut self) -> Result<Field> {
        self.skip_whitespace();
        let field = self.read_value(0)?;
        self.skip_whitespace();

        if self.is_eof() {
            Ok(field)
        } else {
            Err(self.error("Unexpected data after field"))
        }
    }

    /// Reads the next value at the given list depth.
    fn read_value(&mut self, depth: usize) -> Result<Field> {
        let Some(byte) = self.peek() else {
            return Err(self.error("Unexpected EOF"));
        };

        match byte {
            b'(' => self.read_list(depth + 1),
            b')' => Err(self.error("Unexpected closing parenthesis")),
            b'"' => self.read_quoted_string(),
            b'{' => self.read_literal(),
            b'0'..=b'9' => self.read_number_or_atom(),
            _ if is_atom_char(byte) => self.read_atom(),
            _ => Err(self.error(&format!("Unexpected character: {byte:#04x}"))),
        }
    }

    /// Reads a parenthesized list.
    fn read_list(&mut self, depth: usize) -> Result<Field> {
        if depth > self.max_depth {
            return Err(Error::NestingTooDeep {
                limit: self.max_depth,
            });
        }

        self.advance(); // Skip (

        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b')') => {
                    self.advance();
                    break;
                }
                Some(_) => items.push(self.read_value(depth)?),
                None => return Err(self.error("Unexpected EOF in list")),
            }
        }

        Ok(Field::List(items))
    }

    /// Reads a quoted string.
    fn read_quoted_string(&mut self) -> Result<Field> {
        self.advance(); // Skip opening quote

        let mut result = Vec::new();

        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(b'"') => result.push(b'"'),
                    Some(b'\\') => result.push(b'\\'),
                    Some(c) => {
                        // In IMAP, only " and \ can be escaped
                        return Err(self.error(&format!("Invalid escape: \\{}", c as char)));
                    }
                    None => return Err(self.error("Unexpected EOF in quoted string")),
                },
                Some(c) => result.push(c),
                None => return Err(self.error("Unexpected EOF in quoted string")),
            }
        }

        let s =
            String::from_utf8(result).map_err(|_| self.error("Invalid UTF-8 in quoted string"))?;

        Ok(Field::Atom(s))
    }

    /// Reads a literal `{n}\r\n` followed by n bytes of data.
    fn read_literal(&mut self) -> Result<Field> {
        self.advance(); // Skip {

        let start = self.pos;
        let mut literal_plus = false;

        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' if !literal_plus => {
                    self.advance();
                }
                b'+' if !literal_plus => {
                    literal_plus = true;
                    self.advance();
                }
                b'}' => break,
                _ => return Err(self.error("Invalid character in literal size")),
            }
        }

        let size_str = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("Invalid literal size"))?
            .trim_end_matches('+');

        let size: usize = size_str
            .parse()
            .map_err(|_| self.error("Invalid literal size number"))?;

        if self.advance() != Some(b'}') {
            return Err(self.error("Expected } after literal size"));
        }

        if self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
            self.skip(2);
        } else if !literal_plus {
            return Err(self.error("Expected CRLF after literal size"));
        }

        if size > self.input.len() - self.pos {
            return Err(self.error("Incomplete literal data"));
        }

        let data = self.input[self.pos..self.pos + size].to_vec();
        self.skip(size);

        let s = String::from_utf8(data).map_err(|_| self.error("Invalid UTF-8 in literal"))?;
        Ok(Field::Atom(s))
    }

    /// Reads a number, or an atom that merely starts with a digit.
    fn read_number_or_atom(&mut self) -> Result<Field> {
        let s = self.take_atom()?;

        if s.bytes().all(|b| b.is_ascii_digit()) {
            let n: u32 = s.parse().map_err(|_| self.error("Number too large"))?;
            Ok(Field::Number(n))
        } else {
            Ok(Field::Atom(s.to_string()))
        }
    }

    /// Reads an atom, mapping `NIL` to [`Field::Nil`].
    fn read_atom(&mut self) -> Result<Field> {
        let s = self.take_atom()?;

        if s.eq_ignore_ascii_case("NIL") {
            Ok(Field::Nil)
        } else {
            Ok(Field::Atom(s.to_string()))
        }
    }

    fn take_atom(&mut self) -> Result<&'a str> {
        let start = self.pos;

        while let Some(b) = self.peek() {
            if is_atom_char(b) {
                self.advance();
            } else {
                break;
            }
        }

        std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("Invalid UTF-8 in atom"))
    }

    /// Creates a parse error at the current position.
    fn error(&self, message: &str) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }
}

/// Returns true if the byte may appear in an atom.
///
/// This is the IMAP `ATOM-CHAR` set widened by `\` (flags), `[`, `]` and
/// `}` so that section specifiers like `BODY[1]` read as one atom.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    matches!(b,
        0x21 |         // !
        0x23..=0x24 |  // # $
        0x26..=0x27 |  // & '
        0x2B..=0x7A |  // + , - . / 0-9 : ; < = > ? @ A-Z [ \ ] ^ _ ` a-z
        0x7C..=0x7E    // | } ~
    )
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

    fn read(input: &[u8]) -> Result<Field> {
        Reader::new(input).read_field()
    }

    #[test]
    fn test_atoms_and_numbers() {
        assert_eq!(read(b"7BIT").unwrap(), Field::from("7BIT"));
        assert_eq!(read(b"1152").unwrap(), Field::Number(1152));
        assert_eq!(read(b"NIL").unwrap(), Field::Nil);
        assert_eq!(read(b"nil").unwrap(), Field::Nil);
        assert_eq!(read(b"BODY[1.2]").unwrap(), Field::from("BODY[1.2]"));
    }

    #[test]
    fn test_quoted_string() {
        assert_eq!(
            read(b"\"hello world\"").unwrap(),
            Field::from("hello world")
        );
        assert_eq!(read(b"\"\"").unwrap(), Field::from(""));
    }

    #[test]
    fn test_quoted_string_escaped() {
        assert_eq!(
            read(b"\"hello \\\"world\\\"\"").unwrap(),
            Field::from("hello \"world\"")
        );
    }

    #[test]
    fn test_quoted_number_stays_string() {
        assert_eq!(read(b"\"42\"").unwrap(), Field::from("42"));
    }

    #[test]
    fn test_literal() {
        assert_eq!(read(b"{5}\r\nhello").unwrap(), Field::from("hello"));
        assert_eq!(read(b"{5+}\r\nhello").unwrap(), Field::from("hello"));
    }

    #[test]
    fn test_literal_in_list() {
        let field = read(b"(\"a\" {3}\r\nb c NIL)").unwrap();
        assert_eq!(
            field,
            Field::List(vec![Field::from("a"), Field::from("b c"), Field::Nil])
        );
    }

    #[test]
    fn test_incomplete_literal() {
        assert!(matches!(read(b"{10}\r\nshort"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_nested_lists() {
        let field = read(b"((\"TEXT\" \"PLAIN\") \"MIXED\")").unwrap();
        assert_eq!(
            field,
            Field::List(vec![
                Field::List(vec![Field::from("TEXT"), Field::from("PLAIN")]),
                Field::from("MIXED"),
            ])
        );
    }

    #[test]
    fn test_empty_list_and_whitespace() {
        assert_eq!(read(b"  ( )\r\n").unwrap(), Field::List(vec![]));
    }

    #[test]
    fn test_unbalanced() {
        assert!(read(b"(\"a\"").is_err());
        assert!(read(b")").is_err());
        assert!(read(b"(a))").is_err());
    }

    #[test]
    fn test_empty_input() {
        let err = read(b"").unwrap_err();
        assert!(err.to_string().contains("EOF"));
    }

    #[test]
    fn test_number_too_large() {
        assert!(read(b"99999999999").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let err = Reader::new(b"(((1)))").with_max_depth(2).read_field();
        assert_eq!(err, Err(Error::NestingTooDeep { limit: 2 }));

        assert!(Reader::new(b"((1))").with_max_depth(2).read_field().is_ok());
    }

    #[test]
    fn test_error_position() {
        let mut reader = Reader::new(b"(a \"b)");
        match reader.read_field() {
            Err(Error::Parse { position, .. }) => assert_eq!(position, 6),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_is_atom_char() {
        assert!(is_atom_char(b'A'));
        assert!(is_atom_char(b'0'));
        assert!(is_atom_char(b'\\'));
        assert!(is_atom_char(b'['));
        assert!(!is_atom_char(b' '));
        assert!(!is_atom_char(b'('));
        assert!(!is_atom_char(b')'));
        assert!(!is_atom_char(b'{'));
        assert!(!is_atom_char(b'"'));
        assert!(!is_atom_char(b'%'));
        assert!(!is_atom_char(b'*'));
    }
}
