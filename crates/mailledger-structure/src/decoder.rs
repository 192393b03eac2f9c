//! Body structure decoding.
//!
//! ```text
//! body           = "(" (body-type-1part / body-type-mpart) ")"
//! body-type-mpart = 1*body SP media-subtype [SP body-ext-mpart]
//! body-type-1part = (body-type-basic / body-type-msg / body-type-text)
//!                   [SP body-ext-1part]
//! ```
//!
//! A multipart is told apart from a single part by shape alone: its first
//! element is itself a list. Extension data is an ordered tail that servers
//! may cut off at any point, so it is decoded field by field until the input
//! runs out.

use crate::body::{BodyPart, MessagePart, Multipart};
use crate::config::DecoderConfig;
use crate::envelope::{self, Address, Envelope};
use crate::extension::{decode_attribute_pairs, decode_disposition, decode_language};
use crate::field::Field;

/// Named decoder for one extension position.
type Extension<T> = (&'static str, fn(&mut T, &Field));

/// `body-ext-1part`: MD5, disposition, language, location.
const BODY_EXTENSIONS: [Extension<BodyPart>; 4] = [
    ("md5", body_md5),
    ("disposition", body_disposition),
    ("language", body_language),
    ("location", body_location),
];

/// `body-ext-mpart`: parameters, disposition, language.
///
/// Location and later positions are skipped.
const MULTIPART_EXTENSIONS: [Extension<Multipart>; 3] = [
    ("parameters", multipart_params),
    ("disposition", multipart_disposition),
    ("language", multipart_language),
];

fn body_md5(part: &mut BodyPart, field: &Field) {
    part.md5 = field.as_nstring().map(str::to_string);
}

fn body_disposition(part: &mut BodyPart, field: &Field) {
    part.disposition = decode_disposition(field.as_list());
}

fn body_language(part: &mut BodyPart, field: &Field) {
    part.language = decode_language(field);
}

fn body_location(part: &mut BodyPart, field: &Field) {
    part.location = field.as_nstring().map(str::to_string);
}

fn multipart_params(part: &mut Multipart, field: &Field) {
    part.params = field
        .is_list()
        .then(|| decode_attribute_pairs(field.as_list()));
}

fn multipart_disposition(part: &mut Multipart, field: &Field) {
    part.disposition = decode_disposition(field.as_list());
}

fn multipart_language(part: &mut Multipart, field: &Field) {
    part.language = decode_language(field);
}

/// Applies `table` to `tail` position by position.
fn decode_extensions<T>(target: &mut T, tail: &[Field], table: &[Extension<T>]) {
    for (field, &(name, decode)) in tail.iter().zip(table) {
        tracing::trace!(extension = name, ?field, "extension data");
        decode(target, field);
    }

    if tail.len() > table.len() {
        tracing::trace!(
            ignored = tail.len() - table.len(),
            "ignoring unknown extension data"
        );
    }
}

/// Decoder for `ENVELOPE` and `BODYSTRUCTURE` fields.
///
/// The decoder only holds its configuration; every call is independent.
///
/// # Example
///
/// ```
/// use mailledger_structure::{Decoder, DecoderConfig, Field};
///
/// let decoder = Decoder::new(DecoderConfig::builder().max_depth(8).build());
/// let field: Field = r#"("TEXT" "PLAIN" NIL NIL NIL "7BIT" 12 1)"#.parse().unwrap();
///
/// let part = decoder.body_structure(&field).unwrap();
/// assert_eq!(part.section(), "1");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Creates a decoder with the given configuration.
    #[must_use]
    pub const fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes an address structure. See [`decode_address`](crate::decode_address).
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn address(&self, field: &Field) -> Address {
        envelope::decode_address(field)
    }

    /// Decodes an envelope structure. See [`decode_envelope`](crate::decode_envelope).
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn envelope(&self, field: &Field) -> Option<Envelope> {
        envelope::decode_envelope(field)
    }

    /// Decodes a body structure. See [`decode_body_structure`].
    #[must_use]
    pub fn body_structure(&self, field: &Field) -> Option<MessagePart> {
        self.structure(field, 0)
    }

    fn structure(&self, field: &Field, depth: usize) -> Option<MessagePart> {
        let list = field.as_list();
        let Some(first) = list.first() else {
            tracing::trace!(?field, "body structure is not a non-empty list");
            return None;
        };

        if first.is_list() {
            self.multipart(list, "", depth).map(MessagePart::Multipart)
        } else if self.within_limit(depth) {
            self.body_part(list, "1".to_string(), depth)
                .map(MessagePart::Body)
        } else {
            None
        }
    }

    fn within_limit(&self, depth: usize) -> bool {
        if depth > self.config.max_depth {
            tracing::warn!(
                depth,
                max_depth = self.config.max_depth,
                "body structure nested too deeply, truncating"
            );
            return false;
        }
        true
    }

    /// Decodes `1*body SP media-subtype [SP body-ext-mpart]`.
    fn multipart(&self, list: &[Field], prefix: &str, depth: usize) -> Option<Multipart> {
        if !self.within_limit(depth) {
            return None;
        }

        let children_end = list
            .iter()
            .position(|f| !f.is_list())
            .unwrap_or(list.len());
        let (children, rest) = list.split_at(children_end);

        let mut parts = Vec::with_capacity(children.len());
        for (i, child) in children.iter().enumerate() {
            let section = format!("{prefix}{}", i + 1);
            let child = child.as_list();

            let part = if child.first().is_some_and(Field::is_list) {
                self.multipart(child, &format!("{section}."), depth + 1)
                    .map(MessagePart::Multipart)
            } else {
                self.body_part(child, section.clone(), depth)
                    .map(MessagePart::Body)
            };

            match part {
                Some(part) => parts.push(part),
                None => tracing::trace!(%section, "dropping undecodable part"),
            }
        }

        let (subtype, tail) = match rest.split_first() {
            Some((subtype, tail)) => (subtype.as_str().to_string(), tail),
            None => (String::new(), rest),
        };

        let mut multipart = Multipart {
            subtype,
            parts,
            section: format!("{prefix}TEXT"),
            ..Multipart::default()
        };
        decode_extensions(&mut multipart, tail, &MULTIPART_EXTENSIONS);

        Some(multipart)
    }

    /// Decodes `body-type-1part [SP body-ext-1part]`.
    fn body_part(&self, list: &[Field], section: String, depth: usize) -> Option<BodyPart> {
        if list.len() < 7 {
            tracing::trace!(len = list.len(), %section, "short body part");
            return None;
        }

        let mut part = BodyPart {
            media_type: list[0].as_str().to_string(),
            subtype: list[1].as_str().to_string(),
            params: decode_attribute_pairs(list[2].as_list()),
            id: list[3].as_str().to_string(),
            description: list[4].as_str().to_string(),
            encoding: list[5].as_str().to_string(),
            size: list[6].as_number(),
            section,
            ..BodyPart::default()
        };

        let mut next = 7;
        if part.media_type.eq_ignore_ascii_case("text") && list.len() >= 8 {
            part.line_count = Some(list[7].as_number());
            next = 8;
        } else if part.media_type.eq_ignore_ascii_case("message")
            && part.subtype.eq_ignore_ascii_case("rfc822")
            && list.len() >= 10
        {
            part.envelope = envelope::decode_envelope(&list[7]).map(Box::new);
            part.body_structure = self.structure(&list[8], depth + 1).map(Box::new);
            part.line_count = Some(list[9].as_number());
            next = 10;
        }

        decode_extensions(&mut part, &list[next..], &BODY_EXTENSIONS);

        Some(part)
    }
}

/// Decodes a `BODYSTRUCTURE` field with the default configuration.
///
/// Returns `None` unless the field is a non-empty list, or when a single
/// part is too short to be a body.
#[must_use]
pub fn decode_body_structure(field: &Field) -> Option<MessagePart> {
    Decoder::default().body_structure(field)
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
    use crate::body::PartType;

    fn text(subtype: &str, size: u32, lines: u32) -> Field {
        Field::List(vec![
            "TEXT".into(),
            subtype.into(),
            Field::List(vec![]),
            Field::Nil,
            Field::Nil,
            "7BIT".into(),
            size.into(),
            lines.into(),
        ])
    }

    fn list(items: Vec<Field>) -> Field {
        Field::List(items)
    }

    fn body(part: &MessagePart) -> &BodyPart {
        part.as_body().unwrap()
    }

    fn multi(part: &MessagePart) -> &Multipart {
        part.as_multipart().unwrap()
    }

    mod single_part_tests {
        use super::*;

        #[test]
        fn text_part() {
            let part = decode_body_structure(&text("PLAIN", 100, 2)).unwrap();
            assert_eq!(part.part_type(), PartType::Body);
            assert_eq!(part.section(), "1");

            let bp = body(&part);
            assert_eq!(bp.media_type, "TEXT");
            assert_eq!(bp.subtype, "PLAIN");
            assert!(bp.params.is_empty());
            assert_eq!(bp.id, "");
            assert_eq!(bp.encoding, "7BIT");
            assert_eq!(bp.size, 100);
            assert_eq!(bp.line_count, Some(2));
            assert!(bp.md5.is_none());
            assert!(bp.disposition.is_none());
        }

        #[test]
        fn basic_part_has_no_line_count() {
            let field = list(vec![
                "IMAGE".into(),
                "PNG".into(),
                list(vec!["NAME".into(), "a.png".into()]),
                "<img@x>".into(),
                "logo".into(),
                "BASE64".into(),
                Field::Number(4096),
            ]);
            let part = decode_body_structure(&field).unwrap();
            let bp = body(&part);
            assert_eq!(bp.params.get("name"), Some("a.png"));
            assert_eq!(bp.id, "<img@x>");
            assert_eq!(bp.description, "logo");
            assert_eq!(bp.size, 4096);
            assert_eq!(bp.line_count, None);
        }

        #[test]
        fn short_part_is_none() {
            let field = list(vec![
                "TEXT".into(),
                "PLAIN".into(),
                Field::Nil,
                Field::Nil,
                Field::Nil,
                "7BIT".into(),
            ]);
            assert!(decode_body_structure(&field).is_none());
        }

        #[test]
        fn empty_or_non_list_is_none() {
            assert!(decode_body_structure(&list(vec![])).is_none());
            assert!(decode_body_structure(&Field::Nil).is_none());
            assert!(decode_body_structure(&Field::from("TEXT")).is_none());
        }

        #[test]
        fn full_extension_data() {
            let field = list(vec![
                "APPLICATION".into(),
                "PDF".into(),
                Field::Nil,
                Field::Nil,
                Field::Nil,
                "BASE64".into(),
                Field::Number(2048),
                "Q2hlY2s=".into(),
                list(vec![
                    "attachment".into(),
                    list(vec!["filename".into(), "r.pdf".into()]),
                ]),
                list(vec!["en".into(), "fr".into()]),
                "http://example.com/r.pdf".into(),
                "surplus".into(),
            ]);
            let part = decode_body_structure(&field).unwrap();
            let bp = body(&part);
            assert_eq!(bp.md5.as_deref(), Some("Q2hlY2s="));
            assert!(bp.is_attachment());
            assert_eq!(bp.filename(), Some("r.pdf"));
            assert_eq!(
                bp.language,
                Some(vec!["en".to_string(), "fr".to_string()])
            );
            assert_eq!(bp.location.as_deref(), Some("http://example.com/r.pdf"));
        }

        #[test]
        fn partial_extension_data() {
            let mut items = text("PLAIN", 10, 1).as_list().to_vec();
            items.push(Field::Nil);
            items.push(list(vec!["inline".into(), Field::Nil]));
            let part = decode_body_structure(&list(items)).unwrap();
            let bp = body(&part);
            assert_eq!(bp.line_count, Some(1));
            assert!(bp.md5.is_none());
            assert_eq!(bp.disposition.as_ref().unwrap().kind, "inline");
            assert!(bp.language.is_none());
            assert!(bp.location.is_none());
        }

        #[test]
        fn text_type_is_case_insensitive() {
            let mut items = text("plain", 10, 4).as_list().to_vec();
            items[0] = "text".into();
            let part = decode_body_structure(&list(items)).unwrap();
            assert_eq!(body(&part).line_count, Some(4));
        }
    }

    mod message_tests {
        use super::*;

        fn envelope() -> Field {
            list(vec![
                "Mon, 02 Jan 2006 15:04:05 +0000".into(),
                "Forwarded".into(),
                Field::Nil,
                Field::Nil,
                Field::Nil,
                Field::Nil,
                Field::Nil,
                Field::Nil,
                Field::Nil,
                "<inner@example.com>".into(),
            ])
        }

        fn rfc822(inner: Field) -> Field {
            list(vec![
                "MESSAGE".into(),
                "RFC822".into(),
                Field::Nil,
                Field::Nil,
                Field::Nil,
                "7BIT".into(),
                Field::Number(900),
                envelope(),
                inner,
                Field::Number(42),
                "md5sum".into(),
            ])
        }

        #[test]
        fn embedded_message() {
            let inner = list(vec![text("PLAIN", 10, 1), text("HTML", 20, 2), "ALTERNATIVE".into()]);
            let root = list(vec![text("PLAIN", 5, 1), rfc822(inner), "MIXED".into()]);

            let part = decode_body_structure(&root).unwrap();
            let message = body(&multi(&part).parts[1]);

            assert_eq!(message.section(), "2");
            assert_eq!(message.line_count, Some(42));
            assert_eq!(message.md5.as_deref(), Some("md5sum"));

            let env = message.envelope.as_ref().unwrap();
            assert_eq!(env.subject, "Forwarded");
            assert_eq!(env.message_id, "<inner@example.com>");

            let nested = message.body_structure.as_ref().unwrap();
            let nested = multi(nested);
            assert_eq!(nested.subtype, "ALTERNATIVE");
            assert_eq!(nested.section(), "TEXT");
            assert_eq!(nested.parts[0].section(), "1");
            assert_eq!(nested.parts[1].section(), "2");
        }

        #[test]
        fn embedded_single_part_message() {
            let part = decode_body_structure(&rfc822(text("PLAIN", 3, 1))).unwrap();
            let nested = body(&part).body_structure.as_ref().unwrap();
            assert_eq!(nested.section(), "1");
            assert_eq!(body(nested).subtype, "PLAIN");
        }

        #[test]
        fn short_message_skips_specific_fields() {
            let field = list(vec![
                "MESSAGE".into(),
                "RFC822".into(),
                Field::Nil,
                Field::Nil,
                Field::Nil,
                "7BIT".into(),
                Field::Number(900),
                "md5sum".into(),
            ]);
            let part = decode_body_structure(&field).unwrap();
            let bp = body(&part);
            assert!(bp.envelope.is_none());
            assert!(bp.body_structure.is_none());
            assert_eq!(bp.line_count, None);
            assert_eq!(bp.md5.as_deref(), Some("md5sum"));
        }
    }

    mod multipart_tests {
        use super::*;

        #[test]
        fn two_text_parts() {
            let field = list(vec![text("PLAIN", 100, 2), text("HTML", 200, 5), "MIXED".into()]);
            let part = decode_body_structure(&field).unwrap();
            assert_eq!(part.part_type(), PartType::Multipart);

            let mp = multi(&part);
            assert_eq!(mp.subtype, "MIXED");
            assert_eq!(mp.section(), "TEXT");
            assert_eq!(mp.parts.len(), 2);
            assert_eq!(mp.parts[0].section(), "1");
            assert_eq!(mp.parts[1].section(), "2");
            assert_eq!(body(&mp.parts[0]).line_count, Some(2));
            assert_eq!(body(&mp.parts[1]).line_count, Some(5));
            assert!(mp.params.is_none());
        }

        #[test]
        fn nested_sections() {
            let inner = list(vec![text("PLAIN", 1, 1), text("HTML", 1, 1), "ALTERNATIVE".into()]);
            let field = list(vec![text("PLAIN", 1, 1), inner, "MIXED".into()]);
            let part = decode_body_structure(&field).unwrap();

            let mp = multi(&part);
            let nested = multi(&mp.parts[1]);
            assert_eq!(nested.section(), "2.TEXT");
            assert_eq!(nested.parts[0].section(), "2.1");
            assert_eq!(nested.parts[1].section(), "2.2");
        }

        #[test]
        fn extension_data() {
            let field = list(vec![
                text("PLAIN", 1, 1),
                "MIXED".into(),
                list(vec!["BOUNDARY".into(), "xyz".into()]),
                list(vec!["inline".into(), Field::Nil]),
                "en".into(),
                "http://example.com/".into(),
                "surplus".into(),
            ]);
            let part = decode_body_structure(&field).unwrap();
            let mp = multi(&part);
            assert_eq!(mp.params.as_ref().unwrap().get("boundary"), Some("xyz"));
            assert_eq!(mp.disposition.as_ref().unwrap().kind, "inline");
            assert_eq!(mp.language, Some(vec!["en".to_string()]));
            assert!(mp.location.is_none());
        }

        #[test]
        fn nil_params_are_absent() {
            let field = list(vec![text("PLAIN", 1, 1), "MIXED".into(), Field::Nil]);
            let part = decode_body_structure(&field).unwrap();
            assert!(multi(&part).params.is_none());
        }

        #[test]
        fn missing_subtype() {
            let field = list(vec![text("PLAIN", 1, 1), text("HTML", 1, 1)]);
            let part = decode_body_structure(&field).unwrap();
            let mp = multi(&part);
            assert_eq!(mp.subtype, "");
            assert_eq!(mp.parts.len(), 2);
        }

        #[test]
        fn undecodable_children_are_dropped() {
            let field = list(vec![
                list(vec![]),
                list(vec!["TEXT".into()]),
                text("PLAIN", 1, 1),
                "MIXED".into(),
            ]);
            let part = decode_body_structure(&field).unwrap();
            let mp = multi(&part);
            assert_eq!(mp.parts.len(), 1);
            assert_eq!(mp.parts[0].section(), "3");
        }
    }

    mod depth_tests {
        use super::*;

        fn nested(levels: usize) -> Field {
            let mut field = list(vec![text("PLAIN", 1, 1), "MIXED".into()]);
            for _ in 0..levels {
                field = list(vec![field, "MIXED".into()]);
            }
            field
        }

        #[test]
        fn within_limit_is_decoded() {
            let decoder = Decoder::new(DecoderConfig::builder().max_depth(3).build());
            let part = decoder.body_structure(&nested(3)).unwrap();
            let leaf = part.find("1.1.1.1").unwrap();
            assert_eq!(leaf.part_type(), PartType::Body);
        }

        #[test]
        fn beyond_limit_is_truncated() {
            let decoder = Decoder::new(DecoderConfig::builder().max_depth(2).build());
            let part = decoder.body_structure(&nested(3)).unwrap();
            let deepest = multi(part.find("1.1.TEXT").unwrap());
            assert!(deepest.parts.is_empty());
            assert!(part.find("1.1.1.1").is_none());
        }

        #[test]
        fn child_beyond_limit_is_dropped() {
            let decoder = Decoder::new(DecoderConfig::builder().max_depth(0).build());
            assert!(decoder.body_structure(&nested(0)).is_some());
            let part = decoder.body_structure(&nested(1)).unwrap();
            assert!(multi(&part).parts.is_empty());
        }

        fn forwarded(levels: usize) -> Field {
            let mut field = text("PLAIN", 1, 1);
            for _ in 0..levels {
                field = list(vec![
                    "MESSAGE".into(),
                    "RFC822".into(),
                    Field::Nil,
                    Field::Nil,
                    Field::Nil,
                    "7BIT".into(),
                    Field::Number(1),
                    Field::Nil,
                    field,
                    Field::Number(1),
                ]);
            }
            field
        }

        fn message_depth(part: &MessagePart) -> usize {
            body(part)
                .body_structure
                .as_deref()
                .map_or(0, |nested| 1 + message_depth(nested))
        }

        #[test]
        fn forwarded_chain_beyond_limit_is_truncated() {
            let decoder = Decoder::new(DecoderConfig::builder().max_depth(2).build());
            let part = decoder.body_structure(&forwarded(5)).unwrap();
            assert_eq!(message_depth(&part), 2);
        }

        #[test]
        fn forwarded_chain_within_limit_is_decoded() {
            let decoder = Decoder::new(DecoderConfig::builder().max_depth(3).build());
            let part = decoder.body_structure(&forwarded(3)).unwrap();
            assert_eq!(message_depth(&part), 3);
        }

        #[test]
        fn deep_input_does_not_overflow() {
            let part = decode_body_structure(&nested(1_000)).unwrap();
            assert_eq!(part.part_type(), PartType::Multipart);
        }
    }
}
