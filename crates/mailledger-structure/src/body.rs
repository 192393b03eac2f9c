//! Body structure types.
//!
//! A decoded `BODYSTRUCTURE` is a tree of [`MessagePart`]s. Leaves are
//! [`BodyPart`]s; inner nodes are [`Multipart`]s that own their children.
//! Every part carries the section address to use in `FETCH BODY[section]`.
//!
//! ```text
//! MIXED              TEXT
//! ├── text/plain     1
//! ├── ALTERNATIVE    2.TEXT
//! │   ├── text/plain 2.1
//! │   └── text/html  2.2
//! └── image/png      3
//! ```

use crate::envelope::Envelope;
use crate::extension::{Disposition, Params};

/// Kind of a message part.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    /// Single, non-multipart body.
    Body,
    /// Multipart container.
    Multipart,
}

/// A node of a decoded body structure.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    /// Single body part.
    Body(BodyPart),
    /// Multipart container.
    Multipart(Multipart),
}

impl MessagePart {
    /// Returns the kind of this part.
    #[must_use]
    pub const fn part_type(&self) -> PartType {
        match self {
            Self::Body(_) => PartType::Body,
            Self::Multipart(_) => PartType::Multipart,
        }
    }

    /// Returns the section address of this part.
    #[must_use]
    pub fn section(&self) -> &str {
        match self {
            Self::Body(part) => part.section(),
            Self::Multipart(part) => part.section(),
        }
    }

    /// Returns the body part, if this is one.
    #[must_use]
    pub const fn as_body(&self) -> Option<&BodyPart> {
        match self {
            Self::Body(part) => Some(part),
            Self::Multipart(_) => None,
        }
    }

    /// Returns the multipart, if this is one.
    #[must_use]
    pub const fn as_multipart(&self) -> Option<&Multipart> {
        match self {
            Self::Multipart(part) => Some(part),
            Self::Body(_) => None,
        }
    }

    /// Returns this part and all its descendants in document order.
    ///
    /// Structures of embedded `message/rfc822` parts are not entered; their
    /// sections are relative to the embedded message.
    #[must_use]
    pub fn walk(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a Self>) {
        out.push(self);
        if let Self::Multipart(mp) = self {
            for part in &mp.parts {
                part.collect_into(out);
            }
        }
    }

    /// Finds the part with the given section address.
    #[must_use]
    pub fn find(&self, section: &str) -> Option<&Self> {
        self.walk().into_iter().find(|part| part.section() == section)
    }
}

/// A single, non-multipart body part.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BodyPart {
    /// MIME type, e.g. `TEXT`.
    pub media_type: String,
    /// MIME subtype, e.g. `PLAIN`.
    pub subtype: String,
    /// Content-Type parameters.
    pub params: Params,
    /// Content-ID.
    pub id: String,
    /// Content-Description.
    pub description: String,
    /// Content-Transfer-Encoding.
    pub encoding: String,
    /// Body size in octets, in its transfer encoding.
    pub size: u32,
    /// Size in lines, for `text/*` and `message/rfc822` parts.
    pub line_count: Option<u32>,
    /// Envelope of an embedded `message/rfc822`.
    pub envelope: Option<Box<Envelope>>,
    /// Body structure of an embedded `message/rfc822`.
    ///
    /// Sections inside it are numbered relative to the embedded message.
    pub body_structure: Option<Box<MessagePart>>,
    /// Content-MD5.
    pub md5: Option<String>,
    /// Content-Disposition.
    pub disposition: Option<Disposition>,
    /// Content-Language tags.
    pub language: Option<Vec<String>>,
    /// Content-Location.
    pub location: Option<String>,
    pub(crate) section: String,
}

impl BodyPart {
    /// Returns the section address, e.g. `1.2`.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Returns the lowercased `type/subtype`.
    #[must_use]
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.media_type, self.subtype).to_ascii_lowercase()
    }

    /// Returns true if the disposition type is `attachment`.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.disposition
            .as_ref()
            .is_some_and(Disposition::is_attachment)
    }

    /// Returns the file name from the disposition, falling back to the
    /// `name` content-type parameter.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.disposition
            .as_ref()
            .and_then(|d| d.attributes.get("filename"))
            .or_else(|| self.params.get("name"))
    }
}

/// A multipart container.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Multipart {
    /// Multipart subtype, e.g. `MIXED`.
    pub subtype: String,
    /// Child parts in document order.
    pub parts: Vec<MessagePart>,
    /// Content-Type parameters.
    pub params: Option<Params>,
    /// Content-Disposition.
    pub disposition: Option<Disposition>,
    /// Content-Language tags.
    pub language: Option<Vec<String>>,
    /// Content-Location. Multipart extension data stops at language, so
    /// decoding leaves this unset.
    pub location: Option<String>,
    pub(crate) section: String,
}

impl Multipart {
    /// Returns the section address of the multipart text, e.g. `2.TEXT`.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Collects the body parts whose disposition is `attachment`.
    ///
    /// Only direct children are considered unless `recurse` is set, in which
    /// case nested multiparts are searched too. Results are in document
    /// order.
    #[must_use]
    pub fn attachments(&self, recurse: bool) -> Vec<&BodyPart> {
        let mut out = Vec::new();
        self.collect_attachments(recurse, &mut out);
        out
    }

    fn collect_attachments<'a>(&'a self, recurse: bool, out: &mut Vec<&'a BodyPart>) {
        for part in &self.parts {
            match part {
                MessagePart::Body(body) if body.is_attachment() => out.push(body),
                MessagePart::Body(_) => {}
                MessagePart::Multipart(mp) if recurse => mp.collect_attachments(true, out),
                MessagePart::Multipart(_) => {}
            }
        }
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

    fn part(section: &str, disposition: Option<&str>) -> MessagePart {
        MessagePart::Body(BodyPart {
            media_type: "APPLICATION".to_string(),
            subtype: "PDF".to_string(),
            disposition: disposition.map(|kind| Disposition {
                kind: kind.to_string(),
                attributes: [("filename", format!("{section}.pdf"))]
                    .into_iter()
                    .collect(),
            }),
            section: section.to_string(),
            ..BodyPart::default()
        })
    }

    fn multipart(section: &str, parts: Vec<MessagePart>) -> MessagePart {
        MessagePart::Multipart(Multipart {
            subtype: "MIXED".to_string(),
            parts,
            section: section.to_string(),
            ..Multipart::default()
        })
    }

    fn tree() -> MessagePart {
        multipart(
            "TEXT",
            vec![
                part("1", None),
                part("2", Some("ATTACHMENT")),
                multipart(
                    "3.TEXT",
                    vec![part("3.1", Some("inline")), part("3.2", Some("attachment"))],
                ),
                part("4", Some("Attachment")),
            ],
        )
    }

    fn sections(parts: &[&BodyPart]) -> Vec<String> {
        parts.iter().map(|p| p.section().to_string()).collect()
    }

    #[test]
    fn attachments_direct_children_only() {
        let root = tree();
        let mp = root.as_multipart().unwrap();
        assert_eq!(sections(&mp.attachments(false)), vec!["2", "4"]);
    }

    #[test]
    fn attachments_recursive_in_document_order() {
        let root = tree();
        let mp = root.as_multipart().unwrap();
        assert_eq!(sections(&mp.attachments(true)), vec!["2", "3.2", "4"]);
    }

    #[test]
    fn attachments_empty() {
        let mp = Multipart::default();
        assert!(mp.attachments(true).is_empty());
    }

    #[test]
    fn part_type_and_section() {
        let root = tree();
        assert_eq!(root.part_type(), PartType::Multipart);
        assert_eq!(root.section(), "TEXT");

        let leaf = part("1", None);
        assert_eq!(leaf.part_type(), PartType::Body);
        assert_eq!(leaf.section(), "1");
        assert!(leaf.as_multipart().is_none());
    }

    #[test]
    fn walk_in_document_order() {
        let root = tree();
        let walked: Vec<&str> = root.walk().iter().map(|p| p.section()).collect();
        assert_eq!(walked, vec!["TEXT", "1", "2", "3.TEXT", "3.1", "3.2", "4"]);
    }

    #[test]
    fn find_by_section() {
        let root = tree();
        let found = root.find("3.2").unwrap().as_body().unwrap();
        assert_eq!(found.filename(), Some("3.2.pdf"));
        assert_eq!(root.find("3.TEXT").unwrap().part_type(), PartType::Multipart);
        assert!(root.find("5").is_none());
    }

    #[test]
    fn body_part_helpers() {
        let body = BodyPart {
            media_type: "TEXT".to_string(),
            subtype: "HTML".to_string(),
            params: [("NAME", "page.html")].into_iter().collect(),
            ..BodyPart::default()
        };
        assert_eq!(body.mime_type(), "text/html");
        assert!(!body.is_attachment());
        assert_eq!(body.filename(), Some("page.html"));
    }
}
