//! # mailledger-structure
//!
//! Decodes the `ENVELOPE` and `BODYSTRUCTURE` items of an IMAP `FETCH`
//! response (RFC 3501 §7.4.2) into typed envelopes, addresses and a
//! recursive MIME part tree.
//!
//! The input is a [`Field`] tree: the generic, already tokenized form of a
//! parenthesized IMAP value. The decoder is deliberately lenient. Malformed
//! fields degrade to empty values, and only a structurally unusable top-level
//! value yields `None`. Nothing in this crate performs I/O or keeps state
//! between calls.
//!
//! ## Features
//!
//! - **Envelope decoding** with a best-effort, multi-layout date parser
//! - **Body structure decoding** with RFC 3501 section numbering, ready to be
//!   used in `FETCH BODY[section]`
//! - **Extension data** (disposition and language on both body parts and
//!   multiparts, plus MD5 and location on body parts)
//! - **Attachment extraction** over the decoded part tree
//! - **Field reader** for turning raw IMAP text into a [`Field`] tree
//!
//! ## Quick Start
//!
//! ```
//! use mailledger_structure::{Field, MessagePart, decode_body_structure};
//!
//! let field: Field = r#"(("TEXT" "PLAIN" ("CHARSET" "US-ASCII") NIL NIL "7BIT" 1152 23)
//!     ("APPLICATION" "PDF" ("NAME" "report.pdf") NIL NIL "BASE64" 4554 NIL
//!      ("ATTACHMENT" ("FILENAME" "report.pdf")) NIL) "MIXED")"#
//!     .parse()
//!     .unwrap();
//!
//! let Some(MessagePart::Multipart(root)) = decode_body_structure(&field) else {
//!     panic!("expected a multipart");
//! };
//!
//! assert_eq!(root.subtype, "MIXED");
//! assert_eq!(root.section(), "TEXT");
//!
//! let attachments = root.attachments(true);
//! assert_eq!(attachments.len(), 1);
//! assert_eq!(attachments[0].section(), "2");
//! assert_eq!(attachments[0].filename(), Some("report.pdf"));
//! ```
//!
//! ## Modules
//!
//! - [`field`]: The generic field tree and its reader
//! - [`envelope`]: Addresses, envelopes and envelope dates
//! - [`extension`]: Parameter lists, dispositions and languages
//! - [`body`]: Body parts, multiparts and attachment extraction

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod body;
mod config;
mod date;
mod decoder;
pub mod envelope;
mod error;
pub mod extension;
pub mod field;

pub use body::{BodyPart, MessagePart, Multipart, PartType};
pub use config::{DecoderConfig, DecoderConfigBuilder};
pub use date::parse_date;
pub use decoder::{Decoder, decode_body_structure};
pub use envelope::{Address, Envelope, decode_address, decode_envelope};
pub use error::{Error, Result};
pub use extension::{
    Disposition, Params, decode_attribute_pairs, decode_disposition, decode_language,
};
pub use field::Field;
