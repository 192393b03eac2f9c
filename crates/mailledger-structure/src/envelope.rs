//! Envelope and address decoding.
//!
//! ```text
//! envelope = "(" date SP subject SP from SP sender SP reply-to SP to SP
//!            cc SP bcc SP in-reply-to SP message-id ")"
//! address  = "(" addr-name SP addr-adl SP addr-mailbox SP addr-host ")"
//! ```

use chrono::{DateTime, FixedOffset};

use crate::date::parse_date;
use crate::field::Field;

/// Email address from an envelope.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    /// Display name.
    pub name: String,
    /// Source route (obsolete).
    pub adl: String,
    /// Mailbox name (local part).
    pub mailbox: String,
    /// Host name (domain part).
    pub host: String,
    /// `mailbox@host`, present only when both parts are non-empty.
    pub address: Option<String>,
}

/// Message envelope.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Parsed `Date:` header. `None` if no known layout matched.
    pub date: Option<DateTime<FixedOffset>>,
    /// `Date:` header exactly as the server sent it.
    pub date_string: String,
    /// Subject header (encoded words are left as is).
    pub subject: String,
    /// From addresses.
    pub from: Vec<Address>,
    /// Sender addresses.
    pub sender: Vec<Address>,
    /// Reply-To addresses.
    pub reply_to: Vec<Address>,
    /// To addresses.
    pub to: Vec<Address>,
    /// Cc addresses.
    pub cc: Vec<Address>,
    /// Bcc addresses.
    pub bcc: Vec<Address>,
    /// In-Reply-To header.
    pub in_reply_to: String,
    /// Message-ID header.
    pub message_id: String,
}

/// Decodes a single address structure.
///
/// Anything but a list of at least four elements yields an empty address.
#[must_use]
pub fn decode_address(field: &Field) -> Address {
    let [name, adl, mailbox, host, ..] = field.as_list() else {
        tracing::trace!(?field, "short address structure");
        return Address::default();
    };

    let mailbox = mailbox.as_str();
    let host = host.as_str();
    let address = (!mailbox.is_empty() && !host.is_empty()).then(|| format!("{mailbox}@{host}"));

    Address {
        name: name.as_str().to_string(),
        adl: adl.as_str().to_string(),
        mailbox: mailbox.to_string(),
        host: host.to_string(),
        address,
    }
}

/// Decodes an envelope structure.
///
/// Returns `None` unless the field is a list of at least ten elements.
/// Individual fields that have the wrong shape decode as empty values.
#[must_use]
pub fn decode_envelope(field: &Field) -> Option<Envelope> {
    let list = field.as_list();
    if list.len() < 10 {
        tracing::trace!(len = list.len(), "short envelope structure");
        return None;
    }

    let date_string = list[0].as_str().to_string();
    let date = parse_date(&date_string);
    if date.is_none() && !date_string.is_empty() {
        tracing::debug!(date = %date_string, "unrecognized envelope date");
    }

    Some(Envelope {
        date,
        date_string,
        subject: list[1].as_str().to_string(),
        from: decode_address_list(&list[2]),
        sender: decode_address_list(&list[3]),
        reply_to: decode_address_list(&list[4]),
        to: decode_address_list(&list[5]),
        cc: decode_address_list(&list[6]),
        bcc: decode_address_list(&list[7]),
        in_reply_to: list[8].as_str().to_string(),
        message_id: list[9].as_str().to_string(),
    })
}

/// Decodes an address list, skipping elements that are not lists.
fn decode_address_list(field: &Field) -> Vec<Address> {
    field
        .as_list()
        .iter()
        .filter(|f| f.is_list())
        .map(decode_address)
        .collect()
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

    fn addr(name: Option<&str>, mailbox: &str, host: &str) -> Field {
        Field::List(vec![
            name.into(),
            Field::Nil,
            mailbox.into(),
            host.into(),
        ])
    }

    mod address_tests {
        use super::*;

        #[test]
        fn full_address() {
            let address = decode_address(&addr(Some("John Doe"), "john", "example.com"));
            assert_eq!(address.name, "John Doe");
            assert_eq!(address.adl, "");
            assert_eq!(address.mailbox, "john");
            assert_eq!(address.host, "example.com");
            assert_eq!(address.address.as_deref(), Some("john@example.com"));
        }

        #[test]
        fn missing_host_has_no_address() {
            let field = Field::List(vec![Field::Nil, Field::Nil, "john".into(), Field::Nil]);
            let address = decode_address(&field);
            assert_eq!(address.mailbox, "john");
            assert_eq!(address.address, None);
        }

        #[test]
        fn short_list_is_empty() {
            let field = Field::List(vec!["a".into(), "b".into(), "c".into()]);
            assert_eq!(decode_address(&field), Address::default());
            assert_eq!(decode_address(&Field::Nil), Address::default());
            assert_eq!(decode_address(&Field::List(vec![])), Address::default());
        }

        #[test]
        fn extra_elements_ignored() {
            let field = Field::List(vec![
                Field::Nil,
                Field::Nil,
                "a".into(),
                "b.org".into(),
                "extra".into(),
            ]);
            assert_eq!(decode_address(&field).address.as_deref(), Some("a@b.org"));
        }
    }

    mod envelope_tests {
        use super::*;

        fn envelope_fields(date: &str) -> Vec<Field> {
            vec![
                date.into(),
                "Test Subject".into(),
                Field::List(vec![addr(Some("Sender"), "sender", "example.com")]),
                Field::List(vec![addr(Some("Sender"), "sender", "example.com")]),
                Field::Nil,
                Field::List(vec![
                    addr(None, "a", "example.org"),
                    addr(None, "b", "example.org"),
                ]),
                Field::Nil,
                Field::Nil,
                Field::Nil,
                "<msg@example.com>".into(),
            ]
        }

        #[test]
        fn all_fields() {
            let field = Field::List(envelope_fields("Mon, 1 Jan 2024 12:00:00 +0000"));
            let env = decode_envelope(&field).unwrap();

            assert_eq!(env.date_string, "Mon, 1 Jan 2024 12:00:00 +0000");
            assert_eq!(
                env.date.unwrap().to_rfc3339(),
                "2024-01-01T12:00:00+00:00"
            );
            assert_eq!(env.subject, "Test Subject");
            assert_eq!(env.from.len(), 1);
            assert_eq!(env.from[0].address.as_deref(), Some("sender@example.com"));
            assert_eq!(env.sender.len(), 1);
            assert!(env.reply_to.is_empty());
            assert_eq!(env.to.len(), 2);
            assert_eq!(env.to[1].mailbox, "b");
            assert!(env.cc.is_empty());
            assert!(env.bcc.is_empty());
            assert_eq!(env.in_reply_to, "");
            assert_eq!(env.message_id, "<msg@example.com>");
        }

        #[test]
        fn unparseable_date_keeps_raw_string() {
            let field = Field::List(envelope_fields("sometime last week"));
            let env = decode_envelope(&field).unwrap();
            assert!(env.date.is_none());
            assert_eq!(env.date_string, "sometime last week");
            assert_eq!(env.subject, "Test Subject");
            assert_eq!(env.to.len(), 2);
        }

        #[test]
        fn short_envelope_is_none() {
            let mut fields = envelope_fields("");
            fields.pop();
            assert!(decode_envelope(&Field::List(fields)).is_none());
            assert!(decode_envelope(&Field::List(vec![])).is_none());
            assert!(decode_envelope(&Field::Nil).is_none());
        }

        #[test]
        fn malformed_address_lists_degrade() {
            let mut fields = envelope_fields("");
            fields[2] = "not a list".into();
            fields[5] = Field::List(vec!["junk".into(), addr(None, "a", "b.org")]);
            let env = decode_envelope(&Field::List(fields)).unwrap();
            assert!(env.from.is_empty());
            assert_eq!(env.to.len(), 1);
            assert_eq!(env.to[0].address.as_deref(), Some("a@b.org"));
        }

        #[test]
        fn short_address_in_list_is_kept_empty() {
            let mut fields = envelope_fields("");
            fields[6] = Field::List(vec![Field::List(vec!["x".into()])]);
            let env = decode_envelope(&Field::List(fields)).unwrap();
            assert_eq!(env.cc, vec![Address::default()]);
        }
    }
}
