//! End-to-end tests for decoding server responses.
//!
//! Each test reads the textual IMAP value with the field reader and decodes
//! it through the public API.

use mailledger_structure::{
    Decoder, DecoderConfig, Field, MessagePart, PartType, decode_body_structure, decode_envelope,
};

fn field(text: &str) -> Field {
    text.parse().unwrap()
}

fn multipart(text: &str) -> mailledger_structure::Multipart {
    match decode_body_structure(&field(text)) {
        Some(MessagePart::Multipart(mp)) => mp,
        other => panic!("Expected multipart, got {other:?}"),
    }
}

#[test]
fn test_rfc3501_bodystructure() {
    let mp = multipart(
        r#"(("TEXT" "PLAIN" ("CHARSET" "US-ASCII") NIL NIL "7BIT" 1152 23)("TEXT" "PLAIN" ("CHARSET" "US-ASCII" "NAME" "cc.diff") "<960723163407.20117h@cac.washington.edu>" "Compiler diff" "BASE64" 4554 73) "MIXED")"#,
    );

    assert_eq!(mp.subtype, "MIXED");
    assert_eq!(mp.section(), "TEXT");
    assert_eq!(mp.parts.len(), 2);

    let first = mp.parts[0].as_body().unwrap();
    assert_eq!(first.section(), "1");
    assert_eq!(first.params.get("charset"), Some("US-ASCII"));
    assert_eq!(first.size, 1152);
    assert_eq!(first.line_count, Some(23));

    let second = mp.parts[1].as_body().unwrap();
    assert_eq!(second.section(), "2");
    assert_eq!(second.id, "<960723163407.20117h@cac.washington.edu>");
    assert_eq!(second.description, "Compiler diff");
    assert_eq!(second.encoding, "BASE64");
    assert_eq!(second.filename(), Some("cc.diff"));
    assert_eq!(second.line_count, Some(73));
    assert!(mp.attachments(true).is_empty());
}

#[test]
fn test_two_text_parts() {
    let mp = multipart(
        r#"(("TEXT" "PLAIN" () NIL NIL "7BIT" 100 2)("TEXT" "HTML" () NIL NIL "7BIT" 200 5) "MIXED")"#,
    );

    assert_eq!(mp.subtype, "MIXED");
    assert_eq!(mp.section(), "TEXT");
    let sections: Vec<&str> = mp.parts.iter().map(MessagePart::section).collect();
    assert_eq!(sections, vec!["1", "2"]);
    let lines: Vec<Option<u32>> = mp
        .parts
        .iter()
        .map(|p| p.as_body().unwrap().line_count)
        .collect();
    assert_eq!(lines, vec![Some(2), Some(5)]);
}

#[test]
fn test_mixed_with_alternative_and_attachments() {
    let text = r#"((("TEXT" "PLAIN" ("CHARSET" "UTF-8") NIL NIL "7BIT" 10 1 NIL NIL NIL NIL)("TEXT" "HTML" ("CHARSET" "UTF-8") NIL NIL "7BIT" 20 1 NIL NIL NIL NIL) "ALTERNATIVE" ("BOUNDARY" "b2") NIL NIL NIL)("APPLICATION" "PDF" ("NAME" "invoice.pdf") NIL NIL "BASE64" 30000 NIL ("ATTACHMENT" ("FILENAME" "invoice.pdf")) NIL NIL)("IMAGE" "PNG" ("NAME" "logo.png") "<logo@x>" NIL "BASE64" 1000 NIL ("INLINE" ("FILENAME" "logo.png")) NIL NIL) "MIXED" ("BOUNDARY" "b1") NIL NIL NIL)"#;
    let root = decode_body_structure(&field(text)).unwrap();

    let sections: Vec<&str> = root.walk().iter().map(|p| p.section()).collect();
    assert_eq!(sections, vec!["TEXT", "1.TEXT", "1.1", "1.2", "2", "3"]);

    let mp = root.as_multipart().unwrap();
    assert_eq!(mp.params.as_ref().unwrap().get("boundary"), Some("b1"));
    assert!(mp.disposition.is_none());
    assert!(mp.language.is_none());
    assert!(mp.location.is_none());

    let alternative = root.find("1.TEXT").unwrap().as_multipart().unwrap();
    assert_eq!(alternative.subtype, "ALTERNATIVE");
    assert_eq!(
        alternative.params.as_ref().unwrap().get("boundary"),
        Some("b2")
    );

    let html = root.find("1.2").unwrap().as_body().unwrap();
    assert_eq!(html.mime_type(), "text/html");

    let attachments = mp.attachments(false);
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].section(), "2");
    assert_eq!(attachments[0].filename(), Some("invoice.pdf"));

    let logo = root.find("3").unwrap().as_body().unwrap();
    assert!(!logo.is_attachment());
    assert_eq!(logo.id, "<logo@x>");
}

#[test]
fn test_nested_attachments_need_recursion() {
    let mp = multipart(
        r#"(("TEXT" "PLAIN" NIL NIL NIL "7BIT" 1 1)(("TEXT" "PLAIN" NIL NIL NIL "7BIT" 1 1)("APPLICATION" "ZIP" NIL NIL NIL "BASE64" 99 NIL ("attachment" ("filename" "a.zip")) NIL NIL) "MIXED")("TEXT" "CSV" NIL NIL NIL "BASE64" 5 1 NIL ("Attachment" ("filename" "b.csv"))) "MIXED")"#,
    );

    assert_eq!(mp.attachments(false).len(), 1);
    assert_eq!(mp.attachments(false)[0].section(), "3");

    let all: Vec<&str> = mp
        .attachments(true)
        .iter()
        .map(|p| p.section())
        .collect();
    assert_eq!(all, vec!["2.2", "3"]);
}

#[test]
fn test_forwarded_message() {
    let text = r#"(("TEXT" "PLAIN" ("CHARSET" "UTF-8") NIL NIL "7BIT" 12 1)("MESSAGE" "RFC822" NIL NIL NIL "7BIT" 600 ("Tue, 3 Jan 2006 10:00:00 +0100" "Original" (("Alice" NIL "alice" "example.com")) NIL NIL (("Bob" NIL "bob" "example.org")) NIL NIL NIL "<orig@example.com>") (("TEXT" "PLAIN" NIL NIL NIL "7BIT" 5 1)("TEXT" "HTML" NIL NIL NIL "7BIT" 9 1) "ALTERNATIVE") 30 NIL ("ATTACHMENT" NIL) NIL NIL) "MIXED")"#;
    let mp = multipart(text);

    let message = mp.parts[1].as_body().unwrap();
    assert_eq!(message.mime_type(), "message/rfc822");
    assert_eq!(message.line_count, Some(30));
    assert!(message.is_attachment());

    let env = message.envelope.as_ref().unwrap();
    assert_eq!(env.subject, "Original");
    assert_eq!(env.from[0].address.as_deref(), Some("alice@example.com"));
    assert_eq!(env.to[0].name, "Bob");
    assert_eq!(
        env.date.unwrap().to_rfc3339(),
        "2006-01-03T10:00:00+01:00"
    );

    let inner = message.body_structure.as_ref().unwrap();
    assert_eq!(inner.part_type(), PartType::Multipart);
    let inner_sections: Vec<&str> = inner.walk().iter().map(|p| p.section()).collect();
    assert_eq!(inner_sections, vec!["TEXT", "1", "2"]);

    // Parts of the embedded message are not attachments of the outer one.
    assert_eq!(mp.attachments(true).len(), 1);
}

#[test]
fn test_single_part_message() {
    let part = decode_body_structure(&field(
        r#"("TEXT" "PLAIN" ("CHARSET" "ISO-8859-1" "FORMAT" "flowed") NIL NIL "QUOTED-PRINTABLE" 3028 92 NIL NIL "en" NIL)"#,
    ))
    .unwrap();

    assert_eq!(part.part_type(), PartType::Body);
    assert_eq!(part.section(), "1");

    let body = part.as_body().unwrap();
    assert_eq!(body.params.get("format"), Some("flowed"));
    assert_eq!(body.language, Some(vec!["en".to_string()]));
    assert!(body.location.is_none());
}

#[test]
fn test_literal_values() {
    let part = decode_body_structure(&field(
        "(\"TEXT\" \"PLAIN\" NIL NIL {13}\r\nA description \"8BIT\" 10 1)",
    ))
    .unwrap();
    assert_eq!(part.as_body().unwrap().description, "A description");
}

#[test]
fn test_rfc3501_envelope() {
    let env = decode_envelope(&field(
        r#"("Wed, 17 Jul 1996 02:23:25 -0700 (PDT)" "IMAP4rev1 WG mtg summary and minutes" (("Terry Gray" NIL "gray" "cac.washington.edu")) (("Terry Gray" NIL "gray" "cac.washington.edu")) (("Terry Gray" NIL "gray" "cac.washington.edu")) ((NIL NIL "imap" "cac.washington.edu")) ((NIL NIL "minutes" "CNRI.Reston.VA.US")("John Klensin" NIL "KLENSIN" "MIT.EDU")) NIL NIL "<B27397-0100000@cac.washington.edu>")"#,
    ))
    .unwrap();

    assert_eq!(env.date_string, "Wed, 17 Jul 1996 02:23:25 -0700 (PDT)");
    assert_eq!(
        env.date.unwrap().to_rfc3339(),
        "1996-07-17T02:23:25-07:00"
    );
    assert_eq!(env.subject, "IMAP4rev1 WG mtg summary and minutes");
    assert_eq!(env.from.len(), 1);
    assert_eq!(env.from[0].name, "Terry Gray");
    assert_eq!(env.from[0].address.as_deref(), Some("gray@cac.washington.edu"));
    assert_eq!(env.sender, env.from);
    assert_eq!(env.reply_to, env.from);
    assert_eq!(env.to[0].address.as_deref(), Some("imap@cac.washington.edu"));
    assert_eq!(env.cc.len(), 2);
    assert_eq!(env.cc[1].name, "John Klensin");
    assert!(env.bcc.is_empty());
    assert_eq!(env.in_reply_to, "");
    assert_eq!(env.message_id, "<B27397-0100000@cac.washington.edu>");
}

#[test]
fn test_envelope_with_bad_date() {
    let env = decode_envelope(&field(
        r#"("31/12/2020" "Hi" NIL NIL NIL NIL NIL NIL NIL NIL)"#,
    ))
    .unwrap();
    assert!(env.date.is_none());
    assert_eq!(env.date_string, "31/12/2020");
    assert_eq!(env.subject, "Hi");
}

#[test]
fn test_empty_list_decodes_to_nothing() {
    let empty = field("()");
    assert!(decode_envelope(&empty).is_none());
    assert!(decode_body_structure(&empty).is_none());
    assert_eq!(
        mailledger_structure::decode_address(&empty),
        mailledger_structure::Address::default()
    );
}

#[test]
fn test_custom_depth_limit() {
    let text = r#"(((("TEXT" "PLAIN" NIL NIL NIL "7BIT" 1 1) "MIXED") "MIXED") "MIXED")"#;

    let shallow = Decoder::new(DecoderConfig::builder().max_depth(1).build());
    let root = shallow.body_structure(&field(text)).unwrap();
    let sections: Vec<&str> = root.walk().iter().map(|p| p.section()).collect();
    assert_eq!(sections, vec!["TEXT", "1.TEXT"]);

    let root = decode_body_structure(&field(text)).unwrap();
    assert!(root.find("1.1.1").is_some());
}

#[test]
fn test_multipart_extension_data_stops_at_language() {
    let mp = multipart(
        r#"(("TEXT" "PLAIN" NIL NIL NIL "7BIT" 1 1) "MIXED" ("BOUNDARY" "x") NIL NIL "http://loc/")"#,
    );

    assert_eq!(mp.params.as_ref().unwrap().get("boundary"), Some("x"));
    assert!(mp.disposition.is_none());
    assert!(mp.language.is_none());
    assert!(mp.location.is_none());
}

#[test]
fn test_text_line_count_without_extension_data() {
    let root =
        decode_body_structure(&field(r#"("TEXT" "PLAIN" NIL NIL NIL "7BIT" 30 3)"#)).unwrap();
    assert_eq!(root.as_body().unwrap().line_count, Some(3));
}

#[test]
fn test_disposition_with_nil_attributes() {
    let root = decode_body_structure(&field(
        r#"("IMAGE" "PNG" NIL NIL NIL "BASE64" 30 NIL ("INLINE" NIL))"#,
    ))
    .unwrap();
    let disposition = root.as_body().unwrap().disposition.as_ref().unwrap();
    assert_eq!(disposition.kind, "INLINE");
    assert!(disposition.attributes.is_empty());
}
