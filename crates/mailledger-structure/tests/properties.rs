//! Property tests for the body structure decoder.

use std::collections::HashSet;

use mailledger_structure::{Field, MessagePart, decode_body_structure, decode_envelope};
use proptest::prelude::*;

/// Shape of a generated body structure.
#[derive(Debug, Clone)]
enum Shape {
    /// Text part, flagged when it carries an attachment disposition.
    Leaf(bool),
    Multi(Vec<Shape>),
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    any::<bool>().prop_map(Shape::Leaf).prop_recursive(5, 64, 5, |inner| {
        prop::collection::vec(inner, 1..5).prop_map(Shape::Multi)
    })
}

fn to_field(shape: &Shape) -> Field {
    match shape {
        Shape::Leaf(attachment) => {
            let mut list: Vec<Field> = vec![
                "TEXT".into(),
                "PLAIN".into(),
                Field::Nil,
                Field::Nil,
                Field::Nil,
                "7BIT".into(),
                Field::Number(1),
                Field::Number(1),
            ];
            if *attachment {
                list.push(Field::Nil);
                list.push(Field::List(vec!["ATTACHMENT".into(), Field::Nil]));
            }
            Field::List(list)
        }
        Shape::Multi(children) => {
            let mut list: Vec<Field> = children.iter().map(to_field).collect();
            list.push("MIXED".into());
            Field::List(list)
        }
    }
}

/// Section addresses in document order, numbered the RFC 3501 way.
fn expected_sections(shape: &Shape) -> Vec<String> {
    fn children(parts: &[Shape], prefix: &str, out: &mut Vec<String>) {
        for (i, part) in parts.iter().enumerate() {
            let section = format!("{prefix}{}", i + 1);
            match part {
                Shape::Leaf(_) => out.push(section),
                Shape::Multi(nested) => {
                    out.push(format!("{section}.TEXT"));
                    children(nested, &format!("{section}."), out);
                }
            }
        }
    }

    let mut out = Vec::new();
    match shape {
        Shape::Leaf(_) => out.push("1".to_string()),
        Shape::Multi(parts) => {
            out.push("TEXT".to_string());
            children(parts, "", &mut out);
        }
    }
    out
}

/// Number of attachment leaves among the children, or in the whole subtree.
fn attachment_count(parts: &[Shape], recurse: bool) -> usize {
    parts
        .iter()
        .map(|part| match part {
            Shape::Leaf(attachment) => usize::from(*attachment),
            Shape::Multi(nested) if recurse => attachment_count(nested, true),
            Shape::Multi(_) => 0,
        })
        .sum()
}

fn arb_field() -> impl Strategy<Value = Field> {
    let leaf = prop_oneof![
        Just(Field::Nil),
        "[A-Za-z0-9 ]{0,8}".prop_map(Field::Atom),
        any::<u32>().prop_map(Field::Number),
    ];
    leaf.prop_recursive(5, 64, 12, |inner| {
        prop::collection::vec(inner, 0..12).prop_map(Field::List)
    })
}

proptest! {
    #[test]
    fn sections_follow_rfc3501_numbering(shape in arb_shape()) {
        let part = decode_body_structure(&to_field(&shape)).unwrap();
        let actual: Vec<String> = part
            .walk()
            .iter()
            .map(|p| p.section().to_string())
            .collect();

        prop_assert_eq!(&actual, &expected_sections(&shape));

        let unique: HashSet<&String> = actual.iter().collect();
        prop_assert_eq!(unique.len(), actual.len());
    }

    #[test]
    fn every_section_is_findable(shape in arb_shape()) {
        let part = decode_body_structure(&to_field(&shape)).unwrap();
        for node in part.walk() {
            let found = part.find(node.section()).unwrap();
            prop_assert_eq!(found.part_type(), node.part_type());
        }
    }

    #[test]
    fn attachments_match_flagged_leaves(shape in arb_shape()) {
        let part = decode_body_structure(&to_field(&shape)).unwrap();
        if let (MessagePart::Multipart(mp), Shape::Multi(parts)) = (part, &shape) {
            let direct = mp.attachments(false);
            let all = mp.attachments(true);
            prop_assert_eq!(direct.len(), attachment_count(parts, false));
            prop_assert_eq!(all.len(), attachment_count(parts, true));
            prop_assert!(direct.len() <= all.len());
            prop_assert!(all.iter().all(|p| p.is_attachment()));
        }
    }

    #[test]
    fn decoding_arbitrary_fields_never_panics(field in arb_field()) {
        let _ = decode_body_structure(&field);
        let _ = decode_envelope(&field);
        let _ = mailledger_structure::decode_address(&field);
    }
}
