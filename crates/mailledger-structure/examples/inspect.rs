#![allow(clippy::expect_used, clippy::doc_markdown, clippy::uninlined_format_args)]
//! Example: Print the part tree of a BODYSTRUCTURE
//!
//! Reads the parenthesized BODYSTRUCTURE value of a FETCH response from
//! stdin (or the first argument) and prints every part with the section to
//! use in `FETCH BODY[section]`.
//!
//! ## Running
//!
//! ```bash
//! echo '(("TEXT" "PLAIN" NIL NIL NIL "7BIT" 10 1)("APPLICATION" "PDF" NIL NIL NIL "BASE64" 99 NIL ("ATTACHMENT" ("FILENAME" "a.pdf")) NIL) "MIXED")' \
//!     | RUST_LOG=mailledger_structure=trace cargo run --package mailledger-structure --example inspect
//! ```

use std::io::{self, Read};

use mailledger_structure::{Field, MessagePart, decode_body_structure};
use tracing_subscriber::EnvFilter;

fn print_part(part: &MessagePart, indent: usize) {
    let pad = "  ".repeat(indent);
    match part {
        MessagePart::Body(body) => {
            let mut line = format!(
                "{pad}[{}] {} {} bytes",
                body.section(),
                body.mime_type(),
                body.size
            );
            if let Some(name) = body.filename() {
                line.push_str(&format!(" \"{name}\""));
            }
            if body.is_attachment() {
                line.push_str(" (attachment)");
            }
            println!("{line}");

            if let Some(nested) = &body.body_structure {
                print_part(nested, indent + 1);
            }
        }
        MessagePart::Multipart(mp) => {
            println!("{pad}[{}] multipart/{}", mp.section(), mp.subtype.to_lowercase());
            for child in &mp.parts {
                print_part(child, indent + 1);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let input = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let field: Field = input.parse()?;
    let Some(root) = decode_body_structure(&field) else {
        eprintln!("Not a body structure");
        std::process::exit(1);
    };

    print_part(&root, 0);

    if let MessagePart::Multipart(mp) = &root {
        let attachments = mp.attachments(true);
        println!("\n{} attachment(s)", attachments.len());
    }

    Ok(())
}
