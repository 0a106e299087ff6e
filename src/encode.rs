// Copyright 2025 Pavel Roskin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sparse encoding of capability records
//!
//! Turns a [`Capabilities`] record into the ordered sequence of
//! `(field name, literal)` pairs that make up a registration entry.
//! Fields at their default value produce nothing, so the output stays
//! compact and diffs stay small. The field order is the fixed order
//! declared in the record, independent of which fields are populated.

use std::fmt::Write;

use crate::record::{Capabilities, FieldValue};

/// One non-default field, rendered as Rust source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedField {
    /// Field name as declared in the record
    pub name: &'static str,
    /// Right-hand side of the struct literal line, without the trailing comma
    pub literal: String,
}

/// Encode all non-default fields of a record in the fixed field order
///
/// The encoding is a pure transform: it never fails and never mutates the
/// record, and encoding the same record twice produces identical output.
pub fn encode(caps: &Capabilities) -> Vec<EncodedField> {
    caps.fields()
        .filter_map(|(name, value)| render(&value).map(|literal| EncodedField { name, literal }))
        .collect()
}

/// Render one field value as a Rust literal, or `None` for defaults
///
/// String values are escaped so that the emitted text re-parses to the
/// original byte sequence; control characters become `\u{..}` escapes.
fn render(value: &FieldValue<'_>) -> Option<String> {
    match value {
        value if value.is_default() => None,
        FieldValue::Int(number) => Some(number.to_string()),
        FieldValue::Str(sequence) => Some(format!("{sequence:?}.into()")),
        FieldValue::List(names) => {
            let mut literal = String::from("vec![");
            for (index, name) in names.iter().enumerate() {
                if index > 0 {
                    literal.push_str(", ");
                }
                // Infallible for String
                let _ = write!(literal, "{name:?}.into()");
            }
            literal.push(']');
            Some(literal)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Capabilities {
        Capabilities {
            name: "xterm".to_string(),
            colors: 8,
            bell: "\u{7}".to_string(),
            ..Capabilities::default()
        }
    }

    #[test]
    fn sparse_output() {
        let fields = encode(&sample());
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[0].literal, r#""xterm".into()"#);
        assert_eq!(fields[1].name, "colors");
        assert_eq!(fields[1].literal, "8");
        assert_eq!(fields[2].name, "bell");
        assert_eq!(fields[2].literal, r#""\u{7}".into()"#);
    }

    #[test]
    fn default_record_encodes_to_nothing() {
        assert!(encode(&Capabilities::default()).is_empty());
    }

    #[test]
    fn deterministic() {
        let caps = sample();
        assert_eq!(encode(&caps), encode(&caps));
    }

    #[test]
    fn order_is_independent_of_population() {
        // Populating a later field must not move it ahead of earlier ones.
        let mut caps = sample();
        caps.key_f64 = "\u{1b}[64~".to_string();
        caps.aliases = vec!["xterm-debian".to_string()];
        let names: Vec<&str> = encode(&caps).iter().map(|field| field.name).collect();
        assert_eq!(names, ["name", "aliases", "colors", "bell", "key_f64"]);

        let positions: Vec<usize> = names
            .iter()
            .map(|name| {
                Capabilities::FIELD_NAMES
                    .iter()
                    .position(|candidate| candidate == name)
                    .unwrap()
            })
            .collect();
        assert!(positions.is_sorted());
    }

    #[test]
    fn escapes_control_characters() {
        let caps = Capabilities {
            name: "fancy".to_string(),
            clear: "\u{1b}[H\u{1b}[2J".to_string(),
            pad_char: "\0".to_string(),
            alt_chars: "a\"b\\c".to_string(),
            ..Capabilities::default()
        };
        let fields = encode(&caps);
        for field in &fields {
            let literal = field
                .literal
                .strip_suffix(".into()")
                .expect("string literal");
            assert!(literal.starts_with('"') && literal.ends_with('"'));
            // No raw control bytes may survive in the rendered source.
            assert!(literal.chars().all(|c| !c.is_control()));
        }
    }

    #[test]
    fn aliases_render_as_vec_literal() {
        let caps = Capabilities {
            name: "screen".to_string(),
            aliases: vec!["screen-color".to_string(), "vt100-like".to_string()],
            ..Capabilities::default()
        };
        let fields = encode(&caps);
        assert_eq!(
            fields[1].literal,
            r#"vec!["screen-color".into(), "vt100-like".into()]"#
        );
    }

    /// Undo the escaping done by `render` for string literals
    fn unquote(literal: &str) -> String {
        let literal = literal.strip_suffix(".into()").unwrap();
        let inner = &literal[1..literal.len() - 1];
        let mut out = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next().unwrap() {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                '\'' => out.push('\''),
                'u' => {
                    let hex: String = chars
                        .by_ref()
                        .skip(1) // opening brace
                        .take_while(|&c| c != '}')
                        .collect();
                    let code = u32::from_str_radix(&hex, 16).unwrap();
                    out.push(char::from_u32(code).unwrap());
                }
                other => panic!("unexpected escape \\{other}"),
            }
        }
        out
    }

    #[test]
    fn round_trip() {
        // Rebuilding a record from the encoded pairs and re-encoding it
        // must reproduce the same pairs.
        let caps = Capabilities {
            name: "rxvt".to_string(),
            aliases: vec!["rxvt-unicode".to_string()],
            columns: 80,
            lines: 24,
            colors: 256,
            bell: "\u{7}".to_string(),
            clear: "\u{1b}[H\u{1b}[2J".to_string(),
            set_fg: "\u{1b}[38;5;%p1%dm".to_string(),
            key_f1: "\u{1b}[11~".to_string(),
            ..Capabilities::default()
        };
        let encoded = encode(&caps);

        let mut decoded = Capabilities::default();
        for field in &encoded {
            match field.name {
                "name" => decoded.name = unquote(&field.literal),
                "aliases" => {
                    let inner = field
                        .literal
                        .strip_prefix("vec![")
                        .and_then(|rest| rest.strip_suffix(']'))
                        .unwrap();
                    decoded.aliases = inner.split(", ").map(unquote).collect();
                }
                "columns" => decoded.columns = field.literal.parse().unwrap(),
                "lines" => decoded.lines = field.literal.parse().unwrap(),
                "colors" => decoded.colors = field.literal.parse().unwrap(),
                "bell" => decoded.bell = unquote(&field.literal),
                "clear" => decoded.clear = unquote(&field.literal),
                "set_fg" => decoded.set_fg = unquote(&field.literal),
                "key_f1" => decoded.key_f1 = unquote(&field.literal),
                other => panic!("unexpected field {other}"),
            }
        }
        assert_eq!(decoded, caps);
        assert_eq!(encode(&decoded), encoded);
    }
}
