//! Purpose: Lock the escaper's observable contract through the public API.
//! Exports: Integration tests only (no runtime exports).
//! Role: Catch drift in substitution order, passthrough identity, and re-application behavior.
//! Invariants: Backslashes stay single and double quotes become single quotes.
//! Invariants: Escaped output embedded in quotes parses back as JSON when the input has no backslash.

use jsonsafe::api::{Input, SUBSTITUTIONS, escape_text, to_json_safe, to_json_safe_nested};
use serde_json::{Value, json};

#[test]
fn substitution_table_order_is_fixed() {
    let finds: Vec<char> = SUBSTITUTIONS.iter().map(|(find, _)| *find).collect();
    assert_eq!(finds, vec!['\\', '"', '\n', '\r', '\t']);
    assert_eq!(SUBSTITUTIONS[0].1, "\\");
}

#[test]
fn documented_examples() {
    let cases = [
        ("he said \"hi\"", "he said 'hi'"),
        ("line1\nline2", "line1\\nline2"),
        ("a\tb\rc", "a\\tb\\rc"),
        ("back\\slash", "back\\slash"),
        ("nothing special here", "nothing special here"),
    ];
    for (input, expected) in cases {
        assert_eq!(escape_text(input), expected, "input: {input:?}");
    }
}

#[test]
fn each_newline_adds_one_byte() {
    let input = "a\nb\nc\n";
    assert_eq!(escape_text(input).len(), input.len() + 3);
}

#[test]
fn reapplying_is_stable_for_quotes_and_newlines() {
    let quoted = escape_text("\"q\"");
    assert_eq!(quoted, "'q'");
    assert_eq!(escape_text(&quoted), quoted);

    let newline = escape_text("x\ny");
    assert_eq!(newline, "x\\ny");
    assert_eq!(escape_text(&newline), newline);
}

#[test]
fn output_embeds_in_json_string_literal_without_backslash_input() {
    let inputs = ["tab\tand\nnewline", "\"quoted\" text", "mixed \r\n\t\"all\""];
    for input in inputs {
        let literal = format!("\"{}\"", escape_text(input));
        let parsed: Value = serde_json::from_str(&literal).expect("embedded literal parses");
        assert_eq!(parsed, Value::String(input.replace('"', "'")));
    }
}

#[test]
fn non_text_values_are_identity() {
    let values = [
        Value::Null,
        json!(false),
        json!(0),
        json!(3.25),
        json!([]),
        json!({"a": "\n"}),
    ];
    for value in values {
        assert_eq!(to_json_safe(value.clone()), value);
    }

    let other: Input<std::collections::BTreeMap<&str, i32>> =
        Input::Other([("k", 1)].into_iter().collect());
    assert_eq!(other.clone().to_json_safe(), other);
}

#[test]
fn nested_leaves_numbers_and_keys_alone() {
    let value = json!({"k\n": ["\"", 1.5, true, null]});
    assert_eq!(
        to_json_safe_nested(value),
        json!({"k\n": ["'", 1.5, true, null]})
    );
}
