//! Purpose: Make text safe to drop inside a JSON string literal; pass everything else through.
//! Exports: `SUBSTITUTIONS`, `Input`, `escape_text`, `to_json_safe`, `to_json_safe_nested`.
//! Role: The pure transform behind the library API and both CLI commands.
//! Invariants: Substitutions run in table order, each over the previous pass's output.
//! Invariants: Backslashes are kept as-is and double quotes become single quotes.
//! Invariants: Non-text values are returned unchanged (moved, never cloned).
use serde_json::Value;

/// Ordered `(find, replace)` passes applied to text input.
pub const SUBSTITUTIONS: [(char, &str); 5] = [
    ('\\', "\\"),
    ('"', "'"),
    ('\n', "\\n"),
    ('\r', "\\r"),
    ('\t', "\\t"),
];

/// A value that is either text or something the escaper must leave alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input<T> {
    Text(String),
    Other(T),
}

impl<T> Input<T> {
    pub fn to_json_safe(self) -> Self {
        match self {
            Input::Text(text) => Input::Text(escape_text(&text)),
            other @ Input::Other(_) => other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Input::Text(text) => Some(text),
            Input::Other(_) => None,
        }
    }
}

impl<T> From<String> for Input<T> {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl<T> From<&str> for Input<T> {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

pub fn escape_text(input: &str) -> String {
    let mut out = input.to_string();
    for (find, replace) in SUBSTITUTIONS {
        if out.contains(find) {
            out = out.replace(find, replace);
        }
    }
    out
}

/// Escape a top-level JSON string; arrays and objects are not walked.
pub fn to_json_safe(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(escape_text(&text)),
        other => other,
    }
}

/// Escape every string reachable through arrays and object values. Keys stay as they are.
pub fn to_json_safe_nested(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(escape_text(&text)),
        Value::Array(items) => Value::Array(items.into_iter().map(to_json_safe_nested).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, to_json_safe_nested(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{Input, escape_text, to_json_safe, to_json_safe_nested};
    use serde_json::{Value, json};

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_text("hello world 123 {}[]/"), "hello world 123 {}[]/");
        assert_eq!(escape_text(""), "");
    }

    #[test]
    fn double_quotes_become_single_quotes() {
        assert_eq!(escape_text("he said \"hi\""), "he said 'hi'");
    }

    #[test]
    fn whitespace_controls_become_two_char_sequences() {
        let out = escape_text("line1\nline2");
        assert_eq!(out, "line1\\nline2");
        assert_eq!(out.len(), "line1\nline2".len() + 1);
        assert_eq!(escape_text("a\tb\rc"), "a\\tb\\rc");
        assert_eq!(escape_text("\r\n"), "\\r\\n");
    }

    #[test]
    fn backslashes_are_not_doubled() {
        assert_eq!(escape_text("back\\slash"), "back\\slash");
        assert_eq!(escape_text("\\\\"), "\\\\");
    }

    #[test]
    fn second_pass_is_a_no_op() {
        for input in ["say \"x\"", "a\nb", "tab\there\r\n", "c:\\dir\\\"q\""] {
            let once = escape_text(input);
            assert_eq!(escape_text(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn other_controls_and_unicode_pass_through() {
        let input = "bell\u{7} nul\u{0} é 日本 😀 /";
        assert_eq!(escape_text(input), input);
    }

    #[test]
    fn input_other_is_identity() {
        let payload = vec![1u8, 2, 3];
        let ptr = payload.as_ptr();
        let out = Input::<Vec<u8>>::Other(payload).to_json_safe();
        match out {
            Input::Other(bytes) => {
                assert_eq!(bytes, vec![1, 2, 3]);
                assert_eq!(bytes.as_ptr(), ptr);
            }
            Input::Text(_) => panic!("passthrough changed variant"),
        }
    }

    #[test]
    fn input_text_is_escaped() {
        let out = Input::<()>::from("x\"\ty").to_json_safe();
        assert_eq!(out.as_text(), Some("x'\\ty"));
    }

    #[test]
    fn json_non_strings_pass_through() {
        let cases = [
            json!(null),
            json!(true),
            json!(42),
            json!(-1.5),
            json!(["a\n", "\"b\""]),
            json!({"k": "v\n"}),
        ];
        for value in cases {
            assert_eq!(to_json_safe(value.clone()), value);
        }
    }

    #[test]
    fn json_string_is_escaped() {
        let out = to_json_safe(Value::String("q\"\n".to_string()));
        assert_eq!(out, Value::String("q'\\n".to_string()));
    }

    #[test]
    fn nested_walks_values_but_not_keys() {
        let value = json!({
            "say \"k\"": "v\"1\"",
            "list": ["a\tb", 3, null, {"deep": "x\ny"}],
            "n": 7
        });
        let out = to_json_safe_nested(value);
        assert_eq!(
            out,
            json!({
                "say \"k\"": "v'1'",
                "list": ["a\\tb", 3, null, {"deep": "x\\ny"}],
                "n": 7
            })
        );
    }
}
