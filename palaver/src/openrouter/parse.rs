//! Completion reply parsing.
//!
//! The model behind the endpoint sometimes emits clean JSON with known
//! fields, sometimes an error envelope, and sometimes plain prose with
//! code fences. This module normalizes all of those into a [`Reply`]
//! through a fixed fallback chain; no input makes it fail.

use serde_json::{Map, Value};

use crate::models::Reply;

/// Parse raw completion text into a normalized reply.
///
/// Precedence:
/// 1. JSON object with any recognized field (`response`, `small_talk` /
///    `smallTalk`, `code`) becomes a structured reply carrying the full
///    object as its JSON payload. Recognized fields win over a co-present
///    `error` field.
/// 2. JSON object with an `error` or `message` field becomes an error
///    reply.
/// 3. Any other JSON object or array is treated as an opaque payload:
///    the reply text is a fenced `json` block with the pretty-printed
///    value.
/// 4. Everything else is plain narrative text, returned verbatim.
pub fn parse_reply(raw: &str) -> Reply {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return Reply::Plain {
            text: raw.to_string(),
        };
    };

    match value {
        Value::Object(ref map) => {
            if has_recognized_field(map) {
                return Reply::Structured {
                    response: string_field(map, "response").unwrap_or_default(),
                    small_talk: string_field(map, "small_talk")
                        .or_else(|| string_field(map, "smallTalk")),
                    code: string_field(map, "code"),
                    json_data: Some(value.clone()),
                };
            }
            if let Some(error) = map.get("error").or_else(|| map.get("message")) {
                return Reply::Error {
                    message: value_as_text(error),
                };
            }
            opaque_payload(value)
        }
        Value::Array(_) => opaque_payload(value),
        // Bare JSON scalars ("42", "true") read better as plain text.
        _ => Reply::Plain {
            text: raw.to_string(),
        },
    }
}

/// Whether the object carries any field we know how to render directly.
fn has_recognized_field(map: &Map<String, Value>) -> bool {
    map.contains_key("response")
        || map.contains_key("small_talk")
        || map.contains_key("smallTalk")
        || map.contains_key("code")
}

/// Read a string field, ignoring non-string values.
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Render a JSON value as user-facing text.
fn value_as_text(value: &Value) -> String {
    value.as_str().map_or_else(
        || serde_json::to_string_pretty(value).unwrap_or_default(),
        str::to_string,
    )
}

/// Wrap an unrecognized JSON payload in a fenced code block.
fn opaque_payload(value: Value) -> Reply {
    let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    Reply::Structured {
        response: format!("```json\n{pretty}\n```"),
        small_talk: None,
        code: None,
        json_data: Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_fields_are_extracted() {
        let reply = parse_reply(r#"{"response":"hi","code":"print(1)"}"#);
        assert_eq!(reply.response_text(), Some("hi"));
        assert_eq!(reply.code(), Some("print(1)"));
        assert!(reply.error().is_none());
        assert!(reply.json_data().is_some());
    }

    #[test]
    fn small_talk_accepts_both_spellings() {
        let snake = parse_reply(r#"{"response":"a","small_talk":"how are you"}"#);
        assert_eq!(snake.small_talk(), Some("how are you"));
        let camel = parse_reply(r#"{"response":"a","smallTalk":"how are you"}"#);
        assert_eq!(camel.small_talk(), Some("how are you"));
    }

    #[test]
    fn non_json_is_plain_text() {
        let reply = parse_reply("not json at all");
        assert_eq!(
            reply,
            Reply::Plain {
                text: "not json at all".to_string()
            }
        );
        assert!(reply.code().is_none());
        assert!(reply.error().is_none());
    }

    #[test]
    fn error_envelope_becomes_error_reply() {
        let reply = parse_reply(r#"{"error":"bad key"}"#);
        assert_eq!(reply.error(), Some("bad key"));
        assert!(reply.response_text().is_none());
    }

    #[test]
    fn message_field_also_reads_as_error() {
        let reply = parse_reply(r#"{"message":"upstream timeout"}"#);
        assert_eq!(reply.error(), Some("upstream timeout"));
    }

    #[test]
    fn recognized_fields_win_over_error_field() {
        let reply = parse_reply(r#"{"response":"ok","error":"ignored"}"#);
        assert_eq!(reply.response_text(), Some("ok"));
        assert!(reply.error().is_none());
    }

    #[test]
    fn opaque_object_is_fenced_json() {
        let reply = parse_reply(r#"{"weather":{"temp":21}}"#);
        let text = reply.response_text().unwrap();
        assert!(text.starts_with("```json\n"));
        assert!(text.ends_with("\n```"));
        assert!(text.contains("\"temp\": 21"));
        assert_eq!(reply.json_data().unwrap()["weather"]["temp"], 21);
    }

    #[test]
    fn array_is_opaque_payload() {
        let reply = parse_reply("[1, 2, 3]");
        assert!(reply.response_text().unwrap().starts_with("```json"));
        assert!(reply.json_data().unwrap().is_array());
    }

    #[test]
    fn bare_scalar_stays_plain() {
        let reply = parse_reply("42");
        assert_eq!(
            reply,
            Reply::Plain {
                text: "42".to_string()
            }
        );
    }

    #[test]
    fn non_string_error_is_pretty_printed() {
        let reply = parse_reply(r#"{"error":{"code":401,"reason":"denied"}}"#);
        let message = reply.error().unwrap();
        assert!(message.contains("401"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn prose_with_code_fences_stays_plain() {
        let raw = "Here you go:\n```python\nprint(1)\n```";
        let reply = parse_reply(raw);
        assert_eq!(reply.response_text(), Some(raw));
    }
}
