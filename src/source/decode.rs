//! Turning a pull response body into a [`Fact`].

use crate::model::{DecodeError, Fact};
use serde_json::Value;

/// Extract the display text stored under `key` in a JSON object body.
///
/// Strings are taken verbatim. Numbers and booleans are shown as their JSON
/// text, matching how a text region coerces scalar values.
///
/// # Errors
///
/// - [`DecodeError::InvalidJson`] when the body does not parse
/// - [`DecodeError::NotAnObject`] when the top-level value is not an object
/// - [`DecodeError::MissingKey`] when the object has no such field
/// - [`DecodeError::NotText`] for null, arrays and nested objects
pub fn extract_fact(body: &str, key: &str) -> Result<Fact, DecodeError> {
    let value: Value = serde_json::from_str(body).map_err(|e| DecodeError::InvalidJson {
        reason: e.to_string(),
    })?;

    let Value::Object(mut object) = value else {
        return Err(DecodeError::NotAnObject);
    };

    match object.remove(key) {
        None => Err(DecodeError::MissingKey {
            key: key.to_string(),
        }),
        Some(Value::String(text)) => Ok(Fact::new(text)),
        Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Fact::new(scalar.to_string())),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) => Err(DecodeError::NotText {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_string_field() {
        let fact = extract_fact(r#"{"fact":"cats sleep a lot","length":16}"#, "fact").unwrap();
        assert_eq!(fact.as_str(), "cats sleep a lot");
    }

    #[test]
    fn custom_key_is_used() {
        let fact = extract_fact(r#"{"fact":"no","quote":"yes"}"#, "quote").unwrap();
        assert_eq!(fact.as_str(), "yes");
    }

    #[test]
    fn string_is_not_trimmed_or_escaped() {
        let fact = extract_fact(r#"{"fact":"  <b>bold</b>\n"}"#, "fact").unwrap();
        assert_eq!(fact.as_str(), "  <b>bold</b>\n");
    }

    #[test]
    fn numbers_and_booleans_use_json_text() {
        assert_eq!(extract_fact(r#"{"n":42}"#, "n").unwrap().as_str(), "42");
        assert_eq!(extract_fact(r#"{"n":1.5}"#, "n").unwrap().as_str(), "1.5");
        assert_eq!(extract_fact(r#"{"b":true}"#, "b").unwrap().as_str(), "true");
    }

    #[test]
    fn null_array_and_object_are_not_text() {
        for body in [r#"{"k":null}"#, r#"{"k":[1]}"#, r#"{"k":{"a":1}}"#] {
            assert_eq!(
                extract_fact(body, "k"),
                Err(DecodeError::NotText {
                    key: "k".to_string()
                }),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn missing_key_is_reported() {
        assert_eq!(
            extract_fact(r#"{"other":"x"}"#, "fact"),
            Err(DecodeError::MissingKey {
                key: "fact".to_string()
            })
        );
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert_eq!(
            extract_fact(r#"["fact"]"#, "fact"),
            Err(DecodeError::NotAnObject)
        );
        assert_eq!(
            extract_fact(r#""fact""#, "fact"),
            Err(DecodeError::NotAnObject)
        );
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            extract_fact("<html>502</html>", "fact"),
            Err(DecodeError::InvalidJson { .. })
        ));
    }
}
