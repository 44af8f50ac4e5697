//! Response schema for the identity request and its validator
//!
//! The schema uses the OpenAPI-style subset the Gemini API accepts for
//! `responseSchema` (`OBJECT`, `ARRAY`, `STRING`, `NUMBER`). The same value is
//! sent with the request and used to check the decoded response, since the
//! remote model is not trusted to honor it.

use super::types::BrandIdentity;
use crate::error::{Error, Result};
use serde_json::{json, Map, Value};
use tracing::warn;

/// Schema describing [`BrandIdentity`] on the wire
pub fn brand_identity_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "companyName": { "type": "STRING" },
            "tagline": { "type": "STRING" },
            "mission": { "type": "STRING" },
            "brandVoice": { "type": "STRING" },
            "targetAudience": { "type": "STRING" },
            "keywords": { "type": "ARRAY", "items": { "type": "STRING" } },
            "colors": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "hex": { "type": "STRING" },
                        "name": { "type": "STRING" },
                        "usage": { "type": "STRING" }
                    },
                    "required": ["hex", "name", "usage"]
                }
            },
            "typography": {
                "type": "OBJECT",
                "properties": {
                    "headingFont": { "type": "STRING" },
                    "bodyFont": { "type": "STRING" },
                    "reasoning": { "type": "STRING" }
                },
                "required": ["headingFont", "bodyFont", "reasoning"]
            },
            "marketPositioning": {
                "type": "OBJECT",
                "properties": {
                    "axisX": { "type": "STRING" },
                    "axisY": { "type": "STRING" },
                    "valueX": { "type": "NUMBER" },
                    "valueY": { "type": "NUMBER" }
                },
                "required": ["axisX", "axisY", "valueX", "valueY"]
            }
        },
        "required": [
            "companyName", "tagline", "mission", "brandVoice", "targetAudience",
            "keywords", "colors", "typography", "marketPositioning"
        ]
    })
}

/// Check `value` against `schema`, returning a path-qualified message on the
/// first mismatch. Properties not named in the schema are ignored.
pub fn validate_against_schema(schema: &Value, value: &Value) -> std::result::Result<(), String> {
    validate_node(schema, value, "$")
}

fn validate_node(schema: &Value, value: &Value, path: &str) -> std::result::Result<(), String> {
    let expected = schema.get("type").and_then(Value::as_str).unwrap_or("");

    match expected {
        "OBJECT" => {
            let object = value
                .as_object()
                .ok_or_else(|| type_mismatch(path, "an object", value))?;
            validate_object(schema, object, path)
        }
        "ARRAY" => {
            let items = value
                .as_array()
                .ok_or_else(|| type_mismatch(path, "an array", value))?;
            if let Some(item_schema) = schema.get("items") {
                for (index, item) in items.iter().enumerate() {
                    validate_node(item_schema, item, &format!("{path}[{index}]"))?;
                }
            }
            Ok(())
        }
        "STRING" if !value.is_string() => Err(type_mismatch(path, "a string", value)),
        "NUMBER" if !value.is_number() => Err(type_mismatch(path, "a number", value)),
        "BOOLEAN" if !value.is_boolean() => Err(type_mismatch(path, "a boolean", value)),
        _ => Ok(()),
    }
}

fn validate_object(
    schema: &Value,
    object: &Map<String, Value>,
    path: &str,
) -> std::result::Result<(), String> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(field) {
                return Err(format!("{path}.{field} is required but missing"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (field, field_schema) in properties {
            if let Some(field_value) = object.get(field) {
                validate_node(field_schema, field_value, &format!("{path}.{field}"))?;
            }
        }
    }

    Ok(())
}

fn type_mismatch(path: &str, expected: &str, actual: &Value) -> String {
    let actual = match actual {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    };
    format!("{path} must be {expected}, got {actual}")
}

/// Turn a decoded text-model response into a [`BrandIdentity`].
///
/// Any schema mismatch, and an empty palette, is an identity synthesis
/// failure: the logo step needs a primary color.
pub fn parse_brand_identity(value: Value) -> Result<BrandIdentity> {
    validate_against_schema(&brand_identity_schema(), &value).map_err(|msg| {
        Error::IdentitySynthesis(format!("response does not match brand identity schema: {msg}"))
    })?;

    let identity: BrandIdentity = serde_json::from_value(value).map_err(|e| {
        Error::IdentitySynthesis(format!("response does not match brand identity schema: {e}"))
    })?;

    if identity.colors.is_empty() {
        return Err(Error::IdentitySynthesis(
            "brand identity has no colors; a primary color is required for the logo".to_string(),
        ));
    }

    for swatch in identity.colors.iter().filter(|c| !c.has_valid_hex()) {
        warn!(
            "Color '{}' has non-standard hex value '{}'",
            swatch.name, swatch.hex
        );
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> Value {
        json!({
            "companyName": "Orbitra",
            "tagline": "Beyond the last mile",
            "mission": "Move mass to orbit",
            "brandVoice": "Precise",
            "targetAudience": "Engineers",
            "keywords": ["orbit", "precision"],
            "colors": [
                {"hex": "#101820", "name": "Void", "usage": "Primary"},
                {"hex": "#F2AA4C", "name": "Flare", "usage": "Accent"}
            ],
            "typography": {"headingFont": "Inter", "bodyFont": "IBM Plex Sans", "reasoning": "Clarity"},
            "marketPositioning": {"axisX": "Legacy vs New", "axisY": "Budget vs Premium", "valueX": 80, "valueY": 65.5}
        })
    }

    #[test]
    fn test_valid_payload_parses() {
        let identity = parse_brand_identity(valid_payload()).unwrap();
        assert_eq!(identity.company_name, "Orbitra");
        assert_eq!(identity.colors.len(), 2);
        assert_eq!(identity.market_positioning.value_y, 65.5);
    }

    #[test]
    fn test_missing_field_reports_path() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("tagline");

        let err = validate_against_schema(&brand_identity_schema(), &payload).unwrap_err();
        assert_eq!(err, "$.tagline is required but missing");
    }

    #[test]
    fn test_nested_type_mismatch_reports_path() {
        let mut payload = valid_payload();
        payload["colors"][1]["hex"] = json!(42);

        let err = validate_against_schema(&brand_identity_schema(), &payload).unwrap_err();
        assert_eq!(err, "$.colors[1].hex must be a string, got a number");
    }

    #[test]
    fn test_number_as_string_is_rejected() {
        let mut payload = valid_payload();
        payload["marketPositioning"]["valueX"] = json!("80");

        match parse_brand_identity(payload) {
            Err(Error::IdentitySynthesis(msg)) => {
                assert!(msg.contains("$.marketPositioning.valueX must be a number"));
            }
            other => panic!("expected identity synthesis error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        let err = validate_against_schema(&brand_identity_schema(), &json!(["x"])).unwrap_err();
        assert_eq!(err, "$ must be an object, got an array");
    }

    #[test]
    fn test_empty_palette_is_rejected() {
        let mut payload = valid_payload();
        payload["colors"] = json!([]);

        match parse_brand_identity(payload) {
            Err(Error::IdentitySynthesis(msg)) => assert!(msg.contains("no colors")),
            other => panic!("expected identity synthesis error, got {other:?}"),
        }
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let mut payload = valid_payload();
        payload["confidence"] = json!(0.9);
        assert!(parse_brand_identity(payload).is_ok());
    }
}
