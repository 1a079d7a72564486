//! Strict decoding of structured profile output.
//!
//! The completion service is asked for a JSON object satisfying the profile
//! schema. This module validates that contract — JSON parse plus per-field
//! presence and non-emptiness checks — independent of the transport call, so
//! parse failures are testable with canned response bodies.

use serde_json::{json, Value};
use thiserror::Error;

use super::MAX_TAGS;

/// The seven fields the structured-output contract requires.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "role",
    "tagline",
    "tags",
    "description",
    "needs",
    "offers",
];

/// Errors raised while decoding a structured profile response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field '{field}' has wrong type: expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field '{0}' is empty")]
    EmptyField(&'static str),
}

/// Profile fields decoded from a structured response.
///
/// The model's `role` claim is intentionally not carried here: callers stamp
/// the role the flow was scoped to, so a drifting model answer cannot change
/// the profile's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFields {
    pub name: String,
    pub tagline: String,
    pub tags: Vec<String>,
    pub description: String,
    pub needs: String,
    pub offers: String,
}

/// Schema sent with structured generation requests.
///
/// Uses the OpenAPI-subset dialect the completion service expects
/// (uppercase type names, `required` list of the seven fields).
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": {
                "type": "STRING",
                "description": "Infer a name or use 'Anonymous Founder' if not provided"
            },
            "role": { "type": "STRING", "enum": ["Founder", "Investor", "Explorer"] },
            "tagline": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
            "description": {
                "type": "STRING",
                "description": "Summary of what they are doing"
            },
            "needs": { "type": "STRING", "description": "What they need" },
            "offers": { "type": "STRING", "description": "What they offer" }
        },
        "required": REQUIRED_FIELDS
    })
}

/// Decodes a raw structured response body into profile fields.
///
/// # Errors
///
/// - `InvalidJson` / `NotAnObject` when the body does not parse to an object
/// - `MissingField` / `WrongType` / `EmptyField` when a required field
///   violates the contract
pub fn decode_profile_fields(body: &str) -> Result<GeneratedFields, ProfileParseError> {
    let stripped = strip_code_fences(body);
    let value: Value = serde_json::from_str(stripped.trim())
        .map_err(|e| ProfileParseError::InvalidJson(e.to_string()))?;

    let object = value.as_object().ok_or(ProfileParseError::NotAnObject)?;

    // The role field must be present per the contract, even though its
    // value is replaced by the session role downstream.
    require_string(object, "role")?;

    let mut tags = decode_tags(object)?;
    tags.truncate(MAX_TAGS);

    Ok(GeneratedFields {
        name: require_string(object, "name")?,
        tagline: require_string(object, "tagline")?,
        tags,
        description: require_string(object, "description")?,
        needs: require_string(object, "needs")?,
        offers: require_string(object, "offers")?,
    })
}

/// Removes a surrounding markdown code fence, if the model added one.
fn strip_code_fences(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn require_string(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, ProfileParseError> {
    let value = object
        .get(field)
        .ok_or(ProfileParseError::MissingField(field))?;
    let text = value.as_str().ok_or(ProfileParseError::WrongType {
        field,
        expected: "string",
    })?;
    if text.trim().is_empty() {
        return Err(ProfileParseError::EmptyField(field));
    }
    Ok(text.to_string())
}

fn decode_tags(
    object: &serde_json::Map<String, Value>,
) -> Result<Vec<String>, ProfileParseError> {
    let value = object
        .get("tags")
        .ok_or(ProfileParseError::MissingField("tags"))?;
    let items = value.as_array().ok_or(ProfileParseError::WrongType {
        field: "tags",
        expected: "array of strings",
    })?;

    let mut tags = Vec::with_capacity(items.len());
    for item in items {
        let tag = item.as_str().ok_or(ProfileParseError::WrongType {
            field: "tags",
            expected: "array of strings",
        })?;
        if !tag.trim().is_empty() {
            tags.push(tag.to_string());
        }
    }

    if tags.is_empty() {
        return Err(ProfileParseError::EmptyField("tags"));
    }
    Ok(tags)
}
