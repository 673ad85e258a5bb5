//! YAML front end for rule schemas and complete form definitions.

use crate::config::FormConfig;
use crate::enums::ValidationTrigger;
use crate::error::{LoadError, LoadErrorKind};
use crate::messages::Messages;
use crate::node::Node;
use crate::schema::RuleSchema;
use serde::Deserialize;
use serde_json::Value;

/// A parsed form definition, ready to become a controller.
#[derive(Clone, Debug)]
pub struct FormDefinition {
    pub data: Node,
    pub schema: RuleSchema,
    pub config: FormConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefinition {
    #[serde(default)]
    validate_on: ValidationTrigger,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    rules: Value,
    #[serde(default)]
    messages: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    attributes: std::collections::BTreeMap<String, String>,
}

/// Parses a YAML rule schema (the same shape [`RuleSchema::from_value`]
/// accepts).
pub fn parse_schema(input: &str) -> Result<RuleSchema, LoadError> {
    let value = parse_yaml(input)?;
    Ok(RuleSchema::from_value(&value)?)
}

/// Parses a YAML form definition:
///
/// ```yaml
/// validate_on: change
/// data:
///   name: ""
/// rules:
///   name: required|string|min:3
/// messages:
///   name.required: Tell us your name.
/// ```
pub fn parse_definition(input: &str) -> Result<FormDefinition, LoadError> {
    let value = parse_yaml(input)?;
    if !value.is_object() {
        return Err(LoadError::Parse {
            kind: LoadErrorKind::TypeMismatch,
            message: "form definition root must be a YAML mapping".to_string(),
        });
    }

    let raw: RawDefinition = serde_json::from_value(value).map_err(|e| {
        let message = e.to_string();
        LoadError::Parse {
            kind: classify_json_error(&message),
            message,
        }
    })?;

    let messages = Messages {
        templates: raw.messages,
        attributes: raw.attributes,
    };
    let schema = RuleSchema::from_value(&raw.rules)?.with_messages(messages);

    Ok(FormDefinition {
        data: Node::from(raw.data),
        schema,
        config: FormConfig::validate_on(raw.validate_on),
    })
}

fn parse_yaml(input: &str) -> Result<Value, LoadError> {
    if input.trim().is_empty() {
        return Err(LoadError::Parse {
            kind: LoadErrorKind::Syntax,
            message: "empty input".to_string(),
        });
    }
    serde_saphyr::from_str(input).map_err(|e| {
        let message = e.to_string();
        LoadError::Parse {
            kind: classify_saphyr_error(&message),
            message,
        }
    })
}

fn classify_saphyr_error(msg: &str) -> LoadErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown field") {
        LoadErrorKind::UnknownField
    } else if lower.contains("type") || lower.contains("invalid") || lower.contains("expected") {
        LoadErrorKind::TypeMismatch
    } else {
        LoadErrorKind::Syntax
    }
}

fn classify_json_error(msg: &str) -> LoadErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown field") || lower.contains("unknown variant") {
        LoadErrorKind::UnknownField
    } else {
        LoadErrorKind::TypeMismatch
    }
}
