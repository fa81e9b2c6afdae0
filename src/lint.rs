//! Lint collaborator: checks collections of envelope messages stored as JSON
//! files. Core `validate` decides envelope shape; an externally supplied
//! schema document can tighten individual fields beyond the key check.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec;
use crate::domains::envelope::{CORRELATION_ID_FIELD, PAYLOAD_FIELD, VERSION_FIELD};
use crate::error::{Result, TwisterLangError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl FieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
            FieldType::Null => value.is_null(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Schema {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub types: BTreeMap<String, FieldType>,
}

impl Schema {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| TwisterLangError::Config(e.to_string()))?;
        let schema: Schema =
            serde_json::from_str(&content).map_err(|e| TwisterLangError::Parse(e.to_string()))?;
        Ok(schema)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LintError {
    pub index: usize,
    pub reason: String,
    pub message: Value,
}

pub struct EnvelopeLint {
    schema: Option<Schema>,
}

impl EnvelopeLint {
    pub fn new(schema: Option<Schema>) -> Self {
        Self { schema }
    }

    /// First failure reason for a single message, or None when it passes.
    pub fn check(&self, message: &Value) -> Option<String> {
        if !codec::validate(message) {
            let Value::Object(map) = message else {
                return Some("message is not a JSON object".to_string());
            };
            for field in [VERSION_FIELD, CORRELATION_ID_FIELD, PAYLOAD_FIELD] {
                if !map.contains_key(field) {
                    return Some(format!("missing required field '{field}'"));
                }
            }
            return Some("message is not a valid envelope".to_string());
        }

        let Some(schema) = &self.schema else {
            return None;
        };
        let Value::Object(map) = message else {
            return Some("message is not a JSON object".to_string());
        };
        for field in &schema.required {
            if !map.contains_key(field) {
                return Some(format!("missing required field '{field}'"));
            }
        }
        for (field, expected) in &schema.types {
            if let Some(value) = map.get(field) {
                if !expected.matches(value) {
                    return Some(format!(
                        "field '{field}' must be of type {}",
                        expected.name()
                    ));
                }
            }
        }
        None
    }

    /// Lint a file holding a JSON array of messages.
    pub fn lint_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<LintError>> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| TwisterLangError::Runtime(e.to_string()))?;
        let messages: Vec<Value> =
            serde_json::from_str(&content).map_err(|e| TwisterLangError::Parse(e.to_string()))?;

        let mut errors = Vec::new();
        for (index, message) in messages.iter().enumerate() {
            if let Some(reason) = self.check(message) {
                errors.push(LintError {
                    index,
                    reason,
                    message: message.clone(),
                });
            }
        }
        Ok(errors)
    }

    /// Lint every `.json` file directly under the directory. Non-recursive.
    pub fn lint_dir<P: AsRef<Path>>(&self, path: P) -> Result<BTreeMap<String, Vec<LintError>>> {
        let entries = fs::read_dir(path.as_ref())
            .map_err(|e| TwisterLangError::Runtime(e.to_string()))?;

        let mut all_errors = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|e| TwisterLangError::Runtime(e.to_string()))?;
            let file_path = entry.path();
            if file_path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let errors = self.lint_file(&file_path)?;
            if !errors.is_empty() {
                let name = file_path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or_default()
                    .to_string();
                all_errors.insert(name, errors);
            }
        }
        Ok(all_errors)
    }
}
