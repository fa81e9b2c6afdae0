//! Envelope codec: build, validate, and the transport-text encoding.
//!
//! Three producer families call into `build` with shapes that evolved
//! independently (route builders, tool invocations, ad-hoc CLI payloads).
//! `BuildRequest` makes each shape an explicit variant instead of inspecting
//! argument arity at runtime; `BuildRequest::from_value` resolves the loose
//! single-mapping shape the CLI and HTTP surfaces receive.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::domains::envelope::{
    Envelope, CORRELATION_ID_FIELD, DEFAULT_VERSION, PAYLOAD_FIELD, VERSION_FIELD,
};
use crate::error::{Result, TwisterLangError};

const TOOL_NAME_FIELD: &str = "toolName";
const ARGS_FIELD: &str = "args";
const DATA_FIELD: &str = "data";

/// Source of fresh correlation identifiers. Injected so callers and tests can
/// supply deterministic ids; `build` uses the UUID default.
pub trait CorrelationIdSource {
    fn next_id(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidCorrelationIds;

impl CorrelationIdSource for UuidCorrelationIds {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// One build request per recognized call convention, in precedence order.
#[derive(Debug, Clone)]
pub enum BuildRequest {
    /// Explicit triple: every field supplied, no defaults applied.
    Triple {
        payload: Value,
        version: String,
        correlation_id: String,
    },
    /// Tool invocation: payload synthesized as `{toolName, args}`.
    Tool {
        tool_name: String,
        args: Option<Value>,
        version: Option<String>,
        correlation_id: Option<String>,
    },
    /// Caller-supplied payload passed through unchanged.
    Payload {
        payload: Value,
        version: Option<String>,
        correlation_id: Option<String>,
    },
    /// A single mapping that already carries the envelope fields.
    Embedded(Map<String, Value>),
}

impl BuildRequest {
    /// Resolve a loose JSON mapping into the matching convention.
    ///
    /// Embedded envelope keys win over `toolName`, which wins over `payload`;
    /// anything else is rejected rather than guessed at.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(TwisterLangError::InvalidArguments(
                "message must be a JSON object".to_string(),
            ));
        };

        if map.contains_key(VERSION_FIELD) && map.contains_key(CORRELATION_ID_FIELD) {
            return Ok(BuildRequest::Embedded(map));
        }

        if let Some(tool_name) = map.get(TOOL_NAME_FIELD).and_then(Value::as_str) {
            return Ok(BuildRequest::Tool {
                tool_name: tool_name.to_string(),
                args: map.get(ARGS_FIELD).cloned(),
                version: optional_string_field(&map, VERSION_FIELD)?,
                correlation_id: optional_string_field(&map, CORRELATION_ID_FIELD)?,
            });
        }

        match map.get(PAYLOAD_FIELD) {
            Some(payload) if !payload.is_null() => Ok(BuildRequest::Payload {
                payload: payload.clone(),
                version: optional_string_field(&map, VERSION_FIELD)?,
                correlation_id: optional_string_field(&map, CORRELATION_ID_FIELD)?,
            }),
            _ => Err(TwisterLangError::InvalidArguments(
                "no build convention matched".to_string(),
            )),
        }
    }
}

/// Construct an envelope, generating a correlation id from `ids` when the
/// request leaves it unspecified.
pub fn build_with(request: BuildRequest, ids: &dyn CorrelationIdSource) -> Result<Envelope> {
    match request {
        BuildRequest::Triple {
            payload,
            version,
            correlation_id,
        } => Ok(Envelope {
            version,
            correlation_id,
            payload,
        }),
        BuildRequest::Tool {
            tool_name,
            args,
            version,
            correlation_id,
        } => {
            let mut payload = Map::with_capacity(2);
            payload.insert(TOOL_NAME_FIELD.to_string(), Value::String(tool_name));
            payload.insert(ARGS_FIELD.to_string(), args.unwrap_or(Value::Null));
            Ok(Envelope {
                version: version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
                correlation_id: correlation_id.unwrap_or_else(|| ids.next_id()),
                payload: Value::Object(payload),
            })
        }
        BuildRequest::Payload {
            payload,
            version,
            correlation_id,
        } => Ok(Envelope {
            version: version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            correlation_id: correlation_id.unwrap_or_else(|| ids.next_id()),
            payload,
        }),
        BuildRequest::Embedded(map) => {
            let version = required_string_field(&map, VERSION_FIELD)?;
            let correlation_id = required_string_field(&map, CORRELATION_ID_FIELD)?;
            Ok(Envelope {
                version,
                correlation_id,
                payload: embedded_payload(&map),
            })
        }
    }
}

pub fn build(request: BuildRequest) -> Result<Envelope> {
    build_with(request, &UuidCorrelationIds)
}

/// True iff the value is a mapping carrying all three envelope fields as
/// keys. Values are not inspected; an explicit null counts as present.
pub fn validate(message: &Value) -> bool {
    let Value::Object(map) = message else {
        return false;
    };
    [VERSION_FIELD, CORRELATION_ID_FIELD, PAYLOAD_FIELD]
        .iter()
        .all(|field| map.contains_key(*field))
}

/// Render the envelope to its structured-text form, then to the binary-safe
/// transport text.
pub fn encode_to_text(envelope: &Envelope) -> Result<String> {
    let rendered = serde_json::to_string(envelope)
        .map_err(|e| TwisterLangError::Serialization(e.to_string()))?;
    Ok(STANDARD.encode(rendered.as_bytes()))
}

/// Inverse of `encode_to_text`. Returns the raw structure; callers run
/// `validate` separately when acceptance requires the envelope fields.
pub fn decode_from_text(text: &str) -> Result<Value> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| TwisterLangError::Decode(e.to_string()))?;
    let rendered =
        String::from_utf8(bytes).map_err(|e| TwisterLangError::Decode(e.to_string()))?;
    serde_json::from_str(&rendered).map_err(|e| TwisterLangError::Parse(e.to_string()))
}

// Payload extraction for the embedded convention: a non-null `payload` key,
// else a non-null `data` key, else every remaining key collected into a new
// mapping. The remaining-keys fallback is a compatibility quirk for producers
// that flatten payload fields next to the envelope fields; it excludes only
// `version` and `correlationId`.
fn embedded_payload(map: &Map<String, Value>) -> Value {
    if let Some(payload) = map.get(PAYLOAD_FIELD) {
        if !payload.is_null() {
            return payload.clone();
        }
    }
    if let Some(data) = map.get(DATA_FIELD) {
        if !data.is_null() {
            return data.clone();
        }
    }
    let rest: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| key.as_str() != VERSION_FIELD && key.as_str() != CORRELATION_ID_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(rest)
}

fn required_string_field(map: &Map<String, Value>, field: &str) -> Result<String> {
    match map.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(TwisterLangError::InvalidArguments(format!(
            "embedded field '{field}' must be a string"
        ))),
        None => Err(TwisterLangError::InvalidArguments(format!(
            "embedded envelope is missing '{field}'"
        ))),
    }
}

fn optional_string_field(map: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(TwisterLangError::InvalidArguments(format!(
            "field '{field}' must be a string"
        ))),
    }
}
