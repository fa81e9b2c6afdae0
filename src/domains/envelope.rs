use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VERSION_FIELD: &str = "version";
pub const CORRELATION_ID_FIELD: &str = "correlationId";
pub const PAYLOAD_FIELD: &str = "payload";

pub const DEFAULT_VERSION: &str = "1.0";

/// Versioned wrapper carried between producers and consumers. The payload is
/// opaque to the codec; `version` and `correlationId` are passed through as
/// given and never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: String,
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    pub payload: Value,
}

impl Envelope {
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(3);
        map.insert(
            VERSION_FIELD.to_string(),
            Value::String(self.version.clone()),
        );
        map.insert(
            CORRELATION_ID_FIELD.to_string(),
            Value::String(self.correlation_id.clone()),
        );
        map.insert(PAYLOAD_FIELD.to_string(), self.payload.clone());
        Value::Object(map)
    }
}
