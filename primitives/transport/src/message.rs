use bitcoin::hex::DisplayHex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TransportError};

/// The JSON envelope exchanged with the daemon and, wrapped by the HTTP
/// backend, with individual services.
///
/// ```json
/// {
///   "command": "get_blockchain_state",
///   "ack": false,
///   "data": {},
///   "request_id": "5c3f…",
///   "destination": "chia_full_node",
///   "origin": "my_app"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The RPC command, e.g. `get_blockchain_state`
    pub command: String,
    /// `true` on responses, `false` on requests and broadcasts
    #[serde(default)]
    pub ack: bool,
    /// Command arguments on requests, results on responses
    #[serde(default = "empty_object")]
    pub data: Value,
    /// Correlation id echoed by the response
    #[serde(default)]
    pub request_id: String,
    /// Service that should handle the message
    #[serde(default)]
    pub destination: String,
    /// Service (or client) that sent the message
    #[serde(default)]
    pub origin: String,
}

fn empty_object() -> Value { Value::Object(Default::default()) }

/// Generates a fresh correlation id: 32 random bytes as lowercase hex.
pub fn new_request_id() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes.to_lower_hex_string()
}

impl Message {
    /// Builds a request with a newly generated request id.
    ///
    /// A `null` `data` is replaced by an empty object, since services
    /// expect an object even for commands without arguments.
    pub fn new(
        command: impl Into<String>,
        data: Value,
        destination: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            ack: false,
            data: if data.is_null() { empty_object() } else { data },
            request_id: new_request_id(),
            destination: destination.into(),
            origin: origin.into(),
        }
    }

    /// Builds the acknowledgement of `request` carrying `data`.
    ///
    /// Origin and destination are swapped and the request id is preserved.
    pub fn response_to(request: &Message, data: Value) -> Self {
        Self {
            command: request.command.clone(),
            ack: true,
            data,
            request_id: request.request_id.clone(),
            destination: request.origin.clone(),
            origin: request.destination.clone(),
        }
    }

    /// `true` if this is a response whose `data.success` is `true`.
    pub fn is_successful_response(&self) -> bool { self.ack && self.success() }

    fn success(&self) -> bool { self.data.get("success").and_then(Value::as_bool).unwrap_or(false) }

    /// The error text reported by the service, if any.
    pub fn error_message(&self) -> Option<&str> { self.data.get("error").and_then(Value::as_str) }

    /// Unwraps `data`, turning `success: false` into [`TransportError::Rpc`].
    ///
    /// A response without a `success` field counts as a failure.
    pub fn into_data(self) -> Result<Value> {
        if self.success() {
            return Ok(self.data);
        }
        let reason = match self.error_message() {
            Some(error) => error.to_string(),
            None => format!("request failed: {}", self.command),
        };
        Err(TransportError::Rpc(reason))
    }

    /// Serializes the envelope to its JSON text form.
    pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

    /// Parses an envelope received from the wire.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(TransportError::InvalidFormat(format!("expected an object, got {}", text)));
        }
        Ok(serde_json::from_value(value)?)
    }
}
