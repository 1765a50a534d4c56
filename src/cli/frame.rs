//! Newline-delimited JSON event frames.
//!
//! One event per line: `{"name": "...", "args": [...], "ack": true}`.
//! Binary arguments are written as `{"$binary": "<hex>"}`.

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use socketio_codec::{AckCallback, Argument, SocketIoEvent};

const BINARY_KEY: &str = "$binary";

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single event as read from or written to a frame line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
    /// Whether the sender asked for an ack
    #[serde(default, skip_serializing_if = "is_false")]
    pub ack: bool,
}

impl EventFrame {
    /// Parse one frame line.
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).context("Invalid event frame")
    }

    /// Build a frame from an event.
    pub fn from_event(event: &SocketIoEvent) -> Self {
        Self {
            name: event.name.clone(),
            args: event.arguments.iter().map(argument_to_value).collect(),
            ack: event.has_ack(),
        }
    }

    /// Convert to an event, attaching `ack` when the frame requested one.
    ///
    /// A frame that requested an ack but was given no callback carries none.
    pub fn into_event(self, ack: Option<AckCallback>) -> Result<SocketIoEvent> {
        let arguments = self
            .args
            .into_iter()
            .map(value_to_argument)
            .collect::<Result<Vec<_>>>()
            .context(format!("Invalid arguments for event '{}'", self.name))?;

        let event = SocketIoEvent::new(self.name, arguments);
        Ok(match ack {
            Some(callback) if self.ack => event.with_ack(callback),
            _ => event,
        })
    }

    /// Render as a single JSON line.
    pub fn to_line(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize event frame")
    }
}

/// Render an argument list (e.g. an ack reply) as a JSON array.
pub fn render_arguments(arguments: &[Argument]) -> String {
    Value::Array(arguments.iter().map(argument_to_value).collect()).to_string()
}

fn argument_to_value(argument: &Argument) -> Value {
    match argument {
        Argument::Json(value) => value.clone(),
        Argument::Binary(bytes) => {
            let mut map = Map::new();
            map.insert(BINARY_KEY.to_string(), Value::String(hex::encode(bytes)));
            Value::Object(map)
        }
    }
}

fn value_to_argument(value: Value) -> Result<Argument> {
    if let Value::Object(map) = &value {
        if map.len() == 1 {
            if let Some(encoded) = map.get(BINARY_KEY) {
                let encoded = encoded
                    .as_str()
                    .ok_or_else(|| eyre!("{} must be a hex string", BINARY_KEY))?;
                let bytes = hex::decode(encoded).context("Invalid hex in binary argument")?;
                return Ok(Argument::from(bytes));
            }
        }
    }
    Ok(Argument::Json(value))
}
