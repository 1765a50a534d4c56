//! Wire-level event model.
//!
//! A `SocketIoEvent` is what the transport hands us on receive and what an
//! encoder hands back on send: a name, ordered arguments, and an optional
//! ack callback.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::error::{CodecError, Result};

/// One element of an event's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Structured (JSON) value
    Json(Value),
    /// Opaque binary attachment
    Binary(Bytes),
}

impl Argument {
    /// Borrow the JSON value, if this is a JSON argument.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Argument::Json(value) => Some(value),
            Argument::Binary(_) => None,
        }
    }

    /// Borrow the binary blob, if this is a binary argument.
    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            Argument::Json(_) => None,
            Argument::Binary(bytes) => Some(bytes),
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Argument::Binary(_))
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Json(value)
    }
}

impl From<Bytes> for Argument {
    fn from(bytes: Bytes) -> Self {
        Argument::Binary(bytes)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(bytes: Vec<u8>) -> Self {
        Argument::Binary(Bytes::from(bytes))
    }
}

/// Raw ack callback supplied by the transport.
///
/// Invoking it sends the argument list back to the original sender. This
/// layer does not enforce single invocation; clones share the same
/// underlying callback.
#[derive(Clone)]
pub struct AckCallback(Arc<dyn Fn(Vec<Argument>) + Send + Sync>);

impl AckCallback {
    pub fn new(f: impl Fn(Vec<Argument>) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Send `arguments` back to the peer.
    pub fn invoke(&self, arguments: Vec<Argument>) {
        (self.0)(arguments)
    }
}

impl fmt::Debug for AckCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AckCallback(..)")
    }
}

/// A single named event with its arguments and optional ack.
#[derive(Debug, Clone)]
pub struct SocketIoEvent {
    /// Event name; decoders and encoders match on it
    pub name: String,
    /// Ordered arguments, element 0 is the primary payload
    pub arguments: Vec<Argument>,
    /// Reply channel back to the sender, if one was requested
    pub ack: Option<AckCallback>,
}

impl SocketIoEvent {
    /// Create an event without an ack callback.
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
            ack: None,
        }
    }

    /// Create an event with no arguments and no ack.
    pub fn no_args(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Attach an ack callback (builder pattern).
    pub fn with_ack(mut self, ack: AckCallback) -> Self {
        self.ack = Some(ack);
        self
    }

    /// Get the argument at `index`, if present.
    pub fn argument(&self, index: usize) -> Option<&Argument> {
        self.arguments.get(index)
    }

    pub fn has_ack(&self) -> bool {
        self.ack.is_some()
    }
}

/// Read the JSON argument at `index`; `context` names the event in errors.
pub(crate) fn json_at<'a>(context: &str, arguments: &'a [Argument], index: usize) -> Result<&'a Value> {
    match arguments.get(index) {
        Some(Argument::Json(value)) => Ok(value),
        Some(Argument::Binary(_)) => Err(CodecError::BinaryArgument {
            event: context.to_string(),
            index,
        }),
        None => Err(CodecError::MissingArgument {
            event: context.to_string(),
            index,
        }),
    }
}

/// Read the binary argument at `index`; `context` names the event in errors.
pub(crate) fn binary_at<'a>(context: &str, arguments: &'a [Argument], index: usize) -> Result<&'a Bytes> {
    match arguments.get(index) {
        Some(Argument::Binary(bytes)) => Ok(bytes),
        Some(Argument::Json(_)) => Err(CodecError::JsonArgument {
            event: context.to_string(),
            index,
        }),
        None => Err(CodecError::MissingArgument {
            event: context.to_string(),
            index,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_event_new() {
        let event = SocketIoEvent::new("chat message", vec![serde_json::json!({"text": "hi"}).into()]);
        assert_eq!(event.name, "chat message");
        assert_eq!(event.arguments.len(), 1);
        assert!(!event.has_ack());
    }

    #[test]
    fn test_event_no_args() {
        let event = SocketIoEvent::no_args("ping");
        assert!(event.arguments.is_empty());
        assert!(event.argument(0).is_none());
    }

    #[test]
    fn test_argument_accessors() {
        let json = Argument::from(serde_json::json!(1));
        let binary = Argument::from(vec![1u8, 2, 3]);

        assert_eq!(json.as_json(), Some(&serde_json::json!(1)));
        assert!(json.as_binary().is_none());
        assert!(!json.is_binary());

        assert_eq!(binary.as_binary().map(|b| &b[..]), Some(&[1u8, 2, 3][..]));
        assert!(binary.as_json().is_none());
        assert!(binary.is_binary());
    }

    #[test]
    fn test_ack_callback_invoke() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let ack = AckCallback::new(move |args| sink.lock().unwrap().push(args));

        let event = SocketIoEvent::no_args("join").with_ack(ack);
        assert!(event.has_ack());

        event.ack.as_ref().unwrap().invoke(vec![serde_json::json!("ok").into()]);
        event.ack.as_ref().unwrap().invoke(vec![]);

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], vec![Argument::Json(serde_json::json!("ok"))]);
    }

    #[test]
    fn test_cloned_event_shares_ack() {
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let event = SocketIoEvent::no_args("join").with_ack(AckCallback::new(move |_| {
            *counter.lock().unwrap() += 1;
        }));

        let cloned = event.clone();
        event.ack.unwrap().invoke(vec![]);
        cloned.ack.unwrap().invoke(vec![]);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn test_json_at() {
        let args: Vec<Argument> = vec![serde_json::json!({"a": 1}).into(), vec![9u8].into()];
        assert_eq!(json_at("e", &args, 0).unwrap()["a"], 1);
        assert!(matches!(
            json_at("e", &args, 1),
            Err(CodecError::BinaryArgument { index: 1, .. })
        ));
        assert!(matches!(
            json_at("e", &args, 2),
            Err(CodecError::MissingArgument { index: 2, .. })
        ));
    }

    #[test]
    fn test_binary_at() {
        let args: Vec<Argument> = vec![serde_json::json!(null).into(), vec![9u8].into()];
        assert_eq!(&binary_at("e", &args, 1).unwrap()[..], &[9u8]);
        assert!(matches!(
            binary_at("e", &args, 0),
            Err(CodecError::JsonArgument { index: 0, .. })
        ));
        assert!(matches!(
            binary_at("e", &[], 0),
            Err(CodecError::MissingArgument { index: 0, .. })
        ));
    }

    #[test]
    fn test_ack_callback_debug() {
        let ack = AckCallback::new(|_| {});
        assert_eq!(format!("{:?}", ack), "AckCallback(..)");
    }
}
