//! Convenience constructors for the common argument shapes.
//!
//! - JSON: the payload is the single JSON argument
//! - Binary: the payload is the single binary argument
//! - No args: the event carries no payload
//!
//! Plus `decoders` / `encoders` for combining independently built codecs.

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

use crate::decoder::EventDecoder;
use crate::encoder::EventEncoder;
use crate::event::{Argument, SocketIoEvent, binary_at, json_at};

/// Decode events named `name` from their first argument as JSON.
pub fn decode_json<T: DeserializeOwned + 'static>(name: impl Into<String>) -> EventDecoder<T> {
    EventDecoder::named(name, |event| {
        let value = json_at(&event.name, &event.arguments, 0)?;
        Ok(T::deserialize(value)?)
    })
}

/// Decode events named `name` from their first argument as a binary blob.
pub fn decode_binary(name: impl Into<String>) -> EventDecoder<Bytes> {
    EventDecoder::named(name, |event| {
        binary_at(&event.name, &event.arguments, 0).cloned()
    })
}

/// Match events named `name`, ignoring any arguments.
pub fn decode_no_args(name: impl Into<String>) -> EventDecoder<()> {
    EventDecoder::named(name, |_| Ok(()))
}

/// Encode values as the single JSON argument of an event named `name`.
pub fn encode_json<T: Serialize + 'static>(name: impl Into<String>) -> EventEncoder<T> {
    EventEncoder::from_json(name)
}

/// Encode a binary blob as the single argument of an event named `name`.
pub fn encode_binary(name: impl Into<String>) -> EventEncoder<Bytes> {
    let name = name.into();
    EventEncoder::new(move |bytes: &Bytes| {
        Ok(SocketIoEvent::new(name.clone(), vec![Argument::Binary(bytes.clone())]))
    })
}

/// Encode `()` as an event named `name` with no arguments.
pub fn encode_no_args(name: impl Into<String>) -> EventEncoder<()> {
    let name = name.into();
    EventEncoder::new(move |_: &()| Ok(SocketIoEvent::no_args(name.clone())))
}

/// Combine decoders, first registered wins.
pub fn decoders<T: 'static>(decoders: impl IntoIterator<Item = EventDecoder<T>>) -> EventDecoder<T> {
    EventDecoder::compose(decoders)
}

/// Combine encoders, first applicable wins.
pub fn encoders<T: 'static>(encoders: impl IntoIterator<Item = EventEncoder<T>>) -> EventEncoder<T> {
    EventEncoder::first_of(encoders)
}
