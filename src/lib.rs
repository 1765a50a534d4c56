//! socketio-codec - Typed codecs for Socket.IO-style events
//!
//! Converts between untyped wire events (a name, ordered JSON/binary
//! arguments, an optional ack callback) and application types. Decoders and
//! encoders are partial functions that compose first-match-wins; ack codecs
//! translate reply payloads in both directions.

pub mod ack;
pub mod codecs;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod event;

pub use ack::{AckDecoder, AckEncoder, AckReply};
pub use codecs::{
    decode_binary, decode_json, decode_no_args, decoders, encode_binary, encode_json,
    encode_no_args, encoders,
};
pub use decoder::EventDecoder;
pub use encoder::{EncoderTable, EventEncoder, Variant};
pub use error::{CodecError, Result};
pub use event::{AckCallback, Argument, SocketIoEvent};
