//! Ack codecs.
//!
//! Converters between an ack's argument list and a typed value. The caller
//! attaching an ack codec knows the reply shape statically, so there is no
//! applicability check here, only success or a conversion failure.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::event::{Argument, binary_at, json_at};

const ACK_CONTEXT: &str = "ack";

type ReplyFn<T> = Arc<dyn Fn(T) -> Result<()> + Send + Sync>;
type AckDecodeFn<T> = Arc<dyn Fn(&str, &[Argument]) -> Result<T> + Send + Sync>;

/// Typed reply function handed to application code.
///
/// Wraps a raw `AckCallback` together with the codec that translates the
/// typed value. Clones share the same raw callback.
pub struct AckReply<T>(ReplyFn<T>);

impl<T: 'static> AckReply<T> {
    pub fn new(f: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self(Arc::new(move |value: T| -> Result<()> {
            f(value);
            Ok(())
        }))
    }

    /// Create a reply whose delivery can fail, e.g. when the value cannot be
    /// encoded.
    pub fn try_new(f: impl Fn(T) -> Result<()> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Send `value` back to the peer.
    ///
    /// An error means nothing was sent.
    pub fn reply(&self, value: T) -> Result<()> {
        (self.0)(value)
    }
}

impl<T> Clone for AckReply<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> fmt::Debug for AckReply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AckReply(..)")
    }
}

/// Converts a peer's ack arguments into `T`.
pub struct AckDecoder<T> {
    decode: AckDecodeFn<T>,
}

impl<T: 'static> AckDecoder<T> {
    pub fn new(f: impl Fn(&[Argument]) -> Result<T> + Send + Sync + 'static) -> Self {
        Self::with_context(move |_, arguments| f(arguments))
    }

    /// Create a decoder that is told which ack it is reading, for error
    /// messages.
    fn with_context(f: impl Fn(&str, &[Argument]) -> Result<T> + Send + Sync + 'static) -> Self {
        Self { decode: Arc::new(f) }
    }

    /// Decode an ack argument list.
    pub fn decode(&self, arguments: &[Argument]) -> Result<T> {
        (self.decode)(ACK_CONTEXT, arguments)
    }

    /// Decode the ack sent in reply to the event named `event`.
    ///
    /// Errors name the event the ack answers.
    pub fn decode_reply_to(&self, event: &str, arguments: &[Argument]) -> Result<T> {
        (self.decode)(&format!("{} ({})", event, ACK_CONTEXT), arguments)
    }

    /// Transform the decoded value.
    pub fn map<S: 'static>(self, f: impl Fn(T) -> S + Send + Sync + 'static) -> AckDecoder<S> {
        let decode = self.decode;
        AckDecoder::with_context(move |context, arguments| decode(context, arguments).map(&f))
    }
}

impl<T: DeserializeOwned + 'static> AckDecoder<T> {
    /// Decode the first argument as JSON.
    pub fn json() -> Self {
        Self::with_context(|context, arguments| {
            let value = json_at(context, arguments, 0)?;
            Ok(T::deserialize(value)?)
        })
    }
}

impl AckDecoder<()> {
    /// Accept any ack, ignoring its arguments.
    pub fn no_args() -> Self {
        Self::new(|_| Ok(()))
    }
}

impl AckDecoder<Bytes> {
    /// Decode the first argument as a binary blob.
    pub fn binary() -> Self {
        Self::with_context(|context, arguments| binary_at(context, arguments, 0).cloned())
    }
}

impl<T> Clone for AckDecoder<T> {
    fn clone(&self) -> Self {
        Self {
            decode: self.decode.clone(),
        }
    }
}

/// Converts a typed reply into ack arguments.
pub struct AckEncoder<T> {
    encode: Arc<dyn Fn(&T) -> Result<Vec<Argument>> + Send + Sync>,
}

impl<T: 'static> AckEncoder<T> {
    pub fn new(f: impl Fn(&T) -> Result<Vec<Argument>> + Send + Sync + 'static) -> Self {
        Self { encode: Arc::new(f) }
    }

    /// Encode a reply value.
    pub fn encode(&self, value: &T) -> Result<Vec<Argument>> {
        (self.encode)(value)
    }

    /// Adapt the encoder to accept `S` by converting it to `T` first.
    pub fn contramap<S: 'static>(self, f: impl Fn(&S) -> T + Send + Sync + 'static) -> AckEncoder<S> {
        let encode = self.encode;
        AckEncoder::new(move |value| encode(&f(value)))
    }
}

impl<T: Serialize + 'static> AckEncoder<T> {
    /// Encode the reply as a single JSON argument.
    ///
    /// Fails with `Conversion` when serde cannot represent the value as JSON.
    pub fn json() -> Self {
        Self::new(|value| Ok(vec![Argument::Json(serde_json::to_value(value)?)]))
    }
}

impl AckEncoder<()> {
    /// Reply with an empty argument list.
    pub fn no_args() -> Self {
        Self::new(|_| Ok(Vec::new()))
    }
}

impl AckEncoder<Bytes> {
    /// Reply with a single binary argument.
    pub fn binary() -> Self {
        Self::new(|bytes| Ok(vec![Argument::Binary(bytes.clone())]))
    }
}

impl<T> Clone for AckEncoder<T> {
    fn clone(&self) -> Self {
        Self {
            encode: self.encode.clone(),
        }
    }
}
