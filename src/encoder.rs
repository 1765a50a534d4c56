//! Event encoders.
//!
//! An `EventEncoder<T>` is a partial function from `T` to a raw event.
//! Application messages are usually a closed enum; each variant gets its
//! own encoder (`lift` projects the enum onto the variant payload) and an
//! `EncoderTable` selects the encoder by the value's variant tag.

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::ack::{AckDecoder, AckReply};
use crate::error::{CodecError, Result};
use crate::event::{AckCallback, Argument, SocketIoEvent};

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type EncodeFn<T> = Arc<dyn Fn(&T) -> Result<SocketIoEvent> + Send + Sync>;

/// Runtime variant tag of an application message.
///
/// Implemented by the application's message enum so encoders can be
/// selected by variant instead of by runtime type.
pub trait Variant {
    fn variant(&self) -> &str;
}

/// Partial conversion from `T` to a `SocketIoEvent`.
pub struct EventEncoder<T> {
    applies: Predicate<T>,
    encode: EncodeFn<T>,
}

impl<T: 'static> EventEncoder<T> {
    /// Create an encoder that applies to every `T`.
    pub fn new(encode: impl Fn(&T) -> Result<SocketIoEvent> + Send + Sync + 'static) -> Self {
        Self {
            applies: Arc::new(|_: &T| true),
            encode: Arc::new(encode),
        }
    }

    /// Create an encoder that only applies where `applies` holds.
    pub fn partial(
        applies: impl Fn(&T) -> bool + Send + Sync + 'static,
        encode: impl Fn(&T) -> Result<SocketIoEvent> + Send + Sync + 'static,
    ) -> Self {
        Self {
            applies: Arc::new(applies),
            encode: Arc::new(encode),
        }
    }

    /// Check whether this encoder handles `value`.
    pub fn is_defined_at(&self, value: &T) -> bool {
        (self.applies)(value)
    }

    /// Encode `value`.
    ///
    /// Returns `CodecError::NotApplicable` when the encoder does not handle
    /// the value; callers should check with [`Self::is_defined_at`] or use
    /// [`Self::dispatch`].
    pub fn encode(&self, value: &T) -> Result<SocketIoEvent> {
        if !self.is_defined_at(value) {
            return Err(not_applicable::<T>());
        }
        (self.encode)(value)
    }

    /// Encode `value` if this encoder handles it.
    pub fn dispatch(&self, value: &T) -> Option<Result<SocketIoEvent>> {
        if self.is_defined_at(value) {
            Some((self.encode)(value))
        } else {
            None
        }
    }

    /// Adapt the encoder to accept `S` by converting it to `T` first.
    pub fn contramap<S: 'static>(self, f: impl Fn(&S) -> T + Send + Sync + 'static) -> EventEncoder<S> {
        let f = Arc::new(f);
        let convert = f.clone();
        let applies = self.applies;
        let encode = self.encode;
        EventEncoder {
            applies: Arc::new(move |value: &S| applies(&convert(value))),
            encode: Arc::new(move |value: &S| encode(&f(value))),
        }
    }

    /// Lift the encoder onto a wider message type.
    ///
    /// The result applies to exactly those `M` values that `project` maps
    /// to a `T` this encoder handles.
    pub fn lift<M: 'static>(
        self,
        project: impl Fn(&M) -> Option<&T> + Send + Sync + 'static,
    ) -> EventEncoder<M> {
        let project = Arc::new(project);
        let select = project.clone();
        let applies = self.applies;
        let encode = self.encode;
        EventEncoder {
            applies: Arc::new(move |value: &M| select(value).is_some_and(|inner| applies(inner))),
            encode: Arc::new(move |value: &M| match project(value) {
                Some(inner) => encode(inner),
                None => Err(not_applicable::<M>()),
            }),
        }
    }

    /// Attach a handler for the peer's ack reply.
    ///
    /// The encoded event carries a raw ack callback that decodes the reply
    /// with `ack_decoder` and forwards the result, success or failure, to
    /// the handler paired with the value.
    pub fn with_ack<A: 'static>(
        self,
        ack_decoder: AckDecoder<A>,
    ) -> EventEncoder<(T, AckReply<Result<A>>)> {
        let applies = self.applies;
        let encode = self.encode;
        EventEncoder {
            applies: Arc::new(move |(value, _): &(T, AckReply<Result<A>>)| applies(value)),
            encode: Arc::new(move |(value, handler): &(T, AckReply<Result<A>>)| {
                let event = encode(value)?;
                let name = event.name.clone();
                let handler = handler.clone();
                let ack_decoder = ack_decoder.clone();
                Ok(event.with_ack(AckCallback::new(move |arguments| {
                    let reply = ack_decoder.decode_reply_to(&name, &arguments);
                    if let Err(e) = handler.reply(reply) {
                        tracing::warn!(event = %name, error = %e, "Ack handler failed");
                    }
                })))
            }),
        }
    }

    /// Try `self`, then `other`.
    pub fn or_else(self, other: EventEncoder<T>) -> Self {
        Self::first_of([self, other])
    }

    /// Combine encoders into one that uses the first applicable encoder.
    pub fn first_of(encoders: impl IntoIterator<Item = EventEncoder<T>>) -> Self {
        let encoders: Arc<[EventEncoder<T>]> = encoders.into_iter().collect();
        let candidates = encoders.clone();
        Self {
            applies: Arc::new(move |value: &T| {
                candidates.iter().any(|encoder| encoder.is_defined_at(value))
            }),
            encode: Arc::new(move |value: &T| {
                let (index, encoder) = encoders
                    .iter()
                    .enumerate()
                    .find(|(_, e)| e.is_defined_at(value))
                    .ok_or_else(not_applicable::<T>)?;
                tracing::debug!(encoder = index, "Encoder matched");
                (encoder.encode)(value)
            }),
        }
    }
}

impl<T: Serialize + 'static> EventEncoder<T> {
    /// Encode the value as the single JSON argument of an event named `name`.
    pub fn from_json(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(move |value| {
            let json = serde_json::to_value(value)?;
            Ok(SocketIoEvent::new(name.clone(), vec![Argument::Json(json)]))
        })
    }
}

impl<M: Variant + 'static> EventEncoder<M> {
    /// Build a dispatcher over `table`.
    ///
    /// The encoder registered for the value's variant is looked up first and
    /// then asked whether it handles the value; a miss at either step makes
    /// the dispatcher inapplicable.
    pub fn compose(table: EncoderTable<M>) -> Self {
        let table = Arc::new(table);
        let candidates = table.clone();
        Self {
            applies: Arc::new(move |value: &M| {
                candidates
                    .get(value.variant())
                    .is_some_and(|encoder| encoder.is_defined_at(value))
            }),
            encode: Arc::new(move |value: &M| {
                let variant = value.variant();
                let encoder = table
                    .get(variant)
                    .filter(|encoder| encoder.is_defined_at(value))
                    .ok_or_else(|| CodecError::NotApplicable(format!("variant '{}'", variant)))?;
                tracing::debug!(variant = %variant, "Encoder selected by variant");
                (encoder.encode)(value)
            }),
        }
    }
}

fn not_applicable<T>() -> CodecError {
    CodecError::NotApplicable(format!("value of {}", type_name::<T>()))
}

impl<T> Clone for EventEncoder<T> {
    fn clone(&self) -> Self {
        Self {
            applies: self.applies.clone(),
            encode: self.encode.clone(),
        }
    }
}

impl<T> fmt::Debug for EventEncoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEncoder").finish_non_exhaustive()
    }
}

/// Encoders keyed by message variant tag.
pub struct EncoderTable<M> {
    encoders: HashMap<String, EventEncoder<M>>,
}

impl<M: 'static> EncoderTable<M> {
    pub fn new() -> Self {
        Self {
            encoders: HashMap::new(),
        }
    }

    /// Register an encoder for `variant` (builder pattern).
    ///
    /// The first registration for a variant wins; later ones are ignored.
    pub fn register(mut self, variant: impl Into<String>, encoder: EventEncoder<M>) -> Self {
        let variant = variant.into();
        if self.encoders.contains_key(&variant) {
            tracing::warn!(variant = %variant, "Encoder already registered for variant, ignoring");
            return self;
        }
        self.encoders.insert(variant, encoder);
        self
    }

    /// Get the encoder registered for `variant`.
    pub fn get(&self, variant: &str) -> Option<&EventEncoder<M>> {
        self.encoders.get(variant)
    }

    /// Registered variant tags, sorted.
    pub fn variants(&self) -> Vec<&str> {
        let mut variants: Vec<&str> = self.encoders.keys().map(String::as_str).collect();
        variants.sort_unstable();
        variants
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

impl<M: 'static> Default for EncoderTable<M> {
    fn default() -> Self {
        Self::new()
    }
}
