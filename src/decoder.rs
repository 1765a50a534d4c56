//! Event decoders.
//!
//! An `EventDecoder<T>` is a partial function from a raw event to `T`: an
//! applicability predicate plus a fallible conversion. Decoders compose
//! first-match-wins, in registration order.

use std::fmt;
use std::sync::Arc;

use crate::ack::{AckEncoder, AckReply};
use crate::error::{CodecError, Result};
use crate::event::{AckCallback, SocketIoEvent};

type Predicate = Arc<dyn Fn(&SocketIoEvent) -> bool + Send + Sync>;
type DecodeFn<T> = Arc<dyn Fn(&SocketIoEvent) -> Result<T> + Send + Sync>;

/// Partial conversion from a `SocketIoEvent` to `T`.
pub struct EventDecoder<T> {
    names: Vec<String>,
    applies: Predicate,
    decode: DecodeFn<T>,
}

impl<T: 'static> EventDecoder<T> {
    /// Create a decoder from an applicability predicate and a conversion.
    ///
    /// The conversion is only ever called on events the predicate accepts.
    pub fn new(
        applies: impl Fn(&SocketIoEvent) -> bool + Send + Sync + 'static,
        decode: impl Fn(&SocketIoEvent) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            names: Vec::new(),
            applies: Arc::new(applies),
            decode: Arc::new(decode),
        }
    }

    /// Create a decoder for events named `name`.
    pub fn named(
        name: impl Into<String>,
        decode: impl Fn(&SocketIoEvent) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let expected = name.clone();
        Self {
            names: vec![name],
            applies: Arc::new(move |event: &SocketIoEvent| event.name == expected),
            decode: Arc::new(decode),
        }
    }

    /// Event names this decoder was registered for.
    ///
    /// Decoders built from a bare predicate contribute no names.
    pub fn event_names(&self) -> &[String] {
        &self.names
    }

    /// Check whether this decoder handles `event`.
    pub fn is_defined_at(&self, event: &SocketIoEvent) -> bool {
        (self.applies)(event)
    }

    /// Decode `event`.
    ///
    /// Returns `CodecError::NotApplicable` when the decoder does not handle
    /// the event; callers routing events should use [`Self::dispatch`].
    pub fn decode(&self, event: &SocketIoEvent) -> Result<T> {
        if !self.is_defined_at(event) {
            return Err(CodecError::NotApplicable(format!("event '{}'", event.name)));
        }
        (self.decode)(event)
    }

    /// Decode `event` if this decoder handles it.
    ///
    /// `None` means not applicable; `Some(Err(_))` is a decode failure.
    pub fn dispatch(&self, event: &SocketIoEvent) -> Option<Result<T>> {
        if self.is_defined_at(event) {
            Some((self.decode)(event))
        } else {
            None
        }
    }

    /// Transform the decoded value. Applicability is unchanged.
    pub fn map<S: 'static>(self, f: impl Fn(T) -> S + Send + Sync + 'static) -> EventDecoder<S> {
        let decode = self.decode;
        EventDecoder {
            names: self.names,
            applies: self.applies,
            decode: Arc::new(move |event: &SocketIoEvent| decode(event).map(&f)),
        }
    }

    /// Transform the decoded value with a conversion that may fail.
    pub fn try_map<S: 'static>(
        self,
        f: impl Fn(T) -> Result<S> + Send + Sync + 'static,
    ) -> EventDecoder<S> {
        let decode = self.decode;
        EventDecoder {
            names: self.names,
            applies: self.applies,
            decode: Arc::new(move |event: &SocketIoEvent| decode(event).and_then(&f)),
        }
    }

    /// Decode two facets of the same event.
    ///
    /// Applicability is that of `self`. `other` must be defined wherever
    /// `self` is; if it is not, decoding fails with `ZipPreconditionViolated`.
    /// That failure is final and composition does not fall through on it.
    pub fn zip<A: 'static>(self, other: EventDecoder<A>) -> EventDecoder<(T, A)> {
        let decode = self.decode;
        EventDecoder {
            names: self.names,
            applies: self.applies,
            decode: Arc::new(move |event: &SocketIoEvent| {
                let value = decode(event)?;
                if !other.is_defined_at(event) {
                    tracing::warn!(
                        event = %event.name,
                        "Zipped decoder not applicable to matched event"
                    );
                    return Err(CodecError::ZipPreconditionViolated(event.name.clone()));
                }
                Ok((value, (other.decode)(event)?))
            }),
        }
    }

    /// `zip` followed by `map(combine)`.
    pub fn zip_with<A: 'static, S: 'static>(
        self,
        other: EventDecoder<A>,
        combine: impl Fn(T, A) -> S + Send + Sync + 'static,
    ) -> EventDecoder<S> {
        self.zip(other).map(move |(value, other)| combine(value, other))
    }

    /// Pair the decoded value with a typed ack reply, if the event has an ack.
    pub fn with_maybe_ack<A: 'static>(
        self,
        ack_encoder: AckEncoder<A>,
    ) -> EventDecoder<(T, Option<AckReply<A>>)> {
        self.zip(EventDecoder::new(
            |_| true,
            move |event| Ok(event.ack.as_ref().map(|raw| typed_reply(raw, &ack_encoder))),
        ))
    }

    /// Pair the decoded value with a typed ack reply.
    ///
    /// Fails with `AckExpectedButAbsent` when the event carries no ack.
    pub fn with_ack<A: 'static>(self, ack_encoder: AckEncoder<A>) -> EventDecoder<(T, AckReply<A>)> {
        self.zip(EventDecoder::new(
            |_| true,
            move |event| match &event.ack {
                Some(raw) => Ok(typed_reply(raw, &ack_encoder)),
                None => Err(CodecError::AckExpectedButAbsent(event.name.clone())),
            },
        ))
    }

    /// Combine decoders into one that tries each in order.
    ///
    /// The first decoder defined at an event decodes it. A failure from that
    /// decoder is final; only inapplicability moves on to the next one, so
    /// more specific decoders must be registered first.
    pub fn compose(decoders: impl IntoIterator<Item = EventDecoder<T>>) -> Self {
        let decoders: Arc<[EventDecoder<T>]> = decoders.into_iter().collect();
        let names = decoders
            .iter()
            .flat_map(|d| d.names.iter().cloned())
            .collect();

        let candidates = decoders.clone();
        Self {
            names,
            applies: Arc::new(move |event: &SocketIoEvent| {
                candidates.iter().any(|d| d.is_defined_at(event))
            }),
            decode: Arc::new(move |event: &SocketIoEvent| {
                let (index, decoder) = decoders
                    .iter()
                    .enumerate()
                    .find(|(_, d)| d.is_defined_at(event))
                    .ok_or_else(|| CodecError::NotApplicable(format!("event '{}'", event.name)))?;
                tracing::debug!(event = %event.name, decoder = index, "Decoder matched");
                (decoder.decode)(event)
            }),
        }
    }

    /// Try `self`, then `other`.
    pub fn or_else(self, other: EventDecoder<T>) -> Self {
        Self::compose([self, other])
    }
}

fn typed_reply<A: 'static>(raw: &AckCallback, ack_encoder: &AckEncoder<A>) -> AckReply<A> {
    let raw = raw.clone();
    let ack_encoder = ack_encoder.clone();
    AckReply::try_new(move |value: A| {
        raw.invoke(ack_encoder.encode(&value)?);
        Ok(())
    })
}

impl<T> Clone for EventDecoder<T> {
    fn clone(&self) -> Self {
        Self {
            names: self.names.clone(),
            applies: self.applies.clone(),
            decode: self.decode.clone(),
        }
    }
}

impl<T> fmt::Debug for EventDecoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDecoder").field("names", &self.names).finish()
    }
}
