//! Dispatch integration tests
//!
//! Exercises composed decoders and encoders through the public API the way
//! a transport would: inbound events through one dispatcher, outbound
//! messages through a variant-keyed encoder table, acks in both directions.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::json;
use socketio_codec::{
    AckCallback, AckDecoder, AckEncoder, AckReply, Argument, CodecError, EncoderTable,
    EventDecoder, EventEncoder, SocketIoEvent, Variant, decode_json, decode_no_args, decoders,
    encode_json, encode_no_args,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatMessage {
    text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Nick {
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Outbound {
    Chat(ChatMessage),
    Rename(Nick),
    Ping,
}

impl Variant for Outbound {
    fn variant(&self) -> &str {
        match self {
            Outbound::Chat(_) => "chat",
            Outbound::Rename(_) => "rename",
            Outbound::Ping => "ping",
        }
    }
}

fn as_chat(message: &Outbound) -> Option<&ChatMessage> {
    match message {
        Outbound::Chat(chat) => Some(chat),
        _ => None,
    }
}

fn as_rename(message: &Outbound) -> Option<&Nick> {
    match message {
        Outbound::Rename(nick) => Some(nick),
        _ => None,
    }
}

fn as_ping(message: &Outbound) -> Option<&()> {
    match message {
        Outbound::Ping => Some(&()),
        _ => None,
    }
}

fn outbound_encoder() -> EventEncoder<Outbound> {
    EventEncoder::compose(
        EncoderTable::new()
            .register("chat", encode_json::<ChatMessage>("chat message").lift(as_chat))
            .register("rename", encode_json::<Nick>("rename").lift(as_rename))
            .register("ping", encode_no_args("ping").lift(as_ping)),
    )
}

fn inbound_decoder() -> EventDecoder<Outbound> {
    decoders([
        decode_json::<ChatMessage>("chat message").map(Outbound::Chat),
        decode_json::<Nick>("rename").map(Outbound::Rename),
        decode_no_args("ping").map(|_| Outbound::Ping),
    ])
}

fn chat(text: &str) -> ChatMessage {
    ChatMessage {
        text: text.to_string(),
    }
}

/// Integration test: everything the encoder table emits, the decoder set reads back
#[test]
fn test_outbound_inbound_roundtrip() {
    let encoder = outbound_encoder();
    let decoder = inbound_decoder();

    for message in [
        Outbound::Chat(chat("hi")),
        Outbound::Rename(Nick { name: "ada".into() }),
        Outbound::Ping,
    ] {
        let event = encoder.encode(&message).unwrap();
        assert_eq!(decoder.decode(&event).unwrap(), message);
    }
}

/// Integration test: the chat message scenario, both directions
#[test]
fn test_chat_message_scenario() {
    let event = SocketIoEvent::new("chat message", vec![Argument::Json(json!({"text": "hi"}))]);
    assert_eq!(
        decode_json::<ChatMessage>("chat message").decode(&event).unwrap(),
        chat("hi")
    );

    let other = SocketIoEvent::new("other", vec![Argument::Json(json!({"text": "hi"}))]);
    assert!(decode_json::<ChatMessage>("chat message").dispatch(&other).is_none());

    let encoded = encode_json::<ChatMessage>("chat message").encode(&chat("hi")).unwrap();
    assert_eq!(encoded.name, "chat message");
    assert_eq!(encoded.arguments, vec![Argument::Json(json!({"text": "hi"}))]);
    assert!(encoded.ack.is_none());
}

/// Integration test: unknown events are not applicable, not errors
#[test]
fn test_unknown_event_falls_through() {
    let decoder = inbound_decoder();
    let event = SocketIoEvent::no_args("disconnecting");
    assert!(!decoder.is_defined_at(&event));
    assert!(decoder.decode(&event).unwrap_err().is_not_applicable());
}

/// Integration test: a chosen decoder's failure is reported, not defaulted
#[test]
fn test_missing_argument_is_reported() {
    let result = inbound_decoder()
        .dispatch(&SocketIoEvent::no_args("chat message"))
        .expect("chat message decoder applies");
    assert!(matches!(result, Err(CodecError::MissingArgument { index: 0, .. })));
}

/// Integration test: same-name registration resolves to the first decoder
#[test]
fn test_same_name_priority() {
    let decoder = decoders([
        decode_json::<ChatMessage>("chat message").map(|m| format!("first:{}", m.text)),
        decode_json::<ChatMessage>("chat message").map(|m| format!("second:{}", m.text)),
    ]);
    let event = SocketIoEvent::new("chat message", vec![Argument::Json(json!({"text": "x"}))]);
    assert_eq!(decoder.decode(&event).unwrap(), "first:x");
}

/// Integration test: a typed ack travels from receiver back to sender
#[test]
fn test_ack_roundtrip() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let handler = AckReply::new(move |nick: socketio_codec::Result<Nick>| {
        sink.lock().unwrap().push(nick.unwrap())
    });

    let sender = encode_json::<ChatMessage>("chat message").with_ack(AckDecoder::<Nick>::json());
    let event = sender.encode(&(chat("who?"), handler)).unwrap();
    assert!(event.has_ack());

    let receiver = decode_json::<ChatMessage>("chat message").with_ack(AckEncoder::<Nick>::json());
    let (message, reply) = receiver.decode(&event).unwrap();
    assert_eq!(message, chat("who?"));

    let nick = Nick { name: "ada".into() };
    reply.reply(nick.clone()).unwrap();
    assert_eq!(*received.lock().unwrap(), vec![nick]);
}

/// Integration test: with_maybe_ack mirrors whether the transport attached an ack
#[test]
fn test_maybe_ack_presence() {
    let decoder = decode_no_args("ping").with_maybe_ack(AckEncoder::<()>::no_args());

    let (_, reply) = decoder.decode(&SocketIoEvent::no_args("ping")).unwrap();
    assert!(reply.is_none());

    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    let event = SocketIoEvent::no_args("ping").with_ack(AckCallback::new(move |arguments| {
        assert!(arguments.is_empty());
        *counter.lock().unwrap() += 1;
    }));
    let (_, reply) = decoder.decode(&event).unwrap();
    reply.expect("ack attached").reply(()).unwrap();
    assert_eq!(*calls.lock().unwrap(), 1);
}

/// Integration test: codecs are shareable across threads
#[test]
fn test_codecs_are_send_and_sync() {
    let decoder = inbound_decoder();
    let encoder = outbound_encoder();

    let handle = std::thread::spawn(move || {
        let event = encoder.encode(&Outbound::Ping).unwrap();
        decoder.decode(&event).unwrap()
    });
    assert_eq!(handle.join().unwrap(), Outbound::Ping);
}
