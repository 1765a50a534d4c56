//! Demo chat protocol used by the `sioc` commands.
//!
//! Five events, one per `ChatEvent` variant. Messages and joins can be
//! acknowledged with a `Receipt`.

use serde::{Deserialize, Serialize};

use socketio_codec::{
    AckEncoder, AckReply, EncoderTable, EventDecoder, EventEncoder, Variant, decode_binary,
    decode_json, decode_no_args, decoders, encode_binary, encode_json, encode_no_args,
};

use crate::config::EventNames;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(with = "hex::serde")]
    pub data: Vec<u8>,
}

/// Every message the chat protocol carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Message(ChatMessage),
    Join(Room),
    Leave(Room),
    Typing,
    Upload(Attachment),
}

impl Variant for ChatEvent {
    fn variant(&self) -> &str {
        match self {
            ChatEvent::Message(_) => "message",
            ChatEvent::Join(_) => "join",
            ChatEvent::Leave(_) => "leave",
            ChatEvent::Typing => "typing",
            ChatEvent::Upload(_) => "upload",
        }
    }
}

impl ChatEvent {
    fn as_message(&self) -> Option<&ChatMessage> {
        match self {
            ChatEvent::Message(message) => Some(message),
            _ => None,
        }
    }

    fn as_join(&self) -> Option<&Room> {
        match self {
            ChatEvent::Join(room) => Some(room),
            _ => None,
        }
    }

    fn as_leave(&self) -> Option<&Room> {
        match self {
            ChatEvent::Leave(room) => Some(room),
            _ => None,
        }
    }

    fn as_typing(&self) -> Option<&()> {
        match self {
            ChatEvent::Typing => Some(&()),
            _ => None,
        }
    }

    fn as_upload(&self) -> Option<&Attachment> {
        match self {
            ChatEvent::Upload(attachment) => Some(attachment),
            _ => None,
        }
    }
}

/// Ack payload acknowledging a received event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub event: String,
    pub sequence: u64,
}

/// A decoded inbound event and, if the sender asked for one, its reply.
pub type Inbound = (ChatEvent, Option<AckReply<Receipt>>);

/// Build the inbound dispatcher.
///
/// With `require_ack_for_messages`, a chat message without an ack callback
/// is a decode failure instead of a message with no reply.
pub fn decoder(names: &EventNames, require_ack_for_messages: bool) -> EventDecoder<Inbound> {
    let message = decode_json::<ChatMessage>(&names.message).map(ChatEvent::Message);
    let message = if require_ack_for_messages {
        message
            .with_ack(AckEncoder::<Receipt>::json())
            .map(|(event, reply)| (event, Some(reply)))
    } else {
        message.with_maybe_ack(AckEncoder::<Receipt>::json())
    };

    decoders([
        message,
        decode_json::<Room>(&names.join)
            .map(ChatEvent::Join)
            .with_maybe_ack(AckEncoder::<Receipt>::json()),
        decode_json::<Room>(&names.leave)
            .map(ChatEvent::Leave)
            .map(|event| (event, None)),
        decode_no_args(&names.typing)
            .map(|_| ChatEvent::Typing)
            .map(|event| (event, None)),
        decode_binary(&names.upload)
            .map(|bytes| ChatEvent::Upload(Attachment { data: bytes.to_vec() }))
            .map(|event| (event, None)),
    ])
}

/// Encoders for each variant, keyed by variant tag.
pub fn encoder_table(names: &EventNames) -> EncoderTable<ChatEvent> {
    EncoderTable::new()
        .register(
            "message",
            encode_json::<ChatMessage>(&names.message).lift(ChatEvent::as_message),
        )
        .register("join", encode_json::<Room>(&names.join).lift(ChatEvent::as_join))
        .register("leave", encode_json::<Room>(&names.leave).lift(ChatEvent::as_leave))
        .register("typing", encode_no_args(&names.typing).lift(ChatEvent::as_typing))
        .register(
            "upload",
            encode_binary(&names.upload)
                .contramap(|attachment: &Attachment| attachment.data.clone().into())
                .lift(ChatEvent::as_upload),
        )
}

/// Build the outbound dispatcher.
pub fn encoder(names: &EventNames) -> EventEncoder<ChatEvent> {
    EventEncoder::compose(encoder_table(names))
}
