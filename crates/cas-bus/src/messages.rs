//! Bus message envelope and the subjects the service answers on.

use bytes::Bytes;

/// Subject for store requests: body is the blob, reply is its pointer.
pub const STORE_SUBJECT: &str = "conthesis.cas.store";

/// Subject for get requests: body is a pointer, reply is the stored bytes.
pub const GET_SUBJECT: &str = "conthesis.cas.get";

/// A message delivered by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Subject the message was published on.
    pub subject: String,
    /// Where to send the response, if the sender expects one.
    pub reply: Option<String>,
    pub payload: Bytes,
}

impl BusMessage {
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            reply: None,
            payload: payload.into(),
        }
    }

    /// Attach a reply subject.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }
}
