/// An inbound webhook event, already unwrapped from the platform envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    Text(String),
    Attachment {
        url: String,
        content_type: Option<String>,
    },
    Postback(String),
}
