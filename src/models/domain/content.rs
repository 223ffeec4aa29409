/// A labeled button in a button-template message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonSpec {
    pub title: String,
    pub payload: String,
}

impl ButtonSpec {
    pub fn new(title: &str, payload: &str) -> Self {
        ButtonSpec {
            title: title.to_string(),
            payload: payload.to_string(),
        }
    }
}

/// Outbound message content, one variant per transport message shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundContent {
    Text(String),
    QuickReplies { text: String, labels: Vec<String> },
    Buttons { text: String, buttons: Vec<ButtonSpec> },
}

impl OutboundContent {
    pub fn text(value: impl Into<String>) -> Self {
        OutboundContent::Text(value.into())
    }
}
