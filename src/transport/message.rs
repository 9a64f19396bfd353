use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reply to a client `ping`.
pub const PONG_MESSAGE: &str = r#"{"type":"pong"}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Ping,
    Pong,
    Subscribe,
    Unsubscribe,
    Publish,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Publish => "publish",
        };
        f.write_str(name)
    }
}

/// Routing envelope of every client frame.
///
/// `data` is kept as an opaque JSON object. The relay never looks inside it
/// and forwards the original frame rather than this parsed form.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: MessageKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub topic: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl Envelope {
    pub fn parse(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }

    pub fn ping() -> Self {
        Self {
            kind: MessageKind::Ping,
            topics: Vec::new(),
            topic: String::new(),
            data: None,
        }
    }
}
