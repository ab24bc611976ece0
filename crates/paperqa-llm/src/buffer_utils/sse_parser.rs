use serde_json::Value;

use crate::ProtocolEvent;

/// Prefix marking a data-bearing line in the answer stream
pub const DATA_PREFIX: &str = "data: ";

/// Result of dispatching one framed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Event(ProtocolEvent),
    Ignored(Ignored),
}

/// Why a line produced no event. None of these abort the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ignored {
    /// Keep-alive, comment, blank or any other line without the data prefix
    NotData,
    /// Payload was not a JSON object with a string `type` matching its variant
    Malformed(String),
    /// Well-formed payload whose `type` is not one we know
    UnknownType(String),
}

impl Dispatch {
    pub fn into_event(self) -> Option<ProtocolEvent> {
        match self {
            Dispatch::Event(event) => Some(event),
            Dispatch::Ignored(_) => None,
        }
    }
}

/// Turn one framed line into at most one protocol event
pub fn dispatch_line(line: &str) -> Dispatch {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Dispatch::Ignored(Ignored::NotData);
    };

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => return Dispatch::Ignored(Ignored::Malformed(e.to_string())),
    };

    let kind = match value.get("type").and_then(Value::as_str) {
        Some(kind) => kind.to_owned(),
        None => {
            return Dispatch::Ignored(Ignored::Malformed(
                "missing string `type` field".to_string(),
            ))
        }
    };

    if !ProtocolEvent::KINDS.contains(&kind.as_str()) {
        return Dispatch::Ignored(Ignored::UnknownType(kind));
    }

    match serde_json::from_value::<ProtocolEvent>(value) {
        Ok(event) => Dispatch::Event(event),
        Err(e) => Dispatch::Ignored(Ignored::Malformed(format!("{kind}: {e}"))),
    }
}
