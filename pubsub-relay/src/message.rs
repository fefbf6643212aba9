use serde::{Deserialize, Serialize};

/// The fixed channel set: the publisher picks from these, the subscriber
/// listens on all of them.
pub const CHANNELS: [&str; 2] = ["channel-1", "channel-2"];

/// Payload published on every tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayMessage {
    pub message: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_to_the_wire_shape() {
        let payload = RelayMessage { message: 0.5 };
        assert_eq!(
            serde_json::to_string(&payload).expect("serializes"),
            "{\"message\":0.5}"
        );
    }
}
