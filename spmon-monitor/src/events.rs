use spmon_types::payload::Payload;

/// An MQTT will message registered at connect time, with its payload already
/// decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct WillMessage {
    pub topic: String,
    pub payload: Payload,
}

/// Broker lifecycle events consumed by the monitor.
///
/// The hosting broker integration produces one of these per MQTT connect,
/// disconnect or publish it observes; payload decoding has already happened
/// by the time an event reaches the monitor.
#[derive(Clone, Debug, PartialEq)]
pub enum MonitorEvent {
    Connect {
        client_id: String,
        will: Option<WillMessage>,
    },
    Disconnect {
        client_id: String,
    },
    Publish {
        client_id: String,
        topic: String,
        payload: Payload,
    },
}
