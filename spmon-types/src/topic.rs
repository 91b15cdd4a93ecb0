use std::fmt;

use thiserror::Error;

use crate::constants::{
    DBIRTH, DCMD, DDATA, DDEATH, NBIRTH, NCMD, NDATA, NDEATH, SPBV01, STATE,
};

/// The message type segment of a Sparkplug topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    NBirth,
    NDeath,
    NData,
    NCmd,
    DBirth,
    DDeath,
    DData,
    DCmd,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::NBirth => NBIRTH,
            MessageType::NDeath => NDEATH,
            MessageType::NData => NDATA,
            MessageType::NCmd => NCMD,
            MessageType::DBirth => DBIRTH,
            MessageType::DDeath => DDEATH,
            MessageType::DData => DDATA,
            MessageType::DCmd => DCMD,
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            NBIRTH => Some(MessageType::NBirth),
            NDEATH => Some(MessageType::NDeath),
            NDATA => Some(MessageType::NData),
            NCMD => Some(MessageType::NCmd),
            DBIRTH => Some(MessageType::DBirth),
            DDEATH => Some(MessageType::DDeath),
            DDATA => Some(MessageType::DData),
            DCMD => Some(MessageType::DCmd),
            _ => None,
        }
    }

    /// Node scoped message types belong on 4 segment topics.
    pub fn is_node_scope(&self) -> bool {
        matches!(
            self,
            MessageType::NBirth | MessageType::NDeath | MessageType::NData | MessageType::NCmd
        )
    }

    /// Device scoped message types belong on 5 segment topics.
    pub fn is_device_scope(&self) -> bool {
        !self.is_node_scope()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for topic validation.
///
/// Any of these is a structural violation of the topic grammar; the event the
/// topic arrived on must be dropped without touching monitor state.
#[derive(Error, Debug, PartialEq)]
pub enum TopicParseError {
    #[error("topic is not under the {SPBV01} or {STATE} namespaces")]
    UnknownNamespace,
    #[error("expected 4 or 5 topic segments, got {0}")]
    InvalidSegmentCount(usize),
    #[error("a {STATE} topic has exactly 2 segments, got {0}")]
    InvalidStateSegmentCount(usize),
    #[error("unknown message type segment '{0}'")]
    UnknownMessageType(String),
    #[error("message type {message_type} is not valid on a {segments} segment topic")]
    ScopeMismatch {
        message_type: MessageType,
        segments: usize,
    },
    #[error("topic segments must not be empty")]
    EmptySegment,
}

/// A validated Sparkplug topic, split into its segments.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedTopic {
    /// `spBv1.0/<group_id>/<message_type>/<node_id>`
    Node {
        group_id: String,
        message_type: MessageType,
        node_id: String,
    },
    /// `spBv1.0/<group_id>/<message_type>/<node_id>/<device_id>`
    Device {
        group_id: String,
        message_type: MessageType,
        node_id: String,
        device_id: String,
    },
    /// `STATE/<host_id>`
    State { host_id: String },
}

impl ParsedTopic {
    /// Splits and validates a topic string against the Sparkplug topic
    /// grammar.
    pub fn parse(topic: &str) -> Result<Self, TopicParseError> {
        let segments: Vec<&str> = topic.split('/').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(TopicParseError::EmptySegment);
        }
        match segments[0] {
            SPBV01 => Self::parse_sparkplug(&segments),
            STATE => Self::parse_state(&segments),
            _ => Err(TopicParseError::UnknownNamespace),
        }
    }

    fn parse_sparkplug(segments: &[&str]) -> Result<Self, TopicParseError> {
        if !matches!(segments.len(), 4 | 5) {
            return Err(TopicParseError::InvalidSegmentCount(segments.len()));
        }

        let message_type = MessageType::from_segment(segments[2])
            .ok_or_else(|| TopicParseError::UnknownMessageType(segments[2].into()))?;

        match segments.len() {
            4 => {
                if !message_type.is_node_scope() {
                    return Err(TopicParseError::ScopeMismatch {
                        message_type,
                        segments: 4,
                    });
                }
                Ok(ParsedTopic::Node {
                    group_id: segments[1].into(),
                    message_type,
                    node_id: segments[3].into(),
                })
            }
            5 => {
                if !message_type.is_device_scope() {
                    return Err(TopicParseError::ScopeMismatch {
                        message_type,
                        segments: 5,
                    });
                }
                Ok(ParsedTopic::Device {
                    group_id: segments[1].into(),
                    message_type,
                    node_id: segments[3].into(),
                    device_id: segments[4].into(),
                })
            }
            _ => unreachable!(),
        }
    }

    fn parse_state(segments: &[&str]) -> Result<Self, TopicParseError> {
        if segments.len() != 2 {
            return Err(TopicParseError::InvalidStateSegmentCount(segments.len()));
        }
        Ok(ParsedTopic::State {
            host_id: segments[1].into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_topic() {
        let topic = ParsedTopic::parse("spBv1.0/factory/NBIRTH/line1").unwrap();
        assert_eq!(
            topic,
            ParsedTopic::Node {
                group_id: "factory".into(),
                message_type: MessageType::NBirth,
                node_id: "line1".into()
            }
        );
    }

    #[test]
    fn test_parse_device_topic() {
        let topic = ParsedTopic::parse("spBv1.0/factory/DDATA/line1/sensor").unwrap();
        assert_eq!(
            topic,
            ParsedTopic::Device {
                group_id: "factory".into(),
                message_type: MessageType::DData,
                node_id: "line1".into(),
                device_id: "sensor".into()
            }
        );
    }

    #[test]
    fn test_parse_state_topic() {
        let topic = ParsedTopic::parse("STATE/scada1").unwrap();
        assert_eq!(
            topic,
            ParsedTopic::State {
                host_id: "scada1".into()
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_segment_counts() {
        assert_eq!(
            ParsedTopic::parse("spBv1.0/factory/NDATA"),
            Err(TopicParseError::InvalidSegmentCount(3))
        );
        assert_eq!(
            ParsedTopic::parse("spBv1.0/factory/DDATA/line1/sensor/extra"),
            Err(TopicParseError::InvalidSegmentCount(6))
        );
        assert_eq!(
            ParsedTopic::parse("STATE/scada1/extra"),
            Err(TopicParseError::InvalidStateSegmentCount(3))
        );
    }

    #[test]
    fn test_parse_rejects_scope_mismatch() {
        assert_eq!(
            ParsedTopic::parse("spBv1.0/factory/NDATA/line1/sensor"),
            Err(TopicParseError::ScopeMismatch {
                message_type: MessageType::NData,
                segments: 5
            })
        );
        assert_eq!(
            ParsedTopic::parse("spBv1.0/factory/DBIRTH/line1"),
            Err(TopicParseError::ScopeMismatch {
                message_type: MessageType::DBirth,
                segments: 4
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_namespace_and_type() {
        assert_eq!(
            ParsedTopic::parse("spAv1.0/factory/NDATA/line1"),
            Err(TopicParseError::UnknownNamespace)
        );
        assert_eq!(
            ParsedTopic::parse("spBv1.0/factory/XDATA/line1"),
            Err(TopicParseError::UnknownMessageType("XDATA".into()))
        );
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert_eq!(
            ParsedTopic::parse("spBv1.0//NDATA/line1"),
            Err(TopicParseError::EmptySegment)
        );
        assert_eq!(ParsedTopic::parse(""), Err(TopicParseError::EmptySegment));
    }
}
