//! Stable ids for the conformance assertions the monitor can produce.
//!
//! The ids are shared with the report consumer and must not change between
//! releases. Several of the host application `bdSeq` ids are deliberately
//! evaluated from a single check on host will messages, because the Sparkplug
//! specification cross references the same requirement from several angles.

/// Edge node ids must be unique across the namespace they appear in.
pub const EDGE_NODE_ID_UNIQUENESS: &str = "intro-edge-node-id-uniqueness";

/// A device id may be reused under a different edge node.
pub const DUPLICATE_DEVICE_ID_ACROSS_EDGE_NODE: &str =
    "topic-structure-namespace-duplicate-device-id-across-edge-node";

/// At most one MQTT client may publish under a given edge node descriptor.
pub const UNIQUE_EDGE_NODE_DESCRIPTOR: &str =
    "topic-structure-namespace-unique-edge-node-descriptor";

/// A device id must be unique within its edge node's set of live devices.
pub const UNIQUE_DEVICE_ID: &str = "topic-structure-namespace-unique-device-id";

/// NBIRTH payloads must carry a `seq` in the range 0-255.
pub const NBIRTH_SEQ: &str = "payloads-nbirth-seq";

/// The edge node descriptor claimed by an NBIRTH must not already be in use.
pub const NBIRTH_EDGE_NODE_DESCRIPTOR: &str = "payloads-nbirth-edge-node-descriptor";

/// NDATA metrics must have been declared in the node's birth certificate.
pub const NBIRTH_METRIC_REQS: &str = "topics-nbirth-metric-reqs";

/// DDATA metrics must have been declared in the device's birth certificate.
pub const DBIRTH_METRIC_REQS: &str = "topics-dbirth-metric-reqs";

/// Template instances must reference a template definition declared in the
/// birth certificate.
pub const NBIRTH_TEMPLATES: &str = "topics-nbirth-templates";

/// Each edge node session's will message `bdSeq` must be one greater than the
/// previous session's.
pub const NBIRTH_BDSEQ_INCREMENT: &str = "topics-nbirth-bdseq-increment";

/// NDATA `seq` values must increment by one, modulo 256.
pub const NDATA_SEQ_INC: &str = "payloads-ndata-seq-inc";

/// DBIRTH `seq` values must increment the parent node's counter by one.
pub const DBIRTH_SEQ_INC: &str = "payloads-dbirth-seq-inc";

/// DDEATH `seq` values must increment the parent node's counter by one.
pub const DDEATH_SEQ_INC: &str = "payloads-ddeath-seq-inc";

/// DDATA `seq` values must increment the parent node's counter by one.
pub const DDATA_SEQ_INC: &str = "payloads-ddata-seq-inc";

/// DBIRTH payloads must carry a `seq` continuing the node's sequence.
pub const DBIRTH_PAYLOAD_SEQ: &str = "message-flow-device-birth-publish-dbirth-payload-seq";

/// Host application STATE will payloads must carry a correctly incrementing
/// UInt64 `bdSeq` metric.
pub const STATE_WILL_MESSAGE_PAYLOAD_BDSEQ: &str = "payloads-state-will-message-payload-bdseq";

/// Host application death payload `bdSeq` correctness.
pub const HOST_DEATH_PAYLOAD_BDSEQ: &str = "host-topic-phid-death-payload-bdseq";

/// Will message payload `bdSeq` correctness at session establishment.
pub const EDGE_WILL_MESSAGE_PAYLOAD_BDSEQ: &str =
    "message-flow-edge-node-birth-publish-will-message-payload-bdseq";

/// Host application connect will payload `bdSeq` correctness.
pub const HOST_CONNECT_WILL_PAYLOAD_BDSEQ: &str =
    "operational-behavior-host-application-connect-will-payload-bdseq";

/// Host application death payload `bdSeq` correctness at session termination.
pub const HOST_DEATH_BDSEQ: &str = "operational-behavior-host-application-death-payload-bdseq";

/// Every assertion id the monitor can produce, in report order.
pub const ALL: &[&str] = &[
    EDGE_NODE_ID_UNIQUENESS,
    DUPLICATE_DEVICE_ID_ACROSS_EDGE_NODE,
    UNIQUE_EDGE_NODE_DESCRIPTOR,
    UNIQUE_DEVICE_ID,
    DBIRTH_SEQ_INC,
    NBIRTH_SEQ,
    NBIRTH_EDGE_NODE_DESCRIPTOR,
    NBIRTH_METRIC_REQS,
    DBIRTH_METRIC_REQS,
    NBIRTH_TEMPLATES,
    NBIRTH_BDSEQ_INCREMENT,
    NDATA_SEQ_INC,
    DDATA_SEQ_INC,
    DDEATH_SEQ_INC,
    DBIRTH_PAYLOAD_SEQ,
    STATE_WILL_MESSAGE_PAYLOAD_BDSEQ,
    HOST_DEATH_PAYLOAD_BDSEQ,
    EDGE_WILL_MESSAGE_PAYLOAD_BDSEQ,
    HOST_CONNECT_WILL_PAYLOAD_BDSEQ,
    HOST_DEATH_BDSEQ,
];

/// The host will message `bdSeq` check updates all of these together, from
/// one evaluation.
pub const HOST_WILL_BDSEQ_GROUP: &[&str] = &[
    STATE_WILL_MESSAGE_PAYLOAD_BDSEQ,
    HOST_DEATH_PAYLOAD_BDSEQ,
    EDGE_WILL_MESSAGE_PAYLOAD_BDSEQ,
    HOST_CONNECT_WILL_PAYLOAD_BDSEQ,
    HOST_DEATH_BDSEQ,
];
