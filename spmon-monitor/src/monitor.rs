use std::collections::HashMap;
use std::sync::Mutex;

use log::{debug, error, info, warn};

use spmon_types::{
    constants::BDSEQ,
    payload::{DataType, Metric, Payload},
    seq::{next_bdseq, next_seq},
    topic::{MessageType, ParsedTopic},
};

use crate::{
    assertions, BirthCertificate, BirthCertificateStore, MonitorEvent, NodeIdentifier,
    RegistryError, SessionRegistry, Verdict, VerdictLedger, WillMessage,
};

struct MonitorState {
    registry: SessionRegistry,
    births: BirthCertificateStore,
    ledger: VerdictLedger,
}

/// A passive conformance monitor for Sparkplug B MQTT traffic.
///
/// The monitor is invoked, never invoking: the hosting broker integration
/// feeds it every connect, disconnect and publish it observes, and the
/// monitor checks the traffic against the Sparkplug session lifecycle and
/// payload sequencing rules, recording a verdict per assertion id.
///
/// Events may arrive concurrently from the broker's worker threads; each one
/// is processed under a single internal lock so per entity state is always
/// read-modified-written atomically. No event ever aborts processing or
/// panics the dispatch path, a non-conformant message only updates the
/// ledger.
pub struct Monitor {
    state: Mutex<MonitorState>,
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MonitorState {
                registry: SessionRegistry::new(),
                births: BirthCertificateStore::new(),
                ledger: VerdictLedger::new(),
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MonitorState> {
        // a poisoned lock would mean a panic inside a handler; the state is
        // still consistent enough to keep monitoring the rest of the stream
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Resets all tracked assertions to [Verdict::NotExecuted].
    pub fn start_test(&self) {
        self.state().ledger.reset();
    }

    /// Resets all tracked assertions to [Verdict::NotExecuted].
    pub fn end_test(&self) {
        self.state().ledger.reset();
    }

    /// The current conformance report, keyed by labelled assertion id.
    pub fn results(&self) -> HashMap<String, Verdict> {
        self.state().ledger.labelled_results()
    }

    /// The ordered list of assertion ids this monitor can produce.
    pub fn test_ids(&self) -> &'static [&'static str] {
        assertions::ALL
    }

    /// Dispatches a broker event to the matching handler.
    pub fn handle_event(&self, event: MonitorEvent) {
        match event {
            MonitorEvent::Connect { client_id, will } => {
                self.on_connect(&client_id, will.as_ref())
            }
            MonitorEvent::Disconnect { client_id } => self.on_disconnect(&client_id),
            MonitorEvent::Publish {
                client_id,
                topic,
                payload,
            } => self.on_publish(&client_id, &topic, payload),
        }
    }

    /// Handles an MQTT connect, inspecting the will message if one was
    /// registered.
    ///
    /// An NDEATH will topic identifies an edge node session being
    /// established and drives the edge `bdSeq` continuity check; a STATE
    /// will topic drives the host application `bdSeq` checks.
    pub fn on_connect(&self, client_id: &str, will: Option<&WillMessage>) {
        debug!("client {client_id} connected");
        let Some(will) = will else { return };

        let parsed = match ParsedTopic::parse(&will.topic) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(
                    "ignoring will message of client {client_id} with invalid topic '{}': {e}",
                    will.topic
                );
                return;
            }
        };

        let mut state = self.state();
        match parsed {
            ParsedTopic::Node {
                group_id,
                message_type: MessageType::NDeath,
                node_id,
            } => {
                let id = NodeIdentifier::new(group_id, node_id);
                state.check_edge_will_bdseq(&id, &will.payload);
            }
            ParsedTopic::State { host_id } => {
                state.check_host_will_bdseq(&host_id, &will.payload);
            }
            _ => {}
        }
    }

    /// Handles an MQTT disconnect, clean or abrupt.
    ///
    /// Tearing down here must have identical session ending effects to an
    /// explicit NDEATH, otherwise registry entries leak and a later NBIRTH
    /// for the same descriptor would be rejected as a conflict.
    pub fn on_disconnect(&self, client_id: &str) {
        debug!("client {client_id} disconnected");
        let mut state = self.state();
        if let Some(id) = state.registry.on_disconnect(client_id) {
            info!("removed edge node {id} for client {client_id} on disconnect");
        }
    }

    /// Handles a publish observed by the broker.
    ///
    /// Structurally invalid topics are discarded without touching any state.
    pub fn on_publish(&self, client_id: &str, topic: &str, payload: Payload) {
        let parsed = match ParsedTopic::parse(topic) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("discarding publish on topic '{topic}': {e}");
                return;
            }
        };

        let mut state = self.state();
        match parsed {
            ParsedTopic::Node {
                group_id,
                message_type,
                node_id,
            } => {
                let id = NodeIdentifier::new(group_id, node_id);
                match message_type {
                    MessageType::NBirth => state.handle_nbirth(&id, client_id, payload),
                    MessageType::NDeath => state.handle_ndeath(&id, client_id),
                    MessageType::NData => state.handle_ndata(&id, payload),
                    // commands originate from host applications, nothing to verify
                    _ => {}
                }
            }
            ParsedTopic::Device {
                group_id,
                message_type,
                node_id,
                device_id,
            } => {
                let id = NodeIdentifier::new(group_id, node_id);
                match message_type {
                    MessageType::DBirth => state.handle_dbirth(&id, &device_id, payload),
                    MessageType::DDeath => state.handle_ddeath(&id, &device_id, payload),
                    MessageType::DData => state.handle_ddata(&id, &device_id, payload),
                    _ => {}
                }
            }
            ParsedTopic::State { host_id } => {
                // host liveness is validated through the will message path
                debug!("STATE publish from host {host_id}");
            }
        }
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorState {
    fn check_edge_will_bdseq(&mut self, id: &NodeIdentifier, payload: &Payload) {
        let mut seen = false;
        for metric in &payload.metrics {
            if metric.name.as_deref() != Some(BDSEQ) {
                continue;
            }
            seen = true;
            let Some(bdseq) = metric.u64_value() else {
                warn!("edge node {id} will bdSeq metric has no unsigned 64-bit value");
                self.ledger.fail(assertions::NBIRTH_BDSEQ_INCREMENT);
                continue;
            };
            if let Some(prev) = self.registry.bdseq(id) {
                let passed = bdseq == next_bdseq(prev);
                if !passed {
                    warn!("edge node {id} will bdSeq {bdseq} does not follow {prev}");
                }
                self.ledger
                    .update(assertions::NBIRTH_BDSEQ_INCREMENT, passed);
            }
            self.registry.set_bdseq(id, bdseq);
        }
        // a will payload without any bdSeq metric is itself a violation
        if !seen {
            warn!("edge node {id} will payload carries no bdSeq metric");
            self.ledger.fail(assertions::NBIRTH_BDSEQ_INCREMENT);
        }
    }

    fn check_host_will_bdseq(&mut self, host_id: &str, payload: &Payload) {
        let mut seen = false;
        for metric in &payload.metrics {
            if metric.name.as_deref() != Some(BDSEQ) {
                continue;
            }
            seen = true;

            let value = match (metric.datatype, metric.u64_value()) {
                (Some(DataType::UInt64), Some(v)) => Some(v),
                _ => None,
            };
            let Some(bdseq) = value else {
                warn!("host {host_id} will bdSeq metric is not a UInt64 value");
                for id in assertions::HOST_WILL_BDSEQ_GROUP {
                    self.ledger.fail(id);
                }
                continue;
            };

            if let Some(prev) = self.registry.host_bdseq(host_id) {
                let passed = bdseq == next_bdseq(prev);
                if !passed {
                    warn!("host {host_id} will bdSeq {bdseq} does not follow {prev}");
                }
                for id in assertions::HOST_WILL_BDSEQ_GROUP {
                    self.ledger.update(id, passed);
                }
            }
            self.registry.set_host_bdseq(host_id, bdseq);
        }
        if !seen {
            warn!("host {host_id} will payload carries no bdSeq metric");
            for id in assertions::HOST_WILL_BDSEQ_GROUP {
                self.ledger.fail(id);
            }
        }
    }

    fn handle_nbirth(&mut self, id: &NodeIdentifier, client_id: &str, payload: Payload) {
        info!("NBIRTH {id} from client {client_id}");
        match self.registry.register_edge_node(id, client_id) {
            Ok(()) => debug!("registered edge node {id} for client {client_id}"),
            Err(e) => {
                error!("edge node descriptor conflict on NBIRTH: {e}");
                self.ledger.fail(assertions::UNIQUE_EDGE_NODE_DESCRIPTOR);
                self.ledger.fail(assertions::NBIRTH_EDGE_NODE_DESCRIPTOR);
            }
        }

        // birth resets the sequence counter, the declared seq only needs to
        // be present and in range
        match payload.seq {
            Some(seq) => {
                self.ledger.update(assertions::NBIRTH_SEQ, seq <= 255);
                self.registry.set_last_seq(id, seq);
            }
            None => self.ledger.fail(assertions::NBIRTH_SEQ),
        }

        self.births.record_node_birth(id, payload.metrics);
    }

    fn handle_ndeath(&mut self, id: &NodeIdentifier, client_id: &str) {
        info!("NDEATH {id} from client {client_id}");
        match self.registry.unregister_edge_node(id, client_id) {
            Ok(()) => debug!("removed edge node {id} for client {client_id} on NDEATH"),
            Err(e) => {
                error!("edge node descriptor conflict on NDEATH: {e}");
                self.ledger.fail(assertions::UNIQUE_EDGE_NODE_DESCRIPTOR);
                self.ledger.fail(assertions::NBIRTH_EDGE_NODE_DESCRIPTOR);
            }
        }
    }

    fn handle_ndata(&mut self, id: &NodeIdentifier, payload: Payload) {
        info!("NDATA {id}");
        self.check_seq_increment(id, &payload, &[assertions::NDATA_SEQ_INC]);
        if let Some(cert) = self.births.node_certificate(id) {
            Self::check_data_metrics(
                &mut self.ledger,
                cert,
                &payload.metrics,
                assertions::NBIRTH_METRIC_REQS,
            );
        }
    }

    fn handle_dbirth(&mut self, id: &NodeIdentifier, device_id: &str, payload: Payload) {
        info!("DBIRTH {id}/{device_id}");
        match self.registry.register_device(id, device_id) {
            Ok(()) => {
                // device ids only need uniqueness within one edge node, so a
                // conformant registration is positive evidence for the
                // cross-node reuse MAY clause
                self.ledger
                    .pass(assertions::DUPLICATE_DEVICE_ID_ACROSS_EDGE_NODE);
                debug!("added device {device_id} under edge node {id}");
            }
            Err(RegistryError::NoSuchEdgeNode(_)) => {
                error!("DBIRTH for {id}/{device_id} before NBIRTH");
            }
            Err(RegistryError::DuplicateDevice(..)) => {
                error!("edge node {id} using device id {device_id} twice");
                self.ledger.fail(assertions::UNIQUE_DEVICE_ID);
                self.ledger.fail(assertions::EDGE_NODE_ID_UNIQUENESS);
            }
            Err(e) => error!("unexpected registry error on DBIRTH: {e}"),
        }

        self.check_seq_increment(
            id,
            &payload,
            &[assertions::DBIRTH_SEQ_INC, assertions::DBIRTH_PAYLOAD_SEQ],
        );
        self.births.record_device_birth(id, device_id, payload.metrics);
    }

    fn handle_ddeath(&mut self, id: &NodeIdentifier, device_id: &str, payload: Payload) {
        info!("DDEATH {id}/{device_id}");
        match self.registry.unregister_device(id, device_id) {
            Ok(()) => debug!("removed device {device_id} under edge node {id}"),
            Err(e) => error!("DDEATH ordering violation for {id}/{device_id}: {e}"),
        }
        self.check_seq_increment(id, &payload, &[assertions::DDEATH_SEQ_INC]);
    }

    fn handle_ddata(&mut self, id: &NodeIdentifier, device_id: &str, payload: Payload) {
        info!("DDATA {id}/{device_id}");
        self.check_seq_increment(id, &payload, &[assertions::DDATA_SEQ_INC]);
        if let Some(cert) = self.births.device_certificate(id, device_id) {
            Self::check_data_metrics(
                &mut self.ledger,
                cert,
                &payload.metrics,
                assertions::DBIRTH_METRIC_REQS,
            );
        }
    }

    /// Validates a payload's `seq` against the edge node's counter.
    ///
    /// Device messages share the parent node's sequence space, so DBIRTH,
    /// DDEATH and DDATA all check against the same baseline. The observed
    /// value always becomes the new baseline, pass or fail, so one bad value
    /// does not cascade into failures for the rest of the stream. A missing
    /// `seq` fails outright.
    fn check_seq_increment(
        &mut self,
        id: &NodeIdentifier,
        payload: &Payload,
        assertion_ids: &[&'static str],
    ) {
        match payload.seq {
            Some(seq) => {
                if let Some(prev) = self.registry.last_seq(id) {
                    let expected = next_seq(prev);
                    let passed = seq == expected;
                    if !passed {
                        warn!("unexpected seq {seq} for {id}, expected {expected}");
                    }
                    for assertion_id in assertion_ids {
                        self.ledger.update(assertion_id, passed);
                    }
                }
                self.registry.set_last_seq(id, seq);
            }
            None => {
                warn!("payload for {id} is missing a seq");
                for assertion_id in assertion_ids {
                    self.ledger.fail(assertion_id);
                }
            }
        }
    }

    /// Validates DATA metrics against the entity's birth certificate.
    ///
    /// Every metric name must have been declared in the certificate, and
    /// every template instance must reference a template definition declared
    /// there. One bad metric never stops the remaining metrics from being
    /// checked.
    fn check_data_metrics(
        ledger: &mut VerdictLedger,
        cert: &BirthCertificate,
        metrics: &[Metric],
        metric_reqs_id: &'static str,
    ) {
        for metric in metrics {
            let Some(name) = metric.name.as_deref() else {
                continue;
            };

            let declared = cert.contains_metric(name);
            if !declared {
                warn!("metric {name} was not declared in the birth certificate");
            }
            ledger.update(metric_reqs_id, declared);

            if metric.datatype != Some(DataType::Template) {
                continue;
            }
            let Some(template) = metric.template_value() else {
                continue;
            };
            // only instances carry a reference; definitions have nothing to resolve
            let Some(reference) = template.template_ref.as_deref() else {
                continue;
            };
            let resolved = cert.has_template_definition(reference);
            if !resolved {
                warn!("template instance {name} does not resolve to a definition '{reference}'");
            }
            ledger.update(assertions::NBIRTH_TEMPLATES, resolved);
        }
    }
}
