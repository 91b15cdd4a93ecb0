use std::collections::HashMap;

use spmon_types::payload::Metric;

use crate::NodeIdentifier;

/// The metric list declared by an entity's most recent BIRTH message.
///
/// The certificate is the contract for subsequent DATA messages: a DATA
/// metric whose name never appeared in it is a conformance violation, and a
/// template instance must resolve to a template definition declared in it.
#[derive(Clone, Debug, Default)]
pub struct BirthCertificate {
    metrics: Vec<Metric>,
}

impl BirthCertificate {
    pub fn new(metrics: Vec<Metric>) -> Self {
        Self { metrics }
    }

    /// Whether a metric of the given name was declared.
    pub fn contains_metric(&self, name: &str) -> bool {
        self.metrics
            .iter()
            .any(|metric| metric.name.as_deref() == Some(name))
    }

    /// Whether the certificate declares a template *definition* under the
    /// given name.
    ///
    /// A definition is flagged as one and carries no template reference of
    /// its own; an instance template never satisfies this check.
    pub fn has_template_definition(&self, name: &str) -> bool {
        self.metrics.iter().any(|metric| {
            if metric.name.as_deref() != Some(name) {
                return false;
            }
            match metric.template_value() {
                Some(template) => {
                    template.is_definition == Some(true) && template.template_ref.is_none()
                }
                None => false,
            }
        })
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }
}

/// Per edge node and per device storage of birth certificates.
///
/// A new BIRTH always supersedes the previous contract for the same entity.
/// Certificates are not removed on death; they are unused afterwards and a
/// rebirth replaces them wholesale.
#[derive(Default)]
pub struct BirthCertificateStore {
    nodes: HashMap<NodeIdentifier, BirthCertificate>,
    devices: HashMap<(NodeIdentifier, String), BirthCertificate>,
}

impl BirthCertificateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_node_birth(&mut self, id: &NodeIdentifier, metrics: Vec<Metric>) {
        self.nodes.insert(id.clone(), BirthCertificate::new(metrics));
    }

    pub fn record_device_birth(
        &mut self,
        id: &NodeIdentifier,
        device_id: &str,
        metrics: Vec<Metric>,
    ) {
        self.devices.insert(
            (id.clone(), device_id.into()),
            BirthCertificate::new(metrics),
        );
    }

    pub fn node_certificate(&self, id: &NodeIdentifier) -> Option<&BirthCertificate> {
        self.nodes.get(id)
    }

    pub fn device_certificate(
        &self,
        id: &NodeIdentifier,
        device_id: &str,
    ) -> Option<&BirthCertificate> {
        self.devices.get(&(id.clone(), device_id.into()))
    }
}
