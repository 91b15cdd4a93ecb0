use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::NodeIdentifier;

/// Error types for session registry operations.
///
/// These map onto the identity and ordering violations of the Sparkplug
/// session lifecycle; none of them is fatal to the monitor.
#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("edge node descriptor {0} is already owned by client {1}")]
    DescriptorInUse(NodeIdentifier, String),
    #[error("no registered edge node {0}")]
    NoSuchEdgeNode(NodeIdentifier),
    #[error("device {1} is already live under edge node {0}")]
    DuplicateDevice(NodeIdentifier, String),
    #[error("device {1} is not live under edge node {0}")]
    NoSuchDevice(NodeIdentifier, String),
}

struct EdgeNodeSession {
    client_id: String,
    devices: HashSet<String>,
}

/// Tracks live Sparkplug sessions and their counters.
///
/// Maintains the bijection between MQTT client ids and the edge node
/// descriptors they own, the set of live devices per edge node, and the
/// last observed `seq`/`bdSeq` per entity.
///
/// The `seq` and `bdSeq` counters live outside the session entries: a node's
/// `bdSeq` is learned from its will message at connect time, before any
/// NBIRTH exists, and a `seq` baseline is kept even for traffic from nodes
/// that never registered cleanly so that sequence drift does not cascade.
pub struct SessionRegistry {
    sessions: HashMap<NodeIdentifier, EdgeNodeSession>,
    clients: HashMap<String, NodeIdentifier>,
    last_seqs: HashMap<NodeIdentifier, u64>,
    bdseqs: HashMap<NodeIdentifier, u64>,
    host_bdseqs: HashMap<String, u64>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            clients: HashMap::new(),
            last_seqs: HashMap::new(),
            bdseqs: HashMap::new(),
            host_bdseqs: HashMap::new(),
        }
    }

    /// Binds an edge node descriptor to the client publishing its NBIRTH.
    ///
    /// A rebirth from the owning client re-registers the node with a fresh,
    /// empty device set. A different client claiming a live descriptor is an
    /// identity violation; ownership is not transferred.
    pub fn register_edge_node(
        &mut self,
        id: &NodeIdentifier,
        client_id: &str,
    ) -> Result<(), RegistryError> {
        if let Some(session) = self.sessions.get(id) {
            if session.client_id != client_id {
                return Err(RegistryError::DescriptorInUse(
                    id.clone(),
                    session.client_id.clone(),
                ));
            }
        }
        // a client birthing under a new descriptor implicitly ends the
        // session it previously owned; the clients map stays a bijection
        if let Some(prev) = self.clients.get(client_id) {
            if prev != id {
                let prev = prev.clone();
                self.sessions.remove(&prev);
                self.last_seqs.remove(&prev);
            }
        }
        self.sessions.insert(
            id.clone(),
            EdgeNodeSession {
                client_id: client_id.into(),
                devices: HashSet::new(),
            },
        );
        self.clients.insert(client_id.into(), id.clone());
        Ok(())
    }

    /// Tears down an edge node session on NDEATH.
    ///
    /// The ownership check mirrors [Self::register_edge_node]; on a mismatch
    /// the live session is left in place. Unregistering a descriptor that was
    /// never registered is accepted, the death still clears any `seq`
    /// baseline recorded for it, but must not touch the client's binding to
    /// whatever other descriptor it owns.
    pub fn unregister_edge_node(
        &mut self,
        id: &NodeIdentifier,
        client_id: &str,
    ) -> Result<(), RegistryError> {
        if let Some(session) = self.sessions.get(id) {
            if session.client_id != client_id {
                return Err(RegistryError::DescriptorInUse(
                    id.clone(),
                    session.client_id.clone(),
                ));
            }
            self.sessions.remove(id);
            self.clients.remove(client_id);
        }
        self.last_seqs.remove(id);
        Ok(())
    }

    /// Tears down whatever session the disconnecting client owned.
    ///
    /// Transport level disconnects, clean or abrupt, must end a session
    /// exactly like an explicit NDEATH. Returns the descriptor that was torn
    /// down, if any.
    pub fn on_disconnect(&mut self, client_id: &str) -> Option<NodeIdentifier> {
        let id = self.clients.remove(client_id)?;
        self.sessions.remove(&id);
        self.last_seqs.remove(&id);
        Some(id)
    }

    /// Adds a device to the live set of a registered edge node.
    pub fn register_device(
        &mut self,
        id: &NodeIdentifier,
        device_id: &str,
    ) -> Result<(), RegistryError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::NoSuchEdgeNode(id.clone()))?;
        if !session.devices.insert(device_id.into()) {
            return Err(RegistryError::DuplicateDevice(id.clone(), device_id.into()));
        }
        Ok(())
    }

    /// Removes a device from the live set of a registered edge node.
    pub fn unregister_device(
        &mut self,
        id: &NodeIdentifier,
        device_id: &str,
    ) -> Result<(), RegistryError> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::NoSuchEdgeNode(id.clone()))?;
        if !session.devices.remove(device_id) {
            return Err(RegistryError::NoSuchDevice(id.clone(), device_id.into()));
        }
        Ok(())
    }

    /// The client currently owning a descriptor.
    pub fn owner(&self, id: &NodeIdentifier) -> Option<&str> {
        self.sessions.get(id).map(|s| s.client_id.as_str())
    }

    /// Whether a device is currently live under an edge node.
    pub fn device_is_live(&self, id: &NodeIdentifier, device_id: &str) -> bool {
        self.sessions
            .get(id)
            .is_some_and(|s| s.devices.contains(device_id))
    }

    pub fn last_seq(&self, id: &NodeIdentifier) -> Option<u64> {
        self.last_seqs.get(id).copied()
    }

    pub fn set_last_seq(&mut self, id: &NodeIdentifier, seq: u64) {
        self.last_seqs.insert(id.clone(), seq);
    }

    pub fn bdseq(&self, id: &NodeIdentifier) -> Option<u64> {
        self.bdseqs.get(id).copied()
    }

    pub fn set_bdseq(&mut self, id: &NodeIdentifier, bdseq: u64) {
        self.bdseqs.insert(id.clone(), bdseq);
    }

    pub fn host_bdseq(&self, host_id: &str) -> Option<u64> {
        self.host_bdseqs.get(host_id).copied()
    }

    pub fn set_host_bdseq(&mut self, host_id: &str, bdseq: u64) {
        self.host_bdseqs.insert(host_id.into(), bdseq);
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(group: &str, node: &str) -> NodeIdentifier {
        NodeIdentifier::new(group, node)
    }

    #[test]
    fn test_register_and_unregister_edge_node() {
        let mut registry = SessionRegistry::new();
        let node = id("g", "n");
        registry.register_edge_node(&node, "client1").unwrap();
        assert_eq!(registry.owner(&node), Some("client1"));

        registry.unregister_edge_node(&node, "client1").unwrap();
        assert_eq!(registry.owner(&node), None);
    }

    #[test]
    fn test_second_client_cannot_claim_descriptor() {
        let mut registry = SessionRegistry::new();
        let node = id("g", "n");
        registry.register_edge_node(&node, "client1").unwrap();

        let err = registry.register_edge_node(&node, "client2").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DescriptorInUse(node.clone(), "client1".into())
        );
        // ownership must not transfer
        assert_eq!(registry.owner(&node), Some("client1"));
    }

    #[test]
    fn test_unregister_with_wrong_client_keeps_session() {
        let mut registry = SessionRegistry::new();
        let node = id("g", "n");
        registry.register_edge_node(&node, "client1").unwrap();
        registry.set_last_seq(&node, 3);

        assert!(registry.unregister_edge_node(&node, "client2").is_err());
        assert_eq!(registry.owner(&node), Some("client1"));
        assert_eq!(registry.last_seq(&node), Some(3));
    }

    #[test]
    fn test_spurious_ndeath_keeps_client_binding() {
        let mut registry = SessionRegistry::new();
        let owned = id("g", "a");
        let stranger = id("g", "b");
        registry.register_edge_node(&owned, "client1").unwrap();

        // a death for a descriptor client1 never birthed
        registry.unregister_edge_node(&stranger, "client1").unwrap();
        assert_eq!(registry.owner(&owned), Some("client1"));

        // the client's real session still tears down on disconnect
        assert_eq!(registry.on_disconnect("client1"), Some(owned.clone()));
        registry.register_edge_node(&owned, "client2").unwrap();
        assert_eq!(registry.owner(&owned), Some("client2"));
    }

    #[test]
    fn test_rebirth_under_new_descriptor_ends_previous_session() {
        let mut registry = SessionRegistry::new();
        let first = id("g", "a");
        let second = id("g", "b");
        registry.register_edge_node(&first, "client1").unwrap();
        registry.set_last_seq(&first, 4);

        registry.register_edge_node(&second, "client1").unwrap();
        assert_eq!(registry.owner(&first), None);
        assert_eq!(registry.last_seq(&first), None);
        assert_eq!(registry.on_disconnect("client1"), Some(second));
    }

    #[test]
    fn test_disconnect_tears_down_owned_session() {
        let mut registry = SessionRegistry::new();
        let node = id("g", "n");
        registry.register_edge_node(&node, "client1").unwrap();
        registry.register_device(&node, "dev1").unwrap();
        registry.set_last_seq(&node, 5);

        assert_eq!(registry.on_disconnect("client1"), Some(node.clone()));
        assert_eq!(registry.owner(&node), None);
        assert_eq!(registry.last_seq(&node), None);
        assert!(!registry.device_is_live(&node, "dev1"));

        // a fresh client can now claim the descriptor cleanly
        registry.register_edge_node(&node, "client2").unwrap();
        assert_eq!(registry.owner(&node), Some("client2"));
    }

    #[test]
    fn test_disconnect_of_unknown_client_is_a_noop() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.on_disconnect("stranger"), None);
    }

    #[test]
    fn test_device_set_invariants() {
        let mut registry = SessionRegistry::new();
        let node = id("g", "n");

        assert_eq!(
            registry.register_device(&node, "dev1"),
            Err(RegistryError::NoSuchEdgeNode(node.clone()))
        );

        registry.register_edge_node(&node, "client1").unwrap();
        registry.register_device(&node, "dev1").unwrap();
        assert!(registry.device_is_live(&node, "dev1"));

        assert_eq!(
            registry.register_device(&node, "dev1"),
            Err(RegistryError::DuplicateDevice(node.clone(), "dev1".into()))
        );

        registry.unregister_device(&node, "dev1").unwrap();
        assert_eq!(
            registry.unregister_device(&node, "dev1"),
            Err(RegistryError::NoSuchDevice(node.clone(), "dev1".into()))
        );
    }

    #[test]
    fn test_rebirth_resets_device_set() {
        let mut registry = SessionRegistry::new();
        let node = id("g", "n");
        registry.register_edge_node(&node, "client1").unwrap();
        registry.register_device(&node, "dev1").unwrap();

        registry.register_edge_node(&node, "client1").unwrap();
        assert!(!registry.device_is_live(&node, "dev1"));
    }

    #[test]
    fn test_bdseq_survives_session_teardown() {
        let mut registry = SessionRegistry::new();
        let node = id("g", "n");
        registry.set_bdseq(&node, 7);
        registry.register_edge_node(&node, "client1").unwrap();
        registry.unregister_edge_node(&node, "client1").unwrap();
        assert_eq!(registry.bdseq(&node), Some(7));
    }

    #[test]
    fn test_host_bdseq_tracking() {
        let mut registry = SessionRegistry::new();
        assert_eq!(registry.host_bdseq("scada"), None);
        registry.set_host_bdseq("scada", 1);
        assert_eq!(registry.host_bdseq("scada"), Some(1));
    }
}
