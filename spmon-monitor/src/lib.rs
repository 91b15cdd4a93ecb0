//! Part of [spmon](https://crates.io/crates/spmon), a passive conformance
//! monitor for the [Sparkplug](https://sparkplug.eclipse.org/) B protocol.
//!
//! This library implements the stateful protocol monitor. It consumes broker
//! lifecycle events (connect with will message, disconnect, publish) and
//! verifies that the observed traffic obeys the Sparkplug session lifecycle
//! and payload sequencing rules, producing a pass/fail/not-executed verdict
//! per assertion id.

use std::fmt;

pub mod assertions;
mod birth;
mod eventloop;
mod events;
mod monitor;
mod registry;
mod verdict;

pub use birth::{BirthCertificate, BirthCertificateStore};
pub use eventloop::{MonitorEventLoop, MonitorHandle};
pub use events::{MonitorEvent, WillMessage};
pub use monitor::Monitor;
pub use registry::{RegistryError, SessionRegistry};
pub use verdict::{Verdict, VerdictLedger};

/// Used to uniquely identify an edge node.
///
/// Edge node ids are only unique within their group, so the group id is part
/// of the identity.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct NodeIdentifier {
    pub group: String,
    pub node: String,
}

impl NodeIdentifier {
    pub fn new<S1: Into<String>, S2: Into<String>>(group: S1, node: S2) -> Self {
        Self {
            group: group.into(),
            node: node.into(),
        }
    }
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.node)
    }
}
