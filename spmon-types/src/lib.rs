//! Part of [spmon](https://crates.io/crates/spmon), a passive conformance
//! monitor for the [Sparkplug](https://sparkplug.eclipse.org/) B protocol.
//!
//! This library defines the Sparkplug vocabulary shared by the monitor crates:
//! topic constants and parsing, the decoded payload data model, and the
//! sequence counter arithmetic.

pub mod constants;
pub mod payload;
pub mod seq;
pub mod topic;
