//! A passive conformance monitor for the
//! [Sparkplug](https://sparkplug.eclipse.org/) B protocol.
//!
//! `spmon` observes MQTT broker lifecycle events (connect with will message,
//! disconnect, publish) and verifies in real time that the traffic obeys the
//! Sparkplug session lifecycle and payload sequencing rules, producing a
//! pass/fail/not-executed verdict per assertion id.

pub use spmon_monitor as monitor;
pub use spmon_types as types;

pub use spmon_monitor::{Monitor, MonitorEvent, MonitorEventLoop, MonitorHandle, Verdict};
