use spmon::{Monitor, Verdict};
use spmon::types::payload::Payload;

#[test]
fn facade_reexports_the_monitor() {
    let monitor = Monitor::new();
    monitor.on_publish(
        "client",
        "spBv1.0/group/NBIRTH/node",
        Payload {
            timestamp: Some(0),
            seq: Some(0),
            metrics: vec![],
        },
    );
    assert_eq!(
        monitor.results().get("Monitor:payloads-nbirth-seq"),
        Some(&Verdict::Pass)
    );
}
