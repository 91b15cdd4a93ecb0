use std::collections::HashMap;
use std::fmt;

use log::warn;
use serde::Serialize;

use crate::assertions;

/// The tri-state result of a conformance assertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    #[serde(rename = "NOT_EXECUTED")]
    NotExecuted,
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
}

impl Verdict {
    /// Merges new evidence into an existing verdict.
    ///
    /// A `Fail` is sticky for the rest of the test run; passing evidence seen
    /// after a failure must not revert the entry.
    pub fn combine(self, new: Verdict) -> Verdict {
        match (self, new) {
            (Verdict::Fail, _) | (_, Verdict::Fail) => Verdict::Fail,
            (Verdict::Pass, _) => Verdict::Pass,
            (Verdict::NotExecuted, new) => new,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::NotExecuted => "NOT EXECUTED",
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        };
        f.write_str(s)
    }
}

/// Tracks a [Verdict] per assertion id for the duration of a test run.
///
/// All writes go through [Verdict::combine], so fail-wins merge semantics are
/// applied uniformly no matter which check produced the evidence.
pub struct VerdictLedger {
    results: HashMap<&'static str, Verdict>,
}

impl VerdictLedger {
    pub fn new() -> Self {
        Self {
            results: assertions::ALL
                .iter()
                .map(|id| (*id, Verdict::NotExecuted))
                .collect(),
        }
    }

    /// Records evidence for an assertion.
    pub fn update(&mut self, id: &'static str, passed: bool) {
        if passed {
            self.pass(id)
        } else {
            self.fail(id)
        }
    }

    pub fn pass(&mut self, id: &'static str) {
        self.merge(id, Verdict::Pass);
    }

    pub fn fail(&mut self, id: &'static str) {
        warn!("assertion {id} failed");
        self.merge(id, Verdict::Fail);
    }

    fn merge(&mut self, id: &'static str, new: Verdict) {
        let entry = self.results.entry(id).or_insert(Verdict::NotExecuted);
        *entry = entry.combine(new);
    }

    pub fn get(&self, id: &str) -> Verdict {
        self.results.get(id).copied().unwrap_or(Verdict::NotExecuted)
    }

    /// Resets every tracked assertion to [Verdict::NotExecuted].
    pub fn reset(&mut self) {
        for verdict in self.results.values_mut() {
            *verdict = Verdict::NotExecuted;
        }
    }

    /// The results labelled for the report consumer.
    pub fn labelled_results(&self) -> HashMap<String, Verdict> {
        self.results
            .iter()
            .map(|(id, verdict)| (format!("Monitor:{id}"), *verdict))
            .collect()
    }
}

impl Default for VerdictLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_fail_is_sticky() {
        assert_eq!(Verdict::Fail.combine(Verdict::Pass), Verdict::Fail);
        assert_eq!(Verdict::Fail.combine(Verdict::NotExecuted), Verdict::Fail);
        assert_eq!(Verdict::Pass.combine(Verdict::Fail), Verdict::Fail);
        assert_eq!(Verdict::NotExecuted.combine(Verdict::Fail), Verdict::Fail);
    }

    #[test]
    fn test_combine_pass() {
        assert_eq!(Verdict::NotExecuted.combine(Verdict::Pass), Verdict::Pass);
        assert_eq!(Verdict::Pass.combine(Verdict::Pass), Verdict::Pass);
        assert_eq!(Verdict::Pass.combine(Verdict::NotExecuted), Verdict::Pass);
        assert_eq!(
            Verdict::NotExecuted.combine(Verdict::NotExecuted),
            Verdict::NotExecuted
        );
    }

    #[test]
    fn test_ledger_starts_not_executed() {
        let ledger = VerdictLedger::new();
        for id in assertions::ALL {
            assert_eq!(ledger.get(id), Verdict::NotExecuted);
        }
    }

    #[test]
    fn test_ledger_fail_wins_until_reset() {
        let mut ledger = VerdictLedger::new();
        ledger.update(assertions::NDATA_SEQ_INC, false);
        ledger.update(assertions::NDATA_SEQ_INC, true);
        assert_eq!(ledger.get(assertions::NDATA_SEQ_INC), Verdict::Fail);

        ledger.reset();
        assert_eq!(ledger.get(assertions::NDATA_SEQ_INC), Verdict::NotExecuted);
        ledger.update(assertions::NDATA_SEQ_INC, true);
        assert_eq!(ledger.get(assertions::NDATA_SEQ_INC), Verdict::Pass);
    }

    #[test]
    fn test_labelled_results() {
        let mut ledger = VerdictLedger::new();
        ledger.pass(assertions::NBIRTH_SEQ);
        let results = ledger.labelled_results();
        assert_eq!(results.len(), assertions::ALL.len());
        assert_eq!(
            results.get("Monitor:payloads-nbirth-seq"),
            Some(&Verdict::Pass)
        );
    }
}
