//! Diagnostics sink for validator findings.
//!
//! Validators are boolean predicates and never throw; what they do instead
//! is report each failing (or notable) check as a [`Finding`] to an
//! injected sink. Production code uses [`TracingDiagnostics`];
//! tests inject [`MemoryDiagnostics`] and assert on what was reported.

use std::sync::Mutex;
use tracing::*;

/// Outcome of a single validation check.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub ok: bool,
    pub message: String,
}

impl Finding {
    pub fn success(message: impl Into<String>) -> Finding {
        Finding {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Finding {
        Finding {
            ok: false,
            message: message.into(),
        }
    }
}

/// Where validator findings go. Implementations must be cheap: validators
/// report at most one finding per check.
pub trait Diagnostics: Send + Sync {
    fn report(&self, finding: Finding);
}

/// Default sink: failures at `warn`, the rest at `debug`.
#[derive(Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, finding: Finding) {
        if finding.ok {
            debug!("{}", finding.message);
        } else {
            warn!("{}", finding.message);
        }
    }
}

/// Recording sink for tests.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    findings: Mutex<Vec<Finding>>,
}

impl MemoryDiagnostics {
    pub fn new() -> MemoryDiagnostics {
        MemoryDiagnostics::default()
    }

    /// Drain everything reported so far.
    pub fn take(&self) -> Vec<Finding> {
        std::mem::take(&mut self.findings.lock().expect("diagnostics lock poisoned"))
    }

    pub fn failures(&self) -> Vec<Finding> {
        self.findings
            .lock()
            .expect("diagnostics lock poisoned")
            .iter()
            .filter(|finding| !finding.ok)
            .cloned()
            .collect()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn report(&self, finding: Finding) {
        self.findings
            .lock()
            .expect("diagnostics lock poisoned")
            .push(finding);
    }
}
