//! Purpose: Side channel for the generic decoder's best-effort fallback.
//! Exports: `DiagnosticSink`, `TracingSink`, `NoopSink`, `RecordingSink`, `unknown_node_message`.
//! Role: Report JSON nodes of an unrecognized kind without failing the decode.
//! Invariants: Sinks never influence the decoded value; they only observe.
//! Invariants: Sinks are `Send + Sync` so one instance can serve parallel decodes.
use std::sync::Mutex;

pub trait DiagnosticSink: Send + Sync {
    fn unknown_node(&self, description: &str);
}

/// Default sink: one `warn` event per unrecognized node.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn unknown_node(&self, description: &str) {
        tracing::warn!("{}", unknown_node_message(description));
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn unknown_node(&self, _description: &str) {}
}

/// Collects messages in memory; used by tests to assert on the fallback path.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticSink for RecordingSink {
    fn unknown_node(&self, description: &str) {
        let message = unknown_node_message(description);
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message),
            Err(poisoned) => poisoned.into_inner().push(message),
        }
    }
}

pub fn unknown_node_message(description: &str) -> String {
    format!(
        "unknown JSON node kind for value {description}; substituting null. \
         This is likely a bug in {} {}.",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
}
