use ai_core::Status;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which part of the tick contract a trace event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TracePhase {
    Initialize,
    Update(Status),
    Terminate(Status),
    /// The runtime forced the node out of `Running`; a `Terminate(Aborted)` follows.
    Abort,
}

/// A small, allocation-free lifecycle event.
///
/// This is intentionally "dumb data" so it can be recorded during simulation and later rendered
/// by tooling. `node` is the flattened tree index of the node the event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub node: u32,
    pub phase: TracePhase,
}

impl TraceEvent {
    pub fn new(tick: u64, node: u32, phase: TracePhase) -> Self {
        Self { tick, node, phase }
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Events recorded for one node, in emission order.
    pub fn for_node(&self, node: u32) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.node == node)
    }

    /// Number of events of `phase` recorded for `node`.
    pub fn count(&self, node: u32, phase: TracePhase) -> usize {
        self.for_node(node).filter(|e| e.phase == phase).count()
    }

    /// Position of the first event matching `node` and `phase`.
    pub fn position(&self, node: u32, phase: TracePhase) -> Option<usize> {
        self.events
            .iter()
            .position(|e| e.node == node && e.phase == phase)
    }
}

impl TraceSink for TraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.push(event);
    }
}
