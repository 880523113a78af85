//! Lifecycle tracing for behavior tree runs.
//!
//! The runtime reports every `Initialize`, `Update`, `Terminate` and abort it
//! performs to an optional [`TraceSink`]; [`TraceLog`] keeps them for queries
//! in tests and debug views.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, TraceEvent, TraceLog, TracePhase, TraceSink, VecTraceSink};
