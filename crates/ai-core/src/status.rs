use serde::{Deserialize, Serialize};

/// Result state of a behavior.
///
/// `Undefined` is the state of a node that has never been ticked; `Update`
/// never reports it. `Aborted` is only ever assigned by the runtime when a
/// running node is preempted, never self-reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Undefined,
    Failure,
    Success,
    Running,
    Aborted,
}

impl Status {
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// `true` for results that close an activation span.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Failure | Status::Success | Status::Aborted)
    }

    /// Swaps `Success` and `Failure`; other states pass through.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            other => other,
        }
    }
}
