//! The tick lifecycle contract shared by every leaf behavior.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use ai_core::{Blackboard, BlackboardError, Status, TickContext};
use thiserror::Error;

/// A fault raised from inside [`Behavior::update`].
///
/// Faults never escape a tick: the runtime logs them and reports `Failure` for
/// the faulting node.
#[derive(Debug, Error)]
pub enum Fault {
    #[error(transparent)]
    Blackboard(#[from] BlackboardError),

    #[error("{0}")]
    Message(String),
}

impl Fault {
    pub fn msg(message: impl Into<String>) -> Self {
        Fault::Message(message.into())
    }
}

/// A leaf unit of execution.
///
/// `update` must return promptly; multi-step work is expressed by returning
/// `Running` and continuing on the next tick.
pub trait Behavior: 'static {
    fn name(&self) -> &str;

    /// Called when an activation span opens.
    fn initialize(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) {}

    fn update(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> Result<Status, Fault>;

    /// Called exactly once when an activation span closes, including when the
    /// runtime aborts the behavior (`status == Aborted`).
    fn terminate(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard, _status: Status) {}
}

/// Runs one tick of the lifecycle contract for `behavior`.
///
/// `previous` is the result of this behavior's last tick (`Undefined` before
/// the first one). `initialize` runs unless the behavior was left `Running`,
/// `terminate` runs whenever the new result is not `Running`.
pub fn tick(
    behavior: &mut dyn Behavior,
    previous: Status,
    ctx: &TickContext,
    blackboard: &mut Blackboard,
) -> Status {
    if previous != Status::Running {
        behavior.initialize(ctx, blackboard);
    }

    let status = contained_update(behavior, ctx, blackboard);

    if status != Status::Running {
        behavior.terminate(ctx, blackboard, status);
    }
    status
}

fn contained_update(
    behavior: &mut dyn Behavior,
    ctx: &TickContext,
    blackboard: &mut Blackboard,
) -> Status {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| behavior.update(ctx, blackboard)));

    match outcome {
        Ok(Ok(Status::Undefined | Status::Aborted)) => {
            tracing::error!(
                behavior = behavior.name(),
                tick = ctx.tick,
                "update reported a state it may not report; treating as failure"
            );
            Status::Failure
        }
        Ok(Ok(status)) => status,
        Ok(Err(fault)) => {
            tracing::error!(behavior = behavior.name(), tick = ctx.tick, %fault, "behavior faulted");
            Status::Failure
        }
        Err(payload) => {
            tracing::error!(
                behavior = behavior.name(),
                tick = ctx.tick,
                panic = panic_message(payload.as_ref()),
                "behavior panicked"
            );
            Status::Failure
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
