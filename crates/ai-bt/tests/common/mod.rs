//! Recording behaviors shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use ai_bt::{Behavior, Fault};
use ai_core::{Blackboard, Status, TickContext};
use ai_tools::{TraceEvent, TraceLog, TraceSink};

#[derive(Clone, Default)]
pub struct Calls(Rc<RefCell<Vec<String>>>);

impl Calls {
    pub fn push(&self, call: String) {
        self.0.borrow_mut().push(call);
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

pub struct Probe {
    label: &'static str,
    script: VecDeque<Status>,
    fallback: Status,
    calls: Calls,
}

impl Probe {
    pub fn new(label: &'static str, script: &[Status], calls: &Calls) -> Self {
        Self {
            label,
            script: script.iter().copied().collect(),
            fallback: Status::Success,
            calls: calls.clone(),
        }
    }

    /// Reports `Running` forever.
    pub fn endless(label: &'static str, calls: &Calls) -> Self {
        Self {
            label,
            script: VecDeque::new(),
            fallback: Status::Running,
            calls: calls.clone(),
        }
    }
}

impl Behavior for Probe {
    fn name(&self) -> &str {
        self.label
    }

    fn initialize(&mut self, _ctx: &TickContext, _bb: &mut Blackboard) {
        self.calls.push(format!("{}:init", self.label));
    }

    fn update(&mut self, _ctx: &TickContext, _bb: &mut Blackboard) -> Result<Status, Fault> {
        self.calls.push(format!("{}:update", self.label));
        Ok(self.script.pop_front().unwrap_or(self.fallback))
    }

    fn terminate(&mut self, _ctx: &TickContext, _bb: &mut Blackboard, status: Status) {
        self.calls.push(format!("{}:terminate({status:?})", self.label));
    }
}

#[derive(Clone, Default)]
pub struct SharedLog(pub Rc<RefCell<TraceLog>>);

impl TraceSink for SharedLog {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

impl SharedLog {
    pub fn events(&self) -> Vec<TraceEvent> {
        self.0.borrow().events.clone()
    }
}
