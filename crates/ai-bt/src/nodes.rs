use std::fmt;
use std::str::FromStr;

use ai_core::{Blackboard, Status, TickContext, Value};
use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, Fault};

/// Control-flow nodes. Their result is derived from their children by the
/// runtime rather than by an `update` of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    /// Ticks children in order; the first result other than `Failure` wins.
    Selector,
    /// Ticks children in order; the first result other than `Success` wins.
    Sequence,
    /// Single child; swaps `Success` and `Failure`.
    Inverter,
    /// Single child; any finished result becomes `Success`.
    AlwaysSucceed,
}

impl Control {
    pub fn name(self) -> &'static str {
        match self {
            Control::Selector => "Selector",
            Control::Sequence => "Sequence",
            Control::Inverter => "Inverter",
            Control::AlwaysSucceed => "AlwaysSucceed",
        }
    }
}

/// What occupies one slot of the behavior table.
pub enum Node {
    Control(Control),
    Leaf(Box<dyn Behavior>),
}

impl Node {
    pub fn leaf(behavior: impl Behavior) -> Self {
        Node::Leaf(Box::new(behavior))
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Control(control) => control.name(),
            Node::Leaf(behavior) => behavior.name(),
        }
    }

    pub fn control(&self) -> Option<Control> {
        match self {
            Node::Control(control) => Some(*control),
            Node::Leaf(_) => None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Control(control) => f.debug_tuple("Control").field(control).finish(),
            Node::Leaf(behavior) => f.debug_tuple("Leaf").field(&behavior.name()).finish(),
        }
    }
}

impl From<Control> for Node {
    fn from(control: Control) -> Self {
        Node::Control(control)
    }
}

/// Returns `Running` for `ticks - 1` updates, then `Success`.
#[derive(Debug, Clone)]
pub struct Wait {
    ticks: u32,
    remaining: u32,
}

impl Wait {
    pub fn new(ticks: u32) -> Self {
        Self {
            ticks,
            remaining: ticks,
        }
    }
}

impl Behavior for Wait {
    fn name(&self) -> &str {
        "Wait"
    }

    fn initialize(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) {
        self.remaining = self.ticks;
    }

    fn update(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> Result<Status, Fault> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            Ok(Status::Success)
        } else {
            Ok(Status::Running)
        }
    }
}

/// Running until a bool parameter becomes `true`.
#[derive(Debug, Clone)]
pub struct WaitFor {
    key: String,
}

impl WaitFor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Behavior for WaitFor {
    fn name(&self) -> &str {
        "WaitFor"
    }

    fn update(&mut self, _ctx: &TickContext, blackboard: &mut Blackboard) -> Result<Status, Fault> {
        match blackboard.get::<bool>(&self.key).copied() {
            Ok(true) => Ok(Status::Success),
            _ => Ok(Status::Running),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Log {
    message: String,
    level: LogLevel,
}

impl Log {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
}

impl Behavior for Log {
    fn name(&self) -> &str {
        "Log"
    }

    fn update(&mut self, ctx: &TickContext, _blackboard: &mut Blackboard) -> Result<Status, Fault> {
        let message = self.message.as_str();
        let tick = ctx.tick;
        match self.level {
            LogLevel::Trace => tracing::trace!(tick, "{message}"),
            LogLevel::Debug => tracing::debug!(tick, "{message}"),
            LogLevel::Info => tracing::info!(tick, "{message}"),
            LogLevel::Warn => tracing::warn!(tick, "{message}"),
            LogLevel::Error => tracing::error!(tick, "{message}"),
        }
        Ok(Status::Success)
    }
}

/// Finishes immediately with a fixed result (`Succeed` / `Fail`).
#[derive(Debug, Clone, Copy)]
pub struct Constant {
    status: Status,
}

impl Constant {
    pub fn success() -> Self {
        Self {
            status: Status::Success,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: Status::Failure,
        }
    }
}

impl Behavior for Constant {
    fn name(&self) -> &str {
        match self.status {
            Status::Success => "Succeed",
            _ => "Fail",
        }
    }

    fn update(&mut self, _ctx: &TickContext, _blackboard: &mut Blackboard) -> Result<Status, Fault> {
        Ok(self.status)
    }
}

#[derive(Debug, Clone)]
pub struct SetParam {
    key: String,
    value: Value,
}

impl SetParam {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Behavior for SetParam {
    fn name(&self) -> &str {
        "Set"
    }

    fn update(&mut self, _ctx: &TickContext, blackboard: &mut Blackboard) -> Result<Status, Fault> {
        blackboard.set(self.key.as_str(), self.value.clone());
        Ok(Status::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    #[default]
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// Whether the comparison needs an ordering rather than plain equality.
    pub fn is_ordering(self) -> bool {
        !matches!(self, Comparison::Eq | Comparison::Ne)
    }

    /// `None` when the operands differ in type or cannot be ordered.
    pub fn apply(self, lhs: &Value, rhs: &Value) -> Option<bool> {
        if lhs.param_type() != rhs.param_type() {
            return None;
        }
        let ordering = match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            _ => None,
        };
        match self {
            Comparison::Eq => Some(lhs == rhs),
            Comparison::Ne => Some(lhs != rhs),
            Comparison::Lt => ordering.map(|o| o.is_lt()),
            Comparison::Le => ordering.map(|o| o.is_le()),
            Comparison::Gt => ordering.map(|o| o.is_gt()),
            Comparison::Ge => ordering.map(|o| o.is_ge()),
        }
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eq" | "==" => Ok(Comparison::Eq),
            "ne" | "!=" => Ok(Comparison::Ne),
            "lt" | "<" => Ok(Comparison::Lt),
            "le" | "<=" => Ok(Comparison::Le),
            "gt" | ">" => Ok(Comparison::Gt),
            "ge" | ">=" => Ok(Comparison::Ge),
            other => Err(format!("unknown comparison `{other}`")),
        }
    }
}

/// Condition leaf: compares a parameter against a constant.
///
/// A missing parameter or one of another type is a plain `Failure`.
#[derive(Debug, Clone)]
pub struct CheckParam {
    key: String,
    op: Comparison,
    value: Value,
}

impl CheckParam {
    pub fn new(key: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            op,
            value: value.into(),
        }
    }
}

impl Behavior for CheckParam {
    fn name(&self) -> &str {
        "Check"
    }

    fn update(&mut self, _ctx: &TickContext, blackboard: &mut Blackboard) -> Result<Status, Fault> {
        let Ok(current) = blackboard.get_value(&self.key, self.value.param_type()) else {
            return Ok(Status::Failure);
        };
        match self.op.apply(current, &self.value) {
            Some(true) => Ok(Status::Success),
            _ => Ok(Status::Failure),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoveParam {
    key: String,
}

impl RemoveParam {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Behavior for RemoveParam {
    fn name(&self) -> &str {
        "Remove"
    }

    fn update(&mut self, _ctx: &TickContext, blackboard: &mut Blackboard) -> Result<Status, Fault> {
        blackboard.remove(&self.key);
        Ok(Status::Success)
    }
}

/// Adds `by` to an int parameter. A missing or non-int parameter faults.
#[derive(Debug, Clone)]
pub struct Increment {
    key: String,
    by: i32,
}

impl Increment {
    pub fn new(key: impl Into<String>, by: i32) -> Self {
        Self {
            key: key.into(),
            by,
        }
    }
}

impl Behavior for Increment {
    fn name(&self) -> &str {
        "Increment"
    }

    fn update(&mut self, _ctx: &TickContext, blackboard: &mut Blackboard) -> Result<Status, Fault> {
        let current = *blackboard.get::<i32>(&self.key)?;
        blackboard.set(self.key.as_str(), current.wrapping_add(self.by));
        Ok(Status::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(behavior: &mut dyn Behavior, bb: &mut Blackboard) -> Status {
        crate::behavior::tick(behavior, Status::Undefined, &TickContext::default(), bb)
    }

    #[test]
    fn wait_counts_updates_and_rearms() {
        let mut wait = Wait::new(2);
        let mut bb = Blackboard::new();
        let ctx = TickContext::default();

        let first = crate::behavior::tick(&mut wait, Status::Undefined, &ctx, &mut bb);
        let second = crate::behavior::tick(&mut wait, first, &ctx, &mut bb);
        let third = crate::behavior::tick(&mut wait, second, &ctx, &mut bb);

        assert_eq!(first, Status::Running);
        assert_eq!(second, Status::Success);
        assert_eq!(third, Status::Running);
    }

    #[test]
    fn wait_zero_succeeds_immediately() {
        let mut bb = Blackboard::new();
        assert_eq!(run(&mut Wait::new(0), &mut bb), Status::Success);
    }

    #[test]
    fn check_compares_by_type() {
        let mut bb = Blackboard::new();
        bb.set("hp", 10);

        assert_eq!(
            run(&mut CheckParam::new("hp", Comparison::Gt, 5), &mut bb),
            Status::Success
        );
        assert_eq!(
            run(&mut CheckParam::new("hp", Comparison::Eq, 5), &mut bb),
            Status::Failure
        );
        assert_eq!(
            run(&mut CheckParam::new("hp", Comparison::Eq, 10.0f32), &mut bb),
            Status::Failure
        );
        assert_eq!(
            run(&mut CheckParam::new("missing", Comparison::Ne, 1), &mut bb),
            Status::Failure
        );
    }

    #[test]
    fn ordering_on_strings_fails() {
        assert_eq!(
            Comparison::Lt.apply(&Value::from("a"), &Value::from("b")),
            None
        );
    }

    #[test]
    fn increment_faults_on_missing_key() {
        let mut bb = Blackboard::new();
        assert_eq!(run(&mut Increment::new("count", 1), &mut bb), Status::Failure);

        bb.set("count", 41);
        assert_eq!(run(&mut Increment::new("count", 1), &mut bb), Status::Success);
        assert_eq!(bb.get::<i32>("count").copied(), Ok(42));
    }

    #[test]
    fn set_and_remove_edit_the_blackboard() {
        let mut bb = Blackboard::new();
        assert_eq!(run(&mut SetParam::new("flag", true), &mut bb), Status::Success);
        assert_eq!(bb.get::<bool>("flag").copied(), Ok(true));

        assert_eq!(run(&mut RemoveParam::new("flag"), &mut bb), Status::Success);
        assert_eq!(run(&mut RemoveParam::new("flag"), &mut bb), Status::Success);
        assert!(!bb.contains("flag"));
    }
}
