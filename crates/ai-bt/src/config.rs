use ai_core::Value;
use serde::{Deserialize, Serialize};

use crate::nodes::{
    CheckParam, Comparison, Constant, Control, Increment, Log, LogLevel, Node, RemoveParam,
    SetParam, Wait, WaitFor,
};

/// How many children a behavior accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Leaf,
    One,
    Any,
}

impl Arity {
    pub fn accepts(self, children: usize) -> bool {
        match self {
            Arity::Leaf => children == 0,
            Arity::One => children == 1,
            Arity::Any => true,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Arity::Leaf => "no children",
            Arity::One => "exactly one child",
            Arity::Any => "any number of children",
        }
    }
}

/// Persisted configuration of one behavior table slot.
///
/// This is the closed set of behavior variants a script can name; each is
/// turned into a runtime [`Node`] by [`BehaviorConfig::instantiate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BehaviorConfig {
    Selector,
    Sequence,
    Inverter,
    AlwaysSucceed,
    Wait {
        ticks: u32,
    },
    WaitFor {
        key: String,
    },
    Log {
        message: String,
        #[serde(default)]
        level: LogLevel,
    },
    Succeed,
    Fail,
    Set {
        key: String,
        value: Value,
    },
    Check {
        key: String,
        #[serde(default)]
        op: Comparison,
        value: Value,
    },
    Remove {
        key: String,
    },
    Increment {
        key: String,
        by: i32,
    },
}

impl BehaviorConfig {
    /// Script tag of this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            BehaviorConfig::Selector => "Selector",
            BehaviorConfig::Sequence => "Sequence",
            BehaviorConfig::Inverter => "Inverter",
            BehaviorConfig::AlwaysSucceed => "AlwaysSucceed",
            BehaviorConfig::Wait { .. } => "Wait",
            BehaviorConfig::WaitFor { .. } => "WaitFor",
            BehaviorConfig::Log { .. } => "Log",
            BehaviorConfig::Succeed => "Succeed",
            BehaviorConfig::Fail => "Fail",
            BehaviorConfig::Set { .. } => "Set",
            BehaviorConfig::Check { .. } => "Check",
            BehaviorConfig::Remove { .. } => "Remove",
            BehaviorConfig::Increment { .. } => "Increment",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            BehaviorConfig::Selector | BehaviorConfig::Sequence => Arity::Any,
            BehaviorConfig::Inverter | BehaviorConfig::AlwaysSucceed => Arity::One,
            _ => Arity::Leaf,
        }
    }

    pub fn instantiate(&self) -> Node {
        match self {
            BehaviorConfig::Selector => Node::Control(Control::Selector),
            BehaviorConfig::Sequence => Node::Control(Control::Sequence),
            BehaviorConfig::Inverter => Node::Control(Control::Inverter),
            BehaviorConfig::AlwaysSucceed => Node::Control(Control::AlwaysSucceed),
            BehaviorConfig::Wait { ticks } => Node::leaf(Wait::new(*ticks)),
            BehaviorConfig::WaitFor { key } => Node::leaf(WaitFor::new(key.as_str())),
            BehaviorConfig::Log { message, level } => Node::leaf(Log::new(message.as_str(), *level)),
            BehaviorConfig::Succeed => Node::leaf(Constant::success()),
            BehaviorConfig::Fail => Node::leaf(Constant::failure()),
            BehaviorConfig::Set { key, value } => {
                Node::leaf(SetParam::new(key.as_str(), value.clone()))
            }
            BehaviorConfig::Check { key, op, value } => {
                Node::leaf(CheckParam::new(key.as_str(), *op, value.clone()))
            }
            BehaviorConfig::Remove { key } => Node::leaf(RemoveParam::new(key.as_str())),
            BehaviorConfig::Increment { key, by } => Node::leaf(Increment::new(key.as_str(), *by)),
        }
    }
}
