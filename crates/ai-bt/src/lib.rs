//! Behavior Tree runtime built on `ai-core`.
//!
//! Trees are stored flattened: three parallel tables indexed by [`NodeId`]
//! (behavior, parent, ordered children). [`BehaviorTree`] ticks the root once
//! per step, re-evaluating composites in priority order and aborting running
//! branches that lose priority.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod asset;
pub mod behavior;
pub mod brain;
pub mod builder;
pub mod config;
pub mod nodes;
pub mod registry;
pub mod tree;

pub use asset::{BehaviorTreeAsset, LoadError, NodeId, TreeError};
pub use behavior::{Behavior, Fault};
pub use brain::{tick_brains, Brain, BrainConfig};
pub use builder::TreeBuilder;
pub use config::{Arity, BehaviorConfig};
pub use nodes::{Comparison, Control, LogLevel, Node};
pub use registry::{AttributeError, Attributes, BehaviorRegistry, Factory};
pub use tree::BehaviorTree;
