//! Deterministic, engine-agnostic AI kernel primitives.
//!
//! Holds the pieces every behavior tree crate shares: the [`Status`] a behavior
//! reports, the [`TickContext`] handed to each tick, and the typed
//! [`Blackboard`] behaviors use to talk to each other.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod asset;
pub mod blackboard;
pub mod status;
pub mod tick;
pub mod value;

pub use asset::{load_json, save_json, AssetError};
pub use blackboard::{Blackboard, BlackboardAsset, BlackboardError};
pub use status::Status;
pub use tick::TickContext;
pub use value::{ObjectRef, ParamType, Parameter, ParseValueError, Value, Vector2, Vector3};
