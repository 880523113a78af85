//! Script → flattened tree compiler.
//!
//! A script is a markup document whose root element wraps exactly one
//! behavior element, the tree root:
//!
//! ```xml
//! <BehaviorTree>
//!   <Sequence>
//!     <Wait ticks="2"/>
//!     <Log msg="done"/>
//!   </Sequence>
//! </BehaviorTree>
//! ```
//!
//! Every element tag names a behavior through a [`BehaviorRegistry`]; its
//! attributes configure it. Ids are assigned in depth-first pre-order, so the
//! same document always compiles to the same tables.

#![forbid(unsafe_code)]

mod compiler;
mod error;

pub use compiler::{compile, compile_str, compile_with, CompileOptions};
pub use error::CompileError;

pub use ai_bt::BehaviorRegistry;
