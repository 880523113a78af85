//! Programmatic tree construction for hosts with their own leaf behaviors.
//!
//! Scripts cover the built-in behaviors; a host that implements [`Behavior`]
//! itself assembles the flattened tables here instead:
//!
//! ```
//! use ai_bt::{Control, TreeBuilder};
//! use ai_bt::nodes::{Log, LogLevel, Wait};
//!
//! let mut builder = TreeBuilder::new(Control::Sequence);
//! let root = builder.root();
//! builder.leaf(root, Wait::new(2));
//! builder.leaf(root, Log::new("done", LogLevel::Info));
//! let tree = builder.build().unwrap();
//! assert_eq!(tree.len(), 3);
//! ```

use crate::asset::{NodeId, TreeError};
use crate::behavior::Behavior;
use crate::nodes::Node;
use crate::tree::BehaviorTree;

#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
}

impl TreeBuilder {
    pub fn new(root: impl Into<Node>) -> Self {
        Self {
            nodes: vec![root.into()],
            parents: vec![None],
            children: vec![Vec::new()],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Appends `node` as the last child of `parent`.
    ///
    /// An unknown `parent` is reported by [`TreeBuilder::build`].
    pub fn child(&mut self, parent: NodeId, node: impl Into<Node>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(node.into());
        self.parents.push(Some(parent));
        self.children.push(Vec::new());
        if let Some(list) = self.children.get_mut(parent.index()) {
            if parent != id {
                list.push(id);
            }
        }
        id
    }

    pub fn leaf(&mut self, parent: NodeId, behavior: impl Behavior) -> NodeId {
        self.child(parent, Node::leaf(behavior))
    }

    pub fn build(self) -> Result<BehaviorTree, TreeError> {
        BehaviorTree::new(self.nodes, self.parents, self.children)
    }
}
