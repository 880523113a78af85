//! Persisted flattened tree: behavior, parent and children tables.

use std::fmt;
use std::path::Path;

use ai_core::{load_json, save_json, AssetError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Arity, BehaviorConfig};

/// Dense index of a node in the flattened tables. The root is always `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("tree has no nodes")]
    Empty,

    #[error("table lengths differ: {behaviors} behaviors, {parents} parents, {children} children lists")]
    LengthMismatch {
        behaviors: usize,
        parents: usize,
        children: usize,
    },

    #[error("root node has parent {parent}")]
    RootHasParent { parent: NodeId },

    #[error("node {node} has no parent")]
    MissingParent { node: NodeId },

    #[error("node {node} has parent {parent}, which does not precede it")]
    ParentOutOfOrder { node: NodeId, parent: NodeId },

    #[error("node {node} is not listed among the children of its parent {parent}")]
    ParentMismatch { node: NodeId, parent: NodeId },

    #[error("node {node} lists child {child}, which is out of range or owned by another node")]
    ChildOutOfRange { node: NodeId, child: NodeId },

    #[error("node {node} ({tag}) needs {expected} but has {found}")]
    ChildCount {
        node: NodeId,
        tag: String,
        expected: &'static str,
        found: usize,
    },
}

/// Failure to load a runnable tree from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("invalid tree asset: {0}")]
    Tree(#[from] TreeError),
}

/// Checks the structural invariants of flattened tables.
///
/// Parents must precede their children, which makes every parent chain
/// finite and acyclic; every non-root node must appear exactly once, in its
/// parent's child list.
pub(crate) fn validate_structure(
    parents: &[Option<NodeId>],
    children: &[Vec<NodeId>],
) -> Result<(), TreeError> {
    if parents.is_empty() {
        return Err(TreeError::Empty);
    }
    if let Some(parent) = parents[0] {
        return Err(TreeError::RootHasParent { parent });
    }

    for (index, list) in children.iter().enumerate() {
        let node = NodeId::from_index(index);
        for &child in list {
            if child.index() >= parents.len() || parents[child.index()] != Some(node) {
                return Err(TreeError::ChildOutOfRange { node, child });
            }
        }
    }

    for (index, parent) in parents.iter().enumerate().skip(1) {
        let node = NodeId::from_index(index);
        let parent = parent.ok_or(TreeError::MissingParent { node })?;
        if parent.index() >= index {
            return Err(TreeError::ParentOutOfOrder { node, parent });
        }
        let listed = children[parent.index()]
            .iter()
            .filter(|&&child| child == node)
            .count();
        if listed != 1 {
            return Err(TreeError::ParentMismatch { node, parent });
        }
    }
    Ok(())
}

pub(crate) fn validate_arity(
    node: NodeId,
    tag: &str,
    arity: Arity,
    found: usize,
) -> Result<(), TreeError> {
    if arity.accepts(found) {
        Ok(())
    } else {
        Err(TreeError::ChildCount {
            node,
            tag: tag.to_string(),
            expected: arity.describe(),
            found,
        })
    }
}

/// Output of the tree compiler and input of the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorTreeAsset {
    #[serde(rename = "behaviorTable")]
    pub behaviors: Vec<BehaviorConfig>,
    /// `None` marks the root.
    #[serde(rename = "parentsTable")]
    pub parents: Vec<Option<NodeId>>,
    #[serde(rename = "childrenTable")]
    pub children: Vec<Vec<NodeId>>,
}

impl BehaviorTreeAsset {
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        if self.parents.len() != self.behaviors.len() || self.children.len() != self.behaviors.len()
        {
            return Err(TreeError::LengthMismatch {
                behaviors: self.behaviors.len(),
                parents: self.parents.len(),
                children: self.children.len(),
            });
        }
        validate_structure(&self.parents, &self.children)?;
        for (index, config) in self.behaviors.iter().enumerate() {
            validate_arity(
                NodeId::from_index(index),
                config.tag(),
                config.arity(),
                self.children[index].len(),
            )?;
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), AssetError> {
        save_json(path, self)
    }
}
