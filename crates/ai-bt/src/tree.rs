use std::fmt;
use std::path::Path;

use ai_core::{Blackboard, Status, TickContext};
use ai_tools::{TraceEvent, TracePhase, TraceSink};
use tracing::{debug, trace};

use crate::asset::{
    validate_arity, validate_structure, BehaviorTreeAsset, LoadError, NodeId, TreeError,
};
use crate::behavior;
use crate::config::Arity;
use crate::nodes::{Control, Node};

/// A runnable flattened behavior tree.
///
/// Each tick re-evaluates from the root. Selector and Sequence re-examine
/// their children in priority order every tick, so a higher-priority child
/// that becomes eligible preempts a lower-priority `Running` branch. The
/// preempted branch is aborted bottom-up (`Terminate(Aborted)`) before the
/// composite that dropped it returns.
///
/// Preemption is only known once the higher-priority child has been ticked,
/// so that child's `Initialize` and first `Update` come before the abort of
/// the old branch. Nothing else runs in between.
///
/// Node state lives in the tree rather than in the nodes: `states[id]` holds
/// the result of the node's last tick and doubles as the `previous` input of
/// the lifecycle contract.
pub struct BehaviorTree {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    states: Vec<Status>,
    running_path: Vec<NodeId>,
    trace: Option<Box<dyn TraceSink>>,
}

impl BehaviorTree {
    /// Assembles a tree from runtime nodes and validated tables.
    pub fn new(
        nodes: Vec<Node>,
        parents: Vec<Option<NodeId>>,
        children: Vec<Vec<NodeId>>,
    ) -> Result<Self, TreeError> {
        if parents.len() != nodes.len() || children.len() != nodes.len() {
            return Err(TreeError::LengthMismatch {
                behaviors: nodes.len(),
                parents: parents.len(),
                children: children.len(),
            });
        }
        validate_structure(&parents, &children)?;
        for (index, node) in nodes.iter().enumerate() {
            validate_arity(
                NodeId::from_index(index),
                node.name(),
                arity(node),
                children[index].len(),
            )?;
        }

        let states = vec![Status::Undefined; nodes.len()];
        Ok(Self {
            nodes,
            parents,
            children,
            states,
            running_path: Vec::new(),
            trace: None,
        })
    }

    pub fn from_asset(asset: &BehaviorTreeAsset) -> Result<Self, TreeError> {
        let nodes = asset.behaviors.iter().map(|b| b.instantiate()).collect();
        Self::new(nodes, asset.parents.clone(), asset.children.clone())
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let asset = BehaviorTreeAsset::load(path)?;
        let tree = Self::from_asset(&asset)?;
        debug!(path = %path.display(), nodes = tree.len(), "loaded behavior tree");
        Ok(tree)
    }

    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Some(Box::new(sink));
        self
    }

    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.trace = sink;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Result of the root's last tick.
    pub fn status(&self) -> Status {
        self.states[NodeId::ROOT.index()]
    }

    pub fn state(&self, id: NodeId) -> Option<Status> {
        self.states.get(id.index()).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Root-to-leaf chain of nodes left `Running` by the last tick.
    pub fn running_path(&self) -> &[NodeId] {
        &self.running_path
    }

    pub fn tick(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let status = self.tick_node(NodeId::ROOT, ctx, blackboard);
        self.running_path = self.running_chain(NodeId::ROOT);
        trace!(tick = ctx.tick, ?status, depth = self.running_path.len(), "tree ticked");
        status
    }

    /// Aborts every running node, deepest first. No-op when nothing runs.
    pub fn abort(&mut self, ctx: &TickContext, blackboard: &mut Blackboard) {
        if self.status() == Status::Running {
            debug!(tick = ctx.tick, "aborting running tree");
            self.abort_subtree(NodeId::ROOT, ctx, blackboard);
        }
        self.running_path.clear();
    }

    fn tick_node(&mut self, id: NodeId, ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        let index = id.index();
        let previous = self.states[index];

        let status = match &mut self.nodes[index] {
            Node::Leaf(leaf) => {
                let status = behavior::tick(leaf.as_mut(), previous, ctx, blackboard);
                if previous != Status::Running {
                    self.emit(ctx, id, TracePhase::Initialize);
                }
                self.emit(ctx, id, TracePhase::Update(status));
                if status != Status::Running {
                    self.emit(ctx, id, TracePhase::Terminate(status));
                }
                status
            }
            Node::Control(control) => {
                let control = *control;
                let status = self.update_control(control, id, ctx, blackboard);
                self.emit(ctx, id, TracePhase::Update(status));
                status
            }
        };

        self.states[index] = status;
        status
    }

    fn update_control(
        &mut self,
        control: Control,
        id: NodeId,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
    ) -> Status {
        match control {
            Control::Selector => self.update_composite(id, Status::Failure, ctx, blackboard),
            Control::Sequence => self.update_composite(id, Status::Success, ctx, blackboard),
            Control::Inverter => self.tick_only_child(id, ctx, blackboard).invert(),
            Control::AlwaysSucceed => match self.tick_only_child(id, ctx, blackboard) {
                Status::Running => Status::Running,
                _ => Status::Success,
            },
        }
    }

    /// Ticks children in order while they report `keep_going`; the first other
    /// result becomes the composite's. An exhausted composite reports
    /// `keep_going` itself.
    fn update_composite(
        &mut self,
        id: NodeId,
        keep_going: Status,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
    ) -> Status {
        let previously_running = self.running_child(id);
        let count = self.children[id.index()].len();

        let mut result = keep_going;
        let mut stopped_at = count;
        for position in 0..count {
            let child = self.children[id.index()][position];
            let status = self.tick_node(child, ctx, blackboard);
            if status != keep_going {
                result = status;
                stopped_at = position;
                break;
            }
        }

        if let Some((position, child)) = previously_running {
            if position > stopped_at {
                debug!(
                    tick = ctx.tick,
                    composite = %id,
                    preempted = %child,
                    by = %self.children[id.index()][stopped_at],
                    "preempting running branch"
                );
                self.abort_subtree(child, ctx, blackboard);
            }
        }
        result
    }

    fn tick_only_child(&mut self, id: NodeId, ctx: &TickContext, blackboard: &mut Blackboard) -> Status {
        match self.children[id.index()].first().copied() {
            Some(child) => self.tick_node(child, ctx, blackboard),
            None => Status::Failure,
        }
    }

    /// Delivers `Aborted` along the running chain under `from`, deepest first.
    fn abort_subtree(&mut self, from: NodeId, ctx: &TickContext, blackboard: &mut Blackboard) {
        let chain = self.running_chain(from);
        for &id in chain.iter().rev() {
            self.emit(ctx, id, TracePhase::Abort);
            if let Node::Leaf(leaf) = &mut self.nodes[id.index()] {
                leaf.terminate(ctx, blackboard, Status::Aborted);
                self.emit(ctx, id, TracePhase::Terminate(Status::Aborted));
            }
            self.states[id.index()] = Status::Aborted;
        }
    }

    fn running_child(&self, id: NodeId) -> Option<(usize, NodeId)> {
        self.children[id.index()]
            .iter()
            .enumerate()
            .find(|(_, child)| self.states[child.index()] == Status::Running)
            .map(|(position, child)| (position, *child))
    }

    fn running_chain(&self, from: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        if self.states[from.index()] != Status::Running {
            return chain;
        }
        let mut current = from;
        chain.push(current);
        while let Some((_, child)) = self.running_child(current) {
            chain.push(child);
            current = child;
        }
        chain
    }

    fn emit(&mut self, ctx: &TickContext, id: NodeId, phase: TracePhase) {
        if let Some(sink) = self.trace.as_mut() {
            sink.emit(TraceEvent::new(ctx.tick, id.0, phase));
        }
    }
}

impl fmt::Debug for BehaviorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("nodes", &self.nodes)
            .field("states", &self.states)
            .field("running_path", &self.running_path)
            .finish_non_exhaustive()
    }
}

fn arity(node: &Node) -> Arity {
    match node.control() {
        Some(Control::Selector | Control::Sequence) => Arity::Any,
        Some(Control::Inverter | Control::AlwaysSucceed) => Arity::One,
        None => Arity::Leaf,
    }
}
