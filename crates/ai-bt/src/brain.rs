use ai_core::{Blackboard, Status, TickContext};

use crate::tree::BehaviorTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrainConfig {
    pub think_every_ticks: u32,
    pub think_offset_ticks: u32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            think_every_ticks: 1,
            think_offset_ticks: 0,
        }
    }
}

impl BrainConfig {
    /// Staggers agents sharing the same rate so they do not all think on the
    /// same step.
    pub fn deterministic(id: u64, think_every_ticks: u32) -> Self {
        let every = think_every_ticks.max(1);
        let offset = (id % (every as u64)) as u32;
        Self {
            think_every_ticks: every,
            think_offset_ticks: offset,
        }
    }

    pub fn should_think(&self, tick: u64) -> bool {
        let every = self.think_every_ticks.max(1) as u64;
        ((tick + (self.think_offset_ticks as u64)) % every) == 0
    }
}

/// One agent: a tree and the blackboard it exclusively owns.
#[derive(Debug)]
pub struct Brain {
    pub id: u64,
    pub config: BrainConfig,
    pub blackboard: Blackboard,
    pub tree: BehaviorTree,
}

impl Brain {
    pub fn new(id: u64, tree: BehaviorTree) -> Self {
        Self {
            id,
            config: BrainConfig::default(),
            blackboard: Blackboard::new(),
            tree,
        }
    }

    pub fn with_blackboard(mut self, blackboard: Blackboard) -> Self {
        self.blackboard = blackboard;
        self
    }

    /// Ticks the tree when this step is a thinking step; `None` otherwise.
    pub fn tick(&mut self, ctx: &TickContext) -> Option<Status> {
        if !self.config.should_think(ctx.tick) {
            return None;
        }
        Some(self.tree.tick(ctx, &mut self.blackboard))
    }
}

/// Ticks every brain once, in ascending id order.
///
/// `brains` is left sorted by id. Returns each brain's id with its tick
/// result, `None` for brains that skipped this step.
pub fn tick_brains(ctx: &TickContext, brains: &mut [Brain]) -> Vec<(u64, Option<Status>)> {
    brains.sort_by_key(|b| b.id);
    brains
        .iter_mut()
        .map(|brain| (brain.id, brain.tick(ctx)))
        .collect()
}
