/// Per-step information handed to every behavior during a tree tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickContext {
    pub tick: u64,
}

impl TickContext {
    pub fn new(tick: u64) -> Self {
        Self { tick }
    }

    /// Context for the step after this one.
    pub fn next(self) -> Self {
        Self {
            tick: self.tick.wrapping_add(1),
        }
    }
}
