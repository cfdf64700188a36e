use bevy::prelude::*;

use super::TownAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    Player,
    Script,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedAction {
    pub tick: u64,
    pub source: ActionSource,
    pub action: TownAction,
}

/// Actions waiting for the next tick's action phase, in submission order.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActionQueue {
    pending: Vec<QueuedAction>,
}

impl ActionQueue {
    pub fn push(&mut self, tick: u64, source: ActionSource, action: TownAction) {
        self.pending.push(QueuedAction {
            tick,
            source,
            action,
        });
    }

    pub fn drain(&mut self) -> Vec<QueuedAction> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
