//! Ring buffer of recently executed actions and their results.

use bevy::prelude::*;

use super::{ActionResult, TownAction};

const MAX_ENTRIES: usize = 64;

#[derive(Resource, Debug, Clone, Default)]
pub struct ActionResultLog {
    entries: Vec<(TownAction, ActionResult)>,
}

impl ActionResultLog {
    /// Record a pair, evicting the oldest once the buffer is full.
    pub fn push(&mut self, action: TownAction, result: ActionResult) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push((action, result));
    }

    pub fn last_n(&self, n: usize) -> &[(TownAction, ActionResult)] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&(TownAction, ActionResult)> {
        self.entries.last()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
