use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ActionResult {
    Success,
    /// Money (or resource units) moved into the town's holdings.
    Collected(f64),
    /// Money paid out of the treasury.
    Spent(f64),
    Error(ActionError),
}

impl ActionResult {
    /// `false` only for `Error`.
    pub fn is_success(&self) -> bool {
        !matches!(self, ActionResult::Error(_))
    }

    pub fn error(&self) -> Option<&ActionError> {
        match self {
            ActionResult::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Result<ActionResult, ActionError>> for ActionResult {
    fn from(result: Result<ActionResult, ActionError>) -> Self {
        result.unwrap_or_else(ActionResult::Error)
    }
}

/// Why an action was refused. A refused action changes nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionError {
    /// The target structure does not exist.
    NotFound,
    /// The target exists but is the wrong kind for this action.
    NotSupported,
    InsufficientFunds,
    /// Nothing to collect, restock or clean.
    NothingToDo,
    AlreadyStaffed,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ActionError::NotFound => "structure not found",
            ActionError::NotSupported => "action does not apply to this structure",
            ActionError::InsufficientFunds => "insufficient funds",
            ActionError::NothingToDo => "nothing to do",
            ActionError::AlreadyStaffed => "role already staffed",
        };
        f.write_str(text)
    }
}

impl std::error::Error for ActionError {}
