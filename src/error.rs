use thiserror::Error;

use crate::traits::command::ActionError;

/// The history has nothing left in the requested direction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyHistory {
    #[error("No more undoes")]
    Undo,
    #[error("No more redoes")]
    Redo,
}

#[derive(Error, Debug)]
pub enum UndoError {
    #[error(transparent)]
    EmptyHistory(#[from] EmptyHistory),

    /// `undo()` or `redo()` was called from inside another undo or redo.
    #[error("an undo or redo is already in progress")]
    Replaying,

    /// The stored operation failed while being reversed or re-applied.
    /// The operation stays on the stack it was taken from.
    #[error("operation `{description}` failed")]
    Action {
        description: String,
        #[source]
        source: ActionError,
    },
}

impl UndoError {
    /// Returns `true` when the failure only means there was nothing to do.
    #[must_use]
    pub fn is_empty_history(&self) -> bool {
        matches!(self, Self::EmptyHistory(_))
    }
}
