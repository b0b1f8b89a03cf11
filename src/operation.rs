use std::{borrow::Cow, fmt};

use crate::traits::{
    command::{ActionError, Command},
    reversible::Reversible,
};

/// A fixed pair of commands: one that reverses a forward action and one that
/// re-applies it.
///
/// The operation carries no state of its own. Which stack of the
/// [`UndoService`](crate::undo_service::UndoService) holds it decides what
/// happens to it next.
pub struct Operation<C = Box<dyn Command>> {
    undo_command: C,
    redo_command: C,
}

impl<C: Command> Operation<C> {
    #[must_use]
    pub fn new(undo_command: C, redo_command: C) -> Self {
        Self {
            undo_command,
            redo_command,
        }
    }

    pub fn undo_command(&self) -> &C {
        &self.undo_command
    }

    pub fn redo_command(&self) -> &C {
        &self.redo_command
    }
}

impl Operation {
    /// Builds an operation from two commands of different types.
    #[must_use]
    pub fn boxed(
        undo_command: impl Command + 'static,
        redo_command: impl Command + 'static,
    ) -> Self {
        Self::new(Box::new(undo_command), Box::new(redo_command))
    }
}

impl Operation<Box<dyn Command + Send>> {
    /// Like [`Operation::boxed`], for operations that must cross threads.
    #[must_use]
    pub fn boxed_send(
        undo_command: impl Command + Send + 'static,
        redo_command: impl Command + Send + 'static,
    ) -> Self {
        Self::new(Box::new(undo_command), Box::new(redo_command))
    }
}

impl<C: Command> Reversible for Operation<C> {
    fn undo(&self) -> Result<(), ActionError> {
        self.undo_command.execute()
    }

    fn redo(&self) -> Result<(), ActionError> {
        self.redo_command.execute()
    }

    fn description(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "Operation: {} & {}",
            self.undo_command.description(),
            self.redo_command.description()
        ))
    }
}

impl<C: Command> fmt::Debug for Operation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("undo", &self.undo_command.description())
            .field("redo", &self.redo_command.description())
            .finish()
    }
}

/// An ordered group of operations recorded as one history entry.
///
/// `undo` walks the group in recorded order and `redo` walks it in reverse.
/// Both stop at the first failing member and return its error; members
/// already processed are not rolled back.
pub struct CascadedOperation<O = Box<dyn Reversible>> {
    operations: Vec<O>,
}

impl<O: Reversible> CascadedOperation<O> {
    #[must_use]
    pub fn new(operations: Vec<O>) -> Self {
        Self { operations }
    }

    pub fn push(&mut self, operation: O) {
        self.operations.push(operation);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[O] {
        &self.operations
    }
}

impl<O: Reversible> Default for CascadedOperation<O> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<O: Reversible> FromIterator<O> for CascadedOperation<O> {
    fn from_iter<I: IntoIterator<Item = O>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<O: Reversible> Reversible for CascadedOperation<O> {
    fn undo(&self) -> Result<(), ActionError> {
        for operation in &self.operations {
            operation.undo()?;
        }
        Ok(())
    }

    fn redo(&self) -> Result<(), ActionError> {
        for operation in self.operations.iter().rev() {
            operation.redo()?;
        }
        Ok(())
    }

    fn description(&self) -> Cow<'_, str> {
        let members: Vec<_> = self.operations.iter().map(Reversible::description).collect();
        Cow::Owned(format!("CascadedOperation: [{}]", members.join(", ")))
    }
}

impl<O: Reversible> fmt::Debug for CascadedOperation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.operations.iter().map(Reversible::description))
            .finish()
    }
}
