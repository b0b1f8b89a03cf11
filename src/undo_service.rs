use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    num::NonZeroUsize,
};

use tracing::{debug, trace, warn};

use crate::{
    error::{EmptyHistory, UndoError},
    traits::{command::ActionError, reversible::Reversible},
};

/// Whether the service is currently replaying a stored operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Replaying,
}

/// Holds the service in [`Mode::Replaying`] until dropped.
///
/// Dropping restores [`Mode::Idle`] on every exit path, including an action
/// that returns an error or panics.
struct ReplayGuard<'a> {
    mode: &'a Cell<Mode>,
}

impl<'a> ReplayGuard<'a> {
    fn enter(mode: &'a Cell<Mode>) -> Result<Self, UndoError> {
        if mode.get() == Mode::Replaying {
            return Err(UndoError::Replaying);
        }
        mode.set(Mode::Replaying);
        Ok(Self { mode })
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        self.mode.set(Mode::Idle);
    }
}

/// A linear undo/redo history.
///
/// Application code performs a forward action, then hands the matching
/// [`Reversible`] operation to [`record_for_undo`](Self::record_for_undo).
/// [`undo`](Self::undo) and [`redo`](Self::redo) move one operation at a time
/// between the two stacks, running its reversal on the way.
///
/// While an operation is being replayed, any call to `record_for_undo` is
/// ignored, so actions that record themselves do not pollute the history when
/// they are invoked by an undo or redo. Recording a new action discards the
/// redo history left over from earlier undos.
///
/// All entry points take `&self`. The service is meant to live on a single
/// logical call stack; wrap it in a
/// [`SharedUndoService`](crate::shared_undo_service::SharedUndoService) when
/// several threads need it.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use undo_service::prelude::*;
///
/// fn add(args: &(Rc<Cell<i32>>, i32)) -> Result<(), ActionError> {
///     args.0.set(args.0.get() + args.1);
///     Ok(())
/// }
///
/// let counter = Rc::new(Cell::new(0));
/// let service: UndoService = UndoService::new();
///
/// counter.set(5);
/// service.record_for_undo(Box::new(Operation::new(
///     BoundCommand::new("add", add, (Rc::clone(&counter), -5)),
///     BoundCommand::new("add", add, (Rc::clone(&counter), 5)),
/// )));
///
/// service.undo().unwrap();
/// assert_eq!(counter.get(), 0);
///
/// service.redo().unwrap();
/// assert_eq!(counter.get(), 5);
///
/// assert!(service.redo().unwrap_err().is_empty_history());
/// ```
pub struct UndoService<O: ?Sized = dyn Reversible> {
    undo: RefCell<VecDeque<Box<O>>>,
    redo: RefCell<VecDeque<Box<O>>>,
    mode: Cell<Mode>,
    redo_valid: Cell<bool>,
    history_limit: Cell<Option<NonZeroUsize>>,
}

impl<O: ?Sized + Reversible> UndoService<O> {
    /// Creates a service with unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            undo: RefCell::new(VecDeque::new()),
            redo: RefCell::new(VecDeque::new()),
            mode: Cell::new(Mode::Idle),
            redo_valid: Cell::new(false),
            history_limit: Cell::new(None),
        }
    }

    /// Creates a service that keeps at most `history_limit` undoable
    /// operations, forgetting the oldest first.
    #[must_use]
    pub fn with_history_limit(history_limit: NonZeroUsize) -> Self {
        let service = Self::new();
        service.history_limit.set(Some(history_limit));
        service
    }

    /// Records an operation whose forward action has just been performed.
    ///
    /// Ignored while an undo or redo is in progress. Otherwise any redo
    /// history is discarded and the operation becomes the next one to undo.
    pub fn record_for_undo(&self, operation: Box<O>) {
        if self.is_replaying() {
            trace!(
                operation = %operation.description(),
                "replay in progress, record dropped"
            );
            return;
        }

        {
            let mut redo = self.redo.borrow_mut();
            if !redo.is_empty() {
                trace!(discarded = redo.len(), "discarding stale redo history");
                redo.clear();
            }
        }

        trace!(operation = %operation.description(), "recorded for undo");
        self.push_undo(operation);
        self.redo_valid.set(false);
    }

    /// Reverses the most recent operation and makes it available to
    /// [`redo`](Self::redo).
    ///
    /// # Errors
    ///
    /// * [`EmptyHistory::Undo`] if there is nothing to undo.
    /// * [`UndoError::Replaying`] if called from inside another undo or redo.
    /// * [`UndoError::Action`] if the operation failed; it stays on the undo
    ///   stack.
    ///
    /// The history is unchanged whenever an error is returned.
    pub fn undo(&self) -> Result<(), UndoError> {
        debug!("trying to undo");
        let guard = ReplayGuard::enter(&self.mode)?;
        let operation = self
            .undo
            .borrow_mut()
            .pop_front()
            .ok_or(EmptyHistory::Undo)?;

        let outcome = operation.undo();
        drop(guard);

        match outcome {
            Ok(()) => {
                self.redo.borrow_mut().push_front(operation);
                self.redo_valid.set(true);
                debug!(
                    undo_len = self.undo_len(),
                    redo_len = self.redo_len(),
                    "undo complete"
                );
                Ok(())
            }
            Err(source) => Err(Self::restore(&self.undo, operation, source)),
        }
    }

    /// Re-applies the most recently undone operation.
    ///
    /// # Errors
    ///
    /// * [`EmptyHistory::Redo`] if nothing has been undone since the last
    ///   recorded operation.
    /// * [`UndoError::Replaying`] if called from inside another undo or redo.
    /// * [`UndoError::Action`] if the operation failed; it stays on the redo
    ///   stack.
    ///
    /// The history is unchanged whenever an error is returned.
    pub fn redo(&self) -> Result<(), UndoError> {
        debug!("trying to redo");
        let guard = ReplayGuard::enter(&self.mode)?;
        if !self.redo_valid.get() {
            return Err(EmptyHistory::Redo.into());
        }
        let operation = self
            .redo
            .borrow_mut()
            .pop_front()
            .ok_or(EmptyHistory::Redo)?;

        let outcome = operation.redo();
        drop(guard);

        match outcome {
            Ok(()) => {
                self.push_undo(operation);
                debug!(
                    undo_len = self.undo_len(),
                    redo_len = self.redo_len(),
                    "redo complete"
                );
                Ok(())
            }
            Err(source) => Err(Self::restore(&self.redo, operation, source)),
        }
    }

    /// Puts a failed operation back where it was taken from.
    fn restore(
        stack: &RefCell<VecDeque<Box<O>>>,
        operation: Box<O>,
        source: ActionError,
    ) -> UndoError {
        let description = operation.description().into_owned();
        warn!(
            operation = %description,
            error = %source,
            "operation failed, history left as it was"
        );
        stack.borrow_mut().push_front(operation);
        UndoError::Action {
            description,
            source,
        }
    }

    fn push_undo(&self, operation: Box<O>) {
        let mut undo = self.undo.borrow_mut();
        if let Some(limit) = self.history_limit.get() {
            while undo.len() >= limit.get() {
                undo.pop_back();
                trace!(limit = limit.get(), "oldest operation evicted");
            }
        }

        undo.push_front(operation);
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    #[must_use]
    pub fn is_replaying(&self) -> bool {
        self.mode.get() == Mode::Replaying
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.borrow().len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.borrow().len()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.borrow().is_empty()
    }

    /// Whether [`redo`](Self::redo) has anything to re-apply.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.redo_valid.get() && !self.redo.borrow().is_empty()
    }

    /// Descriptions of the undoable operations, most recent first.
    #[must_use]
    pub fn undo_history(&self) -> Option<Vec<String>> {
        Self::describe(&self.undo.borrow())
    }

    /// Descriptions of the redoable operations, most recently undone first.
    #[must_use]
    pub fn redo_history(&self) -> Option<Vec<String>> {
        Self::describe(&self.redo.borrow())
    }

    fn describe(stack: &VecDeque<Box<O>>) -> Option<Vec<String>> {
        if stack.is_empty() {
            None
        } else {
            Some(
                stack
                    .iter()
                    .map(|operation| operation.description().into_owned())
                    .collect(),
            )
        }
    }

    #[must_use]
    pub fn history_limit(&self) -> Option<NonZeroUsize> {
        self.history_limit.get()
    }

    /// Bounds both stacks to `limit`, dropping the oldest entries right away.
    pub fn set_history_limit(&self, limit: NonZeroUsize) {
        self.history_limit.set(Some(limit));
        let limit = limit.get();

        let mut undo = self.undo.borrow_mut();
        while undo.len() > limit {
            undo.pop_back();
        }

        let mut redo = self.redo.borrow_mut();
        while redo.len() > limit {
            redo.pop_back();
        }
    }

    /// Forgets all history.
    pub fn clear(&self) {
        self.undo.borrow_mut().clear();
        self.redo.borrow_mut().clear();
        self.redo_valid.set(false);
    }
}

impl<O: ?Sized + Reversible> Default for UndoService<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ?Sized + Reversible> fmt::Display for UndoService<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "UNDO stack")?;
        for (index, operation) in self.undo.borrow().iter().enumerate() {
            writeln!(f, "{index} {}", operation.description())?;
        }
        writeln!(f, "REDO stack")?;
        for (index, operation) in self.redo.borrow().iter().enumerate() {
            writeln!(f, "{index} {}", operation.description())?;
        }
        Ok(())
    }
}

impl<O: ?Sized + Reversible> fmt::Debug for UndoService<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoService")
            .field("undo_len", &self.undo_len())
            .field("redo_len", &self.redo_len())
            .field("mode", &self.mode.get())
            .field("redo_valid", &self.redo_valid.get())
            .field("history_limit", &self.history_limit.get())
            .finish()
    }
}
