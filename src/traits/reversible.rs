use std::borrow::Cow;

use super::command::ActionError;

/// A trait for anything the undo service can move between its stacks.
///
/// Implemented by [`Operation`](crate::operation::Operation) and
/// [`CascadedOperation`](crate::operation::CascadedOperation).
///
/// # Required Methods
///
/// * `undo(&self)`: Reverses the forward action.
/// * `redo(&self)`: Re-applies the forward action.
///
/// # Provided Methods
///
/// * `description(&self) -> Cow<str>`: Returns a description of the operation. The default implementation returns "Unknown operation".
pub trait Reversible {
    /// Reverses the forward action.
    ///
    /// # Errors
    ///
    /// Returns the error of the first action that failed.
    fn undo(&self) -> Result<(), ActionError>;

    /// Re-applies the forward action.
    ///
    /// # Errors
    ///
    /// Returns the error of the first action that failed.
    fn redo(&self) -> Result<(), ActionError>;

    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed("Unknown operation")
    }
}

impl<R: Reversible + ?Sized> Reversible for Box<R> {
    fn undo(&self) -> Result<(), ActionError> {
        (**self).undo()
    }

    fn redo(&self) -> Result<(), ActionError> {
        (**self).redo()
    }

    fn description(&self) -> Cow<'_, str> {
        (**self).description()
    }
}
