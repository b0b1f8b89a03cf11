use std::borrow::Cow;

/// The failure of a bound action, passed through the undo layer untouched.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// A trait representing a deferred action that can be executed on demand.
///
/// A command is one half of a reversible [`Operation`](crate::operation::Operation):
/// the undo half reverses a forward action, the redo half re-applies it.
/// Each concrete action implements this trait with its own typed parameters.
///
/// # Required Methods
///
/// * `execute(&self)`: Runs the action. May be called more than once; idempotence
///   is the implementor's concern.
///
/// # Provided Methods
///
/// * `description(&self) -> Cow<str>`: Returns a description of the command. The default implementation returns "Unknown command".
///
/// # Example
///
/// ```
/// use std::borrow::Cow;
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use undo_service::prelude::{ActionError, Command};
///
/// struct SetValue {
///     target: Rc<Cell<i32>>,
///     value: i32,
/// }
///
/// impl Command for SetValue {
///     fn execute(&self) -> Result<(), ActionError> {
///         self.target.set(self.value);
///         Ok(())
///     }
///
///     fn description(&self) -> Cow<'_, str> {
///         Cow::Owned(format!("SetValue({})", self.value))
///     }
/// }
///
/// let target = Rc::new(Cell::new(0));
/// let cmd = SetValue { target: Rc::clone(&target), value: 7 };
/// cmd.execute().unwrap();
/// assert_eq!(target.get(), 7);
/// assert_eq!(cmd.description(), "SetValue(7)");
/// ```
pub trait Command {
    /// Executes the command.
    ///
    /// # Errors
    ///
    /// Returns whatever error the underlying action produced.
    fn execute(&self) -> Result<(), ActionError>;

    /// Returns a description of the command. The default implementation returns "Unknown command".
    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed("Unknown command")
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn execute(&self) -> Result<(), ActionError> {
        (**self).execute()
    }

    fn description(&self) -> Cow<'_, str> {
        (**self).description()
    }
}
