use std::{borrow::Cow, fmt};

use crate::traits::command::{ActionError, Command};

/// A named function bound to its arguments, executed later.
///
/// The argument type is fixed at construction, so every call site is checked
/// against the action's real parameter list.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use undo_service::prelude::{ActionError, BoundCommand, Command};
///
/// fn push(args: &(Rc<RefCell<Vec<i32>>>, i32)) -> Result<(), ActionError> {
///     args.0.borrow_mut().push(args.1);
///     Ok(())
/// }
///
/// let list = Rc::new(RefCell::new(Vec::new()));
/// let cmd = BoundCommand::new("push", push, (Rc::clone(&list), 3));
/// cmd.execute().unwrap();
/// cmd.execute().unwrap();
/// assert_eq!(*list.borrow(), vec![3, 3]);
/// ```
pub struct BoundCommand<A> {
    name: Cow<'static, str>,
    action: fn(&A) -> Result<(), ActionError>,
    arguments: A,
}

impl<A> BoundCommand<A> {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        action: fn(&A) -> Result<(), ActionError>,
        arguments: A,
    ) -> Self {
        Self {
            name: name.into(),
            action,
            arguments,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn arguments(&self) -> &A {
        &self.arguments
    }
}

impl<A: fmt::Debug> Command for BoundCommand<A> {
    fn execute(&self) -> Result<(), ActionError> {
        (self.action)(&self.arguments)
    }

    fn description(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl<A: fmt::Debug> fmt::Display for BoundCommand<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Function: {} with parameters: {:?}",
            self.name, self.arguments
        )
    }
}

impl<A: fmt::Debug> fmt::Debug for BoundCommand<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundCommand")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}
