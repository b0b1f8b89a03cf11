#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::correctness)]
#![warn(clippy::complexity)]
#![warn(clippy::suspicious)]
#![warn(clippy::cargo)]

//! Linear undo/redo history.
//!
//! Application code performs an action, then records the matching
//! [`Operation`](operation::Operation) with an
//! [`UndoService`](undo_service::UndoService). The service moves operations
//! between its undo and redo stacks, drops records made while it is replaying
//! one, and forgets stale redo history as soon as a new action is recorded.

pub mod bound_command;
pub mod error;
pub mod operation;
pub mod shared_undo_service;
pub mod traits;
pub mod undo_service;

pub mod prelude {
	pub use crate::bound_command::BoundCommand;
	pub use crate::error::{EmptyHistory, UndoError};
	pub use crate::operation::{CascadedOperation, Operation};
	pub use crate::shared_undo_service::{SendUndoService, SharedUndoService};
	pub use crate::traits::command::{ActionError, Command};
	pub use crate::traits::reversible::Reversible;
	pub use crate::undo_service::{Mode, UndoService};
}
