use std::{fmt, num::NonZeroUsize, sync::Arc};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::{error::UndoError, traits::reversible::Reversible, undo_service::UndoService};

/// The undo service stored behind a [`SharedUndoService`].
pub type SendUndoService = UndoService<dyn Reversible + Send>;

/// A thread-safe handle to an [`UndoService`], wrapping it in an
/// `Arc<ReentrantMutex<_>>`.
///
/// Every call holds the lock for its whole duration, including the execution
/// of the operation being undone or redone, so calls from different threads
/// are serialized. The lock is re-entrant: an operation running under it may
/// call back into the same handle on the same thread, where the replay rules of
/// [`UndoService`] apply (records are dropped, nested undo/redo is refused).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use parking_lot::Mutex;
/// use undo_service::prelude::*;
///
/// fn add(args: &(Arc<Mutex<i32>>, i32)) -> Result<(), ActionError> {
///     *args.0.lock() += args.1;
///     Ok(())
/// }
///
/// let counter = Arc::new(Mutex::new(0));
/// let service = SharedUndoService::new();
///
/// let handle = {
///     let counter = Arc::clone(&counter);
///     let service = service.clone();
///     thread::spawn(move || {
///         *counter.lock() += 2;
///         service.record_for_undo(Box::new(Operation::new(
///             BoundCommand::new("add", add, (Arc::clone(&counter), -2)),
///             BoundCommand::new("add", add, (Arc::clone(&counter), 2)),
///         )));
///     })
/// };
/// handle.join().unwrap();
///
/// service.undo().unwrap();
/// assert_eq!(*counter.lock(), 0);
/// ```
pub struct SharedUndoService {
    inner: Arc<ReentrantMutex<SendUndoService>>,
}

impl SharedUndoService {
    #[must_use]
    pub fn new() -> Self {
        Self::from(SendUndoService::new())
    }

    #[must_use]
    pub fn with_history_limit(history_limit: NonZeroUsize) -> Self {
        Self::from(SendUndoService::with_history_limit(history_limit))
    }

    /// Locks the service for a sequence of calls that must not interleave
    /// with other threads. Blocks while another thread holds it.
    pub fn lock(&self) -> ReentrantMutexGuard<'_, SendUndoService> {
        self.inner.lock()
    }

    #[allow(clippy::must_use_candidate)]
    pub fn try_lock(&self) -> Option<ReentrantMutexGuard<'_, SendUndoService>> {
        self.inner.try_lock()
    }

    pub fn record_for_undo(&self, operation: Box<dyn Reversible + Send>) {
        self.lock().record_for_undo(operation);
    }

    /// See [`UndoService::undo`].
    ///
    /// # Errors
    ///
    /// Fails exactly as [`UndoService::undo`] does.
    pub fn undo(&self) -> Result<(), UndoError> {
        self.lock().undo()
    }

    /// See [`UndoService::redo`].
    ///
    /// # Errors
    ///
    /// Fails exactly as [`UndoService::redo`] does.
    pub fn redo(&self) -> Result<(), UndoError> {
        self.lock().redo()
    }

    /// Runs `f` with the service locked.
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&SendUndoService) -> R,
    {
        let service = self.lock();
        f(&service)
    }
}

impl Clone for SharedUndoService {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Default for SharedUndoService {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SendUndoService> for SharedUndoService {
    fn from(service: SendUndoService) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(service)),
        }
    }
}

impl fmt::Debug for SharedUndoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(service) => write!(f, "SharedUndoService({:?})", *service),
            None => write!(f, "SharedUndoService(<locked>)"),
        }
    }
}

impl fmt::Display for SharedUndoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.lock(), f)
    }
}

#[cfg(test)]
mod tests {
    use std::{borrow::Cow, hint::black_box, thread, time};

    use parking_lot::Mutex;
    use rand::Rng;

    use crate::{
        operation::Operation,
        traits::command::{ActionError, Command},
    };

    use super::*;

    type Counter = Arc<Mutex<i32>>;

    struct Add {
        target: Counter,
        amount: i32,
    }

    impl Command for Add {
        fn execute(&self) -> Result<(), ActionError> {
            *self.target.lock() += self.amount;
            Ok(())
        }

        fn description(&self) -> Cow<'_, str> {
            Cow::Owned(format!("Add({})", self.amount))
        }
    }

    /// Tries to record a new operation each time it runs.
    struct RecordOnExecute {
        service: SharedUndoService,
        target: Counter,
    }

    impl Command for RecordOnExecute {
        fn execute(&self) -> Result<(), ActionError> {
            self.service
                .record_for_undo(Box::new(add_operation(&self.target, 100)));
            Ok(())
        }
    }

    fn add_operation(target: &Counter, amount: i32) -> Operation<Add> {
        Operation::new(
            Add {
                target: Arc::clone(target),
                amount: -amount,
            },
            Add {
                target: Arc::clone(target),
                amount,
            },
        )
    }

    fn add(service: &SharedUndoService, target: &Counter, amount: i32) {
        // Forward action and record happen under one lock so concurrent
        // callers cannot slip an undo in between.
        let guard = service.lock();
        *target.lock() += amount;
        guard.record_for_undo(Box::new(add_operation(target, amount)));
    }

    #[test]
    fn test_shared_round_trip() {
        let service = SharedUndoService::new();
        let ctx = Counter::default();

        add(&service, &ctx, 1);
        assert_eq!(*ctx.lock(), 1);

        service.undo().unwrap();
        assert_eq!(*ctx.lock(), 0);

        service.redo().unwrap();
        assert_eq!(*ctx.lock(), 1);
    }

    #[test]
    fn test_clones_share_history() {
        let service = SharedUndoService::new();
        let other = service.clone();
        let ctx = Counter::default();

        add(&service, &ctx, 5);
        other.undo().unwrap();

        assert_eq!(*ctx.lock(), 0);
        assert_eq!(service.with(|history| history.redo_len()), 1);
    }

    #[test]
    fn test_shared_max_size() {
        let service = SharedUndoService::with_history_limit(NonZeroUsize::new(2).unwrap());
        let ctx = Counter::default();

        add(&service, &ctx, 1);
        add(&service, &ctx, 2);
        add(&service, &ctx, 3);

        assert_eq!(*ctx.lock(), 6);
        assert_eq!(service.lock().undo_len(), 2);
    }

    #[test]
    fn test_record_during_undo_is_dropped() {
        let service = SharedUndoService::new();
        let ctx = Counter::default();

        service.record_for_undo(Box::new(Operation::new(
            RecordOnExecute {
                service: service.clone(),
                target: Arc::clone(&ctx),
            },
            RecordOnExecute {
                service: service.clone(),
                target: Arc::clone(&ctx),
            },
        )));

        service.undo().unwrap();
        assert_eq!(service.lock().undo_len(), 0);
        assert_eq!(service.lock().redo_len(), 1);

        service.redo().unwrap();
        assert_eq!(service.lock().undo_len(), 1);
        assert_eq!(service.lock().redo_len(), 0);

        // The operation holds a handle to the service; drop the history so the
        // cycle is broken.
        service.lock().clear();
    }

    #[test]
    fn test_concurrent_rng() {
        let service = SharedUndoService::new();
        let ctx = Counter::default();

        let count = rand::thread_rng().gen_range(10..80);
        let mut handles = Vec::new();

        for _ in 0..count {
            let value = rand::thread_rng().gen_range(0..20);
            let service = service.clone();
            let ctx = Arc::clone(&ctx);

            handles.push(black_box(thread::spawn(move || {
                thread::sleep(time::Duration::from_millis(
                    rand::thread_rng().gen_range(0..100),
                ));
                add(&service, &ctx, value);
                value
            })));
        }

        let mut sum = 0;
        for handle in handles {
            let result = handle.join();
            assert!(result.is_ok(), "Thread panicked during execution");
            sum += result.expect("Thread should return a value");
        }

        assert_eq!(*ctx.lock(), sum);
        assert_eq!(service.lock().undo_len(), count);
        assert_eq!(service.lock().redo_len(), 0);

        let mut handles = Vec::new();
        for _ in 0..count {
            let service = service.clone();

            handles.push(black_box(thread::spawn(move || {
                thread::sleep(time::Duration::from_millis(
                    rand::thread_rng().gen_range(0..100),
                ));
                service.undo().expect("undo stack cannot be empty here");
                thread::sleep(time::Duration::from_millis(
                    rand::thread_rng().gen_range(0..100),
                ));
                service.redo().expect("redo stack cannot be empty here");
            })));
        }

        for handle in handles {
            assert!(handle.join().is_ok(), "Thread panicked during execution");
        }

        assert_eq!(*ctx.lock(), sum);
        assert_eq!(
            service.lock().undo_len(),
            count,
            "Undo stack size after execution"
        );
        assert_eq!(
            service.lock().redo_len(),
            0,
            "Redo stack should be empty after execution"
        );
    }

    #[test]
    fn test_debug() {
        let service = SharedUndoService::new();
        assert!(format!("{service:?}").starts_with("SharedUndoService(UndoService"));

        let (sender, receiver) = std::sync::mpsc::channel();
        let held = service.clone();
        let guard = held.lock();
        let probe = service.clone();
        let handle = thread::spawn(move || {
            sender.send(format!("{probe:?}")).unwrap();
        });
        assert_eq!(receiver.recv().unwrap(), "SharedUndoService(<locked>)");
        drop(guard);
        handle.join().unwrap();
    }

    #[test]
    fn test_display() {
        let service = SharedUndoService::new();
        let ctx = Counter::default();

        add(&service, &ctx, 1);

        assert_eq!(
            service.to_string(),
            "UNDO stack\n0 Operation: Add(-1) & Add(1)\nREDO stack\n"
        );
    }
}
