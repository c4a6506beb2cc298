use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tablescrape_logging::{scrape_debug, scrape_error};

static NEXT_TASK: AtomicU64 = AtomicU64::new(1);

/// Why a background task produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure<E> {
    Failed(E),
    Panicked(String),
    /// The worker thread could not be started; `on_error` then runs on the
    /// submitting thread.
    SpawnFailed(String),
}

impl<E> TaskFailure<E> {
    /// The task's own error, if it returned one.
    pub fn into_error(self) -> Option<E> {
        match self {
            TaskFailure::Failed(err) => Some(err),
            TaskFailure::Panicked(_) | TaskFailure::SpawnFailed(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for TaskFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailure::Failed(err) => err.fmt(f),
            TaskFailure::Panicked(message) => write!(f, "task panicked: {message}"),
            TaskFailure::SpawnFailed(message) => write!(f, "could not start task: {message}"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TaskFailure<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaskFailure::Failed(err) => Some(err),
            TaskFailure::Panicked(_) | TaskFailure::SpawnFailed(_) => None,
        }
    }
}

/// Handle to a detached worker thread. Dropping it does not join.
#[derive(Debug)]
pub struct TaskHandle {
    id: u64,
    thread: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits until the task and its callback have run.
    pub fn join(self) {
        // The worker catches every panic, so there is nothing to propagate.
        if let Some(thread) = self.thread {
            let _ = thread.join();
        }
    }
}

/// Runs `task` on a new thread named `tablescrape-task-<id>` and then calls exactly one of the callbacks
/// on that same thread: `on_complete` with the value, or `on_error` with the
/// error (or the panic message if the task panicked). A panicking callback is
/// logged and swallowed. Returns immediately.
pub fn run_background<T, E, F, C, R>(task: F, on_complete: C, on_error: R) -> TaskHandle
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
    C: FnOnce(T) + Send + 'static,
    R: FnOnce(TaskFailure<E>) + Send + 'static,
{
    let id = NEXT_TASK.fetch_add(1, Ordering::Relaxed);
    // Shared so the submitting thread can still report a failed spawn.
    let error_slot = Arc::new(Mutex::new(Some(on_error)));
    let worker_slot = error_slot.clone();
    let spawned = thread::Builder::new()
        .name(format!("tablescrape-task-{id}"))
        .spawn(move || {
            scrape_debug!("Task {} started", id);
            let outcome = match panic::catch_unwind(AssertUnwindSafe(task)) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(TaskFailure::Failed(err)),
                Err(payload) => Err(TaskFailure::Panicked(panic_message(payload.as_ref()))),
            };

            let callback = match outcome {
                Ok(value) => panic::catch_unwind(AssertUnwindSafe(move || on_complete(value))),
                Err(failure) => {
                    let on_error = take_callback(&worker_slot);
                    panic::catch_unwind(AssertUnwindSafe(move || {
                        if let Some(on_error) = on_error {
                            on_error(failure);
                        }
                    }))
                }
            };
            if let Err(payload) = callback {
                scrape_error!(
                    "Task {} callback panicked: {}",
                    id,
                    panic_message(payload.as_ref())
                );
            }
            scrape_debug!("Task {} finished", id);
        });

    match spawned {
        Ok(thread) => TaskHandle {
            id,
            thread: Some(thread),
        },
        Err(err) => {
            scrape_error!("Task {} could not be started: {}", id, err);
            if let Some(on_error) = take_callback(&error_slot) {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || {
                    on_error(TaskFailure::SpawnFailed(err.to_string()))
                })) {
                    scrape_error!(
                        "Task {} callback panicked: {}",
                        id,
                        panic_message(payload.as_ref())
                    );
                }
            }
            TaskHandle { id, thread: None }
        }
    }
}

fn take_callback<R>(slot: &Mutex<Option<R>>) -> Option<R> {
    match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
