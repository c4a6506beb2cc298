use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Once};
use std::thread;
use std::time::Duration;

use tablescrape_engine::{run_background, TaskFailure};

const WAIT: Duration = Duration::from_secs(5);

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tablescrape_logging::initialize_for_tests);
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Complete(u32, thread::ThreadId),
    Error(TaskFailure<String>, thread::ThreadId),
}

fn submit<F>(task: F) -> (mpsc::Receiver<Outcome>, tablescrape_engine::TaskHandle)
where
    F: FnOnce() -> Result<u32, String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let err_tx = tx.clone();
    let handle = run_background(
        task,
        move |value| {
            let _ = tx.send(Outcome::Complete(value, thread::current().id()));
        },
        move |failure| {
            let _ = err_tx.send(Outcome::Error(failure, thread::current().id()));
        },
    );
    (rx, handle)
}

#[test]
fn success_fires_on_complete_once_on_worker_thread() {
    init_logging();
    let (task_thread_tx, task_thread_rx) = mpsc::channel();
    let (rx, handle) = submit(move || {
        let _ = task_thread_tx.send(thread::current().id());
        Ok(42)
    });
    handle.join();

    let worker = task_thread_rx.recv_timeout(WAIT).unwrap();
    assert_ne!(worker, thread::current().id());
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), Outcome::Complete(42, worker));
    assert!(rx.try_recv().is_err(), "exactly one callback");
}

#[test]
fn worker_threads_are_named_after_the_task() {
    init_logging();
    let (name_tx, name_rx) = mpsc::channel();
    let (_rx, handle) = submit(move || {
        let _ = name_tx.send(thread::current().name().map(str::to_string));
        Ok(1)
    });
    let expected = format!("tablescrape-task-{}", handle.id());
    handle.join();

    assert_eq!(name_rx.recv_timeout(WAIT).unwrap(), Some(expected));
}

#[test]
fn failure_fires_on_error_once() {
    init_logging();
    let (rx, handle) = submit(|| Err("boom".to_string()));
    handle.join();

    match rx.recv_timeout(WAIT).unwrap() {
        Outcome::Error(failure, worker) => {
            assert_eq!(failure.clone().into_error(), Some("boom".to_string()));
            assert_eq!(failure, TaskFailure::Failed("boom".to_string()));
            assert_ne!(worker, thread::current().id());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(rx.try_recv().is_err(), "exactly one callback");
}

#[test]
fn panicking_task_is_reported_as_error() {
    init_logging();
    let (rx, handle) = submit(|| panic!("task exploded"));
    handle.join();

    match rx.recv_timeout(WAIT).unwrap() {
        Outcome::Error(TaskFailure::Panicked(message), _) => {
            assert!(message.contains("task exploded"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn panicking_callback_is_swallowed() {
    init_logging();
    let errors = Arc::new(AtomicUsize::new(0));
    let errors_seen = errors.clone();
    let handle = run_background(
        || Ok::<_, String>(1),
        |_| panic!("callback exploded"),
        move |_| {
            errors_seen.fetch_add(1, Ordering::SeqCst);
        },
    );
    // join only returns normally if the worker thread did not unwind.
    handle.join();
    assert_eq!(errors.load(Ordering::SeqCst), 0);
}

#[test]
fn submission_does_not_wait_for_task() {
    init_logging();
    let gate = Arc::new(Barrier::new(2));
    let task_gate = gate.clone();
    let (rx, handle) = submit(move || {
        task_gate.wait();
        Ok(7)
    });

    // The task is parked on the barrier, so we got here without blocking.
    assert!(!handle.is_finished());
    gate.wait();
    assert_eq!(
        rx.recv_timeout(WAIT).map(|o| matches!(o, Outcome::Complete(7, _))),
        Ok(true)
    );
}

#[test]
fn concurrent_submissions_both_complete() {
    init_logging();
    let (tx, rx) = mpsc::channel();
    let handles: Vec<_> = [30u64, 0]
        .into_iter()
        .map(|delay| {
            let tx = tx.clone();
            let err_tx = tx.clone();
            run_background(
                move || {
                    thread::sleep(Duration::from_millis(delay));
                    Ok::<_, String>(delay)
                },
                move |v| {
                    let _ = tx.send(Ok(v));
                },
                move |e| {
                    let _ = err_tx.send(Err(e.to_string()));
                },
            )
        })
        .collect();
    drop(tx);

    let mut seen: Vec<u64> = rx.iter().take(2).map(Result::unwrap).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 30]);
    assert_ne!(handles[0].id(), handles[1].id());
}

#[test]
fn dropped_handle_still_runs_callback() {
    init_logging();
    let (rx, handle) = submit(|| Ok(5));
    drop(handle);
    assert!(matches!(
        rx.recv_timeout(WAIT).unwrap(),
        Outcome::Complete(5, _)
    ));
}
