//! Inline or background execution of the report pipeline.
//!
//! In background mode a single named thread owns the pipeline and drains an
//! unbounded FIFO channel, so reports are submitted one at a time in the
//! order they were accepted. Inline mode runs the pipeline on the caller's
//! thread.
//!
//! Every run is marked on its thread (see [`is_reporting_thread`]) so that
//! events logged while a report is being built or sent are not reported
//! themselves, and is wrapped in `catch_unwind` so a panicking callback or
//! sanitizer never reaches the logging caller or kills the worker.

use crate::application::pipeline::ReportPipeline;
use crate::domain::event::LogEvent;
use crossbeam_channel::{unbounded, Sender};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Name of the background reporting thread.
pub const WORKER_THREAD_NAME: &str = "exceptional-reporter";

thread_local! {
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Check whether the current thread is running the report pipeline.
pub(crate) fn is_reporting_thread() -> bool {
    REPORTING.with(Cell::get)
}

struct ReportingGuard {
    previous: bool,
}

impl ReportingGuard {
    fn enter() -> Self {
        Self {
            previous: REPORTING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTING.with(|flag| flag.set(self.previous));
    }
}

/// Error returned when the background worker cannot be stopped cleanly.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShutdownError {
    /// The worker thread terminated with a panic
    #[error("report worker thread panicked")]
    WorkerPanicked,
}

/// Runs accepted events through the report pipeline.
#[derive(Debug)]
pub enum Dispatcher {
    /// Run on the caller's thread
    Inline(ReportPipeline),
    /// Queue for the background worker
    Background(BackgroundWorker),
}

impl Dispatcher {
    /// Hand an accepted event to the pipeline.
    pub fn dispatch(&self, event: LogEvent) {
        match self {
            Dispatcher::Inline(pipeline) => run_guarded(pipeline, &event),
            Dispatcher::Background(worker) => worker.enqueue(event),
        }
    }

    /// Stop accepting events and wait for queued reports to be sent.
    ///
    /// A no-op in inline mode and on repeated calls.
    pub fn shutdown(&self) -> Result<(), ShutdownError> {
        match self {
            Dispatcher::Inline(_) => Ok(()),
            Dispatcher::Background(worker) => worker.shutdown(),
        }
    }

    /// Check if reports are sent from a background thread.
    pub fn is_background(&self) -> bool {
        matches!(self, Dispatcher::Background(_))
    }
}

/// Handle to the single background reporting thread.
#[derive(Debug)]
pub struct BackgroundWorker {
    sender: Mutex<Option<Sender<LogEvent>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundWorker {
    /// Spawn the worker. The pipeline moves into the new thread.
    pub fn spawn(pipeline: ReportPipeline) -> std::io::Result<Self> {
        let (sender, receiver) = unbounded::<LogEvent>();

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                REPORTING.with(|flag| flag.set(true));
                debug!("report worker started");

                for event in receiver {
                    run_guarded(&pipeline, &event);
                }

                debug!("report worker stopped");
            })?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        })
    }

    fn enqueue(&self, event: LogEvent) {
        let sender = lock(&self.sender);
        match sender.as_ref() {
            Some(sender) => {
                if let Err(e) = sender.send(event) {
                    warn!(event = %e.0.format_brief(), "report worker is gone, dropping event");
                }
            }
            None => {
                warn!(event = %event.format_brief(), "reporter is shut down, dropping event");
            }
        }
    }

    fn shutdown(&self) -> Result<(), ShutdownError> {
        // Dropping the sender closes the channel; the worker exits once drained.
        drop(lock(&self.sender).take());

        let Some(handle) = lock(&self.handle).take() else {
            return Ok(());
        };

        if handle.thread().id() == thread::current().id() {
            // Called from a callback on the worker itself; it exits on its own.
            return Ok(());
        }

        handle.join().map_err(|_| ShutdownError::WorkerPanicked)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_guarded(pipeline: &ReportPipeline, event: &LogEvent) {
    let _guard = ReportingGuard::enter();

    let result = panic::catch_unwind(AssertUnwindSafe(|| pipeline.process(event)));
    if result.is_err() {
        error!(event = %event.format_brief(), "report pipeline panicked");
    }
}
