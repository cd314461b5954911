// src/progress.rs

//! Progress reporting for deployment operations
//!
//! Deployment operations report fractional progress as percentages in the
//! 0-100 range. The `ProgressTracker` trait is the single interface;
//! implementations cover callback forwarding (GUI/CLI integration),
//! logging, and a no-op for quiet mode.
//!
//! Callbacks may be invoked from a different execution context than the
//! call site. The channel is a single-producer ordered stream: the
//! orchestrator guarantees percentages arrive non-decreasing, and any
//! thread marshaling is the caller's responsibility.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::info;

/// Core trait for percentage progress tracking.
///
/// Implementations must be thread-safe: updates can arrive from whichever
/// context the deployment facility reports on.
pub trait ProgressTracker: Send + Sync {
    /// Set the current status message
    fn set_message(&self, message: &str);

    /// Set the completion percentage (0-100)
    fn set_percent(&self, percent: u8);

    /// Current completion percentage
    fn percent(&self) -> u8;

    /// Finish successfully with a message
    fn finish_with_message(&self, message: &str);

    /// Finish with an error message
    fn finish_with_error(&self, message: &str);

    /// Whether the operation has finished
    fn is_finished(&self) -> bool;
}

/// No-op tracker for quiet or scripted usage
#[derive(Debug, Default)]
pub struct SilentProgress {
    percent: AtomicU8,
    finished: AtomicBool,
}

impl SilentProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn set_percent(&self, percent: u8) {
        self.percent.store(percent.min(100), Ordering::Relaxed);
    }

    fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, _message: &str) {
        self.finished.store(true, Ordering::Relaxed);
    }

    fn finish_with_error(&self, _message: &str) {
        self.finished.store(true, Ordering::Relaxed);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

/// Logs progress to tracing at info level, at 10% steps to avoid spam
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    percent: AtomicU8,
    finished: AtomicBool,
}

impl LogProgress {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            percent: AtomicU8::new(0),
            finished: AtomicBool::new(false),
        }
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn set_percent(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.percent.swap(percent, Ordering::Relaxed);
        if percent / 10 > previous / 10 {
            info!("{}: {}%", self.name, percent);
        }
    }

    fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, message: &str) {
        self.finished.store(true, Ordering::Relaxed);
        info!("{}: {}", self.name, message);
    }

    fn finish_with_error(&self, message: &str) {
        self.finished.store(true, Ordering::Relaxed);
        info!("{}: ERROR - {}", self.name, message);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

/// Events emitted by `CallbackProgress`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Message(String),
    Percent(u8),
    Finished(String),
    Error(String),
}

/// Calls a user-provided function on every update
pub struct CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    callback: F,
    percent: AtomicU8,
    finished: AtomicBool,
}

impl<F> CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            percent: AtomicU8::new(0),
            finished: AtomicBool::new(false),
        }
    }
}

impl<F> ProgressTracker for CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn set_message(&self, message: &str) {
        (self.callback)(ProgressEvent::Message(message.to_string()));
    }

    fn set_percent(&self, percent: u8) {
        let percent = percent.min(100);
        self.percent.store(percent, Ordering::Relaxed);
        (self.callback)(ProgressEvent::Percent(percent));
    }

    fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, message: &str) {
        self.finished.store(true, Ordering::Relaxed);
        (self.callback)(ProgressEvent::Finished(message.to_string()));
    }

    fn finish_with_error(&self, message: &str) {
        self.finished.store(true, Ordering::Relaxed);
        (self.callback)(ProgressEvent::Error(message.to_string()));
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}
