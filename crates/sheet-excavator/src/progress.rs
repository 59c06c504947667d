//! Progress reporting for batch runs
//!
//! Workers never call a sink directly. They push messages onto a channel and
//! one delivery thread drains it into the sink, so a slow sink (a GUI, a
//! Python callback waiting for the GIL) cannot stall extraction.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::error::panic_message;

/// Receives human-readable status lines while a batch runs
///
/// Messages arrive from the delivery thread, in the order workers sent them;
/// there is no ordering guarantee across files.
pub trait ProgressSink: Send {
    /// Free-form status line
    fn on_message(&mut self, message: &str);

    /// Called once after the last message, when every task has finished
    fn finish(&mut self) {}
}

impl<F> ProgressSink for F
where
    F: FnMut(&str) + Send,
{
    fn on_message(&mut self, message: &str) {
        self(message)
    }
}

/// A no-op progress sink
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_message(&mut self, _message: &str) {}
}

/// Sending half handed to workers
#[derive(Debug, Clone)]
pub(crate) struct ProgressSender(Option<Sender<String>>);

impl ProgressSender {
    pub(crate) fn disabled() -> Self {
        ProgressSender(None)
    }

    /// Queue a message; never blocks, and a gone receiver is ignored
    pub(crate) fn send(&self, message: impl FnOnce() -> String) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(message());
        }
    }
}

pub(crate) fn channel() -> (ProgressSender, Receiver<String>) {
    let (tx, rx) = mpsc::channel();
    (ProgressSender(Some(tx)), rx)
}

/// Drain the channel into the sink until every sender is dropped
///
/// A sink that panics is not called again, not even `finish`, but the channel
/// is still drained so workers and the batch result are unaffected.
pub(crate) fn deliver<S: ProgressSink>(rx: Receiver<String>, sink: &mut S) {
    let mut healthy = true;
    for message in rx {
        if !healthy {
            continue;
        }
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink.on_message(&message))) {
            log::error!(
                "progress sink panicked, dropping further messages: {}",
                panic_message(payload.as_ref())
            );
            healthy = false;
        }
    }
    if healthy {
        sink.finish();
    }
}
