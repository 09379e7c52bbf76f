use std::sync::mpsc::{self, Receiver};

use crate::error::Result;

use super::types::{CancelToken, OutputLine, StreamEvent};

/// Live output of a running child, one line at a time.
///
/// Yields `Ok(line)` as lines arrive on either channel and ends with `None`
/// on a zero exit, or with one `Err(CommandFailed)` carrying the full stderr
/// on a non-zero exit. Cancelling (or dropping the stream) terminates the
/// child and ends the sequence without an error.
#[derive(Debug)]
pub struct LineStream {
    rx: Option<Receiver<StreamEvent>>,
    cancel: CancelToken,
    /// The producer reached its end; dropping no longer needs to cancel.
    exhausted: bool,
}

impl LineStream {
    pub(crate) fn new(rx: Receiver<StreamEvent>, cancel: CancelToken) -> Self {
        Self {
            rx: Some(rx),
            cancel,
            exhausted: false,
        }
    }

    /// A finished stream replaying known items, for runners that do not
    /// spawn a process.
    pub fn from_results<I>(items: I, cancel: CancelToken) -> Self
    where
        I: IntoIterator<Item = Result<OutputLine>>,
    {
        let (tx, rx) = mpsc::channel();
        for item in items {
            let event = match item {
                Ok(line) => StreamEvent::Line(line),
                Err(err) => StreamEvent::Failed(err),
            };
            let _ = tx.send(event);
        }
        Self::new(rx, cancel)
    }

    /// Stop the child and end the stream. Idempotent.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        // Dropping the receiver unblocks reader threads waiting on a full channel.
        self.rx = None;
    }

    /// A handle that cancels this stream from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Iterator for LineStream {
    type Item = Result<OutputLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.is_cancelled() {
            self.rx = None;
            return None;
        }
        let event = self.rx.as_ref()?.recv();
        if self.cancel.is_cancelled() {
            self.rx = None;
            return None;
        }
        match event {
            Ok(StreamEvent::Line(line)) => Some(Ok(line)),
            Ok(StreamEvent::Failed(err)) => {
                self.rx = None;
                self.exhausted = true;
                Some(Err(err))
            }
            Err(_) => {
                self.rx = None;
                self.exhausted = true;
                None
            }
        }
    }
}

impl Drop for LineStream {
    fn drop(&mut self) {
        // The token may be shared with later attempts; leave it alone once
        // the child is known to be gone.
        if !self.exhausted {
            self.cancel.cancel();
        }
    }
}

/// Drain a stream into its lines, failing on the terminal error.
pub fn collect_lines(stream: impl Iterator<Item = Result<OutputLine>>) -> Result<Vec<OutputLine>> {
    stream.collect()
}
