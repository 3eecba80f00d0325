use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use log::trace;
use tokio::sync::{mpsc, oneshot};
use crate::errors::MarshalError;
use crate::marshal::LoopContext;

/// A closure waiting to run on the graphics thread.
pub type PendingCall = Box<dyn FnOnce(&mut LoopContext) + Send + 'static>;

pub(crate) enum LoopMessage {
    Invoke(PendingCall),
    Quit(i32),
}

/// Cloneable handle for submitting work to the graphics thread from any other thread.
///
/// Blocking calls use `blocking_recv` and must not be issued from inside an async
/// runtime. Calls issued from the same thread run in submission order; there is no
/// ordering between different submitting threads.
#[derive(Clone)]
pub struct LoopProxy {
    tx: mpsc::UnboundedSender<LoopMessage>,
    loop_thread: Arc<OnceLock<ThreadId>>,
}

impl std::fmt::Debug for LoopProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopProxy")
            .field("running", &self.is_running())
            .field("loop_thread", &self.loop_thread.get())
            .finish()
    }
}

impl LoopProxy {
    pub(crate) fn new(tx: mpsc::UnboundedSender<LoopMessage>, loop_thread: Arc<OnceLock<ThreadId>>) -> Self {
        Self { tx, loop_thread }
    }

    /// False once the event loop has gone away.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Run `f` on the graphics thread and block until it has completed.
    pub fn invoke<F>(&self, f: F) -> Result<(), MarshalError>
    where
        F: FnOnce(&mut LoopContext) + Send + 'static,
    {
        self.invoke_with_result(f)
    }

    /// Run `f` on the graphics thread and block until its result is available.
    pub fn invoke_with_result<T, F>(&self, f: F) -> Result<T, MarshalError>
    where
        T: Send + 'static,
        F: FnOnce(&mut LoopContext) -> T + Send + 'static,
    {
        if self.loop_thread.get() == Some(&thread::current().id()) {
            return Err(MarshalError::Reentrant);
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Box::new(move |ctx| {
            // The caller may have given up; nothing to deliver to then
            let _ = reply_tx.send(f(ctx));
        }))?;

        reply_rx.blocking_recv().map_err(|_| MarshalError::CallDropped)
    }

    /// Queue `f` for the graphics thread without waiting for it.
    pub fn post<F>(&self, f: F) -> Result<(), MarshalError>
    where
        F: FnOnce(&mut LoopContext) + Send + 'static,
    {
        self.submit(Box::new(f))
    }

    /// Ask the event loop to stop with `code`. No-op when it is not running.
    pub fn quit(&self, code: i32) {
        if self.tx.send(LoopMessage::Quit(code)).is_err() {
            trace!("Quit requested but the event loop is not running");
        }
    }

    fn submit(&self, call: PendingCall) -> Result<(), MarshalError> {
        self.tx
            .send(LoopMessage::Invoke(call))
            .map_err(|_| MarshalError::LoopNotRunning)
    }
}
