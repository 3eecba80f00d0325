//! Cross-thread call marshaling onto the graphics thread.
//!
//! The graphics thread owns the shared GPU context and every bridge. Other threads
//! never touch them; they submit closures through a [`LoopProxy`] and block until the
//! [`EventLoop`] has run them against its [`LoopContext`].

mod event_loop;
mod proxy;

pub use event_loop::{EventLoop, LoopContext};
pub use proxy::{LoopProxy, PendingCall};
