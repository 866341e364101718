//! # Status Line
//!
//! A single human-readable status string shared between the render loop and
//! the background tasks. Writers come from any thread (filter worker, launch
//! tasks); the render loop reads it every frame. Last writer wins, no history.

use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    inner: Arc<RwLock<String>>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the status text. Poisoning is absorbed rather than
    /// propagated: a panicked writer must not take the status line down
    /// with it.
    pub fn set(&self, msg: impl Into<String>) {
        let msg = msg.into();
        match self.inner.write() {
            Ok(mut guard) => *guard = msg,
            Err(poisoned) => *poisoned.into_inner() = msg,
        }
    }

    pub fn get(&self) -> String {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
