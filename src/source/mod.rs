//! # Data Source
//!
//! The picker is generic over a [`Source`]: something that can enumerate
//! launchable items, narrow the enumeration by name, and start an item.
//! The UI never calls a source directly from the render loop; all calls go
//! through `spawn_blocking` tasks, so implementations are free to block
//! (talk to a daemon, hit the filesystem, etc.).

use thiserror::Error;

pub mod path;

pub use path::PathSource;

/// A single launchable entry as reported by a source.
///
/// `id` is the opaque handle passed back to [`Source::run`]; `name` is what
/// the user sees and what name filters match against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub name: String,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Errors reported by a [`Source`].
///
/// These are never fatal to the picker: the UI surfaces them on the status
/// line and the operation that raised them is abandoned.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The external data source the picker talks to.
///
/// Methods may block; the controller always invokes them off the render
/// thread. Filter state lives in the source (`set_filter_name` /
/// `reset_filters` change what the next `list` returns), mirroring a remote
/// client where the daemon owns the filter.
pub trait Source: Send + Sync {
    /// Enumerate items matching the currently applied filters.
    fn list(&self) -> Result<Vec<Item>, SourceError>;

    /// Restrict subsequent `list` calls to items whose name matches `name`.
    fn set_filter_name(&self, name: &str) -> Result<(), SourceError>;

    /// Clear all filters.
    fn reset_filters(&self) -> Result<(), SourceError>;

    /// Launch the item with the given id.
    fn run(&self, id: &str) -> Result<(), SourceError>;

    /// Release any resources held by the source. Default: nothing to do.
    fn close(&self) {}
}
