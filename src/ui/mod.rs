//! # UI Module
//!
//! The picker's terminal user interface: a single-threaded render/event loop
//! plus the background machinery it talks to.
//!
//! ## Components
//!
//! - [`App`] - controller state owned by the render loop (query, selection,
//!   key repeat) and the handles to background work
//! - [`ListStore`](list::ListStore) - filtered items, selection, viewport
//! - [`FilterWorker`](worker::FilterWorker) - debounced background fetches
//! - [`StatusLine`](status::StatusLine) - thread-safe status bulletin
//! - [`mod@render`] - drawing functions
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ Filter field (always focused)                   │
//! ├─────────────────────────────────────────────────┤
//! │                                                 │
//! │ Application list                                │
//! │ (selected row highlighted, viewport window)     │
//! │                                                 │
//! ├─────────────────────────────────────────────────┤
//! │ Status line                                     │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading
//!
//! The render loop owns all UI-visible state. Cross-thread traffic is
//! restricted to three lock-light seams: the bounded query channel into the
//! worker, the single-slot result cell out of it, and the status line.

pub mod app;
pub mod keyrepeat;
pub mod list;
pub mod render;
pub mod status;
pub mod worker;

pub use app::App;
pub use render::render;
