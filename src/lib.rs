//! opal - a keyboard-driven terminal picker for finding and launching applications
//!
//! This library provides the picker controller: a single-threaded render/event
//! loop bound to background work (debounced filter queries, non-blocking result
//! handoff, key-repeat emulation and thread-safe status reporting) on top of a
//! pluggable [`source::Source`] that lists, filters and launches items.

pub mod source;
pub mod ui;
