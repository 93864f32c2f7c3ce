// This module groups the container/member association domain.
//
// Structure
// - container.rs: container row and its per-user membership map
// - event.rs + event/: normalized mutation event, raw transport record, and versioned wire payloads
// - parse.rs: raw record to normalized event
// - impact.rs: distinct containers touched by a batch
// - merge.rs: the union/difference rule shared with member linking
// - mutate.rs: ordered application of a batch to loaded containers
//
// Boundaries
// - No input or output here. Loading and saving live in application/sync.

pub mod container;
pub mod event;
pub mod impact;
pub mod merge;
pub mod mutate;
pub mod parse;
