//! Reactive Engine - cells, contexts and derived values.
//!
//! The engine is a push-based dependency graph:
//!
//! ```text
//! Setter::set ──> cell subscribers ──> Context::execute ──> closure re-reads cells
//! ```
//!
//! - [`create_cell`] - value container, `(Getter, Setter)` pair
//! - [`run_reactive`] - run a closure now and again whenever what it read changes
//! - [`derive`] - getter computed from other cells
//!
//! Everything is synchronous. A write re-runs its subscribers before the
//! setter returns, depth-first through nested writes. A write that reaches
//! a context which is still running makes that context run again as soon as
//! its current run returns, so cycles settle instead of going stale. There
//! is no batching
//! and no deduplication across diamond-shaped graphs: a context reading two
//! values derived from the same cell may run once per path.
//!
//! All state is thread-local; contexts never cross threads.

mod cell;
mod context;
mod derive;

pub use cell::{create_cell, Getter, Setter};
pub use context::{
    current_context, on_cleanup, reset_runtime, root_count, run_reactive, run_reactive_named,
    untracked, Context, ContextId,
};
pub(crate) use context::run_reactive_unrooted;
pub use derive::derive;
