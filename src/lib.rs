//! Executive Tasks: a local-first todo tracker.
//!
//! The library holds the todo model, the pure list operations, and a
//! [`session::TodoSession`] that mirrors state to any [`io::storage::Storage`]
//! backend. The `xt` binary is a thin CLI over it.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod session;
pub mod ui;
pub mod util;
