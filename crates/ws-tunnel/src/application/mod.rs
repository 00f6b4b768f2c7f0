//! Application layer for ws-tunnel.
//!
//! Knows *what* happens to a session once both connections exist: run the
//! relay over them and report the outcome.  It never opens a socket; the
//! infrastructure layer establishes the connections and calls in here.

pub mod session;

pub use session::{describe_outcome, log_outcome, run_session};
