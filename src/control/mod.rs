//! Control module - standalone (non-socket) operating mode.

mod stdio;

pub use stdio::{run_offline, run_stdin_stdout};
